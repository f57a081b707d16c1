// Panic isolation for worker safety
use std::any::Any;
use tokio::task::JoinError;

/// Best-effort text of a panic payload
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

/// Describe why a spawned execution did not return normally
pub fn describe_join_error(err: JoinError) -> String {
    if err.is_panic() {
        let payload = err.into_panic();
        format!("Execution panicked: {}", panic_message(payload.as_ref()))
    } else {
        format!("Execution cancelled: {}", err)
    }
}
