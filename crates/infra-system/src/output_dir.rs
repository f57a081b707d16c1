// Output directory preparation (optional clean, then create)

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum OutputDirError {
    #[error("failed to clean output directory '{path}': {source}")]
    Clean {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to create output directory '{path}': {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Make sure `path` exists, removing it recursively first when `clean` is set
pub async fn prepare_output_dir(path: &Path, clean: bool) -> Result<(), OutputDirError> {
    if clean {
        info!(path = %path.display(), "Cleaning output directory");
        match tokio::fs::remove_dir_all(path).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(source) => {
                return Err(OutputDirError::Clean {
                    path: path.to_path_buf(),
                    source,
                })
            }
        }
    }

    tokio::fs::create_dir_all(path)
        .await
        .map_err(|source| OutputDirError::Create {
            path: path.to_path_buf(),
            source,
        })
}
