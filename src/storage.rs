use async_trait::async_trait;
use camino::{Utf8Path as Path, Utf8PathBuf as PathBuf};
use tokio::io::AsyncRead;
use tracing::instrument;

/// Capability contract for the storage backend behind a volume.
/// Local-disk backends expose the root directory they serve files from;
/// everything else (object stores, remote mounts) is only reachable as a
/// byte stream under a logical path.
#[async_trait]
pub trait Filesystem: Send + Sync {
    /// If this backend is a local filesystem, the root directory that volume
    /// paths are relative to. `None` for streaming backends.
    fn local_root(&self) -> Option<&Path>;

    async fn open_read_stream(
        &self,
        path: &str,
    ) -> Result<Box<dyn AsyncRead + Send + Unpin>, StreamReadError>;
}

#[derive(thiserror::Error, Debug)]
pub enum StreamReadError {
    #[error("no file with path '{0}'")]
    FileNotFound(String),
    #[error(transparent)]
    IOError {
        #[from]
        source: tokio::io::Error,
    },
    #[error(transparent)]
    Unknown {
        #[from]
        source: eyre::Report,
    },
}

#[derive(Debug, Clone)]
pub struct LocalFs {
    root: PathBuf,
}

impl LocalFs {
    pub fn new(root: PathBuf) -> LocalFs {
        LocalFs { root }
    }
}

#[async_trait]
impl Filesystem for LocalFs {
    fn local_root(&self) -> Option<&Path> {
        Some(&self.root)
    }

    #[instrument(skip(self), level = "debug")]
    async fn open_read_stream(
        &self,
        path: &str,
    ) -> Result<Box<dyn AsyncRead + Send + Unpin>, StreamReadError> {
        use tokio::io::ErrorKind;
        let open = tokio::fs::OpenOptions::new()
            .read(true)
            .open(self.root.join(path))
            .await;
        match open {
            Ok(f) => Ok(Box::new(f)),
            Err(err) => Err(match err.kind() {
                ErrorKind::NotFound => StreamReadError::FileNotFound(path.to_owned()),
                _ => StreamReadError::IOError { source: err },
            }),
        }
    }
}
