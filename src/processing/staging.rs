use std::time::Duration;

use camino::{Utf8Path as Path, Utf8PathBuf as PathBuf};
use tracing::instrument;

use crate::storage::{Filesystem, StreamReadError};

/// Process-wide root under which staged copies of remote assets are placed.
/// Created lazily and shared by all invocations; every staged file lives in
/// its own uniquely named directory below it so concurrent saves cannot
/// collide on equal filenames.
#[derive(Debug, Clone)]
pub struct StagingArea {
    root: PathBuf,
}

impl StagingArea {
    pub fn new(root: PathBuf) -> StagingArea {
        StagingArea { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// A remote asset materialized to a local file. The backing directory is
/// removed when this is dropped, on success and failure paths alike.
#[derive(Debug)]
pub struct StagedFile {
    path: PathBuf,
    // owns the directory so dropping the handle removes file and directory
    // together
    _dir: tempfile::TempDir,
}

impl StagedFile {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[derive(thiserror::Error, Debug)]
pub enum StagingError {
    #[error("no byte stream available for '{0}'")]
    StreamUnavailable(String),
    #[error("timed out reading stream for '{0}'")]
    Timeout(String),
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

/// Pulls `logical_path` from a streaming backend into a local file so the
/// analyzer can use plain file I/O no matter where the asset lives.
#[instrument(skip(filesystem, staging))]
pub async fn materialize(
    filesystem: &dyn Filesystem,
    logical_path: &str,
    filename: &str,
    staging: &StagingArea,
    timeout: Duration,
) -> Result<StagedFile, StagingError> {
    let mut stream = match filesystem.open_read_stream(logical_path).await {
        Ok(stream) => stream,
        Err(StreamReadError::FileNotFound(path)) => {
            return Err(StagingError::StreamUnavailable(path))
        }
        Err(StreamReadError::IOError { source }) => return Err(source.into()),
        Err(StreamReadError::Unknown { source }) => return Err(source.into()),
    };
    tokio::fs::create_dir_all(staging.root()).await?;
    let dir = tempfile::Builder::new()
        .prefix("staged-")
        .tempdir_in(staging.root())?;
    let dir_path = Path::from_path(dir.path()).expect("temp dir paths should be utf8");
    // hosts hand us bare filenames, but never trust one with separators in it
    let filename = Path::new(filename).file_name().unwrap_or("staged-asset");
    let path = dir_path.join(filename);
    let mut file = tokio::fs::File::create(&path).await?;
    match tokio::time::timeout(timeout, tokio::io::copy(&mut stream, &mut file)).await {
        Ok(Ok(_bytes_copied)) => {}
        Ok(Err(err)) => return Err(err.into()),
        Err(_elapsed) => return Err(StagingError::Timeout(logical_path.to_owned())),
    }
    drop(file);
    Ok(StagedFile { path, _dir: dir })
}
