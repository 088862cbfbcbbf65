mod avi;
mod mkv;
mod mp4;

#[cfg(test)]
pub(crate) mod fixtures;

use std::{
    fmt::Display,
    io::{Read, Seek, SeekFrom},
    time::Duration,
};

use async_trait::async_trait;
use camino::Utf8Path as Path;
use tracing::instrument;

use crate::model::Dimensions;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerFormat {
    Mp4,
    Matroska,
    Avi,
}

impl Display for ContainerFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ContainerFormat::Mp4 => "mp4",
            ContainerFormat::Matroska => "matroska",
            ContainerFormat::Avi => "avi",
        })
    }
}

/// Container header information of one media file. Produced fresh for every
/// analysis call and discarded right after dimension extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaMetadata {
    pub container: ContainerFormat,
    pub duration: Option<Duration>,
    pub tracks: Vec<TrackMeta>,
}

impl MediaMetadata {
    /// First video track, if the container declares one
    pub fn video(&self) -> Option<&VideoTrackMeta> {
        self.tracks.iter().find_map(|track| match track {
            TrackMeta::Video(video) => Some(video),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TrackMeta {
    Video(VideoTrackMeta),
    Audio(AudioTrackMeta),
}

/// Resolution fields are individually optional: containers can declare a
/// video track without usable size information, and the two fields only
/// become a [`Dimensions`] together.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VideoTrackMeta {
    pub codec: Option<String>,
    pub resolution_x: Option<i64>,
    pub resolution_y: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AudioTrackMeta {
    pub codec: Option<String>,
    pub channels: Option<i64>,
}

#[derive(thiserror::Error, Debug)]
pub enum AnalyzeError {
    #[error("unrecognized container format")]
    UnrecognizedContainer,
    #[error("could not parse {container} container: {reason}")]
    Parse {
        container: ContainerFormat,
        reason: String,
    },
    #[error("analyzer task failed")]
    TaskFailed {
        #[from]
        source: tokio::task::JoinError,
    },
    #[error(transparent)]
    IOError {
        #[from]
        source: std::io::Error,
    },
}

/// Parses container headers of a local media file. Implementations must be
/// safe to share between concurrent asset saves.
#[async_trait]
pub trait MediaAnalyzer: Send + Sync {
    async fn analyze(&self, path: &Path) -> Result<MediaMetadata, AnalyzeError>;
}

/// Header-only parser for the mainstream video containers: MP4/MOV family,
/// Matroska/WebM and AVI. Reads no sample data and never modifies the file.
/// Stateless, so one instance can serve any number of concurrent calls.
#[derive(Debug, Clone, Default)]
pub struct ContainerProbe;

#[async_trait]
impl MediaAnalyzer for ContainerProbe {
    #[instrument(skip(self))]
    async fn analyze(&self, path: &Path) -> Result<MediaMetadata, AnalyzeError> {
        let path = path.to_owned();
        tokio::task::spawn_blocking(move || analyze_file(&path)).await?
    }
}

fn analyze_file(path: &Path) -> Result<MediaMetadata, AnalyzeError> {
    let mut file = std::fs::File::open(path)?;
    let container = detect_container(&mut file)?;
    file.seek(SeekFrom::Start(0))?;
    match container {
        ContainerFormat::Mp4 => mp4::parse(&mut file),
        ContainerFormat::Matroska => mkv::parse(file),
        ContainerFormat::Avi => avi::parse(&mut file),
    }
}

const EBML_MAGIC: [u8; 4] = [0x1A, 0x45, 0xDF, 0xA3];

fn detect_container(reader: &mut impl Read) -> Result<ContainerFormat, AnalyzeError> {
    let mut magic = [0u8; 12];
    if reader.read_exact(&mut magic).is_err() {
        // too short to even hold a container signature
        return Err(AnalyzeError::UnrecognizedContainer);
    }
    if &magic[0..4] == b"RIFF" && &magic[8..12] == b"AVI " {
        Ok(ContainerFormat::Avi)
    } else if magic[0..4] == EBML_MAGIC {
        Ok(ContainerFormat::Matroska)
    } else if &magic[4..8] == b"ftyp" {
        Ok(ContainerFormat::Mp4)
    } else {
        Err(AnalyzeError::UnrecognizedContainer)
    }
}

/// Narrows analyzer output down to a width/height pair. `Some` only if the
/// file has a video track with both resolution fields present and positive,
/// a partial pair is never produced.
pub fn extract_dimensions(metadata: &MediaMetadata) -> Option<Dimensions> {
    let video = metadata.video()?;
    match (video.resolution_x, video.resolution_y) {
        (Some(width), Some(height))
            if (1..=i64::from(i32::MAX)).contains(&width)
                && (1..=i64::from(i32::MAX)).contains(&height) =>
        {
            Some(Dimensions {
                width: width as i32,
                height: height as i32,
            })
        }
        _ => None,
    }
}
