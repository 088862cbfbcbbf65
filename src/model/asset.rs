use std::sync::Arc;

use camino::Utf8PathBuf as PathBuf;
use serde::Serialize;

use crate::storage::Filesystem;

use super::AssetId;

/// File kind tag assigned by the host when the asset was uploaded.
/// Everything except `Video` passes through the save hook untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Video,
    Image,
    Audio,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetInfo {
    pub id: AssetId,
    pub kind: AssetKind,
    pub filename: String,
    /// Path of the file relative to the volume it is stored in
    pub file_path: PathBuf,
}

/// A named storage location, pairing a filesystem backend with an optional
/// sub-path prefix inside that backend.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Volume {
    pub sub_path: Option<PathBuf>,
}

/// Notification delivered by the host after an asset was saved.
pub struct AssetSaved {
    pub asset: AssetInfo,
    pub volume: Volume,
    pub filesystem: Arc<dyn Filesystem>,
}

/// Pixel dimensions of a video stream. Only ever constructed with both
/// fields positive, there is no such thing as a partially known size.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Hash)]
pub struct Dimensions {
    pub width: i32,
    pub height: i32,
}
