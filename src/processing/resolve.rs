use camino::{Utf8Path as Path, Utf8PathBuf as PathBuf};

use crate::{
    model::{AssetInfo, Volume},
    storage::Filesystem,
};

/// How the bytes of an asset can be reached for analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessPlan {
    /// The file sits on a local disk and can be read in place
    DirectPath(PathBuf),
    /// The file must be streamed from its backend under this logical path
    StreamPath(String),
}

/// Decides how to get at the bytes of `asset`. Pure path arithmetic, no I/O:
/// whether a direct path actually exists is only discovered when the
/// analyzer opens it.
pub fn resolve_access(
    asset: &AssetInfo,
    volume: &Volume,
    filesystem: &dyn Filesystem,
) -> AccessPlan {
    match filesystem.local_root() {
        Some(root) => {
            let mut path = root.to_owned();
            if let Some(sub_path) = &volume.sub_path {
                path.push(sub_path);
            }
            path.push(&asset.file_path);
            AccessPlan::DirectPath(normalize_path(path.as_str()))
        }
        None => match &volume.sub_path {
            Some(sub_path) if !is_segment_prefix(sub_path, &asset.file_path) => {
                AccessPlan::StreamPath(format!(
                    "{}/{}",
                    sub_path.as_str().trim_end_matches('/'),
                    asset.file_path
                ))
            }
            _ => AccessPlan::StreamPath(asset.file_path.as_str().to_owned()),
        },
    }
}

/// True if every path segment of `prefix` matches the leading segments of
/// `path`. A plain substring check would also accept `sub` as a prefix of
/// `subdir/file.mp4` and leave such paths without their volume prefix.
fn is_segment_prefix(prefix: &Path, path: &Path) -> bool {
    let mut path_components = path.components();
    for prefix_component in prefix.components() {
        if path_components.next() != Some(prefix_component) {
            return false;
        }
    }
    true
}

/// Joins happen with whatever separators the host hands us; backslashes,
/// doubled separators and `.` segments are flattened so the resulting local
/// path opens cleanly.
fn normalize_path(path: &str) -> PathBuf {
    let forward = path.replace('\\', "/");
    let mut normalized = String::with_capacity(forward.len());
    if forward.starts_with('/') {
        normalized.push('/');
    }
    let mut first = true;
    for segment in forward.split('/').filter(|s| !s.is_empty() && *s != ".") {
        if !first {
            normalized.push('/');
        }
        normalized.push_str(segment);
        first = false;
    }
    PathBuf::from(normalized)
}
