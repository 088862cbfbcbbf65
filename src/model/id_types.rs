use serde::Serialize;
use std::fmt::Display;

/// Database id of an asset record in the host's persistence layer
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Copy, Hash, Serialize)]
pub struct AssetId(pub i64);

impl From<i64> for AssetId {
    fn from(value: i64) -> Self {
        AssetId(value)
    }
}

impl Display for AssetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("AssetId({})", self.0))
    }
}
