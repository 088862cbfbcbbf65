use async_trait::async_trait;
use eyre::Result;
use tracing::{instrument, trace};

use super::{AssetId, Dimensions};

/// Handle to a mutable asset record loaded from the host's persistence
/// layer.
#[async_trait]
pub trait AssetRecord: Send {
    fn set_dimensions(&mut self, dimensions: Dimensions);

    /// Persist the record. Returns false if the host rejected the write
    /// during validation.
    async fn save(&mut self, validate: bool) -> Result<bool>;
}

/// The host's asset persistence layer.
#[async_trait]
pub trait AssetRecordStore: Send + Sync {
    async fn load(&self, id: AssetId) -> Result<Option<Box<dyn AssetRecord>>>;
}

#[derive(thiserror::Error, Debug)]
pub enum UpdateError {
    #[error("host rejected dimension update for {0}")]
    Rejected(AssetId),
    #[error(transparent)]
    Unknown {
        #[from]
        source: eyre::Report,
    },
}

/// Writes recovered dimensions through to the asset record. This is the only
/// place that mutates host-visible state. A record that no longer exists is
/// not an error, the asset was deleted while we were analyzing.
#[instrument(skip(store))]
pub async fn store_dimensions(
    store: &dyn AssetRecordStore,
    id: AssetId,
    dimensions: Dimensions,
) -> Result<(), UpdateError> {
    let mut record = match store.load(id).await? {
        Some(record) => record,
        None => {
            trace!(%id, "asset record gone, skipping dimension update");
            return Ok(());
        }
    };
    record.set_dimensions(dimensions);
    if !record.save(true).await? {
        return Err(UpdateError::Rejected(id));
    }
    Ok(())
}
