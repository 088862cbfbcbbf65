pub mod probe;
pub mod resolve;
pub mod staging;


use std::sync::Arc;

use camino::Utf8Path as Path;
use eyre::{Context, Result};
use tracing::{error, info, instrument, trace, warn};

use crate::{
    config::{Config, Limits},
    model::{
        repository::{self, AssetRecordStore},
        AssetKind, AssetSaved, Dimensions,
    },
    processing::{
        probe::{extract_dimensions, ContainerProbe, MediaAnalyzer, MediaMetadata},
        resolve::{resolve_access, AccessPlan},
        staging::{materialize, StagingArea},
    },
};

/// Save-notification handler that keeps video asset records stamped with
/// their pixel dimensions.
pub struct SaveHook {
    store: Arc<dyn AssetRecordStore>,
    analyzer: Arc<dyn MediaAnalyzer>,
    staging: StagingArea,
    limits: Limits,
}

impl SaveHook {
    pub fn new(
        store: Arc<dyn AssetRecordStore>,
        analyzer: Arc<dyn MediaAnalyzer>,
        config: Config,
    ) -> SaveHook {
        info!("video dimensions hook initialized");
        SaveHook {
            store,
            analyzer,
            staging: StagingArea::new(config.staging_dir),
            limits: config.limits,
        }
    }

    pub fn with_default_analyzer(store: Arc<dyn AssetRecordStore>, config: Config) -> SaveHook {
        SaveHook::new(store, Arc::new(ContainerProbe), config)
    }

    /// Host-facing entry point, called after every asset save. Best effort:
    /// every failure is logged here and swallowed, the host's save pipeline
    /// never fails because of dimension extraction.
    #[instrument(skip(self, event), fields(asset_id = %event.asset.id))]
    pub async fn on_asset_saved(&self, event: &AssetSaved) {
        if event.asset.kind != AssetKind::Video {
            return;
        }
        let dimensions = match self.process_video_asset(event).await {
            Ok(Some(dimensions)) => dimensions,
            Ok(None) => {
                trace!("no dimensions recovered, leaving asset untouched");
                return;
            }
            Err(err) => {
                warn!(%err, "error processing video dimensions");
                return;
            }
        };
        if let Err(err) =
            repository::store_dimensions(self.store.as_ref(), event.asset.id, dimensions).await
        {
            error!(%err, "could not store video dimensions");
        }
    }

    async fn process_video_asset(&self, event: &AssetSaved) -> Result<Option<Dimensions>> {
        let filesystem = event.filesystem.as_ref();
        let metadata = match resolve_access(&event.asset, &event.volume, filesystem) {
            AccessPlan::DirectPath(path) => self.analyze(&path).await?,
            AccessPlan::StreamPath(logical_path) => {
                let staged = materialize(
                    filesystem,
                    &logical_path,
                    &event.asset.filename,
                    &self.staging,
                    self.limits.download_timeout,
                )
                .await?;
                // staged is dropped, and its directory removed, as soon as
                // analysis is done, whichever way it went
                self.analyze(staged.path()).await?
            }
        };
        Ok(extract_dimensions(&metadata))
    }

    async fn analyze(&self, path: &Path) -> Result<MediaMetadata> {
        let metadata =
            tokio::time::timeout(self.limits.analyze_timeout, self.analyzer.analyze(path))
                .await
                .wrap_err("media analysis timed out")?
                .wrap_err("media analysis failed")?;
        Ok(metadata)
    }
}
