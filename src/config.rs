use std::time::Duration;

use camino::{Utf8Path as Path, Utf8PathBuf as PathBuf};
use color_eyre::eyre::{Context, Result};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
struct TomlStaging {
    pub dir: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
struct TomlLimits {
    pub download_timeout_secs: Option<u64>,
    pub analyze_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
struct TomlConfig {
    #[serde(rename = "Staging")]
    pub staging: Option<TomlStaging>,
    #[serde(rename = "Limits")]
    pub limits: Option<TomlLimits>,
}

/// Upper bounds on the blocking stages of a single asset pass, so a slow or
/// hostile streaming backend cannot stall the host's save pipeline forever.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    pub download_timeout: Duration,
    pub analyze_timeout: Duration,
}

impl Default for Limits {
    fn default() -> Limits {
        Limits {
            download_timeout: Duration::from_secs(60),
            analyze_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Root directory staged copies of remote assets are placed under
    pub staging_dir: PathBuf,
    pub limits: Limits,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            staging_dir: default_staging_dir(),
            limits: Limits::default(),
        }
    }
}

pub fn default_staging_dir() -> PathBuf {
    let tmp =
        PathBuf::from_path_buf(std::env::temp_dir()).expect("temp dir path should be utf8");
    tmp.join("video-dimensions")
}

pub async fn read_config(path: &Path) -> Result<Config> {
    let toml_str = tokio::fs::read_to_string(path)
        .await
        .context(format!("Error reading config file {}", path))?;
    let toml_config: TomlConfig = toml::from_str(&toml_str).context("Error parsing config file")?;
    let staging_dir = toml_config
        .staging
        .and_then(|staging| staging.dir)
        .map(PathBuf::from)
        .unwrap_or_else(default_staging_dir);
    let default_limits = Limits::default();
    let limits = match toml_config.limits {
        Some(limits) => Limits {
            download_timeout: limits
                .download_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(default_limits.download_timeout),
            analyze_timeout: limits
                .analyze_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(default_limits.analyze_timeout),
        },
        None => default_limits,
    };
    Ok(Config {
        staging_dir,
        limits,
    })
}
