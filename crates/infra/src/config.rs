//! Forecast settings: where the trained artifact lives.
//!
//! Sources, lowest to highest precedence:
//! 1. Defaults (`base_dir = "."`)
//! 2. Optional TOML file
//! 3. Environment variables with the `STOCKCAST_` prefix
//!
//! ```bash
//! export STOCKCAST_BASE_DIR=/var/lib/stockcast
//! export STOCKCAST_ARTIFACT_PATH=/var/lib/stockcast/models/current.json
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::artifact::FileArtifactStore;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings file {0} does not exist")]
    MissingFile(PathBuf),

    #[error(transparent)]
    Config(#[from] config::ConfigError),
}

fn default_base_dir() -> PathBuf {
    PathBuf::from(".")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastSettings {
    /// Application base directory; the default artifact lives beneath it.
    #[serde(default = "default_base_dir")]
    pub base_dir: PathBuf,

    /// Explicit artifact location, overriding the default under `base_dir`.
    #[serde(default)]
    pub artifact_path: Option<PathBuf>,
}

impl Default for ForecastSettings {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
            artifact_path: None,
        }
    }
}

impl ForecastSettings {
    pub fn load(file: Option<&Path>) -> Result<Self, SettingsError> {
        let mut builder = config::Config::builder().set_default("base_dir", ".")?;

        if let Some(path) = file {
            if !path.exists() {
                return Err(SettingsError::MissingFile(path.to_path_buf()));
            }
            builder = builder.add_source(config::File::from(path));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("STOCKCAST")
                .prefix_separator("_")
                .try_parsing(true),
        );

        Ok(builder.build()?.try_deserialize()?)
    }

    /// Resolved artifact location.
    pub fn artifact_path(&self) -> PathBuf {
        self.artifact_path
            .clone()
            .unwrap_or_else(|| self.base_dir.join("forecast").join("trained_model.json"))
    }

    pub fn artifact_store(&self) -> FileArtifactStore {
        FileArtifactStore::new(self.artifact_path())
    }
}
