//! `stockcast-forecast`
//!
//! **Responsibility:** demand forecasting over inventory history.
//!
//! - Builds a fixed-shape feature table per product from stock, prices and
//!   outflow history.
//! - Trains a gradient-boosted regression-tree model behind a standard scaler
//!   and persists both as one artifact.
//! - Expands per-product predictions over a cadence-filtered horizon and
//!   upserts them as forecast records.
//!
//! Storage is behind the traits in [`ports`]; this crate performs no IO itself.

pub mod accuracy;
pub mod artifact;
pub mod engine;
pub mod error;
pub mod features;
pub mod gbt;
pub mod metrics;
pub mod ports;
pub mod record;
pub mod scaler;
pub mod schedule;
pub mod split;

pub use accuracy::{ForecastSummary, daily_mape};
pub use artifact::{ARTIFACT_FORMAT_VERSION, ArtifactMetadata, TrainedArtifact};
pub use engine::{ForecastEngine, TrainingParams};
pub use error::{ArtifactError, ForecastError, StoreError};
pub use features::{FEATURE_COUNT, FEATURE_NAMES, FeatureBuilder, FeatureVector, PredictionRow, TrainingRow};
pub use gbt::{BoostingParams, GradientBoostedRegressor};
pub use metrics::Metrics;
pub use ports::{ArtifactStore, ForecastStore, InventoryReader};
pub use record::{Forecast, UpsertOutcome};
pub use scaler::StandardScaler;
pub use schedule::{Cadence, ForecastConfig};
