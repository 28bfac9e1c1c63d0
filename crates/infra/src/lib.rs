//! Infrastructure layer: stores, artifact persistence, settings.

pub mod artifact;
pub mod config;
pub mod movements;
pub mod read_model;
pub mod snapshot;


pub use artifact::{FileArtifactStore, InMemoryArtifactStore};
pub use config::{ForecastSettings, SettingsError};
pub use movements::MovementError;
pub use read_model::{InMemoryForecastStore, InMemoryInventory};
pub use snapshot::{InventorySnapshot, SnapshotError};
