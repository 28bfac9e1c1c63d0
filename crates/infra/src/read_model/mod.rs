//! In-memory stores backing the forecasting pipeline.
//!
//! Stand-ins for the application's database: inventory history on one side,
//! forecast records (upserted by product and date) on the other.

pub mod forecast_store;
pub mod inventory_store;

pub use forecast_store::InMemoryForecastStore;
pub use inventory_store::InMemoryInventory;
