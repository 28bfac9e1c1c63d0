//! Inventory records consumed by the forecasting pipeline.
//!
//! Products, outflows (withdrawals) and inflows (replenishments), plus the
//! deterministic stock/cost rules applied when movements are recorded.
//! No IO, no storage.

pub mod inflow;
pub mod outflow;
pub mod product;

pub use inflow::Inflow;
pub use outflow::Outflow;
pub use product::Product;
