use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use stockcast_core::ProductId;

/// Predicted demand for one product on one day.
///
/// At most one record exists per `(product_id, date)`; writers upsert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub product_id: ProductId,
    pub date: NaiveDate,
    /// Never negative; rounded to whole units.
    pub predicted_quantity: u64,
    /// Test-set MAPE (percent) of the model that produced the prediction.
    pub mape: Option<f64>,
    /// MAPE (percent) against outflows actually recorded on `date`.
    pub daily_mape: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl Forecast {
    pub fn key(&self) -> (ProductId, NaiveDate) {
        (self.product_id, self.date)
    }
}

/// Whether an upsert inserted a new record or replaced an existing one.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
}
