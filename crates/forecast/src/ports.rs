//! Storage boundaries of the forecasting pipeline.
//!
//! The pipeline stays storage-agnostic: inventory history, forecast records
//! and the trained artifact are provided by callers (see `stockcast-infra`).

use std::sync::Arc;

use chrono::NaiveDate;

use stockcast_core::ProductId;
use stockcast_inventory::{Outflow, Product};

use crate::artifact::TrainedArtifact;
use crate::error::{ArtifactError, StoreError};
use crate::record::{Forecast, UpsertOutcome};

/// Read access to products and their outflow history.
pub trait InventoryReader: Send + Sync {
    /// All products, in a stable order.
    fn products(&self) -> Result<Vec<Product>, StoreError>;

    /// All recorded outflows.
    fn outflows(&self) -> Result<Vec<Outflow>, StoreError>;

    fn product(&self, product_id: ProductId) -> Result<Option<Product>, StoreError> {
        Ok(self.products()?.into_iter().find(|p| p.id == product_id))
    }

    fn outflows_for(&self, product_id: ProductId) -> Result<Vec<Outflow>, StoreError> {
        Ok(self
            .outflows()?
            .into_iter()
            .filter(|o| o.product_id == product_id)
            .collect())
    }
}

/// Forecast persistence with upsert-by-(product, date) semantics.
pub trait ForecastStore: Send + Sync {
    /// Insert or replace the record for `forecast.key()`.
    fn upsert(&self, forecast: Forecast) -> Result<UpsertOutcome, StoreError>;

    fn get(&self, product_id: ProductId, date: NaiveDate) -> Result<Option<Forecast>, StoreError>;

    /// Records with `start <= date <= end`, ordered by product then date.
    fn list_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Forecast>, StoreError>;

    /// Update only `daily_mape`. Returns `false` when no record exists.
    fn set_daily_mape(
        &self,
        product_id: ProductId,
        date: NaiveDate,
        daily_mape: Option<f64>,
    ) -> Result<bool, StoreError>;
}

/// Location holding the single trained artifact.
pub trait ArtifactStore: Send + Sync {
    /// Human-readable location (path or label) for logs.
    fn location(&self) -> String;

    fn exists(&self) -> Result<bool, ArtifactError>;

    fn load(&self) -> Result<Option<TrainedArtifact>, ArtifactError>;

    /// Replace the stored artifact. Readers must never observe a partial write.
    fn save(&self, artifact: &TrainedArtifact) -> Result<(), ArtifactError>;
}

impl<S> InventoryReader for Arc<S>
where
    S: InventoryReader + ?Sized,
{
    fn products(&self) -> Result<Vec<Product>, StoreError> {
        (**self).products()
    }

    fn outflows(&self) -> Result<Vec<Outflow>, StoreError> {
        (**self).outflows()
    }

    fn product(&self, product_id: ProductId) -> Result<Option<Product>, StoreError> {
        (**self).product(product_id)
    }

    fn outflows_for(&self, product_id: ProductId) -> Result<Vec<Outflow>, StoreError> {
        (**self).outflows_for(product_id)
    }
}

impl<S> ForecastStore for Arc<S>
where
    S: ForecastStore + ?Sized,
{
    fn upsert(&self, forecast: Forecast) -> Result<UpsertOutcome, StoreError> {
        (**self).upsert(forecast)
    }

    fn get(&self, product_id: ProductId, date: NaiveDate) -> Result<Option<Forecast>, StoreError> {
        (**self).get(product_id, date)
    }

    fn list_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Forecast>, StoreError> {
        (**self).list_range(start, end)
    }

    fn set_daily_mape(
        &self,
        product_id: ProductId,
        date: NaiveDate,
        daily_mape: Option<f64>,
    ) -> Result<bool, StoreError> {
        (**self).set_daily_mape(product_id, date, daily_mape)
    }
}

impl<S> ArtifactStore for Arc<S>
where
    S: ArtifactStore + ?Sized,
{
    fn location(&self) -> String {
        (**self).location()
    }

    fn exists(&self) -> Result<bool, ArtifactError> {
        (**self).exists()
    }

    fn load(&self) -> Result<Option<TrainedArtifact>, ArtifactError> {
        (**self).load()
    }

    fn save(&self, artifact: &TrainedArtifact) -> Result<(), ArtifactError> {
        (**self).save(artifact)
    }
}
