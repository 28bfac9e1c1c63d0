use std::collections::BTreeMap;
use std::sync::RwLock;

use chrono::NaiveDate;

use stockcast_core::ProductId;
use stockcast_forecast::{Forecast, ForecastStore, StoreError, UpsertOutcome};

/// In-memory forecast table keyed by (product, date).
///
/// Ordered by product then date, matching how reports list forecasts.
#[derive(Debug, Default)]
pub struct InMemoryForecastStore {
    inner: RwLock<BTreeMap<(ProductId, NaiveDate), Forecast>>,
}

impl InMemoryForecastStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Result<Vec<Forecast>, StoreError> {
        let map = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        Ok(map.values().cloned().collect())
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ForecastStore for InMemoryForecastStore {
    fn upsert(&self, mut forecast: Forecast) -> Result<UpsertOutcome, StoreError> {
        let mut map = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        match map.get(&forecast.key()) {
            Some(existing) => {
                // Creation time belongs to the first write.
                forecast.created_at = existing.created_at;
                map.insert(forecast.key(), forecast);
                Ok(UpsertOutcome::Updated)
            }
            None => {
                map.insert(forecast.key(), forecast);
                Ok(UpsertOutcome::Created)
            }
        }
    }

    fn get(&self, product_id: ProductId, date: NaiveDate) -> Result<Option<Forecast>, StoreError> {
        let map = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        Ok(map.get(&(product_id, date)).cloned())
    }

    fn list_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Forecast>, StoreError> {
        let map = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        Ok(map
            .values()
            .filter(|f| f.date >= start && f.date <= end)
            .cloned()
            .collect())
    }

    fn set_daily_mape(
        &self,
        product_id: ProductId,
        date: NaiveDate,
        daily_mape: Option<f64>,
    ) -> Result<bool, StoreError> {
        let mut map = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        match map.get_mut(&(product_id, date)) {
            Some(f) => {
                f.daily_mape = daily_mape;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
