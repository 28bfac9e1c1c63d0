//! Stock movement recording with forecast-accuracy follow-up.
//!
//! Recording or deleting an outflow changes the actual demand for that day,
//! so the matching forecast's `daily_mape` is recomputed right after.

use std::sync::Arc;

use thiserror::Error;
use tracing::warn;

use stockcast_core::{DomainError, OutflowId};
use stockcast_forecast::{ArtifactStore, ForecastEngine, ForecastError, ForecastStore};
use stockcast_inventory::{Inflow, Outflow};

use crate::read_model::InMemoryInventory;

#[derive(Debug, Error)]
pub enum MovementError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Forecast(#[from] ForecastError),
}

pub type InventoryEngine<F, A> = ForecastEngine<Arc<InMemoryInventory>, F, A>;

/// Record an outflow, then refresh the day's forecast accuracy.
///
/// Returns the refreshed `daily_mape` (if a forecast exists for that day).
pub fn record_outflow<F, A>(engine: &InventoryEngine<F, A>, outflow: Outflow) -> Result<Option<f64>, MovementError>
where
    F: ForecastStore,
    A: ArtifactStore,
{
    let (product_id, date) = (outflow.product_id, outflow.date());
    engine.inventory().record_outflow(outflow)?;
    refresh(engine, product_id, date)
}

/// Delete an outflow, then refresh the day's forecast accuracy.
pub fn remove_outflow<F, A>(engine: &InventoryEngine<F, A>, outflow_id: OutflowId) -> Result<Option<f64>, MovementError>
where
    F: ForecastStore,
    A: ArtifactStore,
{
    let removed = engine.inventory().remove_outflow(outflow_id)?;
    refresh(engine, removed.product_id, removed.date())
}

/// Record an inflow. Forecast accuracy only tracks outflows, so nothing else runs.
pub fn record_inflow<F, A>(engine: &InventoryEngine<F, A>, inflow: Inflow) -> Result<(), MovementError>
where
    F: ForecastStore,
    A: ArtifactStore,
{
    engine.inventory().record_inflow(inflow)?;
    Ok(())
}

fn refresh<F, A>(
    engine: &InventoryEngine<F, A>,
    product_id: stockcast_core::ProductId,
    date: chrono::NaiveDate,
) -> Result<Option<f64>, MovementError>
where
    F: ForecastStore,
    A: ArtifactStore,
{
    // The movement is already stored; a failed refresh only leaves a stale metric.
    engine.refresh_daily_mape(product_id, date).map_err(|e| {
        warn!(product = %product_id, %date, error = %e, "daily mape refresh failed");
        MovementError::from(e)
    })
}
