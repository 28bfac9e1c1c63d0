use std::sync::Mutex;

use chrono::{NaiveDate, Utc};
use tracing::{debug, info, warn};

use stockcast_core::ProductId;

use crate::accuracy::{self, ForecastSummary, daily_actuals, daily_mape};
use crate::artifact::{ArtifactMetadata, TrainedArtifact, feature_names};
use crate::error::{ArtifactError, ForecastError};
use crate::features::{FeatureBuilder, FeatureVector};
use crate::gbt::{BoostingParams, GradientBoostedRegressor};
use crate::metrics::Metrics;
use crate::ports::{ArtifactStore, ForecastStore, InventoryReader};
use crate::record::Forecast;
use crate::scaler::StandardScaler;
use crate::schedule::ForecastConfig;
use crate::split::{Split, train_test_split};

/// Knobs for model fitting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingParams {
    pub boosting: BoostingParams,
    /// Share of rows held out for evaluation, in percent.
    pub test_percent: u32,
    pub split_seed: u64,
}

impl Default for TrainingParams {
    fn default() -> Self {
        Self {
            boosting: BoostingParams::default(),
            test_percent: 20,
            split_seed: 42,
        }
    }
}

/// Trains the demand model and turns its predictions into forecast records.
///
/// Artifact lifecycle: `absent -> train -> present`, and `present -> train ->
/// present (replaced)`. Training calls are serialized; artifact replacement
/// atomicity is the artifact store's contract.
pub struct ForecastEngine<R, F, A> {
    inventory: R,
    forecasts: F,
    artifacts: A,
    params: TrainingParams,
    train_lock: Mutex<()>,
}

impl<R, F, A> ForecastEngine<R, F, A>
where
    R: InventoryReader,
    F: ForecastStore,
    A: ArtifactStore,
{
    pub fn new(inventory: R, forecasts: F, artifacts: A) -> Self {
        Self {
            inventory,
            forecasts,
            artifacts,
            params: TrainingParams::default(),
            train_lock: Mutex::new(()),
        }
    }

    pub fn with_params(mut self, params: TrainingParams) -> Self {
        self.params = params;
        self
    }

    pub fn inventory(&self) -> &R {
        &self.inventory
    }

    pub fn forecasts(&self) -> &F {
        &self.forecasts
    }

    pub fn artifacts(&self) -> &A {
        &self.artifacts
    }

    /// Fit a fresh model and replace the stored artifact.
    ///
    /// `Ok(None)` means training was not performed (no products, no outflow
    /// history, or too few rows to hold out a test set); nothing is written.
    pub fn train(&self, include_promotions: bool) -> Result<Option<Metrics>, ForecastError> {
        let _guard = self.lock_training()?;
        self.fit_and_store(include_promotions)
    }

    /// Train only if no artifact exists yet. Returns whether one is available.
    pub fn ensure_trained(&self, include_promotions: bool) -> Result<bool, ForecastError> {
        if self.artifacts.exists()? {
            return Ok(true);
        }
        let _guard = self.lock_training()?;
        // Another caller may have trained while we waited.
        if self.artifacts.exists()? {
            return Ok(true);
        }
        info!(location = %self.artifacts.location(), "no trained artifact; training before forecasting");
        Ok(self.fit_and_store(include_promotions)?.is_some())
    }

    /// Forecast every product over the configured horizon and upsert the results.
    ///
    /// Returns the number of (product, date) records written; 0 when there is
    /// no config, no products, or not enough history to train.
    pub fn run(&self, config: Option<&ForecastConfig>) -> Result<usize, ForecastError> {
        let Some(config) = config else {
            debug!("no forecast config; nothing to do");
            return Ok(0);
        };
        let products = self.inventory.products()?;
        if products.is_empty() {
            debug!("no products; nothing to forecast");
            return Ok(0);
        }
        config.validate()?;

        if !self.ensure_trained(config.include_promotions)? {
            warn!("model could not be trained (insufficient data); no forecasts written");
            return Ok(0);
        }

        let artifact = self.artifacts.load()?.ok_or_else(|| {
            ArtifactError::Storage(format!(
                "artifact missing at {} after training",
                self.artifacts.location()
            ))
        })?;

        if artifact.metadata.include_promotions != config.include_promotions {
            debug!(
                trained_with = artifact.metadata.include_promotions,
                requested = config.include_promotions,
                "promotion setting differs from the one the model was trained with"
            );
        }

        let dates = config.forecast_dates();
        if dates.is_empty() {
            if config.cadence.is_recognized() {
                debug!(cadence = %config.cadence, "cadence admits no dates in the horizon");
            } else {
                warn!(cadence = %config.cadence, "unrecognized cadence; no dates match");
            }
            return Ok(0);
        }

        let outflows = self.inventory.outflows()?;
        let rows = FeatureBuilder::new(config.include_promotions).prediction_rows(&products, &outflows);
        let actuals = daily_actuals(&outflows);
        let model_mape = artifact.metadata.metrics.mape;
        let now = Utc::now();

        let mut written = 0usize;
        for row in &rows {
            let predicted = artifact.predict_units(&row.features);
            for &date in &dates {
                let actual = actuals.get(&(row.product_id, date)).copied().unwrap_or(0);
                self.forecasts.upsert(Forecast {
                    product_id: row.product_id,
                    date,
                    predicted_quantity: predicted,
                    mape: Some(model_mape),
                    daily_mape: daily_mape(actual, predicted),
                    created_at: now,
                })?;
                written += 1;
            }
        }

        info!(
            products = rows.len(),
            dates = dates.len(),
            written,
            cadence = %config.cadence,
            start = %config.start_date,
            "forecasts generated"
        );
        Ok(written)
    }

    /// Recompute `daily_mape` for one forecast after its day's outflows changed.
    ///
    /// Returns the new value; `None` when there is no forecast or no sales.
    pub fn refresh_daily_mape(
        &self,
        product_id: ProductId,
        date: NaiveDate,
    ) -> Result<Option<f64>, ForecastError> {
        let Some(forecast) = self.forecasts.get(product_id, date)? else {
            return Ok(None);
        };
        let actual: i64 = self
            .inventory
            .outflows_for(product_id)?
            .iter()
            .filter(|o| o.date() == date)
            .map(|o| o.quantity)
            .sum();
        let value = daily_mape(actual, forecast.predicted_quantity);
        self.forecasts.set_daily_mape(product_id, date, value)?;
        debug!(product = %product_id, %date, actual, ?value, "daily mape refreshed");
        Ok(value)
    }

    /// Headline numbers for forecasts dated within `[start, end]`.
    pub fn summarize(&self, start: NaiveDate, end: NaiveDate) -> Result<ForecastSummary, ForecastError> {
        let forecasts = self.forecasts.list_range(start, end)?;
        let products = self.inventory.products()?;
        let outflows = self.inventory.outflows()?;
        Ok(accuracy::summarize(start, end, &forecasts, &products, &outflows))
    }

    fn lock_training(&self) -> Result<std::sync::MutexGuard<'_, ()>, ForecastError> {
        self.train_lock
            .lock()
            .map_err(|_| ForecastError::Internal("training lock poisoned".to_string()))
    }

    fn fit_and_store(&self, include_promotions: bool) -> Result<Option<Metrics>, ForecastError> {
        let products = self.inventory.products()?;
        if products.is_empty() {
            info!("no products found; training skipped");
            return Ok(None);
        }
        let outflows = self.inventory.outflows()?;
        if outflows.is_empty() {
            info!("no outflow history; training skipped");
            return Ok(None);
        }

        let rows = FeatureBuilder::new(include_promotions).training_rows(&products, &outflows);
        let Some(split) = train_test_split(rows.len(), self.params.test_percent, self.params.split_seed) else {
            info!(rows = rows.len(), "too few rows for a train/test split; training skipped");
            return Ok(None);
        };

        let features: Vec<FeatureVector> = rows.iter().map(|r| r.features).collect();
        let targets: Vec<f64> = rows.iter().map(|r| r.target).collect();

        let scaler = StandardScaler::fit(&features)?;
        let scaled = scaler.transform_all(&features);

        let x_train = Split::gather(&split.train, &scaled);
        let y_train = Split::gather(&split.train, &targets);
        let x_test = Split::gather(&split.test, &scaled);
        let y_test = Split::gather(&split.test, &targets);

        let model = GradientBoostedRegressor::fit(&x_train, &y_train, self.params.boosting)?;
        let metrics = Metrics::evaluate(&y_test, &model.predict_all(&x_test));

        let artifact = TrainedArtifact::new(
            model,
            scaler,
            ArtifactMetadata {
                feature_names: feature_names(),
                include_promotions,
                metrics,
                train_rows: x_train.len(),
                test_rows: x_test.len(),
                trained_at: Utc::now(),
            },
        );
        self.artifacts.save(&artifact)?;

        info!(
            mae = metrics.mae,
            rmse = metrics.rmse,
            r2 = metrics.r2,
            mape = metrics.mape,
            train_rows = x_train.len(),
            test_rows = x_test.len(),
            location = %self.artifacts.location(),
            "forecast model trained"
        );
        Ok(Some(metrics))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Artifact whose model predicts `value` for every input.
    fn constant_artifact(value: f64) -> TrainedArtifact {
        let x = vec![[0.0, 1.0, 2.0, 0.0, 0.0], [4.0, 3.0, 5.0, 6.0, 1.0]];
        let scaler = StandardScaler::fit(&x).unwrap();
        let params = BoostingParams {
            n_estimators: 3,
            ..BoostingParams::default()
        };
        let model = GradientBoostedRegressor::fit(&scaler.transform_all(&x), &[value, value], params).unwrap();
        TrainedArtifact::new(
            model,
            scaler,
            ArtifactMetadata {
                feature_names: feature_names(),
                include_promotions: true,
                metrics: Metrics::evaluate(&[], &[]),
                train_rows: 2,
                test_rows: 0,
                trained_at: Utc::now(),
            },
        )
    }

    fn units_for(value: f64) -> u64 {
        constant_artifact(value).predict_units(&[1.0, 2.0, 3.0, 4.0, 0.0])
    }

    #[test]
    fn negative_predictions_clamp_to_zero() {
        assert_eq!(units_for(-3.2), 0);
        assert_eq!(units_for(-0.4), 0);
        assert_eq!(units_for(0.0), 0);
    }

    #[test]
    fn fractional_predictions_round_to_nearest() {
        assert_eq!(units_for(2.4), 2);
        assert_eq!(units_for(2.5), 3);
        assert_eq!(units_for(2.6), 3);
        assert_eq!(units_for(0.4), 0);
    }

    #[test]
    fn non_finite_predictions_become_zero() {
        assert_eq!(units_for(f64::NAN), 0);
        assert_eq!(units_for(f64::NEG_INFINITY), 0);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn units_are_the_clamped_rounded_prediction(value in -1_000.0f64..1_000.0) {
            let artifact = constant_artifact(value);
            let raw = artifact.predict(&[0.0; 5]);
            let expected = if raw <= 0.0 { 0 } else { raw.round() as u64 };
            prop_assert_eq!(artifact.predict_units(&[0.0; 5]), expected);
        }
    }
}
