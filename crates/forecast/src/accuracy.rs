//! Forecast accuracy against recorded outflows, and range summaries.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use serde::Serialize;

use stockcast_core::ProductId;
use stockcast_inventory::{Outflow, Product};

use crate::record::Forecast;

/// Percentage error of a prediction against the quantity actually withdrawn.
///
/// `None` when nothing was withdrawn (the error is undefined, not zero).
pub fn daily_mape(actual: i64, predicted: u64) -> Option<f64> {
    if actual <= 0 {
        return None;
    }
    let actual = actual as f64;
    Some((actual - predicted as f64).abs() / actual * 100.0)
}

/// Total outflow quantity per (product, day).
pub fn daily_actuals(outflows: &[Outflow]) -> HashMap<(ProductId, NaiveDate), i64> {
    let mut out: HashMap<(ProductId, NaiveDate), i64> = HashMap::new();
    for o in outflows {
        *out.entry((o.product_id, o.date())).or_default() += o.quantity;
    }
    out
}

/// Headline numbers for the forecasts in a date range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastSummary {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub rows: usize,
    pub total_predicted: u64,
    /// Mean per-row MAPE; rows without recorded sales count as 0.
    pub average_mape: f64,
    /// Forecast rows whose product has less stock than predicted demand.
    pub rows_at_risk: usize,
    pub last_forecast_date: Option<NaiveDate>,
    pub promotional_outflows: usize,
    pub regular_outflows: usize,
}

pub fn summarize(
    start: NaiveDate,
    end: NaiveDate,
    forecasts: &[Forecast],
    products: &[Product],
    outflows: &[Outflow],
) -> ForecastSummary {
    let actuals = daily_actuals(outflows);
    let stock: HashMap<ProductId, i64> = products.iter().map(|p| (p.id, p.quantity)).collect();

    let mut total_predicted = 0u64;
    let mut mape_sum = 0.0;
    let mut rows_at_risk = 0;
    for f in forecasts {
        total_predicted += f.predicted_quantity;
        let actual = actuals.get(&f.key()).copied().unwrap_or(0);
        mape_sum += daily_mape(actual, f.predicted_quantity).unwrap_or(0.0);
        if stock
            .get(&f.product_id)
            .is_some_and(|&q| q < f.predicted_quantity as i64)
        {
            rows_at_risk += 1;
        }
    }

    let covered: HashSet<ProductId> = forecasts.iter().map(|f| f.product_id).collect();
    let (promotional, regular): (Vec<&Outflow>, Vec<&Outflow>) = outflows
        .iter()
        .filter(|o| covered.contains(&o.product_id))
        .partition(|o| o.promotion);

    ForecastSummary {
        start,
        end,
        rows: forecasts.len(),
        total_predicted,
        average_mape: if forecasts.is_empty() {
            0.0
        } else {
            mape_sum / forecasts.len() as f64
        },
        rows_at_risk,
        last_forecast_date: forecasts.iter().map(|f| f.date).max(),
        promotional_outflows: promotional.len(),
        regular_outflows: regular.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn forecast(product_id: ProductId, d: u32, qty: u64) -> Forecast {
        Forecast {
            product_id,
            date: day(d),
            predicted_quantity: qty,
            mape: None,
            daily_mape: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn daily_mape_is_undefined_without_sales() {
        assert_eq!(daily_mape(0, 5), None);
        assert_eq!(daily_mape(4, 5), Some(25.0));
        assert_eq!(daily_mape(10, 10), Some(0.0));
    }

    #[test]
    fn actuals_group_by_product_and_day() {
        let p = ProductId::new();
        let outflows = vec![
            Outflow::new(p, 2, Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap()),
            Outflow::new(p, 3, Utc.with_ymd_and_hms(2024, 6, 1, 18, 0, 0).unwrap()),
            Outflow::new(p, 1, Utc.with_ymd_and_hms(2024, 6, 2, 9, 0, 0).unwrap()),
        ];
        let actuals = daily_actuals(&outflows);
        assert_eq!(actuals[&(p, day(1))], 5);
        assert_eq!(actuals[&(p, day(2))], 1);
    }

    #[test]
    fn summary_counts_risk_and_promotions() {
        let a = Product::new(ProductId::new(), "a", 3);
        let b = Product::new(ProductId::new(), "b", 100);
        let other = Product::new(ProductId::new(), "other", 1);
        let outflows = vec![
            Outflow::new(a.id, 4, Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap()),
            Outflow::new(a.id, 1, Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap()).promotional(),
            Outflow::new(other.id, 1, Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap()).promotional(),
        ];
        let forecasts = vec![forecast(a.id, 1, 5), forecast(a.id, 2, 5), forecast(b.id, 1, 2)];

        let s = summarize(day(1), day(2), &forecasts, &[a, b, other], &outflows);

        assert_eq!(s.rows, 3);
        assert_eq!(s.total_predicted, 12);
        assert_eq!(s.rows_at_risk, 2);
        assert_eq!(s.last_forecast_date, Some(day(2)));
        // Only the first row has sales: |4 - 5| / 4 = 25%.
        assert!((s.average_mape - 25.0 / 3.0).abs() < 1e-9);
        assert_eq!(s.promotional_outflows, 1);
        assert_eq!(s.regular_outflows, 1);
    }

    #[test]
    fn empty_summary() {
        let s = summarize(day(1), day(2), &[], &[], &[]);
        assert_eq!(s.rows, 0);
        assert_eq!(s.average_mape, 0.0);
        assert_eq!(s.last_forecast_date, None);
    }
}
