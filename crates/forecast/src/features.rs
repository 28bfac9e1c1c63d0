//! Feature table construction from products and outflow history.
//!
//! One row per product, fixed column order:
//! `[quantity, cost_price, selling_price, total_outflow, promo_outflow]`.
//!
//! Excluding promotions never changes the vector shape: the `promo_outflow`
//! column stays and is forced to 0, so a single model layout serves both
//! settings.

use std::collections::HashMap;

use stockcast_core::ProductId;
use stockcast_inventory::{Outflow, Product};

pub const FEATURE_COUNT: usize = 5;

pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "quantity",
    "cost_price",
    "selling_price",
    "total_outflow",
    "promo_outflow",
];

pub type FeatureVector = [f64; FEATURE_COUNT];

/// Training row: features plus the regression target.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingRow {
    pub product_id: ProductId,
    pub features: FeatureVector,
    /// Average outflow quantity per outflow record.
    pub target: f64,
}

/// Prediction row: features keyed by product.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionRow {
    pub product_id: ProductId,
    pub features: FeatureVector,
}

#[derive(Debug, Default, Clone, Copy)]
struct OutflowTotals {
    total: i64,
    promo: i64,
    records: usize,
}

#[derive(Debug, Copy, Clone)]
pub struct FeatureBuilder {
    include_promotions: bool,
}

impl FeatureBuilder {
    pub fn new(include_promotions: bool) -> Self {
        Self { include_promotions }
    }

    pub fn include_promotions(&self) -> bool {
        self.include_promotions
    }

    /// Rows for model fitting. Empty when `products` is empty.
    pub fn training_rows(&self, products: &[Product], outflows: &[Outflow]) -> Vec<TrainingRow> {
        let totals = aggregate(outflows);
        products
            .iter()
            .map(|p| {
                let t = totals.get(&p.id).copied().unwrap_or_default();
                TrainingRow {
                    product_id: p.id,
                    features: self.vector(p, &t),
                    target: t.total as f64 / t.records.max(1) as f64,
                }
            })
            .collect()
    }

    /// Rows for scoring. Empty when `products` is empty.
    pub fn prediction_rows(&self, products: &[Product], outflows: &[Outflow]) -> Vec<PredictionRow> {
        let totals = aggregate(outflows);
        products
            .iter()
            .map(|p| {
                let t = totals.get(&p.id).copied().unwrap_or_default();
                PredictionRow {
                    product_id: p.id,
                    features: self.vector(p, &t),
                }
            })
            .collect()
    }

    fn vector(&self, product: &Product, totals: &OutflowTotals) -> FeatureVector {
        let promo = if self.include_promotions { totals.promo } else { 0 };
        [
            product.quantity as f64,
            price(product.cost_price),
            price(product.selling_price),
            totals.total as f64,
            promo as f64,
        ]
    }
}

fn aggregate(outflows: &[Outflow]) -> HashMap<ProductId, OutflowTotals> {
    let mut totals: HashMap<ProductId, OutflowTotals> = HashMap::new();
    for o in outflows {
        let t = totals.entry(o.product_id).or_default();
        t.total += o.quantity;
        t.records += 1;
        if o.promotion {
            t.promo += o.quantity;
        }
    }
    totals
}

/// Smallest-unit price to currency units; missing prices count as 0.
fn price(cents: Option<u64>) -> f64 {
    cents.map_or(0.0, |c| c as f64 / 100.0)
}
