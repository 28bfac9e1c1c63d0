//! Gradient-boosted regression trees on squared error.
//!
//! Model:
//! - Start every prediction at the mean training target (`base_score`).
//! - Each round fits a depth-limited regression tree to the current residuals
//!   and adds `learning_rate * tree(x)` to the running prediction.
//! - Splits are exact: every distinct value boundary of every feature is
//!   scored by variance reduction; ties keep the first candidate found, so
//!   fitting is deterministic.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::error::ForecastError;
use crate::features::{FEATURE_COUNT, FeatureVector};

/// Hyper-parameters of the boosted ensemble.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoostingParams {
    pub n_estimators: usize,
    pub learning_rate: f64,
    pub max_depth: usize,
    /// Minimum rows a node needs before it may split.
    pub min_samples_split: usize,
    /// Fraction of training rows sampled (without replacement) per tree.
    pub subsample: f64,
    pub seed: u64,
}

impl Default for BoostingParams {
    fn default() -> Self {
        Self {
            n_estimators: 200,
            learning_rate: 0.1,
            max_depth: 5,
            min_samples_split: 2,
            subsample: 1.0,
            seed: 42,
        }
    }
}

impl BoostingParams {
    fn validate(&self) -> Result<(), ForecastError> {
        if self.n_estimators == 0 {
            return Err(ForecastError::Model("n_estimators must be >= 1".to_string()));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(ForecastError::Model(
                "learning_rate must be a finite positive number".to_string(),
            ));
        }
        if !(self.subsample > 0.0 && self.subsample <= 1.0) {
            return Err(ForecastError::Model("subsample must be in (0, 1]".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// A single regression tree stored as a flat node arena (root at index 0).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    nodes: Vec<Node>,
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
    gain: f64,
}

impl RegressionTree {
    fn fit(
        x: &[FeatureVector],
        y: &[f64],
        rows: Vec<usize>,
        max_depth: usize,
        min_samples_split: usize,
    ) -> Self {
        let mut tree = Self { nodes: Vec::new() };
        tree.grow(x, y, rows, 0, max_depth, min_samples_split.max(2));
        tree
    }

    fn grow(
        &mut self,
        x: &[FeatureVector],
        y: &[f64],
        rows: Vec<usize>,
        depth: usize,
        max_depth: usize,
        min_samples_split: usize,
    ) -> usize {
        let idx = self.nodes.len();
        let leaf_value = mean_at(y, &rows);
        self.nodes.push(Node::Leaf { value: leaf_value });

        if depth >= max_depth || rows.len() < min_samples_split {
            return idx;
        }

        let Some(best) = best_split(x, y, &rows) else {
            return idx;
        };

        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
            .iter()
            .partition(|&&r| x[r][best.feature] <= best.threshold);

        let left = self.grow(x, y, left_rows, depth + 1, max_depth, min_samples_split);
        let right = self.grow(x, y, right_rows, depth + 1, max_depth, min_samples_split);
        self.nodes[idx] = Node::Split {
            feature: best.feature,
            threshold: best.threshold,
            left,
            right,
        };
        idx
    }

    pub fn predict(&self, row: &FeatureVector) -> f64 {
        let mut idx = 0;
        loop {
            match self.nodes.get(idx) {
                Some(Node::Leaf { value }) => return *value,
                Some(Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    idx = if row[*feature] <= *threshold { *left } else { *right };
                }
                None => return 0.0,
            }
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

/// Best variance-reducing split over all features, if any reduces error.
fn best_split(x: &[FeatureVector], y: &[f64], rows: &[usize]) -> Option<SplitCandidate> {
    let n = rows.len() as f64;
    let total: f64 = rows.iter().map(|&r| y[r]).sum();
    let parent_score = total * total / n;

    let mut best: Option<SplitCandidate> = None;
    let mut sorted = rows.to_vec();

    for feature in 0..FEATURE_COUNT {
        sorted.sort_by(|&a, &b| x[a][feature].total_cmp(&x[b][feature]));

        let mut left_sum = 0.0;
        for i in 1..sorted.len() {
            left_sum += y[sorted[i - 1]];
            let lo = x[sorted[i - 1]][feature];
            let hi = x[sorted[i]][feature];
            if lo >= hi {
                continue;
            }

            let left_n = i as f64;
            let right_n = n - left_n;
            let right_sum = total - left_sum;
            let gain = left_sum * left_sum / left_n + right_sum * right_sum / right_n - parent_score;

            if gain > 1e-12 && best.as_ref().map_or(true, |b| gain > b.gain) {
                let mut threshold = lo + (hi - lo) / 2.0;
                if threshold >= hi {
                    threshold = lo;
                }
                best = Some(SplitCandidate {
                    feature,
                    threshold,
                    gain,
                });
            }
        }
    }

    best
}

fn mean_at(y: &[f64], rows: &[usize]) -> f64 {
    if rows.is_empty() {
        return 0.0;
    }
    rows.iter().map(|&r| y[r]).sum::<f64>() / rows.len() as f64
}

/// Boosted ensemble of regression trees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientBoostedRegressor {
    params: BoostingParams,
    base_score: f64,
    trees: Vec<RegressionTree>,
}

impl GradientBoostedRegressor {
    pub fn fit(x: &[FeatureVector], y: &[f64], params: BoostingParams) -> Result<Self, ForecastError> {
        params.validate()?;
        if x.is_empty() {
            return Err(ForecastError::Model(
                "cannot fit model on an empty training set".to_string(),
            ));
        }
        if x.len() != y.len() {
            return Err(ForecastError::Model(format!(
                "feature/target length mismatch ({} vs {})",
                x.len(),
                y.len()
            )));
        }

        let base_score = y.iter().sum::<f64>() / y.len() as f64;
        let mut predictions = vec![base_score; y.len()];
        let mut trees = Vec::with_capacity(params.n_estimators);
        let mut rng = StdRng::seed_from_u64(params.seed);
        let sample_len = ((y.len() as f64) * params.subsample).ceil().max(1.0) as usize;
        let mut all_rows: Vec<usize> = (0..y.len()).collect();

        for _ in 0..params.n_estimators {
            let residuals: Vec<f64> = y.iter().zip(&predictions).map(|(t, p)| t - p).collect();

            let rows = if sample_len < y.len() {
                all_rows.shuffle(&mut rng);
                let mut sample = all_rows[..sample_len].to_vec();
                sample.sort_unstable();
                sample
            } else {
                all_rows.clone()
            };

            let tree = RegressionTree::fit(x, &residuals, rows, params.max_depth, params.min_samples_split);
            for (p, row) in predictions.iter_mut().zip(x) {
                *p += params.learning_rate * tree.predict(row);
            }
            trees.push(tree);
        }

        Ok(Self {
            params,
            base_score,
            trees,
        })
    }

    pub fn predict(&self, row: &FeatureVector) -> f64 {
        let lr = self.params.learning_rate;
        self.base_score + self.trees.iter().map(|t| lr * t.predict(row)).sum::<f64>()
    }

    pub fn predict_all(&self, rows: &[FeatureVector]) -> Vec<f64> {
        rows.iter().map(|r| self.predict(r)).collect()
    }

    pub fn params(&self) -> &BoostingParams {
        &self.params
    }

    pub fn base_score(&self) -> f64 {
        self.base_score
    }

    pub fn trees(&self) -> &[RegressionTree] {
        &self.trees
    }
}
