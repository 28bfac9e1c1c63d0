use serde::{Deserialize, Serialize};

use crate::error::ForecastError;
use crate::features::{FEATURE_COUNT, FeatureVector};

/// Zero-mean, unit-variance standardization per feature column.
///
/// Uses the population standard deviation. Constant columns keep a scale of
/// 1 so they transform to 0 instead of dividing by zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    mean: FeatureVector,
    scale: FeatureVector,
    samples: usize,
}

impl StandardScaler {
    pub fn fit(rows: &[FeatureVector]) -> Result<Self, ForecastError> {
        if rows.is_empty() {
            return Err(ForecastError::Model(
                "cannot fit scaler on an empty feature table".to_string(),
            ));
        }

        let mut mean = [0.0; FEATURE_COUNT];
        let mut scale = [1.0; FEATURE_COUNT];
        for col in 0..FEATURE_COUNT {
            let values: Vec<f64> = rows.iter().map(|r| r[col]).collect();
            let m = mean_of(&values);
            let std = stddev_population(&values, m);
            mean[col] = m;
            if std > f64::EPSILON {
                scale[col] = std;
            }
        }

        Ok(Self {
            mean,
            scale,
            samples: rows.len(),
        })
    }

    pub fn transform(&self, row: &FeatureVector) -> FeatureVector {
        let mut out = [0.0; FEATURE_COUNT];
        for col in 0..FEATURE_COUNT {
            out[col] = (row[col] - self.mean[col]) / self.scale[col];
        }
        out
    }

    pub fn transform_all(&self, rows: &[FeatureVector]) -> Vec<FeatureVector> {
        rows.iter().map(|r| self.transform(r)).collect()
    }

    pub fn mean(&self) -> &FeatureVector {
        &self.mean
    }

    pub fn scale(&self) -> &FeatureVector {
        &self.scale
    }

    /// Number of rows the scaler was fitted on.
    pub fn samples(&self) -> usize {
        self.samples
    }
}

fn mean_of(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    xs.iter().sum::<f64>() / (xs.len() as f64)
}

fn stddev_population(xs: &[f64], mean: f64) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    let var = xs
        .iter()
        .map(|x| {
            let d = x - mean;
            d * d
        })
        .sum::<f64>()
        / (xs.len() as f64);
    var.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standardizes_columns() {
        let rows = vec![
            [1.0, 10.0, 0.0, 2.0, 5.0],
            [3.0, 30.0, 0.0, 4.0, 5.0],
        ];
        let scaler = StandardScaler::fit(&rows).unwrap();

        assert_eq!(scaler.mean(), &[2.0, 20.0, 0.0, 3.0, 5.0]);
        assert_eq!(scaler.scale(), &[1.0, 10.0, 1.0, 1.0, 1.0]);

        let t = scaler.transform_all(&rows);
        assert_eq!(t[0], [-1.0, -1.0, 0.0, -1.0, 0.0]);
        assert_eq!(t[1], [1.0, 1.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn constant_columns_do_not_divide_by_zero() {
        let rows = vec![[4.0; FEATURE_COUNT], [4.0; FEATURE_COUNT]];
        let scaler = StandardScaler::fit(&rows).unwrap();
        let t = scaler.transform(&[4.0; FEATURE_COUNT]);
        assert!(t.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn empty_table_is_rejected() {
        assert!(StandardScaler::fit(&[]).is_err());
    }
}
