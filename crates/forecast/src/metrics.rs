use serde::{Deserialize, Serialize};

/// Hold-out evaluation of a trained model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub mae: f64,
    pub rmse: f64,
    pub r2: f64,
    /// Mean absolute percentage error, in percent.
    pub mape: f64,
}

impl Metrics {
    /// Score `predicted` against `actual`.
    ///
    /// - MAPE substitutes 1 for the denominator when the true value is 0.
    /// - R² with a constant truth is 1.0 for a perfect fit and 0.0 otherwise.
    /// - Empty inputs score 0 across the board.
    pub fn evaluate(actual: &[f64], predicted: &[f64]) -> Self {
        let n = actual.len().min(predicted.len());
        if n == 0 {
            return Self {
                mae: 0.0,
                rmse: 0.0,
                r2: 0.0,
                mape: 0.0,
            };
        }
        let pairs = || actual.iter().zip(predicted).take(n);
        let nf = n as f64;

        let mae = pairs().map(|(a, p)| (a - p).abs()).sum::<f64>() / nf;
        let ss_res = pairs().map(|(a, p)| (a - p) * (a - p)).sum::<f64>();
        let rmse = (ss_res / nf).sqrt();

        let mean = actual.iter().take(n).sum::<f64>() / nf;
        let ss_tot = actual.iter().take(n).map(|a| (a - mean) * (a - mean)).sum::<f64>();
        let r2 = if ss_tot > 0.0 {
            1.0 - ss_res / ss_tot
        } else if ss_res == 0.0 {
            1.0
        } else {
            0.0
        };

        let mape = pairs()
            .map(|(a, p)| {
                let denom = if *a == 0.0 { 1.0 } else { a.abs() };
                (a - p).abs() / denom
            })
            .sum::<f64>()
            / nf
            * 100.0;

        Self { mae, rmse, r2, mape }
    }
}
