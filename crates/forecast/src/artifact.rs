use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ArtifactError;
use crate::features::{FEATURE_NAMES, FeatureVector};
use crate::gbt::GradientBoostedRegressor;
use crate::metrics::Metrics;
use crate::scaler::StandardScaler;

/// Bumped whenever the serialized layout changes.
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// Provenance of a trained artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    pub feature_names: Vec<String>,
    /// Promotion setting the model was trained with.
    pub include_promotions: bool,
    pub metrics: Metrics,
    pub train_rows: usize,
    pub test_rows: usize,
    pub trained_at: DateTime<Utc>,
}

/// The model and the scaler fitted alongside it, persisted as one unit.
///
/// Prediction must always go through the bundled scaler; refitting a scaler
/// on prediction-time data would shift every feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedArtifact {
    pub format_version: u32,
    pub model: GradientBoostedRegressor,
    pub scaler: StandardScaler,
    pub metadata: ArtifactMetadata,
}

impl TrainedArtifact {
    pub fn new(model: GradientBoostedRegressor, scaler: StandardScaler, metadata: ArtifactMetadata) -> Self {
        Self {
            format_version: ARTIFACT_FORMAT_VERSION,
            model,
            scaler,
            metadata,
        }
    }

    /// Scale with the persisted scaler, then score.
    pub fn predict(&self, features: &FeatureVector) -> f64 {
        self.model.predict(&self.scaler.transform(features))
    }

    /// Prediction as whole units: rounded to nearest, never negative.
    ///
    /// Non-finite model output counts as 0.
    pub fn predict_units(&self, features: &FeatureVector) -> u64 {
        let raw = self.predict(features);
        if !raw.is_finite() || raw <= 0.0 {
            return 0;
        }
        raw.round() as u64
    }

    pub fn encode(&self) -> Result<Vec<u8>, ArtifactError> {
        serde_json::to_vec(self).map_err(ArtifactError::Encode)
    }

    /// Decode and check the artifact matches this build's feature layout.
    pub fn decode(path: &Path, bytes: &[u8]) -> Result<Self, ArtifactError> {
        let artifact: Self = serde_json::from_slice(bytes).map_err(|source| ArtifactError::Decode {
            path: path.to_path_buf(),
            source,
        })?;

        if artifact.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(ArtifactError::Incompatible {
                path: path.to_path_buf(),
                reason: format!(
                    "format version {} (expected {ARTIFACT_FORMAT_VERSION})",
                    artifact.format_version
                ),
            });
        }
        if artifact.metadata.feature_names.iter().map(String::as_str).ne(FEATURE_NAMES) {
            return Err(ArtifactError::Incompatible {
                path: path.to_path_buf(),
                reason: format!("feature layout {:?}", artifact.metadata.feature_names),
            });
        }
        Ok(artifact)
    }
}

pub fn feature_names() -> Vec<String> {
    FEATURE_NAMES.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gbt::BoostingParams;

    fn sample() -> TrainedArtifact {
        let x = vec![[1.0, 0.0, 0.0, 2.0, 0.0], [3.0, 1.0, 1.0, 6.0, 1.0]];
        let y = vec![1.0, 3.0];
        let scaler = StandardScaler::fit(&x).unwrap();
        let params = BoostingParams {
            n_estimators: 5,
            ..BoostingParams::default()
        };
        let model = GradientBoostedRegressor::fit(&scaler.transform_all(&x), &y, params).unwrap();
        TrainedArtifact::new(
            model,
            scaler,
            ArtifactMetadata {
                feature_names: feature_names(),
                include_promotions: true,
                metrics: Metrics::evaluate(&[1.0], &[1.0]),
                train_rows: 1,
                test_rows: 1,
                trained_at: Utc::now(),
            },
        )
    }

    #[test]
    fn decode_restores_the_same_scaler() {
        let artifact = sample();
        let bytes = artifact.encode().unwrap();
        let back = TrainedArtifact::decode(Path::new("mem"), &bytes).unwrap();
        assert_eq!(back.scaler, artifact.scaler);
        assert_eq!(back.scaler.mean(), artifact.scaler.mean());
        assert_eq!(back.scaler.scale(), artifact.scaler.scale());
    }

    #[test]
    fn foreign_feature_layout_is_incompatible() {
        let mut artifact = sample();
        artifact.metadata.feature_names.pop();
        let bytes = artifact.encode().unwrap();
        let err = TrainedArtifact::decode(Path::new("mem"), &bytes).unwrap_err();
        assert!(matches!(err, ArtifactError::Incompatible { .. }));
    }

    #[test]
    fn garbage_fails_to_decode() {
        let err = TrainedArtifact::decode(Path::new("mem"), b"not json").unwrap_err();
        assert!(matches!(err, ArtifactError::Decode { .. }));
    }
}
