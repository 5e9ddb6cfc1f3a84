use thiserror::Error;

use cardio_risk_data::model::{ForestPipeline, ModelError};

use crate::services::frame::FeatureFrame;

/// Classifier errors
#[derive(Debug, Error)]
pub enum ClassifierError {
    /// The frame columns do not match the model's expected columns
    #[error("Feature frame columns {actual:?} do not match model columns {expected:?}")]
    ColumnMismatch {
        expected: Vec<String>,
        actual: Vec<String>,
    },

    /// The underlying model failed to evaluate
    #[error("Model evaluation failed: {0}")]
    Model(#[from] ModelError),

    /// The model produced something that is not a probability
    #[error("Model returned {0}, which is not a probability")]
    OutOfRange(f64),
}

/// Pre-trained binary classifier capability
pub trait RiskClassifier: Send + Sync {
    /// Model name for logs and health reporting
    fn name(&self) -> &str;

    /// Columns expected in a feature frame, in order
    fn feature_names(&self) -> &[String];

    /// Probability of the positive class for a single-row frame
    fn predict_probability(&self, frame: &FeatureFrame) -> Result<f64, ClassifierError>;

    /// Importance scores aligned with [`feature_names`](Self::feature_names)
    fn feature_importances(&self) -> &[f64];
}

impl RiskClassifier for ForestPipeline {
    fn name(&self) -> &str {
        ForestPipeline::name(self)
    }

    fn feature_names(&self) -> &[String] {
        ForestPipeline::feature_names(self)
    }

    fn predict_probability(&self, frame: &FeatureFrame) -> Result<f64, ClassifierError> {
        if frame.columns() != ForestPipeline::feature_names(self) {
            return Err(ClassifierError::ColumnMismatch {
                expected: ForestPipeline::feature_names(self).to_vec(),
                actual: frame.columns().to_vec(),
            });
        }

        let probability = self.predict_proba(frame.values())?;
        ensure_probability(probability)
    }

    fn feature_importances(&self) -> &[f64] {
        ForestPipeline::feature_importances(self)
    }
}

/// Reject NaN and values outside [0, 1]
pub fn ensure_probability(value: f64) -> Result<f64, ClassifierError> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(ClassifierError::OutOfRange(value))
    }
}
