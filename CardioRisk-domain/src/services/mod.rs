pub mod assessment;
pub mod classifier;
pub mod explainer;
pub mod frame;
#[cfg(feature = "with-gemini")]
pub mod gemini;
pub mod ranking;
pub mod report;
pub mod risk;

// Domain services
// This module contains the screening pipeline: feature frame, classifier,
// family-history adjustment, categorization, ranking and explanation.

// Re-export service traits and factory functions
pub use assessment::{AssessmentServiceError, AssessmentServiceTrait, create_assessment_service};
pub use classifier::{ClassifierError, RiskClassifier};
pub use explainer::{DisabledExplainer, ExplainerError, ExplanationProvider, FALLBACK_EXPLANATION};
pub use report::{build_report, render_text};

#[cfg(feature = "with-gemini")]
pub use gemini::{create_default_explainer, GeminiClient, GeminiConfig};

// Re-export mock service factory functions when the mock feature is enabled
#[cfg(feature = "mock")]
pub use crate::testing::create_mock_assessment_service;
