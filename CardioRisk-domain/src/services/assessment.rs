use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;
use tracing::{debug, error, info};
use uuid::Uuid;
use validator::Validate;

use crate::entities::assessment::RiskAssessment;
use crate::entities::patient::PatientRecord;
use crate::services::classifier::{ensure_probability, ClassifierError, RiskClassifier};
use crate::services::explainer::{build_prompt, request_explanation, ExplanationProvider};
use crate::services::frame::{FeatureFrame, FrameError};
use crate::services::ranking::{join_factor_names, rank_features, RankingError, EXPLANATION_TOP_K, REPORT_TOP_K};
use crate::services::risk::{adjust_for_family_history, categorize_risk, relative_risk_multiplier, to_percent};

/// Assessment service errors
#[derive(Debug, Error)]
pub enum AssessmentServiceError {
    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// The patient record could not be laid out for the model
    #[error("Feature frame error: {0}")]
    Frame(#[from] FrameError),

    /// The classifier failed
    #[error("Classifier error: {0}")]
    Classifier(#[from] ClassifierError),

    /// Importances could not be ranked
    #[error("Ranking error: {0}")]
    Ranking(#[from] RankingError),
}

/// Trait for risk assessment operations
#[async_trait]
pub trait AssessmentServiceTrait: Send + Sync {
    /// Validate a patient record before scoring
    fn validate_record(&self, record: &PatientRecord) -> Result<(), AssessmentServiceError>;

    /// Score a patient record, adjust for family history and ask for an explanation
    async fn assess(&self, record: PatientRecord) -> Result<RiskAssessment, AssessmentServiceError>;

    /// Name of the loaded classifier
    fn classifier_name(&self) -> &str;

    /// Whether explanations can be generated
    fn explainer_configured(&self) -> bool;
}

/// Risk assessment service for domain logic
pub struct AssessmentService {
    classifier: Arc<dyn RiskClassifier>,
    explainer: Arc<dyn ExplanationProvider>,
}

impl AssessmentService {
    /// Create a new assessment service
    pub fn new(classifier: Arc<dyn RiskClassifier>, explainer: Arc<dyn ExplanationProvider>) -> Self {
        Self { classifier, explainer }
    }
}

#[async_trait]
impl AssessmentServiceTrait for AssessmentService {
    fn validate_record(&self, record: &PatientRecord) -> Result<(), AssessmentServiceError> {
        if let Err(validation_errors) = record.validate() {
            // Sort by field so messages are stable
            let mut field_errors: Vec<_> = validation_errors.field_errors().into_iter().collect();
            field_errors.sort_by_key(|(field, _)| *field);

            let error_message = field_errors
                .iter()
                .map(|(field, errors)| {
                    let error_msgs: Vec<String> = errors
                        .iter()
                        .map(|err| {
                            if let Some(msg) = &err.message {
                                msg.to_string()
                            } else {
                                format!("Invalid {}", field)
                            }
                        })
                        .collect();
                    format!("{}: {}", field, error_msgs.join(", "))
                })
                .collect::<Vec<String>>()
                .join("; ");

            return Err(AssessmentServiceError::ValidationError(error_message));
        }

        if !record.age.is_finite() || !record.bmi.is_finite() {
            return Err(AssessmentServiceError::ValidationError(
                "Age and BMI must be finite numbers".to_string(),
            ));
        }

        if record.ap_hi <= record.ap_lo {
            return Err(AssessmentServiceError::ValidationError(
                "Systolic pressure (ap_hi) must be greater than diastolic pressure (ap_lo)".to_string(),
            ));
        }

        Ok(())
    }

    async fn assess(&self, record: PatientRecord) -> Result<RiskAssessment, AssessmentServiceError> {
        self.validate_record(&record)?;

        let id = Uuid::new_v4();

        let frame = FeatureFrame::build(&record, self.classifier.feature_names())?;
        let base_probability = self
            .classifier
            .predict_probability(&frame)
            .and_then(ensure_probability)
            .map_err(|e| {
                error!("Assessment {} failed in classifier {}: {}", id, self.classifier.name(), e);
                AssessmentServiceError::from(e)
            })?;

        let multiplier = relative_risk_multiplier(record.relatives);
        let adjusted_probability = adjust_for_family_history(base_probability, record.relatives);
        let category = categorize_risk(adjusted_probability);
        let family_history = record.has_family_history();

        let top_factors = rank_features(
            self.classifier.feature_names(),
            self.classifier.feature_importances(),
            REPORT_TOP_K,
        )?;

        debug!(
            "Assessment {}: base {:.4}, multiplier {}, adjusted {:.4}",
            id, base_probability, multiplier, adjusted_probability
        );

        let prompt = build_prompt(
            category,
            &join_factor_names(&top_factors, EXPLANATION_TOP_K),
            family_history,
        );
        let explanation = request_explanation(self.explainer.as_ref(), &prompt).await;

        info!(
            "Assessment {} complete: {} ({}%), explanation {}",
            id,
            category.label(),
            to_percent(adjusted_probability),
            if explanation.is_fallback() { "unavailable" } else { "generated" }
        );

        Ok(RiskAssessment {
            id,
            base_probability,
            multiplier,
            adjusted_probability,
            risk_percent: to_percent(adjusted_probability),
            category,
            family_history,
            top_factors,
            explanation,
            assessed_at: Utc::now(),
        })
    }

    fn classifier_name(&self) -> &str {
        self.classifier.name()
    }

    fn explainer_configured(&self) -> bool {
        self.explainer.is_configured()
    }
}

/// Factory function to create an assessment service
pub fn create_assessment_service(
    classifier: Arc<dyn RiskClassifier>,
    explainer: Arc<dyn ExplanationProvider>,
) -> impl AssessmentServiceTrait {
    AssessmentService::new(classifier, explainer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::assessment::{ExplanationOutcome, RiskCategory};
    use crate::services::explainer::{ExplainerError, MockExplanationProvider, FALLBACK_EXPLANATION};
    use crate::services::frame::FeatureFrame;
    use crate::testing::{sample_patient, FixedClassifier, ScriptedExplainer, SAMPLE_IMPORTANCES};
    use cardio_risk_data::model::fixtures::sample_pipeline;

    /// Classifier that hands back whatever it was given, unchecked
    struct UncheckedClassifier {
        probability: f64,
        names: Vec<String>,
    }

    impl UncheckedClassifier {
        fn new(probability: f64) -> Self {
            Self {
                probability,
                names: crate::entities::patient::MODEL_FEATURE_COLUMNS.iter().map(|c| c.to_string()).collect(),
            }
        }
    }

    impl RiskClassifier for UncheckedClassifier {
        fn name(&self) -> &str {
            "unchecked"
        }

        fn feature_names(&self) -> &[String] {
            &self.names
        }

        fn predict_probability(&self, _frame: &FeatureFrame) -> Result<f64, ClassifierError> {
            Ok(self.probability)
        }

        fn feature_importances(&self) -> &[f64] {
            &SAMPLE_IMPORTANCES
        }
    }

    fn service(probability: f64, explainer: Arc<dyn ExplanationProvider>) -> AssessmentService {
        AssessmentService::new(Arc::new(FixedClassifier::new(probability)), explainer)
    }

    #[tokio::test]
    async fn test_low_base_with_two_relatives() {
        let explainer = Arc::new(ScriptedExplainer::replying("Keep it up."));
        let service = service(0.10, explainer.clone());

        let mut record = sample_patient();
        record.relatives = 2;
        let assessment = service.assess(record).await.unwrap();

        assert_eq!(assessment.base_probability, 0.10);
        assert_eq!(assessment.multiplier, 2.3);
        assert!((assessment.adjusted_probability - 0.215202).abs() < 1e-6);
        assert_eq!(assessment.risk_percent, 21.52);
        assert_eq!(assessment.category, RiskCategory::Low);
        assert!(assessment.family_history);
        assert_eq!(assessment.explanation.display_text(), "Keep it up.");

        let prompts = explainer.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("A patient has Low Risk."));
        assert!(prompts[0].contains("Family history present: Yes."));
    }

    #[tokio::test]
    async fn test_high_base_with_one_relative() {
        let service = service(0.60, Arc::new(ScriptedExplainer::replying("See a doctor.")));

        let assessment = service.assess(sample_patient()).await.unwrap();

        assert_eq!(assessment.multiplier, 1.6);
        assert!((assessment.adjusted_probability - 0.769168).abs() < 1e-6);
        assert_eq!(assessment.risk_percent, 76.92);
        assert_eq!(assessment.category, RiskCategory::High);
    }

    #[tokio::test]
    async fn test_no_relatives_keeps_base() {
        let service = service(0.42, Arc::new(ScriptedExplainer::replying("ok")));

        let mut record = sample_patient();
        record.relatives = 0;
        let assessment = service.assess(record).await.unwrap();

        assert_eq!(assessment.adjusted_probability, 0.42);
        assert_eq!(assessment.category, RiskCategory::Borderline);
        assert!(!assessment.family_history);
    }

    #[tokio::test]
    async fn test_prompt_carries_top_three_factors() {
        let mut explainer = MockExplanationProvider::new();
        explainer
            .expect_generate()
            .withf(|prompt: &str| prompt.contains("Top contributing risk factors: bmi, age, ap_hi.\n"))
            .times(1)
            .returning(|_| Ok("Explained.".to_string()));
        explainer.expect_is_configured().return_const(true);

        let service = service(0.3, Arc::new(explainer));
        let assessment = service.assess(sample_patient()).await.unwrap();

        // The record keeps five factors, the prompt only three
        let names: Vec<&str> = assessment.top_factors.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["bmi", "age", "ap_hi", "ap_lo", "cholesterol"]);
        assert!(service.explainer_configured());
    }

    #[tokio::test]
    async fn test_explainer_failure_falls_back() {
        let explainer = Arc::new(ScriptedExplainer::failing(ExplainerError::Status {
            status: 503,
            body: "unavailable".to_string(),
        }));
        let service = service(0.55, explainer);

        let assessment = service.assess(sample_patient()).await.unwrap();

        assert!(assessment.explanation.is_fallback());
        assert_eq!(assessment.explanation.display_text(), FALLBACK_EXPLANATION);
        assert_eq!(assessment.category, RiskCategory::Elevated);
    }

    #[tokio::test]
    async fn test_with_bundled_forest() {
        let service = AssessmentService::new(
            Arc::new(sample_pipeline()),
            Arc::new(ScriptedExplainer::replying("ok")),
        );

        let assessment = service.assess(sample_patient()).await.unwrap();

        assert!((assessment.base_probability - 0.66).abs() < 1e-9);
        assert!(assessment.adjusted_probability > assessment.base_probability);
        assert_eq!(assessment.category, RiskCategory::High);
        assert_eq!(service.classifier_name(), "cardio-random-forest");
        assert!(matches!(assessment.explanation, ExplanationOutcome::Generated { .. }));
    }

    #[test]
    fn test_validation_messages() {
        let service = service(0.1, Arc::new(ScriptedExplainer::replying("ok")));

        let mut record = sample_patient();
        record.age = 0.0;
        record.cholesterol = 4;
        let err = service.validate_record(&record).unwrap_err().to_string();
        assert!(err.contains("age: Age must be between 1 and 120 years"));
        assert!(err.contains("cholesterol: Cholesterol must be 1, 2 or 3"));

        let mut record = sample_patient();
        record.ap_hi = 80;
        record.ap_lo = 90;
        let err = service.validate_record(&record).unwrap_err();
        assert!(err.to_string().contains("must be greater than diastolic"));

        assert!(service.validate_record(&sample_patient()).is_ok());
    }

    #[tokio::test]
    async fn test_invalid_record_never_reaches_model() {
        let explainer = Arc::new(ScriptedExplainer::replying("unused"));
        let service = service(0.1, explainer.clone());

        let mut record = sample_patient();
        record.bmi = 200.0;
        let err = service.assess(record).await.unwrap_err();

        assert!(matches!(err, AssessmentServiceError::ValidationError(_)));
        assert!(explainer.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_classifier_error_propagates() {
        let service = service(1.5, Arc::new(ScriptedExplainer::replying("unused")));

        let err = service.assess(sample_patient()).await.unwrap_err();
        assert!(matches!(err, AssessmentServiceError::Classifier(ClassifierError::OutOfRange(_))));
    }

    #[tokio::test]
    async fn test_misaligned_importances_are_reported() {
        let classifier = FixedClassifier::new(0.2).with_importances(vec![0.1; 9]);
        let service = AssessmentService::new(Arc::new(classifier), Arc::new(ScriptedExplainer::replying("unused")));

        let err = service.assess(sample_patient()).await.unwrap_err();
        assert!(matches!(err, AssessmentServiceError::Ranking(RankingError::LengthMismatch { names: 10, scores: 9 })));
    }

    #[tokio::test]
    async fn test_service_rejects_non_probabilities_from_any_classifier() {
        for probability in [f64::NAN, 1.5, -0.2] {
            let explainer = Arc::new(ScriptedExplainer::replying("unused"));
            let service = AssessmentService::new(Arc::new(UncheckedClassifier::new(probability)), explainer.clone());

            let err = service.assess(sample_patient()).await.unwrap_err();
            assert!(
                matches!(err, AssessmentServiceError::Classifier(ClassifierError::OutOfRange(_))),
                "{} should be rejected",
                probability
            );
            assert!(explainer.prompts().is_empty());
        }

        let service = AssessmentService::new(
            Arc::new(UncheckedClassifier::new(0.0)),
            Arc::new(ScriptedExplainer::replying("ok")),
        );
        assert_eq!(service.assess(sample_patient()).await.unwrap().category, RiskCategory::Low);
    }
}
