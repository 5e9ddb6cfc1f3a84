use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use cardio_risk_domain::entities::{FeatureImportance, PatientRecord, RiskAssessment, RiskCategory, RiskReport};
use cardio_risk_domain::services::build_report;

/// Patient measurements submitted for a screening
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AssessmentRequest {
    /// Age in years (1-120)
    #[schema(example = 55.0)]
    pub age: f64,

    /// Gender code (1 = female, 2 = male)
    #[schema(example = 1)]
    pub gender: u8,

    /// Systolic blood pressure
    #[schema(example = 140)]
    pub ap_hi: i32,

    /// Diastolic blood pressure
    #[schema(example = 90)]
    pub ap_lo: i32,

    /// Cholesterol level (1-3)
    #[schema(example = 2)]
    pub cholesterol: u8,

    /// Glucose level (1-3)
    #[schema(example = 1)]
    pub gluc: u8,

    /// Smoker (0 or 1)
    #[schema(example = 1)]
    pub smoke: u8,

    /// Alcohol intake (0 or 1)
    #[schema(example = 0)]
    pub alco: u8,

    /// Physically active (0 or 1)
    #[schema(example = 0)]
    pub active: u8,

    /// Body-mass index
    #[schema(example = 28.0)]
    pub bmi: f64,

    /// Number of first-degree relatives with premature cardiovascular disease
    #[schema(example = 1)]
    pub relatives: u32,
}

impl From<AssessmentRequest> for PatientRecord {
    fn from(request: AssessmentRequest) -> Self {
        PatientRecord {
            age: request.age,
            gender: request.gender,
            ap_hi: request.ap_hi,
            ap_lo: request.ap_lo,
            cholesterol: request.cholesterol,
            gluc: request.gluc,
            smoke: request.smoke,
            alco: request.alco,
            active: request.active,
            bmi: request.bmi,
            relatives: request.relatives,
        }
    }
}

/// Result of a screening
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AssessmentResponse {
    /// Assessment identifier
    pub id: Uuid,

    /// Classifier probability before adjustment
    pub base_probability: f64,

    /// Relative-risk multiplier for family history
    pub multiplier: f64,

    /// Probability after adjustment, capped at 0.95
    pub adjusted_probability: f64,

    /// Adjusted probability as a percentage
    pub risk_percent: f64,

    /// Risk category
    pub category: RiskCategory,

    /// Display label for the category, e.g. "High Risk"
    pub category_label: String,

    /// Whether any relative is affected
    pub family_history: bool,

    /// Strongest model factors, most important first
    pub top_factors: Vec<FeatureImportance>,

    /// Explanation text, or the fallback sentence
    pub explanation: String,

    /// Whether the fallback sentence is in use
    pub explanation_available: bool,

    /// When the assessment was produced
    pub assessed_at: DateTime<Utc>,

    /// Standalone report
    pub report: RiskReport,
}

/// Convert a domain assessment to the public response
pub fn convert_to_public_assessment(assessment: RiskAssessment) -> AssessmentResponse {
    let report = build_report(&assessment);

    AssessmentResponse {
        id: assessment.id,
        base_probability: assessment.base_probability,
        multiplier: assessment.multiplier,
        adjusted_probability: assessment.adjusted_probability,
        risk_percent: assessment.risk_percent,
        category: assessment.category,
        category_label: assessment.category.label().to_string(),
        family_history: assessment.family_history,
        explanation: assessment.explanation.display_text().to_string(),
        explanation_available: !assessment.explanation.is_fallback(),
        top_factors: assessment.top_factors,
        assessed_at: assessment.assessed_at,
        report,
    }
}
