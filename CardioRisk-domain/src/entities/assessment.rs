use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

/// Ordinal cardiovascular risk category
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub enum RiskCategory {
    /// Adjusted probability below 0.25
    Low,

    /// Adjusted probability in [0.25, 0.50)
    Borderline,

    /// Adjusted probability in [0.50, 0.75)
    Elevated,

    /// Adjusted probability of 0.75 or more
    High,
}

impl RiskCategory {
    /// Display label shown to patients and embedded in the explanation prompt
    pub fn label(&self) -> &'static str {
        match self {
            RiskCategory::Low => "Low Risk",
            RiskCategory::Borderline => "Borderline Risk",
            RiskCategory::Elevated => "Elevated Risk",
            RiskCategory::High => "High Risk",
        }
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A model feature with its importance score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct FeatureImportance {
    /// Feature column name
    pub name: String,

    /// Non-negative importance reported by the model
    pub score: f64,
}

/// Result of asking the text-generation service for an explanation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub enum ExplanationOutcome {
    /// The service returned prose
    Generated { text: String },

    /// The service could not be used; the fallback sentence is shown instead
    Unavailable { reason: String },
}

impl ExplanationOutcome {
    /// Text to show the patient: generated prose or the fixed fallback sentence
    pub fn display_text(&self) -> &str {
        match self {
            ExplanationOutcome::Generated { text } => text,
            ExplanationOutcome::Unavailable { .. } => crate::services::explainer::FALLBACK_EXPLANATION,
        }
    }

    /// Whether the fallback sentence is in use
    pub fn is_fallback(&self) -> bool {
        matches!(self, ExplanationOutcome::Unavailable { .. })
    }
}

/// Complete outcome of one screening request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct RiskAssessment {
    /// Identifier used to correlate logs for this request
    pub id: Uuid,

    /// Probability reported by the classifier before adjustment
    pub base_probability: f64,

    /// Relative-risk multiplier applied for family history
    pub multiplier: f64,

    /// Probability after family-history adjustment and the 0.95 ceiling
    pub adjusted_probability: f64,

    /// Adjusted probability as a percentage, rounded to two decimals
    pub risk_percent: f64,

    /// Category derived from the adjusted probability
    pub category: RiskCategory,

    /// Whether any first-degree relative is affected
    pub family_history: bool,

    /// Model features ordered by descending importance
    pub top_factors: Vec<FeatureImportance>,

    /// Natural-language explanation, or why it is unavailable
    pub explanation: ExplanationOutcome,

    /// When the assessment was produced
    pub assessed_at: DateTime<Utc>,
}

/// Standalone screening report
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct RiskReport {
    /// Base model estimate as a percentage
    pub base_percent: f64,

    /// Multiplier applied, present only when a relative is affected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multiplier: Option<f64>,

    /// Adjusted estimate as a percentage
    pub adjusted_percent: f64,

    /// Final category
    pub category: RiskCategory,

    /// Up to five strongest model factors
    pub top_factors: Vec<FeatureImportance>,

    /// Category-specific guidance line
    pub interpretation: String,

    /// Screening disclaimer
    pub disclaimer: String,
}
