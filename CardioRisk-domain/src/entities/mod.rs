// Domain entities and value objects
pub mod assessment;
pub mod patient;

// Re-export common types for easier imports
pub use assessment::{
    ExplanationOutcome, FeatureImportance, RiskAssessment, RiskCategory, RiskReport,
};
pub use patient::{PatientRecord, MODEL_FEATURE_COLUMNS, PATIENT_FIELDS};
