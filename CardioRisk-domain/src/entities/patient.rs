use serde::{Deserialize, Serialize};
use validator::Validate;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

/// Names of the eleven fields collected for every patient, in form order
pub const PATIENT_FIELDS: [&str; 11] = [
    "age",
    "gender",
    "ap_hi",
    "ap_lo",
    "cholesterol",
    "gluc",
    "smoke",
    "alco",
    "active",
    "bmi",
    "relatives",
];

/// Columns the bundled classifier was trained on, in training order
///
/// `relatives` is not a model input; it only drives the family-history adjustment.
pub const MODEL_FEATURE_COLUMNS: [&str; 10] = [
    "age",
    "gender",
    "ap_hi",
    "ap_lo",
    "cholesterol",
    "gluc",
    "smoke",
    "alco",
    "active",
    "bmi",
];

/// Patient vitals and lifestyle answers submitted for a single screening
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct PatientRecord {
    /// Age in years
    #[validate(range(min = 1.0, max = 120.0, message = "Age must be between 1 and 120 years"))]
    pub age: f64,

    /// Gender code (1 = female, 2 = male)
    #[validate(range(min = 1, max = 2, message = "Gender must be 1 (female) or 2 (male)"))]
    pub gender: u8,

    /// Systolic blood pressure (the higher number)
    #[validate(range(min = 50, max = 300, message = "Systolic pressure (ap_hi) must be between 50 and 300"))]
    pub ap_hi: i32,

    /// Diastolic blood pressure (the lower number)
    #[validate(range(min = 30, max = 200, message = "Diastolic pressure (ap_lo) must be between 30 and 200"))]
    pub ap_lo: i32,

    /// Cholesterol level (1 = normal, 2 = above normal, 3 = well above normal)
    #[validate(range(min = 1, max = 3, message = "Cholesterol must be 1, 2 or 3"))]
    pub cholesterol: u8,

    /// Glucose level (1 = normal, 2 = above normal, 3 = well above normal)
    #[validate(range(min = 1, max = 3, message = "Glucose (gluc) must be 1, 2 or 3"))]
    pub gluc: u8,

    /// Smoker (0 = no, 1 = yes)
    #[validate(range(max = 1, message = "Smoke must be 0 or 1"))]
    pub smoke: u8,

    /// Alcohol intake (0 = no, 1 = yes)
    #[validate(range(max = 1, message = "Alco must be 0 or 1"))]
    pub alco: u8,

    /// Physically active (0 = no, 1 = yes)
    #[validate(range(max = 1, message = "Active must be 0 or 1"))]
    pub active: u8,

    /// Body-mass index
    #[validate(range(min = 10.0, max = 80.0, message = "BMI must be between 10 and 80"))]
    pub bmi: f64,

    /// Number of first-degree relatives with premature cardiovascular disease
    #[validate(range(max = 20, message = "Relatives must be between 0 and 20"))]
    pub relatives: u32,
}

impl PatientRecord {
    /// Numeric value of a named field, if the name is one of [`PATIENT_FIELDS`]
    pub fn field_value(&self, name: &str) -> Option<f64> {
        let value = match name {
            "age" => self.age,
            "gender" => f64::from(self.gender),
            "ap_hi" => f64::from(self.ap_hi),
            "ap_lo" => f64::from(self.ap_lo),
            "cholesterol" => f64::from(self.cholesterol),
            "gluc" => f64::from(self.gluc),
            "smoke" => f64::from(self.smoke),
            "alco" => f64::from(self.alco),
            "active" => f64::from(self.active),
            "bmi" => self.bmi,
            "relatives" => f64::from(self.relatives),
            _ => return None,
        };
        Some(value)
    }

    /// Whether any first-degree relative is affected
    pub fn has_family_history(&self) -> bool {
        self.relatives > 0
    }
}
