use std::collections::HashMap;
use std::str::FromStr;

use axum::{
    extract::{rejection::FormRejection, Form, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, info, instrument, warn};

use cardio_risk_domain::entities::PatientRecord;
use cardio_risk_domain::services::AssessmentServiceError;

use crate::api::handlers::assessment::AssessmentService;
use crate::pages;

/// Problems with a submitted form field
#[derive(Debug, Error, PartialEq)]
pub enum FormFieldError {
    /// The field was absent or blank
    #[error("Field '{0}' is required")]
    Missing(&'static str),

    /// The field could not be read as the expected kind of number
    #[error("Field '{field}' must be {expected}, got '{value}'")]
    Invalid {
        field: &'static str,
        expected: &'static str,
        value: String,
    },
}

fn parse_field<T: FromStr>(
    fields: &HashMap<String, String>,
    field: &'static str,
    expected: &'static str,
) -> Result<T, FormFieldError> {
    let raw = fields
        .get(field)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .ok_or(FormFieldError::Missing(field))?;

    raw.parse::<T>().map_err(|_| FormFieldError::Invalid {
        field,
        expected,
        value: raw.to_string(),
    })
}

/// Read a patient record from form fields; age and BMI are decimals, the rest whole numbers
pub fn parse_patient_form(fields: &HashMap<String, String>) -> Result<PatientRecord, FormFieldError> {
    const DECIMAL: &str = "a number";
    const WHOLE: &str = "a whole number";

    Ok(PatientRecord {
        age: parse_field(fields, "age", DECIMAL)?,
        gender: parse_field(fields, "gender", WHOLE)?,
        ap_hi: parse_field(fields, "ap_hi", WHOLE)?,
        ap_lo: parse_field(fields, "ap_lo", WHOLE)?,
        cholesterol: parse_field(fields, "cholesterol", WHOLE)?,
        gluc: parse_field(fields, "gluc", WHOLE)?,
        smoke: parse_field(fields, "smoke", WHOLE)?,
        alco: parse_field(fields, "alco", WHOLE)?,
        active: parse_field(fields, "active", WHOLE)?,
        bmi: parse_field(fields, "bmi", DECIMAL)?,
        relatives: parse_field(fields, "relatives", WHOLE)?,
    })
}

fn form_error(status: StatusCode, fields: &HashMap<String, String>, message: &str) -> Response {
    (status, Html(pages::render_form_page(fields, Some(message)))).into_response()
}

/// The empty screening form
#[instrument]
pub async fn index() -> Html<String> {
    Html(pages::render_form_page(&HashMap::new(), None))
}

/// Screen a form submission and render the result page
#[instrument(skip(service, form))]
pub async fn predict(
    State(service): State<AssessmentService>,
    form: Result<Form<HashMap<String, String>>, FormRejection>,
) -> Response {
    let Form(fields) = match form {
        Ok(form) => form,
        Err(rejection) => {
            warn!("Rejected form submission: {}", rejection.body_text());
            return form_error(StatusCode::BAD_REQUEST, &HashMap::new(), &rejection.body_text());
        }
    };

    let record = match parse_patient_form(&fields) {
        Ok(record) => record,
        Err(e) => {
            warn!("Invalid form field: {}", e);
            return form_error(StatusCode::BAD_REQUEST, &fields, &e.to_string());
        }
    };

    info!("Screening form submission");

    match service.assess(record).await {
        Ok(assessment) => Html(pages::render_result_page(&fields, &assessment)).into_response(),
        Err(AssessmentServiceError::ValidationError(message)) => {
            warn!("Invalid patient record: {}", message);
            form_error(StatusCode::BAD_REQUEST, &fields, &message)
        }
        Err(e) => {
            error!("Assessment failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(pages::render_error_page("The risk model could not score this submission.")),
            )
                .into_response()
        }
    }
}
