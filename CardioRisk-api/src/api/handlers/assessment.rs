use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Json, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::{error, info, instrument, warn};

use cardio_risk_domain::entities::PatientRecord;
use cardio_risk_domain::services::{build_report, render_text, AssessmentServiceError, AssessmentServiceTrait};

use crate::entities::assessment::{convert_to_public_assessment, AssessmentRequest, AssessmentResponse};
use crate::entities::common::ErrorResponse;

/// Service type for dependency injection
pub type AssessmentService = Arc<dyn AssessmentServiceTrait>;

/// Map a service error to the public error body
pub fn map_service_error(err: AssessmentServiceError) -> ErrorResponse {
    match err {
        AssessmentServiceError::ValidationError(message) => {
            warn!("Invalid patient record: {}", message);
            ErrorResponse::validation_error(&message, None)
        }
        other => {
            error!("Assessment failed: {}", other);
            ErrorResponse::internal_error()
        }
    }
}

/// Whether the client asked for the plain-text report instead of JSON
fn wants_text_report(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|value| value.to_str().ok())
        .map(|accept| accept.contains("text/plain") && !accept.contains("application/json"))
        .unwrap_or(false)
}

/// Screen a patient record and return the assessment with its report
///
/// With `Accept: text/plain` only the printable report is returned.
#[utoipa::path(
    post,
    path = "/api/v1/assessments",
    request_body = AssessmentRequest,
    responses(
        (status = 200, description = "Assessment produced", content(
            ("application/json" = AssessmentResponse),
            ("text/plain" = String)
        )),
        (status = 400, description = "Invalid patient record", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "assessment"
)]
#[instrument(skip(service, headers, payload))]
pub async fn create_assessment(
    State(service): State<AssessmentService>,
    headers: HeaderMap,
    payload: Result<Json<AssessmentRequest>, JsonRejection>,
) -> Result<Response, Response> {
    let Json(request) = payload.map_err(|rejection| {
        warn!("Rejected assessment request body: {}", rejection.body_text());
        ErrorResponse::bad_request(&rejection.body_text()).into_response()
    })?;

    info!("Creating new risk assessment");

    let record = PatientRecord::from(request);
    match service.assess(record).await {
        Ok(assessment) => {
            info!("Assessment {} created: {}", assessment.id, assessment.category.label());
            if wants_text_report(&headers) {
                let text = render_text(&build_report(&assessment));
                return Ok((StatusCode::OK, [(header::CONTENT_TYPE, "text/plain; charset=utf-8")], text).into_response());
            }
            Ok((StatusCode::OK, Json(convert_to_public_assessment(assessment))).into_response())
        }
        Err(e) => Err(map_service_error(e).into_response()),
    }
}
