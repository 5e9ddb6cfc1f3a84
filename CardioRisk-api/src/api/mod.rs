pub mod handlers;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use cardio_risk_domain::health::HealthServiceTrait;

use crate::api::handlers::assessment::AssessmentService;

/// Create the application router
pub fn create_application(
    assessment_service: AssessmentService,
    health_service: Arc<dyn HealthServiceTrait>,
) -> Router {
    routes::create_app(assessment_service, health_service)
}
