use std::sync::Arc;

use axum::{
    routing::{get, post},
    Extension, Router,
};
use tower_http::trace::TraceLayer;
use tracing::debug;

use cardio_risk_domain::health::HealthServiceTrait;

use crate::api::handlers::{assessment, health, predict};
use crate::openapi::configure_swagger_routes;

/// Create the application router
pub fn create_app(
    assessment_service: assessment::AssessmentService,
    health_service: Arc<dyn HealthServiceTrait>,
) -> Router {
    debug!("Creating application router");

    // Server-rendered form
    let page_routes = Router::new()
        .route("/", get(predict::index))
        .route("/predict", post(predict::predict));

    debug!("Page routes configured");

    // JSON API
    let api_routes = Router::new()
        .route("/assessments", post(assessment::create_assessment));

    debug!("API routes configured");

    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .layer(Extension(health_service));

    debug!("Public routes configured");

    let app = Router::new()
        .merge(page_routes)
        .nest("/api/v1", api_routes)
        .with_state(assessment_service)
        .merge(public_routes);

    // Configure the Swagger UI using the helper function
    let app = add_swagger_ui(app);

    debug!("Swagger UI merged");

    // Initialize health check service startup time
    health::initialize_server_start_time();

    app.layer(TraceLayer::new_for_http())
}

/// Add Swagger UI to the router
pub fn add_swagger_ui(app: Router) -> Router {
    // Get Swagger UI routes
    let swagger = configure_swagger_routes();

    // Merge Swagger UI with the app router
    app.merge(swagger)
}
