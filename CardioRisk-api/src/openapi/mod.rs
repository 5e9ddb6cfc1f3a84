use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Configure Swagger UI endpoints
pub fn configure_swagger_routes() -> SwaggerUi {
    SwaggerUi::new("/api-docs")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
}

// API Documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health endpoints
        crate::api::handlers::health::health_check,

        // Assessment endpoints
        crate::api::handlers::assessment::create_assessment
    ),
    components(
        schemas(
            // Entities
            crate::entities::assessment::AssessmentRequest,
            crate::entities::assessment::AssessmentResponse,
            crate::entities::common::ErrorResponse,

            // Domain types embedded in responses
            cardio_risk_domain::entities::RiskCategory,
            cardio_risk_domain::entities::FeatureImportance,
            cardio_risk_domain::entities::RiskReport,

            // Health handlers
            crate::api::handlers::health::HealthResponse,
            crate::api::handlers::health::ComponentStatus,
            crate::api::handlers::health::ComponentHealthStatus
        )
    ),
    tags(
        (name = "health", description = "Health check endpoint"),
        (name = "assessment", description = "Cardiovascular risk screening endpoints")
    ),
    info(
        title = "CardioRisk API",
        version = "0.1.0",
        description = "Cardiovascular risk screening with family-history adjustment and generated explanations",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        ),
    ),
    servers(
        (url = "/", description = "Local development server")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_doc_generation() {
        let openapi = ApiDoc::openapi();

        assert_eq!(openapi.info.title, "CardioRisk API");
        assert_eq!(openapi.info.version, "0.1.0");

        let tags = openapi.tags.as_ref().unwrap();
        assert!(tags.iter().any(|tag| tag.name == "health"));
        assert!(tags.iter().any(|tag| tag.name == "assessment"));

        assert!(openapi.paths.paths.contains_key("/health"));
        assert!(openapi.paths.paths.contains_key("/api/v1/assessments"));

        let schemas = &openapi.components.as_ref().unwrap().schemas;
        assert!(schemas.contains_key("AssessmentRequest"));
        assert!(schemas.contains_key("RiskReport"));
    }
}
