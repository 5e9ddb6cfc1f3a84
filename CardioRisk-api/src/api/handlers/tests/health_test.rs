#[cfg(test)]
mod health_tests {
    use std::sync::Arc;

    use axum::{body::to_bytes, http::StatusCode, response::IntoResponse, Extension};
    use serde_json::Value;

    use cardio_risk_domain::health::{ComponentStatus, HealthServiceTrait, SystemStatus};
    use cardio_risk_domain::testing::MockHealthService;

    use crate::api::handlers::health::{create_health_service, health_check, initialize_server_start_time};

    async fn call(service: Arc<dyn HealthServiceTrait>) -> (StatusCode, Value) {
        initialize_server_start_time();
        let response = health_check(Extension(service)).await.into_response();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_healthy_service() {
        let (status, body) = call(create_health_service(Some("cardio-random-forest".to_string()), true, "production")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["components"]["model"]["status"], "ok");
        assert_eq!(body["components"]["model"]["message"], "Loaded cardio-random-forest");
        assert_eq!(body["components"]["explainer"]["status"], "ok");
        assert!(body["uptime"].is_u64());
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
        assert_eq!(body["environment"], "production");
    }

    #[tokio::test]
    async fn test_missing_key_is_degraded_but_ok() {
        let (status, body) = call(create_health_service(Some("cardio-random-forest".to_string()), false, "development")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "degraded");
        assert_eq!(body["components"]["explainer"]["status"], "degraded");
    }

    #[tokio::test]
    async fn test_missing_model_is_an_error() {
        let (status, body) = call(create_health_service(None, true, "development")).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["status"], "error");
        assert_eq!(body["components"]["model"]["status"], "error");
    }

    #[tokio::test]
    async fn test_with_mock_service() {
        let service = Arc::new(
            MockHealthService::new()
                .with_unhealthy_model()
                .with_system_status(SystemStatus::Unhealthy),
        );
        let (status, body) = call(service.clone()).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["components"]["model"]["message"], "Model is not loaded");
        // The mock does not report an explainer
        assert_eq!(body["components"]["explainer"]["status"], "error");
        assert_eq!(body["environment"], "test");
    }

    #[tokio::test]
    async fn test_mock_custom_components() {
        let service = Arc::new(
            MockHealthService::new()
                .with_component("explainer", ComponentStatus::Degraded, Some("quota exhausted".to_string()))
                .with_system_status(SystemStatus::Degraded),
        );

        let health = service.get_system_health().await;
        assert_eq!(health.components["explainer"].status, ComponentStatus::Degraded);

        let (status, body) = call(service).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["components"]["explainer"]["message"], "quota exhausted");
    }
}
