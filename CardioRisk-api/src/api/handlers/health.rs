use axum::{http::StatusCode, response::IntoResponse, Json, Extension};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;
use std::time::{SystemTime, UNIX_EPOCH};
use std::sync::{Once, Arc};
use once_cell::sync::OnceCell;
// Use the trait from domain layer
use cardio_risk_domain::health::{self, HealthServiceTrait, SystemStatus, ComponentStatus as DomainComponentStatus, SystemHealth};
use async_trait::async_trait;

/// Health check response model
#[derive(Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Current service status ("ok", "degraded", or "error")
    pub status: String,
    /// Current application version from Cargo manifest
    pub version: String,
    /// Timestamp of when the response was generated
    pub timestamp: u64,
    /// Uptime of the service in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uptime: Option<u64>,
    /// Details about the components of the system
    pub components: ComponentStatus,
    /// Environment information
    pub environment: String,
}

/// Status of individual system components
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ComponentStatus {
    /// Risk classifier status
    pub model: ComponentHealthStatus,
    /// Explanation provider status
    pub explainer: ComponentHealthStatus,
}

/// Health status for an individual component
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ComponentHealthStatus {
    /// Status of the component ("ok", "degraded", or "error")
    pub status: String,
    /// Optional message with more details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

// Track the time when the server started using a thread-safe OnceCell
static SERVER_START_TIME: OnceCell<u64> = OnceCell::new();
static INIT: Once = Once::new();

// Initialize the server start time
pub fn initialize_server_start_time() {
    INIT.call_once(|| {
        let start_time = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let _ = SERVER_START_TIME.set(start_time);
    });
}

/// Health check endpoint reporting on the model and the explanation provider
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy or degraded", body = HealthResponse),
        (status = 500, description = "Service is not healthy", body = HealthResponse)
    ),
    tag = "health"
)]
#[instrument(skip(health_service))]
pub async fn health_check(
    Extension(health_service): Extension<Arc<dyn HealthServiceTrait>>,
) -> impl IntoResponse {
    info!("Health check requested");

    // Get the current timestamp
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    // Calculate uptime if server start time is available
    let uptime = SERVER_START_TIME.get().map(|&start_time| now.saturating_sub(start_time));

    let system_health = health_service.get_system_health().await;

    let component = |name: &str| {
        let domain = system_health.components.get(name);
        ComponentHealthStatus {
            status: map_component_status(
                &domain.map(|c| c.status.clone()).unwrap_or(DomainComponentStatus::Unhealthy),
            ),
            message: match domain {
                Some(c) => c.details.clone(),
                None => Some(format!("No {} component reported", name)),
            },
        }
    };

    let response = HealthResponse {
        status: map_system_status(&system_health.status).to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: now,
        uptime,
        components: ComponentStatus {
            model: component("model"),
            explainer: component("explainer"),
        },
        environment: health_service.environment().to_string(),
    };

    // Scoring still works without explanations, so degraded is not a failure
    let status = match system_health.status {
        SystemStatus::Healthy | SystemStatus::Degraded => StatusCode::OK,
        SystemStatus::Unhealthy => StatusCode::INTERNAL_SERVER_ERROR,
    };

    (status, Json(response))
}

/// Map domain system status to API status string
fn map_system_status(status: &SystemStatus) -> &'static str {
    match status {
        SystemStatus::Healthy => "ok",
        SystemStatus::Degraded => "degraded",
        SystemStatus::Unhealthy => "error",
    }
}

/// Map domain component status to API status string
fn map_component_status(status: &DomainComponentStatus) -> String {
    match status {
        DomainComponentStatus::Healthy => "ok",
        DomainComponentStatus::Degraded => "degraded",
        DomainComponentStatus::Unhealthy => "error",
    }.to_string()
}

/// Implementation of the health service
#[derive(Debug)]
pub struct HealthService {
    model_name: Option<String>,
    explainer_configured: bool,
    environment: String,
}

impl HealthService {
    /// Create a new health service
    pub fn new(model_name: Option<String>, explainer_configured: bool, environment: impl Into<String>) -> Self {
        HealthService {
            model_name,
            explainer_configured,
            environment: environment.into(),
        }
    }
}

#[async_trait]
impl HealthServiceTrait for HealthService {
    async fn get_system_health(&self) -> SystemHealth {
        health::get_system_health(self.model_name.as_deref(), self.explainer_configured)
    }

    fn environment(&self) -> &str {
        &self.environment
    }
}

/// Factory function to create a health service
pub fn create_health_service(
    model_name: Option<String>,
    explainer_configured: bool,
    environment: impl Into<String>,
) -> Arc<dyn HealthServiceTrait> {
    Arc::new(HealthService::new(model_name, explainer_configured, environment))
}
