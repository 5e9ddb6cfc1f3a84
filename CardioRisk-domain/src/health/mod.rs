//! Domain layer health check functionality
//! This module reports on the loaded model and the explanation provider

use std::collections::HashMap;
use async_trait::async_trait;

/// System health status
#[derive(Debug, Clone, PartialEq)]
pub enum SystemStatus {
    /// All components are healthy
    Healthy,
    /// Some components are degraded but the system is functional
    Degraded,
    /// System is not functioning properly
    Unhealthy,
}

/// Component health status
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentStatus {
    /// Component is functioning normally
    Healthy,
    /// Component is functioning with reduced capability
    Degraded,
    /// Component is not functioning
    Unhealthy,
}

/// Represents a health component with status and optional details
#[derive(Debug, Clone)]
pub struct HealthComponent {
    /// Status of the component
    pub status: ComponentStatus,
    /// Optional details about the component status
    pub details: Option<String>,
}

/// Represents the overall health of the system
#[derive(Debug, Clone)]
pub struct SystemHealth {
    /// Overall system status
    pub status: SystemStatus,
    /// Map of component names to their health status
    pub components: HashMap<String, HealthComponent>,
}

/// Trait for health services
#[async_trait]
pub trait HealthServiceTrait: Send + Sync + std::fmt::Debug {
    /// Get the overall system health
    async fn get_system_health(&self) -> SystemHealth;

    /// Deployment environment name reported alongside the health status
    fn environment(&self) -> &str;
}

/// Check that a classifier is loaded
pub fn check_model_status(model_name: Option<&str>) -> Result<String, String> {
    match model_name {
        Some(name) if !name.trim().is_empty() => Ok(name.to_string()),
        Some(_) => Err("Model is loaded but has no name".to_string()),
        None => Err("Model is not loaded".to_string()),
    }
}

/// Get overall system health
pub fn get_system_health(model_name: Option<&str>, explainer_configured: bool) -> SystemHealth {
    let model_component = match check_model_status(model_name) {
        Ok(name) => HealthComponent {
            status: ComponentStatus::Healthy,
            details: Some(format!("Loaded {}", name)),
        },
        Err(e) => HealthComponent {
            status: ComponentStatus::Unhealthy,
            details: Some(e),
        },
    };

    let explainer_component = if explainer_configured {
        HealthComponent {
            status: ComponentStatus::Healthy,
            details: None,
        }
    } else {
        HealthComponent {
            status: ComponentStatus::Degraded,
            details: Some("GEMINI_API_KEY is not set - fallback explanation in use".to_string()),
        }
    };

    let components: HashMap<String, HealthComponent> = vec![
        ("model".to_string(), model_component),
        ("explainer".to_string(), explainer_component),
    ]
    .into_iter()
    .collect();

    SystemHealth {
        status: overall_status(&components),
        components,
    }
}

/// Worst status across all components
pub fn overall_status(components: &HashMap<String, HealthComponent>) -> SystemStatus {
    if components.values().any(|c| c.status == ComponentStatus::Unhealthy) {
        SystemStatus::Unhealthy
    } else if components.values().any(|c| c.status == ComponentStatus::Degraded) {
        SystemStatus::Degraded
    } else {
        SystemStatus::Healthy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_system_health() {
        let health = get_system_health(Some("cardio-random-forest"), true);
        assert_eq!(health.status, SystemStatus::Healthy);
        assert!(health.components.contains_key("model"));
        assert!(health.components.contains_key("explainer"));
        assert_eq!(
            health.components["model"].details.as_deref(),
            Some("Loaded cardio-random-forest")
        );
    }

    #[test]
    fn test_missing_key_is_degraded() {
        let health = get_system_health(Some("cardio-random-forest"), false);
        assert_eq!(health.status, SystemStatus::Degraded);
        assert_eq!(health.components["explainer"].status, ComponentStatus::Degraded);
    }

    #[test]
    fn test_missing_model_is_unhealthy() {
        let health = get_system_health(None, false);
        assert_eq!(health.status, SystemStatus::Unhealthy);
        assert_eq!(health.components["model"].status, ComponentStatus::Unhealthy);
        assert!(check_model_status(Some(" ")).is_err());
    }
}
