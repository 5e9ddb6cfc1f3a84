// Testing utilities and mock implementations for the domain layer
// This module is only available when the "mock" feature is enabled

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::entities::patient::{PatientRecord, MODEL_FEATURE_COLUMNS};
use crate::health::{
    ComponentStatus, HealthComponent, HealthServiceTrait, SystemHealth, SystemStatus,
};
use crate::services::assessment::{AssessmentService, AssessmentServiceTrait};
use crate::services::classifier::{ensure_probability, ClassifierError, RiskClassifier};
use crate::services::explainer::{ExplainerError, ExplanationProvider};
use crate::services::frame::FeatureFrame;

/// Importances matching the bundled demo artifact
pub const SAMPLE_IMPORTANCES: [f64; 10] = [
    0.2612, 0.0198, 0.2331, 0.1104, 0.0513, 0.0171, 0.0093, 0.0079, 0.0152, 0.2747,
];

/// A 55-year-old smoker with raised blood pressure and one affected relative
pub fn sample_patient() -> PatientRecord {
    PatientRecord {
        age: 55.0,
        gender: 1,
        ap_hi: 140,
        ap_lo: 90,
        cholesterol: 2,
        gluc: 1,
        smoke: 1,
        alco: 0,
        active: 0,
        bmi: 28.0,
        relatives: 1,
    }
}

/// Classifier that always returns the same probability
#[derive(Debug, Clone)]
pub struct FixedClassifier {
    probability: f64,
    names: Vec<String>,
    importances: Vec<f64>,
}

impl FixedClassifier {
    /// Fixed probability over the standard model columns
    pub fn new(probability: f64) -> Self {
        Self {
            probability,
            names: MODEL_FEATURE_COLUMNS.iter().map(|c| c.to_string()).collect(),
            importances: SAMPLE_IMPORTANCES.to_vec(),
        }
    }

    /// Replace the importance scores
    pub fn with_importances(mut self, importances: Vec<f64>) -> Self {
        self.importances = importances;
        self
    }
}

impl RiskClassifier for FixedClassifier {
    fn name(&self) -> &str {
        "fixed-test-classifier"
    }

    fn feature_names(&self) -> &[String] {
        &self.names
    }

    fn predict_probability(&self, frame: &FeatureFrame) -> Result<f64, ClassifierError> {
        if frame.columns() != self.names.as_slice() {
            return Err(ClassifierError::ColumnMismatch {
                expected: self.names.clone(),
                actual: frame.columns().to_vec(),
            });
        }
        ensure_probability(self.probability)
    }

    fn feature_importances(&self) -> &[f64] {
        &self.importances
    }
}

enum Script {
    Reply(String),
    Fail(ExplainerError),
}

/// Explanation provider with a canned answer that records every prompt
pub struct ScriptedExplainer {
    script: Script,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedExplainer {
    /// Always answer with `text`
    pub fn replying(text: impl Into<String>) -> Self {
        Self {
            script: Script::Reply(text.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Always fail with `error`
    pub fn failing(error: ExplainerError) -> Self {
        Self {
            script: Script::Fail(error),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Prompts received so far
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ExplanationProvider for ScriptedExplainer {
    fn is_configured(&self) -> bool {
        true
    }

    async fn generate(&self, prompt: &str) -> Result<String, ExplainerError> {
        self.prompts.lock().unwrap().push(prompt.to_string());

        match &self.script {
            Script::Reply(text) => Ok(text.clone()),
            Script::Fail(error) => Err(error.clone()),
        }
    }
}

/// Assessment service over a fixed classifier and a scripted explainer
pub fn create_mock_assessment_service(
    probability: f64,
    explainer: Arc<dyn ExplanationProvider>,
) -> impl AssessmentServiceTrait {
    AssessmentService::new(Arc::new(FixedClassifier::new(probability)), explainer)
}

/// Mock implementation of health services for testing system health
#[derive(Debug)]
pub struct MockHealthService {
    /// Model component status
    model_status: ComponentStatus,
    /// System status
    system_status: SystemStatus,
    /// Additional components
    components: HashMap<String, HealthComponent>,
}

impl Default for MockHealthService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockHealthService {
    /// Create a new mock health service with all components healthy
    pub fn new() -> Self {
        Self {
            model_status: ComponentStatus::Healthy,
            system_status: SystemStatus::Healthy,
            components: HashMap::new(),
        }
    }

    /// Configure the mock with a missing model
    pub fn with_unhealthy_model(mut self) -> Self {
        self.model_status = ComponentStatus::Unhealthy;
        self
    }

    /// Set the overall system status
    pub fn with_system_status(mut self, status: SystemStatus) -> Self {
        self.system_status = status;
        self
    }

    /// Add a custom component with a specific status
    pub fn with_component(mut self, name: &str, status: ComponentStatus, details: Option<String>) -> Self {
        self.components.insert(name.to_string(), HealthComponent { status, details });
        self
    }
}

#[async_trait]
impl HealthServiceTrait for MockHealthService {
    async fn get_system_health(&self) -> SystemHealth {
        let mut components = HashMap::new();

        components.insert(
            "model".to_string(),
            HealthComponent {
                status: self.model_status.clone(),
                details: match self.model_status {
                    ComponentStatus::Unhealthy => Some("Model is not loaded".to_string()),
                    _ => Some("Loaded fixed-test-classifier".to_string()),
                },
            },
        );

        for (name, component) in &self.components {
            components.insert(name.clone(), component.clone());
        }

        SystemHealth {
            status: self.system_status.clone(),
            components,
        }
    }

    fn environment(&self) -> &str {
        "test"
    }
}

/// Factory function to create a mock health service
pub fn create_mock_health_service() -> impl HealthServiceTrait {
    MockHealthService::new()
}
