use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

use crate::entities::assessment::{ExplanationOutcome, RiskCategory};

/// Sentence shown whenever no generated explanation is available
pub const FALLBACK_EXPLANATION: &str = "AI explanation temporarily unavailable.";

/// Text generation errors
#[derive(Debug, Clone, Error)]
pub enum ExplainerError {
    /// No credentials were configured at startup
    #[error("Text generation is not configured: {0}")]
    NotConfigured(String),

    /// Connection, TLS or other transport failure
    #[error("Request to text generation service failed: {0}")]
    Transport(String),

    /// The service did not answer in time
    #[error("Text generation request timed out after {0:?}")]
    Timeout(Duration),

    /// The service answered with a non-success status (quota, auth, outage)
    #[error("Text generation service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body was not in the expected shape or had no text
    #[error("Malformed response from text generation service: {0}")]
    MalformedResponse(String),
}

/// External text-generation capability
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExplanationProvider: Send + Sync {
    /// Whether the provider has what it needs to make calls
    fn is_configured(&self) -> bool;

    /// Generate prose for a prompt
    async fn generate(&self, prompt: &str) -> Result<String, ExplainerError>;
}

/// Provider used when no API key is available; never touches the network
#[derive(Debug, Clone)]
pub struct DisabledExplainer {
    reason: String,
}

impl DisabledExplainer {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

#[async_trait]
impl ExplanationProvider for DisabledExplainer {
    fn is_configured(&self) -> bool {
        false
    }

    async fn generate(&self, _prompt: &str) -> Result<String, ExplainerError> {
        Err(ExplainerError::NotConfigured(self.reason.clone()))
    }
}

/// Prompt sent to the text-generation service
pub fn build_prompt(category: RiskCategory, top_factors: &str, family_history: bool) -> String {
    let family_flag = if family_history { "Yes" } else { "No" };

    format!(
        "A patient has {}.\n\
         Top contributing risk factors: {}.\n\
         Family history present: {}.\n\
         \n\
         Provide:\n\
         - Simple explanation of their cardiovascular risk\n\
         - Preventive lifestyle recommendations\n\
         - Medical precautions\n\
         - Keep tone professional and medically responsible.\n",
        category.label(),
        top_factors,
        family_flag
    )
}

/// Ask the provider for an explanation; failures become [`ExplanationOutcome::Unavailable`]
pub async fn request_explanation(provider: &dyn ExplanationProvider, prompt: &str) -> ExplanationOutcome {
    match provider.generate(prompt).await {
        Ok(text) if !text.trim().is_empty() => {
            debug!("Explanation generated ({} chars)", text.len());
            ExplanationOutcome::Generated { text }
        }
        Ok(_) => {
            warn!("Text generation returned an empty explanation, using fallback");
            ExplanationOutcome::Unavailable {
                reason: "empty explanation".to_string(),
            }
        }
        Err(e) => {
            warn!("Explanation unavailable, using fallback: {}", e);
            ExplanationOutcome::Unavailable { reason: e.to_string() }
        }
    }
}
