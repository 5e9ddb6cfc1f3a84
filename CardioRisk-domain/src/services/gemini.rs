//! Gemini `generateContent` client used as the explanation provider

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::services::explainer::{DisabledExplainer, ExplainerError, ExplanationProvider};

/// Model used when `GEMINI_MODEL` is not set
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

/// Public Gemini API endpoint
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Request timeout when `GEMINI_TIMEOUT_SECS` is not set
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;

/// Longest error body kept in an error message
const MAX_ERROR_BODY: usize = 200;

/// Gemini client configuration from environment variables
#[derive(Clone)]
pub struct GeminiConfig {
    /// API key; `None` disables explanations
    pub api_key: Option<String>,
    /// Model name, e.g. `gemini-2.5-flash`
    pub model: String,
    /// Scheme and host of the API
    pub base_url: String,
    /// Whole-request timeout
    pub timeout: Duration,
}

impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_GEMINI_MODEL.to_string(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl GeminiConfig {
    /// Read configuration from the environment, logging any problems
    pub fn from_env() -> Self {
        let config = Self {
            api_key: std::env::var("GEMINI_API_KEY")
                .ok()
                .map(|key| key.trim().to_string())
                .filter(|key| !key.is_empty()),
            model: std::env::var("GEMINI_MODEL").unwrap_or_else(|_| {
                debug!("GEMINI_MODEL not set - using {}", DEFAULT_GEMINI_MODEL);
                DEFAULT_GEMINI_MODEL.to_string()
            }),
            base_url: std::env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_GEMINI_BASE_URL.to_string()),
            timeout: Duration::from_secs(
                std::env::var("GEMINI_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse::<u64>().ok())
                    .unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
        };

        config.log_warnings();
        config
    }

    /// Log validation warnings but don't fail
    pub fn log_warnings(&self) {
        if let Err(errors) = self.validate() {
            for error in &errors {
                warn!("Gemini configuration warning: {}", error);
            }
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.api_key.is_none() {
            errors.push(
                "GEMINI_API_KEY is not set - explanations will use the fallback sentence".to_string(),
            );
        }

        if self.model.trim().is_empty() {
            errors.push("GEMINI_MODEL is empty".to_string());
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            errors.push(format!("GEMINI_BASE_URL is not an http(s) URL: {}", self.base_url));
        }

        if self.timeout.is_zero() {
            errors.push("GEMINI_TIMEOUT_SECS must be greater than zero".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Full `generateContent` URL for the configured model
    pub fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

/// Pull the generated text out of a `generateContent` response body
pub fn extract_text(body: &str) -> Result<String, ExplainerError> {
    let response: GenerateContentResponse = serde_json::from_str(body)
        .map_err(|e| ExplainerError::MalformedResponse(e.to_string()))?;

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| ExplainerError::MalformedResponse("no candidates".to_string()))?;

    let text: String = candidate
        .content
        .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(ExplainerError::MalformedResponse("candidate has no text".to_string()));
    }

    Ok(text)
}

/// Explanation provider backed by the Gemini API
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    config: GeminiConfig,
    api_key: String,
}

impl GeminiClient {
    /// Create a client; fails when no API key is configured
    pub fn new(config: GeminiConfig) -> Result<Self, ExplainerError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| ExplainerError::NotConfigured("GEMINI_API_KEY is not set".to_string()))?;

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ExplainerError::Transport(e.to_string()))?;

        info!("Gemini explanations enabled (model {}, timeout {:?})", config.model, config.timeout);

        Ok(Self { client, config, api_key })
    }

    fn map_transport_error(&self, err: reqwest::Error) -> ExplainerError {
        if err.is_timeout() {
            ExplainerError::Timeout(self.config.timeout)
        } else {
            ExplainerError::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl ExplanationProvider for GeminiClient {
    fn is_configured(&self) -> bool {
        true
    }

    async fn generate(&self, prompt: &str) -> Result<String, ExplainerError> {
        let request = GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(self.config.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.map_transport_error(e))?;

        if !status.is_success() {
            return Err(ExplainerError::Status {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY).collect(),
            });
        }

        extract_text(&body)
    }
}

/// Gemini when a key is configured, otherwise a provider that always falls back
pub fn create_default_explainer(config: GeminiConfig) -> Arc<dyn ExplanationProvider> {
    if config.api_key.is_none() {
        debug!("No Gemini API key, using the disabled explainer");
        return Arc::new(DisabledExplainer::new("GEMINI_API_KEY is not set"));
    }

    match GeminiClient::new(config) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            warn!("Could not create Gemini client, explanations disabled: {}", e);
            Arc::new(DisabledExplainer::new(e.to_string()))
        }
    }
}
