use thiserror::Error;

/// Error type for model artifact operations
#[derive(Error, Debug)]
pub enum ModelError {
    /// The artifact file could not be read
    #[error("Failed to read model artifact {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The artifact is not valid JSON or does not match the expected layout
    #[error("Failed to parse model artifact: {0}")]
    Parse(#[from] serde_json::Error),

    /// The artifact parsed but is internally inconsistent
    #[error("Invalid model artifact: {0}")]
    Invalid(String),

    /// A feature row did not have the number of columns the model expects
    #[error("Feature count mismatch: expected {expected}, got {actual}")]
    FeatureCount { expected: usize, actual: usize },

    /// A feature value was NaN or infinite
    #[error("Non-finite value for feature '{0}'")]
    NonFinite(String),
}

impl ModelError {
    /// Shorthand for an invalid artifact error
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        ModelError::Invalid(message.into())
    }
}
