// Model module structure
pub mod errors;
mod artifact;
mod forest;
mod loader;

// Re-export commonly used types
pub use errors::ModelError;
pub use artifact::{ForestParams, ModelArtifact, ScalerParams, TreeNode, TreeParams};
pub use forest::ForestPipeline;
pub use loader::{load_artifact, load_pipeline, parse_artifact, DEFAULT_MODEL_PATH};

// Fixture artifacts for both testing and when mock feature is enabled
#[cfg(any(test, feature = "mock"))]
pub mod fixtures;
