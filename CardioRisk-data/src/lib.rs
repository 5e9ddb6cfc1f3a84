// CardioRisk Data
// This crate handles access to the persisted classifier artifact

// Model artifact format, loading and evaluation
pub mod model;

// Re-export the types most callers need
pub use model::{load_pipeline, ForestPipeline, ModelArtifact, ModelError};
