use std::path::Path;
use tracing::info;

use super::artifact::ModelArtifact;
use super::errors::ModelError;
use super::forest::ForestPipeline;

/// Default location of the exported pipeline, relative to the working directory
pub const DEFAULT_MODEL_PATH: &str = "models/cardio_pipeline.json";

/// Parse an artifact from its JSON text without validating it
pub fn parse_artifact(json: &str) -> Result<ModelArtifact, ModelError> {
    Ok(serde_json::from_str::<ModelArtifact>(json)?)
}

/// Read and parse an artifact file
pub fn load_artifact(path: impl AsRef<Path>) -> Result<ModelArtifact, ModelError> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path).map_err(|source| ModelError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_artifact(&json)
}

/// Read, parse and validate an artifact file into a ready pipeline
pub fn load_pipeline(path: impl AsRef<Path>) -> Result<ForestPipeline, ModelError> {
    let path = path.as_ref();
    let pipeline = ForestPipeline::new(load_artifact(path)?)?;

    info!(
        "Loaded model '{}' ({} trees, {} features) from {}",
        pipeline.name(),
        pipeline.n_trees(),
        pipeline.feature_names().len(),
        path.display()
    );

    Ok(pipeline)
}
