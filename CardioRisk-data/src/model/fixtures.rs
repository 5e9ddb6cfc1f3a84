// Fixture artifacts for tests in this and dependent crates
// This module is only available in tests or with the "mock" feature

use super::artifact::ModelArtifact;
use super::forest::ForestPipeline;
use super::loader::parse_artifact;

/// The demo artifact shipped under `models/`
pub const SAMPLE_ARTIFACT_JSON: &str = include_str!("../../../models/cardio_pipeline.json");

/// Parsed demo artifact
pub fn sample_artifact() -> ModelArtifact {
    parse_artifact(SAMPLE_ARTIFACT_JSON).expect("bundled demo artifact must parse")
}

/// Ready-to-evaluate demo pipeline
pub fn sample_pipeline() -> ForestPipeline {
    ForestPipeline::new(sample_artifact()).expect("bundled demo artifact must validate")
}
