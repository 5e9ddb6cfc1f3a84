use serde::{Deserialize, Serialize};

use super::errors::ModelError;

/// Persisted scaler + random forest pipeline, exported as JSON
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelArtifact {
    /// Human readable model name
    pub name: String,

    /// Artifact version string
    #[serde(default)]
    pub version: Option<String>,

    /// Ordered feature columns the pipeline was fitted on
    pub feature_names: Vec<String>,

    /// Standard scaler parameters, one entry per feature
    pub scaler: ScalerParams,

    /// Fitted tree ensemble
    pub forest: ForestParams,

    /// Explicit feature importances; computed from the trees when absent
    #[serde(default)]
    pub feature_importances: Option<Vec<f64>>,
}

/// Standard scaler parameters: scaled = (x - mean) / scale
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScalerParams {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

/// Tree ensemble parameters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForestParams {
    pub trees: Vec<TreeParams>,
}

/// A single decision tree stored as a flat node array rooted at index 0
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TreeParams {
    pub nodes: Vec<TreeNode>,
}

/// Decision tree node
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeNode {
    /// Internal node; samples with `x[feature] <= threshold` go left
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
        #[serde(default)]
        impurity: f64,
        #[serde(default)]
        samples: f64,
    },

    /// Terminal node holding per-class weights `[negative, positive]`
    Leaf {
        value: [f64; 2],
        #[serde(default)]
        impurity: f64,
        #[serde(default)]
        samples: f64,
    },
}

impl TreeNode {
    /// Node impurity recorded at fit time
    pub fn impurity(&self) -> f64 {
        match self {
            TreeNode::Split { impurity, .. } | TreeNode::Leaf { impurity, .. } => *impurity,
        }
    }

    /// Weighted number of training samples that reached this node
    pub fn samples(&self) -> f64 {
        match self {
            TreeNode::Split { samples, .. } | TreeNode::Leaf { samples, .. } => *samples,
        }
    }
}

impl ModelArtifact {
    /// Number of feature columns
    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    /// Check the artifact for internal consistency
    pub fn validate(&self) -> Result<(), ModelError> {
        let n = self.n_features();
        if n == 0 {
            return Err(ModelError::invalid("artifact declares no feature columns"));
        }

        if self.scaler.mean.len() != n || self.scaler.scale.len() != n {
            return Err(ModelError::invalid(format!(
                "scaler has {} means and {} scales for {} features",
                self.scaler.mean.len(),
                self.scaler.scale.len(),
                n
            )));
        }

        for (idx, (mean, scale)) in self.scaler.mean.iter().zip(&self.scaler.scale).enumerate() {
            if !mean.is_finite() || !scale.is_finite() || *scale == 0.0 {
                return Err(ModelError::invalid(format!(
                    "scaler parameters for '{}' must be finite with a non-zero scale",
                    self.feature_names[idx]
                )));
            }
        }

        if self.forest.trees.is_empty() {
            return Err(ModelError::invalid("forest contains no trees"));
        }

        for (tree_idx, tree) in self.forest.trees.iter().enumerate() {
            tree.validate(n).map_err(|msg| ModelError::invalid(format!("tree {}: {}", tree_idx, msg)))?;
        }

        if let Some(importances) = &self.feature_importances {
            if importances.len() != n {
                return Err(ModelError::invalid(format!(
                    "{} feature importances for {} features",
                    importances.len(),
                    n
                )));
            }
            if importances.iter().any(|v| !v.is_finite() || *v < 0.0) {
                return Err(ModelError::invalid("feature importances must be finite and non-negative"));
            }
        }

        Ok(())
    }
}

impl TreeParams {
    /// Child links must point forward, which rules out cycles
    fn validate(&self, n_features: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }

        let len = self.nodes.len();
        for (idx, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split { feature, threshold, left, right, .. } => {
                    if *feature >= n_features {
                        return Err(format!("node {} splits on unknown feature {}", idx, feature));
                    }
                    if !threshold.is_finite() {
                        return Err(format!("node {} has a non-finite threshold", idx));
                    }
                    for child in [left, right] {
                        if *child <= idx || *child >= len {
                            return Err(format!("node {} has invalid child index {}", idx, child));
                        }
                    }
                }
                TreeNode::Leaf { value, .. } => {
                    if value.iter().any(|v| !v.is_finite() || *v < 0.0) {
                        return Err(format!("leaf {} has negative or non-finite class weights", idx));
                    }
                    if value[0] + value[1] <= 0.0 {
                        return Err(format!("leaf {} has no class weight", idx));
                    }
                }
            }
        }

        Ok(())
    }
}
