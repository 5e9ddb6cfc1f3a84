use tracing::debug;

use super::artifact::{ModelArtifact, TreeNode, TreeParams};
use super::errors::ModelError;

/// Validated, ready-to-evaluate scaler + forest pipeline
///
/// Immutable once built; share it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct ForestPipeline {
    artifact: ModelArtifact,
    importances: Vec<f64>,
}

impl ForestPipeline {
    /// Build a pipeline from a parsed artifact
    pub fn new(artifact: ModelArtifact) -> Result<Self, ModelError> {
        artifact.validate()?;

        let importances = match &artifact.feature_importances {
            Some(explicit) => explicit.clone(),
            None => {
                debug!("Artifact has no explicit importances, computing from tree impurity");
                impurity_importances(&artifact)
            }
        };

        Ok(Self { artifact, importances })
    }

    /// Model name from the artifact
    pub fn name(&self) -> &str {
        &self.artifact.name
    }

    /// Artifact version, if recorded
    pub fn version(&self) -> Option<&str> {
        self.artifact.version.as_deref()
    }

    /// Ordered feature columns expected by [`predict_proba`](Self::predict_proba)
    pub fn feature_names(&self) -> &[String] {
        &self.artifact.feature_names
    }

    /// Per-feature importance scores, aligned with [`feature_names`](Self::feature_names)
    pub fn feature_importances(&self) -> &[f64] {
        &self.importances
    }

    /// Number of trees in the ensemble
    pub fn n_trees(&self) -> usize {
        self.artifact.forest.trees.len()
    }

    /// Probability of the positive class for a single unscaled feature row
    pub fn predict_proba(&self, row: &[f64]) -> Result<f64, ModelError> {
        let expected = self.artifact.n_features();
        if row.len() != expected {
            return Err(ModelError::FeatureCount { expected, actual: row.len() });
        }

        let scaler = &self.artifact.scaler;
        let mut scaled = Vec::with_capacity(expected);
        for (idx, value) in row.iter().enumerate() {
            if !value.is_finite() {
                return Err(ModelError::NonFinite(self.artifact.feature_names[idx].clone()));
            }
            scaled.push((value - scaler.mean[idx]) / scaler.scale[idx]);
        }

        let trees = &self.artifact.forest.trees;
        let total: f64 = trees.iter().map(|tree| tree_probability(tree, &scaled)).sum();

        Ok(total / trees.len() as f64)
    }
}

/// Walk a tree from the root to a leaf and return its positive-class share
fn tree_probability(tree: &TreeParams, scaled: &[f64]) -> f64 {
    let mut idx = 0;
    loop {
        match &tree.nodes[idx] {
            TreeNode::Split { feature, threshold, left, right, .. } => {
                idx = if scaled[*feature] <= *threshold { *left } else { *right };
            }
            TreeNode::Leaf { value, .. } => {
                return value[1] / (value[0] + value[1]);
            }
        }
    }
}

/// Mean decrease in impurity, normalized per tree, averaged over the forest
fn impurity_importances(artifact: &ModelArtifact) -> Vec<f64> {
    let n = artifact.n_features();
    let mut totals = vec![0.0; n];

    for tree in &artifact.forest.trees {
        let mut tree_scores = vec![0.0; n];
        for node in &tree.nodes {
            if let TreeNode::Split { feature, left, right, .. } = node {
                let left_node = &tree.nodes[*left];
                let right_node = &tree.nodes[*right];
                let decrease = node.samples() * node.impurity()
                    - left_node.samples() * left_node.impurity()
                    - right_node.samples() * right_node.impurity();
                tree_scores[*feature] += decrease.max(0.0);
            }
        }

        let tree_sum: f64 = tree_scores.iter().sum();
        if tree_sum > 0.0 {
            for (total, score) in totals.iter_mut().zip(tree_scores) {
                *total += score / tree_sum;
            }
        }
    }

    let sum: f64 = totals.iter().sum();
    if sum > 0.0 {
        totals.iter_mut().for_each(|v| *v /= sum);
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::artifact::{ForestParams, ScalerParams};
    use crate::model::fixtures::sample_artifact;

    fn stump(feature: usize, threshold: f64, low: [f64; 2], high: [f64; 2]) -> TreeParams {
        TreeParams {
            nodes: vec![
                TreeNode::Split { feature, threshold, left: 1, right: 2, impurity: 0.5, samples: 100.0 },
                TreeNode::Leaf { value: low, impurity: 0.0, samples: 50.0 },
                TreeNode::Leaf { value: high, impurity: 0.0, samples: 50.0 },
            ],
        }
    }

    fn two_feature_artifact(trees: Vec<TreeParams>) -> ModelArtifact {
        ModelArtifact {
            name: "test".to_string(),
            version: None,
            feature_names: vec!["age".to_string(), "bmi".to_string()],
            scaler: ScalerParams { mean: vec![50.0, 25.0], scale: vec![10.0, 5.0] },
            forest: ForestParams { trees },
            feature_importances: None,
        }
    }

    #[test]
    fn test_single_stump_uses_scaled_threshold() {
        // Threshold 0.0 in scaled space means "at or below the mean"
        let pipeline = ForestPipeline::new(two_feature_artifact(vec![
            stump(0, 0.0, [9.0, 1.0], [2.0, 8.0]),
        ]))
        .unwrap();

        let low = pipeline.predict_proba(&[50.0, 25.0]).unwrap();
        let high = pipeline.predict_proba(&[60.0, 25.0]).unwrap();

        assert!((low - 0.1).abs() < 1e-12);
        assert!((high - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_forest_averages_tree_probabilities() {
        let pipeline = ForestPipeline::new(two_feature_artifact(vec![
            stump(0, 0.0, [1.0, 0.0], [0.0, 1.0]),
            stump(1, 0.0, [1.0, 1.0], [1.0, 3.0]),
        ]))
        .unwrap();

        // Tree 1 -> 1.0 (age above mean), tree 2 -> 0.5 (bmi at mean)
        let p = pipeline.predict_proba(&[70.0, 25.0]).unwrap();
        assert!((p - 0.75).abs() < 1e-12);
        assert_eq!(pipeline.n_trees(), 2);
    }

    #[test]
    fn test_predict_rejects_wrong_width_and_nan() {
        let pipeline = ForestPipeline::new(two_feature_artifact(vec![
            stump(0, 0.0, [1.0, 0.0], [0.0, 1.0]),
        ]))
        .unwrap();

        let err = pipeline.predict_proba(&[1.0]).unwrap_err();
        assert!(matches!(err, ModelError::FeatureCount { expected: 2, actual: 1 }));

        let err = pipeline.predict_proba(&[f64::NAN, 1.0]).unwrap_err();
        assert!(err.to_string().contains("age"));
    }

    #[test]
    fn test_impurity_importances_are_normalized() {
        let pipeline = ForestPipeline::new(two_feature_artifact(vec![
            stump(0, 0.0, [1.0, 0.0], [0.0, 1.0]),
            stump(0, 1.0, [1.0, 0.0], [0.0, 1.0]),
            stump(1, 0.0, [1.0, 0.0], [0.0, 1.0]),
        ]))
        .unwrap();

        let importances = pipeline.feature_importances();
        assert_eq!(importances.len(), 2);
        assert!((importances.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert!((importances[0] - 2.0 / 3.0).abs() < 1e-12);
        assert!((importances[1] - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_explicit_importances_win() {
        let mut artifact = two_feature_artifact(vec![stump(0, 0.0, [1.0, 0.0], [0.0, 1.0])]);
        artifact.feature_importances = Some(vec![0.3, 0.7]);

        let pipeline = ForestPipeline::new(artifact).unwrap();
        assert_eq!(pipeline.feature_importances(), &[0.3, 0.7]);
    }

    #[test]
    fn test_sample_artifact_predicts_in_unit_interval() {
        let pipeline = ForestPipeline::new(sample_artifact()).unwrap();
        assert_eq!(pipeline.feature_names().len(), 10);

        let row = [55.0, 1.0, 140.0, 90.0, 2.0, 1.0, 1.0, 0.0, 0.0, 28.0];
        let p = pipeline.predict_proba(&row).unwrap();
        assert!((0.0..=1.0).contains(&p));
        // Leaves reached: 0.88, 0.62, 0.48
        assert!((p - 0.66).abs() < 1e-9);
    }
}
