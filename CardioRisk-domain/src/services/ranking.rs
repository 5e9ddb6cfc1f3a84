use thiserror::Error;

use crate::entities::assessment::FeatureImportance;

/// Factors embedded in the served explanation prompt
pub const EXPLANATION_TOP_K: usize = 3;

/// Factors listed in the standalone report
pub const REPORT_TOP_K: usize = 5;

/// Feature ranking errors
#[derive(Debug, Error, PartialEq)]
pub enum RankingError {
    /// Names and scores are not parallel
    #[error("Got {names} feature names but {scores} importance scores")]
    LengthMismatch { names: usize, scores: usize },
}

/// Rank features by descending importance, keeping input order on ties
pub fn rank_features(
    names: &[String],
    scores: &[f64],
    top_k: usize,
) -> Result<Vec<FeatureImportance>, RankingError> {
    if names.len() != scores.len() {
        return Err(RankingError::LengthMismatch { names: names.len(), scores: scores.len() });
    }

    let mut ranked: Vec<FeatureImportance> = names
        .iter()
        .zip(scores)
        .map(|(name, score)| FeatureImportance { name: name.clone(), score: *score })
        .collect();

    // sort_by is stable
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked.truncate(top_k);

    Ok(ranked)
}

/// Comma-joined names of the first `k` ranked factors
pub fn join_factor_names(ranked: &[FeatureImportance], k: usize) -> String {
    ranked
        .iter()
        .take(k)
        .map(|f| f.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
