use crate::entities::assessment::RiskCategory;

/// Highest probability ever reported, to avoid presenting near-certainty
pub const RISK_CEILING: f64 = 0.95;

/// Relative-risk multiplier for the number of affected first-degree relatives
pub fn relative_risk_multiplier(relatives: u32) -> f64 {
    match relatives {
        0 => 1.0,
        1 => 1.6,
        _ => 2.3,
    }
}

/// Compound a base probability by a relative-risk multiplier, without the ceiling
///
/// `1 - (1 - p)^m`; a multiplier of exactly 1 returns `p` unchanged.
pub fn compound_risk(base_probability: f64, multiplier: f64) -> f64 {
    if multiplier == 1.0 {
        return base_probability;
    }
    1.0 - (1.0 - base_probability).powf(multiplier)
}

/// Adjust a base probability for family history and apply [`RISK_CEILING`]
pub fn adjust_for_family_history(base_probability: f64, relatives: u32) -> f64 {
    let multiplier = relative_risk_multiplier(relatives);
    compound_risk(base_probability, multiplier).min(RISK_CEILING)
}

/// Categorize an adjusted probability
pub fn categorize_risk(adjusted_probability: f64) -> RiskCategory {
    if adjusted_probability < 0.25 {
        RiskCategory::Low
    } else if adjusted_probability < 0.50 {
        RiskCategory::Borderline
    } else if adjusted_probability < 0.75 {
        RiskCategory::Elevated
    } else {
        RiskCategory::High
    }
}

/// Probability as a percentage rounded to two decimals
pub fn to_percent(probability: f64) -> f64 {
    (probability * 100.0 * 100.0).round() / 100.0
}
