use std::fmt::Write;

use crate::entities::assessment::{RiskAssessment, RiskCategory, RiskReport};
use crate::services::ranking::REPORT_TOP_K;
use crate::services::risk::to_percent;

/// Disclaimer attached to every report
pub const REPORT_DISCLAIMER: &str =
    "This tool provides probabilistic risk screening. It is NOT a medical diagnosis.";

/// Guidance line for a category
pub fn interpretation(category: RiskCategory) -> &'static str {
    match category {
        RiskCategory::Low => "Maintain healthy lifestyle.",
        RiskCategory::Borderline => "Monitor blood pressure and cholesterol regularly.",
        RiskCategory::Elevated => "Lifestyle modification strongly recommended.",
        RiskCategory::High => "Clinical evaluation and medical consultation advised.",
    }
}

/// Build the standalone report for an assessment
pub fn build_report(assessment: &RiskAssessment) -> RiskReport {
    RiskReport {
        base_percent: to_percent(assessment.base_probability),
        multiplier: assessment.family_history.then_some(assessment.multiplier),
        adjusted_percent: assessment.risk_percent,
        category: assessment.category,
        top_factors: assessment.top_factors.iter().take(REPORT_TOP_K).cloned().collect(),
        interpretation: interpretation(assessment.category).to_string(),
        disclaimer: REPORT_DISCLAIMER.to_string(),
    }
}

/// Plain-text rendering of a report
pub fn render_text(report: &RiskReport) -> String {
    let mut out = String::new();

    // Writing to a String cannot fail
    let _ = writeln!(out, "CARDIOVASCULAR RISK REPORT");
    let _ = writeln!(out, "Base model risk: {:.2}%", report.base_percent);
    if let Some(multiplier) = report.multiplier {
        let _ = writeln!(out, "Family history multiplier: x{}", multiplier);
    }
    let _ = writeln!(out, "Adjusted risk: {:.2}%", report.adjusted_percent);
    let _ = writeln!(out, "Category: {}", report.category.label());
    let _ = writeln!(out);
    let _ = writeln!(out, "Top contributing factors:");
    for factor in &report.top_factors {
        let _ = writeln!(out, "- {} ({:.4})", factor.name, factor.score);
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Interpretation: {}", report.interpretation);
    let _ = writeln!(out, "{}", report.disclaimer);

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::assessment::{ExplanationOutcome, FeatureImportance};
    use chrono::Utc;
    use uuid::Uuid;

    fn assessment(relatives_multiplier: Option<f64>, base: f64, adjusted: f64, category: RiskCategory) -> RiskAssessment {
        RiskAssessment {
            id: Uuid::new_v4(),
            base_probability: base,
            multiplier: relatives_multiplier.unwrap_or(1.0),
            adjusted_probability: adjusted,
            risk_percent: to_percent(adjusted),
            category,
            family_history: relatives_multiplier.is_some(),
            top_factors: ["bmi", "age", "ap_hi", "ap_lo", "cholesterol", "gluc"]
                .iter()
                .enumerate()
                .map(|(i, name)| FeatureImportance { name: name.to_string(), score: 0.3 - i as f64 * 0.05 })
                .collect(),
            explanation: ExplanationOutcome::Unavailable { reason: "not configured".to_string() },
            assessed_at: Utc::now(),
        }
    }

    #[test]
    fn test_report_with_family_history() {
        let report = build_report(&assessment(Some(2.3), 0.10, 0.2152017, RiskCategory::Low));

        assert_eq!(report.base_percent, 10.0);
        assert_eq!(report.multiplier, Some(2.3));
        assert_eq!(report.adjusted_percent, 21.52);
        assert_eq!(report.top_factors.len(), REPORT_TOP_K);
        assert_eq!(report.top_factors[0].name, "bmi");
        assert_eq!(report.interpretation, "Maintain healthy lifestyle.");
        assert_eq!(report.disclaimer, REPORT_DISCLAIMER);
    }

    #[test]
    fn test_report_without_family_history_omits_multiplier() {
        let report = build_report(&assessment(None, 0.6, 0.6, RiskCategory::Elevated));
        assert_eq!(report.multiplier, None);

        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("multiplier").is_none());
        assert_eq!(json["category"], "elevated");

        let text = render_text(&report);
        assert!(!text.contains("multiplier"));
        assert!(text.contains("Adjusted risk: 60.00%"));
        assert!(text.contains("Lifestyle modification strongly recommended."));
    }

    #[test]
    fn test_interpretation_per_category() {
        assert_eq!(interpretation(RiskCategory::Borderline), "Monitor blood pressure and cholesterol regularly.");
        assert_eq!(interpretation(RiskCategory::High), "Clinical evaluation and medical consultation advised.");
    }

    #[test]
    fn test_render_text_lists_factors_and_disclaimer() {
        let text = render_text(&build_report(&assessment(Some(1.6), 0.6, 0.7691, RiskCategory::High)));
        assert!(text.contains("Family history multiplier: x1.6"));
        assert!(text.contains("Category: High Risk"));
        assert!(text.contains("- bmi (0.3000)"));
        assert!(!text.contains("- gluc"));
        assert!(text.trim_end().ends_with("It is NOT a medical diagnosis."));
    }
}
