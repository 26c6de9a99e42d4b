//! Template-filled rationale text for a recommendation.

use crate::pathway::Nutrient;
use crate::optimizer::OptimizationResult;
use peptofit_schemas::{
    peptone::Peptone,
    recommendation::{ScoreComponent, SubScores},
};
use std::collections::BTreeSet;

const STRENGTH_THRESHOLD: f64 = 0.7;
const PATHWAY_STRENGTH_THRESHOLD: f64 = 0.5;
const LISTED_REQUIREMENTS: usize = 3;

fn strength_label(component: ScoreComponent) -> &'static str {
    match component {
        ScoreComponent::NutritionalMatch => "optimal nitrogen content",
        ScoreComponent::AminoAcidMatch => "excellent amino acid profile",
        ScoreComponent::GrowthFactorMatch => "rich in growth factors",
        ScoreComponent::MwDistributionMatch => "suitable peptide size distribution",
    }
}

pub fn rationale(
    peptones: &[&Peptone],
    subscores: &SubScores,
    matched: &[Nutrient],
    optimization: Option<&OptimizationResult>,
) -> String {
    let mut parts = Vec::new();

    let mut strengths: Vec<&str> = ScoreComponent::ALL
        .iter()
        .filter(|c| !subscores.insufficient_data.contains(*c))
        .filter(|c| subscores.get(**c) > STRENGTH_THRESHOLD)
        .map(|c| strength_label(*c))
        .collect();
    if subscores
        .pathway_bonus
        .is_some_and(|bonus| bonus > PATHWAY_STRENGTH_THRESHOLD)
    {
        strengths.push("matches metabolic pathway requirements");
    }
    if !strengths.is_empty() {
        parts.push(format!("Strengths: {}", strengths.join(", ")));
    }

    if peptones.len() > 1 {
        let materials: BTreeSet<&str> = peptones.iter().map(|p| p.raw_material.as_str()).collect();
        if materials.len() > 1 {
            parts.push(format!(
                "Complementary raw materials: {}",
                materials.into_iter().collect::<Vec<_>>().join(", ")
            ));
        }
    }

    if !matched.is_empty() {
        let mut listed: Vec<String> = matched
            .iter()
            .take(LISTED_REQUIREMENTS)
            .map(|n| n.to_string())
            .collect();
        if matched.len() > LISTED_REQUIREMENTS {
            listed.push(format!("{} more", matched.len() - LISTED_REQUIREMENTS));
        }
        parts.push(format!("Addresses requirements: {}", listed.join(", ")));
    }

    if subscores.is_low_confidence() {
        let missing: Vec<&str> = subscores.insufficient_data.iter().map(|c| c.key()).collect();
        parts.push(format!("Low confidence: no usable data for {}", missing.join(", ")));
    }

    if let Some(result) = optimization.filter(|r| !r.success) {
        parts.push(format!(
            "Ratio optimization did not converge ({}); ratios are the best found",
            result.message
        ));
    }

    if parts.is_empty() {
        "Good overall match".to_string()
    } else {
        parts.join("; ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use peptofit_schemas::{amino_acid::AminoAcid, peptone::Composition, recommendation::SolverStrategy};

    fn peptone(id: &str, material: &str) -> Peptone {
        Peptone {
            peptone_id: id.to_string(),
            name: id.to_string(),
            raw_material: material.to_string(),
            manufacturer: "Sempio".to_string(),
            preferred_source: Some(true),
            composition: Composition::default(),
        }
    }

    fn subscores(values: [f64; 4]) -> SubScores {
        SubScores {
            nutritional_match: values[0],
            amino_acid_match: values[1],
            growth_factor_match: values[2],
            mw_distribution_match: values[3],
            pathway_bonus: None,
            insufficient_data: BTreeSet::new(),
        }
    }

    #[test]
    fn names_strengths_and_materials() {
        let soy = peptone("S", "soy");
        let casein = peptone("C", "casein");
        let mut scores = subscores([0.9, 0.8, 0.2, 0.5]);
        scores.pathway_bonus = Some(0.6);
        let text = rationale(
            &[&soy, &casein],
            &scores,
            &[
                Nutrient::AminoAcid(AminoAcid::Lysine),
                Nutrient::AminoAcid(AminoAcid::Histidine),
                Nutrient::Vitamins,
                Nutrient::Nucleotides,
            ],
            None,
        );
        assert_eq!(
            text,
            "Strengths: optimal nitrogen content, excellent amino acid profile, matches metabolic \
             pathway requirements; Complementary raw materials: casein, soy; Addresses \
             requirements: Lysine, Histidine, vitamins, 1 more"
        );
    }

    #[test]
    fn flags_low_confidence_and_failed_solves() {
        let soy = peptone("S", "soy");
        let mut scores = subscores([0.5, 0.5, 0.5, 0.5]);
        scores.insufficient_data.insert(ScoreComponent::GrowthFactorMatch);
        let failed = OptimizationResult {
            ratios: vec![0.5, 0.5],
            objective: 0.1,
            success: false,
            iterations: 500,
            message: "iteration limit of 500 reached".to_string(),
            strategy: SolverStrategy::ProjectedGradient,
        };
        let text = rationale(&[&soy, &soy], &scores, &[], Some(&failed));
        assert!(text.contains("Low confidence: no usable data for growth_factor_match"));
        assert!(text.contains("did not converge (iteration limit of 500 reached)"));
        assert!(!text.contains("Complementary"));
    }

    #[test]
    fn falls_back_to_a_plain_note() {
        let soy = peptone("S", "soy");
        assert_eq!(rationale(&[&soy], &subscores([0.5; 4]), &[], None), "Good overall match");
    }
}
