use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// The four weighted terms of the fitness score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreComponent {
    NutritionalMatch,
    AminoAcidMatch,
    GrowthFactorMatch,
    MwDistributionMatch,
}

impl ScoreComponent {
    pub const ALL: [ScoreComponent; 4] = [
        ScoreComponent::NutritionalMatch,
        ScoreComponent::AminoAcidMatch,
        ScoreComponent::GrowthFactorMatch,
        ScoreComponent::MwDistributionMatch,
    ];

    pub fn key(self) -> &'static str {
        match self {
            ScoreComponent::NutritionalMatch => "nutritional_match",
            ScoreComponent::AminoAcidMatch => "amino_acid_match",
            ScoreComponent::GrowthFactorMatch => "growth_factor_match",
            ScoreComponent::MwDistributionMatch => "mw_distribution_match",
        }
    }
}

impl fmt::Display for ScoreComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Sub-scores of one fitness evaluation, each in [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubScores {
    pub nutritional_match: f64,
    pub amino_acid_match: f64,
    pub growth_factor_match: f64,
    pub mw_distribution_match: f64,
    /// Share of the strain's pathway-inferred requirements the product supplies; absent when no
    /// pathway data was available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pathway_bonus: Option<f64>,
    /// Components that had no usable inputs and were set to the neutral midpoint.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub insufficient_data: BTreeSet<ScoreComponent>,
}

impl SubScores {
    pub fn get(&self, component: ScoreComponent) -> f64 {
        match component {
            ScoreComponent::NutritionalMatch => self.nutritional_match,
            ScoreComponent::AminoAcidMatch => self.amino_acid_match,
            ScoreComponent::GrowthFactorMatch => self.growth_factor_match,
            ScoreComponent::MwDistributionMatch => self.mw_distribution_match,
        }
    }

    pub fn is_low_confidence(&self) -> bool {
        !self.insufficient_data.is_empty()
    }

    /// Named view, including `pathway_bonus` when present.
    pub fn as_map(&self) -> BTreeMap<&'static str, f64> {
        let mut map: BTreeMap<&'static str, f64> = ScoreComponent::ALL
            .iter()
            .map(|c| (c.key(), self.get(*c)))
            .collect();
        if let Some(bonus) = self.pathway_bonus {
            map.insert("pathway_bonus", bonus);
        }
        map
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverStrategy {
    /// Local projected-gradient descent from uniform ratios.
    ProjectedGradient,
    /// Population-based differential evolution.
    DifferentialEvolution,
}

impl fmt::Display for SolverStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverStrategy::ProjectedGradient => f.write_str("projected gradient"),
            SolverStrategy::DifferentialEvolution => f.write_str("differential evolution"),
        }
    }
}

/// How the ratios of a blend recommendation were found.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationSummary {
    pub strategy: SolverStrategy,
    pub success: bool,
    pub iterations: usize,
    /// Weighted squared deviation from the strain's target profile at the returned ratios.
    pub objective: f64,
    pub message: String,
}

/// A ranked single-peptone or blend recommendation for one strain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub strain_id: String,
    pub peptone_ids: Vec<String>,
    pub peptone_names: Vec<String>,
    /// Mixing ratios, parallel to `peptone_ids`; `[1.0]` for a single product.
    pub ratios: Vec<f64>,
    pub overall_score: f64,
    pub subscores: SubScores,
    pub rationale: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimization: Option<OptimizationSummary>,
}

impl Recommendation {
    pub fn component_count(&self) -> usize {
        self.peptone_ids.len()
    }

    pub fn is_blend(&self) -> bool {
        self.component_count() > 1
    }

    /// "Soy S1" for a single product, "Soy S1 60% + Casein C2 40%" for a blend.
    pub fn description(&self) -> String {
        if !self.is_blend() {
            return self.peptone_names.first().cloned().unwrap_or_default();
        }
        self.peptone_names
            .iter()
            .zip(&self.ratios)
            .map(|(name, ratio)| format!("{} {:.0}%", name, ratio * 100.0))
            .collect::<Vec<_>>()
            .join(" + ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subscores() -> SubScores {
        SubScores {
            nutritional_match: 0.9,
            amino_acid_match: 0.6,
            growth_factor_match: 0.5,
            mw_distribution_match: 0.7,
            pathway_bonus: None,
            insufficient_data: BTreeSet::new(),
        }
    }

    #[test]
    fn description_lists_blend_shares() {
        let rec = Recommendation {
            strain_id: "KCCM 12116".to_string(),
            peptone_ids: vec!["A".to_string(), "B".to_string()],
            peptone_names: vec!["Soy S1".to_string(), "Casein C2".to_string()],
            ratios: vec![0.6, 0.4],
            overall_score: 0.71,
            subscores: subscores(),
            rationale: String::new(),
            optimization: None,
        };
        assert!(rec.is_blend());
        assert_eq!(rec.description(), "Soy S1 60% + Casein C2 40%");
    }

    #[test]
    fn map_view_includes_pathway_bonus_only_when_present() {
        let mut scores = subscores();
        assert_eq!(scores.as_map().len(), 4);
        scores.pathway_bonus = Some(0.5);
        assert_eq!(scores.as_map()["pathway_bonus"], 0.5);
        assert_eq!(scores.as_map()["amino_acid_match"], 0.6);
    }
}
