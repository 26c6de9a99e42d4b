//! Fitness scorer: the weighted four-term match between a strain and a peptone or blend.
//!
//! Each sub-score is averaged only over the inputs that were actually measured. A sub-score with
//! no measured inputs falls back to [`NEUTRAL_MIDPOINT`] and is listed in
//! [`SubScores::insufficient_data`], with one exception: a fastidious strain whose required growth
//! factors are all unmeasured scores zero on that term.

use crate::pathway::{pathway_bonus, Nutrient, NutrientRequirements};
use crate::profile::{Feature, NutrientProfile};
use crate::settings::{
    AMINO_ACID_WEIGHT, GROWTH_FACTOR_WEIGHT, MW_DISTRIBUTION_WEIGHT, NEUTRAL_MIDPOINT,
    NUTRITIONAL_WEIGHT,
};
use crate::targets::{
    StrainTargets, TargetTable, BCAA_IDEAL_WEIGHT, COMBINED_GROWTH_FACTOR_SATURATION,
    EAA_IDEAL_WEIGHT, FREE_AA_IDEAL_WEIGHT, NUCLEOTIDE_SATURATION, VITAMIN_SATURATION,
};
use peptofit_schemas::{
    level::Level,
    pathway::PathwayLookup,
    peptone::Mixable,
    recommendation::{ScoreComponent, SubScores},
    strain::{NutritionalType, Strain},
};
use std::collections::BTreeSet;

/// Weight of one sub-score in the overall score.
pub fn component_weight(component: ScoreComponent) -> f64 {
    match component {
        ScoreComponent::NutritionalMatch => NUTRITIONAL_WEIGHT,
        ScoreComponent::AminoAcidMatch => AMINO_ACID_WEIGHT,
        ScoreComponent::GrowthFactorMatch => GROWTH_FACTOR_WEIGHT,
        ScoreComponent::MwDistributionMatch => MW_DISTRIBUTION_WEIGHT,
    }
}

/// `min(1, value / saturation)`, or `None` when unmeasured.
fn ramp(level: Level, saturation: f64) -> Option<f64> {
    level.known().map(|value| (value / saturation).min(1.0))
}

/// Weighted mean over the terms that are present.
fn weighted_mean<I: IntoIterator<Item = (Option<f64>, f64)>>(terms: I) -> Option<f64> {
    let (sum, weight) = terms
        .into_iter()
        .filter_map(|(score, w)| score.map(|s| (s * w, w)))
        .fold((0.0, 0.0), |(sum, weight), (s, w)| (sum + s, weight + w));
    (weight > 0.0).then(|| sum / weight)
}

pub fn nutritional_match(targets: &StrainTargets, profile: &NutrientProfile) -> Option<f64> {
    let band = &targets.nitrogen;
    weighted_mean([
        (
            ramp(profile.level(Feature::TotalNitrogen), band.total_nitrogen_saturation),
            band.total_nitrogen_weight,
        ),
        (
            ramp(profile.level(Feature::AminoNitrogen), band.amino_nitrogen_saturation),
            band.amino_nitrogen_weight,
        ),
    ])
}

pub fn amino_acid_match(targets: &StrainTargets, profile: &NutrientProfile) -> Option<f64> {
    let ideals = &targets.amino_acids;
    weighted_mean([
        (ramp(profile.level(Feature::EssentialAaRatio), ideals.essential), EAA_IDEAL_WEIGHT),
        (ramp(profile.level(Feature::FreeAaRatio), ideals.free), FREE_AA_IDEAL_WEIGHT),
        (ramp(profile.level(Feature::BcaaRatio), ideals.branched_chain), BCAA_IDEAL_WEIGHT),
    ])
}

/// Coverage of the growth factors the strain's tags ask for. Returns the score and whether any
/// input was measured.
pub fn growth_factor_match(targets: &StrainTargets, profile: &NutrientProfile) -> (f64, bool) {
    let needs = targets.growth_factors;
    let nucleotides = profile.level(Feature::Nucleotides);
    let vitamins = profile.level(Feature::Vitamins);

    if !needs.any() {
        return match ramp(Level::sum([nucleotides, vitamins]), COMBINED_GROWTH_FACTOR_SATURATION) {
            Some(score) => (score, true),
            None => (NEUTRAL_MIDPOINT, false),
        };
    }

    let mut terms = Vec::with_capacity(2);
    if needs.nucleotides {
        terms.push((ramp(nucleotides, NUCLEOTIDE_SATURATION), 0.5));
    }
    if needs.vitamins {
        terms.push((ramp(vitamins, VITAMIN_SATURATION), 0.5));
    }
    match weighted_mean(terms) {
        Some(score) => (score, true),
        None if targets.nutritional_type == NutritionalType::Fastidious => (0.0, false),
        None => (NEUTRAL_MIDPOINT, false),
    }
}

/// One minus the mean relative deviation from the target histogram, over measured buckets.
pub fn mw_distribution_match(targets: &StrainTargets, profile: &NutrientProfile) -> Option<f64> {
    let deviations: Vec<f64> = targets
        .mw_histogram
        .iter()
        .filter(|(_, target)| *target > 0.0)
        .filter_map(|(bucket, target)| {
            profile
                .level(Feature::MwShare(bucket))
                .known()
                .map(|share| (share - target).abs() / target)
        })
        .collect();
    if deviations.is_empty() {
        return None;
    }
    let mean = deviations.iter().sum::<f64>() / deviations.len() as f64;
    Some(1.0 - mean.min(1.0))
}

#[derive(Debug, Clone, PartialEq)]
pub struct FitnessScore {
    pub overall: f64,
    pub subscores: SubScores,
    /// Required nutrients the product supplies, when pathway data was available.
    pub matched_nutrients: Vec<Nutrient>,
}

/// A strain's looked-up targets plus any pathway-inferred requirements, resolved once per request.
#[derive(Debug, Clone)]
pub struct ScoringContext<'a> {
    pub strain: &'a Strain,
    pub targets: StrainTargets,
    pub requirements: Option<NutrientRequirements>,
}

#[derive(Debug, Clone)]
pub struct FitnessScorer {
    table: TargetTable,
    pathway_bonus_weight: f64,
}

impl FitnessScorer {
    pub fn new(table: TargetTable, pathway_bonus_weight: f64) -> Self {
        Self {
            table,
            pathway_bonus_weight,
        }
    }

    pub fn table(&self) -> &TargetTable {
        &self.table
    }

    pub fn context<'a>(&self, strain: &'a Strain, pathways: &PathwayLookup) -> ScoringContext<'a> {
        ScoringContext {
            strain,
            targets: self.table.lookup(strain),
            requirements: NutrientRequirements::from_lookup(pathways),
        }
    }

    /// Scores one profile (a single product, or an already blended one).
    pub fn score(&self, context: &ScoringContext<'_>, profile: &NutrientProfile) -> FitnessScore {
        let targets = &context.targets;
        let mut insufficient_data = BTreeSet::new();
        let mut or_midpoint = |component: ScoreComponent, score: Option<f64>| {
            score.unwrap_or_else(|| {
                insufficient_data.insert(component);
                NEUTRAL_MIDPOINT
            })
        };

        let nutritional = or_midpoint(
            ScoreComponent::NutritionalMatch,
            nutritional_match(targets, profile),
        );
        let amino_acid = or_midpoint(
            ScoreComponent::AminoAcidMatch,
            amino_acid_match(targets, profile),
        );
        let mw = or_midpoint(
            ScoreComponent::MwDistributionMatch,
            mw_distribution_match(targets, profile),
        );
        let (growth_factor, measured) = growth_factor_match(targets, profile);
        if !measured {
            insufficient_data.insert(ScoreComponent::GrowthFactorMatch);
        }

        let base = NUTRITIONAL_WEIGHT * nutritional
            + AMINO_ACID_WEIGHT * amino_acid
            + GROWTH_FACTOR_WEIGHT * growth_factor
            + MW_DISTRIBUTION_WEIGHT * mw;

        let bonus = context
            .requirements
            .as_ref()
            .map(|requirements| pathway_bonus(requirements, profile));
        let overall = match &bonus {
            Some(b) => (base * (1.0 + self.pathway_bonus_weight * b.bonus)).clamp(0.0, 1.0),
            None => base.clamp(0.0, 1.0),
        };

        FitnessScore {
            overall,
            subscores: SubScores {
                nutritional_match: nutritional,
                amino_acid_match: amino_acid,
                growth_factor_match: growth_factor,
                mw_distribution_match: mw,
                pathway_bonus: bonus.as_ref().map(|b| b.bonus),
                insufficient_data,
            },
            matched_nutrients: bonus.map(|b| b.matched).unwrap_or_default(),
        }
    }

    /// Scores the ratio-weighted mix of `parts`.
    pub fn score_blend(
        &self,
        context: &ScoringContext<'_>,
        parts: &[(&NutrientProfile, f64)],
    ) -> FitnessScore {
        self.score(context, &NutrientProfile::mix(parts))
    }
}

impl Default for FitnessScorer {
    fn default() -> Self {
        Self::new(TargetTable::standard(), crate::settings::PATHWAY_BONUS_WEIGHT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use peptofit_schemas::amino_acid::AminoAcid;
    use peptofit_schemas::pathway::OrganismPathways;
    use peptofit_schemas::peptone::Composition;
    use peptofit_schemas::strain::StrainRecord;
    use std::collections::BTreeMap;

    fn strain(genus: &str) -> Strain {
        Strain::from(StrainRecord {
            strain_id: "KCTC 3108".to_string(),
            genus: genus.to_string(),
            species: "sp.".to_string(),
            category: None,
            temperature_c: None,
            medium: None,
            ncbi_taxonomy_id: None,
            notes: Vec::new(),
        })
    }

    fn rich() -> Composition {
        let mut c = Composition::default();
        c.general.total_nitrogen = Level::Known(90.0);
        c.general.amino_nitrogen = Level::Known(20.0);
        c.nucleotides.amp = Level::Known(25.0);
        c.vitamins.b3 = Level::Known(12.0);
        c
    }

    #[test]
    fn weighted_sum_without_pathway_data() {
        let scorer = FitnessScorer::default();
        let lab = strain("Lactobacillus");
        let ctx = scorer.context(&lab, &PathwayLookup::not_requested());
        let score = scorer.score(&ctx, &NutrientProfile::of(&rich()));
        let s = &score.subscores;
        let expected = 0.40 * s.nutritional_match
            + 0.25 * s.amino_acid_match
            + 0.20 * s.growth_factor_match
            + 0.15 * s.mw_distribution_match;
        assert!((score.overall - expected).abs() < 1e-12);
        assert_eq!(s.nutritional_match, 1.0);
        assert_eq!(s.growth_factor_match, 1.0);
        assert_eq!(s.pathway_bonus, None);
        assert!(s.insufficient_data.contains(&ScoreComponent::AminoAcidMatch));
        assert!(s.insufficient_data.contains(&ScoreComponent::MwDistributionMatch));
    }

    #[test]
    fn fastidious_strain_scores_zero_without_growth_factor_data() {
        let scorer = FitnessScorer::default();
        let lab = strain("Lactobacillus");
        let ctx = scorer.context(&lab, &PathwayLookup::not_requested());
        let score = scorer.score(&ctx, &NutrientProfile::default());
        assert_eq!(score.subscores.growth_factor_match, 0.0);
        assert_eq!(score.subscores.nutritional_match, NEUTRAL_MIDPOINT);
        assert!(score.subscores.is_low_confidence());
    }

    #[test]
    fn unknown_vitamins_give_the_midpoint_for_moderate_strains() {
        let scorer = FitnessScorer::default();
        let yeast = strain("Saccharomyces");
        let ctx = scorer.context(&yeast, &PathwayLookup::not_requested());
        let score = scorer.score(&ctx, &NutrientProfile::default());
        assert_eq!(score.subscores.growth_factor_match, NEUTRAL_MIDPOINT);
    }

    #[test]
    fn partial_ratios_are_averaged_over_known_terms_only() {
        let scorer = FitnessScorer::default();
        let lab = strain("Lactobacillus");
        let ctx = scorer.context(&lab, &PathwayLookup::not_requested());
        let mut c = Composition::default();
        c.general.amino_nitrogen = Level::Known(7.5);
        let score = scorer.score(&ctx, &NutrientProfile::of(&c));
        assert!((score.subscores.nutritional_match - 0.5).abs() < 1e-12);
    }

    #[test]
    fn mw_match_is_one_on_target() {
        let targets = TargetTable::standard().lookup(&strain("Bacillus"));
        let mut c = Composition::default();
        c.molecular_weight.pct_below_250 = Level::Known(15.0);
        c.molecular_weight.pct_above_1000 = Level::Known(40.0);
        let mw = |c: &Composition| {
            mw_distribution_match(&targets, &NutrientProfile::of(c)).unwrap_or_default()
        };
        assert!((mw(&c) - 1.0).abs() < 1e-12);
        c.molecular_weight.pct_above_1000 = Level::Known(20.0);
        assert!((mw(&c) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn pathway_bonus_raises_overall_score() {
        let scorer = FitnessScorer::default();
        let lab = strain("Lactobacillus");
        let mut composition = rich();
        composition.free_amino_acids.insert(AminoAcid::Lysine, Level::Known(1.0));
        let composition = NutrientProfile::of(&composition);
        let plain = scorer.score(&scorer.context(&lab, &PathwayLookup::not_requested()), &composition);
        let lookup = PathwayLookup::Resolved {
            pathways: OrganismPathways {
                organism_code: "lpl".to_string(),
                organism_name: "L. plantarum".to_string(),
                pathways: BTreeMap::new(),
            },
        };
        let boosted = scorer.score(&scorer.context(&lab, &lookup), &composition);
        let bonus = boosted.subscores.pathway_bonus.unwrap_or_default();
        assert!(bonus > 0.0);
        assert!((boosted.overall - (plain.overall * (1.0 + 0.15 * bonus)).min(1.0)).abs() < 1e-12);
        assert!(boosted.matched_nutrients.contains(&Nutrient::Nucleotides));
    }

    #[test]
    fn blended_growth_factors_count_every_measured_member() {
        let scorer = FitnessScorer::default();
        let lab = strain("Lactobacillus");
        let ctx = scorer.context(&lab, &PathwayLookup::not_requested());
        let mut a = Composition::default();
        a.nucleotides.amp = Level::Known(25.0);
        a.vitamins.b1 = Level::Known(12.0);
        let mut b = Composition::default();
        b.nucleotides.gmp = Level::Known(25.0);
        b.vitamins.b2 = Level::Known(12.0);
        let (a, b) = (NutrientProfile::of(&a), NutrientProfile::of(&b));

        let single = scorer.score(&ctx, &a).subscores.growth_factor_match;
        let blend = scorer.score_blend(&ctx, &[(&a, 0.5), (&b, 0.5)]);
        assert_eq!(blend.subscores.growth_factor_match, single);
        assert!(blend.subscores.growth_factor_match > 0.0);
        assert!(!blend.subscores.insufficient_data.contains(&ScoreComponent::GrowthFactorMatch));
    }
}
