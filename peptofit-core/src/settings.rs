//! Tunable constants of the scoring model and the blend search.
//!
//! The weights, thresholds, and sizes below were chosen empirically and have not been calibrated
//! against growth experiments. They are collected here so that a calibration run can override
//! them through [`RecommenderSettings`] without touching the algorithms.

use crate::error::PeptofitError;
use serde::{Deserialize, Serialize};

pub const NUTRITIONAL_WEIGHT: f64 = 0.40;
pub const AMINO_ACID_WEIGHT: f64 = 0.25;
pub const GROWTH_FACTOR_WEIGHT: f64 = 0.20;
pub const MW_DISTRIBUTION_WEIGHT: f64 = 0.15;

/// Value of a sub-score with no usable inputs.
pub const NEUTRAL_MIDPOINT: f64 = 0.5;
/// The overall score is multiplied by `1 + PATHWAY_BONUS_WEIGHT × bonus`.
pub const PATHWAY_BONUS_WEIGHT: f64 = 0.15;
/// A pathway counts as complete at or above this fraction of its enzymes.
pub const PATHWAY_COMPLETENESS_THRESHOLD: f64 = 0.7;

/// Number of best single peptones combined into blends.
pub const SHORTLIST_SIZE: usize = 8;
pub const DEFAULT_MAX_COMPONENTS: usize = 3;
pub const MIN_BLEND_COMPONENTS: usize = 2;
pub const MAX_BLEND_COMPONENTS: usize = 5;

pub const MIN_RATIO: f64 = 0.10;
pub const MAX_RATIO: f64 = 0.80;
/// Tolerance on `Σ ratios = 1`.
pub const RATIO_SUM_TOLERANCE: f64 = 1e-6;

pub const LOCAL_MAX_ITERATIONS: usize = 500;
pub const LOCAL_FTOL: f64 = 1e-10;
pub const GLOBAL_POPULATION_PER_COMPONENT: usize = 15;
pub const GLOBAL_MAX_GENERATIONS: usize = 300;
pub const GLOBAL_TOLERANCE: f64 = 1e-6;
pub const GLOBAL_SEED: u64 = 42;

pub const COMPLEMENTARITY_DIVERSITY_WEIGHT: f64 = 0.6;
pub const COMPLEMENTARITY_COVERAGE_WEIGHT: f64 = 0.4;
/// Features below this catalog percentile count as a base peptone's weak points.
pub const WEAK_FEATURE_PERCENTILE: f64 = 0.25;
pub const COMPLEMENTARY_PARTNERS: usize = 3;
pub const COMPLEMENTARY_BASES: usize = 3;

pub const PREFERRED_MANUFACTURER: &str = "Sempio";

/// Overridable subset of the constants above, usually read from `settings.yaml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommenderSettings {
    pub shortlist_size: usize,
    pub pathway_bonus_weight: f64,
    pub min_ratio: f64,
    pub max_ratio: f64,
    pub local_max_iterations: usize,
    pub global_max_generations: usize,
    pub global_seed: u64,
    pub complementary_partners: usize,
    pub complementary_bases: usize,
    pub preferred_manufacturer: String,
}

impl Default for RecommenderSettings {
    fn default() -> Self {
        Self {
            shortlist_size: SHORTLIST_SIZE,
            pathway_bonus_weight: PATHWAY_BONUS_WEIGHT,
            min_ratio: MIN_RATIO,
            max_ratio: MAX_RATIO,
            local_max_iterations: LOCAL_MAX_ITERATIONS,
            global_max_generations: GLOBAL_MAX_GENERATIONS,
            global_seed: GLOBAL_SEED,
            complementary_partners: COMPLEMENTARY_PARTNERS,
            complementary_bases: COMPLEMENTARY_BASES,
            preferred_manufacturer: PREFERRED_MANUFACTURER.to_string(),
        }
    }
}

impl RecommenderSettings {
    pub fn validate(&self) -> Result<(), PeptofitError> {
        if !(0.0..=1.0).contains(&self.min_ratio) || !(0.0..=1.0).contains(&self.max_ratio) {
            return Err(PeptofitError::ConfigError(format!(
                "ratio bounds must lie in [0, 1], got [{}, {}]",
                self.min_ratio, self.max_ratio
            )));
        }
        if self.min_ratio > self.max_ratio {
            return Err(PeptofitError::ConfigError(format!(
                "min_ratio {} exceeds max_ratio {}",
                self.min_ratio, self.max_ratio
            )));
        }
        if self.shortlist_size < MIN_BLEND_COMPONENTS {
            return Err(PeptofitError::ConfigError(format!(
                "shortlist_size must be at least {}",
                MIN_BLEND_COMPONENTS
            )));
        }
        if self.pathway_bonus_weight < 0.0 {
            return Err(PeptofitError::ConfigError(
                "pathway_bonus_weight must be non-negative".to_string(),
            ));
        }
        if self.local_max_iterations == 0 || self.global_max_generations == 0 {
            return Err(PeptofitError::ConfigError(
                "iteration ceilings must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scoring_weights_sum_to_one() {
        let sum = NUTRITIONAL_WEIGHT + AMINO_ACID_WEIGHT + GROWTH_FACTOR_WEIGHT + MW_DISTRIBUTION_WEIGHT;
        assert!((sum - 1.0).abs() < 1e-12);
    }

    #[test]
    fn defaults_validate_and_bad_bounds_do_not() {
        assert!(RecommenderSettings::default().validate().is_ok());
        let inverted = RecommenderSettings {
            min_ratio: 0.9,
            max_ratio: 0.2,
            ..Default::default()
        };
        assert!(matches!(inverted.validate(), Err(PeptofitError::ConfigError(_))));
    }
}
