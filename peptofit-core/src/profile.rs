//! Profile extraction: turns a measured composition into the comparable quantities the scorer,
//! optimizer, and complementarity selector work with.
//!
//! Group totals and amino-acid ratios are derived per product, before any blending. A blend is
//! the ratio-weighted mix of those derived quantities, so two products that measured different
//! nucleotides still blend to a known nucleotide total.

use peptofit_schemas::{
    amino_acid::AminoAcid,
    level::Level,
    peptone::{AminoAcidProfile, Composition, Mixable, MwBucket},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

const TOTAL_NITROGEN_SCALE: f64 = 100.0;
const AMINO_NITROGEN_SCALE: f64 = 20.0;
const NUCLEOTIDE_SCALE: f64 = 30.0;
const VITAMIN_SCALE: f64 = 15.0;

const QUALITY_PROTEIN_WEIGHT: f64 = 0.3;
const QUALITY_AMINO_ACID_WEIGHT: f64 = 0.4;
const QUALITY_GROWTH_FACTOR_WEIGHT: f64 = 0.2;
const QUALITY_MW_WEIGHT: f64 = 0.1;
/// Amino nitrogen as a percentage of total nitrogen that counts as excellent.
const QUALITY_EXCELLENT_AN_PERCENT: f64 = 80.0;
/// Combined nucleotides and vitamins that saturate the growth-factor term.
const QUALITY_GROWTH_FACTOR_SATURATION: f64 = 50.0;

/// `numerator / denominator`, Unknown when either side is Unknown or the denominator is zero.
fn ratio(numerator: Level, denominator: Level) -> Level {
    match (numerator, denominator) {
        (Level::Known(n), Level::Known(d)) if d > 0.0 => Level::Known(n / d),
        _ => Level::Unknown,
    }
}

fn total_of(composition: &Composition, amino_acids: &[AminoAcid]) -> Level {
    Level::sum(amino_acids.iter().map(|aa| composition.total_amino_acid(*aa)))
}

/// Essential amino acids over all total amino acids.
pub fn essential_aa_ratio(composition: &Composition) -> Level {
    ratio(
        total_of(composition, &AminoAcid::ESSENTIAL),
        total_of(composition, &AminoAcid::ALL),
    )
}

/// Free amino acids over all total amino acids.
pub fn free_aa_ratio(composition: &Composition) -> Level {
    ratio(
        Level::sum(composition.free_amino_acids.values().copied()),
        total_of(composition, &AminoAcid::ALL),
    )
}

/// Valine, leucine, and isoleucine over all total amino acids.
pub fn bcaa_ratio(composition: &Composition) -> Level {
    ratio(
        total_of(composition, &AminoAcid::BRANCHED_CHAIN),
        total_of(composition, &AminoAcid::ALL),
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    TotalNitrogen,
    AminoNitrogen,
    EssentialAaRatio,
    FreeAaRatio,
    BcaaRatio,
    Nucleotides,
    Vitamins,
    MwShare(MwBucket),
}

impl Feature {
    pub const ALL: [Feature; 12] = [
        Feature::TotalNitrogen,
        Feature::AminoNitrogen,
        Feature::EssentialAaRatio,
        Feature::FreeAaRatio,
        Feature::BcaaRatio,
        Feature::Nucleotides,
        Feature::Vitamins,
        Feature::MwShare(MwBucket::Below250),
        Feature::MwShare(MwBucket::From250To500),
        Feature::MwShare(MwBucket::From500To750),
        Feature::MwShare(MwBucket::From750To1000),
        Feature::MwShare(MwBucket::Above1000),
    ];

    /// Divisor that brings the raw measurement into a roughly unit range.
    pub fn scale(self) -> f64 {
        match self {
            Feature::TotalNitrogen => TOTAL_NITROGEN_SCALE,
            Feature::AminoNitrogen => AMINO_NITROGEN_SCALE,
            Feature::Nucleotides => NUCLEOTIDE_SCALE,
            Feature::Vitamins => VITAMIN_SCALE,
            _ => 1.0,
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Feature::TotalNitrogen => f.write_str("total nitrogen"),
            Feature::AminoNitrogen => f.write_str("amino nitrogen"),
            Feature::EssentialAaRatio => f.write_str("essential amino acid ratio"),
            Feature::FreeAaRatio => f.write_str("free amino acid ratio"),
            Feature::BcaaRatio => f.write_str("BCAA ratio"),
            Feature::Nucleotides => f.write_str("nucleotides"),
            Feature::Vitamins => f.write_str("vitamins"),
            Feature::MwShare(bucket) => write!(f, "MW share {}", bucket.label()),
        }
    }
}

/// Normalized named features of one peptone or blend.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FeatureVector(BTreeMap<Feature, Level>);

impl FeatureVector {
    pub fn get(&self, feature: Feature) -> Level {
        self.0.get(&feature).copied().unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Feature, Level)> + '_ {
        self.0.iter().map(|(f, l)| (*f, *l))
    }

    /// Linear mix `Σ ratio_i × vector_i`, feature by feature.
    pub fn mix(parts: &[(&FeatureVector, f64)]) -> FeatureVector {
        FeatureVector(
            Feature::ALL
                .iter()
                .map(|feature| {
                    let level = Level::mix(parts.iter().map(|(v, r)| (*r, v.get(*feature))));
                    (*feature, level)
                })
                .collect(),
        )
    }
}

impl FromIterator<(Feature, Level)> for FeatureVector {
    fn from_iter<I: IntoIterator<Item = (Feature, Level)>>(iter: I) -> Self {
        FeatureVector(iter.into_iter().collect())
    }
}

/// The quantities a product is scored on, in measurement units: every [`Feature`] unscaled,
/// plus the per-amino-acid amounts the pathway bonus checks.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NutrientProfile {
    levels: BTreeMap<Feature, Level>,
    total_amino_acids: AminoAcidProfile,
    free_amino_acids: AminoAcidProfile,
}

impl NutrientProfile {
    pub fn of(composition: &Composition) -> Self {
        let levels = Feature::ALL
            .iter()
            .map(|feature| {
                let level = match feature {
                    Feature::TotalNitrogen => composition.general.total_nitrogen,
                    Feature::AminoNitrogen => composition.general.amino_nitrogen,
                    Feature::EssentialAaRatio => essential_aa_ratio(composition),
                    Feature::FreeAaRatio => free_aa_ratio(composition),
                    Feature::BcaaRatio => bcaa_ratio(composition),
                    Feature::Nucleotides => composition.nucleotides.total(),
                    Feature::Vitamins => composition.vitamins.total(),
                    Feature::MwShare(bucket) => composition.molecular_weight.share(*bucket),
                };
                (*feature, level)
            })
            .collect();
        Self {
            levels,
            total_amino_acids: composition.total_amino_acids.clone(),
            free_amino_acids: composition.free_amino_acids.clone(),
        }
    }

    /// The unscaled value of `feature`.
    pub fn level(&self, feature: Feature) -> Level {
        self.levels.get(&feature).copied().unwrap_or_default()
    }

    pub fn total_amino_acid(&self, aa: AminoAcid) -> Level {
        self.total_amino_acids.get(&aa).copied().unwrap_or_default()
    }

    pub fn free_amino_acid(&self, aa: AminoAcid) -> Level {
        self.free_amino_acids.get(&aa).copied().unwrap_or_default()
    }

    /// Strain-independent product quality in [0, 1]: protein hydrolysis (AN/TN), amino-acid
    /// richness, growth factors, and the low-to-mid molecular-weight share. Unmeasured inputs
    /// contribute nothing.
    pub fn quality_score(&self) -> f64 {
        let known = |feature: Feature| self.level(feature).known().unwrap_or(0.0);

        let protein = match (self.level(Feature::TotalNitrogen), self.level(Feature::AminoNitrogen)) {
            (Level::Known(tn), Level::Known(an)) if tn > 0.0 => {
                (an / tn * 100.0 / QUALITY_EXCELLENT_AN_PERCENT).min(1.0)
            }
            _ => 0.0,
        };
        let amino_acids = 0.5 * known(Feature::EssentialAaRatio) + 0.5 * known(Feature::FreeAaRatio);
        let growth_factors = ((known(Feature::Nucleotides) + known(Feature::Vitamins))
            / QUALITY_GROWTH_FACTOR_SATURATION)
            .min(1.0);
        let low_mw = known(Feature::MwShare(MwBucket::Below250))
            + known(Feature::MwShare(MwBucket::From250To500));

        (QUALITY_PROTEIN_WEIGHT * protein
            + QUALITY_AMINO_ACID_WEIGHT * amino_acids.min(1.0)
            + QUALITY_GROWTH_FACTOR_WEIGHT * growth_factors
            + QUALITY_MW_WEIGHT * low_mw.min(1.0))
        .clamp(0.0, 1.0)
    }

    /// The normalized feature vector.
    pub fn features(&self) -> FeatureVector {
        Feature::ALL
            .iter()
            .map(|feature| {
                let scale = feature.scale();
                (*feature, self.level(*feature).map(|value| value / scale))
            })
            .collect()
    }
}

impl From<&Composition> for NutrientProfile {
    fn from(composition: &Composition) -> Self {
        Self::of(composition)
    }
}

impl Mixable for NutrientProfile {
    fn mix(parts: &[(&Self, f64)]) -> Self {
        let levels = Feature::ALL
            .iter()
            .map(|feature| {
                let level = Level::mix(parts.iter().map(|(p, r)| (*r, p.level(*feature))));
                (*feature, level)
            })
            .collect();
        let total: Vec<(&AminoAcidProfile, f64)> =
            parts.iter().map(|(p, r)| (&p.total_amino_acids, *r)).collect();
        let free: Vec<(&AminoAcidProfile, f64)> =
            parts.iter().map(|(p, r)| (&p.free_amino_acids, *r)).collect();
        Self {
            levels,
            total_amino_acids: AminoAcidProfile::mix(&total),
            free_amino_acids: AminoAcidProfile::mix(&free),
        }
    }
}

/// Extracts the normalized feature vector of a composition.
pub fn extract_features(composition: &Composition) -> FeatureVector {
    NutrientProfile::of(composition).features()
}
