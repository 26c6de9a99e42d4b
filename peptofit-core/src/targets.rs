//! Nutritional targets per strain class.
//!
//! Every threshold the scorer compares against lives in one [`TargetTable`], keyed by nutritional
//! type (nitrogen band, amino-acid ideals) and category (molecular-weight histogram). A strain's
//! entry is looked up once per request and carried in a [`StrainTargets`].

use crate::profile::Feature;
use crate::settings::{AMINO_ACID_WEIGHT, GROWTH_FACTOR_WEIGHT, MW_DISTRIBUTION_WEIGHT, NUTRITIONAL_WEIGHT};
use peptofit_schemas::{
    peptone::MwBucket,
    strain::{KeyRequirement, NutritionalType, Strain, StrainCategory},
};
use std::collections::{BTreeMap, HashMap};

/// Nucleotide total (mg/g) at which the nucleotide requirement counts as fully met.
pub const NUCLEOTIDE_SATURATION: f64 = 20.0;
/// Vitamin total (mg/100g) at which the vitamin requirement counts as fully met.
pub const VITAMIN_SATURATION: f64 = 10.0;
/// Saturation of the combined nucleotide and vitamin total for strains with neither requirement.
pub const COMBINED_GROWTH_FACTOR_SATURATION: f64 = 30.0;

pub const EAA_IDEAL_WEIGHT: f64 = 0.4;
pub const FREE_AA_IDEAL_WEIGHT: f64 = 0.3;
pub const BCAA_IDEAL_WEIGHT: f64 = 0.3;

/// Saturating ramps for total and amino nitrogen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NitrogenBand {
    pub total_nitrogen_saturation: f64,
    pub total_nitrogen_weight: f64,
    pub amino_nitrogen_saturation: f64,
    pub amino_nitrogen_weight: f64,
}

/// Ideal essential, free, and branched-chain amino acid ratios.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AminoAcidIdeals {
    pub essential: f64,
    pub free: f64,
    pub branched_chain: f64,
}

/// Target share per molecular-weight bucket. Buckets without a target are not compared.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MwHistogram(BTreeMap<MwBucket, f64>);

impl MwHistogram {
    pub fn new(targets: &[(MwBucket, f64)]) -> Self {
        MwHistogram(targets.iter().copied().collect())
    }

    pub fn iter(&self) -> impl Iterator<Item = (MwBucket, f64)> + '_ {
        self.0.iter().map(|(b, t)| (*b, *t))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Which growth factors a strain's requirement tags ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GrowthFactorNeeds {
    pub nucleotides: bool,
    pub vitamins: bool,
}

impl GrowthFactorNeeds {
    pub fn for_strain(strain: &Strain) -> Self {
        Self {
            nucleotides: strain.requires(KeyRequirement::Nucleotides),
            vitamins: strain.requires(KeyRequirement::BVitamins)
                || strain.requires(KeyRequirement::Vitamins),
        }
    }

    pub fn any(self) -> bool {
        self.nucleotides || self.vitamins
    }
}

/// Everything the scorer and the optimizer need to know about one strain's targets.
#[derive(Debug, Clone, PartialEq)]
pub struct StrainTargets {
    pub nutritional_type: NutritionalType,
    pub nitrogen: NitrogenBand,
    pub amino_acids: AminoAcidIdeals,
    pub growth_factors: GrowthFactorNeeds,
    pub mw_histogram: MwHistogram,
}

/// Target values and importance weights over the normalized feature vector.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TargetProfile {
    pub values: BTreeMap<Feature, f64>,
    pub weights: BTreeMap<Feature, f64>,
}

impl TargetProfile {
    fn insert(&mut self, feature: Feature, value: f64, weight: f64) {
        self.values.insert(feature, value);
        self.weights.insert(feature, weight);
    }
}

impl StrainTargets {
    /// Expresses the targets in feature-vector units, weighting each feature in proportion to the
    /// sub-score it feeds.
    pub fn target_profile(&self) -> TargetProfile {
        let mut profile = TargetProfile::default();
        let n = &self.nitrogen;
        profile.insert(
            Feature::TotalNitrogen,
            n.total_nitrogen_saturation / Feature::TotalNitrogen.scale(),
            NUTRITIONAL_WEIGHT * n.total_nitrogen_weight,
        );
        profile.insert(
            Feature::AminoNitrogen,
            n.amino_nitrogen_saturation / Feature::AminoNitrogen.scale(),
            NUTRITIONAL_WEIGHT * n.amino_nitrogen_weight,
        );

        let aa = &self.amino_acids;
        profile.insert(Feature::EssentialAaRatio, aa.essential, AMINO_ACID_WEIGHT * EAA_IDEAL_WEIGHT);
        profile.insert(Feature::FreeAaRatio, aa.free, AMINO_ACID_WEIGHT * FREE_AA_IDEAL_WEIGHT);
        profile.insert(Feature::BcaaRatio, aa.branched_chain, AMINO_ACID_WEIGHT * BCAA_IDEAL_WEIGHT);

        let gf = self.growth_factors;
        let half = GROWTH_FACTOR_WEIGHT / 2.0;
        let quarter = GROWTH_FACTOR_WEIGHT / 4.0;
        profile.insert(
            Feature::Nucleotides,
            NUCLEOTIDE_SATURATION / Feature::Nucleotides.scale(),
            if gf.nucleotides { half } else { quarter },
        );
        profile.insert(
            Feature::Vitamins,
            VITAMIN_SATURATION / Feature::Vitamins.scale(),
            if gf.vitamins { half } else { quarter },
        );

        if !self.mw_histogram.is_empty() {
            let per_bucket = MW_DISTRIBUTION_WEIGHT / self.mw_histogram.len() as f64;
            for (bucket, share) in self.mw_histogram.iter() {
                profile.insert(Feature::MwShare(bucket), share, per_bucket);
            }
        }
        profile
    }
}

#[derive(Debug, Clone)]
pub struct TargetTable {
    nitrogen: HashMap<NutritionalType, NitrogenBand>,
    default_nitrogen: NitrogenBand,
    amino_acids: HashMap<NutritionalType, AminoAcidIdeals>,
    default_amino_acids: AminoAcidIdeals,
    mw_histograms: HashMap<StrainCategory, MwHistogram>,
}

impl Default for TargetTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl TargetTable {
    /// The built-in table. The values are empirical and flagged for calibration.
    pub fn standard() -> Self {
        use MwBucket::*;

        let nitrogen = HashMap::from([
            (
                NutritionalType::Fastidious,
                NitrogenBand {
                    total_nitrogen_saturation: 80.0,
                    total_nitrogen_weight: 0.4,
                    amino_nitrogen_saturation: 15.0,
                    amino_nitrogen_weight: 0.6,
                },
            ),
            (
                NutritionalType::Minimal,
                NitrogenBand {
                    total_nitrogen_saturation: 60.0,
                    total_nitrogen_weight: 0.7,
                    amino_nitrogen_saturation: 8.0,
                    amino_nitrogen_weight: 0.3,
                },
            ),
        ]);
        let default_nitrogen = NitrogenBand {
            total_nitrogen_saturation: 70.0,
            total_nitrogen_weight: 0.5,
            amino_nitrogen_saturation: 12.0,
            amino_nitrogen_weight: 0.5,
        };

        let amino_acids = HashMap::from([
            (
                NutritionalType::Fastidious,
                AminoAcidIdeals { essential: 0.45, free: 0.50, branched_chain: 0.20 },
            ),
            (
                NutritionalType::Minimal,
                AminoAcidIdeals { essential: 0.35, free: 0.20, branched_chain: 0.15 },
            ),
        ]);
        let default_amino_acids = AminoAcidIdeals { essential: 0.40, free: 0.35, branched_chain: 0.18 };

        let mw_histograms = HashMap::from([
            (
                StrainCategory::LacticAcidBacteria,
                MwHistogram::new(&[(Below250, 0.25), (From250To500, 0.30), (Above1000, 0.20)]),
            ),
            (
                StrainCategory::Bacillus,
                MwHistogram::new(&[(Below250, 0.15), (Above1000, 0.40)]),
            ),
            (
                StrainCategory::EColi,
                MwHistogram::new(&[(Below250, 0.20), (From250To500, 0.35), (Above1000, 0.25)]),
            ),
            (
                StrainCategory::Yeast,
                MwHistogram::new(&[
                    (Below250, 0.20),
                    (From250To500, 0.30),
                    (From500To750, 0.20),
                    (Above1000, 0.30),
                ]),
            ),
            (
                StrainCategory::Actinomycete,
                MwHistogram::new(&[(From250To500, 0.25), (From500To750, 0.25), (Above1000, 0.35)]),
            ),
            (
                StrainCategory::Other,
                MwHistogram::new(&[(From250To500, 0.30), (From500To750, 0.25), (Above1000, 0.30)]),
            ),
        ]);

        Self {
            nitrogen,
            default_nitrogen,
            amino_acids,
            default_amino_acids,
            mw_histograms,
        }
    }

    pub fn lookup(&self, strain: &Strain) -> StrainTargets {
        let nutritional_type = strain.nutritional_type;
        StrainTargets {
            nutritional_type,
            nitrogen: *self.nitrogen.get(&nutritional_type).unwrap_or(&self.default_nitrogen),
            amino_acids: *self
                .amino_acids
                .get(&nutritional_type)
                .unwrap_or(&self.default_amino_acids),
            growth_factors: GrowthFactorNeeds::for_strain(strain),
            mw_histogram: self
                .mw_histograms
                .get(&strain.category)
                .cloned()
                .unwrap_or_default(),
        }
    }
}
