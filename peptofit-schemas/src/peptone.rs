//! Defines the data structures for a peptone (protein hydrolysate) product and its measured
//! composition. Every measured amount is a [`Level`], so unmeasured nutrients stay distinct from
//! nutrients measured at zero.

use crate::{amino_acid::AminoAcid, level::Level};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Linear mixing of composition groups: `Σ ratio_i × group_i`, field by field.
pub trait Mixable: Sized {
    fn mix(parts: &[(&Self, f64)]) -> Self;
}

fn mix_by<T>(parts: &[(&T, f64)], field: impl Fn(&T) -> Level) -> Level {
    Level::mix(parts.iter().map(|(group, ratio)| (*ratio, field(group))))
}

/// General composition, as percentages of the dry product.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralComposition {
    pub total_nitrogen: Level,
    pub amino_nitrogen: Level,
    pub total_sugar: Level,
    pub reducing_sugar: Level,
    pub ash: Level,
    pub moisture: Level,
    pub crude_fat: Level,
    pub salinity: Level,
}

impl Mixable for GeneralComposition {
    fn mix(parts: &[(&Self, f64)]) -> Self {
        Self {
            total_nitrogen: mix_by(parts, |g| g.total_nitrogen),
            amino_nitrogen: mix_by(parts, |g| g.amino_nitrogen),
            total_sugar: mix_by(parts, |g| g.total_sugar),
            reducing_sugar: mix_by(parts, |g| g.reducing_sugar),
            ash: mix_by(parts, |g| g.ash),
            moisture: mix_by(parts, |g| g.moisture),
            crude_fat: mix_by(parts, |g| g.crude_fat),
            salinity: mix_by(parts, |g| g.salinity),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Sugars {
    pub fructose: Level,
    pub glucose: Level,
    pub sucrose: Level,
    pub lactose: Level,
    pub maltose: Level,
}

impl Sugars {
    pub fn members(&self) -> [Level; 5] {
        [self.fructose, self.glucose, self.sucrose, self.lactose, self.maltose]
    }
}

impl Mixable for Sugars {
    fn mix(parts: &[(&Self, f64)]) -> Self {
        Self {
            fructose: mix_by(parts, |g| g.fructose),
            glucose: mix_by(parts, |g| g.glucose),
            sucrose: mix_by(parts, |g| g.sucrose),
            lactose: mix_by(parts, |g| g.lactose),
            maltose: mix_by(parts, |g| g.maltose),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Minerals {
    pub sodium: Level,
    pub potassium: Level,
    pub magnesium: Level,
    pub calcium: Level,
}

impl Minerals {
    pub fn members(&self) -> [Level; 4] {
        [self.sodium, self.potassium, self.magnesium, self.calcium]
    }
}

impl Mixable for Minerals {
    fn mix(parts: &[(&Self, f64)]) -> Self {
        Self {
            sodium: mix_by(parts, |g| g.sodium),
            potassium: mix_by(parts, |g| g.potassium),
            magnesium: mix_by(parts, |g| g.magnesium),
            calcium: mix_by(parts, |g| g.calcium),
        }
    }
}

/// Nucleotides and nucleobases, mg/g.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Nucleotides {
    pub amp: Level,
    pub gmp: Level,
    pub ump: Level,
    pub imp: Level,
    pub cmp: Level,
    pub hypoxanthine: Level,
}

impl Nucleotides {
    pub fn members(&self) -> [Level; 6] {
        [self.amp, self.gmp, self.ump, self.imp, self.cmp, self.hypoxanthine]
    }

    pub fn total(&self) -> Level {
        Level::sum(self.members())
    }
}

impl Mixable for Nucleotides {
    fn mix(parts: &[(&Self, f64)]) -> Self {
        Self {
            amp: mix_by(parts, |g| g.amp),
            gmp: mix_by(parts, |g| g.gmp),
            ump: mix_by(parts, |g| g.ump),
            imp: mix_by(parts, |g| g.imp),
            cmp: mix_by(parts, |g| g.cmp),
            hypoxanthine: mix_by(parts, |g| g.hypoxanthine),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OrganicAcids {
    pub citric: Level,
    pub malic: Level,
    pub succinic: Level,
    pub lactic: Level,
    pub acetic: Level,
}

impl OrganicAcids {
    pub fn members(&self) -> [Level; 5] {
        [self.citric, self.malic, self.succinic, self.lactic, self.acetic]
    }
}

impl Mixable for OrganicAcids {
    fn mix(parts: &[(&Self, f64)]) -> Self {
        Self {
            citric: mix_by(parts, |g| g.citric),
            malic: mix_by(parts, |g| g.malic),
            succinic: mix_by(parts, |g| g.succinic),
            lactic: mix_by(parts, |g| g.lactic),
            acetic: mix_by(parts, |g| g.acetic),
        }
    }
}

/// B-group vitamins, mg/100g.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Vitamins {
    pub b1: Level,
    pub b2: Level,
    pub b3: Level,
    pub b6: Level,
    pub b9: Level,
}

impl Vitamins {
    pub fn members(&self) -> [Level; 5] {
        [self.b1, self.b2, self.b3, self.b6, self.b9]
    }

    pub fn total(&self) -> Level {
        Level::sum(self.members())
    }
}

impl Mixable for Vitamins {
    fn mix(parts: &[(&Self, f64)]) -> Self {
        Self {
            b1: mix_by(parts, |g| g.b1),
            b2: mix_by(parts, |g| g.b2),
            b3: mix_by(parts, |g| g.b3),
            b6: mix_by(parts, |g| g.b6),
            b9: mix_by(parts, |g| g.b9),
        }
    }
}

/// Peptide size classes of the molecular-weight distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MwBucket {
    Below250,
    From250To500,
    From500To750,
    From750To1000,
    Above1000,
}

impl MwBucket {
    pub const ALL: [MwBucket; 5] = [
        MwBucket::Below250,
        MwBucket::From250To500,
        MwBucket::From500To750,
        MwBucket::From750To1000,
        MwBucket::Above1000,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MwBucket::Below250 => "<250 Da",
            MwBucket::From250To500 => "250-500 Da",
            MwBucket::From500To750 => "500-750 Da",
            MwBucket::From750To1000 => "750-1000 Da",
            MwBucket::Above1000 => ">1000 Da",
        }
    }
}

/// Molecular-weight distribution; bucket values are percentages of the peptide mass.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MolecularWeightDistribution {
    pub average_da: Level,
    pub pct_below_250: Level,
    pub pct_250_500: Level,
    pub pct_500_750: Level,
    pub pct_750_1000: Level,
    pub pct_above_1000: Level,
}

impl MolecularWeightDistribution {
    pub fn percent(&self, bucket: MwBucket) -> Level {
        match bucket {
            MwBucket::Below250 => self.pct_below_250,
            MwBucket::From250To500 => self.pct_250_500,
            MwBucket::From500To750 => self.pct_500_750,
            MwBucket::From750To1000 => self.pct_750_1000,
            MwBucket::Above1000 => self.pct_above_1000,
        }
    }

    /// Bucket share as a fraction in [0, 1].
    pub fn share(&self, bucket: MwBucket) -> Level {
        self.percent(bucket).map(|pct| pct / 100.0)
    }
}

impl Mixable for MolecularWeightDistribution {
    fn mix(parts: &[(&Self, f64)]) -> Self {
        Self {
            average_da: mix_by(parts, |g| g.average_da),
            pct_below_250: mix_by(parts, |g| g.pct_below_250),
            pct_250_500: mix_by(parts, |g| g.pct_250_500),
            pct_500_750: mix_by(parts, |g| g.pct_500_750),
            pct_750_1000: mix_by(parts, |g| g.pct_750_1000),
            pct_above_1000: mix_by(parts, |g| g.pct_above_1000),
        }
    }
}

/// Amino-acid amounts (g/100g), keyed by amino acid. Absent keys are unmeasured.
pub type AminoAcidProfile = BTreeMap<AminoAcid, Level>;

impl Mixable for AminoAcidProfile {
    fn mix(parts: &[(&Self, f64)]) -> Self {
        let keys: BTreeSet<AminoAcid> = parts
            .iter()
            .flat_map(|(profile, _)| profile.keys().copied())
            .collect();
        keys.into_iter()
            .map(|aa| {
                let level = mix_by(parts, |p| p.get(&aa).copied().unwrap_or_default());
                (aa, level)
            })
            .collect()
    }
}

/// The full measured composition of a peptone (or of a blend of peptones).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Composition {
    pub general: GeneralComposition,
    pub sugars: Sugars,
    pub minerals: Minerals,
    pub nucleotides: Nucleotides,
    pub organic_acids: OrganicAcids,
    pub vitamins: Vitamins,
    pub molecular_weight: MolecularWeightDistribution,
    pub total_amino_acids: AminoAcidProfile,
    pub free_amino_acids: AminoAcidProfile,
}

impl Composition {
    pub fn total_amino_acid(&self, aa: AminoAcid) -> Level {
        self.total_amino_acids.get(&aa).copied().unwrap_or_default()
    }

    pub fn free_amino_acid(&self, aa: AminoAcid) -> Level {
        self.free_amino_acids.get(&aa).copied().unwrap_or_default()
    }
}

impl Mixable for Composition {
    fn mix(parts: &[(&Self, f64)]) -> Self {
        fn project<'a, G>(
            parts: &[(&'a Composition, f64)],
            group: impl Fn(&'a Composition) -> &'a G,
        ) -> Vec<(&'a G, f64)> {
            parts.iter().map(|(c, r)| (group(c), *r)).collect()
        }

        Self {
            general: GeneralComposition::mix(&project(parts, |c| &c.general)),
            sugars: Sugars::mix(&project(parts, |c| &c.sugars)),
            minerals: Minerals::mix(&project(parts, |c| &c.minerals)),
            nucleotides: Nucleotides::mix(&project(parts, |c| &c.nucleotides)),
            organic_acids: OrganicAcids::mix(&project(parts, |c| &c.organic_acids)),
            vitamins: Vitamins::mix(&project(parts, |c| &c.vitamins)),
            molecular_weight: MolecularWeightDistribution::mix(&project(parts, |c| {
                &c.molecular_weight
            })),
            total_amino_acids: AminoAcidProfile::mix(&project(parts, |c| &c.total_amino_acids)),
            free_amino_acids: AminoAcidProfile::mix(&project(parts, |c| &c.free_amino_acids)),
        }
    }
}

/// A peptone product from the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Peptone {
    /// A unique, machine-readable identifier (e.g., "SP-SOY-01").
    pub peptone_id: String,
    /// The product name shown to users.
    pub name: String,
    /// Protein source of the hydrolysate (e.g., "soy", "casein", "yeast").
    pub raw_material: String,
    pub manufacturer: String,
    /// Whether the product comes from the preferred source. Filled from the manufacturer at load
    /// time when the catalog leaves it out.
    #[serde(default)]
    pub preferred_source: Option<bool>,
    #[serde(default)]
    pub composition: Composition,
}

impl Peptone {
    pub fn is_preferred(&self) -> bool {
        self.preferred_source.unwrap_or(false)
    }
}

impl fmt::Display for Peptone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.peptone_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composition_mix_is_field_wise_linear() {
        let mut a = Composition::default();
        a.general.total_nitrogen = Level::Known(80.0);
        a.vitamins.b1 = Level::Known(2.0);
        a.total_amino_acids.insert(AminoAcid::Lysine, Level::Known(6.0));
        let mut b = Composition::default();
        b.general.total_nitrogen = Level::Known(40.0);
        b.total_amino_acids.insert(AminoAcid::Lysine, Level::Known(2.0));

        let mixed = Composition::mix(&[(&a, 0.25), (&b, 0.75)]);
        assert_eq!(mixed.general.total_nitrogen, Level::Known(50.0));
        assert_eq!(mixed.total_amino_acid(AminoAcid::Lysine), Level::Known(3.5));
        // b never measured B1
        assert_eq!(mixed.vitamins.b1, Level::Unknown);
        assert_eq!(mixed.general.ash, Level::Unknown);
    }

    #[test]
    fn peptone_deserializes_with_sparse_composition() {
        let yaml = r#"
peptone_id: SP-SOY-01
name: Soy Peptone S1
raw_material: soy
manufacturer: Sempio
composition:
  general:
    total_nitrogen: 78.5
    amino_nitrogen: "N.D"
  total_amino_acids:
    Lysine: 5.1
    "Glutamic acid": 12.0
  molecular_weight:
    pct_below_250: 30
"#;
        let peptone: Peptone = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(peptone.preferred_source, None);
        assert_eq!(peptone.composition.general.total_nitrogen, Level::Known(78.5));
        assert_eq!(peptone.composition.general.amino_nitrogen, Level::Unknown);
        assert_eq!(
            peptone.composition.total_amino_acid(AminoAcid::GlutamicAcid),
            Level::Known(12.0)
        );
        assert_eq!(
            peptone.composition.molecular_weight.share(MwBucket::Below250),
            Level::Known(0.3)
        );
        assert_eq!(peptone.composition.vitamins.total(), Level::Unknown);
    }
}
