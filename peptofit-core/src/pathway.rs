//! Pathway bonus adapter.
//!
//! Turns pathway-completeness data handed over by the pathway client into per-nutrient
//! requirement levels, then measures how many of those requirements a product supplies. The
//! adapter never fetches anything; an unavailable lookup simply yields no requirements.

use crate::profile::{Feature, NutrientProfile};
use crate::settings::PATHWAY_COMPLETENESS_THRESHOLD;
use peptofit_schemas::{
    amino_acid::AminoAcid,
    level::Level,
    pathway::{OrganismPathways, PathwayLookup},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Amino-acid biosynthesis maps and the amino acids each one produces.
const AMINO_ACID_PATHWAYS: &[(&str, &[AminoAcid])] = &[
    ("map00250", &[AminoAcid::Alanine, AminoAcid::AsparticAcid, AminoAcid::GlutamicAcid]),
    ("map00260", &[AminoAcid::Glycine, AminoAcid::Serine, AminoAcid::Threonine]),
    ("map00270", &[AminoAcid::Cysteine, AminoAcid::Methionine]),
    ("map00290", &[AminoAcid::Valine, AminoAcid::Leucine, AminoAcid::Isoleucine]),
    ("map00300", &[AminoAcid::Lysine]),
    ("map00330", &[AminoAcid::Arginine, AminoAcid::Proline]),
    ("map00340", &[AminoAcid::Histidine]),
    ("map00350", &[AminoAcid::Tyrosine]),
    ("map00400", &[AminoAcid::Phenylalanine, AminoAcid::Tryptophan]),
];

const VITAMIN_PATHWAYS: &[&str] = &[
    "map00730", "map00740", "map00750", "map00760", "map00770", "map00780", "map00785", "map00790",
];
const PURINE_METABOLISM: &str = "map00230";
const PYRIMIDINE_METABOLISM: &str = "map00240";

const VITAMIN_HIGH_MISSING_FRACTION: f64 = 0.7;
const VITAMIN_MEDIUM_MISSING_FRACTION: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequirementLevel {
    High,
    Medium,
    Low,
}

/// A nutrient the organism may be unable to make for itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Nutrient {
    AminoAcid(AminoAcid),
    Vitamins,
    Nucleotides,
}

impl fmt::Display for Nutrient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Nutrient::AminoAcid(aa) => write!(f, "{}", aa),
            Nutrient::Vitamins => f.write_str("vitamins"),
            Nutrient::Nucleotides => f.write_str("nucleotides"),
        }
    }
}

/// Requirement level per nutrient, inferred from pathway completeness.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NutrientRequirements(BTreeMap<Nutrient, RequirementLevel>);

impl NutrientRequirements {
    pub fn infer(pathways: &OrganismPathways) -> Self {
        let mut levels = BTreeMap::new();

        for (pathway_id, amino_acids) in AMINO_ACID_PATHWAYS {
            let level = match pathways.completeness(pathway_id) {
                None => RequirementLevel::High,
                Some(c) if c < PATHWAY_COMPLETENESS_THRESHOLD => RequirementLevel::Medium,
                Some(_) => RequirementLevel::Low,
            };
            for aa in amino_acids.iter() {
                levels.insert(Nutrient::AminoAcid(*aa), level);
            }
        }

        let missing = VITAMIN_PATHWAYS
            .iter()
            .filter(|id| !pathways.has_pathway(id))
            .count() as f64
            / VITAMIN_PATHWAYS.len() as f64;
        let vitamins = if missing > VITAMIN_HIGH_MISSING_FRACTION {
            RequirementLevel::High
        } else if missing > VITAMIN_MEDIUM_MISSING_FRACTION {
            RequirementLevel::Medium
        } else {
            RequirementLevel::Low
        };
        levels.insert(Nutrient::Vitamins, vitamins);

        let nucleotides = if pathways.has_pathway(PURINE_METABOLISM)
            && pathways.has_pathway(PYRIMIDINE_METABOLISM)
        {
            RequirementLevel::Low
        } else {
            RequirementLevel::High
        };
        levels.insert(Nutrient::Nucleotides, nucleotides);

        NutrientRequirements(levels)
    }

    /// Requirements from a lookup; `None` when the lookup is unavailable.
    pub fn from_lookup(lookup: &PathwayLookup) -> Option<Self> {
        lookup.resolved().map(Self::infer)
    }

    pub fn level(&self, nutrient: Nutrient) -> Option<RequirementLevel> {
        self.0.get(&nutrient).copied()
    }

    /// Nutrients at High or Medium level.
    pub fn required(&self) -> impl Iterator<Item = (Nutrient, RequirementLevel)> + '_ {
        self.0
            .iter()
            .filter(|(_, level)| **level != RequirementLevel::Low)
            .map(|(n, l)| (*n, *l))
    }
}

fn exceeds(level: Level, threshold: f64) -> bool {
    level.known().is_some_and(|value| value > threshold)
}

/// Whether `profile` covers `nutrient` at the given requirement level. Unknown amounts never
/// count as supplied.
pub fn supplies(profile: &NutrientProfile, nutrient: Nutrient, level: RequirementLevel) -> bool {
    let high = level == RequirementLevel::High;
    match nutrient {
        Nutrient::AminoAcid(aa) => {
            let (free_min, total_min) = if high { (0.5, 2.0) } else { (0.2, 1.0) };
            exceeds(profile.free_amino_acid(aa), free_min)
                || exceeds(profile.total_amino_acid(aa), total_min)
        }
        Nutrient::Vitamins => {
            exceeds(profile.level(Feature::Vitamins), if high { 5.0 } else { 2.0 })
        }
        Nutrient::Nucleotides => {
            exceeds(profile.level(Feature::Nucleotides), if high { 10.0 } else { 5.0 })
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PathwayBonus {
    /// Share of required nutrients supplied, in [0, 1].
    pub bonus: f64,
    pub matched: Vec<Nutrient>,
}

pub fn pathway_bonus(requirements: &NutrientRequirements, profile: &NutrientProfile) -> PathwayBonus {
    let mut required = 0usize;
    let mut matched = Vec::new();
    for (nutrient, level) in requirements.required() {
        required += 1;
        if supplies(profile, nutrient, level) {
            matched.push(nutrient);
        }
    }
    if required == 0 {
        return PathwayBonus::default();
    }
    PathwayBonus {
        bonus: matched.len() as f64 / required as f64,
        matched,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use peptofit_schemas::pathway::PathwayInfo;
    use peptofit_schemas::peptone::Composition;

    fn organism(pathways: &[(&str, f64)]) -> OrganismPathways {
        OrganismPathways {
            organism_code: "lpl".to_string(),
            organism_name: "Lactiplantibacillus plantarum".to_string(),
            pathways: pathways
                .iter()
                .map(|(id, c)| {
                    (
                        id.to_string(),
                        PathwayInfo {
                            name: id.to_string(),
                            completeness: *c,
                        },
                    )
                })
                .collect(),
        }
    }

    #[test]
    fn absent_and_partial_pathways_raise_requirements() {
        let reqs = NutrientRequirements::infer(&organism(&[
            ("map00290", 0.5),
            ("map00300", 0.9),
            ("map00230", 1.0),
            ("map00240", 1.0),
        ]));
        assert_eq!(reqs.level(Nutrient::AminoAcid(AminoAcid::Leucine)), Some(RequirementLevel::Medium));
        assert_eq!(reqs.level(Nutrient::AminoAcid(AminoAcid::Lysine)), Some(RequirementLevel::Low));
        assert_eq!(reqs.level(Nutrient::AminoAcid(AminoAcid::Histidine)), Some(RequirementLevel::High));
        assert_eq!(reqs.level(Nutrient::Vitamins), Some(RequirementLevel::High));
        assert_eq!(reqs.level(Nutrient::Nucleotides), Some(RequirementLevel::Low));
    }

    #[test]
    fn bonus_counts_supplied_requirements() {
        let reqs = NutrientRequirements::infer(&organism(&[]));
        let required = reqs.required().count();
        assert_eq!(required, 18 + 2);

        let mut composition = Composition::default();
        composition
            .free_amino_acids
            .insert(AminoAcid::Lysine, Level::Known(0.8));
        composition.vitamins.b3 = Level::Known(6.0);
        let bonus = pathway_bonus(&reqs, &NutrientProfile::of(&composition));
        assert_eq!(bonus.matched, vec![Nutrient::AminoAcid(AminoAcid::Lysine), Nutrient::Vitamins]);
        assert!((bonus.bonus - 2.0 / required as f64).abs() < 1e-12);
    }

    #[test]
    fn unknown_amounts_are_never_supplied() {
        let composition = NutrientProfile::default();
        assert!(!supplies(&composition, Nutrient::Nucleotides, RequirementLevel::Medium));
        assert_eq!(pathway_bonus(&NutrientRequirements::default(), &composition).bonus, 0.0);
    }

    #[test]
    fn unavailable_lookup_has_no_requirements() {
        assert!(NutrientRequirements::from_lookup(&PathwayLookup::not_requested()).is_none());
    }
}
