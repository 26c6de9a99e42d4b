//! Defines the data structures for a microbial strain in the catalog.
//! Category, nutritional type, and requirement tags are derived once, when the raw catalog row is
//! converted into a [`Strain`], and never change afterwards.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Enumerates the high-level strain categories used to select nutritional targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrainCategory {
    LacticAcidBacteria,
    Bacillus,
    EColi,
    Yeast,
    Actinomycete,
    Other,
}

const LAB_GENERA: &[&str] = &[
    "Lactobacillus",
    "Lactiplantibacillus",
    "Lacticaseibacillus",
    "Limosilactobacillus",
    "Ligilactobacillus",
    "Bifidobacterium",
    "Enterococcus",
    "Streptococcus",
    "Lactococcus",
    "Leuconostoc",
    "Weissella",
    "Pediococcus",
];

impl StrainCategory {
    pub fn from_genus(genus: &str) -> Self {
        let genus = genus.trim();
        if LAB_GENERA.contains(&genus) {
            return StrainCategory::LacticAcidBacteria;
        }
        match genus {
            "Bacillus" => StrainCategory::Bacillus,
            "Escherichia" => StrainCategory::EColi,
            "Saccharomyces" | "Candida" | "Pichia" => StrainCategory::Yeast,
            "Streptomyces" | "Actinomyces" => StrainCategory::Actinomycete,
            _ => StrainCategory::Other,
        }
    }

    pub fn nutritional_type(self) -> NutritionalType {
        match self {
            StrainCategory::LacticAcidBacteria => NutritionalType::Fastidious,
            StrainCategory::Bacillus => NutritionalType::Minimal,
            StrainCategory::EColi => NutritionalType::MinimalToModerate,
            StrainCategory::Yeast => NutritionalType::Moderate,
            StrainCategory::Actinomycete => NutritionalType::Complex,
            StrainCategory::Other => NutritionalType::Variable,
        }
    }

    pub fn key_requirements(self) -> Vec<KeyRequirement> {
        use KeyRequirement::*;
        match self {
            StrainCategory::LacticAcidBacteria => vec![AminoAcids, BVitamins, Nucleotides],
            StrainCategory::Bacillus => vec![NitrogenSource, TraceMinerals],
            StrainCategory::EColi => vec![NitrogenSource, CarbonSource],
            StrainCategory::Yeast => vec![NitrogenSource, Vitamins, TraceMinerals],
            StrainCategory::Actinomycete => vec![ComplexNitrogen, Phosphate],
            StrainCategory::Other => vec![BasicNutrients],
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StrainCategory::LacticAcidBacteria => "lactic acid bacteria",
            StrainCategory::Bacillus => "Bacillus",
            StrainCategory::EColi => "E. coli",
            StrainCategory::Yeast => "yeast",
            StrainCategory::Actinomycete => "actinomycete",
            StrainCategory::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NutritionalType {
    Fastidious,
    Minimal,
    MinimalToModerate,
    Moderate,
    Complex,
    Variable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyRequirement {
    AminoAcids,
    BVitamins,
    Nucleotides,
    NitrogenSource,
    CarbonSource,
    TraceMinerals,
    Vitamins,
    ComplexNitrogen,
    Phosphate,
    BasicNutrients,
}

impl fmt::Display for KeyRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            KeyRequirement::AminoAcids => "amino acids",
            KeyRequirement::BVitamins => "B vitamins",
            KeyRequirement::Nucleotides => "nucleotides",
            KeyRequirement::NitrogenSource => "nitrogen source",
            KeyRequirement::CarbonSource => "carbon source",
            KeyRequirement::TraceMinerals => "trace minerals",
            KeyRequirement::Vitamins => "vitamins",
            KeyRequirement::ComplexNitrogen => "complex nitrogen",
            KeyRequirement::Phosphate => "phosphate",
            KeyRequirement::BasicNutrients => "basic nutrients",
        };
        f.write_str(label)
    }
}

/// One strain row as it appears in the catalog files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrainRecord {
    /// Culture-collection designator (e.g., "KCCM 12116"). A `*` marks a strain under NDA.
    pub strain_id: String,
    pub genus: String,
    #[serde(default = "default_species")]
    pub species: String,
    /// Explicit category; derived from the genus when absent.
    #[serde(default)]
    pub category: Option<StrainCategory>,
    #[serde(default)]
    pub temperature_c: Option<f64>,
    #[serde(default)]
    pub medium: Option<String>,
    #[serde(default)]
    pub ncbi_taxonomy_id: Option<String>,
    #[serde(default)]
    pub notes: Vec<String>,
}

fn default_species() -> String {
    "sp.".to_string()
}

/// A catalog strain with its derived nutritional classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "StrainRecord")]
pub struct Strain {
    pub strain_id: String,
    pub genus: String,
    pub species: String,
    pub category: StrainCategory,
    pub nutritional_type: NutritionalType,
    pub key_requirements: Vec<KeyRequirement>,
    /// Confidential strains are never sent to external lookups.
    pub confidential: bool,
    pub temperature_c: Option<f64>,
    pub medium: Option<String>,
    pub ncbi_taxonomy_id: Option<String>,
    pub notes: Vec<String>,
}

impl From<StrainRecord> for Strain {
    fn from(record: StrainRecord) -> Self {
        let category = record
            .category
            .unwrap_or_else(|| StrainCategory::from_genus(&record.genus));
        Self {
            confidential: record.strain_id.contains('*'),
            strain_id: record.strain_id,
            genus: record.genus,
            species: record.species,
            category,
            nutritional_type: category.nutritional_type(),
            key_requirements: category.key_requirements(),
            temperature_c: record.temperature_c,
            medium: record.medium,
            ncbi_taxonomy_id: record.ncbi_taxonomy_id,
            notes: record.notes,
        }
    }
}

impl Strain {
    /// Genus, species, and strain designator, e.g. "Lactobacillus plantarum KCCM 12116".
    pub fn display_name(&self) -> String {
        [self.genus.as_str(), self.species.as_str(), self.strain_id.as_str()]
            .iter()
            .filter(|part| !part.trim().is_empty())
            .cloned()
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn requires(&self, requirement: KeyRequirement) -> bool {
        self.key_requirements.contains(&requirement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_is_derived_from_genus() {
        let strain: Strain = serde_yaml::from_str(
            "strain_id: KCCM 12116\ngenus: Lactiplantibacillus\nspecies: plantarum\n",
        )
        .unwrap();
        assert_eq!(strain.category, StrainCategory::LacticAcidBacteria);
        assert_eq!(strain.nutritional_type, NutritionalType::Fastidious);
        assert!(strain.requires(KeyRequirement::Nucleotides));
        assert!(!strain.confidential);
        assert_eq!(strain.display_name(), "Lactiplantibacillus plantarum KCCM 12116");
    }

    #[test]
    fn explicit_category_and_confidential_marker() {
        let strain: Strain = serde_yaml::from_str(
            "strain_id: KCTC 1*\ngenus: Unclassified\ncategory: yeast\n",
        )
        .unwrap();
        assert_eq!(strain.category, StrainCategory::Yeast);
        assert_eq!(strain.nutritional_type, NutritionalType::Moderate);
        assert_eq!(strain.species, "sp.");
        assert!(strain.confidential);
    }

    #[test]
    fn unknown_genus_falls_back_to_other() {
        assert_eq!(StrainCategory::from_genus("Zymomonas"), StrainCategory::Other);
        assert_eq!(StrainCategory::from_genus(" Bacillus "), StrainCategory::Bacillus);
    }
}
