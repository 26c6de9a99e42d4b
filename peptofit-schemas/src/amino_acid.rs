use serde::{Deserialize, Serialize};
use std::fmt;

/// The amino acids reported by the composition analyses, in sheet order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AminoAcid {
    #[serde(rename = "Aspartic acid", alias = "Aspartate")]
    AsparticAcid,
    Hydroxyproline,
    Threonine,
    Serine,
    Asparagine,
    #[serde(rename = "Glutamic acid", alias = "Glutamate")]
    GlutamicAcid,
    Glutamine,
    Cysteine,
    Proline,
    Glycine,
    Alanine,
    #[serde(alias = "Citruline")]
    Citrulline,
    Valine,
    Cystine,
    Methionine,
    Isoleucine,
    Leucine,
    Tyrosine,
    Phenylalanine,
    #[serde(rename = "GABA")]
    Gaba,
    Histidine,
    Tryptophan,
    Ornithine,
    Lysine,
    Arginine,
}

impl AminoAcid {
    pub const ALL: [AminoAcid; 25] = [
        AminoAcid::AsparticAcid,
        AminoAcid::Hydroxyproline,
        AminoAcid::Threonine,
        AminoAcid::Serine,
        AminoAcid::Asparagine,
        AminoAcid::GlutamicAcid,
        AminoAcid::Glutamine,
        AminoAcid::Cysteine,
        AminoAcid::Proline,
        AminoAcid::Glycine,
        AminoAcid::Alanine,
        AminoAcid::Citrulline,
        AminoAcid::Valine,
        AminoAcid::Cystine,
        AminoAcid::Methionine,
        AminoAcid::Isoleucine,
        AminoAcid::Leucine,
        AminoAcid::Tyrosine,
        AminoAcid::Phenylalanine,
        AminoAcid::Gaba,
        AminoAcid::Histidine,
        AminoAcid::Tryptophan,
        AminoAcid::Ornithine,
        AminoAcid::Lysine,
        AminoAcid::Arginine,
    ];

    pub const ESSENTIAL: [AminoAcid; 9] = [
        AminoAcid::Threonine,
        AminoAcid::Valine,
        AminoAcid::Methionine,
        AminoAcid::Isoleucine,
        AminoAcid::Leucine,
        AminoAcid::Phenylalanine,
        AminoAcid::Tryptophan,
        AminoAcid::Lysine,
        AminoAcid::Histidine,
    ];

    /// Branched-chain amino acids.
    pub const BRANCHED_CHAIN: [AminoAcid; 3] =
        [AminoAcid::Valine, AminoAcid::Leucine, AminoAcid::Isoleucine];

    pub fn is_essential(self) -> bool {
        Self::ESSENTIAL.contains(&self)
    }

    pub fn name(self) -> &'static str {
        match self {
            AminoAcid::AsparticAcid => "Aspartic acid",
            AminoAcid::Hydroxyproline => "Hydroxyproline",
            AminoAcid::Threonine => "Threonine",
            AminoAcid::Serine => "Serine",
            AminoAcid::Asparagine => "Asparagine",
            AminoAcid::GlutamicAcid => "Glutamic acid",
            AminoAcid::Glutamine => "Glutamine",
            AminoAcid::Cysteine => "Cysteine",
            AminoAcid::Proline => "Proline",
            AminoAcid::Glycine => "Glycine",
            AminoAcid::Alanine => "Alanine",
            AminoAcid::Citrulline => "Citrulline",
            AminoAcid::Valine => "Valine",
            AminoAcid::Cystine => "Cystine",
            AminoAcid::Methionine => "Methionine",
            AminoAcid::Isoleucine => "Isoleucine",
            AminoAcid::Leucine => "Leucine",
            AminoAcid::Tyrosine => "Tyrosine",
            AminoAcid::Phenylalanine => "Phenylalanine",
            AminoAcid::Gaba => "GABA",
            AminoAcid::Histidine => "Histidine",
            AminoAcid::Tryptophan => "Tryptophan",
            AminoAcid::Ornithine => "Ornithine",
            AminoAcid::Lysine => "Lysine",
            AminoAcid::Arginine => "Arginine",
        }
    }
}

impl fmt::Display for AminoAcid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
