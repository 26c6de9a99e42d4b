use crate::{peptone::Peptone, strain::Strain};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct StrainFile {
    pub schema_version: String,
    pub strains: Vec<Strain>,
}

#[derive(Debug, Deserialize)]
pub struct PeptoneFile {
    pub schema_version: String,
    pub peptones: Vec<Peptone>,
}
