//! Data model for peptone fitness recommendation: catalog strains and peptones, unknown-aware
//! composition levels, pathway data from the external database client, and the ranked output.

pub mod amino_acid;
pub mod file_formats;
pub mod level;
pub mod pathway;
pub mod peptone;
pub mod recommendation;
pub mod strain;
