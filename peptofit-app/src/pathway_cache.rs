//! Local stand-in for the pathway database client: organism pathway sets cached as YAML files.

use peptofit_schemas::{
    pathway::{OrganismPathways, PathwayLookup, UnavailableReason},
    strain::Strain,
};
use std::{
    fs,
    path::{Path, PathBuf},
};

#[derive(Debug, Clone)]
pub struct PathwayCache {
    dir: Option<PathBuf>,
}

impl PathwayCache {
    /// A cache over `dir`; `None` disables pathway lookups.
    pub fn new(dir: Option<PathBuf>) -> Self {
        Self { dir }
    }

    pub fn disabled() -> Self {
        Self { dir: None }
    }

    fn file_for(dir: &Path, strain: &Strain) -> PathBuf {
        let stem = format!("{}_{}", strain.genus.trim(), strain.species.trim())
            .to_lowercase()
            .replace(|c: char| !c.is_ascii_alphanumeric() && c != '_', "_");
        dir.join(format!("{}.yaml", stem))
    }

    /// Pathway data for `strain`, or the reason none is available.
    pub fn lookup(&self, strain: &Strain) -> PathwayLookup {
        let Some(dir) = &self.dir else {
            return unavailable(UnavailableReason::Disabled);
        };
        if strain.confidential {
            tracing::debug!(strain = %strain.strain_id, "confidential strain, pathway lookup skipped");
            return unavailable(UnavailableReason::NotRequested);
        }

        let path = Self::file_for(dir, strain);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(_) => {
                tracing::info!(strain = %strain.strain_id, path = %path.display(), "no cached pathway data");
                return unavailable(UnavailableReason::OrganismNotFound);
            }
        };
        match serde_yaml::from_str::<OrganismPathways>(&content) {
            Ok(pathways) => {
                tracing::debug!(
                    strain = %strain.strain_id,
                    organism = %pathways.organism_code,
                    pathways = pathways.pathways.len(),
                    "pathway data loaded"
                );
                PathwayLookup::Resolved { pathways }
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "unreadable pathway data, scoring without it");
                unavailable(UnavailableReason::NetworkFailure)
            }
        }
    }
}

fn unavailable(reason: UnavailableReason) -> PathwayLookup {
    PathwayLookup::Unavailable { reason }
}
