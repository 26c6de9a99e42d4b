//! Metabolic-pathway data as handed over by the pathway database client.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathwayInfo {
    pub name: String,
    /// Fraction of the reference pathway's enzymes found in the organism, 0..=1.
    pub completeness: f64,
}

/// Pathways annotated for one organism, keyed by reference map id (e.g., "map00290").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganismPathways {
    pub organism_code: String,
    pub organism_name: String,
    #[serde(default)]
    pub pathways: BTreeMap<String, PathwayInfo>,
}

impl OrganismPathways {
    pub fn has_pathway(&self, pathway_id: &str) -> bool {
        self.pathways.contains_key(pathway_id)
    }

    pub fn completeness(&self, pathway_id: &str) -> Option<f64> {
        self.pathways.get(pathway_id).map(|p| p.completeness)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnavailableReason {
    NetworkFailure,
    RateLimited,
    OrganismNotFound,
    Disabled,
    NotRequested,
}

impl fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            UnavailableReason::NetworkFailure => "network failure",
            UnavailableReason::RateLimited => "rate limited",
            UnavailableReason::OrganismNotFound => "organism not found",
            UnavailableReason::Disabled => "disabled by configuration",
            UnavailableReason::NotRequested => "not requested",
        };
        f.write_str(label)
    }
}

/// The pathway client's answer for one organism.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PathwayLookup {
    Resolved { pathways: OrganismPathways },
    Unavailable { reason: UnavailableReason },
}

impl PathwayLookup {
    pub fn not_requested() -> Self {
        PathwayLookup::Unavailable {
            reason: UnavailableReason::NotRequested,
        }
    }

    pub fn resolved(&self) -> Option<&OrganismPathways> {
        match self {
            PathwayLookup::Resolved { pathways } => Some(pathways),
            PathwayLookup::Unavailable { .. } => None,
        }
    }
}

impl Default for PathwayLookup {
    fn default() -> Self {
        Self::not_requested()
    }
}
