use crate::{Cli, ModeArg};
use anyhow::{bail, Context, Result};
use peptofit_core::{
    candidates::SourceFilter,
    optimizer::Thoroughness,
    recommend::{BlendSeeding, RecommendationMode, RecommendationRequest},
};
use serde::Deserialize;
use std::{fs, path::Path};

/// Which recommendation lists a run produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    Single,
    Blend,
    All,
}

impl RunMode {
    fn modes(self) -> &'static [RecommendationMode] {
        match self {
            RunMode::Single => &[RecommendationMode::Single],
            RunMode::Blend => &[RecommendationMode::Blend],
            RunMode::All => &[RecommendationMode::Single, RecommendationMode::Blend],
        }
    }
}

impl From<ModeArg> for RunMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Single => RunMode::Single,
            ModeArg::Blend => RunMode::Blend,
            ModeArg::All => RunMode::All,
        }
    }
}

/// A run request as read from YAML. Every field is optional; present fields override the
/// command line.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunRequest {
    pub strain_id: Option<String>,
    pub mode: Option<RunMode>,
    pub max_components: Option<usize>,
    pub top_n: Option<usize>,
    pub source_filter: Option<SourceFilter>,
    pub thoroughness: Option<Thoroughness>,
    pub seeding: Option<BlendSeeding>,
}

impl RunRequest {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read request file {:?}", path))?;
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse request file {:?}", path))
    }

    /// The request the command-line flags alone describe.
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            strain_id: cli.strain.clone(),
            mode: Some(cli.mode.into()),
            max_components: cli.max_components,
            top_n: cli.top_n,
            source_filter: Some(if cli.all_sources {
                SourceFilter::All
            } else {
                SourceFilter::PreferredOnly
            }),
            thoroughness: Some(if cli.thorough {
                Thoroughness::Thorough
            } else {
                Thoroughness::Quick
            }),
            seeding: Some(if cli.complementary {
                BlendSeeding::Complementary
            } else {
                BlendSeeding::Exhaustive
            }),
        }
    }

    /// `self` with every field `other` sets replaced by `other`'s value.
    pub fn overridden_by(self, other: RunRequest) -> Self {
        Self {
            strain_id: other.strain_id.or(self.strain_id),
            mode: other.mode.or(self.mode),
            max_components: other.max_components.or(self.max_components),
            top_n: other.top_n.or(self.top_n),
            source_filter: other.source_filter.or(self.source_filter),
            thoroughness: other.thoroughness.or(self.thoroughness),
            seeding: other.seeding.or(self.seeding),
        }
    }

    /// One engine request per recommendation mode of the run.
    pub fn into_requests(self) -> Result<Vec<RecommendationRequest>> {
        let Some(strain_id) = self.strain_id else {
            bail!("no strain given: pass --strain or set strain_id in the request file");
        };
        let mode = self.mode.unwrap_or(RunMode::All);
        Ok(mode
            .modes()
            .iter()
            .map(|m| {
                let mut request = RecommendationRequest::new(strain_id.clone(), *m);
                if let Some(max_components) = self.max_components {
                    request = request.with_max_components(max_components);
                }
                if let Some(top_n) = self.top_n {
                    request = request.with_top_n(top_n);
                }
                if let Some(filter) = self.source_filter {
                    request = request.with_source_filter(filter);
                }
                if let Some(thoroughness) = self.thoroughness {
                    request = request.with_thoroughness(thoroughness);
                }
                if let Some(seeding) = self.seeding {
                    request = request.with_seeding(seeding);
                }
                request
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn request_file_overrides_flags() {
        let cli = Cli::parse_from(["peptofit", "--strain", "KCTC 3108", "--top-n", "5", "--thorough"]);
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("request.yaml");
        fs::write(&path, "strain_id: KCCM 12116\nmode: blend\nsource_filter: all\n").unwrap();

        let requests = RunRequest::from_cli(&cli)
            .overridden_by(RunRequest::load(&path).unwrap())
            .into_requests()
            .unwrap();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.strain_id, "KCCM 12116");
        assert_eq!(request.mode, RecommendationMode::Blend);
        assert_eq!(request.top_n, 5);
        assert_eq!(request.source_filter, SourceFilter::All);
        assert_eq!(request.thoroughness, Thoroughness::Thorough);
    }

    #[test]
    fn flags_alone_default_to_both_modes_over_preferred_sources() {
        let cli = Cli::parse_from(["peptofit", "--strain", "KCTC 3108"]);
        let requests = RunRequest::from_cli(&cli).into_requests().unwrap();
        let modes: Vec<_> = requests.iter().map(|r| r.mode).collect();
        assert_eq!(modes, [RecommendationMode::Single, RecommendationMode::Blend]);
        assert!(requests
            .iter()
            .all(|r| r.source_filter == SourceFilter::PreferredOnly));
    }

    #[test]
    fn missing_strain_and_unknown_fields_are_rejected() {
        let cli = Cli::parse_from(["peptofit"]);
        assert!(RunRequest::from_cli(&cli).into_requests().is_err());
        assert!(serde_yaml::from_str::<RunRequest>("strain: X\n").is_err());
    }
}
