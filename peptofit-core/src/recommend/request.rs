use crate::candidates::SourceFilter;
use crate::optimizer::Thoroughness;
use crate::settings::{DEFAULT_MAX_COMPONENTS, MAX_BLEND_COMPONENTS, MIN_BLEND_COMPONENTS};
use serde::{Deserialize, Serialize};

pub const DEFAULT_TOP_N: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationMode {
    #[default]
    Single,
    Blend,
}

/// How blend candidates are proposed before their ratios are solved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendSeeding {
    /// Every combination drawn from the shortlist of best single products.
    #[default]
    Exhaustive,
    /// The best single products paired with their most complementary partners.
    Complementary,
}

/// One recommendation request as issued by the reporting layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationRequest {
    pub strain_id: String,
    #[serde(default)]
    pub mode: RecommendationMode,
    #[serde(default = "default_max_components")]
    pub max_components: usize,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    #[serde(default)]
    pub source_filter: SourceFilter,
    #[serde(default)]
    pub thoroughness: Thoroughness,
    #[serde(default)]
    pub seeding: BlendSeeding,
}

fn default_max_components() -> usize {
    DEFAULT_MAX_COMPONENTS
}

fn default_top_n() -> usize {
    DEFAULT_TOP_N
}

impl RecommendationRequest {
    pub fn new(strain_id: impl Into<String>, mode: RecommendationMode) -> Self {
        Self {
            strain_id: strain_id.into(),
            mode,
            max_components: DEFAULT_MAX_COMPONENTS,
            top_n: DEFAULT_TOP_N,
            source_filter: SourceFilter::default(),
            thoroughness: Thoroughness::default(),
            seeding: BlendSeeding::default(),
        }
    }

    pub fn single(strain_id: impl Into<String>) -> Self {
        Self::new(strain_id, RecommendationMode::Single)
    }

    pub fn blend(strain_id: impl Into<String>) -> Self {
        Self::new(strain_id, RecommendationMode::Blend)
    }

    pub fn with_max_components(mut self, max_components: usize) -> Self {
        self.max_components = max_components;
        self
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    pub fn with_source_filter(mut self, source_filter: SourceFilter) -> Self {
        self.source_filter = source_filter;
        self
    }

    pub fn with_thoroughness(mut self, thoroughness: Thoroughness) -> Self {
        self.thoroughness = thoroughness;
        self
    }

    pub fn with_seeding(mut self, seeding: BlendSeeding) -> Self {
        self.seeding = seeding;
        self
    }

    /// `max_components` clamped to the supported blend sizes.
    pub fn effective_max_components(&self) -> usize {
        self.max_components
            .clamp(MIN_BLEND_COMPONENTS, MAX_BLEND_COMPONENTS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_components_is_clamped() {
        assert_eq!(RecommendationRequest::blend("S").with_max_components(9).effective_max_components(), 5);
        assert_eq!(RecommendationRequest::blend("S").with_max_components(0).effective_max_components(), 2);
        assert_eq!(RecommendationRequest::blend("S").effective_max_components(), 3);
    }

    #[test]
    fn yaml_request_fills_defaults() {
        let request: RecommendationRequest =
            serde_yaml::from_str("strain_id: KCCM 12116\nmode: blend\nthoroughness: thorough\n")
                .unwrap();
        assert_eq!(request.mode, RecommendationMode::Blend);
        assert_eq!(request.thoroughness, Thoroughness::Thorough);
        assert_eq!(request.top_n, DEFAULT_TOP_N);
        assert_eq!(request.source_filter, SourceFilter::All);
        assert_eq!(request.seeding, BlendSeeding::Exhaustive);
    }
}
