use super::engine::Recommender;
use crate::{
    error::PeptofitError,
    profile::NutrientProfile,
    scoring::FitnessScorer,
    settings::RecommenderSettings,
    targets::TargetTable,
};
use peptofit_schemas::{peptone::Peptone, strain::Strain};
use std::collections::HashMap;

/// A fluent builder for constructing a `Recommender`.
///
/// The catalogs handed to the builder are owned by the resulting engine and never change
/// afterwards, so one engine can serve any number of requests.
#[derive(Default)]
pub struct RecommenderBuilder {
    strains: Vec<Strain>,
    peptones: Vec<Peptone>,
    settings: Option<RecommenderSettings>,
    table: Option<TargetTable>,
}

impl RecommenderBuilder {
    /// Creates a new, empty `RecommenderBuilder`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the strain catalog.
    pub fn with_strains(mut self, strains: Vec<Strain>) -> Self {
        self.strains = strains;
        self
    }

    /// Sets the peptone catalog.
    pub fn with_peptones(mut self, peptones: Vec<Peptone>) -> Self {
        self.peptones = peptones;
        self
    }

    /// Overrides the tunable constants.
    pub fn with_settings(mut self, settings: RecommenderSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Replaces the built-in target table.
    pub fn with_target_table(mut self, table: TargetTable) -> Self {
        self.table = Some(table);
        self
    }

    /// Consumes the builder and returns a ready `Recommender`.
    ///
    /// Peptones without an explicit preferred-source flag get one from their manufacturer.
    ///
    /// # Errors
    ///
    /// Returns a `PeptofitError::ConfigError` if the settings fail validation or a strain or
    /// peptone identifier appears twice.
    pub fn build(self) -> Result<Recommender, PeptofitError> {
        let settings = self.settings.unwrap_or_default();
        settings.validate()?;

        let mut strain_index = HashMap::with_capacity(self.strains.len());
        for (i, strain) in self.strains.iter().enumerate() {
            if strain_index.insert(strain.strain_id.clone(), i).is_some() {
                return Err(PeptofitError::ConfigError(format!(
                    "duplicate strain id '{}'",
                    strain.strain_id
                )));
            }
        }

        let mut peptones = self.peptones;
        let mut peptone_index = HashMap::with_capacity(peptones.len());
        for (i, peptone) in peptones.iter_mut().enumerate() {
            if peptone.preferred_source.is_none() {
                peptone.preferred_source = Some(
                    peptone
                        .manufacturer
                        .trim()
                        .eq_ignore_ascii_case(&settings.preferred_manufacturer),
                );
            }
            if peptone_index.insert(peptone.peptone_id.clone(), i).is_some() {
                return Err(PeptofitError::ConfigError(format!(
                    "duplicate peptone id '{}'",
                    peptone.peptone_id
                )));
            }
        }
        let profiles: Vec<NutrientProfile> =
            peptones.iter().map(|p| NutrientProfile::of(&p.composition)).collect();
        let features = profiles.iter().map(NutrientProfile::features).collect();

        let scorer = FitnessScorer::new(
            self.table.unwrap_or_default(),
            settings.pathway_bonus_weight,
        );

        tracing::debug!(
            strains = self.strains.len(),
            peptones = peptones.len(),
            "recommender built"
        );
        Ok(Recommender {
            strains: self.strains,
            strain_index,
            peptones,
            peptone_index,
            profiles,
            features,
            scorer,
            settings,
        })
    }
}
