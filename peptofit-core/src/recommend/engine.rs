use super::{
    rationale::rationale,
    request::{BlendSeeding, RecommendationMode, RecommendationRequest},
};
use crate::{
    candidates::{blend_candidates, combinations, shortlist, SourceFilter},
    complementarity::{ComplementaritySelector, Partner},
    error::PeptofitError,
    optimizer::{optimize, OptimizationResult},
    profile::{FeatureVector, NutrientProfile},
    scoring::{FitnessScore, FitnessScorer, ScoringContext},
    similarity::{most_similar, SimilarPeptone, SimilarityMetric},
    settings::{RecommenderSettings, MAX_BLEND_COMPONENTS, MIN_BLEND_COMPONENTS, RATIO_SUM_TOLERANCE},
};
use peptofit_schemas::{
    pathway::PathwayLookup,
    peptone::Peptone,
    recommendation::Recommendation,
    strain::Strain,
};
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

/// The recommendation engine over immutable strain and peptone catalogs.
///
/// Every operation is a pure function of the catalogs, the settings, and its arguments, so a
/// shared `&Recommender` can serve concurrent requests.
pub struct Recommender {
    pub(super) strains: Vec<Strain>,
    pub(super) strain_index: HashMap<String, usize>,
    pub(super) peptones: Vec<Peptone>,
    pub(super) peptone_index: HashMap<String, usize>,
    pub(super) profiles: Vec<NutrientProfile>,
    pub(super) features: Vec<FeatureVector>,
    pub(super) scorer: FitnessScorer,
    pub(super) settings: RecommenderSettings,
}

/// Orders recommendations best first: overall score descending, then fewer components, then
/// component ids.
///
/// The id tie-breaks assume `peptone_ids` is in id order, as every recommendation the engine
/// assembles is.
pub fn compare_recommendations(a: &Recommendation, b: &Recommendation) -> Ordering {
    b.overall_score
        .total_cmp(&a.overall_score)
        .then_with(|| a.component_count().cmp(&b.component_count()))
        .then_with(|| a.peptone_ids.first().cmp(&b.peptone_ids.first()))
        .then_with(|| a.peptone_ids.cmp(&b.peptone_ids))
}

pub fn rank_recommendations(recommendations: &mut [Recommendation]) {
    recommendations.sort_by(compare_recommendations);
}

impl Recommender {
    pub fn strains(&self) -> &[Strain] {
        &self.strains
    }

    pub fn peptones(&self) -> &[Peptone] {
        &self.peptones
    }

    pub fn settings(&self) -> &RecommenderSettings {
        &self.settings
    }

    pub fn strain(&self, strain_id: &str) -> Result<&Strain, PeptofitError> {
        self.strain_index
            .get(strain_id)
            .map(|i| &self.strains[*i])
            .ok_or_else(|| PeptofitError::StrainNotFound(strain_id.to_string()))
    }

    pub fn peptone(&self, peptone_id: &str) -> Result<&Peptone, PeptofitError> {
        self.position_of(peptone_id).map(|i| &self.peptones[i])
    }

    fn position_of(&self, peptone_id: &str) -> Result<usize, PeptofitError> {
        self.peptone_index
            .get(peptone_id)
            .copied()
            .ok_or_else(|| PeptofitError::PeptoneNotFound(peptone_id.to_string()))
    }

    /// Catalog indices admitted by `filter`, in catalog order.
    fn pool(&self, filter: SourceFilter) -> Vec<usize> {
        (0..self.peptones.len())
            .filter(|i| filter.admits(&self.peptones[*i]))
            .collect()
    }

    /// Builds the recommendation with components listed in peptone-id order, each ratio kept with
    /// its component.
    fn assemble(
        &self,
        strain: &Strain,
        members: &[usize],
        ratios: Vec<f64>,
        score: FitnessScore,
        optimization: Option<&OptimizationResult>,
    ) -> Recommendation {
        let mut pairs: Vec<(&Peptone, f64)> = members
            .iter()
            .map(|i| &self.peptones[*i])
            .zip(ratios)
            .collect();
        pairs.sort_by(|a, b| a.0.peptone_id.cmp(&b.0.peptone_id));
        let (peptones, ratios): (Vec<&Peptone>, Vec<f64>) = pairs.into_iter().unzip();
        let rationale = rationale(&peptones, &score.subscores, &score.matched_nutrients, optimization);
        Recommendation {
            strain_id: strain.strain_id.clone(),
            peptone_ids: peptones.iter().map(|p| p.peptone_id.clone()).collect(),
            peptone_names: peptones.iter().map(|p| p.name.clone()).collect(),
            ratios,
            overall_score: score.overall,
            subscores: score.subscores,
            rationale,
            optimization: optimization.map(OptimizationResult::summary),
        }
    }

    fn score_single(&self, context: &ScoringContext<'_>, index: usize) -> FitnessScore {
        self.scorer.score(context, &self.profiles[index])
    }

    fn score_mix(&self, context: &ScoringContext<'_>, members: &[usize], ratios: &[f64]) -> FitnessScore {
        let parts: Vec<_> = members
            .iter()
            .zip(ratios)
            .map(|(i, r)| (&self.profiles[*i], *r))
            .collect();
        self.scorer.score_blend(context, &parts)
    }

    /// Scores one strain against one catalog peptone.
    pub fn score_pair(
        &self,
        strain_id: &str,
        peptone_id: &str,
        pathways: &PathwayLookup,
    ) -> Result<Recommendation, PeptofitError> {
        let strain = self.strain(strain_id)?;
        let index = self.position_of(peptone_id)?;
        let context = self.scorer.context(strain, pathways);
        let score = self.score_single(&context, index);
        Ok(self.assemble(strain, &[index], vec![1.0], score, None))
    }

    /// Scores a caller-chosen blend at caller-chosen ratios. The result lists the components in
    /// peptone-id order whatever order the caller gave them in.
    ///
    /// # Errors
    ///
    /// `StrainNotFound`/`PeptoneNotFound` for unknown ids, `InvalidBlend` when the blend has the
    /// wrong size, repeats a component, or its ratios do not form a distribution over it.
    pub fn evaluate_blend(
        &self,
        strain_id: &str,
        peptone_ids: &[&str],
        ratios: &[f64],
        pathways: &PathwayLookup,
    ) -> Result<Recommendation, PeptofitError> {
        let strain = self.strain(strain_id)?;
        if !(MIN_BLEND_COMPONENTS..=MAX_BLEND_COMPONENTS).contains(&peptone_ids.len()) {
            return Err(PeptofitError::InvalidBlend(format!(
                "a blend needs {} to {} components, got {}",
                MIN_BLEND_COMPONENTS,
                MAX_BLEND_COMPONENTS,
                peptone_ids.len()
            )));
        }
        if ratios.len() != peptone_ids.len() {
            return Err(PeptofitError::InvalidBlend(format!(
                "{} ratios given for {} components",
                ratios.len(),
                peptone_ids.len()
            )));
        }
        if ratios.iter().any(|r| !(0.0..=1.0).contains(r)) {
            return Err(PeptofitError::InvalidBlend(
                "every ratio must lie in [0, 1]".to_string(),
            ));
        }
        let sum: f64 = ratios.iter().sum();
        if (sum - 1.0).abs() > RATIO_SUM_TOLERANCE {
            return Err(PeptofitError::InvalidBlend(format!(
                "ratios sum to {}, expected 1",
                sum
            )));
        }
        let members = peptone_ids
            .iter()
            .map(|id| self.position_of(id))
            .collect::<Result<Vec<_>, _>>()?;
        if members.iter().collect::<BTreeSet<_>>().len() != members.len() {
            return Err(PeptofitError::InvalidBlend(
                "a blend cannot repeat a component".to_string(),
            ));
        }

        let context = self.scorer.context(strain, pathways);
        let score = self.score_mix(&context, &members, ratios);
        Ok(self.assemble(strain, &members, ratios.to_vec(), score, None))
    }

    /// Catalog peptones that best complement `peptone_id`, best first.
    pub fn complementary_partners(
        &self,
        peptone_id: &str,
        top_n: usize,
        source_filter: SourceFilter,
    ) -> Result<Vec<Partner<'_>>, PeptofitError> {
        let base = self.peptone(peptone_id)?;
        let pool: Vec<&Peptone> = self
            .pool(source_filter)
            .into_iter()
            .map(|i| &self.peptones[i])
            .collect();
        Ok(ComplementaritySelector::new(&pool).rank(base, top_n))
    }

    /// Catalog peptones most similar to `peptone_id`, most similar first.
    pub fn similar_peptones(
        &self,
        peptone_id: &str,
        top_n: usize,
        source_filter: SourceFilter,
        metric: SimilarityMetric,
    ) -> Result<Vec<SimilarPeptone<'_>>, PeptofitError> {
        let index = self.position_of(peptone_id)?;
        let candidates = self
            .pool(source_filter)
            .into_iter()
            .map(|i| (&self.peptones[i], &self.features[i]));
        Ok(most_similar(
            &self.peptones[index],
            &self.features[index],
            candidates,
            metric,
            top_n,
        ))
    }

    /// Strain-independent quality of one catalog peptone, in [0, 1].
    pub fn quality_score(&self, peptone_id: &str) -> Result<f64, PeptofitError> {
        self.position_of(peptone_id)
            .map(|i| self.profiles[i].quality_score())
    }

    /// Runs one request: scores every admitted product, or searches and optimises blends, and
    /// returns the `top_n` best recommendations.
    ///
    /// # Errors
    ///
    /// `StrainNotFound` when the strain is not in the catalog. Sparse data, unavailable pathway
    /// data, and failed solves degrade the affected results instead.
    pub fn recommend(
        &self,
        request: &RecommendationRequest,
        pathways: &PathwayLookup,
    ) -> Result<Vec<Recommendation>, PeptofitError> {
        let strain = self.strain(&request.strain_id)?;
        let context = self.scorer.context(strain, pathways);
        if let PathwayLookup::Unavailable { reason } = pathways {
            tracing::debug!(strain = %strain.strain_id, %reason, "scoring without pathway data");
        }

        let pool = self.pool(request.source_filter);
        let singles: Vec<(usize, FitnessScore)> = pool
            .iter()
            .map(|i| (*i, self.score_single(&context, *i)))
            .collect();

        let mut recommendations = match request.mode {
            RecommendationMode::Single => singles
                .into_iter()
                .map(|(i, score)| {
                    tracing::debug!(peptone = %self.peptones[i].peptone_id, score = score.overall, "scored");
                    self.assemble(strain, &[i], vec![1.0], score, None)
                })
                .collect::<Vec<_>>(),
            RecommendationMode::Blend => self.recommend_blends(request, &context, &singles),
        };
        rank_recommendations(&mut recommendations);
        recommendations.truncate(request.top_n);

        tracing::info!(
            strain = %strain.strain_id,
            mode = ?request.mode,
            candidates = pool.len(),
            returned = recommendations.len(),
            "recommendation request complete"
        );
        Ok(recommendations)
    }

    fn blend_sets(
        &self,
        request: &RecommendationRequest,
        singles: &[(usize, FitnessScore)],
    ) -> Vec<Vec<usize>> {
        let max_components = request.effective_max_components();
        let scored: Vec<(&Peptone, f64)> = singles
            .iter()
            .map(|(i, s)| (&self.peptones[*i], s.overall))
            .collect();
        let best = shortlist(&scored, self.settings.shortlist_size);

        let sets: BTreeSet<Vec<usize>> = match request.seeding {
            BlendSeeding::Exhaustive => blend_candidates(&best, max_components)
                .into_iter()
                .filter_map(|set| self.indices_of(&set))
                .collect(),
            BlendSeeding::Complementary => {
                let pool: Vec<&Peptone> = singles.iter().map(|(i, _)| &self.peptones[*i]).collect();
                let selector = ComplementaritySelector::new(&pool);
                let mut sets = BTreeSet::new();
                for base in best.iter().take(self.settings.complementary_bases) {
                    let partners: Vec<&Peptone> = selector
                        .rank(base, self.settings.complementary_partners)
                        .into_iter()
                        .map(|p| p.peptone)
                        .collect();
                    for size in 1..max_components {
                        for chosen in combinations(partners.len(), size) {
                            let mut set: Vec<&Peptone> = vec![*base];
                            set.extend(chosen.into_iter().map(|j| partners[j]));
                            if let Some(indices) = self.indices_of(&set) {
                                sets.insert(indices);
                            }
                        }
                    }
                }
                sets
            }
        };
        sets.into_iter().collect()
    }

    /// Catalog indices of `set`, ordered by peptone id.
    fn indices_of(&self, set: &[&Peptone]) -> Option<Vec<usize>> {
        let mut sorted: Vec<&Peptone> = set.to_vec();
        sorted.sort_by(|a, b| a.peptone_id.cmp(&b.peptone_id));
        sorted
            .iter()
            .map(|p| self.peptone_index.get(&p.peptone_id).copied())
            .collect()
    }

    fn recommend_blends(
        &self,
        request: &RecommendationRequest,
        context: &ScoringContext<'_>,
        singles: &[(usize, FitnessScore)],
    ) -> Vec<Recommendation> {
        if singles.len() < MIN_BLEND_COMPONENTS {
            tracing::info!(
                strain = %context.strain.strain_id,
                available = singles.len(),
                "too few peptones for a blend"
            );
            return Vec::new();
        }
        let target = context.targets.target_profile();

        self.blend_sets(request, singles)
            .into_iter()
            .map(|members| {
                let components: Vec<&FeatureVector> =
                    members.iter().map(|i| &self.features[*i]).collect();
                let result = optimize(&components, &target, request.thoroughness, &self.settings);
                if !result.success {
                    let blend: Vec<&str> = members
                        .iter()
                        .map(|i| self.peptones[*i].peptone_id.as_str())
                        .collect();
                    tracing::warn!(
                        strain = %context.strain.strain_id,
                        ?blend,
                        message = %result.message,
                        "blend ratio optimization did not converge"
                    );
                }
                let score = self.score_mix(context, &members, &result.ratios);
                tracing::debug!(components = members.len(), score = score.overall, "blend scored");
                self.assemble(context.strain, &members, result.ratios.clone(), score, Some(&result))
            })
            .collect()
    }

    /// Runs independent requests; one failed request does not affect the others.
    pub fn recommend_batch(
        &self,
        requests: &[(RecommendationRequest, PathwayLookup)],
    ) -> Vec<Result<Vec<Recommendation>, PeptofitError>> {
        requests
            .iter()
            .map(|(request, pathways)| {
                let result = self.recommend(request, pathways);
                if let Err(err) = &result {
                    tracing::warn!(strain = %request.strain_id, error = %err, "request failed");
                }
                result
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use peptofit_schemas::recommendation::SubScores;

    fn recommendation(ids: &[&str], score: f64) -> Recommendation {
        Recommendation {
            strain_id: "S".to_string(),
            peptone_ids: ids.iter().map(|s| s.to_string()).collect(),
            peptone_names: ids.iter().map(|s| s.to_string()).collect(),
            ratios: vec![1.0 / ids.len() as f64; ids.len()],
            overall_score: score,
            subscores: SubScores {
                nutritional_match: score,
                amino_acid_match: score,
                growth_factor_match: score,
                mw_distribution_match: score,
                pathway_bonus: None,
                insufficient_data: BTreeSet::new(),
            },
            rationale: String::new(),
            optimization: None,
        }
    }

    #[test]
    fn ranking_breaks_ties_by_size_then_ids() {
        let mut recs = vec![
            recommendation(&["B", "C"], 0.7),
            recommendation(&["A", "D"], 0.7),
            recommendation(&["Z"], 0.7),
            recommendation(&["A", "C"], 0.7),
            recommendation(&["Q"], 0.9),
        ];
        rank_recommendations(&mut recs);
        let order: Vec<String> = recs.iter().map(|r| r.peptone_ids.join("+")).collect();
        assert_eq!(order, vec!["Q", "Z", "A+C", "A+D", "B+C"]);
    }
}
