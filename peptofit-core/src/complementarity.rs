//! Complementarity selector: proposes blend partners for a base peptone.
//!
//! A partner scores well when it is compositionally different from the base (diversity) and
//! strong where the base is weak (coverage). A base feature is weak when it falls below the
//! catalog's lower-percentile value for that feature.

use crate::profile::{extract_features, Feature, FeatureVector};
use crate::settings::{
    COMPLEMENTARITY_COVERAGE_WEIGHT, COMPLEMENTARITY_DIVERSITY_WEIGHT, WEAK_FEATURE_PERCENTILE,
};
use peptofit_schemas::peptone::Peptone;
use std::collections::BTreeMap;

/// Linear-interpolated `q`-quantile of `values`; `None` when empty.
pub fn percentile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let position = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

/// Root-mean-square distance over the features measured in both vectors; zero when none are.
pub fn diversity(a: &FeatureVector, b: &FeatureVector) -> f64 {
    let squared: Vec<f64> = Feature::ALL
        .iter()
        .filter_map(|f| match (a.get(*f).known(), b.get(*f).known()) {
            (Some(x), Some(y)) => Some((x - y).powi(2)),
            _ => None,
        })
        .collect();
    if squared.is_empty() {
        return 0.0;
    }
    (squared.iter().sum::<f64>() / squared.len() as f64).sqrt()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Partner<'a> {
    pub peptone: &'a Peptone,
    pub diversity: f64,
    pub coverage: f64,
    pub score: f64,
}

#[derive(Debug, Clone)]
pub struct ComplementaritySelector<'a> {
    entries: Vec<(&'a Peptone, FeatureVector)>,
    thresholds: BTreeMap<Feature, f64>,
}

impl<'a> ComplementaritySelector<'a> {
    pub fn new(catalog: &[&'a Peptone]) -> Self {
        let entries: Vec<(&Peptone, FeatureVector)> = catalog
            .iter()
            .map(|p| (*p, extract_features(&p.composition)))
            .collect();
        let thresholds = Feature::ALL
            .iter()
            .filter_map(|feature| {
                let known: Vec<f64> = entries
                    .iter()
                    .filter_map(|(_, v)| v.get(*feature).known())
                    .collect();
                percentile(&known, WEAK_FEATURE_PERCENTILE).map(|t| (*feature, t))
            })
            .collect();
        Self { entries, thresholds }
    }

    pub fn features_of(&self, peptone_id: &str) -> Option<&FeatureVector> {
        self.entries
            .iter()
            .find(|(p, _)| p.peptone_id == peptone_id)
            .map(|(_, v)| v)
    }

    /// Features where `base` sits strictly below the catalog's lower percentile.
    pub fn weak_features(&self, base: &FeatureVector) -> Vec<Feature> {
        self.thresholds
            .iter()
            .filter(|(feature, threshold)| {
                base.get(**feature).known().is_some_and(|value| value < **threshold)
            })
            .map(|(feature, _)| *feature)
            .collect()
    }

    /// Mean of `candidate`'s measured values on the given weak features; zero when there are none.
    pub fn coverage(candidate: &FeatureVector, weak: &[Feature]) -> f64 {
        let values: Vec<f64> = weak.iter().filter_map(|f| candidate.get(*f).known()).collect();
        if values.is_empty() {
            return 0.0;
        }
        values.iter().sum::<f64>() / values.len() as f64
    }

    /// The `top_n` best partners for `base`, best first. The base itself is never proposed.
    pub fn rank(&self, base: &Peptone, top_n: usize) -> Vec<Partner<'a>> {
        let base_features = extract_features(&base.composition);
        let weak = self.weak_features(&base_features);

        let mut partners: Vec<Partner<'a>> = self
            .entries
            .iter()
            .filter(|(p, _)| p.peptone_id != base.peptone_id)
            .map(|(peptone, features)| {
                let diversity = diversity(&base_features, features);
                let coverage = Self::coverage(features, &weak);
                Partner {
                    peptone: *peptone,
                    diversity,
                    coverage,
                    score: COMPLEMENTARITY_DIVERSITY_WEIGHT * diversity
                        + COMPLEMENTARITY_COVERAGE_WEIGHT * coverage,
                }
            })
            .collect();
        partners.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.peptone.peptone_id.cmp(&b.peptone.peptone_id))
        });
        partners.truncate(top_n);
        partners
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use peptofit_schemas::level::Level;
    use peptofit_schemas::peptone::Composition;

    fn peptone(id: &str, total_nitrogen: f64, vitamins: f64) -> Peptone {
        let mut composition = Composition::default();
        composition.general.total_nitrogen = Level::Known(total_nitrogen);
        composition.vitamins.b1 = Level::Known(vitamins);
        Peptone {
            peptone_id: id.to_string(),
            name: id.to_string(),
            raw_material: "soy".to_string(),
            manufacturer: "Acme".to_string(),
            preferred_source: None,
            composition,
        }
    }

    #[test]
    fn percentile_interpolates() {
        assert_eq!(percentile(&[], 0.25), None);
        assert_eq!(percentile(&[4.0], 0.25), Some(4.0));
        assert_eq!(percentile(&[1.0, 2.0, 3.0, 4.0, 5.0], 0.25), Some(2.0));
        assert_eq!(percentile(&[0.0, 10.0], 0.25), Some(2.5));
    }

    #[test]
    fn diversity_ignores_unshared_features() {
        let a: FeatureVector = [(Feature::TotalNitrogen, Level::Known(0.8))].into_iter().collect();
        let b: FeatureVector = [
            (Feature::TotalNitrogen, Level::Known(0.5)),
            (Feature::Vitamins, Level::Known(0.9)),
        ]
        .into_iter()
        .collect();
        assert!((diversity(&a, &b) - 0.3).abs() < 1e-12);
        assert_eq!(diversity(&a, &FeatureVector::default()), 0.0);
    }

    #[test]
    fn partners_fill_the_base_gaps() {
        let catalog = vec![
            peptone("BASE", 80.0, 0.5),
            peptone("SIMILAR", 78.0, 0.6),
            peptone("VITAMIN", 60.0, 12.0),
            peptone("MID", 70.0, 4.0),
        ];
        let refs: Vec<&Peptone> = catalog.iter().collect();
        let selector = ComplementaritySelector::new(&refs);
        let base_features = selector.features_of("BASE").cloned().unwrap_or_default();
        assert_eq!(selector.weak_features(&base_features), vec![Feature::Vitamins]);

        let partners = selector.rank(&catalog[0], 2);
        assert_eq!(partners.len(), 2);
        assert_eq!(partners[0].peptone.peptone_id, "VITAMIN");
        assert!(partners.iter().all(|p| p.peptone.peptone_id != "BASE"));
        assert!(partners[0].coverage > partners[1].coverage);
    }
}
