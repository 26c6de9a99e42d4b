//! Product similarity over normalized feature vectors.
//!
//! Unmeasured features count as zero, so two products that share no measured feature are
//! dissimilar rather than incomparable.

use crate::profile::{Feature, FeatureVector};
use peptofit_schemas::peptone::Peptone;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityMetric {
    #[default]
    Cosine,
    /// `1 / (1 + distance)`.
    Euclidean,
}

fn dense(vector: &FeatureVector) -> Vec<f64> {
    Feature::ALL
        .iter()
        .map(|f| vector.get(*f).known().unwrap_or(0.0))
        .collect()
}

/// Similarity of two feature vectors, higher meaning more alike. Cosine similarity is zero when
/// either vector has nothing measured.
pub fn similarity(a: &FeatureVector, b: &FeatureVector, metric: SimilarityMetric) -> f64 {
    let (a, b) = (dense(a), dense(b));
    match metric {
        SimilarityMetric::Cosine => {
            let dot: f64 = a.iter().zip(&b).map(|(x, y)| x * y).sum();
            let norm = |v: &[f64]| v.iter().map(|x| x * x).sum::<f64>().sqrt();
            let denominator = norm(&a) * norm(&b);
            if denominator > 0.0 {
                dot / denominator
            } else {
                0.0
            }
        }
        SimilarityMetric::Euclidean => {
            let distance = a.iter().zip(&b).map(|(x, y)| (x - y).powi(2)).sum::<f64>().sqrt();
            1.0 / (1.0 + distance)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimilarPeptone<'a> {
    pub peptone: &'a Peptone,
    pub similarity: f64,
}

/// The `top_n` entries most similar to `reference`, most similar first, ties by peptone id.
/// The reference product itself is skipped.
pub fn most_similar<'a>(
    reference: &Peptone,
    reference_features: &FeatureVector,
    candidates: impl IntoIterator<Item = (&'a Peptone, &'a FeatureVector)>,
    metric: SimilarityMetric,
    top_n: usize,
) -> Vec<SimilarPeptone<'a>> {
    let mut similar: Vec<SimilarPeptone<'a>> = candidates
        .into_iter()
        .filter(|(p, _)| p.peptone_id != reference.peptone_id)
        .map(|(peptone, features)| SimilarPeptone {
            peptone,
            similarity: similarity(reference_features, features, metric),
        })
        .collect();
    similar.sort_by(|a, b| {
        b.similarity
            .total_cmp(&a.similarity)
            .then_with(|| a.peptone.peptone_id.cmp(&b.peptone.peptone_id))
    });
    similar.truncate(top_n);
    similar
}
