//! Candidate generation: single products, and bounded blend combinations drawn from a shortlist.

use peptofit_schemas::peptone::Peptone;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceFilter {
    #[default]
    All,
    PreferredOnly,
}

impl SourceFilter {
    pub fn admits(self, peptone: &Peptone) -> bool {
        match self {
            SourceFilter::All => true,
            SourceFilter::PreferredOnly => peptone.is_preferred(),
        }
    }
}

/// Peptones passing `filter`, in catalog order.
pub fn filter_catalog(catalog: &[Peptone], filter: SourceFilter) -> Vec<&Peptone> {
    catalog.iter().filter(|p| filter.admits(p)).collect()
}

/// The `k` best peptones by individual score. Ties keep the lower id first.
pub fn shortlist<'a>(scored: &[(&'a Peptone, f64)], k: usize) -> Vec<&'a Peptone> {
    let mut ranked: Vec<(&Peptone, f64)> = scored.to_vec();
    ranked.sort_by(|(pa, sa), (pb, sb)| {
        sb.total_cmp(sa)
            .then_with(|| pa.peptone_id.cmp(&pb.peptone_id))
    });
    ranked.into_iter().take(k).map(|(p, _)| p).collect()
}

/// All `k`-element index combinations of `0..n`, in lexicographic order.
pub fn combinations(n: usize, k: usize) -> Vec<Vec<usize>> {
    let mut out = Vec::new();
    if k == 0 || k > n {
        return out;
    }
    let mut indices: Vec<usize> = (0..k).collect();
    loop {
        out.push(indices.clone());
        // rightmost index that can still move
        let Some(i) = (0..k).rev().find(|&i| indices[i] < n - k + i) else {
            return out;
        };
        indices[i] += 1;
        for j in i + 1..k {
            indices[j] = indices[j - 1] + 1;
        }
    }
}

/// Every unordered combination of 2..=`max_components` distinct shortlisted peptones. Empty when
/// fewer than two peptones are available.
pub fn blend_candidates<'a>(shortlist: &[&'a Peptone], max_components: usize) -> Vec<Vec<&'a Peptone>> {
    let upper = max_components.min(shortlist.len());
    (2..=upper)
        .flat_map(|size| combinations(shortlist.len(), size))
        .map(|indices| indices.into_iter().map(|i| shortlist[i]).collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use peptofit_schemas::peptone::Composition;

    fn peptone(id: &str, preferred: bool) -> Peptone {
        Peptone {
            peptone_id: id.to_string(),
            name: id.to_string(),
            raw_material: "soy".to_string(),
            manufacturer: "Acme".to_string(),
            preferred_source: Some(preferred),
            composition: Composition::default(),
        }
    }

    #[test]
    fn combination_counts() {
        assert_eq!(combinations(5, 2).len(), 10);
        assert_eq!(combinations(8, 3).len(), 56);
        assert_eq!(combinations(3, 3), vec![vec![0, 1, 2]]);
        assert!(combinations(2, 3).is_empty());
        assert_eq!(combinations(4, 2)[..3], [vec![0, 1], vec![0, 2], vec![0, 3]]);
    }

    #[test]
    fn blends_span_sizes_two_through_max() {
        let catalog: Vec<Peptone> = (0..4).map(|i| peptone(&format!("P{}", i), true)).collect();
        let refs: Vec<&Peptone> = catalog.iter().collect();
        let blends = blend_candidates(&refs, 3);
        assert_eq!(blends.len(), 6 + 4);
        assert!(blends.iter().all(|b| (2..=3).contains(&b.len())));
    }

    #[test]
    fn fewer_than_two_peptones_yield_no_blends() {
        let catalog = vec![peptone("P0", true)];
        let refs: Vec<&Peptone> = catalog.iter().collect();
        assert!(blend_candidates(&refs, 3).is_empty());
        assert!(blend_candidates(&[], 3).is_empty());
    }

    #[test]
    fn shortlist_keeps_best_and_breaks_ties_by_id() {
        let catalog = vec![peptone("B", true), peptone("A", true), peptone("C", false)];
        let scored = vec![(&catalog[0], 0.7), (&catalog[1], 0.7), (&catalog[2], 0.9)];
        let top: Vec<&str> = shortlist(&scored, 2).iter().map(|p| p.peptone_id.as_str()).collect();
        assert_eq!(top, vec!["C", "A"]);
        assert_eq!(filter_catalog(&catalog, SourceFilter::PreferredOnly).len(), 2);
    }
}
