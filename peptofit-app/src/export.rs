use anyhow::{Context, Result};
use peptofit_schemas::recommendation::Recommendation;
use serde::Serialize;
use std::{fs, path::Path};

/// One flattened CSV row per recommendation.
#[derive(Debug, Serialize)]
struct RecommendationRow<'a> {
    rank: usize,
    strain_id: &'a str,
    kind: &'static str,
    peptone_ids: String,
    description: String,
    ratios: String,
    overall_score: f64,
    nutritional_match: f64,
    amino_acid_match: f64,
    growth_factor_match: f64,
    mw_distribution_match: f64,
    pathway_bonus: Option<f64>,
    low_confidence: bool,
    optimization_success: Option<bool>,
    rationale: &'a str,
}

impl<'a> RecommendationRow<'a> {
    fn new(rank: usize, rec: &'a Recommendation) -> Self {
        Self {
            rank,
            strain_id: &rec.strain_id,
            kind: if rec.is_blend() { "blend" } else { "single" },
            peptone_ids: rec.peptone_ids.join("+"),
            description: rec.description(),
            ratios: rec
                .ratios
                .iter()
                .map(|r| format!("{:.4}", r))
                .collect::<Vec<_>>()
                .join(";"),
            overall_score: rec.overall_score,
            nutritional_match: rec.subscores.nutritional_match,
            amino_acid_match: rec.subscores.amino_acid_match,
            growth_factor_match: rec.subscores.growth_factor_match,
            mw_distribution_match: rec.subscores.mw_distribution_match,
            pathway_bonus: rec.subscores.pathway_bonus,
            low_confidence: rec.subscores.is_low_confidence(),
            optimization_success: rec.optimization.as_ref().map(|o| o.success),
            rationale: &rec.rationale,
        }
    }
}

/// Writes `recommendations.csv`; ranks restart at 1 for each kind.
pub fn write_csv(path: &Path, recommendations: &[Recommendation]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {:?}", path))?;
    let (mut singles, mut blends) = (0, 0);
    for rec in recommendations {
        let counter = if rec.is_blend() { &mut blends } else { &mut singles };
        *counter += 1;
        writer.serialize(RecommendationRow::new(*counter, rec))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_json(path: &Path, recommendations: &[Recommendation]) -> Result<()> {
    let json = serde_json::to_string_pretty(recommendations)?;
    fs::write(path, json).with_context(|| format!("Failed to write {:?}", path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use peptofit_schemas::recommendation::{OptimizationSummary, SolverStrategy, SubScores};
    use std::collections::BTreeSet;

    fn recommendation(ids: &[&str], ratios: &[f64], success: Option<bool>) -> Recommendation {
        Recommendation {
            strain_id: "KCTC 3108".to_string(),
            peptone_ids: ids.iter().map(|s| s.to_string()).collect(),
            peptone_names: ids.iter().map(|s| format!("Peptone {}", s)).collect(),
            ratios: ratios.to_vec(),
            overall_score: 0.72,
            subscores: SubScores {
                nutritional_match: 0.9,
                amino_acid_match: 0.5,
                growth_factor_match: 0.6,
                mw_distribution_match: 0.7,
                pathway_bonus: None,
                insufficient_data: BTreeSet::new(),
            },
            rationale: "Strengths: optimal nitrogen content".to_string(),
            optimization: success.map(|success| OptimizationSummary {
                strategy: SolverStrategy::ProjectedGradient,
                success,
                iterations: 3,
                objective: 0.01,
                message: "converged".to_string(),
            }),
        }
    }

    #[test]
    fn csv_has_one_row_per_recommendation() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("recommendations.csv");
        let recs = vec![
            recommendation(&["A"], &[1.0], None),
            recommendation(&["A", "B"], &[0.6, 0.4], Some(true)),
        ];
        write_csv(&path, &recs).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(&headers[0], "rank");
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[1][2], "blend");
        assert_eq!(&rows[1][3], "A+B");
        assert_eq!(&rows[1][5], "0.6000;0.4000");
        assert_eq!(&rows[0][0], "1");
        assert_eq!(&rows[1][0], "1");
    }

    #[test]
    fn json_round_trips() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("recommendations.json");
        let recs = vec![recommendation(&["A", "B"], &[0.5, 0.5], Some(false))];
        write_json(&path, &recs).unwrap();
        let back: Vec<Recommendation> =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back, recs);
    }
}
