use crate::{
    config::Catalog,
    export,
    pathway_cache::PathwayCache,
    plotting,
    request::RunRequest,
    Cli,
};
use anyhow::{Context, Result};
use peptofit_core::recommend::{RecommendationMode, Recommender, RecommenderBuilder};
use peptofit_schemas::{
    pathway::PathwayLookup,
    recommendation::{Recommendation, ScoreComponent},
    strain::Strain,
};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Runs one recommendation session end to end and returns the run directory.
pub fn run(cli: &Cli) -> Result<PathBuf> {
    let mut run_request = RunRequest::from_cli(cli);
    if let Some(path) = &cli.request {
        run_request = run_request.overridden_by(RunRequest::load(path)?);
    }
    let requests = run_request.into_requests()?;

    let catalog = Catalog::load(&cli.data_dir)?;
    let engine = RecommenderBuilder::new()
        .with_strains(catalog.strains)
        .with_peptones(catalog.peptones)
        .with_settings(catalog.settings)
        .build()
        .context("Failed to build the recommender")?;

    let cache = if cli.no_pathways {
        PathwayCache::disabled()
    } else {
        PathwayCache::new(cli.pathway_cache.clone())
    };

    // every request of a run names the same strain
    let strain_id = requests
        .first()
        .map(|r| r.strain_id.clone())
        .unwrap_or_default();
    let strain = engine.strain(&strain_id)?;
    let pathways = cache.lookup(strain);
    if let PathwayLookup::Unavailable { reason } = &pathways {
        tracing::warn!(strain = %strain.strain_id, %reason, "pathway data unavailable, scores carry no pathway bonus");
    }

    let mut recommendations = Vec::new();
    for request in &requests {
        let batch = engine
            .recommend(request, &pathways)
            .with_context(|| format!("Recommendation for '{}' failed", request.strain_id))?;
        if request.mode == RecommendationMode::Blend && batch.is_empty() {
            println!("\nNot enough peptones pass the source filter to form a blend.");
        }
        recommendations.extend(batch);
    }

    let output_dir = run_directory(&cli.output_dir, &strain.strain_id);
    fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create output directory: {:?}", output_dir))?;
    if let Some(path) = &cli.request {
        fs::copy(path, output_dir.join("request.yaml"))
            .with_context(|| format!("Failed to copy request file {:?}", path))?;
    }

    export::write_csv(&output_dir.join("recommendations.csv"), &recommendations)?;
    export::write_json(&output_dir.join("recommendations.json"), &recommendations)?;
    if !cli.no_plots {
        let title = format!("Peptone fit for {} {}", strain.genus, strain.species);
        plotting::plot_scores(&output_dir, &title, &recommendations)?;
    }

    print_summary_report(&engine, strain, &pathways, &recommendations);
    Ok(output_dir)
}

/// `<base>/<strain>_<timestamp>`, with the strain id reduced to file-name-safe characters.
fn run_directory(base: &Path, strain_id: &str) -> PathBuf {
    let safe: String = strain_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    base.join(format!("{}_{}", safe, chrono::Utc::now().format("%Y%m%d_%H%M%S")))
}

fn print_summary_report(
    engine: &Recommender,
    strain: &Strain,
    pathways: &PathwayLookup,
    recommendations: &[Recommendation],
) {
    println!("\n\n--- [Recommendation Report] ---");
    println!("========================================");
    println!("Strain: {} ({} {})", strain.strain_id, strain.genus, strain.species);
    println!(
        "  - Category: {} | Nutritional type: {:?}",
        strain.category.label(),
        strain.nutritional_type
    );
    let requirements: Vec<String> = strain.key_requirements.iter().map(|r| r.to_string()).collect();
    println!("  - Key requirements: {}", requirements.join(", "));
    match pathways {
        PathwayLookup::Resolved { pathways } => println!(
            "  - Pathway data: {} ({} pathways)",
            pathways.organism_name,
            pathways.pathways.len()
        ),
        PathwayLookup::Unavailable { reason } => println!("  - Pathway data: unavailable ({})", reason),
    }
    println!("  - Catalog: {} peptones", engine.peptones().len());
    println!("----------------------------------------");

    for (title, blends) in [("Single Peptones", false), ("Blends", true)] {
        let section: Vec<&Recommendation> = recommendations
            .iter()
            .filter(|r| r.is_blend() == blends)
            .collect();
        if section.is_empty() {
            continue;
        }
        println!("\n{}:", title);
        for (rank, rec) in section.iter().enumerate() {
            println!(
                "  {:>2}. {:<48} score {:.3}{}",
                rank + 1,
                rec.description(),
                rec.overall_score,
                if rec.subscores.is_low_confidence() { "  (low confidence)" } else { "" }
            );
            let parts: Vec<String> = ScoreComponent::ALL
                .iter()
                .map(|c| format!("{} {:.2}", c.key(), rec.subscores.get(*c)))
                .collect();
            println!("      {}", parts.join(" | "));
            if let Some(bonus) = rec.subscores.pathway_bonus {
                println!("      pathway_bonus {:.2}", bonus);
            }
            println!("      {}", rec.rationale);
        }
    }
    println!("========================================");
}
