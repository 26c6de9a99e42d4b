use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod config;
mod export;
mod pathway_cache;
mod plotting;
mod request;
mod workflow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Single,
    Blend,
    All,
}

/// Recommends peptones and peptone blends for a microbial strain.
#[derive(Debug, Parser)]
#[command(name = "peptofit", version, about)]
pub struct Cli {
    /// Catalog directory holding `strains/`, `peptones/`, and an optional `settings.yaml`.
    #[arg(long, default_value = "./data")]
    pub data_dir: PathBuf,

    /// Strain id to recommend for. Required unless the request file names one.
    #[arg(long)]
    pub strain: Option<String>,

    #[arg(long, value_enum, default_value_t = ModeArg::All)]
    pub mode: ModeArg,

    #[arg(long)]
    pub max_components: Option<usize>,

    #[arg(long)]
    pub top_n: Option<usize>,

    /// Consider every manufacturer instead of preferred-source products only.
    #[arg(long)]
    pub all_sources: bool,

    /// Solve blend ratios with the global strategy.
    #[arg(long)]
    pub thorough: bool,

    /// Seed blends from complementary partners instead of the full shortlist.
    #[arg(long)]
    pub complementary: bool,

    /// YAML request file; its fields override the flags above. See `data/request.yaml` for a
    /// sample.
    #[arg(long)]
    pub request: Option<PathBuf>,

    /// Directory of cached pathway data, one `<genus>_<species>.yaml` per organism.
    #[arg(long)]
    pub pathway_cache: Option<PathBuf>,

    #[arg(long)]
    pub no_pathways: bool,

    #[arg(long, default_value = "./data/runs")]
    pub output_dir: PathBuf,

    #[arg(long)]
    pub no_plots: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let cli = Cli::parse();
    println!("--- Peptofit ---");

    let output_dir = workflow::run(&cli)?;

    println!("\nRecommendation run complete. Results are in '{}'", output_dir.display());
    Ok(())
}
