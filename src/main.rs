// src/main.rs

use clap::Parser;

use qdrant_merge::merge::CollectionMerger;
use qdrant_merge::store::qdrant::QdrantStore;

#[derive(Parser)]
#[command(name = "qdrant-merge")]
#[command(about = "Merge points from multiple Qdrant collections into one, skipping duplicates", long_about = None)]
struct Cli {
    /// Source collection to merge (repeat for multiple sources)
    #[arg(short, long = "source", required = true)]
    sources: Vec<String>,

    /// Target collection name
    #[arg(short, long)]
    target: String,

    /// Qdrant base URL (e.g. http://localhost:6334)
    #[arg(long, env = "QDRANT_URL", default_value = "http://localhost:6334")]
    url: String,

    /// Vector dimensionality used if the target has to be created; inferred
    /// from the first source collection when omitted
    #[arg(long)]
    vector_size: Option<u64>,

    /// Do not preload the target's existing ids; overlapping points are
    /// rewritten instead of skipped
    #[arg(long, default_value_t = false)]
    no_resume: bool,

    /// Enable debug logging
    #[arg(short, long, default_value_t = false)]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Set up logging before any async code runs
    if cli.debug {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .init();
    } else {
        tracing_subscriber::fmt().init();
    }

    let store = QdrantStore::connect(&cli.url)?;
    let merger = CollectionMerger::new(store);

    let report = merger
        .merge(&cli.sources, &cli.target, cli.vector_size, !cli.no_resume)
        .await?;

    let written: usize = report
        .sources
        .iter()
        .map(|(_, stats)| stats.processed - stats.skipped - stats.missing_vector)
        .sum();
    tracing::info!(
        "Merged {} source collections into {} ({} points written)",
        report.sources.len(),
        cli.target,
        written
    );

    Ok(())
}
