use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use depdocs_cli::{init_tracing, load_config};
use depdocs_embed::ModelHandle;
use depdocs_pipeline::SearchPipeline;
use depdocs_vector::Store;

/// Search a project's indexed dependency documentation.
#[derive(Parser)]
#[command(name = "depdocs-search", version, about)]
struct Cli {
    /// Project directory that owns the index
    project: PathBuf,

    /// Search query
    query: String,

    /// Only return chunks whose repository URL or file path contains this
    #[arg(long)]
    repo: Option<String>,

    /// Maximum number of results (default: chunks_returned from config)
    #[arg(short = 'n', long)]
    limit: Option<usize>,

    /// Directory containing config.toml (default: the project directory)
    #[arg(long)]
    config_dir: Option<PathBuf>,

    /// Output the response as JSON
    #[arg(long)]
    json: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config_dir = cli.config_dir.clone().unwrap_or_else(|| cli.project.clone());
    let config = load_config(&config_dir)?;
    let handle = ModelHandle::from_config(&config, &config_dir);
    let store = Store::from_config(&config);
    let top_k = cli.limit.unwrap_or(config.chunks_returned);

    let pipeline = SearchPipeline::new(&store, &handle, top_k);
    let response = pipeline.respond(&cli.project, &cli.query, cli.repo.as_deref()).await;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else if let Some(error) = &response.error {
        eprintln!("Search failed: {error}");
    } else if response.results.is_empty() {
        println!("No results for '{}'", cli.query);
    } else {
        for (i, r) in response.results.iter().enumerate() {
            println!("{}. [{:.3}] {} ({})", i + 1, r.similarity_score, r.source_file, r.source_repository);
            println!("   {}", r.text_chunk.lines().next().unwrap_or_default());
        }
    }
    if response.error.is_some() {
        std::process::exit(1);
    }
    Ok(())
}
