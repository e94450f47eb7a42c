use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use depdocs_cli::{collect_documents, init_tracing, load_config};
use depdocs_core::types::DependencyRef;
use depdocs_embed::ModelHandle;
use depdocs_pipeline::{DependencyDocs, IndexPipeline};
use depdocs_vector::Store;

/// Index a dependency's documentation into a project's local store.
#[derive(Parser)]
#[command(name = "depdocs-index", version, about)]
struct Cli {
    /// Project directory that owns the index
    project: PathBuf,

    /// Directory holding the dependency's documentation files
    docs_dir: PathBuf,

    /// Dependency name recorded with every chunk
    #[arg(short, long)]
    dependency: String,

    /// Repository URL recorded with every chunk
    #[arg(short, long)]
    repository: String,

    /// Directory containing config.toml (default: the project directory)
    #[arg(long)]
    config_dir: Option<PathBuf>,

    /// Replace this dependency's earlier chunks instead of appending
    #[arg(long)]
    replace: bool,

    /// Show a progress bar
    #[arg(long)]
    progress: bool,

    /// Print the report as JSON
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

    let documents = collect_documents(&cli.docs_dir)?;
    let pipeline = IndexPipeline::from_config(&store, &handle, &config)?
        .replace_on_reindex(cli.replace || config.replace_on_reindex)
        .with_progress(cli.progress);
    let deps = [DependencyDocs { dependency: DependencyRef::new(cli.dependency, cli.repository), documents }];
    let report = pipeline.index_project(&cli.project, &deps).await;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Indexed {} chunks into {}", report.indexed_chunks, store.path_for(&cli.project).display());
        for failure in &report.failures {
            println!("  failed: {failure}");
        }
        let stats = store.stats(&cli.project).await?;
        println!("Store holds {} chunks (dim {})", stats.records, stats.dimension.unwrap_or_default());
        for (dependency, count) in &stats.dependencies {
            println!("  {dependency}: {count}");
        }
    }
    if !report.success {
        std::process::exit(1);
    }
    Ok(())
}
