//! Shared plumbing for the `depdocs-index` and `depdocs-search` binaries.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::warn;
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

use depdocs_core::config::{Config, CoreConfig};
use depdocs_core::types::Document;

/// File extensions treated as documentation.
pub const DOC_EXTENSIONS: &[&str] = &["md", "mdx", "markdown", "txt", "rst"];

/// Log to stderr: `info` when verbose, `warn` otherwise. `RUST_LOG` wins when set.
pub fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "info" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Load `config.toml` (+ env overlay) from `dir`, defaulting to the project.
pub fn load_config(dir: &Path) -> Result<CoreConfig> {
    let env_name = std::env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
    Config::load_from(dir, &env_name)?.core()
}

pub fn is_doc_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| DOC_EXTENSIONS.iter().any(|d| d.eq_ignore_ascii_case(e)))
}

/// Read every documentation file under `root`, sorted by path. Paths are
/// root-relative with `/` separators; unreadable files are skipped.
pub fn collect_documents(root: &Path) -> Result<Vec<Document>> {
    if !root.is_dir() {
        anyhow::bail!("docs directory not found: {}", root.display());
    }
    let mut docs = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() || !is_doc_file(entry.path()) {
            continue;
        }
        let rel = relative_path(root, entry.path())?;
        match std::fs::read_to_string(entry.path()) {
            Ok(content) => docs.push(Document::new(rel, content)),
            Err(e) => warn!(file = %entry.path().display(), error = %e, "skipping unreadable file"),
        }
    }
    Ok(docs)
}

fn relative_path(root: &Path, path: &Path) -> Result<String> {
    let rel: PathBuf = path
        .strip_prefix(root)
        .with_context(|| format!("{} is outside {}", path.display(), root.display()))?
        .to_path_buf();
    Ok(rel.components().map(|c| c.as_os_str().to_string_lossy()).collect::<Vec<_>>().join("/"))
}
