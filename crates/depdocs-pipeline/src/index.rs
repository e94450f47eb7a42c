use std::path::Path;

use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{debug, info, warn};

use depdocs_core::chunker::Chunker;
use depdocs_core::config::CoreConfig;
use depdocs_core::traits::Embedder;
use depdocs_core::types::{DependencyRef, Document, Record};
use depdocs_core::{Error, Result};
use depdocs_vector::Store;

use crate::run_blocking;

/// One dependency and the documentation files fetched for it.
#[derive(Debug, Clone)]
pub struct DependencyDocs {
    pub dependency: DependencyRef,
    pub documents: Vec<Document>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DependencyOutcome {
    pub dependency: String,
    pub indexed_chunks: usize,
    /// Record count of the project store after the write.
    pub total_records: usize,
    pub failures: Vec<String>,
}

/// Summary of a multi-dependency run. `success` means at least one chunk
/// made it into the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IndexReport {
    pub indexed_chunks: usize,
    pub failures: Vec<String>,
    pub success: bool,
}

pub struct IndexPipeline<'a> {
    store: &'a Store,
    embedder: &'a dyn Embedder,
    chunker: Chunker,
    replace_on_reindex: bool,
    show_progress: bool,
}

impl<'a> IndexPipeline<'a> {
    pub fn new(store: &'a Store, embedder: &'a dyn Embedder, chunker: Chunker) -> Self {
        Self { store, embedder, chunker, replace_on_reindex: false, show_progress: false }
    }

    pub fn from_config(store: &'a Store, embedder: &'a dyn Embedder, config: &CoreConfig) -> Result<Self> {
        let chunker = Chunker::new(config.chunking()?);
        Ok(Self::new(store, embedder, chunker).replace_on_reindex(config.replace_on_reindex))
    }

    /// Purge the dependency's earlier records before writing the new ones.
    pub fn replace_on_reindex(mut self, replace: bool) -> Self {
        self.replace_on_reindex = replace;
        self
    }

    /// Draw a progress bar on stderr while embedding.
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Chunk, embed and store one dependency's documents.
    ///
    /// An embedding failure abandons the rest of that document and is
    /// recorded in the outcome; other documents still go through. All new
    /// records are written in one store update.
    pub async fn index_dependency(
        &self,
        project: &Path,
        dependency: &DependencyRef,
        documents: &[Document],
    ) -> Result<DependencyOutcome> {
        if documents.is_empty() {
            return Err(Error::InvalidInput(format!("no documents to index for '{}'", dependency.name)));
        }

        let chunked: Vec<(&Document, Vec<String>)> = documents
            .iter()
            .map(|doc| {
                let chunks: Vec<String> = self
                    .chunker
                    .split_document(doc)
                    .into_iter()
                    .filter(|c| !c.trim().is_empty())
                    .collect();
                (doc, chunks)
            })
            .collect();
        let total_chunks: usize = chunked.iter().map(|(_, c)| c.len()).sum();
        info!(dependency = %dependency.name, documents = documents.len(), chunks = total_chunks, "indexing dependency");

        let pb = self.progress_bar(total_chunks);
        let mut outcome = DependencyOutcome { dependency: dependency.name.clone(), ..Default::default() };
        let mut records = Vec::with_capacity(total_chunks);
        for (doc, chunks) in chunked {
            for (i, chunk) in chunks.iter().enumerate() {
                match run_blocking(|| self.embedder.embed(chunk)) {
                    Ok(embedding) => {
                        records.push(Record::new(chunk.as_str(), embedding, dependency, &doc.path));
                        pb.inc(1);
                    }
                    Err(e) => {
                        warn!(dependency = %dependency.name, file = %doc.path, chunk = i, error = %e, "skipping rest of document");
                        outcome.failures.push(format!("{}: {}: {e}", dependency.name, doc.path));
                        pb.inc((chunks.len() - i) as u64);
                        break;
                    }
                }
            }
        }
        pb.finish_and_clear();

        outcome.indexed_chunks = records.len();
        if records.is_empty() {
            debug!(dependency = %dependency.name, "nothing to write");
            outcome.total_records = self.store.load(project).await?.len();
            return Ok(outcome);
        }
        outcome.total_records = if self.replace_on_reindex {
            self.store.replace_dependency(project, &dependency.name, records).await?
        } else {
            self.store.append(project, records).await?
        };
        info!(
            dependency = %dependency.name,
            indexed = outcome.indexed_chunks,
            failed_documents = outcome.failures.len(),
            total = outcome.total_records,
            "dependency indexed"
        );
        Ok(outcome)
    }

    /// Index several dependencies; one failing dependency does not stop the others.
    pub async fn index_project(&self, project: &Path, dependencies: &[DependencyDocs]) -> IndexReport {
        let mut report = IndexReport::default();
        for dep in dependencies {
            match self.index_dependency(project, &dep.dependency, &dep.documents).await {
                Ok(outcome) => {
                    report.indexed_chunks += outcome.indexed_chunks;
                    report.failures.extend(outcome.failures);
                }
                Err(e) => {
                    warn!(dependency = %dep.dependency.name, error = %e, "dependency failed");
                    report.failures.push(format!("{}: {e}", dep.dependency.name));
                }
            }
        }
        report.success = report.indexed_chunks > 0;
        info!(chunks = report.indexed_chunks, failures = report.failures.len(), success = report.success, "project indexed");
        report
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(len as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} chunks ({percent}%)")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb
    }
}
