use std::path::Path;

use serde::Serialize;
use tracing::{debug, warn};

use depdocs_core::config::CoreConfig;
use depdocs_core::traits::{Embedder, Ranker};
use depdocs_core::types::SearchResult;
use depdocs_core::{Error, Result};
use depdocs_vector::{ExhaustiveRanker, Store};

use crate::run_blocking;

static EXHAUSTIVE: ExhaustiveRanker = ExhaustiveRanker;

/// Wire shape of a search: ranked results, or an empty list plus an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub struct SearchPipeline<'a> {
    store: &'a Store,
    embedder: &'a dyn Embedder,
    ranker: &'a dyn Ranker,
    top_k: usize,
}

impl<'a> SearchPipeline<'a> {
    pub fn new(store: &'a Store, embedder: &'a dyn Embedder, top_k: usize) -> Self {
        Self { store, embedder, ranker: &EXHAUSTIVE, top_k }
    }

    pub fn from_config(store: &'a Store, embedder: &'a dyn Embedder, config: &CoreConfig) -> Self {
        Self::new(store, embedder, config.chunks_returned)
    }

    pub fn with_ranker(mut self, ranker: &'a dyn Ranker) -> Self {
        self.ranker = ranker;
        self
    }

    pub fn top_k(&self) -> usize { self.top_k }

    /// Rank the project's chunks against `query`. A project that was never
    /// indexed yields an empty list.
    pub async fn search(&self, project: &Path, query: &str, repository_context: Option<&str>) -> Result<Vec<SearchResult>> {
        if query.trim().is_empty() {
            return Err(Error::InvalidInput("query must not be empty".into()));
        }
        // Never-indexed projects answer empty without loading a model.
        if !self.store.exists(project).await? {
            debug!(project = %project.display(), "no index for project");
            return Ok(Vec::new());
        }
        let query_embedding = run_blocking(|| self.embedder.embed(query))?;
        let records = self.store.load(project).await?;
        let results = self.ranker.rank(&query_embedding, &records, repository_context, self.top_k)?;
        debug!(project = %project.display(), candidates = records.len(), returned = results.len(), "search done");
        Ok(results)
    }

    /// Like [`search`](Self::search) but never fails: errors become an empty
    /// result list with a description.
    pub async fn respond(&self, project: &Path, query: &str, repository_context: Option<&str>) -> SearchResponse {
        match self.search(project, query, repository_context).await {
            Ok(results) => SearchResponse { results, error: None },
            Err(e) => {
                warn!(project = %project.display(), error = %e, "search failed");
                SearchResponse { results: Vec::new(), error: Some(e.to_string()) }
            }
        }
    }
}
