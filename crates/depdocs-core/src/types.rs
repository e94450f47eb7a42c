//! Domain types shared by the chunker, store, ranker and pipelines.

use serde::{Deserialize, Serialize};

/// A raw documentation file handed over by the fetching layer.
///
/// - `path`: repository-relative path, used as a stable file identifier
/// - `filename`: bare file name
/// - `content`: full text of the file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub content: String,
    pub path: String,
    pub filename: String,
}

impl Document {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        let path = path.into();
        let filename = path.rsplit(['/', '\\']).next().unwrap_or(&path).to_string();
        Self { content: content.into(), path, filename }
    }
}

/// The dependency whose documentation is being indexed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyRef {
    pub name: String,
    pub repository_url: String,
}

impl DependencyRef {
    pub fn new(name: impl Into<String>, repository_url: impl Into<String>) -> Self {
        Self { name: name.into(), repository_url: repository_url.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordMetadata {
    #[serde(rename = "repository")]
    pub repository_url: String,
    #[serde(rename = "file")]
    pub file_path: String,
    #[serde(rename = "dependency")]
    pub dependency_name: String,
}

/// A persisted (chunk, embedding, metadata) triple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "chunk")]
    pub text: String,
    pub embedding: Vec<f32>,
    pub metadata: RecordMetadata,
}

impl Record {
    pub fn new(text: impl Into<String>, embedding: Vec<f32>, dependency: &DependencyRef, file_path: &str) -> Self {
        Self {
            text: text.into(),
            embedding,
            metadata: RecordMetadata {
                repository_url: dependency.repository_url.clone(),
                file_path: file_path.to_string(),
                dependency_name: dependency.name.clone(),
            },
        }
    }
}

/// One ranked match. Field names are the wire names of the search response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub text_chunk: String,
    pub source_repository: String,
    pub source_file: String,
    pub similarity_score: f32,
}

impl SearchResult {
    pub fn from_record(record: &Record, similarity_score: f32) -> Self {
        Self {
            text_chunk: record.text.clone(),
            source_repository: record.metadata.repository_url.clone(),
            source_file: record.metadata.file_path.clone(),
            similarity_score,
        }
    }
}
