//! Section-aware splitting of documentation into bounded text chunks.
//!
//! Sizes are measured in characters. A document is first cut on Markdown
//! headers (`#` to `######` followed by a space); header lines are dropped.
//! Sections that fit are emitted whole, small ones are merged into the
//! previous chunk when they fit, and oversized sections are re-packed
//! paragraph by paragraph.

use std::sync::LazyLock;

use regex::Regex;

use crate::types::Document;
use crate::{Error, Result};

static HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#{1,6}[ \t]+\S.*$").expect("valid header regex"));
static PARAGRAPH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[ \t]*\n").expect("valid paragraph regex"));

pub const DEFAULT_MIN_CHUNK_SIZE: usize = 800;
pub const DEFAULT_MAX_CHUNK_SIZE: usize = 8000;

const SEPARATOR: &str = "\n\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkingConfig {
    pub min_size: usize,
    pub max_size: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self { min_size: DEFAULT_MIN_CHUNK_SIZE, max_size: DEFAULT_MAX_CHUNK_SIZE }
    }
}

impl ChunkingConfig {
    pub fn new(min_size: usize, max_size: usize) -> Result<Self> {
        if min_size >= max_size {
            return Err(Error::InvalidConfig(format!(
                "min chunk size ({min_size}) must be smaller than max chunk size ({max_size})"
            )));
        }
        Ok(Self { min_size, max_size })
    }
}

#[derive(Debug, Default, Clone)]
pub struct Chunker {
    config: ChunkingConfig,
}

impl Chunker {
    pub fn new(config: ChunkingConfig) -> Self { Self { config } }

    pub fn config(&self) -> ChunkingConfig { self.config }

    pub fn split_document(&self, document: &Document) -> Vec<String> {
        split(&document.content, self.config.min_size, self.config.max_size)
    }
}

fn char_len(s: &str) -> usize { s.chars().count() }

/// Split `content` into trimmed, non-empty chunks in document order.
///
/// Undersized trailing buffers produced while re-packing an oversized
/// section are dropped. A single paragraph longer than `max_size` is kept
/// whole rather than cut mid-paragraph.
pub fn split(content: &str, min_size: usize, max_size: usize) -> Vec<String> {
    let mut chunks: Vec<String> = Vec::new();

    for section in HEADER_RE.split(content) {
        let section = section.trim();
        if section.is_empty() { continue; }
        let len = char_len(section);

        if len <= max_size {
            if len >= min_size {
                chunks.push(section.to_string());
                continue;
            }
            match chunks.last_mut() {
                Some(prev) if char_len(prev) + char_len(SEPARATOR) + len <= max_size => {
                    prev.push_str(SEPARATOR);
                    prev.push_str(section);
                }
                _ => chunks.push(section.to_string()),
            }
        } else {
            pack_paragraphs(section, min_size, max_size, &mut chunks);
        }
    }

    chunks
}

fn pack_paragraphs(section: &str, min_size: usize, max_size: usize, out: &mut Vec<String>) {
    let mut buffer = String::new();
    let mut buffer_len = 0usize;

    for paragraph in PARAGRAPH_RE.split(section) {
        let paragraph = paragraph.trim();
        if paragraph.is_empty() { continue; }
        let para_len = char_len(paragraph);

        if buffer.is_empty() {
            buffer.push_str(paragraph);
            buffer_len = para_len;
            continue;
        }
        if buffer_len + char_len(SEPARATOR) + para_len > max_size {
            flush(&mut buffer, min_size, out);
            buffer.push_str(paragraph);
            buffer_len = para_len;
        } else {
            buffer.push_str(SEPARATOR);
            buffer.push_str(paragraph);
            buffer_len += char_len(SEPARATOR) + para_len;
        }
    }
    flush(&mut buffer, min_size, out);
}

fn flush(buffer: &mut String, min_size: usize, out: &mut Vec<String>) {
    if !buffer.is_empty() && char_len(buffer) >= min_size {
        out.push(std::mem::take(buffer));
    } else {
        buffer.clear();
    }
}
