//! Indexing and search orchestration.
//!
//! `IndexPipeline` turns a dependency's documents into stored records
//! (split, embed, append once per dependency). `SearchPipeline` embeds a
//! query, loads the project's records and ranks them. Both borrow their
//! collaborators; the caller owns the store and the model handle.

mod index;
mod search;

use tokio::runtime::{Handle, RuntimeFlavor};

pub use index::{DependencyDocs, DependencyOutcome, IndexPipeline, IndexReport};
pub use search::{SearchPipeline, SearchResponse};

/// Runs synchronous model work (loading, inference). On a multi-threaded
/// runtime the worker thread is handed over first so other tasks keep
/// running; elsewhere the closure just runs inline.
fn run_blocking<T>(f: impl FnOnce() -> T) -> T {
    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => tokio::task::block_in_place(f),
        _ => f(),
    }
}
