//! depdocs-vector
//!
//! File-backed record store and exhaustive cosine-similarity ranking. See
//! `store` and `rank`.

pub mod rank;
pub mod store;

pub use rank::{cosine_similarity, ExhaustiveRanker};
pub use store::{Store, StoreStats};
