//! Local feature-extraction embeddings: candle BERT encoder with masked mean
//! pooling and L2 normalization, a deterministic fake for tests, and the
//! lazily loaded [`ModelHandle`] the pipelines are given.

pub mod device;
pub mod fake;
pub mod handle;
pub mod model;
pub mod pool;
pub mod tokenize;

pub use fake::{FakeEmbedder, DEFAULT_FAKE_DIM};
pub use handle::ModelHandle;
pub use model::BertEmbedder;
pub use pool::masked_mean_l2;
