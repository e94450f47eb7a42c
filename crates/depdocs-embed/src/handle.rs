//! Lazily loaded, caller-owned model handle.
//!
//! A handle is bound to one model name for its whole life. The model is
//! constructed on first use under a mutex, so concurrent first callers wait
//! for a single load and every later call reuses the same instance. A failed
//! load is not cached; the next call tries again.
//!
//! Loading and inference are synchronous and block the calling thread; async
//! callers should run them off the runtime's worker (the pipelines use
//! `block_in_place` on multi-threaded runtimes).

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::{info, warn};

use depdocs_core::config::{resolve_with_base, CoreConfig};
use depdocs_core::traits::Embedder;
use depdocs_core::{Error, Result};

use crate::fake::{FakeEmbedder, DEFAULT_FAKE_DIM};
use crate::model::BertEmbedder;

#[derive(Debug, Clone, PartialEq, Eq)]
enum ModelSource {
    Local { model_dir: PathBuf },
    Fake { dim: usize },
}

pub struct ModelHandle {
    model_name: String,
    source: ModelSource,
    loaded: Mutex<Option<Arc<dyn Embedder>>>,
}

impl ModelHandle {
    /// A handle for `<models_dir>/<model_name>` on local disk.
    pub fn local(models_dir: &Path, model_name: &str) -> Self {
        Self {
            model_name: model_name.to_string(),
            source: ModelSource::Local { model_dir: models_dir.join(model_name) },
            loaded: Mutex::new(None),
        }
    }

    pub fn fake(dim: usize) -> Self {
        let fake = FakeEmbedder::new(dim);
        Self {
            model_name: fake.model_id().to_string(),
            source: ModelSource::Fake { dim: fake.dim() },
            loaded: Mutex::new(None),
        }
    }

    /// Build from config. `models_dir` is resolved against `base`; the fake
    /// embedder is chosen by `use_fake_embeddings` or `APP_USE_FAKE_EMBEDDINGS=1`.
    pub fn from_config(config: &CoreConfig, base: &Path) -> Self {
        if config.use_fake_embeddings || fake_requested_by_env() {
            info!("using fake embeddings");
            return Self::fake(DEFAULT_FAKE_DIM);
        }
        Self::local(&resolve_with_base(base, &config.models_dir), &config.embedding_model)
    }

    pub fn model_name(&self) -> &str { &self.model_name }

    pub fn is_loaded(&self) -> bool {
        self.loaded.lock().map(|slot| slot.is_some()).unwrap_or(false)
    }

    /// The loaded model, constructing it on first use.
    pub fn get(&self) -> Result<Arc<dyn Embedder>> {
        let mut slot = self.loaded.lock().map_err(|_| Error::Embedding("model handle lock poisoned".into()))?;
        if let Some(model) = slot.as_ref() {
            return Ok(Arc::clone(model));
        }
        let model: Arc<dyn Embedder> = match &self.source {
            ModelSource::Fake { dim } => Arc::new(FakeEmbedder::new(*dim)),
            ModelSource::Local { model_dir } => {
                let bert = BertEmbedder::load(model_dir, &self.model_name).map_err(|e| {
                    warn!(model = %self.model_name, error = %format!("{e:#}"), "failed to load embedding model");
                    Error::Embedding(format!("failed to load model '{}': {e:#}", self.model_name))
                })?;
                Arc::new(bert)
            }
        };
        *slot = Some(Arc::clone(&model));
        Ok(model)
    }
}

impl Embedder for ModelHandle {
    fn model_id(&self) -> &str { &self.model_name }

    fn embed(&self, text: &str) -> Result<Vec<f32>> { self.get()?.embed(text) }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let model = self.get()?;
        texts.iter().map(|t| model.embed(t)).collect()
    }
}

fn fake_requested_by_env() -> bool {
    std::env::var("APP_USE_FAKE_EMBEDDINGS").ok().map(|v| v == "1" || v.eq_ignore_ascii_case("true")).unwrap_or(false)
}
