//! Configuration loader and path helpers.
//!
//! Uses Figment to merge `config.toml` + `config.<env>.toml` + `APP_*` env vars
//! (nested keys separated by `__`, e.g. `APP_DEPDOCS__MIN_CHUNK_SIZE`).
//! Provides helpers to expand `~` and `${VAR}` and to resolve relative paths
//! against a known base directory.

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::chunker::{ChunkingConfig, DEFAULT_MAX_CHUNK_SIZE, DEFAULT_MIN_CHUNK_SIZE};
use crate::Error;

pub const DEFAULT_EMBEDDING_MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";
pub const DEFAULT_CHUNKS_RETURNED: usize = 5;

/// The `[depdocs]` section consumed by the indexing and search pipelines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    #[serde(alias = "embeddingModel")]
    pub embedding_model: String,
    #[serde(alias = "minChunkSize")]
    pub min_chunk_size: usize,
    #[serde(alias = "maxChunkSize")]
    pub max_chunk_size: usize,
    #[serde(alias = "chunksReturned")]
    pub chunks_returned: usize,
    #[serde(alias = "modelsDir")]
    pub models_dir: String,
    #[serde(alias = "useFakeEmbeddings")]
    pub use_fake_embeddings: bool,
    #[serde(alias = "indexDir")]
    pub index_dir: String,
    #[serde(alias = "indexFile")]
    pub index_file: String,
    #[serde(alias = "replaceOnReindex")]
    pub replace_on_reindex: bool,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            min_chunk_size: DEFAULT_MIN_CHUNK_SIZE,
            max_chunk_size: DEFAULT_MAX_CHUNK_SIZE,
            chunks_returned: DEFAULT_CHUNKS_RETURNED,
            models_dir: "models".to_string(),
            use_fake_embeddings: false,
            index_dir: ".depdocs".to_string(),
            index_file: "embeddings.json".to_string(),
            replace_on_reindex: false,
        }
    }
}

impl CoreConfig {
    pub fn validate(&self) -> crate::Result<()> {
        if self.embedding_model.trim().is_empty() {
            return Err(Error::InvalidConfig("embedding_model must not be empty".into()));
        }
        if self.chunks_returned == 0 {
            return Err(Error::InvalidConfig("chunks_returned must be at least 1".into()));
        }
        if self.index_file.trim().is_empty() {
            return Err(Error::InvalidConfig("index_file must not be empty".into()));
        }
        self.chunking().map(|_| ())
    }

    pub fn chunking(&self) -> crate::Result<ChunkingConfig> {
        ChunkingConfig::new(self.min_chunk_size, self.max_chunk_size)
    }
}

pub struct Config {
    figment: Figment,
}

impl Config {
    /// Load from the current directory using `RUST_ENV` (default `dev`).
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
        Self::load_from(Path::new("."), &env_name)
    }

    pub fn load_from(base: &Path, env_name: &str) -> anyhow::Result<Self> {
        let mut figment = Figment::new().merge(Toml::file(base.join("config.toml")));
        match env_name {
            "dev" | "development" => figment = figment.merge(Toml::file(base.join("config.dev.toml"))),
            "prod" | "production" => figment = figment.merge(Toml::file(base.join("config.prod.toml"))),
            "test" | "testing" => figment = figment.merge(Toml::file(base.join("config.test.toml"))),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment };
        config.core()?;
        Ok(config)
    }

    pub fn from_figment(figment: Figment) -> Self { Self { figment } }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    /// The validated `[depdocs]` section; absent keys take their defaults.
    pub fn core(&self) -> anyhow::Result<CoreConfig> {
        let core: CoreConfig = if self.figment.contains("depdocs") {
            self.get("depdocs")?
        } else {
            CoreConfig::default()
        };
        core.validate()?;
        Ok(core)
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
