use anyhow::{Context, Result, anyhow};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use candle_core::{Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig, DTYPE};
use tokenizers::Tokenizer;
use tracing::{debug, info};

use depdocs_core::traits::Embedder;

use crate::device::select_device;
use crate::pool::masked_mean_l2;
use crate::tokenize::tokenize_on_device;

const DEFAULT_MAX_LEN: usize = 512;

/// Sentence-transformer style BERT encoder loaded from local files.
///
/// Expects `tokenizer.json`, `config.json` and either `model.safetensors` or
/// `pytorch_model.bin` inside the model directory.
pub struct BertEmbedder {
    id: String,
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    max_len: usize,
    dim: usize,
}

impl BertEmbedder {
    pub fn load(model_dir: &Path, model_name: &str) -> Result<Self> {
        let started = Instant::now();
        let device = select_device();
        info!(model = model_name, dir = %model_dir.display(), "loading embedding model");

        let tokenizer_path = model_dir.join("tokenizer.json");
        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow!("Failed to load tokenizer from {}: {}", tokenizer_path.display(), e))?;

        let config_path = model_dir.join("config.json");
        let raw_config = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;
        let config: BertConfig = serde_json::from_str(&raw_config)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;
        let meta: serde_json::Value = serde_json::from_str(&raw_config)?;
        let max_len = meta["max_position_embeddings"].as_u64().map_or(DEFAULT_MAX_LEN, |v| v as usize);
        let dim = meta["hidden_size"].as_u64().map(|v| v as usize).ok_or_else(|| anyhow!("config.json has no hidden_size"))?;

        let weights = load_weights(model_dir, &device)?;
        let vb = VarBuilder::from_tensors(weights, DTYPE, &device);
        let model = BertModel::load(vb, &config)?;
        info!(model = model_name, dim, elapsed_ms = started.elapsed().as_millis() as u64, "embedding model loaded");

        Ok(Self { id: format!("local:{model_name}:d{dim}"), model, tokenizer, device, max_len, dim })
    }

    pub fn dim(&self) -> usize { self.dim }

    pub fn max_len(&self) -> usize { self.max_len }

    fn embed_text(&self, text: &str) -> Result<Vec<f32>> {
        let start = Instant::now();
        let (input_ids, attention_mask) = tokenize_on_device(&self.tokenizer, text, self.max_len, &self.device)?;
        let token_type_ids = input_ids.zeros_like()?;
        let hidden = self.model.forward(&input_ids, &token_type_ids, Some(&attention_mask))?;
        let pooled = masked_mean_l2(&hidden, &attention_mask)?;
        let emb: Vec<f32> = pooled.to_device(&Device::Cpu)?.squeeze(0)?.to_vec1()?;
        if emb.len() != self.dim { return Err(anyhow!("model returned {} dims, expected {}", emb.len(), self.dim)); }
        debug!(elapsed_ms = start.elapsed().as_millis() as u64, chars = text.len(), "embedded text");
        Ok(emb)
    }
}

impl Embedder for BertEmbedder {
    fn model_id(&self) -> &str { &self.id }

    fn embed(&self, text: &str) -> depdocs_core::Result<Vec<f32>> {
        self.embed_text(text).map_err(|e| depdocs_core::Error::Embedding(format!("{e:#}")))
    }
}

fn load_weights(model_dir: &Path, device: &Device) -> Result<HashMap<String, Tensor>> {
    let safetensors: PathBuf = model_dir.join("model.safetensors");
    if safetensors.exists() {
        return candle_core::safetensors::load(&safetensors, device)
            .with_context(|| format!("Failed to load {}", safetensors.display()));
    }
    let pickle = model_dir.join("pytorch_model.bin");
    if pickle.exists() {
        let weights = candle_core::pickle::read_all(&pickle)
            .with_context(|| format!("Failed to load {}", pickle.display()))?;
        return Ok(weights.into_iter().collect());
    }
    Err(anyhow!("No model.safetensors or pytorch_model.bin in {}", model_dir.display()))
}
