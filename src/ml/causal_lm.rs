// ============================================================
// Layer 5 — Causal Language Model (candle)
// ============================================================
// The pretrained decoder-only architectures come from
// candle-transformers; this file only picks one from
// config.json's `model_type` and loads the safetensors weights
// into it.
//
//   "qwen2" → qwen2::ModelForCausalLM   (Qwen2 / Qwen2.5)
//   "llama" → llama::Llama              (Llama 2/3, TinyLlama)
//
// Both keep a key/value cache between forward calls. reset()
// must be called before starting a new sequence.
//
// Reference: candle-transformers model zoo

use anyhow::{bail, Context, Result};
use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::{llama, qwen2};

use crate::infra::checkpoint::ModelFiles;

pub enum CausalLm {
    Qwen2(qwen2::ModelForCausalLM),
    Llama {
        model:  llama::Llama,
        config: llama::Config,
        cache:  llama::Cache,
    },
}

/// The architecture named by config.json, if this tool supports it
fn supported_model_type(config: &serde_json::Value) -> Result<String> {
    let model_type = config
        .get("model_type")
        .and_then(|v| v.as_str())
        .unwrap_or_default();
    if !matches!(model_type, "qwen2" | "llama") {
        bail!("Unsupported model_type '{model_type}' (expected qwen2 or llama)");
    }
    Ok(model_type.to_string())
}

impl CausalLm {
    pub fn load(files: &ModelFiles, dtype: DType, device: &Device) -> Result<Self> {
        let config = files.read_config()?;
        // Reject unknown architectures before mapping gigabytes of weights
        supported_model_type(&config)?;

        // SAFETY: the files are not modified while the model is alive
        let vb = unsafe { VarBuilder::from_mmaped_safetensors(&files.weights, dtype, device)? };
        let lm = Self::from_config(config, vb, dtype, device)?;

        tracing::info!("Built model ({:?}) on {:?}", dtype, device);
        Ok(lm)
    }

    /// Build the architecture named by `config` from any weight source
    pub fn from_config(
        config: serde_json::Value,
        vb:     VarBuilder<'_>,
        dtype:  DType,
        device: &Device,
    ) -> Result<Self> {
        let lm = match supported_model_type(&config)?.as_str() {
            "qwen2" => {
                let cfg: qwen2::Config = serde_json::from_value(config)
                    .context("Invalid qwen2 config.json")?;
                Self::Qwen2(qwen2::ModelForCausalLM::new(&cfg, vb)?)
            }
            _ => {
                let cfg: llama::LlamaConfig = serde_json::from_value(config)
                    .context("Invalid llama config.json")?;
                let config = cfg.into_config(false);
                let model  = llama::Llama::load(vb, &config)?;
                let cache  = llama::Cache::new(true, dtype, &config, device)?;
                Self::Llama { model, config, cache }
            }
        };
        Ok(lm)
    }

    /// Forget everything cached from the previous sequence
    pub fn reset(&mut self, dtype: DType, device: &Device) -> Result<()> {
        match self {
            Self::Qwen2(model) => model.clear_kv_cache(),
            Self::Llama { config, cache, .. } => {
                *cache = llama::Cache::new(true, dtype, config, device)?;
            }
        }
        Ok(())
    }

    /// Run `input_ids` (shape [1, seq]) starting at position `pos`
    /// and return the next-token logits as a 1-D f32 tensor
    pub fn forward(&mut self, input_ids: &Tensor, pos: usize) -> Result<Tensor> {
        let logits = match self {
            Self::Qwen2(model) => model.forward(input_ids, pos)?,
            Self::Llama { model, cache, .. } => model.forward(input_ids, pos, cache)?,
        };
        Ok(logits.flatten_all()?.to_dtype(DType::F32)?)
    }
}
