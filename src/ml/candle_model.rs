// ============================================================
// Layer 5 — CandleModel
// ============================================================
// The real LanguageModel: a TextCodec for the text side and a
// CausalLm for the weights, placed on one device.
//
// Sampling loop (one prompt):
//
//   tokens = prompt ids
//   repeat up to max_new_tokens:
//       feed the tokens not yet seen by the KV cache
//       logits → LogitsProcessor (temperature + top-p) → next id
//       append next id; stop if it is the eos id
//
// The first step feeds the whole prompt (prefill), every later
// step feeds a single token.

use anyhow::{bail, Result};
use candle_core::{DType, Device, Tensor};
use candle_transformers::generation::{LogitsProcessor, Sampling};

use crate::domain::{
    checkpoint::CheckpointRef,
    conversation::Conversation,
    traits::{EncodedPrompt, LanguageModel, SamplingParams},
};
use crate::infra::checkpoint::ModelFiles;
use crate::ml::{
    causal_lm::CausalLm,
    codec::TextCodec,
    device::{parse_precision, DevicePolicy},
};

/// Numeric and placement options for loading weights
#[derive(Debug, Clone, Copy)]
pub struct LoadOptions {
    pub dtype:  DType,
    pub device: DevicePolicy,
}

impl LoadOptions {
    /// Parse the configuration strings, e.g. ("bf16", "auto")
    pub fn parse(precision: &str, device: &str) -> Result<Self> {
        Ok(Self {
            dtype:  parse_precision(precision)?,
            device: device.parse()?,
        })
    }
}

pub struct CandleModel {
    codec:  TextCodec,
    lm:     CausalLm,
    device: Device,
    dtype:  DType,
}

impl CandleModel {
    /// Build tokenizer and model from one checkpoint layout.
    /// Any failure here makes the model loader try the next layout.
    pub fn load(reference: &CheckpointRef, options: &LoadOptions) -> Result<Self> {
        let files  = ModelFiles::locate(reference)?;
        let codec  = TextCodec::from_files(&files)?;
        let device = options.device.select()?;
        let lm     = CausalLm::load(&files, options.dtype, &device)?;
        Ok(Self::new(codec, lm, device, options.dtype))
    }

    pub fn new(codec: TextCodec, lm: CausalLm, device: Device, dtype: DType) -> Self {
        Self { codec, lm, device, dtype }
    }
}

fn logits_processor(params: &SamplingParams) -> LogitsProcessor {
    let sampling = if params.do_sample && params.temperature > 0.0 {
        Sampling::TopP { p: params.top_p, temperature: params.temperature }
    } else {
        Sampling::ArgMax
    };
    LogitsProcessor::from_sampling(params.seed, sampling)
}

impl LanguageModel for CandleModel {
    fn render_chat(&self, conversation: &Conversation) -> Result<String> {
        self.codec.render_chat(conversation)
    }

    fn encode(&self, text: &str, max_length: usize) -> Result<EncodedPrompt> {
        self.codec.encode(text, max_length)
    }

    // The candle models build their causal mask internally, so the
    // prompt must not contain padding.
    fn sample(&mut self, prompt: &EncodedPrompt, params: &SamplingParams) -> Result<Vec<u32>> {
        if prompt.input_ids.is_empty() {
            bail!("Cannot sample from an empty prompt");
        }
        if prompt.attention_mask.iter().any(|&m| m == 0) {
            bail!("Padded prompts are not supported");
        }
        tracing::debug!(
            "Sampling up to {} tokens (temperature {}, top_p {}, eos {:?}, pad {:?})",
            params.max_new_tokens,
            params.temperature,
            params.top_p,
            params.eos_token_id,
            params.pad_token_id
        );

        self.lm.reset(self.dtype, &self.device)?;
        let mut processor = logits_processor(params);
        let mut tokens    = prompt.input_ids.clone();
        let mut seen      = 0usize;

        for _ in 0..params.max_new_tokens {
            let input  = Tensor::new(&tokens[seen..], &self.device)?.unsqueeze(0)?;
            let logits = self.lm.forward(&input, seen)?;
            seen = tokens.len();

            let next = processor.sample(&logits)?;
            tokens.push(next);
            if Some(next) == params.eos_token_id {
                break;
            }
        }

        tracing::debug!(
            "Sampled {} new tokens",
            tokens.len() - prompt.input_len()
        );
        Ok(tokens)
    }

    fn decode(&self, ids: &[u32]) -> Result<String> {
        self.codec.decode(ids)
    }

    fn eos_token_id(&self) -> Option<u32> {
        self.codec.eos_token_id()
    }
}
