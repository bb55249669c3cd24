// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The generation driver never talks to candle or tokenizers
// directly. It sees a loaded model only through LanguageModel:
//
//   render_chat → encode → sample → decode
//
// The real implementation (ml::candle_model::CandleModel) wraps
// a multi-gigabyte checkpoint. Tests use ml::fake::FakeModel,
// which implements the same trait with a toy vocabulary.
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;

use crate::domain::conversation::Conversation;

// ─── EncodedPrompt ────────────────────────────────────────────────────────────
/// Token ids for one rendered prompt, still on the host.
///
/// Moving the ids to the accelerator is the model's job, so this
/// type carries no device information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPrompt {
    pub input_ids:      Vec<u32>,
    /// 1 for real tokens, 0 for padding
    pub attention_mask: Vec<u32>,
}

impl EncodedPrompt {
    /// Number of prompt tokens. Generated ids start at this index
    /// in the sequence returned by `LanguageModel::sample`.
    pub fn input_len(&self) -> usize {
        self.input_ids.len()
    }
}

// ─── SamplingParams ───────────────────────────────────────────────────────────
/// Parameters for one call to the model's sampling loop
#[derive(Debug, Clone, PartialEq)]
pub struct SamplingParams {
    /// Upper bound on newly generated tokens (prompt not counted)
    pub max_new_tokens: usize,
    /// Sample from the distribution; false means greedy argmax
    pub do_sample:      bool,
    pub temperature:    f64,
    /// Nucleus threshold in (0, 1]
    pub top_p:          f64,
    pub pad_token_id:   Option<u32>,
    /// Generation stops right after this token is emitted
    pub eos_token_id:   Option<u32>,
    pub seed:           u64,
}

// ─── LanguageModel ────────────────────────────────────────────────────────────
/// A loaded tokenizer + causal language model pair.
///
/// Implementations:
///   - CandleModel → safetensors checkpoint run with candle
///   - FakeModel   → deterministic stand-in for tests
pub trait LanguageModel {
    /// Render a conversation to model input text, ending with the
    /// marker that opens a new assistant turn
    fn render_chat(&self, conversation: &Conversation) -> Result<String>;

    /// Tokenise `text`, truncating to at most `max_length` tokens
    fn encode(&self, text: &str, max_length: usize) -> Result<EncodedPrompt>;

    /// Run autoregressive sampling.
    ///
    /// Returns the whole sequence: the prompt ids followed by the
    /// generated ids (including the end-of-sequence token if one
    /// was produced). Takes `&mut self` because the key/value
    /// cache lives inside the model; it is reset on every call.
    fn sample(&mut self, prompt: &EncodedPrompt, params: &SamplingParams) -> Result<Vec<u32>>;

    /// Decode ids to text with special/control tokens removed
    fn decode(&self, ids: &[u32]) -> Result<String>;

    /// The tokenizer's end-of-sequence id, if it defines one
    fn eos_token_id(&self) -> Option<u32>;
}
