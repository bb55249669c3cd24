// ============================================================
// Layer 5 — Text Codec
// ============================================================
// The text half of a loaded model: tokenizer + chat template +
// end-of-sequence id. Kept apart from the weights so it can be
// tested with a small word-level tokenizer.
use anyhow::{Context, Result};
use tokenizers::Tokenizer;

use crate::domain::{conversation::Conversation, traits::EncodedPrompt};
use crate::infra::{checkpoint::ModelFiles, tokenizer_store::TokenizerStore};
use crate::ml::chat_template::ChatTemplate;

pub struct TextCodec {
    tokenizer:    Tokenizer,
    template:     ChatTemplate,
    eos_token_id: Option<u32>,
}

impl TextCodec {
    /// Padding and truncation stored in tokenizer.json are cleared;
    /// encode() applies its own max_length instead.
    pub fn new(
        mut tokenizer: Tokenizer,
        template:      ChatTemplate,
        eos_token_id:  Option<u32>,
    ) -> Result<Self> {
        tokenizer.with_padding(None);
        tokenizer
            .with_truncation(None)
            .map_err(|e| anyhow::anyhow!("Cannot reset tokenizer truncation: {e}"))?;
        Ok(Self { tokenizer, template, eos_token_id })
    }

    pub fn from_files(files: &ModelFiles) -> Result<Self> {
        let store     = TokenizerStore::new(&files.tokenizer, files.tokenizer_config.clone());
        let tokenizer = store.load()?;
        let config    = store.load_config()?;
        let template  = ChatTemplate::from_config(&config)?;

        // The tokenizer's own eos token wins over the model config,
        // matching `tokenizer.eos_token_id`
        let eos_token_id = match config
            .eos_token
            .as_ref()
            .and_then(|t| tokenizer.token_to_id(t.content()))
        {
            Some(id) => Some(id),
            None     => files.configured_eos_token_id()?,
        };

        match eos_token_id {
            Some(id) => tracing::debug!("eos token id = {}", id),
            None     => tracing::warn!("Tokenizer defines no end-of-sequence token"),
        }

        Self::new(tokenizer, template, eos_token_id)
    }

    pub fn render_chat(&self, conversation: &Conversation) -> Result<String> {
        self.template.render(conversation, true)
    }

    /// Tokenise one prompt.
    ///
    /// Truncation keeps the first `max_length` tokens. A single
    /// sequence never needs padding, so the mask is all ones.
    pub fn encode(&self, text: &str, max_length: usize) -> Result<EncodedPrompt> {
        let enc = self.tokenizer
            .encode(text, true)
            .map_err(|e| anyhow::anyhow!("Tokenise: {e}"))?;

        let mut input_ids      = enc.get_ids().to_vec();
        let mut attention_mask = enc.get_attention_mask().to_vec();
        if input_ids.len() > max_length {
            tracing::warn!(
                "Prompt has {} tokens, truncating to {}",
                input_ids.len(),
                max_length
            );
            input_ids.truncate(max_length);
            attention_mask.truncate(max_length);
        }

        Ok(EncodedPrompt { input_ids, attention_mask })
    }

    /// Decode with special tokens skipped
    pub fn decode(&self, ids: &[u32]) -> Result<String> {
        self.tokenizer
            .decode(ids, true)
            .map_err(|e| anyhow::anyhow!("Decode: {e}"))
            .context("Cannot decode generated tokens")
    }

    pub fn eos_token_id(&self) -> Option<u32> {
        self.eos_token_id
    }
}
