// ============================================================
// Layer 5 — Generation Driver
// ============================================================
// For each conversation, in order and one at a time:
//
//   render chat template (+ assistant prompt)
//     → encode, truncated to encode_max_length
//     → sample (temperature, top-p, eos stop)
//     → drop the prompt ids, decode without special tokens, trim
//     → GenerationResult { prompt, response }
//
// The first failure aborts the whole batch; no partial results
// are returned.

use anyhow::{Context, Result};

use crate::domain::{
    conversation::Conversation,
    error::HarnessError,
    generation_result::GenerationResult,
    traits::{LanguageModel, SamplingParams},
};

/// Sampling and encoding knobs.
///
/// `max_new_tokens` defaults to 512 here; the pipeline passes its
/// own budget (256) explicitly, see InferenceConfig.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOptions {
    pub max_new_tokens:    usize,
    pub temperature:       f64,
    pub top_p:             f64,
    /// Prompts longer than this many tokens are truncated
    pub encode_max_length: usize,
    /// Base seed; prompt `i` samples with `seed + i`.
    /// `None` draws a random base seed per run.
    pub seed:              Option<u64>,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            max_new_tokens:    512,
            temperature:       0.7,
            top_p:             0.9,
            encode_max_length: 1024,
            seed:              None,
        }
    }
}

/// Generate one response per conversation.
///
/// `on_result` sees each result as soon as it is produced.
pub fn generate_responses<M>(
    model:         &mut M,
    conversations: &[Conversation],
    options:       &GenerationOptions,
    mut on_result: impl FnMut(&GenerationResult),
) -> Result<Vec<GenerationResult>, HarnessError>
where
    M: LanguageModel + ?Sized,
{
    let base_seed = options.seed.unwrap_or_else(rand::random);
    let eos = model.eos_token_id();
    tracing::debug!("Sampling with base seed {}", base_seed);

    let mut results = Vec::with_capacity(conversations.len());

    for (index, conversation) in conversations.iter().enumerate() {
        let params = SamplingParams {
            max_new_tokens: options.max_new_tokens,
            do_sample:      true,
            temperature:    options.temperature,
            top_p:          options.top_p,
            pad_token_id:   eos,
            eos_token_id:   eos,
            seed:           base_seed.wrapping_add(index as u64),
        };

        let prompt = conversation.user_content();
        let response = generate_one(model, conversation, options.encode_max_length, &params)
            .map_err(|e| HarnessError::GenerationFailure {
                index,
                prompt: prompt.to_string(),
                reason: format!("{e:#}"),
            })?;

        let result = GenerationResult::new(prompt, response);
        on_result(&result);
        results.push(result);
    }

    Ok(results)
}

fn generate_one<M>(
    model:        &mut M,
    conversation: &Conversation,
    max_length:   usize,
    params:       &SamplingParams,
) -> Result<String>
where
    M: LanguageModel + ?Sized,
{
    let text = model.render_chat(conversation).context("Cannot render chat template")?;
    let encoded = model.encode(&text, max_length).context("Cannot encode prompt")?;
    let output = model.sample(&encoded, params).context("Sampling failed")?;

    // Keep only what the model added after the prompt
    let generated = output.get(encoded.input_len()..).unwrap_or(&[]);
    let response = model.decode(generated)?;

    tracing::debug!(
        "Prompt {} tokens, generated {} tokens",
        encoded.input_len(),
        generated.len()
    );
    Ok(response.trim().to_string())
}
