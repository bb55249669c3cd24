// ============================================================
// Layer 3 — GenerationResult Domain Type
// ============================================================
// One question/answer pair produced by the generation driver.
//
// Field order matters: both output files list `prompt` before
// `response`, and serde serialises fields in declaration order.

use serde::{Deserialize, Serialize};

/// The model's answer to one prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    /// The user question exactly as it appeared in the conversation
    pub prompt: String,

    /// The decoded completion with surrounding whitespace removed.
    /// May be empty when the model emits end-of-sequence at once.
    pub response: String,
}

impl GenerationResult {
    pub fn new(prompt: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            prompt:   prompt.into(),
            response: response.into(),
        }
    }
}
