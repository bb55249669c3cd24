// ============================================================
// Layer 5 — ML / Model Layer (candle)
// ============================================================
// This layer contains ALL candle, tokenizers and minijinja code.
// No other layer imports those crates directly.
//
// What's in this layer:
//
//   chat_template.rs — Jinja2 chat templates (ChatML fallback)
//   codec.rs         — tokenizer + template + eos id
//   device.rs        — precision and device placement options
//   causal_lm.rs     — pretrained decoder-only models from
//                      candle-transformers (Qwen2, Llama)
//   candle_model.rs  — LanguageModel implementation and the
//                      autoregressive sampling loop
//   loader.rs        — direct layout, then huggingface/ layout
//   generator.rs     — one response per conversation
//
// Reference: candle documentation
//            HuggingFace tokenizers documentation

/// Chat template rendering
pub mod chat_template;

/// Tokenizer-side half of a loaded model
pub mod codec;

/// DType and Device selection
pub mod device;

/// candle-transformers model dispatch
pub mod causal_lm;

/// The LanguageModel backed by candle
pub mod candle_model;

/// Two-layout checkpoint loading
pub mod loader;

/// The generation driver
pub mod generator;

#[cfg(test)]
pub mod fake;
