// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust types and traits that describe what the harness
// works with. Nothing in here touches candle, tokenizers or
// the filesystem beyond path manipulation.
//
// Rules for this layer:
//   - NO candle or tokenizers types
//   - NO file I/O or network calls
//   - Only plain structs, enums and traits
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

/// Chat turns and conversations
pub mod conversation;

/// One prompt/response pair
pub mod generation_result;

/// Local path or hub id naming a checkpoint
pub mod checkpoint;

/// The fatal error taxonomy of a run
pub mod error;

/// LanguageModel and the values passed through it
pub mod traits;
