// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Everything that touches the filesystem or the network:
//
//   checkpoint.rs      — Checkpoint resolver (configured path or
//                        baseline model id) and the file layout
//                        of one checkpoint directory.
//
//   hub.rs             — Fetches a hub model id into the local
//                        cache and returns the same file layout.
//
//   tokenizer_store.rs — Loads tokenizer.json and the parts of
//                        tokenizer_config.json we need (chat
//                        template, special tokens).
//
//   results.rs         — Writes the answers as CSV and JSON.
//
// Reference: Rust Book §7 (Modules)
//            Rust Book §9 (Error Handling with anyhow)

/// Checkpoint resolution and file discovery
pub mod checkpoint;

/// Model hub download
pub mod hub;

/// Tokenizer and tokenizer config loading
pub mod tokenizer_store;

/// CSV and JSON result files
pub mod results;
