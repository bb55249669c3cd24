// ============================================================
// Layer 3 — Pipeline Errors
// ============================================================
// The three ways a run can fail. All of them are fatal: main()
// returns them as anyhow errors and the process exits non-zero.
//
// Lower layers keep using anyhow with .with_context(); the
// `reason` fields hold that formatted chain so the underlying
// cause is still visible in the final message.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HarnessError {
    /// Neither the checkpoint itself nor its `huggingface/`
    /// subdirectory produced a tokenizer + model pair
    #[error("cannot load model from '{path}'")]
    UnloadableCheckpoint { path: String },

    /// Rendering, encoding, sampling or decoding failed for one
    /// prompt; the whole batch is abandoned
    #[error("generation failed for prompt #{index} ({prompt:?}): {reason}")]
    GenerationFailure {
        index:  usize,
        prompt: String,
        reason: String,
    },

    /// An output file could not be serialised or written
    #[error("cannot write results to '{}': {reason}", path.display())]
    WriteError { path: PathBuf, reason: String },
}
