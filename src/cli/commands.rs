// ============================================================
// Layer 1 — CLI Arguments
// ============================================================
// Every knob of an inference run as a --flag. Running the binary
// with no flags reproduces the hardcoded configuration.
//
// clap's derive macros automatically generate:
//   - help text (--help)
//   - error messages for malformed values
//   - type conversion (string → usize, f64, u64)
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::Args;

use crate::application::inference_use_case::{
    InferenceConfig, DEFAULT_BASELINE_MODEL, DEFAULT_CHECKPOINT_PATH, DEFAULT_MAX_NEW_TOKENS,
};

/// All arguments for an inference run
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Local checkpoint directory (direct layout, or the parent
    /// of a `huggingface/` subdirectory)
    #[arg(long, default_value = DEFAULT_CHECKPOINT_PATH)]
    pub checkpoint: String,

    /// Hub model id used when --checkpoint does not exist
    #[arg(long, default_value = DEFAULT_BASELINE_MODEL)]
    pub baseline_model: String,

    /// Directory for inference_results.csv and inference_results.json
    #[arg(long, default_value = ".")]
    pub output_dir: String,

    /// Upper bound on generated tokens per prompt
    #[arg(long, default_value_t = DEFAULT_MAX_NEW_TOKENS)]
    pub max_new_tokens: usize,

    /// Softmax temperature; 0 switches to greedy decoding
    #[arg(long, default_value_t = 0.7)]
    pub temperature: f64,

    /// Nucleus sampling probability mass
    #[arg(long, default_value_t = 0.9)]
    pub top_p: f64,

    /// Prompts are truncated to this many tokens
    #[arg(long, default_value_t = 1024)]
    pub encode_max_length: usize,

    /// Weight precision: bf16, f16 or f32
    #[arg(long, default_value = "bf16")]
    pub precision: String,

    /// auto, cpu, cuda[:N] or metal[:N]
    #[arg(long, default_value = "auto")]
    pub device: String,

    /// Base sampling seed (random when omitted)
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Layer 1 → Layer 2 boundary; the application layer never sees clap types.
impl From<RunArgs> for InferenceConfig {
    fn from(a: RunArgs) -> Self {
        InferenceConfig {
            checkpoint_path:   a.checkpoint,
            baseline_model:    a.baseline_model,
            output_dir:        a.output_dir,
            max_new_tokens:    a.max_new_tokens,
            temperature:       a.temperature,
            top_p:             a.top_p,
            encode_max_length: a.encode_max_length,
            precision:         a.precision,
            device:            a.device,
            seed:              a.seed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;

    #[test]
    fn test_no_flags_matches_default_config() {
        let cli = Cli::try_parse_from(["math-infer"]).unwrap();
        let cfg: InferenceConfig = cli.args.into();
        let default = InferenceConfig::default();

        assert_eq!(cfg.checkpoint_path, default.checkpoint_path);
        assert_eq!(cfg.baseline_model, default.baseline_model);
        assert_eq!(cfg.output_dir, default.output_dir);
        assert_eq!(cfg.max_new_tokens, default.max_new_tokens);
        assert_eq!(cfg.temperature, default.temperature);
        assert_eq!(cfg.top_p, default.top_p);
        assert_eq!(cfg.encode_max_length, default.encode_max_length);
        assert_eq!(cfg.precision, default.precision);
        assert_eq!(cfg.device, default.device);
        assert_eq!(cfg.seed, None);
    }

    #[test]
    fn test_flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "math-infer",
            "--checkpoint", "/tmp/ckpt",
            "--max-new-tokens", "64",
            "--temperature", "0",
            "--device", "cpu",
            "--seed", "42",
        ])
        .unwrap();
        let cfg: InferenceConfig = cli.args.into();

        assert_eq!(cfg.checkpoint_path, "/tmp/ckpt");
        assert_eq!(cfg.max_new_tokens, 64);
        assert_eq!(cfg.temperature, 0.0);
        assert_eq!(cfg.device, "cpu");
        assert_eq!(cfg.seed, Some(42));
    }

    #[test]
    fn test_rejects_non_numeric_budget() {
        assert!(Cli::try_parse_from(["math-infer", "--max-new-tokens", "lots"]).is_err());
    }
}
