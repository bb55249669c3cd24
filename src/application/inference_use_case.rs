// ============================================================
// Layer 2 — InferenceUseCase
// ============================================================
// Orchestrates the full inference pipeline in order:
//
//   Step 1: Resolve the checkpoint reference   (Layer 6 - infra)
//   Step 2: Load tokenizer + model             (Layer 5 - ml)
//   Step 3: Prepare the math prompts           (Layer 4 - data)
//   Step 4: Generate one response per prompt   (Layer 5 - ml)
//   Step 5: Write CSV and JSON results         (Layer 6 - infra)
//
// A failure in any step ends the run. Nothing is written unless
// every prompt produced a response.
//
// Reference: Rust Book §13 (Iterators and Closures)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::data::prompts::prepare_math_prompts;
use crate::domain::{
    checkpoint::CheckpointRef,
    generation_result::GenerationResult,
    traits::LanguageModel,
};
use crate::infra::{checkpoint::resolve_checkpoint, results::ResultWriter};
use crate::ml::{
    candle_model::{CandleModel, LoadOptions},
    generator::{generate_responses, GenerationOptions},
    loader::load_model,
};

/// Where a training run leaves its converted actor checkpoint.
/// Replace `global_step_XXX` with the real step, or pass --checkpoint.
pub const DEFAULT_CHECKPOINT_PATH: &str =
    "/root/autodl-tmp/verl/outputs/global_step_XXX/actor/huggingface";

/// Public model used when the checkpoint path does not exist
pub const DEFAULT_BASELINE_MODEL: &str = "Qwen/Qwen2.5-0.5B-Instruct";

/// Token budget the pipeline passes to the driver. Deliberately
/// different from GenerationOptions::default() (512).
pub const DEFAULT_MAX_NEW_TOKENS: usize = 256;

// ─── Inference Configuration ─────────────────────────────────────────────────
// Everything a run needs. Default is the hardcoded configuration
// used when the binary is started without flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceConfig {
    pub checkpoint_path:   String,
    pub baseline_model:    String,
    pub output_dir:        String,
    pub max_new_tokens:    usize,
    pub temperature:       f64,
    pub top_p:             f64,
    pub encode_max_length: usize,
    pub precision:         String,
    pub device:            String,
    pub seed:              Option<u64>,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        let generation = GenerationOptions::default();
        Self {
            checkpoint_path:   DEFAULT_CHECKPOINT_PATH.to_string(),
            baseline_model:    DEFAULT_BASELINE_MODEL.to_string(),
            output_dir:        ".".to_string(),
            max_new_tokens:    DEFAULT_MAX_NEW_TOKENS,
            temperature:       generation.temperature,
            top_p:             generation.top_p,
            encode_max_length: generation.encode_max_length,
            precision:         "bf16".to_string(),
            device:            "auto".to_string(),
            seed:              None,
        }
    }
}

impl InferenceConfig {
    pub fn generation_options(&self) -> GenerationOptions {
        GenerationOptions {
            max_new_tokens:    self.max_new_tokens,
            temperature:       self.temperature,
            top_p:             self.top_p,
            encode_max_length: self.encode_max_length,
            seed:              self.seed,
        }
    }
}

// ─── RunListener ──────────────────────────────────────────────────────────────
/// Progress hooks for the presentation layer.
///
/// `on_generation_start` fires once the model is loaded, right
/// before the first prompt is sampled.
pub trait RunListener {
    fn on_generation_start(&mut self, _prompts: usize) {}
    fn on_result(&mut self, _result: &GenerationResult) {}
}

/// A listener that ignores every event
impl RunListener for () {}

/// What a finished run produced
#[derive(Debug)]
pub struct RunSummary {
    pub results:   Vec<GenerationResult>,
    pub csv_path:  PathBuf,
    pub json_path: PathBuf,
}

// ─── InferenceUseCase ─────────────────────────────────────────────────────────
pub struct InferenceUseCase {
    config: InferenceConfig,
}

impl InferenceUseCase {
    pub fn new(config: InferenceConfig) -> Self {
        Self { config }
    }

    /// Run the pipeline with the candle backend
    pub fn execute(&self, listener: &mut impl RunListener) -> Result<RunSummary> {
        // Bad precision/device strings are configuration errors,
        // not reasons to try the fallback layout
        let options = LoadOptions::parse(&self.config.precision, &self.config.device)?;
        self.execute_with(|r| CandleModel::load(r, &options), listener)
    }

    /// Run the pipeline with any model loader
    pub fn execute_with<M, F>(
        &self,
        load:     F,
        listener: &mut impl RunListener,
    ) -> Result<RunSummary>
    where
        M: LanguageModel,
        F: FnMut(&CheckpointRef) -> Result<M>,
    {
        let cfg = &self.config;
        tracing::debug!("Configuration: {}", serde_json::to_string(cfg)?);

        // ── Step 1: Resolve checkpoint ────────────────────────────────────────
        let reference = resolve_checkpoint(&cfg.checkpoint_path, &cfg.baseline_model);

        // ── Step 2: Load tokenizer + model ────────────────────────────────────
        let mut model = load_model(&reference, load)?;

        // ── Step 3: Prompts ───────────────────────────────────────────────────
        let prompts = prepare_math_prompts();

        // ── Step 4: Generate ──────────────────────────────────────────────────
        tracing::info!("Starting inference on {} prompts", prompts.len());
        listener.on_generation_start(prompts.len());
        let results = generate_responses(
            &mut model,
            &prompts,
            &cfg.generation_options(),
            |r| listener.on_result(r),
        )?;

        // ── Step 5: Save ──────────────────────────────────────────────────────
        let writer = ResultWriter::in_dir(&cfg.output_dir);
        writer.write(&results)?;

        Ok(RunSummary {
            results,
            csv_path:  writer.csv_path().to_path_buf(),
            json_path: writer.json_path().to_path_buf(),
        })
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::HarnessError;
    use crate::infra::results::{CSV_FILE, JSON_FILE};
    use crate::ml::fake::FakeModel;
    use std::fs;
    use tempfile::tempdir;

    /// Records events in arrival order
    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl RunListener for Recorder {
        fn on_generation_start(&mut self, prompts: usize) {
            self.events.push(format!("start {prompts}"));
        }
        fn on_result(&mut self, result: &GenerationResult) {
            self.events.push(format!("result {}", result.response));
        }
    }

    fn config(checkpoint: &str, output_dir: &str) -> InferenceConfig {
        InferenceConfig {
            checkpoint_path: checkpoint.to_string(),
            output_dir:      output_dir.to_string(),
            seed:            Some(7),
            ..Default::default()
        }
    }

    #[test]
    fn test_default_config_uses_call_site_budget() {
        let cfg = InferenceConfig::default();
        assert_eq!(cfg.max_new_tokens, 256);
        assert_eq!(cfg.generation_options().max_new_tokens, 256);
        assert_eq!(GenerationOptions::default().max_new_tokens, 512);
        assert_eq!(cfg.temperature, 0.7);
        assert_eq!(cfg.top_p, 0.9);
        assert_eq!(cfg.encode_max_length, 1024);
        assert_eq!(cfg.precision, "bf16");
        assert_eq!(cfg.device, "auto");
    }

    #[test]
    fn test_end_to_end_writes_five_records() {
        let ckpt = tempdir().unwrap();
        let out  = tempdir().unwrap();
        let use_case = InferenceUseCase::new(config(
            ckpt.path().to_str().unwrap(),
            out.path().to_str().unwrap(),
        ));

        let mut recorder = Recorder::default();
        let summary = use_case
            .execute_with(|_| Ok(FakeModel::new("the answer is 60 mph")), &mut recorder)
            .unwrap();

        assert_eq!(summary.results.len(), 5);
        assert_eq!(recorder.events.len(), 6);
        assert_eq!(recorder.events[0], "start 5");
        assert!(recorder.events[1..].iter().all(|e| e == "result the answer is 60 mph"));
        assert_eq!(summary.csv_path, out.path().join(CSV_FILE));

        let json = fs::read_to_string(out.path().join(JSON_FILE)).unwrap();
        let records: Vec<GenerationResult> = serde_json::from_str(&json).unwrap();
        assert_eq!(records, summary.results);
        for r in &records {
            assert!(!r.prompt.is_empty());
            assert_eq!(r.response, "the answer is 60 mph");
        }

        let csv = fs::read_to_string(out.path().join(CSV_FILE)).unwrap();
        assert_eq!(csv.lines().count(), 6);
    }

    #[test]
    fn test_unloadable_checkpoint_writes_nothing() {
        let ckpt = tempdir().unwrap();
        let out  = tempdir().unwrap();
        let use_case = InferenceUseCase::new(config(
            ckpt.path().to_str().unwrap(),
            out.path().to_str().unwrap(),
        ));

        let mut recorder = Recorder::default();
        let err = use_case
            .execute_with(
                |r| -> Result<FakeModel> { anyhow::bail!("no weights in {r}") },
                &mut recorder,
            )
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<HarnessError>(),
            Some(HarnessError::UnloadableCheckpoint { .. })
        ));
        // Nothing is announced when the model never loaded
        assert!(recorder.events.is_empty());
        assert!(!out.path().join(CSV_FILE).exists());
        assert!(!out.path().join(JSON_FILE).exists());
    }

    #[test]
    fn test_missing_checkpoint_loads_baseline() {
        let tmp = tempdir().unwrap();
        let missing = tmp.path().join("global_step_XXX");
        let use_case = InferenceUseCase::new(config(
            missing.to_str().unwrap(),
            tmp.path().to_str().unwrap(),
        ));

        let mut loaded = Vec::new();
        use_case
            .execute_with(
                |r| {
                    loaded.push(r.to_string());
                    Ok(FakeModel::new("ok"))
                },
                &mut (),
            )
            .unwrap();

        assert_eq!(loaded, vec![DEFAULT_BASELINE_MODEL.to_string()]);
    }

    #[test]
    fn test_generation_failure_writes_nothing() {
        let ckpt = tempdir().unwrap();
        let out  = tempdir().unwrap();
        let use_case = InferenceUseCase::new(config(
            ckpt.path().to_str().unwrap(),
            out.path().to_str().unwrap(),
        ));

        let err = use_case
            .execute_with(|_| Ok(FakeModel::new("ok").failing_on(4)), &mut ())
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<HarnessError>(),
            Some(HarnessError::GenerationFailure { index: 4, .. })
        ));
        assert!(!out.path().join(JSON_FILE).exists());
    }

    #[test]
    fn test_bad_precision_is_rejected_before_loading() {
        let cfg = InferenceConfig { precision: "int3".to_string(), ..Default::default() };
        let mut recorder = Recorder::default();
        assert!(InferenceUseCase::new(cfg).execute(&mut recorder).is_err());
        assert!(recorder.events.is_empty());
    }
}
