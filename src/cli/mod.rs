// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses flags with `clap` and prints progress to stdout.
// All work is delegated to Layer 2 (application).
//
// Output per prompt:
//
//   Q: <prompt>
//   A: <response>
//   --------------------------------------------------
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::RunArgs;

use crate::application::inference_use_case::{InferenceUseCase, RunListener};
use crate::domain::generation_result::GenerationResult;

#[derive(Parser, Debug)]
#[command(
    name = "math-infer",
    version,
    about = "Answer a fixed set of math prompts with a trained checkpoint and save the results."
)]
pub struct Cli {
    #[command(flatten)]
    pub args: RunArgs,
}

/// Prints the run transcript to stdout
struct ConsolePrinter;

impl RunListener for ConsolePrinter {
    fn on_generation_start(&mut self, _prompts: usize) {
        println!("Starting inference...");
    }

    fn on_result(&mut self, result: &GenerationResult) {
        println!("Q: {}", result.prompt);
        println!("A: {}", result.response);
        println!("{}", "-".repeat(50));
    }
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let use_case = InferenceUseCase::new(self.args.into());
        let summary  = use_case.execute(&mut ConsolePrinter)?;

        println!(
            "\nInference completed! Results saved to {} and {}",
            summary.csv_path.display(),
            summary.json_path.display()
        );
        println!("Generated {} responses", summary.results.len());
        Ok(())
    }
}
