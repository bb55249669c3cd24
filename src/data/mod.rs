// ============================================================
// Layer 4 — Data
// ============================================================
// Inputs to the generation run. There is no dataset on disk:
// the prompts are compiled into the binary so every run asks
// the same questions in the same order.

/// The five fixed math word problems
pub mod prompts;
