// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// This layer orchestrates the other layers to accomplish one
// goal: answer the math prompts with a checkpoint and save the
// answers.
//
// Rules for this layer:
//   - No tensor or tokenizer code here
//   - No printing here (that's Layer 1)
//   - Only workflow coordination
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

// The load → generate → save workflow
pub mod inference_use_case;
