// ============================================================
// Layer 4 — Math Prompt Set
// ============================================================
// The fixed evaluation questions. Each one becomes a single
// user turn so the model's chat template can wrap it.
//
// Order is part of the contract: results are written in the
// same order, one per question.
//
//   1. average speed
//   2. percentage
//   3. rectangle area and perimeter
//   4. linear equation
//   5. fraction of a quantity, subtracted

use crate::domain::conversation::Conversation;

pub const MATH_QUESTIONS: [&str; 5] = [
    "Solve this step by step: If a train travels 120 miles in 2 hours, what is its average speed?",
    "Calculate: What is 15% of 240?",
    "A rectangle has length 8 cm and width 5 cm. What is its area and perimeter?",
    "If x + 5 = 12, what is the value of x?",
    "Sarah has 24 apples. She gives away 1/3 of them. How many apples does she have left?",
];

/// Wrap every question in a one-turn conversation
pub fn prepare_math_prompts() -> Vec<Conversation> {
    MATH_QUESTIONS
        .iter()
        .map(|q| Conversation::single_user_turn(*q))
        .collect()
}
