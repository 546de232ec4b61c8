//! Long-horizon memory stress testing: deterministic dialogue
//! generation, category-tagged quiz derivation, and the learn-then-quiz
//! evaluator that ties them to an [`crate::agent::Agent`].

pub mod dialogue;
pub mod evaluator;
pub mod quiz;

pub use dialogue::{Fact, GroundTruth, Turn, generate_dialogue};
pub use evaluator::{
    run_learning_phase, run_long_horizon_eval, run_quiz_and_grade, CategoryBreakdown, EvalReport,
    EvalResult,
};
pub use quiz::{Question, generate_questions};
