//! The progressive, subprocess-isolated learning-then-testing pipeline.

pub mod progressive;

pub use progressive::{
    run_progressive_suite, run_single_level, LevelResult, LevelScores, OverallScores,
    ProgressiveConfig, ProgressiveResult, QuestionGrade,
};
