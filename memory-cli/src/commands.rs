//! Subcommand implementations. Each function takes already-loaded
//! [`Settings`](memory_core::settings::Settings) plus whatever CLI
//! overrides apply, and returns the library's own result type for the
//! caller to serialize.

use memory_core::agent::MemoryBackedAgent;
use memory_core::error::Result;
use memory_core::grader::{Grader, GraderConfig};
use memory_core::harness::{self, ProgressiveConfig, ProgressiveResult};
use memory_core::longhorizon::{self, EvalReport, GroundTruth};
use memory_core::matrix::{self, AgentEntry, MatrixConfig, MatrixReport};
use memory_core::selfimprove::{self, RunnerConfig, RunnerResult};
use memory_core::settings::Settings;
use std::path::PathBuf;

/// Runs the progressive L1-L12 suite (or `levels`, if given) and
/// returns the aggregated result.
pub async fn run_progressive(
    settings: &Settings,
    levels: Option<Vec<String>>,
    output_dir: PathBuf,
) -> Result<ProgressiveResult> {
    let grader_config = GraderConfig::from_env()?;
    let grader = Grader::new(grader_config)?;
    let config = ProgressiveConfig {
        output_dir,
        agent_program: settings.harness.agent_program.clone(),
        agent_name: settings.harness.agent_name.clone(),
        levels_to_run: levels,
    };
    harness::run_progressive_suite(&config, &grader).await
}

/// Runs the closed-loop self-improvement controller over `levels` (or
/// the settings-configured default set).
pub async fn run_self_improve(
    settings: &Settings,
    levels: Option<Vec<String>>,
    output_dir: PathBuf,
) -> Result<RunnerResult> {
    let grader_config = GraderConfig::from_env()?;
    let grader = Grader::new(grader_config)?;
    let config = RunnerConfig {
        max_iterations: settings.selfimprove.max_iterations,
        improvement_threshold: settings.selfimprove.improvement_threshold,
        regression_tolerance: settings.selfimprove.regression_tolerance,
        levels: levels.unwrap_or_else(|| {
            vec!["L1", "L2", "L3", "L4", "L5", "L6"]
                .into_iter()
                .map(str::to_string)
                .collect()
        }),
        output_dir,
        agent_program: settings.harness.agent_program.clone(),
        agent_name: settings.harness.agent_name.clone(),
        score_threshold: settings.selfimprove.score_threshold,
        dry_run: settings.selfimprove.dry_run,
    };
    selfimprove::run_self_improvement(&config, &grader).await
}

/// Runs the matrix evaluator over `num_agents` in-process
/// [`MemoryBackedAgent`] instances. This crate exposes only one
/// in-process [`Agent`](memory_core::agent::Agent) implementation, so
/// unlike a deployment with several real agent SDKs to compare, this
/// subcommand's value is stress-testing the matrix runner and the
/// shared long-horizon dialogue generation rather than ranking
/// distinct agent implementations.
pub async fn run_matrix_cmd(num_agents: usize, num_turns: usize, num_questions: usize, seed: u64) -> Result<MatrixReport> {
    let grader_config = GraderConfig::from_env()?;
    let agents = (1..=num_agents)
        .map(|i| {
            let name = format!("memory-agent-{i}");
            let session = name.clone();
            AgentEntry {
                name,
                factory: Box::new(move || Ok(Box::new(MemoryBackedAgent::new(session.clone())) as Box<dyn memory_core::agent::Agent>)),
            }
        })
        .collect();
    let config = MatrixConfig { num_turns, num_questions, seed };
    matrix::run_matrix(agents, &config, grader_config).await
}

/// Runs a single long-horizon learn-then-quiz pass against one
/// in-process [`MemoryBackedAgent`] and returns its ground truth and
/// report for the caller to persist as `ground_truth.json`/
/// `report.json`.
pub async fn run_long_horizon_cmd(
    num_turns: usize,
    num_questions: usize,
    seed: u64,
) -> Result<(GroundTruth, EvalReport)> {
    let grader_config = GraderConfig::from_env()?;
    let grader = Grader::new(grader_config)?;
    let agent = MemoryBackedAgent::new("long-horizon".to_string());
    longhorizon::run_long_horizon_eval(&agent, &grader, num_turns, num_questions, seed).await
}
