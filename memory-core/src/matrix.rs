//! Cross-agent matrix runner: evaluates several agent implementations
//! against one shared, generated long-horizon dialogue so their scores
//! are directly comparable. Markdown report rendering is explicitly out
//! of scope; this module produces the underlying ranked data only.

use crate::agent::Agent;
use crate::error::Result;
use crate::grader::{Grader, GraderConfig};
use crate::longhorizon::{self, EvalReport, GroundTruth, Question};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// One entry in the matrix: a name plus a way to construct the agent
/// under test. The factory is retried at most once; a failure marks
/// the agent `skipped` and the runner continues with the rest.
pub struct AgentEntry {
    pub name: String,
    pub factory: Box<dyn Fn() -> Result<Box<dyn Agent>> + Send + Sync>,
}

/// Matrix-run configuration.
#[derive(Debug, Clone)]
pub struct MatrixConfig {
    pub num_turns: usize,
    pub num_questions: usize,
    pub seed: u64,
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self {
            num_turns: 500,
            num_questions: 50,
            seed: 42,
        }
    }
}

/// The outcome for one agent in the matrix.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatrixResult {
    pub agent_name: String,
    pub status: AgentStatus,
    pub report: Option<EvalReport>,
    pub error_message: Option<String>,
    pub instantiation_time: Duration,
    pub learning_time: Duration,
}

/// Whether an agent completed, was skipped at construction time, or
/// errored mid-evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    Success,
    Skipped,
    Error,
}

/// Best-performing agent for one category, by mean score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryLeader {
    pub category: String,
    pub agent_name: String,
    pub mean_score: f64,
}

/// The full matrix report: every agent's result, ranked by overall
/// score descending (ties broken by lower learning time), plus the
/// per-category leaders among agents that succeeded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatrixReport {
    pub num_turns: usize,
    pub num_questions: usize,
    pub seed: u64,
    pub results: Vec<MatrixResult>,
    pub ranking: Vec<String>,
    pub category_leaders: Vec<CategoryLeader>,
    pub total_duration: Duration,
}

async fn evaluate_one(
    agent: &dyn Agent,
    grader: &Grader,
    gt: &GroundTruth,
    questions: &[Question],
) -> Result<(Duration, EvalReport)> {
    let learning_time = longhorizon::run_learning_phase(agent, gt).await;
    let mut report = longhorizon::run_quiz_and_grade(agent, grader, gt, questions).await?;
    report.learning_duration = learning_time;
    Ok((learning_time, report))
}

fn rank_results(results: &[MatrixResult]) -> Vec<String> {
    let mut ranked: Vec<&MatrixResult> = results
        .iter()
        .filter(|r| r.status == AgentStatus::Success && r.report.is_some())
        .collect();
    ranked.sort_by(|a, b| {
        let score_a = a.report.as_ref().map_or(0.0, |r| r.overall_score);
        let score_b = b.report.as_ref().map_or(0.0, |r| r.overall_score);
        score_b
            .partial_cmp(&score_a)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.learning_time.cmp(&b.learning_time))
    });
    ranked.into_iter().map(|r| r.agent_name.clone()).collect()
}

fn category_leaders(results: &[MatrixResult]) -> Vec<CategoryLeader> {
    let mut categories: std::collections::BTreeSet<String> = std::collections::BTreeSet::new();
    for result in results {
        if let Some(report) = &result.report {
            categories.extend(report.category_breakdowns.keys().cloned());
        }
    }

    categories
        .into_iter()
        .filter_map(|category| {
            results
                .iter()
                .filter_map(|r| {
                    let report = r.report.as_ref()?;
                    let breakdown = report.category_breakdowns.get(&category)?;
                    Some((r.agent_name.clone(), breakdown.mean))
                })
                .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
                .map(|(agent_name, mean_score)| CategoryLeader {
                    category: category.clone(),
                    agent_name,
                    mean_score,
                })
        })
        .collect()
}

/// Runs the full matrix: generates the dialogue and questions once,
/// then evaluates each entry in `agents` sequentially against that
/// shared data (sequential, not parallel, to avoid bursting any
/// vendor's rate limits). A failed factory call or mid-evaluation
/// error never aborts the remaining agents.
pub async fn run_matrix(
    agents: Vec<AgentEntry>,
    config: &MatrixConfig,
    grader_config: GraderConfig,
) -> Result<MatrixReport> {
    let start = Instant::now();
    let gt = longhorizon::generate_dialogue(config.num_turns, config.seed);
    let questions = longhorizon::generate_questions(&gt, config.num_questions);
    info!(turns = gt.turns.len(), questions = questions.len(), "matrix eval data generated once");

    let grader = Grader::new(grader_config)?;
    let mut results = Vec::with_capacity(agents.len());

    for entry in agents {
        info!(agent = %entry.name, "running matrix agent");
        let instantiation_start = Instant::now();
        let agent = match (entry.factory)() {
            Ok(agent) => agent,
            Err(err) => {
                warn!(agent = %entry.name, %err, "failed to instantiate agent, skipping");
                results.push(MatrixResult {
                    agent_name: entry.name,
                    status: AgentStatus::Skipped,
                    report: None,
                    error_message: Some(format!("Failed to create agent: {err}")),
                    instantiation_time: instantiation_start.elapsed(),
                    learning_time: Duration::ZERO,
                });
                continue;
            }
        };
        let instantiation_time = instantiation_start.elapsed();

        match evaluate_one(agent.as_ref(), &grader, &gt, &questions).await {
            Ok((learning_time, report)) => {
                results.push(MatrixResult {
                    agent_name: entry.name,
                    status: AgentStatus::Success,
                    report: Some(report),
                    error_message: None,
                    instantiation_time,
                    learning_time,
                });
            }
            Err(err) => {
                warn!(agent = %entry.name, %err, "agent evaluation failed");
                results.push(MatrixResult {
                    agent_name: entry.name,
                    status: AgentStatus::Error,
                    report: None,
                    error_message: Some(err.to_string()),
                    instantiation_time,
                    learning_time: Duration::ZERO,
                });
            }
        }

        if let Err(err) = agent.close().await {
            warn!(%err, "agent close failed, continuing");
        }
    }

    let ranking = rank_results(&results);
    let category_leaders = category_leaders(&results);

    Ok(MatrixReport {
        num_turns: config.num_turns,
        num_questions: config.num_questions,
        seed: config.seed,
        results,
        ranking,
        category_leaders,
        total_duration: start.elapsed(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(name: &str, status: AgentStatus, score: Option<f64>, learning_time: Duration) -> MatrixResult {
        MatrixResult {
            agent_name: name.to_string(),
            status,
            report: score.map(|overall_score| EvalReport {
                results: vec![],
                category_breakdowns: std::collections::HashMap::new(),
                overall_score,
                total_facts_delivered: 0,
                memory_stats: std::collections::HashMap::new(),
                learning_duration: learning_time,
                questioning_duration: Duration::ZERO,
                grading_duration: Duration::ZERO,
            }),
            error_message: None,
            instantiation_time: Duration::ZERO,
            learning_time,
        }
    }

    #[test]
    fn ranking_orders_by_score_descending() {
        let results = vec![
            result("a", AgentStatus::Success, Some(0.4), Duration::ZERO),
            result("b", AgentStatus::Success, Some(0.9), Duration::ZERO),
            result("c", AgentStatus::Skipped, None, Duration::ZERO),
        ];
        assert_eq!(rank_results(&results), vec!["b".to_string(), "a".to_string()]);
    }

    #[test]
    fn ranking_breaks_ties_on_lower_learning_time() {
        let results = vec![
            result("slow", AgentStatus::Success, Some(0.7), Duration::from_secs(10)),
            result("fast", AgentStatus::Success, Some(0.7), Duration::from_secs(2)),
        ];
        assert_eq!(rank_results(&results), vec!["fast".to_string(), "slow".to_string()]);
    }

    #[test]
    fn skipped_and_errored_agents_excluded_from_ranking() {
        let results = vec![
            result("skipped", AgentStatus::Skipped, None, Duration::ZERO),
            result("errored", AgentStatus::Error, None, Duration::ZERO),
        ];
        assert!(rank_results(&results).is_empty());
    }
}
