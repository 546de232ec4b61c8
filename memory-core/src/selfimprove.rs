//! The closed-loop self-improvement controller:
//! EVAL -> ANALYZE -> RESEARCH -> IMPROVE -> RE-EVAL -> DECIDE.
//!
//! Each iteration measures scores across a configured level set,
//! classifies failures with [`crate::analyzer`], researches a
//! hypothesis/evidence/counter-argument chain for each failure, applies
//! the ones the research step approves, re-measures, and commits or
//! reverts based on regression and improvement thresholds. The IMPROVE
//! step in this implementation only ever produces a patch descriptor
//! (see [`Decision::Apply`]'s doc comment); it never mutates agent
//! source or prompt files.

use crate::analyzer::{self, ErrorAnalysis};
use crate::error::{Error, Result};
use crate::grader::Grader;
use crate::harness::{self, ProgressiveConfig, ProgressiveResult, QuestionGrade};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::info;

/// Whether the research step approved, rejected, or postponed a
/// proposed fix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    /// The IMPROVE step writes a JSON patch descriptor to
    /// `<iteration_dir>/patch_<mode>_<level>.json` and records its
    /// `proposed_change` text as applied; no code or prompt file is
    /// ever modified by this controller.
    Apply,
    Skip,
    Defer,
}

/// The hypothesis/evidence/counter-argument/decision chain for one
/// proposed fix.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchDecision {
    pub hypothesis: String,
    pub evidence: Vec<String>,
    pub counter_arguments: Vec<String>,
    pub decision: Decision,
    pub reasoning: String,
    pub failure_mode: String,
    pub affected_level: String,
    pub affected_component: String,
    pub proposed_change: String,
}

/// Configuration for one self-improvement run.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub max_iterations: u32,
    pub improvement_threshold: f64,
    pub regression_tolerance: f64,
    pub levels: Vec<String>,
    pub output_dir: PathBuf,
    pub agent_program: String,
    pub agent_name: String,
    pub score_threshold: f64,
    pub dry_run: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            max_iterations: 5,
            improvement_threshold: 2.0,
            regression_tolerance: 5.0,
            levels: vec!["L1", "L2", "L3", "L4", "L5", "L6"]
                .into_iter()
                .map(str::to_string)
                .collect(),
            output_dir: PathBuf::from("./eval_results/self_improve"),
            agent_program: String::new(),
            agent_name: "self-improve-agent".to_string(),
            score_threshold: 0.6,
            dry_run: false,
        }
    }
}

/// One iteration's full result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IterationResult {
    pub iteration: u32,
    pub baseline_scores: HashMap<String, f64>,
    pub post_scores: Option<HashMap<String, f64>>,
    pub analyses_count: usize,
    pub research_decisions_count: usize,
    pub applied_changes: Vec<String>,
    pub net_improvement: f64,
    pub max_regression: f64,
    pub committed: bool,
    pub reverted: bool,
    pub duration: Duration,
}

/// The full self-improvement run's result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerResult {
    pub iterations: Vec<IterationResult>,
    pub final_scores: HashMap<String, f64>,
    pub total_improvement: f64,
    pub total_duration: Duration,
}

fn extract_level_scores(result: &ProgressiveResult) -> HashMap<String, f64> {
    let mut scores: HashMap<String, f64> = result
        .level_results
        .iter()
        .map(|lr| {
            let score = lr.scores.as_ref().map_or(0.0, |s| s.average);
            (lr.level_id.clone(), if lr.success { score } else { 0.0 })
        })
        .collect();
    if !scores.is_empty() {
        let overall = scores.values().sum::<f64>() / scores.len() as f64;
        scores.insert("overall".to_string(), overall);
    }
    scores
}

fn extract_level_results_for_analyzer(result: &ProgressiveResult) -> Vec<(String, Vec<QuestionGrade>)> {
    result
        .level_results
        .iter()
        .filter(|lr| lr.success)
        .filter_map(|lr| lr.scores.as_ref().map(|s| (lr.level_id.clone(), s.details.clone())))
        .collect()
}

fn failure_mode_key(analysis: &ErrorAnalysis) -> String {
    serde_json::to_value(analysis.failure_mode)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_else(|| "unknown".to_string())
}

fn research_improvement(
    analysis: &ErrorAnalysis,
    all_analyses: &[ErrorAnalysis],
    baseline_scores: &HashMap<String, f64>,
) -> ResearchDecision {
    let failure_mode = failure_mode_key(analysis);

    let hypothesis = format!(
        "Improving {} will fix '{failure_mode}' failures in {}, raising score from {:.0}%.",
        analysis.affected_component,
        analysis.affected_level,
        analysis.score * 100.0
    );

    let mut evidence = Vec::new();
    let ev = &analysis.evidence;
    evidence.push(format!(
        "Q: '{}' -> Got: '{}' (expected: '{}')",
        truncate(&ev.question, 100),
        truncate(&ev.actual, 100),
        truncate(&ev.expected, 100)
    ));

    let same_mode_count = all_analyses
        .iter()
        .filter(|a| a.failure_mode == analysis.failure_mode)
        .count();
    if same_mode_count > 1 {
        evidence.push(format!(
            "Pattern: {same_mode_count} failures share mode '{failure_mode}'"
        ));
    }
    let level_score = baseline_scores.get(&analysis.affected_level).copied().unwrap_or(0.0);
    evidence.push(format!("Level {} baseline: {:.0}%", analysis.affected_level, level_score * 100.0));

    let mut counter_arguments = Vec::new();
    if let Some(template) = &analysis.prompt_template_id {
        counter_arguments.push(format!(
            "Changing prompt '{template}' may regress other levels that depend on the same template."
        ));
    }
    if analysis.affected_component.contains("::") {
        counter_arguments.push(format!(
            "Modifying '{}' is a code change that could break other components sharing the same function.",
            analysis.affected_component
        ));
    }
    if analysis.score >= 0.4 {
        counter_arguments.push(format!(
            "Score {:.0}% is borderline - could be LLM stochasticity rather than a systematic failure.",
            analysis.score * 100.0
        ));
    }
    let affected_levels: std::collections::HashSet<&str> = all_analyses
        .iter()
        .filter(|a| a.failure_mode == analysis.failure_mode)
        .map(|a| a.affected_level.as_str())
        .collect();
    if affected_levels.len() > 2 {
        counter_arguments.push(format!(
            "This failure mode affects {} levels - a single fix may not address all of them.",
            affected_levels.len()
        ));
    }

    let (decision, reasoning) = if analysis.prompt_template_id.is_some()
        && same_mode_count >= 2
        && analysis.score < 0.4
    {
        (
            Decision::Apply,
            format!(
                "Strong evidence: {same_mode_count} failures of type '{failure_mode}', low score ({:.0}%), and a targeted prompt template is available for safe modification.",
                analysis.score * 100.0
            ),
        )
    } else if analysis.prompt_template_id.is_some() && analysis.score < 0.3 {
        (
            Decision::Apply,
            format!(
                "Very low score ({:.0}%) with prompt template available. Risk is acceptable for prompt-level changes.",
                analysis.score * 100.0
            ),
        )
    } else if analysis.score < 0.2 {
        (
            Decision::Apply,
            format!(
                "Critical failure (score {:.0}%). Even without a prompt template, the component needs attention.",
                analysis.score * 100.0
            ),
        )
    } else if analysis.score >= 0.5 {
        (
            Decision::Skip,
            format!(
                "Score {:.0}% is above 50% - likely stochastic variation. Counter-arguments outweigh evidence for change.",
                analysis.score * 100.0
            ),
        )
    } else {
        (
            Decision::Defer,
            format!(
                "Insufficient evidence to justify change. Score {:.0}% is in the ambiguous range. Deferring to next iteration for more data.",
                analysis.score * 100.0
            ),
        )
    };

    let proposed_change = if let Some(template) = &analysis.prompt_template_id {
        format!(
            "Modify prompt template '{template}' to address '{failure_mode}' pattern in {}.",
            analysis.affected_component
        )
    } else {
        format!(
            "Investigate and fix {} to address '{failure_mode}' pattern.",
            analysis.affected_component
        )
    };

    ResearchDecision {
        hypothesis,
        evidence,
        counter_arguments,
        decision,
        reasoning,
        failure_mode,
        affected_level: analysis.affected_level.clone(),
        affected_component: analysis.affected_component.clone(),
        proposed_change,
    }
}

fn truncate(s: &str, n: usize) -> String {
    s.chars().take(n).collect()
}

async fn apply_prompt_improvement(
    analysis: &ErrorAnalysis,
    research: &ResearchDecision,
    iter_dir: &Path,
) -> Result<Option<String>> {
    if research.decision != Decision::Apply {
        return Ok(None);
    }
    let patch = serde_json::json!({
        "failure_mode": research.failure_mode,
        "affected_component": analysis.affected_component,
        "prompt_template": analysis.prompt_template_id,
        "proposed_change": research.proposed_change,
        "evidence_count": research.evidence.len(),
        "hypothesis": research.hypothesis,
    });
    let path = iter_dir.join(format!(
        "patch_{}_{}.json",
        research.failure_mode, research.affected_level
    ));
    let text = serde_json::to_string_pretty(&patch).map_err(Error::Serialization)?;
    tokio::fs::write(&path, text).await.map_err(Error::Io)?;
    Ok(Some(research.proposed_change.clone()))
}

fn compute_regression(baseline: &HashMap<String, f64>, post: &HashMap<String, f64>) -> (f64, f64) {
    let baseline_overall = baseline.get("overall").copied().unwrap_or(0.0);
    let post_overall = post.get("overall").copied().unwrap_or(0.0);
    let net_improvement = (post_overall - baseline_overall) * 100.0;

    let mut max_regression = 0.0;
    for (level_id, baseline_score) in baseline {
        if level_id == "overall" {
            continue;
        }
        if let Some(post_score) = post.get(level_id) {
            let regression = (baseline_score - post_score) * 100.0;
            if regression > max_regression {
                max_regression = regression;
            }
        }
    }
    (net_improvement, max_regression)
}

async fn write_json(path: &Path, value: &impl Serialize) -> Result<()> {
    let text = serde_json::to_string_pretty(value).map_err(Error::Serialization)?;
    tokio::fs::write(path, text).await.map_err(Error::Io)
}

/// Runs the complete self-improvement loop. Terminates early once a
/// round produces no failures, or once a round has failures but none
/// the research step decided to apply (and the run is not a dry run).
pub async fn run_self_improvement(config: &RunnerConfig, grader: &Grader) -> Result<RunnerResult> {
    tokio::fs::create_dir_all(&config.output_dir).await.map_err(Error::Io)?;

    let mut iterations = Vec::new();
    let start = Instant::now();

    for iteration in 1..=config.max_iterations {
        let iter_dir = config.output_dir.join(format!("iteration_{iteration}"));
        tokio::fs::create_dir_all(&iter_dir).await.map_err(Error::Io)?;
        let iter_start = Instant::now();

        info!(iteration, "EVAL: running progressive suite");
        let eval_config = ProgressiveConfig {
            output_dir: iter_dir.join("eval"),
            agent_program: config.agent_program.clone(),
            agent_name: format!("{}_iter{iteration}", config.agent_name),
            levels_to_run: Some(config.levels.clone()),
        };
        let eval_result = harness::run_progressive_suite(&eval_config, grader).await?;
        let baseline_scores = extract_level_scores(&eval_result);
        write_json(&iter_dir.join("baseline_scores.json"), &baseline_scores).await?;

        info!(iteration, "ANALYZE: classifying failures");
        let level_results = extract_level_results_for_analyzer(&eval_result);
        let analyses = analyzer::analyze_eval_results(&level_results, config.score_threshold);
        write_json(&iter_dir.join("analyses.json"), &analyses).await?;

        info!(iteration, "RESEARCH: investigating improvements");
        let research_decisions: Vec<ResearchDecision> = analyses
            .iter()
            .map(|a| research_improvement(a, &analyses, &baseline_scores))
            .collect();
        write_json(&iter_dir.join("research_decisions.json"), &research_decisions).await?;

        info!(iteration, "IMPROVE: applying approved fixes");
        let to_apply: Vec<&ResearchDecision> = research_decisions
            .iter()
            .filter(|r| r.decision == Decision::Apply)
            .collect();

        let mut applied_changes = Vec::new();
        if !to_apply.is_empty() && config.dry_run {
            for research in &to_apply {
                applied_changes.push(format!("[DRY RUN] {}", research.proposed_change));
            }
        } else if !config.dry_run {
            for research in &to_apply {
                let matching = analyses.iter().find(|a| {
                    failure_mode_key(a) == research.failure_mode
                        && a.affected_level == research.affected_level
                });
                if let Some(analysis) = matching {
                    if let Some(change) = apply_prompt_improvement(analysis, research, &iter_dir).await? {
                        applied_changes.push(change);
                    }
                }
            }
        }

        let (post_scores, mut net_improvement, mut max_regression) =
            if !applied_changes.is_empty() && !config.dry_run {
                info!(iteration, "RE-EVAL: measuring impact");
                let re_eval_config = ProgressiveConfig {
                    output_dir: iter_dir.join("re_eval"),
                    agent_program: config.agent_program.clone(),
                    agent_name: format!("{}_reeval{iteration}", config.agent_name),
                    levels_to_run: Some(config.levels.clone()),
                };
                let re_eval_result = harness::run_progressive_suite(&re_eval_config, grader).await?;
                let post_scores = extract_level_scores(&re_eval_result);
                write_json(&iter_dir.join("post_scores.json"), &post_scores).await?;
                (Some(post_scores), 0.0, 0.0)
            } else {
                (Some(baseline_scores.clone()), 0.0, 0.0)
            };

        let mut committed = false;
        let mut reverted = false;
        if !applied_changes.is_empty() && !config.dry_run {
            if let Some(post) = &post_scores {
                let (improvement, regression) = compute_regression(&baseline_scores, post);
                net_improvement = improvement;
                max_regression = regression;
                if max_regression > config.regression_tolerance {
                    reverted = true;
                } else if net_improvement >= config.improvement_threshold {
                    committed = true;
                } else {
                    committed = true;
                }
            }
        }

        let iter_result = IterationResult {
            iteration,
            baseline_scores,
            post_scores,
            analyses_count: analyses.len(),
            research_decisions_count: research_decisions.len(),
            applied_changes,
            net_improvement,
            max_regression,
            committed,
            reverted,
            duration: iter_start.elapsed(),
        };
        write_json(&iter_dir.join("iteration_result.json"), &iter_result).await?;

        let no_failures = analyses.is_empty();
        let no_applies = to_apply.is_empty();
        iterations.push(iter_result);

        if no_failures {
            info!(iteration, "no failures found, stopping");
            break;
        }
        if no_applies && !config.dry_run {
            info!(iteration, "no improvements deemed worth applying, stopping");
            break;
        }
    }

    let final_scores = iterations
        .last()
        .map(|it| it.post_scores.clone().unwrap_or_else(|| it.baseline_scores.clone()))
        .unwrap_or_default();

    let total_improvement = if iterations.len() >= 2 {
        let first_overall = iterations[0].baseline_scores.get("overall").copied().unwrap_or(0.0);
        let last_overall = final_scores.get("overall").copied().unwrap_or(0.0);
        (last_overall - first_overall) * 100.0
    } else {
        0.0
    };

    let result = RunnerResult {
        iterations,
        final_scores,
        total_improvement,
        total_duration: start.elapsed(),
    };
    write_json(&config.output_dir.join("self_improve_summary.json"), &result).await?;
    Ok(result)
}
