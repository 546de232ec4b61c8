//! Feeds a generated dialogue to an agent, quizzes it, grades the
//! answers on multiple dimensions, and reports per-category breakdowns.

use super::dialogue::{generate_dialogue, GroundTruth};
use super::quiz::{generate_questions, Question};
use crate::agent::Agent;
use crate::error::Result;
use crate::grader::Grader;
use crate::types::{Dimension, QuestionCategory};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// One graded question result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalResult {
    pub question_id: String,
    pub question_text: String,
    pub actual_answer: String,
    pub category: QuestionCategory,
    pub dimension_scores: Vec<(Dimension, f64, String)>,
    pub overall_score: f64,
}

/// Aggregated statistics for one question category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryBreakdown {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub count: usize,
    pub dimension_means: HashMap<String, f64>,
}

/// The full long-horizon evaluation report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalReport {
    pub results: Vec<EvalResult>,
    pub category_breakdowns: HashMap<String, CategoryBreakdown>,
    pub overall_score: f64,
    pub total_facts_delivered: usize,
    pub memory_stats: HashMap<String, String>,
    pub learning_duration: Duration,
    pub questioning_duration: Duration,
    pub grading_duration: Duration,
}

/// Phase 1: feeds every non-empty turn to `agent.learn`. A failed
/// individual learn call is logged and skipped; the phase still
/// completes over the remaining turns.
pub async fn run_learning_phase(agent: &dyn Agent, gt: &GroundTruth) -> Duration {
    let start = Instant::now();
    for turn in &gt.turns {
        if turn.content.is_empty() {
            continue;
        }
        if let Err(err) = agent.learn(&turn.content).await {
            warn!(turn_index = turn.index, %err, "learn call failed, skipping turn");
        }
        if turn.index > 0 && turn.index % 50 == 0 {
            tracing::info!(turn_index = turn.index, "long-horizon learning progress");
        }
    }
    start.elapsed()
}

/// Phase 2: issues every question to `agent.answer`, grades each with
/// the multi-dimensional grader over its required dimensions, and
/// builds the full report.
pub async fn run_quiz_and_grade(
    agent: &dyn Agent,
    grader: &Grader,
    gt: &GroundTruth,
    questions: &[Question],
) -> Result<EvalReport> {
    let questioning_start = Instant::now();
    let mut answers = Vec::with_capacity(questions.len());
    for question in questions {
        let answer = agent.answer(&question.text).await?;
        answers.push(answer.text);
    }
    let questioning_duration = questioning_start.elapsed();

    let grading_start = Instant::now();
    let mut results = Vec::with_capacity(questions.len());
    for (question, actual) in questions.iter().zip(answers.into_iter()) {
        let dimension_scores = grader
            .grade_multi(&question.text, &actual, &question.dimensions)
            .await?;
        let overall_score = if dimension_scores.is_empty() {
            0.0
        } else {
            dimension_scores.iter().map(|(_, score, _)| score).sum::<f64>()
                / dimension_scores.len() as f64
        };
        results.push(EvalResult {
            question_id: question.id.clone(),
            question_text: question.text.clone(),
            actual_answer: actual,
            category: question.category,
            dimension_scores,
            overall_score,
        });
    }
    let grading_duration = grading_start.elapsed();

    let category_breakdowns = build_category_breakdowns(&results);
    let overall_score = if results.is_empty() {
        0.0
    } else {
        results.iter().map(|r| r.overall_score).sum::<f64>() / results.len() as f64
    };
    let total_facts_delivered = gt.turns.iter().map(|t| t.facts.len()).sum();
    let memory_stats = agent.get_memory_stats().await;

    Ok(EvalReport {
        results,
        category_breakdowns,
        overall_score,
        total_facts_delivered,
        memory_stats,
        learning_duration: Duration::ZERO,
        questioning_duration,
        grading_duration,
    })
}

/// Generates a dialogue and question set from `(num_turns, seed)`,
/// runs the full learn-then-quiz-and-grade pipeline against `agent`,
/// and returns both the ground truth and the report. This is the
/// single-agent counterpart to [`crate::matrix::run_matrix`]'s
/// per-agent evaluation, exposed standalone so a caller can persist
/// `ground_truth.json`/`report.json` without running a full matrix.
pub async fn run_long_horizon_eval(
    agent: &dyn Agent,
    grader: &Grader,
    num_turns: usize,
    num_questions: usize,
    seed: u64,
) -> Result<(GroundTruth, EvalReport)> {
    let gt = generate_dialogue(num_turns, seed);
    let questions = generate_questions(&gt, num_questions);
    info!(turns = gt.turns.len(), questions = questions.len(), "long-horizon eval data generated");

    let learning_duration = run_learning_phase(agent, &gt).await;
    let mut report = run_quiz_and_grade(agent, grader, &gt, &questions).await?;
    report.learning_duration = learning_duration;

    Ok((gt, report))
}

fn category_key(category: QuestionCategory) -> &'static str {
    match category {
        QuestionCategory::NeedleInHaystack => "needle_in_haystack",
        QuestionCategory::MetaMemory => "meta_memory",
        QuestionCategory::SourceAttribution => "source_attribution",
        QuestionCategory::TemporalEvolution => "temporal_evolution",
        QuestionCategory::CrossReference => "cross_reference",
        QuestionCategory::NumericalPrecision => "numerical_precision",
        QuestionCategory::DistractorResistance => "distractor_resistance",
    }
}

fn dimension_key(dimension: Dimension) -> &'static str {
    match dimension {
        Dimension::FactualAccuracy => "factual_accuracy",
        Dimension::Specificity => "specificity",
        Dimension::TemporalAwareness => "temporal_awareness",
        Dimension::SourceAttribution => "source_attribution",
        Dimension::ConfidenceCalibration => "confidence_calibration",
    }
}

fn build_category_breakdowns(results: &[EvalResult]) -> HashMap<String, CategoryBreakdown> {
    let mut by_category: HashMap<&'static str, Vec<&EvalResult>> = HashMap::new();
    for result in results {
        by_category.entry(category_key(result.category)).or_default().push(result);
    }

    by_category
        .into_iter()
        .map(|(key, group)| {
            let scores: Vec<f64> = group.iter().map(|r| r.overall_score).collect();
            let mean = scores.iter().sum::<f64>() / scores.len() as f64;
            let min = scores.iter().copied().fold(f64::INFINITY, f64::min);
            let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);

            let mut dimension_totals: HashMap<&'static str, (f64, usize)> = HashMap::new();
            for result in &group {
                for (dim, score, _) in &result.dimension_scores {
                    let entry = dimension_totals.entry(dimension_key(*dim)).or_insert((0.0, 0));
                    entry.0 += score;
                    entry.1 += 1;
                }
            }
            let dimension_means = dimension_totals
                .into_iter()
                .map(|(dim, (total, count))| (dim.to_string(), total / count as f64))
                .collect();

            (
                key.to_string(),
                CategoryBreakdown {
                    mean,
                    min,
                    max,
                    count: group.len(),
                    dimension_means,
                },
            )
        })
        .collect()
}
