//! The progressive evaluation harness: runs learning then testing as
//! subprocess-isolated phases for each selected level, grades the
//! answers, and aggregates per-level and overall scores.

use crate::catalog::{self};
use crate::error::{Error, Result};
use crate::grader::Grader;
use crate::subprocess::{self, Phase};
use crate::types::{ReasoningType, TestArticle, TestLevel};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Configuration for one progressive-harness run.
#[derive(Debug, Clone)]
pub struct ProgressiveConfig {
    pub output_dir: PathBuf,
    pub agent_program: String,
    pub agent_name: String,
    /// If `None`, runs the standard L1-L6 sequence.
    pub levels_to_run: Option<Vec<String>>,
}

/// One grade detail persisted in `<LEVEL>/scores.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionGrade {
    pub question: String,
    pub level: String,
    pub reasoning_type: ReasoningType,
    pub expected: String,
    pub actual: String,
    pub score: f64,
    pub reasoning: String,
}

/// A level's aggregated score plus per-question detail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelScores {
    pub average: f64,
    pub count: usize,
    pub details: Vec<QuestionGrade>,
}

/// The outcome of running one level: either a populated [`LevelScores`]
/// on success, or an error message on failure. A level failure never
/// aborts the whole run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelResult {
    pub level_id: String,
    pub level_name: String,
    pub success: bool,
    pub scores: Option<LevelScores>,
    pub error_message: Option<String>,
}

/// Overall aggregation across all levels that completed successfully.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverallScores {
    pub per_level: std::collections::HashMap<String, LevelScores>,
    pub overall: f64,
    pub levels_passed: usize,
    pub levels_total: usize,
    pub pass_rate: f64,
}

/// The full result of one progressive-harness run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressiveResult {
    pub success: bool,
    pub level_results: Vec<LevelResult>,
    pub overall_scores: Option<OverallScores>,
}

fn article_payload(article: &TestArticle) -> serde_json::Value {
    json!({
        "url": article.url,
        "title": article.title,
        "content": article.content,
        "published": article.published.to_rfc3339(),
        "metadata": article.metadata,
    })
}

async fn run_learning_phase(
    config: &ProgressiveConfig,
    articles: &[&TestArticle],
) -> Result<serde_json::Value> {
    let payload: Vec<_> = articles.iter().map(|a| article_payload(a)).collect();
    let input = json!({ "agent_name": config.agent_name, "articles": payload });
    subprocess::run_phase(&config.agent_program, &[], Phase::Learning, &input).await
}

async fn run_testing_phase(
    config: &ProgressiveConfig,
    level: &TestLevel,
) -> Result<serde_json::Value> {
    let payload: Vec<_> = level
        .questions
        .iter()
        .map(|q| json!({"question": q.question, "expected_answer": q.expected_answer, "level": q.level}))
        .collect();
    let input = json!({ "agent_name": config.agent_name, "questions": payload });
    subprocess::run_phase(&config.agent_program, &[], Phase::Testing, &input).await
}

fn answer_for_question<'a>(testing_result: &'a serde_json::Value, question: &str) -> &'a str {
    testing_result
        .get("answers")
        .and_then(|a| a.get(question))
        .and_then(|v| v.as_str())
        .unwrap_or("")
}

async fn write_json(path: &Path, value: &impl Serialize) -> Result<()> {
    let text = serde_json::to_string_pretty(value).map_err(Error::Serialization)?;
    tokio::fs::write(path, text).await.map_err(Error::Io)
}

/// Runs one level end to end: learning phase(s), testing phase,
/// grading, and `scores.json` persistence. A subprocess failure at any
/// stage produces a failed [`LevelResult`] rather than propagating.
pub async fn run_single_level(
    level: &TestLevel,
    config: &ProgressiveConfig,
    grader: &Grader,
    level_dir: &Path,
) -> Result<LevelResult> {
    tokio::fs::create_dir_all(level_dir).await.map_err(Error::Io)?;

    if level.requires_update_handling {
        let initial = level.initial_articles();
        match run_learning_phase(config, &initial).await {
            Ok(result) => write_json(&level_dir.join("learning_phase1.log"), &result).await?,
            Err(err) => {
                return Ok(failed_level(level, format!("Learning phase 1 failed: {err}")));
            }
        }
        let update = level.update_articles();
        if !update.is_empty() {
            match run_learning_phase(config, &update).await {
                Ok(result) => write_json(&level_dir.join("learning_phase2.log"), &result).await?,
                Err(err) => {
                    return Ok(failed_level(level, format!("Learning phase 2 failed: {err}")));
                }
            }
        }
    } else {
        let all: Vec<&TestArticle> = level.articles.iter().collect();
        match run_learning_phase(config, &all).await {
            Ok(result) => write_json(&level_dir.join("learning_phase.log"), &result).await?,
            Err(err) => {
                return Ok(failed_level(level, format!("Learning phase failed: {err}")));
            }
        }
    }

    let testing_result = match run_testing_phase(config, level).await {
        Ok(result) => {
            write_json(&level_dir.join("testing_phase.log"), &result).await?;
            result
        }
        Err(err) => return Ok(failed_level(level, format!("Testing phase failed: {err}"))),
    };

    let mut details = Vec::with_capacity(level.questions.len());
    for question in &level.questions {
        let actual = answer_for_question(&testing_result, &question.question).to_string();
        let grade = match grader
            .grade(&question.question, &question.expected_answer, &actual, &level.level_id)
            .await
        {
            Ok(result) => result,
            Err(err) => {
                warn!(%err, question = %question.question, "grading failed, recording 0.0");
                crate::grader::GradeResult {
                    score: 0.0,
                    reasoning: format!("grading error: {err}"),
                }
            }
        };
        details.push(QuestionGrade {
            question: question.question.clone(),
            level: level.level_id.clone(),
            reasoning_type: question.reasoning_type,
            expected: question.expected_answer.clone(),
            actual,
            score: grade.score,
            reasoning: grade.reasoning,
        });
    }

    let average = if details.is_empty() {
        0.0
    } else {
        details.iter().map(|d| d.score).sum::<f64>() / details.len() as f64
    };
    let scores = LevelScores {
        average,
        count: details.len(),
        details,
    };
    write_json(&level_dir.join("scores.json"), &scores).await?;

    Ok(LevelResult {
        level_id: level.level_id.clone(),
        level_name: level.level_name.clone(),
        success: true,
        scores: Some(scores),
        error_message: None,
    })
}

fn failed_level(level: &TestLevel, error_message: String) -> LevelResult {
    LevelResult {
        level_id: level.level_id.clone(),
        level_name: level.level_name.clone(),
        success: false,
        scores: None,
        error_message: Some(error_message),
    }
}

/// Runs the full progressive suite: every level in `config.levels_to_run`
/// (or the standard L1-L6 sequence if unset), in catalog order.
pub async fn run_progressive_suite(
    config: &ProgressiveConfig,
    grader: &Grader,
) -> Result<ProgressiveResult> {
    tokio::fs::create_dir_all(&config.output_dir)
        .await
        .map_err(Error::Io)?;

    let levels: Vec<TestLevel> = match &config.levels_to_run {
        Some(ids) => ids
            .iter()
            .filter_map(|id| catalog::get_level_by_id(id))
            .collect(),
        None => catalog::standard_levels(),
    };

    let mut level_results = Vec::with_capacity(levels.len());
    for level in &levels {
        info!(level_id = %level.level_id, "running level");
        let level_dir = config.output_dir.join(&level.level_id);
        let result = run_single_level(level, config, grader, &level_dir).await?;
        level_results.push(result);
    }

    let successful: Vec<&LevelResult> = level_results.iter().filter(|r| r.success).collect();
    let overall_scores = if successful.is_empty() {
        None
    } else {
        let per_level: std::collections::HashMap<String, LevelScores> = successful
            .iter()
            .map(|r| (r.level_id.clone(), r.scores.clone().expect("successful level has scores")))
            .collect();
        let overall = per_level.values().map(|s| s.average).sum::<f64>() / per_level.len() as f64;
        Some(OverallScores {
            levels_passed: successful.len(),
            levels_total: level_results.len(),
            pass_rate: successful.len() as f64 / level_results.len().max(1) as f64,
            overall,
            per_level,
        })
    };

    let result = ProgressiveResult {
        success: level_results.iter().all(|r| r.success),
        level_results,
        overall_scores,
    };
    write_json(&config.output_dir.join("summary.json"), &result).await?;
    Ok(result)
}
