//! LLM-based semantic grading of agent answers against expected
//! answers. Single responsibility: given a question/expected/actual
//! triple and a cognitive level, produce a 0.0-1.0 score and a short
//! rationale.

use crate::error::{Error, Result};
use crate::types::Dimension;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::LazyLock;
use std::time::Duration;

/// The outcome of grading one answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeResult {
    /// 0.0 (incorrect) to 1.0 (perfect match or semantically equivalent).
    pub score: f64,
    pub reasoning: String,
}

/// Configuration for the grader's LLM endpoint.
#[derive(Debug, Clone)]
pub struct GraderConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub max_retries: u32,
    pub timeout: Duration,
}

impl GraderConfig {
    /// Builds a config from the environment, matching the teacher's
    /// `{PREFIX}_API_KEY` / `{PREFIX}_MODEL` override convention.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GRADER_API_KEY").map_err(|_| {
            Error::Configuration(
                "GRADER_API_KEY environment variable is required for grading".to_string(),
            )
        })?;
        let model = std::env::var("GRADER_MODEL")
            .unwrap_or_else(|_| "claude-sonnet-4-5-20250929".to_string());
        let base_url = std::env::var("GRADER_BASE_URL")
            .unwrap_or_else(|_| "https://api.anthropic.com/v1/messages".to_string());
        Ok(Self {
            api_key,
            base_url,
            model,
            max_retries: 2,
            timeout: Duration::from_secs(30),
        })
    }
}

/// Grades one answer by calling the configured LLM endpoint and
/// extracting a `{"score": f, "reasoning": s}` object from its text
/// response.
pub struct Grader {
    config: GraderConfig,
    client: reqwest::Client,
}

impl Grader {
    pub fn new(config: GraderConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(Error::Transport)?;
        Ok(Self { config, client })
    }

    fn prompt(question: &str, expected: &str, actual: &str, level: &str) -> String {
        format!(
            "You are grading an AI agent's answer to a quiz question.\n\n\
             Cognitive Level: {level}\n\
             - L1 (Recall): Direct facts, must be factually accurate\n\
             - L2 (Multi-Source Synthesis): Combining information from multiple sources\n\
             - L3 (Temporal Reasoning): Understanding changes over time, computing differences\n\
             - L4 (Procedural Learning): Learning and applying step-by-step procedures\n\
             - L5 (Contradiction Handling): Detecting and reasoning about conflicting information\n\
             - L6 (Incremental Learning): Updating knowledge when new information arrives\n\n\
             Question: {question}\n\n\
             Expected Answer: {expected}\n\n\
             Agent's Answer: {actual}\n\n\
             Grade the agent's answer on a scale of 0.0 to 1.0:\n\
             - 1.0: Perfect match or semantically equivalent\n\
             - 0.8-0.9: Correct main points, minor differences\n\
             - 0.6-0.7: Partially correct, missing some details\n\
             - 0.4-0.5: Some relevant content, significant gaps\n\
             - 0.0-0.3: Incorrect or unrelated\n\n\
             Special considerations:\n\
             - L5 (Contradictions): Award full points if the agent acknowledges the contradiction, even if it is not resolved\n\
             - L6 (Updates): The agent must use the MOST RECENT information, not outdated data\n\
             - If the agent shows work, grade the FINAL CONCLUSION, not the opening line\n\n\
             Return ONLY a JSON object with this structure:\n\
             {{\"score\": 0.85, \"reasoning\": \"Brief explanation of grade\"}}"
        )
    }

    /// Grades one answer, retrying the request on transport failure or
    /// server error up to `config.max_retries` times.
    pub async fn grade(
        &self,
        question: &str,
        expected: &str,
        actual: &str,
        level: &str,
    ) -> Result<GradeResult> {
        let prompt = Self::prompt(question, expected, actual, level);
        let body = serde_json::json!({
            "model": self.config.model,
            "max_tokens": 500,
            "messages": [{"role": "user", "content": prompt}],
        });

        let mut last_error = None;
        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                let delay_ms = 200u64 * 2u64.pow(attempt - 1);
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }

            let response = match self
                .client
                .post(&self.config.base_url)
                .header("x-api-key", &self.config.api_key)
                .header("anthropic-version", "2023-06-01")
                .header("content-type", "application/json")
                .json(&body)
                .send()
                .await
            {
                Ok(resp) => resp,
                Err(err) => {
                    last_error = Some(Error::Transport(err));
                    continue;
                }
            };

            let status = response.status();
            if status.is_success() {
                let payload: Value = response.json().await.map_err(Error::Transport)?;
                let text = payload["content"][0]["text"]
                    .as_str()
                    .ok_or_else(|| Error::Grading("grader response missing content[0].text".into()))?;
                return parse_grade(text);
            }

            if status.as_u16() == 429 || status.is_server_error() {
                last_error = Some(Error::Grading(format!("retryable grader status {status}")));
                continue;
            }

            let error_text = response.text().await.unwrap_or_default();
            return Err(Error::Grading(format!("grader status {status}: {error_text}")));
        }

        Err(last_error.unwrap_or_else(|| Error::Grading("all grader retries failed".into())))
    }

    fn multi_prompt(question: &str, actual: &str, dimensions: &[Dimension]) -> String {
        let dim_names: Vec<&str> = dimensions.iter().map(dimension_key).collect();
        format!(
            "You are grading an AI agent's answer along multiple independent dimensions.\n\n\
             Question: {question}\n\n\
             Agent's Answer: {actual}\n\n\
             Score each of the following dimensions from 0.0 to 1.0, with a brief reasoning: {}\n\n\
             Return ONLY a JSON object of this shape:\n\
             {{\"scores\": {{\"<dimension>\": {{\"score\": 0.85, \"reasoning\": \"...\"}}, ...}}}}",
            dim_names.join(", ")
        )
    }

    /// Grades one answer along several independent dimensions in a
    /// single LLM call. A dimension the grader's JSON omits is recorded
    /// with score 0.0 and reasoning `"Not graded"` rather than failing
    /// the whole call.
    pub async fn grade_multi(
        &self,
        question: &str,
        actual: &str,
        dimensions: &[Dimension],
    ) -> Result<Vec<(Dimension, f64, String)>> {
        let prompt = Self::multi_prompt(question, actual, dimensions);
        let body = serde_json::json!({
            "model": self.config.model,
            "max_tokens": 800,
            "messages": [{"role": "user", "content": prompt}],
        });

        let response = self
            .client
            .post(&self.config.base_url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(Error::Transport)?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(Error::Grading(format!("grader status {status}: {error_text}")));
        }

        let payload: Value = response.json().await.map_err(Error::Transport)?;
        let text = payload["content"][0]["text"]
            .as_str()
            .ok_or_else(|| Error::Grading("grader response missing content[0].text".into()))?;

        let scores_obj = parse_multi_grade(text)?;
        Ok(dimensions
            .iter()
            .map(|dim| {
                let key = dimension_key(dim);
                scores_obj
                    .get(key)
                    .and_then(|entry| {
                        Some((
                            *dim,
                            entry.get("score")?.as_f64()?,
                            entry.get("reasoning")?.as_str()?.to_string(),
                        ))
                    })
                    .unwrap_or((*dim, 0.0, "Not graded".to_string()))
            })
            .collect())
    }
}

fn dimension_key(dimension: &Dimension) -> &'static str {
    match dimension {
        Dimension::FactualAccuracy => "factual_accuracy",
        Dimension::Specificity => "specificity",
        Dimension::TemporalAwareness => "temporal_awareness",
        Dimension::SourceAttribution => "source_attribution",
        Dimension::ConfidenceCalibration => "confidence_calibration",
    }
}

/// Parses the multi-dimensional grader response body into its
/// `scores` object, using the same three-strategy pipeline as
/// [`parse_grade`].
fn parse_multi_grade(text: &str) -> Result<serde_json::Map<String, Value>> {
    let stripped = text.trim();

    let try_value = |value: Value| -> Option<serde_json::Map<String, Value>> {
        value.get("scores")?.as_object().cloned()
    };

    if let Ok(value) = serde_json::from_str::<Value>(stripped) {
        if let Some(scores) = try_value(value) {
            return Ok(scores);
        }
    }
    if let Some(captures) = FENCED_BLOCK.captures(stripped) {
        if let Ok(value) = serde_json::from_str::<Value>(captures[1].trim()) {
            if let Some(scores) = try_value(value) {
                return Ok(scores);
            }
        }
    }
    if let Some(found) = BRACE_BLOCK.find(stripped) {
        if let Ok(value) = serde_json::from_str::<Value>(found.as_str()) {
            if let Some(scores) = try_value(value) {
                return Ok(scores);
            }
        }
    }

    Err(Error::Parse(format!(
        "no valid multi-dimension grade JSON found in response: {}",
        &stripped[..stripped.len().min(200)]
    )))
}

static FENCED_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:json)?\s*\n?(.*?)\n?\s*```").expect("static regex is valid")
});
static BRACE_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("static regex is valid"));

/// Extracts a `{"score": ..., "reasoning": ...}` object from LLM
/// response text using three strategies in order: a raw JSON parse,
/// a fenced ```json code block, and the first balanced-looking
/// `{...}` substring. Each strategy is tried only if the previous one
/// failed to parse.
pub fn parse_grade(text: &str) -> Result<GradeResult> {
    let stripped = text.trim();

    if let Ok(value) = serde_json::from_str::<Value>(stripped) {
        if let Some(result) = grade_from_value(&value) {
            return Ok(result);
        }
    }

    if let Some(captures) = FENCED_BLOCK.captures(stripped) {
        if let Ok(value) = serde_json::from_str::<Value>(captures[1].trim()) {
            if let Some(result) = grade_from_value(&value) {
                return Ok(result);
            }
        }
    }

    if let Some(found) = BRACE_BLOCK.find(stripped) {
        if let Ok(value) = serde_json::from_str::<Value>(found.as_str()) {
            if let Some(result) = grade_from_value(&value) {
                return Ok(result);
            }
        }
    }

    Err(Error::Parse(format!(
        "no valid grade JSON found in response: {}",
        &stripped[..stripped.len().min(200)]
    )))
}

fn grade_from_value(value: &Value) -> Option<GradeResult> {
    Some(GradeResult {
        score: value.get("score")?.as_f64()?,
        reasoning: value.get("reasoning")?.as_str()?.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_raw_json() {
        let result = parse_grade(r#"{"score": 0.85, "reasoning": "close enough"}"#).unwrap();
        assert_eq!(result.score, 0.85);
    }

    #[test]
    fn parses_fenced_json_with_language_tag() {
        let text = "Here is my grade:\n```json\n{\"score\": 0.6, \"reasoning\": \"partial\"}\n```";
        let result = parse_grade(text).unwrap();
        assert_eq!(result.score, 0.6);
    }

    #[test]
    fn parses_fenced_json_without_language_tag() {
        let text = "```\n{\"score\": 1.0, \"reasoning\": \"perfect\"}\n```";
        let result = parse_grade(text).unwrap();
        assert_eq!(result.score, 1.0);
    }

    #[test]
    fn parses_first_brace_block_as_last_resort() {
        let text = "The grade is: {\"score\": 0.4, \"reasoning\": \"missing details\"} -- end";
        let result = parse_grade(text).unwrap();
        assert_eq!(result.score, 0.4);
    }

    #[test]
    fn returns_parse_error_when_nothing_matches() {
        assert!(parse_grade("no json here at all").is_err());
    }

    #[test]
    fn parses_multi_dimension_scores_object() {
        let text = r#"{"scores": {"factual_accuracy": {"score": 0.9, "reasoning": "correct"}}}"#;
        let scores = parse_multi_grade(text).unwrap();
        assert_eq!(scores["factual_accuracy"]["score"], 0.9);
    }

    #[test]
    fn dimension_key_round_trips_every_variant() {
        for dim in [
            Dimension::FactualAccuracy,
            Dimension::Specificity,
            Dimension::TemporalAwareness,
            Dimension::SourceAttribution,
            Dimension::ConfidenceCalibration,
        ] {
            assert!(!dimension_key(&dim).is_empty());
        }
    }
}
