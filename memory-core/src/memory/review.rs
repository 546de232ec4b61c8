//! Quality gating applied to every store request before it reaches the
//! backend: triviality rejection, duplicate rejection, and a 1-10
//! quality score gate.

use super::coordinator::StorageRequest;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::LazyLock;

/// Content below this length, or matching a closed set of throwaway
/// phrases, is rejected before any scoring is attempted.
pub const TRIVIAL_MIN_LEN: usize = 10;

static TRIVIAL_PHRASES: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "hello", "hi", "thanks", "thank you", "ok", "okay", "yes", "no", "sure",
    ]
    .into_iter()
    .collect()
});

/// True if content is too short or an exact match against a closed set
/// of acknowledgement-only phrases (case- and whitespace-insensitive).
#[must_use]
pub fn is_trivial(content: &str) -> bool {
    let normalized = content.trim().to_lowercase();
    normalized.len() < TRIVIAL_MIN_LEN || TRIVIAL_PHRASES.contains(normalized.as_str())
}

/// A pluggable reviewer that scores a store request's content on a
/// 1-10 scale. Implementations may call out to an LLM; the in-process
/// default is purely heuristic.
#[async_trait]
pub trait QualityReviewer: Send + Sync {
    async fn score(&self, request: &StorageRequest) -> Result<f64>;
}

/// Scores content structure without any model call: a length-based
/// base score, adjusted for multi-line structure and actionable-content
/// markers. Used both as the default reviewer and as the fallback when
/// a configured reviewer produces fewer than two usable scores.
#[derive(Debug, Default)]
pub struct HeuristicReviewer;

const ACTIONABLE_MARKERS: [&str; 4] = ["step", "action", "result", "decision"];

impl HeuristicReviewer {
    #[must_use]
    pub fn heuristic_score(content: &str) -> f64 {
        let mut score = 5.0;
        if content.len() < TRIVIAL_MIN_LEN {
            score -= 2.0;
        }
        if content.len() > 1000 {
            score += 1.0;
        }
        if content.contains('\n') {
            score += 1.0;
        }
        let lower = content.to_lowercase();
        if ACTIONABLE_MARKERS.iter().any(|m| lower.contains(m)) {
            score += 1.0;
        }
        score.clamp(1.0, 10.0)
    }
}

#[async_trait]
impl QualityReviewer for HeuristicReviewer {
    async fn score(&self, request: &StorageRequest) -> Result<f64> {
        Ok(Self::heuristic_score(&request.content))
    }
}

/// Scores a request using only its structural shape, with no access to
/// content length thresholds beyond a coarse length bucket. Applied
/// when fewer than two of the three reviewer calls returned a usable
/// score.
#[must_use]
pub fn fallback_score(request: &StorageRequest) -> f64 {
    use crate::types::MemoryType;

    let mut score = 5.0;
    if request.content.len() > 200 {
        score += 2.0;
    } else if request.content.len() > 100 {
        score += 1.0;
    }
    if matches!(
        request.memory_type,
        MemoryType::Semantic | MemoryType::Procedural
    ) {
        score += 1.0;
    }
    score.min(10.0)
}

/// Runs the reviewer three times concurrently and returns the median
/// score, falling back to [`fallback_score`] when fewer than two calls
/// succeeded.
pub async fn review_quality(
    reviewer: &dyn QualityReviewer,
    request: &StorageRequest,
) -> f64 {
    let calls = (0..3).map(|_| reviewer.score(request));
    let mut scores: Vec<f64> = futures::future::join_all(calls)
        .await
        .into_iter()
        .filter_map(Result::ok)
        .collect();
    if scores.len() < 2 {
        return fallback_score(request);
    }
    scores.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    scores[scores.len() / 2]
}

/// The minimum median quality score a request must clear to be stored.
pub const QUALITY_THRESHOLD: f64 = 5.0;
