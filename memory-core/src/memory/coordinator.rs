//! The five-type memory coordinator: the single entry point through
//! which every store and retrieve request passes. Owns quality gating,
//! duplicate detection, token-budget-bounded relevance ranking, and
//! session isolation; delegates durability to a [`StorageBackend`].

use super::backend::{parse_or_now, BackendStats, MemoryQuery, StorageBackend};
use super::entry::MemoryEntry;
use super::review::{is_trivial, review_quality, HeuristicReviewer, QualityReviewer, QUALITY_THRESHOLD};
use crate::error::{Error, Result};
use crate::types::MemoryType;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// A request to store one piece of content as a memory of a given type.
#[derive(Debug, Clone)]
pub struct StorageRequest {
    pub content: String,
    pub memory_type: MemoryType,
    pub context: HashMap<String, String>,
    pub metadata: HashMap<String, String>,
}

/// A request to retrieve memories relevant to `query_text`, bounded by
/// a token budget rather than a result count.
#[derive(Debug, Clone)]
pub struct RetrievalQuery {
    pub query_text: String,
    pub token_budget: usize,
    pub memory_types: Option<Vec<MemoryType>>,
    pub time_range: Option<(DateTime<Utc>, DateTime<Utc>)>,
}

impl Default for RetrievalQuery {
    fn default() -> Self {
        Self {
            query_text: String::new(),
            token_budget: 8000,
            memory_types: None,
            time_range: None,
        }
    }
}

/// Running counters surfaced by [`MemoryCoordinator::statistics`].
#[derive(Debug, Clone, Default)]
pub struct CoordinatorStats {
    pub total_stored: u64,
    pub total_retrievals: u64,
    pub total_rejected: u64,
    pub total_memories: usize,
}

/// Coordinates storage and retrieval of the five memory types for one
/// session. Every operation is scoped to `session_id`; cross-session
/// access is an [`Error::IntegrityViolation`], not a silent no-op.
pub struct MemoryCoordinator {
    backend: Arc<dyn StorageBackend>,
    reviewer: Arc<dyn QualityReviewer>,
    session_id: String,
    stats: parking_lot::Mutex<CoordinatorStats>,
    last_retrieval_tokens: parking_lot::Mutex<usize>,
}

impl MemoryCoordinator {
    /// Creates a coordinator for a fresh or existing session. When
    /// `session_id` is `None`, a new id is minted as `session-{8 hex
    /// chars}`, matching the format callers rely on for log correlation.
    #[must_use]
    pub fn new(backend: Arc<dyn StorageBackend>, session_id: Option<String>) -> Self {
        Self::with_reviewer(backend, session_id, Arc::new(HeuristicReviewer))
    }

    #[must_use]
    pub fn with_reviewer(
        backend: Arc<dyn StorageBackend>,
        session_id: Option<String>,
        reviewer: Arc<dyn QualityReviewer>,
    ) -> Self {
        let session_id = session_id.unwrap_or_else(|| {
            format!("session-{}", &Uuid::new_v4().simple().to_string()[..8])
        });
        Self {
            backend,
            reviewer,
            session_id,
            stats: parking_lot::Mutex::new(CoordinatorStats::default()),
            last_retrieval_tokens: parking_lot::Mutex::new(0),
        }
    }

    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// The backing store, for tooling (evaluation, diagnostics) that
    /// needs direct access below the quality-gating and ranking layer.
    #[must_use]
    pub fn backend(&self) -> &Arc<dyn StorageBackend> {
        &self.backend
    }

    fn content_hash(content: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    async fn is_duplicate(&self, content: &str) -> Result<bool> {
        let hash = Self::content_hash(content);
        let Some(existing) = self
            .backend
            .find_by_fingerprint(&self.session_id, &hash)
            .await?
        else {
            return Ok(false);
        };
        let first_n = |s: &str, n: usize| s.chars().take(n).collect::<String>();
        let last_n = |s: &str, n: usize| {
            let chars: Vec<char> = s.chars().collect();
            chars[chars.len().saturating_sub(n)..].iter().collect::<String>()
        };
        let matches_length = existing.content.chars().count() == content.chars().count();
        let matches_prefix = first_n(&existing.content, 100) == first_n(content, 100);
        let matches_suffix = last_n(&existing.content, 100) == last_n(content, 100);
        Ok(matches_length && matches_prefix && matches_suffix && existing.content == content)
    }

    /// Applies triviality, duplicate, and quality filters; stores the
    /// request only if all three pass. Returns the stored entry's id
    /// on acceptance, or `None` when the content was rejected.
    pub async fn store(&self, request: StorageRequest) -> Result<Option<Uuid>> {
        if is_trivial(&request.content) {
            debug!("rejecting trivial memory content");
            self.stats.lock().total_rejected += 1;
            return Ok(None);
        }

        if self.is_duplicate(&request.content).await? {
            debug!("rejecting duplicate memory content");
            self.stats.lock().total_rejected += 1;
            return Ok(None);
        }

        let quality = review_quality(self.reviewer.as_ref(), &request).await;
        if quality < QUALITY_THRESHOLD {
            debug!(quality, "rejecting low-quality memory content");
            self.stats.lock().total_rejected += 1;
            return Ok(None);
        }

        let agent_id = request
            .context
            .get("agent_id")
            .cloned()
            .unwrap_or_else(|| "system".to_string());

        let mut metadata = request.metadata.clone();
        metadata.insert("content_hash".to_string(), Self::content_hash(&request.content));
        metadata.insert("importance_score".to_string(), quality.to_string());

        let created_at = parse_or_now(request.metadata.get("timestamp"));
        let id = Uuid::new_v4();
        let entry = MemoryEntry {
            id,
            session_id: self.session_id.clone(),
            agent_id,
            memory_type: request.memory_type,
            title: MemoryEntry::title_from_content(&request.content),
            content: request.content,
            metadata,
            importance: quality,
            created_at,
            accessed_at: Utc::now(),
        };
        self.backend.put(entry).await?;
        self.stats.lock().total_stored += 1;
        info!(%id, "stored memory");
        Ok(Some(id))
    }

    /// Retrieves memories relevant to `query.query_text`, greedily
    /// packed in descending relevance order until `query.token_budget`
    /// would be exceeded. Returns `[]` immediately for a non-positive
    /// budget without touching the backend.
    pub async fn retrieve(&self, query: RetrievalQuery) -> Result<Vec<MemoryEntry>> {
        if query.token_budget == 0 {
            return Ok(Vec::new());
        }

        let listing = self
            .backend
            .list(&MemoryQuery {
                session_id: self.session_id.clone(),
                limit: 100,
                memory_type: None,
            })
            .await?;

        let mut candidates: Vec<MemoryEntry> = listing
            .into_iter()
            .filter(|e| {
                query
                    .memory_types
                    .as_ref()
                    .is_none_or(|types| types.contains(&e.memory_type))
            })
            .filter(|e| {
                query
                    .time_range
                    .is_none_or(|(start, end)| e.accessed_at >= start && e.accessed_at <= end)
            })
            .collect();

        rank_by_relevance(&mut candidates, &query.query_text);

        let mut selected = Vec::new();
        let mut total_tokens = 0usize;
        for entry in candidates {
            let tokens = entry.estimated_tokens();
            if total_tokens + tokens > query.token_budget {
                break;
            }
            total_tokens += tokens;
            selected.push(entry);
        }

        *self.last_retrieval_tokens.lock() = total_tokens;
        self.stats.lock().total_retrievals += 1;
        Ok(selected)
    }

    /// The token total actually packed by the most recent [`Self::retrieve`] call.
    #[must_use]
    pub fn last_retrieval_tokens(&self) -> usize {
        *self.last_retrieval_tokens.lock()
    }

    /// Deletes every [`MemoryType::Working`] memory in this session.
    pub async fn clear_working_memory(&self) -> Result<usize> {
        let listing = self
            .backend
            .list(&MemoryQuery {
                session_id: self.session_id.clone(),
                limit: 1000,
                memory_type: Some(MemoryType::Working),
            })
            .await?;
        let count = listing.len();
        for entry in listing {
            self.backend.delete(entry.id).await?;
        }
        Ok(count)
    }

    /// Deletes every memory in `target_session`, verifying on each
    /// entry that its `session_id` matches before deleting it. Any
    /// mismatch aborts the whole operation with
    /// [`Error::IntegrityViolation`] rather than deleting a partial set.
    pub async fn clear_all(&self, target_session: &str) -> Result<usize> {
        if target_session.is_empty() {
            return Err(Error::Configuration(
                "clear_all requires a non-empty session id".to_string(),
            ));
        }
        let listing = self
            .backend
            .list(&MemoryQuery {
                session_id: target_session.to_string(),
                limit: 10_000,
                memory_type: None,
            })
            .await?;
        for entry in &listing {
            if entry.session_id != target_session {
                warn!(
                    entry_session = %entry.session_id,
                    %target_session,
                    "session isolation violation detected during clear_all"
                );
                return Err(Error::IntegrityViolation(format!(
                    "memory {} belongs to session {} but was returned for session {}",
                    entry.id, entry.session_id, target_session
                )));
            }
        }
        let count = listing.len();
        for entry in listing {
            self.backend.delete(entry.id).await?;
        }
        Ok(count)
    }

    /// Deletes [`MemoryType::Working`] memories in this session tagged
    /// with `metadata["task_id"] == task_id`.
    pub async fn mark_task_complete(&self, task_id: &str) -> Result<usize> {
        let listing = self
            .backend
            .list(&MemoryQuery {
                session_id: self.session_id.clone(),
                limit: 1000,
                memory_type: Some(MemoryType::Working),
            })
            .await?;
        let mut count = 0;
        for entry in listing {
            if entry.metadata.get("task_id").map(String::as_str) == Some(task_id) {
                self.backend.delete(entry.id).await?;
                count += 1;
            }
        }
        Ok(count)
    }

    pub async fn statistics(&self) -> Result<CoordinatorStats> {
        let BackendStats { total_memories } = self.backend.stats().await?;
        let mut stats = self.stats.lock().clone();
        stats.total_memories = total_memories;
        Ok(stats)
    }
}

/// Scores and sorts `candidates` descending by relevance to
/// `query_text`: +10.0 for an exact phrase match, +2.0 per overlapping
/// word, a recency bonus decaying linearly from 5.0 to 0 over ~50 days,
/// plus the entry's own stored importance.
fn rank_by_relevance(candidates: &mut [MemoryEntry], query_text: &str) {
    let query_lower = query_text.to_lowercase();
    let query_words: std::collections::HashSet<&str> = query_lower.split_whitespace().collect();
    let now = Utc::now();

    let mut scored: Vec<(f64, usize)> = candidates
        .iter()
        .enumerate()
        .map(|(idx, entry)| {
            let content_lower = entry.content.to_lowercase();
            let mut score = 0.0;
            if !query_lower.is_empty() && content_lower.contains(&query_lower) {
                score += 10.0;
            }
            let content_words: std::collections::HashSet<&str> =
                content_lower.split_whitespace().collect();
            score += 2.0 * query_words.intersection(&content_words).count() as f64;

            let age_days = (now - entry.accessed_at).num_days().max(0) as f64;
            score += (5.0 - age_days * 0.1).max(0.0);

            score += entry.importance;
            (score, idx)
        })
        .collect();

    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

    let ordered: Vec<MemoryEntry> = scored.iter().map(|(_, idx)| candidates[*idx].clone()).collect();
    candidates.clone_from_slice(&ordered);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::backend::InMemoryBackend;

    fn coordinator() -> MemoryCoordinator {
        MemoryCoordinator::new(Arc::new(InMemoryBackend::new()), Some("session-test".into()))
    }

    fn request(content: &str, memory_type: MemoryType) -> StorageRequest {
        StorageRequest {
            content: content.to_string(),
            memory_type,
            context: HashMap::new(),
            metadata: HashMap::new(),
        }
    }

    #[tokio::test]
    async fn store_rejects_trivial_content() {
        let coord = coordinator();
        let result = coord.store(request("thanks", MemoryType::Episodic)).await.unwrap();
        assert!(result.is_none());
        assert_eq!(coord.statistics().await.unwrap().total_rejected, 1);
    }

    #[tokio::test]
    async fn store_accepts_substantive_content() {
        let coord = coordinator();
        let content = "The deployment pipeline failed at the build step because of a missing env var.";
        let result = coord.store(request(content, MemoryType::Episodic)).await.unwrap();
        assert!(result.is_some());
    }

    #[tokio::test]
    async fn store_rejects_exact_duplicate() {
        let coord = coordinator();
        let content = "The deployment pipeline failed at the build step because of a missing env var.";
        let first = coord.store(request(content, MemoryType::Episodic)).await.unwrap();
        assert!(first.is_some());
        let second = coord.store(request(content, MemoryType::Episodic)).await.unwrap();
        assert!(second.is_none());
    }

    #[tokio::test]
    async fn retrieve_returns_empty_for_zero_budget() {
        let coord = coordinator();
        let results = coord
            .retrieve(RetrievalQuery {
                query_text: "anything".into(),
                token_budget: 0,
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn retrieve_ranks_exact_phrase_match_first() {
        let coord = coordinator();
        coord
            .store(request(
                "Completely unrelated content about weather patterns in the Arctic region today.",
                MemoryType::Semantic,
            ))
            .await
            .unwrap();
        coord
            .store(request(
                "The user asked about deployment pipeline failures and how to fix them quickly.",
                MemoryType::Episodic,
            ))
            .await
            .unwrap();
        let results = coord
            .retrieve(RetrievalQuery {
                query_text: "deployment pipeline failures".into(),
                token_budget: 8000,
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(results[0].content.contains("deployment pipeline"));
    }

    #[tokio::test]
    async fn clear_all_requires_non_empty_session_id() {
        let coord = coordinator();
        let result = coord.clear_all("").await;
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[tokio::test]
    async fn clear_working_memory_only_deletes_working_type() {
        let coord = coordinator();
        coord
            .store(request(
                "a working-memory scratch note about the current subtask",
                MemoryType::Working,
            ))
            .await
            .unwrap();
        coord
            .store(request(
                "a durable semantic fact that should survive the clear",
                MemoryType::Semantic,
            ))
            .await
            .unwrap();
        let cleared = coord.clear_working_memory().await.unwrap();
        assert_eq!(cleared, 1);
        let stats = coord.statistics().await.unwrap();
        assert_eq!(stats.total_memories, 1);
    }
}
