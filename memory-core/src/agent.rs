//! The in-process agent interface and a reference implementation built
//! on the memory coordinator. The progressive harness never calls an
//! [`Agent`] directly (it goes through [`crate::subprocess`]); the
//! long-horizon evaluator and matrix runner do, since they are not
//! subprocess-isolated per spec.

use crate::error::Result;
use crate::memory::{
    InMemoryBackend, MemoryCoordinator, RetrievalQuery, StorageBackend, StorageRequest,
};
use crate::types::MemoryType;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// An answer together with an optional internal reasoning trace, the
/// `(string, trace)` return shape the spec allows in place of a bare
/// string.
#[derive(Debug, Clone)]
pub struct Answer {
    pub text: String,
    pub trace: Option<String>,
}

impl From<String> for Answer {
    fn from(text: String) -> Self {
        Self { text, trace: None }
    }
}

/// The four operations every agent implementation exposes.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Ingests one unit of content. No return value; failures are
    /// logged by the caller and do not abort a learning phase.
    async fn learn(&self, content: &str) -> Result<()>;

    /// Produces an answer, optionally with an internal reasoning trace.
    async fn answer(&self, question: &str) -> Result<Answer>;

    /// Best-effort diagnostics. May return an empty map.
    async fn get_memory_stats(&self) -> HashMap<String, String>;

    /// Releases resources. A no-op for purely in-process agents.
    async fn close(&self) -> Result<()>;
}

/// A reference [`Agent`] that stores every learned unit as an episodic
/// memory and answers by retrieving the most relevant stored memories
/// and concatenating their content. Exists to exercise the memory
/// coordinator end-to-end in the long-horizon evaluator and matrix
/// runner tests; it is not a claim of strong cognitive capability.
pub struct MemoryBackedAgent {
    coordinator: MemoryCoordinator,
}

impl MemoryBackedAgent {
    #[must_use]
    pub fn new(session_id: impl Into<String>) -> Self {
        Self::with_backend(Arc::new(InMemoryBackend::new()), session_id)
    }

    #[must_use]
    pub fn with_backend(backend: Arc<dyn StorageBackend>, session_id: impl Into<String>) -> Self {
        Self {
            coordinator: MemoryCoordinator::new(backend, Some(session_id.into())),
        }
    }
}

#[async_trait]
impl Agent for MemoryBackedAgent {
    async fn learn(&self, content: &str) -> Result<()> {
        self.coordinator
            .store(StorageRequest {
                content: content.to_string(),
                memory_type: MemoryType::Episodic,
                context: HashMap::new(),
                metadata: HashMap::new(),
            })
            .await?;
        Ok(())
    }

    async fn answer(&self, question: &str) -> Result<Answer> {
        let relevant = self
            .coordinator
            .retrieve(RetrievalQuery {
                query_text: question.to_string(),
                token_budget: 2000,
                memory_types: None,
                time_range: None,
            })
            .await?;
        if relevant.is_empty() {
            return Ok(Answer {
                text: "I don't have enough information to answer that.".to_string(),
                trace: None,
            });
        }
        let text = relevant
            .iter()
            .map(|entry| entry.content.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        Ok(Answer { text, trace: None })
    }

    async fn get_memory_stats(&self) -> HashMap<String, String> {
        self.coordinator
            .statistics()
            .await
            .map(|stats| {
                HashMap::from([
                    ("total_stored".to_string(), stats.total_stored.to_string()),
                    (
                        "total_retrievals".to_string(),
                        stats.total_retrievals.to_string(),
                    ),
                    (
                        "total_rejected".to_string(),
                        stats.total_rejected.to_string(),
                    ),
                    (
                        "total_memories".to_string(),
                        stats.total_memories.to_string(),
                    ),
                ])
            })
            .unwrap_or_default()
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn answers_without_learning_anything_is_a_graceful_miss() {
        let agent = MemoryBackedAgent::new("session-agent-test");
        let answer = agent.answer("what did we discuss?").await.unwrap();
        assert!(answer.text.contains("don't have enough information"));
    }

    #[tokio::test]
    async fn learn_then_answer_retrieves_relevant_content() {
        let agent = MemoryBackedAgent::new("session-agent-test-2");
        agent
            .learn("The deployment pipeline failed because of a missing environment variable.")
            .await
            .unwrap();
        let answer = agent.answer("Why did the deployment pipeline fail?").await.unwrap();
        assert!(answer.text.contains("missing environment variable"));
    }

    #[tokio::test]
    async fn memory_stats_reflect_learned_content() {
        let agent = MemoryBackedAgent::new("session-agent-test-3");
        agent
            .learn("A substantive fact worth remembering for later retrieval.")
            .await
            .unwrap();
        let stats = agent.get_memory_stats().await;
        assert_eq!(stats.get("total_stored").map(String::as_str), Some("1"));
    }
}
