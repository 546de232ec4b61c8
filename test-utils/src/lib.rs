//! Shared test fixtures for the evaluation, memory, and harness crates:
//! builders for [`MemoryEntry`]/[`StorageRequest`]/[`RetrievalQuery`]
//! and an in-process [`Agent`] stub that returns scripted answers
//! instead of consulting memory, for tests that need a fast,
//! deterministic agent.

use async_trait::async_trait;
use chrono::Utc;
use memory_core::agent::{Agent, Answer};
use memory_core::error::Result;
use memory_core::memory::{MemoryEntry, RetrievalQuery, StorageRequest};
use memory_core::types::MemoryType;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

/// Builds a [`MemoryEntry`] with sensible test defaults; override
/// fields on the returned value as needed.
#[must_use]
pub fn test_entry(session_id: &str, content: &str, memory_type: MemoryType) -> MemoryEntry {
    let now = Utc::now();
    MemoryEntry {
        id: Uuid::new_v4(),
        session_id: session_id.to_string(),
        agent_id: "test-agent".to_string(),
        memory_type,
        title: MemoryEntry::title_from_content(content),
        content: content.to_string(),
        metadata: HashMap::new(),
        importance: 0.8,
        created_at: now,
        accessed_at: now,
    }
}

/// Builds a [`StorageRequest`] for `content` with no context/metadata.
#[must_use]
pub fn test_storage_request(content: &str, memory_type: MemoryType) -> StorageRequest {
    StorageRequest {
        content: content.to_string(),
        memory_type,
        context: HashMap::new(),
        metadata: HashMap::new(),
    }
}

/// Builds a [`RetrievalQuery`] for `query_text` with a generous token
/// budget and no type/time filtering.
#[must_use]
pub fn test_retrieval_query(query_text: &str) -> RetrievalQuery {
    RetrievalQuery {
        query_text: query_text.to_string(),
        token_budget: 4000,
        memory_types: None,
        time_range: None,
    }
}

/// An [`Agent`] that answers with a fixed lookup table keyed by exact
/// question text, falling back to `default_answer` otherwise. Ignores
/// `learn` entirely; exists for harness/matrix tests that need a
/// deterministic agent without exercising the memory coordinator.
pub struct ScriptedAgent {
    answers: HashMap<String, String>,
    default_answer: String,
    learned: Mutex<Vec<String>>,
}

impl ScriptedAgent {
    #[must_use]
    pub fn new(default_answer: impl Into<String>) -> Self {
        Self {
            answers: HashMap::new(),
            default_answer: default_answer.into(),
            learned: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn with_answer(mut self, question: impl Into<String>, answer: impl Into<String>) -> Self {
        self.answers.insert(question.into(), answer.into());
        self
    }

    /// Everything passed to `learn` so far, in call order.
    #[must_use]
    pub fn learned_content(&self) -> Vec<String> {
        self.learned.lock().expect("learned mutex poisoned").clone()
    }
}

#[async_trait]
impl Agent for ScriptedAgent {
    async fn learn(&self, content: &str) -> Result<()> {
        self.learned.lock().expect("learned mutex poisoned").push(content.to_string());
        Ok(())
    }

    async fn answer(&self, question: &str) -> Result<Answer> {
        let text = self
            .answers
            .get(question)
            .cloned()
            .unwrap_or_else(|| self.default_answer.clone());
        Ok(Answer::from(text))
    }

    async fn get_memory_stats(&self) -> HashMap<String, String> {
        HashMap::new()
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_derives_title_from_content() {
        let entry = test_entry("s1", "hello world", MemoryType::Episodic);
        assert_eq!(entry.title, "hello world");
        assert_eq!(entry.session_id, "s1");
    }

    #[tokio::test]
    async fn scripted_agent_returns_matching_answer() {
        let agent = ScriptedAgent::new("default").with_answer("2+2?", "4");
        assert_eq!(agent.answer("2+2?").await.unwrap().text, "4");
        assert_eq!(agent.answer("unknown").await.unwrap().text, "default");
    }

    #[tokio::test]
    async fn scripted_agent_records_learned_content() {
        let agent = ScriptedAgent::new("default");
        agent.learn("fact one").await.unwrap();
        agent.learn("fact two").await.unwrap();
        assert_eq!(agent.learned_content(), vec!["fact one", "fact two"]);
    }
}
