//! The persisted memory record shape shared by all five memory types.

use crate::types::MemoryType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// A single stored memory. One shape for all five [`MemoryType`]
/// variants; the type itself is just a field, not a subclass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryEntry {
    pub id: Uuid,
    pub session_id: String,
    pub agent_id: String,
    pub memory_type: MemoryType,
    /// First 50 characters of `content`, used as a display label.
    pub title: String,
    pub content: String,
    pub metadata: HashMap<String, String>,
    pub importance: f64,
    pub created_at: DateTime<Utc>,
    pub accessed_at: DateTime<Utc>,
}

impl MemoryEntry {
    /// Builds the title field the way the coordinator derives it from
    /// content: the first 50 characters.
    #[must_use]
    pub fn title_from_content(content: &str) -> String {
        content.chars().take(50).collect()
    }

    /// Rough token estimate used by the retrieval token-budget ranking:
    /// four characters per token.
    #[must_use]
    pub fn estimated_tokens(&self) -> usize {
        self.content.len() / 4
    }
}
