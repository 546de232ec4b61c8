//! Retrieval quality evaluation: precision, recall, relevance, and
//! ranking quality (NDCG) against a known-relevant test set.

use crate::memory::{MemoryCoordinator, MemoryEntry, RetrievalQuery, StorageRequest};
use crate::types::MemoryType;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Quality evaluation results, averaged across a set of test queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityMetrics {
    pub relevance_score: f64,
    pub precision: f64,
    pub recall: f64,
    pub ndcg_score: f64,
    pub num_queries: usize,
    pub backend_name: String,
}

/// One query with its known-relevant memory ids, used as ground truth.
#[derive(Debug, Clone)]
pub struct QueryTestCase {
    pub query_text: String,
    pub relevant_memory_ids: HashSet<Uuid>,
    pub memory_type: Option<MemoryType>,
}

/// Runs every test query against `coordinator` and averages the
/// resulting precision, recall, relevance, and NDCG.
pub async fn evaluate(
    coordinator: &MemoryCoordinator,
    backend_name: &str,
    test_queries: &[QueryTestCase],
) -> Result<QualityMetrics> {
    let num_queries = test_queries.len();
    if num_queries == 0 {
        return Ok(QualityMetrics {
            relevance_score: 0.0,
            precision: 0.0,
            recall: 0.0,
            ndcg_score: 0.0,
            num_queries: 0,
            backend_name: backend_name.to_string(),
        });
    }

    let mut total_relevance = 0.0;
    let mut total_precision = 0.0;
    let mut total_recall = 0.0;
    let mut total_ndcg = 0.0;

    for test_query in test_queries {
        let query = RetrievalQuery {
            query_text: test_query.query_text.clone(),
            memory_types: test_query.memory_type.map(|t| vec![t]),
            ..RetrievalQuery::default()
        };
        let retrieved = coordinator.retrieve(query).await?;
        let retrieved_ids: HashSet<Uuid> = retrieved.iter().map(|m| m.id).collect();
        let relevant_ids = &test_query.relevant_memory_ids;

        let hits = retrieved_ids.intersection(relevant_ids).count();
        let precision = if retrieved_ids.is_empty() { 0.0 } else { hits as f64 / retrieved_ids.len() as f64 };
        let recall = if relevant_ids.is_empty() { 0.0 } else { hits as f64 / relevant_ids.len() as f64 };
        let relevance = calculate_relevance(&retrieved, relevant_ids);
        let ndcg = calculate_ndcg(&retrieved, relevant_ids);

        total_precision += precision;
        total_recall += recall;
        total_relevance += relevance;
        total_ndcg += ndcg;
    }

    Ok(QualityMetrics {
        relevance_score: total_relevance / num_queries as f64,
        precision: total_precision / num_queries as f64,
        recall: total_recall / num_queries as f64,
        ndcg_score: total_ndcg / num_queries as f64,
        num_queries,
        backend_name: backend_name.to_string(),
    })
}

fn calculate_relevance(retrieved: &[MemoryEntry], relevant_ids: &HashSet<Uuid>) -> f64 {
    if retrieved.is_empty() {
        return 0.0;
    }
    let relevant_count = retrieved.iter().filter(|m| relevant_ids.contains(&m.id)).count();
    relevant_count as f64 / retrieved.len() as f64
}

/// Position discount uses `bit_length()`-style `ilog2`, a cheap
/// approximation of `log2` rather than a true logarithm, matching the
/// scoring behavior this was ported from.
fn position_discount(position: usize) -> f64 {
    let n = (position + 2) as u32;
    1.0 / f64::from(32 - n.leading_zeros())
}

fn calculate_ndcg(retrieved: &[MemoryEntry], relevant_ids: &HashSet<Uuid>) -> f64 {
    if retrieved.is_empty() || relevant_ids.is_empty() {
        return 0.0;
    }

    let dcg: f64 = retrieved
        .iter()
        .enumerate()
        .filter(|(_, m)| relevant_ids.contains(&m.id))
        .map(|(i, _)| position_discount(i))
        .sum();

    let idcg: f64 = (0..retrieved.len().min(relevant_ids.len())).map(position_discount).sum();

    if idcg > 0.0 {
        dcg / idcg
    } else {
        0.0
    }
}

/// Builds a standard test set: `num_memories / 5` memories in each of
/// the five types, plus three queries targeting a specific feature
/// index, the semantic "pattern" memories, and the procedural
/// "workflow" memories respectively.
pub async fn create_test_set(coordinator: &MemoryCoordinator, num_memories: usize) -> Result<Vec<QueryTestCase>> {
    let per_type = num_memories / 5;
    let mut feature_ids = Vec::new();
    let mut pattern_ids = HashSet::new();
    let mut workflow_ids = HashSet::new();

    for i in 0..per_type {
        let id = store_test_memory(
            coordinator,
            format!("User asked about feature {i}, agent explained the implementation details and provided code examples."),
            MemoryType::Episodic,
            "conversation",
        )
        .await?;
        if i < 5 {
            feature_ids.extend(id);
        }
    }

    for i in 0..per_type {
        let id = store_test_memory(
            coordinator,
            format!("Pattern learned: When implementing feature {i}, always validate input parameters before processing."),
            MemoryType::Semantic,
            "learning",
        )
        .await?;
        pattern_ids.extend(id);
    }

    for i in 0..per_type {
        let id = store_test_memory(
            coordinator,
            format!("Workflow: To deploy feature {i}, run tests, build artifacts, deploy to staging, verify, then deploy to production."),
            MemoryType::Procedural,
            "workflow",
        )
        .await?;
        workflow_ids.extend(id);
    }

    for i in 0..per_type {
        store_test_memory(
            coordinator,
            format!("TODO: Refactor feature {i} to use new API pattern and improve error handling."),
            MemoryType::Prospective,
            "todo",
        )
        .await?;
    }

    for i in 0..per_type {
        store_test_memory(
            coordinator,
            format!("Current task: Implementing feature {i}, waiting on API response from service X."),
            MemoryType::Working,
            "task",
        )
        .await?;
    }

    Ok(vec![
        QueryTestCase {
            query_text: "feature 0".to_string(),
            relevant_memory_ids: feature_ids.into_iter().collect(),
            memory_type: None,
        },
        QueryTestCase {
            query_text: "pattern learned validation".to_string(),
            relevant_memory_ids: pattern_ids,
            memory_type: None,
        },
        QueryTestCase {
            query_text: "deployment workflow".to_string(),
            relevant_memory_ids: workflow_ids,
            memory_type: None,
        },
    ])
}

async fn store_test_memory(
    coordinator: &MemoryCoordinator,
    content: String,
    memory_type: MemoryType,
    category: &str,
) -> Result<Option<Uuid>> {
    let mut metadata = std::collections::HashMap::new();
    metadata.insert("test_memory".to_string(), "true".to_string());
    metadata.insert("category".to_string(), category.to_string());
    coordinator
        .store(StorageRequest {
            content,
            memory_type,
            context: [("agent_id".to_string(), "test-agent".to_string())].into(),
            metadata,
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn entry(id: Uuid) -> MemoryEntry {
        MemoryEntry {
            id,
            session_id: "s".into(),
            agent_id: "a".into(),
            memory_type: MemoryType::Episodic,
            title: "t".into(),
            content: "c".into(),
            metadata: std::collections::HashMap::new(),
            importance: 0.5,
            created_at: Utc::now(),
            accessed_at: Utc::now(),
        }
    }

    #[test]
    fn relevance_is_fraction_of_retrieved_that_are_relevant() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let retrieved = vec![entry(a), entry(b)];
        let relevant: HashSet<Uuid> = [a].into_iter().collect();
        assert!((calculate_relevance(&retrieved, &relevant) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn ndcg_is_one_when_all_relevant_ranked_first() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let retrieved = vec![entry(a), entry(b)];
        let relevant: HashSet<Uuid> = [a, b].into_iter().collect();
        assert!((calculate_ndcg(&retrieved, &relevant) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn ndcg_penalizes_relevant_result_ranked_second() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let retrieved = vec![entry(a), entry(b)];
        let relevant: HashSet<Uuid> = [b].into_iter().collect();
        let ndcg = calculate_ndcg(&retrieved, &relevant);
        assert!(ndcg > 0.0 && ndcg < 1.0);
    }

    #[test]
    fn ndcg_is_zero_with_no_relevant_ids() {
        let retrieved = vec![entry(Uuid::new_v4())];
        assert_eq!(calculate_ndcg(&retrieved, &HashSet::new()), 0.0);
    }
}
