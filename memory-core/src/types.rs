//! Closed-set vocabularies and the read-only test catalog data model.
//!
//! Reasoning types, long-horizon categories, scoring dimensions, and
//! memory types are modeled as tagged variants rather than strings so
//! that match exhaustiveness is checked by the compiler. See
//! [`crate::memory::MemoryEntry`] for the one place a variant (memory
//! type) crosses into a persisted record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Fine-grained cognitive category assigned to a [`TestQuestion`],
/// distinct from its level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasoningType {
    DirectRecall,
    CrossSourceSynthesis,
    TemporalDifference,
    TemporalComparison,
    TemporalTrend,
    ProceduralRecall,
    ProceduralTroubleshooting,
    ProceduralSequence,
    ProceduralApplication,
    ContradictionDetection,
    ContradictionReasoning,
    SourceCredibility,
    IncrementalUpdate,
    IncrementalTracking,
    IncrementalSynthesis,
    KnowledgeTransferRecall,
    KnowledgeTransferSynthesis,
    /// Levels L8-L12 extend the vocabulary beyond the original six-level
    /// catalog: self-assessment of confidence and search effort.
    Metacognitive,
    /// "why did X happen" questions over the learned material.
    CausalReasoning,
    /// "what would have happened if" hypotheticals.
    Counterfactual,
    /// Applying a taught procedure to a materially new situation.
    NovelSkillApplication,
    /// Transferring a learned pattern to an unrelated domain.
    FarTransfer,
}

/// The five psychological memory types the coordinator stores and
/// retrieves against. A tagged variant, not a type hierarchy: every
/// memory type shares the same [`crate::memory::MemoryEntry`] shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryType {
    /// A specific event or interaction: "the user asked X, I answered Y".
    Episodic,
    /// A general fact or learned relationship, independent of when it
    /// was learned.
    Semantic,
    /// A future intention or pending task: "remember to follow up on Z".
    Prospective,
    /// A learned procedure or how-to: steps, troubleshooting, sequences.
    Procedural,
    /// Scratch state scoped to the current task, cleared between tasks.
    Working,
}

/// One of five independent grading axes applied to a single
/// long-horizon answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    FactualAccuracy,
    Specificity,
    TemporalAwareness,
    SourceAttribution,
    ConfidenceCalibration,
}

/// One of eight templated turn types in the long-horizon dialogue
/// generator, each designed to stress a specific memory failure mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockName {
    NeedleInHaystack,
    TemporalEvolution,
    Contradictions,
    Distractors,
    CrossReference,
    NumericalPrecision,
    SourceAttribution,
    MetaMemory,
}

impl BlockName {
    /// The eight blocks in generator rotation order.
    #[must_use]
    pub const fn all() -> [BlockName; 8] {
        [
            BlockName::NeedleInHaystack,
            BlockName::TemporalEvolution,
            BlockName::Contradictions,
            BlockName::Distractors,
            BlockName::CrossReference,
            BlockName::NumericalPrecision,
            BlockName::SourceAttribution,
            BlockName::MetaMemory,
        ]
    }
}

/// The closed category vocabulary for long-horizon questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionCategory {
    NeedleInHaystack,
    MetaMemory,
    SourceAttribution,
    TemporalEvolution,
    CrossReference,
    NumericalPrecision,
    DistractorResistance,
}

impl QuestionCategory {
    /// The scoring dimensions every question in this category requires,
    /// per the generator's fixed category-to-dimension mapping.
    #[must_use]
    pub fn required_dimensions(self) -> Vec<Dimension> {
        match self {
            QuestionCategory::NeedleInHaystack => {
                vec![Dimension::FactualAccuracy, Dimension::Specificity]
            }
            QuestionCategory::TemporalEvolution => vec![
                Dimension::FactualAccuracy,
                Dimension::Specificity,
                Dimension::TemporalAwareness,
            ],
            QuestionCategory::SourceAttribution => vec![
                Dimension::FactualAccuracy,
                Dimension::Specificity,
                Dimension::SourceAttribution,
            ],
            QuestionCategory::MetaMemory => vec![
                Dimension::FactualAccuracy,
                Dimension::ConfidenceCalibration,
            ],
            QuestionCategory::CrossReference
            | QuestionCategory::NumericalPrecision
            | QuestionCategory::DistractorResistance => {
                vec![Dimension::FactualAccuracy, Dimension::Specificity]
            }
        }
    }
}

/// The closed sixteen-entry failure-mode taxonomy the error analyzer
/// classifies failed questions into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureMode {
    RetrievalInsufficient,
    TemporalOrderingWrong,
    IntentMisclassification,
    FactExtractionIncomplete,
    SynthesisHallucination,
    UpdateNotApplied,
    ContradictionUndetected,
    ProceduralOrderingLost,
    TeachingCoverageGap,
    CounterfactualRefusal,
    /// The agent's answer omitted evidence that was present in memory.
    EvidenceOmission,
    /// The agent conflated two distinct entities' attributes.
    EntityConflation,
    /// The agent attributed a fact to the wrong source.
    SourceMisattribution,
    /// The agent over- or under-stated its own confidence.
    ConfidenceMiscalibration,
    /// The agent's answer drifted from the question asked.
    QuestionDrift,
    /// The agent produced a numerically imprecise answer where exactness
    /// was required.
    NumericalImprecision,
}

/// Optional article metadata phase tag used by incremental-learning
/// levels to split articles into an `initial` and `update` pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArticlePhase {
    Initial,
    Update,
}

/// Source text an agent learns from. Immutable once authored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestArticle {
    pub title: String,
    pub content: String,
    pub url: String,
    pub published: DateTime<Utc>,
    pub phase: Option<ArticlePhase>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// A question posed to the agent during the testing phase of a level.
/// Immutable once authored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestQuestion {
    pub question: String,
    pub expected_answer: String,
    pub level: String,
    pub reasoning_type: ReasoningType,
}

/// One cognitive test stage with its own articles, questions, and
/// optional multi-phase learning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestLevel {
    pub level_id: String,
    pub level_name: String,
    pub description: String,
    pub articles: Vec<TestArticle>,
    pub questions: Vec<TestQuestion>,
    pub requires_temporal_ordering: bool,
    pub requires_update_handling: bool,
}

impl TestLevel {
    /// Articles tagged `phase=initial`, in catalog order. Used by
    /// [`requires_update_handling`](Self::requires_update_handling) levels.
    #[must_use]
    pub fn initial_articles(&self) -> Vec<&TestArticle> {
        self.articles
            .iter()
            .filter(|a| a.phase == Some(ArticlePhase::Initial))
            .collect()
    }

    /// Articles tagged `phase=update`, in catalog order.
    #[must_use]
    pub fn update_articles(&self) -> Vec<&TestArticle> {
        self.articles
            .iter()
            .filter(|a| a.phase == Some(ArticlePhase::Update))
            .collect()
    }
}
