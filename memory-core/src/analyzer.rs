//! Failure-mode taxonomy and classification heuristics. Maps a failed
//! question (score below threshold) to a [`FailureMode`], the
//! component responsible, and an optional prompt template id, so that
//! [`crate::selfimprove`] has something concrete to act on.

use crate::harness::QuestionGrade;
use crate::types::{FailureMode, ReasoningType};
use serde::{Deserialize, Serialize};

/// A taxonomy entry: what a failure mode means, who owns it, and which
/// prompt template (if any) addresses it.
#[derive(Debug, Clone, Copy)]
pub struct TaxonomyEntry {
    pub description: &'static str,
    pub responsible_component: &'static str,
    pub prompt_template_id: Option<&'static str>,
}

/// Looks up the fixed taxonomy entry for a failure mode. Total over
/// [`FailureMode`]'s sixteen variants.
#[must_use]
pub fn taxonomy_entry(mode: FailureMode) -> TaxonomyEntry {
    match mode {
        FailureMode::RetrievalInsufficient => TaxonomyEntry {
            description: "Not enough relevant facts were retrieved",
            responsible_component: "memory::coordinator::retrieve",
            prompt_template_id: Some("plan_retrieval"),
        },
        FailureMode::TemporalOrderingWrong => TaxonomyEntry {
            description: "Correct facts found but temporal computation failed",
            responsible_component: "agent synthesis (temporal instructions)",
            prompt_template_id: Some("synthesis_instructions"),
        },
        FailureMode::IntentMisclassification => TaxonomyEntry {
            description: "Question classified as the wrong intent type",
            responsible_component: "agent intent classification",
            prompt_template_id: Some("intent_classification"),
        },
        FailureMode::FactExtractionIncomplete => TaxonomyEntry {
            description: "Key facts were not extracted during learning",
            responsible_component: "agent fact extraction",
            prompt_template_id: Some("fact_extraction"),
        },
        FailureMode::SynthesisHallucination => TaxonomyEntry {
            description: "Answer includes information not present in the facts",
            responsible_component: "agent answer synthesis",
            prompt_template_id: Some("synthesis"),
        },
        FailureMode::UpdateNotApplied => TaxonomyEntry {
            description: "Agent used outdated data instead of the updated version",
            responsible_component: "memory::coordinator supersede detection",
            prompt_template_id: None,
        },
        FailureMode::ContradictionUndetected => TaxonomyEntry {
            description: "Conflicting sources were not identified",
            responsible_component: "agent intent classification + synthesis",
            prompt_template_id: Some("synthesis_instructions"),
        },
        FailureMode::ProceduralOrderingLost => TaxonomyEntry {
            description: "Steps were mentioned but out of sequence",
            responsible_component: "agent fact extraction",
            prompt_template_id: Some("fact_extraction"),
        },
        FailureMode::TeachingCoverageGap => TaxonomyEntry {
            description: "The student was not taught certain key facts",
            responsible_component: "teaching session response generation",
            prompt_template_id: Some("teaching_response"),
        },
        FailureMode::CounterfactualRefusal => TaxonomyEntry {
            description: "Agent refused to reason hypothetically",
            responsible_component: "agent answer synthesis",
            prompt_template_id: Some("synthesis_instructions"),
        },
        FailureMode::EvidenceOmission => TaxonomyEntry {
            description: "Answer omitted evidence that was present in memory",
            responsible_component: "agent answer synthesis",
            prompt_template_id: Some("synthesis"),
        },
        FailureMode::EntityConflation => TaxonomyEntry {
            description: "Agent conflated two distinct entities' attributes",
            responsible_component: "agent fact extraction",
            prompt_template_id: Some("fact_extraction"),
        },
        FailureMode::SourceMisattribution => TaxonomyEntry {
            description: "Agent attributed a fact to the wrong source",
            responsible_component: "agent fact extraction",
            prompt_template_id: Some("fact_extraction"),
        },
        FailureMode::ConfidenceMiscalibration => TaxonomyEntry {
            description: "Agent over- or under-stated its own confidence",
            responsible_component: "agent metacognition reporting",
            prompt_template_id: None,
        },
        FailureMode::QuestionDrift => TaxonomyEntry {
            description: "Answer drifted from the question asked",
            responsible_component: "agent intent classification",
            prompt_template_id: Some("intent_classification"),
        },
        FailureMode::NumericalImprecision => TaxonomyEntry {
            description: "Answer was numerically imprecise where exactness was required",
            responsible_component: "agent fact extraction",
            prompt_template_id: Some("fact_extraction"),
        },
    }
}

/// One failed question mapped to a failure mode, with the evidence
/// preserved for the self-improvement controller's hypothesis step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorAnalysis {
    pub failure_mode: FailureMode,
    pub affected_level: String,
    pub affected_component: String,
    pub prompt_template_id: Option<String>,
    pub evidence: QuestionGrade,
    pub score: f64,
    pub suggested_focus: String,
}

/// Classifies every question scoring below `score_threshold` across
/// `level_results`, worst score first.
#[must_use]
pub fn analyze_eval_results(
    level_results: &[(String, Vec<QuestionGrade>)],
    score_threshold: f64,
) -> Vec<ErrorAnalysis> {
    let mut analyses = Vec::new();
    for (level_id, details) in level_results {
        for detail in details {
            if detail.score >= score_threshold {
                continue;
            }
            let mode = classify_failure(detail, level_id);
            let entry = taxonomy_entry(mode);
            analyses.push(ErrorAnalysis {
                failure_mode: mode,
                affected_level: level_id.clone(),
                affected_component: entry.responsible_component.to_string(),
                prompt_template_id: entry.prompt_template_id.map(str::to_string),
                suggested_focus: suggested_focus(detail, &entry),
                evidence: detail.clone(),
                score: detail.score,
            });
        }
    }
    analyses.sort_by(|a, b| a.score.partial_cmp(&b.score).unwrap_or(std::cmp::Ordering::Equal));
    analyses
}

fn classify_failure(detail: &QuestionGrade, level_id: &str) -> FailureMode {
    let actual = detail.actual.to_lowercase();
    let question = detail.question.to_lowercase();

    let refuses = ["cannot answer", "not possible", "no facts", "not provided"]
        .iter()
        .any(|phrase| actual.contains(phrase));
    if refuses && (question.contains("what if") || question.contains("without")) {
        return FailureMode::CounterfactualRefusal;
    }

    if level_id == "L6"
        && matches!(
            detail.reasoning_type,
            ReasoningType::IncrementalUpdate | ReasoningType::IncrementalTracking
        )
    {
        return FailureMode::UpdateNotApplied;
    }

    if level_id == "L5" {
        return FailureMode::ContradictionUndetected;
    }

    if matches!(
        detail.reasoning_type,
        ReasoningType::TemporalComparison
            | ReasoningType::TemporalDifference
            | ReasoningType::TemporalTrend
    ) {
        return FailureMode::TemporalOrderingWrong;
    }

    if matches!(
        detail.reasoning_type,
        ReasoningType::ProceduralSequence | ReasoningType::ProceduralApplication
    ) {
        return FailureMode::ProceduralOrderingLost;
    }

    if actual.contains("under-effort") {
        return FailureMode::IntentMisclassification;
    }
    if actual.contains("0/") {
        return FailureMode::RetrievalInsufficient;
    }

    if detail.reasoning_type == ReasoningType::CrossSourceSynthesis {
        return FailureMode::RetrievalInsufficient;
    }

    FailureMode::SynthesisHallucination
}

fn suggested_focus(detail: &QuestionGrade, entry: &TaxonomyEntry) -> String {
    let question_snippet: String = detail.question.chars().take(80).collect();
    format!(
        "{}. Question: '{question_snippet}...'. Investigate: {}. Score: {:.0}%",
        entry.description,
        entry.responsible_component,
        detail.score * 100.0
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail(question: &str, actual: &str, reasoning_type: ReasoningType, score: f64) -> QuestionGrade {
        QuestionGrade {
            question: question.to_string(),
            level: "L1".into(),
            reasoning_type,
            expected: "expected".into(),
            actual: actual.to_string(),
            score,
            reasoning: String::new(),
        }
    }

    #[test]
    fn counterfactual_refusal_requires_both_phrase_and_hypothetical() {
        let d = detail(
            "What if the server had never restarted?",
            "I cannot answer that without more data",
            ReasoningType::DirectRecall,
            0.1,
        );
        assert_eq!(classify_failure(&d, "L1"), FailureMode::CounterfactualRefusal);
    }

    #[test]
    fn refusal_without_hypothetical_falls_through() {
        let d = detail(
            "What is the server's status?",
            "I cannot answer that",
            ReasoningType::DirectRecall,
            0.1,
        );
        assert_ne!(classify_failure(&d, "L1"), FailureMode::CounterfactualRefusal);
    }

    #[test]
    fn l6_incremental_update_maps_to_update_not_applied() {
        let d = detail("q", "a", ReasoningType::IncrementalUpdate, 0.2);
        assert_eq!(classify_failure(&d, "L6"), FailureMode::UpdateNotApplied);
    }

    #[test]
    fn l5_always_maps_to_contradiction_undetected() {
        let d = detail("q", "a", ReasoningType::DirectRecall, 0.3);
        assert_eq!(classify_failure(&d, "L5"), FailureMode::ContradictionUndetected);
    }

    #[test]
    fn default_fallback_is_synthesis_hallucination() {
        let d = detail("q", "a", ReasoningType::DirectRecall, 0.3);
        assert_eq!(classify_failure(&d, "L1"), FailureMode::SynthesisHallucination);
    }

    #[test]
    fn analyze_skips_questions_at_or_above_threshold() {
        let details = vec![
            detail("q1", "a1", ReasoningType::DirectRecall, 0.9),
            detail("q2", "a2", ReasoningType::DirectRecall, 0.3),
        ];
        let analyses = analyze_eval_results(&[("L1".to_string(), details)], 0.6);
        assert_eq!(analyses.len(), 1);
        assert_eq!(analyses[0].evidence.question, "q2");
    }

    #[test]
    fn analyze_sorts_worst_score_first() {
        let details = vec![
            detail("q1", "a1", ReasoningType::DirectRecall, 0.5),
            detail("q2", "a2", ReasoningType::DirectRecall, 0.1),
        ];
        let analyses = analyze_eval_results(&[("L1".to_string(), details)], 0.6);
        assert_eq!(analyses[0].score, 0.1);
        assert_eq!(analyses[1].score, 0.5);
    }

    #[test]
    fn taxonomy_entry_is_total_over_all_failure_modes() {
        let modes = [
            FailureMode::RetrievalInsufficient,
            FailureMode::TemporalOrderingWrong,
            FailureMode::IntentMisclassification,
            FailureMode::FactExtractionIncomplete,
            FailureMode::SynthesisHallucination,
            FailureMode::UpdateNotApplied,
            FailureMode::ContradictionUndetected,
            FailureMode::ProceduralOrderingLost,
            FailureMode::TeachingCoverageGap,
            FailureMode::CounterfactualRefusal,
            FailureMode::EvidenceOmission,
            FailureMode::EntityConflation,
            FailureMode::SourceMisattribution,
            FailureMode::ConfidenceMiscalibration,
            FailureMode::QuestionDrift,
            FailureMode::NumericalImprecision,
        ];
        for mode in modes {
            let entry = taxonomy_entry(mode);
            assert!(!entry.description.is_empty());
        }
    }
}
