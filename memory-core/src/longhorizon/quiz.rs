//! Deriving category-tagged questions from a generated ground truth.
//! Purely a function of the ground truth's turn sequence; no
//! additional randomness, so question generation is as deterministic
//! as dialogue generation.

use super::dialogue::{composite_key, Fact, GroundTruth};
use crate::types::{Dimension, QuestionCategory};
use serde::{Deserialize, Serialize};

/// One long-horizon question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub text: String,
    pub expected_answer: String,
    pub category: QuestionCategory,
    pub turn_indices: Vec<usize>,
    pub dimensions: Vec<Dimension>,
}

fn facts_by_block(gt: &GroundTruth, block: crate::types::BlockName) -> Vec<&Fact> {
    gt.turns
        .iter()
        .filter(|t| t.block_name == block)
        .flat_map(|t| t.facts.iter())
        .collect()
}

fn needle_questions(gt: &GroundTruth) -> Vec<Question> {
    facts_by_block(gt, crate::types::BlockName::NeedleInHaystack)
        .into_iter()
        .map(|fact| Question {
            id: format!("needle-{}-{}", fact.entity, fact.turn_index),
            text: format!("What is {}'s {}?", fact.entity, fact.attribute),
            expected_answer: fact.value.clone(),
            category: QuestionCategory::NeedleInHaystack,
            turn_indices: vec![fact.turn_index],
            dimensions: QuestionCategory::NeedleInHaystack.required_dimensions(),
        })
        .collect()
}

fn temporal_evolution_questions(gt: &GroundTruth) -> Vec<Question> {
    let mut seen = std::collections::HashSet::new();
    let mut questions = Vec::new();
    for turn in &gt.turns {
        for fact in &turn.facts {
            let key = composite_key(&fact.entity, &fact.attribute);
            if seen.contains(&key) {
                continue;
            }
            let Some(history) = gt.superseded_values.get(&key) else {
                continue;
            };
            if history.is_empty() {
                continue;
            }
            seen.insert(key.clone());
            let current = gt
                .current_value(&fact.entity, &fact.attribute)
                .expect("superseded pair has a current value");
            let mut turn_indices: Vec<usize> =
                history.iter().map(|f| f.turn_index).collect();
            turn_indices.push(current.turn_index);
            questions.push(Question {
                id: format!("temporal-{}-{}", fact.entity, fact.attribute),
                text: format!("What is the current {} of {}?", fact.attribute, fact.entity),
                expected_answer: current.value.clone(),
                category: QuestionCategory::TemporalEvolution,
                turn_indices,
                dimensions: QuestionCategory::TemporalEvolution.required_dimensions(),
            });
        }
    }
    questions
}

fn source_attribution_questions(gt: &GroundTruth) -> Vec<Question> {
    facts_by_block(gt, crate::types::BlockName::SourceAttribution)
        .into_iter()
        .map(|fact| Question {
            id: format!("source-{}-{}", fact.entity, fact.turn_index),
            text: format!("Which source reported {}'s {}?", fact.entity, fact.attribute),
            expected_answer: fact.source_label.clone(),
            category: QuestionCategory::SourceAttribution,
            turn_indices: vec![fact.turn_index],
            dimensions: QuestionCategory::SourceAttribution.required_dimensions(),
        })
        .collect()
}

fn cross_reference_questions(gt: &GroundTruth) -> Vec<Question> {
    facts_by_block(gt, crate::types::BlockName::CrossReference)
        .into_iter()
        .map(|fact| Question {
            id: format!("cross-{}-{}", fact.entity, fact.turn_index),
            text: format!("Under which {} is {} managed?", fact.attribute, fact.entity),
            expected_answer: fact.value.clone(),
            category: QuestionCategory::CrossReference,
            turn_indices: vec![fact.turn_index],
            dimensions: QuestionCategory::CrossReference.required_dimensions(),
        })
        .collect()
}

fn numerical_precision_questions(gt: &GroundTruth) -> Vec<Question> {
    facts_by_block(gt, crate::types::BlockName::NumericalPrecision)
        .into_iter()
        .map(|fact| Question {
            id: format!("numeric-{}-{}", fact.entity, fact.turn_index),
            text: format!(
                "What precise value was measured for {}'s {}?",
                fact.entity, fact.attribute
            ),
            expected_answer: fact.value.clone(),
            category: QuestionCategory::NumericalPrecision,
            turn_indices: vec![fact.turn_index],
            dimensions: QuestionCategory::NumericalPrecision.required_dimensions(),
        })
        .collect()
}

fn meta_memory_questions(gt: &GroundTruth) -> Vec<Question> {
    gt.turns
        .iter()
        .filter(|t| t.block_name == crate::types::BlockName::MetaMemory)
        .map(|turn| Question {
            id: format!("meta-{}", turn.index),
            text: "How confident are you in what you have learned so far?".to_string(),
            expected_answer: "An honest, calibrated confidence assessment".to_string(),
            category: QuestionCategory::MetaMemory,
            turn_indices: vec![turn.index],
            dimensions: QuestionCategory::MetaMemory.required_dimensions(),
        })
        .collect()
}

fn distractor_resistance_questions(gt: &GroundTruth) -> Vec<Question> {
    gt.turns
        .iter()
        .filter(|t| t.block_name == crate::types::BlockName::Distractors)
        .map(|turn| Question {
            id: format!("distractor-{}", turn.index),
            text: "Was any tracked system fact delivered in the cafeteria-menu aside?".to_string(),
            expected_answer: "No, that turn carried no tracked system fact".to_string(),
            category: QuestionCategory::DistractorResistance,
            turn_indices: vec![turn.index],
            dimensions: QuestionCategory::DistractorResistance.required_dimensions(),
        })
        .collect()
}

/// Derives up to `k` questions from `gt`, round-robining across the
/// seven categories in a fixed order so the result is a deterministic
/// function of the ground truth alone.
#[must_use]
pub fn generate_questions(gt: &GroundTruth, k: usize) -> Vec<Question> {
    let pools = [
        needle_questions(gt),
        temporal_evolution_questions(gt),
        source_attribution_questions(gt),
        cross_reference_questions(gt),
        numerical_precision_questions(gt),
        meta_memory_questions(gt),
        distractor_resistance_questions(gt),
    ];

    let mut questions = Vec::with_capacity(k);
    let mut cursors = [0usize; 7];
    'outer: loop {
        let mut advanced = false;
        for (pool_idx, pool) in pools.iter().enumerate() {
            if questions.len() >= k {
                break 'outer;
            }
            if cursors[pool_idx] < pool.len() {
                questions.push(pool[cursors[pool_idx]].clone());
                cursors[pool_idx] += 1;
                advanced = true;
            }
        }
        if !advanced {
            break;
        }
    }
    questions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::longhorizon::dialogue::generate_dialogue;

    #[test]
    fn generation_is_deterministic_for_fixed_ground_truth() {
        let gt = generate_dialogue(200, 11);
        let a = generate_questions(&gt, 30);
        let b = generate_questions(&gt, 30);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn every_question_carries_its_category_required_dimensions() {
        let gt = generate_dialogue(120, 5);
        for question in generate_questions(&gt, 20) {
            assert_eq!(question.dimensions, question.category.required_dimensions());
        }
    }

    #[test]
    fn never_returns_more_than_k_questions() {
        let gt = generate_dialogue(500, 3);
        let questions = generate_questions(&gt, 10);
        assert!(questions.len() <= 10);
    }

    #[test]
    fn temporal_evolution_turn_indices_include_every_superseded_turn() {
        let gt = generate_dialogue(400, 17);
        for question in generate_questions(&gt, 200) {
            if question.category == QuestionCategory::TemporalEvolution {
                assert!(question.turn_indices.len() >= 2);
            }
        }
    }
}
