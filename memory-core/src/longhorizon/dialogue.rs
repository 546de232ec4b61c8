//! Deterministic, seed-reproducible long-horizon dialogue generation.
//! No LLM is used here: every turn is template-based, so the same
//! `(num_turns, seed)` pair always produces the same byte-identical
//! sequence and the same ground truth.

use crate::types::BlockName;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const ENTITIES: &[&str] = &[
    "server-alpha",
    "server-beta",
    "server-gamma",
    "server-delta",
    "server-epsilon",
];
const ATTRIBUTES: &[&str] = &["status", "owner", "region", "version"];
const STATUS_VALUES: &[&str] = &["healthy", "degraded", "offline", "maintenance"];
const OWNER_VALUES: &[&str] = &["team-atlas", "team-borealis", "team-cascade"];
const REGION_VALUES: &[&str] = &["us-east", "us-west", "eu-central", "ap-southeast"];
const SOURCE_LABELS: &[&str] = &[
    "monitoring-dashboard",
    "incident-report",
    "vendor-status-page",
    "on-call-handoff",
];

/// One fact delivered during the dialogue: an (entity, attribute,
/// value) triple, the source it was attributed to, and the turn it
/// was delivered in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fact {
    pub entity: String,
    pub attribute: String,
    pub value: String,
    pub source_label: String,
    pub turn_index: usize,
}

/// One turn of the generated dialogue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub index: usize,
    pub content: String,
    pub block_index: u8,
    pub block_name: BlockName,
    pub facts: Vec<Fact>,
}

/// Joins an `(entity, attribute)` pair into the string key used by
/// [`GroundTruth::current_values`]/[`GroundTruth::superseded_values`].
/// `HashMap` with a tuple key cannot round-trip through `serde_json`
/// (object keys must be strings), so the pair is flattened into one
/// string instead.
pub(super) fn composite_key(entity: &str, attribute: &str) -> String {
    format!("{entity}::{attribute}")
}

fn split_composite_key(key: &str) -> (&str, &str) {
    key.split_once("::").unwrap_or((key, ""))
}

/// The full turn sequence plus indexed views used by the quiz
/// generator and the evaluator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroundTruth {
    pub turns: Vec<Turn>,
    pub facts_by_entity: HashMap<String, Vec<Fact>>,
    pub current_values: HashMap<String, Fact>,
    pub superseded_values: HashMap<String, Vec<Fact>>,
}

impl GroundTruth {
    /// The value currently in force for `(entity, attribute)`, if any
    /// fact for that pair was ever delivered.
    #[must_use]
    pub fn current_value(&self, entity: &str, attribute: &str) -> Option<&Fact> {
        self.current_values.get(&composite_key(entity, attribute))
    }

    /// Every `(entity, attribute)` pair that has at least one
    /// superseded prior value, i.e. every temporal-evolution target.
    #[must_use]
    pub fn evolved_pairs(&self) -> Vec<(&str, &str)> {
        self.superseded_values
            .keys()
            .map(|key| split_composite_key(key))
            .collect()
    }
}

fn pick<'a, R: Rng>(rng: &mut R, pool: &[&'a str]) -> &'a str {
    pool[rng.gen_range(0..pool.len())]
}

fn values_for(attribute: &str) -> &'static [&'static str] {
    match attribute {
        "status" => STATUS_VALUES,
        "owner" => OWNER_VALUES,
        "region" => REGION_VALUES,
        "version" => &["v1.4.0", "v1.4.1", "v1.5.0", "v2.0.0"],
        _ => STATUS_VALUES,
    }
}

fn content_for_block(block: BlockName, entity: &str, attribute: &str, value: &str, source: &str) -> String {
    match block {
        BlockName::NeedleInHaystack => {
            format!("Buried in routine notes: {entity}'s {attribute} is {value}, per {source}.")
        }
        BlockName::TemporalEvolution => {
            format!("Update from {source}: {entity}'s {attribute} changed to {value}.")
        }
        BlockName::Contradictions => {
            format!("{source} reports that {entity}'s {attribute} is {value}.")
        }
        BlockName::Distractors => {
            "Unrelated aside: the cafeteria menu changed this week, unrelated to any tracked system."
                .to_string()
        }
        BlockName::CrossReference => {
            format!("{source} notes that {entity} is managed under the {attribute} value {value}.")
        }
        BlockName::NumericalPrecision => {
            format!("{source} measured {entity}'s {attribute} precisely as {value}.")
        }
        BlockName::SourceAttribution => {
            format!("According to {source}, {entity}'s {attribute} is {value}.")
        }
        BlockName::MetaMemory => {
            "Quick check-in: how much of the above are you confident you still remember?".to_string()
        }
    }
}

/// Generates `num_turns` turns deterministically from `seed`. Two
/// calls with the same `(num_turns, seed)` always return
/// byte-identical [`Turn`] content and an equal [`GroundTruth`].
#[must_use]
pub fn generate_dialogue(num_turns: usize, seed: u64) -> GroundTruth {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let blocks = BlockName::all();

    let mut turns = Vec::with_capacity(num_turns);
    let mut facts_by_entity: HashMap<String, Vec<Fact>> = HashMap::new();
    let mut current_values: HashMap<String, Fact> = HashMap::new();
    let mut superseded_values: HashMap<String, Vec<Fact>> = HashMap::new();

    for index in 0..num_turns {
        let block_name = blocks[index % blocks.len()];
        let block_index = (index % blocks.len()) as u8 + 1;

        let delivers_fact = !matches!(block_name, BlockName::Distractors | BlockName::MetaMemory);

        let (content, facts) = if delivers_fact {
            let entity = pick(&mut rng, ENTITIES).to_string();
            let attribute = pick(&mut rng, ATTRIBUTES).to_string();
            let value = pick(&mut rng, values_for(&attribute)).to_string();
            let source = pick(&mut rng, SOURCE_LABELS).to_string();

            let content = content_for_block(block_name, &entity, &attribute, &value, &source);
            let fact = Fact {
                entity: entity.clone(),
                attribute: attribute.clone(),
                value: value.clone(),
                source_label: source,
                turn_index: index,
            };

            facts_by_entity.entry(entity.clone()).or_default().push(fact.clone());

            let key = composite_key(&entity, &attribute);
            if let Some(previous) = current_values.insert(key.clone(), fact.clone()) {
                superseded_values.entry(key).or_default().push(previous);
            }

            (content, vec![fact])
        } else {
            let entity = pick(&mut rng, ENTITIES);
            let attribute = pick(&mut rng, ATTRIBUTES);
            let value = pick(&mut rng, values_for(attribute));
            let source = pick(&mut rng, SOURCE_LABELS);
            (content_for_block(block_name, entity, attribute, value, source), vec![])
        };

        turns.push(Turn {
            index,
            content,
            block_index,
            block_name,
            facts,
        });
    }

    GroundTruth {
        turns,
        facts_by_entity,
        current_values,
        superseded_values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_and_turn_count_is_byte_identical() {
        let a = generate_dialogue(64, 7);
        let b = generate_dialogue(64, 7);
        let a_json = serde_json::to_string(&a.turns).unwrap();
        let b_json = serde_json::to_string(&b.turns).unwrap();
        assert_eq!(a_json, b_json);
    }

    #[test]
    fn different_seeds_diverge() {
        let a = generate_dialogue(64, 1);
        let b = generate_dialogue(64, 2);
        let a_json = serde_json::to_string(&a.turns).unwrap();
        let b_json = serde_json::to_string(&b.turns).unwrap();
        assert_ne!(a_json, b_json);
    }

    #[test]
    fn every_delivered_fact_is_indexed_by_entity() {
        let gt = generate_dialogue(40, 42);
        for turn in &gt.turns {
            for fact in &turn.facts {
                let indexed = gt
                    .facts_by_entity
                    .get(&fact.entity)
                    .expect("entity present in index");
                assert!(indexed.contains(fact));
            }
        }
    }

    #[test]
    fn current_value_is_the_last_delivered_in_temporal_order() {
        let gt = generate_dialogue(200, 99);
        for (entity, attribute) in gt.evolved_pairs() {
            let current = gt.current_value(entity, attribute).unwrap();
            let latest_turn_index = gt
                .facts_by_entity[entity]
                .iter()
                .filter(|f| f.attribute == attribute)
                .map(|f| f.turn_index)
                .max()
                .unwrap();
            assert_eq!(current.turn_index, latest_turn_index);
        }
    }

    #[test]
    fn distractor_and_metamemory_turns_deliver_no_facts() {
        let gt = generate_dialogue(16, 3);
        for turn in &gt.turns {
            if matches!(turn.block_name, BlockName::Distractors | BlockName::MetaMemory) {
                assert!(turn.facts.is_empty());
            }
        }
    }
}
