//! Static test-level registry (L1-L12 plus the teacher-student L7).
//!
//! No I/O: this module is a declarative library of articles and
//! questions. It is the source of truth for what each level tests; a
//! custom level must reuse [`TestArticle`]/[`TestQuestion`]/[`TestLevel`]
//! and the closed [`ReasoningType`] vocabulary rather than inventing new
//! shapes.

use crate::types::{ArticlePhase, ReasoningType, TestArticle, TestLevel, TestQuestion};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::LazyLock;

fn dt(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .expect("catalog timestamps are authored constants")
        .with_timezone(&Utc)
}

fn article(title: &str, content: &str, url: &str, published: &str) -> TestArticle {
    TestArticle {
        title: title.to_string(),
        content: content.to_string(),
        url: url.to_string(),
        published: dt(published),
        phase: None,
        metadata: HashMap::new(),
    }
}

fn article_phase(
    title: &str,
    content: &str,
    url: &str,
    published: &str,
    phase: ArticlePhase,
) -> TestArticle {
    let mut a = article(title, content, url, published);
    a.phase = Some(phase);
    a
}

fn question(q: &str, expected: &str, level: &str, reasoning_type: ReasoningType) -> TestQuestion {
    TestQuestion {
        question: q.to_string(),
        expected_answer: expected.to_string(),
        level: level.to_string(),
        reasoning_type,
    }
}

fn level_1() -> TestLevel {
    TestLevel {
        level_id: "L1".into(),
        level_name: "Single Source Direct Recall".into(),
        description: "Simplest test - direct fact retrieval from one source".into(),
        articles: vec![article(
            "2026 Winter Olympics Medal Update - February 15",
            "As of February 15, 2026, the Milan-Cortina Winter Olympics medal standings show: \
             Norway leads with 26 total medals (12 gold, 8 silver, 6 bronze). \
             Italy is in second place with 22 total medals (8 gold, 7 silver, 7 bronze). \
             The United States has 17 medals (5 gold, 6 silver, 6 bronze). \
             Germany has 14 medals (4 gold, 5 silver, 5 bronze). \
             Sweden has 11 medals (3 gold, 4 silver, 4 bronze). \
             The Games continue through February 21, 2026.",
            "https://olympics.example.com/2026/medals/feb15",
            "2026-02-15T18:00:00Z",
        )],
        questions: vec![
            question(
                "How many total medals does Norway have as of February 15?",
                "26 total medals (12 gold, 8 silver, 6 bronze)",
                "L1",
                ReasoningType::DirectRecall,
            ),
            question(
                "Which country is in second place?",
                "Italy with 22 total medals",
                "L1",
                ReasoningType::DirectRecall,
            ),
            question(
                "When do the 2026 Winter Olympics end?",
                "February 21, 2026",
                "L1",
                ReasoningType::DirectRecall,
            ),
        ],
        requires_temporal_ordering: false,
        requires_update_handling: false,
    }
}

fn multi_source_articles() -> Vec<TestArticle> {
    vec![
        article(
            "2026 Winter Olympics Medal Standings - February 15",
            "As of February 15, Norway leads the 2026 Milan Winter Olympics with 26 total medals and 12 golds. \
             Italy is second with 22 medals and 8 golds. The United States has 17 medals with 5 golds. \
             Germany has 14 medals with 4 golds. Sweden has 11 medals with 3 golds.",
            "https://olympics.example.com/2026/standings-feb15",
            "2026-02-15T18:00:00Z",
        ),
        article(
            "Individual Athlete Achievements at Milan 2026",
            "Johannes Klaebo of Norway won his 9th career Olympic gold medal in the cross-country skiing relay event. \
             Federica Brignone of Italy won the giant slalom gold at her home Olympics, a historic achievement. \
             Lisa Vittozzi of Italy captured the biathlon pursuit gold medal with a stunning performance. \
             Femke Kok of the Netherlands set an Olympic record of 36.49 seconds in the 500m speed skating event.",
            "https://olympics.example.com/2026/athletes",
            "2026-02-15T20:00:00Z",
        ),
        article(
            "Historical Context of Milan-Cortina 2026",
            "The 2026 Winter Olympics in Milan-Cortina are the first Winter Olympics held in Italy since the 1956 Cortina Games, \
             marking a 70-year gap. Italy's current tally of 8 gold medals already surpasses their previous best performance of \
             5 gold medals achieved at the 2006 Turin Games. Norway continues their tradition as the all-time leader in \
             Winter Olympic medals, with their Milan 2026 performance reinforcing this dominance.",
            "https://olympics.example.com/2026/history",
            "2026-02-14T12:00:00Z",
        ),
    ]
}

fn level_2() -> TestLevel {
    TestLevel {
        level_id: "L2".into(),
        level_name: "Multi-Source Synthesis".into(),
        description: "Requires combining information from multiple articles".into(),
        articles: multi_source_articles(),
        questions: vec![
            question(
                "How does Italy's 2026 gold medal performance compare to their previous best?",
                "Italy has 8 golds in 2026, surpassing their previous best of 5 golds from 2006 Turin",
                "L2",
                ReasoningType::CrossSourceSynthesis,
            ),
            question(
                "Which country's individual athletes won the most medals mentioned in the athlete achievements article?",
                "Italy with 2 athletes mentioned (Federica Brignone and Lisa Vittozzi)",
                "L2",
                ReasoningType::CrossSourceSynthesis,
            ),
            question(
                "What makes the 2026 Olympics historically significant for Italy?",
                "First Winter Olympics in Italy since 1956 (70-year gap) and Italy already exceeded their previous best gold medal count",
                "L2",
                ReasoningType::CrossSourceSynthesis,
            ),
        ],
        requires_temporal_ordering: false,
        requires_update_handling: false,
    }
}

fn level_3() -> TestLevel {
    TestLevel {
        level_id: "L3".into(),
        level_name: "Temporal Reasoning".into(),
        description: "Requires tracking changes over time and computing differences".into(),
        articles: vec![
            article(
                "Medal Standings After Day 7 - February 13",
                "After Day 7 of competition (February 13), Norway leads with 18 total medals and 8 golds. \
                 Italy has 14 total medals and 5 golds. The United States has 12 medals and 4 golds. \
                 Germany has 10 medals and 3 golds.",
                "https://olympics.example.com/2026/day7",
                "2026-02-13T20:00:00Z",
            ),
            article(
                "Medal Standings After Day 9 - February 15",
                "After Day 9 of competition (February 15), Norway has 26 total medals and 12 golds. \
                 Italy has 22 total medals and 8 golds. The United States has 17 medals and 5 golds. \
                 Germany has 14 medals and 4 golds.",
                "https://olympics.example.com/2026/day9",
                "2026-02-15T20:00:00Z",
            ),
            article(
                "Medal Standings After Day 10 - February 16",
                "After Day 10 of competition (February 16), Norway has 28 total medals and 13 golds. \
                 Italy has 24 total medals and 9 golds. The United States has 19 medals and 6 golds. \
                 Germany has 15 medals and 5 golds.",
                "https://olympics.example.com/2026/day10",
                "2026-02-16T20:00:00Z",
            ),
        ],
        questions: vec![
            question(
                "How many medals did Norway win between Day 7 and Day 9?",
                "8 medals (from 18 to 26)",
                "L3",
                ReasoningType::TemporalDifference,
            ),
            question(
                "Which country improved their gold medal count the most from Day 7 to Day 10?",
                "Norway improved most with +5 golds (8 to 13), followed by Italy +4 (5 to 9) and US +2 (4 to 6)",
                "L3",
                ReasoningType::TemporalComparison,
            ),
            question(
                "Describe the trend in Italy's gold medal performance over the three days",
                "Italy showed acceleration: +3 golds Day 7-9, then +1 gold Day 9-10, gaining 4 golds total",
                "L3",
                ReasoningType::TemporalTrend,
            ),
        ],
        requires_temporal_ordering: true,
        requires_update_handling: false,
    }
}

fn level_4() -> TestLevel {
    TestLevel {
        level_id: "L4".into(),
        level_name: "Procedural Learning".into(),
        description: "Learning and applying step-by-step procedures".into(),
        articles: vec![article(
            "Complete Flutter Development Setup Guide",
            "Setting up a Flutter development environment follows these steps:\n\n\
             Step 1: Install Flutter SDK by downloading from flutter.dev and adding to PATH.\n\
             Step 2: Verify installation by running 'flutter doctor' to check all dependencies.\n\
             Step 3: Create a new project with 'flutter create my_app'.\n\
             Step 4: Navigate to project directory with 'cd my_app'.\n\
             Step 5: Run the app with 'flutter run' (requires emulator or physical device).\n\
             Step 6: Edit lib/main.dart to customize your application.\n\
             Step 7: Add dependencies to pubspec.yaml under the dependencies section.\n\
             Step 8: Run 'flutter pub get' to install the dependencies.\n\
             Step 9: Test your code with 'flutter test'.\n\n\
             Common issues:\n\
             - If flutter doctor shows issues with Android SDK, install Android Studio.\n\
             - If you see version conflicts, run 'flutter upgrade' first.\n\
             - If pub get fails, try 'flutter pub cache repair'.\n\
             - For iOS development, you need Xcode installed (macOS only).",
            "https://flutter-guide.example.com/setup-2026",
            "2026-02-10T10:00:00Z",
        )],
        questions: vec![
            question(
                "What command creates a new Flutter project?",
                "flutter create my_app (or flutter create <project_name>)",
                "L4",
                ReasoningType::ProceduralRecall,
            ),
            question(
                "What should you do if flutter doctor shows version conflicts?",
                "Run 'flutter upgrade' first",
                "L4",
                ReasoningType::ProceduralTroubleshooting,
            ),
            question(
                "Describe the complete workflow from creating a project to running tests",
                "1. flutter create my_app, 2. cd my_app, 3. edit lib/main.dart, \
                 4. add dependencies to pubspec.yaml, 5. flutter pub get, 6. flutter test",
                "L4",
                ReasoningType::ProceduralSequence,
            ),
            question(
                "If I want to create a project called 'weather_app' and add the http package, what exact commands would I run?",
                "1. flutter create weather_app, 2. cd weather_app, \
                 3. Add 'http: ^1.0.0' to pubspec.yaml dependencies, 4. flutter pub get",
                "L4",
                ReasoningType::ProceduralApplication,
            ),
        ],
        requires_temporal_ordering: false,
        requires_update_handling: false,
    }
}

fn level_5() -> TestLevel {
    TestLevel {
        level_id: "L5".into(),
        level_name: "Contradiction Handling".into(),
        description: "Detecting and reasoning about conflicting information".into(),
        articles: vec![
            article(
                "Record Viewership for 2026 Winter Olympics Opening Ceremony",
                "The 2026 Winter Olympics opening ceremony in Milan was watched by an estimated 1.2 billion viewers worldwide, \
                 according to preliminary data from the International Olympic Committee. This makes it the most-watched Winter Olympics \
                 opening ceremony in history, surpassing the previous record of 900 million viewers for the 2022 Beijing Games. \
                 The ceremony featured spectacular performances showcasing Italian culture and technology.",
                "https://olympic-news-a.example.com/viewership-record",
                "2026-02-08T09:00:00Z",
            ),
            article(
                "Milan 2026 Opening Ceremony Viewership Analysis",
                "Viewership data for the 2026 Milan Olympics opening ceremony compiled by independent media analysts shows \
                 approximately 800 million viewers tuned in globally. This represents a decline from the 2022 Beijing Games which \
                 attracted 900 million viewers. The decrease is attributed to changing viewing habits and increased fragmentation \
                 across streaming platforms. However, digital engagement metrics showed record social media interactions during the event.",
                "https://media-analytics.example.com/olympics-2026",
                "2026-02-09T14:00:00Z",
            ),
        ],
        questions: vec![
            question(
                "How many people watched the 2026 opening ceremony?",
                "There are conflicting reports: IOC estimates 1.2 billion viewers, \
                 while independent analysts report 800 million viewers",
                "L5",
                ReasoningType::ContradictionDetection,
            ),
            question(
                "Why might the two sources disagree about viewership numbers?",
                "Different measurement methodologies (IOC preliminary data vs independent analysts), \
                 different counting methods (traditional TV only vs including streaming), \
                 or different time windows measured",
                "L5",
                ReasoningType::ContradictionReasoning,
            ),
            question(
                "Which viewership figure would you consider more reliable and why?",
                "Independent analysts (800M) may be more reliable because they explicitly mention methodology \
                 and account for fragmentation across platforms, while IOC figure is 'preliminary' and may have \
                 organizational bias toward reporting higher numbers",
                "L5",
                ReasoningType::SourceCredibility,
            ),
        ],
        requires_temporal_ordering: false,
        requires_update_handling: false,
    }
}

fn level_6() -> TestLevel {
    TestLevel {
        level_id: "L6".into(),
        level_name: "Incremental Learning".into(),
        description: "Update knowledge when new information arrives".into(),
        articles: vec![
            article_phase(
                "Johannes Klaebo Makes Olympic History - February 15",
                "As of February 15, 2026, Johannes Klaebo has won 9 Olympic gold medals, making him the most decorated \
                 Winter Olympian in history. The Norwegian cross-country skier achieved this milestone after winning the \
                 team relay event. His previous record was 8 golds, which he shared with Bjorn Daehlie. Klaebo still has \
                 one more event remaining: the individual sprint on February 17.",
                "https://olympics.example.com/klaebo-record-feb15",
                "2026-02-15T17:00:00Z",
                ArticlePhase::Initial,
            ),
            article_phase(
                "Klaebo Extends Record with 10th Gold - February 17",
                "Update: On February 17, 2026, Johannes Klaebo won his 10th Olympic gold medal in the individual sprint event, \
                 extending his own record as the most decorated Winter Olympian ever. The victory was particularly dominant, \
                 with Klaebo finishing 2.3 seconds ahead of his nearest competitor. This caps off an extraordinary Olympics for \
                 the 29-year-old Norwegian, who now has 10 golds across three Olympic Games (2018, 2022, 2026).",
                "https://olympics.example.com/klaebo-10th-gold",
                "2026-02-17T16:30:00Z",
                ArticlePhase::Update,
            ),
        ],
        questions: vec![
            question(
                "How many Olympic gold medals does Johannes Klaebo have?",
                "10 Olympic gold medals (as of February 17, 2026)",
                "L6",
                ReasoningType::IncrementalUpdate,
            ),
            question(
                "How did Klaebo's record change between February 15 and February 17?",
                "Increased from 9 to 10 golds after winning the individual sprint on February 17",
                "L6",
                ReasoningType::IncrementalTracking,
            ),
            question(
                "Describe Klaebo's complete Olympic achievement trajectory",
                "Tied record at 8 golds with Bjorn Daehlie, broke record with 9th gold in relay (Feb 15), \
                 extended record to 10 golds in sprint (Feb 17). Has competed across 3 Olympics (2018, 2022, 2026)",
                "L6",
                ReasoningType::IncrementalSynthesis,
            ),
        ],
        requires_temporal_ordering: false,
        requires_update_handling: true,
    }
}

fn level_7() -> TestLevel {
    TestLevel {
        level_id: "L7".into(),
        level_name: "Teacher-Student Knowledge Transfer".into(),
        description: "Teacher agent learns content, teaches student agent, student answers questions".into(),
        articles: multi_source_articles(),
        questions: vec![
            question(
                "How many total medals does Norway have in the 2026 Olympics?",
                "26 total medals (12 gold)",
                "L7",
                ReasoningType::KnowledgeTransferRecall,
            ),
            question(
                "Which Italian athletes won gold medals at the 2026 Olympics?",
                "Federica Brignone (giant slalom) and Lisa Vittozzi (biathlon pursuit)",
                "L7",
                ReasoningType::KnowledgeTransferRecall,
            ),
            question(
                "How does Italy's 2026 performance compare to their previous best?",
                "Italy has 8 golds in 2026, surpassing their previous best of 5 golds from 2006 Turin",
                "L7",
                ReasoningType::KnowledgeTransferSynthesis,
            ),
            question(
                "What makes the 2026 Olympics historically significant for Italy?",
                "First Winter Olympics in Italy since 1956 (70-year gap) and Italy exceeded their previous best gold medal count",
                "L7",
                ReasoningType::KnowledgeTransferSynthesis,
            ),
        ],
        requires_temporal_ordering: false,
        requires_update_handling: false,
    }
}

fn level_8() -> TestLevel {
    TestLevel {
        level_id: "L8".into(),
        level_name: "Metacognition".into(),
        description: "Judging the agent's own confidence and search effort rather than the facts themselves".into(),
        articles: vec![article(
            "Curling Mixed Doubles Bracket - February 11",
            "The mixed doubles curling bracket at Milan-Cortina 2026 narrowed to four teams after the quarterfinals on February 11. \
             Norway and Italy advanced from Pool A; Sweden and Canada advanced from Pool B. Semifinal pairings have not yet been \
             announced and will depend on a tiebreaker match scheduled for February 12.",
            "https://olympics.example.com/2026/curling-feb11",
            "2026-02-11T21:00:00Z",
        )],
        questions: vec![
            question(
                "Who won the mixed doubles curling gold medal?",
                "Not yet determined at the time of the article; only the semifinal field (Norway, Italy, Sweden, Canada) is known, pending a tiebreaker",
                "L8",
                ReasoningType::Metacognitive,
            ),
            question(
                "How confident are you in naming the four semifinal teams, and why?",
                "High confidence — the article states Norway, Italy, Sweden, and Canada advanced to the semifinals directly",
                "L8",
                ReasoningType::Metacognitive,
            ),
        ],
        requires_temporal_ordering: false,
        requires_update_handling: false,
    }
}

fn level_9() -> TestLevel {
    TestLevel {
        level_id: "L9".into(),
        level_name: "Causal Reasoning".into(),
        description: "Explaining why an observed outcome happened, not merely what happened".into(),
        articles: vec![article(
            "Norway's Cross-Country Dominance Explained",
            "Sports analysts attribute Norway's commanding lead in cross-country skiing medals to three factors: a decade-long \
             investment in youth ski academies, an altitude-training program at Seiser Alm that Norwegian skiers began using \
             exclusively starting in 2019, and a rule change in 2024 that favored the classic-technique specialists Norway had \
             already been developing. Rival federations have called for the rule to be revisited after the Games.",
            "https://olympics.example.com/2026/norway-analysis",
            "2026-02-16T09:00:00Z",
        )],
        questions: vec![
            question(
                "Why has Norway dominated cross-country skiing at these Games?",
                "Three causes: long-term youth academy investment, exclusive altitude training at Seiser Alm since 2019, and a 2024 rule change favoring classic-technique specialists Norway had already developed",
                "L9",
                ReasoningType::CausalReasoning,
            ),
            question(
                "What is the connection between the 2024 rule change and Norway's medal count?",
                "The rule change favored classic-technique skiing, a style Norway had already invested in developing, giving Norwegian skiers an advantage rivals did not have time to match",
                "L9",
                ReasoningType::CausalReasoning,
            ),
        ],
        requires_temporal_ordering: false,
        requires_update_handling: false,
    }
}

fn level_10() -> TestLevel {
    TestLevel {
        level_id: "L10".into(),
        level_name: "Counterfactual Reasoning".into(),
        description: "Reasoning about a hypothetical that did not occur".into(),
        articles: vec![article(
            "Germany's Near-Miss in the Four-Man Bobsled",
            "Germany finished fourth in the four-man bobsled by 0.03 seconds, narrowly missing bronze. A piloting error in the \
             final turn of their last run cost an estimated 0.15 seconds, more than enough to have closed the gap. Without that \
             error, Germany's time would have beaten the bronze-medal run by Sweden.",
            "https://olympics.example.com/2026/bobsled-four-man",
            "2026-02-19T22:00:00Z",
        )],
        questions: vec![
            question(
                "If Germany had not made the piloting error in the final turn, what likely would have happened?",
                "Germany would likely have won the bronze medal instead of Sweden, since the estimated 0.15-second cost of the error exceeds the 0.03-second margin to bronze",
                "L10",
                ReasoningType::Counterfactual,
            ),
            question(
                "Without any piloting error, would Germany still have finished fourth?",
                "No — correcting the error would have given Germany a faster time than Sweden's bronze-medal run",
                "L10",
                ReasoningType::Counterfactual,
            ),
        ],
        requires_temporal_ordering: false,
        requires_update_handling: false,
    }
}

fn level_11() -> TestLevel {
    TestLevel {
        level_id: "L11".into(),
        level_name: "Novel Skill Application".into(),
        description: "Applying a taught procedure to a materially new situation not covered verbatim by the source".into(),
        articles: vec![article(
            "Scoring Guide for Olympic Figure Skating Short Programs",
            "Short program scores combine a Technical Element Score (TES) and a Program Component Score (PCS). TES sums each \
             element's base value plus Grade of Execution (GOE), where GOE ranges from -5 to +5 per element. PCS is the average \
             of five component marks (skating skills, transitions, performance, composition, interpretation) each scored 0-10 \
             and then scaled by a fixed factor for the short program. The final segment score is TES plus scaled PCS, minus any \
             deductions for falls or time violations.",
            "https://olympics.example.com/2026/figure-skating-scoring",
            "2026-02-05T08:00:00Z",
        )],
        questions: vec![
            question(
                "A skater in the free skate (not the short program) falls once (-1.0 deduction), has a TES of 62.0 built from elements with positive GOE, and five PCS marks averaging 8.0 scaled by a free-skate factor of 2.0. Using the same scoring structure, what is the segment score?",
                "TES (62.0) + scaled PCS (8.0 x 2.0 = 16.0) - deduction (1.0) = 77.0",
                "L11",
                ReasoningType::NovelSkillApplication,
            ),
        ],
        requires_temporal_ordering: false,
        requires_update_handling: false,
    }
}

fn level_12() -> TestLevel {
    TestLevel {
        level_id: "L12".into(),
        level_name: "Far Transfer".into(),
        description: "Transferring a learned pattern to an unrelated domain with no surface similarity to the source".into(),
        articles: vec![article(
            "Why Norway's Funding Model Produces Depth, Not Just Stars",
            "Norway's Olympic committee funds winter sports clubs at the grassroots level rather than concentrating funding on \
             already-elite athletes. The logic: broad, sustained investment across many participants produces a wider base from \
             which a few will emerge as world-class, and the wider base also means the program survives any single athlete's \
             retirement or injury. Norway's cross-country and biathlon programs, which fund hundreds of club-level skiers, have \
             produced medal depth that outlasts any individual star.",
            "https://olympics.example.com/2026/norway-funding-model",
            "2026-02-18T10:00:00Z",
        )],
        questions: vec![
            question(
                "A software company wants durable engineering output instead of dependence on one or two star engineers. Using the same reasoning as Norway's funding model, what staffing approach should it take and why?",
                "Invest broadly in training and mentoring many engineers rather than concentrating resources on a few senior stars, because a wide base both produces more future top performers and keeps output resilient if any single engineer leaves",
                "L12",
                ReasoningType::FarTransfer,
            ),
        ],
        requires_temporal_ordering: false,
        requires_update_handling: false,
    }
}

/// Levels L1 through L12, in catalog order (L7 included — callers
/// filtering to the standard progressive run select `L1..L6` explicitly
/// rather than relying on list position).
static LEVELS: LazyLock<Vec<TestLevel>> = LazyLock::new(|| {
    vec![
        level_1(),
        level_2(),
        level_3(),
        level_4(),
        level_5(),
        level_6(),
        level_7(),
        level_8(),
        level_9(),
        level_10(),
        level_11(),
        level_12(),
    ]
});

/// The standard L1-L6 progressive sequence.
#[must_use]
pub fn standard_levels() -> Vec<TestLevel> {
    LEVELS
        .iter()
        .filter(|l| matches!(l.level_id.as_str(), "L1" | "L2" | "L3" | "L4" | "L5" | "L6"))
        .cloned()
        .collect()
}

/// The teacher-student transfer level.
#[must_use]
pub fn teacher_student_levels() -> Vec<TestLevel> {
    LEVELS
        .iter()
        .filter(|l| l.level_id == "L7")
        .cloned()
        .collect()
}

/// The extended cognitive levels L8-L12.
#[must_use]
pub fn extended_levels() -> Vec<TestLevel> {
    LEVELS
        .iter()
        .filter(|l| matches!(l.level_id.as_str(), "L8" | "L9" | "L10" | "L11" | "L12"))
        .cloned()
        .collect()
}

/// Full ordered catalog, L1 through L12.
#[must_use]
pub fn all_levels() -> Vec<TestLevel> {
    LEVELS.clone()
}

/// Look up a level by id, searching the full catalog.
#[must_use]
pub fn get_level_by_id(level_id: &str) -> Option<TestLevel> {
    LEVELS.iter().find(|l| l.level_id == level_id).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_twelve_levels() {
        assert_eq!(all_levels().len(), 12);
    }

    #[test]
    fn standard_levels_are_l1_through_l6_in_order() {
        let ids: Vec<_> = standard_levels().iter().map(|l| l.level_id.clone()).collect();
        assert_eq!(ids, vec!["L1", "L2", "L3", "L4", "L5", "L6"]);
    }

    #[test]
    fn l6_requires_update_handling_and_partitions_articles() {
        let l6 = get_level_by_id("L6").unwrap();
        assert!(l6.requires_update_handling);
        assert_eq!(l6.initial_articles().len(), 1);
        assert_eq!(l6.update_articles().len(), 1);
    }

    #[test]
    fn l3_requires_temporal_ordering() {
        let l3 = get_level_by_id("L3").unwrap();
        assert!(l3.requires_temporal_ordering);
        assert_eq!(l3.articles.len(), 3);
    }

    #[test]
    fn unknown_level_id_returns_none() {
        assert!(get_level_by_id("L99").is_none());
    }

    #[test]
    fn every_question_level_matches_its_level_id() {
        for level in all_levels() {
            for q in &level.questions {
                assert_eq!(q.level, level.level_id);
            }
        }
    }
}
