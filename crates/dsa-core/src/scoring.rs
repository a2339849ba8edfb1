//! Quiz attempt grading.
//!
//! An attempt is graded against the canonical question set it was sampled
//! from. Every canonical question counts towards the total, so skipping a
//! question costs the same as answering it wrong.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::normalization::answers_match;

/// Passing percentage for card tests.
pub const CARD_TEST_PASSING_SCORE: i32 = 80;

/// Passing percentage used when a roadmap does not set its own.
pub const DEFAULT_PASSING_SCORE: i32 = 70;

/// The answer key for one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionKey {
    pub id: String,
    pub correct_answer: String,
    pub topic: String,
    #[serde(default)]
    pub resources: Vec<String>,
}

/// One answer as submitted by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedAnswer {
    pub question_id: String,
    pub answer: String,
}

/// Per-question outcome stored with the attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradedAnswer {
    pub question_id: String,
    pub selected_answer: Option<String>,
    pub correct_answer: String,
    pub is_correct: bool,
    pub topic: String,
    #[serde(default)]
    pub resources: Vec<String>,
}

/// Result of grading one attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptScore {
    pub score: i32,
    pub total_questions: i32,
    pub percentage: i32,
    pub passed: bool,
    pub answers: Vec<GradedAnswer>,
}

/// Correct/total tally for a single topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicBreakdown {
    pub topic: String,
    pub correct: i32,
    pub total: i32,
    pub percentage: i32,
}

/// A topic with at least one missed question, and what to read about it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeakTopic {
    pub topic: String,
    pub missed: i32,
    pub resources: Vec<String>,
}

/// Pick the passing threshold for an attempt.
///
/// Card tests always use [`CARD_TEST_PASSING_SCORE`]; regular quizzes use the
/// roadmap's own threshold or [`DEFAULT_PASSING_SCORE`].
pub fn pass_threshold(is_card_test: bool, roadmap_threshold: Option<i32>) -> i32 {
    if is_card_test {
        CARD_TEST_PASSING_SCORE
    } else {
        roadmap_threshold.unwrap_or(DEFAULT_PASSING_SCORE)
    }
}

/// `round(score / total * 100)`, or 0 for an empty set.
pub fn percentage(score: i32, total: i32) -> i32 {
    if total <= 0 {
        return 0;
    }
    (f64::from(score) / f64::from(total) * 100.0).round() as i32
}

/// Grade an attempt.
///
/// Answers for question ids that are not part of `questions` are ignored. If
/// an id is answered twice the last answer wins.
pub fn grade_attempt(
    questions: &[QuestionKey],
    answers: &[SubmittedAnswer],
    threshold: i32,
) -> AttemptScore {
    let submitted: HashMap<&str, &str> = answers
        .iter()
        .map(|a| (a.question_id.as_str(), a.answer.as_str()))
        .collect();

    let graded: Vec<GradedAnswer> = questions
        .iter()
        .map(|q| {
            let selected = submitted.get(q.id.as_str()).copied();
            GradedAnswer {
                question_id: q.id.clone(),
                selected_answer: selected.map(str::to_owned),
                correct_answer: q.correct_answer.clone(),
                is_correct: selected.is_some_and(|s| answers_match(s, &q.correct_answer)),
                topic: q.topic.clone(),
                resources: q.resources.clone(),
            }
        })
        .collect();

    let score = graded.iter().filter(|a| a.is_correct).count() as i32;
    let total_questions = graded.len() as i32;
    let percentage = percentage(score, total_questions);

    AttemptScore {
        score,
        total_questions,
        percentage,
        passed: percentage >= threshold,
        answers: graded,
    }
}

/// Tally graded answers per topic, weakest topic first.
pub fn topic_breakdown(answers: &[GradedAnswer]) -> Vec<TopicBreakdown> {
    let mut tally: BTreeMap<&str, (i32, i32)> = BTreeMap::new();
    for answer in answers {
        let entry = tally.entry(answer.topic.as_str()).or_default();
        entry.1 += 1;
        if answer.is_correct {
            entry.0 += 1;
        }
    }

    let mut breakdown: Vec<TopicBreakdown> = tally
        .into_iter()
        .map(|(topic, (correct, total))| TopicBreakdown {
            topic: topic.to_owned(),
            correct,
            total,
            percentage: percentage(correct, total),
        })
        .collect();

    // Stable sort keeps topics alphabetical within the same percentage
    breakdown.sort_by_key(|b| b.percentage);
    breakdown
}

/// Topics with missed questions, most missed first, with de-duplicated resources.
pub fn weak_topics(answers: &[GradedAnswer]) -> Vec<WeakTopic> {
    let mut topics: BTreeMap<&str, WeakTopic> = BTreeMap::new();
    for answer in answers.iter().filter(|a| !a.is_correct) {
        let weak = topics
            .entry(answer.topic.as_str())
            .or_insert_with(|| WeakTopic {
                topic: answer.topic.clone(),
                missed: 0,
                resources: Vec::new(),
            });
        weak.missed += 1;
        for resource in &answer.resources {
            if !weak.resources.contains(resource) {
                weak.resources.push(resource.clone());
            }
        }
    }

    let mut weak: Vec<WeakTopic> = topics.into_values().collect();
    weak.sort_by(|a, b| b.missed.cmp(&a.missed));
    weak
}
