//! Quiz grading and the per-test difficulty heuristic.
//!
//! Grading is forgiving by design: a submitted pair that references a
//! question or answer the test does not have simply counts as incorrect.
//! The client is never required to cover every question; `total` is always
//! the question count of the test at submission time.

use crate::db::models::QuestionDetail;
use crate::models::SubmittedAnswer;
use crate::names;

/// Correctness snapshot persisted per submitted answer.
#[derive(Clone, Copy)]
pub struct AnswerRecord {
    pub question_id: i64,
    pub answer_id: i64,
    pub is_correct: bool,
}

pub struct Grading {
    pub score: i64,
    pub total: i64,
    pub records: Vec<AnswerRecord>,
}

/// One historical result, reduced to what the difficulty estimate needs.
#[derive(Clone, Copy)]
pub struct ResultSummary {
    pub score: i64,
    pub total: i64,
}

pub fn grade(questions: &[QuestionDetail], submitted: &[SubmittedAnswer]) -> Grading {
    let total = questions.len() as i64;
    let mut score = 0;

    let records = submitted
        .iter()
        .map(|answer| {
            let is_correct = questions
                .iter()
                .find(|q| q.id == answer.question_id)
                .and_then(|q| q.answers.iter().find(|a| a.id == answer.answer_id))
                .is_some_and(|a| a.is_correct);
            if is_correct {
                score += 1;
            }
            AnswerRecord {
                question_id: answer.question_id,
                answer_id: answer.answer_id,
                is_correct,
            }
        })
        .collect();

    Grading {
        score,
        total,
        records,
    }
}

/// Share of the test people get wrong on average: 1 - mean(score/total).
pub fn average_fail_rate(results: &[ResultSummary]) -> f64 {
    if results.is_empty() {
        return 0.0;
    }
    let mean = results
        .iter()
        .map(|r| r.score as f64 / r.total as f64)
        .sum::<f64>()
        / results.len() as f64;
    1.0 - mean
}

/// 1-5 rating blending question count and historical fail rate. `None` until
/// the test has accumulated more than `DIFFICULTY_MIN_RESULTS` results; too
/// few submissions make the fail rate meaningless.
pub fn difficulty(question_count: i64, results: &[ResultSummary]) -> Option<i64> {
    if results.len() <= names::DIFFICULTY_MIN_RESULTS {
        return None;
    }
    let raw = question_count as f64 / names::DIFFICULTY_QUESTION_DIVISOR
        + average_fail_rate(results) * names::DIFFICULTY_FAIL_WEIGHT;
    Some(
        raw.round()
            .clamp(names::DIFFICULTY_FLOOR, names::DIFFICULTY_CEILING) as i64,
    )
}
