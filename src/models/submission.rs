// src/models/submission.rs

use serde::{Deserialize, Serialize};

use crate::models::test::TestId;

/// Score recorded on an answer sheet.
///
/// Stored as JSON: either a single number or an array of per-question numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Score {
    Scalar(f64),
    PerQuestion(Vec<f64>),
}

impl Score {
    /// Total score: the scalar itself, or the sum of all per-question scores.
    pub fn total(&self) -> f64 {
        match self {
            Score::Scalar(value) => *value,
            Score::PerQuestion(scores) => scores.iter().fold(0.0, |acc, score| acc + score),
        }
    }
}

/// A completed answer sheet of one user for one test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub test_id: TestId,

    /// Student answers, positionally aligned with the test's questions.
    pub answers: Vec<String>,

    pub score: Score,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_question_total_is_sum() {
        assert_eq!(Score::PerQuestion(vec![2.0, 1.0, 0.5]).total(), 3.5);
        assert_eq!(Score::PerQuestion(vec![]).total(), 0.0);
    }

    #[test]
    fn empty_per_question_total_is_positive_zero() {
        assert!(Score::PerQuestion(vec![]).total().is_sign_positive());
    }

    #[test]
    fn scalar_total_is_value() {
        assert_eq!(Score::Scalar(7.0).total(), 7.0);
    }

    #[test]
    fn score_deserializes_from_number_or_array() {
        let scalar: Score = serde_json::from_str("4").unwrap();
        assert_eq!(scalar, Score::Scalar(4.0));

        let list: Score = serde_json::from_str("[1, 2.5]").unwrap();
        assert_eq!(list, Score::PerQuestion(vec![1.0, 2.5]));
    }
}
