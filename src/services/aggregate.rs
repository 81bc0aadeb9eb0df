// src/services/aggregate.rs

use std::collections::HashMap;

use crate::models::{
    export_row::{AggregatedRecord, QuestionDetail},
    subject::Subject,
    submission::{Score, Submission},
    test::{Test, TestId},
};

/// Subject id to name lookup, built once per export.
#[derive(Debug, Default)]
pub struct SubjectDirectory {
    names: HashMap<i64, String>,
}

impl SubjectDirectory {
    pub fn new(subjects: Vec<Subject>) -> Self {
        Self {
            names: subjects.into_iter().map(|s| (s.id, s.name)).collect(),
        }
    }

    /// Name of every referenced subject, in reference order. Unknown ids resolve to "".
    pub fn resolve(&self, ids: &[i64]) -> Vec<String> {
        ids.iter()
            .map(|id| self.names.get(id).cloned().unwrap_or_default())
            .collect()
    }
}

#[derive(Debug, Default)]
pub struct Aggregation {
    pub records: Vec<AggregatedRecord>,
    /// Answers or per-question scores missing from a present submission,
    /// filled with "" or 0.
    pub filled_gaps: usize,
}

/// Joins every test with its submission and subject names, keeping test order.
pub fn aggregate(
    tests: Vec<Test>,
    submissions: &[Submission],
    subjects: &SubjectDirectory,
) -> Aggregation {
    let mut by_test: HashMap<TestId, &Submission> = HashMap::new();
    for submission in submissions {
        // First match wins.
        by_test.entry(submission.test_id).or_insert(submission);
    }

    let mut aggregation = Aggregation::default();

    for test in tests {
        let submission = by_test.get(&test.id).copied();
        let (questions, gaps) = question_details(&test, submission);
        if gaps > 0 {
            tracing::warn!(
                "Test {}: filled {} missing answers/scores with defaults",
                test.id,
                gaps
            );
        }

        aggregation.filled_gaps += gaps;
        aggregation.records.push(AggregatedRecord {
            subject_names: subjects.resolve(&test.subjects),
            total_score: submission.map(|s| s.score.total()).unwrap_or(0.0),
            questions,
            test,
        });
    }

    aggregation
}

fn question_details(test: &Test, submission: Option<&Submission>) -> (Vec<QuestionDetail>, usize) {
    let mut gaps = 0;

    let details = test
        .questions
        .iter()
        .enumerate()
        .map(|(index, question)| {
            let (answer, score) = match submission {
                None => (String::new(), 0.0),
                Some(submission) => {
                    let answer = match submission.answers.get(index) {
                        Some(answer) => answer.clone(),
                        None => {
                            gaps += 1;
                            String::new()
                        }
                    };
                    let score = match &submission.score {
                        Score::Scalar(_) => 0.0,
                        Score::PerQuestion(scores) => match scores.get(index) {
                            Some(score) => *score,
                            None => {
                                gaps += 1;
                                0.0
                            }
                        },
                    };
                    (answer, score)
                }
            };

            QuestionDetail {
                number: index + 1,
                marks: question.marks,
                answer,
                score,
            }
        })
        .collect();

    (details, gaps)
}
