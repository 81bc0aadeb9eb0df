// src/models/export_row.rs

use serde::Serialize;

use crate::models::test::Test;

/// One question of an aggregated test, paired with the submission's answer and score.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionDetail {
    /// 1-based position within the test.
    pub number: usize,
    pub marks: f64,
    pub answer: String,
    pub score: f64,
}

/// A test merged with its submission and resolved subject names.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedRecord {
    pub test: Test,
    /// One entry per subject reference of the test; unknown ids are empty strings.
    pub subject_names: Vec<String>,
    pub total_score: f64,
    pub questions: Vec<QuestionDetail>,
}

/// A row of `completed_tests.csv`. Field order is the column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRow {
    #[serde(rename = "Test Title")]
    pub title: String,
    #[serde(rename = "Test Status")]
    pub status: String,
    #[serde(rename = "Max Marks")]
    pub max_marks: String,
    #[serde(rename = "Subjects")]
    pub subjects: String,
    #[serde(rename = "Score")]
    pub score: String,
    #[serde(rename = "Questions")]
    pub questions: usize,
}

/// A row of the per-question export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionRow {
    #[serde(rename = "Test Title")]
    pub title: String,
    #[serde(rename = "Question Number")]
    pub number: usize,
    #[serde(rename = "Marks")]
    pub marks: String,
    #[serde(rename = "Student Answer")]
    pub answer: String,
    #[serde(rename = "Score")]
    pub score: String,
}

/// Column names of `completed_tests.csv`.
pub const EXPORT_HEADER: [&str; 6] = [
    "Test Title",
    "Test Status",
    "Max Marks",
    "Subjects",
    "Score",
    "Questions",
];

/// Column names of the per-question export.
pub const QUESTION_HEADER: [&str; 5] = [
    "Test Title",
    "Question Number",
    "Marks",
    "Student Answer",
    "Score",
];
