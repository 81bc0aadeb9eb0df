// src/services/rows.rs

use crate::models::export_row::{AggregatedRecord, ExportRow, QuestionRow};

/// Shortest decimal form: `3.0` prints as `3`, `2.5` as `2.5`. Signed zero prints as `0`.
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    value.to_string()
}

pub fn build_rows(records: &[AggregatedRecord]) -> Vec<ExportRow> {
    records
        .iter()
        .map(|record| ExportRow {
            title: record.test.title.clone().unwrap_or_default(),
            status: record
                .test
                .status
                .map(|status| status.to_string())
                .unwrap_or_default(),
            max_marks: format_number(record.test.max_marks),
            subjects: record.subject_names.join(", "),
            score: format_number(record.total_score),
            questions: record.test.questions.len(),
        })
        .collect()
}

pub fn build_question_rows(records: &[AggregatedRecord]) -> Vec<QuestionRow> {
    records
        .iter()
        .flat_map(|record| {
            let title = record.test.title.clone().unwrap_or_default();
            record.questions.iter().map(move |question| QuestionRow {
                title: title.clone(),
                number: question.number,
                marks: format_number(question.marks),
                answer: question.answer.clone(),
                score: format_number(question.score),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::models::{
        export_row::QuestionDetail,
        submission::Score,
        test::{Question, Test, TestStatus},
    };

    fn record(title: Option<&str>, status: Option<TestStatus>) -> AggregatedRecord {
        let when = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        AggregatedRecord {
            test: Test {
                id: 1,
                title: title.map(str::to_string),
                status,
                max_marks: 4.0,
                subjects: vec![1, 2],
                questions: vec![Question { marks: 2.0 }, Question { marks: 2.0 }],
                start_time: when,
                end_time: when,
                result_time: None,
            },
            subject_names: vec!["Math".to_string(), String::new()],
            total_score: 3.0,
            questions: vec![
                QuestionDetail {
                    number: 1,
                    marks: 2.0,
                    answer: "A".to_string(),
                    score: 2.0,
                },
                QuestionDetail {
                    number: 2,
                    marks: 2.0,
                    answer: "B".to_string(),
                    score: 1.0,
                },
            ],
        }
    }

    #[test]
    fn numbers_use_shortest_form() {
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(0.0), "0");
        assert_eq!(format_number(-0.0), "0");
    }

    #[test]
    fn empty_score_list_formats_as_zero() {
        assert_eq!(format_number(Score::PerQuestion(vec![]).total()), "0");
    }

    #[test]
    fn row_has_six_shaped_fields() {
        let rows = build_rows(&[record(Some("Algebra"), Some(TestStatus::Completed))]);

        assert_eq!(
            rows,
            vec![ExportRow {
                title: "Algebra".to_string(),
                status: "completed".to_string(),
                max_marks: "4".to_string(),
                subjects: "Math, ".to_string(),
                score: "3".to_string(),
                questions: 2,
            }]
        );
    }

    #[test]
    fn missing_title_and_status_become_empty() {
        let rows = build_rows(&[record(None, None)]);
        assert_eq!(rows[0].title, "");
        assert_eq!(rows[0].status, "");
    }

    #[test]
    fn question_rows_carry_the_test_title() {
        let rows = build_question_rows(&[record(Some("Algebra"), None)]);

        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.title == "Algebra"));
        assert_eq!(rows[1].number, 2);
        assert_eq!(rows[1].answer, "B");
        assert_eq!(rows[1].score, "1");
    }
}
