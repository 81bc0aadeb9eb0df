// src/services/writer.rs

use std::path::PathBuf;

use serde::Serialize;

use crate::{
    config::{EXPORT_FILE_NAME, QUESTION_EXPORT_FILE_NAME},
    error::AppError,
    models::export_row::{EXPORT_HEADER, ExportRow, QUESTION_HEADER, QuestionRow},
};

/// Writes export rows as CSV files into one directory.
#[derive(Debug, Clone)]
pub struct CsvExportWriter {
    dir: PathBuf,
}

impl CsvExportWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Writes `completed_tests.csv`, replacing any previous file.
    pub async fn write_rows(&self, rows: &[ExportRow]) -> Result<PathBuf, AppError> {
        self.write(EXPORT_FILE_NAME, &EXPORT_HEADER, rows).await
    }

    /// Writes the per-question file, replacing any previous file.
    pub async fn write_question_rows(&self, rows: &[QuestionRow]) -> Result<PathBuf, AppError> {
        self.write(QUESTION_EXPORT_FILE_NAME, &QUESTION_HEADER, rows)
            .await
    }

    async fn write<T: Serialize>(
        &self,
        file_name: &str,
        header: &[&str],
        rows: &[T],
    ) -> Result<PathBuf, AppError> {
        let bytes = encode_csv(header, rows)?;

        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(file_name);
        tokio::fs::write(&path, bytes).await?;

        Ok(path)
    }
}

/// Header first, so an empty export still documents its columns.
fn encode_csv<T: Serialize>(header: &[&str], rows: &[T]) -> Result<Vec<u8>, AppError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(header)?;
    for row in rows {
        writer.serialize(row)?;
    }

    writer
        .into_inner()
        .map_err(|e| AppError::Io(e.into_error()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(title: &str, subjects: &str) -> ExportRow {
        ExportRow {
            title: title.to_string(),
            status: "completed".to_string(),
            max_marks: "4".to_string(),
            subjects: subjects.to_string(),
            score: "3".to_string(),
            questions: 2,
        }
    }

    #[test]
    fn fields_with_commas_are_quoted() {
        let bytes = encode_csv(&EXPORT_HEADER, &[row("Algebra", "Math, Physics")]).unwrap();
        let text = String::from_utf8(bytes).unwrap();

        assert_eq!(
            text,
            "Test Title,Test Status,Max Marks,Subjects,Score,Questions\n\
             Algebra,completed,4,\"Math, Physics\",3,2\n"
        );
    }

    #[tokio::test]
    async fn creates_directory_and_overwrites_previous_file() {
        let tmp = tempfile::tempdir().unwrap();
        let writer = CsvExportWriter::new(tmp.path().join("nested").join("output"));

        writer
            .write_rows(&[row("First", ""), row("Second", "")])
            .await
            .unwrap();
        let path = writer.write_rows(&[row("Third", "")]).await.unwrap();

        assert_eq!(path.file_name().unwrap(), "completed_tests.csv");
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("Third"));
        assert!(!text.contains("First"));
    }

    #[tokio::test]
    async fn empty_export_still_has_header() {
        let tmp = tempfile::tempdir().unwrap();
        let writer = CsvExportWriter::new(tmp.path());

        let path = writer.write_question_rows(&[]).await.unwrap();

        let text = std::fs::read_to_string(path).unwrap();
        assert_eq!(
            text,
            "Test Title,Question Number,Marks,Student Answer,Score\n"
        );
    }
}
