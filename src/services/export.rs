// src/services/export.rs

use std::{future::Future, path::PathBuf, sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    config::Config,
    error::AppError,
    models::test::TestId,
    services::{
        aggregate::{SubjectDirectory, aggregate},
        rows::{build_question_rows, build_rows},
        status::{FailedCorrection, ScheduleStatusRule, StatusRule, reconcile_statuses},
        writer::CsvExportWriter,
    },
    store::ResultStore,
};

/// What a finished export produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub question_detail_path: Option<PathBuf>,
    pub rows: usize,
    pub corrected_statuses: usize,
    pub failed_status_updates: Vec<TestId>,
    pub filled_gaps: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ExportOutcome {
    /// The user has no completed submissions. No file was written.
    #[serde(rename = "empty")]
    NothingToExport,
    Written(ExportSummary),
}

/// Runs the completed-tests export for one user at a time.
pub struct ExportService {
    store: Arc<dyn ResultStore>,
    rule: Arc<dyn StatusRule>,
    writer: CsvExportWriter,
    store_timeout: Duration,
    question_detail: bool,
}

impl ExportService {
    pub fn new(store: Arc<dyn ResultStore>, writer: CsvExportWriter) -> Self {
        Self {
            store,
            rule: Arc::new(ScheduleStatusRule),
            writer,
            store_timeout: Duration::from_secs(crate::config::DEFAULT_STORE_TIMEOUT_SECS),
            question_detail: false,
        }
    }

    pub fn from_config(store: Arc<dyn ResultStore>, config: &Config) -> Self {
        Self::new(store, CsvExportWriter::new(&config.export_dir))
            .with_store_timeout(config.store_timeout)
            .with_question_detail(config.export_question_detail)
    }

    pub fn with_rule(mut self, rule: Arc<dyn StatusRule>) -> Self {
        self.rule = rule;
        self
    }

    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    pub fn with_question_detail(mut self, enabled: bool) -> Self {
        self.question_detail = enabled;
        self
    }

    pub async fn export_completed_tests(&self, user_id: i64) -> Result<ExportOutcome, AppError> {
        self.export_completed_tests_at(user_id, Utc::now()).await
    }

    /// Export with an explicit clock for status derivation.
    ///
    /// * Fetches the user's completed answer sheets and stops early when there are none.
    /// * Fetches the referenced tests, newest result first, and corrects stale statuses.
    /// * Bounds every store call by the store timeout; an expired status write-back
    ///   is reported like a rejected one instead of failing the run.
    /// * Joins tests with submissions and subjects, then writes the CSV file(s).
    pub async fn export_completed_tests_at(
        &self,
        user_id: i64,
        now: DateTime<Utc>,
    ) -> Result<ExportOutcome, AppError> {
        let submissions = self
            .bounded(
                "fetch answer sheets",
                self.store.completed_submissions(user_id),
            )
            .await?;

        if submissions.is_empty() {
            tracing::info!("No completed tests found for user {}", user_id);
            return Ok(ExportOutcome::NothingToExport);
        }

        let test_ids: Vec<TestId> = submissions.iter().map(|s| s.test_id).collect();
        let mut tests = self
            .bounded("fetch tests", self.store.tests_by_ids(&test_ids))
            .await?;

        let report = reconcile_statuses(
            self.store.as_ref(),
            self.rule.as_ref(),
            &mut tests,
            now,
            self.store_timeout,
        )
        .await;

        let subjects = self
            .bounded("fetch subjects", self.store.subjects())
            .await?;
        let directory = SubjectDirectory::new(subjects);

        let aggregation = aggregate(tests, &submissions, &directory);
        let rows = build_rows(&aggregation.records);
        let path = self.writer.write_rows(&rows).await?;

        let question_detail_path = if self.question_detail {
            let question_rows = build_question_rows(&aggregation.records);
            Some(self.writer.write_question_rows(&question_rows).await?)
        } else {
            None
        };

        tracing::info!(
            "CSV file generated for user {}: {} ({} rows)",
            user_id,
            path.display(),
            rows.len()
        );

        Ok(ExportOutcome::Written(ExportSummary {
            path,
            question_detail_path,
            rows: rows.len(),
            corrected_statuses: report.corrected,
            failed_status_updates: report
                .failed
                .iter()
                .map(|FailedCorrection { test_id, .. }| *test_id)
                .collect(),
            filled_gaps: aggregation.filled_gaps,
        }))
    }

    async fn bounded<T, F>(&self, operation: &'static str, fut: F) -> Result<T, AppError>
    where
        F: Future<Output = Result<T, AppError>>,
    {
        tokio::time::timeout(self.store_timeout, fut)
            .await
            .map_err(|_| AppError::Timeout {
                operation,
                seconds: self.store_timeout.as_secs(),
            })?
    }
}
