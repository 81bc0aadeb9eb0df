// src/store/postgres.rs

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, postgres::PgPoolOptions, types::Json};

use crate::{
    error::AppError,
    models::{
        subject::Subject,
        submission::{Score, Submission},
        test::{Question, Test, TestId, TestStatus},
    },
    store::ResultStore,
};

const CONNECT_RETRIES: u32 = 5;

/// Helper struct for fetching answer sheets.
#[derive(sqlx::FromRow)]
struct SubmissionRecord {
    test_id: i64,
    answers: Json<Vec<String>>,
    score: Json<Score>,
}

impl From<SubmissionRecord> for Submission {
    fn from(record: SubmissionRecord) -> Self {
        Submission {
            test_id: record.test_id,
            answers: record.answers.0,
            score: record.score.0,
        }
    }
}

/// Helper struct for fetching tests. `status` stays raw text until mapped.
#[derive(sqlx::FromRow)]
struct TestRecord {
    id: i64,
    title: Option<String>,
    status: Option<String>,
    max_marks: f64,
    subjects: Vec<i64>,
    questions: Json<Vec<Question>>,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    result_time: Option<DateTime<Utc>>,
}

impl From<TestRecord> for Test {
    fn from(record: TestRecord) -> Self {
        let status = record.status.as_deref().and_then(|raw| {
            raw.parse::<TestStatus>()
                .map_err(|e| tracing::debug!("Test {} has {}", record.id, e))
                .ok()
        });

        Test {
            id: record.id,
            title: record.title,
            status,
            max_marks: record.max_marks,
            subjects: record.subjects,
            questions: record.questions.0,
            start_time: record.start_time,
            end_time: record.end_time,
            result_time: record.result_time,
        }
    }
}

/// PostgreSQL-backed store.
#[derive(Clone)]
pub struct PgResultStore {
    pool: PgPool,
}

impl PgResultStore {
    /// Connects to the database, retrying while it is not ready yet.
    pub async fn connect(database_url: &str) -> Result<Self, AppError> {
        let mut retry_count = 0;
        let pool = loop {
            match PgPoolOptions::new()
                .max_connections(5)
                .acquire_timeout(Duration::from_secs(3))
                .connect(database_url)
                .await
            {
                Ok(pool) => break pool,
                Err(e) => {
                    retry_count += 1;
                    if retry_count > CONNECT_RETRIES {
                        return Err(AppError::Database(e));
                    }
                    tracing::warn!(
                        "Database not ready, retrying in 2s... (Attempt {})",
                        retry_count
                    );
                    tokio::time::sleep(Duration::from_secs(2)).await;
                }
            }
        };

        tracing::info!("Database connected...");
        Ok(Self { pool })
    }

    /// Applies the schema under `./migrations`.
    pub async fn migrate(&self) -> Result<(), AppError> {
        tracing::info!("Running migrations...");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.into()))?;
        tracing::info!("Migrations applied successfully.");
        Ok(())
    }
}

#[async_trait]
impl ResultStore for PgResultStore {
    async fn completed_submissions(&self, user_id: i64) -> Result<Vec<Submission>, AppError> {
        let records = sqlx::query_as::<_, SubmissionRecord>(
            r#"
            SELECT test_id, answers, score
            FROM answersheets
            WHERE student_id = $1 AND completed = TRUE
            ORDER BY id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch answer sheets: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(records.into_iter().map(Submission::from).collect())
    }

    async fn tests_by_ids(&self, ids: &[TestId]) -> Result<Vec<Test>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        // Use QueryBuilder for dynamic IN clause
        let mut query_builder = sqlx::QueryBuilder::<Postgres>::new(
            "SELECT
                id, title, status, max_marks, subjects, questions,
                start_time, end_time, result_time
            FROM tests WHERE id IN (",
        );

        let mut separated = query_builder.separated(",");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(") ORDER BY result_time DESC NULLS LAST, id");

        let records: Vec<TestRecord> = query_builder
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch tests: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(records.into_iter().map(Test::from).collect())
    }

    async fn subjects(&self) -> Result<Vec<Subject>, AppError> {
        let subjects = sqlx::query_as::<_, Subject>("SELECT id, name FROM subjects")
            .fetch_all(&self.pool)
            .await?;

        Ok(subjects)
    }

    async fn update_test_status(&self, id: TestId, status: TestStatus) -> Result<(), AppError> {
        sqlx::query("UPDATE tests SET status = $1 WHERE id = $2")
            .bind(status.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
