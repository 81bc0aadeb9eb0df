// src/store/mod.rs

//! Data access for the export pipeline.
//!
//! The pipeline never reaches for a global pool: it receives a [`ResultStore`]
//! and only talks to it through these four operations.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::{
    error::AppError,
    models::{
        subject::Subject,
        submission::Submission,
        test::{Test, TestId, TestStatus},
    },
};

pub use memory::InMemoryStore;
pub use postgres::PgResultStore;

#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Completed submissions of the given user, in store order.
    async fn completed_submissions(&self, user_id: i64) -> Result<Vec<Submission>, AppError>;

    /// Tests with the given ids, newest result time first.
    /// Tests without a result time come last.
    async fn tests_by_ids(&self, ids: &[TestId]) -> Result<Vec<Test>, AppError>;

    /// The full subject lookup table.
    async fn subjects(&self) -> Result<Vec<Subject>, AppError>;

    /// Persists a corrected status.
    async fn update_test_status(&self, id: TestId, status: TestStatus) -> Result<(), AppError>;
}
