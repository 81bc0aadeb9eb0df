// src/store/memory.rs

//! In-memory [`ResultStore`] for tests and local runs.

use std::{
    collections::HashSet,
    sync::{Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use async_trait::async_trait;

use crate::{
    error::AppError,
    models::{
        subject::Subject,
        submission::Submission,
        test::{Test, TestId, TestStatus},
    },
    store::ResultStore,
};

#[derive(Debug, Clone)]
struct StoredSubmission {
    user_id: i64,
    completed: bool,
    submission: Submission,
}

#[derive(Debug, Default)]
struct Inner {
    submissions: Vec<StoredSubmission>,
    tests: Vec<Test>,
    subjects: Vec<Subject>,
    status_updates: Vec<(TestId, TestStatus)>,
    failing_status_updates: HashSet<TestId>,
    fail_reads: bool,
    read_delay: Option<Duration>,
    write_delay: Option<Duration>,
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: Mutex<Inner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_subject(self, id: i64, name: &str) -> Self {
        self.mutate(|inner| {
            inner.subjects.push(Subject {
                id,
                name: name.to_string(),
            })
        })
    }

    pub fn with_test(self, test: Test) -> Self {
        self.mutate(|inner| inner.tests.push(test))
    }

    pub fn with_submission(self, user_id: i64, completed: bool, submission: Submission) -> Self {
        self.mutate(|inner| {
            inner.submissions.push(StoredSubmission {
                user_id,
                completed,
                submission,
            })
        })
    }

    /// Makes every status write-back for `id` fail.
    pub fn fail_status_update_for(self, id: TestId) -> Self {
        self.mutate(|inner| {
            inner.failing_status_updates.insert(id);
        })
    }

    /// Makes every read fail.
    pub fn fail_reads(self) -> Self {
        self.mutate(|inner| inner.fail_reads = true)
    }

    /// Delays every read by `delay`.
    pub fn stall_reads(self, delay: Duration) -> Self {
        self.mutate(|inner| inner.read_delay = Some(delay))
    }

    /// Delays every status write-back by `delay` before it is applied.
    pub fn stall_writes(self, delay: Duration) -> Self {
        self.mutate(|inner| inner.write_delay = Some(delay))
    }

    /// Status write-backs applied so far, in order.
    pub fn status_updates(&self) -> Vec<(TestId, TestStatus)> {
        self.lock()
            .map(|inner| inner.status_updates.clone())
            .unwrap_or_default()
    }

    /// Current stored status of a test.
    pub fn stored_status(&self, id: TestId) -> Option<TestStatus> {
        self.lock()
            .ok()?
            .tests
            .iter()
            .find(|t| t.id == id)
            .and_then(|t| t.status)
    }

    fn mutate(mut self, f: impl FnOnce(&mut Inner)) -> Self {
        // Builders own the store, so a poisoned lock still hands out the data.
        let inner = self.inner.get_mut().unwrap_or_else(PoisonError::into_inner);
        f(inner);
        self
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, AppError> {
        self.inner
            .lock()
            .map_err(|_| AppError::InternalServerError("in-memory store poisoned".to_string()))
    }

    async fn before_read(&self, operation: &str) -> Result<(), AppError> {
        let (delay, fail) = {
            let inner = self.lock()?;
            (inner.read_delay, inner.fail_reads)
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if fail {
            return Err(AppError::Database(sqlx::Error::Protocol(format!(
                "{} unavailable",
                operation
            ))));
        }
        Ok(())
    }
}

#[async_trait]
impl ResultStore for InMemoryStore {
    async fn completed_submissions(&self, user_id: i64) -> Result<Vec<Submission>, AppError> {
        self.before_read("answer sheets").await?;
        let inner = self.lock()?;
        Ok(inner
            .submissions
            .iter()
            .filter(|s| s.user_id == user_id && s.completed)
            .map(|s| s.submission.clone())
            .collect())
    }

    async fn tests_by_ids(&self, ids: &[TestId]) -> Result<Vec<Test>, AppError> {
        self.before_read("tests").await?;
        let inner = self.lock()?;
        let mut tests: Vec<Test> = inner
            .tests
            .iter()
            .filter(|t| ids.contains(&t.id))
            .cloned()
            .collect();
        // `None < Some`, so reversing the comparison puts unscheduled results last.
        tests.sort_by(|a, b| b.result_time.cmp(&a.result_time));
        Ok(tests)
    }

    async fn subjects(&self) -> Result<Vec<Subject>, AppError> {
        self.before_read("subjects").await?;
        Ok(self.lock()?.subjects.clone())
    }

    async fn update_test_status(&self, id: TestId, status: TestStatus) -> Result<(), AppError> {
        let delay = {
            let inner = self.lock()?;
            inner.write_delay
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut inner = self.lock()?;
        if inner.failing_status_updates.contains(&id) {
            return Err(AppError::Database(sqlx::Error::Protocol(format!(
                "status update for test {} rejected",
                id
            ))));
        }
        match inner.tests.iter_mut().find(|t| t.id == id) {
            Some(test) => test.status = Some(status),
            None => return Err(AppError::NotFound(format!("test {}", id))),
        }
        inner.status_updates.push((id, status));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_survives_a_poisoned_lock() {
        let store = InMemoryStore::new();
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = store.inner.lock().unwrap();
            panic!("poison the lock");
        }));
        assert!(store.inner.is_poisoned());

        let mut store = store.with_subject(1, "Math");

        let inner = store.inner.get_mut().unwrap_or_else(PoisonError::into_inner);
        assert_eq!(inner.subjects.len(), 1);
    }

    #[tokio::test]
    async fn tests_with_equal_result_time_keep_store_order() {
        use chrono::{TimeZone, Utc};

        let when = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let test = |id: TestId, result_time| Test {
            id,
            title: None,
            status: None,
            max_marks: 0.0,
            subjects: vec![],
            questions: vec![],
            start_time: when,
            end_time: when,
            result_time,
        };
        let store = InMemoryStore::new()
            .with_test(test(1, None))
            .with_test(test(2, Some(when)))
            .with_test(test(3, Some(when)))
            .with_test(test(4, Some(when + chrono::Duration::days(1))));

        let ids: Vec<TestId> = store
            .tests_by_ids(&[1, 2, 3, 4])
            .await
            .unwrap()
            .iter()
            .map(|t| t.id)
            .collect();

        assert_eq!(ids, vec![4, 2, 3, 1]);
    }
}
