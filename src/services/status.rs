// src/services/status.rs

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::{
    error::AppError,
    models::test::{Test, TestId, TestStatus},
    store::ResultStore,
};

/// Derives a test's status from its own data.
pub trait StatusRule: Send + Sync {
    fn derive_status(&self, test: &Test, now: DateTime<Utc>) -> TestStatus;
}

/// Status from the test schedule.
///
/// * before `start_time`: upcoming
/// * before `end_time`: ongoing
/// * once `result_time` has passed: completed
/// * otherwise: evaluating
#[derive(Debug, Clone, Copy, Default)]
pub struct ScheduleStatusRule;

impl StatusRule for ScheduleStatusRule {
    fn derive_status(&self, test: &Test, now: DateTime<Utc>) -> TestStatus {
        if now < test.start_time {
            TestStatus::Upcoming
        } else if now < test.end_time {
            TestStatus::Ongoing
        } else {
            match test.result_time {
                Some(result_time) if now >= result_time => TestStatus::Completed,
                _ => TestStatus::Evaluating,
            }
        }
    }
}

/// A status write-back that the store rejected.
#[derive(Debug, Clone, PartialEq)]
pub struct FailedCorrection {
    pub test_id: TestId,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcileReport {
    /// Tests whose in-memory status was corrected.
    pub corrected: usize,
    pub failed: Vec<FailedCorrection>,
}

/// Brings every test's status in line with `rule`, one test at a time.
///
/// Each write-back is bounded by `write_timeout`. A rejected or expired write-back
/// is recorded and logged; the remaining tests are still processed and the
/// in-memory status is corrected either way.
pub async fn reconcile_statuses(
    store: &dyn ResultStore,
    rule: &dyn StatusRule,
    tests: &mut [Test],
    now: DateTime<Utc>,
    write_timeout: Duration,
) -> ReconcileReport {
    let mut report = ReconcileReport::default();

    for test in tests.iter_mut() {
        let derived = rule.derive_status(test, now);
        if test.status == Some(derived) {
            continue;
        }

        let write = tokio::time::timeout(write_timeout, store.update_test_status(test.id, derived))
            .await
            .unwrap_or_else(|_| {
                Err(AppError::Timeout {
                    operation: "update test status",
                    seconds: write_timeout.as_secs(),
                })
            });

        match write {
            Ok(()) => tracing::info!(
                "Corrected status of test {}: {:?} -> {}",
                test.id,
                test.status,
                derived
            ),
            Err(e) => {
                tracing::warn!("Failed to persist status of test {}: {}", test.id, e);
                report.failed.push(FailedCorrection {
                    test_id: test.id,
                    error: e.to_string(),
                });
            }
        }

        test.status = Some(derived);
        report.corrected += 1;
    }

    report
}
