//! Row-by-row import of untrusted employee batches.
//!
//! Each row is validated and inserted on its own, in input order. A row that
//! fails validation or collides on email is skipped and counted; any other
//! store failure stops the batch immediately and is returned to the caller.
//! Rows inserted before that point stay inserted.

use super::{ServiceError, ServiceResult};
use crate::models::BulkImportSummary;
use crate::store::{EmployeeStore, StoreError};
use crate::validation::{self, CandidateEmployee};

/// Outcome of validating a batch without writing it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportPreview {
    pub valid: usize,
    pub invalid: usize,
}

pub struct BulkImporter<'a> {
    store: &'a dyn EmployeeStore,
}

impl<'a> BulkImporter<'a> {
    pub fn new(store: &'a dyn EmployeeStore) -> Self {
        Self { store }
    }

    pub async fn import(&self, candidates: &[CandidateEmployee]) -> ServiceResult<BulkImportSummary> {
        if candidates.is_empty() {
            return Err(ServiceError::EmptyBatch);
        }

        let mut summary = BulkImportSummary::default();

        for (index, candidate) in candidates.iter().enumerate() {
            let record = match validation::validate(candidate) {
                Ok(record) => record,
                Err(err) => {
                    log::debug!("bulk import row {} rejected: {}", index, err);
                    summary.skipped += 1;
                    continue;
                }
            };

            match self.store.insert(&record).await {
                Ok(_) => summary.inserted += 1,
                Err(StoreError::DuplicateEmail) => {
                    log::warn!("skipping duplicate email in bulk import: {}", record.email);
                    summary.skipped += 1;
                }
                Err(err) => {
                    log::error!(
                        "bulk import aborted at row {} after {} inserts: {}",
                        index,
                        summary.inserted,
                        err
                    );
                    return Err(err.into());
                }
            }
        }

        log::info!(
            "bulk import complete: {} inserted, {} skipped",
            summary.inserted,
            summary.skipped
        );
        Ok(summary)
    }

    /// Validate every row without touching the store. Duplicate emails are not
    /// detected here.
    pub fn preview(candidates: &[CandidateEmployee]) -> ImportPreview {
        candidates
            .iter()
            .fold(ImportPreview::default(), |mut preview, candidate| {
                if validation::validate(candidate).is_ok() {
                    preview.valid += 1;
                } else {
                    preview.invalid += 1;
                }
                preview
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DepartmentSummary, Employee, EmployeePage, NewEmployee};
    use crate::query::EmployeeQuery;
    use crate::store::{MemoryStore, StoreResult};
    use rocket_db_pools::sqlx;
    use serde_json::{Value, json};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn row(name: &str, email: &str) -> CandidateEmployee {
        CandidateEmployee::from_value(&json!({
            "name": name,
            "email": email,
            "phone": "5551234567",
            "department": "Sales",
            "salary": 42000
        }))
    }

    /// Delegates to a memory store but fails every insert after the first
    /// `healthy_inserts` with a connection-level error.
    struct FlakyStore {
        inner: MemoryStore,
        healthy_inserts: usize,
        attempts: AtomicUsize,
    }

    #[rocket::async_trait]
    impl EmployeeStore for FlakyStore {
        fn backend(&self) -> &'static str {
            "flaky"
        }

        async fn insert(&self, record: &NewEmployee) -> StoreResult<Employee> {
            if self.attempts.fetch_add(1, Ordering::SeqCst) >= self.healthy_inserts {
                return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
            }
            self.inner.insert(record).await
        }

        async fn find(&self, id: i32) -> StoreResult<Option<Employee>> {
            self.inner.find(id).await
        }

        async fn replace(&self, id: i32, record: &NewEmployee) -> StoreResult<Option<Employee>> {
            self.inner.replace(id, record).await
        }

        async fn delete(&self, id: i32) -> StoreResult<bool> {
            self.inner.delete(id).await
        }

        async fn query(&self, query: &EmployeeQuery) -> StoreResult<EmployeePage> {
            self.inner.query(query).await
        }

        async fn department_summaries(&self) -> StoreResult<Vec<DepartmentSummary>> {
            self.inner.department_summaries().await
        }
    }

    #[tokio::test]
    async fn skips_invalid_and_duplicate_rows() {
        let store = MemoryStore::new();
        let batch = vec![
            row("Valid One", "one@example.com"),
            row("Bad Email", "bob@x"),
            row("Valid One Again", "one@example.com"),
            row("Valid Two", "two@example.com"),
        ];

        let summary = BulkImporter::new(&store).import(&batch).await.unwrap();
        assert_eq!(summary, BulkImportSummary { inserted: 2, skipped: 2 });
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn empty_batch_is_rejected_without_inserts() {
        let store = MemoryStore::new();
        let err = BulkImporter::new(&store).import(&[]).await.unwrap_err();
        assert!(matches!(err, ServiceError::EmptyBatch));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn loosely_shaped_rows_are_skipped() {
        let store = MemoryStore::new();
        let batch: Vec<CandidateEmployee> = [json!(null), json!(7), json!([1, 2]), json!({})]
            .iter()
            .map(CandidateEmployee::from_value)
            .chain(std::iter::once(row("Only Good", "good@example.com")))
            .collect();

        let summary = BulkImporter::new(&store).import(&batch).await.unwrap();
        assert_eq!(summary.inserted, 1);
        assert_eq!(summary.skipped, 4);
    }

    #[tokio::test]
    async fn store_failure_aborts_and_keeps_earlier_rows() {
        let store = FlakyStore {
            inner: MemoryStore::new(),
            healthy_inserts: 2,
            attempts: AtomicUsize::new(0),
        };
        let batch = vec![
            row("First Row", "first@example.com"),
            row("Second Row", "second@example.com"),
            row("Third Row", "third@example.com"),
            row("Fourth Row", "fourth@example.com"),
        ];

        let err = BulkImporter::new(&store).import(&batch).await.unwrap_err();
        assert!(matches!(err, ServiceError::Store(_)));
        assert_eq!(store.inner.len(), 2);
        assert_eq!(store.attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn invalid_rows_never_reach_the_store() {
        let store = FlakyStore {
            inner: MemoryStore::new(),
            healthy_inserts: 0,
            attempts: AtomicUsize::new(0),
        };
        let batch = vec![row("X", "x@example.com"), row("Yvonne", "not-an-email")];

        let summary = BulkImporter::new(&store).import(&batch).await.unwrap();
        assert_eq!(summary, BulkImportSummary { inserted: 0, skipped: 2 });
        assert_eq!(store.attempts.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn preview_counts_without_writing() {
        let batch = vec![
            row("Valid One", "one@example.com"),
            row("Bad Email", "bob@x"),
            CandidateEmployee::from_value(&Value::Null),
        ];
        assert_eq!(
            BulkImporter::preview(&batch),
            ImportPreview { valid: 1, invalid: 2 }
        );
    }
}
