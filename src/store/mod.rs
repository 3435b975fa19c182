//! Record store for employee rows.
//!
//! The store owns persistence and email uniqueness and nothing else: it never
//! validates, and it reports a uniqueness collision as
//! [`StoreError::DuplicateEmail`] so callers can tell it apart from every other
//! failure.

pub mod memory;
pub mod postgres;

use crate::models::{DepartmentSummary, Employee, EmployeePage, NewEmployee};
use crate::query::EmployeeQuery;
use rocket_db_pools::sqlx;
use thiserror::Error;

pub use memory::MemoryStore;
pub use postgres::PgEmployeeStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("an employee with this email already exists")]
    DuplicateEmail,
    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                StoreError::DuplicateEmail
            }
            _ => StoreError::Database(err),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[rocket::async_trait]
pub trait EmployeeStore: Send + Sync {
    /// Short backend name reported by the health endpoint.
    fn backend(&self) -> &'static str;

    /// Insert a record and return it with its assigned id.
    async fn insert(&self, record: &NewEmployee) -> StoreResult<Employee>;

    async fn find(&self, id: i32) -> StoreResult<Option<Employee>>;

    /// Overwrite every column of an existing row. `None` when `id` is absent.
    async fn replace(&self, id: i32, record: &NewEmployee) -> StoreResult<Option<Employee>>;

    /// Returns whether a row was removed.
    async fn delete(&self, id: i32) -> StoreResult<bool>;

    async fn query(&self, query: &EmployeeQuery) -> StoreResult<EmployeePage>;

    /// Per-department headcount and salary figures, ordered by department.
    async fn department_summaries(&self) -> StoreResult<Vec<DepartmentSummary>>;
}
