//! Employee operations composed from the validator and the record store.

pub mod bulk_import;
pub mod employees;

use crate::store::StoreError;
use crate::validation::ValidationError;
use rocket_db_pools::sqlx;
use thiserror::Error;

pub use bulk_import::{BulkImporter, ImportPreview};
pub use employees::EmployeeService;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Employee not found")]
    NotFound,
    #[error("Email already exists")]
    DuplicateEmail,
    #[error("No employees data provided")]
    EmptyBatch,
    #[error("store failure: {0}")]
    Store(sqlx::Error),
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail => ServiceError::DuplicateEmail,
            StoreError::Database(err) => ServiceError::Store(err),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
