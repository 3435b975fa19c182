use super::{BulkImporter, ServiceError, ServiceResult};
use crate::models::{BulkImportSummary, DepartmentReport, Employee, EmployeePage};
use crate::query::EmployeeQuery;
use crate::store::EmployeeStore;
use crate::validation::{self, CandidateEmployee, EmployeePatch};
use chrono::Utc;
use std::sync::Arc;

/// Single-record CRUD plus the read-side listing and reporting calls.
///
/// Cheap to clone; every clone shares the same store.
#[derive(Clone)]
pub struct EmployeeService {
    store: Arc<dyn EmployeeStore>,
}

impl EmployeeService {
    pub fn new(store: Arc<dyn EmployeeStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &dyn EmployeeStore {
        self.store.as_ref()
    }

    pub async fn create(&self, candidate: &CandidateEmployee) -> ServiceResult<Employee> {
        let record = validation::validate(candidate)?;
        let employee = self.store.insert(&record).await?;
        log::debug!("created employee {}", employee.id);
        Ok(employee)
    }

    pub async fn read(&self, id: i32) -> ServiceResult<Employee> {
        self.store.find(id).await?.ok_or(ServiceError::NotFound)
    }

    /// Apply a partial update. Only supplied fields are validated; the rest keep
    /// their stored values.
    pub async fn update(&self, id: i32, patch: &EmployeePatch) -> ServiceResult<Employee> {
        let existing = self.read(id).await?;
        let merged = validation::validate_patch(patch, &existing)?;
        self.store
            .replace(id, &merged)
            .await?
            .ok_or(ServiceError::NotFound)
    }

    pub async fn delete(&self, id: i32) -> ServiceResult<()> {
        if self.store.delete(id).await? {
            log::debug!("deleted employee {}", id);
            Ok(())
        } else {
            Err(ServiceError::NotFound)
        }
    }

    pub async fn list(&self, query: &EmployeeQuery) -> ServiceResult<EmployeePage> {
        Ok(self.store.query(query).await?)
    }

    pub async fn department_report(&self) -> ServiceResult<DepartmentReport> {
        let departments = self.store.department_summaries().await?;
        Ok(DepartmentReport {
            departments,
            generated_at: Utc::now(),
        })
    }

    pub async fn bulk_import(
        &self,
        candidates: &[CandidateEmployee],
    ) -> ServiceResult<BulkImportSummary> {
        BulkImporter::new(self.store.as_ref()).import(candidates).await
    }
}
