use chrono::{DateTime, Utc};
use rocket_db_pools::sqlx::FromRow;
use rocket_okapi::okapi::schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ===== Employee Records =====

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, JsonSchema)]
pub struct Employee {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub department: String,
    pub salary: f64,
}

/// A validated, normalized record ready to be written. Carries no id; the store
/// assigns one on insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEmployee {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub department: String,
    pub salary: f64,
}

impl NewEmployee {
    pub fn with_id(self, id: i32) -> Employee {
        Employee {
            id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            department: self.department,
            salary: self.salary,
        }
    }
}

// ===== Query Results =====

/// One window of a filtered listing plus the aggregates computed over the whole
/// filter (not just the window).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmployeePage {
    pub employees: Vec<Employee>,
    pub total: i64,
    pub by_department: BTreeMap<String, i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentSummary {
    pub department: String,
    pub count: i64,
    pub total_salary: f64,
    pub average_salary: f64,
    pub max_salary: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentReport {
    pub departments: Vec<DepartmentSummary>,
    pub generated_at: DateTime<Utc>,
}

// ===== API Responses =====

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct BulkImportSummary {
    pub inserted: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct BulkImportResponse {
    pub message: String,
    pub inserted: usize,
    pub skipped: usize,
}

impl From<BulkImportSummary> for BulkImportResponse {
    fn from(summary: BulkImportSummary) -> Self {
        Self {
            message: "Employees added successfully".to_string(),
            inserted: summary.inserted,
            skipped: summary.skipped,
        }
    }
}
