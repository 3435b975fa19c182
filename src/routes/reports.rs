//! Aggregate views over the employee table, recomputed on every read.

use crate::error::ApiError;
use crate::models::DepartmentReport;
use crate::service::EmployeeService;
use rocket::State;
use rocket::serde::json::Json;
use rocket_okapi::openapi;

/// Headcount and salary figures per department, ordered by department name.
#[openapi(tag = "Reports")]
#[get("/employees/reports/departments")]
pub async fn department_report(
    service: &State<EmployeeService>,
) -> Result<Json<DepartmentReport>, ApiError> {
    Ok(Json(service.department_report().await?))
}
