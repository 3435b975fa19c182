//! Employee REST endpoints: listing, single-record CRUD and bulk import.

use crate::config::DirectoryConfig;
use crate::csv_import;
use crate::error::ApiError;
use crate::models::{BulkImportResponse, Employee, EmployeePage, MessageResponse};
use crate::routes::params::ListParams;
use crate::service::{EmployeeService, ServiceError};
use crate::validation::{CandidateEmployee, EmployeePatch};
use rocket::data::{Data, ToByteUnit};
use rocket::response::status;
use rocket::serde::json::Json;
use rocket::State;
use rocket_okapi::openapi;
use serde_json::Value;

/// List employees with search, department filter, sorting and pagination.
///
/// `total` and `byDepartment` are computed over every row matching the filter,
/// independent of the requested page.
#[openapi(tag = "Employees")]
#[get("/employees?<params..>")]
pub async fn list_employees(
    params: Option<ListParams>,
    service: &State<EmployeeService>,
    config: &State<DirectoryConfig>,
) -> Result<Json<EmployeePage>, ApiError> {
    let query = params.unwrap_or_default().to_query(config.max_page_size);
    Ok(Json(service.list(&query).await?))
}

/// Ids that are not integers cannot name a stored employee.
fn parse_id(raw: &str) -> Result<i32, ApiError> {
    raw.parse::<i32>()
        .map_err(|_| ApiError::from(ServiceError::NotFound))
}

/// Fetch one employee.
#[openapi(tag = "Employees")]
#[get("/employees/<id>")]
pub async fn get_employee(
    id: &str,
    service: &State<EmployeeService>,
) -> Result<Json<Employee>, ApiError> {
    Ok(Json(service.read(parse_id(id)?).await?))
}

/// Create an employee from a complete record.
#[openapi(tag = "Employees")]
#[post("/employees", data = "<candidate>")]
pub async fn create_employee(
    candidate: Json<CandidateEmployee>,
    service: &State<EmployeeService>,
) -> Result<status::Created<Json<Employee>>, ApiError> {
    let employee = service.create(&candidate).await?;
    Ok(status::Created::new(format!("/employees/{}", employee.id)).body(Json(employee)))
}

/// Update an employee. Omitted fields keep their stored values.
#[openapi(tag = "Employees")]
#[put("/employees/<id>", data = "<patch>")]
pub async fn update_employee(
    id: &str,
    patch: Json<EmployeePatch>,
    service: &State<EmployeeService>,
) -> Result<Json<Employee>, ApiError> {
    Ok(Json(service.update(parse_id(id)?, &patch).await?))
}

#[openapi(tag = "Employees")]
#[delete("/employees/<id>")]
pub async fn delete_employee(
    id: &str,
    service: &State<EmployeeService>,
) -> Result<Json<MessageResponse>, ApiError> {
    service.delete(parse_id(id)?).await?;
    Ok(Json(MessageResponse {
        message: "Employee deleted successfully".to_string(),
    }))
}

/// Import a JSON array of loosely shaped rows.
///
/// Invalid rows and rows whose email already exists are skipped and counted;
/// any other store failure aborts the batch with a 500. A body that is not a
/// non-empty array is rejected.
#[openapi(tag = "Employees")]
#[post("/employees/bulk", data = "<rows>")]
pub async fn bulk_import(
    rows: Json<Value>,
    service: &State<EmployeeService>,
) -> Result<status::Created<Json<BulkImportResponse>>, ApiError> {
    let candidates: Vec<CandidateEmployee> = match rows.into_inner() {
        Value::Array(items) => items.iter().map(CandidateEmployee::from_value).collect(),
        _ => Vec::new(),
    };

    let summary = service.bulk_import(&candidates).await?;
    Ok(status::Created::new("/employees").body(Json(summary.into())))
}

/// Import a CSV export whose header names the employee columns.
#[openapi(tag = "Employees")]
#[post("/employees/bulk/csv", format = "text/csv", data = "<upload>")]
pub async fn bulk_import_csv(
    upload: Data<'_>,
    service: &State<EmployeeService>,
    config: &State<DirectoryConfig>,
) -> Result<status::Created<Json<BulkImportResponse>>, ApiError> {
    let body = upload
        .open(config.csv_upload_limit_bytes.bytes())
        .into_bytes()
        .await
        .map_err(|err| ApiError::BadRequest(format!("Failed to read upload: {err}")))?;

    if !body.is_complete() {
        return Err(ApiError::BadRequest("Upload is too large".to_string()));
    }

    let candidates = csv_import::parse_candidates(body.value.as_slice())?;
    let summary = service.bulk_import(&candidates).await?;
    Ok(status::Created::new("/employees").body(Json(summary.into())))
}
