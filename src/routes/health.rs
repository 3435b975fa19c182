//! Lightweight service health endpoint used for readiness checks and tests.

use crate::service::EmployeeService;
use rocket::State;
use rocket::serde::json::Json;
use rocket_okapi::okapi::schemars::JsonSchema;
use rocket_okapi::openapi;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct HealthResponse {
    pub status: String,
    /// Record store backend serving requests.
    pub store: String,
}

#[openapi(tag = "Health")]
#[get("/health")]
pub fn health_check(service: &State<EmployeeService>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        store: service.store().backend().to_string(),
    })
}
