//! HTTP route handlers.
//!
//! Handlers are annotated with `#[openapi]` so `rocket_okapi` can derive the
//! OpenAPI document; catchers turn Rocket's own failures into the same JSON
//! error body the handlers use.

pub mod catchers;
pub mod employees;
pub mod health;
pub mod params;
pub mod reports;
