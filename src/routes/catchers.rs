use crate::error::ErrorResponse;
use rocket::Request;
use rocket::http::Status;
use rocket::response::status;
use rocket::serde::json::Json;

type CatcherResponse = status::Custom<Json<ErrorResponse>>;

fn reply(status: Status, message: &str, code: &str) -> CatcherResponse {
    status::Custom(status, Json(ErrorResponse::new(message, code)))
}

#[catch(400)]
pub fn bad_request(_: &Request<'_>) -> CatcherResponse {
    reply(Status::BadRequest, "Bad request", "BadRequest")
}

#[catch(404)]
pub fn not_found(_: &Request<'_>) -> CatcherResponse {
    reply(Status::NotFound, "Resource not found", "NotFound")
}

/// Rocket reports undecodable JSON bodies as 422; clients get a 400.
#[catch(422)]
pub fn unprocessable(_: &Request<'_>) -> CatcherResponse {
    reply(Status::BadRequest, "Malformed request body", "BadRequest")
}

#[catch(500)]
pub fn internal_error(_: &Request<'_>) -> CatcherResponse {
    reply(Status::InternalServerError, "Internal server error", "InternalError")
}
