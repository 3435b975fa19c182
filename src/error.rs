use crate::csv_import::CsvImportError;
use crate::service::ServiceError;
use crate::validation::ValidationError;
use okapi::openapi3::{MediaType, RefOr, Response as OpenApiResponse, Responses};
use rocket::http::{ContentType, Status};
use rocket::response::{self, Responder};
use rocket::{Request, Response};
use rocket_okapi::OpenApiError;
use rocket_okapi::r#gen::OpenApiGenerator;
use rocket_okapi::okapi::schemars::JsonSchema;
use rocket_okapi::response::OpenApiResponderInner;
use serde::{Deserialize, Serialize};
use std::io::Cursor;

const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

#[derive(Debug)]
pub enum ApiError {
    Validation(ValidationError),
    NotFound(String),
    Conflict(String),
    BadRequest(String),
    InternalError(String),
}

/// JSON body returned for every failed request.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ErrorResponse {
    /// Human-readable message.
    pub error: String,
    /// Machine-readable error kind.
    pub code: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            r#"{"error":"Failed to serialize error","code":"SerializationError"}"#.to_string()
        })
    }
}

impl ApiError {
    pub fn status(&self) -> Status {
        match self {
            ApiError::Validation(_) | ApiError::BadRequest(_) => Status::BadRequest,
            ApiError::NotFound(_) => Status::NotFound,
            ApiError::Conflict(_) => Status::Conflict,
            ApiError::InternalError(_) => Status::InternalServerError,
        }
    }

    pub fn body(&self) -> ErrorResponse {
        match self {
            ApiError::Validation(err) => ErrorResponse::new(err.to_string(), err.code()),
            ApiError::NotFound(msg) => ErrorResponse::new(msg, "NotFound"),
            ApiError::Conflict(msg) => ErrorResponse::new(msg, "DuplicateEmail"),
            ApiError::BadRequest(msg) => ErrorResponse::new(msg, "BadRequest"),
            ApiError::InternalError(_) => ErrorResponse::new(INTERNAL_ERROR_MESSAGE, "InternalError"),
        }
    }
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        match &self {
            ApiError::InternalError(msg) => log::error!("internal error: {}", msg),
            ApiError::Validation(err) => log::debug!("validation failed: {:?}", err),
            ApiError::NotFound(msg) => log::debug!("not found: {}", msg),
            ApiError::Conflict(msg) => log::debug!("conflict: {}", msg),
            ApiError::BadRequest(msg) => log::debug!("bad request: {}", msg),
        }

        let json = self.body().to_json();

        Response::build()
            .status(self.status())
            .header(ContentType::JSON)
            .sized_body(json.len(), Cursor::new(json))
            .ok()
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(rule) => ApiError::Validation(rule),
            ServiceError::NotFound => ApiError::NotFound(err.to_string()),
            ServiceError::DuplicateEmail => ApiError::Conflict(err.to_string()),
            ServiceError::EmptyBatch => ApiError::BadRequest(err.to_string()),
            ServiceError::Store(inner) => ApiError::InternalError(format!("database error: {inner}")),
        }
    }
}

impl From<CsvImportError> for ApiError {
    fn from(err: CsvImportError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

fn documented_response(generator: &mut OpenApiGenerator, description: &str) -> RefOr<OpenApiResponse> {
    let schema = generator.json_schema::<ErrorResponse>();
    RefOr::Object(OpenApiResponse {
        description: description.to_owned(),
        content: okapi::map! {
            "application/json".to_owned() => MediaType {
                schema: Some(schema),
                ..Default::default()
            }
        },
        ..Default::default()
    })
}

impl OpenApiResponderInner for ApiError {
    fn responses(generator: &mut OpenApiGenerator) -> Result<Responses, OpenApiError> {
        Ok(Responses {
            responses: okapi::map! {
                "400".to_owned() => documented_response(generator, "Invalid input or empty batch."),
                "404".to_owned() => documented_response(generator, "Employee not found."),
                "409".to_owned() => documented_response(generator, "Email already exists."),
                "500".to_owned() => documented_response(generator, "Unexpected store failure."),
            },
            ..Default::default()
        })
    }
}
