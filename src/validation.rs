//! Field-level validation for employee records.
//!
//! Untrusted input arrives as loosely shaped JSON (form posts, spreadsheet rows
//! converted by the UI, CSV uploads). It is first lifted into a
//! [`CandidateEmployee`] or [`EmployeePatch`], which only records which fields
//! were supplied and their textual value, and then checked here. Nothing in this
//! module touches the store.

use crate::models::{Employee, NewEmployee};
use regex::Regex;
use rocket_okapi::okapi::schemars::{self, JsonSchema};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::OnceLock;
use thiserror::Error;

pub const NAME_MIN_LEN: usize = 2;
pub const NAME_MAX_LEN: usize = 60;
pub const EMAIL_MAX_LEN: usize = 100;

static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
static PHONE_REGEX: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid email regex")
    })
}

fn phone_regex() -> &'static Regex {
    PHONE_REGEX.get_or_init(|| Regex::new(r"^[0-9]{7,15}$").expect("Invalid phone regex"))
}

/// The first rule a candidate record violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("All fields are required")]
    MissingField { field: &'static str },
    #[error("Name must be between 2 and 60 characters")]
    InvalidName,
    #[error("Invalid email address")]
    InvalidEmail,
    #[error("Phone must be 7-15 digits (numbers only)")]
    InvalidPhone,
    #[error("Salary must be a positive number")]
    InvalidSalary,
}

impl ValidationError {
    /// Stable identifier exposed to API clients next to the message.
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::MissingField { .. } => "MissingField",
            ValidationError::InvalidName => "InvalidName",
            ValidationError::InvalidEmail => "InvalidEmail",
            ValidationError::InvalidPhone => "InvalidPhone",
            ValidationError::InvalidSalary => "InvalidSalary",
        }
    }
}

/// An unvalidated employee row.
///
/// `None` means the field was absent (missing key, `null`, or a value with no
/// scalar representation). Present values are kept verbatim as text; numeric
/// JSON values are stringified so that phone numbers and salaries coming out of
/// spreadsheets are treated the same as typed-in strings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub struct CandidateEmployee {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub salary: Option<String>,
}

impl CandidateEmployee {
    /// Lift an arbitrary JSON value into a candidate. Non-object values produce
    /// a candidate with every field absent.
    pub fn from_value(value: &Value) -> Self {
        match value.as_object() {
            Some(map) => Self {
                name: lookup(map, "name"),
                email: lookup(map, "email"),
                phone: lookup(map, "phone"),
                department: lookup(map, "department"),
                salary: lookup(map, "salary"),
            },
            None => Self::default(),
        }
    }

    /// True when none of the recognized fields carries any non-blank text.
    pub fn is_blank(&self) -> bool {
        [
            &self.name,
            &self.email,
            &self.phone,
            &self.department,
            &self.salary,
        ]
        .iter()
        .all(|field| field.as_deref().is_none_or(|text| text.trim().is_empty()))
    }
}

impl From<Value> for CandidateEmployee {
    fn from(value: Value) -> Self {
        Self::from_value(&value)
    }
}

/// A partial update. Each `Some` field was supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub struct EmployeePatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub salary: Option<String>,
}

impl EmployeePatch {
    pub fn from_value(value: &Value) -> Self {
        let candidate = CandidateEmployee::from_value(value);
        Self {
            name: candidate.name,
            email: candidate.email,
            phone: candidate.phone,
            department: candidate.department,
            salary: candidate.salary,
        }
    }
}

impl From<Value> for EmployeePatch {
    fn from(value: Value) -> Self {
        Self::from_value(&value)
    }
}

/// Prefer the exact lower-case key, then fall back to a case-insensitive match
/// so spreadsheet headers such as `Name` or `EMAIL` are recognized.
fn lookup(map: &Map<String, Value>, field: &str) -> Option<String> {
    if let Some(text) = map.get(field).and_then(scalar_text) {
        return Some(text);
    }

    map.iter()
        .filter(|(key, _)| key.trim().eq_ignore_ascii_case(field))
        .find_map(|(_, value)| scalar_text(value))
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn required<'a>(value: &'a Option<String>, field: &'static str) -> Result<&'a str, ValidationError> {
    match value.as_deref() {
        Some(text) if !text.is_empty() => Ok(text),
        _ => Err(ValidationError::MissingField { field }),
    }
}

fn check_name(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    let len = trimmed.chars().count();
    if (NAME_MIN_LEN..=NAME_MAX_LEN).contains(&len) {
        Ok(trimmed.to_string())
    } else {
        Err(ValidationError::InvalidName)
    }
}

fn check_email(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.chars().count() <= EMAIL_MAX_LEN && email_regex().is_match(trimmed) {
        Ok(trimmed.to_string())
    } else {
        Err(ValidationError::InvalidEmail)
    }
}

fn check_phone(raw: &str) -> Result<String, ValidationError> {
    if phone_regex().is_match(raw) {
        Ok(raw.to_string())
    } else {
        Err(ValidationError::InvalidPhone)
    }
}

fn check_salary(raw: &str) -> Result<f64, ValidationError> {
    match raw.trim().parse::<f64>() {
        Ok(salary) if salary.is_finite() && salary > 0.0 => Ok(salary),
        _ => Err(ValidationError::InvalidSalary),
    }
}

fn check_department(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        Err(ValidationError::MissingField { field: "department" })
    } else {
        Ok(trimmed.to_string())
    }
}

/// Validate a complete candidate and return its normalized form.
///
/// Presence of all five fields is checked first, then name, email, phone and
/// salary in that order; the first failure is reported.
pub fn validate(candidate: &CandidateEmployee) -> Result<NewEmployee, ValidationError> {
    let name = required(&candidate.name, "name")?;
    let email = required(&candidate.email, "email")?;
    let phone = required(&candidate.phone, "phone")?;
    let department = required(&candidate.department, "department")?;
    let salary = required(&candidate.salary, "salary")?;

    let name = check_name(name)?;
    let email = check_email(email)?;
    let phone = check_phone(phone)?;
    let salary = check_salary(salary)?;
    let department = check_department(department)?;

    Ok(NewEmployee {
        name,
        email,
        phone,
        department,
        salary,
    })
}

/// Merge a partial update onto the stored record, validating only the
/// supplied fields.
pub fn validate_patch(
    patch: &EmployeePatch,
    existing: &Employee,
) -> Result<NewEmployee, ValidationError> {
    let name = match patch.name.as_deref() {
        Some(raw) => check_name(raw)?,
        None => existing.name.clone(),
    };
    let email = match patch.email.as_deref() {
        Some(raw) => check_email(raw)?,
        None => existing.email.clone(),
    };
    let phone = match patch.phone.as_deref() {
        Some(raw) => check_phone(raw)?,
        None => existing.phone.clone(),
    };
    let department = match patch.department.as_deref() {
        Some(raw) => check_department(raw)?,
        None => existing.department.clone(),
    };
    let salary = match patch.salary.as_deref() {
        Some(raw) => check_salary(raw)?,
        None => existing.salary,
    };

    Ok(NewEmployee {
        name,
        email,
        phone,
        department,
        salary,
    })
}

#[derive(Serialize, JsonSchema)]
struct EmployeeInputDoc {
    /// 2-60 characters after trimming.
    name: String,
    /// `local@domain.tld`, at most 100 characters.
    email: String,
    /// 7-15 digits; numbers are accepted and stringified.
    phone: String,
    department: String,
    /// Positive number; numeric strings are accepted.
    salary: f64,
}

#[derive(Serialize, JsonSchema)]
struct EmployeePatchDoc {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    department: Option<String>,
    #[serde(default)]
    salary: Option<f64>,
}

impl JsonSchema for CandidateEmployee {
    fn schema_name() -> String {
        "EmployeeInput".to_string()
    }

    fn json_schema(generator: &mut schemars::r#gen::SchemaGenerator) -> schemars::schema::Schema {
        EmployeeInputDoc::json_schema(generator)
    }
}

impl JsonSchema for EmployeePatch {
    fn schema_name() -> String {
        "EmployeePatch".to_string()
    }

    fn json_schema(generator: &mut schemars::r#gen::SchemaGenerator) -> schemars::schema::Schema {
        EmployeePatchDoc::json_schema(generator)
    }
}
