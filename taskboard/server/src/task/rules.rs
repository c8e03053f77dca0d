//! Field constraints, status parsing and defaulting for task records.
//!
//! Everything here is independent of HTTP and of the store: a proposed
//! creation or update goes in, a normalized record (or every field that
//! failed) comes out.

use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

use crate::entities::sea_orm_active_enums::TaskStatus;
use crate::task::Task;

/// Longest accepted task name, counted in characters after trimming.
pub const MAX_NAME_LENGTH: usize = 100;

/// Candidate record submitted to create a task.
///
/// `name` and `status` keep an explicit `null` apart from an omitted field
/// (`Some(None)` versus `None`) so that `null` can be rejected.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct NewTask {
    /// Task title, required
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = String, example = "Buy milk", max_length = 100)]
    pub name: Option<Option<String>>,
    /// Optional description
    #[schema(example = "2%")]
    pub text: Option<String>,
    /// One of `Pending`, `Progress`, `Done`; defaults to `Pending`
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>, example = "Pending")]
    pub status: Option<Option<String>>,
}

/// Partial update of a task. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct TaskPatch {
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>, max_length = 100)]
    pub name: Option<Option<String>>,
    /// An empty or whitespace-only text clears the description.
    pub text: Option<String>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>, example = "Done")]
    pub status: Option<Option<String>>,
}

/// Marks a field that appeared in the body, even as `null`.
fn present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

/// The normalized field values of a task that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidTask {
    pub name: String,
    pub text: Option<String>,
    pub status: TaskStatus,
}

/// A single rejected field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Raised when a creation or update is not acceptable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid task: {}", describe(.errors))]
pub struct ValidationError {
    errors: Vec<FieldError>,
}

impl ValidationError {
    pub fn new(errors: Vec<FieldError>) -> Self {
        Self { errors }
    }

    /// Returns every field that failed, in field order.
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Consumes the error, returning the failing fields.
    pub fn into_errors(self) -> Vec<FieldError> {
        self.errors
    }
}

fn describe(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|error| format!("{}: {}", error.field, error.message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Validates a creation request.
///
/// `name` is required; `status` defaults to [`TaskStatus::Pending`] when omitted.
pub fn validate_for_create(input: NewTask) -> Result<ValidTask, ValidationError> {
    let mut errors = Vec::new();

    let name = match input.name {
        Some(Some(raw)) => normalize_name(&raw, &mut errors),
        Some(None) => reject_null("name", &mut errors),
        None => {
            errors.push(FieldError::new("name", "name is required"));
            None
        }
    };
    let text = input.text.as_deref().and_then(normalize_text);
    let status = match input.status {
        Some(Some(raw)) => parse_status(&raw, &mut errors),
        Some(None) => reject_null("status", &mut errors),
        None => Some(TaskStatus::default()),
    };

    match (name, status) {
        (Some(name), Some(status)) if errors.is_empty() => Ok(ValidTask { name, text, status }),
        _ => Err(ValidationError::new(errors)),
    }
}

/// Validates a patch against the record it modifies and returns the merged result.
///
/// The same field rules as [`validate_for_create`] apply, but only to the
/// fields actually supplied.
pub fn validate_for_update(existing: &Task, patch: TaskPatch) -> Result<ValidTask, ValidationError> {
    let mut errors = Vec::new();

    let name = match patch.name {
        Some(Some(raw)) => normalize_name(&raw, &mut errors),
        Some(None) => reject_null("name", &mut errors),
        None => Some(existing.name().to_string()),
    };
    let text = match patch.text.as_deref() {
        Some(raw) => normalize_text(raw),
        None => existing.text().map(str::to_string),
    };
    let status = match patch.status {
        Some(Some(raw)) => parse_status(&raw, &mut errors),
        Some(None) => reject_null("status", &mut errors),
        None => Some(existing.status()),
    };

    match (name, status) {
        (Some(name), Some(status)) if errors.is_empty() => Ok(ValidTask { name, text, status }),
        _ => Err(ValidationError::new(errors)),
    }
}

fn reject_null<T>(field: &str, errors: &mut Vec<FieldError>) -> Option<T> {
    errors.push(FieldError::new(field, format!("{field} must not be null")));
    None
}

fn normalize_name(raw: &str, errors: &mut Vec<FieldError>) -> Option<String> {
    let name = raw.trim();
    if name.is_empty() {
        errors.push(FieldError::new("name", "name must not be empty"));
        return None;
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        errors.push(FieldError::new(
            "name",
            format!("name must be at most {MAX_NAME_LENGTH} characters"),
        ));
        return None;
    }
    Some(name.to_string())
}

fn normalize_text(raw: &str) -> Option<String> {
    let text = raw.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn parse_status(raw: &str, errors: &mut Vec<FieldError>) -> Option<TaskStatus> {
    match raw.parse() {
        Ok(status) => Some(status),
        Err(err) => {
            errors.push(FieldError::new("status", err.to_string()));
            None
        }
    }
}

/// Timestamp stamped on a new task, used for both `created_at` and `updated_at`.
///
/// Truncated to microseconds so the value survives a round trip through the store unchanged.
pub fn creation_timestamp(now: DateTime<Utc>) -> DateTime<Utc> {
    now.trunc_subsecs(6)
}

/// Next `updated_at` for a task last touched at `previous`.
///
/// Always strictly later than `previous`, even if the clock has not advanced.
pub fn refreshed_timestamp(previous: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    now.trunc_subsecs(6)
        .max(previous + Duration::milliseconds(1))
}
