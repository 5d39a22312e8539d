use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::api::{CreateKudosBody, ListKudosQuery};
use crate::models::{KUDOS_CATEGORIES, KudosCategory, KudosSubmission, PageParams};

pub const MESSAGE_MAX_CHARS: usize = 500;
pub const LIMIT_MIN: i64 = 1;
pub const LIMIT_MAX: i64 = 100;
pub const DEFAULT_LIMIT: u32 = 20;
pub const DEFAULT_OFFSET: u32 = 0;

/// Per-field validation failures, keyed by the wire-format field name.
/// Serializes to the `errors` object of a 400 body. The same checks run
/// client-side before submission and server-side on the received payload;
/// the server remains authoritative.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationError {
    field_errors: BTreeMap<String, Vec<String>>,
}

impl ValidationError {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.field_errors
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.field_errors.is_empty()
    }

    pub fn field(&self, name: &str) -> Option<&[String]> {
        self.field_errors.get(name).map(Vec::as_slice)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.field_errors {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{}: {}", field, message)?;
                first = false;
            }
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

// -- Sender header --

/// The `x-user-id` header. There is no identity verification behind it;
/// the contract only requires UUID syntax.
pub struct SenderIdHeader;

impl SenderIdHeader {
    pub fn parse(raw: Option<&str>) -> Result<Uuid, ValidationError> {
        let mut errors = ValidationError::new();
        match raw {
            None => {
                errors.push("senderId", "Header is required.");
                Err(errors)
            }
            Some(value) => Uuid::parse_str(value).map_err(|_| {
                errors.push("senderId", "Must be a valid UUID.");
                errors
            }),
        }
    }
}

// -- Creation body --

impl CreateKudosBody {
    /// Decode a raw JSON payload into the body shape, reporting a field
    /// error for anything missing or of the wrong type. Payloads that
    /// bypass the typed client get the same error taxonomy this way.
    pub fn from_value(value: &Value) -> Result<Self, ValidationError> {
        let mut errors = ValidationError::new();

        let Some(object) = value.as_object() else {
            errors.push("body", "Must be a JSON object.");
            return Err(errors);
        };

        let receiver_id = string_field(object, "receiverId", &mut errors);
        let message = string_field(object, "message", &mut errors);
        let category = string_field(object, "category", &mut errors);

        if errors.is_empty() {
            Ok(Self {
                receiver_id: receiver_id.unwrap_or_default(),
                message: message.unwrap_or_default(),
                category: category.unwrap_or_default(),
            })
        } else {
            Err(errors)
        }
    }

    /// Apply the creation constraints: receiver UUID syntax, trimmed
    /// message of 1–500 characters, category membership. All violated
    /// fields are reported together.
    pub fn validate(&self) -> Result<KudosSubmission, ValidationError> {
        let mut errors = ValidationError::new();

        let receiver_id = Uuid::parse_str(&self.receiver_id)
            .map_err(|_| errors.push("receiverId", "Must be a valid UUID."))
            .ok();

        let message = self.message.trim();
        if message.is_empty() {
            errors.push("message", "Must not be empty.");
        } else if message.chars().count() > MESSAGE_MAX_CHARS {
            errors.push(
                "message",
                format!("Must be at most {} characters.", MESSAGE_MAX_CHARS),
            );
        }

        let category = KudosCategory::parse(&self.category);
        if category.is_none() {
            let allowed: Vec<&str> = KUDOS_CATEGORIES.iter().map(|c| c.as_str()).collect();
            errors.push(
                "category",
                format!("Must be one of: {}.", allowed.join(", ")),
            );
        }

        match (receiver_id, category) {
            (Some(receiver_id), Some(category)) if errors.is_empty() => Ok(KudosSubmission {
                receiver_id,
                message: message.to_string(),
                category,
            }),
            _ => Err(errors),
        }
    }
}

fn string_field(
    object: &serde_json::Map<String, Value>,
    name: &str,
    errors: &mut ValidationError,
) -> Option<String> {
    match object.get(name) {
        None | Some(Value::Null) => {
            errors.push(name, "Is required.");
            None
        }
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            errors.push(name, "Must be a string.");
            None
        }
    }
}

// -- List query --

impl ListKudosQuery {
    /// Coerce the string query parameters to integers, then range-check.
    /// Absent parameters take the documented defaults.
    pub fn validate(&self) -> Result<PageParams, ValidationError> {
        let mut errors = ValidationError::new();

        let limit = match coerce_integer(self.limit.as_deref(), "limit", &mut errors) {
            Some(value) if value < LIMIT_MIN => {
                errors.push("limit", format!("Must be at least {}.", LIMIT_MIN));
                None
            }
            Some(value) if value > LIMIT_MAX => {
                errors.push("limit", format!("Must be at most {}.", LIMIT_MAX));
                None
            }
            Some(value) => Some(value as u32),
            None => None,
        };

        let offset = match coerce_integer(self.offset.as_deref(), "offset", &mut errors) {
            Some(value) if value < 0 => {
                errors.push("offset", "Must be at least 0.");
                None
            }
            Some(value) => Some(value as u32),
            None => None,
        };

        if errors.is_empty() {
            Ok(PageParams {
                limit: limit.unwrap_or(DEFAULT_LIMIT),
                offset: offset.unwrap_or(DEFAULT_OFFSET),
            })
        } else {
            Err(errors)
        }
    }
}

/// Absent values coerce to `None` without error; present values must parse
/// as integers. Returns `None` after recording an error for bad input, so
/// validation keeps collecting the other fields.
fn coerce_integer(
    raw: Option<&str>,
    field: &str,
    errors: &mut ValidationError,
) -> Option<i64> {
    let raw = raw?;
    match raw.parse::<i64>() {
        Ok(value) => Some(value),
        Err(_) => {
            errors.push(field, "Must be an integer.");
            None
        }
    }
}
