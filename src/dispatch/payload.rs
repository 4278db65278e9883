use serde_json::{Map, Value};

use crate::error::ApiError;

/// Key under which the `{id}` path segment is merged into the payload
pub const PATH_ID_KEY: &str = "id";

/// Untyped request body: a JSON object, possibly empty, plus merged path parameters
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Payload {
    fields: Map<String, Value>,
}

impl Payload {
    /// Decode a raw body. An empty (or all-whitespace) body is an empty object;
    /// anything else must be a JSON object.
    pub fn parse(body: &[u8]) -> Result<Self, ApiError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }

        match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(fields)) => Ok(Self { fields }),
            Ok(_) => Err(ApiError::invalid_json("request body must be a JSON object")),
            Err(e) => Err(ApiError::invalid_json(format!("invalid JSON body: {}", e))),
        }
    }

    /// Merge a path parameter; it overrides a body field of the same name
    pub fn with_path_param(mut self, key: &str, value: impl Into<String>) -> Self {
        self.fields.insert(key.to_string(), Value::String(value.into()));
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Non-empty string field
    pub fn require_str(&self, key: &str) -> Result<&str, ApiError> {
        match self.fields.get(key) {
            Some(Value::String(s)) if !s.is_empty() => Ok(s),
            _ => Err(ApiError::validation(format!("{} is required", key))),
        }
    }

    /// Boolean field; the usual string spellings of true/false are accepted too
    pub fn require_flag(&self, key: &str) -> Result<bool, ApiError> {
        match self.fields.get(key) {
            Some(Value::Bool(b)) => Ok(*b),
            Some(Value::String(s)) => {
                parse_flag(s).ok_or_else(|| ApiError::validation(format!("invalid value for {}", key)))
            }
            _ => Err(ApiError::validation(format!(
                "{} parameter is required and must be boolean",
                key
            ))),
        }
    }

    /// Whole JSON number that fits in an `i32`; fractions and strings are rejected
    pub fn require_whole_number(&self, key: &str) -> Result<i32, ApiError> {
        let invalid = || ApiError::validation(format!("{} is required and must be a whole number", key));

        let number = match self.fields.get(key) {
            Some(Value::Number(n)) => n,
            _ => return Err(invalid()),
        };

        if let Some(i) = number.as_i64() {
            return i32::try_from(i).map_err(|_| invalid());
        }
        if let Some(u) = number.as_u64() {
            return i32::try_from(u).map_err(|_| invalid());
        }
        match number.as_f64() {
            Some(f) if f.fract() == 0.0 && f >= i32::MIN as f64 && f <= i32::MAX as f64 => Ok(f as i32),
            _ => Err(invalid()),
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

/// Typed, validated request decoded from a `Payload`
pub trait FromPayload: Sized {
    fn from_payload(payload: &Payload) -> Result<Self, ApiError>;
}

/// For handlers that take no input
impl FromPayload for () {
    fn from_payload(_payload: &Payload) -> Result<Self, ApiError> {
        Ok(())
    }
}
