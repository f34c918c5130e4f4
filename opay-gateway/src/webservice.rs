//! Typed view over web-service responses.
//!
//! The gateway answers web-service calls with JSON of the shape
//!
//! ```json
//! {"response": {"language": "ENG", "result": {...}, "errors": [
//!     {"code": "...", "message": "...", "solutions": ["..."]}
//! ]}}
//! ```
//!
//! where `errors` is only present on (partial) failure.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{GatewayError, Result};

/// Body of a web-service call.
#[derive(Clone, Debug, PartialEq)]
pub enum WebServiceResponse {
    /// Trimmed body, returned when JSON decoding was not requested.
    Raw(String),
    /// Decoded JSON whose top-level value is an object or an array.
    Json(Value),
}

/// One entry of `response.errors`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebServiceErrorRecord {
    /// Gateway error code.
    pub code: String,
    /// Human readable message.
    pub message: String,
    /// Suggested fixes.
    pub solutions: Vec<String>,
}

impl WebServiceResponse {
    /// Interpret a raw response body.
    ///
    /// The body is trimmed first. With `decode_json` it must be a JSON object
    /// or array: invalid JSON (or `null`) fails with
    /// [`GatewayError::JsonDecode`], other scalars with
    /// [`GatewayError::WrongJsonFormat`].
    pub fn from_body(body: &[u8], decode_json: bool) -> Result<Self> {
        let text = String::from_utf8_lossy(body);
        let text = text.trim();

        if !decode_json {
            return Ok(Self::Raw(text.to_string()));
        }

        match serde_json::from_str::<Value>(text)? {
            Value::Null => Err(GatewayError::JsonDecode(
                "wrong JSON format or the body is empty".to_string(),
            )),
            value @ (Value::Object(_) | Value::Array(_)) => Ok(Self::Json(value)),
            other => Err(GatewayError::WrongJsonFormat(format!(
                "expected an object or array from the web service, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Raw text, if JSON decoding was not requested.
    pub fn as_raw(&self) -> Option<&str> {
        match self {
            Self::Raw(text) => Some(text),
            Self::Json(_) => None,
        }
    }

    /// Decoded JSON, if requested.
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Raw(_) => None,
            Self::Json(value) => Some(value),
        }
    }

    /// The `response` object, if present.
    pub fn response(&self) -> Option<&Value> {
        self.as_json()?.get("response")
    }

    /// `response.result`, if present.
    pub fn result(&self) -> Option<&Value> {
        self.response()?.get("result")
    }

    /// `response.language`, if present.
    pub fn language(&self) -> Option<&str> {
        self.response()?.get("language")?.as_str()
    }

    /// Records listed under `response.errors`. Malformed entries are kept
    /// with whatever fields could be read.
    pub fn errors(&self) -> Vec<WebServiceErrorRecord> {
        let Some(Value::Array(entries)) = self.response().and_then(|r| r.get("errors")) else {
            return Vec::new();
        };
        entries.iter().map(error_record).collect()
    }

    /// Returns true if `response.errors` lists at least one record.
    pub fn has_errors(&self) -> bool {
        !self.errors().is_empty()
    }
}

fn error_record(entry: &Value) -> WebServiceErrorRecord {
    let solutions = match entry.get("solutions") {
        Some(Value::Array(items)) => items.iter().filter_map(scalar_text).collect(),
        Some(other) => scalar_text(other).into_iter().collect(),
        None => Vec::new(),
    };

    WebServiceErrorRecord {
        code: entry.get("code").and_then(scalar_text).unwrap_or_default(),
        message: entry.get("message").and_then(scalar_text).unwrap_or_default(),
        solutions,
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
