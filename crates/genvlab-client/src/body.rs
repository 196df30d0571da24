//! Response body classification
//!
//! Every directory response body is classified before it is interpreted:
//! empty bodies are absent values, JSON bodies are validated against the
//! shape each endpoint expects, and anything else is kept as raw text for
//! the caller to interpret.

use genvlab_core::{Device, Environment, GenvError, GenvResult};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

/// A classified response body
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Zero-length body
    Empty,
    /// Body that parsed as JSON
    Json { value: Value, raw: String },
    /// Non-empty body that is not JSON
    Text(String),
}

impl Payload {
    /// Classify a raw body
    pub fn parse(raw: String) -> Self {
        if raw.is_empty() {
            return Payload::Empty;
        }

        match serde_json::from_str(&raw) {
            Ok(value) => Payload::Json { value, raw },
            Err(e) => {
                warn!(error = %e, "Not a JSON response body");
                Payload::Text(raw)
            }
        }
    }

    /// Raw body text
    pub fn raw(&self) -> &str {
        match self {
            Payload::Empty => "",
            Payload::Json { raw, .. } | Payload::Text(raw) => raw,
        }
    }

    /// Message carried by an error response
    ///
    /// Uses the body's `message` field when it is a non-empty string, and
    /// the raw body otherwise.
    pub fn error_message(&self) -> String {
        if let Payload::Json { value, .. } = self {
            if let Some(message) = value.get("message").and_then(Value::as_str) {
                if !message.is_empty() {
                    return message.to_string();
                }
            }
        }
        self.raw().to_string()
    }

    /// Device table
    pub fn into_devices(self) -> GenvResult<Vec<Device>> {
        self.into_list()
    }

    /// Environment list
    pub fn into_environments(self) -> GenvResult<Vec<Environment>> {
        self.into_list()
    }

    /// Bound environment of a find response
    pub fn into_binding(self) -> GenvResult<Option<String>> {
        match self {
            Payload::Empty => Ok(None),
            Payload::Json { value, raw } => match value {
                Value::Null => Ok(None),
                Value::String(eid) => Ok(Some(eid).filter(|e| !e.is_empty())),
                _ => Err(GenvError::MalformedResponse { body: raw }),
            },
            Payload::Text(raw) => {
                warn!(body = %raw, "Using non-JSON find response as environment id");
                Ok(Some(raw))
            }
        }
    }

    fn into_list<T: DeserializeOwned>(self) -> GenvResult<Vec<T>> {
        match self {
            Payload::Empty => Ok(Vec::new()),
            Payload::Json { value, raw } => serde_json::from_value(value).map_err(|e| {
                warn!(error = %e, body = %raw, "Unexpected response shape");
                GenvError::MalformedResponse { body: raw }
            }),
            Payload::Text(raw) => Err(GenvError::MalformedResponse { body: raw }),
        }
    }
}
