// ── Failure message normalization ──
//
// Host bridges surface failures in several shapes: plain text, untyped
// JSON payloads from the git bridge, and native errors whose display
// message may itself be a JSON envelope. This module flattens all of
// them into one human-readable string. Best-effort by contract --
// unrecognized shapes degrade to a fallback, never a panic.

use std::error::Error;

use serde_json::Value;
use tracing::debug;

/// What an unrecognized failure shape collapses to.
const FALLBACK: &str = "Error";

/// A failure value surfaced by a host bridge, before normalization.
#[derive(Debug)]
pub enum RawFailure {
    /// Plain text reported by the host.
    Text(String),
    /// Structured payload from a tool bridge (untyped JSON).
    Payload(Value),
    /// A native error whose message may itself be a JSON envelope.
    Native(Box<dyn Error + Send + Sync>),
}

/// Normalize a heterogeneous failure value into a human-readable string.
pub fn format_error(failure: &RawFailure) -> String {
    match failure {
        RawFailure::Text(text) => text.clone(),
        RawFailure::Payload(payload) => format_payload(payload),
        RawFailure::Native(error) => format_native(error.as_ref()),
    }
}

/// Known git-bridge failures carry an error code alongside the message.
fn format_payload(payload: &Value) -> String {
    if payload.get("gitErrorCode").is_some() {
        if let Some(message) = payload.get("message").and_then(Value::as_str) {
            return format!("{message}. Please check git output for more details");
        }
    }
    debug!("unrecognized failure payload shape");
    FALLBACK.to_owned()
}

/// Native errors sometimes wrap a JSON envelope in their message:
/// `{"message": "...", "errors": [...]}`. Unwrap it when present,
/// otherwise pass the display message through untouched.
fn format_native(error: &(dyn Error + Send + Sync)) -> String {
    let message = error.to_string();

    let Ok(Value::Object(envelope)) = serde_json::from_str::<Value>(&message) else {
        return message;
    };
    let Some(inner) = envelope.get("message").and_then(Value::as_str) else {
        return message;
    };

    let details: Vec<&str> = match envelope.get("errors").and_then(Value::as_array) {
        Some(errors) => errors.iter().filter_map(sub_error_message).collect(),
        None => Vec::new(),
    };

    if details.is_empty() {
        inner.to_owned()
    } else {
        format!("{inner}: {}", details.join(", "))
    }
}

/// A sub-error is either a bare string or an object with a `message` field.
fn sub_error_message(value: &Value) -> Option<&str> {
    match value {
        Value::String(text) => Some(text),
        Value::Object(map) => map.get("message").and_then(Value::as_str),
        _ => None,
    }
}
