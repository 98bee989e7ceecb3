//! Folding raw failures into [`ErrorInfo`].
//!
//! The gateway spells the same concept several ways depending on which
//! backend service answered. The first present key in each list below wins:
//!
//! | Concept  | Keys, in priority order                                   |
//! |----------|-----------------------------------------------------------|
//! | code     | `error_code`, `code`, `errorCode`                         |
//! | message  | `error_message`, `errorMessage`, `actionMessage`, `message` |
//! | retry    | `retryable` (absent means `false`)                        |
//! | details  | `error_details`                                           |
//!
//! When no message is present the HTTP status picks a fallback text.

use chq_core::{ErrorInfo, ErrorKind};
use serde_json::Value;

use crate::transport::{Method, TransportError, TransportErrorKind};

const CODE_KEYS: [&str; 3] = ["error_code", "code", "errorCode"];
const MESSAGE_KEYS: [&str; 4] = ["error_message", "errorMessage", "actionMessage", "message"];

/// Fallback text for statuses without a business message.
pub fn status_message(status: u16) -> &'static str {
    match status {
        400 => "The request was invalid",
        401 => "Your session has expired, please sign in again",
        403 => "You are not allowed to perform this action",
        404 => "The requested resource was not found",
        408 => "The server took too long to respond",
        409 => "The request conflicts with the current state",
        429 => "Too many requests, please try again later",
        500 => "An internal server error occurred",
        502..=504 => "The service is temporarily unavailable",
        _ => "An unexpected error occurred",
    }
}

/// Normalises a failure that happened before any response arrived.
///
/// Transport failures are never retryable; only the server can say otherwise.
pub fn from_transport(err: &TransportError, method: Method, url: &str) -> ErrorInfo {
    let (kind, message) = match err.kind {
        TransportErrorKind::Timeout => (ErrorKind::Timeout, "The request timed out"),
        TransportErrorKind::Connect | TransportErrorKind::Other => {
            (ErrorKind::Network, "Unable to reach the server")
        }
    };
    let mut info = ErrorInfo::new(kind, message).with_request(method.as_str(), url);
    info.transport_message = Some(err.message.clone());
    info
}

/// Normalises a non-success response.
pub fn from_response(status: u16, body: &[u8], method: Method, url: &str) -> ErrorInfo {
    let parsed: Option<Value> = serde_json::from_slice(body).ok();
    let object = parsed.as_ref().and_then(Value::as_object);

    let code = object.and_then(|o| first_present(o, &CODE_KEYS)).and_then(scalar_string);
    let message = object
        .and_then(|o| first_present(o, &MESSAGE_KEYS))
        .and_then(scalar_string)
        .filter(|m| !m.trim().is_empty());
    let retryable = object
        .and_then(|o| o.get("retryable"))
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let details = object.and_then(|o| o.get("error_details")).cloned();

    let kind = if code.is_some() {
        ErrorKind::Business
    } else {
        ErrorKind::Http
    };
    let mut info = ErrorInfo::new(
        kind,
        message.unwrap_or_else(|| status_message(status).to_string()),
    )
    .with_status(status)
    .with_retryable(retryable)
    .with_request(method.as_str(), url);
    info.code = code;
    info.details = details;
    info.response = parsed;
    info
}

/// Normalises a success response whose body did not match the expected shape.
pub fn decode_failure(
    err: &serde_json::Error,
    status: u16,
    method: Method,
    url: &str,
) -> ErrorInfo {
    let mut info = ErrorInfo::new(ErrorKind::Decode, "The server returned an unexpected response")
        .with_status(status)
        .with_request(method.as_str(), url);
    info.transport_message = Some(err.to_string());
    info
}

fn first_present<'a>(object: &'a serde_json::Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| object.get(*k))
        .find(|v| !v.is_null())
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
