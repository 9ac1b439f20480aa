//! Marketplace REST API access.
//!
//! Requests go through a [`Transport`], so the sync coordinator can run
//! against [`HttpTransport`] in production and an in-memory fake in tests.
//! Every response body is an envelope:
//!
//! ```json
//! { "success": true, "data": ..., "message": "...", "user": ..., "errors": ... }
//! ```
//!
//! [`decode`] turns a raw response into the payload or an [`ApiError`].

mod http;

pub use http::HttpTransport;

use std::future::Future;

use bazaar_core::validation::FieldErrors;
use secrecy::SecretString;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;

/// HTTP methods the marketplace API uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One request to the API.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Path below the API base URL, starting with `/`.
    pub path: String,
    pub body: Option<Value>,
    /// Sent as `Authorization: Bearer <token>` when present.
    pub bearer: Option<SecretString>,
}

impl ApiRequest {
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            bearer: None,
        }
    }

    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    #[must_use]
    pub fn bearer(mut self, token: SecretString) -> Self {
        self.bearer = Some(token);
        self
    }
}

/// A raw response: status code and parsed JSON body.
///
/// Non-JSON bodies are carried as a JSON string; empty bodies as `null`.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    #[must_use]
    pub const fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }
}

/// Sends requests to the marketplace API.
pub trait Transport: Send + Sync {
    /// Send one request and return whatever the server answered.
    ///
    /// Only failures to obtain a response are errors here; error statuses
    /// come back as an [`ApiResponse`] and are interpreted by [`decode`].
    fn send(&self, request: ApiRequest)
    -> impl Future<Output = Result<ApiResponse, ApiError>> + Send;
}

/// Interpret a response: the envelope payload on success, or the error.
///
/// The payload is `data`, falling back to `user`; a missing payload decodes
/// from `null`.
///
/// # Errors
///
/// - [`ApiError::Unauthorized`] for 401
/// - [`ApiError::Status`] for any other non-2xx status
/// - [`ApiError::Unsuccessful`] for a 2xx envelope with `success: false`
/// - [`ApiError::Decode`] if the payload does not deserialize into `T`
pub fn decode<T: DeserializeOwned>(response: ApiResponse) -> Result<T, ApiError> {
    let ApiResponse { status, body } = response;

    if status == 401 {
        return Err(ApiError::Unauthorized);
    }

    if !(200..300).contains(&status) {
        return Err(ApiError::Status {
            status,
            message: message_of(&body).unwrap_or_else(|| default_message(status)),
            field_errors: body.get("errors").map(parse_field_errors).unwrap_or_default(),
        });
    }

    if body.get("success").and_then(Value::as_bool) == Some(false) {
        return Err(ApiError::Unsuccessful {
            message: message_of(&body).unwrap_or_else(|| "request was not successful".into()),
        });
    }

    let payload = match body {
        Value::Object(mut envelope) => envelope
            .remove("data")
            .or_else(|| envelope.remove("user"))
            .unwrap_or(Value::Null),
        other => other,
    };

    serde_json::from_value(payload).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Like [`decode`], but ignores the payload.
///
/// # Errors
///
/// Same as [`decode`], minus [`ApiError::Decode`].
pub fn expect_success(response: ApiResponse) -> Result<(), ApiError> {
    decode::<serde::de::IgnoredAny>(response).map(|_| ())
}

fn message_of(body: &Value) -> Option<String> {
    match body {
        Value::String(text) if !text.trim().is_empty() => Some(text.trim().to_owned()),
        Value::Object(envelope) => envelope
            .get("message")
            .or_else(|| envelope.get("error"))
            .and_then(Value::as_str)
            .map(str::to_owned),
        _ => None,
    }
}

fn default_message(status: u16) -> String {
    match status {
        400 => "Bad request".into(),
        403 => "Forbidden".into(),
        404 => "Not found".into(),
        409 => "Conflict".into(),
        422 => "Invalid input".into(),
        500..=599 => "Server error".into(),
        _ => format!("HTTP {status}"),
    }
}

/// Read field errors from the `errors` member of an error body.
///
/// Accepts an object of `field -> message` or an array of
/// `{ field|path|param, message|msg }` entries; the first message per field
/// wins.
#[must_use]
pub fn parse_field_errors(errors: &Value) -> FieldErrors {
    let mut parsed = FieldErrors::new();
    match errors {
        Value::Object(map) => {
            for (field, message) in map {
                let message = match message {
                    Value::String(text) => Some(text.as_str()),
                    Value::Object(detail) => detail.get("message").and_then(Value::as_str),
                    _ => None,
                };
                if let Some(message) = message {
                    parsed.insert(field.clone(), message);
                }
            }
        }
        Value::Array(entries) => {
            for entry in entries {
                let field = ["field", "path", "param"]
                    .iter()
                    .find_map(|key| entry.get(*key).and_then(Value::as_str));
                let message = ["message", "msg"]
                    .iter()
                    .find_map(|key| entry.get(*key).and_then(Value::as_str));
                if let (Some(field), Some(message)) = (field, message) {
                    if parsed.get(field).is_none() {
                        parsed.insert(field, message);
                    }
                }
            }
        }
        _ => {}
    }
    parsed
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_data_payload() {
        let response = ApiResponse::new(200, json!({"success": true, "data": [1, 2, 3]}));
        let data: Vec<u32> = decode(response).unwrap();
        assert_eq!(data, [1, 2, 3]);
    }

    #[test]
    fn test_decode_user_payload() {
        let response = ApiResponse::new(200, json!({"success": true, "user": {"name": "meera"}}));
        let user: Value = decode(response).unwrap();
        assert_eq!(user["name"], "meera");
    }

    #[test]
    fn test_unsuccessful_envelope() {
        let response = ApiResponse::new(200, json!({"success": false, "message": "Out of stock"}));
        let err = expect_success(response).unwrap_err();
        assert!(matches!(err, ApiError::Unsuccessful { message } if message == "Out of stock"));
    }

    #[test]
    fn test_error_status_with_field_errors() {
        let response = ApiResponse::new(
            400,
            json!({
                "success": false,
                "message": "Validation failed",
                "errors": [
                    {"path": "pincode", "msg": "Invalid pincode"},
                    {"path": "pincode", "msg": "Second message"},
                    {"field": "city", "message": "City is required"}
                ]
            }),
        );
        match expect_success(response).unwrap_err() {
            ApiError::Status {
                status,
                message,
                field_errors,
            } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Validation failed");
                assert_eq!(field_errors.get("pincode"), Some("Invalid pincode"));
                assert_eq!(field_errors.get("city"), Some("City is required"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_object_field_errors() {
        let errors = parse_field_errors(&json!({
            "title": "Title is taken",
            "price": {"message": "Price must be positive"},
            "ignored": 3
        }));
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("price"), Some("Price must be positive"));
    }

    #[test]
    fn test_unauthorized_and_plain_text() {
        let err = expect_success(ApiResponse::new(401, Value::Null)).unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized));

        let err = expect_success(ApiResponse::new(502, json!("Bad Gateway"))).unwrap_err();
        assert!(matches!(err, ApiError::Status { message, .. } if message == "Bad Gateway"));

        let err = expect_success(ApiResponse::new(404, Value::Null)).unwrap_err();
        assert!(matches!(err, ApiError::Status { message, .. } if message == "Not found"));
    }

    #[test]
    fn test_decode_shape_mismatch() {
        let response = ApiResponse::new(200, json!({"success": true, "data": {"a": 1}}));
        let err = decode::<Vec<u32>>(response).unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }
}
