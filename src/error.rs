//! Unified client error model and mapping helpers.
//! This module provides a common error enum used across the HTTP layer, the
//! typed API groups and the console, along with mappers from transport errors
//! and HTTP statuses.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ApiError {
    BadRequest { code: String, message: String },
    Auth { code: String, message: String },
    Forbidden { code: String, message: String },
    NotFound { code: String, message: String },
    Conflict { code: String, message: String },
    Server { code: String, message: String },
    Network { code: String, message: String },
    Timeout { code: String, message: String },
    Decode { code: String, message: String },
    Config { code: String, message: String },
}

impl ApiError {
    pub fn code_str(&self) -> &str {
        match self {
            ApiError::BadRequest { code, .. }
            | ApiError::Auth { code, .. }
            | ApiError::Forbidden { code, .. }
            | ApiError::NotFound { code, .. }
            | ApiError::Conflict { code, .. }
            | ApiError::Server { code, .. }
            | ApiError::Network { code, .. }
            | ApiError::Timeout { code, .. }
            | ApiError::Decode { code, .. }
            | ApiError::Config { code, .. } => code.as_str(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest { message, .. }
            | ApiError::Auth { message, .. }
            | ApiError::Forbidden { message, .. }
            | ApiError::NotFound { message, .. }
            | ApiError::Conflict { message, .. }
            | ApiError::Server { message, .. }
            | ApiError::Network { message, .. }
            | ApiError::Timeout { message, .. }
            | ApiError::Decode { message, .. }
            | ApiError::Config { message, .. } => message.as_str(),
        }
    }

    pub fn bad_request<S: Into<String>>(code: S, msg: S) -> Self { ApiError::BadRequest { code: code.into(), message: msg.into() } }
    pub fn auth<S: Into<String>>(code: S, msg: S) -> Self { ApiError::Auth { code: code.into(), message: msg.into() } }
    pub fn forbidden<S: Into<String>>(code: S, msg: S) -> Self { ApiError::Forbidden { code: code.into(), message: msg.into() } }
    pub fn not_found<S: Into<String>>(code: S, msg: S) -> Self { ApiError::NotFound { code: code.into(), message: msg.into() } }
    pub fn conflict<S: Into<String>>(code: S, msg: S) -> Self { ApiError::Conflict { code: code.into(), message: msg.into() } }
    pub fn server<S: Into<String>>(code: S, msg: S) -> Self { ApiError::Server { code: code.into(), message: msg.into() } }
    pub fn network<S: Into<String>>(code: S, msg: S) -> Self { ApiError::Network { code: code.into(), message: msg.into() } }
    pub fn timeout<S: Into<String>>(code: S, msg: S) -> Self { ApiError::Timeout { code: code.into(), message: msg.into() } }
    pub fn decode<S: Into<String>>(code: S, msg: S) -> Self { ApiError::Decode { code: code.into(), message: msg.into() } }
    pub fn config<S: Into<String>>(code: S, msg: S) -> Self { ApiError::Config { code: code.into(), message: msg.into() } }

    /// Classify an HTTP response status with the server-provided message.
    pub fn from_status(status: u16, message: String) -> Self {
        let code = format!("http_{}", status);
        match status {
            400 => ApiError::BadRequest { code, message },
            401 => ApiError::Auth { code, message },
            403 => ApiError::Forbidden { code, message },
            404 => ApiError::NotFound { code, message },
            408 => ApiError::Timeout { code, message },
            409 => ApiError::Conflict { code, message },
            s if s >= 500 => ApiError::Server { code, message },
            _ => ApiError::BadRequest { code, message },
        }
    }

    /// Map back to the HTTP status class this error corresponds to.
    pub fn http_status(&self) -> u16 {
        match self {
            ApiError::BadRequest { .. } => 400,
            ApiError::Auth { .. } => 401,
            ApiError::Forbidden { .. } => 403,
            ApiError::NotFound { .. } => 404,
            ApiError::Timeout { .. } => 408,
            ApiError::Conflict { .. } => 409,
            ApiError::Server { .. } => 500,
            ApiError::Network { .. } => 503,
            ApiError::Decode { .. } => 502,
            ApiError::Config { .. } => 500,
        }
    }

    /// True for failures that indicate the bearer token is no longer good.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, ApiError::Auth { .. } | ApiError::Forbidden { .. })
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code_str(), self.message())
    }
}

impl std::error::Error for ApiError {}

pub type ApiResult<T> = Result<T, ApiError>;

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Network { code: "client_error".into(), message: err.to_string() }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return ApiError::Timeout { code: "request_timeout".into(), message: err.to_string() };
        }
        if err.is_decode() {
            return ApiError::Decode { code: "decode_error".into(), message: err.to_string() };
        }
        ApiError::Network { code: "network_error".into(), message: err.to_string() }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode { code: "decode_error".into(), message: err.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_round_trip() {
        assert_eq!(ApiError::from_status(400, "oops".into()).http_status(), 400);
        assert_eq!(ApiError::from_status(401, "no".into()).http_status(), 401);
        assert_eq!(ApiError::from_status(403, "blocked".into()).http_status(), 403);
        assert_eq!(ApiError::from_status(404, "missing".into()).http_status(), 404);
        assert_eq!(ApiError::from_status(409, "dup".into()).http_status(), 409);
        assert_eq!(ApiError::from_status(500, "boom".into()).http_status(), 500);
        assert_eq!(ApiError::from_status(503, "down".into()).http_status(), 500);
    }

    #[test]
    fn status_classification() {
        assert!(matches!(ApiError::from_status(401, "x".into()), ApiError::Auth { .. }));
        assert!(matches!(ApiError::from_status(418, "x".into()), ApiError::BadRequest { .. }));
        assert!(matches!(ApiError::from_status(502, "x".into()), ApiError::Server { .. }));
        assert!(ApiError::from_status(401, "x".into()).is_auth_failure());
        assert!(!ApiError::from_status(500, "x".into()).is_auth_failure());
    }

    #[test]
    fn display_carries_code_and_message() {
        let e = ApiError::not_found("http_404", "no such event");
        assert_eq!(e.to_string(), "http_404: no such event");
        assert_eq!(e.message(), "no such event");
    }
}
