//! Response rendering.
//!
//! # Responsibilities
//! - Build the success and error JSON bodies for GET
//! - Build the 405 body for unsupported methods
//! - Stamp every body with a timestamp
//!
//! # Design Decisions
//! - GET always answers 200; success vs failure lives in `status`
//! - `status` is the serde tag, so it is always the first field
//! - serde_json writes non-ASCII as raw UTF-8, never `\u` escapes

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Local, SecondsFormat};
use serde::Serialize;

use crate::probe::{ClassifiedError, ErrorKind, ProbeResult};

pub const SUCCESS_MESSAGE: &str = "Claude Code probe succeeded";
pub const FAILURE_MESSAGE: &str = "Claude Code probe failed";
pub const UNAVAILABLE_MESSAGE: &str = "Claude Code CLI unavailable";

/// Body returned by the probe endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ApiResponse {
    Success {
        message: String,
        data: ProbeResult,
        environment: Environment,
        timestamp: String,
    },
    Error {
        message: String,
        error: ErrorBody,
        timestamp: String,
    },
}

/// Error details inside an error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    #[serde(rename = "type")]
    pub kind: ErrorKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    pub suggestion: String,
}

/// Runtime metadata attached to successful probes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Environment {
    #[serde(rename = "python_version")]
    pub runtime_version: String,
    #[serde(rename = "anyio_available")]
    pub async_runtime_available: bool,
    pub claude_sdk_available: bool,
}

impl Environment {
    pub fn current() -> Self {
        Self {
            runtime_version: format!(
                "{} {} ({}-{})",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION"),
                std::env::consts::OS,
                std::env::consts::ARCH
            ),
            async_runtime_available: true,
            claude_sdk_available: true,
        }
    }
}

impl ApiResponse {
    pub fn success(data: ProbeResult) -> Self {
        ApiResponse::Success {
            message: SUCCESS_MESSAGE.to_string(),
            data,
            environment: Environment::current(),
            timestamp: timestamp(),
        }
    }

    pub fn failure(error: ClassifiedError) -> Self {
        ApiResponse::Error {
            message: FAILURE_MESSAGE.to_string(),
            error: ErrorBody {
                kind: error.kind,
                message: Some(error.message),
                details: None,
                suggestion: error.suggestion,
            },
            timestamp: timestamp(),
        }
    }

    /// Body for a backend that failed the startup availability check.
    pub fn unavailable(load_error: &str) -> Self {
        let kind = ErrorKind::ImportError;
        ApiResponse::Error {
            message: UNAVAILABLE_MESSAGE.to_string(),
            error: ErrorBody {
                kind,
                message: None,
                details: Some(load_error.to_string()),
                suggestion: kind.suggestion().to_string(),
            },
            timestamp: timestamp(),
        }
    }

    /// Label used for logs and metrics.
    pub fn outcome(&self) -> &'static str {
        match self {
            ApiResponse::Success { .. } => "success",
            ApiResponse::Error { error, .. } => error.kind.as_str(),
        }
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Body returned for methods other than GET and OPTIONS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodNotAllowed {
    pub error: &'static str,
    pub message: &'static str,
    pub supported_methods: [&'static str; 2],
}

impl Default for MethodNotAllowed {
    fn default() -> Self {
        Self {
            error: "Method not allowed",
            message: "Only GET is currently supported",
            supported_methods: ["GET", "OPTIONS"],
        }
    }
}

impl IntoResponse for MethodNotAllowed {
    fn into_response(self) -> Response {
        (StatusCode::METHOD_NOT_ALLOWED, Json(self)).into_response()
    }
}

fn timestamp() -> String {
    Local::now().to_rfc3339_opts(SecondsFormat::Micros, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::classify;
    use serde_json::{json, Value};

    fn sample_result() -> ProbeResult {
        ProbeResult {
            prompt: "Hello Claude! 2+2は何ですか？".into(),
            messages: vec!["2+2=4".into()],
            message_count: 1,
            processing_time_seconds: 1.23,
            sdk_version: "claude-code-cli".into(),
        }
    }

    #[test]
    fn test_success_shape() {
        let body = serde_json::to_value(ApiResponse::success(sample_result())).unwrap();

        assert_eq!(body["status"], "success");
        assert_eq!(body["message"], SUCCESS_MESSAGE);
        assert_eq!(
            body["data"],
            json!({
                "prompt": "Hello Claude! 2+2は何ですか？",
                "messages": ["2+2=4"],
                "message_count": 1,
                "processing_time_seconds": 1.23,
                "sdk_version": "claude-code-cli",
            })
        );
        let environment = body["environment"].as_object().unwrap();
        let mut keys: Vec<&str> = environment.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, ["anyio_available", "claude_sdk_available", "python_version"]);
        assert_eq!(environment["anyio_available"], true);
        assert_eq!(environment["claude_sdk_available"], true);
        assert!(environment["python_version"].as_str().unwrap().contains(env!("CARGO_PKG_VERSION")));
        assert!(body["timestamp"].as_str().unwrap().contains('T'));
    }

    #[test]
    fn test_status_is_first_field() {
        let text = serde_json::to_string(&ApiResponse::success(sample_result())).unwrap();
        assert!(text.starts_with(r#"{"status":"success""#));
    }

    #[test]
    fn test_failure_shape_has_message_not_details() {
        let body = serde_json::to_value(ApiResponse::failure(classify("Timeout after 5 seconds"))).unwrap();

        assert_eq!(body["status"], "error");
        assert_eq!(body["error"]["type"], "timeout");
        assert_eq!(body["error"]["message"], "Timeout after 5 seconds");
        assert!(body["error"].get("details").is_none());
        assert!(!body["error"]["suggestion"].as_str().unwrap().is_empty());
        assert!(body.get("data").is_none());
    }

    #[test]
    fn test_unknown_failure_has_empty_suggestion() {
        let body = serde_json::to_value(ApiResponse::failure(classify("socket closed"))).unwrap();
        assert_eq!(body["error"]["type"], "unknown");
        assert_eq!(body["error"]["suggestion"], "");
    }

    #[test]
    fn test_unavailable_shape_has_details_not_message() {
        let response = ApiResponse::unavailable("cannot load `claude`: No such file or directory");
        assert_eq!(response.outcome(), "import_error");

        let body = serde_json::to_value(response).unwrap();
        assert_eq!(body["status"], "error");
        assert_eq!(body["message"], UNAVAILABLE_MESSAGE);
        assert_eq!(body["error"]["type"], "import_error");
        assert_eq!(
            body["error"]["details"],
            "cannot load `claude`: No such file or directory"
        );
        assert!(body["error"].get("message").is_none());
    }

    #[test]
    fn test_non_ascii_is_written_raw_and_round_trips() {
        let response = ApiResponse::success(sample_result());
        let text = serde_json::to_string(&response).unwrap();
        assert!(text.contains("2+2は何ですか？"));
        assert!(!text.contains("\\u"));

        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, serde_json::to_value(&response).unwrap());
        assert_eq!(
            parsed["data"]["prompt"].as_str().unwrap().as_bytes(),
            "Hello Claude! 2+2は何ですか？".as_bytes()
        );
    }

    #[test]
    fn test_method_not_allowed_body() {
        let body = serde_json::to_value(MethodNotAllowed::default()).unwrap();
        assert_eq!(body["error"], "Method not allowed");
        assert_eq!(body["supported_methods"], json!(["GET", "OPTIONS"]));
    }
}
