//! Failure classification.
//!
//! Maps the rendered text of a probe failure onto a small taxonomy using
//! case-insensitive substring matches. The first matching rule wins:
//!
//! ```text
//! "auth"                → authentication
//! "timeout"             → timeout
//! "module" | "import"   → dependency
//! "permission"          → permission
//! otherwise             → unknown (empty suggestion)
//! ```
//!
//! The heuristic is brittle against backends that reword their errors, but
//! the order is part of the response contract and must not change.

use serde::Serialize;
use std::fmt;

/// Category of a failed probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ImportError,
    Authentication,
    Timeout,
    Dependency,
    Permission,
    Unknown,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ImportError => "import_error",
            ErrorKind::Authentication => "authentication",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Dependency => "dependency",
            ErrorKind::Permission => "permission",
            ErrorKind::Unknown => "unknown",
        }
    }

    pub fn suggestion(&self) -> &'static str {
        match self {
            ErrorKind::ImportError => {
                "The Claude Code CLI could not be loaded. Install it and make sure it is on PATH."
            }
            ErrorKind::Authentication => {
                "Claude authentication is not configured. Run `claude auth login`."
            }
            ErrorKind::Timeout => "The probe hit its processing deadline (5 seconds).",
            ErrorKind::Dependency => {
                "The Claude Code CLI installation is missing or misconfigured."
            }
            ErrorKind::Permission => {
                "The host environment denied file or process access required by the CLI."
            }
            ErrorKind::Unknown => "",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A probe failure with its category and guidance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedError {
    pub kind: ErrorKind,
    pub message: String,
    pub suggestion: String,
}

/// Classify an error by its rendered text.
pub fn classify<E: fmt::Display + ?Sized>(error: &E) -> ClassifiedError {
    let message = error.to_string();
    let kind = kind_for(&message);
    ClassifiedError {
        kind,
        suggestion: kind.suggestion().to_string(),
        message,
    }
}

fn kind_for(message: &str) -> ErrorKind {
    let lowered = message.to_lowercase();
    if lowered.contains("auth") {
        ErrorKind::Authentication
    } else if lowered.contains("timeout") {
        ErrorKind::Timeout
    } else if lowered.contains("module") || lowered.contains("import") {
        ErrorKind::Dependency
    } else if lowered.contains("permission") {
        ErrorKind::Permission
    } else {
        ErrorKind::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_in_any_case() {
        for text in ["auth failed", "AUTHENTICATION required", "OAuth token expired", "Unauthorized"] {
            assert_eq!(classify(text).kind, ErrorKind::Authentication, "{}", text);
        }
    }

    #[test]
    fn test_auth_outranks_every_other_rule() {
        let cases = [
            "auth timeout",
            "Timeout while refreshing auth token",
            "module auth missing",
            "permission denied: auth",
            "import failed; timeout; permission; AUTH",
        ];
        for text in cases {
            assert_eq!(classify(text).kind, ErrorKind::Authentication, "{}", text);
        }
    }

    #[test]
    fn test_priority_below_auth() {
        assert_eq!(classify("Timeout after 5 seconds").kind, ErrorKind::Timeout);
        assert_eq!(classify("timeout importing module").kind, ErrorKind::Timeout);
        assert_eq!(classify("No module named x").kind, ErrorKind::Dependency);
        assert_eq!(classify("cannot IMPORT name").kind, ErrorKind::Dependency);
        assert_eq!(classify("import blocked: permission denied").kind, ErrorKind::Dependency);
        assert_eq!(classify("Permission denied (os error 13)").kind, ErrorKind::Permission);
    }

    #[test]
    fn test_unknown_has_empty_suggestion() {
        let classified = classify("connection reset by peer");
        assert_eq!(classified.kind, ErrorKind::Unknown);
        assert_eq!(classified.suggestion, "");
        assert_eq!(classified.message, "connection reset by peer");
    }

    #[test]
    fn test_known_kinds_carry_suggestions() {
        for kind in [
            ErrorKind::ImportError,
            ErrorKind::Authentication,
            ErrorKind::Timeout,
            ErrorKind::Dependency,
            ErrorKind::Permission,
        ] {
            assert!(!kind.suggestion().is_empty(), "{}", kind);
        }
    }

    #[test]
    fn test_kind_serializes_as_snake_case() {
        assert_eq!(serde_json::to_string(&ErrorKind::ImportError).unwrap(), "\"import_error\"");
        assert_eq!(serde_json::to_string(&ErrorKind::Authentication).unwrap(), "\"authentication\"");
    }
}
