//! The error mapper: a single taxonomy that every internal
//! failure is funnelled through on its way to an HTTP status and a
//! `{ message, code, issues? }` body.

use crate::schema::Issue;
use serde::Serialize;

/// A failure raised by a procedure's own `invoke`, carrying the `code` and
/// HTTP `status` it declared (typically via `#[derive(ProcedureError)]` in
/// `rpc_rest_macros`). This is the "other error code raised by a procedure"
/// row of the table.
#[derive(Debug, Clone)]
pub struct ProcedureFailure {
    pub code: String,
    pub status: u16,
    pub message: String,
}

/// The adapter's own taxonomy of internal failure kinds. `Procedure` wraps whatever a handler's `invoke` raised, already
/// translated into a [`ProcedureFailure`].
#[derive(Debug, Clone)]
pub enum ErrorKind {
    NotFound,
    UnsupportedMediaType,
    BadRequest,
    PayloadTooLarge,
    InternalServerError,
    Procedure(ProcedureFailure),
}

impl ErrorKind {
    /// The standard code→status table from with procedure-raised
    /// codes deferring to the status the procedure itself declared.
    pub fn status(&self) -> u16 {
        match self {
            ErrorKind::NotFound => 404,
            ErrorKind::UnsupportedMediaType => 415,
            ErrorKind::BadRequest => 400,
            ErrorKind::PayloadTooLarge => 413,
            ErrorKind::InternalServerError => 500,
            ErrorKind::Procedure(p) => p.status,
        }
    }

    /// The stable `code` string surfaced in the error body.
    pub fn code(&self) -> &str {
        match self {
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::UnsupportedMediaType => "UNSUPPORTED_MEDIA_TYPE",
            ErrorKind::BadRequest => "BAD_REQUEST",
            ErrorKind::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            ErrorKind::InternalServerError => "INTERNAL_SERVER_ERROR",
            ErrorKind::Procedure(p) => &p.code,
        }
    }
}

/// A fully formed adapter error: the tagged kind, a human message, and (for
/// `BAD_REQUEST`) the schema issues that caused it.
#[derive(Debug, Clone)]
pub struct AdapterError {
    pub kind: ErrorKind,
    pub message: String,
    pub issues: Option<Vec<Issue>>,
}

impl AdapterError {
    pub fn not_found() -> AdapterError {
        AdapterError {
            kind: ErrorKind::NotFound,
            message: "NOT_FOUND".to_owned(),
            issues: None,
        }
    }

    pub fn unsupported_media_type(raw_content_type: &str) -> AdapterError {
        AdapterError {
            kind: ErrorKind::UnsupportedMediaType,
            message: format!("Unsupported content-type \"{}\"", raw_content_type),
            issues: None,
        }
    }

    pub fn payload_too_large() -> AdapterError {
        AdapterError {
            kind: ErrorKind::PayloadTooLarge,
            message: "PAYLOAD_TOO_LARGE".to_owned(),
            issues: None,
        }
    }

    pub fn bad_request(issues: Vec<Issue>) -> AdapterError {
        AdapterError {
            kind: ErrorKind::BadRequest,
            message: "Input validation failed".to_owned(),
            issues: Some(issues),
        }
    }

    pub fn internal<S: Into<String>>(message: S) -> AdapterError {
        AdapterError {
            kind: ErrorKind::InternalServerError,
            message: message.into(),
            issues: None,
        }
    }

    pub fn output_validation_failed() -> AdapterError {
        AdapterError {
            kind: ErrorKind::InternalServerError,
            message: "Output validation failed".to_owned(),
            issues: None,
        }
    }

    pub fn from_procedure_failure(failure: ProcedureFailure) -> AdapterError {
        AdapterError {
            message: failure.message.clone(),
            kind: ErrorKind::Procedure(failure),
            issues: None,
        }
    }

    /// The HTTP status this error maps to.
    pub fn status(&self) -> u16 {
        self.kind.status()
    }

    /// The stable `code` string for this error.
    pub fn code(&self) -> &str {
        self.kind.code()
    }

    /// The schema-validation issues that caused a `BAD_REQUEST`, if any.
    pub fn issues(&self) -> Option<&[Issue]> {
        self.issues.as_deref()
    }

    /// The JSON-serializable body shape: `{ message, code, issues? }`.
    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            message: self.message.clone(),
            code: self.code().to_owned(),
            issues: self.issues.clone(),
        }
    }
}

impl std::fmt::Display for AdapterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}
impl std::error::Error for AdapterError {}

/// The wire shape of an error response body.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub message: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issues: Option<Vec<Issue>>,
}

/// The external router's own error formatter: a pure transformation that may enrich the visible body but
/// never owns `code` or status, both of which stay authoritative from this
/// adapter.
pub trait ErrorFormatter: Send + Sync {
    /// Return a replacement `message` (and/or extra fields merged into the
    /// body) for this error. The default implementation makes no changes.
    fn format(&self, error: &AdapterError, body: ErrorBody) -> ErrorBody {
        let _ = error;
        body
    }
}

/// The formatter used when the caller doesn't supply one of their own.
pub struct NoopErrorFormatter;
impl ErrorFormatter for NoopErrorFormatter {}
