//! Error types for taskboard
//!
//! Exit codes for the CLI:
//! - 0: Success
//! - 2: User error (unknown id, bad arguments, bad config)
//! - 3: Schedule conflict (timed items would overlap)
//! - 4: Operation failed (load/save/lock/io)
//!
//! HTTP front ends map errors with [`Error::status_code`].

use std::path::PathBuf;
use thiserror::Error;

use crate::item::{ItemId, Kind};

/// Exit codes for the taskboard CLI
pub mod exit_codes {
    pub const USER_ERROR: i32 = 2;
    pub const CONFLICT: i32 = 3;
    pub const OPERATION_FAILED: i32 = 4;
}

/// HTTP status codes a front end should answer with
pub mod status_codes {
    pub const NOT_FOUND: u16 = 404;
    pub const NOT_ACCEPTABLE: u16 = 406;
    pub const SERVER_ERROR: u16 = 500;
}

/// Main error type for taskboard operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("{kind} {id} not found")]
    NotFound { kind: Kind, id: ItemId },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Schedule conflicts (exit code 3)
    #[error("\"{candidate_name}\" intersects with {existing_id} \"{existing_name}\"")]
    Overlap {
        candidate_id: Option<ItemId>,
        candidate_name: String,
        existing_id: ItemId,
        existing_name: String,
    },

    // Operation failures (exit code 4)
    #[error("Failed to load {path}: line {line}: {reason}")]
    Load {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("Failed to save {path}: {source}")]
    Save {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Lock acquisition failed: {0}")]
    LockFailed(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl Error {
    pub(crate) fn not_found(kind: Kind, id: ItemId) -> Self {
        Error::NotFound { kind, id }
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::NotFound { .. } | Error::InvalidArgument(_) | Error::InvalidConfig(_) => {
                exit_codes::USER_ERROR
            }

            Error::Overlap { .. } => exit_codes::CONFLICT,

            Error::Load { .. }
            | Error::Save { .. }
            | Error::LockFailed(_)
            | Error::Io(_)
            | Error::Json(_)
            | Error::TomlParse(_)
            | Error::TomlSerialize(_) => exit_codes::OPERATION_FAILED,
        }
    }

    /// Get the HTTP status code a request handler should reply with
    pub fn status_code(&self) -> u16 {
        match self {
            Error::NotFound { .. } => status_codes::NOT_FOUND,
            Error::Overlap { .. } | Error::InvalidArgument(_) => status_codes::NOT_ACCEPTABLE,
            _ => status_codes::SERVER_ERROR,
        }
    }

    /// Structured fields for machine-readable error output
    pub fn details(&self) -> Option<serde_json::Value> {
        use serde_json::json;

        match self {
            Error::NotFound { kind, id } => Some(json!({ "kind": kind, "id": id })),
            Error::Overlap {
                candidate_id,
                candidate_name,
                existing_id,
                existing_name,
            } => Some(json!({
                "candidate_id": candidate_id,
                "candidate_name": candidate_name,
                "existing_id": existing_id,
                "existing_name": existing_name,
            })),
            Error::Load { path, line, reason } => Some(json!({
                "path": path.display().to_string(),
                "line": line,
                "reason": reason,
            })),
            Error::Save { path, .. } | Error::LockFailed(path) => {
                Some(json!({ "path": path.display().to_string() }))
            }
            Error::InvalidArgument(message) | Error::InvalidConfig(message) => {
                Some(json!({ "message": message }))
            }
            _ => None,
        }
    }
}

/// Result type alias for taskboard operations
pub type Result<T> = std::result::Result<T, Error>;

/// Wrapper for displaying errors in JSON format
#[derive(serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<&Error> for JsonError {
    fn from(err: &Error) -> Self {
        JsonError {
            error: err.to_string(),
            code: err.exit_code(),
            details: err.details(),
        }
    }
}
