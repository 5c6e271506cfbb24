//! Error types for metasync.
//!
//! Provides structured error handling with:
//! - Machine-readable error codes (`ErrorCode`)
//! - Category-based exit codes (3=not_found, 4=validation, 6=store, 7=config, ...)
//! - Context-aware recovery hints
//! - Structured JSON output for piped / non-TTY consumers
//!
//! "Bucket missing" and "key missing" are not errors here. The remote store
//! maps them to [`crate::store::RemoteRead`] variants that drive the normal
//! reconciliation branches.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for metasync operations.
pub type Result<T> = std::result::Result<T, Error>;

// ── Error Code ────────────────────────────────────────────────

/// Machine-readable error codes grouped by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Not Found (exit 3)
    ProjectNotFound,

    // Validation (exit 4)
    InvalidTarget,

    // Store (exit 6)
    StoreError,
    MalformedData,

    // Config (exit 7)
    ConfigError,

    // I/O (exit 8)
    IoError,
    JsonError,

    // Internal (exit 1)
    InternalError,
}

impl ErrorCode {
    /// Machine-readable SCREAMING_SNAKE code string.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::ProjectNotFound => "PROJECT_NOT_FOUND",
            Self::InvalidTarget => "INVALID_TARGET",
            Self::StoreError => "STORE_ERROR",
            Self::MalformedData => "MALFORMED_DATA",
            Self::ConfigError => "CONFIG_ERROR",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Category-based exit code.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::InternalError => 1,
            Self::ProjectNotFound => 3,
            Self::InvalidTarget => 4,
            Self::StoreError | Self::MalformedData => 6,
            Self::ConfigError => 7,
            Self::IoError | Self::JsonError => 8,
        }
    }

    /// Whether re-running with corrected input can succeed.
    ///
    /// Store failures are not retried at this layer; timeouts and retry
    /// policy belong to the SDK.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::InvalidTarget)
    }
}

// ── Error Enum ────────────────────────────────────────────────

/// Errors that can end a sync session.
#[derive(Error, Debug)]
pub enum Error {
    #[error("No s-project.json found in {cwd} or any parent directory")]
    ProjectNotFound { cwd: PathBuf },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid sync target: {0}")]
    Identity(String),

    #[error("Failed {operation} s3://{bucket}/{key}: {message}")]
    Store {
        operation: &'static str,
        bucket: String,
        key: String,
        message: String,
    },

    #[error("Malformed data in {location}: {message}")]
    MalformedData { location: String, message: String },

    #[error("Cannot render difference: {0}")]
    Render(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Map this error to its structured `ErrorCode`.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::ProjectNotFound { .. } => ErrorCode::ProjectNotFound,
            Self::Config(_) | Self::Render(_) => ErrorCode::ConfigError,
            Self::Identity(_) => ErrorCode::InvalidTarget,
            Self::Store { .. } => ErrorCode::StoreError,
            Self::MalformedData { .. } => ErrorCode::MalformedData,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) => ErrorCode::JsonError,
            Self::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Category-based exit code, delegating to the `ErrorCode`.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.error_code().exit_code()
    }

    /// Context-aware recovery hint.
    ///
    /// Returns `None` if no actionable suggestion exists.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::ProjectNotFound { .. } => Some(
                "Run metasync from inside a project, or pass --project <dir>.".to_string(),
            ),

            Self::Config(msg) if msg.contains("custom.meta") => Some(
                "Add to s-project.json:\n    \
                 \"custom\": { \"meta\": { \"name\": \"<bucket>\", \"region\": \"<bucket region>\" } }\n  \
                 or set METASYNC_BUCKET and METASYNC_BUCKET_REGION."
                    .to_string(),
            ),

            Self::Identity(msg) if msg.contains("Stage is required") => Some(
                "Pass --stage together with --region, e.g. `metasync sync -s dev -r us-east-1`."
                    .to_string(),
            ),

            Self::Store { message, .. }
                if message.contains("AccessDenied") || message.contains("credential") =>
            {
                Some("Check the AWS credentials and profile used for this project.".to_string())
            }

            Self::MalformedData { .. } => Some(
                "Nothing was written. Fix or remove the malformed copy and sync again."
                    .to_string(),
            ),

            Self::Config(_)
            | Self::Identity(_)
            | Self::Store { .. }
            | Self::Render(_)
            | Self::Io(_)
            | Self::Json(_)
            | Self::Other(_) => None,
        }
    }

    /// Structured JSON representation for machine consumption.
    #[must_use]
    pub fn to_structured_json(&self) -> serde_json::Value {
        let code = self.error_code();
        let mut obj = serde_json::json!({
            "error": {
                "code": code.as_str(),
                "message": self.to_string(),
                "retryable": code.is_retryable(),
                "exit_code": code.exit_code(),
            }
        });

        if let Some(hint) = self.hint() {
            obj["error"]["hint"] = serde_json::Value::String(hint);
        }

        obj
    }
}
