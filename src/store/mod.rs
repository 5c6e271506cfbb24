//! Storage collaborators for a sync session.
//!
//! - [`LocalStore`] - the project's variables file
//! - [`RemoteStore`] - the copy kept in an object store bucket
//!
//! Both sides exchange whole [`ConfigDocument`]s. A document that is missing
//! is `None` / [`RemoteRead::Absent`], never an error; a document that exists
//! but is not a JSON object is [`Error::MalformedData`].

mod emulated;
mod file;
mod s3;

pub use emulated::EmulatedRemoteStore;
pub use file::{atomic_write, FileLocalStore};
pub use s3::S3RemoteStore;

use std::future::Future;

use serde_json::Value;

use crate::config::SyncTarget;
use crate::error::{Error, Result};
use crate::sync::ConfigDocument;

/// The project-side copy, addressed by sync target.
pub trait LocalStore {
    /// Human-readable location of the target's file.
    fn location(&self, target: &SyncTarget) -> String;

    /// Read the target's document; `None` if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an I/O error, or `Error::MalformedData` for unparseable content.
    fn read(&self, target: &SyncTarget) -> Result<Option<ConfigDocument>>;

    /// Replace the target's document.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    fn write(&self, target: &SyncTarget, doc: &ConfigDocument) -> Result<()>;
}

/// Where the remote copy lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteLocation {
    /// Bucket name.
    pub bucket: String,
    /// Region the bucket lives (or is created) in.
    pub region: String,
    /// Object key.
    pub key: String,
}

impl std::fmt::Display for RemoteLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "s3://{}/{}", self.bucket, self.key)
    }
}

/// Result of reading the remote copy.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteRead {
    /// The object exists and parsed.
    Present(ConfigDocument),
    /// The bucket exists but the object does not.
    Absent,
    /// The bucket does not exist yet (first sync).
    BucketMissing,
}

impl RemoteRead {
    /// The document, if present.
    #[must_use]
    pub fn into_document(self) -> Option<ConfigDocument> {
        match self {
            Self::Present(doc) => Some(doc),
            Self::Absent | Self::BucketMissing => None,
        }
    }
}

/// The bucket-side copy.
///
/// Timeouts and retries are the implementation's concern; every call either
/// succeeds or fails with `Error::Store`.
pub trait RemoteStore: Send + Sync {
    /// Short backend name for logs and status output.
    fn name(&self) -> &'static str;

    /// Read the object.
    fn read(&self, location: &RemoteLocation) -> impl Future<Output = Result<RemoteRead>> + Send;

    /// Write the object. The bucket must exist.
    fn write(
        &self,
        location: &RemoteLocation,
        doc: &ConfigDocument,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Create the bucket if it does not exist.
    fn ensure_bucket(&self, location: &RemoteLocation) -> impl Future<Output = Result<()>> + Send;
}

/// Remote store selected at runtime.
pub enum RemoteBackend {
    S3(S3RemoteStore),
    Emulated(EmulatedRemoteStore),
}

impl RemoteBackend {
    /// Pick the backend from the environment.
    ///
    /// `METASYNC_S3_EMULATE_ROOT` selects a directory-backed bucket tree;
    /// otherwise S3 is used, honouring `METASYNC_S3_ENDPOINT`.
    #[must_use]
    pub fn from_env() -> Self {
        match std::env::var("METASYNC_S3_EMULATE_ROOT") {
            Ok(root) if !root.trim().is_empty() => {
                Self::Emulated(EmulatedRemoteStore::new(root.into()))
            }
            _ => Self::S3(S3RemoteStore::new(
                std::env::var("METASYNC_S3_ENDPOINT")
                    .ok()
                    .filter(|e| !e.trim().is_empty()),
            )),
        }
    }
}

impl RemoteStore for RemoteBackend {
    fn name(&self) -> &'static str {
        match self {
            Self::S3(s) => s.name(),
            Self::Emulated(e) => e.name(),
        }
    }

    async fn read(&self, location: &RemoteLocation) -> Result<RemoteRead> {
        match self {
            Self::S3(s) => s.read(location).await,
            Self::Emulated(e) => e.read(location).await,
        }
    }

    async fn write(&self, location: &RemoteLocation, doc: &ConfigDocument) -> Result<()> {
        match self {
            Self::S3(s) => s.write(location, doc).await,
            Self::Emulated(e) => e.write(location, doc).await,
        }
    }

    async fn ensure_bucket(&self, location: &RemoteLocation) -> Result<()> {
        match self {
            Self::S3(s) => s.ensure_bucket(location).await,
            Self::Emulated(e) => e.ensure_bucket(location).await,
        }
    }
}

/// Parse a stored document. The top level must be a JSON object.
///
/// # Errors
///
/// Returns `Error::MalformedData` naming `location` if the bytes are not a
/// JSON object.
pub fn parse_document(bytes: &[u8], location: &str) -> Result<ConfigDocument> {
    let value: Value = serde_json::from_slice(bytes).map_err(|e| Error::MalformedData {
        location: location.to_string(),
        message: e.to_string(),
    })?;

    match value {
        Value::Object(map) => Ok(map),
        other => Err(Error::MalformedData {
            location: location.to_string(),
            message: format!("expected a JSON object, found {}", json_kind(&other)),
        }),
    }
}

/// Serialize a document the way it is stored on both sides.
///
/// # Errors
///
/// Returns `Error::Json` if serialization fails.
pub fn document_to_string(doc: &ConfigDocument) -> Result<String> {
    let mut out = serde_json::to_string_pretty(doc)?;
    out.push('\n');
    Ok(out)
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
