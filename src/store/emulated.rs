//! Directory-backed remote store.
//!
//! Emulates a bucket tree on disk: `<root>/<bucket>/<key>`. A bucket is a
//! directory; writing into a bucket directory that does not exist fails the
//! same way S3 does. Selected with `METASYNC_S3_EMULATE_ROOT`.

use std::fs;
use std::path::PathBuf;

use tracing::debug;

use crate::error::{Error, Result};
use crate::store::{atomic_write, document_to_string, parse_document, RemoteLocation, RemoteRead, RemoteStore};
use crate::sync::ConfigDocument;

#[derive(Debug, Clone)]
pub struct EmulatedRemoteStore {
    root: PathBuf,
}

impl EmulatedRemoteStore {
    #[must_use]
    pub const fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn bucket_dir(&self, location: &RemoteLocation) -> PathBuf {
        self.root.join(&location.bucket)
    }

    fn object_path(&self, location: &RemoteLocation) -> PathBuf {
        self.bucket_dir(location).join(&location.key)
    }

    fn store_error(location: &RemoteLocation, operation: &'static str, message: String) -> Error {
        Error::Store {
            operation,
            bucket: location.bucket.clone(),
            key: location.key.clone(),
            message,
        }
    }
}

impl RemoteStore for EmulatedRemoteStore {
    fn name(&self) -> &'static str {
        "emulated"
    }

    async fn read(&self, location: &RemoteLocation) -> Result<RemoteRead> {
        if !self.bucket_dir(location).is_dir() {
            debug!(bucket = %location.bucket, "Emulated bucket missing");
            return Ok(RemoteRead::BucketMissing);
        }

        let path = self.object_path(location);
        if !path.exists() {
            return Ok(RemoteRead::Absent);
        }

        let bytes = fs::read(&path)
            .map_err(|e| Self::store_error(location, "reading", e.to_string()))?;
        parse_document(&bytes, &location.to_string()).map(RemoteRead::Present)
    }

    async fn write(&self, location: &RemoteLocation, doc: &ConfigDocument) -> Result<()> {
        if !self.bucket_dir(location).is_dir() {
            return Err(Self::store_error(location, "writing", "NoSuchBucket".to_string()));
        }

        debug!(%location, keys = doc.len(), "Writing emulated object");
        atomic_write(&self.object_path(location), &document_to_string(doc)?)
            .map_err(|e| Self::store_error(location, "writing", e.to_string()))
    }

    async fn ensure_bucket(&self, location: &RemoteLocation) -> Result<()> {
        fs::create_dir_all(self.bucket_dir(location))
            .map_err(|e| Self::store_error(location, "creating bucket for", e.to_string()))
    }
}
