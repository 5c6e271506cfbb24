//! File-backed local store.
//!
//! Variables live under `<project>/_meta/variables/<sync file name>`.
//! Writes are atomic: write to a temp file, sync to disk, then rename.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::SyncTarget;
use crate::error::Result;
use crate::store::{document_to_string, parse_document, LocalStore};
use crate::sync::ConfigDocument;

/// Write content to a file atomically.
///
/// This function:
/// 1. Writes content to a temporary file next to the target
/// 2. Calls `fsync` to ensure data is on disk
/// 3. Atomically renames the temp file to the target path
///
/// If any step fails, the existing file (if any) remains untouched.
///
/// # Errors
///
/// Returns an error if any file operation fails.
pub fn atomic_write(path: &Path, content: &str) -> Result<()> {
    let temp_path = path.with_extension("json.tmp");

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    {
        let file = File::create(&temp_path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(content.as_bytes())?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
    }

    fs::rename(&temp_path, path)?;

    Ok(())
}

/// Local store rooted at a project directory.
#[derive(Debug, Clone)]
pub struct FileLocalStore {
    variables_dir: PathBuf,
}

impl FileLocalStore {
    /// Store for the project at `project_root`.
    #[must_use]
    pub fn new(project_root: &Path) -> Self {
        Self {
            variables_dir: project_root.join("_meta").join("variables"),
        }
    }

    /// Full path of the target's variables file.
    #[must_use]
    pub fn path_for(&self, target: &SyncTarget) -> PathBuf {
        self.variables_dir.join(target.file_name())
    }
}

impl LocalStore for FileLocalStore {
    fn location(&self, target: &SyncTarget) -> String {
        self.path_for(target).display().to_string()
    }

    fn read(&self, target: &SyncTarget) -> Result<Option<ConfigDocument>> {
        let path = self.path_for(target);
        if !path.exists() {
            debug!(path = %path.display(), "No local copy");
            return Ok(None);
        }

        let bytes = fs::read(&path)?;
        let doc = parse_document(&bytes, &path.display().to_string())?;
        debug!(path = %path.display(), keys = doc.len(), "Loaded local copy");
        Ok(Some(doc))
    }

    fn write(&self, target: &SyncTarget, doc: &ConfigDocument) -> Result<()> {
        let path = self.path_for(target);
        debug!(path = %path.display(), keys = doc.len(), "Writing local copy");
        atomic_write(&path, &document_to_string(doc)?)
    }
}
