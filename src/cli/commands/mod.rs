//! Command implementations.

pub mod completions;
pub mod status;
pub mod sync;
pub mod version;

use std::path::Path;

use crate::config::{load_project_config, resolve_project_root, ProjectSource};
use crate::error::Result;
use crate::store::FileLocalStore;

/// Name of the installed binary.
const BIN_NAME: &str = "metasync";

/// Project-scoped collaborators shared by `sync` and `status`.
struct Project {
    root: std::path::PathBuf,
    source: ProjectSource,
    local: FileLocalStore,
}

impl Project {
    fn open(explicit: Option<&Path>) -> Result<Self> {
        let root = resolve_project_root(explicit)?;
        let source = ProjectSource::from_env(load_project_config(&root)?);
        let local = FileLocalStore::new(&root);
        Ok(Self {
            root,
            source,
            local,
        })
    }
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new()
        .map_err(|e| crate::error::Error::Other(format!("Failed to create async runtime: {e}")))
}
