//! In-memory collaborators for sync tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use serde_json::Value;

use crate::config::{ConfigSource, StoreSettings, SyncTarget};
use crate::error::{Error, Result};
use crate::prompt::InteractionPort;
use crate::store::{LocalStore, RemoteLocation, RemoteRead, RemoteStore};
use crate::sync::ConfigDocument;

/// Build a document from a `json!` object literal.
pub fn doc(value: Value) -> ConfigDocument {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

/// Config source with fixed settings and no declared stages.
pub struct FixedConfig {
    pub settings: Option<StoreSettings>,
}

impl FixedConfig {
    pub fn bucket(name: &str) -> Self {
        Self {
            settings: Some(StoreSettings {
                name: name.to_string(),
                region: "eu-west-1".to_string(),
            }),
        }
    }

    pub const fn missing() -> Self {
        Self { settings: None }
    }
}

impl ConfigSource for FixedConfig {
    fn store_settings(&self) -> Result<StoreSettings> {
        self.settings
            .clone()
            .ok_or_else(|| Error::Config("Meta Sync config must be defined (custom.meta)".into()))
    }

    fn check_target(&self, _target: &SyncTarget) -> Result<()> {
        Ok(())
    }
}

/// Local store holding one document.
#[derive(Default)]
pub struct MemoryLocalStore {
    doc: Mutex<Option<ConfigDocument>>,
    malformed: bool,
    writes: Mutex<usize>,
}

impl MemoryLocalStore {
    pub fn with(doc: Option<ConfigDocument>) -> Self {
        Self {
            doc: Mutex::new(doc),
            ..Self::default()
        }
    }

    pub fn malformed() -> Self {
        Self {
            malformed: true,
            ..Self::default()
        }
    }

    pub fn doc(&self) -> Option<ConfigDocument> {
        self.doc.lock().unwrap().clone()
    }

    pub fn writes(&self) -> usize {
        *self.writes.lock().unwrap()
    }
}

impl LocalStore for MemoryLocalStore {
    fn location(&self, target: &SyncTarget) -> String {
        format!("memory://{}", target.file_name())
    }

    fn read(&self, target: &SyncTarget) -> Result<Option<ConfigDocument>> {
        if self.malformed {
            return Err(Error::MalformedData {
                location: self.location(target),
                message: "expected a JSON object, found an array".into(),
            });
        }
        Ok(self.doc())
    }

    fn write(&self, _target: &SyncTarget, doc: &ConfigDocument) -> Result<()> {
        *self.doc.lock().unwrap() = Some(doc.clone());
        *self.writes.lock().unwrap() += 1;
        Ok(())
    }
}

#[derive(Default)]
struct RemoteState {
    bucket: bool,
    doc: Option<ConfigDocument>,
    malformed: bool,
    fail_reads: bool,
    fail_writes: bool,
    writes: usize,
    buckets_created: usize,
    last_key: Option<String>,
}

/// Remote store holding one bucket with at most one object.
pub struct MemoryRemoteStore {
    state: Mutex<RemoteState>,
}

impl MemoryRemoteStore {
    /// Existing bucket, holding `doc` if given.
    pub fn with(doc: Option<ConfigDocument>) -> Self {
        Self {
            state: Mutex::new(RemoteState {
                bucket: true,
                doc,
                ..RemoteState::default()
            }),
        }
    }

    /// Bucket that does not exist yet.
    pub fn without_bucket() -> Self {
        Self {
            state: Mutex::new(RemoteState::default()),
        }
    }

    /// Existing object whose content is not a JSON object.
    pub fn malformed() -> Self {
        let store = Self::with(None);
        store.state.lock().unwrap().malformed = true;
        store
    }

    /// Every read fails with a store error.
    pub fn failing_reads(self) -> Self {
        self.state.lock().unwrap().fail_reads = true;
        self
    }

    /// Every write fails with a store error.
    pub fn failing_writes(self) -> Self {
        self.state.lock().unwrap().fail_writes = true;
        self
    }

    pub fn doc(&self) -> Option<ConfigDocument> {
        self.state.lock().unwrap().doc.clone()
    }

    pub fn writes(&self) -> usize {
        self.state.lock().unwrap().writes
    }

    pub fn buckets_created(&self) -> usize {
        self.state.lock().unwrap().buckets_created
    }

    pub fn last_key(&self) -> Option<String> {
        self.state.lock().unwrap().last_key.clone()
    }

    fn error(location: &RemoteLocation, operation: &'static str, message: &str) -> Error {
        Error::Store {
            operation,
            bucket: location.bucket.clone(),
            key: location.key.clone(),
            message: message.to_string(),
        }
    }
}

impl RemoteStore for MemoryRemoteStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn read(&self, location: &RemoteLocation) -> Result<RemoteRead> {
        let state = self.state.lock().unwrap();
        if state.fail_reads {
            return Err(Self::error(location, "reading", "connection reset"));
        }
        if state.malformed {
            return Err(Error::MalformedData {
                location: location.to_string(),
                message: "expected a JSON object, found a string".into(),
            });
        }
        if !state.bucket {
            return Ok(RemoteRead::BucketMissing);
        }
        Ok(state
            .doc
            .clone()
            .map_or(RemoteRead::Absent, RemoteRead::Present))
    }

    async fn write(&self, location: &RemoteLocation, doc: &ConfigDocument) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_writes {
            return Err(Self::error(location, "writing", "connection reset"));
        }
        if !state.bucket {
            return Err(Self::error(location, "writing", "NoSuchBucket"));
        }
        state.doc = Some(doc.clone());
        state.writes += 1;
        state.last_key = Some(location.key.clone());
        Ok(())
    }

    async fn ensure_bucket(&self, _location: &RemoteLocation) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.bucket = true;
        state.buckets_created += 1;
        Ok(())
    }
}

/// Interaction port answering from a script.
///
/// `select_one` returns the scripted selection (`None` simulates end of
/// input); `confirm` pops scripted answers and says "no" once they run out.
pub struct ScriptedPort {
    selection: Option<usize>,
    confirms: VecDeque<bool>,
    /// Number of questions asked.
    pub prompts: usize,
    /// Every block passed to `render`.
    pub rendered: Vec<String>,
}

impl Default for ScriptedPort {
    fn default() -> Self {
        colored::control::set_override(false);
        Self {
            selection: None,
            confirms: VecDeque::new(),
            prompts: 0,
            rendered: Vec::new(),
        }
    }
}

impl ScriptedPort {
    pub fn selecting(index: usize) -> Self {
        Self::default().with_selection(Some(index))
    }

    pub const fn with_selection(mut self, selection: Option<usize>) -> Self {
        self.selection = selection;
        self
    }

    pub fn with_confirms(mut self, answers: &[bool]) -> Self {
        self.confirms = answers.iter().copied().collect();
        self
    }
}

impl InteractionPort for ScriptedPort {
    fn render(&mut self, text: &str) -> Result<()> {
        self.rendered.push(text.to_string());
        Ok(())
    }

    fn select_one(&mut self, _prompt: &str, choices: &[&str]) -> Result<Option<usize>> {
        self.prompts += 1;
        assert!(!choices.is_empty());
        Ok(self.selection)
    }

    fn confirm(&mut self, _prompt: &str) -> Result<bool> {
        self.prompts += 1;
        Ok(self.confirms.pop_front().unwrap_or(false))
    }
}
