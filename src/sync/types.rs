//! Sync types for stage variable reconciliation.
//!
//! A sync session compares two snapshots of the same flat variables document
//! (the project's local copy and the copy stored in the bucket) and ends with
//! both sides holding the same content, or with nothing written at all.

use serde::Serialize;
use serde_json::Value;

/// A flat variables document.
///
/// Keys are unique. Insertion order is preserved on write (the crate enables
/// `serde_json/preserve_order`) but ignored by equality.
pub type ConfigDocument = serde_json::Map<String, Value>;

/// One key that differs between the local and the remote document.
///
/// Entries describe the edits that turn `local` into `remote`:
/// `Added` keys exist only remotely, `Deleted` keys exist only locally,
/// `Changed` keys exist on both sides with unequal values.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DiffEntry {
    /// Key present only in `remote`; `value` is the remote value.
    Added { key: String, value: Value },
    /// Key present only in `local`; `value` is the local value.
    Deleted { key: String, value: Value },
    /// Key present on both sides. `old` is local, `new` is remote.
    Changed { key: String, old: Value, new: Value },
}

impl DiffEntry {
    /// The key this entry concerns.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::Added { key, .. } | Self::Deleted { key, .. } | Self::Changed { key, .. } => {
                key
            }
        }
    }
}

/// Reconciliation action chosen from the presence of both sides and the mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Neither side exists.
    NoOp,
    /// Only the remote copy exists.
    CreateLocalFromRemote,
    /// Only the local copy exists.
    CreateRemoteFromLocal,
    /// Both exist, a human resolves the difference.
    DiffAndResolve,
    /// Both exist, remote is the source of truth (non-interactive).
    OverwriteLocalFromRemote,
}

/// The four choices offered when both copies exist and differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    /// Overwrite local with remote verbatim.
    AcceptRemote,
    /// Overwrite remote with local verbatim.
    KeepLocal,
    /// Decide key by key, then write the merged result to both sides.
    ReviewEach,
    /// Abort without writing.
    Cancel,
}

impl Choice {
    /// All choices, in the order they are offered.
    pub const ALL: [Self; 4] = [Self::AcceptRemote, Self::KeepLocal, Self::ReviewEach, Self::Cancel];

    /// Menu label shown to the user.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::AcceptRemote => "Apply these changes to the local version",
            Self::KeepLocal => "Discard these changes and overwrite the remote with the local version",
            Self::ReviewEach => "Review each change individually",
            Self::Cancel => "Cancel, change nothing",
        }
    }
}

/// What has to be written once a session is resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Both sides already agree (or neither exists).
    NothingToSync,
    /// The user backed out; nothing is written.
    Cancelled,
    /// Write this document to the local file only.
    WriteLocal(ConfigDocument),
    /// Write this document to the bucket only.
    WriteRemote(ConfigDocument),
    /// Write this document to the local file, then to the bucket.
    WriteBoth(ConfigDocument),
}

impl Resolution {
    /// Whether persisting this resolution touches the local file.
    #[must_use]
    pub const fn writes_local(&self) -> bool {
        matches!(self, Self::WriteLocal(_) | Self::WriteBoth(_))
    }

    /// Whether persisting this resolution touches the bucket.
    #[must_use]
    pub const fn writes_remote(&self) -> bool {
        matches!(self, Self::WriteRemote(_) | Self::WriteBoth(_))
    }
}

/// End state of a finished session, reported to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncOutcome {
    NothingToSync,
    CreatedLocal,
    CreatedRemote,
    UpdatedLocal,
    UpdatedRemote,
    Synced,
    Cancelled,
}

impl SyncOutcome {
    /// Human-readable end-state message.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::NothingToSync => "nothing to sync",
            Self::CreatedLocal => "created local copy",
            Self::CreatedRemote => "created remote copy",
            Self::UpdatedLocal => "updated local copy from remote",
            Self::UpdatedRemote => "updated remote copy from local",
            Self::Synced => "synced",
            Self::Cancelled => "cancelled, nothing written",
        }
    }
}

/// Named states of one sync session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Start,
    IdentitySelected,
    LocalLoaded,
    RemoteLoaded,
    PolicyDecided,
    Resolved,
    Persisted,
    Done,
    Failed,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Start => "start",
            Self::IdentitySelected => "identity_selected",
            Self::LocalLoaded => "local_loaded",
            Self::RemoteLoaded => "remote_loaded",
            Self::PolicyDecided => "policy_decided",
            Self::Resolved => "resolved",
            Self::Persisted => "persisted",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Summary of a completed session, printed by the CLI.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    /// Sync file name (the session identity).
    pub file_name: String,
    /// Local file location.
    pub local_path: String,
    /// Bucket holding the remote copy.
    pub bucket: String,
    /// Object key of the remote copy.
    pub key: String,
    /// Action chosen by the reconciliation policy.
    pub action: Action,
    /// End state.
    pub outcome: SyncOutcome,
    /// Whether writes were skipped because of `--dry-run`.
    pub dry_run: bool,
    /// Whether the bucket had to be created.
    pub bucket_created: bool,
}
