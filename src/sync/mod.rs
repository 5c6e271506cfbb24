//! Reconciliation of a local variables file with its remote copy.
//!
//! One session handles one sync target:
//!
//! - **Diff**: key-level comparison of the two copies
//! - **Policy**: which action follows from the presence of each copy
//! - **Resolver**: interactive choice when both copies exist and differ
//! - **Orchestrator**: the session state machine, reading both sides and
//!   persisting the outcome
//!
//! # Example
//!
//! ```ignore
//! use metasync::sync::SyncOrchestrator;
//!
//! let mut session = SyncOrchestrator::new(&config, &local, &remote);
//! let report = session.run(Some("dev"), None, Interaction::Disabled).await?;
//! println!("{}", report.outcome.message());
//! ```

mod diff;
mod hash;
mod orchestrator;
mod policy;
mod render;
mod resolver;
mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use diff::{apply, diff, equals};
pub use hash::{content_hash, short_hash};
pub use orchestrator::SyncOrchestrator;
pub use policy::decide;
pub use render::{render_diff, render_entry, render_value};
pub use resolver::ConflictResolver;
pub use types::{
    Action, Choice, ConfigDocument, DiffEntry, Resolution, SessionState, SyncOutcome, SyncReport,
};
