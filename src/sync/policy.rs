//! Reconciliation policy.
//!
//! Non-interactive sessions (deploy scripts, CI) treat the bucket as the
//! source of truth and never prompt. Interactive sessions hand a real
//! difference to the resolver.

use crate::sync::types::Action;

/// Pick the action for a session. First matching row wins:
///
/// | local   | remote  | interactive | action                     |
/// |---------|---------|-------------|----------------------------|
/// | absent  | absent  | any         | `NoOp`                     |
/// | absent  | present | any         | `CreateLocalFromRemote`    |
/// | present | absent  | any         | `CreateRemoteFromLocal`    |
/// | present | present | true        | `DiffAndResolve`           |
/// | present | present | false       | `OverwriteLocalFromRemote` |
#[must_use]
pub const fn decide(local_present: bool, remote_present: bool, interactive: bool) -> Action {
    match (local_present, remote_present, interactive) {
        (false, false, _) => Action::NoOp,
        (false, true, _) => Action::CreateLocalFromRemote,
        (true, false, _) => Action::CreateRemoteFromLocal,
        (true, true, true) => Action::DiffAndResolve,
        (true, true, false) => Action::OverwriteLocalFromRemote,
    }
}
