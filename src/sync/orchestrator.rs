//! Sync session state machine.
//!
//! A session runs `Start -> IdentitySelected -> LocalLoaded -> RemoteLoaded
//! -> PolicyDecided -> Resolved -> Persisted -> Done`. Any error moves it to
//! `Failed` and is returned to the caller. Writes already made stand; there
//! is no rollback.
//!
//! Settings and identity are checked before either store is touched. Both
//! copies are read before anything is written, so a malformed copy aborts
//! the session with no writes.

use tracing::{debug, info, warn};

use crate::config::{ConfigSource, SyncTarget};
use crate::error::{Error, Result};
use crate::prompt::Interaction;
use crate::store::{LocalStore, RemoteLocation, RemoteRead, RemoteStore};
use crate::sync::diff::{diff, equals};
use crate::sync::hash::{content_hash, short_hash};
use crate::sync::policy::decide;
use crate::sync::resolver::ConflictResolver;
use crate::sync::types::{
    Action, ConfigDocument, Resolution, SessionState, SyncOutcome, SyncReport,
};

/// Runs sync sessions against one pair of stores.
pub struct SyncOrchestrator<'a, L, R> {
    config: &'a dyn ConfigSource,
    local: &'a L,
    remote: &'a R,
    dry_run: bool,
    states: Vec<SessionState>,
}

impl<'a, L: LocalStore, R: RemoteStore> SyncOrchestrator<'a, L, R> {
    /// Create an orchestrator over the given collaborators.
    pub fn new(config: &'a dyn ConfigSource, local: &'a L, remote: &'a R) -> Self {
        Self {
            config,
            local,
            remote,
            dry_run: false,
            states: Vec::new(),
        }
    }

    /// Decide everything but skip the writes.
    #[must_use]
    pub const fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// States visited by the last session, in order.
    #[must_use]
    pub fn states(&self) -> &[SessionState] {
        &self.states
    }

    /// Run one session for the target selected by `stage` and `region`.
    ///
    /// # Errors
    ///
    /// Returns the error that moved the session to `Failed`: configuration
    /// or identity problems, store failures, malformed copies, or I/O errors
    /// from the interaction port.
    pub async fn run(
        &mut self,
        stage: Option<&str>,
        region: Option<&str>,
        interaction: Interaction<'_>,
    ) -> Result<SyncReport> {
        self.states.clear();
        self.enter(SessionState::Start);

        match self.session(stage, region, interaction).await {
            Ok(report) => {
                self.enter(SessionState::Done);
                Ok(report)
            }
            Err(err) => {
                let reached = self.states.last().copied().unwrap_or(SessionState::Start);
                self.enter(SessionState::Failed);
                debug!(after = %reached, error = %err, "Sync session failed");
                Err(err)
            }
        }
    }

    async fn session(
        &mut self,
        stage: Option<&str>,
        region: Option<&str>,
        interaction: Interaction<'_>,
    ) -> Result<SyncReport> {
        let target = SyncTarget::select(stage, region)?;
        self.config.check_target(&target)?;
        let settings = self.config.store_settings()?;
        let location = RemoteLocation {
            bucket: settings.name,
            region: settings.region,
            key: target.remote_key(),
        };
        let file_name = target.file_name();
        self.enter(SessionState::IdentitySelected);

        let local = self.local.read(&target)?;
        self.enter(SessionState::LocalLoaded);

        let remote_read = self.remote.read(&location).await?;
        let bucket_missing = matches!(remote_read, RemoteRead::BucketMissing);
        let remote = remote_read.into_document();
        self.enter(SessionState::RemoteLoaded);

        let local_hash = local.as_ref().map(content_hash);
        let remote_hash = remote.as_ref().map(content_hash);
        debug!(
            local = local_hash.as_deref().map_or("absent", short_hash),
            remote = remote_hash.as_deref().map_or("absent", short_hash),
            bucket_missing,
            "Loaded both copies"
        );

        let action = decide(local.is_some(), remote.is_some(), interaction.is_enabled());
        self.enter(SessionState::PolicyDecided);
        debug!(?action, file = %file_name, "Policy decided");

        let resolution = match (action, local, remote) {
            (Action::NoOp, ..) => Resolution::NothingToSync,
            (Action::CreateLocalFromRemote, _, Some(remote)) => Resolution::WriteLocal(remote),
            (Action::CreateRemoteFromLocal, Some(local), _) => Resolution::WriteRemote(local),
            (Action::OverwriteLocalFromRemote, Some(local), Some(remote)) => {
                if equals(&local, &remote) {
                    Resolution::NothingToSync
                } else {
                    warn!(
                        file = %file_name,
                        differing_keys = diff(&local, &remote).len(),
                        "Non-interactive sync: overwriting local copy with remote"
                    );
                    Resolution::WriteLocal(remote)
                }
            }
            (Action::DiffAndResolve, Some(local), Some(remote)) => {
                ConflictResolver::new(interaction)?.resolve(&file_name, &local, &remote)?
            }
            (action, ..) => {
                return Err(Error::Other(format!(
                    "Action {action:?} does not match the loaded copies"
                )));
            }
        };
        let outcome = outcome_of(action, &resolution);
        self.enter(SessionState::Resolved);

        let bucket_created = if self.dry_run {
            if resolution.writes_local() || resolution.writes_remote() {
                info!(file = %file_name, ?outcome, "Dry run, skipping writes");
            }
            false
        } else {
            self.persist(&target, &location, &resolution, bucket_missing)
                .await?
        };
        self.enter(SessionState::Persisted);

        Ok(SyncReport {
            file_name,
            local_path: self.local.location(&target),
            bucket: location.bucket,
            key: location.key,
            action,
            outcome,
            dry_run: self.dry_run,
            bucket_created,
        })
    }

    /// Write the resolved document. Local is written before remote.
    ///
    /// Returns whether the bucket had to be created.
    async fn persist(
        &self,
        target: &SyncTarget,
        location: &RemoteLocation,
        resolution: &Resolution,
        bucket_missing: bool,
    ) -> Result<bool> {
        let (doc, to_local, to_remote) = match resolution {
            Resolution::NothingToSync | Resolution::Cancelled => return Ok(false),
            Resolution::WriteLocal(doc) => (doc, true, false),
            Resolution::WriteRemote(doc) => (doc, false, true),
            Resolution::WriteBoth(doc) => (doc, true, true),
        };

        if to_local {
            self.local.write(target, doc)?;
            info!(path = %self.local.location(target), keys = doc.len(), "Wrote local copy");
        }
        if to_remote {
            self.write_remote(location, doc, bucket_missing).await?;
        }
        Ok(to_remote && bucket_missing)
    }

    async fn write_remote(
        &self,
        location: &RemoteLocation,
        doc: &ConfigDocument,
        bucket_missing: bool,
    ) -> Result<()> {
        if bucket_missing {
            info!(bucket = %location.bucket, region = %location.region, "Creating bucket");
            self.remote.ensure_bucket(location).await?;
        }
        self.remote.write(location, doc).await?;
        info!(%location, backend = self.remote.name(), keys = doc.len(), "Wrote remote copy");
        Ok(())
    }

    fn enter(&mut self, state: SessionState) {
        debug!(%state, "Sync session state");
        self.states.push(state);
    }
}

const fn outcome_of(action: Action, resolution: &Resolution) -> SyncOutcome {
    match resolution {
        Resolution::NothingToSync => SyncOutcome::NothingToSync,
        Resolution::Cancelled => SyncOutcome::Cancelled,
        Resolution::WriteLocal(_) => match action {
            Action::CreateLocalFromRemote => SyncOutcome::CreatedLocal,
            _ => SyncOutcome::UpdatedLocal,
        },
        Resolution::WriteRemote(_) => match action {
            Action::CreateRemoteFromLocal => SyncOutcome::CreatedRemote,
            _ => SyncOutcome::UpdatedRemote,
        },
        Resolution::WriteBoth(_) => SyncOutcome::Synced,
    }
}
