//! Interactive conflict resolution.
//!
//! Entered only when both copies exist and the session is interactive. The
//! resolver never writes; it returns a [`Resolution`] that the orchestrator
//! persists.

use tracing::debug;

use crate::error::{Error, Result};
use crate::prompt::{Interaction, InteractionPort};
use crate::sync::diff::{apply, diff};
use crate::sync::render::{render_diff, render_entry};
use crate::sync::types::{Choice, ConfigDocument, DiffEntry, Resolution};

/// Resolves a difference between the local and remote copy with the user.
pub struct ConflictResolver<'a> {
    port: &'a mut dyn InteractionPort,
}

impl<'a> ConflictResolver<'a> {
    /// Create a resolver for an interactive session.
    ///
    /// # Errors
    ///
    /// Returns an error for [`Interaction::Disabled`]: a non-interactive
    /// session must never reach a prompt.
    pub fn new(interaction: Interaction<'a>) -> Result<Self> {
        match interaction {
            Interaction::Enabled(port) => Ok(Self { port }),
            Interaction::Disabled => Err(Error::Other(
                "conflict resolution requires an interactive session".to_string(),
            )),
        }
    }

    /// Show the difference and apply the user's choice.
    ///
    /// # Errors
    ///
    /// Returns `Error::Render` if a value cannot be displayed, or an I/O
    /// error from the port. No resolution is produced in either case.
    pub fn resolve(
        &mut self,
        file_name: &str,
        local: &ConfigDocument,
        remote: &ConfigDocument,
    ) -> Result<Resolution> {
        let entries = diff(local, remote);
        if entries.is_empty() {
            debug!(file = file_name, "Local and remote copies are equal");
            return Ok(Resolution::NothingToSync);
        }

        let rendered = render_diff(&format!("{file_name} (local -> remote)"), &entries)?;
        self.port.render(&rendered)?;

        let labels: Vec<&str> = Choice::ALL.iter().map(|c| c.label()).collect();
        let choice = self
            .port
            .select_one("How to handle this difference?", &labels)?
            .and_then(|i| Choice::ALL.get(i).copied())
            .unwrap_or(Choice::Cancel);
        debug!(?choice, entries = entries.len(), "Resolution chosen");

        match choice {
            Choice::AcceptRemote => Ok(Resolution::WriteLocal(remote.clone())),
            Choice::KeepLocal => Ok(Resolution::WriteRemote(local.clone())),
            Choice::ReviewEach => self.review_each(local, &entries),
            Choice::Cancel => Ok(Resolution::Cancelled),
        }
    }

    /// Ask about every entry in order, then confirm the merged result.
    fn review_each(&mut self, local: &ConfigDocument, entries: &[DiffEntry]) -> Result<Resolution> {
        let mut working = local.clone();
        let total = entries.len();

        for (i, entry) in entries.iter().enumerate() {
            let line = render_entry(entry)?;
            self.port.render(&format!("[{}/{total}] {line}", i + 1))?;
            if self.port.confirm("Apply this change?")? {
                apply(&mut working, entry);
            }
        }

        let summary = diff(local, &working);
        if summary.is_empty() {
            self.port.render(
                "No changes selected. The remote copy will be replaced with the local version.",
            )?;
        } else {
            self.port
                .render(&render_diff("Merged result (local -> merged)", &summary)?)?;
        }

        if self
            .port
            .confirm("Write the merged result to both local and remote?")?
        {
            Ok(Resolution::WriteBoth(working))
        } else {
            Ok(Resolution::Cancelled)
        }
    }
}
