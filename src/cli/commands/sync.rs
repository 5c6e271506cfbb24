//! Sync command implementation.
//!
//! Runs one reconciliation session for the selected variables file. The
//! session is interactive only when both stdin and stdout are terminals and
//! neither `--json` nor `--non-interactive` was given; otherwise no prompt is
//! ever shown and the remote copy wins when both copies exist.

use std::io::IsTerminal;
use std::path::Path;

use colored::Colorize;
use tracing::{debug, info};

use crate::cli::SyncArgs;
use crate::cli::commands::{runtime, Project};
use crate::error::Result;
use crate::prompt::{Interaction, TerminalPort};
use crate::store::RemoteBackend;
use crate::sync::{SyncOrchestrator, SyncOutcome, SyncReport};

/// Execute the sync command.
///
/// # Errors
///
/// Returns the error that failed the session.
pub fn execute(args: &SyncArgs, project: Option<&Path>, dry_run: bool, json: bool) -> Result<()> {
    let project = Project::open(project)?;
    let remote = RemoteBackend::from_env();
    let interactive = !args.non_interactive
        && !json
        && std::io::stdin().is_terminal()
        && std::io::stdout().is_terminal();
    debug!(
        root = %project.root.display(),
        backend = crate::store::RemoteStore::name(&remote),
        interactive,
        dry_run,
        "Starting sync"
    );

    let stage = args.target.stage.as_deref();
    let region = args.target.region.as_deref();
    let mut orchestrator =
        SyncOrchestrator::new(&project.source, &project.local, &remote).dry_run(dry_run);

    let rt = runtime()?;
    let report = if interactive {
        let mut port = TerminalPort::stdio();
        rt.block_on(orchestrator.run(stage, region, Interaction::Enabled(&mut port)))?
    } else {
        rt.block_on(orchestrator.run(stage, region, Interaction::Disabled))?
    };

    info!(
        file = %report.file_name,
        outcome = report.outcome.message(),
        dry_run,
        "Sync finished"
    );

    if json {
        let output = serde_json::json!({
            "success": true,
            "sync": report,
        });
        println!("{}", serde_json::to_string(&output)?);
    } else if interactive || dry_run {
        print_report(&report);
    }

    Ok(())
}

fn print_report(report: &SyncReport) {
    let message = report.outcome.message();
    let message = match report.outcome {
        SyncOutcome::NothingToSync => message.dimmed(),
        SyncOutcome::Cancelled => message.yellow(),
        _ => message.green(),
    };

    if report.dry_run {
        println!("{} {}: {message}", "[dry run]".cyan(), report.file_name.bold());
        return;
    }

    if report.bucket_created {
        println!("Created bucket {}", report.bucket.bold());
    }
    println!("{}: {message}", report.file_name.bold());
}
