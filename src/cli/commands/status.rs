//! Status command implementation.
//!
//! Reads both copies of the selected variables file and reports what a sync
//! would find. Never writes and never creates the bucket.

use std::path::Path;

use colored::Colorize;
use serde::Serialize;

use crate::cli::TargetArgs;
use crate::cli::commands::{runtime, Project};
use crate::config::{ConfigSource, SyncTarget};
use crate::error::Result;
use crate::store::{LocalStore, RemoteBackend, RemoteLocation, RemoteRead, RemoteStore};
use crate::sync::{content_hash, diff, short_hash, ConfigDocument};

/// Output for status command.
#[derive(Serialize)]
struct StatusOutput {
    project: String,
    project_name: Option<String>,
    target: SyncTarget,
    file_name: String,
    backend: &'static str,
    local: SideStatus,
    remote: SideStatus,
    /// Keys that differ; `None` unless both copies exist.
    differing_keys: Option<usize>,
}

#[derive(Serialize)]
struct SideStatus {
    location: String,
    /// `present`, `absent` or `bucket_missing`.
    state: &'static str,
    keys: Option<usize>,
    hash: Option<String>,
}

impl SideStatus {
    fn new(location: String, state: &'static str, doc: Option<&ConfigDocument>) -> Self {
        Self {
            location,
            state,
            keys: doc.map(ConfigDocument::len),
            hash: doc.map(content_hash),
        }
    }
}

/// Execute status command.
///
/// # Errors
///
/// Returns configuration, identity, store, or malformed-data errors.
pub fn execute(args: &TargetArgs, project: Option<&Path>, json: bool) -> Result<()> {
    let project = Project::open(project)?;
    let remote = RemoteBackend::from_env();

    let target = SyncTarget::select(args.stage.as_deref(), args.region.as_deref())?;
    project.source.check_target(&target)?;
    let settings = project.source.store_settings()?;
    let location = RemoteLocation {
        bucket: settings.name,
        region: settings.region,
        key: target.remote_key(),
    };

    let local_doc = project.local.read(&target)?;
    let remote_read = runtime()?.block_on(remote.read(&location))?;

    let remote_state = match &remote_read {
        RemoteRead::Present(_) => "present",
        RemoteRead::Absent => "absent",
        RemoteRead::BucketMissing => "bucket_missing",
    };
    let remote_doc = remote_read.into_document();

    let differing_keys = match (&local_doc, &remote_doc) {
        (Some(local), Some(remote)) => Some(diff(local, remote).len()),
        _ => None,
    };

    let output = StatusOutput {
        project: project.root.display().to_string(),
        project_name: project.source.project_name().map(str::to_string),
        file_name: target.file_name(),
        backend: remote.name(),
        local: SideStatus::new(
            project.local.location(&target),
            if local_doc.is_some() { "present" } else { "absent" },
            local_doc.as_ref(),
        ),
        remote: SideStatus::new(location.to_string(), remote_state, remote_doc.as_ref()),
        target,
        differing_keys,
    };

    if json {
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    print_status(&output);
    Ok(())
}

fn print_status(output: &StatusOutput) {
    println!("{}", output.file_name.bold());
    match &output.project_name {
        Some(name) => println!("  Project: {name} ({})", output.project),
        None => println!("  Project: {}", output.project),
    }
    print_side("Local", &output.local);
    print_side("Remote", &output.remote);

    let summary = match output.differing_keys {
        Some(0) => "in sync".green(),
        Some(n) => format!("{n} differing key(s)").yellow(),
        None => "one or both copies missing".dimmed(),
    };
    println!("  Status:  {summary}");
}

fn print_side(label: &str, side: &SideStatus) {
    let detail = match (&side.keys, &side.hash) {
        (Some(keys), Some(hash)) => format!("{keys} keys, {}", short_hash(hash)),
        _ => side.state.replace('_', " "),
    };
    println!("  {label:<7}  {} ({detail})", side.location);
}
