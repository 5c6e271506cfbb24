//! Version command implementation.

use serde::Serialize;

use crate::cli::commands::BIN_NAME;
use crate::error::Result;
use crate::store::{RemoteBackend, RemoteStore};

#[derive(Serialize)]
struct VersionOutput<'a> {
    name: &'a str,
    version: &'a str,
    build: &'a str,
    /// Remote backend this environment would sync against.
    remote_backend: &'static str,
}

/// Execute the version command.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn execute(json: bool) -> Result<()> {
    let output = VersionOutput {
        name: BIN_NAME,
        version: env!("CARGO_PKG_VERSION"),
        build: if cfg!(debug_assertions) { "dev" } else { "release" },
        remote_backend: RemoteBackend::from_env().name(),
    };

    if json {
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    println!(
        "{} {} ({}, remote: {})",
        output.name, output.version, output.build, output.remote_backend
    );
    Ok(())
}
