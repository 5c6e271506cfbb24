//! CLI definitions using clap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

pub mod commands;

/// metasync - keep project variables in step with their S3 copy
#[derive(Parser, Debug)]
#[command(name = "metasync", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Project root (default: nearest directory holding s-project.json)
    #[arg(long, global = true, env = "METASYNC_PROJECT")]
    pub project: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Decide what would be synced without writing either side
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Reconcile the local variables file with the remote copy
    Sync(SyncArgs),

    /// Show both copies of a variables file without changing anything
    Status(TargetArgs),

    /// Print version information
    Version,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

/// Selects the variables file. Neither flag means the common file.
#[derive(Args, Debug, Clone, Default)]
pub struct TargetArgs {
    /// Stage whose variables to sync
    #[arg(short, long)]
    pub stage: Option<String>,

    /// Region within the stage (requires --stage)
    #[arg(short, long)]
    pub region: Option<String>,
}

#[derive(Args, Debug)]
pub struct SyncArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Never prompt; the remote copy wins when both exist
    #[arg(long, alias = "yes")]
    pub non_interactive: bool,
}
