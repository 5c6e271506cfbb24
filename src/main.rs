//! metasync CLI entry point.

use clap::Parser;
use metasync::cli::commands;
use metasync::cli::{Cli, Commands};
use metasync::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    // Set up tracing based on verbosity
    init_tracing(cli.verbose, cli.quiet);

    // Run the command and handle errors
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.json {
                eprintln!("{}", e.to_structured_json());
            } else if !cli.quiet {
                if let Some(hint) = e.hint() {
                    eprintln!("Error: {e}\n  Hint: {hint}");
                } else {
                    eprintln!("Error: {e}");
                }
            }
            ExitCode::from(e.exit_code())
        }
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    if quiet {
        return;
    }

    // Honor RUST_LOG if set, otherwise use verbosity flag
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info,aws_config=warn,aws_smithy_runtime=warn"),
            2 => EnvFilter::new("debug,aws_config=info,aws_smithy_runtime=info,hyper=info"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn run(cli: &Cli) -> Result<(), Error> {
    let project = cli.project.as_deref();

    match &cli.command {
        Commands::Sync(args) => commands::sync::execute(args, project, cli.dry_run, cli.json),
        Commands::Status(args) => commands::status::execute(args, project, cli.json),
        Commands::Version => commands::version::execute(cli.json),
        Commands::Completions { shell } => commands::completions::execute(shell),
    }
}
