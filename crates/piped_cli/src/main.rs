//! piped-manifest CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Invalid arguments
//! - 3: Manifest load or parse error
//! - 4: Templating error

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use piped_manifest::ManifestError;
use piped_templating::TemplatingError;

mod commands;

use commands::{Cli, Commands};

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
    pub const MANIFEST_ERROR: u8 = 3;
    pub const TEMPLATING_ERROR: u8 = 4;
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr so rendered manifests on stdout stay clean.
    let level = if cli.verbose {
        "piped=debug"
    } else if cli.quiet {
        "piped=warn"
    } else {
        "piped=info"
    };
    let filter = EnvFilter::from_default_env()
        .add_directive(level.parse().unwrap())
        .add_directive("warn".parse().unwrap());
    let log_result = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    if log_result.is_err() {
        // Logging already initialized, continue
    }

    let result = match cli.command {
        Commands::Render(args) => commands::render::execute(args),
        Commands::Key(args) => commands::key::execute(args),
    };

    match result {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            let exit_code = categorize_error(&e);
            eprintln!("Error: {:#}", e);
            ExitCode::from(exit_code)
        }
    }
}

/// Categorize error to determine exit code
fn categorize_error(e: &anyhow::Error) -> u8 {
    if let Some(err) = e.downcast_ref::<TemplatingError>() {
        return match err {
            TemplatingError::Manifest(_) => ExitCodes::MANIFEST_ERROR,
            _ => ExitCodes::TEMPLATING_ERROR,
        };
    }
    match e.downcast_ref::<ManifestError>() {
        Some(ManifestError::MalformedKey(_)) => ExitCodes::INVALID_ARGS,
        Some(_) => ExitCodes::MANIFEST_ERROR,
        None => ExitCodes::GENERAL_ERROR,
    }
}
