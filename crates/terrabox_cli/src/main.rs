//! terrabox CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Invalid arguments or configuration
//! - 3: Terraform execution failure
//! - 4: Output parse failure

use std::process::ExitCode;

use clap::Parser;
use terrabox_iac::IacError;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

use commands::{Cli, Commands};

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
    pub const EXECUTION_FAILURE: u8 = 3;
    pub const PARSE_FAILURE: u8 = 4;
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let result = match cli.command {
        Commands::Run(args) => commands::run::execute(args).await,
        Commands::Runtime(args) => commands::runtime::execute(args).await,
    };

    match result {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            let exit_code = categorize_error(&e);
            eprintln!("❌ Error: {:#}", e);
            ExitCode::from(exit_code)
        }
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let default_level = if verbose {
        "terrabox=debug,info"
    } else if quiet {
        "error"
    } else {
        "terrabox=info,warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // Logging may already be initialized; keep going either way.
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}

/// Categorize error to determine exit code
fn categorize_error(e: &anyhow::Error) -> u8 {
    match e.downcast_ref::<IacError>() {
        Some(IacError::Configuration(_)) | Some(IacError::Runner(_)) => ExitCodes::INVALID_ARGS,
        Some(IacError::Execution(_)) | Some(IacError::Stderr(_)) => ExitCodes::EXECUTION_FAILURE,
        Some(IacError::Parse(_)) => ExitCodes::PARSE_FAILURE,
        Some(_) => ExitCodes::GENERAL_ERROR,
        None => {
            let msg = e.to_string().to_lowercase();
            if msg.contains("argument") || msg.contains("option") || msg.contains("parameter file") {
                ExitCodes::INVALID_ARGS
            } else {
                ExitCodes::GENERAL_ERROR
            }
        }
    }
}
