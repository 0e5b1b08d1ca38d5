//! CLI command definitions.

use clap::{Parser, Subcommand};

pub mod run;
pub mod runtime;

/// terrabox - run Terraform inside a container
#[derive(Parser)]
#[command(name = "terrabox")]
#[command(version, about = "terrabox - run Terraform commands inside an isolated container")]
#[command(long_about = r#"
terrabox runs a Terraform command inside a container, bind-mounting the
working directory and an optional variable file, and prints the parsed
JSON result.

COMMANDS:
  run      → Run a Terraform command in a container
  runtime  → Show which container runtime would be used

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments or configuration
  3 - Terraform execution failure
  4 - Output parse failure
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a Terraform command in a container
    Run(run::RunArgs),

    /// Show the detected container runtime
    Runtime(runtime::RuntimeArgs),
}
