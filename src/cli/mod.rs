//! `golly build`: command-line front door to the compiler.
//!
//! Failures travel as [`CliError`] values carrying the message to print and the exit status; [`run`] is the one
//! place that prints them and exits. `commands` holds the build itself, `packages` the `go list` narrowing.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod commands;
pub mod packages;

use std::fmt;
use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};

use crate::version::GOLLY_VERSION;

/// Process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
}

/// A failed command: what to print on stderr and the status to exit with.
#[derive(Debug)]
pub struct CliError {
    pub message: String,
    pub exit_code: ExitCode,
}

impl CliError {
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }

    /// A compile failure, rendered through miette with its code, help and source positions.
    pub fn report(err: impl miette::Diagnostic + Send + Sync + 'static) -> Self {
        Self::failure(format!("{:?}", miette::Report::new(err)))
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for CliError {}

pub type CliResult<T> = Result<T, CliError>;

/// Whole-program Go to JavaScript compiler
#[derive(Parser, Debug)]
#[command(name = "golly")]
#[command(version = GOLLY_VERSION)]
#[command(about = "Compile Go packages to JavaScript", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compile packages to JavaScript
    Build(BuildArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct BuildArgs {
    /// Package paths or patterns to compile
    #[arg(value_name = "PACKAGES", required = true)]
    pub packages: Vec<String>,

    /// Directory to run `go list` and the front end in
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Read a previously exported typed forest instead of running the front end
    #[arg(long, value_name = "FILE", conflicts_with = "frontend")]
    pub forest: Option<PathBuf>,

    /// Front-end exporter command (default: $GOLLY_FRONTEND, then golly-frontend)
    #[arg(long, value_name = "CMD")]
    pub frontend: Option<String>,

    /// Write `<package>.js` files here instead of printing to stdout
    #[arg(long, value_name = "DIR")]
    pub out: Option<PathBuf>,

    /// One file per package instead of one bundle per entry package
    #[arg(long)]
    pub per_package: bool,

    /// Compile the packages as libraries: keep non-main packages and export their exported definitions
    #[arg(long)]
    pub library: bool,

    /// Explicit entry point, as "<package path> <Name>" (repeatable)
    #[arg(long = "entry", value_name = "ID")]
    pub entries: Vec<String>,
}

/// Parse the command line, run the command and exit with its status.
pub fn run() {
    let cli = Cli::parse();
    let code = match execute(cli) {
        Ok(code) => code,
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            e.exit_code
        }
    };
    if code != ExitCode::SUCCESS {
        process::exit(code.0);
    }
}

fn execute(cli: Cli) -> CliResult<ExitCode> {
    match cli.command {
        Command::Build(args) => commands::build(&args),
    }
}
