//! golly front-end adapters
//!
//! Parsing and type checking happen outside this crate. A [`FrontEnd`] hands over the typed syntax forest for a set
//! of package paths, plus whatever diagnostics it produced:
//! - [`TypedForest`]: an in-memory forest (tests, embedding)
//! - [`ForestFile`]: a forest serialized to JSON on disk
//! - [`ExternalFrontEnd`]: an exporter command run as a subprocess
//!
//! Any error-severity diagnostic fails the load; warnings are passed through.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use golly_syntax::diagnostics::has_errors;
use golly_syntax::{Diagnostic, ExportDocument, ForestError, TypedForest};
use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

/// Environment variable naming the exporter command.
pub const FRONTEND_ENV: &str = "GOLLY_FRONTEND";

/// Exporter command used when neither a flag nor [`FRONTEND_ENV`] names one.
pub const DEFAULT_FRONTEND: &str = "golly-frontend";

/// What a successful load produced.
#[derive(Debug, Clone, Default)]
pub struct LoadedPackages {
    pub forest: TypedForest,
    /// Warnings only: a load with errors fails instead.
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Error, MietteDiagnostic)]
pub enum FrontEndError {
    #[error("the front end reported errors:\n{}", render(.diagnostics))]
    #[diagnostic(code(golly::frontend::diagnostics), help("fix the reported errors and compile again"))]
    Diagnostics { diagnostics: Vec<Diagnostic> },

    #[error("failed to run front end `{command}`")]
    #[diagnostic(
        code(golly::frontend::spawn),
        help("pass --frontend or set GOLLY_FRONTEND to an exporter on your PATH")
    )]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("front end `{command}` exited with {status}\n{stderr}")]
    #[diagnostic(code(golly::frontend::exited))]
    Exited {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("failed to read {}", .path.display())]
    #[diagnostic(code(golly::frontend::io))]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Forest(#[from] ForestError),
}

fn render(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .filter(|d| d.is_error())
        .map(|d| format!("  {d}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Loads typed packages for the compiler.
pub trait FrontEnd {
    /// The requested packages and everything they import.
    fn load_packages(&self, paths: &[String]) -> Result<LoadedPackages, FrontEndError>;
}

/// Turn a forest and its diagnostics into a load result.
fn finish(forest: TypedForest, diagnostics: Vec<Diagnostic>) -> Result<LoadedPackages, FrontEndError> {
    if has_errors(&diagnostics) {
        return Err(FrontEndError::Diagnostics { diagnostics });
    }
    tracing::debug!(
        packages = forest.packages.len(),
        warnings = diagnostics.len(),
        "packages loaded"
    );
    Ok(LoadedPackages { forest, diagnostics })
}

impl FrontEnd for TypedForest {
    fn load_packages(&self, paths: &[String]) -> Result<LoadedPackages, FrontEndError> {
        let (forest, diagnostics) = self.select(paths);
        finish(forest, diagnostics)
    }
}

/// A forest previously exported to a JSON file.
#[derive(Debug, Clone)]
pub struct ForestFile {
    path: PathBuf,
}

impl ForestFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FrontEnd for ForestFile {
    #[tracing::instrument(skip_all, fields(path = %self.path.display()))]
    fn load_packages(&self, paths: &[String]) -> Result<LoadedPackages, FrontEndError> {
        let json = fs::read_to_string(&self.path).map_err(|source| FrontEndError::Io {
            path: self.path.clone(),
            source,
        })?;
        let document = ExportDocument::from_json(&json)?;
        let (forest, mut diagnostics) = document.forest.select(paths);
        let mut all = document.diagnostics;
        all.append(&mut diagnostics);
        finish(forest, all)
    }
}

/// Runs an exporter as `<command> --out <file> <paths...>` and reads the forest it writes.
///
/// The output file is a scoped temporary file, removed when the load returns on any path.
#[derive(Debug, Clone)]
pub struct ExternalFrontEnd {
    command: String,
    dir: Option<PathBuf>,
}

impl ExternalFrontEnd {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            dir: None,
        }
    }

    /// The command from `GOLLY_FRONTEND`, or the default exporter.
    pub fn from_env() -> Self {
        Self::new(std::env::var(FRONTEND_ENV).unwrap_or_else(|_| DEFAULT_FRONTEND.to_string()))
    }

    /// Run the exporter in `dir` instead of the current directory.
    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = Some(dir.into());
        self
    }

    pub fn command(&self) -> &str {
        &self.command
    }
}

impl FrontEnd for ExternalFrontEnd {
    #[tracing::instrument(skip_all, fields(command = %self.command, packages = paths.len()))]
    fn load_packages(&self, paths: &[String]) -> Result<LoadedPackages, FrontEndError> {
        let out = tempfile::Builder::new()
            .prefix("golly-forest-")
            .suffix(".json")
            .tempfile()
            .map_err(|source| FrontEndError::Io {
                path: std::env::temp_dir(),
                source,
            })?;

        let mut command = Command::new(&self.command);
        command.arg("--out").arg(out.path()).args(paths);
        if let Some(dir) = &self.dir {
            command.current_dir(dir);
        }
        let output = command.output().map_err(|source| FrontEndError::Spawn {
            command: self.command.clone(),
            source,
        })?;
        if !output.status.success() {
            return Err(FrontEndError::Exited {
                command: self.command.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim_end().to_string(),
            });
        }

        let json = fs::read_to_string(out.path()).map_err(|source| FrontEndError::Io {
            path: out.path().to_path_buf(),
            source,
        })?;
        let document = ExportDocument::from_json(&json)?;
        finish(document.forest, document.diagnostics)
    }
}
