//! CLI command implementations
//!
//! All command functions return `CliResult<ExitCode>` instead of calling
//! `process::exit`. Error handling and exits happen in the top-level `run()`.

use crate::analysis::EntryPoints;
use crate::backend::Artifact;
use crate::driver::{CompileOptions, CompileOutput, Compiler, OutputMode};
use crate::frontend::{ExternalFrontEnd, ForestFile, FrontEnd};

use super::packages;
use super::{BuildArgs, CliError, CliResult, ExitCode};

/// Compile packages and print or write the artifacts.
pub fn build(args: &BuildArgs) -> CliResult<ExitCode> {
    let options = options(args);

    let output = match &args.forest {
        Some(forest) => compile(ForestFile::new(forest), options, &args.packages)?,
        None => {
            let packages = if args.library || !args.entries.is_empty() {
                args.packages.clone()
            } else {
                packages::main_packages(args.root.as_deref(), &args.packages)?
            };
            let mut frontend = match &args.frontend {
                Some(command) => ExternalFrontEnd::new(command),
                None => ExternalFrontEnd::from_env(),
            };
            if let Some(root) = &args.root {
                frontend = frontend.with_dir(root);
            }
            compile(frontend, options, &packages)?
        }
    };

    for diagnostic in &output.diagnostics {
        eprintln!("{diagnostic}");
    }

    match &args.out {
        Some(dir) => {
            for artifact in &output.artifacts {
                let path = artifact
                    .write_to(dir)
                    .map_err(|e| CliError::failure(format!("Error writing {}: {e}", artifact.file_name())))?;
                tracing::info!(path = %path.display(), "wrote artifact");
            }
        }
        None => print!("{}", frame(&output.artifacts)),
    }
    Ok(ExitCode::SUCCESS)
}

fn options(args: &BuildArgs) -> CompileOptions {
    let mode = if args.per_package {
        OutputMode::PerPackage
    } else {
        OutputMode::Bundle
    };
    let entries = if args.entries.is_empty() {
        EntryPoints::Main
    } else {
        EntryPoints::Symbols(args.entries.clone())
    };
    CompileOptions::default().with_mode(mode).with_entries(entries)
}

fn compile<F: FrontEnd>(frontend: F, options: CompileOptions, packages: &[String]) -> CliResult<CompileOutput> {
    Compiler::new(frontend)
        .with_options(options)
        .compile(packages)
        .map_err(CliError::report)
}

/// Artifacts framed for stdout: `---`, name, `---`, source, `===`.
pub fn frame(artifacts: &[Artifact]) -> String {
    let mut out = String::new();
    for artifact in artifacts {
        out.push_str("---\n");
        out.push_str(&artifact.name);
        out.push_str("\n---\n");
        out.push_str(&artifact.source);
        if !artifact.source.ends_with('\n') {
            out.push('\n');
        }
        out.push_str("===\n");
    }
    out
}
