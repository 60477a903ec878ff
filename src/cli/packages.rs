//! Narrow package patterns to `main` packages with `go list`.

use std::path::Path;
use std::process::Command;

use super::{CliError, CliResult};

const GO_LIST_FORMAT: &str = "{{.Name}}|{{.ImportPath}}";

/// One line of `go list` output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedPackage {
    pub name: String,
    pub import_path: String,
}

/// Parse `<name>|<import path>` lines. Malformed lines are skipped with a warning.
pub fn parse_go_list(output: &str) -> Vec<ListedPackage> {
    let mut packages = Vec::new();
    for line in output.lines().map(str::trim).filter(|l| !l.is_empty()) {
        match line.split_once('|') {
            Some((name, import_path)) if !name.is_empty() && !import_path.is_empty() => {
                packages.push(ListedPackage {
                    name: name.to_string(),
                    import_path: import_path.to_string(),
                });
            }
            _ => tracing::warn!(line, "skipping malformed go list line"),
        }
    }
    packages
}

/// Import paths of the `main` packages matched by `patterns`.
#[tracing::instrument(skip_all, fields(patterns = patterns.len()))]
pub fn main_packages(root: Option<&Path>, patterns: &[String]) -> CliResult<Vec<String>> {
    let mut command = Command::new("go");
    command.arg("list").arg("-f").arg(GO_LIST_FORMAT).args(patterns);
    if let Some(root) = root {
        command.current_dir(root);
    }
    let output = command
        .output()
        .map_err(|e| CliError::failure(format!("Error: failed to run go list: {e}")))?;
    if !output.status.success() {
        return Err(CliError::failure(format!(
            "Error: go list failed:\n{}",
            String::from_utf8_lossy(&output.stderr).trim_end()
        )));
    }

    let listed = parse_go_list(&String::from_utf8_lossy(&output.stdout));
    let mains: Vec<String> = listed
        .into_iter()
        .filter(|p| p.name == golly_core::lang::conventions::MAIN_PACKAGE_NAME)
        .map(|p| p.import_path)
        .collect();
    tracing::debug!(main_packages = mains.len(), "narrowed packages");
    if mains.is_empty() {
        return Err(CliError::failure(format!(
            "Error: no main packages in {}",
            patterns.join(" ")
        )));
    }
    Ok(mains)
}
