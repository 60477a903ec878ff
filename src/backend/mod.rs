//! golly JavaScript backend
//!
//! This module turns reachable definitions into JavaScript artifacts.
//!
//! The pipeline is:
//! 1. Reachable definitions in emission order → [`JsCodegen`] → one text section per declaration
//! 2. Sections are assembled into artifacts: a single bundle per entry package, or one file per package
//!
//! ## Module Organization
//!
//! - `codegen/` - Code generation from definitions to JavaScript
//!   - `mod.rs` - Main JsCodegen struct, naming and zero values
//!   - `decls.rs` - Function, method, class and variable emission
//!   - `statements.rs` - Statement emission
//!   - `expressions.rs` - Expression emission and interface dispatch
//! - `intrinsic.rs` - Call-template binding and substitution
//! - `js_emitter.rs` - Low-level JavaScript code string builder
//! - `artifacts.rs` - Named output files

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod artifacts;
pub mod codegen;
pub mod errors;
pub(crate) mod intrinsic;
pub mod js_emitter;

pub use artifacts::Artifact;
pub use codegen::JsCodegen;
pub use errors::EmitError;

use indexmap::IndexMap;

use crate::analysis::{EntryPackage, Reachable};
use crate::index::{DefId, Index};
use crate::resolve::Resolutions;
use codegen::{global_name, has_global};
use js_emitter::JsEmitter;

/// First line of every artifact.
pub const HEADER: &str = "// Code generated by golly. DO NOT EDIT.";

/// Emit one self-contained bundle for `entry`: its reachable set wrapped in an immediately-invoked function.
///
/// A program bundle ends by calling `main`; a library bundle publishes its exported globals on
/// `globalThis["<package path>"]`.
#[tracing::instrument(skip_all, fields(package = %entry.path, definitions = reachable.len()))]
pub fn emit_bundle(
    index: &Index<'_>,
    resolutions: &Resolutions,
    entry: &EntryPackage,
    reachable: &Reachable,
) -> Result<Artifact, EmitError> {
    let mut codegen = JsCodegen::new(index, resolutions);
    let sections = codegen.declarations(reachable.order(), 1)?;

    let mut out = JsEmitter::new();
    out.line(HEADER);
    out.line("(function() {");
    out.write(&sections.join("\n"));
    out.indent();
    match entry.main {
        Some(main) => {
            if !sections.is_empty() {
                out.blank_line();
            }
            out.linef(format_args!("{}();", global_name(index.def(main))));
        }
        None => emit_exports(&mut out, index, entry, !sections.is_empty()),
    }
    out.dedent();
    out.line("})();");
    Ok(Artifact::new(entry.path.clone(), out.finish()))
}

fn emit_exports(out: &mut JsEmitter, index: &Index<'_>, entry: &EntryPackage, separate: bool) {
    let exports: Vec<DefId> = entry
        .entries
        .iter()
        .copied()
        .filter(|&id| has_global(index.def(id)))
        .collect();
    if exports.is_empty() {
        return;
    }
    if separate {
        out.blank_line();
    }
    out.linef(format_args!("globalThis[{}] = {{", serde_json::Value::String(entry.path.clone())));
    out.indent();
    for id in exports {
        let def = index.def(id);
        out.linef(format_args!("{}: {},", def.name(), global_name(def)));
    }
    out.dedent();
    out.line("};");
}

/// Emit one artifact per package of the jointly reachable set, in order of first appearance.
///
/// Declarations stay at the top level so later files see the globals of earlier ones. Each entry package that is a
/// program ends its artifact with the call to `main`.
#[tracing::instrument(skip_all, fields(entries = entries.len(), definitions = reachable.len()))]
pub fn emit_per_package(
    index: &Index<'_>,
    resolutions: &Resolutions,
    entries: &[EntryPackage],
    reachable: &Reachable,
) -> Result<Vec<Artifact>, EmitError> {
    let mut by_package: IndexMap<&str, Vec<DefId>> = IndexMap::new();
    for &id in reachable.order() {
        by_package.entry(index.def(id).path()).or_default().push(id);
    }

    let mut codegen = JsCodegen::new(index, resolutions);
    let mut artifacts = Vec::with_capacity(by_package.len());
    for (path, ids) in by_package {
        let sections = codegen.declarations(&ids, 0)?;
        let main = entries.iter().find(|e| e.path == path).and_then(|e| e.main);
        if sections.is_empty() && main.is_none() {
            continue;
        }

        let mut out = JsEmitter::new();
        out.line(HEADER);
        out.blank_line();
        out.write(&sections.join("\n"));
        if let Some(main) = main {
            if !sections.is_empty() {
                out.blank_line();
            }
            out.linef(format_args!("{}();", global_name(index.def(main))));
        }
        tracing::debug!(package = path, declarations = sections.len(), "package emitted");
        artifacts.push(Artifact::new(path, out.finish()));
    }
    Ok(artifacts)
}
