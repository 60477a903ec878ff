//! Compiler driver: one compile invocation, start to finish.
//!
//! Stages run strictly in sequence: Load → Index → Resolve → Analyze → Emit. Every stage reads the completed output of
//! the previous one; the Index is built once and only read afterwards. Cancellation is checked between stages, never
//! inside one. Any failure aborts the whole compile: a caller gets every artifact or none.

mod cancel;

use std::fmt;

use golly_syntax::{Diagnostic, MethodSets};
use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::analysis::{AnalyzeError, EntryPackage, EntryPoints, Reachable, analyze, entry_packages};
use crate::backend::{self, Artifact, EmitError};
use crate::frontend::{FrontEnd, FrontEndError};
use crate::index::{DefId, IndexError, build_index};
use crate::resolve::{InterfaceResolver, resolve_call_sites};

pub use cancel::CancellationToken;

/// How artifacts are laid out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputMode {
    /// One self-contained file per entry package.
    #[default]
    Bundle,
    /// One file per package of the reachable program.
    PerPackage,
}

/// Options for one compile.
#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    pub mode: OutputMode,
    pub entries: EntryPoints,
}

impl CompileOptions {
    pub fn with_mode(mut self, mode: OutputMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_entries(mut self, entries: EntryPoints) -> Self {
        self.entries = entries;
        self
    }
}

/// The pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Load,
    Index,
    Resolve,
    Analyze,
    Emit,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Load => "load",
            Stage::Index => "index",
            Stage::Resolve => "resolve",
            Stage::Analyze => "analyze",
            Stage::Emit => "emit",
        };
        f.write_str(name)
    }
}

/// The underlying failure of a stage.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum StageError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    FrontEnd(#[from] FrontEndError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Index(#[from] IndexError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Analyze(#[from] AnalyzeError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Emit(#[from] EmitError),
}

#[derive(Debug, Error, MietteDiagnostic)]
pub enum CompileError {
    #[error("{stage} stage failed: {source}")]
    #[diagnostic(code(golly::compile::stage))]
    Stage {
        stage: Stage,
        #[diagnostic_source]
        source: StageError,
    },

    #[error("compile cancelled before the {stage} stage")]
    #[diagnostic(code(golly::compile::cancelled))]
    Cancelled { stage: Stage },
}

impl CompileError {
    /// The stage that failed or was about to run.
    pub fn stage(&self) -> Stage {
        match self {
            CompileError::Stage { stage, .. } | CompileError::Cancelled { stage } => *stage,
        }
    }
}

fn at(stage: Stage) -> impl FnOnce(StageError) -> CompileError {
    move |source| CompileError::Stage { stage, source }
}

/// Everything a successful compile produced.
#[derive(Debug, Clone, Default)]
pub struct CompileOutput {
    pub artifacts: Vec<Artifact>,
    /// Front-end warnings.
    pub diagnostics: Vec<Diagnostic>,
}

/// Compiles packages loaded through one front end.
pub struct Compiler<F> {
    frontend: F,
    options: CompileOptions,
}

impl<F: FrontEnd> Compiler<F> {
    pub fn new(frontend: F) -> Self {
        Self {
            frontend,
            options: CompileOptions::default(),
        }
    }

    pub fn with_options(mut self, options: CompileOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Compile the packages at `paths`.
    pub fn compile(&self, paths: &[String]) -> Result<CompileOutput, CompileError> {
        self.compile_with_cancel(paths, &CancellationToken::new())
    }

    /// Compile the packages at `paths`, giving up between stages once `cancel` is set.
    #[tracing::instrument(skip_all, fields(packages = paths.len(), mode = ?self.options.mode))]
    pub fn compile_with_cancel(
        &self,
        paths: &[String],
        cancel: &CancellationToken,
    ) -> Result<CompileOutput, CompileError> {
        let checkpoint = |stage: Stage| {
            if cancel.is_cancelled() {
                tracing::info!(%stage, "compile cancelled");
                Err(CompileError::Cancelled { stage })
            } else {
                Ok(())
            }
        };

        checkpoint(Stage::Load)?;
        let loaded = self
            .frontend
            .load_packages(paths)
            .map_err(|e| at(Stage::Load)(e.into()))?;
        let forest = &loaded.forest;

        checkpoint(Stage::Index)?;
        let indexed = build_index(forest).map_err(|e| at(Stage::Index)(e.into()))?;
        let index = &indexed.index;

        checkpoint(Stage::Resolve)?;
        let oracle = MethodSets::from_forest(forest);
        let resolver = InterfaceResolver::new(index, &oracle);
        let resolutions = resolve_call_sites(&resolver, &indexed.call_sites);

        checkpoint(Stage::Analyze)?;
        let analyzed = || -> Result<Vec<(EntryPackage, Reachable)>, AnalyzeError> {
            let packages = entry_packages(index, forest, paths, &self.options.entries)?;
            match self.options.mode {
                OutputMode::Bundle => packages
                    .into_iter()
                    .map(|package| -> Result<_, AnalyzeError> {
                        let reachable = analyze(index, &resolutions, &package.entries)?;
                        Ok((package, reachable))
                    })
                    .collect(),
                OutputMode::PerPackage => {
                    let roots: Vec<DefId> = packages.iter().flat_map(|p| p.entries.iter().copied()).collect();
                    let reachable = analyze(index, &resolutions, &roots)?;
                    Ok(packages.into_iter().map(|p| (p, reachable.clone())).collect())
                }
            }
        };
        let analyzed = analyzed().map_err(|e| at(Stage::Analyze)(e.into()))?;

        checkpoint(Stage::Emit)?;
        let emitted = || -> Result<Vec<Artifact>, EmitError> {
            let artifacts = match self.options.mode {
                OutputMode::Bundle => analyzed
                    .iter()
                    .map(|(package, reachable)| backend::emit_bundle(index, &resolutions, package, reachable))
                    .collect::<Result<Vec<_>, _>>(),
                OutputMode::PerPackage => {
                    let Some((_, reachable)) = analyzed.first() else {
                        return Ok(Vec::new());
                    };
                    let entries: Vec<EntryPackage> = analyzed.iter().map(|(p, _)| p.clone()).collect();
                    backend::emit_per_package(index, &resolutions, &entries, reachable)
                }
            }?;
            backend::artifacts::ensure_distinct_files(&artifacts)?;
            Ok(artifacts)
        };
        let artifacts = emitted().map_err(|e| at(Stage::Emit)(e.into()))?;

        tracing::info!(
            artifacts = artifacts.len(),
            definitions = index.len(),
            "compile finished"
        );
        Ok(CompileOutput {
            artifacts,
            diagnostics: loaded.diagnostics,
        })
    }
}
