//! Entry points and reachability.
//!
//! Only definitions reachable from an entry point are emitted. Pruning is required for correctness: unreachable
//! declarations may use constructs that have no JavaScript translation.
//!
//! The traversal is an explicit-stack depth-first search over [`Index::dependencies`], guarded by a visited set so
//! dependency cycles terminate. Definitions are recorded in post-order, which puts every dependency before its
//! dependents (except across a cycle, where the member reached first comes last). Entries and the dependencies of each
//! definition are visited in Index registration order, so the result depends only on the input.

use std::collections::HashSet;

use golly_core::lang::conventions;
use golly_syntax::forest::TypedForest;
use miette::Diagnostic;
use thiserror::Error;

use crate::index::{DefId, DefKind, Index, IndexError};
use crate::resolve::Resolutions;

/// How the entry points of a compile are chosen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EntryPoints {
    /// `main` packages start at `func main()`; other requested packages export their exported definitions.
    #[default]
    Main,
    /// Explicit definition IDs.
    Symbols(Vec<String>),
}

#[derive(Debug, Error, Diagnostic)]
pub enum AnalyzeError {
    #[error("package \"{package}\" has no `func main()`")]
    #[diagnostic(
        code(golly::analyze::no_main),
        help("declare `func main()` in the package, or build it as a library")
    )]
    NoMain { package: String },

    #[error("unknown entry point `{id}`")]
    #[diagnostic(
        code(golly::analyze::unknown_entry_point),
        help("entry points are definition IDs of the form \"<package path> <Name>\"")
    )]
    UnknownEntryPoint { id: String },

    #[error("package \"{path}\" was requested but the front end did not load it")]
    #[diagnostic(
        code(golly::analyze::missing_package),
        help("check that the front end exports every requested package")
    )]
    MissingPackage { path: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Dependency(#[from] IndexError),
}

/// The entries contributed by one package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPackage {
    pub path: String,
    pub entries: Vec<DefId>,
    /// The program's `main` function, when the package is a program.
    pub main: Option<DefId>,
}

/// Work out the entry points of a compile, grouped by package in request order.
pub fn entry_packages(
    index: &Index<'_>,
    forest: &TypedForest,
    requested: &[String],
    mode: &EntryPoints,
) -> Result<Vec<EntryPackage>, AnalyzeError> {
    match mode {
        EntryPoints::Main => requested
            .iter()
            .map(|path| {
                let package = forest
                    .package(path)
                    .ok_or_else(|| AnalyzeError::MissingPackage { path: path.clone() })?;
                if package.name == conventions::MAIN_PACKAGE_NAME {
                    let main = index
                        .lookup(&conventions::definition_id(&package.path, conventions::ENTRYPOINT_NAME))
                        .filter(|&id| matches!(index.def(id).kind(), DefKind::Function(_)))
                        .ok_or_else(|| AnalyzeError::NoMain {
                            package: package.path.clone(),
                        })?;
                    Ok(EntryPackage {
                        path: package.path.clone(),
                        entries: vec![main],
                        main: Some(main),
                    })
                } else {
                    Ok(EntryPackage {
                        path: package.path.clone(),
                        entries: library_exports(index, &package.path),
                        main: None,
                    })
                }
            })
            .collect(),
        EntryPoints::Symbols(ids) => {
            let mut packages: Vec<EntryPackage> = Vec::new();
            for id in ids {
                let handle = index
                    .lookup(id)
                    .ok_or_else(|| AnalyzeError::UnknownEntryPoint { id: id.clone() })?;
                let path = index.def(handle).path();
                match packages.iter_mut().find(|p| p.path == path) {
                    Some(package) => package.entries.push(handle),
                    None => packages.push(EntryPackage {
                        path: path.to_string(),
                        entries: vec![handle],
                        main: None,
                    }),
                }
            }
            Ok(packages)
        }
    }
}

/// Exported definitions of a library package. Methods count when both they and their receiver are exported.
fn library_exports(index: &Index<'_>, path: &str) -> Vec<DefId> {
    index
        .all()
        .filter(|(_, def)| def.path() == path && def.exported())
        .filter(|(_, def)| match def.kind() {
            DefKind::Method(m) => conventions::is_exported(&m.receiver.name),
            _ => true,
        })
        .map(|(id, _)| id)
        .collect()
}

/// Reachable definitions and their emission order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reachable {
    order: Vec<DefId>,
    marked: HashSet<DefId>,
}

impl Reachable {
    /// Emission order: dependencies before dependents.
    pub fn order(&self) -> &[DefId] {
        &self.order
    }

    pub fn contains(&self, id: DefId) -> bool {
        self.marked.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

struct Frame {
    node: DefId,
    deps: Vec<DefId>,
    cursor: usize,
}

/// Compute the definitions reachable from `entries` and a topological emission order.
#[tracing::instrument(skip_all, fields(entries = entries.len()))]
pub fn analyze(index: &Index<'_>, resolutions: &Resolutions, entries: &[DefId]) -> Result<Reachable, AnalyzeError> {
    let sorted_deps = |id: DefId| -> Result<Vec<DefId>, AnalyzeError> {
        let mut deps = index.dependencies(id, resolutions)?.to_vec();
        deps.sort_unstable();
        Ok(deps)
    };

    let mut roots = entries.to_vec();
    roots.sort_unstable();
    roots.dedup();

    let mut marked = HashSet::new();
    let mut order = Vec::new();
    let mut stack: Vec<Frame> = Vec::new();

    for root in roots {
        if !marked.insert(root) {
            continue;
        }
        stack.push(Frame {
            node: root,
            deps: sorted_deps(root)?,
            cursor: 0,
        });
        while let Some(frame) = stack.last_mut() {
            let next = frame.deps.get(frame.cursor).copied();
            frame.cursor += 1;
            match next {
                Some(dep) => {
                    if marked.insert(dep) {
                        stack.push(Frame {
                            node: dep,
                            deps: sorted_deps(dep)?,
                            cursor: 0,
                        });
                    }
                }
                None => {
                    if let Some(done) = stack.pop() {
                        order.push(done.node);
                    }
                }
            }
        }
    }

    tracing::debug!(reachable = order.len(), total = index.len(), "reachability computed");
    Ok(Reachable { order, marked })
}
