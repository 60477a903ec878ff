//! The typed syntax forest: every package the front end loaded for one compile.

use std::collections::{HashSet, VecDeque};

use golly_core::lang::conventions;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ast::Package;
use crate::diagnostics::Diagnostic;

/// Error decoding a serialized forest.
#[derive(Debug, Error, miette::Diagnostic)]
pub enum ForestError {
    #[error("malformed typed forest: {0}")]
    #[diagnostic(
        code(golly::forest::json),
        help("the front end must emit the JSON schema of golly_syntax::TypedForest")
    )]
    Json(#[from] serde_json::Error),
}

/// All packages of one compile, in front-end order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypedForest {
    #[serde(default)]
    pub packages: Vec<Package>,
}

/// What an external front end writes: the forest plus its diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportDocument {
    #[serde(flatten)]
    pub forest: TypedForest,
    #[serde(default)]
    pub diagnostics: Vec<Diagnostic>,
}

impl ExportDocument {
    #[tracing::instrument(skip_all, fields(bytes = json.len()))]
    pub fn from_json(json: &str) -> Result<Self, ForestError> {
        Ok(serde_json::from_str(json)?)
    }
}

impl TypedForest {
    pub fn new(packages: Vec<Package>) -> Self {
        Self { packages }
    }

    pub fn from_json(json: &str) -> Result<Self, ForestError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, ForestError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn package(&self, path: &str) -> Option<&Package> {
        self.packages.iter().find(|p| p.path == path)
    }

    /// Keep the requested packages and everything they import, transitively, in forest order.
    ///
    /// Unknown requested packages and unknown imports are reported as error diagnostics. Imports of the intrinsic
    /// package are allowed to be absent: it only exists to name the raw-code primitives.
    #[tracing::instrument(skip_all, fields(requested = paths.len()))]
    pub fn select(&self, paths: &[String]) -> (TypedForest, Vec<Diagnostic>) {
        let mut diagnostics = Vec::new();
        let mut wanted: HashSet<&str> = HashSet::new();
        let mut queue: VecDeque<&str> = VecDeque::new();

        for path in paths {
            if self.package(path).is_none() {
                diagnostics.push(Diagnostic::error(format!("cannot find package \"{path}\"")));
                continue;
            }
            if wanted.insert(path.as_str()) {
                queue.push_back(path.as_str());
            }
        }

        while let Some(path) = queue.pop_front() {
            let Some(package) = self.package(path) else { continue };
            for import in &package.imports {
                if wanted.contains(import.as_str()) {
                    continue;
                }
                if self.package(import).is_none() {
                    if import != conventions::INTRINSIC_PACKAGE {
                        diagnostics.push(Diagnostic::error(format!(
                            "package \"{path}\" imports unknown package \"{import}\""
                        )));
                    }
                    continue;
                }
                wanted.insert(import.as_str());
                queue.push_back(import.as_str());
            }
        }

        let packages = self
            .packages
            .iter()
            .filter(|p| wanted.contains(p.path.as_str()))
            .cloned()
            .collect();
        (TypedForest { packages }, diagnostics)
    }
}
