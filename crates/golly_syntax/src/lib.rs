//! Typed syntax forest shared between golly and its front ends.
//!
//! The parser and type checker live outside this repository. What they hand over is described here: packages,
//! declarations, statements and expressions with every name resolved and every expression typed, plus the
//! diagnostics they produced.
//!
//! ## Notes
//! - This crate is intentionally “data-only”: it does not index definitions, analyze reachability or emit code.
//! - The only judgment it makes is structural interface satisfaction ([`check::TypeOracle`]), because that is the
//!   type checker's call, not the compiler core's.
//!
//! ## Examples
//! ```rust
//! use golly_syntax::TypedForest;
//!
//! let forest = TypedForest::from_json(r#"{"packages":[{"path":"app","name":"main"}]}"#).unwrap();
//! assert_eq!(forest.packages[0].name, "main");
//! ```

pub mod ast;
pub mod check;
pub mod diagnostics;
pub mod forest;
pub mod types;

pub use check::{MethodSets, TypeOracle};
pub use diagnostics::{Diagnostic, Severity};
pub use forest::{ExportDocument, ForestError, TypedForest};
