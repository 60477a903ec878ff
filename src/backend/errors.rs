//! Define error types for JavaScript emission.
//!
//! Emission fails on user errors in intrinsic annotations (template arity), on interface calls nobody can answer,
//! and on source constructs the backend has no translation for.
//!
//! ## Notes
//!
//! - Prefer actionable messages: name the declaration and the source position so the construct can be found.

use golly_syntax::ast::Pos;
use miette::Diagnostic;
use thiserror::Error;

use crate::index::IndexError;

#[derive(Debug, Error, Diagnostic)]
pub enum EmitError {
    #[error("template of `{id}` references ${index} but the call at {pos} supplies only {supplied} argument(s)")]
    #[diagnostic(
        code(golly::emit::template_arity),
        help("pass more arguments to js.Rewrite / js.Raw, or drop the placeholder")
    )]
    TemplateArity {
        id: String,
        pos: Pos,
        index: usize,
        supplied: usize,
    },

    #[error("no method implements `{method}` of interface `{interface}` (called from `{caller}` at {pos})")]
    #[diagnostic(
        code(golly::emit::unresolved_interface_call),
        help("declare a method `{method}` on a type that satisfies the interface, or remove the call")
    )]
    UnresolvedInterfaceCall {
        interface: String,
        method: String,
        caller: String,
        pos: Pos,
    },

    #[error("`{first}` and `{second}` are both emitted as `{name}`")]
    #[diagnostic(
        code(golly::emit::name_collision),
        help("package paths that differ only in punctuation share JavaScript names; rename one with a js:\"<name>\" tag")
    )]
    NameCollision { name: String, first: String, second: String },

    #[error("unsupported in `{id}`: {message}")]
    #[diagnostic(code(golly::emit::unsupported))]
    Unsupported { id: String, message: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Index(#[from] IndexError),
}
