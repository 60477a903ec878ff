//! Define error types for the Index stage.
//!
//! These errors describe a forest that cannot be indexed, or a reference that does not land on an indexed
//! definition. With a correct front end neither should happen; they are reported as internal invariant violations
//! with enough context (definition ID, source position) to find the culprit.

use golly_syntax::ast::Pos;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Clone, Error, Diagnostic)]
pub enum IndexError {
    #[error("duplicate definition ID `{id}` at {pos}")]
    #[diagnostic(
        code(golly::index::duplicate_id),
        help("the front end produced two declarations with the same package path and name; this is a front-end bug")
    )]
    DuplicateId { id: String, pos: Pos },

    #[error("`{from}` references `{id}`, which is not a known definition")]
    #[diagnostic(code(golly::index::unknown_reference))]
    UnknownReference { from: String, id: String },

    #[error("`{from}` calls `{method}` on `{id}`, which is not an interface")]
    #[diagnostic(code(golly::index::not_an_interface))]
    NotAnInterface { from: String, id: String, method: String },

    #[error("malformed intrinsic on `{id}` at {pos}: {reason}")]
    #[diagnostic(
        code(golly::index::malformed_intrinsic),
        help("the first argument of js.Rewrite / js.Raw must be a string literal")
    )]
    MalformedIntrinsic { id: String, pos: Pos, reason: String },
}
