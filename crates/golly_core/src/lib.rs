//! Provide shared, pure semantic helpers and canonical vocabulary for the golly compiler.
//!
//! This crate is intentionally small and dependency-light. It contains deterministic helpers that the front-end
//! boundary, the definition index and the JavaScript backend all agree on.
//!
//! ## Notes
//!
//! - This is a “semantic core” crate: **no IO**, no global state, and no compiler-specific types.
//! - Current scope: target-language reserved words, well-known identifiers, `js:"..."` annotation tags, and intrinsic
//!   template parsing/substitution.

pub mod lang;
pub mod template;

pub use template::{Template, TemplateError};
