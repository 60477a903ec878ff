//! golly vocabulary registries.
//!
//! Registries are intentionally **pure**: no syntax types, no IO, no side effects.
//!
//! ## Examples
//! ```rust
//! use golly_core::lang::{conventions, js_keywords};
//!
//! assert!(js_keywords::is_reserved("delete"));
//! assert!(conventions::is_exported("Area"));
//! ```

pub mod annotations;
pub mod conventions;
pub mod js_keywords;
