//! golly version information.
//!
//! Only the CLI reports this value; emitted artifacts carry no version.

/// The golly version string (for example, `0.2.0`), taken from Cargo metadata at compile time.
pub const GOLLY_VERSION: &str = env!("CARGO_PKG_VERSION");
