#![forbid(unsafe_code)]
//! golly: a whole-program Go to JavaScript compiler
//!
//! golly takes the typed syntax forest produced by an external Go front end, indexes every top-level declaration,
//! resolves interface method calls to the concrete methods that can answer them, prunes everything unreachable from
//! the program's entry points, and emits JavaScript.
//!
//! ## Pipeline
//!
//! - [`frontend`]: load typed packages (in memory, from a JSON file, or from an exporter subprocess)
//! - [`index`]: the definition arena, annotations and intrinsic templates
//! - [`resolve`]: structural interface resolution
//! - [`analysis`]: entry points and reachability
//! - [`backend`]: JavaScript emission
//! - [`driver`]: the staged compile with cancellation
//!
//! ## Panic Policy
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` and `backend` modules
//!   enforce `#![deny(clippy::unwrap_used)]`.
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.

pub mod analysis;
pub mod backend;
pub mod cli;
pub mod driver;
pub mod frontend;
pub mod index;
pub mod resolve;
pub mod version;

pub use analysis::{AnalyzeError, EntryPoints};
pub use backend::{Artifact, EmitError};
pub use driver::{CancellationToken, CompileError, CompileOptions, CompileOutput, Compiler, OutputMode, Stage};
pub use frontend::{ExternalFrontEnd, ForestFile, FrontEnd, FrontEndError, LoadedPackages};
pub use index::{DefId, Definition, Index, IndexError, build_index};
