// src/exec/mod.rs

//! Toolchain execution layer.
//!
//! - [`backend`] provides the `Toolchain` trait the rest of the crate talks
//!   to, so tests can swap in a fake implementation.
//! - [`go`] is the production backend, shelling out to `go list` and
//!   `go build` with the WASM target selected.
//! - [`list_output`] parses `go list -f` template output.
//! - [`builder`] wraps a single build invocation for a fixed target.

pub mod backend;
pub mod builder;
pub mod go;
pub mod list_output;

pub use backend::{BoxFuture, BuildOutput, PackageFiles, Toolchain};
pub use builder::Builder;
pub use go::GoToolchain;
