// src/exec/backend.rs

//! Pluggable toolchain abstraction.
//!
//! The discoverer and the builder talk to a `Toolchain` instead of spawning
//! processes directly. Production code uses [`GoToolchain`]; tests provide
//! a fake that maps package identifiers onto fixture directories and
//! "builds" by writing an artifact file.
//!
//! [`GoToolchain`]: crate::exec::go::GoToolchain

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use crate::errors::Result;
use crate::types::BuildTarget;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A package's directory and the source file names the build tool reports
/// for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageFiles {
    pub dir: PathBuf,
    pub files: Vec<String>,
}

impl PackageFiles {
    /// Absolute paths of the package's source files.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.iter().map(|f| self.dir.join(f)).collect()
    }
}

/// Output captured from a successful build.
#[derive(Debug, Clone, Default)]
pub struct BuildOutput {
    pub output: String,
}

/// Trait abstracting the external build toolchain.
///
/// - `list_package` resolves a package (path or import identifier) into its
///   directory and source files.
/// - `list_deps` returns the transitive dependency identifiers of a target.
/// - `build` compiles the target; a non-zero exit is a
///   [`FreshError::Build`](crate::errors::FreshError::Build) carrying the
///   captured output.
pub trait Toolchain: Send + Sync {
    fn list_package<'a>(&'a self, package: &'a str) -> BoxFuture<'a, Result<PackageFiles>>;

    fn list_deps<'a>(&'a self, target: &'a Path) -> BoxFuture<'a, Result<Vec<String>>>;

    fn build<'a>(&'a self, target: &'a BuildTarget) -> BoxFuture<'a, Result<BuildOutput>>;
}
