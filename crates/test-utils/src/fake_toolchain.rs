use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use wasmfresh::errors::{FreshError, Result};
use wasmfresh::exec::{BoxFuture, BuildOutput, PackageFiles, Toolchain};
use wasmfresh::types::BuildTarget;

/// A fake toolchain that:
/// - answers package queries from an in-memory table
/// - reports a fixed dependency list for every target
/// - "builds" by writing an artifact named by the `-o` flag, or fails on
///   demand.
#[derive(Debug, Default)]
pub struct FakeToolchain {
    packages: Mutex<HashMap<String, PackageFiles>>,
    deps: Mutex<Vec<String>>,
    broken: Mutex<HashSet<String>>,
    fail_builds: AtomicBool,
    builds: AtomicUsize,
    built_paths: Mutex<Vec<PathBuf>>,
    build_output: Mutex<String>,
}

impl FakeToolchain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a package under `id` (an import identifier or a target path).
    pub fn add_package(&self, id: impl Into<String>, dir: impl Into<PathBuf>, files: &[&str]) {
        let pkg = PackageFiles {
            dir: dir.into(),
            files: files.iter().map(|f| f.to_string()).collect(),
        };
        self.packages.lock().unwrap().insert(id.into(), pkg);
    }

    /// Add `id` to the dependency list of every target.
    pub fn add_dependency(&self, id: impl Into<String>) {
        self.deps.lock().unwrap().push(id.into());
    }

    /// Make `list_package(id)` fail.
    pub fn break_package(&self, id: impl Into<String>) {
        self.broken.lock().unwrap().insert(id.into());
    }

    pub fn set_fail_builds(&self, fail: bool) {
        self.fail_builds.store(fail, Ordering::SeqCst);
    }

    /// Text a successful build reports as its captured output.
    pub fn set_build_output(&self, output: impl Into<String>) {
        *self.build_output.lock().unwrap() = output.into();
    }

    /// Number of build invocations so far, failed ones included.
    pub fn build_count(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }

    /// Targets of every build invocation, in order.
    pub fn built_paths(&self) -> Vec<PathBuf> {
        self.built_paths.lock().unwrap().clone()
    }
}

fn output_file(target: &BuildTarget) -> PathBuf {
    let flags = target.flags();
    let name = flags
        .iter()
        .position(|f| f == "-o")
        .and_then(|i| flags.get(i + 1))
        .map(String::as_str)
        .unwrap_or("out.wasm");
    target.work_dir().join(name)
}

impl Toolchain for FakeToolchain {
    fn list_package<'a>(&'a self, package: &'a str) -> BoxFuture<'a, Result<PackageFiles>> {
        Box::pin(async move {
            if self.broken.lock().unwrap().contains(package) {
                return Err(FreshError::Discovery(format!("cannot find package {package}")));
            }
            self.packages
                .lock()
                .unwrap()
                .get(package)
                .cloned()
                .ok_or_else(|| FreshError::Discovery(format!("unknown package {package}")))
        })
    }

    fn list_deps<'a>(&'a self, _target: &'a Path) -> BoxFuture<'a, Result<Vec<String>>> {
        Box::pin(async move { Ok(self.deps.lock().unwrap().clone()) })
    }

    fn build<'a>(&'a self, target: &'a BuildTarget) -> BoxFuture<'a, Result<BuildOutput>> {
        Box::pin(async move {
            let n = self.builds.fetch_add(1, Ordering::SeqCst) + 1;
            self.built_paths
                .lock()
                .unwrap()
                .push(target.path().to_path_buf());

            if self.fail_builds.load(Ordering::SeqCst) {
                return Err(FreshError::Build {
                    output: "main.go:1:1: expected 'package', found 'EOF'".to_string(),
                });
            }

            let artifact = output_file(target);
            std::fs::write(&artifact, format!("\0asm build {n}"))
                .map_err(|e| FreshError::io(&artifact, e))?;
            Ok(BuildOutput {
                output: self.build_output.lock().unwrap().clone(),
            })
        })
    }
}
