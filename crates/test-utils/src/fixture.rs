use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;

use crate::FakeToolchain;

/// A throwaway package graph on disk, wired into a [`FakeToolchain`].
///
/// The target package lives in `<root>/app`; dependencies live in
/// `<root>/deps/<id>`.
pub struct PackageGraphFixture {
    _dir: TempDir,
    root: PathBuf,
    toolchain: Arc<FakeToolchain>,
}

impl PackageGraphFixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        // Watcher events carry canonical paths; keep fixture paths canonical
        // too (macOS tempdirs sit behind a symlink).
        let root = dir.path().canonicalize().unwrap();
        std::fs::create_dir_all(root.join("app")).unwrap();
        Self {
            _dir: dir,
            root,
            toolchain: Arc::new(FakeToolchain::new()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory of the target package.
    pub fn target(&self) -> PathBuf {
        self.root.join("app")
    }

    pub fn toolchain(&self) -> Arc<FakeToolchain> {
        Arc::clone(&self.toolchain)
    }

    /// Write the target package's files and register it.
    pub fn with_target_files(self, files: &[(&str, &str)]) -> Self {
        let dir = self.target();
        write_files(&dir, files);
        let names: Vec<&str> = files.iter().map(|(name, _)| *name).collect();
        self.toolchain
            .add_package(dir.to_string_lossy(), &dir, &names);
        self
    }

    /// Write a dependency package's files and register it as a dependency.
    pub fn with_dependency(self, id: &str, files: &[(&str, &str)]) -> Self {
        let dir = self.root.join("deps").join(id);
        write_files(&dir, files);
        let names: Vec<&str> = files.iter().map(|(name, _)| *name).collect();
        self.toolchain.add_package(id, &dir, &names);
        self.toolchain.add_dependency(id);
        self
    }

    pub fn path_of(&self, rel: &str) -> PathBuf {
        self.root.join(rel)
    }
}

impl Default for PackageGraphFixture {
    fn default() -> Self {
        Self::new()
    }
}

fn write_files(dir: &Path, files: &[(&str, &str)]) {
    std::fs::create_dir_all(dir).unwrap();
    for (name, contents) in files {
        std::fs::write(dir.join(name), contents).unwrap();
    }
}
