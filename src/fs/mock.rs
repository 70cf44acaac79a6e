// src/fs/mock.rs

use super::FileSystem;
use crate::errors::{FreshError, Result};
use std::collections::HashMap;
use std::io::{self, Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone)]
pub enum MockEntry {
    File(Vec<u8>),
    Dir,
    /// Resolved by `canonicalize`; reads go through to the target.
    Symlink(PathBuf),
}

/// In-memory filesystem. Clones share the same underlying entries, so a
/// test can keep one handle and mutate files while the code under test
/// reads through another.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    files: Arc<Mutex<HashMap<PathBuf, MockEntry>>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a file, creating parent directories implicitly.
    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        let path = path.as_ref().to_path_buf();
        let mut files = self.lock();
        let mut parent = path.parent();
        while let Some(dir) = parent {
            if dir.as_os_str().is_empty() {
                break;
            }
            files.entry(dir.to_path_buf()).or_insert(MockEntry::Dir);
            parent = dir.parent();
        }
        files.insert(path, MockEntry::File(content.into()));
    }

    /// Point `link` at `target`, replacing whatever was at `link`.
    pub fn add_symlink(&self, link: impl AsRef<Path>, target: impl Into<PathBuf>) {
        self.lock()
            .insert(link.as_ref().to_path_buf(), MockEntry::Symlink(target.into()));
    }

    pub fn remove_file(&self, path: impl AsRef<Path>) {
        self.lock().remove(path.as_ref());
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<PathBuf, MockEntry>> {
        // A poisoned mock only happens after a test already panicked.
        self.files.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Follow symlinks to the final path, giving up after a few hops.
    fn resolve(&self, path: &Path) -> PathBuf {
        let files = self.lock();
        let mut current = path.to_path_buf();
        for _ in 0..8 {
            match files.get(&current) {
                Some(MockEntry::Symlink(target)) => current = target.clone(),
                _ => break,
            }
        }
        current
    }

    fn file_contents(&self, path: &Path) -> Result<Vec<u8>> {
        let resolved = self.resolve(path);
        match self.lock().get(&resolved) {
            Some(MockEntry::File(content)) => Ok(content.clone()),
            Some(MockEntry::Dir) => Err(FreshError::io(
                path,
                io::Error::new(io::ErrorKind::Other, "is a directory"),
            )),
            Some(MockEntry::Symlink(_)) | None => Err(FreshError::io(
                path,
                io::Error::new(io::ErrorKind::NotFound, "file not found"),
            )),
        }
    }
}

impl FileSystem for MockFileSystem {
    fn open_read(&self, path: &Path) -> Result<Box<dyn Read + Send>> {
        Ok(Box::new(Cursor::new(self.file_contents(path)?)))
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        self.file_contents(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        let resolved = self.resolve(path);
        matches!(self.lock().get(&resolved), Some(MockEntry::File(_)))
    }

    fn is_dir(&self, path: &Path) -> bool {
        let resolved = self.resolve(path);
        matches!(self.lock().get(&resolved), Some(MockEntry::Dir))
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        // Tests use absolute paths, so resolved entries are canonical.
        let resolved = self.resolve(path);
        if matches!(
            self.lock().get(&resolved),
            Some(MockEntry::File(_) | MockEntry::Dir)
        ) {
            Ok(resolved)
        } else {
            Err(FreshError::io(
                path,
                io::Error::new(io::ErrorKind::NotFound, "file not found"),
            ))
        }
    }
}
