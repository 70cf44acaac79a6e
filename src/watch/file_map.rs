// src/watch/file_map.rs

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use blake3::Hasher;
use tracing::debug;

use crate::errors::Result;
use crate::fs::FileSystem;
use crate::watch::hash::{digest_file, Digest};

/// Snapshot of every tracked file and its last-known content digest.
///
/// Built once at startup; entries are updated in place by the watch loop
/// and never removed.
#[derive(Debug, Clone, Default)]
pub struct FileMap {
    digests: HashMap<PathBuf, Digest>,
}

impl FileMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Canonicalize and hash every file once.
    pub fn build<I, P>(fs: &dyn FileSystem, files: I) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut map = Self::new();
        for file in files {
            let path = fs.canonicalize(file.as_ref())?;
            let digest = digest_file(fs, &path)?;
            map.digests.insert(path, digest);
        }
        debug!(files = map.len(), "built file map");
        Ok(map)
    }

    pub fn get(&self, path: &Path) -> Option<Digest> {
        self.digests.get(path).copied()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.digests.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.digests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.digests.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.digests.keys().map(PathBuf::as_path)
    }

    /// Record a new digest for `path`, returning the previous one.
    pub fn update(&mut self, path: impl Into<PathBuf>, digest: Digest) -> Option<Digest> {
        self.digests.insert(path.into(), digest)
    }

    /// Aggregate digest over all `(path, digest)` pairs.
    ///
    /// Paths are sorted by their raw bytes so the result never depends on
    /// map iteration order. Each entry contributes
    /// `<path bytes> NUL <hex digest> LF`. The separators are a hardening over
    /// plain path + hex concatenation, where a path containing a hex digest
    /// could make two different maps hash the same.
    pub fn total_digest(&self) -> Digest {
        let mut entries: Vec<(&PathBuf, &Digest)> = self.digests.iter().collect();
        entries.sort_by(|(a, _), (b, _)| {
            a.as_os_str()
                .as_encoded_bytes()
                .cmp(b.as_os_str().as_encoded_bytes())
        });

        let mut hasher = Hasher::new();
        for (path, digest) in entries {
            hasher.update(path.as_os_str().as_encoded_bytes());
            hasher.update(&[0]);
            hasher.update(digest.to_hex().as_bytes());
            hasher.update(b"\n");
        }
        Digest::from_bytes(*hasher.finalize().as_bytes())
    }
}

impl FromIterator<(PathBuf, Digest)> for FileMap {
    fn from_iter<T: IntoIterator<Item = (PathBuf, Digest)>>(iter: T) -> Self {
        Self {
            digests: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    #[test]
    fn build_hashes_each_file_once() {
        let fs = MockFileSystem::new();
        fs.add_file("/app/main.go", "package main");
        fs.add_file("/lib/util.go", "package lib");

        let map = FileMap::build(&fs, ["/app/main.go", "/lib/util.go"]).unwrap();

        assert_eq!(map.len(), 2);
        assert_eq!(
            map.get(Path::new("/app/main.go")),
            Some(Digest::of(b"package main"))
        );
    }

    #[test]
    fn build_fails_on_unreadable_file() {
        let fs = MockFileSystem::new();
        fs.add_file("/app/main.go", "package main");

        assert!(FileMap::build(&fs, ["/app/main.go", "/app/gone.go"]).is_err());
    }

    #[test]
    fn total_digest_is_stable_across_calls() {
        let map: FileMap = [
            (PathBuf::from("/a.go"), Digest::of(b"a")),
            (PathBuf::from("/b.go"), Digest::of(b"b")),
        ]
        .into_iter()
        .collect();

        assert_eq!(map.total_digest(), map.total_digest());
    }

    #[test]
    fn total_digest_tracks_single_entry_changes() {
        let mut map: FileMap = [
            (PathBuf::from("/a.go"), Digest::of(b"a")),
            (PathBuf::from("/b.go"), Digest::of(b"b")),
        ]
        .into_iter()
        .collect();
        let before = map.total_digest();

        let previous = map.update("/b.go", Digest::of(b"b2"));
        assert_eq!(previous, Some(Digest::of(b"b")));
        assert_ne!(map.total_digest(), before);
    }

    #[test]
    fn total_digest_binds_digest_to_its_path() {
        let one: FileMap = [
            (PathBuf::from("/a.go"), Digest::of(b"x")),
            (PathBuf::from("/b.go"), Digest::of(b"y")),
        ]
        .into_iter()
        .collect();
        let swapped: FileMap = [
            (PathBuf::from("/a.go"), Digest::of(b"y")),
            (PathBuf::from("/b.go"), Digest::of(b"x")),
        ]
        .into_iter()
        .collect();

        assert_ne!(one.total_digest(), swapped.total_digest());
    }

    #[test]
    fn entry_framing_keeps_maps_with_embedded_hex_apart() {
        let first = Digest::of(b"p");
        let second = Digest::of(b"q");
        let two: FileMap = [
            (PathBuf::from("/p"), first),
            (PathBuf::from("/q"), second),
        ]
        .into_iter()
        .collect();
        // Concatenating path and hex for `two` yields exactly this path
        // followed by `second`'s hex.
        let merged = PathBuf::from(format!("/p{}/q", first.to_hex()));
        let one: FileMap = [(merged, second)].into_iter().collect();

        assert_ne!(two.total_digest(), one.total_digest());
    }
}
