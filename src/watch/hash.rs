// src/watch/hash.rs

use std::fmt;
use std::io::Read;
use std::path::Path;

use blake3::Hasher;
use tracing::trace;

use crate::errors::{FreshError, Result};
use crate::fs::FileSystem;

/// Hex digest of empty input.
///
/// Some editors briefly truncate a file to zero bytes while saving; a change
/// event that hashes to this value is treated as transient.
pub const EMPTY_DIGEST_HEX: &str =
    "af1349b9f5f9a1a6a0404dea36dcc9499bcb25c9adc112b7cc9a93cae41f3262";

/// A 256-bit content digest (blake3 output).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Digest([u8; 32]);

impl Digest {
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Digest of an in-memory byte slice.
    pub fn of(data: &[u8]) -> Self {
        Self(*blake3::hash(data).as_bytes())
    }

    /// The digest of zero bytes of input.
    pub fn empty_input() -> Self {
        Self::of(&[])
    }

    pub fn is_empty_input(&self) -> bool {
        *self == Self::empty_input()
    }

    /// Lowercase hex encoding, 64 characters.
    pub fn to_hex(&self) -> String {
        blake3::Hash::from_bytes(self.0).to_hex().to_string()
    }

    pub fn from_hex(s: &str) -> Option<Self> {
        blake3::Hash::from_hex(s)
            .ok()
            .map(|h| Self(*h.as_bytes()))
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // First 16 hex chars are plenty to tell digests apart in logs.
        write!(f, "Digest({})", &self.to_hex()[..16])
    }
}

/// Compute the digest of a single file's contents.
pub fn digest_file(fs: &dyn FileSystem, path: &Path) -> Result<Digest> {
    let mut hasher = Hasher::new();
    let mut file = fs.open_read(path)?;
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf).map_err(|e| FreshError::io(path, e))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    let digest = Digest(*hasher.finalize().as_bytes());
    trace!(path = %path.display(), digest = ?digest, "hashed file");
    Ok(digest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    #[test]
    fn empty_digest_constant_matches_blake3() {
        assert_eq!(Digest::empty_input().to_hex(), EMPTY_DIGEST_HEX);
        assert!(Digest::from_hex(EMPTY_DIGEST_HEX).unwrap().is_empty_input());
    }

    #[test]
    fn hashing_a_file_matches_hashing_its_bytes() {
        let fs = MockFileSystem::new();
        fs.add_file("/pkg/main.go", "package main");

        let digest = digest_file(&fs, Path::new("/pkg/main.go")).unwrap();
        assert_eq!(digest, Digest::of(b"package main"));
        assert!(!digest.is_empty_input());
    }

    #[test]
    fn empty_file_hashes_to_empty_digest() {
        let fs = MockFileSystem::new();
        fs.add_file("/pkg/empty.go", "");

        let digest = digest_file(&fs, Path::new("/pkg/empty.go")).unwrap();
        assert!(digest.is_empty_input());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let fs = MockFileSystem::new();
        let err = digest_file(&fs, Path::new("/nope.go")).unwrap_err();
        assert!(matches!(err, FreshError::Io { .. }));
    }

    #[test]
    fn hex_round_trip_rejects_garbage() {
        assert!(Digest::from_hex("not hex").is_none());
    }
}
