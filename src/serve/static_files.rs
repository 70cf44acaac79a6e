// src/serve/static_files.rs

//! Static file lookup for every path that is not the freshness endpoint.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use percent_encoding::percent_decode_str;

use crate::errors::Result;
use crate::fs::FileSystem;

/// Result of mapping a URL path onto the static root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StaticLookup {
    File(PathBuf),
    NotFound,
    /// The path tried to leave the root (`..`).
    Forbidden,
}

#[derive(Debug, Clone)]
pub struct StaticFiles {
    root: PathBuf,
    fs: Arc<dyn FileSystem>,
}

impl StaticFiles {
    pub fn new(root: impl Into<PathBuf>, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            root: root.into(),
            fs,
        }
    }

    /// Map a URL path (without query string) to a file under the root.
    ///
    /// Directories resolve to their `index.html`.
    pub fn lookup(&self, url_path: &str) -> StaticLookup {
        let decoded = percent_decode_str(url_path).decode_utf8_lossy();

        let mut path = self.root.clone();
        for component in Path::new(decoded.trim_start_matches('/')).components() {
            match component {
                Component::Normal(part) => path.push(part),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return StaticLookup::Forbidden;
                }
            }
        }

        if self.fs.is_dir(&path) {
            path.push("index.html");
        }
        if self.fs.is_file(&path) {
            StaticLookup::File(path)
        } else {
            StaticLookup::NotFound
        }
    }

    pub fn read(&self, path: &Path) -> Result<Vec<u8>> {
        self.fs.read(path)
    }
}

/// Content type by file extension; `.wasm` must be `application/wasm` for
/// streaming instantiation in browsers.
pub fn content_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("wasm") => "application/wasm",
        Some("html") | Some("htm") => "text/html; charset=utf-8",
        Some("js") | Some("mjs") => "text/javascript; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("json") | Some("map") => "application/json",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("ico") => "image/x-icon",
        Some("txt") => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    fn site() -> StaticFiles {
        let fs = MockFileSystem::new();
        fs.add_file("/site/index.html", "<html></html>");
        fs.add_file("/site/out.wasm", b"\0asm".to_vec());
        fs.add_file("/site/my app/main.js", "go.run()");
        StaticFiles::new("/site", Arc::new(fs))
    }

    #[test]
    fn root_serves_index() {
        assert_eq!(
            site().lookup("/"),
            StaticLookup::File(PathBuf::from("/site/index.html"))
        );
    }

    #[test]
    fn percent_encoded_paths_are_decoded() {
        assert_eq!(
            site().lookup("/my%20app/main.js"),
            StaticLookup::File(PathBuf::from("/site/my app/main.js"))
        );
    }

    #[test]
    fn parent_components_are_forbidden() {
        assert_eq!(site().lookup("/../etc/passwd"), StaticLookup::Forbidden);
        assert_eq!(site().lookup("/%2e%2e/secret"), StaticLookup::Forbidden);
    }

    #[test]
    fn missing_file_is_not_found() {
        assert_eq!(site().lookup("/nope.js"), StaticLookup::NotFound);
    }

    #[test]
    fn wasm_gets_wasm_content_type() {
        assert_eq!(content_type(Path::new("/site/out.wasm")), "application/wasm");
        assert_eq!(content_type(Path::new("/site/OUT.WASM")), "application/wasm");
        assert_eq!(content_type(Path::new("/site/blob")), "application/octet-stream");
    }
}
