// src/exec/list_output.rs

//! Parsing for `go list -f` template output.
//!
//! Two shapes are consumed:
//! - `{{ .Dir }}|{{ .GoFiles }}` → `/abs/dir|[a.go b.go]`
//! - `{{ .Deps }}` → `[fmt os path/filepath]`
//!
//! The `|` delimiter is assumed never to occur in a path; the output is not
//! escaped by `go list`.

use std::path::PathBuf;

use crate::errors::{FreshError, Result};
use crate::exec::backend::PackageFiles;

pub const PACKAGE_DELIMITER: char = '|';

/// Split a Go template list (`[a b c]`) into its items.
///
/// An empty list (`[]`) yields no items.
pub fn parse_list(output: &str) -> Vec<String> {
    let trimmed = output.trim();
    let inner = trimmed.strip_prefix('[').unwrap_or(trimmed);
    let inner = inner.strip_suffix(']').unwrap_or(inner);
    inner.split_whitespace().map(str::to_string).collect()
}

/// Parse `<dir>|[<files>]` into the package directory and its files.
pub fn parse_package_files(output: &str) -> Result<PackageFiles> {
    let mut parts = output.trim().split(PACKAGE_DELIMITER);
    let (Some(dir), Some(files), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(FreshError::Discovery(format!(
            "bad result from `go list`: {:?}",
            output
        )));
    };

    let dir = dir.trim();
    if dir.is_empty() {
        return Err(FreshError::Discovery(format!(
            "`go list` reported no package directory: {:?}",
            output
        )));
    }

    Ok(PackageFiles {
        dir: PathBuf::from(dir),
        files: parse_list(files),
    })
}
