// src/exec/go.rs

//! `go` toolchain backend.

use std::collections::BTreeMap;
use std::path::Path;
use std::process::{Output, Stdio};

use tokio::process::Command;
use tracing::debug;

use crate::errors::{FreshError, Result};
use crate::exec::backend::{BoxFuture, BuildOutput, PackageFiles, Toolchain};
use crate::exec::list_output::{parse_list, parse_package_files};
use crate::types::BuildTarget;

const PACKAGE_FILES_TEMPLATE: &str = "{{ .Dir }}|{{ .GoFiles }}";
const DEPS_TEMPLATE: &str = "{{ .Deps }}";

/// Environment selecting the WASM cross-compilation target.
pub fn default_wasm_env() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("GOOS".to_string(), "js".to_string()),
        ("GOARCH".to_string(), "wasm".to_string()),
    ])
}

/// Drives the `go` command line for package queries and builds.
#[derive(Debug, Clone)]
pub struct GoToolchain {
    program: String,
    env: BTreeMap<String, String>,
}

impl Default for GoToolchain {
    fn default() -> Self {
        Self::new("go", default_wasm_env())
    }
}

impl GoToolchain {
    pub fn new(program: impl Into<String>, env: BTreeMap<String, String>) -> Self {
        Self {
            program: program.into(),
            env,
        }
    }

    fn command(&self, cwd: Option<&Path>) -> Command {
        let mut cmd = Command::new(&self.program);
        // Inherited environment plus the cross-compilation overrides.
        cmd.envs(&self.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = cwd {
            cmd.current_dir(dir);
        }
        cmd
    }

    async fn list(&self, template: &str, package: &str, cwd: Option<&Path>) -> Result<String> {
        debug!(program = %self.program, package, template, "running go list");
        let output = self
            .command(cwd)
            .args(["list", "-f", template, package])
            .output()
            .await
            .map_err(|e| {
                FreshError::Discovery(format!("spawning `{} list` for {package}: {e}", self.program))
            })?;

        if !output.status.success() {
            return Err(FreshError::Discovery(format!(
                "`{} list` for {package} exited with {}:\n{}",
                self.program,
                output.status,
                combined_output(&output)
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Toolchain for GoToolchain {
    fn list_package<'a>(&'a self, package: &'a str) -> BoxFuture<'a, Result<PackageFiles>> {
        Box::pin(async move {
            let stdout = self.list(PACKAGE_FILES_TEMPLATE, package, None).await?;
            parse_package_files(&stdout)
        })
    }

    fn list_deps<'a>(&'a self, target: &'a Path) -> BoxFuture<'a, Result<Vec<String>>> {
        Box::pin(async move {
            let cwd = target.parent();
            let package = target.to_string_lossy();
            let stdout = self.list(DEPS_TEMPLATE, &package, cwd).await?;
            Ok(parse_list(&stdout))
        })
    }

    fn build<'a>(&'a self, target: &'a BuildTarget) -> BoxFuture<'a, Result<BuildOutput>> {
        Box::pin(async move {
            let output = self
                .command(Some(target.work_dir()))
                .arg("build")
                .args(target.flags())
                .arg(target.path())
                .output()
                .await
                .map_err(|e| FreshError::Build {
                    output: format!("spawning `{} build`: {e}", self.program),
                })?;

            let combined = combined_output(&output);
            if !output.status.success() {
                return Err(FreshError::Build {
                    output: format!("{}. Output:\n{}", output.status, combined),
                });
            }
            Ok(BuildOutput { output: combined })
        })
    }
}

/// Stdout followed by stderr, lossily decoded.
fn combined_output(output: &Output) -> String {
    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
    combined.push_str(&String::from_utf8_lossy(&output.stderr));
    combined
}

#[cfg(test)]
mod tests {
    use super::*;

    fn missing_tool() -> GoToolchain {
        GoToolchain::new("wasmfresh-no-such-go-binary", default_wasm_env())
    }

    #[test]
    fn default_env_selects_wasm() {
        let env = default_wasm_env();
        assert_eq!(env.get("GOOS").map(String::as_str), Some("js"));
        assert_eq!(env.get("GOARCH").map(String::as_str), Some("wasm"));
    }

    #[tokio::test]
    async fn missing_program_is_a_build_error() {
        let target = BuildTarget::new(std::env::temp_dir(), vec![]);
        let err = missing_tool().build(&target).await.unwrap_err();
        assert!(matches!(err, FreshError::Build { .. }), "{err:?}");
        assert!(!err.is_fatal());
    }

    #[tokio::test]
    async fn missing_program_is_a_discovery_error() {
        let err = missing_tool().list_package("fmt").await.unwrap_err();
        assert!(matches!(err, FreshError::Discovery(_)), "{err:?}");
    }
}
