/// Host Python interpreter
///
/// Every interaction with Python (module probes, libdoc generation, environment
/// queries) goes through this type so that they all see the same executable and
/// the same extended module search path.
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::env;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

/// Module that must be importable before any library is processed
pub const ROBOT_MODULE: &str = "robot";

#[derive(Debug, Clone)]
pub struct PythonInterpreter {
    executable: PathBuf,
    search_paths: Vec<PathBuf>,
}

impl PythonInterpreter {
    /// Create an interpreter handle, resolving the executable from PATH
    pub fn new(executable: &str, search_paths: Vec<PathBuf>) -> Self {
        let resolved = which::which(executable).unwrap_or_else(|e| {
            tracing::debug!(
                executable,
                error = %e,
                "interpreter not found in PATH, trying as-is"
            );
            PathBuf::from(executable)
        });

        Self {
            executable: resolved,
            search_paths,
        }
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// Base command with output captured and the search paths appended to PYTHONPATH
    fn command(&self) -> Result<Command> {
        let mut cmd = Command::new(&self.executable);

        if !self.search_paths.is_empty() {
            let mut paths: Vec<PathBuf> = env::var_os("PYTHONPATH")
                .map(|value| env::split_paths(&value).collect())
                .unwrap_or_default();
            paths.extend(self.search_paths.iter().cloned());

            let joined = env::join_paths(paths).context("Invalid module search path")?;
            cmd.env("PYTHONPATH", joined);
        }

        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        Ok(cmd)
    }

    /// Run an inline script (`python -c`) with the given arguments
    pub fn run_script<S: AsRef<OsStr>>(&self, script: &str, args: &[S]) -> Result<Output> {
        let mut cmd = self.command()?;
        cmd.arg("-c").arg(script).args(args);
        self.output(cmd)
    }

    /// Run a module as a program (`python -m`) with the given arguments
    pub fn run_module<S: AsRef<OsStr>>(&self, module: &str, args: &[S]) -> Result<Output> {
        let mut cmd = self.command()?;
        cmd.arg("-m").arg(module).args(args);
        self.output(cmd)
    }

    /// Whether `module` can be imported by this interpreter
    pub fn has_module(&self, module: &str) -> Result<bool> {
        let output = self.run_script(&format!("import {}", module), &[] as &[&str])?;
        Ok(output.status.success())
    }

    fn output(&self, mut cmd: Command) -> Result<Output> {
        tracing::trace!(command = ?cmd, "running interpreter");

        cmd.output().with_context(|| {
            format!(
                "Failed to run Python interpreter: {}",
                self.executable.display()
            )
        })
    }
}

/// Parse the last non-empty stdout line as JSON
///
/// Start-up hooks (`sitecustomize`, `.pth` files) and imported libraries may
/// print before the reply, so only the final line is considered.
pub fn parse_last_json_line<T: DeserializeOwned>(stdout: &str) -> Option<T> {
    stdout
        .lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .and_then(|line| serde_json::from_str(line.trim()).ok())
}
