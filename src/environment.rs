/// Host environment snapshot included in every report
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;

use crate::interpreter::{parse_last_json_line, PythonInterpreter};

/// Placeholder for unset environment variables
pub const NOT_AVAILABLE: &str = "n/a";

const ENVIRONMENT_SCRIPT: &str =
    "import json, sys; print(json.dumps({'version': sys.version, 'executable': sys.executable, \
     'platform': sys.platform, 'path': sys.path}))";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HostEnvironment {
    pub python_version: String,
    pub python_executable: String,
    pub platform: String,
    pub module_search_path: Vec<String>,
    pub python_path: String,
    pub jython_path: String,
    pub class_path: String,
    pub ironpython_path: String,
}

#[derive(Debug, Deserialize)]
struct InterpreterInfo {
    version: String,
    executable: String,
    platform: String,
    path: Vec<String>,
}

impl HostEnvironment {
    /// Query the interpreter once; the snapshot is then passed around read-only
    pub fn probe(interpreter: &PythonInterpreter) -> Result<Self> {
        let output = interpreter
            .run_script(ENVIRONMENT_SCRIPT, &[] as &[&str])
            .context("Failed to query Python environment")?;

        if !output.status.success() {
            anyhow::bail!(
                "Python environment query exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let info: InterpreterInfo = parse_last_json_line(&stdout).with_context(|| {
            format!("Failed to parse Python environment: {}", stdout.trim())
        })?;

        let python_executable = if info.executable.is_empty() {
            interpreter.executable().display().to_string()
        } else {
            info.executable
        };

        Ok(Self::from_parts(
            info.version,
            python_executable,
            info.platform,
            info.path,
        ))
    }

    /// Build a snapshot from interpreter facts, reading the path variables from
    /// this process's environment
    pub fn from_parts(
        python_version: String,
        python_executable: String,
        platform: String,
        module_search_path: Vec<String>,
    ) -> Self {
        Self {
            python_version,
            python_executable,
            platform,
            module_search_path,
            python_path: env_or_not_available("PYTHONPATH"),
            jython_path: env_or_not_available("JYTHONPATH"),
            class_path: env_or_not_available("CLASSPATH"),
            ironpython_path: env_or_not_available("IRONPYTHONPATH"),
        }
    }
}

fn env_or_not_available(var: &str) -> String {
    env::var(var).unwrap_or_else(|_| NOT_AVAILABLE.to_string())
}
