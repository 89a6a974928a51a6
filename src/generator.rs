/// Libdoc generation
///
/// The documentation engine is external. [`ArtifactGenerator`] is the seam the
/// library processor depends on; [`LibdocGenerator`] drives Robot Framework's
/// `robot.libdoc` through the host interpreter.
use anyhow::{Context, Result};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::cache::artifact_path;
use crate::interpreter::PythonInterpreter;
use crate::library::LibraryReference;

/// Produces the documentation artifact of a library
pub trait ArtifactGenerator {
    /// Write the libdoc for `reference` to `<cache_dir>/<cache_key>.xml` and return its path
    fn generate(
        &self,
        reference: &LibraryReference,
        cache_key: &str,
        cache_dir: &Path,
    ) -> Result<PathBuf>;
}

/// Module run to produce libdoc files
pub const LIBDOC_MODULE: &str = "robot.libdoc";

/// Runs `python -m robot.libdoc --format XML <library> <output>`
pub struct LibdocGenerator {
    interpreter: PythonInterpreter,
}

impl LibdocGenerator {
    pub fn new(interpreter: PythonInterpreter) -> Self {
        Self { interpreter }
    }
}

impl ArtifactGenerator for LibdocGenerator {
    fn generate(
        &self,
        reference: &LibraryReference,
        cache_key: &str,
        cache_dir: &Path,
    ) -> Result<PathBuf> {
        let output_path = artifact_path(cache_dir, cache_key);
        let start = Instant::now();

        let output = self
            .interpreter
            .run_module(
                LIBDOC_MODULE,
                &[
                    OsStr::new("--format"),
                    OsStr::new("XML"),
                    OsStr::new(reference.as_str()),
                    output_path.as_os_str(),
                ],
            )
            .with_context(|| format!("Failed to run libdoc for: {}", reference))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);
            let detail = if stderr.trim().is_empty() {
                stdout.trim().to_string()
            } else {
                stderr.trim().to_string()
            };
            anyhow::bail!(
                "libdoc exited with {} for {}: {}",
                output.status,
                reference,
                detail
            );
        }

        if !output_path.exists() {
            anyhow::bail!(
                "libdoc reported success but wrote no file: {}",
                output_path.display()
            );
        }

        tracing::debug!(
            library = %reference,
            cache_key,
            duration_ms = start.elapsed().as_millis() as u64,
            "libdoc written"
        );

        Ok(output_path)
    }
}
