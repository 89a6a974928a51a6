/// Libdoc cache directory
///
/// One libdoc file per cache key, named `<cache_key>.xml`. Entries are
/// validated against the modification time of the library source; they are
/// overwritten when stale and never removed.
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::resolver::ResolvedModule;

/// Extension of cached libdoc files
pub const ARTIFACT_EXTENSION: &str = "xml";

/// Outcome of validating a cache entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheCheck {
    /// Libdoc exists and is at least as new as the source
    Hit(PathBuf),
    /// Libdoc exists but the source changed after it was written
    Stale,
    /// No libdoc for this key
    Missing,
}

/// Cache validator for a libdoc directory
pub struct CacheValidator {
    cache_dir: PathBuf,
}

impl CacheValidator {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }

    /// Create the cache directory (and parents) if it does not exist
    pub fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.cache_dir).with_context(|| {
            format!(
                "Failed to create cache directory: {}",
                self.cache_dir.display()
            )
        })
    }

    pub fn dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Path the libdoc for `cache_key` lives at
    pub fn artifact_path(&self, cache_key: &str) -> PathBuf {
        artifact_path(&self.cache_dir, cache_key)
    }

    /// Check whether the cached libdoc for `cache_key` can be reused for `module`
    ///
    /// A module without a discoverable source counts as infinitely old, so an
    /// existing libdoc for it is always reused.
    pub fn check(&self, cache_key: &str, module: &ResolvedModule) -> CacheCheck {
        let path = self.artifact_path(cache_key);

        if !path.exists() {
            return CacheCheck::Missing;
        }

        let source_time = modified_time(module.source.as_deref());
        let artifact_time = modified_time(Some(&path));

        if source_time > artifact_time {
            tracing::debug!(
                cache_key,
                source = ?module.source,
                "libdoc older than library source"
            );
            return CacheCheck::Stale;
        }

        CacheCheck::Hit(path)
    }
}

/// `<cache_dir>/<cache_key>.xml`
pub fn artifact_path(cache_dir: &Path, cache_key: &str) -> PathBuf {
    cache_dir.join(format!("{}.{}", cache_key, ARTIFACT_EXTENSION))
}

/// Modification time of `path`, or the UNIX epoch when it cannot be read
fn modified_time(path: Option<&Path>) -> SystemTime {
    path.and_then(|p| fs::metadata(p).ok())
        .and_then(|metadata| metadata.modified().ok())
        .unwrap_or(UNIX_EPOCH)
}
