/// Per-library result entries of the report
use serde::Serialize;
use std::path::PathBuf;

use super::reference::LibraryReference;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LibraryStatus {
    Pending,
    Success,
    Error,
}

/// How the libdoc file of a library was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheStatus {
    /// Existing libdoc reused
    Hit,
    /// Libdoc (re)generated
    Miss,
    /// No libdoc involved (pending or failed before validation)
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryRecord {
    pub name: String,
    pub library_key: String,
    pub status: LibraryStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xml_libdoc_path: Option<PathBuf>,
    pub source_path: Option<PathBuf>,
    pub physical: bool,
    pub cache_status: CacheStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<String>,
}

impl LibraryRecord {
    pub fn pending(reference: &LibraryReference) -> Self {
        let physical = reference.is_physical();
        Self {
            name: reference.as_str().to_string(),
            library_key: reference.as_str().to_string(),
            status: LibraryStatus::Pending,
            message: "To be imported".to_string(),
            xml_libdoc_path: None,
            source_path: physical.then(|| reference.path().to_path_buf()),
            physical,
            cache_status: CacheStatus::None,
            diagnostic: None,
        }
    }

    pub fn succeed(
        self,
        name: String,
        xml_libdoc_path: PathBuf,
        source_path: Option<PathBuf>,
        cache_status: CacheStatus,
    ) -> Self {
        let message = match cache_status {
            CacheStatus::Hit => "Reused cached libdoc",
            _ => "Generated libdoc",
        };
        Self {
            name,
            status: LibraryStatus::Success,
            message: message.to_string(),
            xml_libdoc_path: Some(xml_libdoc_path),
            source_path,
            cache_status,
            ..self
        }
    }

    pub fn fail(self, name: String, message: String, diagnostic: Option<String>) -> Self {
        Self {
            name,
            status: LibraryStatus::Error,
            message,
            xml_libdoc_path: None,
            diagnostic,
            ..self
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == LibraryStatus::Success
    }
}
