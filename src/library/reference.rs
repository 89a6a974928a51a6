/// Library references as given on the command line
///
/// A reference is either a path to a Python file ("physical") or a dotted
/// module name ("named"). The reference decides the logical module name, the
/// import target and the cache key used for its libdoc file.
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::Path;

use crate::cli_utils::split_list;

/// Extension marking a reference as a path to a library file
pub const LIBRARY_FILE_EXTENSION: &str = ".py";

/// Libraries shipped with Robot Framework that may be referenced by short name
pub const STANDARD_LIBRARY_NAMES: &[&str] = &[
    "BuiltIn",
    "Collections",
    "DateTime",
    "Dialogs",
    "OperatingSystem",
    "Process",
    "Remote",
    "Screenshot",
    "String",
    "Telnet",
    "XML",
];

/// Package the standard libraries live in
pub const STANDARD_LIBRARY_PACKAGE: &str = "robot.libraries";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    /// Path to a library file
    Physical,
    /// Dotted module name, optionally ending in a class name
    Named,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LibraryReference {
    raw: String,
}

impl LibraryReference {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    /// Split a comma-separated list, skipping blank segments
    pub fn parse_list(list: &str) -> Vec<Self> {
        split_list(list).into_iter().map(Self::new).collect()
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn kind(&self) -> ReferenceKind {
        if self
            .raw
            .to_lowercase()
            .ends_with(LIBRARY_FILE_EXTENSION)
        {
            ReferenceKind::Physical
        } else {
            ReferenceKind::Named
        }
    }

    pub fn is_physical(&self) -> bool {
        self.kind() == ReferenceKind::Physical
    }

    /// The reference interpreted as a filesystem path
    pub fn path(&self) -> &Path {
        Path::new(&self.raw)
    }

    /// Name the module is registered under while it is loaded
    ///
    /// Physical libraries use the file stem, named libraries the reference itself.
    pub fn logical_name(&self) -> String {
        match self.kind() {
            ReferenceKind::Physical => self
                .path()
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| self.raw.clone()),
            ReferenceKind::Named => self.raw.clone(),
        }
    }

    /// Module path to import for a named reference
    ///
    /// Standard library short names are rewritten into their package.
    pub fn import_target(&self) -> String {
        if STANDARD_LIBRARY_NAMES.contains(&self.raw.as_str()) {
            format!("{}.{}", STANDARD_LIBRARY_PACKAGE, self.raw)
        } else {
            self.raw.clone()
        }
    }

    /// File name (without extension) of the cached libdoc for this reference
    ///
    /// Physical references combine the file stem with a hash of the whole
    /// reference so that equally named files in different directories do not
    /// share a cache entry. Format: "{stem}-{hex_hash}" with the first 16
    /// characters of SHA256.
    pub fn cache_key(&self) -> String {
        match self.kind() {
            ReferenceKind::Named => self.raw.clone(),
            ReferenceKind::Physical => {
                let mut hasher = Sha256::new();
                hasher.update(self.raw.as_bytes());
                let hash = hex::encode(hasher.finalize());
                format!("{}-{}", self.logical_name(), &hash[..16])
            }
        }
    }
}

impl fmt::Display for LibraryReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
