//! Module resolution for library references
//!
//! Turns a [`LibraryReference`] into a [`ResolvedModule`]. The decisions live
//! here (standard library aliases, the `module.ClassName` fallback, the module
//! registry); the host mechanism that actually loads code sits behind the
//! [`ModuleLoader`] trait.
//!
//! Resolved modules stay registered under their logical name until
//! [`ModuleResolver::release`] is called. Named lookups reuse a registered
//! module, so a physical `foo.py` that is not released would shadow a later
//! named `foo`.

pub mod python;

pub use python::PythonLoader;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::library::{LibraryReference, ReferenceKind};

/// Errors reported by a [`ModuleLoader`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// The module could not be imported (missing, syntax error, raised on import)
    #[error("{0}")]
    Import(String),

    /// The host could not be asked at all
    #[error("host interpreter failure: {0}")]
    Host(String),
}

/// A resolution failure, carrying the logical name that was attempted
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Could not import '{name}': '{source}'")]
pub struct ResolveError {
    pub name: String,
    #[source]
    pub source: LoadError,
}

/// A module as reported by the loader
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedModule {
    /// Name the module was imported under
    pub import_name: String,
    /// Source file, if the module has a discoverable one
    pub source: Option<PathBuf>,
}

/// Host mechanism for loading modules
pub trait ModuleLoader {
    /// Load a file as a module registered under `name`
    fn load_file(&self, name: &str, path: &Path) -> Result<LoadedModule, LoadError>;

    /// Import a module by its dotted name
    fn import(&self, dotted: &str) -> Result<LoadedModule, LoadError>;

    /// Whether `attribute` exists on an imported module
    fn has_attribute(&self, module: &LoadedModule, attribute: &str) -> Result<bool, LoadError>;
}

/// A library reference bound to a loaded module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedModule {
    /// Logical name (file stem or reference)
    pub name: String,
    /// Module path actually imported
    pub import_name: String,
    pub source: Option<PathBuf>,
    pub reference: LibraryReference,
}

/// Modules currently bound, keyed by logical name
#[derive(Debug, Default)]
pub struct ModuleRegistry {
    modules: HashMap<String, ResolvedModule>,
}

impl ModuleRegistry {
    pub fn get(&self, name: &str) -> Option<&ResolvedModule> {
        self.modules.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.modules.contains_key(name)
    }

    pub fn register(&mut self, module: ResolvedModule) {
        self.modules.insert(module.name.clone(), module);
    }

    /// Remove a binding; returns whether one existed
    pub fn release(&mut self, name: &str) -> bool {
        self.modules.remove(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

pub struct ModuleResolver<L> {
    loader: L,
    registry: ModuleRegistry,
}

impl<L: ModuleLoader> ModuleResolver<L> {
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            registry: ModuleRegistry::default(),
        }
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    /// Resolve a reference to a module and register it under its logical name
    ///
    /// Resolution is attempted once; failures are not retried.
    pub fn resolve(&mut self, reference: &LibraryReference) -> Result<ResolvedModule, ResolveError> {
        let name = reference.logical_name();

        let loaded = match reference.kind() {
            ReferenceKind::Physical => self.loader.load_file(&name, reference.path()),
            ReferenceKind::Named => {
                if let Some(module) = self.registry.get(&name) {
                    tracing::debug!(library = %reference, "reusing registered module");
                    return Ok(module.clone());
                }
                self.import_named(&reference.import_target())
            }
        }
        .map_err(|source| ResolveError {
            name: name.clone(),
            source,
        })?;

        let module = ResolvedModule {
            name,
            import_name: loaded.import_name,
            source: loaded.source,
            reference: reference.clone(),
        };
        self.registry.register(module.clone());

        Ok(module)
    }

    /// Import a dotted name, falling back to `parent` when the last segment is
    /// an attribute of it (e.g. `package.module.KeywordClass`)
    fn import_named(&self, target: &str) -> Result<LoadedModule, LoadError> {
        let direct_error = match self.loader.import(target) {
            Ok(module) => return Ok(module),
            Err(e) => e,
        };

        let Some((parent, attribute)) = target.rsplit_once('.') else {
            return Err(direct_error);
        };
        if parent.is_empty() {
            return Err(direct_error);
        }

        let module = self.loader.import(parent)?;
        if self.loader.has_attribute(&module, attribute)? {
            Ok(module)
        } else {
            Err(direct_error)
        }
    }

    /// Drop the binding for `name`; releasing an unknown name is not an error
    pub fn release(&mut self, name: &str) -> bool {
        self.registry.release(name)
    }
}
