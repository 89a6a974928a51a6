// Common test utilities shared across acceptance tests
//
// ## Test Isolation Strategy
//
// Acceptance tests drive the real batch runner, processor, resolver and cache
// validator. Only the two host seams are replaced:
// - `FakeLoader` answers imports from an in-memory table and loads physical
//   libraries from real files in the test's temp directory
// - `RecordingGenerator` writes a small libdoc file and records every call
//
// Each test owns a TempDir for its library files and cache directory, so no
// Python installation is needed and tests can run in parallel.

use anyhow::Result;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use libdoc_cache::cache::artifact_path;
use libdoc_cache::{
    ArtifactGenerator, BatchRunner, HostEnvironment, LibraryProcessor, LibraryReference,
    LoadError, LoadedModule, ModuleLoader, ModuleResolver,
};

#[derive(Default)]
pub struct FakeLoader {
    modules: HashMap<String, LoadedModule>,
    attributes: HashMap<String, Vec<String>>,
    imports: RefCell<Vec<String>>,
}

impl FakeLoader {
    /// Make `name` importable, with an optional source file
    #[allow(dead_code)]
    pub fn with_module(mut self, name: &str, source: Option<&Path>) -> Self {
        self.modules.insert(
            name.to_string(),
            LoadedModule {
                import_name: name.to_string(),
                source: source.map(Path::to_path_buf),
            },
        );
        self
    }

    #[allow(dead_code)]
    pub fn with_attribute(mut self, module: &str, attribute: &str) -> Self {
        self.attributes
            .entry(module.to_string())
            .or_default()
            .push(attribute.to_string());
        self
    }

    /// Every dotted name passed to `import`, in call order
    #[allow(dead_code)]
    pub fn imports(&self) -> Vec<String> {
        self.imports.borrow().clone()
    }
}

impl ModuleLoader for FakeLoader {
    fn load_file(&self, name: &str, path: &Path) -> Result<LoadedModule, LoadError> {
        if !path.is_file() {
            return Err(LoadError::Import(format!(
                "[Errno 2] No such file or directory: '{}'",
                path.display()
            )));
        }

        Ok(LoadedModule {
            import_name: name.to_string(),
            source: Some(path.to_path_buf()),
        })
    }

    fn import(&self, dotted: &str) -> Result<LoadedModule, LoadError> {
        self.imports.borrow_mut().push(dotted.to_string());
        self.modules
            .get(dotted)
            .cloned()
            .ok_or_else(|| LoadError::Import(format!("No module named '{}'", dotted)))
    }

    fn has_attribute(&self, module: &LoadedModule, attribute: &str) -> Result<bool, LoadError> {
        Ok(self
            .attributes
            .get(&module.import_name)
            .is_some_and(|attrs| attrs.iter().any(|a| a == attribute)))
    }
}

/// Generator that writes `<keywordspec name=".." generation="n"/>` and records calls
#[derive(Default)]
pub struct RecordingGenerator {
    calls: RefCell<Vec<String>>,
}

impl RecordingGenerator {
    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    #[allow(dead_code)]
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl ArtifactGenerator for RecordingGenerator {
    fn generate(
        &self,
        reference: &LibraryReference,
        cache_key: &str,
        cache_dir: &Path,
    ) -> Result<PathBuf> {
        self.calls.borrow_mut().push(reference.as_str().to_string());

        let path = artifact_path(cache_dir, cache_key);
        fs::write(
            &path,
            format!(
                "<keywordspec name=\"{}\" generation=\"{}\"/>",
                reference,
                self.call_count()
            ),
        )?;
        Ok(path)
    }
}

pub fn test_environment() -> HostEnvironment {
    HostEnvironment::from_parts(
        "3.12.1 (main, Jan  1 2024, 00:00:00) [GCC 12.2.0]".to_string(),
        "/usr/bin/python3".to_string(),
        "linux".to_string(),
        vec!["/usr/lib/python3.12".to_string()],
    )
}

pub fn runner(loader: FakeLoader) -> BatchRunner<FakeLoader, RecordingGenerator> {
    BatchRunner::new(
        LibraryProcessor::new(ModuleResolver::new(loader), RecordingGenerator::default()),
        test_environment(),
    )
}

pub fn references(raw: &[&str]) -> Vec<LibraryReference> {
    raw.iter().map(|r| LibraryReference::new(*r)).collect()
}

/// Write a library file and return its path as a reference string
#[allow(dead_code)]
pub fn write_library(dir: &Path, relative: &str) -> String {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, "def hello_world():\n    pass\n").unwrap();
    path.display().to_string()
}
