/// Batch processing of library references into a report
use anyhow::Result;
use serde::ser::{Serialize, Serializer};
use std::path::Path;

use crate::cache::CacheValidator;
use crate::environment::HostEnvironment;
use crate::generator::ArtifactGenerator;
use crate::library::{LibraryRecord, LibraryReference};
use crate::logging::{operations, status};
use crate::processor::LibraryProcessor;
use crate::resolver::ModuleLoader;

/// Library records keyed by reference, in input order
///
/// Inserting a record for a key that is already present replaces it in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LibraryMap {
    records: Vec<LibraryRecord>,
}

impl LibraryMap {
    pub fn insert(&mut self, record: LibraryRecord) {
        match self
            .records
            .iter_mut()
            .find(|existing| existing.library_key == record.library_key)
        {
            Some(slot) => *slot = record,
            None => self.records.push(record),
        }
    }

    pub fn get(&self, library_key: &str) -> Option<&LibraryRecord> {
        self.records.iter().find(|r| r.library_key == library_key)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LibraryRecord> {
        self.records.iter()
    }
}

impl Serialize for LibraryMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.records.iter().map(|r| (&r.library_key, r)))
    }
}

/// Result of one run
#[derive(Debug, Clone, serde::Serialize)]
pub struct Report {
    libraries: LibraryMap,
    environment: HostEnvironment,
}

impl Report {
    pub fn libraries(&self) -> &LibraryMap {
        &self.libraries
    }

    pub fn environment(&self) -> &HostEnvironment {
        &self.environment
    }

    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }
}

pub struct BatchRunner<L, G> {
    processor: LibraryProcessor<L, G>,
    environment: HostEnvironment,
}

impl<L: ModuleLoader, G: ArtifactGenerator> BatchRunner<L, G> {
    pub fn new(processor: LibraryProcessor<L, G>, environment: HostEnvironment) -> Self {
        Self {
            processor,
            environment,
        }
    }

    pub fn processor(&self) -> &LibraryProcessor<L, G> {
        &self.processor
    }

    /// Process `references` one after another against the cache in `cache_dir`
    ///
    /// Only a failure to create the cache directory aborts the run; library
    /// failures are reported in their records.
    pub fn run(&mut self, references: &[LibraryReference], cache_dir: &Path) -> Result<Report> {
        let cache = CacheValidator::new(cache_dir);
        cache.ensure_dir()?;

        let mut libraries = LibraryMap::default();
        for reference in references {
            libraries.insert(self.processor.process(reference, &cache));
        }

        let failed = libraries.iter().filter(|r| !r.is_success()).count();
        tracing::info!(
            operation = operations::BATCH,
            status = if failed == 0 { status::SUCCESS } else { status::ERROR },
            library_count = libraries.len(),
            error_count = failed,
            cache_dir = %cache_dir.display(),
            "batch finished"
        );

        Ok(Report {
            libraries,
            environment: self.environment.clone(),
        })
    }
}
