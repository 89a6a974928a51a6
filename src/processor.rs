//! Per-library processing
//!
//! A library moves through `Pending -> Resolving -> Validating -> {Reusing |
//! Regenerating} -> Success`, or ends in `Error` when resolution or generation
//! fails. Failures are carried as [`LibraryFailure`] values and end up in the
//! returned [`LibraryRecord`]; nothing escapes [`LibraryProcessor::process`].

use std::path::PathBuf;

use crate::cache::{CacheCheck, CacheValidator};
use crate::generator::ArtifactGenerator;
use crate::library::{CacheStatus, LibraryRecord, LibraryReference};
use crate::logging::{operations, status};
use crate::resolver::{ModuleLoader, ModuleResolver, ResolveError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Resolution,
    Generation,
}

/// A failed library, ready to be written into its record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryFailure {
    pub kind: FailureKind,
    pub message: String,
    /// Full error chain, for failures outside resolution
    pub diagnostic: Option<String>,
}

impl LibraryFailure {
    fn resolution(err: ResolveError) -> Self {
        Self {
            kind: FailureKind::Resolution,
            message: err.to_string(),
            diagnostic: None,
        }
    }

    fn generation(err: anyhow::Error) -> Self {
        Self {
            kind: FailureKind::Generation,
            message: format!("Unexpected error: {:#}", err),
            diagnostic: Some(format!("{:?}", err)),
        }
    }
}

struct Processed {
    name: String,
    artifact: PathBuf,
    source_path: Option<PathBuf>,
    cache_status: CacheStatus,
}

pub struct LibraryProcessor<L, G> {
    resolver: ModuleResolver<L>,
    generator: G,
}

impl<L: ModuleLoader, G: ArtifactGenerator> LibraryProcessor<L, G> {
    pub fn new(resolver: ModuleResolver<L>, generator: G) -> Self {
        Self {
            resolver,
            generator,
        }
    }

    pub fn resolver(&self) -> &ModuleResolver<L> {
        &self.resolver
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Process one library reference into its terminal record
    ///
    /// The logical name is released from the module registry afterwards, so a
    /// later reference with the same short name resolves afresh.
    pub fn process(&mut self, reference: &LibraryReference, cache: &CacheValidator) -> LibraryRecord {
        let record = LibraryRecord::pending(reference);
        let name = reference.logical_name();

        let record = match self.try_process(reference, cache) {
            Ok(processed) => {
                tracing::info!(
                    library = %reference,
                    operation = operations::PROCESS,
                    status = status::SUCCESS,
                    cache_status = ?processed.cache_status,
                    "library processed"
                );
                record.succeed(
                    processed.name,
                    processed.artifact,
                    processed.source_path,
                    processed.cache_status,
                )
            }
            Err(failure) => {
                tracing::warn!(
                    library = %reference,
                    operation = operations::PROCESS,
                    status = status::ERROR,
                    kind = ?failure.kind,
                    "{}",
                    failure.message
                );
                record.fail(name.clone(), failure.message, failure.diagnostic)
            }
        };

        if self.resolver.release(&name) {
            tracing::trace!(module = %name, operation = operations::RELEASE, "module released");
        }

        record
    }

    fn try_process(
        &mut self,
        reference: &LibraryReference,
        cache: &CacheValidator,
    ) -> Result<Processed, LibraryFailure> {
        tracing::debug!(library = %reference, operation = operations::RESOLVE, "resolving");
        let module = self
            .resolver
            .resolve(reference)
            .map_err(LibraryFailure::resolution)?;

        let cache_key = reference.cache_key();
        let source_path = if reference.is_physical() {
            Some(reference.path().to_path_buf())
        } else {
            module.source.clone()
        };

        tracing::debug!(
            library = %reference,
            operation = operations::VALIDATE,
            cache_key = %cache_key,
            "validating cache"
        );

        let (artifact, cache_status) = match cache.check(&cache_key, &module) {
            CacheCheck::Hit(path) => {
                tracing::debug!(cache_key = %cache_key, status = status::HIT, "reusing libdoc");
                (path, CacheStatus::Hit)
            }
            check @ (CacheCheck::Stale | CacheCheck::Missing) => {
                tracing::debug!(
                    cache_key = %cache_key,
                    status = status::MISS,
                    stale = (check == CacheCheck::Stale),
                    operation = operations::GENERATE,
                    "regenerating libdoc"
                );
                let path = self
                    .generator
                    .generate(reference, &cache_key, cache.dir())
                    .map_err(LibraryFailure::generation)?;
                (path, CacheStatus::Miss)
            }
        };

        Ok(Processed {
            name: module.name,
            artifact,
            source_path,
            cache_status,
        })
    }
}
