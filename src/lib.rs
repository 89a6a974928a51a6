// Library interface for libdoc-cache
// This allows integration tests to drive the batch runner with their own loaders and generators

pub mod batch;
pub mod cache;
pub mod cli_utils;
pub mod config;
pub mod environment;
pub mod generator;
pub mod interpreter;
pub mod library;
pub mod logging;
pub mod processor;
pub mod resolver;

// Re-export commonly used types
pub use batch::{BatchRunner, LibraryMap, Report};
pub use cache::{CacheCheck, CacheValidator};
pub use environment::HostEnvironment;
pub use generator::{ArtifactGenerator, LibdocGenerator};
pub use interpreter::PythonInterpreter;
pub use library::{CacheStatus, LibraryRecord, LibraryReference, LibraryStatus};
pub use processor::LibraryProcessor;
pub use resolver::{LoadError, LoadedModule, ModuleLoader, ModuleResolver, PythonLoader};
