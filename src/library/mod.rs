pub mod record;
pub mod reference;

pub use record::{CacheStatus, LibraryRecord, LibraryStatus};
pub use reference::{LibraryReference, ReferenceKind};
