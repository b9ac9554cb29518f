/// Document persistence seam. The query and sync layers depend only on
/// [`CollectionStore`]; [`MemoryCollection`] is the in-process adapter.

pub mod collection;
pub mod memory;

pub use collection::{CollectionStore, Condition, Document, Filter, Patch, Pipeline, Stage};
pub use memory::MemoryCollection;
