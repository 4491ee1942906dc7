//! Record store abstraction and the in-memory implementation.

pub mod memory;
pub mod traits;

pub use memory::MemoryRecordStore;
pub use traits::{OrderBy, Record, RecordQuery, RecordStore, SortDirection, ID_FIELD};
