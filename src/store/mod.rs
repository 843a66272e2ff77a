pub mod memory;

pub use memory::{MemoryAnalysisStore, MemoryEntitySetStore};
