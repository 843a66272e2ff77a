pub mod http;
pub mod memory;

pub use http::HttpSearch;
pub use memory::MemorySearch;
