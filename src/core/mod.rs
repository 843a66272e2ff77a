pub mod analyzer;
pub mod counter;
pub mod filter;
pub mod registry;

pub use analyzer::UnionAnalyzer;
pub use counter::RegionCounter;
pub use registry::{RegistryAttributes, TermsLookupRegistry};
