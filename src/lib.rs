pub mod config;
pub mod core;
pub mod domain;
pub mod search;
pub mod store;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliArgs;
pub use crate::config::Settings;
pub use crate::core::{RegionCounter, RegistryAttributes, TermsLookupRegistry, UnionAnalyzer};
pub use crate::domain::{
    decompose, DerivedSetDefinition, EntityKind, EntitySet, JobState, UnionAnalysis,
    UnionAnalysisRequest, UnionUnit, UnionUnitWithCount,
};
pub use crate::search::{HttpSearch, MemorySearch};
pub use crate::store::{MemoryAnalysisStore, MemoryEntitySetStore};
pub use crate::utils::error::{Result, SetAnalysisError};
