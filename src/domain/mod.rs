// Domain layer: pure models, the Venn decomposition and the ports
// (interfaces) the engine talks to collaborators through. No I/O here.

pub mod analysis;
pub mod decompose;
pub mod entity_set;
pub mod kind;
pub mod ports;
pub mod request;
pub mod schema;
pub mod unit;

pub use analysis::{JobState, UnionAnalysis};
pub use decompose::decompose;
pub use entity_set::{EntitySet, SetSubtype};
pub use kind::EntityKind;
pub use ports::{AnalysisStore, EntitySetStore, SearchBackend, SearchHits};
pub use request::{DerivedSetDefinition, UnionAnalysisRequest};
pub use schema::SearchSchema;
pub use unit::{UnionUnit, UnionUnitWithCount};
