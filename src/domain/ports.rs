use crate::domain::analysis::UnionAnalysis;
use crate::domain::entity_set::EntitySet;
use crate::utils::error::Result;
use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

/// Ids and total hit count returned by a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHits {
    pub total: i64,
    pub ids: Vec<String>,
}

/// The document-search collaborator. Queries are the JSON bodies built by
/// [`crate::core::filter`]; the backend never sees inlined member lists,
/// only terms-lookup references.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Counts the documents of `doc_type` in `index` matching `query`.
    async fn count(&self, index: &str, doc_type: &str, query: &Value) -> Result<i64>;

    /// Returns up to `size` matching document ids plus the total hit count.
    async fn search_ids(
        &self,
        index: &str,
        doc_type: &str,
        query: &Value,
        size: usize,
    ) -> Result<SearchHits>;

    /// Writes a document. The write must be visible to any count or search
    /// issued after this call returns.
    async fn put_document(
        &self,
        index: &str,
        doc_type: &str,
        id: &str,
        document: Value,
    ) -> Result<()>;

    /// Reads a document source back, or None if it does not exist.
    async fn get_document(&self, index: &str, doc_type: &str, id: &str) -> Result<Option<Value>>;

    /// Creates `index` if missing. Concurrent first callers racing on the
    /// creation must all observe success.
    async fn ensure_index(&self, index: &str, settings: &Value) -> Result<()>;
}

/// Persistence for union analysis jobs.
#[async_trait]
pub trait AnalysisStore: Send + Sync {
    async fn save(&self, analysis: UnionAnalysis) -> Result<()>;
    async fn find(&self, id: Uuid) -> Result<Option<UnionAnalysis>>;
}

/// Persistence for entity-set (combine) jobs.
#[async_trait]
pub trait EntitySetStore: Send + Sync {
    async fn save(&self, set: EntitySet) -> Result<()>;
    async fn find(&self, id: Uuid) -> Result<Option<EntitySet>>;
}
