use crate::config::settings::SetOperationConfig;
use crate::core::filter::{self, TermsLookup};
use crate::domain::kind::EntityKind;
use crate::domain::ports::SearchBackend;
use crate::domain::schema::{SearchSchema, TERMS_LOOKUP_PATH};
use crate::utils::error::{Result, SetAnalysisError};
use serde_json::{json, Map, Value};
use std::cmp::min;
use std::sync::Arc;
use uuid::Uuid;

/// Optional attributes stored alongside a registered member list.
#[derive(Debug, Clone, Default)]
pub struct RegistryAttributes {
    pub transient: bool,
    pub repo: Option<String>,
}

impl RegistryAttributes {
    pub fn transient(value: bool) -> Self {
        Self {
            transient: value,
            repo: None,
        }
    }
}

/// The set registry: persists member-id lists out of band in the
/// terms-lookup index so queries can reference them by UUID instead of
/// inlining them. Owns the capacity policy derived from configuration.
pub struct TermsLookupRegistry<S: SearchBackend> {
    search: Arc<S>,
    schema: SearchSchema,
    max_union_count: usize,
    max_preview_number_of_hits: usize,
}

impl<S: SearchBackend> TermsLookupRegistry<S> {
    pub fn new(search: Arc<S>, schema: SearchSchema, config: &SetOperationConfig) -> Self {
        let max_union_count = config.max_number_of_hits * config.max_multiplier;
        let max_preview_number_of_hits = min(config.max_preview_number_of_hits, max_union_count);

        Self {
            search,
            schema,
            max_union_count,
            max_preview_number_of_hits,
        }
    }

    /// Hard ceiling on the size of any set a union or intersection
    /// computation may produce or reference.
    pub fn max_union_count(&self) -> usize {
        self.max_union_count
    }

    pub fn max_preview_number_of_hits(&self) -> usize {
        self.max_preview_number_of_hits
    }

    pub fn schema(&self) -> &SearchSchema {
        &self.schema
    }

    /// Idempotent bootstrap of the terms-lookup index. Racing first callers
    /// must all succeed; the backend treats "already exists" as success.
    pub async fn ensure_index(&self) -> Result<()> {
        let settings = json!({
            "index": {
                "auto_expand_replicas": "0-all",
                "number_of_shards": "1",
            }
        });

        tracing::debug!("Ensuring index '{}' exists", self.schema.lookup_index());
        self.search
            .ensure_index(self.schema.lookup_index(), &settings)
            .await
            .map_err(as_storage_unavailable)
    }

    /// Registers a member list under `id`, overwriting any previous entry.
    /// The write is visible to any query issued after this call returns.
    /// Lists larger than `max_union_count` are rejected outright.
    pub async fn register(
        &self,
        kind: EntityKind,
        id: Uuid,
        members: &[String],
        attrs: &RegistryAttributes,
    ) -> Result<()> {
        if members.len() > self.max_union_count {
            return Err(SetAnalysisError::InvalidRequest {
                message: format!(
                    "A set of {} members exceeds the maximum of {}",
                    members.len(),
                    self.max_union_count
                ),
            });
        }

        let mut document = Map::new();
        document.insert(TERMS_LOOKUP_PATH.to_string(), json!(members));
        if attrs.transient {
            document.insert("transient".to_string(), Value::Bool(true));
        }
        if let Some(repo) = &attrs.repo {
            document.insert("repo".to_string(), Value::String(repo.clone()));
        }

        tracing::debug!("Registering {} set {} ({} members)", kind, id, members.len());
        self.search
            .put_document(
                self.schema.lookup_index(),
                self.schema.lookup_type(kind),
                &id.to_string(),
                Value::Object(document),
            )
            .await
            .map_err(as_storage_unavailable)
    }

    /// The reference filter for a registered set, for use in count and
    /// search queries.
    pub fn reference_filter(&self, kind: EntityKind, id: Uuid) -> TermsLookup {
        filter::reference_filter(&self.schema, kind, id)
    }

    /// Dereferences a registered entry back into its member list.
    pub async fn entry_values(&self, kind: EntityKind, id: Uuid) -> Result<Vec<String>> {
        let document = self
            .search
            .get_document(
                self.schema.lookup_index(),
                self.schema.lookup_type(kind),
                &id.to_string(),
            )
            .await
            .map_err(as_storage_unavailable)?;

        let document = document.ok_or_else(|| SetAnalysisError::InvalidRequest {
            message: format!("No registered {} set with id {}", kind, id),
        })?;

        let values = document
            .get(TERMS_LOOKUP_PATH)
            .cloned()
            .ok_or_else(|| SetAnalysisError::StorageUnavailable {
                message: format!("Registry entry {} has no '{}' field", id, TERMS_LOOKUP_PATH),
            })?;

        Ok(serde_json::from_value(values)?)
    }
}

fn as_storage_unavailable(error: SetAnalysisError) -> SetAnalysisError {
    match error {
        e @ SetAnalysisError::StorageUnavailable { .. } => e,
        other => SetAnalysisError::StorageUnavailable {
            message: other.to_string(),
        },
    }
}
