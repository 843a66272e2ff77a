use crate::domain::ports::{SearchBackend, SearchHits};
use crate::domain::schema::ID_FIELD;
use crate::utils::error::{Result, SetAnalysisError};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

/// index -> doc type -> id -> document source. BTreeMap per type keeps
/// search results deterministic.
type Indexes = HashMap<String, HashMap<String, BTreeMap<String, Value>>>;

/// In-process search backend evaluating the same query bodies the HTTP
/// adapter sends over the wire: bool must / must_not / should combinations
/// of terms-lookup reference filters on `_id`. Used by tests and as a
/// backend-free dry-run target.
#[derive(Default)]
pub struct MemorySearch {
    inner: RwLock<Indexes>,
}

impl MemorySearch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds one entity document. Only its id matters for membership
    /// filtering.
    pub async fn index_entity(&self, index: &str, doc_type: &str, id: &str) {
        let mut indexes = self.inner.write().await;
        indexes
            .entry(index.to_string())
            .or_default()
            .entry(doc_type.to_string())
            .or_default()
            .insert(id.to_string(), json!({}));
    }

    pub async fn index_exists(&self, index: &str) -> bool {
        self.inner.read().await.contains_key(index)
    }
}

#[async_trait]
impl SearchBackend for MemorySearch {
    async fn count(&self, index: &str, doc_type: &str, query: &Value) -> Result<i64> {
        let indexes = self.inner.read().await;
        let filter = extract_filter(query)?;

        let mut count = 0;
        for id in doc_ids(&indexes, index, doc_type) {
            if eval_filter(&indexes, filter, id)? {
                count += 1;
            }
        }
        Ok(count)
    }

    async fn search_ids(
        &self,
        index: &str,
        doc_type: &str,
        query: &Value,
        size: usize,
    ) -> Result<SearchHits> {
        let indexes = self.inner.read().await;
        let filter = extract_filter(query)?;

        let mut matches = Vec::new();
        for id in doc_ids(&indexes, index, doc_type) {
            if eval_filter(&indexes, filter, id)? {
                matches.push(id.to_string());
            }
        }

        let total = matches.len() as i64;
        matches.truncate(size);
        Ok(SearchHits { total, ids: matches })
    }

    async fn put_document(
        &self,
        index: &str,
        doc_type: &str,
        id: &str,
        document: Value,
    ) -> Result<()> {
        let mut indexes = self.inner.write().await;
        indexes
            .entry(index.to_string())
            .or_default()
            .entry(doc_type.to_string())
            .or_default()
            .insert(id.to_string(), document);
        Ok(())
    }

    async fn get_document(&self, index: &str, doc_type: &str, id: &str) -> Result<Option<Value>> {
        let indexes = self.inner.read().await;
        Ok(indexes
            .get(index)
            .and_then(|types| types.get(doc_type))
            .and_then(|docs| docs.get(id))
            .cloned())
    }

    async fn ensure_index(&self, index: &str, _settings: &Value) -> Result<()> {
        // entry() makes concurrent first use idempotent: a racing creator
        // observing an existing index is success, not an error.
        let mut indexes = self.inner.write().await;
        indexes.entry(index.to_string()).or_default();
        Ok(())
    }
}

fn doc_ids<'a>(
    indexes: &'a Indexes,
    index: &str,
    doc_type: &str,
) -> impl Iterator<Item = &'a str> {
    indexes
        .get(index)
        .and_then(|types| types.get(doc_type))
        .into_iter()
        .flat_map(|docs| docs.keys().map(String::as_str))
}

fn extract_filter(query: &Value) -> Result<&Value> {
    query
        .pointer("/query/filtered/filter")
        .ok_or_else(|| unsupported(query))
}

/// Evaluates the emitted filter subset against one document id.
fn eval_filter(indexes: &Indexes, filter: &Value, doc_id: &str) -> Result<bool> {
    if let Some(bool_part) = filter.get("bool") {
        return eval_bool(indexes, bool_part, doc_id);
    }
    if let Some(terms) = filter.get("terms") {
        return eval_terms_lookup(indexes, terms, doc_id);
    }
    Err(unsupported(filter))
}

fn eval_bool(indexes: &Indexes, bool_part: &Value, doc_id: &str) -> Result<bool> {
    for clause in clauses(bool_part, "must")? {
        if !eval_filter(indexes, clause, doc_id)? {
            return Ok(false);
        }
    }
    for clause in clauses(bool_part, "must_not")? {
        if eval_filter(indexes, clause, doc_id)? {
            return Ok(false);
        }
    }

    if bool_part.get("should").is_some() {
        for clause in clauses(bool_part, "should")? {
            if eval_filter(indexes, clause, doc_id)? {
                return Ok(true);
            }
        }
        return Ok(false);
    }

    Ok(true)
}

fn clauses<'a>(bool_part: &'a Value, occur: &str) -> Result<&'a [Value]> {
    match bool_part.get(occur) {
        None => Ok(&[]),
        Some(Value::Array(clauses)) => Ok(clauses),
        Some(other) => Err(unsupported(other)),
    }
}

/// A terms-lookup clause matches when the document id appears in the member
/// list registered at `(index, type, id, path)`. A missing lookup entry
/// matches nothing.
fn eval_terms_lookup(indexes: &Indexes, terms: &Value, doc_id: &str) -> Result<bool> {
    let object = terms.as_object().ok_or_else(|| unsupported(terms))?;
    let (field, lookup) = object.iter().next().ok_or_else(|| unsupported(terms))?;
    if field != ID_FIELD {
        return Err(SetAnalysisError::RegionQueryFailure {
            message: format!("Unsupported terms-lookup field: {}", field),
        });
    }

    let index = lookup_part(lookup, "index")?;
    let doc_type = lookup_part(lookup, "type")?;
    let id = lookup_part(lookup, "id")?;
    let path = lookup_part(lookup, "path")?;

    let values = indexes
        .get(index)
        .and_then(|types| types.get(doc_type))
        .and_then(|docs| docs.get(id))
        .and_then(|doc| doc.get(path))
        .and_then(Value::as_array);

    Ok(match values {
        Some(values) => values.iter().any(|v| v.as_str() == Some(doc_id)),
        None => false,
    })
}

fn lookup_part<'a>(lookup: &'a Value, key: &str) -> Result<&'a str> {
    lookup
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| unsupported(lookup))
}

fn unsupported(fragment: &Value) -> SetAnalysisError {
    SetAnalysisError::RegionQueryFailure {
        message: format!("Unsupported query fragment: {}", fragment),
    }
}
