use crate::domain::kind::EntityKind;
use crate::domain::schema::{SearchSchema, ID_FIELD, TERMS_LOOKUP_PATH};
use crate::domain::unit::UnionUnit;
use serde::Serialize;
use serde_json::{json, Map, Value};
use uuid::Uuid;

/// An opaque reference filter: matches documents whose `field` appears in
/// the member list stored out of band at `(index, type, id, path)`. The
/// member list itself never travels with the query. Field and path names
/// are bit-exact contract items with the search backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TermsLookup {
    #[serde(skip)]
    pub field: String,
    pub index: String,
    #[serde(rename = "type")]
    pub lookup_type: String,
    pub id: String,
    pub path: String,
}

impl TermsLookup {
    pub fn to_filter(&self) -> Value {
        let mut terms = Map::new();
        terms.insert(
            self.field.clone(),
            json!({
                "index": self.index,
                "type": self.lookup_type,
                "id": self.id,
                "path": self.path,
            }),
        );
        json!({ "terms": terms })
    }
}

/// Builds the reference filter for one registered set.
pub fn reference_filter(schema: &SearchSchema, kind: EntityKind, id: Uuid) -> TermsLookup {
    TermsLookup {
        field: ID_FIELD.to_string(),
        index: schema.lookup_index().to_string(),
        lookup_type: schema.lookup_type(kind).to_string(),
        id: id.to_string(),
        path: TERMS_LOOKUP_PATH.to_string(),
    }
}

/// Boolean filter for one region: membership in every included set, and in
/// none of the excluded ones.
pub fn region_filter(schema: &SearchSchema, kind: EntityKind, unit: &UnionUnit) -> Value {
    let must: Vec<Value> = unit
        .intersection
        .iter()
        .map(|id| reference_filter(schema, kind, *id).to_filter())
        .collect();
    let must_not: Vec<Value> = unit
        .exclusions
        .iter()
        .map(|id| reference_filter(schema, kind, *id).to_filter())
        .collect();

    let mut body = Map::new();
    body.insert("must".to_string(), Value::Array(must));
    if !must_not.is_empty() {
        body.insert("must_not".to_string(), Value::Array(must_not));
    }

    json!({ "bool": body })
}

/// Filter matching the union of several regions.
pub fn union_filter(schema: &SearchSchema, kind: EntityKind, units: &[UnionUnit]) -> Value {
    let should: Vec<Value> = units
        .iter()
        .map(|unit| region_filter(schema, kind, unit))
        .collect();

    json!({ "bool": { "should": should } })
}

/// Wraps a filter into the full query body sent to the backend.
pub fn query_body(filter: Value) -> Value {
    json!({
        "query": {
            "filtered": {
                "query": { "match_all": {} },
                "filter": filter,
            }
        }
    })
}
