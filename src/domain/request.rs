use crate::domain::kind::EntityKind;
use crate::domain::unit::UnionUnit;
use crate::utils::error::{Result, SetAnalysisError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Inbound request for a union analysis: which registered sets to decompose
/// and which entity kind to project the region counts onto.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnionAnalysisRequest {
    pub lists: Vec<Uuid>,
    #[serde(rename = "type")]
    pub kind: EntityKind,
}

impl UnionAnalysisRequest {
    pub fn new(lists: Vec<Uuid>, kind: EntityKind) -> Self {
        Self { lists, kind }
    }

    /// Collapses duplicate references. Dedup is deflationary: it happens
    /// before any size check, so a request listing the same set twice does
    /// not pass as two inputs.
    pub fn unique_sets(&self) -> BTreeSet<Uuid> {
        self.lists.iter().copied().collect()
    }

    /// Validates the request and returns the deduplicated input sets.
    /// Surfaced synchronously at submission, before any job record exists.
    pub fn validated_sets(&self, max_input_sets: usize) -> Result<BTreeSet<Uuid>> {
        let unique = self.unique_sets();

        if unique.len() < 2 {
            return Err(SetAnalysisError::InvalidRequest {
                message: format!(
                    "A set analysis requires at least 2 unique sets, got {}",
                    unique.len()
                ),
            });
        }
        if unique.len() > max_input_sets {
            return Err(SetAnalysisError::CombinatorialLimit {
                sets: unique.len(),
                max: max_input_sets,
            });
        }

        Ok(unique)
    }
}

/// Definition of a set derived from existing ones: the union of the given
/// regions, materialized under a new name. Transient sets are marked as such
/// in the registry so they can be reaped out of band.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DerivedSetDefinition {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: EntityKind,
    pub union: Vec<UnionUnit>,
    #[serde(default)]
    pub transient: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicates_collapse_before_the_size_check() {
        let id = Uuid::new_v4();
        let request = UnionAnalysisRequest::new(vec![id, id, id], EntityKind::Donor);
        assert!(request.validated_sets(10).is_err());
    }

    #[test]
    fn test_two_unique_sets_pass() {
        let request =
            UnionAnalysisRequest::new(vec![Uuid::new_v4(), Uuid::new_v4()], EntityKind::Gene);
        assert_eq!(request.validated_sets(10).unwrap().len(), 2);
    }

    #[test]
    fn test_combinatorial_limit_enforced() {
        let lists: Vec<Uuid> = (0..11).map(|_| Uuid::new_v4()).collect();
        let request = UnionAnalysisRequest::new(lists, EntityKind::Donor);
        match request.validated_sets(10) {
            Err(SetAnalysisError::CombinatorialLimit { sets, max }) => {
                assert_eq!(sets, 11);
                assert_eq!(max, 10);
            }
            other => panic!("expected CombinatorialLimit, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_request_wire_shape() {
        let a = Uuid::new_v4();
        let json = format!(r#"{{"lists": ["{}", "{}"], "type": "mutation"}}"#, a, a);
        let request: UnionAnalysisRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(request.kind, EntityKind::Mutation);
        assert_eq!(request.lists.len(), 2);
        assert_eq!(request.unique_sets().len(), 1);
    }
}
