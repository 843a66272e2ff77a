use crate::utils::error::{Result, SetAnalysisError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// One disjoint region of a Venn decomposition: documents that belong to
/// every set in `intersection` and to none in `exclusions`. Holds only weak
/// references (UUIDs) to registered sets, never the member lists themselves.
///
/// Ordered sets keep equality, hashing and serialization independent of the
/// order the sets were supplied in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnionUnit {
    pub intersection: BTreeSet<Uuid>,
    pub exclusions: BTreeSet<Uuid>,
}

impl UnionUnit {
    pub fn new(intersection: BTreeSet<Uuid>, exclusions: BTreeSet<Uuid>) -> Result<Self> {
        if intersection.is_empty() {
            return Err(SetAnalysisError::InvalidRequest {
                message: "A union unit requires at least one included set".to_string(),
            });
        }
        if !intersection.is_disjoint(&exclusions) {
            return Err(SetAnalysisError::InvalidRequest {
                message: "A set cannot be both included in and excluded from a union unit"
                    .to_string(),
            });
        }

        Ok(Self {
            intersection,
            exclusions,
        })
    }

    /// Decorates this region with its count. Fails on a negative count.
    pub fn with_count(self, count: i64) -> Result<UnionUnitWithCount> {
        UnionUnitWithCount::new(self, count)
    }
}

/// A region together with the number of documents it matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnionUnitWithCount {
    #[serde(flatten)]
    pub unit: UnionUnit,
    pub count: i64,
}

impl UnionUnitWithCount {
    pub fn new(unit: UnionUnit, count: i64) -> Result<Self> {
        if count < 0 {
            return Err(SetAnalysisError::InvalidRequest {
                message: format!("A region count must not be negative, got {}", count),
            });
        }

        Ok(Self { unit, count })
    }
}
