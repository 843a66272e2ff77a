use crate::utils::error::{Result, SetAnalysisError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The entity kinds a registered set can contain. Every kind maps to a
/// dedicated lookup document type and a centric search index type; the
/// mappings are exhaustive so an unmapped kind cannot exist at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Donor,
    Gene,
    Mutation,
    File,
}

impl EntityKind {
    /// Document type under the terms-lookup index holding member lists of
    /// this kind. Part of the wire contract with the search backend.
    pub fn lookup_type(&self) -> &'static str {
        match self {
            EntityKind::Donor => "donor-ids",
            EntityKind::Gene => "gene-ids",
            EntityKind::Mutation => "mutation-ids",
            EntityKind::File => "file-ids",
        }
    }

    /// Index type counted against when projecting region counts onto this
    /// kind.
    pub fn centric_type(&self) -> &'static str {
        match self {
            EntityKind::Donor => "donor-centric",
            EntityKind::Gene => "gene-centric",
            EntityKind::Mutation => "mutation-centric",
            EntityKind::File => "file-centric",
        }
    }

    pub fn wire_name(&self) -> &'static str {
        match self {
            EntityKind::Donor => "donor",
            EntityKind::Gene => "gene",
            EntityKind::Mutation => "mutation",
            EntityKind::File => "file",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl FromStr for EntityKind {
    type Err = SetAnalysisError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "donor" => Ok(EntityKind::Donor),
            "gene" => Ok(EntityKind::Gene),
            "mutation" => Ok(EntityKind::Mutation),
            "file" => Ok(EntityKind::File),
            other => Err(SetAnalysisError::InvalidRequest {
                message: format!("Unknown entity kind: {}", other),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_type_names() {
        assert_eq!(EntityKind::Donor.lookup_type(), "donor-ids");
        assert_eq!(EntityKind::Gene.lookup_type(), "gene-ids");
        assert_eq!(EntityKind::Mutation.lookup_type(), "mutation-ids");
        assert_eq!(EntityKind::File.lookup_type(), "file-ids");
    }

    #[test]
    fn test_centric_type_names() {
        assert_eq!(EntityKind::Donor.centric_type(), "donor-centric");
        assert_eq!(EntityKind::File.centric_type(), "file-centric");
    }

    #[test]
    fn test_wire_round_trip() {
        for kind in [
            EntityKind::Donor,
            EntityKind::Gene,
            EntityKind::Mutation,
            EntityKind::File,
        ] {
            assert_eq!(kind.wire_name().parse::<EntityKind>().unwrap(), kind);
        }
        assert!("project".parse::<EntityKind>().is_err());
    }

    #[test]
    fn test_serde_uses_lowercase_names() {
        assert_eq!(
            serde_json::to_string(&EntityKind::Mutation).unwrap(),
            "\"mutation\""
        );
        let kind: EntityKind = serde_json::from_str("\"file\"").unwrap();
        assert_eq!(kind, EntityKind::File);
    }
}
