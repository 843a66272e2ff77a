use crate::domain::kind::EntityKind;

pub const TERMS_LOOKUP_INDEX: &str = "terms-lookup";
pub const TERMS_LOOKUP_PATH: &str = "values";
pub const ID_FIELD: &str = "_id";

/// Kind-to-index translation, constructed once and passed by reference to
/// every component that needs it. The name mappings themselves live on
/// [`EntityKind`] as exhaustive matches; this object contributes the
/// deployment-specific index names.
#[derive(Debug, Clone)]
pub struct SearchSchema {
    index: String,
    lookup_index: String,
}

impl SearchSchema {
    pub fn new(index: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            lookup_index: TERMS_LOOKUP_INDEX.to_string(),
        }
    }

    /// The main index region counts are measured against.
    pub fn index(&self) -> &str {
        &self.index
    }

    /// The out-of-band index holding registered member lists.
    pub fn lookup_index(&self) -> &str {
        &self.lookup_index
    }

    pub fn centric_type(&self, kind: EntityKind) -> &'static str {
        kind.centric_type()
    }

    pub fn lookup_type(&self, kind: EntityKind) -> &'static str {
        kind.lookup_type()
    }
}
