use crate::domain::analysis::{default_version, migrate_version, JobState};
use crate::domain::kind::EntityKind;
use crate::domain::request::DerivedSetDefinition;
use crate::utils::error::{Result, SetAnalysisError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SetSubtype {
    Normal,
    Upload,
    Enrichment,
    Transient,
}

/// A persisted combine job: materializing the union of several regions into
/// a newly registered set. Shares the job state machine with
/// [`crate::domain::analysis::UnionAnalysis`]; `count` is present exactly
/// when the set is FINISHED.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitySet {
    pub id: Uuid,
    pub state: JobState,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: EntityKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<i64>,
    #[serde(default = "default_version", deserialize_with = "migrate_version")]
    pub version: i32,
    #[serde(default = "default_subtype")]
    pub subtype: SetSubtype,
}

fn default_subtype() -> SetSubtype {
    SetSubtype::Normal
}

impl EntitySet {
    /// A brand-new PENDING set for a derived-set definition.
    pub fn create_from_definition(definition: &DerivedSetDefinition, data_version: i32) -> Self {
        Self {
            id: Uuid::new_v4(),
            state: JobState::Pending,
            name: definition.name.clone(),
            description: definition.description.clone(),
            kind: definition.kind,
            count: None,
            version: if data_version > 1 { data_version } else { 1 },
            subtype: if definition.transient {
                SetSubtype::Transient
            } else {
                SetSubtype::Normal
            },
        }
    }

    /// PENDING -> IN_PROGRESS.
    pub fn start(self) -> Result<Self> {
        match self.state {
            JobState::Pending => Ok(Self {
                state: JobState::InProgress,
                ..self
            }),
            other => Err(SetAnalysisError::InvalidTransition {
                from: other.as_str(),
                event: "start",
            }),
        }
    }

    /// IN_PROGRESS -> FINISHED with the materialized member count.
    pub fn finish_with_count(self, count: i64) -> Result<Self> {
        if count < 0 {
            return Err(SetAnalysisError::InvalidRequest {
                message: format!("A set count must not be negative, got {}", count),
            });
        }

        match self.state {
            JobState::InProgress => Ok(Self {
                state: JobState::Finished,
                count: Some(count),
                ..self
            }),
            other => Err(SetAnalysisError::InvalidTransition {
                from: other.as_str(),
                event: "finish",
            }),
        }
    }

    /// PENDING or IN_PROGRESS -> ERROR.
    pub fn fail(self) -> Result<Self> {
        match self.state {
            JobState::Pending | JobState::InProgress => Ok(Self {
                state: JobState::Error,
                count: None,
                ..self
            }),
            other => Err(SetAnalysisError::InvalidTransition {
                from: other.as_str(),
                event: "fail",
            }),
        }
    }
}
