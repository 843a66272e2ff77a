use crate::domain::kind::EntityKind;
use crate::domain::unit::UnionUnitWithCount;
use crate::utils::error::{Result, SetAnalysisError};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Processing state of a persisted job. FINISHED and ERROR are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobState {
    Pending,
    InProgress,
    Finished,
    Error,
}

impl JobState {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Pending => "PENDING",
            JobState::InProgress => "IN_PROGRESS",
            JobState::Finished => "FINISHED",
            JobState::Error => "ERROR",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Finished | JobState::Error)
    }
}

pub(crate) fn default_version() -> i32 {
    1
}

/// Records persisted before the version field existed deserialize to
/// version 1; anything above 1 is preserved verbatim.
pub(crate) fn migrate_version<'de, D>(deserializer: D) -> std::result::Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    let version = Option::<i32>::deserialize(deserializer)?;
    Ok(match version {
        Some(v) if v > 1 => v,
        _ => 1,
    })
}

/// A persisted union analysis job. Created PENDING at submission, advanced
/// only through the transition methods below, immutable once terminal.
/// `result` is present exactly when the job is FINISHED.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnionAnalysis {
    pub id: Uuid,
    pub state: JobState,
    #[serde(rename = "type")]
    pub kind: EntityKind,
    pub input_count: usize,
    #[serde(default = "default_version", deserialize_with = "migrate_version")]
    pub version: i32,
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Vec<UnionUnitWithCount>>,
}

impl UnionAnalysis {
    /// A brand-new PENDING job for a validated request of `input_count`
    /// unique sets.
    pub fn create(kind: EntityKind, input_count: usize, data_version: i32) -> Self {
        Self {
            id: Uuid::new_v4(),
            state: JobState::Pending,
            kind,
            input_count,
            version: if data_version > 1 { data_version } else { 1 },
            timestamp: chrono::Utc::now().timestamp_millis(),
            result: None,
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

    /// IN_PROGRESS -> FINISHED, attaching the per-region counts.
    pub fn finish_with_results(self, result: Vec<UnionUnitWithCount>) -> Result<Self> {
        if let Some(bad) = result.iter().find(|r| r.count < 0) {
            return Err(SetAnalysisError::InvalidRequest {
                message: format!("A region count must not be negative, got {}", bad.count),
            });
        }

        match self.state {
            JobState::InProgress => Ok(Self {
                state: JobState::Finished,
                result: Some(result),
                ..self
            }),
            other => Err(SetAnalysisError::InvalidTransition {
                from: other.as_str(),
                event: "finish",
            }),
        }
    }

    /// PENDING or IN_PROGRESS -> ERROR. Terminal jobs stay as they are; an
    /// already finished analysis cannot be retroactively voided.
    pub fn fail(self) -> Result<Self> {
        match self.state {
            JobState::Pending | JobState::InProgress => Ok(Self {
                state: JobState::Error,
                result: None,
                ..self
            }),
            other => Err(SetAnalysisError::InvalidTransition {
                from: other.as_str(),
                event: "fail",
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::unit::UnionUnit;
    use std::collections::BTreeSet;

    fn counted_region(count: i64) -> UnionUnitWithCount {
        let unit = UnionUnit {
            intersection: [Uuid::new_v4()].into_iter().collect(),
            exclusions: BTreeSet::new(),
        };
        UnionUnitWithCount { unit, count }
    }

    #[test]
    fn test_new_jobs_are_pending_version_one() {
        let job = UnionAnalysis::create(EntityKind::Donor, 3, 1);
        assert_eq!(job.state, JobState::Pending);
        assert_eq!(job.input_count, 3);
        assert_eq!(job.version, 1);
        assert!(job.result.is_none());
    }

    #[test]
    fn test_happy_path_transitions() {
        let job = UnionAnalysis::create(EntityKind::Gene, 2, 1);
        let job = job.start().unwrap();
        assert_eq!(job.state, JobState::InProgress);

        let job = job.finish_with_results(vec![counted_region(7)]).unwrap();
        assert_eq!(job.state, JobState::Finished);
        assert_eq!(job.result.as_ref().unwrap().len(), 1);
    }

    #[test]
    fn test_finish_requires_start() {
        let job = UnionAnalysis::create(EntityKind::Gene, 2, 1);
        assert!(job.finish_with_results(vec![counted_region(1)]).is_err());
    }

    #[test]
    fn test_finish_rejects_negative_counts() {
        let job = UnionAnalysis::create(EntityKind::Gene, 2, 1)
            .start()
            .unwrap();
        assert!(job.finish_with_results(vec![counted_region(-5)]).is_err());
    }

    #[test]
    fn test_terminal_states_reject_all_transitions() {
        let finished = UnionAnalysis::create(EntityKind::Donor, 2, 1)
            .start()
            .unwrap()
            .finish_with_results(vec![])
            .unwrap();
        assert!(finished.clone().start().is_err());
        assert!(finished.clone().fail().is_err());
        assert!(finished.finish_with_results(vec![]).is_err());

        let failed = UnionAnalysis::create(EntityKind::Donor, 2, 1)
            .start()
            .unwrap()
            .fail()
            .unwrap();
        assert!(failed.clone().start().is_err());
        assert!(failed.fail().is_err());
    }

    #[test]
    fn test_fail_reachable_from_pending() {
        let job = UnionAnalysis::create(EntityKind::File, 2, 1).fail().unwrap();
        assert_eq!(job.state, JobState::Error);
    }

    #[test]
    fn test_version_migration_on_deserialize() {
        let legacy = r#"{"id":"37b9ecf5-93c2-4cb4-86d8-a72df2f7bc24","state":"PENDING",
            "type":"donor","inputCount":2,"timestamp":0}"#;
        let job: UnionAnalysis = serde_json::from_str(legacy).unwrap();
        assert_eq!(job.version, 1);

        let migrated = r#"{"id":"37b9ecf5-93c2-4cb4-86d8-a72df2f7bc24","state":"PENDING",
            "type":"donor","inputCount":2,"version":2,"timestamp":0}"#;
        let job: UnionAnalysis = serde_json::from_str(migrated).unwrap();
        assert_eq!(job.version, 2);

        let zero = r#"{"id":"37b9ecf5-93c2-4cb4-86d8-a72df2f7bc24","state":"PENDING",
            "type":"donor","inputCount":2,"version":0,"timestamp":0}"#;
        let job: UnionAnalysis = serde_json::from_str(zero).unwrap();
        assert_eq!(job.version, 1);
    }

    #[test]
    fn test_result_omitted_unless_finished() {
        let job = UnionAnalysis::create(EntityKind::Donor, 2, 1);
        let json = serde_json::to_value(&job).unwrap();
        assert_eq!(json["state"], "PENDING");
        assert_eq!(json["inputCount"], 2);
        assert!(json.get("result").is_none());

        let finished = job
            .start()
            .unwrap()
            .finish_with_results(vec![counted_region(3)])
            .unwrap();
        let json = serde_json::to_value(&finished).unwrap();
        assert_eq!(json["state"], "FINISHED");
        assert_eq!(json["result"][0]["count"], 3);
    }
}
