use crate::domain::analysis::UnionAnalysis;
use crate::domain::entity_set::EntitySet;
use crate::domain::ports::{AnalysisStore, EntitySetStore};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-process job store. Each job is owned by one worker at a time, so a
/// plain map behind a lock is enough; distinct jobs never contend.
#[derive(Default)]
pub struct MemoryAnalysisStore {
    jobs: RwLock<HashMap<Uuid, UnionAnalysis>>,
}

impl MemoryAnalysisStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AnalysisStore for MemoryAnalysisStore {
    async fn save(&self, analysis: UnionAnalysis) -> Result<()> {
        self.jobs.write().await.insert(analysis.id, analysis);
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Option<UnionAnalysis>> {
        Ok(self.jobs.read().await.get(&id).cloned())
    }
}

#[derive(Default)]
pub struct MemoryEntitySetStore {
    sets: RwLock<HashMap<Uuid, EntitySet>>,
}

impl MemoryEntitySetStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EntitySetStore for MemoryEntitySetStore {
    async fn save(&self, set: EntitySet) -> Result<()> {
        self.sets.write().await.insert(set.id, set);
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Option<EntitySet>> {
        Ok(self.sets.read().await.get(&id).cloned())
    }
}
