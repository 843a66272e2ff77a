use crate::core::filter::{query_body, region_filter};
use crate::domain::kind::EntityKind;
use crate::domain::ports::SearchBackend;
use crate::domain::schema::SearchSchema;
use crate::domain::unit::{UnionUnit, UnionUnitWithCount};
use crate::utils::error::{Result, SetAnalysisError};
use std::cmp::min;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Counts every region of a decomposition against the search backend.
/// Regions are independent and read-only, so the queries fan out on a
/// bounded pool and may complete in any order; results are assembled by
/// region identity. A single failed region voids the whole batch.
pub struct RegionCounter<S: SearchBackend> {
    search: Arc<S>,
    schema: SearchSchema,
    concurrent_requests: usize,
    max_union_count: usize,
}

impl<S: SearchBackend + 'static> RegionCounter<S> {
    pub fn new(
        search: Arc<S>,
        schema: SearchSchema,
        concurrent_requests: usize,
        max_union_count: usize,
    ) -> Self {
        Self {
            search,
            schema,
            concurrent_requests: concurrent_requests.max(1),
            max_union_count,
        }
    }

    pub async fn count_regions(
        &self,
        units: Vec<UnionUnit>,
        kind: EntityKind,
    ) -> Result<Vec<UnionUnitWithCount>> {
        let total = units.len();
        let semaphore = Arc::new(Semaphore::new(self.concurrent_requests));
        let mut tasks: JoinSet<Result<(usize, UnionUnitWithCount)>> = JoinSet::new();

        for (slot, unit) in units.into_iter().enumerate() {
            let search = Arc::clone(&self.search);
            let semaphore = Arc::clone(&semaphore);
            let schema = self.schema.clone();
            let max = self.max_union_count;

            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await.map_err(|_| {
                    SetAnalysisError::RegionQueryFailure {
                        message: "Region worker pool closed".to_string(),
                    }
                })?;

                let counted = count_one(search.as_ref(), &schema, kind, unit, max).await?;
                Ok((slot, counted))
            });
        }

        // Each result carries its region, so arrival order is irrelevant;
        // the slot only restores the deterministic decomposition order.
        let mut results: Vec<Option<UnionUnitWithCount>> = (0..total).map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok((slot, counted))) => results[slot] = Some(counted),
                // Dropping the JoinSet aborts the outstanding queries.
                Ok(Err(e)) => return Err(e),
                Err(e) => {
                    return Err(SetAnalysisError::RegionQueryFailure {
                        message: format!("Region task panicked: {}", e),
                    })
                }
            }
        }

        results
            .into_iter()
            .map(|slot| {
                slot.ok_or_else(|| SetAnalysisError::RegionQueryFailure {
                    message: "A region produced no count".to_string(),
                })
            })
            .collect()
    }
}

async fn count_one<S: SearchBackend>(
    search: &S,
    schema: &SearchSchema,
    kind: EntityKind,
    unit: UnionUnit,
    max_union_count: usize,
) -> Result<UnionUnitWithCount> {
    let query = query_body(region_filter(schema, kind, &unit));
    let total = search
        .count(schema.index(), schema.centric_type(kind), &query)
        .await
        .map_err(|e| SetAnalysisError::RegionQueryFailure {
            message: e.to_string(),
        })?;

    let count = min(total, max_union_count as i64);
    tracing::debug!("Region counted: {} hits (capped at {})", total, count);
    unit.with_count(count)
}
