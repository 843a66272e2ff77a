use crate::config::settings::Settings;
use crate::core::counter::RegionCounter;
use crate::core::filter::{query_body, union_filter};
use crate::core::registry::{RegistryAttributes, TermsLookupRegistry};
use crate::domain::analysis::UnionAnalysis;
use crate::domain::decompose::decompose;
use crate::domain::entity_set::EntitySet;
use crate::domain::ports::{AnalysisStore, EntitySetStore, SearchBackend};
use crate::domain::request::{DerivedSetDefinition, UnionAnalysisRequest};
use crate::domain::schema::SearchSchema;
use crate::utils::error::{Result, SetAnalysisError};
use std::sync::Arc;
use uuid::Uuid;

/// Orchestrates set operations: union analyses (decompose and count every
/// region), previews and combines. Jobs are persisted and polled; failures
/// during the asynchronous phase land in the job state, never at the
/// submitter.
pub struct UnionAnalyzer<S, A, E>
where
    S: SearchBackend + 'static,
    A: AnalysisStore,
    E: EntitySetStore,
{
    search: Arc<S>,
    analyses: Arc<A>,
    entity_sets: Arc<E>,
    registry: TermsLookupRegistry<S>,
    counter: RegionCounter<S>,
    schema: SearchSchema,
    data_version: i32,
    max_input_sets: usize,
}

impl<S, A, E> UnionAnalyzer<S, A, E>
where
    S: SearchBackend + 'static,
    A: AnalysisStore,
    E: EntitySetStore,
{
    pub fn new(search: Arc<S>, analyses: Arc<A>, entity_sets: Arc<E>, settings: &Settings) -> Self {
        let schema = SearchSchema::new(settings.search.index.as_str());
        let registry = TermsLookupRegistry::new(
            Arc::clone(&search),
            schema.clone(),
            &settings.set_operation,
        );
        let counter = RegionCounter::new(
            Arc::clone(&search),
            schema.clone(),
            settings.set_operation.concurrent_requests,
            registry.max_union_count(),
        );

        Self {
            search,
            analyses,
            entity_sets,
            registry,
            counter,
            schema,
            data_version: settings.release.data_version,
            max_input_sets: settings.set_operation.max_input_sets,
        }
    }

    pub fn registry(&self) -> &TermsLookupRegistry<S> {
        &self.registry
    }

    /// Validates the request and persists a PENDING job for it. Validation
    /// failures surface here, before any job record exists; the caller is
    /// expected to kick off [`Self::calculate`] afterwards.
    pub async fn submit(&self, request: &UnionAnalysisRequest) -> Result<UnionAnalysis> {
        let unique = request.validated_sets(self.max_input_sets)?;

        let job = UnionAnalysis::create(request.kind, unique.len(), self.data_version);
        self.analyses.save(job.clone()).await?;

        tracing::info!(
            "Submitted union analysis {} over {} {} sets",
            job.id,
            job.input_count,
            job.kind
        );
        Ok(job)
    }

    /// Runs the decompose-and-count phase for a submitted job. Any failure
    /// moves the job to ERROR and is logged rather than returned, since the
    /// job is polled asynchronously.
    pub async fn calculate(&self, id: Uuid, request: &UnionAnalysisRequest) {
        if let Err(e) = self.run_analysis(id, request).await {
            tracing::error!("Union analysis {} failed: {}", id, e);
            if let Err(store_error) = self.mark_analysis_failed(id).await {
                tracing::error!(
                    "Could not record failure of analysis {}: {}",
                    id,
                    store_error
                );
            }
        }
    }

    /// Polls a job. ERROR jobs carry no result.
    pub async fn analysis(&self, id: Uuid) -> Result<Option<UnionAnalysis>> {
        self.analyses.find(id).await
    }

    async fn run_analysis(&self, id: Uuid, request: &UnionAnalysisRequest) -> Result<()> {
        let job = self
            .analyses
            .find(id)
            .await?
            .ok_or_else(|| SetAnalysisError::InvalidRequest {
                message: format!("No union analysis with id {}", id),
            })?;

        let job = job.start()?;
        self.analyses.save(job.clone()).await?;

        let unique = request.validated_sets(self.max_input_sets)?;
        let units = decompose(&unique)?;
        tracing::debug!("Analysis {} decomposed into {} regions", id, units.len());

        let counted = self.counter.count_regions(units, request.kind).await?;

        let job = job.finish_with_results(counted)?;
        self.analyses.save(job).await?;
        tracing::info!("Union analysis {} finished", id);
        Ok(())
    }

    async fn mark_analysis_failed(&self, id: Uuid) -> Result<()> {
        if let Some(job) = self.analyses.find(id).await? {
            if !job.state.is_terminal() {
                self.analyses.save(job.fail()?).await?;
            }
        }
        Ok(())
    }

    /// The member ids of the union of the given regions, capped at the
    /// preview limit. Cheap read-only peek; nothing is registered.
    pub async fn preview_union(&self, definition: &DerivedSetDefinition) -> Result<Vec<String>> {
        let query = query_body(union_filter(&self.schema, definition.kind, &definition.union));
        let hits = self
            .search
            .search_ids(
                self.schema.index(),
                self.schema.centric_type(definition.kind),
                &query,
                self.registry.max_preview_number_of_hits(),
            )
            .await?;

        Ok(hits.ids)
    }

    /// Persists a PENDING entity set for a derived-set definition. The
    /// caller kicks off [`Self::combine`] afterwards.
    pub async fn submit_combine(&self, definition: &DerivedSetDefinition) -> Result<EntitySet> {
        let set = EntitySet::create_from_definition(definition, self.data_version);
        self.entity_sets.save(set.clone()).await?;

        tracing::info!("Submitted combine {} ('{}')", set.id, set.name);
        Ok(set)
    }

    /// Materializes the union of the definition's regions into a newly
    /// registered set. Mirrors [`Self::calculate`]: failures land in the
    /// set's state.
    pub async fn combine(&self, id: Uuid, definition: &DerivedSetDefinition) {
        if let Err(e) = self.run_combine(id, definition).await {
            tracing::error!("Combine {} failed: {}", id, e);
            if let Err(store_error) = self.mark_set_failed(id).await {
                tracing::error!("Could not record failure of combine {}: {}", id, store_error);
            }
        }
    }

    /// Polls an entity set.
    pub async fn entity_set(&self, id: Uuid) -> Result<Option<EntitySet>> {
        self.entity_sets.find(id).await
    }

    async fn run_combine(&self, id: Uuid, definition: &DerivedSetDefinition) -> Result<()> {
        let set = self
            .entity_sets
            .find(id)
            .await?
            .ok_or_else(|| SetAnalysisError::InvalidRequest {
                message: format!("No entity set with id {}", id),
            })?;

        let set = set.start()?;
        self.entity_sets.save(set.clone()).await?;

        let max_union_count = self.registry.max_union_count();
        let query = query_body(union_filter(&self.schema, definition.kind, &definition.union));
        let hits = self
            .search
            .search_ids(
                self.schema.index(),
                self.schema.centric_type(definition.kind),
                &query,
                max_union_count,
            )
            .await?;

        if hits.total > max_union_count as i64 {
            tracing::info!(
                "Combine {} aborted: {} total hits exceed the allowed maximum {}",
                id,
                hits.total,
                max_union_count
            );
            self.entity_sets.save(set.fail()?).await?;
            return Ok(());
        }

        self.registry
            .register(
                definition.kind,
                id,
                &hits.ids,
                &RegistryAttributes::transient(definition.transient),
            )
            .await?;

        let set = set.finish_with_count(hits.total)?;
        self.entity_sets.save(set).await?;
        tracing::info!("Combine {} finished with {} members", id, hits.total);
        Ok(())
    }

    async fn mark_set_failed(&self, id: Uuid) -> Result<()> {
        if let Some(set) = self.entity_sets.find(id).await? {
            if !set.state.is_terminal() {
                self.entity_sets.save(set.fail()?).await?;
            }
        }
        Ok(())
    }

    /// Dereferences a materialized set back into its member ids.
    pub async fn set_items(&self, set: &EntitySet) -> Result<Vec<String>> {
        self.registry.entry_values(set.kind, set.id).await
    }
}
