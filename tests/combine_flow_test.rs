use set_analysis::config::{ReleaseConfig, SearchConfig, SetOperationConfig, Settings};
use set_analysis::domain::SearchBackend;
use set_analysis::store::{MemoryAnalysisStore, MemoryEntitySetStore};
use set_analysis::{
    DerivedSetDefinition, EntityKind, JobState, MemorySearch, RegistryAttributes, UnionAnalyzer,
    UnionUnit,
};
use std::collections::BTreeSet;
use std::sync::Arc;
use uuid::Uuid;

fn settings(max_number_of_hits: usize, max_preview_number_of_hits: usize) -> Settings {
    Settings {
        search: SearchConfig {
            base_url: "http://localhost:9200".to_string(),
            index: "dcc-release".to_string(),
            request_timeout_seconds: None,
        },
        set_operation: SetOperationConfig {
            max_number_of_hits,
            max_multiplier: 1,
            max_preview_number_of_hits,
            max_input_sets: 10,
            concurrent_requests: 3,
        },
        release: ReleaseConfig { data_version: 1 },
    }
}

struct Fixture {
    search: Arc<MemorySearch>,
    analyzer: UnionAnalyzer<MemorySearch, MemoryAnalysisStore, MemoryEntitySetStore>,
    a: Uuid,
    b: Uuid,
}

/// Two gene sets over five indexed genes: A = {G1, G2, G3}, B = {G3, G4}.
async fn fixture(settings: &Settings) -> Fixture {
    let search = Arc::new(MemorySearch::new());
    let analyzer = UnionAnalyzer::new(
        Arc::clone(&search),
        Arc::new(MemoryAnalysisStore::new()),
        Arc::new(MemoryEntitySetStore::new()),
        settings,
    );
    analyzer.registry().ensure_index().await.unwrap();

    for id in ["G1", "G2", "G3", "G4", "G5"] {
        search.index_entity("dcc-release", "gene-centric", id).await;
    }

    let a = Uuid::new_v4();
    let b = Uuid::new_v4();
    analyzer
        .registry()
        .register(
            EntityKind::Gene,
            a,
            &["G1".to_string(), "G2".to_string(), "G3".to_string()],
            &RegistryAttributes::default(),
        )
        .await
        .unwrap();
    analyzer
        .registry()
        .register(
            EntityKind::Gene,
            b,
            &["G3".to_string(), "G4".to_string()],
            &RegistryAttributes::default(),
        )
        .await
        .unwrap();

    Fixture {
        search,
        analyzer,
        a,
        b,
    }
}

fn whole_set(id: Uuid) -> UnionUnit {
    UnionUnit {
        intersection: [id].into_iter().collect(),
        exclusions: BTreeSet::new(),
    }
}

fn union_of(a: Uuid, b: Uuid, name: &str) -> DerivedSetDefinition {
    DerivedSetDefinition {
        name: name.to_string(),
        description: None,
        kind: EntityKind::Gene,
        union: vec![whole_set(a), whole_set(b)],
        transient: false,
    }
}

#[tokio::test]
async fn test_preview_lists_the_union_members() {
    let settings = settings(20000, 1000);
    let fixture = fixture(&settings).await;

    let definition = union_of(fixture.a, fixture.b, "A or B");
    let ids = fixture.analyzer.preview_union(&definition).await.unwrap();
    assert_eq!(ids, vec!["G1", "G2", "G3", "G4"]);
}

#[tokio::test]
async fn test_preview_is_capped_at_the_preview_limit() {
    let settings = settings(20000, 2);
    let fixture = fixture(&settings).await;

    let definition = union_of(fixture.a, fixture.b, "A or B");
    let ids = fixture.analyzer.preview_union(&definition).await.unwrap();
    assert_eq!(ids.len(), 2);
}

#[tokio::test]
async fn test_combine_materializes_the_union_as_a_new_set() {
    let settings = settings(20000, 1000);
    let fixture = fixture(&settings).await;

    let definition = union_of(fixture.a, fixture.b, "A or B");
    let set = fixture.analyzer.submit_combine(&definition).await.unwrap();
    assert_eq!(set.state, JobState::Pending);

    fixture.analyzer.combine(set.id, &definition).await;

    let finished = fixture
        .analyzer
        .entity_set(set.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(finished.state, JobState::Finished);
    assert_eq!(finished.count, Some(4));

    // The new set is itself registered and dereferenceable.
    let items = fixture.analyzer.set_items(&finished).await.unwrap();
    assert_eq!(items, vec!["G1", "G2", "G3", "G4"]);
}

#[tokio::test]
async fn test_combine_of_a_difference_region() {
    let settings = settings(20000, 1000);
    let fixture = fixture(&settings).await;

    // A minus B = {G1, G2}
    let definition = DerivedSetDefinition {
        name: "A minus B".to_string(),
        description: Some("genes only in A".to_string()),
        kind: EntityKind::Gene,
        union: vec![UnionUnit {
            intersection: [fixture.a].into_iter().collect(),
            exclusions: [fixture.b].into_iter().collect(),
        }],
        transient: false,
    };

    let set = fixture.analyzer.submit_combine(&definition).await.unwrap();
    fixture.analyzer.combine(set.id, &definition).await;

    let finished = fixture
        .analyzer
        .entity_set(set.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(finished.count, Some(2));
    let items = fixture.analyzer.set_items(&finished).await.unwrap();
    assert_eq!(items, vec!["G1", "G2"]);
}

#[tokio::test]
async fn test_combine_overflowing_the_union_ceiling_aborts_to_error() {
    // max_union_count = 3 * 1 = 3, the union has 4 members.
    let settings = settings(3, 3);
    let fixture = fixture(&settings).await;

    let definition = union_of(fixture.a, fixture.b, "too big");
    let set = fixture.analyzer.submit_combine(&definition).await.unwrap();
    fixture.analyzer.combine(set.id, &definition).await;

    let failed = fixture
        .analyzer
        .entity_set(set.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(failed.state, JobState::Error);
    assert!(failed.count.is_none());

    // The aborted combine must not have registered a lookup entry.
    let entry = fixture
        .search
        .get_document("terms-lookup", "gene-ids", &set.id.to_string())
        .await
        .unwrap();
    assert!(entry.is_none());
}

#[tokio::test]
async fn test_transient_definitions_are_flagged_in_the_registry_entry() {
    let settings = settings(20000, 1000);
    let fixture = fixture(&settings).await;

    let mut definition = union_of(fixture.a, fixture.b, "scratch");
    definition.transient = true;

    let set = fixture.analyzer.submit_combine(&definition).await.unwrap();
    fixture.analyzer.combine(set.id, &definition).await;

    let entry = fixture
        .search
        .get_document("terms-lookup", "gene-ids", &set.id.to_string())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(entry["transient"], serde_json::json!(true));
}
