//! Region membership and neuron_children behaviour
//!
//! Runs the resolver and aggregator over the in-memory store and a stub
//! enumerator that records every remote call.

use async_trait::async_trait;
use atlas_config::AtlasConfig;
use atlas_services::impls::{ChildAggregator, InMemoryStructuralStore, RegionResolver};
use atlas_services::*;
use atlas_structures::{BBox, EntityId, Region, Vector3};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

const SEG: &str = "coll/exp/segmentation";
const SYN: &str = "coll/exp/synapses";

fn bbox(min: [i64; 3], max: [i64; 3]) -> BBox {
    BBox::new(min.into(), max.into())
}

fn region() -> BBox {
    bbox([0, 0, 0], [99, 99, 9])
}

enum Reply {
    Ids(Vec<&'static str>),
    Fail,
    Hang,
}

/// Answers every enumeration with the same reply and records the calls
struct StubEnumerator {
    reply: Reply,
    calls: Mutex<Vec<(String, BBox, u32)>>,
}

impl StubEnumerator {
    fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            calls: Mutex::new(Vec::new()),
        })
    }

    fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl IdEnumerator for StubEnumerator {
    async fn enumerate(&self, channel: &str, bbox: &BBox, resolution: u32) -> ServiceResult<Vec<String>> {
        self.calls.lock().push((channel.to_string(), *bbox, resolution));
        match &self.reply {
            Reply::Ids(ids) => Ok(ids.iter().map(|id| id.to_string()).collect()),
            Reply::Fail => Err(RemoteServiceError::Status {
                status: 503,
                url: "stub".to_string(),
            }
            .into()),
            Reply::Hang => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(Vec::new())
            }
        }
    }
}

/// Neuron 1 with the given synapses; the neuron is pre for synapses listed
/// with `true`, post otherwise. The partner neuron is 2.
fn store_with_synapses(synapses: &[(u64, BBox, bool)]) -> InMemoryStructuralStore {
    let mut store = InMemoryStructuralStore::new();
    let neuron = store.add_neuron(SEG, EntityId::new(1), region(), Vector3::new(50, 50, 5), true);
    let partner = store.add_neuron(SEG, EntityId::new(2), region(), Vector3::new(60, 60, 5), false);
    for (id, synapse_box, is_pre) in synapses {
        let (pre, post) = if *is_pre { (neuron, partner) } else { (partner, neuron) };
        let keypoint = synapse_box.min;
        store.add_synapse(SYN, EntityId::new(*id), *synapse_box, keypoint, pre, post);
    }
    store
}

fn aggregator(
    store: InMemoryStructuralStore,
    enumerator: Arc<StubEnumerator>,
    max_concurrent_checks: usize,
    deadline: Option<Duration>,
) -> ChildAggregator {
    let store: Arc<dyn StructuralStore> = Arc::new(store);
    let resolver = RegionResolver::new(store.clone(), enumerator);
    ChildAggregator::new(store, resolver, max_concurrent_checks, deadline)
}

fn query(resolution: u32) -> Region {
    Region::new(region(), resolution, SEG)
}

#[cfg(test)]
mod test_resolver {
    use super::*;

    fn resolver(enumerator: Arc<StubEnumerator>) -> RegionResolver {
        let store: Arc<dyn StructuralStore> = Arc::new(store_with_synapses(&[]));
        RegionResolver::new(store, enumerator)
    }

    #[tokio::test]
    async fn test_box_fully_inside_needs_no_remote_call() {
        let stub = StubEnumerator::new(Reply::Fail);
        let inside = resolver(stub.clone())
            .resolve(
                EntityId::new(7),
                SYN,
                &region(),
                &bbox([10, 10, 0], [20, 20, 9]),
                0,
                MembershipMode::BoundingBox,
            )
            .await
            .unwrap();

        assert!(inside);
        assert_eq!(stub.call_count(), 0);
    }

    #[tokio::test]
    async fn test_disjoint_box_needs_no_remote_call() {
        let stub = StubEnumerator::new(Reply::Fail);
        let inside = resolver(stub.clone())
            .resolve(
                EntityId::new(7),
                SYN,
                &region(),
                &bbox([200, 200, 0], [210, 210, 9]),
                0,
                MembershipMode::BoundingBox,
            )
            .await
            .unwrap();

        assert!(!inside);
        assert_eq!(stub.call_count(), 0);
    }

    #[tokio::test]
    async fn test_straddling_box_enumerates_the_overlap_once() {
        let straddling = bbox([90, 90, 0], [110, 110, 9]);

        let stub = StubEnumerator::new(Reply::Ids(vec!["42"]));
        let found = resolver(stub.clone())
            .resolve(EntityId::new(42), SYN, &region(), &straddling, 3, MembershipMode::BoundingBox)
            .await
            .unwrap();
        assert!(found);
        assert_eq!(
            stub.calls.lock().as_slice(),
            &[(SYN.to_string(), bbox([90, 90, 0], [99, 99, 9]), 3)]
        );

        let stub = StubEnumerator::new(Reply::Ids(vec!["42"]));
        let found = resolver(stub.clone())
            .resolve(EntityId::new(99), SYN, &region(), &straddling, 3, MembershipMode::BoundingBox)
            .await
            .unwrap();
        assert!(!found);
        assert_eq!(stub.call_count(), 1);
    }

    #[tokio::test]
    async fn test_non_numeric_remote_id_is_malformed_body() {
        let stub = StubEnumerator::new(Reply::Ids(vec!["12", "not-an-id"]));
        let err = resolver(stub)
            .resolve(
                EntityId::new(99),
                SYN,
                &region(),
                &bbox([90, 90, 0], [110, 110, 9]),
                0,
                MembershipMode::BoundingBox,
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ServiceError::RemoteService(RemoteServiceError::MalformedBody(_))
        ));
    }

    #[tokio::test]
    async fn test_keypoint_mode_ignores_the_box() {
        let mut store = InMemoryStructuralStore::new();
        let a = store.add_neuron(SEG, EntityId::new(1), region(), Vector3::default(), false);
        // keypoint (400, 40, 5) lands on (100, 10, 5) at resolution 2: outside
        store.add_synapse(SYN, EntityId::new(5), region(), Vector3::new(400, 40, 5), a, a);
        // keypoint (360, 40, 5) lands on (90, 10, 5): inside, though the raw point is not
        store.add_synapse(SYN, EntityId::new(6), region(), Vector3::new(360, 40, 5), a, a);
        let store: Arc<dyn StructuralStore> = Arc::new(store);

        let stub = StubEnumerator::new(Reply::Fail);
        let resolver = RegionResolver::new(store, stub.clone());
        let straddling = bbox([90, 90, 0], [110, 110, 9]);

        let five = resolver
            .resolve(EntityId::new(5), SYN, &region(), &straddling, 2, MembershipMode::Keypoint)
            .await
            .unwrap();
        let six = resolver
            .resolve(EntityId::new(6), SYN, &region(), &straddling, 2, MembershipMode::Keypoint)
            .await
            .unwrap();

        assert!(!five);
        assert!(six);
        assert_eq!(stub.call_count(), 0);
    }

    #[tokio::test]
    async fn test_keypoint_mode_unknown_candidate_is_not_found() {
        let stub = StubEnumerator::new(Reply::Fail);
        let err = resolver(stub)
            .resolve(EntityId::new(404), SYN, &region(), &region(), 0, MembershipMode::Keypoint)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { .. }));
    }
}

#[cfg(test)]
mod test_aggregator {
    use super::*;

    #[tokio::test]
    async fn test_one_match_with_polarity() {
        let store = store_with_synapses(&[
            (10, bbox([10, 10, 0], [20, 20, 9]), true),
            (11, bbox([500, 500, 0], [510, 510, 9]), false),
        ]);
        let stub = StubEnumerator::new(Reply::Fail);

        let children = aggregator(store, stub.clone(), 1, None)
            .children_in_region(EntityId::new(1), &query(0), MembershipMode::BoundingBox)
            .await
            .unwrap();

        assert_eq!(
            children,
            vec![ChildSynapse {
                synapse: EntityId::new(10),
                polarity: Polarity::Pre
            }]
        );
        assert_eq!(stub.call_count(), 0);
    }

    #[tokio::test]
    async fn test_post_synapse_gets_polarity_two() {
        let store = store_with_synapses(&[(12, bbox([10, 10, 0], [20, 20, 9]), false)]);
        let stub = StubEnumerator::new(Reply::Ids(vec![]));

        let children = aggregator(store, stub, 4, None)
            .children_in_region(EntityId::new(1), &query(0), MembershipMode::BoundingBox)
            .await
            .unwrap();

        assert_eq!(children.len(), 1);
        assert_eq!(children[0].polarity, Polarity::Post);
        assert_eq!(children[0].polarity.code(), 2);
    }

    #[tokio::test]
    async fn test_candidate_boxes_are_downsampled_to_the_query_resolution() {
        // native box x/y 40..80 becomes 10..20 at resolution 2
        let store = store_with_synapses(&[(13, bbox([40, 40, 0], [80, 80, 9]), true)]);
        let stub = StubEnumerator::new(Reply::Fail);

        let children = aggregator(store, stub.clone(), 1, None)
            .children_in_region(EntityId::new(1), &query(2), MembershipMode::BoundingBox)
            .await
            .unwrap();

        assert_eq!(children.len(), 1);
        assert_eq!(stub.call_count(), 0);
    }

    #[tokio::test]
    async fn test_remote_calls_use_the_synapse_channel() {
        let store = store_with_synapses(&[(14, bbox([90, 90, 0], [110, 110, 9]), true)]);
        let stub = StubEnumerator::new(Reply::Ids(vec!["14"]));

        let children = aggregator(store, stub.clone(), 1, None)
            .children_in_region(EntityId::new(1), &query(0), MembershipMode::BoundingBox)
            .await
            .unwrap();

        assert_eq!(children.len(), 1);
        let calls = stub.calls.lock();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, SYN);
    }

    #[tokio::test]
    async fn test_failure_on_second_of_three_keeps_first_match() {
        let store = store_with_synapses(&[
            (20, bbox([10, 10, 0], [20, 20, 9]), true),
            (21, bbox([90, 90, 0], [110, 110, 9]), true),
            (22, bbox([30, 30, 0], [40, 40, 9]), false),
        ]);
        let stub = StubEnumerator::new(Reply::Fail);

        let failure = aggregator(store, stub.clone(), 1, None)
            .children_in_region(EntityId::new(1), &query(0), MembershipMode::BoundingBox)
            .await
            .unwrap_err();

        assert_eq!(
            failure.partial,
            vec![ChildSynapse {
                synapse: EntityId::new(20),
                polarity: Polarity::Pre
            }]
        );
        assert_eq!(failure.failed_candidate, Some(EntityId::new(21)));
        assert!(matches!(
            failure.error,
            ServiceError::RemoteService(RemoteServiceError::Status { status: 503, .. })
        ));
        assert_eq!(stub.call_count(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_failure_still_reports_resolved_matches() {
        let store = store_with_synapses(&[
            (30, bbox([10, 10, 0], [20, 20, 9]), true),
            (31, bbox([90, 90, 0], [110, 110, 9]), true),
            (32, bbox([95, 95, 0], [120, 120, 9]), true),
        ]);
        let stub = StubEnumerator::new(Reply::Fail);

        let failure = aggregator(store, stub, 8, None)
            .children_in_region(EntityId::new(1), &query(0), MembershipMode::BoundingBox)
            .await
            .unwrap_err();

        assert!(failure
            .partial
            .iter()
            .any(|child| child.synapse == EntityId::new(30)));
        assert!(matches!(failure.error, ServiceError::RemoteService(_)));
        assert!(matches!(
            failure.failed_candidate,
            Some(id) if id == EntityId::new(31) || id == EntityId::new(32)
        ));
    }

    #[tokio::test]
    async fn test_unknown_neuron_is_not_found_without_partials() {
        let store = store_with_synapses(&[(40, bbox([10, 10, 0], [20, 20, 9]), true)]);
        let stub = StubEnumerator::new(Reply::Fail);

        let failure = aggregator(store, stub, 1, None)
            .children_in_region(EntityId::new(999), &query(0), MembershipMode::BoundingBox)
            .await
            .unwrap_err();

        assert!(failure.partial.is_empty());
        assert_eq!(failure.failed_candidate, None);
        assert!(matches!(failure.error, ServiceError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_deadline_stops_a_hanging_traversal() {
        let store = store_with_synapses(&[
            (50, bbox([10, 10, 0], [20, 20, 9]), true),
            (51, bbox([90, 90, 0], [110, 110, 9]), true),
        ]);
        let stub = StubEnumerator::new(Reply::Hang);

        let failure = aggregator(store, stub, 1, Some(Duration::from_millis(50)))
            .children_in_region(EntityId::new(1), &query(0), MembershipMode::BoundingBox)
            .await
            .unwrap_err();

        assert!(matches!(failure.error, ServiceError::DeadlineExceeded(_)));
        assert_eq!(failure.failed_candidate, None);
        assert_eq!(failure.partial.len(), 1);
    }
}

#[cfg(test)]
mod test_service {
    use super::*;

    fn context(store: InMemoryStructuralStore, enumerator: Arc<StubEnumerator>) -> AtlasContext {
        let mut config = AtlasConfig::default();
        config.query.max_resolution = 4;
        AtlasContext::with_backends(&config, Arc::new(store), enumerator)
    }

    #[tokio::test]
    async fn test_keypoint_is_downsampled() {
        let ctx = context(store_with_synapses(&[]), StubEnumerator::new(Reply::Fail));
        let keypoint = ctx
            .structural_service
            .keypoint(SEG, EntityId::new(1), 1)
            .await
            .unwrap();
        assert_eq!(keypoint, Vector3::new(25, 25, 5));
    }

    #[tokio::test]
    async fn test_resolution_above_cap_is_rejected() {
        let stub = StubEnumerator::new(Reply::Ids(vec![]));
        let ctx = context(store_with_synapses(&[]), stub.clone());

        let err = ctx
            .structural_service
            .ids_in_region(&query(5))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));

        let failure = ctx
            .structural_service
            .neuron_children(EntityId::new(1), &query(5), MembershipMode::BoundingBox)
            .await
            .unwrap_err();
        assert!(matches!(failure.error, ServiceError::InvalidInput(_)));
        assert_eq!(stub.call_count(), 0);
    }

    #[tokio::test]
    async fn test_neighbors_both_directions() {
        let store = store_with_synapses(&[
            (60, bbox([0, 0, 0], [1, 1, 1]), true),
            (61, bbox([0, 0, 0], [1, 1, 1]), false),
        ]);
        let ctx = context(store, StubEnumerator::new(Reply::Fail));

        let neighbors = ctx
            .structural_service
            .neighbors(SEG, EntityId::new(1), false)
            .await
            .unwrap();
        assert_eq!(neighbors.presynaptic, vec![EntityId::new(2)]);
        assert_eq!(neighbors.postsynaptic, vec![EntityId::new(2)]);

        // neuron 2 has no functional data
        let functional = ctx
            .structural_service
            .neighbors(SEG, EntityId::new(1), true)
            .await
            .unwrap();
        assert!(functional.presynaptic.is_empty());
        assert!(functional.postsynaptic.is_empty());
    }

    #[tokio::test]
    async fn test_ids_in_region_proxies_the_enumerator() {
        let stub = StubEnumerator::new(Reply::Ids(vec!["1", "2"]));
        let ctx = context(store_with_synapses(&[]), stub.clone());

        let ids = ctx.structural_service.ids_in_region(&query(0)).await.unwrap();
        assert_eq!(ids, vec!["1".to_string(), "2".to_string()]);
        assert_eq!(stub.calls.lock()[0], (SEG.to_string(), region(), 0));
    }
}
