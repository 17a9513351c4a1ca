//! Property tests for edge validation and graph construction.

use proptest::prelude::*;
use std::collections::{BTreeSet, HashMap, HashSet};
use voltreon::dependency::{
    CyclePolicy, DependencyGraph, DependencyService, DownstreamNode, EdgeRejection, GraphOptions,
    UpstreamNode,
};
use voltreon::domain::TicketId;
use voltreon::error::Error;
use voltreon::store::SharedStore;
use voltreon::store::in_memory::new_in_memory_store;

mod common;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("Failed to build tokio runtime")
}

/// Ticket count plus candidate edges as index pairs into the ticket list.
fn graph_shape() -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
    (2usize..9).prop_flat_map(|n| (Just(n), prop::collection::vec((0..n, 0..n), 0..24)))
}

/// Seed `n` tickets and propose every edge, keeping the accepted ones.
async fn seed(
    n: usize,
    edges: &[(usize, usize)],
    policy: CyclePolicy,
) -> (SharedStore, DependencyService, Vec<TicketId>, Vec<(TicketId, TicketId)>) {
    let store = new_in_memory_store();
    let titles: Vec<String> = (0..n).map(|i| format!("T{i}")).collect();
    let title_refs: Vec<&str> = titles.iter().map(String::as_str).collect();
    let ids = common::tickets(&store, &title_refs).await;
    let service = DependencyService::new(store.clone(), policy);

    let mut accepted = Vec::new();
    for &(from, to) in edges {
        if service.propose_edge(ids[from], ids[to]).await.is_ok() {
            accepted.push((ids[from], ids[to]));
        }
    }
    (store, service, ids, accepted)
}

fn count_upstream(nodes: &[UpstreamNode]) -> usize {
    nodes.iter().map(|n| 1 + count_upstream(&n.dependencies)).sum()
}

fn count_downstream(nodes: &[DownstreamNode]) -> usize {
    nodes.iter().map(|n| 1 + count_downstream(&n.dependents)).sum()
}

fn upstream_ids(nodes: &[UpstreamNode], out: &mut BTreeSet<TicketId>) {
    for node in nodes {
        out.insert(node.ticket.id);
        upstream_ids(&node.dependencies, out);
    }
}

fn reachable(from: TicketId, edges: &[(TicketId, TicketId)]) -> BTreeSet<TicketId> {
    let mut adjacency: HashMap<TicketId, Vec<TicketId>> = HashMap::new();
    for &(a, b) in edges {
        adjacency.entry(a).or_default().push(b);
    }
    let mut seen = HashSet::from([from]);
    let mut out = BTreeSet::new();
    let mut stack = vec![from];
    while let Some(id) = stack.pop() {
        for &next in adjacency.get(&id).into_iter().flatten() {
            out.insert(next);
            if seen.insert(next) {
                stack.push(next);
            }
        }
    }
    out
}

fn assert_counts_consistent(graph: &DependencyGraph) {
    assert_eq!(
        graph.summary.total_upstream,
        count_upstream(&graph.all_upstream_dependencies)
    );
    assert_eq!(
        graph.summary.total_downstream,
        count_downstream(&graph.all_downstream_dependents)
    );
    assert_eq!(
        graph.summary.direct_dependencies_count,
        graph.direct_dependencies.len()
    );
    assert_eq!(
        graph.summary.direct_dependents_count,
        graph.direct_dependents.len()
    );
    assert_eq!(
        graph.all_upstream_dependencies.len(),
        graph.direct_dependencies.len()
    );
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn self_dependency_always_rejected(raw in 1i64..10_000) {
        let rt = runtime();
        rt.block_on(async {
            let (_store, service, ids, _) = seed(3, &[], CyclePolicy::Transitive).await;
            for id in ids.iter().copied().chain([TicketId(raw)]) {
                match service.propose_edge(id, id).await {
                    Err(Error::EdgeRejected(EdgeRejection::SelfDependency(got))) => {
                        assert_eq!(got, id);
                    }
                    other => panic!("expected self-dependency rejection, got {other:?}"),
                }
            }
        });
    }

    #[test]
    fn accepted_edges_reject_duplicate_and_reverse((n, edges) in graph_shape()) {
        let rt = runtime();
        rt.block_on(async {
            let (_store, service, _ids, accepted) = seed(n, &edges, CyclePolicy::Transitive).await;
            for (a, b) in accepted {
                assert!(matches!(
                    service.propose_edge(a, b).await,
                    Err(Error::EdgeRejected(EdgeRejection::DuplicateEdge { .. }))
                ));
                assert!(matches!(
                    service.propose_edge(b, a).await,
                    Err(Error::EdgeRejected(EdgeRejection::CircularDependency { .. }))
                ));
            }
        });
    }

    #[test]
    fn transitive_policy_keeps_graph_acyclic((n, edges) in graph_shape()) {
        let rt = runtime();
        rt.block_on(async {
            let (_store, service, ids, accepted) = seed(n, &edges, CyclePolicy::Transitive).await;
            for &id in &ids {
                assert!(!reachable(id, &accepted).contains(&id));

                let graph = service.build_graph(id, &GraphOptions::default()).await.unwrap();
                let mut seen = BTreeSet::new();
                upstream_ids(&graph.all_upstream_dependencies, &mut seen);
                assert_eq!(seen, reachable(id, &accepted));
            }
        });
    }

    #[test]
    fn graph_building_terminates_on_cycles((n, edges) in graph_shape()) {
        let rt = runtime();
        rt.block_on(async {
            // Immediate only refuses 2-cycles, so longer cycles get through.
            let (_store, service, ids, accepted) = seed(n, &edges, CyclePolicy::Immediate).await;
            for &id in &ids {
                let graph = service.build_graph(id, &GraphOptions::default()).await.unwrap();
                assert_counts_consistent(&graph);

                let mut seen = BTreeSet::new();
                upstream_ids(&graph.all_upstream_dependencies, &mut seen);
                assert_eq!(seen, reachable(id, &accepted));

                // Each ticket is expanded at most once, so the tree is bounded
                // by the number of edges plus the direct list.
                assert!(graph.summary.total_upstream <= accepted.len());
            }
        });
    }

    #[test]
    fn depth_limit_never_grows_the_tree((n, edges) in graph_shape(), depth in 1usize..4) {
        let rt = runtime();
        rt.block_on(async {
            let (_store, service, ids, _) = seed(n, &edges, CyclePolicy::Immediate).await;
            for &id in &ids {
                let full = service.build_graph(id, &GraphOptions::default()).await.unwrap();
                let limited = service
                    .build_graph(id, &GraphOptions { max_depth: Some(depth) })
                    .await
                    .unwrap();
                assert_counts_consistent(&limited);
                assert!(limited.summary.total_upstream <= full.summary.total_upstream);
                assert!(limited.summary.total_downstream <= full.summary.total_downstream);
                assert_eq!(limited.direct_dependencies, full.direct_dependencies);
            }
        });
    }
}
