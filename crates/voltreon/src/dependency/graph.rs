//! Dependency graph construction.
//!
//! Builds the upstream (transitive dependencies) and downstream (transitive
//! dependents) trees around a ticket.
//!
//! # Traversal
//!
//! Each direction is a depth-first walk over an explicit stack, so the depth
//! of the data never translates into call-stack depth. One visited set per
//! direction is shared across the whole walk, with the root marked first:
//!
//! - every ticket popped from the stack is emitted as a child of the ticket
//!   that discovered it
//! - it is expanded only on its first discovery; later discoveries appear as
//!   leaves
//!
//! So a diamond `A -> B -> D`, `A -> C -> D` shows `D` with its own
//! dependencies under `B` and as a bare leaf under `C`, and an out-of-band
//! cycle back to the root shows the root once more as a leaf. Totals count
//! emitted nodes.

use crate::domain::{Ticket, TicketId, TicketRef};
use crate::error::{Error, Result};
use crate::store::EntityStore;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Options controlling graph construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GraphOptions {
    /// Deepest level to expand (direct neighbours are level 1). Nodes at the
    /// limit are listed without children. `None` expands everything; a limit
    /// of 0 behaves like 1.
    pub max_depth: Option<usize>,
}

/// A node of the upstream tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpstreamNode {
    /// The ticket at this node
    #[serde(flatten)]
    pub ticket: TicketRef,

    /// What this ticket depends on
    pub dependencies: Vec<UpstreamNode>,
}

/// A node of the downstream tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownstreamNode {
    /// The ticket at this node
    #[serde(flatten)]
    pub ticket: TicketRef,

    /// What depends on this ticket
    pub dependents: Vec<DownstreamNode>,
}

/// Aggregate counts over a [`DependencyGraph`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphSummary {
    /// Nodes in the upstream tree, all levels
    pub total_upstream: usize,
    /// Nodes in the downstream tree, all levels
    pub total_downstream: usize,
    /// Length of `direct_dependencies`
    pub direct_dependencies_count: usize,
    /// Length of `direct_dependents`
    pub direct_dependents_count: usize,
}

/// The full dependency picture around one ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyGraph {
    /// The root ticket
    pub ticket: Ticket,
    /// Tickets the root depends on directly
    pub direct_dependencies: Vec<TicketRef>,
    /// Tickets depending on the root directly
    pub direct_dependents: Vec<TicketRef>,
    /// Upstream tree
    pub all_upstream_dependencies: Vec<UpstreamNode>,
    /// Downstream tree
    pub all_downstream_dependents: Vec<DownstreamNode>,
    /// Counts
    pub summary: GraphSummary,
}

impl DependencyGraph {
    /// Upstream tickets in first-discovery order, each listed once. The root
    /// itself is never part of its chain.
    pub fn upstream_chain(&self) -> Vec<&TicketRef> {
        let mut seen = HashSet::from([self.ticket.id]);
        let mut chain = Vec::new();
        let mut stack: Vec<&UpstreamNode> = self.all_upstream_dependencies.iter().rev().collect();

        while let Some(node) = stack.pop() {
            if seen.insert(node.ticket.id) {
                chain.push(&node.ticket);
            }
            stack.extend(node.dependencies.iter().rev());
        }
        chain
    }
}

#[derive(Debug, Clone, Copy)]
enum Walk {
    Upstream,
    Downstream,
}

impl Walk {
    async fn neighbours(self, store: &dyn EntityStore, id: TicketId) -> Result<Vec<Ticket>> {
        match self {
            Walk::Upstream => store.dependencies_of(id).await,
            Walk::Downstream => store.dependents_of(id).await,
        }
    }
}

struct ArenaNode {
    ticket: TicketRef,
    children: Vec<usize>,
}

/// Flat result of one walk: nodes in preorder, each child after its parent.
struct Expansion {
    nodes: Vec<ArenaNode>,
    roots: Vec<usize>,
}

impl Expansion {
    fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Fold the arena into nested nodes, leaves first.
    fn assemble<T>(self, make: impl Fn(TicketRef, Vec<T>) -> T) -> Vec<T> {
        let mut built: Vec<Option<T>> = std::iter::repeat_with(|| None)
            .take(self.nodes.len())
            .collect();

        // Children always sit at higher indices than their parent.
        for (idx, node) in self.nodes.into_iter().enumerate().rev() {
            let children = node
                .children
                .into_iter()
                .filter_map(|child| built[child].take())
                .collect();
            built[idx] = Some(make(node.ticket, children));
        }

        self.roots
            .into_iter()
            .filter_map(|root| built[root].take())
            .collect()
    }
}

async fn expand(
    store: &dyn EntityStore,
    root: TicketId,
    direct: &[Ticket],
    walk: Walk,
    max_depth: Option<usize>,
) -> Result<Expansion> {
    let mut visited = HashSet::from([root]);
    let mut nodes: Vec<ArenaNode> = Vec::new();
    let mut roots = Vec::new();

    // (parent index, ticket, depth); pushed in reverse so pops follow id order.
    let mut stack: Vec<(Option<usize>, TicketRef, usize)> = direct
        .iter()
        .rev()
        .map(|t| (None, TicketRef::from(t), 1))
        .collect();

    while let Some((parent, ticket, depth)) = stack.pop() {
        let idx = nodes.len();
        let id = ticket.id;
        nodes.push(ArenaNode {
            ticket,
            children: Vec::new(),
        });
        match parent {
            Some(p) => nodes[p].children.push(idx),
            None => roots.push(idx),
        }

        let first_discovery = visited.insert(id);
        let within_limit = max_depth.is_none_or(|max| depth < max);
        if first_discovery && within_limit {
            let next = match walk.neighbours(store, id).await {
                Ok(next) => next,
                // Deleted after its parent listed it.
                Err(Error::TicketNotFound(missing)) if missing == id => {
                    tracing::debug!(ticket = %id, ?walk, "Ticket vanished during walk");
                    Vec::new()
                }
                Err(e) => return Err(e),
            };
            stack.extend(
                next.iter()
                    .rev()
                    .map(|t| (Some(idx), TicketRef::from(t), depth + 1)),
            );
        } else if !first_discovery {
            tracing::trace!(ticket = %id, ?walk, "Already visited, not expanding");
        }
    }

    Ok(Expansion { nodes, roots })
}

/// Build the dependency graph around `id`.
///
/// # Errors
///
/// - `Error::TicketNotFound` if the root ticket doesn't exist
/// - any store error raised while walking
#[tracing::instrument(skip(store), fields(ticket = %id))]
pub async fn build_dependency_graph(
    store: &dyn EntityStore,
    id: TicketId,
    options: &GraphOptions,
) -> Result<DependencyGraph> {
    let ticket = store.get_ticket(id).await?.ok_or(Error::TicketNotFound(id))?;

    let dependencies = store.dependencies_of(id).await?;
    let dependents = store.dependents_of(id).await?;

    let upstream = expand(store, id, &dependencies, Walk::Upstream, options.max_depth).await?;
    let downstream = expand(store, id, &dependents, Walk::Downstream, options.max_depth).await?;

    let summary = GraphSummary {
        total_upstream: upstream.len(),
        total_downstream: downstream.len(),
        direct_dependencies_count: dependencies.len(),
        direct_dependents_count: dependents.len(),
    };
    tracing::debug!(
        total_upstream = summary.total_upstream,
        total_downstream = summary.total_downstream,
        "Built dependency graph"
    );

    Ok(DependencyGraph {
        ticket,
        direct_dependencies: dependencies.iter().map(TicketRef::from).collect(),
        direct_dependents: dependents.iter().map(TicketRef::from).collect(),
        all_upstream_dependencies: upstream.assemble(|ticket, dependencies| UpstreamNode {
            ticket,
            dependencies,
        }),
        all_downstream_dependents: downstream.assemble(|ticket, dependents| DownstreamNode {
            ticket,
            dependents,
        }),
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dependency::CyclePolicy;
    use crate::domain::{
        NewPerson, NewProject, NewTicket, Person, PersonId, PersonUpdate, Project, ProjectId,
        ProjectUpdate, TicketDependency, TicketFilter, TicketPerson, TicketUpdate,
    };
    use crate::store::in_memory::{InMemoryStore, new_store};
    use async_trait::async_trait;

    async fn seed(store: &InMemoryStore, titles: &[&str]) -> Vec<TicketId> {
        let project = store
            .create_project(NewProject {
                name: "Graph".to_string(),
                description: None,
            })
            .await
            .unwrap();
        let mut ids = Vec::new();
        for title in titles {
            let t = store
                .create_ticket(NewTicket {
                    project_id: project.id,
                    title: (*title).to_string(),
                    ..Default::default()
                })
                .await
                .unwrap();
            ids.push(t.id);
        }
        ids
    }

    async fn edge(store: &InMemoryStore, from: TicketId, to: TicketId) {
        store
            .add_dependency(from, to, CyclePolicy::Transitive)
            .await
            .unwrap();
    }

    async fn raw_edge(store: &InMemoryStore, from: TicketId, to: TicketId) {
        store.lock().await.insert_raw_edge(from, to).unwrap();
    }

    fn ids(nodes: &[UpstreamNode]) -> Vec<i64> {
        nodes.iter().map(|n| n.ticket.id.get()).collect()
    }

    #[tokio::test]
    async fn test_diamond_first_discovery_wins() {
        let store = new_store();
        let t = seed(&store, &["A", "B", "C", "D", "E"]).await;
        let (a, b, c, d, e) = (t[0], t[1], t[2], t[3], t[4]);
        edge(&store, a, b).await;
        edge(&store, a, c).await;
        edge(&store, b, d).await;
        edge(&store, c, d).await;
        edge(&store, d, e).await;

        let graph = build_dependency_graph(&store, a, &GraphOptions::default())
            .await
            .unwrap();

        let up = &graph.all_upstream_dependencies;
        assert_eq!(ids(up), vec![b.get(), c.get()]);
        // D expanded under B ...
        assert_eq!(ids(&up[0].dependencies), vec![d.get()]);
        assert_eq!(ids(&up[0].dependencies[0].dependencies), vec![e.get()]);
        // ... and a bare leaf under C.
        assert_eq!(ids(&up[1].dependencies), vec![d.get()]);
        assert!(up[1].dependencies[0].dependencies.is_empty());

        // B, D, E, C, D
        assert_eq!(graph.summary.total_upstream, 5);
        let chain: Vec<i64> = graph.upstream_chain().iter().map(|r| r.id.get()).collect();
        assert_eq!(chain, vec![b.get(), d.get(), e.get(), c.get()]);
    }

    #[tokio::test]
    async fn test_out_of_band_cycle_terminates() {
        let store = new_store();
        let t = seed(&store, &["A", "B", "C"]).await;
        raw_edge(&store, t[0], t[1]).await;
        raw_edge(&store, t[1], t[2]).await;
        raw_edge(&store, t[2], t[0]).await;

        let graph = build_dependency_graph(&store, t[0], &GraphOptions::default())
            .await
            .unwrap();

        // B -> C -> A(leaf)
        assert_eq!(graph.summary.total_upstream, 3);
        let leaf = &graph.all_upstream_dependencies[0].dependencies[0].dependencies[0];
        assert_eq!(leaf.ticket.id, t[0]);
        assert!(leaf.dependencies.is_empty());

        // A <- C <- B <- A(leaf)
        assert_eq!(graph.summary.total_downstream, 3);
    }

    #[tokio::test]
    async fn test_max_depth_lists_but_does_not_expand() {
        let store = new_store();
        let t = seed(&store, &["A", "B", "C", "D"]).await;
        edge(&store, t[0], t[1]).await;
        edge(&store, t[1], t[2]).await;
        edge(&store, t[2], t[3]).await;

        let options = GraphOptions { max_depth: Some(2) };
        let graph = build_dependency_graph(&store, t[0], &options).await.unwrap();

        assert_eq!(graph.summary.total_upstream, 2);
        let level_two = &graph.all_upstream_dependencies[0].dependencies[0];
        assert_eq!(level_two.ticket.id, t[2]);
        assert!(level_two.dependencies.is_empty());
        assert_eq!(graph.summary.direct_dependencies_count, 1);
    }

    /// Deletes `vanish` the moment its neighbours are asked for, as a
    /// concurrent delete would.
    struct VanishingStore {
        inner: InMemoryStore,
        vanish: TicketId,
    }

    impl VanishingStore {
        async fn delete_if_vanishing(&self, ticket: TicketId) {
            if ticket == self.vanish {
                let _ = self.inner.delete_ticket(ticket).await;
            }
        }
    }

    #[async_trait]
    impl EntityStore for VanishingStore {
        async fn create_project(&self, _: NewProject) -> Result<Project> {
            unreachable!()
        }
        async fn get_project(&self, _: ProjectId) -> Result<Option<Project>> {
            unreachable!()
        }
        async fn list_projects(&self) -> Result<Vec<Project>> {
            unreachable!()
        }
        async fn update_project(&self, _: ProjectId, _: ProjectUpdate) -> Result<Project> {
            unreachable!()
        }
        async fn delete_project(&self, _: ProjectId) -> Result<()> {
            unreachable!()
        }
        async fn create_ticket(&self, _: NewTicket) -> Result<Ticket> {
            unreachable!()
        }
        async fn get_ticket(&self, id: TicketId) -> Result<Option<Ticket>> {
            self.inner.get_ticket(id).await
        }
        async fn list_tickets(&self, _: &TicketFilter) -> Result<Vec<Ticket>> {
            unreachable!()
        }
        async fn update_ticket(&self, _: TicketId, _: TicketUpdate) -> Result<Ticket> {
            unreachable!()
        }
        async fn delete_ticket(&self, _: TicketId) -> Result<()> {
            unreachable!()
        }
        async fn create_person(&self, _: NewPerson) -> Result<Person> {
            unreachable!()
        }
        async fn get_person(&self, _: PersonId) -> Result<Option<Person>> {
            unreachable!()
        }
        async fn list_people(&self) -> Result<Vec<Person>> {
            unreachable!()
        }
        async fn update_person(&self, _: PersonId, _: PersonUpdate) -> Result<Person> {
            unreachable!()
        }
        async fn delete_person(&self, _: PersonId) -> Result<()> {
            unreachable!()
        }
        async fn assign_person(&self, _: TicketId, _: PersonId) -> Result<TicketPerson> {
            unreachable!()
        }
        async fn unassign_person(&self, _: TicketId, _: PersonId) -> Result<()> {
            unreachable!()
        }
        async fn people_for_ticket(&self, _: TicketId) -> Result<Vec<Person>> {
            unreachable!()
        }
        async fn tickets_for_person(&self, _: PersonId) -> Result<Vec<Ticket>> {
            unreachable!()
        }
        async fn add_dependency(
            &self,
            _: TicketId,
            _: TicketId,
            _: CyclePolicy,
        ) -> Result<TicketDependency> {
            unreachable!()
        }
        async fn remove_dependency(&self, _: TicketId, _: TicketId) -> Result<()> {
            unreachable!()
        }
        async fn dependencies_of(&self, ticket: TicketId) -> Result<Vec<Ticket>> {
            self.delete_if_vanishing(ticket).await;
            self.inner.dependencies_of(ticket).await
        }
        async fn dependents_of(&self, ticket: TicketId) -> Result<Vec<Ticket>> {
            self.delete_if_vanishing(ticket).await;
            self.inner.dependents_of(ticket).await
        }
    }

    #[tokio::test]
    async fn test_ticket_deleted_mid_walk_becomes_leaf() {
        let store = new_store();
        let t = seed(&store, &["A", "B", "C", "D"]).await;
        edge(&store, t[0], t[1]).await;
        edge(&store, t[0], t[2]).await;
        edge(&store, t[1], t[3]).await;
        edge(&store, t[2], t[3]).await;

        let vanishing = VanishingStore {
            inner: store.clone(),
            vanish: t[1],
        };
        let graph = build_dependency_graph(&vanishing, t[0], &GraphOptions::default())
            .await
            .unwrap();

        // B was listed by A before it vanished, so it stays as a leaf.
        let up = &graph.all_upstream_dependencies;
        assert_eq!(ids(up), vec![t[1].get(), t[2].get()]);
        assert!(up[0].dependencies.is_empty());
        assert_eq!(ids(&up[1].dependencies), vec![t[3].get()]);
        assert_eq!(graph.summary.total_upstream, 3);
        assert!(store.get_ticket(t[1]).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_root() {
        let store = new_store();
        let err = build_dependency_graph(&store, TicketId(42), &GraphOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::TicketNotFound(TicketId(42))));
    }

    #[tokio::test]
    async fn test_graph_serializes_with_nested_keys() {
        let store = new_store();
        let t = seed(&store, &["Setup", "Build", "Deploy"]).await;
        edge(&store, t[1], t[0]).await;
        edge(&store, t[2], t[1]).await;

        let graph = build_dependency_graph(&store, t[1], &GraphOptions::default())
            .await
            .unwrap();
        let json = serde_json::to_value(&graph).unwrap();

        assert_eq!(json["allUpstreamDependencies"][0]["title"], "Setup");
        assert!(json["allUpstreamDependencies"][0]["dependencies"].is_array());
        assert_eq!(json["allDownstreamDependents"][0]["title"], "Deploy");
        assert!(json["allDownstreamDependents"][0]["dependents"].is_array());
        assert_eq!(json["directDependents"][0]["isAiGenerated"], false);
        assert_eq!(json["summary"]["directDependentsCount"], 1);
        assert_eq!(json["ticket"]["id"], t[1].get());
    }
}
