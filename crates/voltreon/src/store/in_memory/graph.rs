//! Dependency graph operations using petgraph.
//!
//! This module provides the graph queries for the in-memory store:
//! - Edge validation reads ([`EdgeView`])
//! - Direct neighbour lookup in either direction

use super::inner::InMemoryStoreInner;
use crate::dependency::EdgeView;
use crate::domain::{Ticket, TicketId};
use crate::error::{Error, Result};
use petgraph::Direction;
use petgraph::algo;

impl EdgeView for InMemoryStoreInner {
    fn ticket_exists(&self, id: TicketId) -> Result<bool> {
        Ok(self.tickets.contains_key(&id))
    }

    fn edge_exists(&self, from: TicketId, to: TicketId) -> Result<bool> {
        let (Some(&from_node), Some(&to_node)) = (self.node_map.get(&from), self.node_map.get(&to))
        else {
            return Ok(false);
        };
        Ok(self.graph.find_edge(from_node, to_node).is_some())
    }

    fn path_exists(&self, from: TicketId, to: TicketId) -> Result<bool> {
        let (Some(&from_node), Some(&to_node)) = (self.node_map.get(&from), self.node_map.get(&to))
        else {
            return Ok(false);
        };
        Ok(algo::has_path_connecting(
            &self.graph,
            from_node,
            to_node,
            None,
        ))
    }
}

/// Direct neighbours of a ticket, in ascending id order.
///
/// `Direction::Outgoing` yields the tickets it depends on,
/// `Direction::Incoming` the tickets that depend on it.
pub(super) fn neighbours(
    inner: &InMemoryStoreInner,
    id: TicketId,
    direction: Direction,
) -> Result<Vec<Ticket>> {
    let node = inner.node(id)?;

    let mut ids: Vec<TicketId> = inner
        .graph
        .neighbors_directed(node, direction)
        .map(|n| inner.graph[n])
        .collect();
    ids.sort_unstable();
    ids.dedup();

    ids.into_iter()
        .map(|neighbour| {
            inner
                .tickets
                .get(&neighbour)
                .cloned()
                .ok_or_else(|| {
                    Error::Storage(format!("Graph references unknown ticket {neighbour}"))
                })
        })
        .collect()
}
