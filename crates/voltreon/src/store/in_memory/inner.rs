//! Core in-memory store data structures.
//!
//! This module contains the inner state that holds all records and is
//! wrapped in `Arc<Mutex<>>` for thread safety.

use crate::domain::{Person, PersonId, Project, ProjectId, Ticket, TicketId};
use crate::error::{Error, Result};
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use std::collections::{BTreeSet, HashMap};

/// Inner store state (not thread-safe).
///
/// # Graph Representation
///
/// Dependencies live in a petgraph `StableDiGraph` with edges directed from
/// **dependent to dependency** (source depends on target). The stable variant
/// keeps every other ticket's `NodeIndex` valid when a ticket is removed.
pub(crate) struct InMemoryStoreInner {
    /// Projects indexed by ID
    pub(super) projects: HashMap<ProjectId, Project>,

    /// Tickets indexed by ID
    pub(super) tickets: HashMap<TicketId, Ticket>,

    /// People indexed by ID
    pub(super) people: HashMap<PersonId, Person>,

    /// Assignment pairs, ordered by ticket then person
    pub(super) assignments: BTreeSet<(TicketId, PersonId)>,

    /// Dependency graph. Every ticket in `tickets` has a node here.
    pub(super) graph: StableDiGraph<TicketId, ()>,

    /// Mapping from ticket ID to graph node
    pub(super) node_map: HashMap<TicketId, NodeIndex>,

    next_project_id: i64,
    next_ticket_id: i64,
    next_person_id: i64,
}

impl InMemoryStoreInner {
    /// Create an empty store
    pub(crate) fn new() -> Self {
        Self {
            projects: HashMap::new(),
            tickets: HashMap::new(),
            people: HashMap::new(),
            assignments: BTreeSet::new(),
            graph: StableDiGraph::new(),
            node_map: HashMap::new(),
            next_project_id: 1,
            next_ticket_id: 1,
            next_person_id: 1,
        }
    }

    // IDs are never reused, matching an autoincrement primary key.

    pub(super) fn allocate_project_id(&mut self) -> ProjectId {
        let id = ProjectId(self.next_project_id);
        self.next_project_id += 1;
        id
    }

    pub(super) fn allocate_ticket_id(&mut self) -> TicketId {
        let id = TicketId(self.next_ticket_id);
        self.next_ticket_id += 1;
        id
    }

    pub(super) fn allocate_person_id(&mut self) -> PersonId {
        let id = PersonId(self.next_person_id);
        self.next_person_id += 1;
        id
    }

    /// Store a ticket and give it a graph node.
    pub(super) fn insert_ticket(&mut self, ticket: Ticket) {
        let node = self.graph.add_node(ticket.id);
        self.node_map.insert(ticket.id, node);
        self.tickets.insert(ticket.id, ticket);
    }

    /// Remove a ticket, its graph node (and with it every incident edge), and
    /// its assignments.
    pub(super) fn remove_ticket(&mut self, id: TicketId) -> Result<Ticket> {
        let ticket = self.tickets.remove(&id).ok_or(Error::TicketNotFound(id))?;
        if let Some(node) = self.node_map.remove(&id) {
            self.graph.remove_node(node);
        }
        self.assignments.retain(|(ticket_id, _)| *ticket_id != id);
        Ok(ticket)
    }

    /// Look up a ticket's graph node.
    pub(super) fn node(&self, id: TicketId) -> Result<NodeIndex> {
        self.node_map
            .get(&id)
            .copied()
            .ok_or(Error::TicketNotFound(id))
    }

    /// Add an edge without any validation, for seeding cyclic data.
    #[cfg(test)]
    pub(crate) fn insert_raw_edge(&mut self, from: TicketId, to: TicketId) -> Result<()> {
        let a = self.node(from)?;
        let b = self.node(to)?;
        self.graph.add_edge(a, b, ());
        Ok(())
    }

    /// Check that no other person already holds this email or username.
    pub(super) fn check_person_unique(
        &self,
        except: Option<PersonId>,
        email: Option<&str>,
        username: Option<&str>,
    ) -> Result<()> {
        for person in self.people.values() {
            if Some(person.id) == except {
                continue;
            }
            if let Some(email) = email {
                if person.email.as_deref() == Some(email) {
                    return Err(Error::DuplicatePerson {
                        field: "email",
                        value: email.to_string(),
                    });
                }
            }
            if let Some(username) = username {
                if person.username.as_deref() == Some(username) {
                    return Err(Error::DuplicatePerson {
                        field: "username",
                        value: username.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}
