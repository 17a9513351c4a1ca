//! The ticket dependency subsystem.
//!
//! - [`validator`]: the ordered edge checks and the [`EdgeView`] seam the
//!   store backends implement
//! - [`graph`]: upstream/downstream tree construction
//! - [`DependencyService`]: the operations exposed to the CLI and HTTP surface

pub mod graph;
pub mod validator;

pub use graph::{
    DependencyGraph, DownstreamNode, GraphOptions, GraphSummary, UpstreamNode,
    build_dependency_graph,
};
pub use validator::{CyclePolicy, EdgeEnd, EdgeRejection, EdgeView, check_edge};

use crate::domain::{TicketDependency, TicketId, TicketRef};
use crate::error::{Error, Result};
use crate::store::SharedStore;
use serde::Serialize;

/// Direct neighbours of a ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectLinks {
    /// Tickets this ticket depends on
    pub dependencies: Vec<TicketRef>,
    /// Tickets depending on this ticket
    pub dependents: Vec<TicketRef>,
}

/// Dependency operations over a shared store.
#[derive(Clone)]
pub struct DependencyService {
    store: SharedStore,
    policy: CyclePolicy,
}

impl DependencyService {
    /// Create a service using the given cycle policy for new edges.
    pub fn new(store: SharedStore, policy: CyclePolicy) -> Self {
        Self { store, policy }
    }

    /// The cycle policy applied to proposals.
    pub fn policy(&self) -> CyclePolicy {
        self.policy
    }

    /// Validate and insert the edge `ticket -> depends_on`.
    ///
    /// # Errors
    ///
    /// Returns `Error::EdgeRejected` for the first failing check; the store is
    /// left untouched in that case.
    #[tracing::instrument(skip(self), fields(policy = %self.policy))]
    pub async fn propose_edge(
        &self,
        ticket: TicketId,
        depends_on: TicketId,
    ) -> Result<TicketDependency> {
        match self
            .store
            .add_dependency(ticket, depends_on, self.policy)
            .await
        {
            Ok(edge) => {
                tracing::info!("Dependency added");
                Ok(edge)
            }
            Err(Error::EdgeRejected(rejection)) => {
                tracing::warn!(
                    reason = %rejection,
                    kind = %rejection.kind(),
                    "Dependency rejected"
                );
                Err(rejection.into())
            }
            Err(e) => Err(e),
        }
    }

    /// Remove the edge `ticket -> depends_on`.
    ///
    /// # Errors
    ///
    /// Returns `Error::DependencyNotFound` if the edge doesn't exist.
    #[tracing::instrument(skip(self))]
    pub async fn remove_edge(&self, ticket: TicketId, depends_on: TicketId) -> Result<()> {
        self.store.remove_dependency(ticket, depends_on).await?;
        tracing::info!("Dependency removed");
        Ok(())
    }

    /// Direct dependencies and dependents of a ticket.
    ///
    /// # Errors
    ///
    /// Returns `Error::TicketNotFound` if the ticket doesn't exist.
    pub async fn direct_links(&self, ticket: TicketId) -> Result<DirectLinks> {
        let dependencies = self.store.dependencies_of(ticket).await?;
        let dependents = self.store.dependents_of(ticket).await?;
        Ok(DirectLinks {
            dependencies: dependencies.iter().map(TicketRef::from).collect(),
            dependents: dependents.iter().map(TicketRef::from).collect(),
        })
    }

    /// Build the full dependency graph around a ticket.
    ///
    /// # Errors
    ///
    /// Returns `Error::TicketNotFound` if the ticket doesn't exist.
    pub async fn build_graph(
        &self,
        ticket: TicketId,
        options: &GraphOptions,
    ) -> Result<DependencyGraph> {
        build_dependency_graph(self.store.as_ref(), ticket, options).await
    }
}
