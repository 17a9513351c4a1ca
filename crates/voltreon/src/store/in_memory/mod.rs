//! In-memory store backend using `HashMap` and petgraph.
//!
//! This backend holds everything in RAM and **loses all data when the process
//! exits**. It backs tests, throwaway CLI sessions (`storage.backend: memory`)
//! and the server's demo mode.
//!
//! # Architecture
//!
//! - `HashMap<_, _>` per entity for O(1) lookups
//! - `petgraph::StableDiGraph` for the dependency graph, with
//!   `has_path_connecting` for reachability
//! - `HashMap<TicketId, NodeIndex>` mapping tickets to graph nodes
//! - Monotonic counters for IDs
//!
//! ## Edge Direction Convention
//!
//! Edges point from the **dependent** to the **dependency**: if ticket 3
//! depends on ticket 2, the graph holds `3 -> 2`. Outgoing neighbours are
//! dependencies, incoming neighbours are dependents.
//!
//! # Thread Safety
//!
//! The state is wrapped in `Arc<Mutex<InMemoryStoreInner>>`. Every operation
//! holds the lock for its whole duration, which is what makes edge validation
//! and insertion a single atomic step.

mod graph;
mod inner;
mod trait_impl;

use crate::store::SharedStore;
use inner::InMemoryStoreInner;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Thread-safe in-memory store.
pub(crate) type InMemoryStore = Arc<Mutex<InMemoryStoreInner>>;

/// Create a new, empty in-memory store.
///
/// # Example
///
/// ```
/// use voltreon::store::in_memory::new_in_memory_store;
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let store = new_in_memory_store();
///     assert!(store.list_projects().await.unwrap().is_empty());
/// }
/// ```
pub fn new_in_memory_store() -> SharedStore {
    Arc::new(new_store())
}

pub(crate) fn new_store() -> InMemoryStore {
    Arc::new(Mutex::new(InMemoryStoreInner::new()))
}
