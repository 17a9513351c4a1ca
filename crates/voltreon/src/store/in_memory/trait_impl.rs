//! `EntityStore` trait implementation for the in-memory store.

use super::InMemoryStore;
use super::graph::neighbours;
use crate::dependency::{CyclePolicy, check_edge};
use crate::domain::{
    NewPerson, NewProject, NewTicket, Person, PersonId, PersonUpdate, Project, ProjectId,
    ProjectUpdate, Ticket, TicketDependency, TicketFilter, TicketId, TicketPerson, TicketUpdate,
};
use crate::error::{Error, Result};
use crate::store::EntityStore;
use async_trait::async_trait;
use chrono::Utc;
use petgraph::Direction;

#[async_trait]
impl EntityStore for InMemoryStore {
    // ========== Projects ==========

    async fn create_project(&self, new_project: NewProject) -> Result<Project> {
        new_project.validate().map_err(Error::Validation)?;

        let mut inner = self.lock().await;
        let now = Utc::now();
        let project = Project {
            id: inner.allocate_project_id(),
            name: new_project.name,
            description: new_project.description,
            created_at: now,
            updated_at: now,
        };
        inner.projects.insert(project.id, project.clone());
        Ok(project)
    }

    async fn get_project(&self, id: ProjectId) -> Result<Option<Project>> {
        let inner = self.lock().await;
        Ok(inner.projects.get(&id).cloned())
    }

    async fn list_projects(&self) -> Result<Vec<Project>> {
        let inner = self.lock().await;
        let mut projects: Vec<Project> = inner.projects.values().cloned().collect();
        projects.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(projects)
    }

    async fn update_project(&self, id: ProjectId, update: ProjectUpdate) -> Result<Project> {
        if let Some(name) = &update.name {
            NewProject {
                name: name.clone(),
                description: None,
            }
            .validate()
            .map_err(Error::Validation)?;
        }

        let mut inner = self.lock().await;
        let project = inner
            .projects
            .get_mut(&id)
            .ok_or(Error::ProjectNotFound(id))?;

        if let Some(name) = update.name {
            project.name = name;
        }
        if let Some(description) = update.description {
            project.description = description;
        }
        project.updated_at = Utc::now();

        Ok(project.clone())
    }

    async fn delete_project(&self, id: ProjectId) -> Result<()> {
        let mut inner = self.lock().await;
        if !inner.projects.contains_key(&id) {
            return Err(Error::ProjectNotFound(id));
        }

        let ticket_count = inner
            .tickets
            .values()
            .filter(|t| t.project_id == id)
            .count();
        if ticket_count > 0 {
            return Err(Error::ProjectHasTickets {
                project_id: id,
                ticket_count,
            });
        }

        inner.projects.remove(&id);
        Ok(())
    }

    // ========== Tickets ==========

    async fn create_ticket(&self, new_ticket: NewTicket) -> Result<Ticket> {
        new_ticket.validate().map_err(Error::Validation)?;

        let mut inner = self.lock().await;
        if !inner.projects.contains_key(&new_ticket.project_id) {
            return Err(Error::ProjectNotFound(new_ticket.project_id));
        }

        let now = Utc::now();
        let ticket = Ticket {
            id: inner.allocate_ticket_id(),
            project_id: new_ticket.project_id,
            title: new_ticket.title,
            context: new_ticket.context,
            decision: new_ticket.decision,
            consequences: new_ticket.consequences,
            status: new_ticket.status.unwrap_or_default(),
            is_ai_generated: new_ticket.is_ai_generated,
            created_at: now,
            updated_at: now,
        };
        inner.insert_ticket(ticket.clone());
        Ok(ticket)
    }

    async fn get_ticket(&self, id: TicketId) -> Result<Option<Ticket>> {
        let inner = self.lock().await;
        Ok(inner.tickets.get(&id).cloned())
    }

    async fn list_tickets(&self, filter: &TicketFilter) -> Result<Vec<Ticket>> {
        let inner = self.lock().await;
        let mut tickets: Vec<Ticket> = inner
            .tickets
            .values()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect();
        tickets.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        if let Some(limit) = filter.limit {
            tickets.truncate(limit);
        }
        Ok(tickets)
    }

    async fn update_ticket(&self, id: TicketId, update: TicketUpdate) -> Result<Ticket> {
        let mut inner = self.lock().await;
        let ticket = inner
            .tickets
            .get_mut(&id)
            .ok_or(Error::TicketNotFound(id))?;

        update.apply(ticket).map_err(Error::Validation)?;
        ticket.updated_at = Utc::now();

        Ok(ticket.clone())
    }

    async fn delete_ticket(&self, id: TicketId) -> Result<()> {
        let mut inner = self.lock().await;
        inner.remove_ticket(id)?;
        Ok(())
    }

    // ========== People ==========

    async fn create_person(&self, new_person: NewPerson) -> Result<Person> {
        new_person.validate().map_err(Error::Validation)?;

        let mut inner = self.lock().await;
        inner.check_person_unique(
            None,
            new_person.email.as_deref(),
            new_person.username.as_deref(),
        )?;

        let person = Person {
            id: inner.allocate_person_id(),
            name: new_person.name,
            email: new_person.email,
            username: new_person.username,
        };
        inner.people.insert(person.id, person.clone());
        Ok(person)
    }

    async fn get_person(&self, id: PersonId) -> Result<Option<Person>> {
        let inner = self.lock().await;
        Ok(inner.people.get(&id).cloned())
    }

    async fn list_people(&self) -> Result<Vec<Person>> {
        let inner = self.lock().await;
        let mut people: Vec<Person> = inner.people.values().cloned().collect();
        people.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(people)
    }

    async fn update_person(&self, id: PersonId, update: PersonUpdate) -> Result<Person> {
        let mut inner = self.lock().await;
        let mut person = inner
            .people
            .get(&id)
            .cloned()
            .ok_or(Error::PersonNotFound(id))?;

        update.apply(&mut person).map_err(Error::Validation)?;
        inner.check_person_unique(Some(id), person.email.as_deref(), person.username.as_deref())?;

        inner.people.insert(id, person.clone());
        Ok(person)
    }

    async fn delete_person(&self, id: PersonId) -> Result<()> {
        let mut inner = self.lock().await;
        inner.people.remove(&id).ok_or(Error::PersonNotFound(id))?;
        inner.assignments.retain(|(_, person_id)| *person_id != id);
        Ok(())
    }

    // ========== Assignments ==========

    async fn assign_person(&self, ticket: TicketId, person: PersonId) -> Result<TicketPerson> {
        let mut inner = self.lock().await;
        if !inner.tickets.contains_key(&ticket) {
            return Err(Error::TicketNotFound(ticket));
        }
        if !inner.people.contains_key(&person) {
            return Err(Error::PersonNotFound(person));
        }
        if !inner.assignments.insert((ticket, person)) {
            return Err(Error::DuplicateAssignment { ticket, person });
        }

        Ok(TicketPerson {
            ticket_id: ticket,
            person_id: person,
        })
    }

    async fn unassign_person(&self, ticket: TicketId, person: PersonId) -> Result<()> {
        let mut inner = self.lock().await;
        if !inner.assignments.remove(&(ticket, person)) {
            return Err(Error::AssignmentNotFound { ticket, person });
        }
        Ok(())
    }

    async fn people_for_ticket(&self, ticket: TicketId) -> Result<Vec<Person>> {
        let inner = self.lock().await;
        if !inner.tickets.contains_key(&ticket) {
            return Err(Error::TicketNotFound(ticket));
        }

        let mut people: Vec<Person> = inner
            .assignments
            .iter()
            .filter(|(ticket_id, _)| *ticket_id == ticket)
            .filter_map(|(_, person_id)| inner.people.get(person_id).cloned())
            .collect();
        people.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(people)
    }

    async fn tickets_for_person(&self, person: PersonId) -> Result<Vec<Ticket>> {
        let inner = self.lock().await;
        if !inner.people.contains_key(&person) {
            return Err(Error::PersonNotFound(person));
        }

        // BTreeSet iteration is ordered by ticket id already.
        Ok(inner
            .assignments
            .iter()
            .filter(|(_, person_id)| *person_id == person)
            .filter_map(|(ticket_id, _)| inner.tickets.get(ticket_id).cloned())
            .collect())
    }

    // ========== Dependencies ==========

    async fn add_dependency(
        &self,
        ticket: TicketId,
        depends_on: TicketId,
        policy: CyclePolicy,
    ) -> Result<TicketDependency> {
        let mut inner = self.lock().await;

        check_edge(&*inner, ticket, depends_on, policy)?;

        let from = inner.node(ticket)?;
        let to = inner.node(depends_on)?;
        inner.graph.add_edge(from, to, ());

        Ok(TicketDependency {
            ticket_id: ticket,
            depends_on_ticket_id: depends_on,
        })
    }

    async fn remove_dependency(&self, ticket: TicketId, depends_on: TicketId) -> Result<()> {
        let mut inner = self.lock().await;
        let not_found = Error::DependencyNotFound { ticket, depends_on };

        let (Some(&from), Some(&to)) =
            (inner.node_map.get(&ticket), inner.node_map.get(&depends_on))
        else {
            return Err(not_found);
        };
        let edge = inner.graph.find_edge(from, to).ok_or(not_found)?;
        inner.graph.remove_edge(edge);
        Ok(())
    }

    async fn dependencies_of(&self, ticket: TicketId) -> Result<Vec<Ticket>> {
        let inner = self.lock().await;
        neighbours(&inner, ticket, Direction::Outgoing)
    }

    async fn dependents_of(&self, ticket: TicketId) -> Result<Vec<Ticket>> {
        let inner = self.lock().await;
        neighbours(&inner, ticket, Direction::Incoming)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dependency::EdgeRejection;
    use crate::store::in_memory::new_store;

    async fn seed(store: &InMemoryStore, titles: &[&str]) -> Vec<TicketId> {
        let project = store
            .create_project(NewProject {
                name: "Test".to_string(),
                description: None,
            })
            .await
            .unwrap();

        let mut ids = Vec::new();
        for title in titles {
            let ticket = store
                .create_ticket(NewTicket {
                    project_id: project.id,
                    title: (*title).to_string(),
                    ..Default::default()
                })
                .await
                .unwrap();
            ids.push(ticket.id);
        }
        ids
    }

    #[tokio::test]
    async fn test_node_indices_survive_ticket_removal() {
        let store = new_store();
        let ids = seed(&store, &["A", "B", "C"]).await;

        store
            .add_dependency(ids[2], ids[1], CyclePolicy::Transitive)
            .await
            .unwrap();
        store.delete_ticket(ids[0]).await.unwrap();

        // After removing A, C -> B must still resolve to the right tickets.
        let deps = store.dependencies_of(ids[2]).await.unwrap();
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].title, "B");
    }

    #[tokio::test]
    async fn test_delete_ticket_drops_incident_edges() {
        let store = new_store();
        let ids = seed(&store, &["A", "B", "C"]).await;

        store
            .add_dependency(ids[0], ids[1], CyclePolicy::Transitive)
            .await
            .unwrap();
        store
            .add_dependency(ids[1], ids[2], CyclePolicy::Transitive)
            .await
            .unwrap();
        store.delete_ticket(ids[1]).await.unwrap();

        assert!(store.dependencies_of(ids[0]).await.unwrap().is_empty());
        assert!(store.dependents_of(ids[2]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_reported_even_with_out_of_band_cycle() {
        let store = new_store();
        let ids = seed(&store, &["A", "B"]).await;

        {
            let mut inner = store.lock().await;
            let a = inner.node(ids[0]).unwrap();
            let b = inner.node(ids[1]).unwrap();
            inner.graph.add_edge(a, b, ());
            inner.graph.add_edge(b, a, ());
        }

        let err = store
            .add_dependency(ids[0], ids[1], CyclePolicy::Transitive)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::EdgeRejected(EdgeRejection::DuplicateEdge { .. })
        ));
    }

    #[tokio::test]
    async fn test_ids_are_not_reused() {
        let store = new_store();
        let ids = seed(&store, &["A"]).await;
        store.delete_ticket(ids[0]).await.unwrap();

        let again = seed(&store, &["B"]).await;
        assert!(again[0] > ids[0]);
    }
}
