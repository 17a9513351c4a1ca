//! `EntityStore` trait implementation for the SQLite store.
//!
//! Queries run synchronously while the connection lock is held; no lock is
//! held across an `.await`.

use super::SqliteStore;
use super::helpers::{
    PERSON_COLUMNS, PROJECT_COLUMNS, TICKET_COLUMNS, format_timestamp, is_constraint_violation,
    now, row_to_person, row_to_project, row_to_ticket,
};
use crate::dependency::{CyclePolicy, EdgeRejection, check_edge};
use crate::domain::{
    NewPerson, NewProject, NewTicket, Person, PersonId, PersonUpdate, Project, ProjectId,
    ProjectUpdate, Ticket, TicketDependency, TicketFilter, TicketId, TicketPerson, TicketUpdate,
};
use crate::error::{Error, Result};
use crate::store::EntityStore;
use async_trait::async_trait;
use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};

fn fetch_project(conn: &Connection, id: ProjectId) -> Result<Option<Project>> {
    let sql = format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = ?1");
    Ok(conn
        .query_row(&sql, params![id.get()], row_to_project)
        .optional()?)
}

fn fetch_ticket(conn: &Connection, id: TicketId) -> Result<Option<Ticket>> {
    let sql = format!("SELECT {TICKET_COLUMNS} FROM tickets WHERE id = ?1");
    Ok(conn
        .query_row(&sql, params![id.get()], row_to_ticket)
        .optional()?)
}

fn fetch_person(conn: &Connection, id: PersonId) -> Result<Option<Person>> {
    let sql = format!("SELECT {PERSON_COLUMNS} FROM people WHERE id = ?1");
    Ok(conn
        .query_row(&sql, params![id.get()], row_to_person)
        .optional()?)
}

fn require_ticket(conn: &Connection, id: TicketId) -> Result<Ticket> {
    fetch_ticket(conn, id)?.ok_or(Error::TicketNotFound(id))
}

fn person_exists(conn: &Connection, id: PersonId) -> Result<bool> {
    Ok(fetch_person(conn, id)?.is_some())
}

/// Check that no other person already holds this email or username.
fn check_person_unique(
    conn: &Connection,
    except: Option<PersonId>,
    email: Option<&str>,
    username: Option<&str>,
) -> Result<()> {
    let except = except.map_or(0, PersonId::get);
    for (field, value) in [("email", email), ("username", username)] {
        let Some(value) = value else { continue };
        let sql = format!("SELECT 1 FROM people WHERE {field} = ?1 AND id <> ?2");
        let taken = conn
            .query_row(&sql, params![value, except], |_| Ok(()))
            .optional()?
            .is_some();
        if taken {
            return Err(Error::DuplicatePerson {
                field,
                value: value.to_string(),
            });
        }
    }
    Ok(())
}

/// Tickets joined through `ticket_dependencies`, ordered by id.
///
/// `join_on` names the column matched against the joined ticket; `key` the
/// column matched against `id`.
fn linked_tickets(
    conn: &Connection,
    id: TicketId,
    join_on: &str,
    key: &str,
) -> Result<Vec<Ticket>> {
    require_ticket(conn, id)?;

    let columns = TICKET_COLUMNS
        .split(", ")
        .map(|c| format!("t.{c}"))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "SELECT {columns}
         FROM ticket_dependencies d
         JOIN tickets t ON t.id = d.{join_on}
         WHERE d.{key} = ?1
         ORDER BY t.id"
    );

    let mut stmt = conn.prepare(&sql)?;
    let tickets = stmt
        .query_map(params![id.get()], row_to_ticket)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(tickets)
}

#[async_trait]
impl EntityStore for SqliteStore {
    // ========== Projects ==========

    async fn create_project(&self, new_project: NewProject) -> Result<Project> {
        new_project.validate().map_err(Error::Validation)?;

        let conn = self.connection()?;
        let ts = format_timestamp(&now());
        conn.execute(
            "INSERT INTO projects (name, description, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?3)",
            params![new_project.name, new_project.description, ts],
        )?;

        let id = ProjectId(conn.last_insert_rowid());
        fetch_project(&conn, id)?.ok_or(Error::ProjectNotFound(id))
    }

    async fn get_project(&self, id: ProjectId) -> Result<Option<Project>> {
        let conn = self.connection()?;
        fetch_project(&conn, id)
    }

    async fn list_projects(&self) -> Result<Vec<Project>> {
        let conn = self.connection()?;
        let sql =
            format!("SELECT {PROJECT_COLUMNS} FROM projects ORDER BY created_at DESC, id DESC");
        let mut stmt = conn.prepare(&sql)?;
        let projects = stmt
            .query_map([], row_to_project)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
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

        let mut conn = self.connection()?;
        let tx = conn.transaction()?;
        let mut project = fetch_project(&tx, id)?.ok_or(Error::ProjectNotFound(id))?;

        if let Some(name) = update.name {
            project.name = name;
        }
        if let Some(description) = update.description {
            project.description = description;
        }
        project.updated_at = now();

        tx.execute(
            "UPDATE projects SET name = ?1, description = ?2, updated_at = ?3 WHERE id = ?4",
            params![
                project.name,
                project.description,
                format_timestamp(&project.updated_at),
                id.get()
            ],
        )?;
        tx.commit()?;
        Ok(project)
    }

    async fn delete_project(&self, id: ProjectId) -> Result<()> {
        let mut conn = self.connection()?;
        let tx = conn.transaction()?;
        if fetch_project(&tx, id)?.is_none() {
            return Err(Error::ProjectNotFound(id));
        }

        let ticket_count: i64 = tx.query_row(
            "SELECT COUNT(*) FROM tickets WHERE project_id = ?1",
            params![id.get()],
            |row| row.get(0),
        )?;
        if ticket_count > 0 {
            return Err(Error::ProjectHasTickets {
                project_id: id,
                ticket_count: usize::try_from(ticket_count).unwrap_or(usize::MAX),
            });
        }

        tx.execute("DELETE FROM projects WHERE id = ?1", params![id.get()])?;
        tx.commit()?;
        Ok(())
    }

    // ========== Tickets ==========

    async fn create_ticket(&self, new_ticket: NewTicket) -> Result<Ticket> {
        new_ticket.validate().map_err(Error::Validation)?;

        let mut conn = self.connection()?;
        let tx = conn.transaction()?;
        if fetch_project(&tx, new_ticket.project_id)?.is_none() {
            return Err(Error::ProjectNotFound(new_ticket.project_id));
        }

        let ts = format_timestamp(&now());
        tx.execute(
            "INSERT INTO tickets
                (project_id, title, context, decision, consequences, status,
                 is_ai_generated, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
            params![
                new_ticket.project_id.get(),
                new_ticket.title,
                new_ticket.context,
                new_ticket.decision,
                new_ticket.consequences,
                new_ticket.status.unwrap_or_default().as_str(),
                new_ticket.is_ai_generated,
                ts
            ],
        )?;

        let id = TicketId(tx.last_insert_rowid());
        let ticket = require_ticket(&tx, id)?;
        tx.commit()?;
        Ok(ticket)
    }

    async fn get_ticket(&self, id: TicketId) -> Result<Option<Ticket>> {
        let conn = self.connection()?;
        fetch_ticket(&conn, id)
    }

    async fn list_tickets(&self, filter: &TicketFilter) -> Result<Vec<Ticket>> {
        let conn = self.connection()?;
        let sql = format!(
            "SELECT {TICKET_COLUMNS} FROM tickets
             WHERE (?1 IS NULL OR project_id = ?1)
               AND (?2 IS NULL OR status = ?2)
             ORDER BY created_at DESC, id DESC
             LIMIT ?3"
        );
        // A negative LIMIT means no limit in SQLite.
        let limit = filter
            .limit
            .map_or(-1, |l| i64::try_from(l).unwrap_or(i64::MAX));

        let mut stmt = conn.prepare(&sql)?;
        let tickets = stmt
            .query_map(
                params![
                    filter.project_id.map(ProjectId::get),
                    filter.status.map(|s| s.as_str()),
                    limit
                ],
                row_to_ticket,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(tickets)
    }

    async fn update_ticket(&self, id: TicketId, update: TicketUpdate) -> Result<Ticket> {
        let mut conn = self.connection()?;
        let tx = conn.transaction()?;
        let mut ticket = require_ticket(&tx, id)?;

        update.apply(&mut ticket).map_err(Error::Validation)?;
        ticket.updated_at = now();

        tx.execute(
            "UPDATE tickets
             SET title = ?1, context = ?2, decision = ?3, consequences = ?4,
                 status = ?5, is_ai_generated = ?6, updated_at = ?7
             WHERE id = ?8",
            params![
                ticket.title,
                ticket.context,
                ticket.decision,
                ticket.consequences,
                ticket.status.as_str(),
                ticket.is_ai_generated,
                format_timestamp(&ticket.updated_at),
                id.get()
            ],
        )?;
        tx.commit()?;
        Ok(ticket)
    }

    async fn delete_ticket(&self, id: TicketId) -> Result<()> {
        let conn = self.connection()?;
        // Edges and assignments go with it through ON DELETE CASCADE.
        let deleted = conn.execute("DELETE FROM tickets WHERE id = ?1", params![id.get()])?;
        if deleted == 0 {
            return Err(Error::TicketNotFound(id));
        }
        Ok(())
    }

    // ========== People ==========

    async fn create_person(&self, new_person: NewPerson) -> Result<Person> {
        new_person.validate().map_err(Error::Validation)?;

        let mut conn = self.connection()?;
        let tx = conn.transaction()?;
        check_person_unique(
            &tx,
            None,
            new_person.email.as_deref(),
            new_person.username.as_deref(),
        )?;

        tx.execute(
            "INSERT INTO people (name, email, username) VALUES (?1, ?2, ?3)",
            params![new_person.name, new_person.email, new_person.username],
        )?;
        let person = Person {
            id: PersonId(tx.last_insert_rowid()),
            name: new_person.name,
            email: new_person.email,
            username: new_person.username,
        };
        tx.commit()?;
        Ok(person)
    }

    async fn get_person(&self, id: PersonId) -> Result<Option<Person>> {
        let conn = self.connection()?;
        fetch_person(&conn, id)
    }

    async fn list_people(&self) -> Result<Vec<Person>> {
        let conn = self.connection()?;
        let sql = format!("SELECT {PERSON_COLUMNS} FROM people ORDER BY name, id");
        let mut stmt = conn.prepare(&sql)?;
        let people = stmt
            .query_map([], row_to_person)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(people)
    }

    async fn update_person(&self, id: PersonId, update: PersonUpdate) -> Result<Person> {
        let mut conn = self.connection()?;
        let tx = conn.transaction()?;
        let mut person = fetch_person(&tx, id)?.ok_or(Error::PersonNotFound(id))?;

        update.apply(&mut person).map_err(Error::Validation)?;
        check_person_unique(
            &tx,
            Some(id),
            person.email.as_deref(),
            person.username.as_deref(),
        )?;

        tx.execute(
            "UPDATE people SET name = ?1, email = ?2, username = ?3 WHERE id = ?4",
            params![person.name, person.email, person.username, id.get()],
        )?;
        tx.commit()?;
        Ok(person)
    }

    async fn delete_person(&self, id: PersonId) -> Result<()> {
        let conn = self.connection()?;
        let deleted = conn.execute("DELETE FROM people WHERE id = ?1", params![id.get()])?;
        if deleted == 0 {
            return Err(Error::PersonNotFound(id));
        }
        Ok(())
    }

    // ========== Assignments ==========

    async fn assign_person(&self, ticket: TicketId, person: PersonId) -> Result<TicketPerson> {
        let mut conn = self.connection()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        require_ticket(&tx, ticket)?;
        if !person_exists(&tx, person)? {
            return Err(Error::PersonNotFound(person));
        }

        match tx.execute(
            "INSERT INTO ticket_people (ticket_id, person_id) VALUES (?1, ?2)",
            params![ticket.get(), person.get()],
        ) {
            Ok(_) => {}
            Err(e) if is_constraint_violation(&e) => {
                return Err(Error::DuplicateAssignment { ticket, person });
            }
            Err(e) => return Err(e.into()),
        }
        tx.commit()?;

        Ok(TicketPerson {
            ticket_id: ticket,
            person_id: person,
        })
    }

    async fn unassign_person(&self, ticket: TicketId, person: PersonId) -> Result<()> {
        let conn = self.connection()?;
        let deleted = conn.execute(
            "DELETE FROM ticket_people WHERE ticket_id = ?1 AND person_id = ?2",
            params![ticket.get(), person.get()],
        )?;
        if deleted == 0 {
            return Err(Error::AssignmentNotFound { ticket, person });
        }
        Ok(())
    }

    async fn people_for_ticket(&self, ticket: TicketId) -> Result<Vec<Person>> {
        let conn = self.connection()?;
        require_ticket(&conn, ticket)?;

        let mut stmt = conn.prepare(
            "SELECT p.id, p.name, p.email, p.username
             FROM ticket_people tp
             JOIN people p ON p.id = tp.person_id
             WHERE tp.ticket_id = ?1
             ORDER BY p.name, p.id",
        )?;
        let people = stmt
            .query_map(params![ticket.get()], row_to_person)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(people)
    }

    async fn tickets_for_person(&self, person: PersonId) -> Result<Vec<Ticket>> {
        let conn = self.connection()?;
        if !person_exists(&conn, person)? {
            return Err(Error::PersonNotFound(person));
        }

        let columns = TICKET_COLUMNS
            .split(", ")
            .map(|c| format!("t.{c}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "SELECT {columns}
             FROM ticket_people tp
             JOIN tickets t ON t.id = tp.ticket_id
             WHERE tp.person_id = ?1
             ORDER BY t.id"
        );
        let mut stmt = conn.prepare(&sql)?;
        let tickets = stmt
            .query_map(params![person.get()], row_to_ticket)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(tickets)
    }

    // ========== Dependencies ==========

    async fn add_dependency(
        &self,
        ticket: TicketId,
        depends_on: TicketId,
        policy: CyclePolicy,
    ) -> Result<TicketDependency> {
        let mut conn = self.connection()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        check_edge(&*tx, ticket, depends_on, policy)?;

        match tx.execute(
            "INSERT INTO ticket_dependencies (ticket_id, depends_on_ticket_id) VALUES (?1, ?2)",
            params![ticket.get(), depends_on.get()],
        ) {
            Ok(_) => {}
            Err(e) if is_constraint_violation(&e) => {
                return Err(EdgeRejection::DuplicateEdge { ticket, depends_on }.into());
            }
            Err(e) => return Err(e.into()),
        }
        tx.commit()?;

        Ok(TicketDependency {
            ticket_id: ticket,
            depends_on_ticket_id: depends_on,
        })
    }

    async fn remove_dependency(&self, ticket: TicketId, depends_on: TicketId) -> Result<()> {
        let conn = self.connection()?;
        let deleted = conn.execute(
            "DELETE FROM ticket_dependencies WHERE ticket_id = ?1 AND depends_on_ticket_id = ?2",
            params![ticket.get(), depends_on.get()],
        )?;
        if deleted == 0 {
            return Err(Error::DependencyNotFound { ticket, depends_on });
        }
        Ok(())
    }

    async fn dependencies_of(&self, ticket: TicketId) -> Result<Vec<Ticket>> {
        let conn = self.connection()?;
        linked_tickets(&conn, ticket, "depends_on_ticket_id", "ticket_id")
    }

    async fn dependents_of(&self, ticket: TicketId) -> Result<Vec<Ticket>> {
        let conn = self.connection()?;
        linked_tickets(&conn, ticket, "ticket_id", "depends_on_ticket_id")
    }
}
