//! Helper functions for database row conversion and parsing.
//!
//! These utilities convert between database representations and domain types.
//! Also provides SQL column list constants shared across queries.

use crate::domain::{Person, PersonId, Project, ProjectId, Ticket, TicketId, TicketStatus};
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rusqlite::Row;
use rusqlite::types::Type;

/// SQL column list for the projects table.
///
/// Use with `row_to_project` for consistent column ordering.
pub(crate) const PROJECT_COLUMNS: &str = "id, name, description, created_at, updated_at";

/// SQL column list for the tickets table.
///
/// Use with `row_to_ticket` for consistent column ordering.
pub(crate) const TICKET_COLUMNS: &str = "id, project_id, title, context, decision, consequences, \
     status, is_ai_generated, created_at, updated_at";

/// SQL column list for the people table.
///
/// Use with `row_to_person` for consistent column ordering.
pub(crate) const PERSON_COLUMNS: &str = "id, name, email, username";

/// Current time at the precision the database stores.
pub(crate) fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

pub(crate) fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(idx: usize, s: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Parse a ticket status label from the database.
///
/// Returns an error for unrecognized values, indicating possible database corruption.
pub(crate) fn parse_status(idx: usize, s: &str) -> rusqlite::Result<TicketStatus> {
    TicketStatus::ALL
        .into_iter()
        .find(|status| status.as_str() == s)
        .ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                idx,
                Type::Text,
                format!("Unknown ticket status '{s}' in database. Database may be corrupted.")
                    .into(),
            )
        })
}

/// Convert a row selected with [`PROJECT_COLUMNS`].
pub(crate) fn row_to_project(row: &Row<'_>) -> rusqlite::Result<Project> {
    let created_at: String = row.get(3)?;
    let updated_at: String = row.get(4)?;
    Ok(Project {
        id: ProjectId(row.get(0)?),
        name: row.get(1)?,
        description: row.get(2)?,
        created_at: parse_timestamp(3, &created_at)?,
        updated_at: parse_timestamp(4, &updated_at)?,
    })
}

/// Convert a row selected with [`TICKET_COLUMNS`].
pub(crate) fn row_to_ticket(row: &Row<'_>) -> rusqlite::Result<Ticket> {
    let status: String = row.get(6)?;
    let created_at: String = row.get(8)?;
    let updated_at: String = row.get(9)?;
    Ok(Ticket {
        id: TicketId(row.get(0)?),
        project_id: ProjectId(row.get(1)?),
        title: row.get(2)?,
        context: row.get(3)?,
        decision: row.get(4)?,
        consequences: row.get(5)?,
        status: parse_status(6, &status)?,
        is_ai_generated: row.get(7)?,
        created_at: parse_timestamp(8, &created_at)?,
        updated_at: parse_timestamp(9, &updated_at)?,
    })
}

/// Convert a row selected with [`PERSON_COLUMNS`].
pub(crate) fn row_to_person(row: &Row<'_>) -> rusqlite::Result<Person> {
    Ok(Person {
        id: PersonId(row.get(0)?),
        name: row.get(1)?,
        email: row.get(2)?,
        username: row.get(3)?,
    })
}

/// Whether an error is a constraint violation (unique, primary key, check).
pub(crate) fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}
