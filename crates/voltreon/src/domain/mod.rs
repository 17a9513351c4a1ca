//! Domain types for project and ticket tracking.
//!
//! This module contains the core entities (projects, tickets, people), the two
//! link relations (ticket-person assignments and ticket dependencies), and the
//! input/partial-update structs used to create and modify them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum length for ticket titles, project names, and person names.
pub const MAX_TITLE_LENGTH: usize = 200;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            Copy,
            Default,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            Serialize,
            Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            /// Create a new identifier from its raw value.
            pub fn new(id: i64) -> Self {
                Self(id)
            }

            /// Get the raw integer value.
            pub fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim().trim_start_matches('#');
                match trimmed.parse::<i64>() {
                    Ok(id) if id > 0 => Ok(Self(id)),
                    Ok(_) => Err(format!("{} ID must be a positive integer, got '{}'", $label, s)),
                    Err(_) => Err(format!("Invalid {} ID: '{}'", $label, s)),
                }
            }
        }
    };
}

entity_id!(
    /// Unique identifier for a project
    ProjectId,
    "project"
);
entity_id!(
    /// Unique identifier for a ticket
    TicketId,
    "ticket"
);
entity_id!(
    /// Unique identifier for a person
    PersonId,
    "person"
);

/// A project owning zero or more tickets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Unique identifier
    pub id: ProjectId,

    /// Project name (non-empty)
    pub name: String,

    /// Optional free-text description
    pub description: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// A ticket in architecture-decision-record style
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    /// Unique identifier
    pub id: TicketId,

    /// The project this ticket belongs to
    pub project_id: ProjectId,

    /// Ticket title (non-empty)
    pub title: String,

    /// ADR context: the forces at play
    pub context: Option<String>,

    /// ADR decision: what was decided
    pub decision: Option<String>,

    /// ADR consequences: what follows from the decision
    pub consequences: Option<String>,

    /// Workflow status
    pub status: TicketStatus,

    /// Whether the ticket was drafted by an AI assistant
    pub is_ai_generated: bool,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Workflow status of a ticket.
///
/// Status only changes through explicit updates; nothing transitions
/// automatically (completing a dependency does not move its dependents).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TicketStatus {
    /// Not yet scheduled
    #[default]
    Backlog,

    /// Scheduled for work
    #[serde(rename = "To Do")]
    ToDo,

    /// Currently being worked on
    #[serde(rename = "In Progress")]
    InProgress,

    /// Awaiting review
    #[serde(rename = "In Review")]
    InReview,

    /// Completed
    Done,

    /// Abandoned
    Cancelled,
}

impl TicketStatus {
    /// All statuses in workflow order.
    pub const ALL: [TicketStatus; 6] = [
        TicketStatus::Backlog,
        TicketStatus::ToDo,
        TicketStatus::InProgress,
        TicketStatus::InReview,
        TicketStatus::Done,
        TicketStatus::Cancelled,
    ];

    /// The canonical label, as persisted and serialized.
    pub fn as_str(self) -> &'static str {
        match self {
            TicketStatus::Backlog => "Backlog",
            TicketStatus::ToDo => "To Do",
            TicketStatus::InProgress => "In Progress",
            TicketStatus::InReview => "In Review",
            TicketStatus::Done => "Done",
            TicketStatus::Cancelled => "Cancelled",
        }
    }

    /// Whether the ticket has reached a terminal status.
    pub fn is_terminal(self) -> bool {
        matches!(self, TicketStatus::Done | TicketStatus::Cancelled)
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketStatus {
    type Err = String;

    /// Parses canonical labels ("In Progress") as well as the usual shell
    /// spellings ("in_progress", "in-progress", "inprogress").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .collect::<String>()
            .to_ascii_lowercase();

        match normalized.as_str() {
            "backlog" => Ok(TicketStatus::Backlog),
            "todo" => Ok(TicketStatus::ToDo),
            "inprogress" => Ok(TicketStatus::InProgress),
            "inreview" => Ok(TicketStatus::InReview),
            "done" => Ok(TicketStatus::Done),
            "cancelled" | "canceled" => Ok(TicketStatus::Cancelled),
            _ => Err(format!(
                "Invalid ticket status '{s}'. Valid values: Backlog, To Do, In Progress, \
                 In Review, Done, Cancelled"
            )),
        }
    }
}

/// A person who can be assigned to tickets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    /// Unique identifier
    pub id: PersonId,

    /// Display name (non-empty)
    pub name: String,

    /// Email address, unique when present
    pub email: Option<String>,

    /// Handle for @mentions, unique when present
    pub username: Option<String>,
}

/// Assignment of a person to a ticket (many-to-many link, no payload)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketPerson {
    /// The assigned ticket
    pub ticket_id: TicketId,

    /// The assigned person
    pub person_id: PersonId,
}

/// A directed dependency edge.
///
/// `ticket_id` cannot be considered complete until `depends_on_ticket_id` is
/// complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketDependency {
    /// The dependent ticket (edge source)
    pub ticket_id: TicketId,

    /// The ticket depended upon (edge target)
    pub depends_on_ticket_id: TicketId,
}

/// Compact view of a ticket used in dependency listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketRef {
    /// Ticket ID
    pub id: TicketId,

    /// Ticket title
    pub title: String,

    /// Ticket status
    pub status: TicketStatus,

    /// Whether the ticket was AI generated
    pub is_ai_generated: bool,
}

impl From<&Ticket> for TicketRef {
    fn from(ticket: &Ticket) -> Self {
        Self {
            id: ticket.id,
            title: ticket.title.clone(),
            status: ticket.status,
            is_ai_generated: ticket.is_ai_generated,
        }
    }
}

// ========== Inputs ==========

/// Data for creating a new project
#[derive(Debug, Clone, Default)]
pub struct NewProject {
    /// Project name
    pub name: String,

    /// Optional description
    pub description: Option<String>,
}

impl NewProject {
    /// Validate the new project data.
    ///
    /// # Errors
    ///
    /// Returns an error message if the name is empty or too long.
    pub fn validate(&self) -> Result<(), String> {
        validate_required("Project name", &self.name)
    }
}

/// Partial update for a project. Only `Some` fields change.
#[derive(Debug, Clone, Default)]
pub struct ProjectUpdate {
    /// New name
    pub name: Option<String>,

    /// New description (`Some(None)` clears it)
    pub description: Option<Option<String>>,
}

/// Data for creating a new ticket
#[derive(Debug, Clone, Default)]
pub struct NewTicket {
    /// Owning project
    pub project_id: ProjectId,

    /// Ticket title
    pub title: String,

    /// ADR context
    pub context: Option<String>,

    /// ADR decision
    pub decision: Option<String>,

    /// ADR consequences
    pub consequences: Option<String>,

    /// Initial status (defaults to Backlog)
    pub status: Option<TicketStatus>,

    /// Whether the ticket was AI generated
    pub is_ai_generated: bool,
}

impl NewTicket {
    /// Validate the new ticket data.
    ///
    /// # Errors
    ///
    /// Returns an error message if the title is empty or too long.
    pub fn validate(&self) -> Result<(), String> {
        validate_required("Ticket title", &self.title)
    }
}

/// Partial update for a ticket.
///
/// Each field is independently present or absent. For the ADR fields,
/// `Some(None)` clears the value and `None` leaves it untouched.
#[derive(Debug, Clone, Default)]
pub struct TicketUpdate {
    /// New title
    pub title: Option<String>,

    /// New ADR context
    pub context: Option<Option<String>>,

    /// New ADR decision
    pub decision: Option<Option<String>>,

    /// New ADR consequences
    pub consequences: Option<Option<String>>,

    /// New status
    pub status: Option<TicketStatus>,

    /// New AI-generated flag
    pub is_ai_generated: Option<bool>,
}

impl TicketUpdate {
    /// Returns `true` if no field is set.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.context.is_none()
            && self.decision.is_none()
            && self.consequences.is_none()
            && self.status.is_none()
            && self.is_ai_generated.is_none()
    }

    /// Apply the update to a ticket in place.
    ///
    /// # Errors
    ///
    /// Returns an error message if the new title is invalid. The ticket is
    /// left untouched in that case.
    pub fn apply(self, ticket: &mut Ticket) -> Result<(), String> {
        if let Some(title) = &self.title {
            validate_required("Ticket title", title)?;
        }

        if let Some(title) = self.title {
            ticket.title = title;
        }
        if let Some(context) = self.context {
            ticket.context = context;
        }
        if let Some(decision) = self.decision {
            ticket.decision = decision;
        }
        if let Some(consequences) = self.consequences {
            ticket.consequences = consequences;
        }
        if let Some(status) = self.status {
            ticket.status = status;
        }
        if let Some(flag) = self.is_ai_generated {
            ticket.is_ai_generated = flag;
        }
        Ok(())
    }
}

/// Data for creating a new person
#[derive(Debug, Clone, Default)]
pub struct NewPerson {
    /// Display name
    pub name: String,

    /// Email address
    pub email: Option<String>,

    /// Username
    pub username: Option<String>,
}

impl NewPerson {
    /// Validate the new person data.
    ///
    /// # Errors
    ///
    /// Returns an error message for an empty name, a malformed email, or a
    /// username containing whitespace.
    pub fn validate(&self) -> Result<(), String> {
        validate_required("Person name", &self.name)?;
        validate_contact(self.email.as_deref(), self.username.as_deref())
    }
}

/// Partial update for a person
#[derive(Debug, Clone, Default)]
pub struct PersonUpdate {
    /// New name
    pub name: Option<String>,

    /// New email (`Some(None)` clears it)
    pub email: Option<Option<String>>,

    /// New username (`Some(None)` clears it)
    pub username: Option<Option<String>>,
}

impl PersonUpdate {
    /// Apply the update to a person in place.
    ///
    /// # Errors
    ///
    /// Returns an error message if any new value is invalid. The person is
    /// left untouched in that case.
    pub fn apply(self, person: &mut Person) -> Result<(), String> {
        if let Some(name) = &self.name {
            validate_required("Person name", name)?;
        }
        let email = self.email.clone().unwrap_or_else(|| person.email.clone());
        let username = self
            .username
            .clone()
            .unwrap_or_else(|| person.username.clone());
        validate_contact(email.as_deref(), username.as_deref())?;

        if let Some(name) = self.name {
            person.name = name;
        }
        person.email = email;
        person.username = username;
        Ok(())
    }
}

/// Filter for listing tickets
#[derive(Debug, Clone, Default)]
pub struct TicketFilter {
    /// Only tickets of this project
    pub project_id: Option<ProjectId>,

    /// Only tickets with this status
    pub status: Option<TicketStatus>,

    /// Limit number of results
    pub limit: Option<usize>,
}

impl TicketFilter {
    /// Returns `true` if the ticket passes the project and status filters.
    pub fn matches(&self, ticket: &Ticket) -> bool {
        self.project_id.is_none_or(|p| ticket.project_id == p)
            && self.status.is_none_or(|s| ticket.status == s)
    }
}

fn validate_required(field: &str, value: &str) -> Result<(), String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(format!("{} cannot be empty", field));
    }
    if value.chars().count() > MAX_TITLE_LENGTH {
        return Err(format!(
            "{} cannot exceed {} characters",
            field, MAX_TITLE_LENGTH
        ));
    }
    Ok(())
}

fn validate_contact(email: Option<&str>, username: Option<&str>) -> Result<(), String> {
    if let Some(email) = email {
        let trimmed = email.trim();
        if trimmed.is_empty() || !trimmed.contains('@') {
            return Err(format!("Invalid email address: '{}'", email));
        }
    }
    if let Some(username) = username {
        if username.is_empty() || username.chars().any(char::is_whitespace) {
            return Err(format!(
                "Username must be non-empty and contain no whitespace: '{}'",
                username
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn sample_ticket() -> Ticket {
        let now = Utc::now();
        Ticket {
            id: TicketId(1),
            project_id: ProjectId(1),
            title: "Setup".to_string(),
            context: Some("Greenfield".to_string()),
            decision: None,
            consequences: None,
            status: TicketStatus::Backlog,
            is_ai_generated: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[rstest]
    #[case::canonical("In Progress", TicketStatus::InProgress)]
    #[case::snake("in_progress", TicketStatus::InProgress)]
    #[case::kebab("to-do", TicketStatus::ToDo)]
    #[case::spaced("To Do", TicketStatus::ToDo)]
    #[case::review("in review", TicketStatus::InReview)]
    #[case::american("canceled", TicketStatus::Cancelled)]
    #[case::upper("DONE", TicketStatus::Done)]
    fn test_status_parse(#[case] input: &str, #[case] expected: TicketStatus) {
        assert_eq!(input.parse::<TicketStatus>().unwrap(), expected);
    }

    #[test]
    fn test_status_parse_invalid() {
        let err = "blocked".parse::<TicketStatus>().unwrap_err();
        assert!(err.contains("Invalid ticket status"));
    }

    #[test]
    fn test_status_serde_uses_labels() {
        let json = serde_json::to_string(&TicketStatus::InReview).unwrap();
        assert_eq!(json, "\"In Review\"");
        let parsed: TicketStatus = serde_json::from_str("\"To Do\"").unwrap();
        assert_eq!(parsed, TicketStatus::ToDo);
    }

    #[test]
    fn test_status_display_roundtrips_through_parse() {
        for status in TicketStatus::ALL {
            assert_eq!(status.to_string().parse::<TicketStatus>().unwrap(), status);
        }
    }

    #[rstest]
    #[case::plain("42", Some(42))]
    #[case::hash("#7", Some(7))]
    #[case::padded(" 3 ", Some(3))]
    #[case::zero("0", None)]
    #[case::negative("-1", None)]
    #[case::garbage("abc", None)]
    fn test_ticket_id_parse(#[case] input: &str, #[case] expected: Option<i64>) {
        assert_eq!(input.parse::<TicketId>().ok().map(TicketId::get), expected);
    }

    #[test]
    fn test_ticket_serializes_camel_case() {
        let json = serde_json::to_value(sample_ticket()).unwrap();
        assert_eq!(json["projectId"], 1);
        assert_eq!(json["isAiGenerated"], false);
        assert_eq!(json["status"], "Backlog");
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn test_update_only_touches_supplied_fields() {
        let mut ticket = sample_ticket();
        let update = TicketUpdate {
            status: Some(TicketStatus::Done),
            ..Default::default()
        };
        update.apply(&mut ticket).unwrap();

        assert_eq!(ticket.status, TicketStatus::Done);
        assert_eq!(ticket.title, "Setup");
        assert_eq!(ticket.context.as_deref(), Some("Greenfield"));
    }

    #[test]
    fn test_update_can_clear_adr_field() {
        let mut ticket = sample_ticket();
        let update = TicketUpdate {
            context: Some(None),
            ..Default::default()
        };
        update.apply(&mut ticket).unwrap();
        assert!(ticket.context.is_none());
    }

    #[test]
    fn test_update_rejects_blank_title_without_mutating() {
        let mut ticket = sample_ticket();
        let update = TicketUpdate {
            title: Some("   ".to_string()),
            status: Some(TicketStatus::Done),
            ..Default::default()
        };
        assert!(update.apply(&mut ticket).is_err());
        assert_eq!(ticket.status, TicketStatus::Backlog);
    }

    #[test]
    fn test_new_ticket_title_too_long() {
        let ticket = NewTicket {
            title: "x".repeat(MAX_TITLE_LENGTH + 1),
            ..Default::default()
        };
        assert!(ticket.validate().unwrap_err().contains("cannot exceed"));
    }

    #[rstest]
    #[case::bad_email(Some("not-an-email"), None)]
    #[case::spaced_username(None, Some("jane doe"))]
    #[case::empty_username(None, Some(""))]
    fn test_new_person_invalid_contact(
        #[case] email: Option<&str>,
        #[case] username: Option<&str>,
    ) {
        let person = NewPerson {
            name: "Jane".to_string(),
            email: email.map(String::from),
            username: username.map(String::from),
        };
        assert!(person.validate().is_err());
    }

    #[test]
    fn test_filter_matches() {
        let ticket = sample_ticket();
        let filter = TicketFilter {
            project_id: Some(ProjectId(1)),
            status: Some(TicketStatus::Backlog),
            limit: None,
        };
        assert!(filter.matches(&ticket));

        let other = TicketFilter {
            status: Some(TicketStatus::Done),
            ..Default::default()
        };
        assert!(!other.matches(&ticket));
    }
}
