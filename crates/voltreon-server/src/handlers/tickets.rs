//! Ticket and assignment API handlers

use super::{ApiJson, ApiPath, ApiQuery, MessageResponse, double_option};
use crate::error::AppError;
use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use voltreon::domain::{
    NewTicket, Person, PersonId, ProjectId, Ticket, TicketFilter, TicketId, TicketPerson,
    TicketStatus, TicketUpdate,
};
use voltreon::error::Error;

// ============================================================================
// Request/Response types
// ============================================================================

/// Query of `GET /projects/{projectId}/tickets`
#[derive(Debug, Default, Deserialize)]
pub struct StatusQuery {
    /// Only tickets with this status
    pub status: Option<TicketStatus>,
}

/// Query of `GET /tickets`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketQuery {
    /// Only tickets of this project
    pub project_id: Option<ProjectId>,
    /// Only tickets with this status
    pub status: Option<TicketStatus>,
    /// Maximum number of tickets
    pub limit: Option<usize>,
}

/// Body of `POST /tickets` and `POST /projects/{projectId}/tickets`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTicketRequest {
    /// Owning project; required unless given in the path
    pub project_id: Option<ProjectId>,
    /// Ticket title
    pub title: String,
    /// ADR context
    pub context: Option<String>,
    /// ADR decision
    pub decision: Option<String>,
    /// ADR consequences
    pub consequences: Option<String>,
    /// Initial status, Backlog when absent
    pub status: Option<TicketStatus>,
    /// Whether an AI assistant drafted the ticket
    #[serde(default)]
    pub is_ai_generated: bool,
}

impl CreateTicketRequest {
    pub(crate) fn into_new_ticket(self, project_id: ProjectId) -> NewTicket {
        NewTicket {
            project_id,
            title: self.title,
            context: self.context,
            decision: self.decision,
            consequences: self.consequences,
            status: self.status,
            is_ai_generated: self.is_ai_generated,
        }
    }
}

/// Body of `PUT /tickets/{ticketId}`; absent fields are left unchanged
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTicketRequest {
    /// New title
    pub title: Option<String>,
    /// New context; `null` clears it
    #[serde(default, deserialize_with = "double_option")]
    pub context: Option<Option<String>>,
    /// New decision; `null` clears it
    #[serde(default, deserialize_with = "double_option")]
    pub decision: Option<Option<String>>,
    /// New consequences; `null` clears it
    #[serde(default, deserialize_with = "double_option")]
    pub consequences: Option<Option<String>>,
    /// New status
    pub status: Option<TicketStatus>,
    /// New AI-generated flag
    pub is_ai_generated: Option<bool>,
}

impl From<UpdateTicketRequest> for TicketUpdate {
    fn from(req: UpdateTicketRequest) -> Self {
        TicketUpdate {
            title: req.title,
            context: req.context,
            decision: req.decision,
            consequences: req.consequences,
            status: req.status,
            is_ai_generated: req.is_ai_generated,
        }
    }
}

/// A ticket together with the people assigned to it
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketWithPeople {
    /// The ticket
    #[serde(flatten)]
    pub ticket: Ticket,
    /// Assigned people, by name
    pub assigned_people: Vec<Person>,
}

/// Body of `POST /tickets/{ticketId}/people`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignPersonRequest {
    /// The person to assign
    pub person_id: PersonId,
}

// ============================================================================
// Tickets
// ============================================================================

pub(crate) async fn create(
    state: &AppState,
    new_ticket: NewTicket,
) -> Result<(StatusCode, Json<Ticket>), AppError> {
    let ticket = state.store().create_ticket(new_ticket).await?;
    tracing::info!(ticket = %ticket.id, project = %ticket.project_id, "Ticket created");
    Ok((StatusCode::CREATED, Json(ticket)))
}

/// List tickets, newest first
pub async fn list_tickets(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<TicketQuery>,
) -> Result<Json<Vec<Ticket>>, AppError> {
    let tickets = state
        .store()
        .list_tickets(&TicketFilter {
            project_id: query.project_id,
            status: query.status,
            limit: query.limit,
        })
        .await?;
    Ok(Json(tickets))
}

/// Create a ticket; the body names its project
pub async fn create_ticket(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateTicketRequest>,
) -> Result<(StatusCode, Json<Ticket>), AppError> {
    let project_id = req
        .project_id
        .ok_or_else(|| AppError::BadRequest("projectId is required".to_string()))?;
    create(&state, req.into_new_ticket(project_id)).await
}

/// Get one ticket with its assigned people
pub async fn get_ticket(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<TicketId>,
) -> Result<Json<TicketWithPeople>, AppError> {
    let ticket = state
        .store()
        .get_ticket(id)
        .await?
        .ok_or(Error::TicketNotFound(id))?;
    let assigned_people = state.store().people_for_ticket(id).await?;
    Ok(Json(TicketWithPeople {
        ticket,
        assigned_people,
    }))
}

/// Partially update a ticket
pub async fn update_ticket(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<TicketId>,
    ApiJson(req): ApiJson<UpdateTicketRequest>,
) -> Result<Json<Ticket>, AppError> {
    let ticket = state.store().update_ticket(id, req.into()).await?;
    tracing::info!(ticket = %id, status = %ticket.status, "Ticket updated");
    Ok(Json(ticket))
}

/// Delete a ticket with its edges and assignments
pub async fn delete_ticket(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<TicketId>,
) -> Result<Json<MessageResponse>, AppError> {
    state.store().delete_ticket(id).await?;
    tracing::info!(ticket = %id, "Ticket deleted");
    Ok(MessageResponse::json(format!("Ticket {id} deleted")))
}

// ============================================================================
// Assignments
// ============================================================================

/// Assign a person to a ticket
pub async fn assign_person(
    State(state): State<AppState>,
    ApiPath(ticket): ApiPath<TicketId>,
    ApiJson(req): ApiJson<AssignPersonRequest>,
) -> Result<(StatusCode, Json<TicketPerson>), AppError> {
    let link = state.store().assign_person(ticket, req.person_id).await?;
    tracing::info!(%ticket, person = %req.person_id, "Person assigned");
    Ok((StatusCode::CREATED, Json(link)))
}

/// Remove a person from a ticket
pub async fn unassign_person(
    State(state): State<AppState>,
    ApiPath((ticket, person)): ApiPath<(TicketId, PersonId)>,
) -> Result<Json<MessageResponse>, AppError> {
    state.store().unassign_person(ticket, person).await?;
    Ok(MessageResponse::json(format!(
        "Person {person} unassigned from ticket {ticket}"
    )))
}
