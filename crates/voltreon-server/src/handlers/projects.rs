//! Project API handlers

use super::{ApiJson, ApiPath, ApiQuery, MessageResponse, double_option};
use super::tickets::{CreateTicketRequest, StatusQuery};
use crate::error::AppError;
use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;
use voltreon::domain::{NewProject, Project, ProjectId, ProjectUpdate, Ticket, TicketFilter};
use voltreon::error::Error;

// ============================================================================
// Request types
// ============================================================================

/// Body of `POST /projects`
#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    /// Project name
    pub name: String,
    /// Optional description
    pub description: Option<String>,
}

/// Body of `PUT /projects/{projectId}`; absent fields are left unchanged
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProjectRequest {
    /// New name
    pub name: Option<String>,
    /// New description; `null` clears it
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
}

// ============================================================================
// Handlers
// ============================================================================

/// List all projects, newest first
pub async fn list_projects(State(state): State<AppState>) -> Result<Json<Vec<Project>>, AppError> {
    Ok(Json(state.store().list_projects().await?))
}

/// Create a project
pub async fn create_project(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateProjectRequest>,
) -> Result<(StatusCode, Json<Project>), AppError> {
    let project = state
        .store()
        .create_project(NewProject {
            name: req.name,
            description: req.description,
        })
        .await?;
    tracing::info!(project = %project.id, "Project created");
    Ok((StatusCode::CREATED, Json(project)))
}

/// Get one project
pub async fn get_project(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ProjectId>,
) -> Result<Json<Project>, AppError> {
    let project = state
        .store()
        .get_project(id)
        .await?
        .ok_or(Error::ProjectNotFound(id))?;
    Ok(Json(project))
}

/// Update a project
pub async fn update_project(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ProjectId>,
    ApiJson(req): ApiJson<UpdateProjectRequest>,
) -> Result<Json<Project>, AppError> {
    let project = state
        .store()
        .update_project(
            id,
            ProjectUpdate {
                name: req.name,
                description: req.description,
            },
        )
        .await?;
    Ok(Json(project))
}

/// Delete a project that owns no tickets
pub async fn delete_project(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ProjectId>,
) -> Result<Json<MessageResponse>, AppError> {
    state.store().delete_project(id).await?;
    tracing::info!(project = %id, "Project deleted");
    Ok(MessageResponse::json(format!("Project {id} deleted")))
}

/// List a project's tickets, optionally filtered by status
pub async fn list_project_tickets(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ProjectId>,
    ApiQuery(query): ApiQuery<StatusQuery>,
) -> Result<Json<Vec<Ticket>>, AppError> {
    // An unknown project is a 404, not an empty list.
    state
        .store()
        .get_project(id)
        .await?
        .ok_or(Error::ProjectNotFound(id))?;

    let tickets = state
        .store()
        .list_tickets(&TicketFilter {
            project_id: Some(id),
            status: query.status,
            limit: None,
        })
        .await?;
    Ok(Json(tickets))
}

/// Create a ticket under the project in the path
pub async fn create_project_ticket(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ProjectId>,
    ApiJson(req): ApiJson<CreateTicketRequest>,
) -> Result<(StatusCode, Json<Ticket>), AppError> {
    super::tickets::create(&state, req.into_new_ticket(id)).await
}
