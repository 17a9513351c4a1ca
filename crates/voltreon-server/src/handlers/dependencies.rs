//! Dependency graph and summarization handlers

use super::{ApiJson, ApiPath, ApiQuery, MessageResponse};
use crate::error::AppError;
use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;
use voltreon::dependency::{DependencyGraph, DirectLinks, GraphOptions};
use voltreon::domain::{TicketDependency, TicketId};
use voltreon::summary::Summary;

/// Body of `POST /tickets/{ticketId}/dependencies`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddDependencyRequest {
    /// The ticket the path ticket will depend on
    pub depends_on_ticket_id: TicketId,
}

/// Query of `GET /tickets/{ticketId}/dependency-graph`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQuery {
    /// Deepest level to expand
    pub max_depth: Option<usize>,
}

/// Direct dependencies and dependents
pub async fn list_dependencies(
    State(state): State<AppState>,
    ApiPath(ticket): ApiPath<TicketId>,
) -> Result<Json<DirectLinks>, AppError> {
    Ok(Json(state.dependencies().direct_links(ticket).await?))
}

/// Propose a new edge
pub async fn add_dependency(
    State(state): State<AppState>,
    ApiPath(ticket): ApiPath<TicketId>,
    ApiJson(req): ApiJson<AddDependencyRequest>,
) -> Result<(StatusCode, Json<TicketDependency>), AppError> {
    let edge = state
        .dependencies()
        .propose_edge(ticket, req.depends_on_ticket_id)
        .await?;
    Ok((StatusCode::CREATED, Json(edge)))
}

/// Remove an edge
pub async fn remove_dependency(
    State(state): State<AppState>,
    ApiPath((ticket, depends_on)): ApiPath<(TicketId, TicketId)>,
) -> Result<Json<MessageResponse>, AppError> {
    state.dependencies().remove_edge(ticket, depends_on).await?;
    Ok(MessageResponse::json(format!(
        "Ticket {ticket} no longer depends on ticket {depends_on}"
    )))
}

/// Full upstream/downstream graph
pub async fn dependency_graph(
    State(state): State<AppState>,
    ApiPath(ticket): ApiPath<TicketId>,
    ApiQuery(query): ApiQuery<GraphQuery>,
) -> Result<Json<DependencyGraph>, AppError> {
    let graph = state
        .dependencies()
        .build_graph(
            ticket,
            &GraphOptions {
                max_depth: query.max_depth,
            },
        )
        .await?;
    Ok(Json(graph))
}

/// Summarize a ticket's dependencies
pub async fn summarize(
    State(state): State<AppState>,
    ApiPath(ticket): ApiPath<TicketId>,
) -> Result<Json<Summary>, AppError> {
    Ok(Json(state.summaries().summarize(ticket).await?))
}
