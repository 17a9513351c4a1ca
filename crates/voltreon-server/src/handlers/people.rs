//! People API handlers

use super::{ApiJson, ApiPath, MessageResponse, double_option};
use crate::error::AppError;
use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use voltreon::domain::{NewPerson, Person, PersonId, PersonUpdate, Ticket};
use voltreon::error::Error;

/// Body of `POST /people`
#[derive(Debug, Deserialize)]
pub struct CreatePersonRequest {
    /// Display name
    pub name: String,
    /// Email address, unique when present
    pub email: Option<String>,
    /// Username, unique when present
    pub username: Option<String>,
}

/// Body of `PUT /people/{personId}`
#[derive(Debug, Default, Deserialize)]
pub struct UpdatePersonRequest {
    /// New name
    pub name: Option<String>,
    /// New email; `null` clears it
    #[serde(default, deserialize_with = "double_option")]
    pub email: Option<Option<String>>,
    /// New username; `null` clears it
    #[serde(default, deserialize_with = "double_option")]
    pub username: Option<Option<String>>,
}

/// A person together with their assigned tickets
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonWithTickets {
    /// The person
    #[serde(flatten)]
    pub person: Person,
    /// Assigned tickets, by id
    pub assigned_tickets: Vec<Ticket>,
}

/// List people by name
pub async fn list_people(State(state): State<AppState>) -> Result<Json<Vec<Person>>, AppError> {
    Ok(Json(state.store().list_people().await?))
}

/// Create a person
pub async fn create_person(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreatePersonRequest>,
) -> Result<(StatusCode, Json<Person>), AppError> {
    let person = state
        .store()
        .create_person(NewPerson {
            name: req.name,
            email: req.email,
            username: req.username,
        })
        .await?;
    tracing::info!(person = %person.id, "Person created");
    Ok((StatusCode::CREATED, Json(person)))
}

/// Get one person with their tickets
pub async fn get_person(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<PersonId>,
) -> Result<Json<PersonWithTickets>, AppError> {
    let person = state
        .store()
        .get_person(id)
        .await?
        .ok_or(Error::PersonNotFound(id))?;
    let assigned_tickets = state.store().tickets_for_person(id).await?;
    Ok(Json(PersonWithTickets {
        person,
        assigned_tickets,
    }))
}

/// Partially update a person
pub async fn update_person(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<PersonId>,
    ApiJson(req): ApiJson<UpdatePersonRequest>,
) -> Result<Json<Person>, AppError> {
    let person = state
        .store()
        .update_person(
            id,
            PersonUpdate {
                name: req.name,
                email: req.email,
                username: req.username,
            },
        )
        .await?;
    Ok(Json(person))
}

/// Delete a person and their assignments
pub async fn delete_person(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<PersonId>,
) -> Result<Json<MessageResponse>, AppError> {
    state.store().delete_person(id).await?;
    tracing::info!(person = %id, "Person deleted");
    Ok(MessageResponse::json(format!("Person {id} deleted")))
}
