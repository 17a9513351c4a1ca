//! API route definitions

use crate::handlers::{self, dependencies, people, projects, tickets};
use crate::state::AppState;
use axum::Router;
use axum::routing::{delete, get, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(handlers::health))
        // ====================================================================
        // Projects
        // ====================================================================
        .route(
            "/projects",
            get(projects::list_projects).post(projects::create_project),
        )
        .route(
            "/projects/{project_id}",
            get(projects::get_project)
                .put(projects::update_project)
                .delete(projects::delete_project),
        )
        .route(
            "/projects/{project_id}/tickets",
            get(projects::list_project_tickets).post(projects::create_project_ticket),
        )
        // ====================================================================
        // Tickets
        // ====================================================================
        .route(
            "/tickets",
            get(tickets::list_tickets).post(tickets::create_ticket),
        )
        .route(
            "/tickets/{ticket_id}",
            get(tickets::get_ticket)
                .put(tickets::update_ticket)
                .delete(tickets::delete_ticket),
        )
        .route("/tickets/{ticket_id}/people", post(tickets::assign_person))
        .route(
            "/tickets/{ticket_id}/people/{person_id}",
            delete(tickets::unassign_person),
        )
        // ====================================================================
        // Dependencies & summaries
        // ====================================================================
        .route(
            "/tickets/{ticket_id}/dependencies",
            get(dependencies::list_dependencies).post(dependencies::add_dependency),
        )
        .route(
            "/tickets/{ticket_id}/dependencies/{depends_on_ticket_id}",
            delete(dependencies::remove_dependency),
        )
        .route(
            "/tickets/{ticket_id}/dependency-graph",
            get(dependencies::dependency_graph),
        )
        .route(
            "/tickets/{ticket_id}/summarize",
            post(dependencies::summarize),
        )
        // ====================================================================
        // People
        // ====================================================================
        .route("/people", get(people::list_people).post(people::create_person))
        .route(
            "/people/{person_id}",
            get(people::get_person)
                .put(people::update_person)
                .delete(people::delete_person),
        );

    Router::new()
        .nest("/api", api)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
