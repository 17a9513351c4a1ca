//! Project, ticket, people and assignment endpoints.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::json;

mod common;
use common::{
    add_dependency, create_project, create_ticket, delete, get, memory_router, post, put, send_raw,
};

#[tokio::test]
async fn test_health() {
    let router = memory_router();
    let (status, body) = get(&router, "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let router = memory_router();
    let request = Request::builder()
        .uri("/api/health")
        .header("origin", "http://localhost:5173")
        .body(Body::empty())
        .unwrap();
    let response = tower::ServiceExt::oneshot(router, request).await.unwrap();
    assert!(
        response
            .headers()
            .contains_key("access-control-allow-origin")
    );
}

// ========== Projects ==========

#[tokio::test]
async fn test_project_crud() {
    let router = memory_router();

    let (status, body) = post(
        &router,
        "/api/projects",
        json!({ "name": "Platform", "description": "Shared infra" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["id"].as_i64().unwrap();
    assert!(body["createdAt"].is_string());

    let (status, body) = put(
        &router,
        &format!("/api/projects/{id}"),
        json!({ "description": null }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Platform");
    assert_eq!(body["description"], json!(null));

    let (_, list) = get(&router, "/api/projects").await;
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (status, _) = delete(&router, &format!("/api/projects/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = get(&router, &format!("/api/projects/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "not_found");
}

#[tokio::test]
async fn test_project_validation() {
    let router = memory_router();

    let (status, body) = post(&router, "/api/projects", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "validation");

    let (status, body) = post(&router, "/api/projects", json!({ "name": "  " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("cannot be empty"));
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let router = memory_router();
    let request = Request::builder()
        .method("POST")
        .uri("/api/projects")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send_raw(&router, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "validation");
}

#[tokio::test]
async fn test_non_numeric_id_is_bad_request() {
    let router = memory_router();
    let (status, body) = get(&router, "/api/tickets/abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "validation");
}

#[tokio::test]
async fn test_project_with_tickets_cannot_be_deleted() {
    let router = memory_router();
    let project = create_project(&router, "Platform").await;
    create_ticket(&router, project, "Keep").await;

    let (status, body) = delete(&router, &format!("/api/projects/{project}")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["kind"], "conflict");
}

// ========== Tickets ==========

#[tokio::test]
async fn test_ticket_create_and_update() {
    let router = memory_router();
    let project = create_project(&router, "Platform").await;

    let (status, ticket) = post(
        &router,
        "/api/tickets",
        json!({
            "projectId": project,
            "title": "Adopt SQLite",
            "context": "Need persistence",
            "isAiGenerated": true
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(ticket["status"], "Backlog");
    assert_eq!(ticket["isAiGenerated"], true);
    let id = ticket["id"].as_i64().unwrap();

    let (status, updated) = put(
        &router,
        &format!("/api/tickets/{id}"),
        json!({ "status": "In Progress", "decision": "Use rusqlite" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "In Progress");
    assert_eq!(updated["decision"], "Use rusqlite");
    assert_eq!(updated["context"], "Need persistence");

    let (_, cleared) = put(
        &router,
        &format!("/api/tickets/{id}"),
        json!({ "context": null }),
    )
    .await;
    assert_eq!(cleared["context"], json!(null));
    assert_eq!(cleared["decision"], "Use rusqlite");
}

#[tokio::test]
async fn test_ticket_create_requires_project() {
    let router = memory_router();

    let (status, body) = post(&router, "/api/tickets", json!({ "title": "Orphan" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("projectId"));

    let (status, _) = post(
        &router,
        "/api/tickets",
        json!({ "projectId": 7, "title": "Orphan" }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = post(&router, "/api/projects/7/tickets", json!({ "title": "Orphan" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_ticket_listing_filters() {
    let router = memory_router();
    let first = create_project(&router, "First").await;
    let second = create_project(&router, "Second").await;
    let a = create_ticket(&router, first, "A").await;
    create_ticket(&router, first, "B").await;
    create_ticket(&router, second, "C").await;
    put(&router, &format!("/api/tickets/{a}"), json!({ "status": "Done" })).await;

    let (_, all) = get(&router, "/api/tickets").await;
    assert_eq!(all.as_array().unwrap().len(), 3);

    let (_, in_first) = get(&router, &format!("/api/tickets?projectId={first}")).await;
    assert_eq!(in_first.as_array().unwrap().len(), 2);

    let (_, done) = get(&router, &format!("/api/projects/{first}/tickets?status=Done")).await;
    let done = done.as_array().unwrap();
    assert_eq!(done.len(), 1);
    assert_eq!(done[0]["id"], a);

    let (status, _) = get(&router, "/api/projects/99/tickets").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_ticket_delete_cascades() {
    let router = memory_router();
    let project = create_project(&router, "Release").await;
    let a = create_ticket(&router, project, "A").await;
    let b = create_ticket(&router, project, "B").await;
    add_dependency(&router, a, b).await;

    let (status, _) = delete(&router, &format!("/api/tickets/{b}")).await;
    assert_eq!(status, StatusCode::OK);

    let (_, links) = get(&router, &format!("/api/tickets/{a}/dependencies")).await;
    assert_eq!(links["dependencies"], json!([]));
}

// ========== People & assignments ==========

#[tokio::test]
async fn test_people_and_assignments() {
    let router = memory_router();
    let project = create_project(&router, "Platform").await;
    let ticket = create_ticket(&router, project, "Adopt SQLite").await;

    let (status, ada) = post(
        &router,
        "/api/people",
        json!({ "name": "Ada", "email": "ada@example.com", "username": "ada" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let ada = ada["id"].as_i64().unwrap();

    let (status, body) = post(
        &router,
        "/api/people",
        json!({ "name": "Imposter", "email": "ada@example.com" }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");

    let (status, body) = post(
        &router,
        "/api/people",
        json!({ "name": "Bad", "email": "nope" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");

    let people_uri = format!("/api/tickets/{ticket}/people");
    let (status, link) = post(&router, &people_uri, json!({ "personId": ada })).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(link["ticketId"], ticket);
    assert_eq!(link["personId"], ada);

    let (status, _) = post(&router, &people_uri, json!({ "personId": ada })).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, shown) = get(&router, &format!("/api/tickets/{ticket}")).await;
    assert_eq!(shown["title"], "Adopt SQLite");
    assert_eq!(shown["assignedPeople"][0]["name"], "Ada");

    let (_, person) = get(&router, &format!("/api/people/{ada}")).await;
    assert_eq!(person["assignedTickets"][0]["id"], ticket);

    let (status, _) = delete(&router, &format!("/api/tickets/{ticket}/people/{ada}")).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = delete(&router, &format!("/api/tickets/{ticket}/people/{ada}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, updated) = put(
        &router,
        &format!("/api/people/{ada}"),
        json!({ "username": null }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["username"], json!(null));
    assert_eq!(updated["email"], "ada@example.com");

    let (status, _) = delete(&router, &format!("/api/people/{ada}")).await;
    assert_eq!(status, StatusCode::OK);
    let (_, people) = get(&router, "/api/people").await;
    assert_eq!(people, json!([]));
}
