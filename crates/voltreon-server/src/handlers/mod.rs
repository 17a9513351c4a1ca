//! Request handlers, grouped by resource.
//!
//! Handlers extract through [`ApiJson`], [`ApiPath`] and [`ApiQuery`] so that
//! malformed requests come back in the same JSON error shape as domain
//! failures.

pub mod dependencies;
pub mod people;
pub mod projects;
pub mod tickets;

use crate::error::AppError;
use axum::Json;
use axum::extract::{FromRequest, FromRequestParts};
use serde::{Deserialize, Deserializer, Serialize};

/// JSON body extractor that rejects with [`AppError`].
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Path extractor that rejects with [`AppError`].
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);

/// Query-string extractor that rejects with [`AppError`].
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

/// Distinguish an absent field (`None`) from an explicit `null`
/// (`Some(None)`).
pub(crate) fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

/// Body returned by delete-style endpoints.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Human-readable outcome
    pub message: String,
}

impl MessageResponse {
    pub(crate) fn json(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            message: message.into(),
        })
    }
}

/// Liveness check
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "message": "Voltreon API is running",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
