//! HTTP API over a voltreon workspace.
//!
//! Every route lives under `/api`. Errors use the JSON shape described in
//! [`error`].
//!
//! ```no_run
//! use std::path::Path;
//! use voltreon::app::App;
//! use voltreon_server::{AppState, create_router};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let app = App::from_directory(Path::new(".")).await?;
//! let router = create_router(AppState::new(app));
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:3001").await?;
//! axum::serve(listener, router).await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::AppError;
pub use routes::create_router;
pub use state::AppState;
