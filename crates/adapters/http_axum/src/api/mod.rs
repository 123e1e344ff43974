//! JSON REST API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod entities;
#[allow(clippy::missing_errors_doc)]
pub mod servers;
pub mod sse;

use axum::Router;
use axum::routing::{get, post};

use dsbridge_app::ports::Integration;

use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes<I>() -> Router<AppState<I>>
where
    I: Integration + 'static,
{
    Router::new()
        // Servers
        .route("/servers", get(servers::list::<I>))
        .route("/servers/{slug}", get(servers::get::<I>))
        // Entities
        .route("/servers/{slug}/entities", get(entities::list::<I>))
        .route("/servers/{slug}/entities/{id}", get(entities::get::<I>))
        .route(
            "/servers/{slug}/entities/{id}/{service}",
            post(entities::call_service::<I>),
        )
        // Events
        .route("/events/stream", get(sse::stream::<I>))
}
