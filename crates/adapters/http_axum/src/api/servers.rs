//! JSON REST handlers for configured servers.

use axum::Json;
use axum::extract::{Path, State};
use serde::Serialize;

use dsbridge_app::ports::Integration;

use crate::error::ApiError;
use crate::state::AppState;

/// One configured server.
#[derive(Debug, Serialize)]
pub struct ServerSummary {
    pub slug: String,
    pub title: String,
    pub entities: usize,
}

impl ServerSummary {
    fn from_integration<I: Integration>(integration: &I) -> Self {
        Self {
            slug: integration.slug().to_string(),
            title: integration.title().to_string(),
            entities: integration.entities().len(),
        }
    }
}

/// `GET /api/servers`
pub async fn list<I>(State(state): State<AppState<I>>) -> Json<Vec<ServerSummary>>
where
    I: Integration + 'static,
{
    let servers = state
        .registry
        .all()
        .iter()
        .map(|integration| ServerSummary::from_integration(integration.as_ref()))
        .collect();
    Json(servers)
}

/// `GET /api/servers/{slug}`
pub async fn get<I>(
    State(state): State<AppState<I>>,
    Path(slug): Path<String>,
) -> Result<Json<ServerSummary>, ApiError>
where
    I: Integration + 'static,
{
    let integration = state
        .registry
        .get(&slug)
        .ok_or_else(|| ApiError::unknown_server(&slug))?;
    Ok(Json(ServerSummary::from_integration(integration.as_ref())))
}
