//! JSON REST handlers for entities.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};

use dsbridge_app::ports::Integration;
use dsbridge_domain::entity::Entity;
use dsbridge_domain::id::EntityId;
use dsbridge_domain::service::Service;

use crate::error::ApiError;
use crate::state::AppState;

fn integration<I>(state: &AppState<I>, slug: &str) -> Result<Arc<I>, ApiError>
where
    I: Integration + 'static,
{
    state
        .registry
        .get(slug)
        .ok_or_else(|| ApiError::unknown_server(slug))
}

/// `GET /api/servers/{slug}/entities`
pub async fn list<I>(
    State(state): State<AppState<I>>,
    Path(slug): Path<String>,
) -> Result<Json<Vec<Entity>>, ApiError>
where
    I: Integration + 'static,
{
    let integration = integration(&state, &slug)?;
    Ok(Json(integration.entities()))
}

/// `GET /api/servers/{slug}/entities/{id}`
pub async fn get<I>(
    State(state): State<AppState<I>>,
    Path((slug, id)): Path<(String, String)>,
) -> Result<Json<Entity>, ApiError>
where
    I: Integration + 'static,
{
    let integration = integration(&state, &slug)?;
    let entity = integration.entity(&EntityId::new(id))?;
    Ok(Json(entity))
}

/// `POST /api/servers/{slug}/entities/{id}/{service}`
///
/// Returns the entity snapshot after the call.
pub async fn call_service<I>(
    State(state): State<AppState<I>>,
    Path((slug, id, service)): Path<(String, String, String)>,
) -> Result<Json<Entity>, ApiError>
where
    I: Integration + 'static,
{
    let service: Service = service.parse()?;
    let integration = integration(&state, &slug)?;
    let entity = integration
        .handle_service_call(&EntityId::new(id), service)
        .await?;
    Ok(Json(entity))
}
