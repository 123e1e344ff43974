//! Stub integration shared by the handler tests.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use http_body_util::BodyExt;

use dsbridge_app::event_bus::InProcessEventBus;
use dsbridge_app::ports::Integration;
use dsbridge_app::registry::IntegrationRegistry;
use dsbridge_domain::connection::{ConnectionSlug, connection_title};
use dsbridge_domain::entity::{DeviceClass, Entity, EntityState};
use dsbridge_domain::error::{DsBridgeError, NotFoundError, ValidationError};
use dsbridge_domain::id::EntityId;
use dsbridge_domain::service::Service;
use dsbridge_domain::time::now;

use crate::state::AppState;

/// One light that follows turn on/off, and one scene whose server is
/// unreachable.
pub struct StubIntegration {
    slug: ConnectionSlug,
    title: String,
    entities: Mutex<BTreeMap<EntityId, Entity>>,
}

impl Default for StubIntegration {
    fn default() -> Self {
        let light = Entity::builder()
            .id(EntityId::new("dslight_home_1_1_0"))
            .class(DeviceClass::Light)
            .name("Living")
            .state(EntityState::Off)
            .build()
            .unwrap();
        let scene = Entity::builder()
            .id(EntityId::new("dsscene_home_0_72"))
            .class(DeviceClass::Scene)
            .name("Absent")
            .build()
            .unwrap();
        Self {
            slug: ConnectionSlug::new("dss.local", 8080),
            title: connection_title("Apartment", "dss.local", 8080),
            entities: Mutex::new(
                [light, scene]
                    .into_iter()
                    .map(|entity| (entity.id.clone(), entity))
                    .collect(),
            ),
        }
    }
}

impl Integration for StubIntegration {
    fn slug(&self) -> &ConnectionSlug {
        &self.slug
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn entities(&self) -> Vec<Entity> {
        self.entities.lock().unwrap().values().cloned().collect()
    }

    fn entity(&self, id: &EntityId) -> Result<Entity, DsBridgeError> {
        self.entities
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| {
                NotFoundError {
                    entity: "Entity",
                    id: id.to_string(),
                }
                .into()
            })
    }

    async fn handle_service_call(
        &self,
        entity_id: &EntityId,
        service: Service,
    ) -> Result<Entity, DsBridgeError> {
        let mut entities = self.entities.lock().unwrap();
        let entity = entities.get_mut(entity_id).ok_or_else(|| NotFoundError {
            entity: "Entity",
            id: entity_id.to_string(),
        })?;
        match (entity.class, service) {
            (DeviceClass::Scene, Service::Activate) => {
                Err(DsBridgeError::communication("connection refused"))
            }
            (DeviceClass::Light, Service::TurnOn) => {
                entity.update_state(EntityState::On, now());
                Ok(entity.clone())
            }
            (DeviceClass::Light, Service::TurnOff) => {
                entity.update_state(EntityState::Off, now());
                Ok(entity.clone())
            }
            (class, service) => Err(ValidationError::UnsupportedService {
                service: service.as_str(),
                class: class.as_str(),
            }
            .into()),
        }
    }

    async fn start(&self) -> Result<(), DsBridgeError> {
        Ok(())
    }

    async fn stop(&self) -> Result<(), DsBridgeError> {
        Ok(())
    }
}

pub fn test_state() -> (AppState<StubIntegration>, Arc<InProcessEventBus>) {
    let registry = IntegrationRegistry::new();
    registry.insert(StubIntegration::default()).unwrap();
    let event_bus = Arc::new(InProcessEventBus::new(16));
    let state = AppState::new(Arc::new(registry), Arc::clone(&event_bus));
    (state, event_bus)
}

pub async fn read_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
