//! digitalSTROM integration: setup, lifecycle and service calls for one
//! server.
//!
//! Setup authenticates, fetches the scene registry once, runs the pairing
//! heuristic and builds one entity adapter per pairing or plain scene. The
//! client, listener, store and publisher are injected by the caller and
//! scoped to the integration instance.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;

use dsbridge_domain::connection::{ConnectionSlug, connection_title};
use dsbridge_domain::entity::Entity;
use dsbridge_domain::error::{ConfigurationError, DsBridgeError, NotFoundError, NotReadyError};
use dsbridge_domain::event::{Event, EventType};
use dsbridge_domain::id::EntityId;
use dsbridge_domain::pairing::discover;
use dsbridge_domain::service::Service;

use crate::dispatcher::EventDispatcher;
use crate::entities::{EntityAdapter, EntityContext, SceneEntity, ToggleEntity};
use crate::ports::{EventPublisher, EventSource, Integration, SceneClient, StateRepository};

pub const DEFAULT_HOST: &str = "dss.local";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_ALIAS: &str = "Apartment";
/// Delay the outbound stack applies to queued scene calls.
pub const DEFAULT_STACK_DELAY: Duration = Duration::from_millis(500);
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

const EVENT_BUFFER: usize = 64;

/// Connection settings of one server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionParams {
    pub host: String,
    pub port: u16,
    /// App token obtained when the server was first paired.
    pub token: Option<String>,
    pub alias: String,
    /// Pause before the single setup retry.
    pub retry_delay: Duration,
}

impl Default for ConnectionParams {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            token: None,
            alias: DEFAULT_ALIAS.to_string(),
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }
}

impl ConnectionParams {
    #[must_use]
    pub fn slug(&self) -> ConnectionSlug {
        ConnectionSlug::new(&self.host, self.port)
    }

    #[must_use]
    pub fn title(&self) -> String {
        connection_title(&self.alias, &self.host, self.port)
    }
}

/// One connected digitalSTROM server and its entities.
pub struct DigitalStromIntegration<C, L, S, P> {
    params: ConnectionParams,
    slug: ConnectionSlug,
    title: String,
    ctx: Arc<EntityContext<C, S, P>>,
    listener: L,
    entities: BTreeMap<EntityId, EntityAdapter<C, S, P>>,
    toggles: Vec<Arc<ToggleEntity<C, S, P>>>,
    dispatcher: Mutex<Option<JoinHandle<()>>>,
}

impl<C, L, S, P> DigitalStromIntegration<C, L, S, P>
where
    C: SceneClient + 'static,
    L: EventSource,
    S: StateRepository + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    /// Connect to the server and build every entity.
    ///
    /// # Errors
    ///
    /// - [`DsBridgeError::Configuration`] when no app token is configured or
    ///   the server rejects it. Retrying will not help.
    /// - [`DsBridgeError::NotReady`] when authentication or fetching scenes
    ///   failed for any other reason, after one retry for transient errors.
    ///   The caller should reschedule setup.
    pub async fn setup(
        params: ConnectionParams,
        client: C,
        listener: L,
        store: S,
        publisher: P,
    ) -> Result<Self, DsBridgeError> {
        let token = params
            .token
            .as_deref()
            .filter(|token| !token.is_empty())
            .ok_or(ConfigurationError::MissingToken)?;

        tracing::info!(host = %params.host, port = params.port, "setting up digitalSTROM server");
        with_retry(&params, "authenticate", || client.authenticate(token)).await?;
        let registry = with_retry(&params, "fetch scenes", || client.fetch_scenes()).await?;
        tracing::debug!(host = %params.host, scenes = registry.len(), "scene registry fetched");

        let ctx = Arc::new(EntityContext::new(client, store, publisher));
        let discovery = discover(&registry);

        let mut entities = BTreeMap::new();
        let mut toggles = Vec::new();
        for pairing in discovery.pairings() {
            let entity = Arc::new(ToggleEntity::restore(pairing.clone(), Arc::clone(&ctx)).await?);
            toggles.push(Arc::clone(&entity));
            entities.insert(entity.id().clone(), EntityAdapter::Toggle(entity));
        }
        for scene in &discovery.scenes {
            let entity = Arc::new(SceneEntity::new(scene.clone(), Arc::clone(&ctx))?);
            entities.insert(entity.id().clone(), EntityAdapter::Scene(entity));
        }

        for adapter in entities.values() {
            let snapshot = adapter.snapshot();
            tracing::debug!(entity_id = %snapshot.id, class = %snapshot.class, "adding entity");
            let event = Event::new(
                EventType::EntityRegistered,
                Some(snapshot.id.clone()),
                serde_json::json!({
                    "class": snapshot.class,
                    "name": snapshot.name,
                    "state": snapshot.state,
                }),
            );
            if let Err(err) = ctx.publisher.publish(event).await {
                tracing::warn!(entity_id = %snapshot.id, error = %err, "failed to publish entity registration");
            }
        }

        tracing::info!(
            host = %params.host,
            lights = discovery.lights.len(),
            covers = discovery.covers.len(),
            switches = discovery.switches.len(),
            scenes = discovery.scenes.len(),
            "digitalSTROM server ready"
        );

        Ok(Self {
            slug: params.slug(),
            title: params.title(),
            params,
            ctx,
            listener,
            entities,
            toggles,
            dispatcher: Mutex::new(None),
        })
    }

    #[must_use]
    pub fn params(&self) -> &ConnectionParams {
        &self.params
    }

    /// Live adapter of an entity.
    #[must_use]
    pub fn adapter(&self, id: &EntityId) -> Option<&EntityAdapter<C, S, P>> {
        self.entities.get(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Whether the listener and outbound stack are running.
    pub async fn is_running(&self) -> bool {
        self.dispatcher.lock().await.is_some()
    }
}

impl<C, L, S, P> Integration for DigitalStromIntegration<C, L, S, P>
where
    C: SceneClient + 'static,
    L: EventSource,
    S: StateRepository + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    fn slug(&self) -> &ConnectionSlug {
        &self.slug
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn entities(&self) -> Vec<Entity> {
        self.entities.values().map(EntityAdapter::snapshot).collect()
    }

    fn entity(&self, id: &EntityId) -> Result<Entity, DsBridgeError> {
        self.entities
            .get(id)
            .map(EntityAdapter::snapshot)
            .ok_or_else(|| not_found(id))
    }

    async fn handle_service_call(
        &self,
        entity_id: &EntityId,
        service: Service,
    ) -> Result<Entity, DsBridgeError> {
        let adapter = self.entities.get(entity_id).ok_or_else(|| not_found(entity_id))?;
        tracing::debug!(entity_id = %entity_id, service = %service, "handling service call");
        adapter.handle(service).await
    }

    async fn start(&self) -> Result<(), DsBridgeError> {
        let mut dispatcher = self.dispatcher.lock().await;
        if dispatcher.is_some() {
            tracing::debug!(host = %self.params.host, "already running");
            return Ok(());
        }

        let (sender, receiver) = mpsc::channel(EVENT_BUFFER);
        let handle = tokio::spawn(EventDispatcher::new(self.toggles.clone()).run(receiver));

        if let Err(err) = self.listener.start(sender).await {
            handle.abort();
            return Err(err);
        }
        if let Err(err) = self.ctx.client.start().await {
            if let Err(stop_err) = self.listener.stop().await {
                tracing::warn!(host = %self.params.host, error = %stop_err, "failed to stop listener");
            }
            handle.abort();
            return Err(err);
        }

        *dispatcher = Some(handle);
        tracing::info!(host = %self.params.host, "loops started");
        Ok(())
    }

    async fn stop(&self) -> Result<(), DsBridgeError> {
        let mut dispatcher = self.dispatcher.lock().await;
        let Some(handle) = dispatcher.take() else {
            return Ok(());
        };

        let stack = self.ctx.client.stop().await;
        let listener = self.listener.stop().await;
        handle.abort();
        tracing::info!(host = %self.params.host, "loops stopped");
        stack.and(listener)
    }
}

fn not_found(id: &EntityId) -> DsBridgeError {
    NotFoundError {
        entity: "Entity",
        id: id.to_string(),
    }
    .into()
}

fn not_ready(params: &ConnectionParams, source: DsBridgeError) -> DsBridgeError {
    NotReadyError {
        host: params.host.clone(),
        source: Box::new(source),
    }
    .into()
}

/// Run `op`, retrying once after `retry_delay` if it fails transiently.
///
/// Configuration errors are returned as is. Any other failure left after
/// that is reported as not ready.
async fn with_retry<T, F, Fut>(
    params: &ConnectionParams,
    step: &'static str,
    mut op: F,
) -> Result<T, DsBridgeError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DsBridgeError>>,
{
    let err = match op().await {
        Ok(value) => return Ok(value),
        Err(err) if err.is_transient() => err,
        Err(err) => return Err(settle(params, err)),
    };
    tracing::warn!(
        host = %params.host,
        step,
        error = %err,
        retry_in_ms = u64::try_from(params.retry_delay.as_millis()).unwrap_or(u64::MAX),
        "digitalSTROM server unreachable, retrying"
    );
    tokio::time::sleep(params.retry_delay).await;
    op().await.map_err(|err| settle(params, err))
}

fn settle(params: &ConnectionParams, err: DsBridgeError) -> DsBridgeError {
    match err {
        DsBridgeError::Configuration(_) => err,
        err => not_ready(params, err),
    }
}
