//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into [`DsBridgeError`]
//! when crossing a port boundary.

/// Boxed error used for opaque adapter failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Top-level error shared by the domain, application and adapter layers.
#[derive(Debug, thiserror::Error)]
pub enum DsBridgeError {
    /// A domain invariant was violated.
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// A requested resource does not exist.
    #[error("not found")]
    NotFound(#[from] NotFoundError),

    /// Talking to the digitalSTROM server failed. Considered transient.
    #[error("communication error")]
    Communication(#[source] BoxError),

    /// The server could not be reached during setup, even after retrying.
    #[error("integration not ready")]
    NotReady(#[from] NotReadyError),

    /// Stored configuration is missing or rejected. Requires user action.
    #[error("configuration error")]
    Configuration(#[from] ConfigurationError),

    /// The persistence layer failed.
    #[error("storage error")]
    Storage(#[source] BoxError),
}

impl DsBridgeError {
    /// Wrap any error as a [`Communication`](Self::Communication) failure.
    pub fn communication(err: impl Into<BoxError>) -> Self {
        Self::Communication(err.into())
    }

    /// Whether a single retry may fix this error.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Communication(_))
    }
}

/// Domain validation failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("entity id must not be empty")]
    EmptyEntityId,

    #[error("unknown service {0:?}")]
    UnknownService(String),

    #[error("service {service} is not supported by {class} entities")]
    UnsupportedService {
        service: &'static str,
        class: &'static str,
    },
}

/// A lookup found nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// Setup could not complete because the server was unreachable.
///
/// The host is expected to reschedule setup later.
#[derive(Debug, thiserror::Error)]
#[error("digitalSTROM server at {host} is not ready")]
pub struct NotReadyError {
    pub host: String,
    #[source]
    pub source: Box<DsBridgeError>,
}

/// Errors that need the user to fix the stored configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("no app token configured, please set up the server again")]
    MissingToken,

    #[error("app token rejected by the server")]
    InvalidToken,

    #[error("server {0} is already configured")]
    AlreadyConfigured(String),
}
