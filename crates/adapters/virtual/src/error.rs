//! Simulated server error types.

use dsbridge_domain::error::{ConfigurationError, DsBridgeError, NotFoundError};
use dsbridge_domain::scene::SceneKey;

/// Errors raised by [`VirtualServer`](crate::VirtualServer).
#[derive(Debug, thiserror::Error)]
pub enum VirtualError {
    /// Injected failure, see [`VirtualServer::fail_next`](crate::VirtualServer::fail_next).
    #[error("simulated server unreachable")]
    Unreachable,

    #[error("no session, authenticate first")]
    NoSession,

    #[error("app token rejected")]
    InvalidToken,

    #[error("unknown scene {0}")]
    UnknownScene(SceneKey),

    #[error("outbound stack closed")]
    StackClosed,
}

impl VirtualError {
    /// Convert into the matching [`DsBridgeError`] for propagation across
    /// port boundaries.
    #[must_use]
    pub fn into_domain(self) -> DsBridgeError {
        match self {
            Self::InvalidToken => ConfigurationError::InvalidToken.into(),
            Self::UnknownScene(key) => NotFoundError {
                entity: "Scene",
                id: key.to_string(),
            }
            .into(),
            other => DsBridgeError::Communication(Box::new(other)),
        }
    }
}

impl From<VirtualError> for DsBridgeError {
    fn from(err: VirtualError) -> Self {
        err.into_domain()
    }
}
