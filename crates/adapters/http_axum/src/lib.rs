//! # dsbridge-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve a small JSON API over the configured servers and their entities
//!   (`/api/servers`, `/api/servers/{slug}/entities`, …)
//! - Forward service calls (`turn_on`, `turn_off`, `activate`) to the owning
//!   integration
//! - Stream bus events to clients as Server-Sent Events
//!
//! ## Dependency rule
//! Depends on `dsbridge-app` (for the integration port, registry and event
//! bus) and `dsbridge-domain` (for the types used in responses). Never leaks
//! axum types into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;
