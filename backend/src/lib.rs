//! Peer-to-peer lending tracker for physical game cartridges.
//!
//! The crate is laid out hexagonally:
//!
//! - [`domain`] holds the entities, the loan-lifecycle state machine, and
//!   the ports on both sides of the boundary.
//! - [`inbound`] contains the Actix HTTP adapters driving the domain.
//! - [`outbound`] contains the Diesel persistence and catalog adapters the
//!   domain drives.
//! - [`server`] wires the adapters into a running HTTP server.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
/// Request tracing middleware attaching a trace id to every request.
pub use middleware::Trace;
