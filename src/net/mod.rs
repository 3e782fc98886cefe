//! Networking modules for the session subsystem.
//!
//! SYSTEM CONTEXT
//! ==============
//! `transport` is the seam to the browser's HTTP stack, `api` applies each
//! auth endpoint's success contract, `types` defines the wire schema, and
//! `unauthorized` carries the transport's decoupled 401 notification.

pub mod api;
pub mod transport;
pub mod types;
pub mod unauthorized;
