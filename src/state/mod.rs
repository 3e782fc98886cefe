//! Application-facing session state.
//!
//! SYSTEM CONTEXT
//! ==============
//! `session` defines the snapshot data model; `context` exposes it to Leptos
//! components as a reactive signal.

pub mod context;
pub mod session;
