//! Session orchestration.
//!
//! SYSTEM CONTEXT
//! ==============
//! `manager` owns the snapshot and every mode transition. `config_probe` and
//! `bridge` are the two non-user triggers: the one-shot startup probe and the
//! standing unauthorized listener. `global` holds the page's one manager.

pub mod bridge;
pub mod config_probe;
pub mod global;
pub mod manager;
