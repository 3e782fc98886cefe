//! One-shot startup probe for deployment auth settings.
//!
//! DESIGN
//! ======
//! `config_resolved` flips exactly once, whatever the probe outcome, so
//! diagnostics that depend on knowing whether bypass is on can wait for it.
//! The bypass auto-login it may trigger re-checks the live mode, so a guest
//! choice made before the probe lands is kept.

#[cfg(test)]
#[path = "config_probe_test.rs"]
mod config_probe_test;

use crate::session::manager::SessionManager;

/// Query `/config` once and resolve the manager's config state.
///
/// Later calls on the same manager are no-ops. Probe failures are logged and
/// resolve as "bypass off".
pub async fn run_config_probe(manager: &SessionManager) {
    if !manager.claim_probe() {
        log::debug!("config probe already ran");
        return;
    }

    let bypass = match manager.api().fetch_config().await {
        Ok(config) => config.bypass_enabled(),
        Err(e) => {
            log::warn!("config probe failed: {e}");
            false
        }
    };
    if bypass {
        log::info!("backend reports session auth disabled");
    }
    manager.resolve_config(bypass);
}
