use futures::executor::LocalPool;
use futures::task::LocalSpawnExt;

use super::*;
use crate::state::session::SessionMode;
use crate::test_support::{CONFIG_URL, EXCHANGE_URL, GUEST_URL, guest_ok, harness};

#[test]
fn fresh_start_without_bypass_settles_anonymous() {
    let mut pool = LocalPool::new();
    let spawner = pool.spawner();
    let h = harness();
    h.transport.reply(CONFIG_URL, 200, r#"{"session_auth_disabled":false}"#);

    let _notifier = spawn_background_tasks(&h.manager, |task| spawner.spawn_local(task).unwrap());
    pool.run_until_stalled();

    let snapshot = h.manager.snapshot();
    assert_eq!(snapshot.mode, SessionMode::Anonymous);
    assert!(snapshot.config_resolved);
}

#[test]
fn fresh_start_with_bypass_then_401_signs_out() {
    let mut pool = LocalPool::new();
    let spawner = pool.spawner();
    let h = harness();
    h.transport.reply(CONFIG_URL, 200, r#"{"session_auth_disabled":true}"#);

    let notifier = spawn_background_tasks(&h.manager, |task| spawner.spawn_local(task).unwrap());
    pool.run_until_stalled();
    assert_eq!(h.manager.mode(), SessionMode::Authenticated);
    assert_eq!(h.transport.calls_to(EXCHANGE_URL), 0);

    notifier.raise();
    pool.run_until_stalled();

    assert_eq!(h.manager.mode(), SessionMode::Anonymous);
    assert_eq!(h.transport.calls_to(GUEST_URL), 0);
}

#[test]
fn guest_401_through_spawned_bridge_renews() {
    let mut pool = LocalPool::new();
    let spawner = pool.spawner();
    let h = harness();
    h.transport.reply(CONFIG_URL, 200, "{}");
    h.transport.reply(crate::test_support::LOGOUT_URL, 200, "");
    h.transport.reply(GUEST_URL, 200, guest_ok());
    h.transport.reply(GUEST_URL, 200, guest_ok());

    let notifier = spawn_background_tasks(&h.manager, |task| spawner.spawn_local(task).unwrap());
    pool.run_until(h.manager.enter_guest_mode());
    notifier.raise();
    pool.run_until_stalled();

    assert_eq!(h.manager.mode(), SessionMode::Guest);
    assert_eq!(h.transport.calls_to(GUEST_URL), 2);
}
