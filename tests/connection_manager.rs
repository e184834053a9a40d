//! Integration tests for the shared plugin connection.

mod common;

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use serde_json::json;

use common::{closed_port, MockPlugin, Reply};
use rhino_grasshopper_mcp::bridge::BridgeKind;
use rhino_grasshopper_mcp::plugin::{
    ConnectionManager, ConnectionSettings, PluginClient, PluginError,
};

fn manager(kind: BridgeKind, port: u16) -> ConnectionManager {
    ConnectionManager::new(ConnectionSettings {
        plugin: kind.plugin_name(),
        hint: kind.connect_hint(),
        host: "127.0.0.1".to_string(),
        port,
        timeout: Duration::from_secs(2),
    })
}

#[test]
fn test_concurrent_callers_share_one_connection() {
    let mock = MockPlugin::start(vec![Reply::success(json!({"ok": true}))]);
    let manager = Arc::new(manager(BridgeKind::Rhino, mock.port()));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let manager = Arc::clone(&manager);
            thread::spawn(move || manager.get_connection().unwrap())
        })
        .collect();
    let connections: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    for connection in &connections[1..] {
        assert!(Arc::ptr_eq(&connections[0], connection));
    }

    // A round trip guarantees the mock has accepted everything it is going to.
    manager.send_command("get_document_summary", json!({})).unwrap();
    assert_eq!(mock.connections(), 1);
}

#[test]
fn test_cleanup_then_reconnect() {
    let mock = MockPlugin::start(vec![
        Reply::success(json!({"n": 1})),
        Reply::success(json!({"n": 2})),
    ]);
    let manager = manager(BridgeKind::Grasshopper, mock.port());

    assert!(!manager.has_connection());
    assert_eq!(
        manager.send_command("get_canvas_state", json!({})).unwrap(),
        json!({"n": 1})
    );
    assert!(manager.has_connection());

    manager.cleanup();
    manager.cleanup();
    assert!(!manager.has_connection());

    assert_eq!(
        manager.send_command("get_canvas_state", json!({})).unwrap(),
        json!({"n": 2})
    );
    assert_eq!(mock.connections(), 2);
}

#[test]
fn test_unavailable_plugin_carries_hint() {
    let manager = manager(BridgeKind::Grasshopper, closed_port());

    let err = manager.get_connection().unwrap_err();
    assert!(matches!(err, PluginError::Unavailable { .. }), "{err:?}");
    assert_eq!(
        err.to_string(),
        "Could not connect to Grasshopper. Make sure the Grasshopper plugin is running (GHMCPStart command)."
    );
    assert!(!manager.has_connection());

    // Nothing is cached after a failure.
    assert!(manager.get_connection().is_err());
}
