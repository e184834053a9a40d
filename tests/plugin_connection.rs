//! Integration tests for the plugin socket client against a mock plugin.

mod common;

use std::time::Duration;

use serde_json::json;

use common::{closed_port, MockPlugin, Reply};
use rhino_grasshopper_mcp::plugin::{PluginConnection, PluginError};

fn connect(mock: &MockPlugin, timeout: Duration) -> PluginConnection {
    PluginConnection::new("Rhino", "127.0.0.1", mock.port(), timeout)
}

// =============================================================================
// Successful exchanges
// =============================================================================

#[test]
fn test_single_chunk_response() {
    let mock = MockPlugin::start(vec![Reply::success(json!({"id": "abc-123"}))]);
    let conn = connect(&mock, Duration::from_secs(2));

    let result = conn
        .send_command("get_object_info", json!({"id": "abc-123"}))
        .unwrap();

    assert_eq!(result, json!({"id": "abc-123"}));
    assert!(conn.is_connected());
    assert_eq!(
        mock.commands(),
        vec![json!({"type": "get_object_info", "params": {"id": "abc-123"}})]
    );
}

#[test]
fn test_null_params_sent_as_empty_object() {
    let mock = MockPlugin::start(vec![Reply::success(json!({}))]);
    let conn = connect(&mock, Duration::from_secs(2));

    conn.send_command("get_document_summary", serde_json::Value::Null)
        .unwrap();

    assert_eq!(
        mock.commands(),
        vec![json!({"type": "get_document_summary", "params": {}})]
    );
}

#[test]
fn test_large_response_in_many_chunks() {
    let objects: Vec<_> = (0..2000)
        .map(|i| json!({"id": format!("obj-{i}"), "name": "Wall {segment}", "layer": "Walls"}))
        .collect();
    let result = json!({"objects": objects, "total_matching": 2000});

    let mock = MockPlugin::start(vec![Reply::success_in_pieces(result.clone(), 9)]);
    let conn = connect(&mock, Duration::from_secs(5));

    assert_eq!(conn.send_command("get_objects", json!({})).unwrap(), result);
}

#[test]
fn test_connection_reused_across_commands() {
    let mock = MockPlugin::start(vec![
        Reply::success(json!({"step": 1})),
        Reply::success(json!({"step": 2})),
    ]);
    let conn = connect(&mock, Duration::from_secs(2));

    assert_eq!(conn.send_command("undo", json!({})).unwrap(), json!({"step": 1}));
    assert_eq!(conn.send_command("redo", json!({})).unwrap(), json!({"step": 2}));
    assert_eq!(mock.connections(), 1);
}

// =============================================================================
// Failures
// =============================================================================

#[test]
fn test_remote_error_keeps_socket() {
    let mock = MockPlugin::start(vec![
        Reply::error("Object not found"),
        Reply::success(json!({"ok": true})),
    ]);
    let conn = connect(&mock, Duration::from_secs(2));

    let err = conn
        .send_command("get_object_info", json!({"id": "missing"}))
        .unwrap_err();
    assert!(matches!(err, PluginError::Remote { .. }));
    assert_eq!(err.to_string(), "Object not found");
    assert!(conn.is_connected());

    conn.send_command("get_document_summary", json!({})).unwrap();
    assert_eq!(mock.connections(), 1);
}

#[test]
fn test_structured_error_message_keeps_socket() {
    let mock = MockPlugin::start(vec![
        Reply::json(&json!({"status": "error", "message": {"code": 3}})),
        Reply::success(json!({"ok": true})),
    ]);
    let conn = connect(&mock, Duration::from_secs(2));

    let err = conn.send_command("get_parameter_value", json!({"nickname": "A"})).unwrap_err();
    assert!(matches!(err, PluginError::Remote { .. }), "{err:?}");
    assert_eq!(err.to_string(), r#"{"code":3}"#);
    assert!(conn.is_connected());

    conn.send_command("run_solution", json!({})).unwrap();
    assert_eq!(mock.connections(), 1);
}

#[test]
fn test_timeout_drops_socket_then_reconnects() {
    let mock = MockPlugin::start(vec![Reply::Silent, Reply::success(json!({"ok": true}))]);
    let conn = connect(&mock, Duration::from_millis(300));

    let err = conn.send_command("run_solution", json!({})).unwrap_err();
    assert!(matches!(err, PluginError::Timeout { .. }), "{err:?}");
    assert!(err.to_string().contains("try simplifying your request"));
    assert!(!conn.is_connected());

    assert_eq!(
        conn.send_command("run_solution", json!({})).unwrap(),
        json!({"ok": true})
    );
    assert_eq!(mock.connections(), 2);
}

#[test]
fn test_close_without_data_is_empty_response() {
    let mock = MockPlugin::start(vec![Reply::Close]);
    let conn = connect(&mock, Duration::from_secs(2));

    let err = conn.send_command("get_canvas_state", json!({})).unwrap_err();
    assert!(matches!(err, PluginError::EmptyResponse { .. }), "{err:?}");
    assert!(!conn.is_connected());
}

#[test]
fn test_close_mid_document_is_malformed() {
    let mock = MockPlugin::start(vec![Reply::Truncated(
        br#"{"status": "success", "result": {"na"#.to_vec(),
    )]);
    let conn = connect(&mock, Duration::from_secs(2));

    let err = conn.send_command("get_canvas_state", json!({})).unwrap_err();
    assert!(matches!(err, PluginError::MalformedResponse { .. }), "{err:?}");
    assert!(!conn.is_connected());
}

#[test]
fn test_not_connected_when_nothing_listens() {
    let conn = PluginConnection::new(
        "Grasshopper",
        "127.0.0.1",
        closed_port(),
        Duration::from_millis(500),
    );

    let err = conn.send_command("run_solution", json!({})).unwrap_err();
    assert!(matches!(err, PluginError::NotConnected { .. }), "{err:?}");
    assert!(err
        .to_string()
        .contains("Make sure the Grasshopper plugin is running"));
    assert!(!conn.is_connected());
}

#[test]
fn test_disconnect_is_idempotent() {
    let mock = MockPlugin::start(vec![Reply::success(json!({}))]);
    let conn = connect(&mock, Duration::from_secs(2));

    conn.connect().unwrap();
    assert!(conn.is_connected());
    conn.disconnect();
    conn.disconnect();
    assert!(!conn.is_connected());
}
