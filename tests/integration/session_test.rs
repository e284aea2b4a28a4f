// tests/integration/session_test.rs

use super::test_helpers::{spawn_peer, test_config};
use std::sync::{Arc, Mutex};
use trunkline::{AmiError, Manager, Message, MessageKind, PeerInfo};

/// A handler that records every dispatched event name, in order.
fn recording_handler(log: Arc<Mutex<Vec<String>>>) -> impl Fn(&str, &Message, &PeerInfo) {
    move |event: &str, _: &Message, _: &PeerInfo| {
        log.lock().unwrap().push(event.to_string());
    }
}

#[tokio::test]
async fn test_connect_logs_in_and_disconnect_logs_off() {
    let (port, peer) = spawn_peer(|mut peer| async move {
        peer.handle_login().await;
        let logoff = peer.expect_request().await;
        assert_eq!(logoff.get("Action"), Some("Logoff"));
        assert!(logoff.action_id().is_some());
        peer.expect_eof().await;
    })
    .await;

    let mut manager = Manager::new(test_config(port));
    assert!(!manager.is_connected());
    manager.connect().await.unwrap();
    assert!(manager.is_connected());
    assert!(manager.is_authenticated());

    manager.disconnect().await;
    assert!(!manager.is_connected());
    assert!(!manager.is_authenticated());
    peer.await.unwrap();
}

#[tokio::test]
async fn test_rejected_login_tears_the_connection_down() {
    let (port, peer) = spawn_peer(|mut peer| async move {
        peer.send_banner().await;
        let login = peer.expect_request().await;
        let id = login.action_id().unwrap().to_string();
        peer.send_fields(&[
            ("Response", "Error"),
            ("ActionID", &id),
            ("Message", "Authentication failed"),
        ])
        .await;
        // No logoff: the client was never authenticated.
        peer.expect_eof().await;
    })
    .await;

    let mut manager = Manager::new(test_config(port));
    let err = manager.connect().await.unwrap_err();
    assert_eq!(err, AmiError::Authentication("Authentication failed".into()));
    assert!(!manager.is_connected());
    assert!(!manager.is_authenticated());
    peer.await.unwrap();
}

#[tokio::test]
async fn test_correlation_skips_interleaved_events_and_foreign_responses() {
    let (port, peer) = spawn_peer(|mut peer| async move {
        peer.handle_login().await;
        let ping = peer.expect_request().await;
        assert_eq!(ping.get("Action"), Some("Ping"));
        let id = ping.action_id().unwrap().to_string();

        // Two unsolicited events and one foreign response arrive first.
        peer.send_fields(&[("Event", "Newchannel"), ("Channel", "SIP/7-1")])
            .await;
        peer.send_fields(&[("Event", "Hangup"), ("Channel", "SIP/7-1")])
            .await;
        peer.send_fields(&[("Response", "Success"), ("ActionID", "someone-else")])
            .await;
        peer.send_fields(&[("Response", "Success"), ("Ping", "Pong"), ("ActionID", &id)])
            .await;
    })
    .await;

    let dispatched = Arc::new(Mutex::new(Vec::new()));
    let mut manager = Manager::new(test_config(port));
    manager
        .register_event_handler("*", recording_handler(dispatched.clone()))
        .unwrap();
    manager.connect().await.unwrap();

    let pong = manager.ping().await.unwrap();
    assert_eq!(pong.get("Ping"), Some("Pong"));
    assert!(pong.is_success());

    // Each event was dispatched exactly once, in arrival order, before the
    // wait returned.
    assert_eq!(
        *dispatched.lock().unwrap(),
        vec!["newchannel".to_string(), "hangup".to_string()]
    );
    peer.await.unwrap();
}

#[tokio::test]
async fn test_list_response_aggregation() {
    let (port, peer) = spawn_peer(|mut peer| async move {
        peer.handle_login().await;
        let req = peer.expect_request().await;
        assert_eq!(req.get("Action"), Some("QueueStatus"));
        let id = req.action_id().unwrap().to_string();

        peer.send_fields(&[
            ("Response", "Success"),
            ("ActionID", &id),
            ("EventList", "start"),
            ("Message", "Queue status will follow"),
        ])
        .await;
        for member in ["agent-1", "agent-2", "agent-3"] {
            peer.send_fields(&[
                ("Event", "QueueMember"),
                ("ActionID", &id),
                ("Name", member),
            ])
            .await;
        }
        peer.send_fields(&[
            ("Event", "QueueStatusComplete"),
            ("ActionID", &id),
            ("EventList", "Complete"),
        ])
        .await;
    })
    .await;

    let mut manager = Manager::new(test_config(port));
    manager.connect().await.unwrap();

    let res = manager.queue_status(None).await.unwrap();
    assert_eq!(res.event_name(), Some("QueueStatusComplete"));
    assert!(res.is_list_complete());
    assert_eq!(res.events().len(), 3);
    let names: Vec<&str> = res
        .events()
        .iter()
        .map(|m| m.get("Name").unwrap())
        .collect();
    assert_eq!(names, vec!["agent-1", "agent-2", "agent-3"]);
    peer.await.unwrap();
}

#[tokio::test]
async fn test_list_response_past_configured_bound_is_a_protocol_error() {
    let (port, peer) = spawn_peer(|mut peer| async move {
        peer.handle_login().await;
        let req = peer.expect_request().await;
        let id = req.action_id().unwrap().to_string();

        peer.send_fields(&[("Response", "Success"), ("ActionID", &id), ("EventList", "start")])
            .await;
        for _ in 0..3 {
            peer.send_fields(&[("Event", "QueueMember"), ("ActionID", &id)])
                .await;
        }
    })
    .await;

    let mut config = test_config(port);
    config.limits.max_list_events = 2;
    let mut manager = Manager::new(config);
    manager.connect().await.unwrap();

    let err = manager.queue_status(None).await.unwrap_err();
    assert!(matches!(err, AmiError::Protocol(_)));
    peer.await.unwrap();
}

#[tokio::test]
async fn test_follows_response_payload() {
    let (port, peer) = spawn_peer(|mut peer| async move {
        peer.handle_login().await;
        let req = peer.expect_request().await;
        assert_eq!(req.get("Action"), Some("Command"));
        assert_eq!(req.get("Command"), Some("core show uptime"));
        let id = req.action_id().unwrap().to_string();

        let raw = format!(
            "Response: Follows\r\nActionID: {id}\r\nline1\nline2\n--END COMMAND--\r\n\r\n"
        );
        peer.send_raw(raw.as_bytes()).await;
    })
    .await;

    let mut manager = Manager::new(test_config(port));
    manager.connect().await.unwrap();

    let res = manager.command("core show uptime", None).await.unwrap();
    assert_eq!(res.data(), Some("line1\nline2"));
    peer.await.unwrap();
}

#[tokio::test]
async fn test_read_event_returns_after_dispatching() {
    let (port, peer) = spawn_peer(|mut peer| async move {
        peer.handle_login().await;
        peer.send_fields(&[("Event", "PeerStatus"), ("Peer", "SIP/7")])
            .await;
    })
    .await;

    let dispatched = Arc::new(Mutex::new(Vec::new()));
    let mut manager = Manager::new(test_config(port));
    manager
        .register_event_handler("PeerStatus", recording_handler(dispatched.clone()))
        .unwrap();
    manager.connect().await.unwrap();

    let msg = manager.read_event(false).await.unwrap();
    assert_eq!(msg.kind(), MessageKind::Event);
    assert_eq!(msg.get("Peer"), Some("SIP/7"));
    assert_eq!(*dispatched.lock().unwrap(), vec!["peerstatus".to_string()]);
    peer.await.unwrap();
}

#[tokio::test]
async fn test_peer_closing_mid_wait_surfaces_a_connection_error() {
    let (port, peer) = spawn_peer(|mut peer| async move {
        peer.handle_login().await;
        let ping = peer.expect_request().await;
        assert_eq!(ping.get("Action"), Some("Ping"));
        // Drop the connection without answering.
    })
    .await;

    let mut manager = Manager::new(test_config(port));
    manager.connect().await.unwrap();

    let err = manager.ping().await.unwrap_err();
    assert_eq!(err, AmiError::ConnectionClosed);
    peer.await.unwrap();
}

#[tokio::test]
async fn test_empty_block_mid_wait_is_a_protocol_error() {
    let (port, peer) = spawn_peer(|mut peer| async move {
        peer.handle_login().await;
        let ping = peer.expect_request().await;
        assert_eq!(ping.get("Action"), Some("Ping"));
        peer.send_raw(b"\r\n\r\n").await;
    })
    .await;

    let mut manager = Manager::new(test_config(port));
    manager.connect().await.unwrap();

    let err = manager.ping().await.unwrap_err();
    assert!(matches!(err, AmiError::Protocol(_)));
    peer.await.unwrap();
}

#[tokio::test]
async fn test_panicking_handler_does_not_break_the_wait() {
    let (port, peer) = spawn_peer(|mut peer| async move {
        peer.handle_login().await;
        let ping = peer.expect_request().await;
        let id = ping.action_id().unwrap().to_string();
        peer.send_fields(&[("Event", "Hangup"), ("Channel", "SIP/7-1")])
            .await;
        peer.send_fields(&[("Response", "Success"), ("Ping", "Pong"), ("ActionID", &id)])
            .await;
    })
    .await;

    let mut manager = Manager::new(test_config(port));
    manager
        .register_event_handler("Hangup", |_: &str, _: &Message, _: &PeerInfo| {
            panic!("handler blew up");
        })
        .unwrap();
    manager.connect().await.unwrap();

    let pong = manager.ping().await.unwrap();
    assert_eq!(pong.get("Ping"), Some("Pong"));
    peer.await.unwrap();
}

#[tokio::test]
async fn test_send_action_while_disconnected_fails() {
    let mut manager = Manager::new(test_config(5038));
    let err = manager.ping().await.unwrap_err();
    assert_eq!(err, AmiError::NotConnected);
}

#[tokio::test]
async fn test_caller_supplied_action_id_is_used_verbatim() {
    let (port, peer) = spawn_peer(|mut peer| async move {
        peer.handle_login().await;
        let req = peer.expect_request().await;
        assert_eq!(req.get("Action"), Some("Status"));
        assert_eq!(req.action_id(), Some("my-correlation-id"));
        peer.send_fields(&[("Response", "Success"), ("ActionID", "my-correlation-id")])
            .await;
    })
    .await;

    let mut manager = Manager::new(test_config(port));
    manager.connect().await.unwrap();

    let res = manager
        .status("SIP/7", Some("my-correlation-id"))
        .await
        .unwrap();
    assert!(res.is_success());
    peer.await.unwrap();
}
