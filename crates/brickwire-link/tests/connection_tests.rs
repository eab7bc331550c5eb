//! Connection manager lifecycle tests
//!
//! Drives the scan → connect state machine against the loopback transport,
//! covering discovery races, scan/connect failures, link loss and the
//! send gate.

use std::sync::Arc;
use std::time::Duration;

use brickwire_link::{
    event_channel, ConnectBehavior, ConnectionManager, ConnectionState, LinkConfig, LinkError,
    LoopbackTransport, PeerId, PeerMetadata, SendOutcome, TransportEvent, WireMessage,
};

// ----------------------------------------------------------------------------
// Test Utilities
// ----------------------------------------------------------------------------

fn create_test_link(
    transport: LoopbackTransport,
) -> (Arc<LoopbackTransport>, Arc<ConnectionManager>) {
    let transport = Arc::new(transport);
    let link = ConnectionManager::new(transport.clone(), LinkConfig::default());
    (transport, link)
}

/// Let spawned connect tasks run
async fn settle() {
    tokio::time::sleep(Duration::from_millis(10)).await;
}

async fn wait_for_state(link: &ConnectionManager, expected: ConnectionState) {
    let mut states = link.subscribe();
    let reached = matches!(
        tokio::time::timeout(
            Duration::from_secs(5),
            states.wait_for(|state| *state == expected),
        )
        .await,
        Ok(Ok(_))
    );
    if !reached {
        panic!("link never reached {expected}, stuck in {}", link.state().await);
    }
}

// ----------------------------------------------------------------------------
// State Machine Tests
// ----------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn test_new_link_is_disconnected() {
    let (tx, _rx) = event_channel();
    let (transport, link) = create_test_link(LoopbackTransport::new(tx));

    assert_eq!(link.state().await, ConnectionState::Disconnected);
    assert_eq!(link.peer().await, None);
    assert_eq!(transport.scan_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_scan_discover_connect() {
    let (tx, _rx) = event_channel();
    let (transport, link) = create_test_link(LoopbackTransport::new(tx));

    assert!(link.start_scan().await);
    assert_eq!(link.state().await, ConnectionState::Scanning);

    assert!(link.on_peer_discovered(PeerId::new("hub-1"), PeerMetadata::new()).await);
    wait_for_state(&link, ConnectionState::Connected).await;

    assert_eq!(transport.connect_calls(), 1);
    assert_eq!(link.peer().await, Some(PeerId::new("hub-1")));
}

#[tokio::test(start_paused = true)]
async fn test_discovery_while_connecting_is_ignored() {
    let (tx, _rx) = event_channel();
    let (transport, link) =
        create_test_link(LoopbackTransport::new(tx).with_connect_behavior(ConnectBehavior::Hold));

    link.start_scan().await;
    assert!(link.on_peer_discovered(PeerId::new("hub-1"), PeerMetadata::new()).await);
    assert!(!link.on_peer_discovered(PeerId::new("hub-2"), PeerMetadata::new()).await);
    settle().await;

    assert_eq!(link.state().await, ConnectionState::Connecting);
    assert_eq!(transport.connect_calls(), 1);
    assert_eq!(link.peer().await, Some(PeerId::new("hub-1")));

    transport.release_connect();
    wait_for_state(&link, ConnectionState::Connected).await;

    // Still ignored once connected
    assert!(!link.on_peer_discovered(PeerId::new("hub-3"), PeerMetadata::new()).await);
    settle().await;
    assert_eq!(transport.connect_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_discovery_before_scan_is_ignored() {
    let (tx, _rx) = event_channel();
    let (transport, link) = create_test_link(LoopbackTransport::new(tx));

    assert!(!link.on_peer_discovered(PeerId::new("hub-1"), PeerMetadata::new()).await);
    settle().await;

    assert_eq!(link.state().await, ConnectionState::Disconnected);
    assert_eq!(transport.connect_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_scan_failure_stays_disconnected() {
    let (tx, _rx) = event_channel();
    let (transport, link) =
        create_test_link(LoopbackTransport::new(tx).with_scan_error("adapter busy"));

    assert!(!link.start_scan().await);
    assert_eq!(link.state().await, ConnectionState::Disconnected);
    assert_eq!(transport.scan_calls(), 1);

    assert!(!link.on_peer_discovered(PeerId::new("hub-1"), PeerMetadata::new()).await);
    assert_eq!(transport.connect_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_connect_failure_reverts_without_rescan() {
    let (tx, _rx) = event_channel();
    let (transport, link) = create_test_link(
        LoopbackTransport::new(tx).with_connect_behavior(ConnectBehavior::Reject("refused".into())),
    );

    link.start_scan().await;
    link.on_peer_discovered(PeerId::new("hub-1"), PeerMetadata::new()).await;
    wait_for_state(&link, ConnectionState::Disconnected).await;

    assert_eq!(link.peer().await, None);
    assert_eq!(transport.scan_calls(), 1);

    // No peer, no rescan: later discoveries are dropped
    assert!(!link.on_peer_discovered(PeerId::new("hub-1"), PeerMetadata::new()).await);
    settle().await;
    assert_eq!(transport.connect_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_link_lost_before_acknowledgment() {
    let (tx, _rx) = event_channel();
    let (transport, link) =
        create_test_link(LoopbackTransport::new(tx).with_connect_behavior(ConnectBehavior::Hold));

    link.start_scan().await;
    link.on_peer_discovered(PeerId::new("hub-1"), PeerMetadata::new()).await;
    settle().await;

    link.on_link_lost("peer went away").await;
    assert_eq!(link.state().await, ConnectionState::Disconnected);

    // A late acknowledgment for the abandoned attempt changes nothing
    transport.release_connect();
    settle().await;
    assert_eq!(link.state().await, ConnectionState::Disconnected);
}

#[tokio::test(start_paused = true)]
async fn test_stale_connect_result_is_ignored() {
    let (tx, _rx) = event_channel();
    let (_transport, link) =
        create_test_link(LoopbackTransport::new(tx).with_connect_behavior(ConnectBehavior::Hold));

    link.start_scan().await;
    link.on_peer_discovered(PeerId::new("hub-1"), PeerMetadata::new()).await;

    link.on_connect_result(&PeerId::new("hub-2"), Ok(())).await;
    assert_eq!(link.state().await, ConnectionState::Connecting);
}

#[tokio::test(start_paused = true)]
async fn test_transitions_are_published() {
    let (tx, _rx) = event_channel();
    let (transport, link) =
        create_test_link(LoopbackTransport::new(tx).with_connect_behavior(ConnectBehavior::Hold));
    let mut states = link.subscribe();
    assert_eq!(*states.borrow_and_update(), ConnectionState::Disconnected);

    link.start_scan().await;
    assert!(states.has_changed().unwrap());
    assert_eq!(*states.borrow_and_update(), ConnectionState::Scanning);

    link.on_peer_discovered(PeerId::new("hub-1"), PeerMetadata::new()).await;
    assert_eq!(*states.borrow_and_update(), ConnectionState::Connecting);

    // Ignored discoveries publish nothing
    link.on_peer_discovered(PeerId::new("hub-2"), PeerMetadata::new()).await;
    assert!(!states.has_changed().unwrap());

    transport.release_connect();
    states.changed().await.unwrap();
    assert_eq!(*states.borrow_and_update(), ConnectionState::Connected);

    link.on_link_lost("out of range").await;
    assert_eq!(*states.borrow_and_update(), ConnectionState::Disconnected);
}

// ----------------------------------------------------------------------------
// Send Gate Tests
// ----------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn test_send_while_disconnected_never_reaches_transport() {
    let (tx, _rx) = event_channel();
    let (transport, link) = create_test_link(LoopbackTransport::new(tx));

    assert_eq!(link.send(&[0x01, 0x02, 0x03]).await, SendOutcome::Dropped);
    assert_eq!(
        link.send_message(WireMessage::base64("AQID")).await,
        SendOutcome::Dropped
    );
    assert_eq!(transport.send_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_send_while_connecting_is_dropped() {
    let (tx, _rx) = event_channel();
    let (transport, link) =
        create_test_link(LoopbackTransport::new(tx).with_connect_behavior(ConnectBehavior::Hold));

    link.start_scan().await;
    link.on_peer_discovered(PeerId::new("hub-1"), PeerMetadata::new()).await;

    assert_eq!(link.send(&[0x01]).await, SendOutcome::Dropped);
    assert_eq!(transport.send_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_send_when_connected_encodes_base64() {
    let (tx, _rx) = event_channel();
    let (transport, link) = create_test_link(LoopbackTransport::new(tx));

    link.start_scan().await;
    link.on_peer_discovered(PeerId::new("hub-1"), PeerMetadata::new()).await;
    wait_for_state(&link, ConnectionState::Connected).await;

    assert_eq!(link.send(&[0x01, 0x02, 0x03]).await, SendOutcome::Sent);
    assert_eq!(transport.sent_messages(), vec![WireMessage::base64("AQID")]);

    transport.set_send_fails(true);
    assert_eq!(link.send(&[0x04]).await, SendOutcome::Failed);
    assert_eq!(link.state().await, ConnectionState::Connected);
}

// ----------------------------------------------------------------------------
// Event Task Tests
// ----------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn test_spawned_link_scans_after_settle_delay() {
    let (tx, rx) = event_channel();
    let transport = Arc::new(LoopbackTransport::new(tx).with_simulated_hub("hub-1"));
    let config = LinkConfig::default().with_scan_settle_delay(Duration::from_millis(500));

    let (link, _task) = ConnectionManager::spawn(transport.clone(), rx, config);

    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(transport.scan_calls(), 0);
    assert_eq!(link.state().await, ConnectionState::Disconnected);

    wait_for_state(&link, ConnectionState::Connected).await;
    assert_eq!(transport.scan_calls(), 1);
    assert_eq!(transport.connect_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_events_processed_in_order() {
    let (tx, rx) = event_channel();
    let transport = Arc::new(
        LoopbackTransport::new(tx).with_connect_behavior(ConnectBehavior::Hold),
    );
    let config = LinkConfig::default().with_scan_settle_delay(Duration::ZERO);
    let (link, _task) = ConnectionManager::spawn(transport.clone(), rx, config);
    wait_for_state(&link, ConnectionState::Scanning).await;

    transport.discover("hub-1").unwrap();
    transport.discover("hub-2").unwrap();
    transport
        .emit(TransportEvent::MessageReceived {
            message: WireMessage::base64("AAAA"),
        })
        .unwrap();
    settle().await;

    assert_eq!(transport.connect_calls(), 1);
    assert_eq!(link.peer().await, Some(PeerId::new("hub-1")));

    transport.release_connect();
    wait_for_state(&link, ConnectionState::Connected).await;

    transport
        .emit(TransportEvent::LinkLost {
            reason: "out of range".into(),
        })
        .unwrap();
    wait_for_state(&link, ConnectionState::Disconnected).await;
    assert_eq!(transport.scan_calls(), 1);
}

#[tokio::test]
async fn test_emit_without_listener_reports_closed_channel() {
    let (tx, rx) = event_channel();
    let transport = LoopbackTransport::new(tx);
    drop(rx);

    assert_eq!(transport.discover("hub-1"), Err(LinkError::ChannelClosed));
    assert_eq!(
        transport.emit(TransportEvent::LinkLost {
            reason: "gone".into()
        }),
        Err(LinkError::ChannelClosed)
    );
}
