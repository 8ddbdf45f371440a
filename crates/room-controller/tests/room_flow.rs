//! End-to-end room lifecycle against the registry actor.
//!
//! Drives the full story one service instance sees: create a room,
//! admit a host, hold a candidate in the waiting set, approve it, lose
//! the host, and finally watch the empty room get reaped after the
//! grace period.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use room_controller::actors::{
    ConnectionHandle, JoinOutcome, RegistryMetrics, RoomRegistryHandle,
};
use room_controller::errors::RoomError;
use room_protocol::{ConnectionId, ServerEvent};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::Receiver;

fn registry() -> RoomRegistryHandle {
    RoomRegistryHandle::new(
        "rc-itest".to_string(),
        Duration::from_secs(60),
        RegistryMetrics::new(),
    )
}

fn connection(registry: &RoomRegistryHandle) -> (ConnectionHandle, Receiver<ServerEvent>) {
    ConnectionHandle::open(ConnectionId::new(), 32, registry.child_token())
}

async fn recv(rx: &mut Receiver<ServerEvent>) -> ServerEvent {
    tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("timed out waiting for event")
        .expect("event channel closed")
}

#[tokio::test(start_paused = true)]
async fn full_room_lifecycle() {
    let registry = registry();

    // Room is created out of band and its id shared with both clients.
    let room_id = registry.create_room().await.unwrap();

    // Alice connects first and is admitted directly as host, even
    // though she did not claim the role.
    let (alice, mut alice_rx) = connection(&registry);
    let outcome = registry
        .join_room(
            room_id,
            "alice".to_string(),
            "peer-alice".to_string(),
            false,
            alice.clone(),
        )
        .await
        .unwrap();
    assert_eq!(outcome, JoinOutcome::Host);
    assert_eq!(
        recv(&mut alice_rx).await,
        ServerEvent::HostStatus { is_host: true }
    );
    match recv(&mut alice_rx).await {
        ServerEvent::RoomParticipants { participants } => assert!(participants.is_empty()),
        other => panic!("expected empty roster, got {other:?}"),
    }

    // Bob arrives while Alice holds the host slot and is parked in the
    // waiting set; Alice is asked to decide.
    let (bob, mut bob_rx) = connection(&registry);
    let outcome = registry
        .join_room(
            room_id,
            "bob".to_string(),
            "peer-bob".to_string(),
            false,
            bob.clone(),
        )
        .await
        .unwrap();
    assert_eq!(outcome, JoinOutcome::Waiting);
    assert!(matches!(
        recv(&mut bob_rx).await,
        ServerEvent::WaitingForApproval { .. }
    ));
    assert_eq!(
        recv(&mut alice_rx).await,
        ServerEvent::JoinRequest {
            participant_id: bob.connection_id(),
            username: "bob".to_string(),
            peer_id: "peer-bob".to_string(),
        }
    );

    let info = registry.room_info(room_id).await.unwrap();
    assert_eq!(info.participant_count, 1);
    assert_eq!(info.waiting_count, 1);

    // Alice lets Bob in. Bob gets the grant plus a roster that shows
    // Alice; Alice sees Bob join.
    registry
        .approve_participant(room_id, alice.connection_id(), bob.connection_id())
        .await
        .unwrap();

    assert_eq!(recv(&mut bob_rx).await, ServerEvent::ApprovalGranted);
    match recv(&mut bob_rx).await {
        ServerEvent::RoomParticipants { participants } => {
            assert_eq!(participants.len(), 1);
            let alice_entry = participants.get(&alice.connection_id()).unwrap();
            assert_eq!(alice_entry.username, "alice");
            assert!(alice_entry.is_host);
        }
        other => panic!("expected roster with alice, got {other:?}"),
    }
    assert_eq!(
        recv(&mut alice_rx).await,
        ServerEvent::UserJoined {
            participant_id: bob.connection_id(),
            username: "bob".to_string(),
            peer_id: "peer-bob".to_string(),
        }
    );

    // Bob mutes himself; Alice sees the toggle.
    registry
        .toggle_media(
            room_id,
            bob.connection_id(),
            room_protocol::MediaKind::Audio,
            false,
        )
        .await
        .unwrap();
    assert_eq!(
        recv(&mut alice_rx).await,
        ServerEvent::UserToggleAudio {
            participant_id: bob.connection_id(),
            peer_id: "peer-bob".to_string(),
            enabled: false,
        }
    );

    // Alice drops. Bob stays joined but the room is host-less; nobody
    // inherits the role.
    registry.disconnect(alice.connection_id()).await.unwrap();
    assert_eq!(recv(&mut bob_rx).await, ServerEvent::HostLeft);

    let info = registry.room_info(room_id).await.unwrap();
    assert!(!info.has_host);
    assert_eq!(info.participant_count, 1);

    // Bob drops too. The room is empty but survives the grace period
    // window, then gets reaped.
    registry.disconnect(bob.connection_id()).await.unwrap();

    tokio::time::advance(Duration::from_secs(59)).await;
    assert!(registry.room_info(room_id).await.is_ok());

    tokio::time::advance(Duration::from_secs(2)).await;
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(matches!(
        registry.room_info(room_id).await,
        Err(RoomError::RoomNotFound)
    ));

    registry.cancel();
}

#[tokio::test(start_paused = true)]
async fn room_survives_grace_period_when_rejoined() {
    let registry = registry();
    let room_id = registry.create_room().await.unwrap();

    let (alice, mut alice_rx) = connection(&registry);
    registry
        .join_room(
            room_id,
            "alice".to_string(),
            "peer-alice".to_string(),
            true,
            alice.clone(),
        )
        .await
        .unwrap();
    let _ = recv(&mut alice_rx).await;
    let _ = recv(&mut alice_rx).await;
    registry.disconnect(alice.connection_id()).await.unwrap();

    // Halfway through the grace period somebody comes back.
    tokio::time::advance(Duration::from_secs(30)).await;
    let (carol, mut carol_rx) = connection(&registry);
    let outcome = registry
        .join_room(
            room_id,
            "carol".to_string(),
            "peer-carol".to_string(),
            false,
            carol.clone(),
        )
        .await
        .unwrap();
    assert_eq!(outcome, JoinOutcome::Host);
    let _ = recv(&mut carol_rx).await;
    let _ = recv(&mut carol_rx).await;

    // The original deletion timer fires against a repopulated room.
    tokio::time::advance(Duration::from_secs(120)).await;
    tokio::time::sleep(Duration::from_millis(10)).await;

    let info = registry.room_info(room_id).await.unwrap();
    assert_eq!(info.participant_count, 1);
    assert!(info.has_host);

    registry.cancel();
}

#[tokio::test]
async fn rejected_candidate_is_closed_and_never_joins() {
    let registry = registry();
    let room_id = registry.create_room().await.unwrap();

    let (host, mut host_rx) = connection(&registry);
    registry
        .join_room(
            room_id,
            "host".to_string(),
            "peer-host".to_string(),
            true,
            host.clone(),
        )
        .await
        .unwrap();
    let _ = recv(&mut host_rx).await;
    let _ = recv(&mut host_rx).await;

    let (mallory, mut mallory_rx) = connection(&registry);
    registry
        .join_room(
            room_id,
            "mallory".to_string(),
            "peer-mallory".to_string(),
            false,
            mallory.clone(),
        )
        .await
        .unwrap();
    let _ = recv(&mut mallory_rx).await;
    let _ = recv(&mut host_rx).await;

    registry
        .reject_participant(room_id, host.connection_id(), mallory.connection_id())
        .await
        .unwrap();

    // The rejection frame is queued before the force-close, so the
    // transport can still deliver it.
    assert!(matches!(
        recv(&mut mallory_rx).await,
        ServerEvent::ApprovalRejected { .. }
    ));
    assert!(mallory.is_closed());

    let info = registry.room_info(room_id).await.unwrap();
    assert_eq!(info.participant_count, 1);
    assert_eq!(info.waiting_count, 0);

    registry.cancel();
}
