//! Integration tests for the town registry: creation, listing, and
//! password-gated update and delete.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{Event, GatedVideo, RecordingListener, pid, player, wait_for_player};
use covey_protocol::TownId;
use covey_session::LocalVideoTokens;
use covey_town::{DEFAULT_CAPACITY, TownConfig, TownController, TownError, TownRegistry};

fn registry() -> TownRegistry<LocalVideoTokens> {
    TownRegistry::new(TownConfig::default(), Arc::new(LocalVideoTokens))
}

/// Creates a town and returns its ID and update password.
async fn create(
    registry: &TownRegistry<LocalVideoTokens>,
    name: &str,
    public: bool,
) -> (TownId, String) {
    let handle = registry.create_town(name, public).await;
    let town = handle.lock().await;
    (town.town_id().clone(), town.update_password().to_owned())
}

#[tokio::test]
async fn test_create_town_generates_id_and_password() {
    let registry = registry();
    let (id, password) = create(&registry, "Lobby", true).await;

    assert_eq!(id.as_str().len(), 8);
    assert_eq!(password.len(), 24);

    let handle = registry.get_controller_for_town(&id).await.unwrap();
    let town = handle.lock().await;
    assert_eq!(town.friendly_name(), "Lobby");
    assert_eq!(town.capacity(), DEFAULT_CAPACITY);
}

#[tokio::test]
async fn test_unknown_town_is_not_found() {
    let registry = registry();
    assert!(registry
            .get_controller_for_town(&TownId::from("NOPE"))
            .await
            .is_none());
}

#[tokio::test]
async fn test_demo_town_gets_its_name_as_id_once() {
    let config = TownConfig {
        demo_town_id: Some("DemoTown".into()),
        ..TownConfig::default()
    };
    let registry = TownRegistry::new(config, Arc::new(LocalVideoTokens));

    let (first, _) = create(&registry, "DemoTown", false).await;
    let (second, _) = create(&registry, "DemoTown", false).await;
    let (other, _) = create(&registry, "Elsewhere", false).await;

    assert_eq!(first, TownId::from("DemoTown"));
    assert_ne!(second, first);
    assert_ne!(other.as_str(), "Elsewhere");
    assert_eq!(registry.len().await, 3);
}

#[tokio::test]
async fn test_get_towns_lists_public_towns_with_listener_occupancy() {
    let registry = registry();
    let (public_id, _) = create(&registry, "Public", true).await;
    create(&registry, "Private", false).await;

    {
        let handle = registry.get_controller_for_town(&public_id).await.unwrap();
        let mut town = handle.lock().await;
        town.add_player(player("p1")).await.unwrap();
        town.add_player(player("p2")).await.unwrap();
        town.add_town_listener(RecordingListener::new());
    }

    let towns = registry.get_towns().await;
    assert_eq!(towns.len(), 1);
    assert_eq!(towns[0].town_id, public_id);
    assert_eq!(towns[0].friendly_name, "Public");
    assert_eq!(towns[0].current_occupancy, 1);
    assert_eq!(towns[0].maximum_occupancy, DEFAULT_CAPACITY);
}

#[tokio::test]
async fn test_update_town_with_wrong_password_changes_nothing() {
    let registry = registry();
    let (id, _) = create(&registry, "Lobby", true).await;

    assert!(
        !registry
            .update_town(&id, "wrong", Some("Hacked".into()), Some(false))
            .await
    );

    let handle = registry.get_controller_for_town(&id).await.unwrap();
    let town = handle.lock().await;
    assert_eq!(town.friendly_name(), "Lobby");
    assert!(town.is_publicly_listed());
}

#[tokio::test]
async fn test_update_town_applies_partial_changes() {
    let registry = registry();
    let (id, password) = create(&registry, "Lobby", true).await;

    assert!(registry.update_town(&id, &password, None, Some(false)).await);
    assert!(
        registry
            .update_town(&id, &password, Some("Atrium".into()), None)
            .await
    );

    let handle = registry.get_controller_for_town(&id).await.unwrap();
    let town = handle.lock().await;
    assert_eq!(town.friendly_name(), "Atrium");
    assert!(!town.is_publicly_listed());
}

#[tokio::test]
async fn test_update_town_rejects_empty_name() {
    let registry = registry();
    let (id, password) = create(&registry, "Lobby", true).await;

    let err = registry
        .try_update_town(&id, &password, Some(String::new()), Some(false))
        .await
        .unwrap_err();
    assert!(matches!(err, TownError::Validation(_)));

    let handle = registry.get_controller_for_town(&id).await.unwrap();
    let town = handle.lock().await;
    assert_eq!(town.friendly_name(), "Lobby");
    assert!(town.is_publicly_listed(), "flag must not be half-applied");
}

#[tokio::test]
async fn test_master_password_unlocks_every_town() {
    let config = TownConfig {
        master_password: Some("open-sesame".into()),
        ..TownConfig::default()
    };
    let registry = TownRegistry::new(config, Arc::new(LocalVideoTokens));
    let (id, _) = create(&registry, "Lobby", true).await;

    assert!(
        registry
            .update_town(&id, "open-sesame", Some("Renamed".into()), None)
            .await
    );
    assert!(registry.delete_town(&id, "open-sesame").await);
    assert!(registry.is_empty().await);
}

#[tokio::test]
async fn test_update_or_delete_unknown_town() {
    let registry = registry();
    let missing = TownId::from("MISSING1");

    let err = registry
        .try_update_town(&missing, "pw", None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, TownError::TownNotFound(_)));

    let err = registry.try_delete_town(&missing, "pw").await.unwrap_err();
    assert!(matches!(err, TownError::TownNotFound(_)));
}

#[tokio::test]
async fn test_delete_town_with_wrong_password_keeps_town() {
    let registry = registry();
    let (id, _) = create(&registry, "Lobby", true).await;
    let listener = RecordingListener::new();
    registry
        .get_controller_for_town(&id)
        .await
        .unwrap()
        .lock()
        .await
        .add_town_listener(listener.clone());

    let err = registry.try_delete_town(&id, "wrong").await.unwrap_err();
    assert!(matches!(err, TownError::Unauthorized(_)));
    assert!(registry.get_controller_for_town(&id).await.is_some());
    assert!(listener.take().is_empty());
}

#[tokio::test]
async fn test_delete_town_notifies_listeners_then_removes() {
    let registry = registry();
    let (id, password) = create(&registry, "Lobby", true).await;
    let (other, _) = create(&registry, "Other", true).await;
    let listener = RecordingListener::new();
    registry
        .get_controller_for_town(&id)
        .await
        .unwrap()
        .lock()
        .await
        .add_town_listener(listener.clone());

    assert!(registry.delete_town(&id, &password).await);

    assert_eq!(listener.take(), vec![Event::TownDestroyed]);
    assert!(registry.get_controller_for_town(&id).await.is_none());
    assert!(registry.get_controller_for_town(&other).await.is_some());
    assert!(!registry.delete_town(&id, &password).await);
}

#[tokio::test]
async fn test_pending_video_token_does_not_stall_other_towns() {
    let config = TownConfig {
        demo_town_id: Some("SLOW".into()),
        ..TownConfig::default()
    };
    let video = GatedVideo::new("SLOW");
    let registry = TownRegistry::new(config, Arc::clone(&video));
    let slow = registry.create_town("SLOW", true).await;
    let fast = registry.create_town("Fast", true).await;

    let pending = tokio::spawn({
        let slow = Arc::clone(&slow);
        async move { TownController::join(&slow, player("p1")).await }
    });
    wait_for_player(&slow, &pid("p1")).await;

    let limit = Duration::from_secs(2);
    let listed = tokio::time::timeout(limit, registry.get_towns())
        .await
        .expect("listing must not wait for a pending join");
    assert_eq!(listed.len(), 2);

    let joined = tokio::time::timeout(limit, TownController::join(&fast, player("p2")))
        .await
        .expect("join into another town must not wait")
        .unwrap();
    assert_eq!(joined.player_id(), &pid("p2"));

    tokio::time::timeout(limit, registry.create_town("Third", false))
        .await
        .expect("create must not wait");

    video.release();
    let session = pending.await.unwrap().unwrap();
    assert_eq!(session.video_token(), Some("video-SLOW-p1"));
}

#[tokio::test]
async fn test_concurrent_deletes_close_the_town_once() {
    let registry = Arc::new(registry());
    let (id, password) = create(&registry, "Lobby", true).await;
    let listener = RecordingListener::new();
    registry
        .get_controller_for_town(&id)
        .await
        .unwrap()
        .lock()
        .await
        .add_town_listener(listener.clone());

    let deletes: Vec<_> = (0..2)
        .map(|_| {
            let registry = Arc::clone(&registry);
            let id = id.clone();
            let password = password.clone();
            tokio::spawn(async move { registry.delete_town(&id, &password).await })
        })
        .collect();
    let mut succeeded = 0;
    for delete in deletes {
        if delete.await.unwrap() {
            succeeded += 1;
        }
    }

    assert_eq!(succeeded, 1);
    assert_eq!(listener.take(), vec![Event::TownDestroyed]);
    assert!(registry.is_empty().await);
}
