//! In-memory fakes shared by the town integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use covey_protocol::{ConversationArea, Player, PlayerId, TownId};
use covey_session::{LocalVideoTokens, SessionError, VideoTokenProvider};
use covey_town::{TownController, TownHandle, TownListener};
use tokio::sync::Notify;

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Joined(PlayerId),
    Moved(PlayerId, f64, f64),
    Disconnected(PlayerId),
    TownDestroyed,
    AreaUpdated(String, Vec<PlayerId>),
    AreaDestroyed(String),
}

/// Records every callback it receives.
#[derive(Default)]
pub struct RecordingListener {
    events: Mutex<Vec<Event>>,
}

impl RecordingListener {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Returns and clears the recorded events.
    pub fn take(&self) -> Vec<Event> {
        std::mem::take(&mut *self.events.lock().unwrap())
    }

    fn push(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }
}

impl TownListener for RecordingListener {
    fn on_player_joined(&self, player: &Player) {
        self.push(Event::Joined(player.id.clone()));
    }

    fn on_player_moved(&self, player: &Player) {
        self.push(Event::Moved(player.id.clone(), player.location.x, player.location.y));
    }

    fn on_player_disconnected(&self, player: &Player) {
        self.push(Event::Disconnected(player.id.clone()));
    }

    fn on_town_destroyed(&self) {
        self.push(Event::TownDestroyed);
    }

    fn on_conversation_area_updated(&self, area: &ConversationArea) {
        self.push(Event::AreaUpdated(area.label.clone(), area.occupants_by_id.clone()));
    }

    fn on_conversation_area_destroyed(&self, area: &ConversationArea) {
        self.push(Event::AreaDestroyed(area.label.clone()));
    }
}

/// Panics on every callback.
pub struct PanickingListener;

impl TownListener for PanickingListener {
    fn on_player_joined(&self, _: &Player) {
        panic!("listener failure");
    }

    fn on_player_moved(&self, _: &Player) {
        panic!("listener failure");
    }

    fn on_player_disconnected(&self, _: &Player) {
        panic!("listener failure");
    }

    fn on_town_destroyed(&self) {
        panic!("listener failure");
    }

    fn on_conversation_area_updated(&self, _: &ConversationArea) {
        panic!("listener failure");
    }

    fn on_conversation_area_destroyed(&self, _: &ConversationArea) {
        panic!("listener failure");
    }
}

/// A video provider that is always down.
pub struct FailingVideo;

impl VideoTokenProvider for FailingVideo {
    async fn token_for_town(
        &self,
        _town_id: &TownId,
        _player_id: &PlayerId,
    ) -> Result<String, SessionError> {
        Err(SessionError::VideoToken("provider unavailable".into()))
    }
}

/// Holds back the video token for one town until [`release`](Self::release)
/// is called. Other towns get theirs at once.
pub struct GatedVideo {
    town_id: TownId,
    gate: Notify,
}

impl GatedVideo {
    pub fn new(town_id: &str) -> Arc<Self> {
        Arc::new(Self {
            town_id: TownId::from(town_id),
            gate: Notify::new(),
        })
    }

    pub fn release(&self) {
        self.gate.notify_one();
    }
}

impl VideoTokenProvider for GatedVideo {
    async fn token_for_town(
        &self,
        town_id: &TownId,
        player_id: &PlayerId,
    ) -> Result<String, SessionError> {
        if *town_id == self.town_id {
            self.gate.notified().await;
        }
        Ok(format!("video-{town_id}-{player_id}"))
    }
}

/// Waits until `player_id` is registered in `town`.
pub async fn wait_for_player<V: VideoTokenProvider>(town: &TownHandle<V>, player_id: &PlayerId) {
    let registered = async {
        loop {
            if town.lock().await.player(player_id).is_some() {
                return;
            }
            tokio::task::yield_now().await;
        }
    };
    tokio::time::timeout(Duration::from_secs(2), registered)
        .await
        .expect("player should be registered while its video token is pending");
}

pub fn town() -> TownController<LocalVideoTokens> {
    TownController::new(
        TownId::from("T1"),
        "Test Town",
        true,
        50,
        Arc::new(LocalVideoTokens),
    )
}

pub fn player(id: &str) -> Player {
    Player::new(PlayerId::from(id), format!("user-{id}"))
}

pub fn pid(id: &str) -> PlayerId {
    PlayerId::from(id)
}
