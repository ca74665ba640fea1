//! The per-town state machine.
//!
//! A [`TownController`] owns everything that lives in one town: player
//! sessions, conversation areas and listeners. Every method runs to
//! completion against in-memory state, then fans the resulting events out
//! to the listeners. Only joining suspends, on the video-token request;
//! [`join`](TownController::join) does that with the town unlocked.
//!
//! # Conversation-area membership
//!
//! A player is in area *A* when their reported location names *A* by
//! label and *A* exists. Geometry only matters when an area is created
//! (players standing inside the new box are seeded into it) and for the
//! no-overlap rule. On every move:
//!
//! ```text
//! previous area ──leave──▶ (empty? destroyed : updated)
//! intended area ──enter──▶ updated
//! then: player moved
//! ```
//!
//! No conversation event fires when the area does not change. An area is
//! removed in the same step that takes away its last occupant.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use covey_protocol::{ConversationArea, Player, PlayerId, SessionToken, TownId, UserLocation};
use covey_session::{
    PlayerSession, SessionError, SessionManager, VideoTokenProvider, new_update_password,
};

use crate::{AreaRejection, ListenerId, TownError, TownHandle, TownListener};

/// One town.
pub struct TownController<V> {
    town_id: TownId,
    friendly_name: String,
    is_publicly_listed: bool,
    /// Generated once, never changes.
    update_password: String,
    capacity: usize,
    sessions: SessionManager,
    conversation_areas: Vec<ConversationArea>,
    listeners: Vec<(ListenerId, Arc<dyn TownListener>)>,
    next_listener_id: u64,
    video: Arc<V>,
}

impl<V: VideoTokenProvider> TownController<V> {
    /// Creates an empty town with a fresh update password.
    pub fn new(
        town_id: TownId,
        friendly_name: impl Into<String>,
        is_publicly_listed: bool,
        capacity: usize,
        video: Arc<V>,
    ) -> Self {
        Self {
            town_id,
            friendly_name: friendly_name.into(),
            is_publicly_listed,
            update_password: new_update_password(),
            capacity,
            sessions: SessionManager::new(),
            conversation_areas: Vec::new(),
            listeners: Vec::new(),
            next_listener_id: 1,
            video,
        }
    }

    pub fn town_id(&self) -> &TownId {
        &self.town_id
    }

    pub fn friendly_name(&self) -> &str {
        &self.friendly_name
    }

    pub fn set_friendly_name(&mut self, name: impl Into<String>) {
        self.friendly_name = name.into();
    }

    pub fn is_publicly_listed(&self) -> bool {
        self.is_publicly_listed
    }

    pub fn set_publicly_listed(&mut self, listed: bool) {
        self.is_publicly_listed = listed;
    }

    pub fn update_password(&self) -> &str {
        &self.update_password
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of registered listeners, i.e. live connections.
    pub fn occupancy(&self) -> usize {
        self.listeners.len()
    }

    /// Live players in join order.
    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.sessions.players()
    }

    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.sessions.player(id)
    }

    pub fn conversation_areas(&self) -> &[ConversationArea] {
        &self.conversation_areas
    }

    pub fn conversation_area(&self, label: &str) -> Option<&ConversationArea> {
        self.conversation_areas.iter().find(|a| a.label == label)
    }

    // -----------------------------------------------------------------------
    // Players and sessions
    // -----------------------------------------------------------------------

    /// Registers `player`, opens a session for it, fetches its video
    /// credential and announces it to every listener.
    ///
    /// This holds `&mut self` across the video-token request. Shared towns
    /// should go through [`join`](Self::join), which releases the lock
    /// while waiting.
    pub async fn add_player(&mut self, player: Player) -> Result<PlayerSession, TownError> {
        let player_id = player.id.clone();
        let session_token = self.register_player(player)?;
        let video_token = match self.video.token_for_town(&self.town_id, &player_id).await {
            Ok(token) => token,
            Err(source) => {
                return Err(join_incomplete(&self.town_id, player_id, session_token, source));
            }
        };
        self.complete_join(&player_id, &session_token, video_token)
    }

    /// Joins `player` to a shared town without holding its lock across the
    /// video-token request.
    ///
    /// The player and session are visible to other operations from the
    /// register step on. If the video credential cannot be issued nothing
    /// is rolled back and nothing is announced; the error carries the
    /// session token so the caller can destroy the session.
    pub async fn join(town: &TownHandle<V>, player: Player) -> Result<PlayerSession, TownError> {
        let player_id = player.id.clone();
        let (town_id, video, session_token) = {
            let mut controller = town.lock().await;
            let session_token = controller.register_player(player)?;
            (
                controller.town_id.clone(),
                Arc::clone(&controller.video),
                session_token,
            )
        };

        let video_token = match video.token_for_town(&town_id, &player_id).await {
            Ok(token) => token,
            Err(source) => {
                return Err(join_incomplete(&town_id, player_id, session_token, source));
            }
        };
        town.lock()
            .await
            .complete_join(&player_id, &session_token, video_token)
    }

    /// First half of a join: the player and its session become live, but
    /// nobody is told yet.
    ///
    /// # Errors
    /// [`TownError::DuplicatePlayer`] if a live player already has this ID.
    pub fn register_player(&mut self, player: Player) -> Result<SessionToken, TownError> {
        if self.sessions.contains_player(&player.id) {
            return Err(TownError::DuplicatePlayer(player.id));
        }
        Ok(self.sessions.create(player).session_token().clone())
    }

    /// Second half of a join: records the video credential and announces
    /// the player.
    ///
    /// # Errors
    /// [`TownError::PlayerNotFound`] if the session was destroyed in the
    /// meantime.
    pub fn complete_join(
        &mut self,
        player_id: &PlayerId,
        session_token: &SessionToken,
        video_token: String,
    ) -> Result<PlayerSession, TownError> {
        let session = self
            .sessions
            .get_mut(session_token)
            .ok_or_else(|| TownError::PlayerNotFound(player_id.clone()))?;
        session.set_video_token(video_token)?;
        let session = session.clone();

        tracing::info!(
            town_id = %self.town_id,
            %player_id,
            user_name = %session.player().user_name,
            "player joined"
        );
        self.notify("player_joined", |l| l.on_player_joined(session.player()));
        Ok(session)
    }

    /// Authenticates a socket: the live session holding `token`, if any.
    pub fn get_session_by_token(&self, token: &SessionToken) -> Option<&PlayerSession> {
        self.sessions.get(token)
    }

    /// Removes the session and its player.
    ///
    /// The player first leaves its conversation area (which may destroy
    /// it), then `on_player_disconnected` fires. Returns `None` if the
    /// token was already revoked.
    pub fn destroy_session(&mut self, token: &SessionToken) -> Option<PlayerSession> {
        let session = self.sessions.destroy(token)?;
        let player = session.player();

        if let Some(label) = &player.active_conversation_area {
            self.remove_occupant(label, &player.id);
        }

        tracing::info!(town_id = %self.town_id, player_id = %player.id, "player disconnected");
        self.notify("player_disconnected", |l| l.on_player_disconnected(player));
        Some(session)
    }

    /// Moves a player and resolves its conversation-area membership.
    ///
    /// A label naming no live area counts as no label.
    pub fn update_player_location(
        &mut self,
        player_id: &PlayerId,
        location: UserLocation,
    ) -> Result<(), TownError> {
        let intended = location
            .conversation_label
            .as_deref()
            .filter(|label| self.has_area(label))
            .map(str::to_owned);

        let player = self
            .sessions
            .player_mut(player_id)
            .ok_or_else(|| TownError::PlayerNotFound(player_id.clone()))?;
        player.location = location;
        let previous = std::mem::replace(&mut player.active_conversation_area, intended.clone());

        if previous != intended {
            if let Some(label) = &previous {
                self.remove_occupant(label, player_id);
            }
            if let Some(label) = &intended {
                self.add_occupant(label, player_id);
            }
        }

        if let Some(player) = self.sessions.player(player_id) {
            self.notify("player_moved", |l| l.on_player_moved(player));
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Conversation areas
    // -----------------------------------------------------------------------

    /// Creates a conversation area, or returns `false` and changes nothing.
    pub fn add_conversation_area(&mut self, area: ConversationArea) -> bool {
        match self.try_add_conversation_area(area) {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(town_id = %self.town_id, error = %e, "conversation area not created");
                false
            }
        }
    }

    /// Creates a conversation area.
    ///
    /// Any occupants on `area` are ignored. Players standing strictly
    /// inside the box who are not already in another area are seeded into
    /// it. Exactly one `on_conversation_area_updated` fires, even when
    /// nobody was seeded.
    ///
    /// # Errors
    /// [`TownError::AreaRejected`] for a duplicate label, an empty topic,
    /// or a box overlapping an existing one. Touching edges are allowed.
    pub fn try_add_conversation_area(&mut self, mut area: ConversationArea) -> Result<(), TownError> {
        let rejection = if self.has_area(&area.label) {
            Some(AreaRejection::DuplicateLabel)
        } else if area.topic.is_empty() {
            Some(AreaRejection::EmptyTopic)
        } else if self
            .conversation_areas
            .iter()
            .any(|existing| existing.bounding_box.overlaps(&area.bounding_box))
        {
            Some(AreaRejection::Overlap)
        } else {
            None
        };
        if let Some(reason) = rejection {
            return Err(TownError::AreaRejected {
                label: area.label,
                reason,
            });
        }

        let seeded: Vec<PlayerId> = self
            .sessions
            .players()
            .filter(|p| p.is_within(&area.bounding_box))
            .filter(|p| !self.claims_existing_area(p))
            .map(|p| p.id.clone())
            .collect();
        for id in &seeded {
            if let Some(player) = self.sessions.player_mut(id) {
                player.active_conversation_area = Some(area.label.clone());
            }
        }
        area.occupants_by_id = seeded;

        tracing::info!(
            town_id = %self.town_id,
            label = %area.label,
            occupants = area.occupants_by_id.len(),
            "conversation area created"
        );
        self.conversation_areas.push(area);
        if let Some(area) = self.conversation_areas.last() {
            self.notify("conversation_area_updated", |l| {
                l.on_conversation_area_updated(area)
            });
        }
        Ok(())
    }

    fn has_area(&self, label: &str) -> bool {
        self.conversation_areas.iter().any(|a| a.label == label)
    }

    fn claims_existing_area(&self, player: &Player) -> bool {
        player.active_conversation_area.is_some()
            || player
                .location
                .conversation_label
                .as_deref()
                .is_some_and(|label| self.has_area(label))
    }

    fn add_occupant(&mut self, label: &str, player_id: &PlayerId) {
        let Some(area) = self.conversation_areas.iter_mut().find(|a| a.label == label) else {
            return;
        };
        if !area.has_occupant(player_id) {
            area.occupants_by_id.push(player_id.clone());
        }
        let area = area.clone();
        self.notify("conversation_area_updated", |l| {
            l.on_conversation_area_updated(&area)
        });
    }

    /// Takes `player_id` out of the area; an area left empty is destroyed.
    fn remove_occupant(&mut self, label: &str, player_id: &PlayerId) {
        let Some(index) = self.conversation_areas.iter().position(|a| a.label == label) else {
            return;
        };
        let area = &mut self.conversation_areas[index];
        area.occupants_by_id.retain(|id| id != player_id);

        if area.occupants_by_id.is_empty() {
            let area = self.conversation_areas.remove(index);
            tracing::info!(town_id = %self.town_id, label = %area.label, "conversation area destroyed");
            self.notify("conversation_area_destroyed", |l| {
                l.on_conversation_area_destroyed(&area)
            });
        } else {
            let area = area.clone();
            self.notify("conversation_area_updated", |l| {
                l.on_conversation_area_updated(&area)
            });
        }
    }

    // -----------------------------------------------------------------------
    // Listeners
    // -----------------------------------------------------------------------

    /// Registers a listener. It sees only events emitted from now on.
    pub fn add_town_listener(&mut self, listener: Arc<dyn TownListener>) -> ListenerId {
        let id = ListenerId::new(self.next_listener_id);
        self.next_listener_id += 1;
        self.listeners.push((id, listener));
        tracing::debug!(town_id = %self.town_id, listener_id = %id, "listener added");
        id
    }

    /// Unregisters a listener. Returns `false` if it was not registered.
    pub fn remove_town_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        let removed = self.listeners.len() != before;
        if removed {
            tracing::debug!(town_id = %self.town_id, listener_id = %id, "listener removed");
        }
        removed
    }

    /// Tells every listener the town is going away. Players and sessions
    /// are left in place; the registry drops the controller afterwards.
    pub fn disconnect_all_players(&mut self) {
        tracing::info!(
            town_id = %self.town_id,
            listeners = self.listeners.len(),
            "disconnecting all players"
        );
        self.notify("town_destroyed", |l| l.on_town_destroyed());
    }

    fn notify(&self, event: &'static str, deliver: impl Fn(&dyn TownListener)) {
        for (listener_id, listener) in &self.listeners {
            let delivered = panic::catch_unwind(AssertUnwindSafe(|| deliver(listener.as_ref())));
            if delivered.is_err() {
                tracing::warn!(
                    town_id = %self.town_id,
                    %listener_id,
                    event,
                    "listener panicked, skipped"
                );
            }
        }
    }
}

fn join_incomplete(
    town_id: &TownId,
    player_id: PlayerId,
    session_token: SessionToken,
    source: SessionError,
) -> TownError {
    tracing::warn!(%town_id, %player_id, error = %source, "video token request failed");
    TownError::JoinIncomplete {
        player_id,
        session_token,
        source,
    }
}
