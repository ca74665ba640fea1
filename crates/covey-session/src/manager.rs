//! The per-town session table.
//!
//! `SessionManager` is not thread-safe by itself. It is owned by a town
//! controller, which is in turn guarded by a mutex at a higher level.

use std::collections::HashMap;

use covey_protocol::{Player, PlayerId, SessionToken};

use crate::{PlayerSession, new_session_token};

/// All live sessions of one town.
///
/// ```text
/// create() ──→ [live] ──→ destroy() ──→ token rejected forever
/// ```
///
/// Join order is preserved; `players()` yields players in the order they
/// joined.
#[derive(Debug, Default)]
pub struct SessionManager {
    /// Sessions keyed by bearer token.
    sessions: HashMap<SessionToken, PlayerSession>,

    /// Index from player ID to token, kept in sync with `sessions`.
    by_player: HashMap<PlayerId, SessionToken>,

    /// Tokens in join order.
    order: Vec<SessionToken>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a session for `player` under a fresh random token.
    ///
    /// The player ID must not already be live; see
    /// [`contains_player`](Self::contains_player).
    pub fn create(&mut self, player: Player) -> &mut PlayerSession {
        debug_assert!(
            !self.by_player.contains_key(&player.id),
            "player {} already has a session",
            player.id
        );
        let mut token = new_session_token();
        while self.sessions.contains_key(&token) {
            token = new_session_token();
        }
        let player_id = player.id.clone();

        tracing::debug!(%player_id, %token, "session created");

        self.by_player.insert(player_id, token.clone());
        self.order.push(token.clone());
        self.sessions
            .entry(token.clone())
            .or_insert(PlayerSession::new(token, player))
    }

    pub fn get(&self, token: &SessionToken) -> Option<&PlayerSession> {
        self.sessions.get(token)
    }

    pub fn get_mut(&mut self, token: &SessionToken) -> Option<&mut PlayerSession> {
        self.sessions.get_mut(token)
    }

    pub fn contains_player(&self, id: &PlayerId) -> bool {
        self.by_player.contains_key(id)
    }

    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        let token = self.by_player.get(id)?;
        self.sessions.get(token).map(PlayerSession::player)
    }

    pub fn player_mut(&mut self, id: &PlayerId) -> Option<&mut Player> {
        let token = self.by_player.get(id)?;
        self.sessions.get_mut(token).map(PlayerSession::player_mut)
    }

    /// Live players in join order.
    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.order
            .iter()
            .filter_map(|token| self.sessions.get(token))
            .map(PlayerSession::player)
    }

    /// Revokes a token. Returns the removed session, or `None` if the
    /// token was unknown or already revoked.
    pub fn destroy(&mut self, token: &SessionToken) -> Option<PlayerSession> {
        let session = self.sessions.remove(token)?;
        self.by_player.remove(session.player_id());
        self.order.retain(|t| t != token);

        tracing::debug!(player_id = %session.player_id(), %token, "session destroyed");
        Some(session)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
