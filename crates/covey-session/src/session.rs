//! A player's presence in one town.

use covey_protocol::{Player, PlayerId, SessionToken};

use crate::SessionError;

/// Binds a [`Player`] to the bearer token that authorises its socket.
///
/// The session owns the player record. Everything else in a town refers
/// to the player by [`PlayerId`].
#[derive(Debug, Clone)]
pub struct PlayerSession {
    token: SessionToken,
    player: Player,
    video_token: Option<String>,
}

impl PlayerSession {
    pub(crate) fn new(token: SessionToken, player: Player) -> Self {
        Self {
            token,
            player,
            video_token: None,
        }
    }

    pub fn session_token(&self) -> &SessionToken {
        &self.token
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    pub fn player_id(&self) -> &PlayerId {
        &self.player.id
    }

    /// The credential for the external video service, once issued.
    pub fn video_token(&self) -> Option<&str> {
        self.video_token.as_deref()
    }

    /// Records the video credential.
    ///
    /// # Errors
    /// [`SessionError::VideoTokenAlreadySet`] if one was already recorded.
    pub fn set_video_token(&mut self, token: impl Into<String>) -> Result<(), SessionError> {
        if self.video_token.is_some() {
            return Err(SessionError::VideoTokenAlreadySet);
        }
        self.video_token = Some(token.into());
        Ok(())
    }
}
