//! Video credentials.
//!
//! Covey does not run a video service. When a player joins, the town asks
//! a [`VideoTokenProvider`] for a credential scoped to that town and
//! player and passes it back to the client untouched.

use std::future::Future;

use covey_protocol::{PlayerId, TownId};
use rand::Rng;

use crate::SessionError;

/// Issues video-service credentials.
///
/// `Send + Sync + 'static` because one provider is shared by every town
/// for the lifetime of the server.
///
/// # Example
///
/// ```rust
/// use covey_protocol::{PlayerId, TownId};
/// use covey_session::{SessionError, VideoTokenProvider};
///
/// struct Unavailable;
///
/// impl VideoTokenProvider for Unavailable {
///     async fn token_for_town(
///         &self,
///         _town_id: &TownId,
///         _player_id: &PlayerId,
///     ) -> Result<String, SessionError> {
///         Err(SessionError::VideoToken("service down".into()))
///     }
/// }
/// ```
pub trait VideoTokenProvider: Send + Sync + 'static {
    /// Returns a credential for `player_id` in `town_id`.
    ///
    /// # Errors
    /// [`SessionError::VideoToken`] if the provider cannot issue one.
    fn token_for_town(
        &self,
        town_id: &TownId,
        player_id: &PlayerId,
    ) -> impl Future<Output = Result<String, SessionError>> + Send;
}

/// Issues opaque random credentials without contacting anything.
///
/// For development and tests. A client cannot use these against a real
/// video service.
#[derive(Debug, Clone, Default)]
pub struct LocalVideoTokens;

impl VideoTokenProvider for LocalVideoTokens {
    async fn token_for_town(
        &self,
        town_id: &TownId,
        player_id: &PlayerId,
    ) -> Result<String, SessionError> {
        let nonce: u64 = rand::rng().random();
        Ok(format!("{town_id}.{player_id}.{nonce:016x}"))
    }
}
