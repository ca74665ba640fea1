//! Player sessions for Covey.
//!
//! 1. **Sessions**: a [`PlayerSession`] binds a player to a bearer
//!    [`SessionToken`](covey_protocol::SessionToken); a town keeps its
//!    sessions in a [`SessionManager`].
//! 2. **Secrets**: random player IDs, session tokens, town IDs and update
//!    passwords.
//! 3. **Video**: the [`VideoTokenProvider`] capability consulted on join.
//!
//! ```text
//! Town layer (above)     ← owns one SessionManager per town
//!     ↕
//! Session layer (this crate)
//!     ↕
//! Protocol layer (below) ← Player, PlayerId, SessionToken
//! ```

#![allow(async_fn_in_trait)]

mod error;
mod manager;
mod secret;
mod session;
mod video;

pub use error::SessionError;
pub use manager::SessionManager;
pub use secret::{
    UPDATE_PASSWORD_LEN, new_player_id, new_session_token, new_town_id, new_update_password,
};
pub use session::PlayerSession;
pub use video::{LocalVideoTokens, VideoTokenProvider};
