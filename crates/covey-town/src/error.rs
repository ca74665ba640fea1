//! Error types for the town layer.

use covey_protocol::{PlayerId, SessionToken, TownId};
use covey_session::SessionError;

/// Why a conversation area was not created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AreaRejection {
    /// A live area already uses this label.
    DuplicateLabel,
    /// The topic is empty.
    EmptyTopic,
    /// The box shares positive area with an existing area's box.
    Overlap,
}

impl std::fmt::Display for AreaRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::DuplicateLabel => "label already in use",
            Self::EmptyTopic => "topic is empty",
            Self::Overlap => "overlaps an existing area",
        })
    }
}

/// Errors that can occur during town operations.
///
/// Every operation that fails with one of these leaves the town exactly
/// as it was.
#[derive(Debug, thiserror::Error)]
pub enum TownError {
    /// Wrong update password (or session token) for a gated operation.
    #[error("not authorized to modify town {0}")]
    Unauthorized(TownId),

    #[error("town {0} not found")]
    TownNotFound(TownId),

    #[error("player {0} not found")]
    PlayerNotFound(PlayerId),

    #[error("player {0} is already in this town")]
    DuplicatePlayer(PlayerId),

    #[error("conversation area {label:?} rejected: {reason}")]
    AreaRejected { label: String, reason: AreaRejection },

    /// A field value was refused, e.g. an empty friendly name.
    #[error("invalid value: {0}")]
    Validation(String),

    /// The player was registered and holds `session_token`, but no video
    /// credential could be issued. The caller decides whether to destroy
    /// the session.
    #[error("join of player {player_id} incomplete: {source}")]
    JoinIncomplete {
        player_id: PlayerId,
        session_token: SessionToken,
        #[source]
        source: SessionError,
    },

    #[error(transparent)]
    Session(#[from] SessionError),
}
