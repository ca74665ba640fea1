//! Observers of town state changes.

use std::fmt;

use covey_protocol::{ConversationArea, Player};

/// Receives every state change of one town, in order, after it has been
/// applied.
///
/// Callbacks run synchronously while the town is locked. They must not
/// block and must not call back into the town. A panicking listener is
/// logged and skipped; the remaining listeners still see the event.
pub trait TownListener: Send + Sync {
    fn on_player_joined(&self, player: &Player);

    fn on_player_moved(&self, player: &Player);

    fn on_player_disconnected(&self, player: &Player);

    /// The town is being deleted. Expected to close the underlying
    /// connection.
    fn on_town_destroyed(&self);

    /// An area was created or its occupant set changed.
    fn on_conversation_area_updated(&self, area: &ConversationArea);

    /// An area lost its last occupant and is gone.
    fn on_conversation_area_destroyed(&self, area: &ConversationArea);
}

/// Handle returned by `add_town_listener`, used to remove it again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L-{}", self.0)
    }
}
