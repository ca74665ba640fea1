//! Socket-backed [`TownListener`].
//!
//! Translates controller callbacks into [`ServerMessage`]s and queues them
//! for the connection task. It holds no state of its own and never blocks
//! the town.

use covey_protocol::{ConversationArea, Player, ServerMessage};
use covey_town::TownListener;
use tokio::sync::mpsc;

pub(crate) struct SocketListener {
    tx: mpsc::UnboundedSender<ServerMessage>,
}

impl SocketListener {
    pub(crate) fn new(tx: mpsc::UnboundedSender<ServerMessage>) -> Self {
        Self { tx }
    }

    fn push(&self, message: ServerMessage) {
        // The receiver is gone only while the connection is being torn
        // down; its guard removes this listener right after.
        let _ = self.tx.send(message);
    }
}

impl TownListener for SocketListener {
    fn on_player_joined(&self, player: &Player) {
        self.push(ServerMessage::NewPlayer {
            player: player.clone(),
        });
    }

    fn on_player_moved(&self, player: &Player) {
        self.push(ServerMessage::PlayerMoved {
            player: player.clone(),
        });
    }

    fn on_player_disconnected(&self, player: &Player) {
        self.push(ServerMessage::PlayerDisconnect {
            player: player.clone(),
        });
    }

    fn on_town_destroyed(&self) {
        self.push(ServerMessage::TownClosing);
    }

    fn on_conversation_area_updated(&self, area: &ConversationArea) {
        self.push(ServerMessage::ConversationUpdated { area: area.clone() });
    }

    fn on_conversation_area_destroyed(&self, area: &ConversationArea) {
        self.push(ServerMessage::ConversationDestroyed { area: area.clone() });
    }
}
