//! Socket messages.
//!
//! A connection starts anonymous. It may issue RPC [`TownRequest`]s at any
//! time, and becomes a town socket after a successful
//! [`ClientMessage::Subscribe`]. From then on the server pushes town
//! events to it.
//!
//! ```text
//! client                                   server
//!   │ {"type":"request","id":1,...}  ──▶     │
//!   │ ◀── {"seq":1,"message":{"type":"response",...}}
//!   │ {"type":"subscribe","token":..}──▶     │  getSessionByToken
//!   │ ◀── {"seq":2,"message":{"type":"subscribed",...}}
//!   │ {"type":"playerMovement",...}  ──▶     │  updatePlayerLocation
//!   │ ◀── {"seq":3,"message":{"type":"playerMoved",...}}
//! ```

use serde::{Deserialize, Serialize};

use crate::{
    ConversationArea, Player, PlayerId, ResponseEnvelope, SessionToken, TownId, TownRequest,
    UserLocation,
};

/// Messages sent by clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    /// Handshake: bind this connection to a live session in a town.
    Subscribe {
        token: SessionToken,
        #[serde(rename = "townId")]
        town_id: TownId,
    },

    /// The subscribed player moved.
    PlayerMovement { location: UserLocation },

    /// An RPC call, answered by a `response` with the same `id`.
    Request { id: u64, request: TownRequest },

    /// The client is going away.
    Disconnect { reason: String },
}

/// Messages pushed by the server.
///
/// Variant tags match the event names town clients listen for
/// (`newPlayer`, `playerMoved`, `playerDisconnect`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    /// Acknowledges a successful `subscribe`.
    Subscribed {
        #[serde(rename = "townId")]
        town_id: TownId,
        #[serde(rename = "playerId")]
        player_id: PlayerId,
    },

    NewPlayer { player: Player },

    PlayerMoved { player: Player },

    PlayerDisconnect { player: Player },

    /// The town was deleted. The server closes the socket right after.
    TownClosing,

    /// An area was created or its occupant set changed.
    ConversationUpdated { area: ConversationArea },

    /// An area lost its last occupant and no longer exists.
    ConversationDestroyed { area: ConversationArea },

    Response { id: u64, response: ResponseEnvelope },

    /// `code` follows HTTP conventions (400 = bad request).
    Error { code: u16, message: String },
}

/// Outbound framing. `seq` starts at 1 and increases by one per message
/// on a connection, so a client can tell it missed nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<M> {
    pub seq: u64,
    pub message: M,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscribe_json_shape() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"subscribe","token":"abc","townId":"T1"}"#).unwrap();
        assert_eq!(
            msg,
            ClientMessage::Subscribe {
                token: SessionToken::from("abc"),
                town_id: TownId::from("T1"),
            }
        );
    }

    #[test]
    fn test_player_movement_json_shape() {
        let msg: ClientMessage = serde_json::from_str(
            r#"{"type":"playerMovement","location":{"x":10,"y":10,"rotation":"left","moving":true,"conversationLabel":"A"}}"#,
        )
        .unwrap();
        match msg {
            ClientMessage::PlayerMovement { location } => {
                assert_eq!(location.conversation_label.as_deref(), Some("A"));
                assert!(location.moving);
            }
            other => panic!("expected PlayerMovement, got {other:?}"),
        }
    }

    #[test]
    fn test_request_nests_tagged_town_request() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"request","id":7,"request":{"type":"listTowns"}}"#)
                .unwrap();
        assert_eq!(
            msg,
            ClientMessage::Request {
                id: 7,
                request: TownRequest::ListTowns,
            }
        );
    }

    #[test]
    fn test_server_event_tags_match_client_event_names() {
        let player = Player::new(PlayerId::from("p1"), "alice");
        let cases = [
            (ServerMessage::NewPlayer { player: player.clone() }, "newPlayer"),
            (ServerMessage::PlayerMoved { player: player.clone() }, "playerMoved"),
            (ServerMessage::PlayerDisconnect { player }, "playerDisconnect"),
            (ServerMessage::TownClosing, "townClosing"),
        ];
        for (msg, tag) in cases {
            let json = serde_json::to_value(&msg).unwrap();
            assert_eq!(json["type"], tag);
        }
    }

    #[test]
    fn test_conversation_events_carry_full_snapshot() {
        let area = ConversationArea::new("A", "t", crate::BoundingBox::new(0.0, 0.0, 2.0, 2.0));
        let json = serde_json::to_value(ServerMessage::ConversationDestroyed { area }).unwrap();
        assert_eq!(json["type"], "conversationDestroyed");
        assert_eq!(json["area"]["label"], "A");
        assert!(json["area"]["occupantsByID"].is_array());
        assert!(json["area"]["boundingBox"].is_object());
    }

    #[test]
    fn test_envelope_round_trip() {
        let env = Envelope {
            seq: 9,
            message: ServerMessage::Error {
                code: 400,
                message: "bad".into(),
            },
        };
        let bytes = serde_json::to_vec(&env).unwrap();
        let decoded: Envelope<ServerMessage> = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(env, decoded);
    }
}
