//! Town snapshots shared by the server and its clients.

use serde::{Deserialize, Serialize};

use crate::{BoundingBox, PlayerId, UserLocation};

/// A connected player.
///
/// `active_conversation_area` is the server-side back-reference (by label)
/// to the conversation area the player currently occupies. It is not part
/// of the wire format; clients learn membership from `ConversationArea`
/// snapshots instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub user_name: String,
    pub location: UserLocation,
    #[serde(skip)]
    pub active_conversation_area: Option<String>,
}

impl Player {
    /// A freshly joined player standing at the origin.
    pub fn new(id: PlayerId, user_name: impl Into<String>) -> Self {
        Self {
            id,
            user_name: user_name.into(),
            location: UserLocation::default(),
            active_conversation_area: None,
        }
    }

    /// Whether the player's reported point lies strictly inside `bounds`.
    pub fn is_within(&self, bounds: &BoundingBox) -> bool {
        bounds.contains(self.location.x, self.location.y)
    }
}

/// A named rectangular region whose occupants are in conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationArea {
    pub label: String,
    pub topic: String,
    #[serde(rename = "occupantsByID", default)]
    pub occupants_by_id: Vec<PlayerId>,
    pub bounding_box: BoundingBox,
}

impl ConversationArea {
    /// A new, unoccupied area.
    pub fn new(label: impl Into<String>, topic: impl Into<String>, bounding_box: BoundingBox) -> Self {
        Self {
            label: label.into(),
            topic: topic.into(),
            occupants_by_id: Vec::new(),
            bounding_box,
        }
    }

    pub fn has_occupant(&self, player_id: &PlayerId) -> bool {
        self.occupants_by_id.contains(player_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_json_omits_back_reference() {
        let mut player = Player::new(PlayerId::from("p1"), "alice");
        player.active_conversation_area = Some("A".into());

        let json = serde_json::to_value(&player).unwrap();
        assert_eq!(json["id"], "p1");
        assert_eq!(json["userName"], "alice");
        assert_eq!(json["location"]["x"], 0.0);
        assert!(json.get("activeConversationArea").is_none());
    }

    #[test]
    fn test_conversation_area_json_shape() {
        let mut area = ConversationArea::new("A", "rust", BoundingBox::new(10.0, 10.0, 20.0, 20.0));
        area.occupants_by_id.push(PlayerId::from("p1"));

        let json = serde_json::to_value(&area).unwrap();
        assert_eq!(json["label"], "A");
        assert_eq!(json["topic"], "rust");
        assert_eq!(json["occupantsByID"], serde_json::json!(["p1"]));
        assert_eq!(json["boundingBox"]["width"], 20.0);
    }

    #[test]
    fn test_conversation_area_occupants_default_when_missing() {
        let area: ConversationArea = serde_json::from_str(
            r#"{"label":"A","topic":"t","boundingBox":{"x":0,"y":0,"width":1,"height":1}}"#,
        )
        .unwrap();
        assert!(area.occupants_by_id.is_empty());
    }

    #[test]
    fn test_player_is_within_uses_reported_point() {
        let mut player = Player::new(PlayerId::from("p1"), "alice");
        let bounds = BoundingBox::new(10.0, 10.0, 20.0, 20.0);
        assert!(!player.is_within(&bounds));

        player.location = UserLocation::at(10.0, 10.0);
        assert!(player.is_within(&bounds));
    }
}
