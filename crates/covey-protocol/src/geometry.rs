//! Positions and rectangles in the 2D town map.

use serde::{Deserialize, Serialize};

/// Which way an avatar is facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Front,
    Back,
    Left,
    Right,
}

/// A player's reported position.
///
/// `conversation_label` is the client's claim about which conversation
/// area it is standing in. The controller trusts this claim when it
/// resolves membership on a move.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserLocation {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub rotation: Direction,
    #[serde(default)]
    pub moving: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_label: Option<String>,
}

impl UserLocation {
    /// A stationary location with no conversation claim.
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            ..Self::default()
        }
    }

    /// Same location, claiming membership of the area `label`.
    pub fn in_conversation(mut self, label: impl Into<String>) -> Self {
        self.conversation_label = Some(label.into());
        self
    }
}

/// An axis-aligned rectangle described by its centre and size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn left(&self) -> f64 {
        self.x - self.width / 2.0
    }

    pub fn right(&self) -> f64 {
        self.x + self.width / 2.0
    }

    pub fn top(&self) -> f64 {
        self.y - self.height / 2.0
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height / 2.0
    }

    /// Strict point-in-box test: a point on the border is outside.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x > self.left() && x < self.right() && y > self.top() && y < self.bottom()
    }

    /// Returns `true` if the intersection of the two boxes has strictly
    /// positive area. Boxes that only share an edge or a corner do not
    /// overlap.
    pub fn overlaps(&self, other: &BoundingBox) -> bool {
        let apart = self.left() >= other.right()
            || other.left() >= self.right()
            || self.top() >= other.bottom()
            || other.top() >= self.bottom();
        !apart
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_is_strict_on_borders() {
        let b = BoundingBox::new(10.0, 10.0, 20.0, 20.0);
        assert!(b.contains(10.0, 10.0));
        assert!(b.contains(0.5, 19.5));
        assert!(!b.contains(0.0, 10.0));
        assert!(!b.contains(10.0, 20.0));
        assert!(!b.contains(1000.0, 1000.0));
    }

    #[test]
    fn test_overlaps_positive_area() {
        let a = BoundingBox::new(10.0, 10.0, 20.0, 20.0);
        let b = BoundingBox::new(25.0, 25.0, 20.0, 20.0);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn test_overlaps_contained_box() {
        let outer = BoundingBox::new(0.0, 0.0, 100.0, 100.0);
        let inner = BoundingBox::new(5.0, 5.0, 2.0, 2.0);
        assert!(outer.overlaps(&inner));
        assert!(inner.overlaps(&outer));
    }

    #[test]
    fn test_adjacent_boxes_do_not_overlap() {
        let a = BoundingBox::new(10.0, 10.0, 20.0, 20.0);
        // Shares the right edge of `a`.
        let edge = BoundingBox::new(30.0, 10.0, 20.0, 20.0);
        // Shares only the bottom-right corner of `a`.
        let corner = BoundingBox::new(30.0, 30.0, 20.0, 20.0);
        assert!(!a.overlaps(&edge));
        assert!(!a.overlaps(&corner));
    }

    #[test]
    fn test_user_location_json_shape() {
        let loc = UserLocation::at(1.0, 2.0).in_conversation("A");
        let json = serde_json::to_value(&loc).unwrap();
        assert_eq!(json["rotation"], "front");
        assert_eq!(json["moving"], false);
        assert_eq!(json["conversationLabel"], "A");

        let bare = serde_json::to_value(UserLocation::at(0.0, 0.0)).unwrap();
        assert!(bare.get("conversationLabel").is_none());
    }

    #[test]
    fn test_user_location_defaults_missing_fields() {
        let loc: UserLocation = serde_json::from_str(r#"{"x":3,"y":4}"#).unwrap();
        assert_eq!(loc, UserLocation::at(3.0, 4.0));
    }
}
