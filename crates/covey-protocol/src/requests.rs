//! Administrative RPC calls and their results.
//!
//! These are the "REST-style" operations: creating, listing, updating and
//! deleting towns, joining a town, and creating conversation areas. They
//! travel inside [`ClientMessage::Request`](crate::ClientMessage::Request)
//! and are answered with a [`ResponseEnvelope`].

use serde::{Deserialize, Serialize};

use crate::{ConversationArea, Player, PlayerId, SessionToken, TownId};

/// One RPC call. Tagged by `type`, payload fields inlined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TownRequest {
    CreateTown(TownCreateRequest),
    ListTowns,
    UpdateTown(TownUpdateRequest),
    DeleteTown(TownDeleteRequest),
    CreateConversationArea(ConversationAreaCreateRequest),
    JoinTown(TownJoinRequest),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TownCreateRequest {
    pub friendly_name: String,
    pub is_publicly_listed: bool,
}

/// Omitted fields are left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TownUpdateRequest {
    pub town_id: TownId,
    pub town_update_password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub friendly_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_publicly_listed: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TownDeleteRequest {
    pub town_id: TownId,
    pub town_update_password: String,
}

/// The `occupants_by_id` of the submitted area are ignored; the town
/// computes occupancy itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationAreaCreateRequest {
    pub town_id: TownId,
    pub session_token: SessionToken,
    pub conversation_area: ConversationArea,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TownJoinRequest {
    pub user_name: String,
    pub town_id: TownId,
}

/// Uniform wrapper for every RPC result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    #[serde(rename = "isOK")]
    pub is_ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<TownResponse>,
}

impl ResponseEnvelope {
    /// A successful call carrying a result.
    pub fn ok(response: TownResponse) -> Self {
        Self {
            is_ok: true,
            message: None,
            response: Some(response),
        }
    }

    /// A successful call with nothing to return.
    pub fn ok_empty() -> Self {
        Self {
            is_ok: true,
            message: None,
            response: None,
        }
    }

    /// A failed call with a human-readable reason.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            is_ok: false,
            message: Some(message.into()),
            response: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TownResponse {
    TownCreated(TownCreateResponse),
    TownList(TownListResponse),
    TownJoined(TownJoinResponse),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TownCreateResponse {
    pub town_id: TownId,
    pub town_update_password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TownListResponse {
    pub towns: Vec<TownListing>,
}

/// Public summary of a town. `current_occupancy` counts live socket
/// subscriptions, not joined players.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TownListing {
    pub town_id: TownId,
    pub friendly_name: String,
    pub current_occupancy: usize,
    pub maximum_occupancy: usize,
}

/// Everything a client needs to render a town right after joining.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TownJoinResponse {
    pub player_id: PlayerId,
    pub session_token: SessionToken,
    pub provider_video_token: String,
    pub current_players: Vec<Player>,
    pub friendly_name: String,
    pub is_publicly_listed: bool,
    pub conversation_areas: Vec<ConversationArea>,
}
