//! RPC handlers.
//!
//! Each [`TownRequest`] maps onto one registry or controller operation.
//! Handlers never fail: every outcome, including internal errors, becomes
//! a [`ResponseEnvelope`].

use covey_protocol::{
    ConversationAreaCreateRequest, Player, ResponseEnvelope, TownCreateRequest, TownCreateResponse,
    TownDeleteRequest, TownJoinRequest, TownJoinResponse, TownListResponse, TownRequest,
    TownResponse, TownUpdateRequest,
};
use covey_session::{VideoTokenProvider, new_player_id};
use covey_town::{TownController, TownError, TownRegistry};

pub(crate) const MSG_NAME_REQUIRED: &str = "FriendlyName must be specified";
pub(crate) const MSG_UPDATE_REFUSED: &str =
    "Invalid password or update values specified. Please double check your town update password.";
pub(crate) const MSG_DELETE_REFUSED: &str =
    "Invalid password. Please double check your town update password.";
pub(crate) const MSG_NO_SUCH_TOWN: &str = "Error: No such town";
pub(crate) const MSG_INTERNAL: &str = "Internal server error";

/// Runs one RPC against the registry.
pub(crate) async fn handle_request<V: VideoTokenProvider>(
    towns: &TownRegistry<V>,
    request: TownRequest,
) -> ResponseEnvelope {
    match request {
        TownRequest::CreateTown(req) => create_town(towns, req).await,
        TownRequest::ListTowns => {
            let towns = towns.get_towns().await;
            ResponseEnvelope::ok(TownResponse::TownList(TownListResponse { towns }))
        }
        TownRequest::UpdateTown(req) => update_town(towns, req).await,
        TownRequest::DeleteTown(req) => delete_town(towns, req).await,
        TownRequest::CreateConversationArea(req) => create_conversation_area(towns, req).await,
        TownRequest::JoinTown(req) => join_town(towns, req).await,
    }
}

async fn create_town<V: VideoTokenProvider>(
    towns: &TownRegistry<V>,
    req: TownCreateRequest,
) -> ResponseEnvelope {
    if req.friendly_name.is_empty() {
        return ResponseEnvelope::failure(MSG_NAME_REQUIRED);
    }
    let handle = towns
        .create_town(req.friendly_name, req.is_publicly_listed)
        .await;
    let town = handle.lock().await;
    ResponseEnvelope::ok(TownResponse::TownCreated(TownCreateResponse {
        town_id: town.town_id().clone(),
        town_update_password: town.update_password().to_owned(),
    }))
}

async fn update_town<V: VideoTokenProvider>(
    towns: &TownRegistry<V>,
    req: TownUpdateRequest,
) -> ResponseEnvelope {
    let updated = towns
        .update_town(
            &req.town_id,
            &req.town_update_password,
            req.friendly_name,
            req.is_publicly_listed,
        )
        .await;
    if updated {
        ResponseEnvelope::ok_empty()
    } else {
        ResponseEnvelope::failure(MSG_UPDATE_REFUSED)
    }
}

async fn delete_town<V: VideoTokenProvider>(
    towns: &TownRegistry<V>,
    req: TownDeleteRequest,
) -> ResponseEnvelope {
    let deleted = towns
        .delete_town(&req.town_id, &req.town_update_password)
        .await;
    if deleted {
        ResponseEnvelope::ok_empty()
    } else {
        ResponseEnvelope::failure(MSG_DELETE_REFUSED)
    }
}

async fn create_conversation_area<V: VideoTokenProvider>(
    towns: &TownRegistry<V>,
    req: ConversationAreaCreateRequest,
) -> ResponseEnvelope {
    let area = req.conversation_area;
    let refused = || {
        ResponseEnvelope::failure(format!(
            "Unable to create conversation area {} with topic {}",
            area.label, area.topic
        ))
    };

    let Some(handle) = towns.get_controller_for_town(&req.town_id).await else {
        return refused();
    };
    let mut town = handle.lock().await;
    if town.get_session_by_token(&req.session_token).is_none() {
        tracing::warn!(town_id = %req.town_id, token = %req.session_token, "area request with unknown session");
        return refused();
    }
    if town.add_conversation_area(area.clone()) {
        ResponseEnvelope::ok_empty()
    } else {
        refused()
    }
}

async fn join_town<V: VideoTokenProvider>(
    towns: &TownRegistry<V>,
    req: TownJoinRequest,
) -> ResponseEnvelope {
    let Some(handle) = towns.get_controller_for_town(&req.town_id).await else {
        return ResponseEnvelope::failure(MSG_NO_SUCH_TOWN);
    };

    let player = Player::new(new_player_id(), req.user_name);
    let session = match TownController::join(&handle, player).await {
        Ok(session) => session,
        Err(TownError::JoinIncomplete {
            player_id,
            session_token,
            source,
        }) => {
            tracing::error!(town_id = %req.town_id, %player_id, error = %source, "join failed, discarding session");
            handle.lock().await.destroy_session(&session_token);
            return ResponseEnvelope::failure(MSG_INTERNAL);
        }
        Err(e) => {
            tracing::error!(town_id = %req.town_id, error = %e, "join failed");
            return ResponseEnvelope::failure(MSG_INTERNAL);
        }
    };

    let town = handle.lock().await;
    ResponseEnvelope::ok(TownResponse::TownJoined(TownJoinResponse {
        player_id: session.player_id().clone(),
        session_token: session.session_token().clone(),
        provider_video_token: session.video_token().unwrap_or_default().to_owned(),
        current_players: town.players().cloned().collect(),
        friendly_name: town.friendly_name().to_owned(),
        is_publicly_listed: town.is_publicly_listed(),
        conversation_areas: town.conversation_areas().to_vec(),
    }))
}
