//! Per-connection handler: RPC, subscription, and event forwarding.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Anonymous: answer `request`s; wait for `subscribe`
//!   2. Subscribe: authenticate the session token against the town. On
//!      failure the socket is closed at once and nothing is registered.
//!   3. Subscribed: apply `playerMovement`s, answer `request`s, and
//!      forward town events until either side goes away
//!   4. Cleanup: remove the listener and destroy the session, exactly once

use std::sync::Arc;

use covey_protocol::{
    ClientMessage, Codec, Envelope, PlayerId, ProtocolError, ServerMessage, SessionToken, TownId,
};
use covey_session::VideoTokenProvider;
use covey_town::{ListenerId, TownController, TownHandle};
use covey_transport::{Connection, WebSocketConnection};
use tokio::sync::mpsc;

use crate::CoveyError;
use crate::listener::SocketListener;
use crate::requests::handle_request;
use crate::server::ServerState;

/// Numbers and encodes everything sent on one connection.
struct Outbox<'a, C: Codec> {
    conn: &'a WebSocketConnection,
    codec: &'a C,
    seq: u64,
}

impl<'a, C: Codec> Outbox<'a, C> {
    fn new(conn: &'a WebSocketConnection, codec: &'a C) -> Self {
        Self { conn, codec, seq: 1 }
    }

    async fn send(&mut self, message: ServerMessage) -> Result<(), CoveyError> {
        let envelope = Envelope {
            seq: next_seq(&mut self.seq),
            message,
        };
        let bytes = self.codec.encode(&envelope)?;
        self.conn.send(&bytes).await?;
        Ok(())
    }

    async fn error(&mut self, code: u16, message: impl Into<String>) -> Result<(), CoveyError> {
        self.send(ServerMessage::Error {
            code,
            message: message.into(),
        })
        .await
    }

    /// Reports a well-formed message that is not allowed right now.
    async fn out_of_order(&mut self, what: &str) -> Result<(), CoveyError> {
        let e = ProtocolError::InvalidMessage(what.to_owned());
        tracing::debug!(error = %e, "rejecting message");
        self.error(400, e.to_string()).await
    }
}

/// A live binding between this connection and a player session.
struct Subscription<V: VideoTokenProvider> {
    town_id: TownId,
    player_id: PlayerId,
    events: mpsc::UnboundedReceiver<ServerMessage>,
    guard: SubscriptionGuard<V>,
}

/// Removes the listener and destroys the session when the subscription
/// ends.
///
/// [`release`](Self::release) does it inline. If the task is dropped
/// first (panic, abort), `Drop` spawns the same cleanup instead. Both
/// steps are no-ops the second time, so a late or repeated cleanup is
/// harmless even after the town is gone.
struct SubscriptionGuard<V: VideoTokenProvider> {
    town: TownHandle<V>,
    listener_id: ListenerId,
    token: SessionToken,
    released: bool,
}

impl<V: VideoTokenProvider> SubscriptionGuard<V> {
    async fn release(mut self) {
        let mut town = self.town.lock().await;
        unsubscribe(&mut town, self.listener_id, &self.token);
        drop(town);
        self.released = true;
    }
}

impl<V: VideoTokenProvider> Drop for SubscriptionGuard<V> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            return;
        };
        let town = Arc::clone(&self.town);
        let listener_id = self.listener_id;
        let token = self.token.clone();
        runtime.spawn(async move {
            let mut town = town.lock().await;
            unsubscribe(&mut town, listener_id, &token);
        });
    }
}

/// Returns `false` when there was nothing left to release.
fn unsubscribe<V: VideoTokenProvider>(
    town: &mut TownController<V>,
    listener_id: ListenerId,
    token: &SessionToken,
) -> bool {
    let removed = town.remove_town_listener(listener_id);
    let destroyed = town.destroy_session(token).is_some();
    removed || destroyed
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<V, C>(
    conn: WebSocketConnection,
    state: Arc<ServerState<V, C>>,
) -> Result<(), CoveyError>
where
    V: VideoTokenProvider,
    C: Codec,
{
    let conn_id = conn.id();
    tracing::debug!(%conn_id, "handling new connection");
    let mut out = Outbox::new(&conn, &state.codec);

    // --- Anonymous phase ---
    let subscription = loop {
        let Some(data) = conn.recv().await? else {
            tracing::debug!(%conn_id, "connection closed before subscribing");
            return Ok(());
        };

        match state.codec.decode::<ClientMessage>(&data) {
            Ok(ClientMessage::Request { id, request }) => {
                let response = handle_request(&state.towns, request).await;
                out.send(ServerMessage::Response { id, response }).await?;
            }
            Ok(ClientMessage::Subscribe { token, town_id }) => {
                match subscribe(&state, &town_id, &token).await {
                    Some(subscription) => break subscription,
                    None => {
                        tracing::warn!(%conn_id, %town_id, %token, "subscription rejected");
                        conn.close().await?;
                        return Ok(());
                    }
                }
            }
            Ok(ClientMessage::PlayerMovement { .. }) => {
                out.out_of_order("not subscribed to a town").await?;
            }
            Ok(ClientMessage::Disconnect { reason }) => {
                tracing::debug!(%conn_id, %reason, "client disconnected");
                conn.close().await?;
                return Ok(());
            }
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "failed to decode message");
                out.error(400, format!("invalid message: {e}")).await?;
            }
        }
    };

    // --- Subscribed phase ---
    let Subscription {
        town_id,
        player_id,
        mut events,
        guard,
    } = subscription;
    tracing::info!(%conn_id, %town_id, %player_id, "socket subscribed");

    let result = async {
        out.send(ServerMessage::Subscribed {
            town_id: town_id.clone(),
            player_id: player_id.clone(),
        })
        .await?;
        forward(&conn, &state, &mut out, &guard.town, &player_id, &mut events).await
    }
    .await;

    guard.release().await;
    if let Err(e) = conn.close().await {
        tracing::debug!(%conn_id, error = %e, "close failed");
    }
    tracing::info!(%conn_id, %town_id, %player_id, "socket unsubscribed");
    result
}

/// Looks up the session and registers a socket listener for it.
async fn subscribe<V, C>(
    state: &ServerState<V, C>,
    town_id: &TownId,
    token: &SessionToken,
) -> Option<Subscription<V>>
where
    V: VideoTokenProvider,
    C: Codec,
{
    let town = state.towns.get_controller_for_town(town_id).await?;
    let (tx, events) = mpsc::unbounded_channel();

    let (player_id, listener_id) = {
        let mut controller = town.lock().await;
        let player_id = controller.get_session_by_token(token)?.player_id().clone();
        let listener_id = controller.add_town_listener(Arc::new(SocketListener::new(tx)));
        (player_id, listener_id)
    };

    Some(Subscription {
        town_id: town_id.clone(),
        player_id,
        events,
        guard: SubscriptionGuard {
            town,
            listener_id,
            token: token.clone(),
            released: false,
        },
    })
}

/// The subscribed loop. Returns when the client leaves, the town closes,
/// or the transport fails.
async fn forward<V, C>(
    conn: &WebSocketConnection,
    state: &ServerState<V, C>,
    out: &mut Outbox<'_, C>,
    town: &TownHandle<V>,
    player_id: &PlayerId,
    events: &mut mpsc::UnboundedReceiver<ServerMessage>,
) -> Result<(), CoveyError>
where
    V: VideoTokenProvider,
    C: Codec,
{
    loop {
        tokio::select! {
            inbound = conn.recv() => {
                let Some(data) = inbound? else {
                    tracing::debug!(%player_id, "connection closed");
                    return Ok(());
                };
                match state.codec.decode::<ClientMessage>(&data) {
                    Ok(ClientMessage::PlayerMovement { location }) => {
                        let moved = town.lock().await.update_player_location(player_id, location);
                        if let Err(e) = moved {
                            tracing::debug!(%player_id, error = %e, "movement ignored");
                        }
                    }
                    Ok(ClientMessage::Request { id, request }) => {
                        let response = handle_request(&state.towns, request).await;
                        out.send(ServerMessage::Response { id, response }).await?;
                    }
                    Ok(ClientMessage::Subscribe { .. }) => {
                        out.out_of_order("already subscribed").await?;
                    }
                    Ok(ClientMessage::Disconnect { reason }) => {
                        tracing::debug!(%player_id, %reason, "client disconnected");
                        return Ok(());
                    }
                    Err(e) => {
                        tracing::debug!(%player_id, error = %e, "failed to decode message");
                        out.error(400, format!("invalid message: {e}")).await?;
                    }
                }
            }
            event = events.recv() => match event {
                Some(ServerMessage::TownClosing) => {
                    out.send(ServerMessage::TownClosing).await?;
                    tracing::info!(%player_id, "town closing, disconnecting");
                    return Ok(());
                }
                Some(message) => out.send(message).await?,
                None => return Ok(()),
            },
        }
    }
}

/// Returns the current sequence number and advances it.
fn next_seq(seq: &mut u64) -> u64 {
    let current = *seq;
    *seq += 1;
    current
}
