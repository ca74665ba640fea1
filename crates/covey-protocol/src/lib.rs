//! Wire protocol for Covey.
//!
//! This crate defines what travels between a town server and its clients:
//!
//! - **Identifiers** ([`TownId`], [`PlayerId`], [`SessionToken`]).
//! - **Snapshots** ([`Player`], [`ConversationArea`]) and the geometry
//!   they are built from ([`UserLocation`], [`BoundingBox`]).
//! - **Messages** ([`ClientMessage`], [`ServerMessage`], [`Envelope`]) and
//!   the RPC surface ([`TownRequest`], [`ResponseEnvelope`]).
//! - **Codec** ([`Codec`], [`JsonCodec`]) and [`ProtocolError`].
//!
//! It knows nothing about connections or towns; it only describes data.

mod codec;
mod error;
mod geometry;
mod ids;
mod messages;
mod model;
mod requests;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use geometry::{BoundingBox, Direction, UserLocation};
pub use ids::{PlayerId, SessionToken, TownId};
pub use messages::{ClientMessage, Envelope, ServerMessage};
pub use model::{ConversationArea, Player};
pub use requests::{
    ConversationAreaCreateRequest, ResponseEnvelope, TownCreateRequest, TownCreateResponse,
    TownDeleteRequest, TownJoinRequest, TownJoinResponse, TownListResponse, TownListing,
    TownRequest, TownResponse, TownUpdateRequest,
};
