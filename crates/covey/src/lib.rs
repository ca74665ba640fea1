//! # Covey
//!
//! Real-time town presence server.
//!
//! Players join a town, move around a 2D map, and gather in conversation
//! areas. Every state change is pushed to every connected socket in that
//! town. Administrative calls (create, list, update, delete towns; join a
//! town; create conversation areas) travel as RPC requests on the same
//! socket.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use covey::prelude::*;
//!
//! # async fn start() -> Result<(), CoveyError> {
//! let server = CoveyServerBuilder::new()
//!     .bind("127.0.0.1:8081")
//!     .build(LocalVideoTokens)
//!     .await?;
//! server.run().await
//! # }
//! ```

mod config;
mod error;
mod handler;
mod listener;
mod requests;
mod server;

pub use config::{DEFAULT_BIND, ServerConfig};
pub use error::CoveyError;
pub use server::{CoveyServer, CoveyServerBuilder};

pub mod prelude {
    pub use crate::{CoveyError, CoveyServer, CoveyServerBuilder, ServerConfig};
    pub use covey_protocol::{
        BoundingBox, ClientMessage, ConversationArea, ConversationAreaCreateRequest, Direction,
        Envelope, Player, PlayerId, ResponseEnvelope, ServerMessage, SessionToken,
        TownCreateRequest, TownCreateResponse, TownDeleteRequest, TownId, TownJoinRequest,
        TownJoinResponse, TownListing, TownRequest, TownResponse, TownUpdateRequest,
        UserLocation,
    };
    pub use covey_session::{LocalVideoTokens, SessionError, VideoTokenProvider};
    pub use covey_town::TownConfig;
}
