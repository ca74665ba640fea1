//! Unified error type for the Covey server.

use covey_protocol::ProtocolError;
use covey_session::SessionError;
use covey_town::TownError;
use covey_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// `#[from]` on each variant lets `?` convert sub-crate errors.
#[derive(Debug, thiserror::Error)]
pub enum CoveyError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Town(#[from] TownError),
}
