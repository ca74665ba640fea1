//! Error types for the session layer.

/// Errors that can occur while issuing or managing sessions.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The external video-token provider could not issue a credential.
    /// Covey never retries; the join that needed it fails.
    #[error("video token request failed: {0}")]
    VideoToken(String),

    /// A session's video credential can only be set once.
    #[error("video token already issued for this session")]
    VideoTokenAlreadySet,
}
