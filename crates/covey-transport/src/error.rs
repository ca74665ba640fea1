/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The peer is gone; nothing more can be sent.
    #[error("connection closed: {0}")]
    ConnectionClosed(String),

    /// Writing a frame failed.
    #[error("send failed: {0}")]
    SendFailed(#[source] std::io::Error),

    /// Reading a frame failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] std::io::Error),

    /// Binding, accepting, or upgrading a connection failed.
    #[error("accept failed: {0}")]
    AcceptFailed(#[source] std::io::Error),
}

#[cfg_attr(not(feature = "websocket"), allow(dead_code))]
impl TransportError {
    pub(crate) fn send(e: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::SendFailed(std::io::Error::new(std::io::ErrorKind::BrokenPipe, e))
    }

    pub(crate) fn receive(e: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::ReceiveFailed(std::io::Error::new(std::io::ErrorKind::ConnectionReset, e))
    }
}
