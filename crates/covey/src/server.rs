//! `CoveyServer` builder and accept loop.
//!
//! Ties the layers together: transport → protocol → town registry.

use std::net::SocketAddr;
use std::sync::Arc;

use covey_protocol::{Codec, JsonCodec};
use covey_session::VideoTokenProvider;
use covey_town::{TownConfig, TownRegistry};
use covey_transport::{Transport, WebSocketTransport};

use crate::CoveyError;
use crate::config::DEFAULT_BIND;
use crate::handler::handle_connection;

/// Shared server state passed to each connection task.
pub(crate) struct ServerState<V: VideoTokenProvider, C: Codec> {
    pub(crate) towns: TownRegistry<V>,
    pub(crate) codec: C,
}

/// Builder for configuring and starting a Covey server.
///
/// # Example
///
/// ```rust,no_run
/// use covey::prelude::*;
///
/// # async fn start() -> Result<(), CoveyError> {
/// let server = CoveyServerBuilder::new()
///     .bind("0.0.0.0:8081")
///     .town_config(TownConfig::default())
///     .build(LocalVideoTokens)
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct CoveyServerBuilder {
    bind_addr: String,
    town_config: TownConfig,
}

impl CoveyServerBuilder {
    pub fn new() -> Self {
        Self {
            bind_addr: DEFAULT_BIND.to_string(),
            town_config: TownConfig::default(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    pub fn town_config(mut self, config: TownConfig) -> Self {
        self.town_config = config;
        self
    }

    /// Binds the transport and sets up the registry. When a demo town is
    /// configured it is created here, unlisted, so it is joinable by its
    /// fixed ID from the start.
    pub async fn build<V: VideoTokenProvider>(
        self,
        video: V,
    ) -> Result<CoveyServer<V, JsonCodec>, CoveyError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;

        let demo_town = self.town_config.demo_town_id.clone();
        let registry = TownRegistry::new(self.town_config, Arc::new(video));
        if let Some(name) = demo_town {
            registry.create_town(name, false).await;
        }

        let state = Arc::new(ServerState {
            towns: registry,
            codec: JsonCodec,
        });

        Ok(CoveyServer { transport, state })
    }
}

impl Default for CoveyServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Covey server. Call [`run()`](Self::run) to start accepting
/// connections.
pub struct CoveyServer<V: VideoTokenProvider, C: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<V, C>>,
}

impl<V, C> CoveyServer<V, C>
where
    V: VideoTokenProvider,
    C: Codec,
{
    pub fn local_addr(&self) -> Result<SocketAddr, CoveyError> {
        Ok(self.transport.local_addr()?)
    }

    /// Accepts connections and spawns a handler task for each. Runs until
    /// the future is dropped.
    pub async fn run(mut self) -> Result<(), CoveyError> {
        tracing::info!("Covey server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
