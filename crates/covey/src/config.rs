//! Command-line and environment configuration for `covey-server`.

use clap::Parser;
use covey_town::{DEFAULT_CAPACITY, TownConfig};

/// Default listen address.
pub const DEFAULT_BIND: &str = "127.0.0.1:8081";

#[derive(Debug, Clone, Parser)]
#[command(name = "covey-server", version, about = "Real-time town presence server")]
pub struct ServerConfig {
    /// Address to listen on for WebSocket connections.
    #[arg(long, env = "COVEY_BIND", default_value = DEFAULT_BIND)]
    pub bind: String,

    /// Friendly name (and ID) of a town created at start-up.
    #[arg(long, env = "DEMO_TOWN_ID")]
    pub demo_town_id: Option<String>,

    /// Password that can update or delete any town.
    #[arg(long, env = "MASTER_TOWN_PASSWORD")]
    pub master_password: Option<String>,

    /// Advertised maximum occupancy per town.
    #[arg(long, env = "TOWN_CAPACITY", default_value_t = DEFAULT_CAPACITY)]
    pub capacity: usize,
}

impl ServerConfig {
    pub fn town_config(&self) -> TownConfig {
        TownConfig {
            capacity: self.capacity,
            demo_town_id: self.demo_town_id.clone(),
            master_password: self.master_password.clone(),
        }
    }
}
