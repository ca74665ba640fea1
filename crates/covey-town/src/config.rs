//! Town configuration.

use serde::{Deserialize, Serialize};

/// Advertised maximum occupancy of a town.
pub const DEFAULT_CAPACITY: usize = 50;

/// Process-wide settings shared by every town in a registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TownConfig {
    /// Reported as `maximumOccupancy` in town listings. Joins beyond it
    /// are not refused.
    pub capacity: usize,

    /// A town created with exactly this friendly name gets it as its ID,
    /// so it is reachable at a well-known address.
    pub demo_town_id: Option<String>,

    /// Unlocks update and delete for every town when set.
    pub master_password: Option<String>,
}

impl Default for TownConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            demo_town_id: None,
            master_password: None,
        }
    }
}
