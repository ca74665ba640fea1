//! The process-wide set of towns.
//!
//! One `TownRegistry` is constructed at start-up and handed to request
//! handlers; there is no global instance. Each town sits behind its own
//! mutex. The registry's own lock only guards the town table and is never
//! held while waiting for a town, so a busy town cannot stall the others.

use std::sync::Arc;

use covey_protocol::{TownId, TownListing};
use covey_session::{VideoTokenProvider, new_town_id};
use tokio::sync::{Mutex, RwLock};

use crate::{TownConfig, TownController, TownError};

/// Shared, lockable handle to one town.
pub type TownHandle<V> = Arc<Mutex<TownController<V>>>;

/// All live towns, in creation order.
pub struct TownRegistry<V> {
    towns: RwLock<Vec<(TownId, TownHandle<V>)>>,
    config: TownConfig,
    video: Arc<V>,
}

impl<V: VideoTokenProvider> TownRegistry<V> {
    pub fn new(config: TownConfig, video: Arc<V>) -> Self {
        Self {
            towns: RwLock::new(Vec::new()),
            config,
            video,
        }
    }

    pub fn config(&self) -> &TownConfig {
        &self.config
    }

    pub async fn len(&self) -> usize {
        self.towns.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.towns.read().await.is_empty()
    }

    /// Creates a town with a fresh ID and update password.
    ///
    /// A town named exactly like the configured demo town ID gets that ID,
    /// unless a town with it already exists.
    pub async fn create_town(
        &self,
        friendly_name: impl Into<String>,
        is_publicly_listed: bool,
    ) -> TownHandle<V> {
        let friendly_name = friendly_name.into();
        let mut towns = self.towns.write().await;
        let town_id = match &self.config.demo_town_id {
            Some(demo) if *demo == friendly_name && !contains(&towns, demo) => {
                TownId::new(demo.clone())
            }
            _ => unused_town_id(&towns),
        };

        tracing::info!(%town_id, %friendly_name, is_publicly_listed, "town created");

        let controller = TownController::new(
            town_id.clone(),
            friendly_name,
            is_publicly_listed,
            self.config.capacity,
            Arc::clone(&self.video),
        );
        let handle = Arc::new(Mutex::new(controller));
        towns.push((town_id, Arc::clone(&handle)));
        handle
    }

    pub async fn get_controller_for_town(&self, town_id: &TownId) -> Option<TownHandle<V>> {
        self.towns
            .read()
            .await
            .iter()
            .find(|(id, _)| id == town_id)
            .map(|(_, handle)| Arc::clone(handle))
    }

    /// Summaries of publicly listed towns. Occupancy counts live
    /// connections, not players.
    pub async fn get_towns(&self) -> Vec<TownListing> {
        let handles: Vec<TownHandle<V>> = self
            .towns
            .read()
            .await
            .iter()
            .map(|(_, handle)| Arc::clone(handle))
            .collect();

        let mut listings = Vec::new();
        for handle in handles {
            let town = handle.lock().await;
            if town.is_publicly_listed() {
                listings.push(TownListing {
                    town_id: town.town_id().clone(),
                    friendly_name: town.friendly_name().to_owned(),
                    current_occupancy: town.occupancy(),
                    maximum_occupancy: town.capacity(),
                });
            }
        }
        listings
    }

    /// Changes a town's name and/or listing flag. `None` leaves a field
    /// as it is.
    ///
    /// # Errors
    /// - [`TownError::TownNotFound`]
    /// - [`TownError::Unauthorized`] for a wrong password
    /// - [`TownError::Validation`] for an empty new name
    ///
    /// Nothing changes on error.
    pub async fn try_update_town(
        &self,
        town_id: &TownId,
        password: &str,
        friendly_name: Option<String>,
        is_publicly_listed: Option<bool>,
    ) -> Result<(), TownError> {
        let handle = self
            .get_controller_for_town(town_id)
            .await
            .ok_or_else(|| TownError::TownNotFound(town_id.clone()))?;
        let mut town = handle.lock().await;

        if !self.password_matches(&town, password) {
            return Err(TownError::Unauthorized(town_id.clone()));
        }
        if friendly_name.as_deref() == Some("") {
            return Err(TownError::Validation("friendly name must not be empty".into()));
        }

        if let Some(name) = friendly_name {
            town.set_friendly_name(name);
        }
        if let Some(listed) = is_publicly_listed {
            town.set_publicly_listed(listed);
        }
        tracing::info!(%town_id, friendly_name = %town.friendly_name(), listed = town.is_publicly_listed(), "town updated");
        Ok(())
    }

    pub async fn update_town(
        &self,
        town_id: &TownId,
        password: &str,
        friendly_name: Option<String>,
        is_publicly_listed: Option<bool>,
    ) -> bool {
        match self
            .try_update_town(town_id, password, friendly_name, is_publicly_listed)
            .await
        {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(%town_id, error = %e, "town update refused");
                false
            }
        }
    }

    /// Deletes a town. Every listener is told the town is closing once
    /// it is out of the table.
    ///
    /// # Errors
    /// [`TownError::TownNotFound`] or [`TownError::Unauthorized`].
    pub async fn try_delete_town(&self, town_id: &TownId, password: &str) -> Result<(), TownError> {
        let handle = self
            .get_controller_for_town(town_id)
            .await
            .ok_or_else(|| TownError::TownNotFound(town_id.clone()))?;
        let mut town = handle.lock().await;
        if !self.password_matches(&town, password) {
            return Err(TownError::Unauthorized(town_id.clone()));
        }

        // The town lock is held, so a concurrent delete of the same town
        // finds it gone here.
        {
            let mut towns = self.towns.write().await;
            let before = towns.len();
            towns.retain(|(_, h)| !Arc::ptr_eq(h, &handle));
            if towns.len() == before {
                return Err(TownError::TownNotFound(town_id.clone()));
            }
        }

        town.disconnect_all_players();
        tracing::info!(%town_id, "town deleted");
        Ok(())
    }

    pub async fn delete_town(&self, town_id: &TownId, password: &str) -> bool {
        match self.try_delete_town(town_id, password).await {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(%town_id, error = %e, "town delete refused");
                false
            }
        }
    }

    fn password_matches(&self, town: &TownController<V>, password: &str) -> bool {
        town.update_password() == password
            || self
                .config
                .master_password
                .as_deref()
                .is_some_and(|master| master == password)
    }
}

fn contains<V>(towns: &[(TownId, TownHandle<V>)], town_id: &str) -> bool {
    towns.iter().any(|(id, _)| id.as_str() == town_id)
}

fn unused_town_id<V>(towns: &[(TownId, TownHandle<V>)]) -> TownId {
    loop {
        let id = new_town_id();
        if !contains(towns, id.as_str()) {
            return id;
        }
    }
}
