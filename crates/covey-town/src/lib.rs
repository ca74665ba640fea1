//! Towns for Covey.
//!
//! A town is an isolated space where players move around and talk in
//! conversation areas. This crate holds the state machine for one town
//! and the registry of all towns.
//!
//! # Key types
//!
//! - [`TownController`]: players, sessions, conversation areas and
//!   listeners of one town
//! - [`TownListener`]: observer of town events (one per socket)
//! - [`TownRegistry`]: creates, lists, updates and deletes towns
//! - [`TownConfig`]: capacity, demo town and master password
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use covey_protocol::{BoundingBox, ConversationArea, Player, PlayerId, UserLocation};
//! use covey_session::LocalVideoTokens;
//! use covey_town::{TownConfig, TownController, TownRegistry};
//!
//! # tokio_test_block_on(async {
//! let registry = TownRegistry::new(TownConfig::default(), Arc::new(LocalVideoTokens));
//! let handle = registry.create_town("Lobby", true).await;
//!
//! let session = TownController::join(&handle, Player::new(PlayerId::from("p1"), "alice"))
//!     .await
//!     .unwrap();
//! let mut town = handle.lock().await;
//! let area = ConversationArea::new("A", "rust", BoundingBox::new(10.0, 10.0, 20.0, 20.0));
//! assert!(town.add_conversation_area(area));
//!
//! town.update_player_location(session.player_id(), UserLocation::at(10.0, 10.0).in_conversation("A"))
//!     .unwrap();
//! assert_eq!(town.conversation_area("A").unwrap().occupants_by_id.len(), 1);
//! # });
//! # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

mod config;
mod controller;
mod error;
mod listener;
mod registry;

pub use config::{DEFAULT_CAPACITY, TownConfig};
pub use controller::TownController;
pub use error::{AreaRejection, TownError};
pub use listener::{ListenerId, TownListener};
pub use registry::{TownHandle, TownRegistry};
