//! Running games: one actor per game plus the registry that finds them.
//!
//! ## Overview
//!
//! - **Game master**: a tokio task that owns one engine. Joins, leaves,
//!   moves, resets and suggestion requests arrive on its control channel;
//!   every change is pushed to each viewer as a `ServerEvent` masked for
//!   that viewer's role
//! - **Seats**: the first players to register take the seats, later ones
//!   spectate. A player who disconnects keeps their seat for a grace period
//! - **Registry**: maps game ids to handles. It is the only shared state
//!
//! ## Usage
//!
//! ```rust
//! use hexz::core::PlayerId;
//! use hexz::master::GameRegistry;
//! use hexz::rules::GameType;
//!
//! # tokio_test();
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn tokio_test() {
//! let registry = GameRegistry::default();
//! let game = registry.create_game(GameType::Classic).unwrap();
//!
//! let mut alice = game.register(PlayerId::from("alice")).await.unwrap();
//! assert_eq!(alice.role, 1);
//!
//! let snapshot = alice.events.recv().await.unwrap();
//! assert!(snapshot.board.is_some());
//! # }
//! ```

mod actor;
pub mod config;
pub mod event;
pub mod message;
mod registry;

pub use actor::GameHandle;
pub use config::{MasterConfig, RegistryConfig};
pub use event::{BoardView, ServerEvent};
pub use message::{ControlMessage, MoveRequest, Registration, SuggestResponse};
pub use registry::{GameId, GameInfo, GameRegistry};
