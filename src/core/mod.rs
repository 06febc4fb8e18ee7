//! Core building blocks shared by every layer: player identities and
//! per-player storage, the RNG, configuration, and the crate error type.

pub mod player;
pub mod rng;
pub mod config;
pub mod error;

pub use player::{opponent, PlayerId, PlayerMap};
pub use rng::GameRng;
pub use config::HexzConfig;
pub use error::{HexzError, Result};
