//! Concrete hexz variants.

pub mod classic;
pub mod freeform;

pub use classic::ClassicGame;
pub use freeform::FreeformGame;
