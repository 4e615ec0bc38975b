//! Game entities.
//!
//! In-memory representations of everything a room owns. Conversion to the
//! wire/storage records lives next to each type.

mod cell;
mod food;
mod player;

pub use cell::PlayerCell;
pub use food::Food;
pub use player::Player;
