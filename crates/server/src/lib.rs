//! Authoritative cell-arena simulation library.

pub mod clock;
pub mod collision;
pub mod config;
pub mod entity;
pub mod error;
pub mod mechanics;
pub mod server;
pub mod storage;
pub mod world;

// Re-export commonly used types
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use error::{ErrorKind, GameError};
pub use server::{Lobby, RoomPhase};
pub use storage::{Change, MemoryStore, Storage, StorageError};
