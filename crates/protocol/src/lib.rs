//! Shared protocol crate for cell-arena.
//!
//! This crate contains:
//! - Wire records (rooms, players, cells, food, game state snapshots)
//! - Request payloads and their shape validation
//! - Shared types (Color, ids, timestamps)

mod error;
pub mod records;
pub mod requests;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use error::ProtocolError;
pub use records::{CellRecord, FoodRecord, GameState, LeaderboardEntry, PlayerRecord, RoomRecord};
pub use requests::{
    ConsumeInput, CreateRoomInput, GenerateFoodInput, JoinRoomInput, MovePlayerInput,
    RespawnPlayerInput, SplitPlayerInput, TargetType,
};

/// Room identifier.
pub type RoomId = uuid::Uuid;
/// Player identifier.
pub type PlayerId = uuid::Uuid;
/// Cell identifier.
pub type CellId = uuid::Uuid;
/// Food pellet identifier.
pub type FoodId = uuid::Uuid;

/// Milliseconds since the Unix epoch.
pub type Timestamp = u64;

/// RGB color used for players and food, written as `#RRGGBB` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl FromStr for Color {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .strip_prefix('#')
            .filter(|h| h.len() == 6 && h.bytes().all(|b| b.is_ascii_hexdigit()))
            .ok_or_else(|| ProtocolError::InvalidColor(s.to_string()))?;

        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|_| ProtocolError::InvalidColor(s.to_string()))
        };
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl TryFrom<String> for Color {
    type Error = ProtocolError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}
