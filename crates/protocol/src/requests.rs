//! Request payloads for the game procedures.
//!
//! `validate` checks shape and range only. Anything that depends on live room
//! state (alive, ownership, cell counts) is checked by the server.

use serde::{Deserialize, Serialize};

use crate::{Color, PlayerId, ProtocolError, RoomId};

pub const ROOM_NAME_MIN: usize = 1;
pub const ROOM_NAME_MAX: usize = 50;
pub const MAX_PLAYERS_MIN: u32 = 2;
pub const MAX_PLAYERS_MAX: u32 = 100;
pub const PLAYER_NAME_MIN: usize = 1;
pub const PLAYER_NAME_MAX: usize = 20;
/// Upper bound on pellets spawned by one `generateFood` call.
pub const FOOD_BATCH_MAX: u32 = 1000;

fn check_length(field: &'static str, value: &str, min: usize, max: usize) -> Result<(), ProtocolError> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(ProtocolError::BadLength { field, min, max, len });
    }
    Ok(())
}

fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), ProtocolError> {
    if !value.is_finite() {
        return Err(ProtocolError::NotFinite(field));
    }
    if value < min || value > max {
        return Err(ProtocolError::OutOfRange { field, min, max, value });
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRoomInput {
    pub name: String,
    pub max_players: u32,
}

impl CreateRoomInput {
    pub fn validate(&self) -> Result<(), ProtocolError> {
        check_length("name", &self.name, ROOM_NAME_MIN, ROOM_NAME_MAX)?;
        check_range(
            "max_players",
            self.max_players as f64,
            MAX_PLAYERS_MIN as f64,
            MAX_PLAYERS_MAX as f64,
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinRoomInput {
    pub room_id: RoomId,
    pub player_name: String,
    /// Parsed from `#RRGGBB` during deserialization.
    pub color: Color,
}

impl JoinRoomInput {
    pub fn validate(&self) -> Result<(), ProtocolError> {
        check_length("player_name", &self.player_name, PLAYER_NAME_MIN, PLAYER_NAME_MAX)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovePlayerInput {
    pub player_id: PlayerId,
    pub x: f32,
    pub y: f32,
}

impl MovePlayerInput {
    pub fn validate(&self) -> Result<(), ProtocolError> {
        if !self.x.is_finite() {
            return Err(ProtocolError::NotFinite("x"));
        }
        if !self.y.is_finite() {
            return Err(ProtocolError::NotFinite("y"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitPlayerInput {
    pub player_id: PlayerId,
    pub direction_x: f32,
    pub direction_y: f32,
}

impl SplitPlayerInput {
    pub fn validate(&self) -> Result<(), ProtocolError> {
        check_range("direction_x", self.direction_x as f64, -1.0, 1.0)?;
        check_range("direction_y", self.direction_y as f64, -1.0, 1.0)
    }
}

/// What a consume request is aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetType {
    Food,
    Player,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsumeInput {
    pub player_id: PlayerId,
    pub target_type: TargetType,
    pub target_id: uuid::Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RespawnPlayerInput {
    pub player_id: PlayerId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateFoodInput {
    pub room_id: RoomId,
    pub count: u32,
}

impl GenerateFoodInput {
    pub fn validate(&self) -> Result<(), ProtocolError> {
        check_range("count", self.count as f64, 1.0, FOOD_BATCH_MAX as f64)
    }
}
