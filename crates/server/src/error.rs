//! Game error types.

use crate::storage::StorageError;
use protocol::{PlayerId, ProtocolError, RoomId};
use thiserror::Error;

/// Failures returned by room operations. None of these crash a room.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("Invalid request: {0}")]
    Validation(#[from] ProtocolError),

    #[error("Split direction must not be the zero vector")]
    InvalidDirection,

    #[error("Room {0} not found")]
    RoomNotFound(RoomId),

    #[error("Player {0} not found")]
    PlayerNotFound(PlayerId),

    #[error("Target not found")]
    TargetNotFound,

    #[error("Player is dead")]
    PlayerDead,

    #[error("Player is already alive")]
    AlreadyAlive,

    #[error("A player cannot consume itself")]
    SelfTarget,

    #[error("No cell can split")]
    SplitNotAllowed,

    #[error("Room is full ({0} players)")]
    RoomFull(u32),

    #[error("No cell is large enough and close enough to eat the target")]
    NotEligible,

    #[error("No cell is touching the target")]
    NotInRange,

    #[error("Room is closed")]
    RoomClosed,

    #[error("Storage failure: {0}")]
    Storage(#[from] StorageError),
}

/// Coarse error classes the transport maps to its own status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    NotFound,
    PreconditionFailed,
    NotEligible,
    RoomClosed,
    Unavailable,
}

impl ErrorKind {
    /// Stable machine-readable code.
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::Validation => "VALIDATION_ERROR",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::PreconditionFailed => "PRECONDITION_FAILED",
            ErrorKind::NotEligible => "NOT_ELIGIBLE",
            ErrorKind::RoomClosed => "ROOM_CLOSED",
            ErrorKind::Unavailable => "UNAVAILABLE",
        }
    }
}

impl GameError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GameError::Validation(_) | GameError::InvalidDirection => ErrorKind::Validation,
            GameError::RoomNotFound(_) | GameError::PlayerNotFound(_) | GameError::TargetNotFound => {
                ErrorKind::NotFound
            }
            GameError::PlayerDead
            | GameError::AlreadyAlive
            | GameError::SelfTarget
            | GameError::SplitNotAllowed
            | GameError::RoomFull(_) => ErrorKind::PreconditionFailed,
            GameError::NotEligible | GameError::NotInRange => ErrorKind::NotEligible,
            GameError::RoomClosed => ErrorKind::RoomClosed,
            GameError::Storage(_) => ErrorKind::Unavailable,
        }
    }
}
