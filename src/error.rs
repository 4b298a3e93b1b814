//! Error taxonomy for the Shaktris engine
//!
//! One stable `kind` per `spec.md` §6's error table, each carrying enough
//! context for a client-facing `error` message without leaking internals.

use thiserror::Error;

/// Errors returned by actions submitted through the [`crate::scheduler::Scheduler`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShaktrisError {
    #[error("not found")]
    NotFound,

    #[error("action does not match player's current phase")]
    NotYourTurnPhase,

    #[error("rate limited, retry after {wait_ms}ms")]
    RateLimited { wait_ms: u64 },

    #[error("coordinates ({x}, {z}) are out of range")]
    InvalidCoordinates { x: i32, z: i32 },

    #[error("invalid piece type: {0}")]
    InvalidPieceType(String),

    #[error("invalid rotation: {0}")]
    InvalidRotation(u8),

    #[error("target cell is not reachable from the player's king")]
    NotReachableFromKing,

    #[error("cell is occupied")]
    CellOccupied,

    #[error("insufficient funds: need {need}, have {have}")]
    InsufficientFunds { need: u32, have: u32 },

    #[error("path is obstructed")]
    PathObstructed,

    #[error("player has been eliminated")]
    Eliminated,

    #[error("player is busy with a pending action")]
    Busy,

    #[error("internal engine error: {0}")]
    Internal(String),
}

impl ShaktrisError {
    /// The stable string kind used on the wire, matching `spec.md` §6 exactly.
    pub fn kind(&self) -> &'static str {
        match self {
            ShaktrisError::NotFound => "not_found",
            ShaktrisError::NotYourTurnPhase => "not_your_turn_phase",
            ShaktrisError::RateLimited { .. } => "rate_limited",
            ShaktrisError::InvalidCoordinates { .. } => "invalid_coordinates",
            ShaktrisError::InvalidPieceType(_) => "invalid_piece_type",
            ShaktrisError::InvalidRotation(_) => "invalid_rotation",
            ShaktrisError::NotReachableFromKing => "not_reachable_from_king",
            ShaktrisError::CellOccupied => "cell_occupied",
            ShaktrisError::InsufficientFunds { .. } => "insufficient_funds",
            ShaktrisError::PathObstructed => "path_obstructed",
            ShaktrisError::Eliminated => "eliminated",
            ShaktrisError::Busy => "busy",
            ShaktrisError::Internal(_) => "internal",
        }
    }
}

pub type ShaktrisResult<T> = Result<T, ShaktrisError>;
