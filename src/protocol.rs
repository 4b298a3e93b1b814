//! Wire message contracts (`spec.md` §6).
//!
//! Grounded on `lgn21st-tui-tetris/src/adapter/protocol.rs`'s typed
//! request/response structs with an explicit type discriminant; here the
//! discriminant is serde's native `#[serde(tag = "type")]` rather than a
//! hand-rolled `msg_type: String` field, since every payload varies by kind
//! and a tagged enum lets serde do the dispatch instead of a second match.

use serde::{Deserialize, Serialize};

use crate::board::{Bounds, Item, PieceId};
use crate::chess::PieceType;
use crate::diff::{BroadcastPayload, ChangeEntry};
use crate::game::GameId;
use crate::pieces::PieceKind;
use crate::player::PlayerId;
use crate::rowclear::ClearedRows;
use crate::spiral::HomeZoneRect;

/// Envelope carried by every inbound client message (`spec.md` §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub game_id: GameId,
    pub player_id: PlayerId,
    pub nonce: u64,
    #[serde(flatten)]
    pub payload: T,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    JoinGame {
        game_id: Option<GameId>,
        player_name: String,
    },
    SetReady {
        ready: bool,
    },
    GetGameState,
    PlaceTetromino {
        kind: PieceKind,
        rotation: u8,
        x: i32,
        z: i32,
        y: u8,
    },
    MoveChess {
        piece_id: PieceId,
        to_x: i32,
        to_z: i32,
    },
    PurchasePiece {
        piece_type: PieceType,
        x: i32,
        z: i32,
    },
    Pause,
    Resume,
    Leave,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinGameResult {
    pub player_id: PlayerId,
    pub game_id: GameId,
    pub home_zone: HomeZoneRect,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceTetrominoResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exploded: Option<bool>,
    pub completed_rows: Vec<i32>,
}

impl PlaceTetrominoResponse {
    pub fn from_domain(ok: bool, exploded: bool, completed_rows: &ClearedRows) -> Self {
        Self {
            ok,
            exploded: Some(exploded),
            completed_rows: completed_rows.iter().copied().collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveChessResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub captured: Option<PieceId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promoted_to: Option<PieceType>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchasePieceResponse {
    pub ok: bool,
    pub balance: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PauseResumeResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_ms: Option<u64>,
}

/// Server -> client broadcast/event messages (`spec.md` §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    GameUpdate {
        bounds: Option<Bounds>,
        cells: Vec<(i32, i32, PieceId, Vec<Item>)>,
    },
    GameStateDelta {
        changes: Vec<ChangeEntry>,
    },
    TetrominoPlaced {
        player_id: PlayerId,
        exploded: bool,
    },
    ChessMove {
        player_id: PlayerId,
        piece_id: PieceId,
        to_x: i32,
        to_z: i32,
    },
    PieceCaptured {
        piece_id: PieceId,
        by: PlayerId,
    },
    RowsCleared {
        rows: Vec<i32>,
    },
    PawnPromoted {
        piece_id: PieceId,
        piece_type: PieceType,
    },
    PieceOrphaned {
        piece_id: PieceId,
    },
    PlayerJoined {
        player_id: PlayerId,
        name: String,
    },
    PlayerLeft {
        player_id: PlayerId,
    },
    GameOver {
        winner: Option<PlayerId>,
    },
    Error {
        code: String,
        message: String,
    },
}

impl ServerMessage {
    pub fn from_broadcast_payload(payload: BroadcastPayload) -> Self {
        match payload {
            BroadcastPayload::FullState { bounds, cells } => ServerMessage::GameUpdate {
                bounds,
                cells: cells
                    .into_iter()
                    .map(|c| (c.x, c.z, c.id, c.items))
                    .collect(),
            },
            BroadcastPayload::Delta { changes } => ServerMessage::GameStateDelta { changes },
        }
    }

    pub fn error(error: &crate::error::ShaktrisError) -> Self {
        ServerMessage::Error {
            code: error.kind().to_string(),
            message: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn client_message_round_trips_through_json() {
        let msg = ClientMessage::PlaceTetromino {
            kind: PieceKind::I,
            rotation: 1,
            x: 0,
            z: 1,
            y: 0,
        };
        let json = serde_json::to_string(&msg).unwrap();
        let back: ClientMessage = serde_json::from_str(&json).unwrap();
        match back {
            ClientMessage::PlaceTetromino { kind, rotation, .. } => {
                assert_eq!(kind, PieceKind::I);
                assert_eq!(rotation, 1);
            }
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn envelope_flattens_payload_fields() {
        let envelope = Envelope {
            game_id: Uuid::new_v4(),
            player_id: Uuid::new_v4(),
            nonce: 7,
            payload: ClientMessage::Leave,
        };
        let json = serde_json::to_string(&envelope).unwrap();
        assert!(json.contains("\"nonce\":7"));
        assert!(json.contains("\"type\":\"leave\""));
    }

    #[test]
    fn error_message_carries_stable_kind() {
        let err = crate::error::ShaktrisError::CellOccupied;
        let msg = ServerMessage::error(&err);
        match msg {
            ServerMessage::Error { code, .. } => assert_eq!(code, "cell_occupied"),
            _ => panic!("wrong variant"),
        }
    }
}
