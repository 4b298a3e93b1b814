//! Chess movement legality, path obstruction, and move execution (`spec.md` §4.4).
//!
//! Grounded on `trilltino-XFChess/crates/chess_engine`'s error and lifecycle
//! shapes; the move-legality rules themselves are this crate's own, since the
//! teacher engine's board is a fixed 8x8 array unsuited to an unbounded board.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::board::{Board, Item, PieceId};
use crate::player::PlayerId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceType {
    Pawn,
    Rook,
    Knight,
    Bishop,
    Queen,
    King,
}

impl PieceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PieceType::Pawn => "pawn",
            PieceType::Rook => "rook",
            PieceType::Knight => "knight",
            PieceType::Bishop => "bishop",
            PieceType::Queen => "queen",
            PieceType::King => "king",
        }
    }

    /// Balance cost to buy a piece onto the board (`spec.md` §6 `purchase_piece`).
    /// `None` for the king, which is never purchasable — it only ever exists
    /// from the standard-16 join layout.
    pub fn purchase_price(&self) -> Option<u32> {
        match self {
            PieceType::Pawn => Some(10),
            PieceType::Knight => Some(30),
            PieceType::Bishop => Some(30),
            PieceType::Rook => Some(50),
            PieceType::Queen => Some(90),
            PieceType::King => None,
        }
    }
}

/// Canonical chess piece record, owned by the arena on [`crate::game::Game`].
/// Cells reference pieces by id only; never embed this struct in a cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChessPiece {
    pub id: PieceId,
    pub piece_type: PieceType,
    pub player: PlayerId,
    pub x: i32,
    pub z: i32,
    /// 0..=3, set once at creation from the owning home zone's orientation.
    pub orientation: u8,
    pub has_moved: bool,
    pub move_distance: u32,
}

impl ChessPiece {
    pub fn new(id: PieceId, piece_type: PieceType, player: PlayerId, x: i32, z: i32, orientation: u8) -> Self {
        Self {
            id,
            piece_type,
            player,
            x,
            z,
            orientation,
            has_moved: false,
            move_distance: 0,
        }
    }

    /// Unit forward vector (dx, dz) derived from this piece's fixed orientation:
    /// the reverse of `SpiralPlacer::DIRECTION_CYCLE[orientation]`, the
    /// direction the owning home zone was displaced from the board center, so
    /// "forward" always means "toward center" (`spec.md` §4.4: "Forward one
    /// (toward board center relative to orientation)").
    pub fn forward_vector(&self) -> (i32, i32) {
        let (dx, dz) = crate::spiral::DIRECTION_CYCLE[(self.orientation % 4) as usize];
        (-dx, -dz)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MoveOutcome {
    pub captured: Option<PieceId>,
    pub captured_was_king: bool,
    pub promoted_to: Option<PieceType>,
}

/// Pure legality/path/execution logic over a [`Board`] and piece arena.
/// Holds no state of its own.
pub struct ChessEngine;

impl ChessEngine {
    /// Per-type destination legality, ignoring obstruction (`spec.md` §4.4).
    pub fn is_type_legal(piece: &ChessPiece, tx: i32, tz: i32) -> bool {
        let dx = tx - piece.x;
        let dz = tz - piece.z;
        if dx == 0 && dz == 0 {
            return false;
        }
        match piece.piece_type {
            PieceType::Rook => dx == 0 || dz == 0,
            PieceType::Bishop => dx.abs() == dz.abs(),
            PieceType::Queen => dx == 0 || dz == 0 || dx.abs() == dz.abs(),
            PieceType::King => dx.abs() <= 1 && dz.abs() <= 1,
            PieceType::Knight => {
                let (ax, az) = (dx.abs(), dz.abs());
                (ax, az) == (1, 2) || (ax, az) == (2, 1)
            }
            PieceType::Pawn => Self::is_pawn_move_legal(piece, dx, dz),
        }
    }

    fn is_pawn_move_legal(piece: &ChessPiece, dx: i32, dz: i32) -> bool {
        let (fx, fz) = piece.forward_vector();
        if dx == fx && dz == fz {
            return true;
        }
        if !piece.has_moved && dx == 2 * fx && dz == 2 * fz {
            return true;
        }
        let lateral = (fz, fx);
        let diag_left = (fx + lateral.0, fz + lateral.1);
        let diag_right = (fx - lateral.0, fz - lateral.1);
        (dx, dz) == diag_left || (dx, dz) == diag_right
    }

    /// True iff pawn at (dx,dz) is a one-step diagonal (capture-only) move.
    pub fn is_pawn_diagonal(piece: &ChessPiece, dx: i32, dz: i32) -> bool {
        let (fx, fz) = piece.forward_vector();
        let lateral = (fz, fx);
        let diag_left = (fx + lateral.0, fz + lateral.1);
        let diag_right = (fx - lateral.0, fz - lateral.1);
        (dx, dz) == diag_left || (dx, dz) == diag_right
    }

    /// Walks the straight line from (fx,fz) to (tx,tz) exclusive of both
    /// endpoints; `None` for a knight move (no intermediate cells).
    pub fn intermediate_cells(fx: i32, fz: i32, tx: i32, tz: i32) -> Vec<(i32, i32)> {
        let dx = (tx - fx).signum();
        let dz = (tz - fz).signum();
        let steps = (tx - fx).abs().max((tz - fz).abs());
        let mut cells = Vec::new();
        for step in 1..steps {
            cells.push((fx + dx * step, fz + dz * step));
        }
        cells
    }

    /// Full legality check: type shape, path obstruction, target occupancy,
    /// (for pawns) diagonal-implies-capture / forward-implies-empty, and a
    /// paused player's pieces are never a legal capture target (`spec.md`
    /// §4.7: "their chess pieces cannot be captured" while paused).
    pub fn is_move_legal(
        board: &Board,
        piece: &ChessPiece,
        tx: i32,
        tz: i32,
        paused: &HashSet<PlayerId>,
    ) -> bool {
        if !Self::is_type_legal(piece, tx, tz) {
            return false;
        }
        let dx = tx - piece.x;
        let dz = tz - piece.z;

        if piece.piece_type != PieceType::Knight {
            for (ix, iz) in Self::intermediate_cells(piece.x, piece.z, tx, tz) {
                if board.has_type(ix, iz, |i| i.is_chess()) {
                    return false;
                }
            }
        }

        let target_chess = board.chess_item_at(tx, tz);
        match piece.piece_type {
            PieceType::Pawn => {
                let diagonal = Self::is_pawn_diagonal(piece, dx, dz);
                match target_chess {
                    Some(Item::Chess { player, .. }) if *player != piece.player => {
                        diagonal && !paused.contains(player)
                    }
                    Some(_) => false,
                    None => !diagonal,
                }
            }
            _ => match target_chess {
                Some(Item::Chess { player, .. }) => *player != piece.player && !paused.contains(player),
                Some(_) => true,
                None => true,
            },
        }
    }
}
