//! Tetromino placement validation and commit (`spec.md` §4.3).
//!
//! Grounded on `lgn21st-tui-tetris/src/engine/place.rs`'s validate-then-commit
//! structure and dedicated error enum, generalized from a fixed 10-wide board
//! to connectivity against a player's own island or home zone.

use crate::board::{Board, Item};
use crate::islands::Islands;
use crate::pieces::{get_shape, PieceKind, Rotation};
use crate::player::{HomeZone, PlayerId};

const NEIGHBOURS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceOutcome {
    /// Placed for real; carries nothing extra — the caller reads the board.
    Placed,
    /// The piece hit something while airborne and silently vanished.
    Exploded,
}

pub struct TetrominoEngine;

impl TetrominoEngine {
    /// Absolute (x,z) cells the shape occupies, anchored at (anchor_x, anchor_z).
    fn shape_cells(kind: PieceKind, rotation: Rotation, anchor_x: i32, anchor_z: i32) -> [(i32, i32); 4] {
        let shape = get_shape(kind, rotation);
        let mut cells = [(0, 0); 4];
        for (i, (dx, dz)) in shape.iter().enumerate() {
            cells[i] = (anchor_x + dx, anchor_z + dz);
        }
        cells
    }

    /// Validates and (on success) commits a placement. `is_first_placement`
    /// selects between the home-zone-adjacency rule (first placement) and
    /// the island-adjacency rule (subsequent placements); `king_pos` is the
    /// player's king cell, required (and consulted) only for the latter.
    #[allow(clippy::too_many_arguments)]
    pub fn place(
        board: &mut Board,
        player: PlayerId,
        home_zone: &HomeZone,
        kind: PieceKind,
        rotation: Rotation,
        anchor_x: i32,
        anchor_z: i32,
        y: u8,
        placed_at: u64,
        is_first_placement: bool,
        king_pos: Option<(i32, i32)>,
    ) -> Result<PlaceOutcome, TetrominoError> {
        if !(0..=1).contains(&y) {
            return Err(TetrominoError::InvalidFallHeight(y));
        }
        let cells = Self::shape_cells(kind, rotation, anchor_x, anchor_z);
        for (x, z) in cells {
            if !Board::is_legal_coord(x, z) {
                return Err(TetrominoError::OutOfRange(x, z));
            }
        }

        if y == 1 {
            let collides = cells.iter().any(|&(x, z)| board.has_occupant(x, z));
            return if collides {
                Ok(PlaceOutcome::Exploded)
            } else {
                Err(TetrominoError::NotYetLanded)
            };
        }

        for (x, z) in cells {
            if board.has_non_home_occupant(x, z) {
                return Err(TetrominoError::CellOccupied(x, z));
            }
        }

        if !Self::satisfies_connectivity(board, player, home_zone, &cells, is_first_placement, king_pos) {
            return Err(TetrominoError::NotReachableFromKing);
        }

        for (x, z) in cells {
            board.append(
                x,
                z,
                Item::Tetromino {
                    player,
                    kind,
                    placed_at,
                },
            );
        }
        Ok(PlaceOutcome::Placed)
    }

    /// Two independent clauses per `spec.md` §4.3: a filled cell must be
    /// orthogonally adjacent to an existing own item (or, on the first
    /// placement, to the home zone itself), **and** — for any placement past
    /// the first — that adjacent cell must have its own orthogonal path
    /// (through the player's own non-home items) back to the king. Adjacency
    /// alone is not enough: a chain can be locally connected to a stray
    /// placement while that placement's own component has drifted away from
    /// the king since the last reconcile (quiet chess moves don't reconcile).
    fn satisfies_connectivity(
        board: &Board,
        player: PlayerId,
        home_zone: &HomeZone,
        cells: &[(i32, i32); 4],
        is_first_placement: bool,
        king_pos: Option<(i32, i32)>,
    ) -> bool {
        for &(x, z) in cells {
            for (dx, dz) in NEIGHBOURS {
                let (nx, nz) = (x + dx, z + dz);
                if is_first_placement {
                    if home_zone.contains(nx, nz) {
                        return true;
                    }
                    continue;
                }
                let adjacent_to_own = board.has_type(nx, nz, |i| {
                    i.owner() == player && (i.is_tetromino() || i.is_chess())
                });
                if !adjacent_to_own {
                    continue;
                }
                if let Some((kx, kz)) = king_pos {
                    if Islands::has_path_to_king(board, player, nx, nz, kx, kz) {
                        return true;
                    }
                }
            }
        }
        false
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TetrominoError {
    OutOfRange(i32, i32),
    InvalidFallHeight(u8),
    NotYetLanded,
    CellOccupied(i32, i32),
    NotReachableFromKing,
}

impl TetrominoError {
    pub fn code(self) -> &'static str {
        match self {
            TetrominoError::OutOfRange(..) => "invalid_coordinates",
            TetrominoError::InvalidFallHeight(_) => "invalid_rotation",
            TetrominoError::NotYetLanded => "invalid_rotation",
            TetrominoError::CellOccupied(..) => "cell_occupied",
            TetrominoError::NotReachableFromKing => "not_reachable_from_king",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;
    use uuid::Uuid;

    fn home_zone(player: PlayerId) -> HomeZone {
        HomeZone {
            player,
            x: 0,
            z: 0,
            width: 8,
            height: 2,
            orientation: 0,
            last_occupied_check: Instant::now(),
        }
    }

    #[test]
    fn first_placement_adjacent_to_home_zone_succeeds() {
        let mut board = Board::new();
        let p = Uuid::new_v4();
        let zone = home_zone(p);
        // Zone occupies z in [-1, 0]; anchor so the I piece's row lands at
        // z = 1, directly in front of the zone's far edge.
        let outcome = TetrominoEngine::place(
            &mut board,
            p,
            &zone,
            PieceKind::I,
            Rotation::new(0),
            -2,
            0,
            0,
            1,
            true,
            None,
        );
        assert_eq!(outcome, Ok(PlaceOutcome::Placed));
    }

    #[test]
    fn placement_far_from_home_zone_is_rejected() {
        let mut board = Board::new();
        let p = Uuid::new_v4();
        let zone = home_zone(p);
        let outcome = TetrominoEngine::place(
            &mut board, p, &zone, PieceKind::I, Rotation::new(0), 100, 100, 0, 1, true, None,
        );
        assert_eq!(outcome, Err(TetrominoError::NotReachableFromKing));
    }

    #[test]
    fn airborne_collision_explodes_without_mutating_board() {
        let mut board = Board::new();
        let p = Uuid::new_v4();
        let zone = home_zone(p);
        board.append(
            0,
            1,
            Item::Tetromino {
                player: p,
                kind: PieceKind::O,
                placed_at: 0,
            },
        );
        let outcome = TetrominoEngine::place(
            &mut board,
            p,
            &zone,
            PieceKind::O,
            Rotation::new(0),
            -1,
            0,
            1,
            1,
            true,
            None,
        );
        assert_eq!(outcome, Ok(PlaceOutcome::Exploded));
    }

    #[test]
    fn occupied_non_home_cell_is_rejected() {
        let mut board = Board::new();
        let p = Uuid::new_v4();
        let other = Uuid::new_v4();
        let zone = home_zone(p);
        board.append(
            -2,
            1,
            Item::Tetromino {
                player: other,
                kind: PieceKind::O,
                placed_at: 0,
            },
        );
        let outcome = TetrominoEngine::place(
            &mut board,
            p,
            &zone,
            PieceKind::I,
            Rotation::new(0),
            -2,
            0,
            0,
            1,
            true,
            None,
        );
        assert!(matches!(outcome, Err(TetrominoError::CellOccupied(..))));
    }

    #[test]
    fn adjacent_to_own_item_without_a_path_to_king_is_rejected() {
        let mut board = Board::new();
        let p = Uuid::new_v4();
        let zone = home_zone(p);
        // A stray own tetromino cell with no chain back to the king: locally
        // adjacent is not enough on its own past the first placement.
        board.append(10, 10, Item::Tetromino { player: p, kind: PieceKind::O, placed_at: 0 });
        let outcome = TetrominoEngine::place(
            &mut board,
            p,
            &zone,
            PieceKind::I,
            Rotation::new(0),
            10,
            10,
            0,
            1,
            false,
            Some((0, 0)),
        );
        assert_eq!(outcome, Err(TetrominoError::NotReachableFromKing));
    }

    #[test]
    fn adjacent_to_own_item_with_a_path_to_king_succeeds() {
        let mut board = Board::new();
        let p = Uuid::new_v4();
        let zone = home_zone(p);
        board.append(
            9,
            10,
            Item::Chess { player: p, piece_type: crate::chess::PieceType::King, piece_id: 1 },
        );
        board.append(10, 10, Item::Tetromino { player: p, kind: PieceKind::O, placed_at: 0 });
        let outcome = TetrominoEngine::place(
            &mut board,
            p,
            &zone,
            PieceKind::I,
            Rotation::new(0),
            10,
            10,
            0,
            1,
            false,
            Some((9, 10)),
        );
        assert_eq!(outcome, Ok(PlaceOutcome::Placed));
    }
}
