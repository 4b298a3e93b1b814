//! Row-density clearing and king-directed gravity (`spec.md` §4.6).
//!
//! Grounded on the teacher's `clear_full_rows` (two-pointer scan, `ArrayVec`
//! result of cleared row indices), generalized from "every cell full" to
//! "longest consecutive run >= threshold" and from one fixed gravity
//! direction to "toward each player's own king".

use std::collections::{HashMap, HashSet};

use arrayvec::ArrayVec;

use crate::board::{Board, Item};
use crate::islands::Islands;
use crate::player::{HomeZone, PlayerId};

/// Up to 8 rows can plausibly clear from a single placement cascade.
pub type ClearedRows = ArrayVec<i32, 8>;

pub struct RowClearer;

impl RowClearer {
    /// `true` iff (x,z) sits inside a home zone that currently holds at
    /// least one of that zone owner's own chess pieces, or the cell's
    /// non-home occupant belongs to a currently paused player (`spec.md`
    /// §4.7: "their cells are skipped by RowClearer").
    fn is_safe(board: &Board, zones: &[HomeZone], paused: &HashSet<PlayerId>, x: i32, z: i32) -> bool {
        zones
            .iter()
            .any(|zone| zone.contains(x, z) && Self::zone_has_own_chess(board, zone))
            || board
                .get(x, z)
                .is_some_and(|items| items.iter().any(|i| !i.is_home() && paused.contains(&i.owner())))
    }

    fn zone_has_own_chess(board: &Board, zone: &HomeZone) -> bool {
        for zx in zone.min_x()..=zone.max_x() {
            for zz in zone.min_z()..=zone.max_z() {
                if board.has_type(zx, zz, |i| i.is_chess() && i.owner() == zone.player) {
                    return true;
                }
            }
        }
        false
    }

    /// Scans every Z row with occupied cells; clears any row whose longest
    /// consecutive occupied-and-unsafe run reaches `required_consecutive`.
    /// Returns the set of cleared row indices. Caller must run gravity after.
    pub fn clear_rows(
        board: &mut Board,
        zones: &[HomeZone],
        required_consecutive: u32,
        paused: &HashSet<PlayerId>,
    ) -> ClearedRows {
        let bounds = match board.bounds() {
            Some(b) => b,
            None => return ClearedRows::new(),
        };

        let mut cleared = ClearedRows::new();
        for z in bounds.min_z..=bounds.max_z {
            if cleared.is_full() {
                break;
            }
            if Self::longest_unsafe_run(board, zones, paused, z, bounds.min_x, bounds.max_x) >= required_consecutive {
                Self::clear_row(board, zones, paused, z, bounds.min_x, bounds.max_x);
                let _ = cleared.try_push(z);
            }
        }
        cleared
    }

    fn longest_unsafe_run(
        board: &Board,
        zones: &[HomeZone],
        paused: &HashSet<PlayerId>,
        z: i32,
        min_x: i32,
        max_x: i32,
    ) -> u32 {
        let mut longest = 0u32;
        let mut current = 0u32;
        for x in min_x..=max_x {
            let occupied = board.has_occupant(x, z);
            let safe = Self::is_safe(board, zones, paused, x, z);
            if occupied && !safe {
                current += 1;
                longest = longest.max(current);
            } else {
                current = 0;
            }
        }
        longest
    }

    fn clear_row(board: &mut Board, zones: &[HomeZone], paused: &HashSet<PlayerId>, z: i32, min_x: i32, max_x: i32) {
        for x in min_x..=max_x {
            if Self::is_safe(board, zones, paused, x, z) {
                continue;
            }
            while board.remove_where(x, z, |i| !i.is_home()).is_some() {}
        }
    }

    /// Each surviving non-safe cell tries to move one step toward its
    /// owner's king, along the axis with the larger absolute delta (ties
    /// toward Z), iterating until no cell moves. Contested destinations are
    /// resolved in increasing-(x,z) order. Returns the set of players whose
    /// content moved, for the caller to re-run `ReconcileIslands` on.
    pub fn apply_gravity(
        board: &mut Board,
        zones: &[HomeZone],
        king_positions: &HashMap<PlayerId, (i32, i32)>,
        paused: &HashSet<PlayerId>,
    ) -> GravityResult {
        let mut moved_players = std::collections::HashSet::new();
        let mut piece_moves = Vec::new();

        loop {
            let mut moves: Vec<((i32, i32), (i32, i32))> = Vec::new();
            let mut claimed_destinations = std::collections::HashSet::new();

            let mut candidates: Vec<(i32, i32)> = board.occupied_coords().collect();
            candidates.sort();

            for (x, z) in candidates {
                if Self::is_safe(board, zones, paused, x, z) {
                    continue;
                }
                let owner = match board.get(x, z).and_then(|l| l.iter().find(|i| !i.is_home())) {
                    Some(item) => item.owner(),
                    None => continue,
                };
                let (kx, kz) = match king_positions.get(&owner) {
                    Some(pos) => *pos,
                    None => continue,
                };
                let dx = kx - x;
                let dz = kz - z;
                if dx == 0 && dz == 0 {
                    continue;
                }
                // Ties break toward Z (spec.md §4.6).
                let (step_x, step_z) = if dx.abs() > dz.abs() {
                    (dx.signum(), 0)
                } else {
                    (0, dz.signum())
                };
                let dest = (x + step_x, z + step_z);
                if board.has_occupant(dest.0, dest.1) {
                    continue;
                }
                if claimed_destinations.contains(&dest) {
                    continue;
                }
                claimed_destinations.insert(dest);
                moves.push(((x, z), dest));
            }

            if moves.is_empty() {
                break;
            }

            for ((sx, sz), (dx, dz)) in moves {
                let items: Vec<Item> = board
                    .get(sx, sz)
                    .map(|l| l.iter().filter(|i| !i.is_home()).cloned().collect())
                    .unwrap_or_default();
                for item in items {
                    board.remove_where(sx, sz, |i| item_matches(i, &item));
                    board.append(dx, dz, item.clone());
                    moved_players.insert(item.owner());
                    if let Item::Chess { piece_id, .. } = item {
                        piece_moves.push((piece_id, dx, dz));
                    }
                }
            }
        }

        let mut players: Vec<PlayerId> = moved_players.into_iter().collect();
        players.sort();
        GravityResult {
            moved_players: players,
            piece_moves,
        }
    }
}

/// Result of a gravity settle pass: which players had content move (for the
/// caller to re-run `ReconcileIslands` on) and the new cell for every chess
/// piece that moved (for the caller to sync its piece arena's cached x/z).
#[derive(Debug, Clone, Default)]
pub struct GravityResult {
    pub moved_players: Vec<PlayerId>,
    pub piece_moves: Vec<(crate::board::PieceId, i32, i32)>,
}

/// Gravity never changes a chess piece's identity, only its cell — the
/// caller is responsible for updating the piece arena's cached (x,z) to
/// match afterward by re-deriving it from `moved_players`. `Board` itself
/// only tracks position implicitly via cell key.
fn item_matches(a: &Item, b: &Item) -> bool {
    match (a, b) {
        (
            Item::Tetromino { player: p1, kind: k1, placed_at: t1 },
            Item::Tetromino { player: p2, kind: k2, placed_at: t2 },
        ) => p1 == p2 && k1 == k2 && t1 == t2,
        (
            Item::Chess { player: p1, piece_type: t1, piece_id: id1 },
            Item::Chess { player: p2, piece_type: t2, piece_id: id2 },
        ) => p1 == p2 && t1 == t2 && id1 == id2,
        _ => false,
    }
}

/// Convenience wrapper combining `clear_rows` + `apply_gravity` +
/// `ReconcileIslands` for every affected player, as the engines call it
/// after a mutation (`spec.md` §4.3, §4.4, §4.6).
pub struct SettleOutcome {
    pub cleared_rows: ClearedRows,
    pub gravity: GravityResult,
    pub orphans: Vec<crate::islands::OrphanEvent>,
}

pub fn clear_and_settle(
    board: &mut Board,
    zones: &[HomeZone],
    required_consecutive: u32,
    king_positions: &HashMap<PlayerId, (i32, i32)>,
    paused: &HashSet<PlayerId>,
) -> SettleOutcome {
    let cleared_rows = RowClearer::clear_rows(board, zones, required_consecutive, paused);
    let gravity = RowClearer::apply_gravity(board, zones, king_positions, paused);
    let mut orphans = Vec::new();
    for player in &gravity.moved_players {
        if let Some(&(kx, kz)) = king_positions.get(player) {
            orphans.extend(Islands::reconcile(board, *player, kx, kz));
        }
    }
    SettleOutcome {
        cleared_rows,
        gravity,
        orphans,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn tetromino(player: PlayerId) -> Item {
        Item::Tetromino {
            player,
            kind: crate::pieces::PieceKind::I,
            placed_at: 0,
        }
    }

    #[test]
    fn clears_a_row_with_a_long_enough_unsafe_run() {
        let mut board = Board::new();
        let p = Uuid::new_v4();
        for x in 0..8 {
            board.append(x, 0, tetromino(p));
        }
        let cleared = RowClearer::clear_rows(&mut board, &[], 8, &HashSet::new());
        assert_eq!(cleared.as_slice(), &[0]);
        for x in 0..8 {
            assert!(board.get(x, 0).is_none());
        }
    }

    #[test]
    fn short_run_does_not_clear() {
        let mut board = Board::new();
        let p = Uuid::new_v4();
        for x in 0..5 {
            board.append(x, 0, tetromino(p));
        }
        let cleared = RowClearer::clear_rows(&mut board, &[], 8, &HashSet::new());
        assert!(cleared.is_empty());
        for x in 0..5 {
            assert!(board.get(x, 0).is_some());
        }
    }

    #[test]
    fn a_paused_players_cells_survive_clearing() {
        let mut board = Board::new();
        let p = Uuid::new_v4();
        for x in 0..8 {
            board.append(x, 0, tetromino(p));
        }
        let paused: HashSet<PlayerId> = [p].into_iter().collect();
        let cleared = RowClearer::clear_rows(&mut board, &[], 8, &paused);
        assert!(cleared.is_empty());
        for x in 0..8 {
            assert!(board.get(x, 0).is_some());
        }
    }

    #[test]
    fn safe_home_zone_cells_survive_clearing() {
        let mut board = Board::new();
        let p = Uuid::new_v4();
        for x in 0..9 {
            board.append(x, 0, tetromino(p));
        }
        let zone = HomeZone {
            player: p,
            x: 6,
            z: 0,
            width: 4,
            height: 2,
            orientation: 0,
            last_occupied_check: std::time::Instant::now(),
        };
        board.append(
            5,
            0,
            Item::Chess {
                player: p,
                piece_type: crate::chess::PieceType::Pawn,
                piece_id: 1,
            },
        );
        let cleared = RowClearer::clear_rows(&mut board, &[zone], 8, &HashSet::new());
        assert_eq!(cleared.as_slice(), &[0]);
        for x in 4..8 {
            assert!(board.get(x, 0).is_some(), "home zone cell {x} should survive");
        }
        for x in [0, 1, 2, 3] {
            assert!(board.get(x, 0).is_none(), "non-home cell {x} should clear");
        }
    }
}
