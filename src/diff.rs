//! Cell-ID assignment and incremental per-observer change lists (`spec.md` §4.9).
//!
//! Grounded on `lgn21st-tui-tetris/src/adapter/protocol.rs`'s
//! `ObservationMessage`/`BoardSnapshot` ("serialize the whole visible state
//! as one typed struct") and `src/core/snapshot.rs`'s `Default` + `clear()`
//! snapshot pattern.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::board::{Board, Bounds, Item};
use crate::player::PlayerId;

pub type CellId = u64;

/// One (x,z) cell's visible content, keyed by its stable cell-id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellView {
    pub x: i32,
    pub z: i32,
    pub id: CellId,
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEntry {
    pub x: i32,
    pub z: i32,
    pub id: CellId,
    /// `None` means the cell became empty.
    pub new_value: Option<Vec<Item>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BroadcastPayload {
    FullState { bounds: Option<Bounds>, cells: Vec<CellView> },
    Delta { changes: Vec<ChangeEntry> },
}

/// Tracks cell-ids (stable for a coordinate until it empties) and per-
/// observer last-sent snapshots for one [`crate::game::Game`].
#[derive(Debug, Clone, Default)]
pub struct DiffTracker {
    next_cell_id: CellId,
    cell_ids: HashMap<(i32, i32), CellId>,
    observer_snapshots: HashMap<PlayerId, HashMap<(i32, i32), (CellId, Vec<Item>)>>,
    last_bounds: Option<Bounds>,
}

impl DiffTracker {
    pub fn new() -> Self {
        Self {
            next_cell_id: 1,
            cell_ids: HashMap::new(),
            observer_snapshots: HashMap::new(),
            last_bounds: None,
        }
    }

    fn id_for(&mut self, coord: (i32, i32)) -> CellId {
        if let Some(&id) = self.cell_ids.get(&coord) {
            return id;
        }
        let id = self.next_cell_id;
        self.next_cell_id += 1;
        self.cell_ids.insert(coord, id);
        id
    }

    fn retire_empty_cells(&mut self, board: &Board) {
        let stale: Vec<(i32, i32)> = self
            .cell_ids
            .keys()
            .filter(|coord| board.get(coord.0, coord.1).is_none())
            .copied()
            .collect();
        for coord in stale {
            self.cell_ids.remove(&coord);
        }
    }

    fn full_state(&mut self, board: &Board) -> Vec<CellView> {
        let mut cells = Vec::new();
        for (&(x, z), items) in board.iter() {
            let id = self.id_for((x, z));
            cells.push(CellView {
                x,
                z,
                id,
                items: items.clone(),
            });
        }
        cells
    }

    /// Computes the payload for `observer`: a full state if bounds changed
    /// since the last broadcast, else an incremental change list. Updates
    /// the observer's snapshot and retires ids for emptied cells.
    pub fn compute_for_observer(&mut self, board: &Board, observer: PlayerId) -> BroadcastPayload {
        self.retire_empty_cells(board);
        let bounds = board.bounds();
        let bounds_changed = bounds != self.last_bounds;

        if bounds_changed {
            self.last_bounds = bounds;
            let cells = self.full_state(board);
            let snapshot = cells
                .iter()
                .map(|c| ((c.x, c.z), (c.id, c.items.clone())))
                .collect();
            self.observer_snapshots.insert(observer, snapshot);
            return BroadcastPayload::FullState { bounds, cells };
        }

        let mut current: HashMap<(i32, i32), (CellId, Vec<Item>)> = HashMap::new();
        for (&(x, z), items) in board.iter() {
            let id = self.id_for((x, z));
            current.insert((x, z), (id, items.clone()));
        }

        let previous = self.observer_snapshots.entry(observer).or_default().clone();
        let mut changes = Vec::new();

        for (coord, (id, items)) in &current {
            match previous.get(coord) {
                Some((_, prev_items)) if prev_items == items => {}
                _ => changes.push(ChangeEntry {
                    x: coord.0,
                    z: coord.1,
                    id: *id,
                    new_value: Some(items.clone()),
                }),
            }
        }
        for (coord, (id, _)) in &previous {
            if !current.contains_key(coord) {
                changes.push(ChangeEntry {
                    x: coord.0,
                    z: coord.1,
                    id: *id,
                    new_value: None,
                });
            }
        }

        self.observer_snapshots.insert(observer, current);
        BroadcastPayload::Delta { changes }
    }

    /// Drops a disconnected/left observer's snapshot so its memory is freed.
    pub fn forget_observer(&mut self, observer: PlayerId) {
        self.observer_snapshots.remove(&observer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn first_broadcast_is_always_full_state() {
        let mut board = Board::new();
        let p = Uuid::new_v4();
        board.append(0, 0, Item::Home { player: p });
        let mut tracker = DiffTracker::new();
        let payload = tracker.compute_for_observer(&board, p);
        assert!(matches!(payload, BroadcastPayload::FullState { .. }));
    }

    #[test]
    fn unchanged_board_yields_empty_delta() {
        let mut board = Board::new();
        let p = Uuid::new_v4();
        board.append(0, 0, Item::Home { player: p });
        let mut tracker = DiffTracker::new();
        tracker.compute_for_observer(&board, p);
        let payload = tracker.compute_for_observer(&board, p);
        match payload {
            BroadcastPayload::Delta { changes } => assert!(changes.is_empty()),
            BroadcastPayload::FullState { .. } => panic!("expected delta"),
        }
    }

    #[test]
    fn bounds_change_forces_a_new_full_state() {
        let mut board = Board::new();
        let p = Uuid::new_v4();
        board.append(0, 0, Item::Home { player: p });
        let mut tracker = DiffTracker::new();
        tracker.compute_for_observer(&board, p);
        board.append(10, 10, Item::Home { player: p });
        let payload = tracker.compute_for_observer(&board, p);
        assert!(matches!(payload, BroadcastPayload::FullState { .. }));
    }

    #[test]
    fn content_replacement_without_bounds_change_is_a_delta() {
        let mut board = Board::new();
        let p = Uuid::new_v4();
        board.append(0, 0, Item::Home { player: p });
        board.append(1, 0, Item::Home { player: p });
        let mut tracker = DiffTracker::new();
        tracker.compute_for_observer(&board, p);

        board.append(
            0,
            0,
            Item::Tetromino {
                player: p,
                kind: crate::pieces::PieceKind::I,
                placed_at: 1,
            },
        );
        let payload = tracker.compute_for_observer(&board, p);
        match payload {
            BroadcastPayload::Delta { changes } => {
                assert_eq!(changes.len(), 1);
                assert_eq!((changes[0].x, changes[0].z), (0, 0));
            }
            BroadcastPayload::FullState { .. } => panic!("expected delta, bounds unchanged"),
        }
    }
}
