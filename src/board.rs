//! Board module - sparse, unbounded game grid (`spec.md` §4.1)
//!
//! Each occupied coordinate holds an ordered stack of [`Item`]s. The board
//! tracks the tight bounding box of its occupied cells, recomputed whenever a
//! mutation empties a cell.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::chess::PieceType;
use crate::player::PlayerId;

/// Coordinates far beyond this are rejected outright (`spec.md` §4.1).
pub const MAX_COORD: i32 = 10_000;

pub type PieceId = u64;

/// A single typed occupant of a cell. Cells hold a stack, never overwrite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Item {
    /// Immovable home-zone marker; coexists with at most one other item.
    Home { player: PlayerId },
    /// Body of a placed tetromino block.
    Tetromino {
        player: PlayerId,
        kind: crate::pieces::PieceKind,
        placed_at: u64,
    },
    /// A chess piece occupying the cell, cross-referencing the game's piece arena by id.
    Chess {
        player: PlayerId,
        piece_type: PieceType,
        piece_id: PieceId,
    },
}

impl Item {
    pub fn is_home(&self) -> bool {
        matches!(self, Item::Home { .. })
    }

    pub fn is_chess(&self) -> bool {
        matches!(self, Item::Chess { .. })
    }

    pub fn is_tetromino(&self) -> bool {
        matches!(self, Item::Tetromino { .. })
    }

    pub fn owner(&self) -> PlayerId {
        match self {
            Item::Home { player } => *player,
            Item::Tetromino { player, .. } => *player,
            Item::Chess { player, .. } => *player,
        }
    }
}

/// Tight bounding box of all occupied cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: i32,
    pub max_x: i32,
    pub min_z: i32,
    pub max_z: i32,
}

/// Sparse coordinate-keyed cell store with dynamic bounds tracking.
#[derive(Debug, Clone, Default)]
pub struct Board {
    cells: HashMap<(i32, i32), Vec<Item>>,
    bounds: Option<Bounds>,
}

impl Board {
    pub fn new() -> Self {
        Self {
            cells: HashMap::new(),
            bounds: None,
        }
    }

    pub fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }

    pub fn is_legal_coord(x: i32, z: i32) -> bool {
        x.abs() <= MAX_COORD && z.abs() <= MAX_COORD
    }

    /// Get the item list at (x, z), or `None` if the cell is empty.
    pub fn get(&self, x: i32, z: i32) -> Option<&Vec<Item>> {
        self.cells.get(&(x, z))
    }

    /// Replace the item list at (x, z). Recomputes bounds if this empties or
    /// newly occupies a cell that changes the tight bounding box.
    pub fn set(&mut self, x: i32, z: i32, items: Vec<Item>) {
        if items.is_empty() {
            if self.cells.remove(&(x, z)).is_some() {
                self.recompute_bounds();
            }
        } else {
            let was_present = self.cells.contains_key(&(x, z));
            self.cells.insert((x, z), items);
            if !was_present {
                self.expand_bounds(x, z);
            }
        }
    }

    /// Append an item to the existing list at (x, z) (creating the cell if empty).
    pub fn append(&mut self, x: i32, z: i32, item: Item) {
        let was_present = self.cells.contains_key(&(x, z));
        self.cells.entry((x, z)).or_default().push(item);
        if !was_present {
            self.expand_bounds(x, z);
        }
    }

    /// Remove the first item matching `predicate`, clearing the cell if it
    /// becomes empty. Returns the removed item, if any.
    pub fn remove_where(
        &mut self,
        x: i32,
        z: i32,
        predicate: impl Fn(&Item) -> bool,
    ) -> Option<Item> {
        let (removed, now_empty) = match self.cells.get_mut(&(x, z)) {
            Some(list) => {
                let idx = list.iter().position(&predicate)?;
                let item = list.remove(idx);
                (Some(item), list.is_empty())
            }
            None => return None,
        };
        if now_empty {
            self.cells.remove(&(x, z));
            self.recompute_bounds();
        }
        removed
    }

    pub fn has_occupant(&self, x: i32, z: i32) -> bool {
        self.cells.get(&(x, z)).is_some_and(|l| !l.is_empty())
    }

    /// Occupied by something other than a `Home` marker.
    pub fn has_non_home_occupant(&self, x: i32, z: i32) -> bool {
        self.cells
            .get(&(x, z))
            .is_some_and(|l| l.iter().any(|i| !i.is_home()))
    }

    pub fn has_type(&self, x: i32, z: i32, pred: impl Fn(&Item) -> bool) -> bool {
        self.cells
            .get(&(x, z))
            .is_some_and(|l| l.iter().any(&pred))
    }

    pub fn contents_of_type<'a>(
        &'a self,
        x: i32,
        z: i32,
        pred: impl Fn(&Item) -> bool + 'a,
    ) -> Vec<&'a Item> {
        match self.cells.get(&(x, z)) {
            Some(list) => list.iter().filter(|i| pred(i)).collect(),
            None => Vec::new(),
        }
    }

    pub fn chess_item_at(&self, x: i32, z: i32) -> Option<&Item> {
        self.cells
            .get(&(x, z))
            .and_then(|l| l.iter().find(|i| i.is_chess()))
    }

    /// All currently-occupied coordinates, in arbitrary order.
    pub fn occupied_coords(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.cells.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&(i32, i32), &Vec<Item>)> {
        self.cells.iter()
    }

    fn expand_bounds(&mut self, x: i32, z: i32) {
        self.bounds = Some(match self.bounds {
            None => Bounds {
                min_x: x,
                max_x: x,
                min_z: z,
                max_z: z,
            },
            Some(b) => Bounds {
                min_x: b.min_x.min(x),
                max_x: b.max_x.max(x),
                min_z: b.min_z.min(z),
                max_z: b.max_z.max(z),
            },
        });
    }

    /// Recompute `bounds` as the exact tight box over all occupied keys.
    /// Only needed after a cell transitions from non-empty to empty, since
    /// removing a cell can shrink (but never grow) the box.
    fn recompute_bounds(&mut self) {
        self.bounds = self.cells.keys().fold(None, |acc, &(x, z)| {
            Some(match acc {
                None => Bounds {
                    min_x: x,
                    max_x: x,
                    min_z: z,
                    max_z: z,
                },
                Some(b) => Bounds {
                    min_x: b.min_x.min(x),
                    max_x: b.max_x.max(x),
                    min_z: b.min_z.min(z),
                    max_z: b.max_z.max(z),
                },
            })
        });
    }
}
