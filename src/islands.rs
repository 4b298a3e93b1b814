//! Connected-component discovery and orphan cleanup (`spec.md` §4.5).
//!
//! No direct teacher analogue; this follows the spec's own §9 guidance
//! ("represent pieces by id in an arena, cells hold ids only") as a plain
//! BFS over [`Board`].

use std::collections::{HashSet, VecDeque};

use crate::board::{Board, Item, PieceId};
use crate::player::PlayerId;

const NEIGHBOURS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// A piece orphaned by `ReconcileIslands` — its island no longer reaches the
/// owning player's king.
#[derive(Debug, Clone, PartialEq)]
pub struct OrphanEvent {
    pub piece_id: PieceId,
    pub x: i32,
    pub z: i32,
}

pub struct Islands;

impl Islands {
    /// BFS from (x,z) over `player`'s own non-home occupied cells; `true`
    /// iff the walk reaches `(king_x, king_z)`.
    pub fn has_path_to_king(
        board: &Board,
        player: PlayerId,
        x: i32,
        z: i32,
        king_x: i32,
        king_z: i32,
    ) -> bool {
        if (x, z) == (king_x, king_z) {
            return board.has_type(x, z, |i| i.owner() == player && !i.is_home());
        }
        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();
        visited.insert((x, z));
        queue.push_back((x, z));

        while let Some((cx, cz)) = queue.pop_front() {
            for (dx, dz) in NEIGHBOURS {
                let next = (cx + dx, cz + dz);
                if visited.contains(&next) {
                    continue;
                }
                if !board.has_type(next.0, next.1, |i| i.owner() == player && !i.is_home()) {
                    continue;
                }
                if next == (king_x, king_z) {
                    return true;
                }
                visited.insert(next);
                queue.push_back(next);
            }
        }
        false
    }

    /// All connected components of `player`'s non-home cells (ignoring who
    /// else occupies the board, since non-home items are exclusive per player
    /// at a cell only by virtue of placement rules elsewhere).
    fn components(board: &Board, player: PlayerId) -> Vec<HashSet<(i32, i32)>> {
        let owned: HashSet<(i32, i32)> = board
            .occupied_coords()
            .filter(|&(x, z)| board.has_type(x, z, |i| i.owner() == player && !i.is_home()))
            .collect();

        let mut seen = HashSet::new();
        let mut components = Vec::new();

        for &start in &owned {
            if seen.contains(&start) {
                continue;
            }
            let mut component = HashSet::new();
            let mut queue = VecDeque::new();
            queue.push_back(start);
            seen.insert(start);
            while let Some((cx, cz)) = queue.pop_front() {
                component.insert((cx, cz));
                for (dx, dz) in NEIGHBOURS {
                    let next = (cx + dx, cz + dz);
                    if owned.contains(&next) && !seen.contains(&next) {
                        seen.insert(next);
                        queue.push_back(next);
                    }
                }
            }
            components.push(component);
        }
        components
    }

    /// Deletes every non-home item in every component of `player`'s cells
    /// that does not contain `(king_x, king_z)`. Returns an orphan event per
    /// chess piece removed this way.
    pub fn reconcile(
        board: &mut Board,
        player: PlayerId,
        king_x: i32,
        king_z: i32,
    ) -> Vec<OrphanEvent> {
        let components = Self::components(board, player);
        let mut orphans = Vec::new();

        for component in components {
            if component.contains(&(king_x, king_z)) {
                continue;
            }
            for (x, z) in component {
                loop {
                    let removed = board.remove_where(x, z, |i| i.owner() == player && !i.is_home());
                    match removed {
                        Some(Item::Chess { piece_id, .. }) => {
                            orphans.push(OrphanEvent { piece_id, x, z });
                        }
                        Some(_) => {}
                        None => break,
                    }
                }
            }
        }
        orphans
    }
}
