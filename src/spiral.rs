//! Home-zone placement in an outward spiral (`spec.md` §4.2).
//!
//! No direct teacher analogue — the teacher has one fixed spawn point —
//! so this follows the teacher's preference for small deterministic free
//! functions (see [`crate::rng::SimpleRng`]) rather than a stateful generator.

use serde::{Deserialize, Serialize};

use crate::error::{ShaktrisError, ShaktrisResult};

/// 0 = +X, 1 = +Z, 2 = -X, 3 = -Z. A zone's `orientation` is this array's
/// index for the direction its center was displaced from the origin along
/// (`spec.md` §4.2); [`crate::chess::ChessPiece::forward_vector`] reverses
/// this same entry to point a pawn born in that zone back toward center.
pub(crate) const DIRECTION_CYCLE: [(i32, i32); 4] = [(1, 0), (0, 1), (-1, 0), (0, -1)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HomeZoneRect {
    pub x: i32,
    pub z: i32,
    pub width: i32,
    pub height: i32,
    /// 0 or 2: horizontal (8 wide x 2 tall). 1 or 3: vertical (2 wide x 8 tall).
    pub orientation: u8,
}

impl HomeZoneRect {
    pub fn min_x(&self) -> i32 {
        self.x - self.width / 2
    }
    pub fn max_x(&self) -> i32 {
        self.x + self.width / 2 - 1
    }
    pub fn min_z(&self) -> i32 {
        self.z - self.height / 2
    }
    pub fn max_z(&self) -> i32 {
        self.z + self.height / 2 - 1
    }

    /// Manhattan distance between the closest edges of two rectangles along
    /// whichever axis separates them (0 if they overlap on that axis).
    pub fn closest_edge_manhattan(&self, other: &HomeZoneRect) -> i32 {
        let gap_x = if self.max_x() < other.min_x() {
            other.min_x() - self.max_x() - 1
        } else if other.max_x() < self.min_x() {
            self.min_x() - other.max_x() - 1
        } else {
            0
        };
        let gap_z = if self.max_z() < other.min_z() {
            other.min_z() - self.max_z() - 1
        } else if other.max_z() < self.min_z() {
            self.min_z() - other.max_z() - 1
        } else {
            0
        };
        gap_x + gap_z
    }

    fn overlaps(&self, other: &HomeZoneRect) -> bool {
        self.min_x() <= other.max_x()
            && other.min_x() <= self.max_x()
            && self.min_z() <= other.max_z()
            && other.min_z() <= self.max_z()
    }
}

/// Deterministically assigns home-zone rectangles from a player's join index.
pub struct SpiralPlacer {
    origin_x: i32,
    origin_z: i32,
    home_zone_distance: i32,
}

impl SpiralPlacer {
    pub fn new(origin_x: i32, origin_z: i32, home_zone_distance: i32) -> Self {
        Self {
            origin_x,
            origin_z,
            home_zone_distance,
        }
    }

    /// Zone rectangle for join index `i`, without overlap verification.
    pub fn zone_for_index(&self, i: usize) -> HomeZoneRect {
        if i == 0 {
            return HomeZoneRect {
                x: self.origin_x,
                z: self.origin_z,
                width: 8,
                height: 2,
                orientation: 0,
            };
        }
        let dir_index = (i - 1) % 4;
        let (dx, dz) = DIRECTION_CYCLE[dir_index];
        let multiplier = ((i - 1) / 4) as i32 + 1;
        let x = self.origin_x + dx * self.home_zone_distance * multiplier;
        let z = self.origin_z + dz * self.home_zone_distance * multiplier;
        let horizontal = dx != 0;
        let (width, height) = if horizontal { (8, 2) } else { (2, 8) };
        HomeZoneRect {
            x,
            z,
            width,
            height,
            orientation: dir_index as u8,
        }
    }

    /// Assigns the zone for index `i`, verifying it does not overlap any
    /// previously assigned zone. Hard failure on overlap per `spec.md` §4.2.
    pub fn place(&self, i: usize, existing: &[HomeZoneRect]) -> ShaktrisResult<HomeZoneRect> {
        let candidate = self.zone_for_index(i);
        if existing.iter().any(|z| z.overlaps(&candidate)) {
            return Err(ShaktrisError::Internal(format!(
                "spiral placement for index {i} overlaps an existing home zone"
            )));
        }
        Ok(candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placer() -> SpiralPlacer {
        SpiralPlacer::new(0, 0, 16)
    }

    #[test]
    fn first_zone_is_centered_on_origin() {
        let z = placer().zone_for_index(0);
        assert_eq!((z.x, z.z), (0, 0));
        assert_eq!((z.width, z.height), (8, 2));
    }

    #[test]
    fn five_players_land_on_the_four_cardinal_directions() {
        let p = placer();
        let zones: Vec<_> = (0..5).map(|i| p.zone_for_index(i)).collect();
        assert_eq!((zones[1].x, zones[1].z), (16, 0));
        assert_eq!((zones[2].x, zones[2].z), (0, 16));
        assert_eq!((zones[3].x, zones[3].z), (-16, 0));
        assert_eq!((zones[4].x, zones[4].z), (0, -16));
    }

    #[test]
    fn orientation_alternates_horizontal_vertical() {
        let p = placer();
        assert_eq!(p.zone_for_index(1).orientation % 2, 0); // +X: horizontal
        assert_eq!(p.zone_for_index(2).orientation % 2, 1); // +Z: vertical
    }

    #[test]
    fn zones_do_not_overlap_and_are_at_least_seven_apart() {
        let p = placer();
        let mut zones = Vec::new();
        for i in 0..9 {
            let z = p.place(i, &zones).expect("no overlap expected");
            zones.push(z);
        }
        for a in 0..zones.len() {
            for b in (a + 1)..zones.len() {
                assert!(!zones[a].overlaps(&zones[b]));
                assert!(zones[a].closest_edge_manhattan(&zones[b]) >= 7);
            }
        }
    }

    #[test]
    fn overlap_is_a_hard_failure() {
        let p = SpiralPlacer::new(0, 0, 16);
        let first = p.zone_for_index(0);
        let result = p.place(0, &[first]);
        assert!(result.is_err());
    }
}
