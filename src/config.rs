//! Per-game configurable tunables (`spec.md` §6, "CLI / env").
//!
//! Mirrors the teacher's `adapter::server::ServerConfig`: a plain struct with
//! a spec-matching `Default` and an `from_env` override, injected once at
//! game creation rather than read ad-hoc from the environment at call sites.

use std::env;
use std::time::Duration;

use crate::chess::PieceType;

/// Tunables injected at [`crate::game::Game`] creation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GameSettings {
    /// Longest consecutive occupied run (outside safe home zones) required to clear a row.
    pub required_consecutive: u32,
    /// Minimum interval between a player's accepted tetromino placements.
    pub min_move_interval_tetromino: Duration,
    /// Minimum interval between a player's accepted chess moves.
    pub min_move_interval_chess: Duration,
    /// Maximum duration a player may stay paused before forced island removal.
    pub pause_max: Duration,
    /// Interval at which an empty home zone erodes by one cell.
    pub home_zone_degradation_interval: Duration,
    /// Manhattan distance between adjacent home-zone centers in the spiral.
    pub home_zone_distance: i32,
    /// Cumulative pawn forward distance required to trigger promotion.
    pub pawn_promotion_distance: u32,
    /// Piece type a promoted pawn becomes.
    pub promotion_piece: PieceType,
    /// Hard cap on players per game.
    pub max_players_per_game: usize,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            required_consecutive: 8,
            min_move_interval_tetromino: Duration::from_millis(10_000),
            min_move_interval_chess: Duration::from_millis(10_000),
            pause_max: Duration::from_millis(900_000),
            home_zone_degradation_interval: Duration::from_millis(300_000),
            // Opposing pawn edges 8 manhattan moves apart => 16 between centers,
            // plus the zone's own 8-cell depth/width already counted on each side.
            home_zone_distance: 16,
            pawn_promotion_distance: 8,
            promotion_piece: PieceType::Knight,
            max_players_per_game: 2048,
        }
    }
}

impl GameSettings {
    /// Override defaults from environment variables, matching the teacher's
    /// `ServerConfig::from_env` pattern. Unset/unparsable variables fall back
    /// to [`GameSettings::default`].
    pub fn from_env() -> Self {
        let mut settings = Self::default();

        if let Some(v) = env_u32("SHAKTRIS_REQUIRED_CONSECUTIVE") {
            settings.required_consecutive = v;
        }
        if let Some(v) = env_u64("SHAKTRIS_MIN_MOVE_INTERVAL_MS") {
            settings.min_move_interval_tetromino = Duration::from_millis(v);
            settings.min_move_interval_chess = Duration::from_millis(v);
        }
        if let Some(v) = env_u64("SHAKTRIS_PAUSE_MAX_MS") {
            settings.pause_max = Duration::from_millis(v);
        }
        if let Some(v) = env_u64("SHAKTRIS_HOME_ZONE_DEGRADATION_INTERVAL_MS") {
            settings.home_zone_degradation_interval = Duration::from_millis(v);
        }
        if let Some(v) = env_i32("SHAKTRIS_HOME_ZONE_DISTANCE") {
            settings.home_zone_distance = v;
        }
        if let Some(v) = env_u32("SHAKTRIS_PAWN_PROMOTION_DISTANCE") {
            settings.pawn_promotion_distance = v;
        }
        if let Some(v) = env_usize("SHAKTRIS_MAX_PLAYERS_PER_GAME") {
            settings.max_players_per_game = v;
        }

        settings
    }
}

fn env_u32(key: &str) -> Option<u32> {
    env::var(key).ok().and_then(|s| s.parse().ok())
}

fn env_u64(key: &str) -> Option<u64> {
    env::var(key).ok().and_then(|s| s.parse().ok())
}

fn env_i32(key: &str) -> Option<i32> {
    env::var(key).ok().and_then(|s| s.parse().ok())
}

fn env_usize(key: &str) -> Option<usize> {
    env::var(key).ok().and_then(|s| s.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let s = GameSettings::default();
        assert_eq!(s.required_consecutive, 8);
        assert_eq!(s.min_move_interval_tetromino, Duration::from_secs(10));
        assert_eq!(s.pause_max, Duration::from_millis(900_000));
        assert_eq!(s.home_zone_degradation_interval, Duration::from_millis(300_000));
        assert_eq!(s.pawn_promotion_distance, 8);
        assert_eq!(s.promotion_piece, PieceType::Knight);
        assert_eq!(s.max_players_per_game, 2048);
    }
}
