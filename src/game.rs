//! `Game` aggregate root: wires Board + Players + ChessPieces + HomeZones and
//! exposes the top-level `apply_*` entry points every engine's mutation path
//! runs through (`spec.md` §3 "Game", §4 throughout).
//!
//! Grounded on `lgn21st-tui-tetris/src/core/game_state.rs`'s "one struct owns
//! all sub-state, exposes methods returning a result enum" shape.

use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::board::{Board, Item, PieceId};
use crate::chess::{ChessEngine, ChessPiece, PieceType};
use crate::config::GameSettings;
use crate::error::{ShaktrisError, ShaktrisResult};
use crate::islands::Islands;
use crate::pieces::{PieceKind, Rotation};
use crate::player::{
    color_for_join_index, standard_sixteen_layout, HomeZone, MoveType, Player, PlayerId,
};
use crate::rng::PieceQueue;
use crate::rowclear::{clear_and_settle, ClearedRows};
use crate::spiral::SpiralPlacer;
use crate::tetromino::{PlaceOutcome, TetrominoEngine, TetrominoError};

pub type GameId = Uuid;

/// Balance awarded to the placing player per row cleared; the only source
/// of income for [`Game::purchase_piece`] (`spec.md` §6, open question —
/// the distilled spec names `purchase_piece`/`balance` but not how balance
/// is earned; row-clearing is the only scored event in the system).
const ROW_CLEAR_REWARD: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    Waiting,
    Active,
    Completed,
    Abandoned,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlaceTetrominoResult {
    pub ok: bool,
    pub exploded: bool,
    pub completed_rows: ClearedRows,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MoveChessResult {
    pub ok: bool,
    pub captured: Option<PieceId>,
    pub promoted_to: Option<PieceType>,
    pub game_over: bool,
    pub winner: Option<PlayerId>,
}

/// The authoritative, in-memory state for a single match. Every
/// state-mutating method here is meant to run inside the per-Game mutation
/// lock held by [`crate::scheduler::Scheduler`] — `Game` itself holds no lock.
#[derive(Debug, Clone)]
pub struct Game {
    pub id: GameId,
    pub board: Board,
    pub players: HashMap<PlayerId, Player>,
    pub chess_pieces: HashMap<PieceId, ChessPiece>,
    pub home_zones: HashMap<PlayerId, HomeZone>,
    pub status: GameStatus,
    pub winner: Option<PlayerId>,
    pub created_at: Instant,
    pub last_updated_at: Instant,
    pub settings: GameSettings,

    join_order: Vec<PlayerId>,
    piece_queues: HashMap<PlayerId, PieceQueue>,
    next_piece_id: PieceId,
    next_placed_at: u64,
}

impl Game {
    pub fn new(settings: GameSettings) -> Self {
        let now = Instant::now();
        Self {
            id: Uuid::new_v4(),
            board: Board::new(),
            players: HashMap::new(),
            chess_pieces: HashMap::new(),
            home_zones: HashMap::new(),
            status: GameStatus::Waiting,
            winner: None,
            created_at: now,
            last_updated_at: now,
            settings,
            join_order: Vec::new(),
            piece_queues: HashMap::new(),
            next_piece_id: 1,
            next_placed_at: 1,
        }
    }

    fn touch(&mut self) {
        self.last_updated_at = Instant::now();
    }

    fn active_non_observer_count(&self) -> usize {
        self.players
            .values()
            .filter(|p| !p.observer && !p.eliminated)
            .count()
    }

    fn king_positions(&self) -> HashMap<PlayerId, (i32, i32)> {
        self.chess_pieces
            .values()
            .filter(|p| p.piece_type == PieceType::King)
            .map(|p| (p.player, (p.x, p.z)))
            .collect()
    }

    fn king_position_of(&self, player: PlayerId) -> Option<(i32, i32)> {
        self.chess_pieces
            .values()
            .find(|p| p.player == player && p.piece_type == PieceType::King)
            .map(|p| (p.x, p.z))
    }

    /// Players currently paused, consulted by [`ChessEngine::is_move_legal`]
    /// (no capturing a paused player) and [`crate::rowclear::clear_and_settle`]
    /// (no clearing a paused player's cells) per `spec.md` §4.7.
    fn paused_players(&self) -> HashSet<PlayerId> {
        self.players
            .values()
            .filter(|p| p.is_paused())
            .map(|p| p.id)
            .collect()
    }

    /// Registers a new player: assigns color, a spiral home zone, the
    /// standard-16 chess layout, and an initial tetromino offer
    /// (`spec.md` §4.7).
    pub fn join(&mut self, name: String) -> ShaktrisResult<PlayerId> {
        if self.players.len() >= self.settings.max_players_per_game {
            return Err(ShaktrisError::Internal("game is full".into()));
        }

        let index = self.join_order.len();
        let placer = SpiralPlacer::new(0, 0, self.settings.home_zone_distance);
        let existing_rects: Vec<_> = self
            .home_zones
            .values()
            .map(|z| crate::spiral::HomeZoneRect {
                x: z.x,
                z: z.z,
                width: z.width,
                height: z.height,
                orientation: z.orientation,
            })
            .collect();
        let rect = placer.place(index, &existing_rects)?;

        let player_id = Uuid::new_v4();
        let zone = HomeZone::from_rect(player_id, rect);

        for (piece_type, x, z) in standard_sixteen_layout(&zone) {
            let piece_id = self.next_piece_id;
            self.next_piece_id += 1;
            let piece = ChessPiece::new(piece_id, piece_type, player_id, x, z, zone.orientation);
            self.board.append(
                x,
                z,
                Item::Chess {
                    player: player_id,
                    piece_type,
                    piece_id,
                },
            );
            self.chess_pieces.insert(piece_id, piece);
        }
        self.board.append(zone.x, zone.z, Item::Home { player: player_id });

        let mut queue = PieceQueue::new((index as u32 + 1) ^ 0x9E37_79B9);
        let offer = queue.draw_offer(3);
        self.piece_queues.insert(player_id, queue);

        let color = color_for_join_index(index);
        let player = Player::new(player_id, name, color, offer);
        self.players.insert(player_id, player);
        self.home_zones.insert(player_id, zone);
        self.join_order.push(player_id);

        if self.status == GameStatus::Waiting && self.active_non_observer_count() >= 1 {
            self.status = GameStatus::Active;
        }

        self.touch();
        Ok(player_id)
    }

    pub fn leave(&mut self, player_id: PlayerId) -> ShaktrisResult<()> {
        self.players
            .get_mut(&player_id)
            .ok_or(ShaktrisError::NotFound)?
            .connected = false;
        self.touch();
        Ok(())
    }

    pub fn set_ready(&mut self, player_id: PlayerId, ready: bool) -> ShaktrisResult<()> {
        let player = self.players.get_mut(&player_id).ok_or(ShaktrisError::NotFound)?;
        player.ready = ready;
        self.touch();
        Ok(())
    }

    pub fn pause(&mut self, player_id: PlayerId) -> ShaktrisResult<()> {
        let player = self.players.get_mut(&player_id).ok_or(ShaktrisError::NotFound)?;
        player.pause();
        self.touch();
        Ok(())
    }

    pub fn resume(&mut self, player_id: PlayerId) -> ShaktrisResult<()> {
        let player = self.players.get_mut(&player_id).ok_or(ShaktrisError::NotFound)?;
        player.resume();
        self.touch();
        Ok(())
    }

    /// Validates rate limit and phase, then delegates to [`TetrominoEngine`].
    /// On success, runs row-clear/gravity/island reconciliation and advances
    /// the player's phase (`spec.md` §4.3).
    pub fn place_tetromino(
        &mut self,
        player_id: PlayerId,
        kind: PieceKind,
        rotation: Rotation,
        x: i32,
        z: i32,
        y: u8,
    ) -> ShaktrisResult<PlaceTetrominoResult> {
        self.guard_active_turn(player_id, MoveType::Tetromino)?;

        let zone = self
            .home_zones
            .get(&player_id)
            .ok_or(ShaktrisError::NotFound)?
            .clone();
        let is_first_placement = self
            .players
            .get(&player_id)
            .is_some_and(|p| p.last_tetromino_anchor.is_none());
        let king_pos = if is_first_placement {
            None
        } else {
            self.king_position_of(player_id)
        };

        let placed_at = self.next_placed_at;
        let outcome = TetrominoEngine::place(
            &mut self.board,
            player_id,
            &zone,
            kind,
            rotation,
            x,
            z,
            y,
            placed_at,
            is_first_placement,
            king_pos,
        )
        .map_err(tetromino_error_to_shaktris)?;
        self.next_placed_at += 1;

        let mut completed_rows = ClearedRows::new();
        if outcome == PlaceOutcome::Placed {
            let zones: Vec<HomeZone> = self.home_zones.values().cloned().collect();
            let kings = self.king_positions();
            let paused = self.paused_players();
            let settle = clear_and_settle(
                &mut self.board,
                &zones,
                self.settings.required_consecutive,
                &kings,
                &paused,
            );
            completed_rows = settle.cleared_rows;
            self.apply_gravity_piece_moves(&settle.gravity.piece_moves);
            self.drop_orphaned_pieces(&settle.orphans);

            if let Some(player) = self.players.get_mut(&player_id) {
                player.last_tetromino_anchor = Some((x, z));
                player.balance += completed_rows.len() as u32 * ROW_CLEAR_REWARD;
            }
        }

        // A placement consumes the player's tetromino turn whether it lands
        // or explodes on collision; the phase advances to chess whenever a
        // legal chess move is available either way (`spec.md` §8 scenario 2).
        if let Some(player) = self.players.get_mut(&player_id) {
            player.record_move(MoveType::Tetromino);
        }
        let has_move = self.player_has_any_legal_chess_move(player_id);
        if let Some(player) = self.players.get_mut(&player_id) {
            player.current_move_type = if has_move {
                MoveType::Chess
            } else {
                MoveType::Tetromino
            };
        }

        self.touch();
        Ok(PlaceTetrominoResult {
            ok: true,
            exploded: outcome == PlaceOutcome::Exploded,
            completed_rows,
        })
    }

    /// Validates rate limit and phase, checks legality via [`ChessEngine`],
    /// executes the move, handles capture/elimination/promotion, and
    /// recomputes islands if content was removed (`spec.md` §4.4).
    pub fn move_chess(
        &mut self,
        player_id: PlayerId,
        piece_id: PieceId,
        to_x: i32,
        to_z: i32,
    ) -> ShaktrisResult<MoveChessResult> {
        self.guard_active_turn(player_id, MoveType::Chess)?;

        if !Board::is_legal_coord(to_x, to_z) {
            return Err(ShaktrisError::InvalidCoordinates { x: to_x, z: to_z });
        }

        let piece = self
            .chess_pieces
            .get(&piece_id)
            .cloned()
            .ok_or(ShaktrisError::NotFound)?;
        if piece.player != player_id {
            return Err(ShaktrisError::NotYourTurnPhase);
        }

        if !ChessEngine::is_move_legal(&self.board, &piece, to_x, to_z, &self.paused_players()) {
            return Err(ShaktrisError::PathObstructed);
        }

        let (from_x, from_z) = (piece.x, piece.z);
        let captured_item = self.board.chess_item_at(to_x, to_z).cloned();
        let mut captured_id = None;
        let mut captured_was_king = false;

        if let Some(Item::Chess { piece_id: cid, .. }) = captured_item {
            self.board.remove_where(to_x, to_z, |i| i.is_chess());
            if let Some(captured) = self.chess_pieces.remove(&cid) {
                captured_was_king = captured.piece_type == PieceType::King;
            }
            captured_id = Some(cid);
        }

        self.board.remove_where(from_x, from_z, |i| i.is_chess());
        self.board.append(
            to_x,
            to_z,
            Item::Chess {
                player: piece.player,
                piece_type: piece.piece_type,
                piece_id,
            },
        );

        let dz = (to_z - from_z).abs();
        let mut promoted_to = None;
        if let Some(p) = self.chess_pieces.get_mut(&piece_id) {
            p.x = to_x;
            p.z = to_z;
            p.has_moved = true;
            if p.piece_type == PieceType::Pawn {
                p.move_distance += dz as u32;
                if p.move_distance >= self.settings.pawn_promotion_distance {
                    p.piece_type = self.settings.promotion_piece;
                    promoted_to = Some(self.settings.promotion_piece);
                }
            }
        }
        if let Some(new_type) = promoted_to {
            self.board.remove_where(to_x, to_z, |i| i.is_chess());
            self.board.append(
                to_x,
                to_z,
                Item::Chess {
                    player: piece.player,
                    piece_type: new_type,
                    piece_id,
                },
            );
        }

        if captured_was_king {
            if let Some(owner) = captured_item.as_ref().map(|i| i.owner()) {
                if let Some(eliminated) = self.players.get_mut(&owner) {
                    eliminated.eliminated = true;
                }
                let orphans = self.remove_all_non_home_items_for(owner);
                self.drop_orphaned_pieces(&orphans);
            }
        }

        if captured_id.is_some() || captured_was_king {
            if let Some((kx, kz)) = self.king_position_of(player_id) {
                let orphans = Islands::reconcile(&mut self.board, player_id, kx, kz);
                self.drop_orphaned_pieces(&orphans);
            }
        }

        if let Some(player) = self.players.get_mut(&player_id) {
            player.record_move(MoveType::Chess);
            player.current_move_type = MoveType::Tetromino;
        }

        let mut game_over = false;
        let mut winner = None;
        if captured_was_king && self.active_non_observer_count() == 1 {
            self.status = GameStatus::Completed;
            winner = self.players.values().find(|p| !p.eliminated && !p.observer).map(|p| p.id);
            self.winner = winner;
            game_over = true;
        }

        self.touch();
        Ok(MoveChessResult {
            ok: true,
            captured: captured_id,
            promoted_to,
            game_over,
            winner,
        })
    }

    /// Buys a piece onto an empty cell adjacent to the player's own
    /// territory (home zone or a chess/tetromino chain reaching their king),
    /// deducting its price from balance (`spec.md` §6 `purchase_piece`).
    pub fn purchase_piece(
        &mut self,
        player_id: PlayerId,
        piece_type: PieceType,
        x: i32,
        z: i32,
    ) -> ShaktrisResult<(PieceId, u32)> {
        if !Board::is_legal_coord(x, z) {
            return Err(ShaktrisError::InvalidCoordinates { x, z });
        }
        let price = piece_type
            .purchase_price()
            .ok_or_else(|| ShaktrisError::InvalidPieceType(piece_type.as_str().to_string()))?;

        let player = self.players.get(&player_id).ok_or(ShaktrisError::NotFound)?;
        if player.eliminated {
            return Err(ShaktrisError::Eliminated);
        }
        if player.balance < price {
            return Err(ShaktrisError::InsufficientFunds {
                need: price,
                have: player.balance,
            });
        }
        if self.board.has_non_home_occupant(x, z) {
            return Err(ShaktrisError::CellOccupied);
        }

        let zone = self.home_zones.get(&player_id).ok_or(ShaktrisError::NotFound)?;
        let in_own_zone = zone.contains(x, z);
        let orientation = zone.orientation;
        let (kx, kz) = self
            .king_position_of(player_id)
            .ok_or(ShaktrisError::NotReachableFromKing)?;
        if !in_own_zone && !Islands::has_path_to_king(&self.board, player_id, x, z, kx, kz) {
            return Err(ShaktrisError::NotReachableFromKing);
        }

        let piece_id = self.next_piece_id;
        self.next_piece_id += 1;
        let piece = ChessPiece::new(piece_id, piece_type, player_id, x, z, orientation);
        self.board.append(
            x,
            z,
            Item::Chess {
                player: player_id,
                piece_type,
                piece_id,
            },
        );
        self.chess_pieces.insert(piece_id, piece);

        let balance = {
            let player = self.players.get_mut(&player_id).expect("checked above");
            player.balance -= price;
            player.balance
        };

        self.touch();
        Ok((piece_id, balance))
    }

    /// Home-zone degradation and pause-timeout sweeps; called periodically
    /// by the host (not itself part of a client action) per `spec.md` §4.7.
    pub fn tick_maintenance(&mut self) {
        let mut eroded = Vec::new();
        for (player, zone) in self.home_zones.iter_mut() {
            if zone.last_occupied_check.elapsed() < self.settings.home_zone_degradation_interval {
                continue;
            }
            let occupied = self
                .board
                .has_type(zone.x, zone.z, |i| i.owner() == *player && i.is_chess())
                || (zone.min_x()..=zone.max_x()).any(|zx| {
                    (zone.min_z()..=zone.max_z())
                        .any(|zz| self.board.has_type(zx, zz, |i| i.owner() == *player && i.is_chess()))
                });
            zone.last_occupied_check = Instant::now();
            if occupied {
                continue;
            }
            if zone.degrade_one_cell() {
                eroded.push(*player);
            }
        }
        for player in eroded {
            self.home_zones.remove(&player);
        }

        let pause_max = self.settings.pause_max;
        let timed_out: Vec<PlayerId> = self
            .players
            .values()
            .filter(|p| p.pause_expired(pause_max))
            .map(|p| p.id)
            .collect();
        for player_id in timed_out {
            if let Some((kx, kz)) = self.king_position_of(player_id) {
                // spec.md speaks of removing "the player's largest island"
                // (singular) on pause timeout; read here as every component
                // that doesn't reach the king, the same rule every other
                // mutation path enforces via Islands::reconcile, rather than
                // a second narrower rule just for this sweep.
                let orphans = Islands::reconcile(&mut self.board, player_id, kx, kz);
                self.drop_orphaned_pieces(&orphans);
            }
        }
    }

    fn guard_active_turn(&self, player_id: PlayerId, kind: MoveType) -> ShaktrisResult<()> {
        let player = self.players.get(&player_id).ok_or(ShaktrisError::NotFound)?;
        if player.eliminated {
            return Err(ShaktrisError::Eliminated);
        }
        if player.current_move_type != kind {
            return Err(ShaktrisError::NotYourTurnPhase);
        }
        if let Some(wait) = player.rate_limit_wait(kind, &self.settings) {
            return Err(ShaktrisError::RateLimited {
                wait_ms: wait.as_millis() as u64,
            });
        }
        Ok(())
    }

    fn player_has_any_legal_chess_move(&self, player_id: PlayerId) -> bool {
        let paused = self.paused_players();
        let pieces: Vec<&ChessPiece> = self
            .chess_pieces
            .values()
            .filter(|p| p.player == player_id)
            .collect();
        for piece in pieces {
            for dx in -8..=8 {
                for dz in -8..=8 {
                    let (tx, tz) = (piece.x + dx, piece.z + dz);
                    if ChessEngine::is_move_legal(&self.board, piece, tx, tz, &paused) {
                        return true;
                    }
                }
            }
        }
        false
    }

    fn apply_gravity_piece_moves(&mut self, moves: &[(PieceId, i32, i32)]) {
        for &(piece_id, x, z) in moves {
            if let Some(piece) = self.chess_pieces.get_mut(&piece_id) {
                piece.x = x;
                piece.z = z;
            }
        }
    }

    fn drop_orphaned_pieces(&mut self, orphans: &[crate::islands::OrphanEvent]) {
        for orphan in orphans {
            self.chess_pieces.remove(&orphan.piece_id);
        }
    }

    fn remove_all_non_home_items_for(&mut self, player: PlayerId) -> Vec<crate::islands::OrphanEvent> {
        let coords: Vec<(i32, i32)> = self
            .board
            .occupied_coords()
            .filter(|&(x, z)| self.board.has_type(x, z, |i| i.owner() == player && !i.is_home()))
            .collect();
        let mut orphans = Vec::new();
        for (x, z) in coords {
            while let Some(item) = self.board.remove_where(x, z, |i| i.owner() == player && !i.is_home()) {
                if let Item::Chess { piece_id, .. } = item {
                    orphans.push(crate::islands::OrphanEvent { piece_id, x, z });
                }
            }
        }
        orphans
    }

    pub fn is_abandoned(&self, abandonment_timeout: Duration) -> bool {
        !self.players.is_empty()
            && self
                .players
                .values()
                .all(|p| !p.connected && p.last_move_timestamp.elapsed() > abandonment_timeout)
    }
}

fn tetromino_error_to_shaktris(err: TetrominoError) -> ShaktrisError {
    match err {
        TetrominoError::OutOfRange(x, z) => ShaktrisError::InvalidCoordinates { x, z },
        TetrominoError::InvalidFallHeight(_) | TetrominoError::NotYetLanded => {
            ShaktrisError::InvalidRotation(0)
        }
        TetrominoError::CellOccupied(..) => ShaktrisError::CellOccupied,
        TetrominoError::NotReachableFromKing => ShaktrisError::NotReachableFromKing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joining_two_players_creates_distinct_home_zones() {
        let mut game = Game::new(GameSettings::default());
        let a = game.join("alice".into()).unwrap();
        let b = game.join("bob".into()).unwrap();
        assert_ne!(a, b);
        assert_eq!(game.home_zones.len(), 2);
        assert_eq!(game.chess_pieces.len(), 32);
    }

    #[test]
    fn new_player_starts_in_tetromino_phase() {
        let mut game = Game::new(GameSettings::default());
        let a = game.join("alice".into()).unwrap();
        assert_eq!(game.players[&a].current_move_type, MoveType::Tetromino);
    }

    #[test]
    fn place_tetromino_far_from_home_zone_is_rejected() {
        let mut game = Game::new(GameSettings::default());
        let a = game.join("alice".into()).unwrap();
        let result = game.place_tetromino(a, PieceKind::I, Rotation::new(0), 500, 500, 0);
        assert!(result.is_err());
    }

    #[test]
    fn purchase_without_funds_is_rejected() {
        let mut game = Game::new(GameSettings::default());
        let a = game.join("alice".into()).unwrap();
        let zone = game.home_zones[&a].clone();
        let result = game.purchase_piece(a, PieceType::Queen, zone.x, zone.z);
        assert_eq!(
            result,
            Err(ShaktrisError::InsufficientFunds { need: 90, have: 0 })
        );
    }

    #[test]
    fn purchase_with_funds_places_piece_and_deducts_balance() {
        let mut game = Game::new(GameSettings::default());
        let a = game.join("alice".into()).unwrap();
        game.players.get_mut(&a).unwrap().balance = 100;
        let zone = game.home_zones[&a].clone();
        let (piece_id, balance) = game.purchase_piece(a, PieceType::Queen, zone.x, zone.z + 1).unwrap();
        assert_eq!(balance, 10);
        assert!(game.chess_pieces.contains_key(&piece_id));
    }

    #[test]
    fn a_paused_players_king_cannot_be_captured() {
        let mut game = Game::new(GameSettings::default());
        let a = game.join("alice".into()).unwrap();
        let b = game.join("bob".into()).unwrap();
        let (kx, kz) = game.king_position_of(b).unwrap();

        let attacker_id = 9_999;
        let attacker = ChessPiece::new(attacker_id, PieceType::Rook, a, kx, kz - 1, 0);
        game.board.append(
            kx,
            kz - 1,
            Item::Chess { player: a, piece_type: PieceType::Rook, piece_id: attacker_id },
        );
        game.chess_pieces.insert(attacker_id, attacker);
        game.players.get_mut(&a).unwrap().current_move_type = MoveType::Chess;
        game.players.get_mut(&b).unwrap().pause();

        let result = game.move_chess(a, attacker_id, kx, kz);
        assert_eq!(result, Err(ShaktrisError::PathObstructed));
        assert!(game.chess_pieces.values().any(|p| p.player == b && p.piece_type == PieceType::King));
    }

    #[test]
    fn unknown_player_is_not_found() {
        let mut game = Game::new(GameSettings::default());
        let result = game.place_tetromino(Uuid::new_v4(), PieceKind::I, Rotation::new(0), 0, 0, 0);
        assert_eq!(result, Err(ShaktrisError::NotFound));
    }
}
