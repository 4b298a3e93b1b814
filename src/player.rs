//! Player, HomeZone, and PlayerLifecycle (`spec.md` §4.7).
//!
//! Registration, color assignment, the standard-16 piece layout, rate-limit
//! clock, pause, and home-zone degradation. Grounded on
//! `lgn21st-tui-tetris/src/core/rng.rs` (kept for the tetromino bag and color
//! hue jitter) plus the teacher's general "plain struct, explicit mutation
//! methods" style.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::chess::PieceType;
use crate::config::GameSettings;
use crate::pieces::PieceKind;
use crate::spiral::HomeZoneRect;

pub type PlayerId = Uuid;

/// Golden-angle hue rotation so successive players get maximally distinct
/// vibrant colors without pulling in a color-theory crate.
const GOLDEN_ANGLE_DEG: f64 = 137.508;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Deterministic, vibrant HSL-derived color for the `i`th joined player.
pub fn color_for_join_index(i: usize) -> Color {
    let hue = (i as f64 * GOLDEN_ANGLE_DEG) % 360.0;
    hsl_to_rgb(hue, 0.65, 0.55)
}

fn hsl_to_rgb(h: f64, s: f64, l: f64) -> Color {
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let h_prime = h / 60.0;
    let x = c * (1.0 - (h_prime % 2.0 - 1.0).abs());
    let (r1, g1, b1) = match h_prime as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = l - c / 2.0;
    Color {
        r: (((r1 + m) * 255.0).round()) as u8,
        g: (((g1 + m) * 255.0).round()) as u8,
        b: (((b1 + m) * 255.0).round()) as u8,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveType {
    Tetromino,
    Chess,
}

/// A player's home-zone region; may erode over time if left unoccupied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HomeZone {
    pub player: PlayerId,
    pub x: i32,
    pub z: i32,
    pub width: i32,
    pub height: i32,
    /// Fixed at creation; the forward direction of every pawn born in this
    /// zone is derived from this value for the pawn's whole lifetime, even
    /// as the zone itself degrades (`spec.md` §9 Open Question).
    pub orientation: u8,
    pub last_occupied_check: Instant,
}

impl HomeZone {
    pub fn from_rect(player: PlayerId, rect: HomeZoneRect) -> Self {
        Self {
            player,
            x: rect.x,
            z: rect.z,
            width: rect.width,
            height: rect.height,
            orientation: rect.orientation,
            last_occupied_check: Instant::now(),
        }
    }

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

    pub fn contains(&self, x: i32, z: i32) -> bool {
        x >= self.min_x() && x <= self.max_x() && z >= self.min_z() && z <= self.max_z()
    }

    /// Long axis is width for a horizontal (8x2) zone, height for vertical (2x8).
    fn is_horizontal(&self) -> bool {
        self.width > self.height
    }

    /// Erode by one cell along the long axis. Returns `true` if the zone is
    /// now fully eroded (caller should delete it).
    pub fn degrade_one_cell(&mut self) -> bool {
        if self.is_horizontal() {
            self.width -= 1;
            self.width <= 0
        } else {
            self.height -= 1;
            self.height <= 0
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterPieceSlot {
    BackRow(i32),
    PawnRow(i32),
}

/// Standard-16 layout: 8 pawns on the row adjacent to the zone's front edge,
/// 8 back-row pieces (rook, knight, bishop, queen, king, bishop, knight,
/// rook) on the row furthest from the front, laid out along the zone's long
/// axis (`spec.md` §4.7).
pub fn standard_sixteen_layout(zone: &HomeZone) -> Vec<(PieceType, i32, i32)> {
    const BACK_ORDER: [PieceType; 8] = [
        PieceType::Rook,
        PieceType::Knight,
        PieceType::Bishop,
        PieceType::Queen,
        PieceType::King,
        PieceType::Bishop,
        PieceType::Knight,
        PieceType::Rook,
    ];

    let mut out = Vec::with_capacity(16);
    if zone.is_horizontal() {
        let back_z = zone.min_z();
        let pawn_z = zone.max_z();
        for (i, kind) in BACK_ORDER.iter().enumerate() {
            out.push((*kind, zone.min_x() + i as i32, back_z));
        }
        for i in 0..zone.width {
            out.push((PieceType::Pawn, zone.min_x() + i, pawn_z));
        }
    } else {
        let back_x = zone.min_x();
        let pawn_x = zone.max_x();
        for (i, kind) in BACK_ORDER.iter().enumerate() {
            out.push((*kind, back_x, zone.min_z() + i as i32));
        }
        for i in 0..zone.height {
            out.push((PieceType::Pawn, pawn_x, zone.min_z() + i));
        }
    }
    out
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub color: Color,
    pub balance: u32,
    pub available_tetrominos: Vec<(PieceKind, u8)>,
    #[serde(skip, default = "Instant::now")]
    pub last_move_timestamp: Instant,
    pub last_move_kind: Option<MoveType>,
    pub last_tetromino_anchor: Option<(i32, i32)>,
    pub current_move_type: MoveType,
    pub eliminated: bool,
    pub observer: bool,
    pub ready: bool,
    pub connected: bool,
    #[serde(skip)]
    pub pause_started_at: Option<Instant>,
}

impl Player {
    pub fn new(id: PlayerId, name: String, color: Color, tetrominos: Vec<(PieceKind, u8)>) -> Self {
        Self {
            id,
            name,
            color,
            balance: 0,
            available_tetrominos: tetrominos,
            last_move_timestamp: Instant::now(),
            last_move_kind: None,
            last_tetromino_anchor: None,
            current_move_type: MoveType::Tetromino,
            eliminated: false,
            observer: false,
            ready: false,
            connected: true,
            pause_started_at: None,
        }
    }

    pub fn is_paused(&self) -> bool {
        self.pause_started_at.is_some()
    }

    pub fn pause(&mut self) {
        self.pause_started_at = Some(Instant::now());
    }

    pub fn resume(&mut self) {
        self.pause_started_at = None;
    }

    /// `true` once a paused player has exceeded `PAUSE_MAX`.
    pub fn pause_expired(&self, pause_max: Duration) -> bool {
        self.pause_started_at
            .is_some_and(|t| t.elapsed() > pause_max)
    }

    /// Minimum wait remaining before the next action of `kind` is accepted;
    /// `None` if the player may act now.
    pub fn rate_limit_wait(&self, kind: MoveType, settings: &GameSettings) -> Option<Duration> {
        if self.is_paused() || self.last_move_kind.is_none() {
            return None;
        }
        let interval = match kind {
            MoveType::Tetromino => settings.min_move_interval_tetromino,
            MoveType::Chess => settings.min_move_interval_chess,
        };
        let elapsed = self.last_move_timestamp.elapsed();
        if elapsed >= interval {
            None
        } else {
            Some(interval - elapsed)
        }
    }

    pub fn record_move(&mut self, kind: MoveType) {
        self.last_move_timestamp = Instant::now();
        self.last_move_kind = Some(kind);
    }
}
