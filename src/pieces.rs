//! Tetromino shape catalog (`spec.md` §4.3)
//!
//! Shapes are expressed as mino offsets from a piece anchor, reusing the
//! teacher's SRS tables. Wall-kick tables are dropped: placements here are
//! atomic (no interactive rotation against a falling stack), so there is
//! nothing to kick against.

use serde::{Deserialize, Serialize};

/// Offset of a single mino relative to the placement anchor.
pub type MinoOffset = (i32, i32);

/// Four mino offsets making up one piece at one rotation.
pub type PieceShape = [MinoOffset; 4];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

impl PieceKind {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "i" => Some(PieceKind::I),
            "o" => Some(PieceKind::O),
            "t" => Some(PieceKind::T),
            "s" => Some(PieceKind::S),
            "z" => Some(PieceKind::Z),
            "j" => Some(PieceKind::J),
            "l" => Some(PieceKind::L),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PieceKind::I => "i",
            PieceKind::O => "o",
            PieceKind::T => "t",
            PieceKind::S => "s",
            PieceKind::Z => "z",
            PieceKind::J => "j",
            PieceKind::L => "l",
        }
    }

    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
    ];
}

/// Rotation index, reduced mod 4 on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rotation(u8);

impl Rotation {
    pub fn new(value: u8) -> Self {
        Rotation(value % 4)
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

/// Mino offsets (dx, dz) for `kind` at `rotation`, anchored so all offsets
/// are non-negative (top-left of the shape's 4x4/3x3 bounding box is (0,0)).
pub fn get_shape(kind: PieceKind, rotation: Rotation) -> PieceShape {
    match kind {
        PieceKind::I => i_shape(rotation),
        PieceKind::O => o_shape(rotation),
        PieceKind::T => t_shape(rotation),
        PieceKind::S => s_shape(rotation),
        PieceKind::Z => z_shape(rotation),
        PieceKind::J => j_shape(rotation),
        PieceKind::L => l_shape(rotation),
    }
}

fn i_shape(rotation: Rotation) -> PieceShape {
    match rotation.value() {
        0 => [(0, 1), (1, 1), (2, 1), (3, 1)],
        1 => [(2, 0), (2, 1), (2, 2), (2, 3)],
        2 => [(0, 2), (1, 2), (2, 2), (3, 2)],
        _ => [(1, 0), (1, 1), (1, 2), (1, 3)],
    }
}

fn o_shape(_rotation: Rotation) -> PieceShape {
    [(1, 0), (2, 0), (1, 1), (2, 1)]
}

fn t_shape(rotation: Rotation) -> PieceShape {
    match rotation.value() {
        0 => [(1, 0), (0, 1), (1, 1), (2, 1)],
        1 => [(1, 0), (1, 1), (2, 1), (1, 2)],
        2 => [(0, 1), (1, 1), (2, 1), (1, 2)],
        _ => [(1, 0), (0, 1), (1, 1), (1, 2)],
    }
}

fn s_shape(rotation: Rotation) -> PieceShape {
    match rotation.value() {
        0 => [(1, 0), (2, 0), (0, 1), (1, 1)],
        1 => [(1, 0), (1, 1), (2, 1), (2, 2)],
        2 => [(1, 1), (2, 1), (0, 2), (1, 2)],
        _ => [(0, 0), (0, 1), (1, 1), (1, 2)],
    }
}

fn z_shape(rotation: Rotation) -> PieceShape {
    match rotation.value() {
        0 => [(0, 0), (1, 0), (1, 1), (2, 1)],
        1 => [(2, 0), (1, 1), (2, 1), (1, 2)],
        2 => [(0, 1), (1, 1), (1, 2), (2, 2)],
        _ => [(1, 0), (0, 1), (1, 1), (0, 2)],
    }
}

fn j_shape(rotation: Rotation) -> PieceShape {
    match rotation.value() {
        0 => [(0, 0), (0, 1), (1, 1), (2, 1)],
        1 => [(1, 0), (2, 0), (1, 1), (1, 2)],
        2 => [(0, 1), (1, 1), (2, 1), (2, 2)],
        _ => [(1, 0), (1, 1), (0, 2), (1, 2)],
    }
}

fn l_shape(rotation: Rotation) -> PieceShape {
    match rotation.value() {
        0 => [(2, 0), (0, 1), (1, 1), (2, 1)],
        1 => [(1, 0), (1, 1), (1, 2), (2, 2)],
        2 => [(0, 1), (1, 1), (2, 1), (0, 2)],
        _ => [(0, 0), (1, 0), (1, 1), (1, 2)],
    }
}
