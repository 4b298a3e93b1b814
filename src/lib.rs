//! Shaktris authoritative game engine.
//!
//! A sparse-board, massively-multiplayer hybrid of tetromino placement and
//! chess movement. This crate owns the engine only: board representation,
//! placement/movement legality, row-clearing and gravity, connectivity
//! enforcement, home-zone generation, the per-player action pipeline, and
//! the wire message contracts a transport layer sits behind.

pub mod board;
pub mod chess;
pub mod config;
pub mod diff;
pub mod error;
pub mod game;
pub mod islands;
pub mod pieces;
pub mod player;
pub mod protocol;
pub mod registry;
pub mod rng;
pub mod rowclear;
pub mod scheduler;
pub mod spiral;
pub mod tetromino;

pub use board::{Board, Bounds, Item};
pub use config::GameSettings;
pub use error::{ShaktrisError, ShaktrisResult};
pub use game::{Game, GameId, GameStatus};
pub use player::{Player, PlayerId};
pub use registry::GameRegistry;
pub use scheduler::Scheduler;
