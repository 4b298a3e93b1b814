//! Multi-game container: lookup, creation, join/leave routing, abandonment
//! sweep (`spec.md` §4.10).
//!
//! Grounded on `trilltino-XFChess/backend/src/api.rs`'s `AppState` (a shared
//! map behind a lock, one struct per concern); the outer map itself is a
//! `dashmap::DashMap` rather than `Mutex<HashMap<..>>` so that inserts and
//! removes never block an in-flight Game mutation (`spec.md` §5: "the
//! GameRegistry's outer map is guarded by its own lock; inserts/removes do
//! not block ongoing Game mutations").

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tracing::{info, warn};

use crate::config::GameSettings;
use crate::diff::BroadcastPayload;
use crate::error::{ShaktrisError, ShaktrisResult};
use crate::game::{Game, GameId, GameStatus};
use crate::player::PlayerId;
use crate::scheduler::Scheduler;

/// Difficulty tier for a computer-player driver; only the interface is in
/// scope (`spec.md` §1: "we specify only the action interface it must
/// conform to"), not the driver's decision logic itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComputerDifficulty {
    Easy,
    Medium,
    Hard,
}

/// Owns every live [`Game`], each behind its own [`Scheduler`]. Games never
/// share a lock with each other; only the outer id-to-game map is shared.
pub struct GameRegistry {
    games: DashMap<GameId, Arc<Scheduler>>,
    default_settings: GameSettings,
}

impl GameRegistry {
    pub fn new(default_settings: GameSettings) -> Self {
        Self {
            games: DashMap::new(),
            default_settings,
        }
    }

    pub fn create_game(&self, settings: Option<GameSettings>) -> GameId {
        let game = Game::new(settings.unwrap_or(self.default_settings));
        let id = game.id;
        self.games.insert(id, Arc::new(Scheduler::new(game)));
        info!(game_id = %id, "created game");
        id
    }

    pub fn get(&self, id: GameId) -> Option<Arc<Scheduler>> {
        self.games.get(&id).map(|entry| entry.value().clone())
    }

    pub fn join(&self, id: GameId, player_name: String) -> ShaktrisResult<PlayerId> {
        let scheduler = self.get(id).ok_or(ShaktrisError::NotFound)?;
        scheduler.submit(PlayerId::nil(), move |game| game.join(player_name))
    }

    pub fn leave(&self, id: GameId, player_id: PlayerId) -> ShaktrisResult<()> {
        let scheduler = self.get(id).ok_or(ShaktrisError::NotFound)?;
        scheduler.submit(player_id, move |game| game.leave(player_id))
    }

    /// Registers a computer-player driver as an ordinary player; the driver
    /// submits actions through the same [`Scheduler::submit`] interface as a
    /// human client, with no privileged access (`spec.md` §5).
    pub fn add_computer_player(
        &self,
        id: GameId,
        _difficulty: ComputerDifficulty,
    ) -> ShaktrisResult<PlayerId> {
        let scheduler = self.get(id).ok_or(ShaktrisError::NotFound)?;
        scheduler.submit(PlayerId::nil(), |game| game.join("computer".to_string()))
    }

    /// Retires every game whose non-observer players have all been
    /// disconnected longer than `abandonment_timeout`.
    pub fn sweep_abandoned(&self, abandonment_timeout: Duration) {
        let mut to_remove = Vec::new();
        for entry in self.games.iter() {
            let abandoned = {
                let game = entry.value().game_handle();
                let game = game.lock();
                game.status != GameStatus::Completed && game.is_abandoned(abandonment_timeout)
            };
            if abandoned {
                to_remove.push(*entry.key());
            }
        }
        for id in to_remove {
            self.games.remove(&id);
            warn!(game_id = %id, "retired abandoned game");
        }
    }

    pub fn game_count(&self) -> usize {
        self.games.len()
    }

    /// Routes `message` out to every connected client of game `id`
    /// (`spec.md` §4.10's `Broadcast(id, message)`). The outbound transport
    /// itself is a Non-goal; this validates the game exists and is the
    /// choke point a transport adapter hangs its fan-out off of.
    pub fn broadcast(&self, id: GameId, message: BroadcastPayload) -> ShaktrisResult<()> {
        self.get(id).ok_or(ShaktrisError::NotFound)?;
        info!(game_id = %id, ?message, "broadcast");
        Ok(())
    }
}
