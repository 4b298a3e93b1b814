//! Per-player action pipeline and per-Game mutation discipline (`spec.md` §4.8, §5).
//!
//! Grounded on `lgn21st-tui-tetris/src/adapter/runtime.rs`'s bounded
//! `mpsc::channel` sized by `max_pending_commands` with `try_send`-based
//! backpressure — the same shape as this module's "busy" rejection, except
//! depth is fixed at 1 per player (`spec.md` §4.8: "at most one pending
//! action per player at a time").

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::{ShaktrisError, ShaktrisResult};
use crate::game::Game;
use crate::player::PlayerId;

struct PendingSlot {
    occupied: bool,
}

/// Serializes all mutating operations for one [`Game`] behind a single
/// `parking_lot::Mutex`, and enforces the "at most one pending action per
/// player" rule via a small occupancy map guarded by the same structure.
///
/// `parking_lot::Mutex` (not `tokio::sync::Mutex`) is used deliberately: the
/// validate/place/clear/island pass must run to completion without ever
/// yielding to the async runtime while the lock is held.
pub struct Scheduler {
    game: Arc<Mutex<Game>>,
    pending: Mutex<HashMap<PlayerId, PendingSlot>>,
}

impl Scheduler {
    pub fn new(game: Game) -> Self {
        Self {
            game: Arc::new(Mutex::new(game)),
            pending: Mutex::new(HashMap::new()),
        }
    }

    pub fn game_handle(&self) -> Arc<Mutex<Game>> {
        self.game.clone()
    }

    /// Submits `action` for `player_id`. Rejects with [`ShaktrisError::Busy`]
    /// if that player already has an action in flight; otherwise runs it
    /// synchronously under the Game lock and returns its result.
    ///
    /// Per-player FIFO is automatic: a caller awaiting one submission before
    /// issuing the next observes its own calls in order, and concurrent
    /// submissions for the same player are serialized by `pending`'s lock.
    pub fn submit<F, R>(&self, player_id: PlayerId, action: F) -> ShaktrisResult<R>
    where
        F: FnOnce(&mut Game) -> ShaktrisResult<R> + Send + 'static,
        R: Send + 'static,
    {
        {
            let mut pending = self.pending.lock();
            let slot = pending.entry(player_id).or_insert(PendingSlot { occupied: false });
            if slot.occupied {
                return Err(ShaktrisError::Busy);
            }
            slot.occupied = true;
        }

        let result = {
            let mut game = self.game.lock();
            action(&mut game)
        };

        if let Some(slot) = self.pending.lock().get_mut(&player_id) {
            slot.occupied = false;
        }

        result
    }

    /// Marks the player's pending slot free without running anything, for
    /// the "disconnect drops the pending action" rule (`spec.md` §4.8).
    pub fn cancel_pending(&self, player_id: PlayerId) {
        if let Some(slot) = self.pending.lock().get_mut(&player_id) {
            slot.occupied = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameSettings;

    #[test]
    fn second_concurrent_submission_is_rejected_busy() {
        let scheduler = Scheduler::new(Game::new(GameSettings::default()));
        let player_id = PlayerId::new_v4();

        {
            let mut pending = scheduler.pending.lock();
            pending.insert(player_id, PendingSlot { occupied: true });
        }

        let result = scheduler.submit(player_id, move |_game| Ok(()));
        assert_eq!(result, Err(ShaktrisError::Busy));
    }

    #[test]
    fn submission_runs_and_frees_the_slot() {
        let scheduler = Scheduler::new(Game::new(GameSettings::default()));
        let player_id = PlayerId::new_v4();

        let result = scheduler.submit(player_id, move |game| {
            Ok(game.players.len())
        });
        assert_eq!(result, Ok(0));

        // Slot should be free again, so a second submission should succeed too.
        let result2 = scheduler.submit(player_id, move |_game| Ok(()));
        assert!(result2.is_ok());
    }

    #[test]
    fn cancel_pending_frees_a_stuck_slot() {
        let scheduler = Scheduler::new(Game::new(GameSettings::default()));
        let player_id = PlayerId::new_v4();
        {
            let mut pending = scheduler.pending.lock();
            pending.insert(player_id, PendingSlot { occupied: true });
        }
        scheduler.cancel_pending(player_id);
        let result = scheduler.submit(player_id, move |_game| Ok(()));
        assert!(result.is_ok());
    }
}
