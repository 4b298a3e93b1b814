//! Scripted two-player walkthrough: join, place a tetromino, move a pawn,
//! and print the incremental diff each step produces. Exercises the public
//! API the way a transport adapter would, without one.

use shaktris::board::PieceId;
use shaktris::chess::PieceType;
use shaktris::diff::DiffTracker;
use shaktris::pieces::{PieceKind, Rotation};
use shaktris::{GameRegistry, GameSettings};

fn main() {
    tracing_subscriber::fmt::init();

    let registry = GameRegistry::new(GameSettings::default());
    let game_id = registry.create_game(None);
    let scheduler = registry.get(game_id).expect("just created");

    let alice = registry.join(game_id, "alice".to_string()).expect("alice joins");
    let bob = registry.join(game_id, "bob".to_string()).expect("bob joins");
    tracing::info!(%alice, %bob, "players joined");

    let mut tracker = DiffTracker::new();
    {
        let handle = scheduler.game_handle();
        let game = handle.lock();
        let payload = tracker.compute_for_observer(&game.board, alice);
        tracing::info!(?payload, "initial full state for alice");
    }

    let place_result = scheduler
        .submit(alice, move |game| {
            game.place_tetromino(alice, PieceKind::I, Rotation::new(0), 0, 1, 0)
        })
        .expect("alice places a tetromino");
    tracing::info!(?place_result, "alice placed I piece");

    {
        let handle = scheduler.game_handle();
        let game = handle.lock();
        let payload = tracker.compute_for_observer(&game.board, alice);
        tracing::info!(?payload, "delta after placement");
    }

    let pawn_id: PieceId = {
        let handle = scheduler.game_handle();
        let game = handle.lock();
        game.chess_pieces
            .values()
            .find(|p| p.player == alice && p.piece_type == PieceType::Pawn)
            .map(|p| p.id)
            .expect("alice has a pawn")
    };

    // Alice's piece is still in her Tetromino phase until a legal chess
    // move becomes available; this move is attempted only to demonstrate
    // the call shape and may legitimately fail with NotYourTurnPhase.
    let move_result = scheduler.submit(alice, move |game| {
        game.move_chess(alice, pawn_id, 0, 1)
    });
    tracing::info!(?move_result, "alice attempted a pawn move");

    let _ = bob;
    tracing::info!(games = registry.game_count(), "demo complete");
}
