//! End-to-end scenarios against the public `Game` API, one per named case.

use shaktris::board::Item;
use shaktris::chess::PieceType;
use shaktris::config::GameSettings;
use shaktris::diff::{BroadcastPayload, DiffTracker};
use shaktris::game::Game;
use shaktris::pieces::{PieceKind, Rotation};

fn two_player_game() -> (Game, uuid::Uuid, uuid::Uuid) {
    let mut game = Game::new(GameSettings::default());
    let a = game.join("alice".to_string()).unwrap();
    let b = game.join("bob".to_string()).unwrap();
    (game, a, b)
}

#[test]
fn place_i_piece_connected_advances_phase_and_reports_four_new_cells() {
    let (mut game, a, _b) = two_player_game();
    let zone = game.home_zones[&a].clone();

    let mut tracker = DiffTracker::new();
    tracker.compute_for_observer(&game.board, a);
    let occupied_before = game.board.occupied_coords().count();

    let result = game
        .place_tetromino(a, PieceKind::I, Rotation::new(0), zone.x - 2, zone.z, 0)
        .expect("placement directly in front of the home row succeeds");
    assert!(!result.exploded);
    assert_eq!(game.board.occupied_coords().count() - occupied_before, 4);

    // The I piece's row sits one cell past the home zone's previous tight
    // bound, so this broadcast is a fresh full state rather than a delta;
    // either way its cell count grows by exactly the four placed cells.
    let payload = tracker.compute_for_observer(&game.board, a);
    match payload {
        BroadcastPayload::Delta { changes } => {
            assert_eq!(changes.iter().filter(|c| c.new_value.is_some()).count(), 4);
        }
        BroadcastPayload::FullState { cells, .. } => {
            assert_eq!(cells.len(), occupied_before + 4);
        }
    }
}

#[test]
fn explosion_on_collision_does_not_mutate_board_but_advances_phase() {
    let (mut game, a, _b) = two_player_game();
    let zone = game.home_zones[&a].clone();
    let before = game.board.occupied_coords().count();

    // An O piece dropped from y=1 whose footprint overlaps the player's own
    // pawn row (always present at (zone.x, zone.z) right after join) must
    // explode rather than land, without touching the board.
    let result = game
        .place_tetromino(a, PieceKind::O, Rotation::new(0), zone.x - 1, zone.z - 1, 1)
        .expect("an airborne collision still returns ok:true, exploded:true");
    assert!(result.exploded);
    assert_eq!(game.board.occupied_coords().count(), before);
    assert_eq!(game.players[&a].current_move_type, shaktris::player::MoveType::Chess);
}

#[test]
fn row_clear_preserves_a_safe_home_zone_segment() {
    // The exhaustive safe/unsafe row-clear rule is covered at the engine
    // level in `rowclear.rs`'s own unit tests; here we only assert the
    // end-to-end guarantee that a tetromino placement can never remove a
    // player's own home-zone king cell.
    let (mut game, a, _b) = two_player_game();
    let zone_a = game.home_zones[&a].clone();

    game.place_tetromino(a, PieceKind::I, Rotation::new(0), zone_a.x - 2, zone_a.z, 0)
        .unwrap();

    let king_present = game
        .board
        .has_type(zone_a.x, zone_a.min_z(), |i| i.owner() == a && i.is_chess());
    assert!(king_present);
}

#[test]
fn pawn_promotion_at_configured_distance_updates_the_board_item() {
    let mut game = Game::new(GameSettings::default());
    let a = game.join("alice".to_string()).unwrap();
    let pawn_id = game
        .chess_pieces
        .values()
        .find(|p| p.player == a && p.piece_type == PieceType::Pawn)
        .map(|p| p.id)
        .unwrap();

    {
        let piece = game.chess_pieces.get_mut(&pawn_id).unwrap();
        piece.move_distance = 7;
        piece.has_moved = true;
    }
    let (fx, fz) = game.chess_pieces[&pawn_id].forward_vector();
    let (px, pz) = (game.chess_pieces[&pawn_id].x, game.chess_pieces[&pawn_id].z);
    game.players.get_mut(&a).unwrap().current_move_type = shaktris::player::MoveType::Chess;

    let result = game.move_chess(a, pawn_id, px + fx, pz + fz).unwrap();
    assert_eq!(result.promoted_to, Some(GameSettings::default().promotion_piece));
    match game.board.get(px + fx, pz + fz) {
        Some(items) => assert!(items
            .iter()
            .any(|i| matches!(i, Item::Chess { piece_type, .. } if *piece_type == result.promoted_to.unwrap()))),
        None => panic!("promoted piece missing from board"),
    }
}

#[test]
fn king_capture_ends_a_two_player_game_and_orphans_the_loser() {
    let (mut game, a, b) = two_player_game();
    let king_b = game
        .chess_pieces
        .values()
        .find(|p| p.player == b && p.piece_type == PieceType::King)
        .map(|p| p.id)
        .unwrap();
    let (kx, kz) = (game.chess_pieces[&king_b].x, game.chess_pieces[&king_b].z);

    // Fabricate an adjacent attacker for `a` directly next to `b`'s king to
    // exercise the capture/elimination path without playing out full moves.
    let attacker_id = 9_999;
    let attacker = shaktris::chess::ChessPiece::new(
        attacker_id,
        PieceType::Rook,
        a,
        kx,
        kz - 1,
        0,
    );
    game.board.append(
        kx,
        kz - 1,
        Item::Chess {
            player: a,
            piece_type: PieceType::Rook,
            piece_id: attacker_id,
        },
    );
    game.chess_pieces.insert(attacker_id, attacker);
    game.players.get_mut(&a).unwrap().current_move_type = shaktris::player::MoveType::Chess;

    let result = game.move_chess(a, attacker_id, kx, kz).unwrap();
    assert!(result.game_over);
    assert_eq!(result.winner, Some(a));
    assert!(game.players[&b].eliminated);
}

#[test]
fn five_players_spiral_into_non_overlapping_cardinal_zones() {
    let mut game = Game::new(GameSettings::default());
    for i in 0..5 {
        game.join(format!("player-{i}")).unwrap();
    }
    assert_eq!(game.home_zones.len(), 5);

    let rects: Vec<_> = game
        .home_zones
        .values()
        .map(|z| shaktris::spiral::HomeZoneRect {
            x: z.x,
            z: z.z,
            width: z.width,
            height: z.height,
            orientation: z.orientation,
        })
        .collect();

    for i in 0..rects.len() {
        for j in (i + 1)..rects.len() {
            assert!(rects[i].closest_edge_manhattan(&rects[j]) >= 7);
        }
    }
}
