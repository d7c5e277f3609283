//! Behavioral tests for the game session and opponent policy.

use glamour_tictactoe::{
    Board, GameSession, Outcome, Phase, Transition, evaluate, select_move,
};
use rand::SeedableRng;
use rand::rngs::SmallRng;

fn board(s: &str) -> Board {
    s.parse().expect("valid board")
}

/// Plays a full game, the player always taking the lowest empty cell.
fn play_out(session: &mut GameSession, rng: &mut SmallRng) -> Outcome {
    loop {
        match session.phase() {
            Phase::PlayerTurn => {
                let cell = session.board().empty_cells()[0];
                session.apply_player_move(cell);
            }
            Phase::OpponentTurn => {
                session.run_opponent_turn(rng).expect("opponent has a cell");
            }
            Phase::Terminal(outcome) => return outcome,
        }
    }
}

#[test]
fn test_scenario_center_then_block() {
    let mut rng = SmallRng::seed_from_u64(3);
    let mut session = GameSession::new();

    session.apply_player_move(0);
    assert_eq!(
        session.run_opponent_turn(&mut rng),
        Ok(Transition::Placed { cell: 4 })
    );
    session.apply_player_move(1);
    assert_eq!(select_move(session.board(), &mut rng), Ok(2));
}

#[test]
fn test_scenario_top_row_player_win() {
    assert_eq!(evaluate(&board("XXX_OO___")), Outcome::PlayerWin);
}

#[test]
fn test_scenario_full_board_draw() {
    assert_eq!(evaluate(&board("XOXXOOOXX")), Outcome::Draw);
}

#[test]
fn test_terminal_absorbs_further_actions() {
    for seed in 0..16 {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut session = GameSession::new();
        let outcome = play_out(&mut session, &mut rng);
        assert!(outcome.is_terminal());

        let snapshot = session.clone();
        for cell in 0..10 {
            assert_eq!(session.apply_player_move(cell), Transition::Ignored);
            assert_eq!(session.run_opponent_turn(&mut rng), Ok(Transition::Ignored));
        }
        assert_eq!(session, snapshot, "seed {seed}");
    }
}

#[test]
fn test_cached_outcome_matches_board() {
    for seed in 0..16 {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut session = GameSession::new();
        while !session.outcome().is_terminal() {
            assert_eq!(session.outcome(), evaluate(session.board()));
            match session.phase() {
                Phase::PlayerTurn => {
                    let cell = *session.board().empty_cells().last().expect("cell");
                    session.apply_player_move(cell);
                }
                Phase::OpponentTurn => {
                    session.run_opponent_turn(&mut rng).expect("opponent moves");
                }
                Phase::Terminal(_) => unreachable!(),
            }
        }
        assert_eq!(session.outcome(), evaluate(session.board()));
    }
}

#[test]
fn test_finish_emits_single_event() {
    let mut rng = SmallRng::seed_from_u64(9);
    let mut session = GameSession::new();
    let mut events = Vec::new();

    while !session.outcome().is_terminal() {
        let transition = match session.phase() {
            Phase::PlayerTurn => {
                let cell = session.board().empty_cells()[0];
                session.apply_player_move(cell)
            }
            _ => session.run_opponent_turn(&mut rng).expect("opponent moves"),
        };
        if let Some(event) = transition.event() {
            events.push(*event);
        }
    }

    assert_eq!(events.len(), 1);
    assert_eq!(*events[0].outcome(), session.outcome());
    assert_eq!(events[0].board(), session.board());
}

#[test]
fn test_opponent_never_loses_to_lowest_cell_strategy() {
    // The naive player fills 0, 1, ... and is always blocked on row 0.
    for seed in 0..16 {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut session = GameSession::new();
        assert_ne!(play_out(&mut session, &mut rng), Outcome::PlayerWin, "seed {seed}");
    }
}
