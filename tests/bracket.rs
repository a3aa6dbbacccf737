//! Integration tests for elimination brackets: structure, progression, resets and placements.

use card_tournament::{
    bracket_positions, build_bracket, current_standings, cut_to, pair_new_round, report_result,
    BracketSide, EngineConfig, Outcome, Placement, Player, StageFormat, Tournament,
    TournamentError,
};
use chrono::NaiveDate;
use std::collections::HashMap;

fn tournament_with_players(n: usize) -> Tournament {
    let players: Vec<Player> = (0..n).map(|i| Player::new(format!("P{i}"))).collect();
    let date = NaiveDate::from_ymd_opt(2024, 11, 2).unwrap();
    Tournament::with_players("Nationals", "NAT4", date, players)
}

/// Play one Swiss round where the first-listed player always wins, then cut.
fn cut_tournament(players: usize, format: StageFormat, size: u32) -> (Tournament, EngineConfig) {
    let config = EngineConfig::default();
    let mut t = tournament_with_players(players);
    let round = pair_new_round(&mut t, &config).unwrap().clone();
    for p in round.matches() {
        report_result(&mut t, 1, p.table_number, Outcome::Player1Win).unwrap();
    }
    cut_to(&mut t, format, size, &config).unwrap();
    (t, config)
}

/// Play the bracket out with a fixed outcome; returns the number of rounds played.
fn run_bracket(t: &mut Tournament, config: &EngineConfig, outcome: Outcome) -> u32 {
    let allowed = t.current_stage().format.allowed_losses();
    loop {
        let losses: HashMap<_, _> = bracket_positions(t.current_stage())
            .into_iter()
            .map(|p| (p.player, p.losses))
            .collect();
        let round = match pair_new_round(t, config) {
            Ok(round) => round.clone(),
            Err(TournamentError::BracketComplete) => return t.current_stage().rounds.len() as u32,
            Err(e) => panic!("unexpected error: {e}"),
        };
        for p in &round.pairings {
            assert!(!p.is_bye());
            for id in p.players() {
                assert!(losses[&id] < allowed, "eliminated player paired");
            }
        }
        for p in &round.pairings {
            report_result(t, round.number, p.table_number, outcome).unwrap();
        }
    }
}

fn champion_seed(t: &Tournament) -> u32 {
    let positions = bracket_positions(t.current_stage());
    let champions: Vec<_> = positions
        .iter()
        .filter(|p| p.placement == Placement::Champion)
        .collect();
    assert_eq!(champions.len(), 1);
    champions[0].seed
}

#[test]
fn bracket_shapes() {
    let de8 = build_bracket(StageFormat::DoubleElim, 8).unwrap();
    assert_eq!(de8.matches.len(), 15);
    assert_eq!(de8.rounds(), 7);
    assert_eq!(de8.matches.iter().filter(|m| m.conditional).count(), 1);
    assert_eq!(
        de8.matches.iter().filter(|m| m.side == BracketSide::GrandFinal).count(),
        2
    );

    let se16 = build_bracket(StageFormat::SingleElim, 16).unwrap();
    assert_eq!(se16.matches.len(), 15);
    assert_eq!(se16.rounds(), 4);
    assert!(se16.matches.iter().all(|m| m.side == BracketSide::Winners));

    let de16 = build_bracket(StageFormat::DoubleElim, 16).unwrap();
    assert_eq!(de16.matches.len(), 31);
    assert_eq!(de16.rounds(), 9);

    let de3 = build_bracket(StageFormat::DoubleElim, 3).unwrap();
    assert_eq!(de3.matches.len(), 5);
    let se3 = build_bracket(StageFormat::SingleElim, 3).unwrap();
    assert_eq!(se3.matches.len(), 2);
    assert_eq!(se3.matches_in_round(1).count(), 1);
}

#[test]
fn unbuildable_sizes_are_rejected() {
    for size in [0, 1, 2, 5, 12] {
        assert_eq!(
            build_bracket(StageFormat::SingleElim, size).unwrap_err(),
            TournamentError::InvalidCutSize(size)
        );
    }
    assert!(matches!(
        build_bracket(StageFormat::Swiss, 8),
        Err(TournamentError::StageSequenceViolation(_))
    ));
}

#[test]
fn top_seeds_win_out_without_a_reset() {
    let (mut t, config) = cut_tournament(10, StageFormat::DoubleElim, 8);
    assert_eq!(run_bracket(&mut t, &config, Outcome::Player1Win), 6);
    assert_eq!(champion_seed(&t), 1);

    for p in bracket_positions(t.current_stage()) {
        if p.seed == 1 {
            assert_eq!(p.losses, 0);
        } else {
            assert_eq!(p.losses, 2, "seed {} should be out on two losses", p.seed);
            assert_eq!(p.placement, Placement::Eliminated);
        }
    }
}

#[test]
fn losers_bracket_winner_forces_the_reset() {
    let (mut t, config) = cut_tournament(8, StageFormat::DoubleElim, 8);
    assert_eq!(run_bracket(&mut t, &config, Outcome::Player2Win), 7);
    let champion = champion_seed(&t);
    assert_eq!(champion, 6);

    let positions = bracket_positions(t.current_stage());
    let champ = positions.iter().find(|p| p.seed == champion).unwrap();
    assert_eq!(champ.losses, 1);
    assert!(positions
        .iter()
        .filter(|p| p.seed != champion)
        .all(|p| p.losses == 2 && p.eliminated_in.is_some()));
}

#[test]
fn single_elim_four_takes_two_rounds() {
    let (mut t, config) = cut_tournament(6, StageFormat::SingleElim, 4);
    let round = pair_new_round(&mut t, &config).unwrap().clone();
    let stage = t.current_stage();
    let seeds: Vec<(u32, u32)> = round
        .pairings
        .iter()
        .map(|p| {
            (
                stage.seed_of(p.player1).unwrap(),
                stage.seed_of(p.player2.unwrap()).unwrap(),
            )
        })
        .collect();
    assert_eq!(seeds, vec![(1, 4), (2, 3)]);
    for p in &round.pairings {
        report_result(&mut t, 1, p.table_number, Outcome::Player1Win).unwrap();
    }

    assert_eq!(run_bracket(&mut t, &config, Outcome::Player1Win), 2);
    assert_eq!(champion_seed(&t), 1);
}

#[test]
fn cut_of_three_plays_in_seeds_two_and_three() {
    let (mut t, config) = cut_tournament(6, StageFormat::SingleElim, 3);
    let round = pair_new_round(&mut t, &config).unwrap().clone();
    assert_eq!(round.pairings.len(), 1);
    let stage = t.current_stage();
    let first = stage.player_with_seed(1).unwrap();
    assert!(!round.pairings[0].involves(first));
    report_result(&mut t, 1, 1, Outcome::Player1Win).unwrap();
    assert_eq!(run_bracket(&mut t, &config, Outcome::Player1Win), 2);
    assert_eq!(champion_seed(&t), 1);

    let (mut t, config) = cut_tournament(6, StageFormat::DoubleElim, 3);
    assert_eq!(run_bracket(&mut t, &config, Outcome::Player1Win), 4);
    assert_eq!(champion_seed(&t), 1);
}

#[test]
fn sixteen_player_double_elim_completes() {
    let (mut t, config) = cut_tournament(20, StageFormat::DoubleElim, 16);
    let rounds = run_bracket(&mut t, &config, Outcome::Player1Win);
    assert_eq!(rounds, 8);
    assert_eq!(champion_seed(&t), 1);
    assert_eq!(
        bracket_positions(t.current_stage())
            .iter()
            .filter(|p| p.placement == Placement::Eliminated)
            .count(),
        15
    );
}

#[test]
fn draws_are_not_allowed_in_a_bracket() {
    let (mut t, config) = cut_tournament(8, StageFormat::SingleElim, 8);
    pair_new_round(&mut t, &config).unwrap();
    assert_eq!(
        report_result(&mut t, 1, 1, Outcome::Draw).unwrap_err(),
        TournamentError::DrawInElimination
    );
}

#[test]
fn earlier_bracket_rounds_are_closed() {
    let (mut t, config) = cut_tournament(8, StageFormat::DoubleElim, 8);
    let round = pair_new_round(&mut t, &config).unwrap().clone();
    for p in &round.pairings {
        report_result(&mut t, 1, p.table_number, Outcome::Player1Win).unwrap();
    }
    pair_new_round(&mut t, &config).unwrap();
    assert_eq!(
        report_result(&mut t, 1, 1, Outcome::Player2Win).unwrap_err(),
        TournamentError::RoundClosed(1)
    );
}

#[test]
fn first_round_losers_drop_to_the_losers_bracket() {
    let (mut t, config) = cut_tournament(8, StageFormat::DoubleElim, 8);
    let round = pair_new_round(&mut t, &config).unwrap().clone();
    for p in &round.pairings {
        report_result(&mut t, 1, p.table_number, Outcome::Player1Win).unwrap();
    }

    for p in bracket_positions(t.current_stage()) {
        let expected = if p.seed <= 4 { Placement::Winners } else { Placement::Losers };
        assert_eq!(p.placement, expected, "seed {}", p.seed);
    }

    // Round 2 has two winners-bracket and two losers-bracket matches.
    let round = pair_new_round(&mut t, &config).unwrap();
    assert_eq!(round.pairings.len(), 4);
}

#[test]
fn bracket_standings_lead_with_the_champion() {
    let (mut t, config) = cut_tournament(8, StageFormat::DoubleElim, 8);
    run_bracket(&mut t, &config, Outcome::Player1Win);

    let standings = current_standings(&t, &config.pairing);
    assert_eq!(standings.len(), 8);
    let stage = t.current_stage();
    assert_eq!(stage.seed_of(standings[0].player), Some(1));
    // The grand final loser went out last.
    assert_eq!(stage.seed_of(standings[1].player), Some(8));
}
