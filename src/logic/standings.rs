//! Standings and seeding: rank players by points, tie-break metric, then a stable fallback.
//!
//! Everything here is a pure function of the tournament state, so the same standings drive
//! previews, Swiss pairing and the cut.

use crate::config::{PairingPolicy, Scoring, TieBreak};
use crate::logic::bracket;
use crate::models::{Outcome, Player, PlayerId, Side, Stage, StageFormat, Tournament};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;

/// One row of the standings.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Standing {
    pub player: PlayerId,
    /// 1-based position, no ties.
    pub rank: u32,
    pub points: u32,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub byes: u32,
    pub sos: f64,
    pub extended_sos: f64,
    pub corp_games: u32,
    pub runner_games: u32,
}

impl Standing {
    /// Positive when the player has played corp more often than runner.
    pub fn side_balance(&self) -> i64 {
        i64::from(self.corp_games) - i64::from(self.runner_games)
    }
}

/// Per-player tally over a stage's pairings.
#[derive(Clone, Debug, Default)]
pub(crate) struct Record {
    pub points: u32,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub byes: u32,
    pub corp_games: u32,
    pub runner_games: u32,
    /// Opponents of reported games, in play order. Byes excluded.
    pub opponents: Vec<PlayerId>,
    pub last_side: Option<Side>,
}

impl Record {
    fn rounds_played(&self) -> u32 {
        self.wins + self.losses + self.draws + self.byes
    }

    fn points_per_round(&self) -> f64 {
        match self.rounds_played() {
            0 => 0.0,
            n => f64::from(self.points) / f64::from(n),
        }
    }
}

/// Tally results and sides for every player appearing in the stage.
pub(crate) fn tally(stage: &Stage, scoring: &Scoring) -> HashMap<PlayerId, Record> {
    let mut records: HashMap<PlayerId, Record> = HashMap::new();

    for pairing in stage.pairings() {
        for player in pairing.players() {
            if let Some(side) = pairing.side_of(player) {
                let r = records.entry(player).or_default();
                match side {
                    Side::Corp => r.corp_games += 1,
                    Side::Runner => r.runner_games += 1,
                }
                r.last_side = Some(side);
            }
        }

        let Some(outcome) = pairing.outcome else {
            continue;
        };
        let Some(player2) = pairing.player2 else {
            let r = records.entry(pairing.player1).or_default();
            r.byes += 1;
            r.points += scoring.bye;
            continue;
        };

        let (first, second) = match outcome {
            Outcome::Player1Win => ((scoring.win, 1, 0, 0), (scoring.loss, 0, 1, 0)),
            Outcome::Player2Win => ((scoring.loss, 0, 1, 0), (scoring.win, 1, 0, 0)),
            Outcome::Draw => ((scoring.draw, 0, 0, 1), (scoring.draw, 0, 0, 1)),
        };
        for (player, opponent, (points, wins, losses, draws)) in [
            (pairing.player1, player2, first),
            (player2, pairing.player1, second),
        ] {
            let r = records.entry(player).or_default();
            r.points += points;
            r.wins += wins;
            r.losses += losses;
            r.draws += draws;
            r.opponents.push(opponent);
        }
    }

    records
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0u32), |(sum, n), v| (sum + v, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / f64::from(n)
    }
}

/// Standings of the current stage.
pub fn current_standings(tournament: &Tournament, policy: &PairingPolicy) -> Vec<Standing> {
    stage_standings(tournament, tournament.current_stage(), policy)
}

/// Standings of `stage`, best first.
///
/// Swiss stages rank active players by points, the configured tie-break, then the fallback
/// order (manual seed if the tournament seeds manually, registration order otherwise).
/// Elimination stages rank registered players by how far they got in the bracket.
pub fn stage_standings(tournament: &Tournament, stage: &Stage, policy: &PairingPolicy) -> Vec<Standing> {
    let records = tally(stage, &policy.scoring);
    let empty = Record::default();
    let record = |id: &PlayerId| records.get(id).unwrap_or(&empty);

    let sos: HashMap<PlayerId, f64> = records
        .iter()
        .map(|(id, r)| (*id, mean(r.opponents.iter().map(|o| record(o).points_per_round()))))
        .collect();
    let sos_of = |id: &PlayerId| sos.get(id).copied().unwrap_or(0.0);

    let fallback = |index: usize, player: &Player| {
        let manual = if tournament.manual_seed {
            player.manual_seed.unwrap_or(u32::MAX)
        } else {
            0
        };
        (manual, index)
    };

    let mut rows: Vec<((u32, usize), Standing)> = tournament
        .players
        .iter()
        .enumerate()
        .filter(|(_, p)| match stage.format {
            StageFormat::Swiss => p.active,
            StageFormat::SingleElim | StageFormat::DoubleElim => stage.seed_of(p.id).is_some(),
        })
        .map(|(index, p)| {
            let r = record(&p.id);
            let standing = Standing {
                player: p.id,
                rank: 0,
                points: r.points,
                wins: r.wins,
                losses: r.losses,
                draws: r.draws,
                byes: r.byes,
                sos: sos_of(&p.id),
                extended_sos: mean(r.opponents.iter().map(sos_of)),
                corp_games: r.corp_games,
                runner_games: r.runner_games,
            };
            (fallback(index, p), standing)
        })
        .collect();

    match stage.format {
        StageFormat::Swiss => rows.sort_by(|(fa, a), (fb, b)| {
            b.points
                .cmp(&a.points)
                .then_with(|| compare_tie_break(policy.tie_break, a, b))
                .then_with(|| fa.cmp(fb))
        }),
        StageFormat::SingleElim | StageFormat::DoubleElim => {
            let keys = bracket::placement_keys(stage);
            rows.sort_by_key(|(_, s)| keys.get(&s.player).copied());
        }
    }

    rows.into_iter()
        .enumerate()
        .map(|(i, (_, mut s))| {
            s.rank = i as u32 + 1;
            s
        })
        .collect()
}

/// Better tie-break sorts first.
fn compare_tie_break(tie_break: TieBreak, a: &Standing, b: &Standing) -> Ordering {
    match tie_break {
        TieBreak::StrengthOfSchedule => b.sos.total_cmp(&a.sos),
        TieBreak::ExtendedStrengthOfSchedule => b
            .sos
            .total_cmp(&a.sos)
            .then_with(|| b.extended_sos.total_cmp(&a.extended_sos)),
        TieBreak::RegistrationOrder => Ordering::Equal,
    }
}

/// The first `n` players of the current standings.
pub fn top(tournament: &Tournament, n: usize, policy: &PairingPolicy) -> Vec<PlayerId> {
    current_standings(tournament, policy)
        .into_iter()
        .take(n)
        .map(|s| s.player)
        .collect()
}
