//! Elimination brackets: build the static structure for a cut and pair its rounds.
//!
//! Winners round 1 uses standard seeding (1v8, 4v5, 2v7, 3v6 for a cut of 8) so the top
//! seeds can only meet late. In double elimination every winners-bracket loser drops into
//! the losers bracket; the grand final is followed by a reset match when the losers-bracket
//! player wins it, so nobody is out before their second loss. A cut of 3 has seed 1 wait
//! while seeds 2 and 3 play in.

use crate::models::{
    Bracket, BracketMatch, BracketSide, Pairing, PlayerId, Side, Slot, Stage, StageFormat,
    TournamentError,
};
use serde::Serialize;
use std::cmp::Reverse;
use std::collections::HashMap;

/// Where a registered player currently stands in the bracket.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    Winners,
    Losers,
    Eliminated,
    Champion,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct BracketPosition {
    pub player: PlayerId,
    pub seed: u32,
    pub losses: u32,
    pub placement: Placement,
    /// Round of the loss that knocked the player out.
    pub eliminated_in: Option<u32>,
}

/// Seeds in bracket order: consecutive pairs meet in round 1.
fn seed_order(size: u32) -> Vec<u32> {
    let mut order = vec![1];
    while (order.len() as u32) < size {
        let next = order.len() as u32 * 2 + 1;
        order = order.iter().flat_map(|&s| [s, next - s]).collect();
    }
    order
}

struct Builder {
    matches: Vec<BracketMatch>,
}

impl Builder {
    fn push(&mut self, side: BracketSide, slots: [Slot; 2], conditional: bool) -> usize {
        let round = slots
            .iter()
            .map(|slot| match *slot {
                Slot::Seed(_) => 0,
                Slot::Winner(id) | Slot::Loser(id) => self.matches[id].round,
            })
            .max()
            .unwrap_or(0)
            + 1;
        let id = self.matches.len();
        self.matches.push(BracketMatch {
            id,
            round,
            side,
            slots,
            conditional,
        });
        id
    }

    /// Pair winners of consecutive matches until one remains. Returns match ids per round.
    fn winners_bracket(&mut self, size: u32) -> Vec<Vec<usize>> {
        let order = seed_order(size);
        let mut rounds = vec![order
            .chunks_exact(2)
            .map(|c| self.push(BracketSide::Winners, [Slot::Seed(c[0]), Slot::Seed(c[1])], false))
            .collect::<Vec<_>>()];
        while rounds[rounds.len() - 1].len() > 1 {
            let prev = rounds[rounds.len() - 1].clone();
            let next = prev
                .chunks_exact(2)
                .map(|c| self.push(BracketSide::Winners, [Slot::Winner(c[0]), Slot::Winner(c[1])], false))
                .collect();
            rounds.push(next);
        }
        rounds
    }

    /// Grand final between the two bracket winners, plus its reset.
    fn grand_final(&mut self, winners_final: usize, losers_final: usize) {
        let gf = self.push(
            BracketSide::GrandFinal,
            [Slot::Winner(winners_final), Slot::Winner(losers_final)],
            false,
        );
        self.push(BracketSide::GrandFinal, [Slot::Winner(gf), Slot::Loser(gf)], true);
    }
}

/// Build the bracket for a cut of `size` players.
pub fn build_bracket(format: StageFormat, size: u32) -> Result<Bracket, TournamentError> {
    let mut b = Builder { matches: Vec::new() };
    match (format, size) {
        (StageFormat::Swiss, _) => {
            return Err(TournamentError::StageSequenceViolation(
                "a cut must produce an elimination stage",
            ))
        }
        (StageFormat::SingleElim, 3) => {
            let play_in = b.push(BracketSide::Winners, [Slot::Seed(2), Slot::Seed(3)], false);
            b.push(BracketSide::Winners, [Slot::Seed(1), Slot::Winner(play_in)], false);
        }
        (StageFormat::DoubleElim, 3) => {
            let play_in = b.push(BracketSide::Winners, [Slot::Seed(2), Slot::Seed(3)], false);
            let winners_final = b.push(BracketSide::Winners, [Slot::Seed(1), Slot::Winner(play_in)], false);
            let losers_final = b.push(
                BracketSide::Losers,
                [Slot::Loser(play_in), Slot::Loser(winners_final)],
                false,
            );
            b.grand_final(winners_final, losers_final);
        }
        (_, n) if n < 4 || !n.is_power_of_two() => return Err(TournamentError::InvalidCutSize(n)),
        (StageFormat::SingleElim, n) => {
            b.winners_bracket(n);
        }
        (StageFormat::DoubleElim, n) => {
            let winners = b.winners_bracket(n);
            let winners_final = winners[winners.len() - 1][0];

            let mut losers: Vec<usize> = winners[0]
                .chunks_exact(2)
                .map(|c| b.push(BracketSide::Losers, [Slot::Loser(c[0]), Slot::Loser(c[1])], false))
                .collect();
            for dropping in winners.iter().skip(1) {
                // Survivors meet the new drop-downs, fed in reverse to delay rematches.
                losers = losers
                    .iter()
                    .zip(dropping.iter().rev())
                    .map(|(&l, &d)| b.push(BracketSide::Losers, [Slot::Winner(l), Slot::Loser(d)], false))
                    .collect();
                if losers.len() > 1 {
                    losers = losers
                        .chunks_exact(2)
                        .map(|c| b.push(BracketSide::Losers, [Slot::Winner(c[0]), Slot::Winner(c[1])], false))
                        .collect();
                }
            }
            b.grand_final(winners_final, losers[0]);
        }
    }

    Ok(Bracket {
        format,
        size,
        matches: b.matches,
    })
}

/// Result of a bracket match already played in the stage, if reported.
fn played<'a>(stage: &'a Stage, id: usize) -> Option<&'a Pairing> {
    stage
        .pairings()
        .find(|p| p.bracket_match == Some(id) && p.is_reported())
}

fn resolve(stage: &Stage, slot: Slot) -> Option<PlayerId> {
    match slot {
        Slot::Seed(seed) => stage.player_with_seed(seed),
        Slot::Winner(id) => played(stage, id)?.winner(),
        Slot::Loser(id) => played(stage, id)?.loser(),
    }
}

/// Losses per registered player within the stage, with the round of the latest one.
fn losses(stage: &Stage) -> HashMap<PlayerId, (u32, u32)> {
    let mut losses: HashMap<PlayerId, (u32, u32)> = stage
        .registrations
        .iter()
        .map(|r| (r.player, (0, 0)))
        .collect();
    for round in &stage.rounds {
        for loser in round.pairings.iter().filter_map(Pairing::loser) {
            let entry = losses.entry(loser).or_default();
            entry.0 += 1;
            entry.1 = round.number;
        }
    }
    losses
}

/// Build the next round of an elimination stage from the bracket and reported results.
pub(crate) fn pair_bracket_round(stage: &Stage) -> Result<Vec<Pairing>, TournamentError> {
    let Some(bracket) = &stage.bracket else {
        return Err(TournamentError::StageSequenceViolation(
            "elimination stage has no bracket",
        ));
    };
    let round = stage.rounds.len() as u32 + 1;
    let allowed = stage.format.allowed_losses();
    let losses = losses(stage);
    let losses_of = |p: PlayerId| losses.get(&p).map_or(0, |l| l.0);

    let mut found: Vec<(u32, Pairing)> = Vec::new();
    for m in bracket.matches_in_round(round) {
        let (Some(p1), Some(p2)) = (resolve(stage, m.slots[0]), resolve(stage, m.slots[1])) else {
            continue;
        };
        if m.conditional && (losses_of(p1) >= allowed || losses_of(p2) >= allowed) {
            continue;
        }
        let mut pairing = Pairing::new(0, p1, p2);
        pairing.bracket_match = Some(m.id);
        pairing.player1_side = side_for_first(stage, p1, p2);
        let best_seed = stage
            .seed_of(p1)
            .unwrap_or(u32::MAX)
            .min(stage.seed_of(p2).unwrap_or(u32::MAX));
        found.push((best_seed, pairing));
    }

    if found.is_empty() {
        return Err(TournamentError::BracketComplete);
    }
    found.sort_by_key(|(seed, _)| *seed);
    Ok(found
        .into_iter()
        .enumerate()
        .map(|(i, (_, mut p))| {
            p.table_number = i as u32 + 1;
            p
        })
        .collect())
}

/// Player with fewer corp games in this stage plays corp; even counts are decided at the table.
fn side_for_first(stage: &Stage, p1: PlayerId, p2: PlayerId) -> Option<Side> {
    let balance = |player: PlayerId| -> i64 {
        stage
            .pairings()
            .filter_map(|p| p.side_of(player))
            .map(|s| if s == Side::Corp { 1 } else { -1 })
            .sum()
    };
    match balance(p1).cmp(&balance(p2)) {
        std::cmp::Ordering::Less => Some(Side::Corp),
        std::cmp::Ordering::Greater => Some(Side::Runner),
        std::cmp::Ordering::Equal => None,
    }
}

/// True once no further round can be paired and the last round is fully reported.
pub fn is_complete(stage: &Stage) -> bool {
    let last_reported = stage.current_round().map_or(false, |r| r.is_complete());
    last_reported && matches!(pair_bracket_round(stage), Err(TournamentError::BracketComplete))
}

/// Seed, losses and placement of every registered player, in seed order.
pub fn bracket_positions(stage: &Stage) -> Vec<BracketPosition> {
    let allowed = stage.format.allowed_losses();
    let losses = losses(stage);
    let complete = is_complete(stage);
    let mut positions: Vec<BracketPosition> = stage
        .registrations
        .iter()
        .map(|r| {
            let (count, last) = losses.get(&r.player).copied().unwrap_or((0, 0));
            let placement = if count >= allowed {
                Placement::Eliminated
            } else if complete {
                Placement::Champion
            } else if count == 0 {
                Placement::Winners
            } else {
                Placement::Losers
            };
            BracketPosition {
                player: r.player,
                seed: r.seed,
                losses: count,
                placement,
                eliminated_in: (count >= allowed).then_some(last),
            }
        })
        .collect();
    positions.sort_by_key(|p| p.seed);
    positions
}

/// Sort key for elimination standings: alive first, later exits next, then seed.
pub(crate) fn placement_keys(stage: &Stage) -> HashMap<PlayerId, (u8, Reverse<u32>, u32)> {
    bracket_positions(stage)
        .into_iter()
        .map(|p| {
            let alive = match p.placement {
                Placement::Champion => 0,
                Placement::Winners | Placement::Losers => 1,
                Placement::Eliminated => 2,
            };
            (p.player, (alive, Reverse(p.eliminated_in.unwrap_or(0)), p.seed))
        })
        .collect()
}
