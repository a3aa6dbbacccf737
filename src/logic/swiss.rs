//! Swiss pairing: score-bracket pairing with rematch avoidance, fair byes and side balance.
//!
//! 1. Rank active players with the current standings.
//! 2. Odd count: the lowest-ranked player among those with the fewest byes sits out.
//! 3. The highest-ranked unpaired player takes the closest-score opponent it has not played,
//!    backtracking when a later player would be stranded. Equal-score opponents wanting the
//!    other side are preferred.
//! 4. If no rematch-free pairing turns up within the search budget, a greedy pass pairs
//!    everyone, taking rematches only where it has to.
//! 5. Tables are numbered by the better-ranked player; a bye takes the table after the last match.

use crate::config::PairingPolicy;
use crate::logic::standings::{stage_standings, tally, Standing};
use crate::models::{Pairing, PlayerId, Side, Stage, Tournament, TournamentError};
use std::collections::{HashMap, HashSet};

/// Search steps before giving up on a rematch-free pairing.
const SEARCH_BUDGET: u32 = 20_000;

/// Who has already played whom in the stage.
struct PairingHistory {
    played: HashSet<(PlayerId, PlayerId)>,
    last_side: HashMap<PlayerId, Side>,
}

impl PairingHistory {
    fn from_stage(stage: &Stage, policy: &PairingPolicy) -> Self {
        let played = stage
            .pairings()
            .filter_map(|p| p.player2.map(|p2| ordered(p.player1, p2)))
            .collect();
        let last_side = tally(stage, &policy.scoring)
            .into_iter()
            .filter_map(|(id, r)| r.last_side.map(|s| (id, s)))
            .collect();
        Self { played, last_side }
    }

    fn is_rematch(&self, a: PlayerId, b: PlayerId) -> bool {
        self.played.contains(&ordered(a, b))
    }
}

fn ordered(a: PlayerId, b: PlayerId) -> (PlayerId, PlayerId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Build the next round's pairings for the current (Swiss) stage.
pub(crate) fn pair_swiss_round(
    tournament: &Tournament,
    policy: &PairingPolicy,
) -> Result<Vec<Pairing>, TournamentError> {
    let stage = tournament.current_stage();
    let standings = stage_standings(tournament, stage, policy);
    if standings.len() < 2 {
        return Err(TournamentError::InsufficientPlayers {
            required: 2,
            available: standings.len(),
        });
    }

    let history = PairingHistory::from_stage(stage, policy);
    let bye = (standings.len() % 2 == 1).then(|| select_bye(&standings));
    let ranked: Vec<&Standing> = standings
        .iter()
        .filter(|s| Some(s.player) != bye)
        .collect();

    let pairs = match pair_without_rematches(&ranked, &history, policy) {
        Some(pairs) => pairs,
        None => {
            log::debug!(
                "No rematch-free pairing for stage {} round {}, allowing rematches",
                stage.number,
                stage.rounds.len() + 1
            );
            pair_greedy(&ranked, &history, policy)
        }
    };

    let mut pairings: Vec<Pairing> = pairs
        .into_iter()
        .enumerate()
        .map(|(i, (a, b))| {
            let (a, b) = (ranked[a], ranked[b]);
            let mut pairing = Pairing::new(i as u32 + 1, a.player, b.player);
            if policy.side_balance {
                pairing.player1_side = Some(corp_side_for_first(a, b, &history));
            }
            pairing
        })
        .collect();
    if let Some(player) = bye {
        pairings.push(Pairing::bye(pairings.len() as u32 + 1, player));
    }

    Ok(pairings)
}

/// Lowest-ranked player among those with the fewest byes so far.
fn select_bye(standings: &[Standing]) -> PlayerId {
    let fewest = standings.iter().map(|s| s.byes).min().unwrap_or(0);
    standings
        .iter()
        .rev()
        .find(|s| s.byes == fewest)
        .map(|s| s.player)
        .unwrap_or(standings[standings.len() - 1].player)
}

/// 1 when both players would rather play the same side.
fn side_conflict(a: &Standing, b: &Standing, policy: &PairingPolicy) -> u8 {
    if !policy.side_balance {
        return 0;
    }
    let (x, y) = (a.side_balance(), b.side_balance());
    u8::from(x != 0 && x.signum() == y.signum())
}

/// Unpaired opponents for `top`, best candidate first.
fn candidates(
    top: usize,
    ranked: &[&Standing],
    paired: &[bool],
    history: &PairingHistory,
    policy: &PairingPolicy,
    allow_rematches: bool,
) -> Vec<usize> {
    let a = ranked[top];
    let mut found: Vec<(u8, u32, u8, usize)> = (0..ranked.len())
        .filter(|&i| i != top && !paired[i])
        .filter_map(|i| {
            let b = ranked[i];
            let rematch = history.is_rematch(a.player, b.player);
            if rematch && !allow_rematches {
                return None;
            }
            Some((
                u8::from(rematch),
                a.points.abs_diff(b.points),
                side_conflict(a, b, policy),
                i,
            ))
        })
        .collect();
    found.sort_unstable();
    found.into_iter().map(|(_, _, _, i)| i).collect()
}

fn pair_without_rematches(
    ranked: &[&Standing],
    history: &PairingHistory,
    policy: &PairingPolicy,
) -> Option<Vec<(usize, usize)>> {
    let mut paired = vec![false; ranked.len()];
    let mut pairs = Vec::with_capacity(ranked.len() / 2);
    let mut budget = SEARCH_BUDGET;
    search(ranked, history, policy, &mut paired, &mut pairs, &mut budget).then_some(pairs)
}

fn search(
    ranked: &[&Standing],
    history: &PairingHistory,
    policy: &PairingPolicy,
    paired: &mut [bool],
    pairs: &mut Vec<(usize, usize)>,
    budget: &mut u32,
) -> bool {
    let Some(top) = paired.iter().position(|p| !p) else {
        return true;
    };
    if *budget == 0 {
        return false;
    }
    *budget -= 1;

    paired[top] = true;
    for other in candidates(top, ranked, paired, history, policy, false) {
        paired[other] = true;
        pairs.push((top, other));
        if search(ranked, history, policy, paired, pairs, budget) {
            return true;
        }
        pairs.pop();
        paired[other] = false;
    }
    paired[top] = false;
    false
}

/// Always succeeds: each top player takes its best candidate, rematch or not.
fn pair_greedy(
    ranked: &[&Standing],
    history: &PairingHistory,
    policy: &PairingPolicy,
) -> Vec<(usize, usize)> {
    let mut paired = vec![false; ranked.len()];
    let mut pairs = Vec::with_capacity(ranked.len() / 2);
    while let Some(top) = paired.iter().position(|p| !p) {
        paired[top] = true;
        if let Some(&other) = candidates(top, ranked, &paired, history, policy, true).first() {
            paired[other] = true;
            pairs.push((top, other));
        }
    }
    pairs
}

/// Side for the better-ranked player `a` against `b`.
///
/// Fewer corp games plays corp. On even counts whoever was runner last plays corp, checking
/// `a` first; with no history on either side `a` plays corp.
fn corp_side_for_first(a: &Standing, b: &Standing, history: &PairingHistory) -> Side {
    match a.side_balance().cmp(&b.side_balance()) {
        std::cmp::Ordering::Less => Side::Corp,
        std::cmp::Ordering::Greater => Side::Runner,
        std::cmp::Ordering::Equal => {
            match (history.last_side.get(&a.player), history.last_side.get(&b.player)) {
                (Some(Side::Runner), _) => Side::Corp,
                (Some(Side::Corp), _) => Side::Runner,
                (None, Some(Side::Runner)) => Side::Runner,
                (None, Some(Side::Corp)) | (None, None) => Side::Corp,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn standing(corp_games: u32, runner_games: u32) -> Standing {
        Standing {
            player: Uuid::new_v4(),
            rank: 0,
            points: 0,
            wins: 0,
            losses: 0,
            draws: 0,
            byes: 0,
            sos: 0.0,
            extended_sos: 0.0,
            corp_games,
            runner_games,
        }
    }

    fn history(last: &[(PlayerId, Side)]) -> PairingHistory {
        PairingHistory {
            played: HashSet::new(),
            last_side: last.iter().copied().collect(),
        }
    }

    #[test]
    fn fewer_corp_games_plays_corp() {
        let (a, b) = (standing(0, 1), standing(1, 0));
        assert_eq!(corp_side_for_first(&a, &b, &history(&[])), Side::Corp);
        assert_eq!(corp_side_for_first(&b, &a, &history(&[])), Side::Runner);
    }

    #[test]
    fn late_entry_lets_last_runner_play_corp() {
        // `a` only had byes so far; `b` is even on sides but was runner last.
        let (a, b) = (standing(0, 0), standing(1, 1));
        let h = history(&[(b.player, Side::Runner)]);
        assert_eq!(corp_side_for_first(&a, &b, &h), Side::Runner);

        let h = history(&[(b.player, Side::Corp)]);
        assert_eq!(corp_side_for_first(&a, &b, &h), Side::Corp);
    }

    #[test]
    fn better_ranked_history_decides_first() {
        let (a, b) = (standing(1, 1), standing(1, 1));
        let h = history(&[(a.player, Side::Runner), (b.player, Side::Runner)]);
        assert_eq!(corp_side_for_first(&a, &b, &h), Side::Corp);

        let h = history(&[(a.player, Side::Corp), (b.player, Side::Runner)]);
        assert_eq!(corp_side_for_first(&a, &b, &h), Side::Runner);

        assert_eq!(corp_side_for_first(&a, &b, &history(&[])), Side::Corp);
    }
}
