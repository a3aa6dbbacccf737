//! Static structure of an elimination bracket.
//!
//! A bracket is a list of template matches. Each side of a match is fed by a seed or by
//! the winner/loser of an earlier match, so a round's pairings follow from the structure
//! plus the results already reported.

use crate::models::stage::StageFormat;
use serde::{Deserialize, Serialize};

/// Where a bracket match draws one of its players from.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    Seed(u32),
    Winner(usize),
    Loser(usize),
}

/// Which part of the bracket a match (or player) belongs to.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BracketSide {
    Winners,
    Losers,
    GrandFinal,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct BracketMatch {
    /// Index into `Bracket::matches`.
    pub id: usize,
    /// Stage round in which the match is played.
    pub round: u32,
    pub side: BracketSide,
    pub slots: [Slot; 2],
    /// Only played if the previous match left both players alive (grand final reset).
    pub conditional: bool,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Bracket {
    pub format: StageFormat,
    pub size: u32,
    pub matches: Vec<BracketMatch>,
}

impl Bracket {
    /// Last round the structure can reach (conditional matches included).
    pub fn rounds(&self) -> u32 {
        self.matches.iter().map(|m| m.round).max().unwrap_or(0)
    }

    pub fn matches_in_round(&self, round: u32) -> impl Iterator<Item = &BracketMatch> {
        self.matches.iter().filter(move |m| m.round == round)
    }

    pub fn get(&self, id: usize) -> Option<&BracketMatch> {
        self.matches.get(id)
    }
}
