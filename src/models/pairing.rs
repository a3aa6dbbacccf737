//! Pairing, Round, Outcome and Side for single-game card matches.

use crate::models::player::PlayerId;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Which side of the game a player takes.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Corp,
    Runner,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Corp => Side::Runner,
            Side::Runner => Side::Corp,
        }
    }
}

/// Reported result of a pairing.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Player1Win,
    Player2Win,
    Draw,
}

/// One table in a round: two players, or one player with a bye.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Pairing {
    /// Unique within the round, starting at 1.
    pub table_number: u32,
    pub player1: PlayerId,
    /// None means player1 has a bye.
    pub player2: Option<PlayerId>,
    /// Side played by player1; player2 plays the other one. None if decided at the table.
    pub player1_side: Option<Side>,
    /// None until reported.
    pub outcome: Option<Outcome>,
    /// Bracket template match this pairing plays (elimination stages only).
    pub bracket_match: Option<usize>,
}

impl Pairing {
    pub fn new(table_number: u32, player1: PlayerId, player2: PlayerId) -> Self {
        Self {
            table_number,
            player1,
            player2: Some(player2),
            player1_side: None,
            outcome: None,
            bracket_match: None,
        }
    }

    /// A bye is credited as a win as soon as it is created.
    pub fn bye(table_number: u32, player: PlayerId) -> Self {
        Self {
            table_number,
            player1: player,
            player2: None,
            player1_side: None,
            outcome: Some(Outcome::Player1Win),
            bracket_match: None,
        }
    }

    pub fn is_bye(&self) -> bool {
        self.player2.is_none()
    }

    pub fn is_reported(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn involves(&self, player: PlayerId) -> bool {
        self.player1 == player || self.player2 == Some(player)
    }

    pub fn players(&self) -> impl Iterator<Item = PlayerId> {
        std::iter::once(self.player1).chain(self.player2)
    }

    pub fn opponent_of(&self, player: PlayerId) -> Option<PlayerId> {
        if self.player1 == player {
            self.player2
        } else if self.player2 == Some(player) {
            Some(self.player1)
        } else {
            None
        }
    }

    pub fn side_of(&self, player: PlayerId) -> Option<Side> {
        let side = self.player1_side?;
        if self.player1 == player {
            Some(side)
        } else if self.player2 == Some(player) {
            Some(side.opposite())
        } else {
            None
        }
    }

    /// Winner of a reported, decisive pairing (byes included).
    pub fn winner(&self) -> Option<PlayerId> {
        match self.outcome? {
            Outcome::Player1Win => Some(self.player1),
            Outcome::Player2Win => self.player2,
            Outcome::Draw => None,
        }
    }

    /// Loser of a reported, decisive pairing. Byes have no loser.
    pub fn loser(&self) -> Option<PlayerId> {
        match self.outcome? {
            Outcome::Player1Win => self.player2,
            Outcome::Player2Win => Some(self.player1),
            Outcome::Draw => None,
        }
    }
}

/// Timer handle for a round. Only start/stop bookkeeping lives here.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct RoundTimer {
    pub length_minutes: u32,
    pub started_at: Option<DateTime<Utc>>,
}

impl RoundTimer {
    pub fn new(length_minutes: u32) -> Self {
        Self {
            length_minutes,
            started_at: None,
        }
    }

    pub fn start(&mut self, now: DateTime<Utc>) {
        self.started_at = Some(now);
    }

    pub fn stop(&mut self) {
        self.started_at = None;
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    /// Time left at `now`, clamped at zero. None while the timer is stopped.
    pub fn remaining(&self, now: DateTime<Utc>) -> Option<Duration> {
        let started = self.started_at?;
        let end = started + Duration::minutes(i64::from(self.length_minutes));
        Some((end - now).max(Duration::zero()))
    }
}

/// A round of a stage: its pairings (byes included) and a timer handle.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Round {
    /// 1-based within the stage.
    pub number: u32,
    pub pairings: Vec<Pairing>,
    pub timer: RoundTimer,
}

impl Round {
    pub fn new(number: u32, pairings: Vec<Pairing>, timer_minutes: u32) -> Self {
        Self {
            number,
            pairings,
            timer: RoundTimer::new(timer_minutes),
        }
    }

    /// Pairings with two players.
    pub fn matches(&self) -> impl Iterator<Item = &Pairing> {
        self.pairings.iter().filter(|p| !p.is_bye())
    }

    pub fn byes(&self) -> impl Iterator<Item = &Pairing> {
        self.pairings.iter().filter(|p| p.is_bye())
    }

    pub fn pairing(&self, table_number: u32) -> Option<&Pairing> {
        self.pairings.iter().find(|p| p.table_number == table_number)
    }

    pub fn pairing_mut(&mut self, table_number: u32) -> Option<&mut Pairing> {
        self.pairings.iter_mut().find(|p| p.table_number == table_number)
    }

    pub fn pairings_reported(&self) -> usize {
        self.pairings.iter().filter(|p| p.is_reported()).count()
    }

    /// Every pairing has a result.
    pub fn is_complete(&self) -> bool {
        self.pairings.iter().all(Pairing::is_reported)
    }
}
