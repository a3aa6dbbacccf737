//! Stage, StageFormat and seed Registrations.

use crate::models::bracket::Bracket;
use crate::models::pairing::{Pairing, Round};
use crate::models::player::PlayerId;
use serde::{Deserialize, Serialize};

/// Pairing format of a stage. The first stage is always Swiss.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageFormat {
    Swiss,
    SingleElim,
    DoubleElim,
}

impl StageFormat {
    pub fn is_elimination(self) -> bool {
        match self {
            StageFormat::Swiss => false,
            StageFormat::SingleElim | StageFormat::DoubleElim => true,
        }
    }

    /// Losses a player can take before being knocked out (elimination formats).
    pub fn allowed_losses(self) -> u32 {
        match self {
            StageFormat::Swiss => u32::MAX,
            StageFormat::SingleElim => 1,
            StageFormat::DoubleElim => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            StageFormat::Swiss => "Swiss",
            StageFormat::SingleElim => "Single Elimination",
            StageFormat::DoubleElim => "Double Elimination",
        }
    }
}

/// Seed entry of a player advancing into an elimination stage.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Registration {
    pub player: PlayerId,
    /// Dense 1-based rank, unique within the stage.
    pub seed: u32,
}

/// One phase of a tournament with a fixed pairing format.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    /// 1-based, contiguous within the tournament.
    pub number: u32,
    pub format: StageFormat,
    pub rounds: Vec<Round>,
    /// Empty for Swiss stages.
    pub registrations: Vec<Registration>,
    /// Static bracket structure; Some exactly for elimination stages.
    pub bracket: Option<Bracket>,
}

impl Stage {
    pub fn swiss(number: u32) -> Self {
        Self {
            number,
            format: StageFormat::Swiss,
            rounds: Vec::new(),
            registrations: Vec::new(),
            bracket: None,
        }
    }

    pub(crate) fn elimination(number: u32, registrations: Vec<Registration>, bracket: Bracket) -> Self {
        Self {
            number,
            format: bracket.format,
            rounds: Vec::new(),
            registrations,
            bracket: Some(bracket),
        }
    }

    pub fn current_round(&self) -> Option<&Round> {
        self.rounds.last()
    }

    pub fn round(&self, number: u32) -> Option<&Round> {
        self.rounds.iter().find(|r| r.number == number)
    }

    pub fn round_mut(&mut self, number: u32) -> Option<&mut Round> {
        self.rounds.iter_mut().find(|r| r.number == number)
    }

    /// Rounds whose pairings are all reported.
    pub fn completed_rounds(&self) -> usize {
        self.rounds.iter().filter(|r| r.is_complete()).count()
    }

    /// Every pairing of the stage, in round then table order.
    pub fn pairings(&self) -> impl Iterator<Item = &Pairing> {
        self.rounds.iter().flat_map(|r| r.pairings.iter())
    }

    pub fn seed_of(&self, player: PlayerId) -> Option<u32> {
        self.registrations
            .iter()
            .find(|r| r.player == player)
            .map(|r| r.seed)
    }

    pub fn player_with_seed(&self, seed: u32) -> Option<PlayerId> {
        self.registrations
            .iter()
            .find(|r| r.seed == seed)
            .map(|r| r.player)
    }
}
