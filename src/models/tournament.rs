//! Tournament, its roster ledger and TournamentError.

use crate::models::pairing::Side;
use crate::models::player::{Player, PlayerId, UserId};
use crate::models::stage::Stage;
use crate::models::visibility::{DeckVisibility, VisibilitySettings};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Errors that can occur during tournament operations. Every failing operation leaves the
/// tournament untouched.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum TournamentError {
    /// Requested cut size is not in the permitted menu.
    #[error("Cut size {0} is not permitted")]
    InvalidCutSize(u32),
    /// Cut requested before any round of the stage was completed.
    #[error("No completed rounds to derive standings from")]
    NoStandings,
    #[error("Need at least {required} active players (have {available})")]
    InsufficientPlayers { required: usize, available: usize },
    /// Cut from a bracket stage, cut to Swiss, or a second cut.
    #[error("Stage sequence violation: {0}")]
    StageSequenceViolation(&'static str),
    /// The latest round still has unreported pairings.
    #[error("Round {0} still has unreported pairings")]
    RoundInProgress(u32),
    #[error("Bracket is complete")]
    BracketComplete,
    #[error("Round {round} has no table {table}")]
    PairingNotFound { round: u32, table: u32 },
    /// Later bracket rounds already depend on this round's results.
    #[error("Round {0} can no longer be changed")]
    RoundClosed(u32),
    #[error("Elimination matches cannot end in a draw")]
    DrawInElimination,
    #[error("Byes are reported automatically")]
    ByeNotReportable,
    #[error("Player not found")]
    PlayerNotFound(PlayerId),
    #[error("User is already registered in this tournament")]
    DuplicateUser(UserId),
    #[error("Could not find an unused tournament slug")]
    SlugSpaceExhausted,
}

/// Unique identifier for a tournament.
pub type TournamentId = Uuid;

/// Aggregate deck lock state of the active players.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecksStatus {
    AllUnlocked,
    PartiallyUnlocked,
    AllLocked,
}

impl DecksStatus {
    pub fn description(self) -> &'static str {
        match self {
            DecksStatus::AllUnlocked => "all unlocked",
            DecksStatus::PartiallyUnlocked => "partially unlocked",
            DecksStatus::AllLocked => "all locked",
        }
    }
}

/// Partial update of organizer-editable settings. None leaves a field unchanged.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TournamentSettings {
    pub name: Option<String>,
    pub date: Option<NaiveDate>,
    pub private: Option<bool>,
    pub stream_url: Option<String>,
    pub manual_seed: Option<bool>,
    pub self_registration: Option<bool>,
    pub allow_streaming_opt_out: Option<bool>,
    pub deck_registration: Option<bool>,
    pub swiss_deck_visibility: Option<DeckVisibility>,
    pub cut_deck_visibility: Option<DeckVisibility>,
}

/// Full tournament state: roster, settings and the stage sequence.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    /// Short public code, unique across tournaments.
    pub slug: String,
    pub date: NaiveDate,
    pub private: bool,
    pub stream_url: Option<String>,
    /// Fallback standings order uses players' manual seeds.
    pub manual_seed: bool,
    /// Players may register themselves.
    pub self_registration: bool,
    pub registration_open: bool,
    pub allow_streaming_opt_out: bool,
    /// Players register decks through the deck-building service.
    pub deck_registration: bool,
    pub deck_visibility: VisibilitySettings,
    /// Registration order.
    pub players: Vec<Player>,
    /// Never empty; stage `i` has number `i + 1`.
    stages: Vec<Stage>,
    /// Index of the last stage, moved only by `push_stage`.
    current_stage: usize,
}

impl Tournament {
    /// Create a tournament owning its first (Swiss) stage.
    pub fn new(name: impl Into<String>, slug: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            slug: slug.into(),
            date,
            private: false,
            stream_url: None,
            manual_seed: false,
            self_registration: false,
            registration_open: true,
            allow_streaming_opt_out: false,
            deck_registration: false,
            deck_visibility: VisibilitySettings::default(),
            players: Vec::new(),
            stages: vec![Stage::swiss(1)],
            current_stage: 0,
        }
    }

    /// Create a tournament with initial players, in registration order.
    pub fn with_players(name: impl Into<String>, slug: impl Into<String>, date: NaiveDate, players: Vec<Player>) -> Self {
        Self {
            players,
            ..Self::new(name, slug, date)
        }
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn stage(&self, number: u32) -> Option<&Stage> {
        self.stages.iter().find(|s| s.number == number)
    }

    /// The highest-numbered stage.
    pub fn current_stage(&self) -> &Stage {
        &self.stages[self.current_stage]
    }

    pub(crate) fn current_stage_mut(&mut self) -> &mut Stage {
        &mut self.stages[self.current_stage]
    }

    /// Append the next stage and make it current.
    pub(crate) fn push_stage(&mut self, stage: Stage) -> &Stage {
        debug_assert_eq!(stage.number, self.current_stage().number + 1);
        self.stages.push(stage);
        self.current_stage = self.stages.len() - 1;
        &self.stages[self.current_stage]
    }

    pub fn get_player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn get_player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    pub fn active_players(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| p.active)
    }

    pub fn dropped_players(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| !p.active)
    }

    /// Register a player. A user can hold at most one player per tournament.
    pub fn add_player(&mut self, player: Player) -> Result<PlayerId, TournamentError> {
        if let Some(user) = player.user_id {
            if self.players.iter().any(|p| p.user_id == Some(user)) {
                return Err(TournamentError::DuplicateUser(user));
            }
        }
        let id = player.id;
        self.players.push(player);
        Ok(id)
    }

    pub fn drop_player(&mut self, id: PlayerId) -> Result<(), TournamentError> {
        self.get_player_mut(id)
            .ok_or(TournamentError::PlayerNotFound(id))?
            .drop_out();
        Ok(())
    }

    pub fn reinstate_player(&mut self, id: PlayerId) -> Result<(), TournamentError> {
        self.get_player_mut(id)
            .ok_or(TournamentError::PlayerNotFound(id))?
            .reinstate();
        Ok(())
    }

    pub fn unlocked_deck_players(&self) -> impl Iterator<Item = &Player> {
        self.active_players().filter(|p| !p.registration_locked)
    }

    pub fn locked_deck_players(&self) -> impl Iterator<Item = &Player> {
        self.active_players().filter(|p| p.registration_locked)
    }

    /// No active player is locked.
    pub fn all_players_unlocked(&self) -> bool {
        self.locked_deck_players().next().is_none()
    }

    /// At least one active player is unlocked.
    pub fn any_player_unlocked(&self) -> bool {
        self.unlocked_deck_players().next().is_some()
    }

    pub fn decks_status(&self) -> DecksStatus {
        if self.all_players_unlocked() {
            DecksStatus::AllUnlocked
        } else if self.any_player_unlocked() {
            DecksStatus::PartiallyUnlocked
        } else {
            DecksStatus::AllLocked
        }
    }

    /// How many players registered each identity for `side`, most popular first.
    /// Players without an identity are counted under an empty name.
    pub fn identity_counts(&self, side: Side) -> Vec<(String, usize)> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for p in &self.players {
            *counts.entry(p.identity(side).unwrap_or("")).or_default() += 1;
        }
        let mut counts: Vec<(String, usize)> = counts
            .into_iter()
            .map(|(name, n)| (name.to_string(), n))
            .collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        counts
    }
}
