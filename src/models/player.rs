//! Player roster entries: identities, active/dropped state and deck lock.

use crate::models::pairing::Side;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a player (used in pairings, registrations and lookups).
pub type PlayerId = Uuid;

/// Account of the person behind a player. At most one player per user per tournament.
pub type UserId = Uuid;

/// A player registered in a tournament.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub pronouns: Option<String>,
    /// None for players entered by the organizer without an account.
    pub user_id: Option<UserId>,
    pub corp_identity: Option<String>,
    pub runner_identity: Option<String>,
    /// False once the player has dropped.
    pub active: bool,
    /// Deck registration locked; the player can no longer edit decks.
    pub registration_locked: bool,
    /// Organizer-assigned seed, used as fallback order when the tournament seeds manually.
    pub manual_seed: Option<u32>,
}

impl Player {
    /// Create an active, unlocked player with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            pronouns: None,
            user_id: None,
            corp_identity: None,
            runner_identity: None,
            active: true,
            registration_locked: false,
            manual_seed: None,
        }
    }

    pub fn with_user(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn with_identities(mut self, corp: impl Into<String>, runner: impl Into<String>) -> Self {
        self.corp_identity = Some(corp.into());
        self.runner_identity = Some(runner.into());
        self
    }

    /// Identity played on the given side, if registered.
    pub fn identity(&self, side: Side) -> Option<&str> {
        match side {
            Side::Corp => self.corp_identity.as_deref(),
            Side::Runner => self.runner_identity.as_deref(),
        }
    }

    /// Display name, e.g. "Alice (she/her)".
    pub fn name_with_pronouns(&self) -> String {
        match self.pronouns.as_deref() {
            Some(p) if !p.trim().is_empty() => format!("{} ({})", self.name, p.trim()),
            _ => self.name.clone(),
        }
    }

    /// Mark the player as dropped. Dropped players are never paired again.
    pub fn drop_out(&mut self) {
        self.active = false;
    }

    pub fn reinstate(&mut self) {
        self.active = true;
    }
}
