//! Deck visibility levels and the per-stage settings pair.

use crate::models::player::PlayerId;
use serde::{Deserialize, Serialize};

/// How widely decks are shown, from least to most permissive.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeckVisibility {
    /// Only the organizer sees decks.
    #[default]
    Hidden,
    /// Players see their own decks.
    OwnerOnly,
    /// Everyone sees decks of a round once it is fully reported.
    PublicAfterRound,
    Public,
}

/// Visibility applied to Swiss stages and to elimination (cut) stages.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct VisibilitySettings {
    pub swiss: DeckVisibility,
    pub cut: DeckVisibility,
}

/// Who is asking to see a deck.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Viewer {
    Organizer,
    Player(PlayerId),
    Public,
}

impl DeckVisibility {
    /// Whether `viewer` may see the deck of `owner` under this level.
    pub fn allows(self, viewer: Viewer, owner: PlayerId, round_complete: bool) -> bool {
        let is_owner = viewer == Viewer::Player(owner);
        match self {
            _ if viewer == Viewer::Organizer => true,
            DeckVisibility::Hidden => false,
            DeckVisibility::OwnerOnly => is_owner,
            DeckVisibility::PublicAfterRound => is_owner || round_complete,
            DeckVisibility::Public => true,
        }
    }
}
