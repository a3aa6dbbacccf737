//! Data structures for card tournaments: players, stages, rounds, pairings, brackets.

mod bracket;
mod pairing;
mod player;
mod stage;
mod tournament;
mod visibility;

pub use bracket::{Bracket, BracketMatch, BracketSide, Slot};
pub use pairing::{Outcome, Pairing, Round, RoundTimer, Side};
pub use player::{Player, PlayerId, UserId};
pub use stage::{Registration, Stage, StageFormat};
pub use tournament::{DecksStatus, Tournament, TournamentError, TournamentId, TournamentSettings};
pub use visibility::{DeckVisibility, Viewer, VisibilitySettings};
