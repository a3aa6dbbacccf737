//! Card tournament organizer: library with models, pairing engine and stage management.

pub mod config;
pub mod logic;
pub mod models;

pub use config::{ConfigError, EngineConfig, PairingPolicy, Scoring, TieBreak};
pub use logic::{
    bracket_positions, build_bracket, can_view_deck, close_registration, create_tournament,
    current_standings, cut_to, generate_slug, lock_decks, lock_player, open_registration,
    pair_new_round, report_result, resolve_visibility, stage_standings, stage_visibility, top,
    unlock_decks, unlock_player, update_settings, BracketPosition, Placement, Standing,
};
pub use models::{
    Bracket, BracketMatch, BracketSide, DeckVisibility, DecksStatus, Outcome, Pairing, Player,
    PlayerId, Registration, Round, RoundTimer, Side, Slot, Stage, StageFormat, Tournament,
    TournamentError, TournamentId, TournamentSettings, UserId, Viewer, VisibilitySettings,
};
