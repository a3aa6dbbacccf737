//! Tournament business logic: standings, Swiss pairing, brackets, cuts, registration, visibility.

pub mod bracket;
mod registration;
mod setup;
pub mod stages;
pub mod standings;
mod swiss;
mod visibility;

pub use bracket::{bracket_positions, build_bracket, is_complete, BracketPosition, Placement};
pub use registration::{
    close_registration, lock_decks, lock_player, open_registration, unlock_decks, unlock_player,
};
pub use setup::{create_tournament, generate_slug};
pub use stages::{cut_to, pair_new_round, report_result};
pub use standings::{current_standings, stage_standings, top, Standing};
pub use visibility::{can_view_deck, resolve_visibility, stage_visibility, update_settings};
