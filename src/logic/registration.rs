//! Deck registration locks: bulk lock/unlock over active players, single-player overrides.
//!
//! Dropped players are never touched by the bulk transitions. The aggregate flags are
//! queries on `Tournament`, so they cannot go stale.

use crate::models::{PlayerId, Tournament, TournamentError};

/// Close registration: lock every active player's decks. Returns how many were locked.
pub fn close_registration(tournament: &mut Tournament) -> usize {
    tournament.registration_open = false;
    let locked = set_active_locks(tournament, true);
    log::info!("Tournament {}: registration closed, {locked} deck(s) locked", tournament.slug);
    locked
}

/// Reopen self-registration. Existing deck locks stay as they are.
pub fn open_registration(tournament: &mut Tournament) {
    tournament.registration_open = true;
    log::info!("Tournament {}: registration opened", tournament.slug);
}

/// Lock every active player's decks without closing registration. Returns how many were locked.
pub fn lock_decks(tournament: &mut Tournament) -> usize {
    let locked = set_active_locks(tournament, true);
    log::info!("Tournament {}: {locked} deck(s) locked", tournament.slug);
    locked
}

/// Unlock every active player's decks. Returns how many were unlocked.
pub fn unlock_decks(tournament: &mut Tournament) -> usize {
    let unlocked = set_active_locks(tournament, false);
    log::info!("Tournament {}: {unlocked} deck(s) unlocked", tournament.slug);
    unlocked
}

pub fn lock_player(tournament: &mut Tournament, player: PlayerId) -> Result<(), TournamentError> {
    set_player_lock(tournament, player, true)
}

pub fn unlock_player(tournament: &mut Tournament, player: PlayerId) -> Result<(), TournamentError> {
    set_player_lock(tournament, player, false)
}

fn set_player_lock(tournament: &mut Tournament, player: PlayerId, locked: bool) -> Result<(), TournamentError> {
    tournament
        .get_player_mut(player)
        .ok_or(TournamentError::PlayerNotFound(player))?
        .registration_locked = locked;
    Ok(())
}

/// Set the lock flag on active players, returning how many changed.
fn set_active_locks(tournament: &mut Tournament, locked: bool) -> usize {
    let mut changed = 0;
    for p in tournament.players.iter_mut().filter(|p| p.active) {
        if p.registration_locked != locked {
            p.registration_locked = locked;
            changed += 1;
        }
    }
    changed
}
