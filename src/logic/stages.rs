//! Stage sequencing: pair the next round of the current stage, report results, cut to a bracket.

use crate::config::EngineConfig;
use crate::logic::{bracket, standings, swiss};
use crate::models::{
    Outcome, Registration, Round, Stage, StageFormat, Tournament, TournamentError,
};

/// Pair the next round of the current stage.
///
/// Swiss stages use the Swiss algorithm; elimination stages follow their bracket. The
/// previous round must be fully reported first.
pub fn pair_new_round<'a>(
    tournament: &'a mut Tournament,
    config: &EngineConfig,
) -> Result<&'a Round, TournamentError> {
    let stage = tournament.current_stage();
    if let Some(last) = stage.current_round() {
        if !last.is_complete() {
            return Err(TournamentError::RoundInProgress(last.number));
        }
    }

    let pairings = match stage.format {
        StageFormat::Swiss => swiss::pair_swiss_round(tournament, &config.pairing)?,
        StageFormat::SingleElim | StageFormat::DoubleElim => bracket::pair_bracket_round(stage)?,
    };
    let number = stage.rounds.len() as u32 + 1;
    log::info!(
        "Tournament {}: stage {} round {} paired ({} tables)",
        tournament.slug,
        stage.number,
        number,
        pairings.len()
    );

    let stage = tournament.current_stage_mut();
    stage.rounds.push(Round::new(number, pairings, config.round_minutes));
    Ok(&stage.rounds[stage.rounds.len() - 1])
}

/// Record the result of a table in the current stage.
///
/// Swiss results can be corrected at any time; bracket results only while later rounds
/// have not been paired from them.
pub fn report_result(
    tournament: &mut Tournament,
    round: u32,
    table: u32,
    outcome: Outcome,
) -> Result<(), TournamentError> {
    let stage = tournament.current_stage_mut();
    let format = stage.format;
    let latest = stage.rounds.len() as u32;
    let pairing = stage
        .round_mut(round)
        .and_then(|r| r.pairing_mut(table))
        .ok_or(TournamentError::PairingNotFound { round, table })?;

    if pairing.is_bye() {
        return Err(TournamentError::ByeNotReportable);
    }
    if format.is_elimination() {
        if outcome == Outcome::Draw {
            return Err(TournamentError::DrawInElimination);
        }
        if round != latest {
            return Err(TournamentError::RoundClosed(round));
        }
    }

    pairing.outcome = Some(outcome);
    log::debug!("Round {round} table {table} reported: {outcome:?}");
    Ok(())
}

/// Cut the current Swiss stage to an elimination stage of the top `size` players.
///
/// Fails without touching the tournament if `size` is not permitted, the current stage is
/// not Swiss, no round has been completed, the latest round is unfinished, or fewer than
/// `size` players are active.
pub fn cut_to<'a>(
    tournament: &'a mut Tournament,
    format: StageFormat,
    size: u32,
    config: &EngineConfig,
) -> Result<&'a Stage, TournamentError> {
    if !config.permits_cut(size) {
        return Err(TournamentError::InvalidCutSize(size));
    }
    if !format.is_elimination() {
        return Err(TournamentError::StageSequenceViolation(
            "a cut must produce an elimination stage",
        ));
    }
    let previous = tournament.current_stage();
    if previous.format != StageFormat::Swiss {
        return Err(TournamentError::StageSequenceViolation(
            "only a Swiss stage can be cut",
        ));
    }
    if previous.completed_rounds() == 0 {
        return Err(TournamentError::NoStandings);
    }
    if let Some(last) = previous.current_round().filter(|r| !r.is_complete()) {
        return Err(TournamentError::RoundInProgress(last.number));
    }
    let bracket = bracket::build_bracket(format, size)?;

    let top = standings::top(tournament, size as usize, &config.pairing);
    if top.len() < size as usize {
        return Err(TournamentError::InsufficientPlayers {
            required: size as usize,
            available: top.len(),
        });
    }
    let registrations = top
        .into_iter()
        .enumerate()
        .map(|(i, player)| Registration {
            player,
            seed: i as u32 + 1,
        })
        .collect();

    let number = previous.number + 1;
    log::info!(
        "Tournament {}: cut to top {} ({}) as stage {}",
        tournament.slug,
        size,
        format.name(),
        number
    );
    Ok(tournament.push_stage(Stage::elimination(number, registrations, bracket)))
}
