//! Deck visibility: keep cut visibility at least as open as Swiss visibility when one is edited.

use crate::models::{
    DeckVisibility, PlayerId, StageFormat, Tournament, TournamentSettings, Viewer,
    VisibilitySettings,
};

/// Derive the missing side of a visibility edit.
///
/// - New Swiss only: cut becomes `max(current cut, new swiss)`.
/// - New cut only: Swiss becomes `min(current swiss, new cut)`.
/// - Both given: applied as is, the caller owns the ordering.
pub fn resolve_visibility(
    current: VisibilitySettings,
    swiss: Option<DeckVisibility>,
    cut: Option<DeckVisibility>,
) -> VisibilitySettings {
    match (swiss, cut) {
        (Some(swiss), Some(cut)) => VisibilitySettings { swiss, cut },
        (Some(swiss), None) => VisibilitySettings {
            swiss,
            cut: current.cut.max(swiss),
        },
        (None, Some(cut)) => VisibilitySettings {
            swiss: current.swiss.min(cut),
            cut,
        },
        (None, None) => current,
    }
}

/// Apply an organizer's settings edit, resolving deck visibility first.
pub fn update_settings(tournament: &mut Tournament, settings: TournamentSettings) {
    tournament.deck_visibility = resolve_visibility(
        tournament.deck_visibility,
        settings.swiss_deck_visibility,
        settings.cut_deck_visibility,
    );
    if let Some(name) = settings.name {
        tournament.name = name;
    }
    if let Some(date) = settings.date {
        tournament.date = date;
    }
    if let Some(private) = settings.private {
        tournament.private = private;
    }
    if let Some(url) = settings.stream_url {
        tournament.stream_url = (!url.trim().is_empty()).then_some(url);
    }
    if let Some(manual_seed) = settings.manual_seed {
        tournament.manual_seed = manual_seed;
    }
    if let Some(self_registration) = settings.self_registration {
        tournament.self_registration = self_registration;
    }
    if let Some(opt_out) = settings.allow_streaming_opt_out {
        tournament.allow_streaming_opt_out = opt_out;
    }
    if let Some(deck_registration) = settings.deck_registration {
        tournament.deck_registration = deck_registration;
    }
}

/// Visibility in force for a stage format.
pub fn stage_visibility(tournament: &Tournament, format: StageFormat) -> DeckVisibility {
    match format {
        StageFormat::Swiss => tournament.deck_visibility.swiss,
        StageFormat::SingleElim | StageFormat::DoubleElim => tournament.deck_visibility.cut,
    }
}

/// Whether `viewer` may see `owner`'s decks for a given round. Unknown stages or rounds
/// fall back to the organizer-only rule.
pub fn can_view_deck(
    tournament: &Tournament,
    stage_number: u32,
    round_number: u32,
    owner: PlayerId,
    viewer: Viewer,
) -> bool {
    let Some(stage) = tournament.stage(stage_number) else {
        return viewer == Viewer::Organizer;
    };
    let round_complete = stage.round(round_number).is_some_and(|r| r.is_complete());
    stage_visibility(tournament, stage.format).allows(viewer, owner, round_complete)
}
