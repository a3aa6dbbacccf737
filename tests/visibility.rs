//! Integration tests for deck visibility: settings edits and per-viewer access.

use card_tournament::{
    can_view_deck, cut_to, pair_new_round, report_result, resolve_visibility, stage_visibility,
    update_settings, DeckVisibility, EngineConfig, Outcome, Player, StageFormat, Tournament,
    TournamentSettings, Viewer, VisibilitySettings,
};
use chrono::NaiveDate;
use DeckVisibility::*;

fn settings(swiss: DeckVisibility, cut: DeckVisibility) -> VisibilitySettings {
    VisibilitySettings { swiss, cut }
}

#[test]
fn opening_swiss_opens_the_cut() {
    let resolved = resolve_visibility(settings(Hidden, OwnerOnly), Some(Public), None);
    assert_eq!(resolved, settings(Public, Public));

    // A cut already more open than the new Swiss level stays.
    let resolved = resolve_visibility(settings(Hidden, Public), Some(OwnerOnly), None);
    assert_eq!(resolved, settings(OwnerOnly, Public));
}

#[test]
fn closing_the_cut_closes_swiss() {
    let resolved = resolve_visibility(settings(Public, Public), None, Some(OwnerOnly));
    assert_eq!(resolved, settings(OwnerOnly, OwnerOnly));

    let resolved = resolve_visibility(settings(Hidden, Public), None, Some(PublicAfterRound));
    assert_eq!(resolved, settings(Hidden, PublicAfterRound));
}

#[test]
fn explicit_pairs_are_taken_as_given() {
    let current = settings(OwnerOnly, PublicAfterRound);
    assert_eq!(resolve_visibility(current, None, None), current);
    assert_eq!(
        resolve_visibility(current, Some(Public), Some(Hidden)),
        settings(Public, Hidden)
    );
}

#[test]
fn settings_edit_touches_only_given_fields() {
    let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    let mut t = Tournament::new("Store Champs", "ST1", date);
    update_settings(
        &mut t,
        TournamentSettings {
            name: Some("Store Championship".into()),
            stream_url: Some("https://twitch.tv/example".into()),
            swiss_deck_visibility: Some(PublicAfterRound),
            ..TournamentSettings::default()
        },
    );
    assert_eq!(t.name, "Store Championship");
    assert_eq!(t.date, date);
    assert_eq!(t.stream_url.as_deref(), Some("https://twitch.tv/example"));
    assert_eq!(t.deck_visibility, settings(PublicAfterRound, PublicAfterRound));
    assert_eq!(stage_visibility(&t, StageFormat::Swiss), PublicAfterRound);

    update_settings(
        &mut t,
        TournamentSettings {
            stream_url: Some(String::new()),
            cut_deck_visibility: Some(Public),
            ..TournamentSettings::default()
        },
    );
    assert_eq!(t.stream_url, None);
    assert_eq!(t.deck_visibility, settings(PublicAfterRound, Public));
    assert_eq!(stage_visibility(&t, StageFormat::DoubleElim), Public);
}

#[test]
fn viewers_see_what_the_level_allows() {
    let owner = uuid::Uuid::new_v4();
    let other = uuid::Uuid::new_v4();
    for level in [Hidden, OwnerOnly, PublicAfterRound, Public] {
        assert!(level.allows(Viewer::Organizer, owner, false));
    }
    assert!(!Hidden.allows(Viewer::Player(owner), owner, true));
    assert!(OwnerOnly.allows(Viewer::Player(owner), owner, false));
    assert!(!OwnerOnly.allows(Viewer::Player(other), owner, true));
    assert!(!PublicAfterRound.allows(Viewer::Public, owner, false));
    assert!(PublicAfterRound.allows(Viewer::Public, owner, true));
    assert!(Public.allows(Viewer::Player(other), owner, false));
}

#[test]
fn deck_access_follows_the_stage_and_round() {
    let config = EngineConfig::default();
    let players: Vec<Player> = (0..4).map(|i| Player::new(format!("P{i}"))).collect();
    let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    let mut t = Tournament::with_players("Access", "ACC", date, players);
    t.deck_visibility = settings(PublicAfterRound, Public);
    let owner = t.players[0].id;

    pair_new_round(&mut t, &config).unwrap();
    assert!(!can_view_deck(&t, 1, 1, owner, Viewer::Public));
    assert!(can_view_deck(&t, 1, 1, owner, Viewer::Player(owner)));

    report_result(&mut t, 1, 1, Outcome::Player1Win).unwrap();
    report_result(&mut t, 1, 2, Outcome::Player2Win).unwrap();
    assert!(can_view_deck(&t, 1, 1, owner, Viewer::Public));

    cut_to(&mut t, StageFormat::SingleElim, 4, &config).unwrap();
    assert!(can_view_deck(&t, 2, 1, owner, Viewer::Public));

    // Unknown stages are organizer-only.
    assert!(!can_view_deck(&t, 7, 1, owner, Viewer::Public));
    assert!(can_view_deck(&t, 7, 1, owner, Viewer::Organizer));
}
