//! Integration tests for tournament creation, slugs and round timers.

use card_tournament::{
    create_tournament, generate_slug, pair_new_round, EngineConfig, Player, RoundTimer,
    StageFormat, TournamentError,
};
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;

#[test]
fn slugs_are_short_upper_case_base36() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..200 {
        let slug = generate_slug(&mut rng, |_| false).unwrap();
        assert!((1..=4).contains(&slug.len()), "{slug}");
        assert!(slug.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }
}

#[test]
fn taken_slugs_are_skipped() {
    let mut rng = StdRng::seed_from_u64(11);
    let first = generate_slug(&mut rng, |_| false).unwrap();

    let mut rng = StdRng::seed_from_u64(11);
    let second = generate_slug(&mut rng, |s| s == first).unwrap();
    assert_ne!(first, second);
}

#[test]
fn exhausted_slug_space_is_an_error() {
    let mut rng = StdRng::seed_from_u64(3);
    assert_eq!(
        generate_slug(&mut rng, |_| true).unwrap_err(),
        TournamentError::SlugSpaceExhausted
    );
}

#[test]
fn new_tournament_starts_with_an_open_swiss_stage() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut taken: HashSet<String> = HashSet::new();
    let date = NaiveDate::from_ymd_opt(2024, 8, 10).unwrap();

    let t = create_tournament("Worlds", Some(date), &mut rng, |s| taken.contains(s)).unwrap();
    assert_eq!(t.name, "Worlds");
    assert_eq!(t.date, date);
    assert_eq!(t.stages().len(), 1);
    assert_eq!(t.current_stage().number, 1);
    assert_eq!(t.current_stage().format, StageFormat::Swiss);
    assert!(t.current_stage().rounds.is_empty());
    assert!(t.registration_open);

    taken.insert(t.slug.clone());
    let other = create_tournament("Worlds side event", None, &mut rng, |s| taken.contains(s)).unwrap();
    assert_ne!(other.slug, t.slug);
    assert_ne!(other.id, t.id);
}

#[test]
fn rounds_carry_the_configured_timer() {
    let config = EngineConfig {
        round_minutes: 40,
        ..EngineConfig::default()
    };
    let mut rng = StdRng::seed_from_u64(5);
    let mut t = create_tournament("Timed", None, &mut rng, |_| false).unwrap();
    t.add_player(Player::new("A")).unwrap();
    t.add_player(Player::new("B")).unwrap();

    let round = pair_new_round(&mut t, &config).unwrap();
    assert_eq!(round.timer.length_minutes, 40);
    assert!(!round.timer.is_running());
}

#[test]
fn timer_counts_down_and_stops() {
    let start = Utc.with_ymd_and_hms(2024, 8, 10, 10, 0, 0).unwrap();
    let mut timer = RoundTimer::new(65);
    assert_eq!(timer.remaining(start), None);

    timer.start(start);
    assert!(timer.is_running());
    assert_eq!(
        timer.remaining(start + Duration::minutes(20)),
        Some(Duration::minutes(45))
    );
    assert_eq!(timer.remaining(start + Duration::minutes(90)), Some(Duration::zero()));

    timer.stop();
    assert!(!timer.is_running());
    assert_eq!(timer.remaining(start), None);
}
