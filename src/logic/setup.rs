//! Setup: create a tournament with a fresh public slug.

use crate::models::{Tournament, TournamentError};
use chrono::{NaiveDate, Utc};
use rand::Rng;

/// Slug attempts before giving up.
const SLUG_ATTEMPTS: usize = 64;

/// Random base-36 code below 36^4, upper-case and unpadded, that `taken` does not know.
pub fn generate_slug<R: Rng>(rng: &mut R, taken: impl Fn(&str) -> bool) -> Result<String, TournamentError> {
    for _ in 0..SLUG_ATTEMPTS {
        let slug = to_base36(rng.gen_range(0..36u32.pow(4)));
        if !taken(&slug) {
            return Ok(slug);
        }
    }
    Err(TournamentError::SlugSpaceExhausted)
}

fn to_base36(mut n: u32) -> String {
    const DIGITS: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
    let mut out = Vec::new();
    loop {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
        if n == 0 {
            break;
        }
    }
    out.reverse();
    out.into_iter().map(char::from).collect()
}

/// Create a tournament dated `date` (today if None). Stage 1 (Swiss) exists from the start.
pub fn create_tournament<R: Rng>(
    name: impl Into<String>,
    date: Option<NaiveDate>,
    rng: &mut R,
    taken: impl Fn(&str) -> bool,
) -> Result<Tournament, TournamentError> {
    let slug = generate_slug(rng, taken)?;
    let date = date.unwrap_or_else(|| Utc::now().date_naive());
    let tournament = Tournament::new(name, slug, date);
    log::info!("Created tournament {} ({})", tournament.slug, tournament.name);
    Ok(tournament)
}

#[cfg(test)]
mod tests {
    use super::to_base36;

    #[test]
    fn base36_is_unpadded_upper_case() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "Z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36(36u32.pow(4) - 1), "ZZZZ");
    }
}
