//! JSON API over the tournament engine. State is in memory.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. Override with env: HOST, PORT.
//! Engine policy comes from CUT_SIZES, TIE_BREAK, SIDE_BALANCE, ROUND_MINUTES.

use actix_web::{
    delete, get, patch, post, put,
    web::{Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use card_tournament::{
    close_registration, create_tournament, current_standings, cut_to, lock_decks,
    open_registration, pair_new_round, report_result, unlock_decks, update_settings, EngineConfig, Outcome, Player,
    PlayerId, StageFormat, Tournament, TournamentError, TournamentId, TournamentSettings, UserId,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

/// Per-tournament entry: tournament data + last activity time (for auto-cleanup).
struct TournamentEntry {
    tournament: Tournament,
    /// Unix seconds of the last request that touched the tournament, reads included.
    /// Atomic so readers can refresh it under the shared lock.
    last_activity: AtomicI64,
}

impl TournamentEntry {
    fn new(tournament: Tournament) -> Self {
        Self {
            tournament,
            last_activity: AtomicI64::new(Utc::now().timestamp()),
        }
    }

    fn touch(&self) {
        self.last_activity.store(Utc::now().timestamp(), Ordering::Relaxed);
    }

    fn is_idle(&self, now: i64) -> bool {
        now - self.last_activity.load(Ordering::Relaxed) >= INACTIVITY_TIMEOUT_SECS
    }
}

/// Each tournament has its own lock: one writer at a time, readers in parallel.
type SharedEntry = Arc<tokio::sync::RwLock<TournamentEntry>>;

struct AppState {
    tournaments: RwLock<HashMap<TournamentId, SharedEntry>>,
    /// Upper-case slug -> tournament.
    slugs: RwLock<HashMap<String, TournamentId>>,
    config: EngineConfig,
}

type State = Data<AppState>;

/// Inactivity threshold: tournaments not accessed for this long are removed.
const INACTIVITY_TIMEOUT_SECS: i64 = 12 * 3600;

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct CreateTournamentBody {
    name: String,
    date: Option<NaiveDate>,
    #[serde(default)]
    private: bool,
}

#[derive(Deserialize)]
struct AddPlayerBody {
    name: String,
    pronouns: Option<String>,
    user_id: Option<UserId>,
    corp_identity: Option<String>,
    runner_identity: Option<String>,
    manual_seed: Option<u32>,
}

#[derive(Deserialize)]
struct ReportBody {
    outcome: Outcome,
}

#[derive(Deserialize)]
struct CutBody {
    #[serde(default = "default_cut_format")]
    format: StageFormat,
    number: u32,
}

fn default_cut_format() -> StageFormat {
    StageFormat::DoubleElim
}

#[derive(Deserialize)]
struct TournamentPath {
    id: TournamentId,
}

#[derive(Deserialize)]
struct TournamentPlayerPath {
    id: TournamentId,
    player_id: PlayerId,
}

#[derive(Deserialize)]
struct TablePath {
    id: TournamentId,
    round: u32,
    table: u32,
}

#[derive(Deserialize)]
struct SlugPath {
    slug: String,
}

fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({ "error": "No tournament" }))
}

fn error_response(e: &TournamentError) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string() });
    match e {
        TournamentError::PlayerNotFound(_) | TournamentError::PairingNotFound { .. } => {
            HttpResponse::NotFound().json(body)
        }
        TournamentError::StageSequenceViolation(_)
        | TournamentError::RoundInProgress(_)
        | TournamentError::RoundClosed(_)
        | TournamentError::BracketComplete
        | TournamentError::DuplicateUser(_) => HttpResponse::Conflict().json(body),
        TournamentError::SlugSpaceExhausted => HttpResponse::ServiceUnavailable().json(body),
        TournamentError::InvalidCutSize(_)
        | TournamentError::NoStandings
        | TournamentError::InsufficientPlayers { .. }
        | TournamentError::DrawInElimination
        | TournamentError::ByeNotReportable => HttpResponse::BadRequest().json(body),
    }
}

fn lookup(state: &AppState, id: TournamentId) -> Option<SharedEntry> {
    state.tournaments.read().ok()?.get(&id).cloned()
}

/// Run `op` on a tournament under its write lock and answer with its JSON result.
async fn mutate<T, F>(state: &AppState, id: TournamentId, op: F) -> HttpResponse
where
    T: serde::Serialize,
    F: FnOnce(&mut Tournament, &EngineConfig) -> Result<T, TournamentError>,
{
    let Some(entry) = lookup(state, id) else {
        return not_found();
    };
    let mut entry = entry.write().await;
    entry.touch();
    match op(&mut entry.tournament, &state.config) {
        Ok(value) => HttpResponse::Ok().json(value),
        Err(e) => {
            log::warn!("Tournament {}: {}", entry.tournament.slug, e);
            error_response(&e)
        }
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "card-tournament",
    })
}

/// Create a new tournament with a fresh slug. Stage 1 (Swiss) is created with it.
#[post("/api/tournaments")]
async fn api_create_tournament(state: State, body: Json<CreateTournamentBody>) -> HttpResponse {
    let body = body.into_inner();
    let mut slugs = match state.slugs.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let created = create_tournament(body.name, body.date, &mut rand::thread_rng(), |slug| {
        slugs.contains_key(slug)
    });
    let mut tournament = match created {
        Ok(t) => t,
        Err(e) => return error_response(&e),
    };
    tournament.private = body.private;
    let id = tournament.id;
    slugs.insert(tournament.slug.clone(), id);
    let response = HttpResponse::Ok().json(&tournament);

    let mut g = match state.tournaments.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    g.insert(
        id,
        Arc::new(tokio::sync::RwLock::new(TournamentEntry::new(tournament))),
    );
    response
}

#[get("/api/tournaments/{id}")]
async fn api_get_tournament(state: State, path: Path<TournamentPath>) -> HttpResponse {
    let Some(entry) = lookup(&state, path.id) else {
        return not_found();
    };
    let entry = entry.read().await;
    entry.touch();
    HttpResponse::Ok().json(&entry.tournament)
}

/// Short link: find a tournament by slug (case-insensitive).
#[get("/api/t/{slug}")]
async fn api_get_by_slug(state: State, path: Path<SlugPath>) -> HttpResponse {
    let id = match state.slugs.read() {
        Ok(slugs) => slugs.get(&path.slug.to_uppercase()).copied(),
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match id.and_then(|id| lookup(&state, id)) {
        Some(entry) => {
            let entry = entry.read().await;
            entry.touch();
            HttpResponse::Ok().json(&entry.tournament)
        }
        None => HttpResponse::NotFound().json(serde_json::json!({ "error": "No tournament", "code": path.slug })),
    }
}

/// Delete a tournament with everything it owns.
#[delete("/api/tournaments/{id}")]
async fn api_delete_tournament(state: State, path: Path<TournamentPath>) -> HttpResponse {
    let removed = match state.tournaments.write() {
        Ok(mut g) => g.remove(&path.id),
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let Some(entry) = removed else {
        return not_found();
    };
    let slug = entry.read().await.tournament.slug.clone();
    if let Ok(mut slugs) = state.slugs.write() {
        slugs.remove(&slug);
    }
    HttpResponse::NoContent().finish()
}

/// Edit settings; deck visibility is resolved so cut stays at least as open as Swiss.
#[patch("/api/tournaments/{id}")]
async fn api_update_tournament(
    state: State,
    path: Path<TournamentPath>,
    body: Json<TournamentSettings>,
) -> HttpResponse {
    let settings = body.into_inner();
    mutate(&state, path.id, move |t, _| {
        update_settings(t, settings);
        Ok(t.clone())
    })
    .await
}

#[post("/api/tournaments/{id}/players")]
async fn api_add_player(state: State, path: Path<TournamentPath>, body: Json<AddPlayerBody>) -> HttpResponse {
    let body = body.into_inner();
    mutate(&state, path.id, move |t, _| {
        let mut player = Player::new(body.name.trim());
        player.pronouns = body.pronouns;
        player.user_id = body.user_id;
        player.corp_identity = body.corp_identity;
        player.runner_identity = body.runner_identity;
        player.manual_seed = body.manual_seed;
        let id = t.add_player(player)?;
        Ok(t.get_player(id).cloned())
    })
    .await
}

#[post("/api/tournaments/{id}/players/{player_id}/drop")]
async fn api_drop_player(state: State, path: Path<TournamentPlayerPath>) -> HttpResponse {
    let player_id = path.player_id;
    mutate(&state, path.id, move |t, _| {
        t.drop_player(player_id)?;
        Ok(t.get_player(player_id).cloned())
    })
    .await
}

#[post("/api/tournaments/{id}/close_registration")]
async fn api_close_registration(state: State, path: Path<TournamentPath>) -> HttpResponse {
    mutate(&state, path.id, |t, _| {
        close_registration(t);
        Ok(t.decks_status())
    })
    .await
}

#[post("/api/tournaments/{id}/open_registration")]
async fn api_open_registration(state: State, path: Path<TournamentPath>) -> HttpResponse {
    mutate(&state, path.id, |t, _| {
        open_registration(t);
        Ok(t.decks_status())
    })
    .await
}

/// Lock every active player's decks; registration stays as it is.
#[post("/api/tournaments/{id}/lock_decks")]
async fn api_lock_decks(state: State, path: Path<TournamentPath>) -> HttpResponse {
    mutate(&state, path.id, |t, _| {
        lock_decks(t);
        Ok(t.decks_status())
    })
    .await
}

#[post("/api/tournaments/{id}/unlock_decks")]
async fn api_unlock_decks(state: State, path: Path<TournamentPath>) -> HttpResponse {
    mutate(&state, path.id, |t, _| {
        unlock_decks(t);
        Ok(t.decks_status())
    })
    .await
}

/// Pair the next round of the current stage.
#[post("/api/tournaments/{id}/rounds")]
async fn api_pair_round(state: State, path: Path<TournamentPath>) -> HttpResponse {
    mutate(&state, path.id, |t, config| pair_new_round(t, config).cloned()).await
}

#[put("/api/tournaments/{id}/rounds/{round}/tables/{table}")]
async fn api_report_result(state: State, path: Path<TablePath>, body: Json<ReportBody>) -> HttpResponse {
    let (round, table, outcome) = (path.round, path.table, body.outcome);
    mutate(&state, path.id, move |t, _| {
        report_result(t, round, table, outcome)?;
        Ok(t.current_stage().round(round).cloned())
    })
    .await
}

/// Standings of the current stage. Takes only a read lock.
#[get("/api/tournaments/{id}/standings")]
async fn api_standings(state: State, path: Path<TournamentPath>) -> HttpResponse {
    let Some(entry) = lookup(&state, path.id) else {
        return not_found();
    };
    let entry = entry.read().await;
    entry.touch();
    HttpResponse::Ok().json(current_standings(&entry.tournament, &state.config.pairing))
}

/// Cut the Swiss stage to the top N (3, 4, 8 or 16 by default).
#[post("/api/tournaments/{id}/cut")]
async fn api_cut(state: State, path: Path<TournamentPath>, body: Json<CutBody>) -> HttpResponse {
    let (format, number) = (body.format, body.number);
    mutate(&state, path.id, move |t, config| cut_to(t, format, number, config).cloned()).await
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = EngineConfig::from_env().map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    log::info!(
        "Cut sizes {:?}, tie-break {:?}, side balance {}",
        config.cut_sizes,
        config.pairing.tie_break,
        config.pairing.side_balance
    );

    let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or_else(default_port);
    let bind = (host.as_str(), port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let state = Data::new(AppState {
        tournaments: RwLock::new(HashMap::new()),
        slugs: RwLock::new(HashMap::new()),
        config,
    });

    // Background task: every 30 minutes, remove tournaments inactive for 12+ hours
    let state_cleanup = state.clone();
    actix_web::rt::spawn(async move {
        let mut interval = actix_web::rt::time::interval(Duration::from_secs(30 * 60));
        loop {
            interval.tick().await;
            let mut g = match state_cleanup.tournaments.write() {
                Ok(guard) => guard,
                Err(_) => continue,
            };
            let now = Utc::now().timestamp();
            let mut expired = Vec::new();
            g.retain(|_, entry| match entry.try_read() {
                Ok(e) if e.is_idle(now) => {
                    expired.push(e.tournament.slug.clone());
                    false
                }
                _ => true,
            });
            drop(g);
            if !expired.is_empty() {
                if let Ok(mut slugs) = state_cleanup.slugs.write() {
                    for slug in &expired {
                        slugs.remove(slug);
                    }
                }
                log::info!("Cleaned up {} inactive tournament(s) (no activity for 12h)", expired.len());
            }
        }
    });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(api_create_tournament)
            .service(api_get_tournament)
            .service(api_get_by_slug)
            .service(api_delete_tournament)
            .service(api_update_tournament)
            .service(api_add_player)
            .service(api_drop_player)
            .service(api_close_registration)
            .service(api_open_registration)
            .service(api_lock_decks)
            .service(api_unlock_decks)
            .service(api_pair_round)
            .service(api_report_result)
            .service(api_standings)
            .service(api_cut)
    })
    .bind(bind)?
    .run()
    .await
}
