//! Single binary web server exposing the S.K.A.T.E. engine over a REST API.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default.
//! Override with env: HOST, PORT, SKATE_DATA_DIR (directory holding one JSON snapshot per game).

use actix_web::{
    delete, get, post, put,
    web::{Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use serde::{Deserialize, Serialize};
use skate_game_web::{
    history_to_csv, leaders, risk_ranking, Engine, Game, GameError, GameId, JsonFileStore,
    PlayerId, RoundMode, SetterReveal, SnapshotStore,
};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;
use std::time::{Duration, Instant};

/// Per-game entry: engine + last activity time (for eviction from memory).
struct GameEntry {
    engine: Engine<JsonFileStore>,
    last_activity: Instant,
}

/// In-memory games by id. Evicted games stay on disk and are resumed on next access.
type AppState = Data<RwLock<HashMap<GameId, GameEntry>>>;

/// Inactivity threshold: games not accessed for this long are dropped from memory.
const INACTIVITY_TIMEOUT: Duration = Duration::from_secs(12 * 3600);

struct AppConfig {
    data_dir: PathBuf,
}

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct CreateGameBody {
    #[serde(default)]
    mode: RoundMode,
    /// Initial roster; blank names are skipped.
    #[serde(default)]
    players: Vec<String>,
}

#[derive(Deserialize)]
struct NameBody {
    name: String,
}

#[derive(Deserialize)]
struct ModeBody {
    mode: RoundMode,
}

#[derive(Deserialize)]
struct TrickBody {
    trick: String,
}

#[derive(Deserialize)]
struct AttemptBody {
    landed: bool,
}

#[derive(Serialize)]
struct StartResponse<'a> {
    game: &'a Game,
    reveal: SetterReveal,
}

#[derive(Serialize)]
struct OpenRoundResponse<'a> {
    game: &'a Game,
    /// Same trick was already played earlier in this game (warning only).
    trick_already_used: bool,
}

#[derive(Serialize)]
struct StandingRow<'a> {
    id: PlayerId,
    name: &'a str,
    letters: String,
    letter_count: u8,
    clean: bool,
    leader: bool,
}

#[derive(Serialize)]
struct StandingsResponse<'a> {
    risk: Vec<StandingRow<'a>>,
    winner: Option<&'a str>,
    timeline: Vec<String>,
}

/// Path segment: game id (e.g. /api/games/{id})
#[derive(Deserialize)]
struct GamePath {
    id: GameId,
}

/// Path segments: game id and player id (e.g. /api/games/{id}/players/{player_id})
#[derive(Deserialize)]
struct GamePlayerPath {
    id: GameId,
    player_id: PlayerId,
}

fn bad_request(e: GameError) -> HttpResponse {
    HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() }))
}

fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({ "error": "No game" }))
}

/// Run `f` against the game's engine, resuming it from disk if it is not in memory.
fn with_engine<F>(state: &AppState, config: &AppConfig, id: GameId, f: F) -> HttpResponse
where
    F: FnOnce(&mut Engine<JsonFileStore>) -> HttpResponse,
{
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    if !g.contains_key(&id) {
        let store = JsonFileStore::for_game(&config.data_dir, id);
        match Engine::resume(store) {
            Some(engine) if engine.snapshot().id == id => {
                g.insert(
                    id,
                    GameEntry {
                        engine,
                        last_activity: Instant::now(),
                    },
                );
            }
            _ => return not_found(),
        }
    }
    match g.get_mut(&id) {
        Some(entry) => {
            entry.last_activity = Instant::now();
            f(&mut entry.engine)
        }
        None => not_found(),
    }
}

/// Apply a command and answer with the resulting snapshot.
fn command<F>(state: &AppState, config: &AppConfig, id: GameId, f: F) -> HttpResponse
where
    F: FnOnce(&mut Engine<JsonFileStore>) -> Result<(), GameError>,
{
    with_engine(state, config, id, |engine| match f(engine) {
        Ok(()) => HttpResponse::Ok().json(engine.snapshot()),
        Err(e) => bad_request(e),
    })
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "skate-game-web",
    })
}

/// Create a new game (returns it with id; client stores id for subsequent requests).
#[post("/api/games")]
async fn api_create_game(
    state: AppState,
    config: Data<AppConfig>,
    body: Option<Json<CreateGameBody>>,
) -> HttpResponse {
    let mut game = Game::new();
    if let Some(body) = body {
        game.mode = body.mode;
        for name in &body.players {
            if let Err(e) = game.add_player(name) {
                return bad_request(e);
            }
        }
    }
    let id = game.id;
    let store = JsonFileStore::for_game(&config.data_dir, id);
    if let Err(e) = store.save(&game) {
        log::warn!("Could not save new game {}: {}", id, e);
    }
    let engine = Engine::from_game(game, store);
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let response = HttpResponse::Ok().json(engine.snapshot());
    g.insert(
        id,
        GameEntry {
            engine,
            last_activity: Instant::now(),
        },
    );
    log::info!("Created game {}", id);
    response
}

/// Get a game by id (404 if unknown).
#[get("/api/games/{id}")]
async fn api_get_game(state: AppState, config: Data<AppConfig>, path: Path<GamePath>) -> HttpResponse {
    with_engine(&state, &config, path.id, |engine| HttpResponse::Ok().json(engine.snapshot()))
}

/// Add a player (Setup only). Blank names are ignored.
#[post("/api/games/{id}/players")]
async fn api_add_player(
    state: AppState,
    config: Data<AppConfig>,
    path: Path<GamePath>,
    body: Json<NameBody>,
) -> HttpResponse {
    command(&state, &config, path.id, |engine| engine.add_player(&body.name).map(|_| ()))
}

/// Remove a player by id (Setup only).
#[delete("/api/games/{id}/players/{player_id}")]
async fn api_remove_player(
    state: AppState,
    config: Data<AppConfig>,
    path: Path<GamePlayerPath>,
) -> HttpResponse {
    command(&state, &config, path.id, |engine| engine.remove_player(path.player_id))
}

/// Commit a player's display name.
#[put("/api/games/{id}/players/{player_id}/name")]
async fn api_rename_player(
    state: AppState,
    config: Data<AppConfig>,
    path: Path<GamePlayerPath>,
    body: Json<NameBody>,
) -> HttpResponse {
    command(&state, &config, path.id, |engine| {
        engine.rename_player(path.player_id, &body.name)
    })
}

/// Full rounds or setter-only (Setup only).
#[put("/api/games/{id}/mode")]
async fn api_set_mode(
    state: AppState,
    config: Data<AppConfig>,
    path: Path<GamePath>,
    body: Json<ModeBody>,
) -> HttpResponse {
    command(&state, &config, path.id, |engine| engine.set_round_mode(body.mode))
}

/// Start the game (Setup -> Starting). Returns the first-setter reveal alongside the game.
#[post("/api/games/{id}/start")]
async fn api_start_game(state: AppState, config: Data<AppConfig>, path: Path<GamePath>) -> HttpResponse {
    with_engine(&state, &config, path.id, |engine| match engine.start_game() {
        Ok(reveal) => HttpResponse::Ok().json(StartResponse {
            game: engine.snapshot(),
            reveal,
        }),
        Err(e) => bad_request(e),
    })
}

/// Open a round with the current setter.
#[post("/api/games/{id}/rounds")]
async fn api_open_round(
    state: AppState,
    config: Data<AppConfig>,
    path: Path<GamePath>,
    body: Json<TrickBody>,
) -> HttpResponse {
    with_engine(&state, &config, path.id, |engine| {
        let trick_already_used = engine.snapshot().trick_already_used(&body.trick);
        match engine.open_round(&body.trick) {
            Ok(()) => HttpResponse::Ok().json(OpenRoundResponse {
                game: engine.snapshot(),
                trick_already_used,
            }),
            Err(e) => bad_request(e),
        }
    })
}

/// Record the setter's attempt.
#[post("/api/games/{id}/rounds/setter")]
async fn api_setter_attempt(
    state: AppState,
    config: Data<AppConfig>,
    path: Path<GamePath>,
    body: Json<AttemptBody>,
) -> HttpResponse {
    command(&state, &config, path.id, |engine| engine.record_setter_attempt(body.landed))
}

/// Record the current defender's attempt.
#[post("/api/games/{id}/rounds/defense")]
async fn api_defense_attempt(
    state: AppState,
    config: Data<AppConfig>,
    path: Path<GamePath>,
    body: Json<AttemptBody>,
) -> HttpResponse {
    command(&state, &config, path.id, |engine| engine.record_defense_attempt(body.landed))
}

/// Reset letters and go back to Setup, keeping the players.
#[post("/api/games/{id}/reset")]
async fn api_reset(state: AppState, config: Data<AppConfig>, path: Path<GamePath>) -> HttpResponse {
    command(&state, &config, path.id, |engine| engine.reset_round())
}

/// Clear everything, players included.
#[post("/api/games/{id}/new")]
async fn api_new_game(state: AppState, config: Data<AppConfig>, path: Path<GamePath>) -> HttpResponse {
    command(&state, &config, path.id, |engine| engine.new_game())
}

/// Risk chart, winner and readable timeline.
#[get("/api/games/{id}/standings")]
async fn api_standings(state: AppState, config: Data<AppConfig>, path: Path<GamePath>) -> HttpResponse {
    with_engine(&state, &config, path.id, |engine| {
        let game = engine.snapshot();
        let leader_ids: Vec<PlayerId> = leaders(&game.players).iter().map(|p| p.id).collect();
        let risk = risk_ranking(&game.players)
            .into_iter()
            .map(|p| StandingRow {
                id: p.id,
                name: &p.name,
                letters: p.letters(),
                letter_count: p.letter_count,
                clean: p.is_clean(),
                leader: leader_ids.contains(&p.id),
            })
            .collect();
        HttpResponse::Ok().json(StandingsResponse {
            risk,
            winner: game.winner().map(|p| p.name.as_str()),
            timeline: game.history.timeline(),
        })
    })
}

/// History as CSV.
#[get("/api/games/{id}/history.csv")]
async fn api_history_csv(state: AppState, config: Data<AppConfig>, path: Path<GamePath>) -> HttpResponse {
    with_engine(&state, &config, path.id, |engine| {
        match history_to_csv(engine.snapshot().history.events()) {
            Ok(csv) => HttpResponse::Ok().content_type("text/csv; charset=utf-8").body(csv),
            Err(e) => {
                log::warn!("CSV export failed: {}", e);
                HttpResponse::InternalServerError().body("export error")
            }
        }
    })
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or_else(default_port);
    let data_dir = std::env::var("SKATE_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| default_data_dir());
    std::fs::create_dir_all(&data_dir)?;
    let bind = (host.as_str(), port);
    log::info!(
        "Starting server at http://{}:{} (snapshots in {})",
        bind.0,
        bind.1,
        data_dir.display()
    );

    let state = Data::new(RwLock::new(HashMap::<GameId, GameEntry>::new()));
    let config = Data::new(AppConfig { data_dir });

    // Background task: every 30 minutes, drop games inactive for 12+ hours from memory
    let state_cleanup = state.clone();
    actix_web::rt::spawn(async move {
        let mut interval = actix_web::rt::time::interval(Duration::from_secs(30 * 60));
        loop {
            interval.tick().await;
            let mut g = match state_cleanup.write() {
                Ok(guard) => guard,
                Err(_) => continue,
            };
            let before = g.len();
            g.retain(|_, entry| entry.last_activity.elapsed() < INACTIVITY_TIMEOUT);
            let removed = before - g.len();
            if removed > 0 {
                log::info!("Evicted {} inactive game(s) from memory", removed);
            }
        }
    });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(config.clone())
            .service(api_health)
            .service(api_create_game)
            .service(api_get_game)
            .service(api_add_player)
            .service(api_remove_player)
            .service(api_rename_player)
            .service(api_set_mode)
            .service(api_start_game)
            .service(api_open_round)
            .service(api_setter_attempt)
            .service(api_defense_attempt)
            .service(api_reset)
            .service(api_new_game)
            .service(api_standings)
            .service(api_history_csv)
    })
    .bind(bind)?
    .run()
    .await
}
