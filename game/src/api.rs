use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use engine::KeyValueStore;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tower_http::cors::{Any, CorsLayer};

use crate::controller::QuizController;
use crate::difficulty::{Difficulty, RoundCount};
use crate::state::QuizSnapshot;

pub type BoxedStore = Box<dyn KeyValueStore + Send>;
pub type SharedController = Arc<Mutex<QuizController<BoxedStore>>>;

pub const TICK_INTERVAL: Duration = Duration::from_millis(50);
const DEFAULT_SUGGESTION_LIMIT: usize = 10;

#[derive(Clone)]
pub struct ApiState {
    pub controller: SharedController,
}

impl ApiState {
    pub fn new(controller: QuizController<BoxedStore>) -> Self {
        Self {
            controller: Arc::new(Mutex::new(controller)),
        }
    }

    fn with_controller<R>(&self, f: impl FnOnce(&mut QuizController<BoxedStore>) -> R) -> R {
        let mut controller = self
            .controller
            .lock()
            .expect("quiz controller lock should be available");
        f(&mut controller)
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("unknown difficulty: {0}")]
    UnknownDifficulty(String),

    #[error("round count must be 5, 10 or 15, got {0}")]
    InvalidRoundCount(usize),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (StatusCode::BAD_REQUEST, self.to_string()).into_response()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsRequest {
    pub difficulty: Option<String>,
    pub round_count: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GuessRequest {
    pub guess: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuessResponse {
    pub correct: bool,
    pub state: QuizSnapshot,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TapResponse {
    pub advanced: bool,
    pub state: QuizSnapshot,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SuggestQuery {
    #[serde(default)]
    pub q: String,
    pub limit: Option<usize>,
}

pub fn router(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(health))
        .route("/api/quiz/state", get(quiz_state))
        .route("/api/cities/names", get(city_names))
        .route("/api/cities/suggest", get(city_suggestions))
        .route("/api/quiz/start", post(quiz_start))
        .route("/api/quiz/settings", post(quiz_settings))
        .route("/api/quiz/open-settings", post(quiz_open_settings))
        .route("/api/quiz/begin", post(quiz_begin))
        .route("/api/quiz/guess", post(quiz_guess))
        .route("/api/quiz/next", post(quiz_next))
        .route("/api/quiz/tap", post(quiz_tap))
        .route("/api/quiz/restart", post(quiz_restart))
        .route("/api/quiz/home", post(quiz_home))
        .with_state(state)
        .layer(cors)
}

/// Feeds wall-clock time into the controller so auto-advance fires without
/// client polling.
pub fn spawn_ticker(controller: SharedController, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last = Instant::now();
        loop {
            interval.tick().await;
            let now = Instant::now();
            let dt = now.duration_since(last);
            last = now;
            {
                let mut controller = controller
                    .lock()
                    .expect("quiz controller lock should be available");
                controller.tick(dt);
            }
        }
    })
}

async fn health() -> &'static str {
    "ok"
}

async fn quiz_state(State(state): State<ApiState>) -> Json<QuizSnapshot> {
    Json(state.with_controller(|c| c.snapshot()))
}

async fn city_names(State(state): State<ApiState>) -> Json<Vec<String>> {
    Json(state.with_controller(|c| c.engine().catalog().available_names()))
}

async fn city_suggestions(
    State(state): State<ApiState>,
    Query(query): Query<SuggestQuery>,
) -> Json<Vec<String>> {
    let limit = query.limit.unwrap_or(DEFAULT_SUGGESTION_LIMIT);
    Json(state.with_controller(|c| c.engine().catalog().suggestions(&query.q, limit)))
}

async fn quiz_start(State(state): State<ApiState>) -> Json<QuizSnapshot> {
    Json(state.with_controller(|c| {
        c.start_game();
        c.snapshot()
    }))
}

async fn quiz_settings(
    State(state): State<ApiState>,
    Json(payload): Json<SettingsRequest>,
) -> Result<Json<QuizSnapshot>, ApiError> {
    let difficulty = payload
        .difficulty
        .map(|raw| Difficulty::parse(&raw).ok_or(ApiError::UnknownDifficulty(raw)))
        .transpose()?;
    let round_count = payload
        .round_count
        .map(|n| RoundCount::from_count(n).ok_or(ApiError::InvalidRoundCount(n)))
        .transpose()?;

    Ok(Json(state.with_controller(|c| {
        if let Some(difficulty) = difficulty {
            c.set_difficulty(difficulty);
        }
        if let Some(round_count) = round_count {
            c.set_round_count(round_count);
        }
        c.snapshot()
    })))
}

async fn quiz_open_settings(State(state): State<ApiState>) -> Json<QuizSnapshot> {
    Json(state.with_controller(|c| {
        c.open_settings();
        c.snapshot()
    }))
}

async fn quiz_begin(State(state): State<ApiState>) -> Json<QuizSnapshot> {
    Json(state.with_controller(|c| {
        c.begin_playing();
        c.snapshot()
    }))
}

async fn quiz_guess(
    State(state): State<ApiState>,
    Json(payload): Json<GuessRequest>,
) -> Json<GuessResponse> {
    Json(state.with_controller(|c| GuessResponse {
        correct: c.submit_guess(&payload.guess),
        state: c.snapshot(),
    }))
}

async fn quiz_next(State(state): State<ApiState>) -> Json<QuizSnapshot> {
    Json(state.with_controller(|c| {
        c.request_next_round();
        c.snapshot()
    }))
}

async fn quiz_tap(State(state): State<ApiState>) -> Json<TapResponse> {
    Json(state.with_controller(|c| TapResponse {
        advanced: c.tap(),
        state: c.snapshot(),
    }))
}

async fn quiz_restart(State(state): State<ApiState>) -> Json<QuizSnapshot> {
    Json(state.with_controller(|c| {
        c.restart_after_completion();
        c.snapshot()
    }))
}

async fn quiz_home(State(state): State<ApiState>) -> Json<QuizSnapshot> {
    Json(state.with_controller(|c| {
        c.return_to_start();
        c.snapshot()
    }))
}
