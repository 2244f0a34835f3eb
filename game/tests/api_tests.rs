use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use cityquiz::api::{self, ApiState, BoxedStore, GuessResponse, TapResponse};
use cityquiz::city::CityCatalog;
use cityquiz::controller::{ControllerConfig, QuizController};
use cityquiz::difficulty::{Difficulty, RoundCount};
use cityquiz::round::{RoundEngine, RoundOutcome};
use cityquiz::state::QuizSnapshot;
use cityquiz::view::Screen;
use engine::MemoryStore;
use http_body_util::BodyExt;
use serde::de::DeserializeOwned;
use tower::ServiceExt;

fn api_state(seed: u64) -> ApiState {
    let catalog = CityCatalog::embedded().expect("embedded city list should parse");
    let store: BoxedStore = Box::new(MemoryStore::new());
    let engine = RoundEngine::new(Arc::new(catalog), store, seed);
    ApiState::new(QuizController::new(engine, ControllerConfig::default()))
}

async fn send(state: &ApiState, method: &str, uri: &str, body: Option<&str>) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    api::router(state.clone())
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap()
}

async fn read_json<T: DeserializeOwned>(response: Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn post_snapshot(state: &ApiState, uri: &str, body: Option<&str>) -> QuizSnapshot {
    let response = send(state, "POST", uri, body).await;
    assert_eq!(response.status(), StatusCode::OK, "POST {uri}");
    read_json(response).await
}

fn current_city(state: &ApiState) -> String {
    state
        .controller
        .lock()
        .unwrap()
        .engine()
        .current_city()
        .expect("a round should be active")
        .name
        .clone()
}

#[tokio::test]
async fn health_check_responds() {
    let state = api_state(1);
    let response = send(&state, "GET", "/api/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"ok");
}

#[tokio::test]
async fn initial_state_is_the_start_screen() {
    let state = api_state(2);
    let response = send(&state, "GET", "/api/quiz/state", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let snapshot: QuizSnapshot = read_json(response).await;
    assert_eq!(snapshot.screen, Screen::Start);
    assert_eq!(snapshot.difficulty, Difficulty::Easy);
    assert_eq!(snapshot.round_count, RoundCount::Ten);
    assert_eq!(snapshot.streak, 0);
    assert!(snapshot.choices.is_empty());
}

#[tokio::test]
async fn snapshot_uses_camel_case_fields() {
    let state = api_state(3);
    let response = send(&state, "GET", "/api/quiz/state", None).await;
    let value: serde_json::Value = read_json(response).await;
    assert_eq!(value["screen"], "start");
    assert_eq!(value["outcome"], "in-progress");
    assert_eq!(value["roundCount"], 10);
    assert_eq!(value["highScore"], 0);
}

#[tokio::test]
async fn settings_reject_unknown_values() {
    let state = api_state(4);

    let response = send(
        &state,
        "POST",
        "/api/quiz/settings",
        Some(r#"{"difficulty":"impossible"}"#),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send(
        &state,
        "POST",
        "/api/quiz/settings",
        Some(r#"{"roundCount":7}"#),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let snapshot: QuizSnapshot =
        read_json(send(&state, "GET", "/api/quiz/state", None).await).await;
    assert_eq!(snapshot.difficulty, Difficulty::Easy);
    assert_eq!(snapshot.round_count, RoundCount::Ten);
}

#[tokio::test]
async fn play_through_a_round_over_http() {
    let state = api_state(5);

    let snapshot = post_snapshot(&state, "/api/quiz/start", None).await;
    assert_eq!(snapshot.screen, Screen::Settings);

    let snapshot = post_snapshot(
        &state,
        "/api/quiz/settings",
        Some(r#"{"difficulty":"hard","roundCount":5}"#),
    )
    .await;
    assert_eq!(snapshot.difficulty, Difficulty::Hard);
    assert_eq!(snapshot.round_count, RoundCount::Five);
    assert_eq!(snapshot.effective_rounds, 5);

    let snapshot = post_snapshot(&state, "/api/quiz/begin", None).await;
    assert_eq!(snapshot.screen, Screen::Playing);
    assert_eq!(snapshot.choices.len(), 4);
    assert_eq!(snapshot.correct_answer, None);

    let answer = current_city(&state);
    assert!(snapshot.choices.contains(&answer));
    let body = serde_json::json!({ "guess": answer.to_uppercase() }).to_string();
    let response = send(&state, "POST", "/api/quiz/guess", Some(&body)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let guess: GuessResponse = read_json(response).await;
    assert!(guess.correct);
    assert_eq!(guess.state.streak, 1);
    assert_eq!(guess.state.outcome, RoundOutcome::Correct);
    assert_eq!(guess.state.correct_answer, Some(answer.clone()));
    assert_eq!(guess.state.auto_advance_in_ms, Some(2000));

    let response = send(&state, "POST", "/api/quiz/tap", None).await;
    let tap: TapResponse = read_json(response).await;
    assert!(!tap.advanced, "tap right after feedback is debounced");

    let snapshot = post_snapshot(&state, "/api/quiz/next", None).await;
    assert_eq!(snapshot.outcome, RoundOutcome::InProgress);
    assert_eq!(snapshot.attempted, 1);
    assert_eq!(snapshot.remaining, 4);
    assert_eq!(snapshot.auto_advance_in_ms, None);
    assert_ne!(current_city(&state), answer);

    let snapshot = post_snapshot(&state, "/api/quiz/home", None).await;
    assert_eq!(snapshot.screen, Screen::Start);
    assert_eq!(snapshot.streak, 0);
}

#[tokio::test]
async fn finishing_and_restarting_over_http() {
    let state = api_state(6);
    post_snapshot(&state, "/api/quiz/start", None).await;
    post_snapshot(&state, "/api/quiz/settings", Some(r#"{"roundCount":5}"#)).await;
    post_snapshot(&state, "/api/quiz/begin", None).await;

    let mut last = None;
    for _ in 0..5 {
        let body = serde_json::json!({ "guess": "nowhere" }).to_string();
        let guess: GuessResponse =
            read_json(send(&state, "POST", "/api/quiz/guess", Some(&body)).await).await;
        assert!(!guess.correct);
        last = Some(post_snapshot(&state, "/api/quiz/next", None).await);
    }
    let finished = last.unwrap();
    assert_eq!(finished.screen, Screen::Finished);
    assert_eq!(finished.outcome, RoundOutcome::AllRoundsAttempted);
    assert_eq!(finished.final_score, 0);
    assert!(!finished.new_high_score);

    let snapshot = post_snapshot(&state, "/api/quiz/restart", None).await;
    assert_eq!(snapshot.screen, Screen::Playing);
    assert_eq!(snapshot.attempted, 0);

    let snapshot = post_snapshot(&state, "/api/quiz/home", None).await;
    assert_eq!(snapshot.screen, Screen::Start);
    let snapshot = post_snapshot(&state, "/api/quiz/open-settings", None).await;
    assert_eq!(snapshot.screen, Screen::Settings);
}

#[tokio::test]
async fn city_names_and_suggestions() {
    let state = api_state(7);

    let names: Vec<String> =
        read_json(send(&state, "GET", "/api/cities/names", None).await).await;
    assert!(names.contains(&"København".to_string()));
    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(names, sorted);

    let response = send(&state, "GET", "/api/cities/suggest?q=k%C3%B8benh&limit=3", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let suggestions: Vec<String> = read_json(response).await;
    assert_eq!(suggestions, vec!["København".to_string()]);

    let response = send(&state, "GET", "/api/cities/suggest?q=", None).await;
    let suggestions: Vec<String> = read_json(response).await;
    assert!(suggestions.is_empty());
}

#[tokio::test]
async fn ticker_drives_auto_advance() {
    let state = api_state(8);
    post_snapshot(&state, "/api/quiz/start", None).await;
    post_snapshot(&state, "/api/quiz/begin", None).await;
    let answer = current_city(&state);
    let body = serde_json::json!({ "guess": answer }).to_string();
    send(&state, "POST", "/api/quiz/guess", Some(&body)).await;

    tokio::time::pause();
    let ticker = api::spawn_ticker(state.controller.clone(), api::TICK_INTERVAL);
    for _ in 0..60 {
        tokio::time::advance(api::TICK_INTERVAL).await;
        tokio::task::yield_now().await;
    }
    ticker.abort();

    let snapshot: QuizSnapshot =
        read_json(send(&state, "GET", "/api/quiz/state", None).await).await;
    assert_eq!(snapshot.outcome, RoundOutcome::InProgress);
    assert_eq!(snapshot.attempted, 1);
}
