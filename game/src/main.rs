use std::sync::Arc;

use cityquiz::api::{self, ApiState, BoxedStore, TICK_INTERVAL};
use cityquiz::city::CityCatalog;
use cityquiz::config::QuizConfig;
use cityquiz::controller::{QuizController, QuizNotice};
use cityquiz::round::RoundEngine;
use engine::JsonFileStore;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

fn log_notice(notice: &QuizNotice) {
    match notice {
        QuizNotice::ScreenChanged(screen) => info!(?screen, "screen changed"),
        QuizNotice::FocusCity(at) => debug!(lat = at.lat, lon = at.lon, "map focus"),
        QuizNotice::Feedback { correct } => debug!(correct, "answer feedback"),
        QuizNotice::Celebrate { streak } => debug!(streak, "celebrate"),
        QuizNotice::HighScore { score } => info!(score, "new high score"),
        QuizNotice::GameFinished(summary) => info!(
            final_score = summary.final_score,
            new_high_score = summary.new_high_score,
            "game finished"
        ),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("cityquiz=info".parse()?)
                .add_directive("engine=info".parse()?),
        )
        .init();

    let config = QuizConfig::from_env();

    let catalog = match &config.cities_path {
        Some(path) => CityCatalog::load(path)?,
        None => CityCatalog::embedded()?,
    };
    info!(cities = catalog.len(), "city list loaded");

    let store: BoxedStore = Box::new(JsonFileStore::open(&config.store_path));
    info!(path = %config.store_path.display(), "using store");

    let catalog = Arc::new(catalog);
    let engine = match config.seed {
        Some(seed) => RoundEngine::new(catalog, store, seed),
        None => RoundEngine::from_entropy(catalog, store),
    };
    let mut controller = QuizController::new(engine, config.controller);
    controller.subscribe(log_notice);

    let state = ApiState::new(controller);
    api::spawn_ticker(state.controller.clone(), TICK_INTERVAL);
    let app = api::router(state);

    info!(addr = %config.api_addr, "quiz api listening");
    let listener = tokio::net::TcpListener::bind(config.api_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
