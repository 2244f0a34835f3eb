use engine::KeyValueStore;
use tracing::debug;

use crate::difficulty::{Difficulty, RoundCount};

pub const ROUND_COUNT_KEY: &str = "map-guesser-round-count";
pub const DIFFICULTY_KEY: &str = "map-guesser-difficulty";
pub const HIGH_SCORE_PREFIX: &str = "map-guesser-high-score";

pub fn load_difficulty<S: KeyValueStore + ?Sized>(store: &S) -> Difficulty {
    match store.get(DIFFICULTY_KEY) {
        Some(raw) => Difficulty::parse(&raw).unwrap_or_else(|| {
            debug!(stored = %raw, "unknown stored difficulty, using default");
            Difficulty::default()
        }),
        None => Difficulty::default(),
    }
}

pub fn save_difficulty<S: KeyValueStore + ?Sized>(store: &mut S, difficulty: Difficulty) {
    store.set(DIFFICULTY_KEY, difficulty.as_str());
}

pub fn load_round_count<S: KeyValueStore + ?Sized>(store: &S) -> RoundCount {
    store
        .get(ROUND_COUNT_KEY)
        .and_then(|raw| raw.trim().parse::<usize>().ok())
        .and_then(RoundCount::from_count)
        .unwrap_or_default()
}

pub fn save_round_count<S: KeyValueStore + ?Sized>(store: &mut S, count: RoundCount) {
    store.set(ROUND_COUNT_KEY, &count.get().to_string());
}

/// One record per difficulty and number of rounds actually playable.
pub fn high_score_key(difficulty: Difficulty, effective_rounds: usize) -> String {
    format!(
        "{HIGH_SCORE_PREFIX}-{}-{effective_rounds}",
        difficulty.as_str()
    )
}

pub fn load_high_score<S: KeyValueStore + ?Sized>(store: &S, key: &str) -> u32 {
    store
        .get(key)
        .and_then(|raw| raw.trim().parse().ok())
        .unwrap_or(0)
}

pub fn save_high_score<S: KeyValueStore + ?Sized>(store: &mut S, key: &str, score: u32) {
    store.set(key, &score.to_string());
}
