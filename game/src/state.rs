use serde::{Deserialize, Serialize};

use crate::city::Coordinates;
use crate::difficulty::{Difficulty, RoundCount};
use crate::round::RoundOutcome;
use crate::view::Screen;

/// Everything a front-end needs to draw the current quiz state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSnapshot {
    pub screen: Screen,
    pub outcome: RoundOutcome,
    pub difficulty: Difficulty,
    pub round_count: RoundCount,
    pub streak: u32,
    pub high_score: u32,
    pub last_guess: String,
    /// Hidden until the round is decided.
    pub correct_answer: Option<String>,
    pub choices: Vec<String>,
    pub focus: Option<Coordinates>,
    pub attempted: usize,
    pub remaining: usize,
    pub effective_rounds: usize,
    pub pool_size: usize,
    pub total_cities: usize,
    pub accuracy_percent: u32,
    pub final_score: u32,
    pub new_high_score: bool,
    pub auto_advance_in_ms: Option<u64>,
}
