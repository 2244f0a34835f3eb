use std::collections::HashSet;
use std::sync::Arc;

use engine::KeyValueStore;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::{IndexedRandom, SliceRandom};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::city::{City, CityCatalog, Coordinates};
use crate::difficulty::{Difficulty, RoundCount};
use crate::normalize::guesses_match;
use crate::settings;

pub const DEFAULT_CHOICE_COUNT: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoundOutcome {
    #[default]
    InProgress,
    Correct,
    Incorrect,
    AllRoundsAttempted,
}

impl RoundOutcome {
    pub fn is_answered(self) -> bool {
        matches!(self, RoundOutcome::Correct | RoundOutcome::Incorrect)
    }
}

/// State changes the engine reports to whoever drives the screens.
#[derive(Debug, Clone, PartialEq)]
pub enum RoundEvent {
    RoundStarted {
        city: String,
        coordinates: Coordinates,
    },
    Answered {
        correct: bool,
        guess: String,
        answer: String,
        streak: u32,
    },
    AllRoundsAttempted {
        attempted: usize,
    },
    HighScoreRaised {
        score: u32,
    },
    SessionReset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameSummary {
    pub final_score: u32,
    pub new_high_score: bool,
}

/// Target selection, distractors, scoring and per-session bookkeeping.
#[derive(Debug)]
pub struct RoundEngine<S> {
    catalog: Arc<CityCatalog>,
    store: S,
    rng: StdRng,
    choice_count: usize,
    difficulty: Difficulty,
    round_count: RoundCount,
    current: Option<City>,
    attempted: HashSet<String>,
    streak: u32,
    high_score: u32,
    session_record: u32,
    last_guess: String,
    outcome: RoundOutcome,
    choices: Vec<String>,
    final_score: u32,
    new_high_score: bool,
    events: Vec<RoundEvent>,
}

impl<S: KeyValueStore> RoundEngine<S> {
    /// Loads persisted settings from `store`; `seed` makes selection reproducible.
    pub fn new(catalog: Arc<CityCatalog>, store: S, seed: u64) -> Self {
        Self::with_rng(catalog, store, StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy(catalog: Arc<CityCatalog>, store: S) -> Self {
        Self::with_rng(catalog, store, StdRng::from_os_rng())
    }

    fn with_rng(catalog: Arc<CityCatalog>, store: S, rng: StdRng) -> Self {
        let difficulty = settings::load_difficulty(&store);
        let round_count = settings::load_round_count(&store);
        let mut engine = Self {
            catalog,
            store,
            rng,
            choice_count: DEFAULT_CHOICE_COUNT,
            difficulty,
            round_count,
            current: None,
            attempted: HashSet::new(),
            streak: 0,
            high_score: 0,
            session_record: 0,
            last_guess: String::new(),
            outcome: RoundOutcome::InProgress,
            choices: Vec::new(),
            final_score: 0,
            new_high_score: false,
            events: Vec::new(),
        };
        engine.reload_high_score();
        engine
    }

    pub fn with_choice_count(mut self, count: usize) -> Self {
        self.choice_count = count;
        self
    }

    pub fn catalog(&self) -> &CityCatalog {
        &self.catalog
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn pool(&self) -> Vec<&City> {
        self.catalog.pool(self.difficulty)
    }

    pub fn pool_size(&self) -> usize {
        self.pool().len()
    }

    pub fn effective_round_count(&self) -> usize {
        self.round_count.get().min(self.pool_size())
    }

    pub fn total_city_count(&self) -> usize {
        self.catalog.len()
    }

    pub fn attempted_count(&self) -> usize {
        self.attempted.len()
    }

    pub fn remaining_count(&self) -> usize {
        self.effective_round_count().saturating_sub(self.attempted.len())
    }

    pub fn has_attempted(&self, name: &str) -> bool {
        self.attempted.contains(name)
    }

    /// Share of attempted rounds covered by the current streak, rounded down.
    pub fn accuracy_percent(&self) -> u32 {
        if self.attempted.is_empty() {
            return 0;
        }
        (self.streak as usize * 100 / self.attempted.len()) as u32
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn round_count(&self) -> RoundCount {
        self.round_count
    }

    pub fn current_city(&self) -> Option<&City> {
        self.current.as_ref()
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn last_guess(&self) -> &str {
        &self.last_guess
    }

    pub fn outcome(&self) -> RoundOutcome {
        self.outcome
    }

    pub fn choices(&self) -> &[String] {
        &self.choices
    }

    pub fn final_score(&self) -> u32 {
        self.final_score
    }

    pub fn is_new_high_score(&self) -> bool {
        self.new_high_score
    }

    pub fn take_events(&mut self) -> Vec<RoundEvent> {
        std::mem::take(&mut self.events)
    }

    /// Switches tier and drops the current round; the next round comes from
    /// the new pool.
    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
        settings::save_difficulty(&mut self.store, difficulty);
        self.reset_progress();
        self.clear_round();
    }

    pub fn set_round_count(&mut self, count: RoundCount) {
        self.round_count = count;
        settings::save_round_count(&mut self.store, count);
        self.reset_progress();
        self.clear_round();
    }

    pub fn begin_playing(&mut self) {
        info!(
            difficulty = self.difficulty.as_str(),
            rounds = self.effective_round_count(),
            "starting session"
        );
        self.reset_progress();
        self.start_new_round();
    }

    pub fn restart_after_completion(&mut self) {
        self.reset_progress();
        self.start_new_round();
    }

    pub fn start_new_round(&mut self) {
        let effective = self.effective_round_count();
        let next = {
            let eligible: Vec<&City> = self
                .catalog
                .pool(self.difficulty)
                .into_iter()
                .filter(|c| !self.attempted.contains(&c.name))
                .collect();
            if eligible.is_empty() || self.attempted.len() >= effective {
                None
            } else {
                eligible.choose(&mut self.rng).map(|c| (*c).clone())
            }
        };

        let Some(city) = next else {
            self.outcome = RoundOutcome::AllRoundsAttempted;
            self.events.push(RoundEvent::AllRoundsAttempted {
                attempted: self.attempted.len(),
            });
            return;
        };

        debug!(city = %city.name, "new round");
        self.events.push(RoundEvent::RoundStarted {
            city: city.name.clone(),
            coordinates: city.coordinates(),
        });
        self.current = Some(city);
        self.outcome = RoundOutcome::InProgress;
        self.last_guess.clear();
        self.generate_choice_options(self.choice_count);
    }

    /// Fills the multiple-choice list with the target and `count - 1` distractors.
    ///
    /// Distractors come from the current pool; when it is too small the whole
    /// catalog is used instead, and a catalog that is still too small yields a
    /// shorter list.
    pub fn generate_choice_options(&mut self, count: usize) {
        let Some(target) = self.current.as_ref().map(|c| c.name.clone()) else {
            return;
        };
        let wanted = count.saturating_sub(1);

        let mut wrong: Vec<&str> = self
            .catalog
            .pool(self.difficulty)
            .into_iter()
            .map(|c| c.name.as_str())
            .filter(|name| *name != target)
            .collect();
        if wrong.len() < wanted {
            wrong = self
                .catalog
                .cities()
                .iter()
                .map(|c| c.name.as_str())
                .filter(|name| *name != target)
                .collect();
        }

        let mut options: Vec<String> = wrong
            .choose_multiple(&mut self.rng, wanted)
            .map(|name| name.to_string())
            .collect();
        options.push(target);
        options.shuffle(&mut self.rng);
        self.choices = options;
    }

    /// Scores `guess` against the current target. Returns `false` without
    /// touching state when there is nothing to answer.
    pub fn submit_guess(&mut self, guess: &str) -> bool {
        let Some(target) = self.current.as_ref() else {
            debug!("guess ignored: no active city");
            return false;
        };
        if self.outcome != RoundOutcome::InProgress {
            debug!(outcome = ?self.outcome, "guess ignored: round already decided");
            return false;
        }

        let answer = target.name.clone();
        let correct = guesses_match(guess, &answer);
        self.attempted.insert(answer.clone());

        if correct {
            self.streak += 1;
            if self.streak > self.high_score {
                self.raise_high_score(self.streak);
            }
            self.outcome = RoundOutcome::Correct;
        } else {
            self.streak = 0;
            self.outcome = RoundOutcome::Incorrect;
        }
        self.last_guess = guess.to_string();

        self.events.push(RoundEvent::Answered {
            correct,
            guess: guess.to_string(),
            answer,
            streak: self.streak,
        });
        correct
    }

    /// Records the final streak. `new_high_score` is set only when that final
    /// streak beats the record held when the session started.
    pub fn end_game(&mut self) -> GameSummary {
        let final_score = self.streak;
        if final_score > self.high_score {
            self.raise_high_score(final_score);
        }
        self.final_score = final_score;
        self.new_high_score = final_score > self.session_record;
        info!(
            final_score,
            new_high_score = self.new_high_score,
            "session finished"
        );
        GameSummary {
            final_score,
            new_high_score: self.new_high_score,
        }
    }

    pub fn return_to_start(&mut self) {
        self.streak = 0;
        self.attempted.clear();
        self.clear_round();
        self.events.push(RoundEvent::SessionReset);
    }

    fn reset_progress(&mut self) {
        self.attempted.clear();
        self.streak = 0;
        self.reload_high_score();
        self.new_high_score = false;
    }

    fn clear_round(&mut self) {
        self.current = None;
        self.outcome = RoundOutcome::InProgress;
        self.choices.clear();
        self.last_guess.clear();
    }

    fn high_score_key(&self) -> String {
        settings::high_score_key(self.difficulty, self.effective_round_count())
    }

    fn reload_high_score(&mut self) {
        let key = self.high_score_key();
        self.high_score = settings::load_high_score(&self.store, &key);
        self.session_record = self.high_score;
    }

    fn raise_high_score(&mut self, score: u32) {
        let key = self.high_score_key();
        settings::save_high_score(&mut self.store, &key, score);
        self.high_score = score;
        self.events.push(RoundEvent::HighScoreRaised { score });
    }
}
