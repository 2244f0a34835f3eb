use std::time::Duration;

use engine::{DelayTimer, KeyValueStore, SubscriptionId, Subscribers};
use tracing::debug;

use crate::city::Coordinates;
use crate::difficulty::{Difficulty, RoundCount};
use crate::round::{DEFAULT_CHOICE_COUNT, GameSummary, RoundEngine, RoundEvent};
use crate::state::QuizSnapshot;
use crate::view::{Screen, ScreenEffect, ScreenEvent};

pub const DEFAULT_AUTO_ADVANCE: Duration = Duration::from_secs(2);
pub const DEFAULT_TAP_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerConfig {
    pub auto_advance: Duration,
    pub tap_debounce: Duration,
    pub choice_count: usize,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            auto_advance: DEFAULT_AUTO_ADVANCE,
            tap_debounce: DEFAULT_TAP_DEBOUNCE,
            choice_count: DEFAULT_CHOICE_COUNT,
        }
    }
}

/// Side effects for collaborators outside the core (map, confetti, UI refresh).
#[derive(Debug, Clone, PartialEq)]
pub enum QuizNotice {
    ScreenChanged(Screen),
    FocusCity(Coordinates),
    Feedback { correct: bool },
    Celebrate { streak: u32 },
    HighScore { score: u32 },
    GameFinished(GameSummary),
}

/// Drives the screens on top of a [`RoundEngine`] and owns the auto-advance delay.
#[derive(Debug)]
pub struct QuizController<S> {
    engine: RoundEngine<S>,
    screen: Screen,
    auto_advance: DelayTimer,
    config: ControllerConfig,
    listeners: Subscribers<QuizNotice>,
}

impl<S: KeyValueStore> QuizController<S> {
    pub fn new(engine: RoundEngine<S>, config: ControllerConfig) -> Self {
        Self {
            engine: engine.with_choice_count(config.choice_count),
            screen: Screen::default(),
            auto_advance: DelayTimer::new(),
            config,
            listeners: Subscribers::new(),
        }
    }

    pub fn engine(&self) -> &RoundEngine<S> {
        &self.engine
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn config(&self) -> ControllerConfig {
        self.config
    }

    pub fn auto_advance_pending(&self) -> bool {
        self.auto_advance.is_pending()
    }

    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&QuizNotice) + Send + 'static,
    {
        self.listeners.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }

    /// Leaves the start screen for settings.
    pub fn start_game(&mut self) {
        self.transition(ScreenEvent::OpenSettings);
    }

    /// Returns to settings from the results screen.
    pub fn open_settings(&mut self) {
        self.transition(ScreenEvent::OpenSettings);
    }

    pub fn begin_playing(&mut self) {
        self.transition(ScreenEvent::BeginPlaying);
    }

    pub fn play_again(&mut self) {
        self.begin_playing();
    }

    pub fn return_to_start(&mut self) {
        self.transition(ScreenEvent::ReturnToStart);
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.auto_advance.cancel();
        self.engine.set_difficulty(difficulty);
        self.resume_after_settings_change();
    }

    pub fn set_round_count(&mut self, count: RoundCount) {
        self.auto_advance.cancel();
        self.engine.set_round_count(count);
        self.resume_after_settings_change();
    }

    /// A settings change drops the running round; while playing, a fresh one
    /// is drawn from the new pool.
    fn resume_after_settings_change(&mut self) {
        if self.screen.is_playing() {
            self.engine.start_new_round();
        }
        self.pump();
    }

    pub fn submit_guess(&mut self, guess: &str) -> bool {
        if !self.screen.is_playing() {
            debug!(screen = ?self.screen, "guess ignored outside play");
            return false;
        }
        let correct = self.engine.submit_guess(guess);
        self.pump();
        correct
    }

    /// Moves on to the next city now, dropping any pending auto-advance.
    pub fn request_next_round(&mut self) {
        if !self.screen.is_playing() {
            debug!(screen = ?self.screen, "next round ignored outside play");
            return;
        }
        self.auto_advance.cancel();
        self.engine.start_new_round();
        self.pump();
    }

    /// Skips the feedback delay, except right after it was shown.
    pub fn tap(&mut self) -> bool {
        if !self.screen.is_playing() {
            return false;
        }
        let Some(shown_for) = self.auto_advance.elapsed() else {
            return false;
        };
        if shown_for < self.config.tap_debounce {
            debug!(?shown_for, "tap ignored inside debounce window");
            return false;
        }
        self.request_next_round();
        true
    }

    /// Starts a fresh run with the same settings. From the results screen this
    /// is the same as playing again.
    pub fn restart_after_completion(&mut self) {
        match self.screen {
            Screen::Playing => {
                self.auto_advance.cancel();
                self.engine.restart_after_completion();
                self.pump();
            }
            Screen::Finished => self.play_again(),
            Screen::Start | Screen::Settings => {
                debug!(screen = ?self.screen, "restart ignored outside play");
            }
        }
    }

    /// Advances the auto-advance delay; returns whether it fired.
    pub fn tick(&mut self, dt: Duration) -> bool {
        if !self.auto_advance.tick(dt) {
            return false;
        }
        if !self.screen.is_playing() {
            return false;
        }
        debug!("auto-advancing to next round");
        self.engine.start_new_round();
        self.pump();
        true
    }

    pub fn snapshot(&self) -> QuizSnapshot {
        let engine = &self.engine;
        let revealed = engine.outcome().is_answered() || self.screen == Screen::Finished;
        QuizSnapshot {
            screen: self.screen,
            outcome: engine.outcome(),
            difficulty: engine.difficulty(),
            round_count: engine.round_count(),
            streak: engine.streak(),
            high_score: engine.high_score(),
            last_guess: engine.last_guess().to_string(),
            correct_answer: engine
                .current_city()
                .filter(|_| revealed)
                .map(|c| c.name.clone()),
            choices: engine.choices().to_vec(),
            focus: engine.current_city().map(|c| c.coordinates()),
            attempted: engine.attempted_count(),
            remaining: engine.remaining_count(),
            effective_rounds: engine.effective_round_count(),
            pool_size: engine.pool_size(),
            total_cities: engine.total_city_count(),
            accuracy_percent: engine.accuracy_percent(),
            final_score: engine.final_score(),
            new_high_score: engine.is_new_high_score(),
            auto_advance_in_ms: self
                .auto_advance
                .remaining()
                .map(|d| d.as_millis().min(u64::MAX as u128) as u64),
        }
    }

    fn transition(&mut self, event: ScreenEvent) {
        let previous = self.screen;
        let (next, effect) = previous.handle(event);
        if next == previous && effect == ScreenEffect::None {
            debug!(screen = ?previous, ?event, "screen event ignored");
            return;
        }

        self.screen = next;
        if previous.is_playing() && !next.is_playing() {
            self.auto_advance.cancel();
        }
        if next != previous {
            self.listeners.publish(&QuizNotice::ScreenChanged(next));
        }

        match effect {
            ScreenEffect::None => {}
            ScreenEffect::BeginSession => {
                self.auto_advance.cancel();
                self.engine.begin_playing();
            }
            ScreenEffect::FinalizeSession => {
                let summary = self.engine.end_game();
                self.listeners.publish(&QuizNotice::GameFinished(summary));
            }
            ScreenEffect::ResetSession => self.engine.return_to_start(),
        }
        self.pump();
    }

    fn pump(&mut self) {
        for event in self.engine.take_events() {
            match event {
                RoundEvent::RoundStarted { coordinates, .. } => {
                    self.listeners.publish(&QuizNotice::FocusCity(coordinates));
                }
                RoundEvent::Answered {
                    correct, streak, ..
                } => {
                    self.auto_advance.cancel();
                    if self.screen.is_playing() {
                        self.auto_advance.start(self.config.auto_advance);
                    }
                    self.listeners.publish(&QuizNotice::Feedback { correct });
                    if correct {
                        self.listeners.publish(&QuizNotice::Celebrate { streak });
                    }
                }
                RoundEvent::AllRoundsAttempted { attempted } => {
                    self.auto_advance.cancel();
                    if self.screen != Screen::Finished {
                        debug!(attempted, "all rounds attempted, finishing");
                        self.transition(ScreenEvent::Finish);
                    }
                }
                RoundEvent::HighScoreRaised { score } => {
                    self.listeners.publish(&QuizNotice::HighScore { score });
                }
                RoundEvent::SessionReset => {}
            }
        }
    }
}
