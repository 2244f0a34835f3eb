use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Screen {
    #[default]
    Start,
    Settings,
    Playing,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScreenEvent {
    OpenSettings,
    BeginPlaying,
    Finish,
    ReturnToStart,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScreenEffect {
    None,
    BeginSession,
    FinalizeSession,
    ResetSession,
}

impl Screen {
    /// Pure transition function for the quiz screens.
    ///
    /// Session side-effects are reported via `ScreenEffect` so the controller
    /// applies them and tests can check transitions without an engine.
    pub fn handle(self, event: ScreenEvent) -> (Screen, ScreenEffect) {
        match (self, event) {
            (Screen::Start, ScreenEvent::OpenSettings) => (Screen::Settings, ScreenEffect::None),

            (Screen::Settings, ScreenEvent::BeginPlaying) => {
                (Screen::Playing, ScreenEffect::BeginSession)
            }

            (Screen::Playing, ScreenEvent::Finish) => {
                (Screen::Finished, ScreenEffect::FinalizeSession)
            }

            (Screen::Finished, ScreenEvent::BeginPlaying) => {
                (Screen::Playing, ScreenEffect::BeginSession)
            }
            (Screen::Finished, ScreenEvent::OpenSettings) => {
                (Screen::Settings, ScreenEffect::None)
            }

            (Screen::Settings | Screen::Playing | Screen::Finished, ScreenEvent::ReturnToStart) => {
                (Screen::Start, ScreenEffect::ResetSession)
            }

            // Ignore irrelevant events in the current state.
            (state, _) => (state, ScreenEffect::None),
        }
    }

    pub fn is_playing(self) -> bool {
        self == Screen::Playing
    }
}
