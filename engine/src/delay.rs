use std::time::Duration;

/// A single-shot delay driven by explicit ticks.
///
/// The host loop feeds elapsed time through [`DelayTimer::tick`]; the timer
/// reports completion exactly once and then disarms itself. Re-arming always
/// replaces the previous delay, so a timer never has more than one pending
/// deadline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DelayTimer {
    armed: Option<Armed>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Armed {
    elapsed: Duration,
    delay: Duration,
}

impl DelayTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms the timer, dropping whatever was pending before.
    pub fn start(&mut self, delay: Duration) {
        self.armed = Some(Armed {
            elapsed: Duration::ZERO,
            delay,
        });
    }

    /// Returns `true` if a pending delay was dropped.
    pub fn cancel(&mut self) -> bool {
        self.armed.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.armed.is_some()
    }

    /// Time since the pending delay was armed.
    pub fn elapsed(&self) -> Option<Duration> {
        self.armed.map(|armed| armed.elapsed)
    }

    pub fn remaining(&self) -> Option<Duration> {
        self.armed.map(|armed| armed.delay.saturating_sub(armed.elapsed))
    }

    pub fn tick(&mut self, dt: Duration) -> bool {
        let Some(armed) = self.armed.as_mut() else {
            return false;
        };
        armed.elapsed = armed.elapsed.saturating_add(dt);
        if armed.elapsed < armed.delay {
            return false;
        }
        self.armed = None;
        true
    }
}
