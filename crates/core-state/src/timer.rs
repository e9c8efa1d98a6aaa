//! Countdown timer with one-second resolution.

use std::time::Duration;

const STEP: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Timer not running; nothing changed.
    Idle,
    /// One second elapsed, time remains.
    Counting,
    /// The countdown reached zero. The timer is stopped and rewound.
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timer {
    duration: Duration,
    remaining: Duration,
    running: bool,
}

impl Timer {
    /// Sub-second durations round up to one second so a finished countdown is always observable.
    pub fn new(duration: Duration) -> Self {
        let duration = duration.max(STEP);
        Self {
            duration,
            remaining: duration,
            running: false,
        }
    }

    pub fn remaining(&self) -> Duration {
        self.remaining
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Stop and rewind to the full duration.
    pub fn reset(&mut self) {
        self.running = false;
        self.remaining = self.duration;
    }

    pub fn tick(&mut self) -> TickOutcome {
        if !self.running {
            return TickOutcome::Idle;
        }
        self.remaining = self.remaining.saturating_sub(STEP);
        if self.remaining.is_zero() {
            self.reset();
            TickOutcome::Finished
        } else {
            TickOutcome::Counting
        }
    }
}
