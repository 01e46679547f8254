//! Round timer state machine.
//!
//! Remaining time is never counted down in place. While running it is
//! derived from the wall-clock instant the timer was started:
//!
//! ```text
//! remaining = seconds_at_start - floor((now - start_timestamp) / 1000)
//! ```
//!
//! so a reload, a backgrounded tab, or a second surface reading the same
//! persisted record all land on the same value.
//!
//! ## State Transitions
//!
//! ```text
//! Unconfigured -configure-> ConfiguredPaused <-start/pause-> Running
//! Running | Paused -reset-> ConfiguredPaused
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::format::format_clock;
use crate::events::Event;
use crate::storage::{lenient, Persisted};

/// Tournament round presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    Bo1,
    Bo3,
    TopCut,
}

/// Derived lifecycle phase of a [`RoundTimer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerPhase {
    Unconfigured,
    ConfiguredPaused,
    Running,
    Paused,
}

/// Color band for the remaining time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerZone {
    /// More than a third of the round left (green).
    Normal,
    /// A third or less left (yellow).
    Warning,
    /// Zero or past zero (red).
    Overtime,
}

impl TimerZone {
    /// Classify `remaining` against `total`. The warning boundary is
    /// inclusive: exactly `total / 3` is already a warning.
    pub fn classify(remaining: i64, total: i64) -> Self {
        if remaining <= 0 {
            TimerZone::Overtime
        } else if (remaining as f64) <= total as f64 / 3.0 {
            TimerZone::Warning
        } else {
            TimerZone::Normal
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            TimerZone::Normal => "green",
            TimerZone::Warning => "yellow",
            TimerZone::Overtime => "red",
        }
    }
}

/// Persisted round timer shared by the control and display surfaces.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoundTimer {
    round_name: String,
    total_seconds: i64,
    /// Authoritative only while stopped; a snapshot while running.
    remaining_seconds: i64,
    is_running: bool,
    /// Epoch milliseconds of the last start.
    start_timestamp: Option<i64>,
    seconds_at_start: i64,
}

impl RoundTimer {
    /// Unconfigured timer (`total_seconds == 0`).
    pub fn new() -> Self {
        Self::default()
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn round_name(&self) -> &str {
        &self.round_name
    }

    pub fn total_seconds(&self) -> i64 {
        self.total_seconds
    }

    /// Last published remaining value. Call [`RoundTimer::recompute`] for
    /// the live value.
    pub fn remaining_seconds(&self) -> i64 {
        self.remaining_seconds
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    pub fn start_timestamp(&self) -> Option<i64> {
        self.start_timestamp
    }

    pub fn seconds_at_start(&self) -> i64 {
        self.seconds_at_start
    }

    pub fn is_configured(&self) -> bool {
        self.total_seconds > 0
    }

    pub fn phase(&self) -> TimerPhase {
        if !self.is_configured() {
            TimerPhase::Unconfigured
        } else if self.is_running {
            TimerPhase::Running
        } else if self.remaining_seconds == self.total_seconds {
            TimerPhase::ConfiguredPaused
        } else {
            TimerPhase::Paused
        }
    }

    /// Remaining seconds at `now_ms`.
    ///
    /// Running: `seconds_at_start` minus whole seconds elapsed since start.
    /// Stopped: the stored `remaining_seconds`. A clock that reads earlier
    /// than the start instant counts as zero elapsed. Arithmetic saturates,
    /// so out-of-range stored values pin to the `i64` bounds.
    pub fn recompute(&self, now_ms: i64) -> i64 {
        match (self.is_running, self.start_timestamp) {
            (true, Some(start)) => {
                let elapsed = now_ms.saturating_sub(start).max(0) / 1000;
                self.seconds_at_start.saturating_sub(elapsed)
            }
            _ => self.remaining_seconds,
        }
    }

    pub fn zone(&self) -> TimerZone {
        TimerZone::classify(self.remaining_seconds, self.total_seconds)
    }

    pub fn is_overtime(&self) -> bool {
        self.remaining_seconds < 0
    }

    pub fn clock(&self) -> String {
        format_clock(self.remaining_seconds)
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::TimerSnapshot {
            round_name: self.round_name.clone(),
            phase: self.phase(),
            clock: self.clock(),
            remaining_seconds: self.remaining_seconds,
            total_seconds: self.total_seconds,
            zone: self.zone(),
            is_running: self.is_running,
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn set_round_name(&mut self, name: &str) -> Option<Event> {
        if self.round_name == name {
            return None;
        }
        self.round_name = name.to_string();
        Some(Event::RoundNamed {
            round_name: self.round_name.clone(),
            at: Utc::now(),
        })
    }

    /// Configure a fresh round of `duration_seconds`. Non-positive
    /// durations are ignored.
    pub fn configure(&mut self, duration_seconds: i64) -> Option<Event> {
        self.configure_with(duration_seconds, None)
    }

    pub fn configure_preset(&mut self, preset: Preset, minutes: u32) -> Option<Event> {
        self.configure_with(i64::from(minutes) * 60, Some(preset))
    }

    fn configure_with(&mut self, duration_seconds: i64, preset: Option<Preset>) -> Option<Event> {
        if duration_seconds <= 0 {
            tracing::debug!(duration_seconds, "ignoring non-positive timer duration");
            return None;
        }
        self.total_seconds = duration_seconds;
        self.remaining_seconds = duration_seconds;
        self.seconds_at_start = duration_seconds;
        self.is_running = false;
        self.start_timestamp = None;
        Some(Event::TimerConfigured {
            total_seconds: duration_seconds,
            preset,
            at: Utc::now(),
        })
    }

    /// Configure from free-form minutes input such as `"45"` or `"0.5"`.
    /// Fractional minutes are floored to whole seconds; empty, non-numeric,
    /// or non-positive input is a no-op.
    pub fn configure_minutes(&mut self, input: &str) -> Option<Event> {
        let minutes = input.trim().parse::<f64>().ok()?;
        if !minutes.is_finite() || minutes <= 0.0 {
            return None;
        }
        self.configure((minutes * 60.0).floor() as i64)
    }

    pub fn start(&mut self) -> Option<Event> {
        self.start_at(now_ms())
    }

    pub fn start_at(&mut self, now_ms: i64) -> Option<Event> {
        if !self.is_configured() || self.is_running {
            return None;
        }
        self.start_timestamp = Some(now_ms);
        self.seconds_at_start = self.remaining_seconds;
        self.is_running = true;
        Some(Event::TimerStarted {
            seconds_at_start: self.seconds_at_start,
            start_timestamp: now_ms,
            at: Utc::now(),
        })
    }

    pub fn pause(&mut self) -> Option<Event> {
        self.pause_at(now_ms())
    }

    pub fn pause_at(&mut self, now_ms: i64) -> Option<Event> {
        if !self.is_running {
            return None;
        }
        self.remaining_seconds = self.recompute(now_ms);
        self.is_running = false;
        self.start_timestamp = None;
        Some(Event::TimerPaused {
            remaining_seconds: self.remaining_seconds,
            at: Utc::now(),
        })
    }

    pub fn reset(&mut self) -> Option<Event> {
        if !self.is_configured() {
            return None;
        }
        self.remaining_seconds = self.total_seconds;
        self.seconds_at_start = self.total_seconds;
        self.is_running = false;
        self.start_timestamp = None;
        Some(Event::TimerReset {
            total_seconds: self.total_seconds,
            at: Utc::now(),
        })
    }

    pub fn tick(&mut self) -> Option<Event> {
        self.tick_at(now_ms())
    }

    /// Republish the derived remaining value. Returns
    /// `Some(Event::TimerExpired)` on the tick that crosses zero.
    pub fn tick_at(&mut self, now_ms: i64) -> Option<Event> {
        if !self.is_running {
            return None;
        }
        let before = self.remaining_seconds;
        self.remaining_seconds = self.recompute(now_ms);
        if before > 0 && self.remaining_seconds <= 0 {
            return Some(Event::TimerExpired {
                round_name: self.round_name.clone(),
                at: Utc::now(),
            });
        }
        None
    }

    /// Overwrite only the ticking fields with those of `other`.
    ///
    /// The display surface writes back through this so it never clobbers
    /// the round name or duration chosen on the control surface.
    pub fn merge_runtime(&mut self, other: &RoundTimer) {
        self.remaining_seconds = other.remaining_seconds;
        self.is_running = other.is_running;
        self.start_timestamp = other.start_timestamp;
        self.seconds_at_start = other.seconds_at_start;
    }

    /// The control surface skips writing an untouched timer.
    pub fn is_worth_saving(&self) -> bool {
        self.total_seconds > 0 || !self.round_name.is_empty()
    }
}

impl Persisted for RoundTimer {
    const KEY: &'static str = "roundTimer";

    /// Parse with defaults, then recompute so a running timer resumes at
    /// the correct value.
    fn from_json(value: &Value) -> Self {
        let mut timer = Self {
            round_name: lenient::string(value, "roundName"),
            total_seconds: lenient::int(value, "totalSeconds", 0).max(0),
            remaining_seconds: lenient::int(value, "remainingSeconds", 0),
            is_running: lenient::boolean(value, "isRunning", false),
            start_timestamp: lenient::opt_int(value, "startTimestamp"),
            seconds_at_start: lenient::int(value, "secondsAtStart", 0),
        };
        if timer.is_running && timer.start_timestamp.is_none() {
            tracing::warn!("running round timer without start timestamp, treating as paused");
            timer.is_running = false;
        }
        if !timer.is_running {
            timer.start_timestamp = None;
        }
        timer.remaining_seconds = timer.recompute(now_ms());
        timer
    }

    fn to_json(&self) -> Value {
        json!({
            "roundName": self.round_name,
            "totalSeconds": self.total_seconds,
            "remainingSeconds": self.remaining_seconds,
            "isRunning": self.is_running,
            "startTimestamp": self.start_timestamp,
            "secondsAtStart": self.seconds_at_start,
        })
    }
}

/// Current wall-clock time in epoch milliseconds.
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}
