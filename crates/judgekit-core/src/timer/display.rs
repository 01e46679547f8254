//! Full-screen display mirror of the round timer.
//!
//! The display surface opens independently, reads the same persisted
//! record as the control surface, and derives everything it shows through
//! [`RoundTimer::recompute`]. It may start, pause, or reset the clock, but
//! its writes never touch the round name or the configured duration.

use serde::{Deserialize, Serialize};

use super::format::format_clock;
use super::round::{now_ms, RoundTimer, TimerZone};
use crate::error::StorageError;
use crate::events::Event;
use crate::storage::{KeyValueStore, Persisted};

/// Fraction of the round still left, in `[0, 1]`. Unconfigured timers draw
/// a full ring.
pub fn countdown_fraction(remaining: i64, total: i64) -> f64 {
    if total <= 0 {
        return 1.0;
    }
    (remaining as f64 / total as f64).clamp(0.0, 1.0)
}

/// Overtime growth indicator: `min(|remaining| / total, 1)` once past zero,
/// otherwise `0`. Independent of [`countdown_fraction`].
pub fn overtime_fraction(remaining: i64, total: i64) -> f64 {
    if total <= 0 || remaining >= 0 {
        return 0.0;
    }
    (remaining.unsigned_abs() as f64 / total as f64).min(1.0)
}

/// Everything the display renders for one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayFrame {
    pub round_name: String,
    pub clock: String,
    pub remaining_seconds: i64,
    pub zone: TimerZone,
    pub is_running: bool,
    pub is_overtime: bool,
    pub countdown_fraction: f64,
    pub overtime_fraction: f64,
}

/// One open display surface.
#[derive(Debug, Clone)]
pub struct DisplaySession {
    timer: RoundTimer,
}

impl DisplaySession {
    /// Read the shared record fresh.
    pub fn open(store: &impl KeyValueStore) -> Self {
        Self {
            timer: RoundTimer::load(store),
        }
    }

    pub fn from_timer(timer: RoundTimer) -> Self {
        Self { timer }
    }

    pub fn timer(&self) -> &RoundTimer {
        &self.timer
    }

    pub fn frame(&self) -> DisplayFrame {
        self.frame_at(now_ms())
    }

    pub fn frame_at(&self, now_ms: i64) -> DisplayFrame {
        let remaining = self.timer.recompute(now_ms);
        let total = self.timer.total_seconds();
        DisplayFrame {
            round_name: self.timer.round_name().to_string(),
            clock: format_clock(remaining),
            remaining_seconds: remaining,
            zone: TimerZone::classify(remaining, total),
            is_running: self.timer.is_running(),
            is_overtime: remaining < 0,
            countdown_fraction: countdown_fraction(remaining, total),
            overtime_fraction: overtime_fraction(remaining, total),
        }
    }

    pub fn start_at(&mut self, now_ms: i64) -> Option<Event> {
        self.timer.start_at(now_ms)
    }

    pub fn pause_at(&mut self, now_ms: i64) -> Option<Event> {
        self.timer.pause_at(now_ms)
    }

    pub fn reset(&mut self) -> Option<Event> {
        self.timer.reset()
    }

    pub fn tick_at(&mut self, now_ms: i64) -> Option<Event> {
        self.timer.tick_at(now_ms)
    }

    /// Re-read the shared record, picking up writes from the control surface.
    pub fn refresh(&mut self, store: &impl KeyValueStore) {
        self.timer = RoundTimer::load(store);
    }

    /// Write back the ticking fields only, preserving the stored round name
    /// and duration.
    ///
    /// # Errors
    /// Returns an error if the store rejects the write.
    pub fn write_back(&self, store: &impl KeyValueStore) -> Result<(), StorageError> {
        let mut stored = RoundTimer::load(store);
        stored.merge_runtime(&self.timer);
        stored.save(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    const T0: i64 = 1_700_000_000_000;

    fn session(total: i64) -> DisplaySession {
        let mut timer = RoundTimer::new();
        timer.configure(total);
        timer.set_round_name("Round 3");
        DisplaySession::from_timer(timer)
    }

    #[test]
    fn fractions_before_zero() {
        assert_eq!(countdown_fraction(900, 1800), 0.5);
        assert_eq!(overtime_fraction(900, 1800), 0.0);
        assert_eq!(countdown_fraction(0, 1800), 0.0);
        assert_eq!(overtime_fraction(0, 1800), 0.0);
    }

    #[test]
    fn fractions_in_overtime_are_independent() {
        assert_eq!(countdown_fraction(-450, 1800), 0.0);
        assert_eq!(overtime_fraction(-450, 1800), 0.25);
        assert_eq!(overtime_fraction(-5000, 1800), 1.0);
    }

    #[test]
    fn unconfigured_fractions() {
        assert_eq!(countdown_fraction(0, 0), 1.0);
        assert_eq!(overtime_fraction(-10, 0), 0.0);
    }

    #[test]
    fn frame_derives_from_timestamp() {
        let mut display = session(60);
        display.start_at(T0);
        let frame = display.frame_at(T0 + 45_000);
        assert_eq!(frame.clock, "00:15");
        assert_eq!(frame.zone, TimerZone::Warning);
        assert!(frame.is_running);
        assert!(!frame.is_overtime);

        let frame = display.frame_at(T0 + 90_000);
        assert_eq!(frame.clock, "-00:30");
        assert_eq!(frame.zone, TimerZone::Overtime);
        assert!(frame.is_overtime);
        assert_eq!(frame.overtime_fraction, 0.5);
        assert_eq!(frame.countdown_fraction, 0.0);
    }

    #[test]
    fn write_back_preserves_control_fields() {
        let store = MemoryStore::new();
        let mut control = RoundTimer::new();
        control.configure(3000);
        control.set_round_name("Top 4");
        control.save(&store).unwrap();

        let mut display = DisplaySession::open(&store);

        // The control surface renames the round while the display is open.
        control.set_round_name("Finals");
        control.save(&store).unwrap();

        display.start_at(T0);
        display.write_back(&store).unwrap();

        let stored = RoundTimer::load(&store);
        assert_eq!(stored.round_name(), "Finals");
        assert_eq!(stored.total_seconds(), 3000);
        assert!(stored.is_running());
        assert_eq!(stored.start_timestamp(), Some(T0));
    }

    #[test]
    fn refresh_sees_pause_from_control() {
        let store = MemoryStore::new();
        let mut control = RoundTimer::new();
        control.configure(600);
        control.start_at(T0);
        control.save(&store).unwrap();

        let mut display = DisplaySession::open(&store);
        assert!(display.timer().is_running());

        control.pause_at(T0 + 10_000);
        control.save(&store).unwrap();
        display.refresh(&store);
        assert!(!display.timer().is_running());
        assert_eq!(display.frame_at(T0 + 99_000).remaining_seconds, 590);
    }
}
