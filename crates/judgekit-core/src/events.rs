use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::context::{Locale, Tab, Theme};
use crate::deck::CounterKind;
use crate::extensions::TimeExtension;
use crate::ledger::{ActionCounts, ActionKind, Player, TurnRecord};
use crate::timer::{Preset, TimerPhase, TimerZone};

/// Every state change in the system produces an Event.
/// The CLI prints them; display surfaces rebuild from snapshots.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    // ── Round timer ──────────────────────────────────────────────────
    TimerConfigured {
        total_seconds: i64,
        preset: Option<Preset>,
        at: DateTime<Utc>,
    },
    TimerStarted {
        seconds_at_start: i64,
        start_timestamp: i64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_seconds: i64,
        at: DateTime<Utc>,
    },
    TimerReset {
        total_seconds: i64,
        at: DateTime<Utc>,
    },
    /// The countdown crossed zero and the round is now in overtime.
    TimerExpired {
        round_name: String,
        at: DateTime<Utc>,
    },
    RoundNamed {
        round_name: String,
        at: DateTime<Utc>,
    },
    TimerSnapshot {
        round_name: String,
        phase: TimerPhase,
        clock: String,
        remaining_seconds: i64,
        total_seconds: i64,
        zone: TimerZone,
        is_running: bool,
        at: DateTime<Utc>,
    },

    // ── Turn ledger ──────────────────────────────────────────────────
    ActionRecorded {
        kind: ActionKind,
        count: u32,
        at: DateTime<Utc>,
    },
    ActionRemoved {
        kind: ActionKind,
        count: u32,
        at: DateTime<Utc>,
    },
    DrawToggled {
        marked: bool,
        timer_started: bool,
        at: DateTime<Utc>,
    },
    PrizesChanged {
        prizes: u32,
        at: DateTime<Utc>,
    },
    StopwatchStarted {
        timer_seconds: u64,
        at: DateTime<Utc>,
    },
    StopwatchStopped {
        timer_seconds: u64,
        at: DateTime<Utc>,
    },
    AutostartChanged {
        draw: bool,
        next_turn: bool,
        at: DateTime<Utc>,
    },
    TurnClosed {
        record: TurnRecord,
        next_player: Player,
        turn_number: u32,
        timer_started: bool,
        at: DateTime<Utc>,
    },
    LedgerCleared {
        at: DateTime<Utc>,
    },
    LedgerSnapshot {
        player: Player,
        turn_number: u32,
        counts: ActionCounts,
        draw: bool,
        prizes: u32,
        timer_seconds: u64,
        timer_running: bool,
        action_total: u32,
        pace: u64,
        history_len: usize,
        at: DateTime<Utc>,
    },

    // ── Deck check ───────────────────────────────────────────────────
    DeckIncremented {
        kind: CounterKind,
        amount: u32,
        total: u32,
        at: DateTime<Utc>,
    },
    DeckUndone {
        kind: CounterKind,
        amount: u32,
        total: u32,
        at: DateTime<Utc>,
    },
    DeckReset {
        at: DateTime<Utc>,
    },

    // ── Time extensions ──────────────────────────────────────────────
    ExtensionAdded {
        extension: TimeExtension,
        at: DateTime<Utc>,
    },
    ExtensionUpdated {
        id: String,
        minutes: i64,
        at: DateTime<Utc>,
    },
    ExtensionRemoved {
        id: String,
        at: DateTime<Utc>,
    },

    // ── App context ──────────────────────────────────────────────────
    LocaleChanged {
        locale: Locale,
        at: DateTime<Utc>,
    },
    ThemeChanged {
        theme: Theme,
        at: DateTime<Utc>,
    },
    TabChanged {
        tab: Tab,
        at: DateTime<Utc>,
    },
    OnboardingCompleted {
        at: DateTime<Utc>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_type_tag() {
        let event = Event::TimerPaused {
            remaining_seconds: 42,
            at: Utc::now(),
        };
        let v = serde_json::to_value(&event).unwrap();
        assert_eq!(v["type"], "TimerPaused");
        assert_eq!(v["remaining_seconds"], 42);
    }

    #[test]
    fn round_trips_through_json() {
        let event = Event::DeckIncremented {
            kind: CounterKind::Trainer,
            amount: 4,
            total: 4,
            at: Utc::now(),
        };
        let text = serde_json::to_string(&event).unwrap();
        let back: Event = serde_json::from_str(&text).unwrap();
        assert!(matches!(
            back,
            Event::DeckIncremented { kind: CounterKind::Trainer, amount: 4, .. }
        ));
    }
}
