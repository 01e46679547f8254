//! Table-judge turn ledger.
//!
//! Tracks the current turn's actions, draw flag, prize cards and stopwatch,
//! then closes the turn into an append-only history and passes play to the
//! other seat. The autostart preferences are sticky: neither closing a turn
//! nor clearing the ledger touches them.

use chrono::Utc;
use serde_json::{json, Value};

use super::turn::{ActionCounts, ActionKind, Player, TurnRecord};
use super::MAX_PRIZES;
use crate::events::Event;
use crate::storage::{lenient, Persisted};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnLedger {
    counts: ActionCounts,
    draw: bool,
    prizes: u32,
    timer_seconds: u64,
    timer_running: bool,
    current_player: Player,
    turn_number: u32,
    /// Newest first.
    history: Vec<TurnRecord>,
    autostart_draw: bool,
    autostart_next_turn: bool,
}

impl Default for TurnLedger {
    fn default() -> Self {
        Self {
            counts: ActionCounts::default(),
            draw: false,
            prizes: 0,
            timer_seconds: 0,
            timer_running: false,
            current_player: Player::One,
            turn_number: 1,
            history: Vec::new(),
            autostart_draw: false,
            autostart_next_turn: false,
        }
    }
}

/// Floor of seconds per action for the turn in progress, 0 with no actions.
pub fn live_pace(timer_seconds: u64, actions: u32) -> u64 {
    if actions == 0 {
        return 0;
    }
    timer_seconds / u64::from(actions)
}

impl TurnLedger {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn counts(&self) -> &ActionCounts {
        &self.counts
    }

    pub fn count(&self, kind: ActionKind) -> u32 {
        self.counts.get(kind)
    }

    /// A once-per-turn action that has been used shows as locked.
    pub fn is_locked(&self, kind: ActionKind) -> bool {
        kind.is_once_per_turn() && self.counts.get(kind) > 0
    }

    pub fn draw(&self) -> bool {
        self.draw
    }

    pub fn prizes(&self) -> u32 {
        self.prizes
    }

    pub fn timer_seconds(&self) -> u64 {
        self.timer_seconds
    }

    pub fn timer_running(&self) -> bool {
        self.timer_running
    }

    pub fn current_player(&self) -> Player {
        self.current_player
    }

    pub fn turn_number(&self) -> u32 {
        self.turn_number
    }

    pub fn history(&self) -> &[TurnRecord] {
        &self.history
    }

    pub fn autostart_draw(&self) -> bool {
        self.autostart_draw
    }

    pub fn autostart_next_turn(&self) -> bool {
        self.autostart_next_turn
    }

    pub fn action_total(&self) -> u32 {
        self.counts.total()
    }

    pub fn pace(&self) -> u64 {
        live_pace(self.timer_seconds, self.action_total())
    }

    pub fn snapshot(&self) -> Event {
        Event::LedgerSnapshot {
            player: self.current_player,
            turn_number: self.turn_number,
            counts: self.counts,
            draw: self.draw,
            prizes: self.prizes,
            timer_seconds: self.timer_seconds,
            timer_running: self.timer_running,
            action_total: self.action_total(),
            pace: self.pace(),
            history_len: self.history.len(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Once-per-turn kinds are refused while their count is non-zero. The
    /// check is on the value, so decrementing back to zero re-opens it.
    pub fn increment_action(&mut self, kind: ActionKind) -> Option<Event> {
        if self.is_locked(kind) {
            tracing::debug!(?kind, "once-per-turn action already used");
            return None;
        }
        let count = self.counts.get_mut(kind);
        *count = count.saturating_add(1);
        Some(Event::ActionRecorded {
            kind,
            count: *count,
            at: Utc::now(),
        })
    }

    pub fn decrement_action(&mut self, kind: ActionKind) -> Option<Event> {
        let count = self.counts.get_mut(kind);
        if *count == 0 {
            return None;
        }
        *count -= 1;
        Some(Event::ActionRemoved {
            kind,
            count: *count,
            at: Utc::now(),
        })
    }

    pub fn toggle_draw(&mut self) -> Option<Event> {
        self.draw = !self.draw;
        let timer_started = self.draw && self.autostart_draw && !self.timer_running;
        if self.draw && self.autostart_draw {
            self.timer_running = true;
        }
        Some(Event::DrawToggled {
            marked: self.draw,
            timer_started,
            at: Utc::now(),
        })
    }

    pub fn increment_prize(&mut self) -> Option<Event> {
        if self.prizes >= MAX_PRIZES {
            return None;
        }
        self.prizes += 1;
        Some(Event::PrizesChanged {
            prizes: self.prizes,
            at: Utc::now(),
        })
    }

    pub fn decrement_prize(&mut self) -> Option<Event> {
        if self.prizes == 0 {
            return None;
        }
        self.prizes -= 1;
        Some(Event::PrizesChanged {
            prizes: self.prizes,
            at: Utc::now(),
        })
    }

    pub fn start_timer(&mut self) -> Option<Event> {
        if self.timer_running {
            return None;
        }
        self.timer_running = true;
        Some(Event::StopwatchStarted {
            timer_seconds: self.timer_seconds,
            at: Utc::now(),
        })
    }

    pub fn stop_timer(&mut self) -> Option<Event> {
        if !self.timer_running {
            return None;
        }
        self.timer_running = false;
        Some(Event::StopwatchStopped {
            timer_seconds: self.timer_seconds,
            at: Utc::now(),
        })
    }

    /// One second of turn time. Ignored while the stopwatch is stopped.
    pub fn tick(&mut self) {
        if self.timer_running {
            self.timer_seconds = self.timer_seconds.saturating_add(1);
        }
    }

    pub fn toggle_autostart_draw(&mut self) -> Option<Event> {
        self.autostart_draw = !self.autostart_draw;
        Some(self.autostart_event())
    }

    pub fn toggle_autostart_next_turn(&mut self) -> Option<Event> {
        self.autostart_next_turn = !self.autostart_next_turn;
        Some(self.autostart_event())
    }

    fn autostart_event(&self) -> Event {
        Event::AutostartChanged {
            draw: self.autostart_draw,
            next_turn: self.autostart_next_turn,
            at: Utc::now(),
        }
    }

    /// Snapshot the turn into history, clear the turn fields, and pass
    /// play to the other seat.
    pub fn close_turn(&mut self) -> Option<Event> {
        let record = TurnRecord {
            player: self.current_player,
            turn_number: self.turn_number,
            counts: self.counts,
            draw: self.draw,
            prizes: self.prizes,
            timer_seconds: self.timer_seconds,
        };
        self.history.insert(0, record.clone());

        self.counts = ActionCounts::default();
        self.draw = false;
        self.prizes = 0;
        self.timer_seconds = 0;
        self.current_player = self.current_player.other();
        self.turn_number = self.turn_number.saturating_add(1);
        self.timer_running = self.autostart_next_turn;

        Some(Event::TurnClosed {
            record,
            next_player: self.current_player,
            turn_number: self.turn_number,
            timer_started: self.timer_running,
            at: Utc::now(),
        })
    }

    /// Back to a fresh game, keeping only the autostart preferences.
    pub fn clear_all(&mut self) -> Option<Event> {
        *self = Self {
            autostart_draw: self.autostart_draw,
            autostart_next_turn: self.autostart_next_turn,
            ..Self::default()
        };
        Some(Event::LedgerCleared { at: Utc::now() })
    }
}

impl Persisted for TurnLedger {
    const KEY: &'static str = "tableJudgeState";

    fn from_json(value: &Value) -> Self {
        let history = lenient::array(value, "turnHistory")
            .iter()
            .filter(|entry| entry.is_object())
            .map(TurnRecord::from_json)
            .collect();
        Self {
            counts: ActionCounts::from_json(value),
            draw: lenient::boolean(value, "draw", false),
            prizes: lenient::count(value, "prizes").min(MAX_PRIZES),
            timer_seconds: lenient::int(value, "timerSeconds", 0).max(0) as u64,
            timer_running: lenient::boolean(value, "timerRunning", false),
            current_player: Player::from_number(lenient::int(value, "currentPlayer", 1)),
            turn_number: lenient::count(value, "turnNumber").max(1),
            history,
            autostart_draw: lenient::boolean(value, "autostartDraw", false),
            autostart_next_turn: lenient::boolean(value, "autostartNextTurn", false),
        }
    }

    fn to_json(&self) -> Value {
        json!({
            "supporter": self.counts.supporter,
            "energy": self.counts.energy,
            "stadium": self.counts.stadium,
            "retreat": self.counts.retreat,
            "otherAction": self.counts.other_action,
            "draw": self.draw,
            "prizes": self.prizes,
            "timerSeconds": self.timer_seconds,
            "timerRunning": self.timer_running,
            "currentPlayer": u8::from(self.current_player),
            "turnNumber": self.turn_number,
            "turnHistory": self.history,
            "autostartDraw": self.autostart_draw,
            "autostartNextTurn": self.autostart_next_turn,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticks(ledger: &mut TurnLedger, n: u64) {
        for _ in 0..n {
            ledger.tick();
        }
    }

    #[test]
    fn initial_state() {
        let ledger = TurnLedger::new();
        assert_eq!(ledger.action_total(), 0);
        assert_eq!(ledger.current_player(), Player::One);
        assert_eq!(ledger.turn_number(), 1);
        assert_eq!(ledger.pace(), 0);
        assert!(ledger.history().is_empty());
    }

    #[test]
    fn once_per_turn_guard() {
        let mut ledger = TurnLedger::new();
        assert!(ledger.increment_action(ActionKind::Supporter).is_some());
        assert!(ledger.increment_action(ActionKind::Supporter).is_none());
        assert_eq!(ledger.count(ActionKind::Supporter), 1);
        assert!(ledger.is_locked(ActionKind::Supporter));
    }

    #[test]
    fn decrement_reopens_guard_within_turn() {
        let mut ledger = TurnLedger::new();
        ledger.increment_action(ActionKind::Supporter);
        ledger.increment_action(ActionKind::Supporter);
        ledger.decrement_action(ActionKind::Supporter);
        assert!(!ledger.is_locked(ActionKind::Supporter));
        ledger.increment_action(ActionKind::Supporter);
        assert_eq!(ledger.count(ActionKind::Supporter), 1);
    }

    #[test]
    fn other_action_is_unbounded() {
        let mut ledger = TurnLedger::new();
        for _ in 0..25 {
            ledger.increment_action(ActionKind::OtherAction);
        }
        assert_eq!(ledger.count(ActionKind::OtherAction), 25);
        assert!(!ledger.is_locked(ActionKind::OtherAction));
    }

    #[test]
    fn decrement_saturates_at_zero() {
        let mut ledger = TurnLedger::new();
        assert!(ledger.decrement_action(ActionKind::Energy).is_none());
        assert_eq!(ledger.count(ActionKind::Energy), 0);
    }

    #[test]
    fn action_total_sums_all_kinds() {
        let mut ledger = TurnLedger::new();
        for kind in ActionKind::ALL {
            ledger.increment_action(kind);
        }
        ledger.increment_action(ActionKind::OtherAction);
        assert_eq!(ledger.action_total(), 6);
    }

    #[test]
    fn live_pace_floors() {
        let mut ledger = TurnLedger::new();
        ledger.start_timer();
        ticks(&mut ledger, 50);
        for _ in 0..3 {
            ledger.increment_action(ActionKind::OtherAction);
        }
        assert_eq!(ledger.pace(), 16);
    }

    #[test]
    fn history_pace_rounds_for_same_turn() {
        let mut ledger = TurnLedger::new();
        ledger.start_timer();
        ticks(&mut ledger, 50);
        for _ in 0..3 {
            ledger.increment_action(ActionKind::OtherAction);
        }
        assert_eq!(ledger.pace(), 16);
        ledger.close_turn();
        assert_eq!(ledger.history()[0].pace(), 17);
        assert_eq!(ledger.history()[0].clock(), "0:50");
    }

    #[test]
    fn prizes_clamp() {
        let mut ledger = TurnLedger::new();
        assert!(ledger.decrement_prize().is_none());
        for _ in 0..8 {
            ledger.increment_prize();
        }
        assert_eq!(ledger.prizes(), 6);
        ledger.decrement_prize();
        assert_eq!(ledger.prizes(), 5);
    }

    #[test]
    fn tick_only_counts_while_running() {
        let mut ledger = TurnLedger::new();
        ticks(&mut ledger, 3);
        assert_eq!(ledger.timer_seconds(), 0);
        ledger.start_timer();
        ticks(&mut ledger, 3);
        ledger.stop_timer();
        ticks(&mut ledger, 3);
        assert_eq!(ledger.timer_seconds(), 3);
    }

    #[test]
    fn draw_autostarts_only_when_enabled() {
        let mut ledger = TurnLedger::new();
        ledger.toggle_draw();
        assert!(ledger.draw());
        assert!(!ledger.timer_running());

        let mut ledger = TurnLedger::new();
        ledger.toggle_autostart_draw();
        match ledger.toggle_draw() {
            Some(Event::DrawToggled { marked, timer_started, .. }) => {
                assert!(marked);
                assert!(timer_started);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(ledger.timer_running());
    }

    #[test]
    fn unmarking_draw_does_not_stop_timer() {
        let mut ledger = TurnLedger::new();
        ledger.toggle_autostart_draw();
        ledger.toggle_draw();
        ledger.toggle_draw();
        assert!(!ledger.draw());
        assert!(ledger.timer_running());
    }

    #[test]
    fn close_turn_snapshots_and_resets() {
        let mut ledger = TurnLedger::new();
        ledger.increment_action(ActionKind::Energy);
        ledger.toggle_draw();
        ledger.increment_prize();
        ledger.start_timer();
        ticks(&mut ledger, 12);

        ledger.close_turn();

        let record = &ledger.history()[0];
        assert_eq!(record.player, Player::One);
        assert_eq!(record.turn_number, 1);
        assert_eq!(record.counts.energy, 1);
        assert!(record.draw);
        assert_eq!(record.prizes, 1);
        assert_eq!(record.timer_seconds, 12);

        assert_eq!(ledger.action_total(), 0);
        assert!(!ledger.draw());
        assert_eq!(ledger.prizes(), 0);
        assert_eq!(ledger.timer_seconds(), 0);
        assert!(!ledger.timer_running());
        assert_eq!(ledger.current_player(), Player::Two);
        assert_eq!(ledger.turn_number(), 2);
    }

    #[test]
    fn players_alternate_and_history_is_newest_first() {
        let mut ledger = TurnLedger::new();
        ledger.close_turn();
        ledger.close_turn();
        assert_eq!(ledger.current_player(), Player::One);
        assert_eq!(ledger.turn_number(), 3);
        assert_eq!(ledger.history()[0].turn_number, 2);
        assert_eq!(ledger.history()[0].player, Player::Two);
        assert_eq!(ledger.history()[1].player, Player::One);
    }

    #[test]
    fn close_turn_keeps_autostart_and_restarts_timer() {
        let mut ledger = TurnLedger::new();
        ledger.toggle_autostart_draw();
        ledger.toggle_autostart_next_turn();
        ledger.close_turn();
        assert!(ledger.autostart_draw());
        assert!(ledger.autostart_next_turn());
        assert!(ledger.timer_running());
    }

    #[test]
    fn clear_all_keeps_only_preferences() {
        let mut ledger = TurnLedger::new();
        ledger.toggle_autostart_next_turn();
        ledger.increment_action(ActionKind::Retreat);
        ledger.close_turn();
        ledger.increment_prize();
        ticks(&mut ledger, 4);

        ledger.clear_all();

        assert!(ledger.history().is_empty());
        assert_eq!(ledger.turn_number(), 1);
        assert_eq!(ledger.current_player(), Player::One);
        assert_eq!(ledger.prizes(), 0);
        assert_eq!(ledger.timer_seconds(), 0);
        assert!(!ledger.timer_running());
        assert!(!ledger.autostart_draw());
        assert!(ledger.autostart_next_turn());
    }

    #[test]
    fn persisted_shape() {
        let mut ledger = TurnLedger::new();
        ledger.increment_action(ActionKind::OtherAction);
        ledger.close_turn();
        let v = ledger.to_json();
        assert_eq!(v["currentPlayer"], 2);
        assert_eq!(v["turnNumber"], 2);
        assert_eq!(v["turnHistory"][0]["otherAction"], 1);
        assert_eq!(v["turnHistory"][0]["player"], 1);
        assert_eq!(TurnLedger::from_json(&v), ledger);
    }

    #[test]
    fn from_json_defaults_and_clamps() {
        let ledger = TurnLedger::from_json(&json!({
            "supporter": 1,
            "prizes": 40,
            "currentPlayer": 3,
            "turnNumber": 0,
            "turnHistory": [42, { "turnNumber": 1, "energy": 1 }],
            "autostartDraw": "yes",
        }));
        assert_eq!(ledger.count(ActionKind::Supporter), 1);
        assert_eq!(ledger.prizes(), 6);
        assert_eq!(ledger.current_player(), Player::One);
        assert_eq!(ledger.turn_number(), 1);
        assert_eq!(ledger.history().len(), 1);
        assert!(!ledger.autostart_draw());
    }
}
