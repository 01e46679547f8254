//! Deck check counter with a linear undo stack.
//!
//! Every increment is appended to `history`; undo pops the newest entry and
//! subtracts it. Counts are therefore always the replay of history.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::events::Event;
use crate::storage::{lenient, Persisted};

/// Legal constructed deck size.
pub const DEFAULT_DECK_SIZE: u32 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CounterKind {
    #[serde(rename = "creatures")]
    Creature,
    #[serde(rename = "trainer")]
    Trainer,
    #[serde(rename = "energy")]
    Energy,
}

impl CounterKind {
    pub const ALL: [CounterKind; 3] = [CounterKind::Creature, CounterKind::Trainer, CounterKind::Energy];

    /// Field name used in persisted records.
    pub fn key(self) -> &'static str {
        match self {
            CounterKind::Creature => "creatures",
            CounterKind::Trainer => "trainer",
            CounterKind::Energy => "energy",
        }
    }

    fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.key() == key)
    }
}

/// Outcome of comparing the total against the legal deck size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeckStatus {
    /// Nothing counted yet.
    Empty,
    /// Exactly the legal size.
    Valid,
    /// Anything else.
    Invalid,
}

/// One undoable increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckEntry {
    #[serde(rename = "type")]
    pub kind: CounterKind,
    pub amount: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeckCounter {
    creatures: u32,
    trainer: u32,
    energy: u32,
    history: Vec<DeckEntry>,
    /// Highlight only; not persisted.
    last_touched: Option<CounterKind>,
}

impl DeckCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, kind: CounterKind) -> u32 {
        match kind {
            CounterKind::Creature => self.creatures,
            CounterKind::Trainer => self.trainer,
            CounterKind::Energy => self.energy,
        }
    }

    fn count_mut(&mut self, kind: CounterKind) -> &mut u32 {
        match kind {
            CounterKind::Creature => &mut self.creatures,
            CounterKind::Trainer => &mut self.trainer,
            CounterKind::Energy => &mut self.energy,
        }
    }

    pub fn history(&self) -> &[DeckEntry] {
        &self.history
    }

    pub fn last_touched(&self) -> Option<CounterKind> {
        self.last_touched
    }

    pub fn total(&self) -> u32 {
        CounterKind::ALL.iter().map(|&k| self.count(k)).sum()
    }

    pub fn status(&self) -> DeckStatus {
        self.status_for(DEFAULT_DECK_SIZE)
    }

    pub fn status_for(&self, target: u32) -> DeckStatus {
        match self.total() {
            0 => DeckStatus::Empty,
            total if total == target => DeckStatus::Valid,
            _ => DeckStatus::Invalid,
        }
    }

    pub fn increment(&mut self, kind: CounterKind, amount: u32) -> Option<Event> {
        if amount == 0 {
            return None;
        }
        let count = self.count_mut(kind);
        *count = count.saturating_add(amount);
        self.history.push(DeckEntry { kind, amount });
        self.last_touched = Some(kind);
        Some(Event::DeckIncremented {
            kind,
            amount,
            total: self.total(),
            at: Utc::now(),
        })
    }

    /// Pop the newest increment. No-op with an empty history.
    pub fn undo(&mut self) -> Option<Event> {
        let entry = self.history.pop()?;
        let count = self.count_mut(entry.kind);
        *count = count.saturating_sub(entry.amount);
        Some(Event::DeckUndone {
            kind: entry.kind,
            amount: entry.amount,
            total: self.total(),
            at: Utc::now(),
        })
    }

    pub fn reset(&mut self) -> Option<Event> {
        *self = Self::default();
        Some(Event::DeckReset { at: Utc::now() })
    }
}

impl Persisted for DeckCounter {
    const KEY: &'static str = "deckCheck";

    /// History is the ground truth: counts are rebuilt by replaying it.
    fn from_json(value: &Value) -> Self {
        let mut deck = Self::default();
        for entry in lenient::array(value, "history") {
            let kind = entry
                .get("type")
                .and_then(Value::as_str)
                .and_then(CounterKind::from_key);
            let amount = lenient::count(entry, "amount");
            if let Some(kind) = kind {
                deck.increment(kind, amount);
            }
        }
        deck.last_touched = None;

        let stored = value.get("counters").unwrap_or(&Value::Null);
        let disagrees = CounterKind::ALL
            .iter()
            .any(|&k| lenient::count(stored, k.key()) != deck.count(k));
        if disagrees {
            tracing::warn!("deck counters disagree with history, replaying history");
        }
        deck
    }

    fn to_json(&self) -> Value {
        json!({
            "counters": {
                "creatures": self.creatures,
                "trainer": self.trainer,
                "energy": self.energy,
            },
            "history": self.history,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn increments_and_total() {
        let mut deck = DeckCounter::new();
        deck.increment(CounterKind::Creature, 4);
        deck.increment(CounterKind::Trainer, 3);
        deck.increment(CounterKind::Energy, 2);
        assert_eq!(deck.total(), 9);
        assert_eq!(deck.status(), DeckStatus::Invalid);
        assert_eq!(deck.last_touched(), Some(CounterKind::Energy));
    }

    #[test]
    fn status_thresholds() {
        let mut deck = DeckCounter::new();
        assert_eq!(deck.status(), DeckStatus::Empty);
        deck.increment(CounterKind::Creature, 4);
        deck.increment(CounterKind::Trainer, 3);
        deck.increment(CounterKind::Energy, 2);
        deck.increment(CounterKind::Creature, 51);
        assert_eq!(deck.total(), 60);
        assert_eq!(deck.status(), DeckStatus::Valid);
        deck.increment(CounterKind::Energy, 1);
        assert_eq!(deck.status(), DeckStatus::Invalid);
    }

    #[test]
    fn custom_target() {
        let mut deck = DeckCounter::new();
        deck.increment(CounterKind::Creature, 40);
        assert_eq!(deck.status_for(40), DeckStatus::Valid);
        assert_eq!(deck.status_for(60), DeckStatus::Invalid);
    }

    #[test]
    fn undo_is_lifo() {
        let mut deck = DeckCounter::new();
        deck.increment(CounterKind::Creature, 3);
        deck.increment(CounterKind::Creature, 2);
        assert_eq!(deck.count(CounterKind::Creature), 5);
        deck.undo();
        assert_eq!(deck.count(CounterKind::Creature), 3);
        deck.undo();
        assert_eq!(deck.count(CounterKind::Creature), 0);
    }

    #[test]
    fn undo_on_empty_history_is_noop() {
        let mut deck = DeckCounter::new();
        assert!(deck.undo().is_none());
        assert_eq!(deck.total(), 0);
    }

    #[test]
    fn zero_amount_is_not_recorded() {
        let mut deck = DeckCounter::new();
        assert!(deck.increment(CounterKind::Trainer, 0).is_none());
        assert!(deck.history().is_empty());
    }

    #[test]
    fn reset_clears_everything() {
        let mut deck = DeckCounter::new();
        deck.increment(CounterKind::Trainer, 4);
        deck.reset();
        assert_eq!(deck.total(), 0);
        assert!(deck.history().is_empty());
        assert_eq!(deck.last_touched(), None);
    }

    #[test]
    fn persisted_shape() {
        let mut deck = DeckCounter::new();
        deck.increment(CounterKind::Creature, 4);
        deck.increment(CounterKind::Energy, 2);
        let v = deck.to_json();
        assert_eq!(v["counters"]["creatures"], 4);
        assert_eq!(v["counters"]["energy"], 2);
        assert_eq!(v["history"][0]["type"], "creatures");
        assert_eq!(v["history"][1]["amount"], 2);

        let loaded = DeckCounter::from_json(&v);
        assert_eq!(loaded.total(), 6);
        assert_eq!(loaded.history(), deck.history());
        assert_eq!(loaded.last_touched(), None);
    }

    #[test]
    fn from_json_replays_history_over_counters() {
        let deck = DeckCounter::from_json(&json!({
            "counters": { "creatures": 99 },
            "history": [{ "type": "creatures", "amount": 3 }, { "type": "bogus", "amount": 1 }],
        }));
        assert_eq!(deck.count(CounterKind::Creature), 3);
        assert_eq!(deck.history().len(), 1);
    }

    fn kind_strategy() -> impl Strategy<Value = CounterKind> {
        prop_oneof![
            Just(CounterKind::Creature),
            Just(CounterKind::Trainer),
            Just(CounterKind::Energy),
        ]
    }

    proptest! {
        #[test]
        fn undo_every_increment_returns_to_zero(
            ops in proptest::collection::vec((kind_strategy(), 1u32..=4), 0..64),
        ) {
            let mut deck = DeckCounter::new();
            for (kind, amount) in &ops {
                deck.increment(*kind, *amount);
            }
            for _ in &ops {
                deck.undo();
            }
            prop_assert_eq!(deck.total(), 0);
            prop_assert!(deck.history().is_empty());
        }

        #[test]
        fn counts_equal_history_replay(
            ops in proptest::collection::vec((kind_strategy(), 1u32..=4), 0..64),
            undos in 0usize..64,
        ) {
            let mut deck = DeckCounter::new();
            for (kind, amount) in &ops {
                deck.increment(*kind, *amount);
            }
            for _ in 0..undos {
                deck.undo();
            }
            for kind in CounterKind::ALL {
                let replay: u32 = deck
                    .history()
                    .iter()
                    .filter(|e| e.kind == kind)
                    .map(|e| e.amount)
                    .sum();
                prop_assert_eq!(deck.count(kind), replay);
            }
        }
    }
}
