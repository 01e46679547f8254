//! Action kinds, per-turn counters, and closed-turn records.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::storage::lenient;
use crate::timer::format_turn_clock;

/// Something a player does during a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionKind {
    Supporter,
    Energy,
    Stadium,
    Retreat,
    OtherAction,
}

impl ActionKind {
    pub const ALL: [ActionKind; 5] = [
        ActionKind::Supporter,
        ActionKind::Energy,
        ActionKind::Stadium,
        ActionKind::Retreat,
        ActionKind::OtherAction,
    ];

    /// Kinds limited to one use per turn.
    pub const ONCE_PER_TURN: [ActionKind; 4] = [
        ActionKind::Supporter,
        ActionKind::Energy,
        ActionKind::Stadium,
        ActionKind::Retreat,
    ];

    pub fn is_once_per_turn(self) -> bool {
        !matches!(self, ActionKind::OtherAction)
    }

    /// Field name used in persisted records.
    pub fn key(self) -> &'static str {
        match self {
            ActionKind::Supporter => "supporter",
            ActionKind::Energy => "energy",
            ActionKind::Stadium => "stadium",
            ActionKind::Retreat => "retreat",
            ActionKind::OtherAction => "otherAction",
        }
    }
}

/// Counters for the five action kinds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionCounts {
    pub supporter: u32,
    pub energy: u32,
    pub stadium: u32,
    pub retreat: u32,
    pub other_action: u32,
}

impl ActionCounts {
    pub fn get(&self, kind: ActionKind) -> u32 {
        match kind {
            ActionKind::Supporter => self.supporter,
            ActionKind::Energy => self.energy,
            ActionKind::Stadium => self.stadium,
            ActionKind::Retreat => self.retreat,
            ActionKind::OtherAction => self.other_action,
        }
    }

    pub(crate) fn get_mut(&mut self, kind: ActionKind) -> &mut u32 {
        match kind {
            ActionKind::Supporter => &mut self.supporter,
            ActionKind::Energy => &mut self.energy,
            ActionKind::Stadium => &mut self.stadium,
            ActionKind::Retreat => &mut self.retreat,
            ActionKind::OtherAction => &mut self.other_action,
        }
    }

    pub fn total(&self) -> u32 {
        ActionKind::ALL.iter().map(|&k| self.get(k)).sum()
    }

    pub(crate) fn from_json(value: &Value) -> Self {
        let mut counts = Self::default();
        for kind in ActionKind::ALL {
            *counts.get_mut(kind) = lenient::count(value, kind.key());
        }
        counts
    }
}

/// Seat at the table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Player {
    #[default]
    One,
    Two,
}

impl Player {
    pub fn other(self) -> Self {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    /// Anything other than `2` reads as player one.
    pub(crate) fn from_number(n: i64) -> Self {
        if n == 2 {
            Player::Two
        } else {
            Player::One
        }
    }
}

impl From<Player> for u8 {
    fn from(player: Player) -> Self {
        match player {
            Player::One => 1,
            Player::Two => 2,
        }
    }
}

impl TryFrom<u8> for Player {
    type Error = String;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        match n {
            1 => Ok(Player::One),
            2 => Ok(Player::Two),
            other => Err(format!("player must be 1 or 2, got {other}")),
        }
    }
}

/// Immutable snapshot of a closed turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnRecord {
    pub player: Player,
    pub turn_number: u32,
    #[serde(flatten)]
    pub counts: ActionCounts,
    pub draw: bool,
    pub prizes: u32,
    pub timer_seconds: u64,
}

impl TurnRecord {
    pub fn total_actions(&self) -> u32 {
        self.counts.total()
    }

    /// Seconds per action for the history list, rounded to nearest with
    /// halves rounding up. The live ledger floors instead; see
    /// [`super::live_pace`].
    pub fn pace(&self) -> u64 {
        history_pace(self.timer_seconds, self.total_actions())
    }

    /// Turn duration as `M:SS`.
    pub fn clock(&self) -> String {
        format_turn_clock(self.timer_seconds)
    }

    pub(crate) fn from_json(value: &Value) -> Self {
        Self {
            player: Player::from_number(lenient::int(value, "player", 1)),
            turn_number: lenient::count(value, "turnNumber").max(1),
            counts: ActionCounts::from_json(value),
            draw: lenient::boolean(value, "draw", false),
            prizes: lenient::count(value, "prizes").min(super::MAX_PRIZES),
            timer_seconds: lenient::int(value, "timerSeconds", 0).max(0) as u64,
        }
    }
}

/// `round(seconds / actions)`, or 0 with no actions.
pub fn history_pace(timer_seconds: u64, actions: u32) -> u64 {
    if actions == 0 {
        return 0;
    }
    let n = u64::from(actions);
    let (q, r) = (timer_seconds / n, timer_seconds % n);
    q + u64::from(r >= n - r)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn once_per_turn_kinds() {
        for kind in ActionKind::ONCE_PER_TURN {
            assert!(kind.is_once_per_turn());
        }
        assert!(!ActionKind::OtherAction.is_once_per_turn());
    }

    #[test]
    fn history_pace_rounds_to_nearest() {
        assert_eq!(history_pace(50, 3), 17);
        assert_eq!(history_pace(49, 3), 16);
        assert_eq!(history_pace(5, 2), 3);
        assert_eq!(history_pace(100, 0), 0);
    }

    #[test]
    fn history_pace_handles_huge_durations() {
        let t = u64::MAX >> 1;
        assert_eq!(history_pace(t, 2), t / 2 + 1);
        assert_eq!(history_pace(u64::MAX, 1), u64::MAX);

        let record = TurnRecord::from_json(&json!({
            "timerSeconds": 9_223_372_036_854_775_807_i64,
            "otherAction": 2,
        }));
        assert_eq!(record.pace(), t / 2 + 1);
    }

    #[test]
    fn player_alternates() {
        assert_eq!(Player::One.other(), Player::Two);
        assert_eq!(Player::Two.other().other(), Player::Two);
    }

    #[test]
    fn record_serializes_flat_with_numeric_player() {
        let record = TurnRecord {
            player: Player::Two,
            turn_number: 4,
            counts: ActionCounts {
                other_action: 3,
                ..ActionCounts::default()
            },
            draw: true,
            prizes: 1,
            timer_seconds: 50,
        };
        let v = serde_json::to_value(&record).unwrap();
        assert_eq!(v["player"], 2);
        assert_eq!(v["turnNumber"], 4);
        assert_eq!(v["otherAction"], 3);
        assert_eq!(v["timerSeconds"], 50);
        assert_eq!(TurnRecord::from_json(&v), record);
    }

    #[test]
    fn record_from_partial_json() {
        let record = TurnRecord::from_json(&json!({ "energy": 1, "player": 7, "prizes": 9 }));
        assert_eq!(record.player, Player::One);
        assert_eq!(record.turn_number, 1);
        assert_eq!(record.counts.energy, 1);
        assert_eq!(record.prizes, 6);
        assert_eq!(record.pace(), 0);
        assert_eq!(record.clock(), "0:00");
    }
}
