mod table;
mod turn;

pub use table::{live_pace, TurnLedger};
pub use turn::{history_pace, ActionCounts, ActionKind, Player, TurnRecord};

/// Prize cards a player can take in one game.
pub const MAX_PRIZES: u32 = 6;
