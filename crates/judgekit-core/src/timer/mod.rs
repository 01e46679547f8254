mod display;
mod format;
mod round;
mod ticker;

pub use display::{countdown_fraction, overtime_fraction, DisplayFrame, DisplaySession};
pub use format::{format_clock, format_turn_clock};
pub use round::{now_ms, Preset, RoundTimer, TimerPhase, TimerZone};
pub use ticker::Ticker;
