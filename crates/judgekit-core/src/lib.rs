//! # Judgekit Core Library
//!
//! Core logic for a tournament judge's toolkit: a round timer, a per-turn
//! action ledger, a deck counter, and a log of time extensions. The
//! `judgekit` CLI is a thin layer over the same library.
//!
//! ## Architecture
//!
//! - **Round timer**: remaining time is derived from the wall-clock start
//!   instant, so every reader of the persisted record agrees on it. The
//!   caller drives [`RoundTimer::tick`], usually through a [`Ticker`].
//! - **Ledger / deck / extensions**: plain state machines whose commands
//!   return `Option<Event>`, `None` meaning the command was a no-op.
//! - **Storage**: every record is a JSON blob under a fixed key in a
//!   [`KeyValueStore`] (SQLite or in-memory); configuration is TOML.
//!
//! ## Key Components
//!
//! - [`RoundTimer`] / [`DisplaySession`]: round clock and its display mirror
//! - [`TurnLedger`]: table-judge turn tracking
//! - [`DeckCounter`]: deck check with undo
//! - [`ExtensionLedger`]: time extensions per round
//! - [`AppContext`]: locale, theme and navigation preferences

pub mod context;
pub mod deck;
pub mod error;
pub mod events;
pub mod extensions;
pub mod ledger;
pub mod storage;
pub mod timer;

pub use context::{AppContext, Locale, Tab, Theme};
pub use deck::{CounterKind, DeckCounter, DeckEntry, DeckStatus, DEFAULT_DECK_SIZE};
pub use error::{ConfigError, CoreError, StorageError, ValidationError};
pub use events::Event;
pub use extensions::{ExtensionLedger, RoundGroup, TimeExtension};
pub use ledger::{ActionCounts, ActionKind, Player, TurnLedger, TurnRecord, MAX_PRIZES};
pub use storage::{Config, Database, KeyValueStore, MemoryStore, Persisted};
pub use timer::{
    DisplayFrame, DisplaySession, Preset, RoundTimer, Ticker, TimerPhase, TimerZone,
};
