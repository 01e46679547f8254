pub mod config;
pub mod context;
pub mod deck;
pub mod extension;
pub mod table;
pub mod timer;

use judgekit_core::Event;
use serde::Serialize;

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print the event a command produced, or `fallback` when it was a no-op.
pub(crate) fn print_outcome(event: Option<Event>, fallback: impl FnOnce() -> Event) -> CmdResult {
    match event {
        Some(event) => print_json(&event),
        None => {
            tracing::debug!("command left state unchanged");
            print_json(&fallback())
        }
    }
}

/// Build a current-thread runtime for the follow loops.
pub(crate) fn runtime() -> std::io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
}
