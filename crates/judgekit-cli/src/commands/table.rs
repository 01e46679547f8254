use std::time::Duration;

use clap::{Subcommand, ValueEnum};
use judgekit_core::timer::format_turn_clock;
use judgekit_core::{ActionKind, Config, Database, Persisted, Player, Ticker, TurnLedger};
use serde_json::json;
use tokio::sync::mpsc;

use super::{print_json, print_outcome, runtime, CmdResult};

#[derive(Clone, Copy, ValueEnum)]
pub enum ActionArg {
    Supporter,
    Energy,
    Stadium,
    Retreat,
    Other,
}

impl From<ActionArg> for ActionKind {
    fn from(arg: ActionArg) -> Self {
        match arg {
            ActionArg::Supporter => ActionKind::Supporter,
            ActionArg::Energy => ActionKind::Energy,
            ActionArg::Stadium => ActionKind::Stadium,
            ActionArg::Retreat => ActionKind::Retreat,
            ActionArg::Other => ActionKind::OtherAction,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum PrizeArg {
    Up,
    Down,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum AutostartArg {
    Draw,
    NextTurn,
}

#[derive(Subcommand)]
pub enum TableAction {
    /// Print the current turn as JSON
    Status,
    /// Record an action for the current turn
    Add {
        #[arg(value_enum)]
        kind: ActionArg,
    },
    /// Take back an action
    Remove {
        #[arg(value_enum)]
        kind: ActionArg,
    },
    /// Toggle the draw flag
    Draw,
    /// Adjust prize cards taken this turn
    Prize {
        #[arg(value_enum)]
        direction: PrizeArg,
    },
    /// Start the turn stopwatch
    Start,
    /// Stop the turn stopwatch
    Stop,
    /// Close the turn and pass to the other player
    NextTurn,
    /// Start a fresh game, keeping autostart preferences
    ClearAll,
    /// Toggle an autostart preference
    Autostart {
        #[arg(value_enum)]
        trigger: AutostartArg,
    },
    /// Print closed turns, newest first
    History,
    /// Run the turn stopwatch until it stops or Ctrl-C
    Run,
}

pub fn run(action: TableAction) -> CmdResult {
    let db = Database::open()?;
    let mut ledger = TurnLedger::load(&db);

    let event = match action {
        TableAction::Status => return print_json(&ledger.snapshot()),
        TableAction::History => return print_history(&ledger),
        TableAction::Run => {
            let config = Config::load_or_default();
            return runtime()?.block_on(run_stopwatch(&db, &config));
        }
        TableAction::Add { kind } => ledger.increment_action(kind.into()),
        TableAction::Remove { kind } => ledger.decrement_action(kind.into()),
        TableAction::Draw => ledger.toggle_draw(),
        TableAction::Prize { direction: PrizeArg::Up } => ledger.increment_prize(),
        TableAction::Prize { direction: PrizeArg::Down } => ledger.decrement_prize(),
        TableAction::Start => ledger.start_timer(),
        TableAction::Stop => ledger.stop_timer(),
        TableAction::NextTurn => ledger.close_turn(),
        TableAction::ClearAll => ledger.clear_all(),
        TableAction::Autostart { trigger: AutostartArg::Draw } => ledger.toggle_autostart_draw(),
        TableAction::Autostart { trigger: AutostartArg::NextTurn } => {
            ledger.toggle_autostart_next_turn()
        }
    };

    ledger.save(&db)?;
    print_outcome(event, || ledger.snapshot())
}

fn print_history(ledger: &TurnLedger) -> CmdResult {
    let turns: Vec<_> = ledger
        .history()
        .iter()
        .map(|record| {
            json!({
                "record": record,
                "actions": record.total_actions(),
                "clock": record.clock(),
                "pace": record.pace(),
            })
        })
        .collect();
    print_json(&turns)
}

fn status_line(ledger: &TurnLedger) -> String {
    let player = match ledger.current_player() {
        Player::One => 1,
        Player::Two => 2,
    };
    format!(
        "P{player} turn {}  {}  actions {}  pace {}s{}",
        ledger.turn_number(),
        format_turn_clock(ledger.timer_seconds()),
        ledger.action_total(),
        ledger.pace(),
        if ledger.draw() { "  draw" } else { "" },
    )
}

async fn run_stopwatch(db: &Database, config: &Config) -> CmdResult {
    let mut ledger = TurnLedger::load(db);
    if ledger.start_timer().is_some() {
        ledger.save(db)?;
    }
    println!("{}", status_line(&ledger));

    let period = Duration::from_millis(config.round_timer.tick_interval_ms.max(1));
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut ticker = Ticker::idle();
    ticker.start(period, move || {
        let _ = tx.send(());
    });

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                // Nothing ticks once we exit, so the stored flag must not say running.
                let mut ledger = TurnLedger::load(db);
                if ledger.stop_timer().is_some() {
                    ledger.save(db)?;
                }
                break;
            }
            tick = rx.recv() => {
                if tick.is_none() {
                    break;
                }
                // Another invocation may have stopped the clock or closed the turn.
                let mut ledger = TurnLedger::load(db);
                if !ledger.timer_running() {
                    break;
                }
                ledger.tick();
                ledger.save(db)?;
                println!("{}", status_line(&ledger));
            }
        }
    }
    ticker.cancel();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_line_shows_turn_and_pace() {
        let mut ledger = TurnLedger::new();
        ledger.increment_action(ActionKind::Energy);
        ledger.increment_action(ActionKind::OtherAction);
        ledger.start_timer();
        for _ in 0..65 {
            ledger.tick();
        }
        ledger.toggle_draw();
        assert_eq!(status_line(&ledger), "P1 turn 1  1:05  actions 2  pace 32s  draw");
    }
}
