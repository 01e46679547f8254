use std::time::Duration;

use clap::{Subcommand, ValueEnum};
use judgekit_core::storage::DisplayConfig;
use judgekit_core::timer::{now_ms, DisplayFrame};
use judgekit_core::{Config, Database, DisplaySession, Persisted, Preset, RoundTimer, Ticker};
use tokio::sync::mpsc;

use super::{print_json, print_outcome, runtime, CmdResult};

#[derive(Clone, Copy, ValueEnum)]
pub enum PresetArg {
    Bo1,
    Bo3,
    TopCut,
}

impl From<PresetArg> for Preset {
    fn from(arg: PresetArg) -> Self {
        match arg {
            PresetArg::Bo1 => Preset::Bo1,
            PresetArg::Bo3 => Preset::Bo3,
            PresetArg::TopCut => Preset::TopCut,
        }
    }
}

#[derive(Subcommand)]
pub enum TimerAction {
    /// Print current timer state as JSON
    Status,
    /// Set the round name
    Name {
        /// Round label, e.g. "Round 3"
        name: String,
    },
    /// Configure from a tournament preset
    Preset {
        #[arg(value_enum)]
        preset: PresetArg,
    },
    /// Configure a custom duration
    Set {
        /// Minutes, decimals allowed (e.g. "0.5")
        minutes: String,
    },
    /// Start or resume the countdown
    Start,
    /// Pause the countdown
    Pause,
    /// Return to the configured duration
    Reset,
    /// Show the display mirror
    Display {
        /// Keep redrawing every tick until the timer stops or Ctrl-C
        #[arg(long)]
        follow: bool,
        /// Start the countdown from the display
        #[arg(long, conflicts_with_all = ["pause", "reset"])]
        start: bool,
        /// Pause the countdown from the display
        #[arg(long, conflicts_with = "reset")]
        pause: bool,
        /// Reset the countdown from the display
        #[arg(long)]
        reset: bool,
    },
}

/// Button pressed on the display surface, if any.
#[derive(Clone, Copy)]
enum DisplayControl {
    Start,
    Pause,
    Reset,
}

impl DisplayControl {
    fn from_flags(start: bool, pause: bool, reset: bool) -> Option<Self> {
        match (start, pause, reset) {
            (true, _, _) => Some(DisplayControl::Start),
            (_, true, _) => Some(DisplayControl::Pause),
            (_, _, true) => Some(DisplayControl::Reset),
            _ => None,
        }
    }
}

pub fn run(action: TimerAction) -> CmdResult {
    let db = Database::open()?;
    let mut timer = RoundTimer::load(&db);

    let event = match action {
        TimerAction::Status => {
            // Loading already recomputed the remaining value.
            return print_json(&timer.snapshot());
        }
        TimerAction::Display { follow, start, pause, reset } => {
            let control = DisplayControl::from_flags(start, pause, reset);
            return run_display(&db, control, follow);
        }
        TimerAction::Name { name } => timer.set_round_name(&name),
        TimerAction::Preset { preset } => {
            let config = Config::load_or_default();
            let preset = Preset::from(preset);
            timer.configure_preset(preset, config.round_timer.preset_minutes(preset))
        }
        TimerAction::Set { minutes } => timer.configure_minutes(&minutes),
        TimerAction::Start => timer.start(),
        TimerAction::Pause => timer.pause(),
        TimerAction::Reset => timer.reset(),
    };

    if timer.is_worth_saving() {
        timer.save(&db)?;
    }
    print_outcome(event, || timer.snapshot())
}

/// One text line for the display mirror: name, clock, and a progress bar
/// that switches to an overtime bar once the clock passes zero.
fn render_line(frame: &DisplayFrame, display: &DisplayConfig) -> String {
    let width = display.bar_width as usize;
    let (fraction, fill, label) = if frame.is_overtime {
        (frame.overtime_fraction, '!', display.overtime_label.as_str())
    } else {
        (frame.countdown_fraction, '#', "")
    };
    let filled = ((fraction * width as f64).round() as usize).min(width);
    let bar: String = std::iter::repeat(fill)
        .take(filled)
        .chain(std::iter::repeat('.').take(width - filled))
        .collect();
    let name = if frame.round_name.is_empty() { "-" } else { frame.round_name.as_str() };
    format!("{name}  {:>7}  [{bar}] {label}", frame.clock)
        .trim_end()
        .to_string()
}

/// Open the display surface, apply its control if one was pressed, and
/// write back only the ticking fields.
fn run_display(db: &Database, control: Option<DisplayControl>, follow: bool) -> CmdResult {
    let mut display = DisplaySession::open(db);
    let now = now_ms();
    let event = match control {
        Some(DisplayControl::Start) => display.start_at(now),
        Some(DisplayControl::Pause) => display.pause_at(now),
        Some(DisplayControl::Reset) => display.reset(),
        None => None,
    };
    if event.is_some() {
        display.write_back(db)?;
    }

    if follow {
        let config = Config::load_or_default();
        return runtime()?.block_on(follow_display(db, display, &config));
    }
    match event {
        Some(event) => print_json(&event),
        None => print_json(&display.frame_at(now)),
    }
}

async fn follow_display(db: &Database, mut display: DisplaySession, config: &Config) -> CmdResult {
    let frame = display.frame();
    println!("{}", render_line(&frame, &config.display));
    if !display.timer().is_running() {
        return Ok(());
    }

    let period = Duration::from_millis(config.round_timer.tick_interval_ms.max(1));
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut ticker = Ticker::idle();
    ticker.start(period, move || {
        let _ = tx.send(());
    });

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            tick = rx.recv() => {
                if tick.is_none() {
                    break;
                }
                let now = now_ms();
                if let Some(event) = display.tick_at(now) {
                    tracing::info!(?event, "round time expired");
                }
                // Pick up pauses and resets made from the control surface.
                display.refresh(db);
                let frame = display.frame_at(now);
                println!("{}", render_line(&frame, &config.display));
                if !frame.is_running {
                    break;
                }
            }
        }
    }
    ticker.cancel();
    Ok(())
}
