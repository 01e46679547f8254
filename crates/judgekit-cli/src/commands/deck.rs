use clap::{Subcommand, ValueEnum};
use judgekit_core::{Config, CounterKind, Database, DeckCounter, Persisted};
use serde_json::{json, Value};

use super::{print_json, CmdResult};

#[derive(Clone, Copy, ValueEnum)]
pub enum KindArg {
    Creatures,
    Trainer,
    Energy,
}

impl From<KindArg> for CounterKind {
    fn from(arg: KindArg) -> Self {
        match arg {
            KindArg::Creatures => CounterKind::Creature,
            KindArg::Trainer => CounterKind::Trainer,
            KindArg::Energy => CounterKind::Energy,
        }
    }
}

#[derive(Subcommand)]
pub enum DeckAction {
    /// Print counters, total and validity
    Status,
    /// Count cards of one kind
    Add {
        #[arg(value_enum)]
        kind: KindArg,
        /// Cards to add
        amount: u32,
    },
    /// Take back the most recent addition
    Undo,
    /// Clear all counters and history
    Reset,
}

fn summary(deck: &DeckCounter, target: u32) -> Value {
    json!({
        "creatures": deck.count(CounterKind::Creature),
        "trainer": deck.count(CounterKind::Trainer),
        "energy": deck.count(CounterKind::Energy),
        "total": deck.total(),
        "target": target,
        "status": deck.status_for(target),
        "undoable": deck.history().len(),
    })
}

pub fn run(action: DeckAction) -> CmdResult {
    let db = Database::open()?;
    let config = Config::load_or_default();
    let target = config.deck.target_size;
    let mut deck = DeckCounter::load(&db);

    let event = match action {
        DeckAction::Status => return print_json(&summary(&deck, target)),
        DeckAction::Add { kind, amount } => {
            if !config.deck.quick_increments.contains(&amount) {
                tracing::debug!(amount, "amount is not one of the quick increments");
            }
            deck.increment(kind.into(), amount)
        }
        DeckAction::Undo => deck.undo(),
        DeckAction::Reset => deck.reset(),
    };

    deck.save(&db)?;
    print_json(&json!({
        "event": event,
        "deck": summary(&deck, target),
    }))
}
