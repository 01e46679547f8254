use clap::Subcommand;
use judgekit_core::{Database, ExtensionLedger, Persisted, ValidationError};

use super::{print_json, CmdResult};

#[derive(Subcommand)]
pub enum ExtensionAction {
    /// List extensions grouped by round
    List,
    /// Grant an extension to a table
    Add {
        #[arg(long)]
        round: String,
        #[arg(long)]
        table: String,
        /// Whole minutes
        #[arg(long)]
        minutes: String,
    },
    /// Change the minutes of an extension
    Edit {
        id: String,
        minutes: String,
    },
    /// Delete an extension
    Delete {
        id: String,
    },
}

fn invalid(field: &str, message: impl Into<String>) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.to_string(),
        message: message.into(),
    }
}

pub fn run(action: ExtensionAction) -> CmdResult {
    let db = Database::open()?;
    let mut ledger = ExtensionLedger::load(&db);

    let event = match action {
        ExtensionAction::List => return print_json(&ledger.grouped_by_round()),
        ExtensionAction::Add { round, table, minutes } => ledger
            .add(&round, &table, &minutes)
            .ok_or_else(|| invalid("extension", "round and table are required and minutes must be a whole number"))?,
        ExtensionAction::Edit { id, minutes } => {
            if ledger.get(&id).is_none() {
                return Err(invalid("id", format!("no extension with id {id}")).into());
            }
            ledger
                .update_minutes(&id, &minutes)
                .ok_or_else(|| invalid("minutes", format!("'{minutes}' is not a whole number")))?
        }
        ExtensionAction::Delete { id } => ledger
            .remove(&id)
            .ok_or_else(|| invalid("id", format!("no extension with id {id}")))?,
    };

    ledger.save(&db)?;
    print_json(&event)
}
