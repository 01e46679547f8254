//! Time extensions granted to tables, grouped per round.

use std::cmp::Ordering;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::events::Event;
use crate::storage::{lenient, Persisted};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeExtension {
    pub id: String,
    pub round: String,
    pub table: String,
    pub minutes: i64,
}

/// Extensions for one round, in the order they were granted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundGroup<'a> {
    pub round: &'a str,
    pub extensions: Vec<&'a TimeExtension>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensionLedger {
    extensions: Vec<TimeExtension>,
}

fn parse_minutes(input: &str) -> Option<i64> {
    input.trim().parse::<i64>().ok()
}

/// Numeric rounds sort numerically; anything else falls back to text order.
fn compare_rounds(a: &str, b: &str) -> Ordering {
    match (a.parse::<i64>(), b.parse::<i64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        _ => a.cmp(b),
    }
}

impl ExtensionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extensions(&self) -> &[TimeExtension] {
        &self.extensions
    }

    pub fn get(&self, id: &str) -> Option<&TimeExtension> {
        self.extensions.iter().find(|e| e.id == id)
    }

    /// Record a new extension from raw form input. Blank fields or
    /// non-integer minutes leave the ledger unchanged.
    pub fn add(&mut self, round: &str, table: &str, minutes: &str) -> Option<Event> {
        let (round, table) = (round.trim(), table.trim());
        if round.is_empty() || table.is_empty() {
            return None;
        }
        let minutes = parse_minutes(minutes)?;
        let extension = TimeExtension {
            id: Uuid::new_v4().to_string(),
            round: round.to_string(),
            table: table.to_string(),
            minutes,
        };
        self.extensions.push(extension.clone());
        Some(Event::ExtensionAdded {
            extension,
            at: Utc::now(),
        })
    }

    pub fn update_minutes(&mut self, id: &str, minutes: &str) -> Option<Event> {
        let minutes = parse_minutes(minutes)?;
        let extension = self.extensions.iter_mut().find(|e| e.id == id)?;
        extension.minutes = minutes;
        Some(Event::ExtensionUpdated {
            id: id.to_string(),
            minutes,
            at: Utc::now(),
        })
    }

    pub fn remove(&mut self, id: &str) -> Option<Event> {
        let index = self.extensions.iter().position(|e| e.id == id)?;
        self.extensions.remove(index);
        Some(Event::ExtensionRemoved {
            id: id.to_string(),
            at: Utc::now(),
        })
    }

    pub fn grouped_by_round(&self) -> Vec<RoundGroup<'_>> {
        let mut groups: Vec<RoundGroup<'_>> = Vec::new();
        for ext in &self.extensions {
            match groups.iter_mut().find(|g| g.round == ext.round) {
                Some(group) => group.extensions.push(ext),
                None => groups.push(RoundGroup {
                    round: &ext.round,
                    extensions: vec![ext],
                }),
            }
        }
        groups.sort_by(|a, b| compare_rounds(a.round, b.round));
        groups
    }
}

impl Persisted for ExtensionLedger {
    const KEY: &'static str = "timeExtensions";

    fn from_json(value: &Value) -> Self {
        let extensions = value
            .as_array()
            .map(Vec::as_slice)
            .unwrap_or(&[])
            .iter()
            .filter(|v| v.is_object())
            .map(|v| TimeExtension {
                id: lenient::string(v, "id"),
                round: lenient::string(v, "round"),
                table: lenient::string(v, "table"),
                minutes: lenient::int(v, "minutes", 0),
            })
            .filter(|e| !e.id.is_empty())
            .collect();
        Self { extensions }
    }

    fn to_json(&self) -> Value {
        serde_json::to_value(&self.extensions).unwrap_or_else(|_| Value::Array(Vec::new()))
    }
}
