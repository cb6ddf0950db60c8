//! JSON document holding a whole ledger: a list of [HabitEntity]. The same document is stored on
//! disk and handed out by export, so anything exported can be imported back unchanged.

use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    error::{LedgerError, Result},
    utils::time::{date_to_key, key_to_date},
};

use super::{entities::HabitEntity, Habit, HabitId, Ledger};

impl Ledger {
    /// Human readable snapshot of the ledger, suitable for writing into a file.
    pub fn export_document(&self) -> Result<String> {
        let entities = self.habits.iter().map(HabitEntity::from).collect::<Vec<_>>();
        Ok(serde_json::to_string_pretty(&entities)?)
    }

    /// Decodes a document into a ledger. Fails only when the text isn't JSON or the top level
    /// value isn't a list. Elements that don't look like habits are skipped.
    pub fn parse_document(text: &str) -> Result<Ledger> {
        let value = serde_json::from_str::<Value>(text)
            .map_err(|e| LedgerError::InvalidFormat(format!("not a JSON document: {e}")))?;

        let Value::Array(items) = value else {
            return Err(LedgerError::InvalidFormat(format!(
                "expected a list of habits, found {}",
                value_kind(&value)
            )));
        };

        let habits = items
            .into_iter()
            .enumerate()
            .filter_map(|(index, item)| decode_item(index, item));
        Ok(Ledger::from_habits(habits))
    }

    /// A store that can't be decoded is the same as a store that has no data yet.
    pub fn decode_or_default(text: &str) -> Ledger {
        Self::parse_document(text).unwrap_or_else(|e| {
            warn!("Stored ledger is corrupt, starting with an empty one: {e}");
            Ledger::default()
        })
    }
}

fn decode_item(index: usize, item: Value) -> Option<Habit> {
    match serde_json::from_value::<HabitEntity>(item) {
        Ok(entity) => Habit::from_entity(entity).or_else(|| {
            warn!("Skipping habit at position {index}: blank id or name");
            None
        }),
        Err(e) => {
            warn!("Skipping habit at position {index}: {e}");
            None
        }
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

impl Habit {
    /// Uses the same checks as [Habit::new] and [HabitId::new], so any habit that can be built
    /// can also be decoded back.
    fn from_entity(entity: HabitEntity) -> Option<Habit> {
        let habit = Habit::new(HabitId::new(entity.id)?, &entity.name)?;

        let completions = entity
            .completions
            .into_keys()
            .filter_map(|key| {
                let date = key_to_date(&key);
                if date.is_none() {
                    debug!("Ignoring malformed date key {key:?} of habit {}", habit.id);
                }
                date
            })
            .collect::<Vec<_>>();

        Some(habit.with_completions(completions))
    }
}

impl From<&Habit> for HabitEntity {
    fn from(habit: &Habit) -> Self {
        HabitEntity {
            id: habit.id.as_str().to_owned(),
            name: habit.name.clone(),
            completions: habit
                .completions
                .iter()
                .map(|date| (date_to_key(*date), true))
                .collect(),
        }
    }
}
