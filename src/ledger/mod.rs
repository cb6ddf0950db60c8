//! The ledger is the list of habits together with the days each one was completed.
//!
//!  - [Ledger] is an owned value, every mutation goes through its methods.
//!  - [tracker::HabitTracker] pairs a ledger with a [storage::LedgerStorage] and persists after
//!    every mutation.
//!  - [document] converts a ledger to and from the JSON document used both on disk and for
//!    import/export.

pub mod document;
pub mod entities;
pub mod storage;
pub mod tracker;

use std::{collections::BTreeSet, fmt::Display};

use chrono::NaiveDate;
use tracing::{debug, warn};
use uuid::Uuid;

/// Opaque identifier of a habit. Assigned once on creation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HabitId(String);

impl HabitId {
    const GENERATED_LENGTH: usize = 8;

    /// `None` for an empty id, which can't be stored.
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        (!id.is_empty()).then_some(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short random id. Shorter ids are easier to type on the command line; collisions are
    /// handled by [Ledger::add_habit].
    fn generate() -> Self {
        let mut id = Uuid::new_v4().simple().to_string();
        id.truncate(Self::GENERATED_LENGTH);
        Self(id)
    }
}

impl Display for HabitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Habit {
    id: HabitId,
    name: String,
    completions: BTreeSet<NaiveDate>,
}

impl Habit {
    /// A habit with no completions. The name is trimmed, and a blank one gives `None`.
    pub fn new(id: HabitId, name: &str) -> Option<Self> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        Some(Self {
            id,
            name: name.to_owned(),
            completions: BTreeSet::new(),
        })
    }

    pub fn with_completions(self, completions: impl IntoIterator<Item = NaiveDate>) -> Self {
        Self {
            completions: completions.into_iter().collect(),
            ..self
        }
    }

    pub fn id(&self) -> &HabitId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn completions(&self) -> &BTreeSet<NaiveDate> {
        &self.completions
    }

    pub fn is_completed_on(&self, date: NaiveDate) -> bool {
        self.completions.contains(&date)
    }

    /// Returns whether the day is completed after the flip.
    fn toggle(&mut self, date: NaiveDate) -> bool {
        if self.completions.remove(&date) {
            false
        } else {
            self.completions.insert(date);
            true
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    habits: Vec<Habit>,
}

impl Ledger {
    /// Builds a ledger keeping the given order. When ids repeat only the first habit is kept.
    pub fn from_habits(habits: impl IntoIterator<Item = Habit>) -> Self {
        let mut ledger = Ledger::default();
        for habit in habits {
            if ledger.get(habit.id()).is_some() {
                warn!("Dropping habit {:?}, id {} is already taken", habit.name, habit.id);
                continue;
            }
            ledger.habits.push(habit);
        }
        ledger
    }

    pub fn habits(&self) -> &[Habit] {
        &self.habits
    }

    pub fn is_empty(&self) -> bool {
        self.habits.is_empty()
    }

    pub fn len(&self) -> usize {
        self.habits.len()
    }

    pub fn get(&self, id: &HabitId) -> Option<&Habit> {
        self.habits.iter().find(|habit| habit.id == *id)
    }

    fn get_mut(&mut self, id: &HabitId) -> Option<&mut Habit> {
        let habit = self.habits.iter_mut().find(|habit| habit.id == *id);
        if habit.is_none() {
            debug!("No habit with id {id}");
        }
        habit
    }

    /// Resolves a habit by id, falling back to the first habit with exactly that name.
    pub fn find(&self, selector: &str) -> Option<&Habit> {
        let selector = selector.trim();
        self.habits
            .iter()
            .find(|habit| habit.id.as_str() == selector)
            .or_else(|| self.habits.iter().find(|habit| habit.name == selector))
    }

    /// Appends a habit named `name` (trimmed). A blank name leaves the ledger as it was.
    pub fn add_habit(&mut self, name: &str) -> Option<HabitId> {
        let id = loop {
            let id = HabitId::generate();
            if self.get(&id).is_none() {
                break id;
            }
        };

        let Some(habit) = Habit::new(id, name) else {
            debug!("Ignoring habit with an empty name");
            return None;
        };
        let id = habit.id.clone();
        self.habits.push(habit);
        Some(id)
    }

    /// Flips a day. Returns the new state of the day, or `None` if there is no such habit.
    pub fn toggle_completion(&mut self, id: &HabitId, date: NaiveDate) -> Option<bool> {
        self.get_mut(id).map(|habit| habit.toggle(date))
    }

    /// Marks a day as completed regardless of its current state. Returns `false` if there is no
    /// such habit.
    pub fn mark_completed(&mut self, id: &HabitId, date: NaiveDate) -> bool {
        match self.get_mut(id) {
            Some(habit) => {
                habit.completions.insert(date);
                true
            }
            None => false,
        }
    }

    pub fn remove_habit(&mut self, id: &HabitId) -> Option<Habit> {
        let position = self.habits.iter().position(|habit| habit.id == *id);
        if position.is_none() {
            debug!("No habit with id {id} to remove");
        }
        position.map(|index| self.habits.remove(index))
    }
}
