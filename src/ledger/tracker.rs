use chrono::NaiveDate;
use tracing::{info, instrument, warn};

use crate::{error::Result, streak::current_streak, utils::clock::Clock};

use super::{storage::LedgerStorage, Habit, HabitId, Ledger};

/// Owns the ledger for one session. Every mutation is persisted through `storage` before the
/// call returns; if saving fails the in-memory ledger is left as it was before the call.
pub struct HabitTracker<S: LedgerStorage> {
    storage: S,
    ledger: Ledger,
    date_provider: Box<dyn Clock>,
}

impl<S: LedgerStorage> HabitTracker<S> {
    /// Loads the stored ledger. A missing or corrupt store opens as an empty tracker.
    pub async fn open(storage: S, date_provider: Box<dyn Clock>) -> Self {
        let ledger = storage.load().await;
        Self {
            storage,
            ledger,
            date_provider,
        }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn today(&self) -> NaiveDate {
        self.date_provider.today()
    }

    /// Habits in order together with their current streak.
    pub fn streaks(&self) -> impl Iterator<Item = (&Habit, u32)> {
        let today = self.today();
        self.ledger
            .habits()
            .iter()
            .map(move |habit| (habit, current_streak(habit, today)))
    }

    #[instrument(skip(self))]
    pub async fn add_habit(&mut self, name: &str) -> Result<Option<HabitId>> {
        let mut candidate = self.ledger.clone();
        let Some(id) = candidate.add_habit(name) else {
            return Ok(None);
        };
        self.commit(candidate).await?;
        info!("Added habit {id}");
        Ok(Some(id))
    }

    #[instrument(skip(self))]
    pub async fn toggle_completion(&mut self, id: &HabitId, date: NaiveDate) -> Result<Option<bool>> {
        let mut candidate = self.ledger.clone();
        let Some(completed) = candidate.toggle_completion(id, date) else {
            return Ok(None);
        };
        self.commit(candidate).await?;
        Ok(Some(completed))
    }

    /// Marks today as completed. Returns `false` when there is no such habit.
    #[instrument(skip(self))]
    pub async fn tick_today(&mut self, id: &HabitId) -> Result<bool> {
        let today = self.today();
        let mut candidate = self.ledger.clone();
        if !candidate.mark_completed(id, today) {
            return Ok(false);
        }
        self.commit(candidate).await?;
        Ok(true)
    }

    #[instrument(skip(self))]
    pub async fn remove_habit(&mut self, id: &HabitId) -> Result<Option<Habit>> {
        let mut candidate = self.ledger.clone();
        let Some(removed) = candidate.remove_habit(id) else {
            return Ok(None);
        };
        self.commit(candidate).await?;
        info!("Removed habit {id} {:?}", removed.name());
        Ok(Some(removed))
    }

    pub fn export_document(&self) -> Result<String> {
        self.ledger.export_document()
    }

    /// Replaces the whole ledger with the one in `text`. Returns the number of habits imported.
    /// On [crate::error::LedgerError::InvalidFormat] nothing changes.
    #[instrument(skip_all)]
    pub async fn import_document(&mut self, text: &str) -> Result<usize> {
        let imported = Ledger::parse_document(text).inspect_err(|e| warn!("Rejected import {e}"))?;
        let count = imported.len();
        self.commit(imported).await?;
        info!("Imported {count} habits");
        Ok(count)
    }

    #[instrument(skip(self))]
    pub async fn reset(&mut self) -> Result<()> {
        self.commit(Ledger::default()).await?;
        info!("Ledger reset");
        Ok(())
    }

    async fn commit(&mut self, candidate: Ledger) -> Result<()> {
        self.storage.save(&candidate).await?;
        self.ledger = candidate;
        Ok(())
    }
}
