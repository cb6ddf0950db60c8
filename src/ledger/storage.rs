use std::{
    future::Future,
    io::ErrorKind,
    ops::Deref,
    path::{Path, PathBuf},
};

use fs4::tokio::AsyncFileExt;
use tokio::fs::{self, File};
use tracing::{debug, error, info};

use crate::{error::Result, fs::operations::write_atomically};

use super::Ledger;

pub const LEDGER_FILE_NAME: &str = "habits.json";
const LOCK_FILE_NAME: &str = "habits.lock";

/// Interface for abstracting where the ledger lives.
pub trait LedgerStorage {
    /// Reads the stored ledger. Missing or unreadable data is an empty ledger, never an error.
    fn load(&self) -> impl Future<Output = Ledger>;

    /// Replaces whatever was stored with `ledger`. Either the whole ledger is written or an
    /// error is returned.
    fn save(&self, ledger: &Ledger) -> impl Future<Output = Result<()>>;
}

impl<T: Deref> LedgerStorage for T
where
    T::Target: LedgerStorage,
{
    fn load(&self) -> impl Future<Output = Ledger> {
        self.deref().load()
    }

    fn save(&self, ledger: &Ledger) -> impl Future<Output = Result<()>> {
        self.deref().save(ledger)
    }
}

/// The main realization of [LedgerStorage]: one JSON document inside the application directory.
pub struct LedgerFileStorage {
    path: PathBuf,
    lock_path: PathBuf,
}

impl LedgerFileStorage {
    pub fn new(dir: PathBuf) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(&dir)?;

        Ok(Self {
            path: dir.join(LEDGER_FILE_NAME),
            lock_path: dir.join(LOCK_FILE_NAME),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The document itself is swapped by rename, so locks are taken on a sidecar file that
    /// stays in place.
    async fn open_lock(&self) -> Result<File, std::io::Error> {
        File::options()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.lock_path)
            .await
    }

    async fn read_document(&self) -> Result<Option<String>, std::io::Error> {
        let lock = self.open_lock().await?;
        lock.lock_shared()?;
        let read = fs::read_to_string(&self.path).await;
        lock.unlock_async().await?;

        match read {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }
}

impl LedgerStorage for LedgerFileStorage {
    async fn load(&self) -> Ledger {
        match self.read_document().await {
            Ok(Some(text)) => {
                let ledger = Ledger::decode_or_default(&text);
                debug!("Loaded {} habits from {:?}", ledger.len(), self.path);
                ledger
            }
            Ok(None) => {
                info!("No ledger at {:?} yet", self.path);
                Ledger::default()
            }
            Err(e) => {
                error!("Failed to read ledger at {:?}, starting empty: {e}", self.path);
                Ledger::default()
            }
        }
    }

    async fn save(&self, ledger: &Ledger) -> Result<()> {
        let document = ledger.export_document()?;

        // Semi-safe acquire-release for the document
        let lock = self.open_lock().await?;
        lock.lock_exclusive()?;
        let written = write_atomically(&self.path, document.as_bytes()).await;
        lock.unlock_async().await?;
        written?;

        debug!("Saved {} habits into {:?}", ledger.len(), self.path);
        Ok(())
    }
}
