//! Encrypted per-user store: every user's journal, agenda and exams in one sealed file.
//!
//! The whole [`Dataset`] is decrypted into memory on open and re-sealed in full on
//! every mutation. A single mutex covers lookups, mutations and the write that
//! follows them, so concurrent handlers cannot lose each other's updates.
//!
//! An existing data file that fails to open (wrong key, corruption, truncation)
//! does not stop startup: the store starts empty, logs a warning and reports
//! [`LoadOutcome::Discarded`]. The next mutation overwrites the old file.

use super::secret_key::SecretKey;
use super::vault::SecretVault;
use crate::error::{StoreError, StoreResult};
use crate::shared::{Dataset, JournalEntry, UserRecord};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// How the dataset was obtained when the store was opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// No data file yet.
    Fresh,
    /// Data file decrypted and parsed.
    Loaded { users: usize },
    /// Data file present but unusable; prior contents ignored.
    Discarded { reason: String },
}

pub struct UserStore {
    data_path: PathBuf,
    vault: SecretVault,
    dataset: Mutex<Dataset>,
    load_outcome: LoadOutcome,
}

impl UserStore {
    /// Opens the store at `data_path`, creating the key at `key_path` on first run.
    pub fn open(data_path: impl Into<PathBuf>, key_path: &Path) -> StoreResult<Self> {
        let key = SecretKey::load_or_create(key_path)?;
        Self::open_with_key(data_path, &key)
    }

    /// Opens the store with an already loaded key.
    pub fn open_with_key(data_path: impl Into<PathBuf>, key: &SecretKey) -> StoreResult<Self> {
        let data_path = data_path.into();
        let vault = SecretVault::new(key);
        let (dataset, load_outcome) = load_dataset(&data_path, &vault)?;
        match &load_outcome {
            LoadOutcome::Fresh => tracing::info!(
                target: "coachbot::store",
                path = %data_path.display(),
                "no data file yet; starting empty"
            ),
            LoadOutcome::Loaded { users } => tracing::info!(
                target: "coachbot::store",
                path = %data_path.display(),
                users,
                "user store loaded"
            ),
            LoadOutcome::Discarded { reason } => tracing::warn!(
                target: "coachbot::store",
                path = %data_path.display(),
                reason = %reason,
                "data file could not be opened; starting empty and it will be overwritten on next save"
            ),
        }
        Ok(Self {
            data_path,
            vault,
            dataset: Mutex::new(dataset),
            load_outcome,
        })
    }

    pub fn load_outcome(&self) -> &LoadOutcome {
        &self.load_outcome
    }

    /// Snapshot of `uid`'s record. Inserts an empty record first if the user is unknown
    /// (in memory only; it reaches disk with the next save).
    pub fn get_user(&self, uid: &str) -> UserRecord {
        let mut data = self.lock();
        data.entry(uid.to_string()).or_default().clone()
    }

    pub fn contains_user(&self, uid: &str) -> bool {
        self.lock().contains_key(uid)
    }

    pub fn user_count(&self) -> usize {
        self.lock().len()
    }

    pub fn append_journal_entry(&self, uid: &str, text: &str, date: &str) -> StoreResult<()> {
        self.mutate_user(uid, |rec| rec.journal.push(JournalEntry::new(text, date)))
    }

    pub fn append_agenda_event(&self, uid: &str, text: &str) -> StoreResult<()> {
        self.mutate_user(uid, |rec| rec.agenda.push(text.to_string()))
    }

    pub fn append_exam(&self, uid: &str, text: &str) -> StoreResult<()> {
        self.mutate_user(uid, |rec| rec.exams.push(text.to_string()))
    }

    /// Removes every trace of `uid`. Saves only when a record was actually removed;
    /// returns whether one was. A failed save puts the record back.
    pub fn clear_user(&self, uid: &str) -> StoreResult<bool> {
        let mut data = self.lock();
        let Some(removed) = data.remove(uid) else {
            return Ok(false);
        };
        if let Err(e) = self.write_dataset(&data) {
            data.insert(uid.to_string(), removed);
            return Err(e);
        }
        tracing::info!(target: "coachbot::store", uid, "user data cleared");
        Ok(true)
    }

    /// Re-seals the whole dataset and atomically replaces the data file.
    pub fn persist(&self) -> StoreResult<()> {
        let data = self.lock();
        self.write_dataset(&data)
    }

    /// Applies `f` and saves; when the save fails the user's record is restored, so
    /// memory never holds data the file lacks.
    fn mutate_user(&self, uid: &str, f: impl FnOnce(&mut UserRecord)) -> StoreResult<()> {
        let mut data = self.lock();
        let previous = data.get(uid).cloned();
        f(data.entry(uid.to_string()).or_default());
        if let Err(e) = self.write_dataset(&data) {
            match previous {
                Some(record) => {
                    data.insert(uid.to_string(), record);
                }
                None => {
                    data.remove(uid);
                }
            }
            return Err(e);
        }
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, Dataset> {
        // A panic mid-mutation leaves a still well-formed map.
        self.dataset.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Caller holds the dataset lock.
    fn write_dataset(&self, data: &Dataset) -> StoreResult<()> {
        let plain = serde_json::to_vec(data)?;
        let sealed = self.vault.encrypt_blob(&plain)?;
        write_atomic(&self.data_path, &sealed).map_err(|source| StoreError::Io {
            path: self.data_path.clone(),
            source,
        })?;
        tracing::debug!(
            target: "coachbot::store",
            users = data.len(),
            bytes = sealed.len(),
            "user store saved"
        );
        Ok(())
    }
}

fn load_dataset(path: &Path, vault: &SecretVault) -> StoreResult<(Dataset, LoadOutcome)> {
    let sealed = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Ok((Dataset::new(), LoadOutcome::Fresh));
        }
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    let plain = match vault.decrypt_blob(&sealed) {
        Ok(p) => p,
        Err(e) => {
            return Ok((
                Dataset::new(),
                LoadOutcome::Discarded {
                    reason: e.to_string(),
                },
            ))
        }
    };
    match serde_json::from_slice::<Dataset>(&plain) {
        Ok(dataset) => {
            let users = dataset.len();
            Ok((dataset, LoadOutcome::Loaded { users }))
        }
        Err(e) => Ok((
            Dataset::new(),
            LoadOutcome::Discarded {
                reason: format!("parse: {}", e),
            },
        )),
    }
}

/// Writes `bytes` to `{path}.tmp`, syncs, then renames over `path`. The temp file is
/// removed again if any step fails.
fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut temp = path.as_os_str().to_owned();
    temp.push(".tmp");
    let temp_path = PathBuf::from(temp);

    let result = write_and_rename(&temp_path, path, bytes);
    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

fn write_and_rename(temp_path: &Path, path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(temp_path)?;
    file.write_all(bytes)?;
    file.sync_all()?;
    drop(file);
    fs::rename(temp_path, path)
}
