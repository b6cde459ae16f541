use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::Result;
use crate::models::{Habit, Reminder, VaultField};

/// Environment variable overriding the reminders file location.
pub const DB_ENV: &str = "REMINDERS_DB";

const REMINDERS_FILE: &str = "reminders.json";
const HABITS_FILE: &str = "habits.json";
const VAULT_FILE: &str = "vault.json";

/// JSON files holding reminders, habits and vault fields.
///
/// Only templates are stored; occurrences are always recomputed.
#[derive(Debug, Clone)]
pub struct Store {
    reminders_path: PathBuf,
}

impl Store {
    /// Opens the store the CLI uses.
    ///
    /// The reminders file is determined in the following order:
    /// 1. `REMINDERS_DB` environment variable.
    /// 2. `~/.local/share/remindust/reminders.json` (on Linux).
    /// 3. `./reminders.json` (fallback).
    pub fn open_default() -> Result<Store> {
        let reminders_path = match std::env::var(DB_ENV) {
            Ok(p) => PathBuf::from(p),
            Err(_) => {
                let mut p = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
                p.push("remindust");
                fs::create_dir_all(&p)?;
                p.push(REMINDERS_FILE);
                p
            }
        };
        debug!(path = %reminders_path.display(), "opened store");
        Ok(Store { reminders_path })
    }

    /// A store keeping its files directly in `dir`.
    pub fn at(dir: impl AsRef<Path>) -> Store {
        Store { reminders_path: dir.as_ref().join(REMINDERS_FILE) }
    }

    pub fn reminders_path(&self) -> &Path {
        &self.reminders_path
    }

    fn sibling(&self, name: &str) -> PathBuf {
        let mut p = self.reminders_path.clone();
        p.pop();
        p.push(name);
        p
    }

    /// Loads all reminders. A missing file is an empty collection.
    pub fn load_reminders(&self) -> Result<Vec<Reminder>> {
        Ok(read_json(&self.reminders_path)?.unwrap_or_default())
    }

    pub fn save_reminders(&self, reminders: &[Reminder]) -> Result<()> {
        write_json(&self.reminders_path, reminders)
    }

    /// Loads a single reminder by its template id.
    pub fn load_reminder(&self, id: &str) -> Result<Option<Reminder>> {
        Ok(self.load_reminders()?.into_iter().find(|r| r.id == id))
    }

    pub fn load_habits(&self) -> Result<Vec<Habit>> {
        Ok(read_json(&self.sibling(HABITS_FILE))?.unwrap_or_default())
    }

    pub fn save_habits(&self, habits: &[Habit]) -> Result<()> {
        write_json(&self.sibling(HABITS_FILE), habits)
    }

    /// Loads vault fields, seeding the default labels on first use.
    pub fn load_vault(&self) -> Result<Vec<VaultField>> {
        Ok(read_json(&self.sibling(VAULT_FILE))?.unwrap_or_else(default_vault))
    }

    pub fn save_vault(&self, fields: &[VaultField]) -> Result<()> {
        write_json(&self.sibling(VAULT_FILE), fields)
    }

    /// Deletes every data file of this store.
    pub fn reset(&self) -> Result<()> {
        for path in [self.reminders_path.clone(), self.sibling(HABITS_FILE), self.sibling(VAULT_FILE)] {
            if path.exists() {
                fs::remove_file(&path)?;
                debug!(path = %path.display(), "removed");
            }
        }
        Ok(())
    }
}

fn default_vault() -> Vec<VaultField> {
    vec![
        VaultField { id: "1".into(), label: "License ID".into(), value: String::new() },
        VaultField { id: "2".into(), label: "Membership No".into(), value: String::new() },
    ]
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let s = fs::read_to_string(path)?;
    if s.trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(&s)?))
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let s = serde_json::to_string_pretty(value)?;
    let mut f = OpenOptions::new().create(true).write(true).truncate(true).open(path)?;
    f.write_all(s.as_bytes())?;
    debug!(path = %path.display(), bytes = s.len(), "saved");
    Ok(())
}
