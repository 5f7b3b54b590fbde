//! Persistence boundary for the plan, goals and recurring transactions.

use nestegg_core::{FinancialPlan, Goal, RecurringTransaction};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::Result;

/// Everything persisted for one user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub plan: FinancialPlan,
    #[serde(default)]
    pub goals: Vec<Goal>,
    #[serde(default)]
    pub recurring: Vec<RecurringTransaction>,
}

pub trait Store {
    fn load(&self) -> Result<Snapshot>;
    fn save(&mut self, snapshot: &Snapshot) -> Result<()>;
}

/// Single JSON document on disk. A missing file loads as an empty snapshot.
#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

impl Store for JsonStore {
    fn load(&self) -> Result<Snapshot> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no data file yet, starting empty");
            return Ok(Snapshot::default());
        }
        let data = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&data)?)
    }

    fn save(&mut self, snapshot: &Snapshot) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(snapshot)?;
        let tmp = tmp_path(&self.path);
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), goals = snapshot.goals.len(), "saved snapshot");
        Ok(())
    }
}

/// In-process store for tests and dry runs. Saves never leave memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    snapshot: Snapshot,
    saves: usize,
}

impl MemoryStore {
    pub fn new(snapshot: Snapshot) -> Self {
        Self { snapshot, saves: 0 }
    }

    /// Number of successful `save` calls.
    pub fn saves(&self) -> usize {
        self.saves
    }
}

impl Store for MemoryStore {
    fn load(&self) -> Result<Snapshot> {
        Ok(self.snapshot.clone())
    }

    fn save(&mut self, snapshot: &Snapshot) -> Result<()> {
        self.snapshot = snapshot.clone();
        self.saves += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path().join("data.json"));
        assert_eq!(store.load().unwrap(), Snapshot::default());
    }

    #[test]
    fn test_json_store_persists_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("data.json");
        let mut store = JsonStore::new(&path);

        let snapshot = Snapshot {
            plan: FinancialPlan::new(dec!(4200), dec!(15)),
            goals: vec![Goal::new("Car", dec!(8000)).with_id("car")],
            recurring: Vec::new(),
        };
        store.save(&snapshot).unwrap();

        assert!(path.exists());
        assert!(!tmp_path(&path).exists());
        let reopened = JsonStore::new(&path);
        assert_eq!(reopened.load().unwrap(), snapshot);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(JsonStore::new(&path).load().is_err());
    }

    #[test]
    fn test_memory_store_counts_saves() {
        let mut store = MemoryStore::default();
        store.save(&Snapshot::default()).unwrap();
        store.save(&Snapshot::default()).unwrap();
        assert_eq!(store.saves(), 2);
    }
}
