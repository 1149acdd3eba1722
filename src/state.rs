use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};

use crate::db::{self, Database};

/// The one owner of the in-memory state. Handlers read through `read()` and
/// mutate through `update()`, which rewrites the whole snapshot after each
/// change — there are no partial updates on disk.
#[derive(Clone)]
pub struct AppState {
    db: Arc<RwLock<Database>>,
    snapshot_path: Arc<PathBuf>,
}

impl AppState {
    pub fn new(db: Database, snapshot_path: PathBuf) -> Self {
        AppState {
            db: Arc::new(RwLock::new(db)),
            snapshot_path: Arc::new(snapshot_path),
        }
    }

    pub fn read(&self) -> RwLockReadGuard<'_, Database> {
        self.db.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Applies `mutate` and persists the resulting snapshot. A failed save is
    /// logged and the in-memory state keeps the change; the next successful
    /// save writes everything again.
    pub fn update<T>(&self, mutate: impl FnOnce(&mut Database) -> T) -> T {
        let mut guard = self.db.write().unwrap_or_else(PoisonError::into_inner);
        let result = mutate(&mut guard);
        if let Err(err) = db::save(&self.snapshot_path, &guard) {
            log::error!(
                "Could not save snapshot to {}: {err}",
                self.snapshot_path.display()
            );
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::seed_defaults;

    #[test]
    fn update_persists_the_full_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.json");
        let state = AppState::new(seed_defaults(), path.clone());

        state.update(|db| db.admin_password = "nova-senha".to_string());

        let reloaded = db::load_or_seed(&path).unwrap();
        assert_eq!(reloaded.admin_password, "nova-senha");
        assert_eq!(state.read().admin_password, "nova-senha");
    }
}
