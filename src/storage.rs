use std::cell::RefCell;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::app_dirs::AppDirs;
use crate::progress::UserStats;

/// On-disk name of the persisted aggregate.
pub const STORAGE_KEY: &str = "mathquest_user_v1";

/// Persistence collaborator for the progression engine.
///
/// Both calls are best effort and never fail outward: `load` falls back to
/// the hard-coded baseline on any read or decode problem, `save` drops the
/// write. Failures go to the diagnostic log.
pub trait StatsStore {
    fn load(&self) -> UserStats;
    fn save(&self, stats: &UserStats);
}

/// JSON file store under the state directory.
#[derive(Debug, Clone)]
pub struct FileStatsStore {
    path: PathBuf,
}

impl FileStatsStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = AppDirs::save_path()
            .unwrap_or_else(|| PathBuf::from(format!("{STORAGE_KEY}.json")));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileStatsStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StatsStore for FileStatsStore {
    fn load(&self) -> UserStats {
        match fs::read(&self.path) {
            Ok(bytes) => match serde_json::from_slice::<UserStats>(&bytes) {
                Ok(stats) => stats,
                Err(err) => {
                    warn!(path = %self.path.display(), %err, "unreadable save, starting from baseline");
                    UserStats::default()
                }
            },
            Err(err) => {
                if err.kind() != ErrorKind::NotFound {
                    warn!(path = %self.path.display(), %err, "failed to read save");
                }
                UserStats::default()
            }
        }
    }

    fn save(&self, stats: &UserStats) {
        if let Some(parent) = self.path.parent() {
            if let Err(err) = fs::create_dir_all(parent) {
                warn!(path = %parent.display(), %err, "failed to create save directory");
                return;
            }
        }
        let data = match serde_json::to_vec_pretty(stats) {
            Ok(data) => data,
            Err(err) => {
                warn!(%err, "failed to encode save");
                return;
            }
        };
        if let Err(err) = fs::write(&self.path, data) {
            warn!(path = %self.path.display(), %err, "failed to write save");
        }
    }
}

/// In-memory store for tests and headless runs.
#[derive(Debug, Default)]
pub struct MemoryStatsStore {
    slot: RefCell<Option<UserStats>>,
}

impl StatsStore for MemoryStatsStore {
    fn load(&self) -> UserStats {
        self.slot.borrow().clone().unwrap_or_default()
    }

    fn save(&self, stats: &UserStats) {
        *self.slot.borrow_mut() = Some(stats.clone());
    }
}
