use directories::ProjectDirs;
use std::path::PathBuf;

use crate::storage::STORAGE_KEY;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    /// Save-file path under $HOME/.local/state/mathquest
    pub fn save_path() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            let state_dir = PathBuf::from(home)
                .join(".local")
                .join("state")
                .join("mathquest");
            Some(state_dir.join(format!("{STORAGE_KEY}.json")))
        } else {
            ProjectDirs::from("", "", "mathquest")
                .map(|proj_dirs| proj_dirs.data_local_dir().join(format!("{STORAGE_KEY}.json")))
        }
    }
}
