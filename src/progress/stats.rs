use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::rules::DEFAULT_THEME;

/// XP needed per level step.
pub const LEVEL_XP_BASE: u64 = 500;

/// Level is always re-derived from xp, never incremented on its own.
pub fn level_for_xp(xp: u64) -> u32 {
    (xp / LEVEL_XP_BASE) as u32 + 1
}

/// Persistent per-player aggregate.
///
/// Serialized with the original camelCase keys so existing
/// `mathquest_user_v1` saves keep loading. Every field defaults, which makes
/// schema growth additive: an old save is merged against the baseline on
/// load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserStats {
    pub xp: u64,
    pub level: u32,
    pub total_questions_answered: u64,
    pub total_correct: u64,
    /// Highest committed streak across all sessions.
    pub streak_record: u32,
    /// Table number (1..=20) to mastery score (0..=100).
    pub mastery: BTreeMap<u8, u8>,
    /// Earned achievement ids. Grows monotonically, no duplicates.
    pub badges: Vec<String>,
    pub theme: String,
    pub unlocked_themes: Vec<String>,
    pub daily_streak: u32,
    /// Date of the last completed daily run.
    pub last_daily_challenge: Option<NaiveDate>,
}

impl Default for UserStats {
    fn default() -> Self {
        Self {
            xp: 0,
            level: 1,
            total_questions_answered: 0,
            total_correct: 0,
            streak_record: 0,
            mastery: BTreeMap::new(),
            badges: Vec::new(),
            theme: DEFAULT_THEME.to_string(),
            unlocked_themes: vec![DEFAULT_THEME.to_string()],
            daily_streak: 0,
            last_daily_challenge: None,
        }
    }
}

impl UserStats {
    /// Mastery for a table, 0 when the table has never been drilled.
    pub fn mastery_of(&self, table: u8) -> u8 {
        self.mastery.get(&table).copied().unwrap_or(0)
    }

    pub fn has_badge(&self, id: &str) -> bool {
        self.badges.iter().any(|b| b == id)
    }

    pub fn has_theme(&self, id: &str) -> bool {
        self.unlocked_themes.iter().any(|t| t == id)
    }

    pub fn accuracy_percent(&self) -> u32 {
        if self.total_questions_answered == 0 {
            0
        } else {
            ((self.total_correct as f64 / self.total_questions_answered as f64) * 100.0).round()
                as u32
        }
    }
}
