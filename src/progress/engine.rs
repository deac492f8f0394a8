use chrono::{Local, NaiveDate};

use crate::game::GameMode;
use crate::storage::StatsStore;

use super::rules::{Achievement, Theme};
use super::stats::{level_for_xp, UserStats};

/// Mastery nudges per answer on a table.
const MASTERY_GAIN: i16 = 5;
const MASTERY_LOSS: i16 = 2;

/// State transitions applied after gameplay events.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    AddXp(u64),
    UpdateMastery {
        table: u8,
        correct: bool,
    },
    CompleteGame {
        correct: u64,
        total: u64,
        best_streak: u32,
        mode: GameMode,
    },
    SetTheme(String),
    ResetProgress,
}

/// Reducer state: the persistent aggregate plus the unlock deltas of the
/// most recent transition. The deltas are rebuilt from empty on every apply.
#[derive(Debug, Clone, Default)]
pub struct Progress {
    pub user: UserStats,
    pub new_badges: Vec<Achievement>,
    pub new_themes: Vec<Theme>,
}

impl Progress {
    pub fn with_user(user: UserStats) -> Self {
        Self {
            user,
            new_badges: Vec::new(),
            new_themes: Vec::new(),
        }
    }
}

/// Pure reducer over `Progress`.
///
/// Holds the read-only rule tables and the persistence collaborator by
/// reference; each apply returns a wholesale new snapshot and persists it
/// best-effort. Callers serialize writes themselves, last write wins.
pub struct ProgressionEngine<'a, S: StatsStore> {
    achievements: &'a [Achievement],
    themes: &'a [Theme],
    store: &'a S,
}

impl<'a, S: StatsStore> ProgressionEngine<'a, S> {
    pub fn new(achievements: &'a [Achievement], themes: &'a [Theme], store: &'a S) -> Self {
        Self {
            achievements,
            themes,
            store,
        }
    }

    /// Applies one action against the local calendar date.
    pub fn apply(&self, state: &Progress, action: Action) -> Progress {
        self.apply_on(state, action, Local::now().date_naive())
    }

    /// Applies one action with an injected date, so calendar semantics stay
    /// testable. After the action the unlock scan runs and the snapshot is
    /// persisted.
    pub fn apply_on(&self, state: &Progress, action: Action, today: NaiveDate) -> Progress {
        let mut user = state.user.clone();

        match action {
            Action::AddXp(amount) => {
                user.xp += amount;
                user.level = level_for_xp(user.xp);
            }
            Action::UpdateMastery { table, correct } => {
                let delta = if correct { MASTERY_GAIN } else { -MASTERY_LOSS };
                let next = (user.mastery_of(table) as i16 + delta).clamp(0, 100) as u8;
                user.mastery.insert(table, next);
            }
            Action::CompleteGame {
                correct,
                total,
                best_streak,
                mode,
            } => {
                user.total_correct += correct;
                user.total_questions_answered += total;
                user.streak_record = user.streak_record.max(best_streak);

                // One daily credit per calendar day; a repeat completion on
                // the same date changes nothing.
                if mode == GameMode::Daily && user.last_daily_challenge != Some(today) {
                    user.last_daily_challenge = Some(today);
                    user.daily_streak += 1;
                }
            }
            Action::SetTheme(theme_id) => {
                if user.has_theme(&theme_id) {
                    user.theme = theme_id;
                }
            }
            Action::ResetProgress => {
                user = self.store.load();
                user.xp = 0;
                user.mastery.clear();
            }
        }

        let (user, new_badges, new_themes) = self.scan_unlocks(user);
        self.store.save(&user);

        Progress {
            user,
            new_badges,
            new_themes,
        }
    }

    /// Evaluates every rule not yet earned, in declared table order.
    fn scan_unlocks(&self, mut user: UserStats) -> (UserStats, Vec<Achievement>, Vec<Theme>) {
        let mut new_badges = Vec::new();
        let mut new_themes = Vec::new();

        for achievement in self.achievements {
            if !user.has_badge(achievement.id) && (achievement.condition)(&user) {
                user.badges.push(achievement.id.to_string());
                new_badges.push(*achievement);
            }
        }

        for theme in self.themes {
            if !user.has_theme(theme.id) && (theme.unlock_condition)(&user) {
                user.unlocked_themes.push(theme.id.to_string());
                new_themes.push(*theme);
            }
        }

        (user, new_badges, new_themes)
    }
}
