pub mod engine;
pub mod rules;
pub mod stats;

// Re-export the main types for convenience
pub use engine::{Action, Progress, ProgressionEngine};
pub use rules::{theme_by_id, Achievement, Theme, ThemePalette, ACHIEVEMENTS, DEFAULT_THEME, THEMES};
pub use stats::{level_for_xp, UserStats, LEVEL_XP_BASE};
