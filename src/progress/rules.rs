use ratatui::style::Color;

use super::stats::UserStats;

/// Theme every player starts with.
pub const DEFAULT_THEME: &str = "jungle";

/// Static achievement rule. The predicate runs in the post-action unlock
/// scan against the freshly reduced stats.
#[derive(Debug, Clone, Copy)]
pub struct Achievement {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub condition: fn(&UserStats) -> bool,
}

/// Terminal rendition of a cosmetic theme.
#[derive(Debug, Clone, Copy)]
pub struct ThemePalette {
    pub primary: Color,
    pub secondary: Color,
    pub accent: Color,
    pub text: Color,
}

/// Static theme rule: identity, palette, and its unlock predicate.
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub unlock_description: &'static str,
    pub palette: ThemePalette,
    pub unlock_condition: fn(&UserStats) -> bool,
}

/// Declared scan order is the unlock order.
pub static ACHIEVEMENTS: [Achievement; 5] = [
    Achievement {
        id: "first_steps",
        title: "First Steps",
        description: "Complete your first round",
        icon: "🏁",
        condition: |stats| stats.total_questions_answered > 0,
    },
    Achievement {
        id: "streak_starter",
        title: "Hot Streak",
        description: "Get a streak of 10",
        icon: "🔥",
        condition: |stats| stats.streak_record >= 10,
    },
    Achievement {
        id: "table_tamer_7",
        title: "Lucky 7s",
        description: "Master the 7 times table",
        icon: "🍀",
        condition: |stats| stats.mastery_of(7) >= 100,
    },
    Achievement {
        id: "speed_demon",
        title: "Speed Demon",
        description: "Answer 500 questions correctly total",
        icon: "⚡",
        condition: |stats| stats.total_correct >= 500,
    },
    Achievement {
        id: "daily_devotee",
        title: "Daily Devotee",
        description: "Complete a 3-day streak",
        icon: "📅",
        condition: |stats| stats.daily_streak >= 3,
    },
];

pub static THEMES: [Theme; 3] = [
    Theme {
        id: "jungle",
        name: "Wild Jungle",
        description: "A fresh, green start for your journey.",
        unlock_description: "Unlocked by default",
        palette: ThemePalette {
            primary: Color::Green,
            secondary: Color::LightGreen,
            accent: Color::LightYellow,
            text: Color::White,
        },
        unlock_condition: |_| true,
    },
    Theme {
        id: "ocean",
        name: "Ocean Depth",
        description: "Dive deep into knowledge.",
        unlock_description: "Reach Level 3",
        palette: ThemePalette {
            primary: Color::Cyan,
            secondary: Color::LightBlue,
            accent: Color::Yellow,
            text: Color::White,
        },
        unlock_condition: |stats| stats.level >= 3,
    },
    Theme {
        id: "space",
        name: "Cosmic Explorer",
        description: "Reach for the stars.",
        unlock_description: "Answer 100 questions total",
        palette: ThemePalette {
            primary: Color::Magenta,
            secondary: Color::DarkGray,
            accent: Color::LightMagenta,
            text: Color::Gray,
        },
        unlock_condition: |stats| stats.total_questions_answered >= 100,
    },
];

pub fn theme_by_id(id: &str) -> Option<&'static Theme> {
    THEMES.iter().find(|t| t.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_ids_are_unique() {
        let mut badge_ids: Vec<&str> = ACHIEVEMENTS.iter().map(|a| a.id).collect();
        badge_ids.sort_unstable();
        badge_ids.dedup();
        assert_eq!(badge_ids.len(), ACHIEVEMENTS.len());

        let mut theme_ids: Vec<&str> = THEMES.iter().map(|t| t.id).collect();
        theme_ids.sort_unstable();
        theme_ids.dedup();
        assert_eq!(theme_ids.len(), THEMES.len());
    }

    #[test]
    fn default_theme_is_declared_and_always_unlockable() {
        let jungle = theme_by_id(DEFAULT_THEME).expect("default theme must exist");
        assert!((jungle.unlock_condition)(&UserStats::default()));
    }

    #[test]
    fn fresh_stats_only_satisfy_the_default_theme() {
        let stats = UserStats::default();
        for theme in &THEMES {
            let unlocked = (theme.unlock_condition)(&stats);
            assert_eq!(unlocked, theme.id == DEFAULT_THEME, "theme {}", theme.id);
        }
    }

    #[test]
    fn achievement_predicates_trip_at_their_thresholds() {
        let mut stats = UserStats::default();
        let by_id = |id: &str| {
            ACHIEVEMENTS
                .iter()
                .find(|a| a.id == id)
                .unwrap_or_else(|| panic!("missing achievement {id}"))
        };

        assert!(!(by_id("first_steps").condition)(&stats));
        stats.total_questions_answered = 1;
        assert!((by_id("first_steps").condition)(&stats));

        stats.streak_record = 9;
        assert!(!(by_id("streak_starter").condition)(&stats));
        stats.streak_record = 10;
        assert!((by_id("streak_starter").condition)(&stats));

        stats.mastery.insert(7, 99);
        assert!(!(by_id("table_tamer_7").condition)(&stats));
        stats.mastery.insert(7, 100);
        assert!((by_id("table_tamer_7").condition)(&stats));

        stats.total_correct = 499;
        assert!(!(by_id("speed_demon").condition)(&stats));
        stats.total_correct = 500;
        assert!((by_id("speed_demon").condition)(&stats));

        stats.daily_streak = 2;
        assert!(!(by_id("daily_devotee").condition)(&stats));
        stats.daily_streak = 3;
        assert!((by_id("daily_devotee").condition)(&stats));
    }

    #[test]
    fn ocean_unlocks_at_level_three() {
        let ocean = theme_by_id("ocean").unwrap();
        let mut stats = UserStats::default();
        stats.level = 2;
        assert!(!(ocean.unlock_condition)(&stats));
        stats.level = 3;
        assert!((ocean.unlock_condition)(&stats));
    }

    #[test]
    fn space_unlocks_at_one_hundred_questions() {
        let space = theme_by_id("space").unwrap();
        let mut stats = UserStats::default();
        stats.total_questions_answered = 99;
        assert!(!(space.unlock_condition)(&stats));
        stats.total_questions_answered = 100;
        assert!((space.unlock_condition)(&stats));
    }
}
