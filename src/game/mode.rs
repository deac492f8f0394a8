use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use super::difficulty::DifficultyRule;

/// Boss runs never get more than this many seconds on the clock.
const BOSS_TIME_CAP_SECS: u32 = 30;

/// Journey and daily runs end after this many questions.
const CAPPED_RUN_QUESTIONS: u32 = 20;

/// Session variants. Modes shape the session loop (length, timer, payout)
/// and, for boss, the operand range; they never touch a tier's operation
/// weights or missing rate.
#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    ValueEnum,
    Serialize,
    Deserialize,
    strum_macros::Display,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    Sprint,
    Journey,
    Chill,
    Boss,
    Daily,
}

impl GameMode {
    /// Order shown on the home screen. Daily has its own card there.
    pub const MENU: [GameMode; 4] = [
        GameMode::Journey,
        GameMode::Sprint,
        GameMode::Boss,
        GameMode::Chill,
    ];

    pub fn title(self) -> &'static str {
        match self {
            GameMode::Sprint => "Sprint",
            GameMode::Journey => "Journey",
            GameMode::Chill => "Chill",
            GameMode::Boss => "Boss Run",
            GameMode::Daily => "Daily Challenge",
        }
    }

    pub fn tagline(self) -> &'static str {
        match self {
            GameMode::Sprint => "Time attack",
            GameMode::Journey => "Progressive levels",
            GameMode::Chill => "No timer practice",
            GameMode::Boss => "Upper-half tables only",
            GameMode::Daily => "Beat the daily deck",
        }
    }

    /// Maximum questions in a run, if the mode caps it.
    pub fn question_limit(self) -> Option<u32> {
        match self {
            GameMode::Journey | GameMode::Daily => Some(CAPPED_RUN_QUESTIONS),
            GameMode::Sprint | GameMode::Chill | GameMode::Boss => None,
        }
    }

    /// Chill keeps the clock frozen at the tier limit; every other mode
    /// counts down.
    pub fn is_timed(self) -> bool {
        !matches!(self, GameMode::Chill)
    }

    /// Starting clock for a run at the given tier.
    pub fn time_limit_secs(self, rule: &DifficultyRule) -> u32 {
        match self {
            GameMode::Boss => rule.time_limit_secs.min(BOSS_TIME_CAP_SECS),
            _ => rule.time_limit_secs,
        }
    }

    /// Daily runs pay double points.
    pub fn point_scale(self) -> f64 {
        match self {
            GameMode::Daily => 2.0,
            _ => 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::difficulty::{Difficulty, DifficultyRules};

    #[test]
    fn capped_modes_end_after_twenty_questions() {
        assert_eq!(GameMode::Journey.question_limit(), Some(20));
        assert_eq!(GameMode::Daily.question_limit(), Some(20));
        assert_eq!(GameMode::Sprint.question_limit(), None);
        assert_eq!(GameMode::Chill.question_limit(), None);
        assert_eq!(GameMode::Boss.question_limit(), None);
    }

    #[test]
    fn chill_is_the_only_untimed_mode() {
        assert!(!GameMode::Chill.is_timed());
        for mode in [
            GameMode::Sprint,
            GameMode::Journey,
            GameMode::Boss,
            GameMode::Daily,
        ] {
            assert!(mode.is_timed(), "{mode} should tick");
        }
    }

    #[test]
    fn boss_caps_the_clock_at_thirty_seconds() {
        let rules = DifficultyRules::standard();
        let beginner = rules.get(Difficulty::Beginner).unwrap();
        let expert = rules.get(Difficulty::Expert).unwrap();

        assert_eq!(GameMode::Boss.time_limit_secs(beginner), 30);
        // Expert is already at the cap; boss must not extend it.
        assert_eq!(GameMode::Boss.time_limit_secs(expert), 30);
        assert_eq!(GameMode::Sprint.time_limit_secs(beginner), 90);
    }

    #[test]
    fn daily_pays_double() {
        assert_eq!(GameMode::Daily.point_scale(), 2.0);
        assert_eq!(GameMode::Journey.point_scale(), 1.0);
    }

    #[test]
    fn mode_displays_lowercase() {
        assert_eq!(GameMode::Boss.to_string(), "boss");
        assert_eq!(GameMode::Daily.to_string(), "daily");
    }
}
