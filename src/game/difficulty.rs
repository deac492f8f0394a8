use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Difficulty tiers offered on the home screen.
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
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Beginner,
        Difficulty::Intermediate,
        Difficulty::Advanced,
        Difficulty::Expert,
    ];
}

/// Static tuning for one difficulty tier.
///
/// Invariants: `min >= 1`, `max >= min`, `mul_weight + div_weight > 0`,
/// `missing_rate` in [0, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct DifficultyRule {
    pub difficulty: Difficulty,
    /// Inclusive operand range.
    pub min: u32,
    pub max: u32,
    pub time_limit_secs: u32,
    /// Relative weights for the multiplication/division pick.
    pub mul_weight: f64,
    pub div_weight: f64,
    /// Probability that a multiplication drill hides a factor instead of
    /// the product.
    pub missing_rate: f64,
    pub label: &'static str,
}

/// The rule table handed to the question generator.
///
/// Kept as an explicit value rather than a process global so tests can run
/// against trimmed or custom tables.
#[derive(Debug, Clone, PartialEq)]
pub struct DifficultyRules {
    rules: Vec<DifficultyRule>,
}

impl DifficultyRules {
    pub fn new(rules: Vec<DifficultyRule>) -> Self {
        Self { rules }
    }

    /// The shipped table. Ranges, timers, weights and labels are load-bearing
    /// for save compatibility and daily-deck reproducibility.
    pub fn standard() -> Self {
        Self::new(vec![
            DifficultyRule {
                difficulty: Difficulty::Beginner,
                min: 1,
                max: 5,
                time_limit_secs: 90,
                mul_weight: 1.0,
                div_weight: 0.0,
                missing_rate: 0.0,
                label: "1-5 multiplication",
            },
            DifficultyRule {
                difficulty: Difficulty::Intermediate,
                min: 2,
                max: 10,
                time_limit_secs: 60,
                mul_weight: 1.0,
                div_weight: 0.0,
                missing_rate: 0.35,
                label: "2-10 multiplication",
            },
            DifficultyRule {
                difficulty: Difficulty::Advanced,
                min: 1,
                max: 12,
                time_limit_secs: 45,
                mul_weight: 0.6,
                div_weight: 0.4,
                missing_rate: 0.25,
                label: "Up to 12, multiplication + division",
            },
            DifficultyRule {
                difficulty: Difficulty::Expert,
                min: 1,
                max: 20,
                time_limit_secs: 30,
                mul_weight: 0.3,
                div_weight: 0.7,
                missing_rate: 0.2,
                label: "Up to 20, division-focused",
            },
        ])
    }

    pub fn get(&self, difficulty: Difficulty) -> Option<&DifficultyRule> {
        self.rules.iter().find(|r| r.difficulty == difficulty)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DifficultyRule> {
        self.rules.iter()
    }
}
