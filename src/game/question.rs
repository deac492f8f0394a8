use std::sync::atomic::{AtomicU64, Ordering};

use thiserror::Error;

use super::difficulty::{Difficulty, DifficultyRule, DifficultyRules};
use super::mode::GameMode;
use super::rng::{RandomSource, SeededStream, ThreadSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GenerateError {
    /// The rule table has no entry for the requested tier. Surfaced to the
    /// caller rather than silently defaulting.
    #[error("unknown difficulty: {0}")]
    UnknownDifficulty(Difficulty),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Operation {
    Mul,
    Div,
}

/// How the drill is framed to the player.
#[derive(Debug, Copy, Clone, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum QuestionKind {
    /// `a × b = ?`
    Standard,
    /// `? × b = p` or `a × ? = p`
    Missing,
    /// `p ÷ d = ?`, always exact by construction
    Reverse,
}

/// A single drill shown to the player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    /// Opaque, unique per generation call. Not part of the seeded contract.
    pub id: String,
    pub kind: QuestionKind,
    pub operation: Operation,
    /// Operand values at the left/right of the displayed operator. For a
    /// missing-factor drill the hidden side still carries its value here;
    /// only `text` shows the `?`.
    pub a: u32,
    pub b: u32,
    /// The multiplicative pair the drill was built from. Division keeps
    /// these distinct from `a`/`b` since the dividend is their product.
    pub factor_a: u32,
    pub factor_b: u32,
    pub answer: u32,
    /// Render-ready prompt containing exactly one `?`.
    pub text: String,
    pub hint: String,
}

/// Builds drills from a difficulty rule table.
///
/// Draw order is the daily-challenge contract and must not be reordered:
///   1. operation pick
///   2. operand A
///   3. operand B
///   4. missing-factor roll (multiplication only, consumed even at rate 0)
///   5. hidden-factor coin flip (missing) or divisor coin flip (division)
#[derive(Debug)]
pub struct QuestionGenerator {
    rules: DifficultyRules,
    counter: AtomicU64,
}

impl QuestionGenerator {
    pub fn new(rules: DifficultyRules) -> Self {
        Self {
            rules,
            counter: AtomicU64::new(0),
        }
    }

    pub fn rules(&self) -> &DifficultyRules {
        &self.rules
    }

    /// One drill. Seeded calls replay byte-identically for the same
    /// `(difficulty, mode, seed)` triple; unseeded calls use the thread rng.
    pub fn generate(
        &self,
        difficulty: Difficulty,
        mode: GameMode,
        seed: Option<&str>,
    ) -> Result<Question, GenerateError> {
        match seed {
            Some(seed) => {
                self.generate_with(difficulty, mode, &mut SeededStream::from_seed(seed))
            }
            None => self.generate_with(difficulty, mode, &mut ThreadSource),
        }
    }

    /// Drill generation against a caller-supplied draw stream.
    pub fn generate_with(
        &self,
        difficulty: Difficulty,
        mode: GameMode,
        rng: &mut dyn RandomSource,
    ) -> Result<Question, GenerateError> {
        let rule = self
            .rules
            .get(difficulty)
            .ok_or(GenerateError::UnknownDifficulty(difficulty))?;

        let (min, max) = operand_range(rule, mode);

        let weight_sum = rule.mul_weight + rule.div_weight;
        let operation = if rng.next_f64() * weight_sum < rule.div_weight {
            Operation::Div
        } else {
            Operation::Mul
        };

        let x = rng.in_range(min, max);
        let y = rng.in_range(min, max);
        let product = x * y;
        let id = format!("q{}", self.counter.fetch_add(1, Ordering::Relaxed));

        let question = match operation {
            Operation::Mul => {
                let missing = rng.next_f64() < rule.missing_rate;
                if missing {
                    let hide_a = rng.coin();
                    let (text, answer, count_by) = if hide_a {
                        (format!("? × {y} = {product}"), x, y)
                    } else {
                        (format!("{x} × ? = {product}"), y, x)
                    };
                    Question {
                        id,
                        kind: QuestionKind::Missing,
                        operation,
                        a: x,
                        b: y,
                        factor_a: x,
                        factor_b: y,
                        answer,
                        text,
                        hint: format!("Count by {count_by}s until you reach {product}"),
                    }
                } else {
                    Question {
                        id,
                        kind: QuestionKind::Standard,
                        operation,
                        a: x,
                        b: y,
                        factor_a: x,
                        factor_b: y,
                        answer: product,
                        text: format!("{x} × {y} = ?"),
                        hint: format!("Add {x} to itself {y} times."),
                    }
                }
            }
            Operation::Div => {
                // The dividend is always the product, so the quotient is the
                // other factor and the remainder is zero by construction.
                let divisor = if rng.coin() { x } else { y };
                let quotient = product / divisor;
                Question {
                    id,
                    kind: QuestionKind::Reverse,
                    operation,
                    a: product,
                    b: divisor,
                    factor_a: x,
                    factor_b: y,
                    answer: quotient,
                    text: format!("{product} ÷ {divisor} = ?"),
                    hint: format!("Think: {divisor} × ? = {product}"),
                }
            }
        };

        Ok(question)
    }
}

/// Normal modes use the tier's full range; boss narrows to the upper half.
fn operand_range(rule: &DifficultyRule, mode: GameMode) -> (u32, u32) {
    if mode == GameMode::Boss {
        let midpoint = (rule.min + rule.max) / 2;
        (midpoint.clamp(rule.min, rule.max), rule.max)
    } else {
        (rule.min, rule.max)
    }
}

/// Seed for question `index` of the daily deck dated `date`, shared by every
/// player that day.
pub fn daily_seed(date: chrono::NaiveDate, index: u32) -> String {
    format!("{}-{index}", date.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::difficulty::DifficultyRule;
    use assert_matches::assert_matches;

    fn generator() -> QuestionGenerator {
        QuestionGenerator::new(DifficultyRules::standard())
    }

    #[test]
    fn seeded_generation_replays_byte_identically() {
        let gen = generator();
        for seed in ["2024-03-01-0", "2024-03-01-7", "custom"] {
            let first = gen
                .generate(Difficulty::Expert, GameMode::Daily, Some(seed))
                .unwrap();
            let second = gen
                .generate(Difficulty::Expert, GameMode::Daily, Some(seed))
                .unwrap();

            assert_eq!(first.text, second.text, "seed {seed}");
            assert_eq!(first.answer, second.answer);
            assert_eq!(first.hint, second.hint);
            assert_eq!(first.kind, second.kind);
            assert_eq!((first.a, first.b), (second.a, second.b));
        }
    }

    #[test]
    fn question_ids_stay_unique_across_identical_seeds() {
        let gen = generator();
        let first = gen
            .generate(Difficulty::Beginner, GameMode::Journey, Some("same"))
            .unwrap();
        let second = gen
            .generate(Difficulty::Beginner, GameMode::Journey, Some("same"))
            .unwrap();
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn operands_stay_inside_the_tier_range() {
        let gen = generator();
        for difficulty in Difficulty::ALL {
            let rule = gen.rules().get(difficulty).unwrap().clone();
            for i in 0..1000 {
                let q = gen
                    .generate(difficulty, GameMode::Journey, Some(&format!("r{i}")))
                    .unwrap();
                assert!(
                    (rule.min..=rule.max).contains(&q.factor_a),
                    "{difficulty}: factor_a {} outside {}..={}",
                    q.factor_a,
                    rule.min,
                    rule.max
                );
                assert!((rule.min..=rule.max).contains(&q.factor_b));
            }
        }
    }

    #[test]
    fn zero_div_weight_tiers_never_produce_division() {
        let gen = generator();
        for difficulty in [Difficulty::Beginner, Difficulty::Intermediate] {
            for i in 0..1000 {
                let q = gen
                    .generate(difficulty, GameMode::Sprint, Some(&format!("m{i}")))
                    .unwrap();
                assert_eq!(q.operation, Operation::Mul, "{difficulty} seed m{i}");
            }
        }
    }

    #[test]
    fn division_is_always_exact_with_nonzero_divisor() {
        let gen = generator();
        let mut seen_div = 0;
        for i in 0..1000 {
            let q = gen
                .generate(Difficulty::Expert, GameMode::Journey, Some(&format!("d{i}")))
                .unwrap();
            if q.operation == Operation::Div {
                seen_div += 1;
                assert_eq!(q.kind, QuestionKind::Reverse);
                assert_ne!(q.b, 0);
                assert_eq!(q.a % q.b, 0, "inexact division: {} ÷ {}", q.a, q.b);
                assert_eq!(q.answer, q.a / q.b);
                assert_eq!(q.a, q.factor_a * q.factor_b);
            }
        }
        // Expert is division-weighted at 0.7, so a 1000-drill sample without
        // division means the weighted pick is broken.
        assert!(seen_div > 500, "only {seen_div} division drills in 1000");
    }

    #[test]
    fn boss_mode_narrows_operands_to_the_upper_half() {
        let gen = generator();
        for difficulty in Difficulty::ALL {
            let rule = gen.rules().get(difficulty).unwrap().clone();
            let midpoint = (rule.min + rule.max) / 2;
            for i in 0..500 {
                let q = gen
                    .generate(difficulty, GameMode::Boss, Some(&format!("b{i}")))
                    .unwrap();
                assert!(
                    q.factor_a >= midpoint && q.factor_a <= rule.max,
                    "{difficulty}: boss factor_a {} outside {midpoint}..={}",
                    q.factor_a,
                    rule.max
                );
                assert!(q.factor_b >= midpoint && q.factor_b <= rule.max);
            }
        }
    }

    #[test]
    fn missing_factor_drills_hide_exactly_one_factor() {
        let gen = generator();
        let mut seen_missing = 0;
        for i in 0..1000 {
            let q = gen
                .generate(
                    Difficulty::Intermediate,
                    GameMode::Journey,
                    Some(&format!("x{i}")),
                )
                .unwrap();
            if q.kind == QuestionKind::Missing {
                seen_missing += 1;
                assert_eq!(q.operation, Operation::Mul);
                assert!(
                    q.answer == q.factor_a || q.answer == q.factor_b,
                    "missing answer must be one of the factors"
                );
                let product = q.factor_a * q.factor_b;
                assert!(q.text.contains(&product.to_string()));
            }
            assert_eq!(
                q.text.matches('?').count(),
                1,
                "exactly one unknown: {}",
                q.text
            );
        }
        // Intermediate hides a factor 35% of the time.
        assert!(
            seen_missing > 200,
            "only {seen_missing} missing-factor drills in 1000"
        );
    }

    #[test]
    fn standard_drills_ask_for_the_product() {
        let gen = generator();
        for i in 0..200 {
            let q = gen
                .generate(Difficulty::Beginner, GameMode::Journey, Some(&format!("s{i}")))
                .unwrap();
            assert_eq!(q.kind, QuestionKind::Standard);
            assert_eq!(q.answer, q.factor_a * q.factor_b);
            assert_eq!(q.text, format!("{} × {} = ?", q.a, q.b));
            assert_eq!(q.hint, format!("Add {} to itself {} times.", q.a, q.b));
        }
    }

    #[test]
    fn single_value_range_still_generates() {
        let rules = DifficultyRules::new(vec![DifficultyRule {
            difficulty: Difficulty::Beginner,
            min: 4,
            max: 4,
            time_limit_secs: 90,
            mul_weight: 1.0,
            div_weight: 0.0,
            missing_rate: 0.0,
            label: "fours only",
        }]);
        let gen = QuestionGenerator::new(rules);

        for i in 0..20 {
            let q = gen
                .generate(Difficulty::Beginner, GameMode::Journey, Some(&format!("c{i}")))
                .unwrap();
            assert_eq!((q.factor_a, q.factor_b, q.answer), (4, 4, 16));
        }
    }

    #[test]
    fn unregistered_tier_is_a_detectable_error() {
        let rules = DifficultyRules::new(vec![DifficultyRule {
            difficulty: Difficulty::Beginner,
            min: 1,
            max: 5,
            time_limit_secs: 90,
            mul_weight: 1.0,
            div_weight: 0.0,
            missing_rate: 0.0,
            label: "only beginner",
        }]);
        let gen = QuestionGenerator::new(rules);

        assert_matches!(
            gen.generate(Difficulty::Expert, GameMode::Journey, None),
            Err(GenerateError::UnknownDifficulty(Difficulty::Expert))
        );
    }

    #[test]
    fn boss_keeps_the_tier_operation_mix() {
        // Beginner stays multiplication-only even in boss mode.
        let gen = generator();
        for i in 0..300 {
            let q = gen
                .generate(Difficulty::Beginner, GameMode::Boss, Some(&format!("bb{i}")))
                .unwrap();
            assert_eq!(q.operation, Operation::Mul);
        }
    }

    #[test]
    fn unseeded_generation_works() {
        let gen = generator();
        let q = gen
            .generate(Difficulty::Advanced, GameMode::Sprint, None)
            .unwrap();
        let rule = gen.rules().get(Difficulty::Advanced).unwrap();
        assert!((rule.min..=rule.max).contains(&q.factor_a));
        assert!((rule.min..=rule.max).contains(&q.factor_b));
    }

    #[test]
    fn daily_seed_combines_date_and_index() {
        let date = chrono::NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(daily_seed(date, 0), "2024-03-09-0");
        assert_eq!(daily_seed(date, 19), "2024-03-09-19");
    }
}
