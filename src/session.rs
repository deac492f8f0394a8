use chrono::NaiveDate;
use itertools::Itertools;
use std::collections::HashMap;

use crate::game::{daily_seed, score, Difficulty, DifficultyRule, GameMode, Question, QuestionKind};
use crate::progress::Action;

/// One submitted answer, kept for the results screen and the mastery commit.
#[derive(Debug, Clone)]
pub struct AnswerRecord {
    pub question: Question,
    /// None when the input was empty or not a number.
    pub user_answer: Option<u32>,
    pub is_correct: bool,
    pub time_taken_secs: f64,
}

/// Transient per-round state owned by the session loop.
///
/// Created at round start, mutated as answers come in, summarized into
/// progression actions once, then discarded. Never persisted.
#[derive(Debug, Clone)]
pub struct GameSession {
    pub mode: GameMode,
    pub difficulty: Difficulty,
    pub score: f64,
    pub current_streak: u32,
    pub multiplier: u32,
    pub questions_answered: u32,
    pub correct_count: u32,
    /// Counts down in timed modes; chill keeps it frozen at the tier limit,
    /// which makes its time bonus a constant.
    pub time_left: f64,
    pub history: Vec<AnswerRecord>,
}

impl GameSession {
    pub fn new(mode: GameMode, difficulty: Difficulty, rule: &DifficultyRule) -> Self {
        Self {
            mode,
            difficulty,
            score: 0.0,
            current_streak: 0,
            multiplier: 1,
            questions_answered: 0,
            correct_count: 0,
            time_left: f64::from(mode.time_limit_secs(rule)),
            history: Vec::new(),
        }
    }

    /// Seed for the next question in a daily run; other modes draw unseeded.
    pub fn next_seed(&self, today: NaiveDate) -> Option<String> {
        (self.mode == GameMode::Daily).then(|| daily_seed(today, self.questions_answered))
    }

    /// Scores and records one submitted answer. Returns whether it was
    /// correct.
    pub fn submit(
        &mut self,
        question: &Question,
        user_answer: Option<u32>,
        time_taken_secs: f64,
    ) -> bool {
        let is_correct = user_answer == Some(question.answer);

        let points = score::score(is_correct, self.time_left, self.current_streak, self.difficulty)
            * self.mode.point_scale();
        self.score += points;

        self.current_streak = if is_correct { self.current_streak + 1 } else { 0 };
        self.multiplier = score::streak_multiplier(self.current_streak);
        self.questions_answered += 1;
        if is_correct {
            self.correct_count += 1;
        }
        self.history.push(AnswerRecord {
            question: question.clone(),
            user_answer,
            is_correct,
            time_taken_secs,
        });

        is_correct
    }

    /// Advances the countdown. No-op for untimed modes.
    pub fn on_tick(&mut self, dt_secs: f64) {
        if self.mode.is_timed() {
            self.time_left -= dt_secs;
        }
    }

    pub fn out_of_time(&self) -> bool {
        self.mode.is_timed() && self.time_left <= 0.0
    }

    pub fn finished(&self) -> bool {
        if self.out_of_time() {
            return true;
        }
        match self.mode.question_limit() {
            Some(limit) => self.questions_answered >= limit,
            None => false,
        }
    }

    pub fn accuracy_percent(&self) -> u32 {
        if self.questions_answered == 0 {
            0
        } else {
            ((self.correct_count as f64 / self.questions_answered as f64) * 100.0).round() as u32
        }
    }

    /// Mean seconds per answered question, if anything was answered.
    pub fn avg_answer_secs(&self) -> Option<f64> {
        crate::util::mean(
            &self
                .history
                .iter()
                .map(|r| r.time_taken_secs)
                .collect::<Vec<_>>(),
        )
    }

    /// How many drills each table received this round, for the results
    /// breakdown.
    pub fn table_drill_counts(&self) -> HashMap<u32, usize> {
        self.history
            .iter()
            .map(|r| r.question.factor_a)
            .counts()
    }

    /// Mastery deltas to commit: one per standard-kind question, keyed by
    /// its first factor. Missing and reverse drills are excluded.
    pub fn mastery_events(&self) -> impl Iterator<Item = (u8, bool)> + '_ {
        self.history
            .iter()
            .filter(|r| r.question.kind == QuestionKind::Standard)
            .map(|r| (r.question.factor_a as u8, r.is_correct))
    }

    /// The progression actions for this round, in commit order: the
    /// completion event, then the xp grant, then per-question mastery.
    ///
    /// The ending streak stands in as the record candidate; a mid-session
    /// maximum is not tracked.
    pub fn commit_actions(&self) -> Vec<Action> {
        let mut actions = vec![
            Action::CompleteGame {
                correct: u64::from(self.correct_count),
                total: u64::from(self.questions_answered),
                best_streak: self.current_streak,
                mode: self.mode,
            },
            Action::AddXp(self.score.max(0.0) as u64),
        ];
        actions.extend(
            self.mastery_events()
                .map(|(table, correct)| Action::UpdateMastery { table, correct }),
        );
        actions
    }
}
