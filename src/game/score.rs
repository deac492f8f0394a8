use super::difficulty::Difficulty;

/// Streak multiplier: integer steps at 5, 10, 15, 20, capped at 5x.
pub fn streak_multiplier(streak: u32) -> u32 {
    (1 + streak / 5).min(5)
}

/// Base payout for a correct answer at the given tier.
pub fn base_points(difficulty: Difficulty) -> f64 {
    match difficulty {
        Difficulty::Beginner => 100.0,
        Difficulty::Intermediate => 150.0,
        Difficulty::Advanced => 200.0,
        Difficulty::Expert => 300.0,
    }
}

/// Points for one submitted answer.
///
/// Incorrect answers are exactly zero no matter what the clock says, NaN
/// included. For correct answers a NaN `time_left` propagates NaN instead of
/// being masked; an invalid timer state should stay visible to the caller.
/// The time bonus is not clamped, so a negative clock subtracts points.
pub fn score(is_correct: bool, time_left: f64, streak: u32, difficulty: Difficulty) -> f64 {
    if !is_correct {
        return 0.0;
    }

    let time_bonus = (time_left * 2.0).floor();
    let multiplier = streak_multiplier(streak) as f64;
    (base_points(difficulty) + time_bonus) * multiplier
}
