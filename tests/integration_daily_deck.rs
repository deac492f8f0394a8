use chrono::NaiveDate;

use mathquest::game::{daily_seed, Difficulty, DifficultyRules, GameMode, QuestionGenerator};

fn deck(generator: &QuestionGenerator, date: NaiveDate) -> Vec<(String, u32)> {
    (0..20)
        .map(|i| {
            let seed = daily_seed(date, i);
            let q = generator
                .generate(Difficulty::Advanced, GameMode::Daily, Some(&seed))
                .unwrap();
            (q.text, q.answer)
        })
        .collect()
}

#[test]
fn every_player_sees_the_same_deck_on_the_same_day() {
    // Two independent generators stand in for two clients.
    let a = QuestionGenerator::new(DifficultyRules::standard());
    let b = QuestionGenerator::new(DifficultyRules::standard());
    let day = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();

    assert_eq!(deck(&a, day), deck(&b, day));
}

#[test]
fn the_deck_changes_from_day_to_day() {
    let generator = QuestionGenerator::new(DifficultyRules::standard());
    let saturday = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
    let sunday = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();

    assert_ne!(deck(&generator, saturday), deck(&generator, sunday));
}

#[test]
fn deck_questions_vary_within_a_day() {
    let generator = QuestionGenerator::new(DifficultyRules::standard());
    let day = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();

    let deck = deck(&generator, day);
    let first = &deck[0];
    assert!(
        deck.iter().any(|q| q != first),
        "a 20-question deck should not repeat one drill"
    );
}

#[test]
fn the_deck_is_playable_advanced_material() {
    let generator = QuestionGenerator::new(DifficultyRules::standard());
    let rules = DifficultyRules::standard();
    let rule = rules.get(Difficulty::Advanced).unwrap();
    let day = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();

    for i in 0..20 {
        let seed = daily_seed(day, i);
        let q = generator
            .generate(Difficulty::Advanced, GameMode::Daily, Some(&seed))
            .unwrap();
        assert!((rule.min..=rule.max).contains(&q.factor_a));
        assert!((rule.min..=rule.max).contains(&q.factor_b));
        assert_eq!(q.text.matches('?').count(), 1);
    }
}
