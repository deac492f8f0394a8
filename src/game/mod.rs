pub mod difficulty;
pub mod mode;
pub mod question;
pub mod rng;
pub mod score;

// Re-export the main types for convenience
pub use difficulty::{Difficulty, DifficultyRule, DifficultyRules};
pub use mode::GameMode;
pub use question::{daily_seed, GenerateError, Operation, Question, QuestionGenerator, QuestionKind};
pub use rng::{RandomSource, SeededStream, ThreadSource};
