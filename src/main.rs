pub mod app_dirs;
pub mod config;
pub mod game;
pub mod progress;
pub mod runtime;
pub mod session;
pub mod storage;
pub mod ui;
pub mod util;

use chrono::Local;
use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    time::Duration,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{Config, ConfigStore, FileConfigStore};
use crate::game::{
    Difficulty, DifficultyRules, GameMode, GenerateError, Question, QuestionGenerator,
};
use crate::progress::{
    Achievement, Action, Progress, ProgressionEngine, Theme, ACHIEVEMENTS, THEMES,
};
use crate::runtime::{AppEvent, CrosstermEventSource, Runner};
use crate::session::GameSession;
use crate::storage::{FileStatsStore, StatsStore};

const TICK_RATE_MS: u64 = 250;

/// How long the answer feedback stays on screen before auto-advancing.
const CORRECT_FEEDBACK_SECS: f64 = 0.8;
const WRONG_FEEDBACK_SECS: f64 = 2.0;

/// casual arithmetic practice tui with streaks, mastery and daily decks
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A casual arithmetic practice TUI: multiplication and division drills across four difficulty tiers, speed and streak scoring, and persistent progression with badges, per-table mastery, and cosmetic themes."
)]
pub struct Cli {
    /// difficulty tier for new rounds
    #[clap(short, long, value_enum)]
    difficulty: Option<Difficulty>,

    /// jump straight into a mode, skipping the home menu
    #[clap(short, long, value_enum)]
    mode: Option<GameMode>,

    /// print one seeded question and its answer, then exit
    #[clap(long)]
    seed: Option<String>,

    /// reset progression (xp and mastery) and exit
    #[clap(long)]
    reset: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Home,
    Playing,
    Results,
    Profile,
}

#[derive(Debug, Clone)]
pub struct Feedback {
    pub correct: bool,
    pub remaining_secs: f64,
}

/// Everything alive while a round is on screen.
#[derive(Debug, Clone)]
pub struct PlayState {
    pub session: GameSession,
    pub question: Question,
    pub input: String,
    pub show_hint: bool,
    pub paused: bool,
    pub feedback: Option<Feedback>,
    /// Seconds spent on the current question.
    pub question_age_secs: f64,
}

/// A committed round, kept for the results screen. The unlock deltas are
/// accumulated across the whole commit batch so nothing earned mid-batch is
/// lost from the announcement.
#[derive(Debug, Clone)]
pub struct RoundSummary {
    pub session: GameSession,
    pub earned_badges: Vec<Achievement>,
    pub earned_themes: Vec<Theme>,
}

#[derive(Debug, Default)]
pub struct HomeState {
    pub mode_idx: usize,
}

#[derive(Debug, Default)]
pub struct ProfileState {
    pub theme_idx: usize,
}

enum TickOutcome {
    Nothing,
    Advance,
    Finish,
}

pub struct App {
    pub cli: Option<Cli>,
    pub screen: Screen,
    pub config: Config,
    pub config_store: FileConfigStore,
    pub stats_store: FileStatsStore,
    pub generator: QuestionGenerator,
    pub progress: Progress,
    pub home: HomeState,
    pub profile: ProfileState,
    pub play: Option<PlayState>,
    pub last_results: Option<RoundSummary>,
}

impl App {
    pub fn new(cli: Cli) -> Self {
        let config_store = FileConfigStore::new();
        let mut config = config_store.load();
        if let Some(difficulty) = cli.difficulty {
            config.difficulty = difficulty;
        }

        let stats_store = FileStatsStore::new();
        let progress = Progress::with_user(stats_store.load());

        let mode_idx = config
            .last_mode
            .and_then(|m| GameMode::MENU.iter().position(|c| *c == m))
            .unwrap_or(0);

        let mut app = Self {
            screen: Screen::Home,
            config,
            config_store,
            stats_store,
            generator: QuestionGenerator::new(DifficultyRules::standard()),
            progress,
            home: HomeState { mode_idx },
            profile: ProfileState::default(),
            play: None,
            last_results: None,
            cli: Some(cli.clone()),
        };

        if let Some(mode) = cli.mode {
            let _ = app.start_round(mode);
        }
        app
    }

    fn engine(&self) -> ProgressionEngine<'_, FileStatsStore> {
        ProgressionEngine::new(&ACHIEVEMENTS, &THEMES, &self.stats_store)
    }

    pub fn daily_done_today(&self) -> bool {
        self.progress.user.last_daily_challenge == Some(Local::now().date_naive())
    }

    pub fn seconds_since_last_daily(&self) -> Option<u64> {
        let last = self.progress.user.last_daily_challenge?;
        let days = (Local::now().date_naive() - last).num_days().max(0) as u64;
        Some(days * 24 * 60 * 60)
    }

    pub fn start_round(&mut self, mode: GameMode) -> Result<(), GenerateError> {
        // The daily deck is fixed at Advanced, same for every player.
        let difficulty = if mode == GameMode::Daily {
            Difficulty::Advanced
        } else {
            self.config.difficulty
        };
        let rule = self
            .generator
            .rules()
            .get(difficulty)
            .ok_or(GenerateError::UnknownDifficulty(difficulty))?
            .clone();

        let session = GameSession::new(mode, difficulty, &rule);
        let seed = session.next_seed(Local::now().date_naive());
        let question = self.generator.generate(difficulty, mode, seed.as_deref())?;

        self.play = Some(PlayState {
            session,
            question,
            input: String::new(),
            show_hint: false,
            paused: false,
            feedback: None,
            question_age_secs: 0.0,
        });
        self.screen = Screen::Playing;

        self.config.last_mode = Some(mode);
        let _ = self.config_store.save(&self.config);
        Ok(())
    }

    fn next_question(&mut self) -> Result<(), GenerateError> {
        let Some(play) = self.play.as_mut() else {
            return Ok(());
        };
        let seed = play.session.next_seed(Local::now().date_naive());
        play.question = self.generator.generate(
            play.session.difficulty,
            play.session.mode,
            seed.as_deref(),
        )?;
        Ok(())
    }

    fn submit_answer(&mut self) {
        let Some(play) = self.play.as_mut() else {
            return;
        };
        if play.feedback.is_some() || play.paused {
            return;
        }

        let parsed = play.input.parse::<u32>().ok();
        let correct = play
            .session
            .submit(&play.question, parsed, play.question_age_secs);
        play.feedback = Some(Feedback {
            correct,
            remaining_secs: if correct {
                CORRECT_FEEDBACK_SECS
            } else {
                WRONG_FEEDBACK_SECS
            },
        });
    }

    fn advance_round(&mut self) {
        let finished = match self.play.as_mut() {
            Some(play) => {
                play.feedback = None;
                play.show_hint = false;
                play.input.clear();
                play.question_age_secs = 0.0;
                play.session.finished()
            }
            None => return,
        };

        if finished || self.next_question().is_err() {
            self.finish_round();
        }
    }

    fn finish_round(&mut self) {
        let Some(play) = self.play.take() else {
            return;
        };
        self.commit_round(play.session);
    }

    /// Runs the round's progression actions through the reducer and lands on
    /// the results screen.
    fn commit_round(&mut self, session: GameSession) {
        let mut earned_badges = Vec::new();
        let mut earned_themes = Vec::new();

        let mut state = std::mem::take(&mut self.progress);
        {
            let engine = self.engine();
            for action in session.commit_actions() {
                state = engine.apply(&state, action);
                earned_badges.extend(state.new_badges.iter().copied());
                earned_themes.extend(state.new_themes.iter().copied());
            }
        }
        self.progress = state;

        self.last_results = Some(RoundSummary {
            session,
            earned_badges,
            earned_themes,
        });
        self.screen = Screen::Results;
    }

    fn apply_theme_selection(&mut self) {
        let theme_id = THEMES[self.profile.theme_idx].id.to_string();
        let next = {
            let engine = self.engine();
            engine.apply(&self.progress, Action::SetTheme(theme_id))
        };
        self.progress = next;
    }

    pub fn on_tick(&mut self, dt_secs: f64) {
        if self.screen != Screen::Playing {
            return;
        }
        let outcome = match self.play.as_mut() {
            Some(play) if play.paused => TickOutcome::Nothing,
            Some(play) => {
                if let Some(feedback) = play.feedback.as_mut() {
                    feedback.remaining_secs -= dt_secs;
                    if feedback.remaining_secs <= 0.0 {
                        TickOutcome::Advance
                    } else {
                        TickOutcome::Nothing
                    }
                } else {
                    play.session.on_tick(dt_secs);
                    play.question_age_secs += dt_secs;
                    if play.session.out_of_time() {
                        TickOutcome::Finish
                    } else {
                        TickOutcome::Nothing
                    }
                }
            }
            None => TickOutcome::Nothing,
        };

        match outcome {
            TickOutcome::Advance => self.advance_round(),
            TickOutcome::Finish => self.finish_round(),
            TickOutcome::Nothing => {}
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    if let Some(seed) = cli.seed.as_deref() {
        let generator = QuestionGenerator::new(DifficultyRules::standard());
        let difficulty = cli.difficulty.unwrap_or(Difficulty::Advanced);
        let mode = cli.mode.unwrap_or(GameMode::Journey);
        let question = generator.generate(difficulty, mode, Some(seed))?;
        println!("{}", question.text);
        println!("answer: {}", question.answer);
        return Ok(());
    }

    if cli.reset {
        let store = FileStatsStore::new();
        let engine = ProgressionEngine::new(&ACHIEVEMENTS, &THEMES, &store);
        let state = Progress::with_user(store.load());
        let reset = engine.apply(&state, Action::ResetProgress);
        println!(
            "progress reset: {} xp, {} tables tracked",
            reset.user.xp,
            reset.user.mastery.len()
        );
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    info!("mathquest v{} starting", env!("CARGO_PKG_VERSION"));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(cli);
    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        Duration::from_millis(TICK_RATE_MS),
    );

    loop {
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;

        match runner.step() {
            AppEvent::Tick => app.on_tick(TICK_RATE_MS as f64 / 1000.0),
            AppEvent::Resize => {}
            AppEvent::Key(key) => {
                if handle_key(app, key) {
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Returns true when the app should exit.
fn handle_key(app: &mut App, key: crossterm::event::KeyEvent) -> bool {
    use crossterm::event::{KeyCode, KeyModifiers};

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return true;
    }

    match app.screen {
        Screen::Home => match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Left => {
                app.home.mode_idx = app.home.mode_idx.checked_sub(1).unwrap_or(GameMode::MENU.len() - 1);
            }
            KeyCode::Right => {
                app.home.mode_idx = (app.home.mode_idx + 1) % GameMode::MENU.len();
            }
            KeyCode::Up | KeyCode::Down => {
                let all = Difficulty::ALL;
                let idx = all
                    .iter()
                    .position(|d| *d == app.config.difficulty)
                    .unwrap_or(0);
                let next = if key.code == KeyCode::Up {
                    idx.checked_sub(1).unwrap_or(all.len() - 1)
                } else {
                    (idx + 1) % all.len()
                };
                app.config.difficulty = all[next];
                let _ = app.config_store.save(&app.config);
            }
            KeyCode::Enter => {
                let mode = GameMode::MENU[app.home.mode_idx];
                let _ = app.start_round(mode);
            }
            KeyCode::Char('d') => {
                if !app.daily_done_today() {
                    let _ = app.start_round(GameMode::Daily);
                }
            }
            KeyCode::Char('p') => app.screen = Screen::Profile,
            _ => {}
        },
        Screen::Playing => {
            let paused = app.play.as_ref().map(|p| p.paused).unwrap_or(false);
            match key.code {
                KeyCode::Esc => {
                    if let Some(play) = app.play.as_mut() {
                        play.paused = !play.paused;
                    }
                }
                KeyCode::Enter if paused => {
                    if let Some(play) = app.play.as_mut() {
                        play.paused = false;
                    }
                }
                KeyCode::Char('q') if paused => {
                    // Abandon the round without committing anything.
                    app.play = None;
                    app.screen = Screen::Home;
                }
                KeyCode::Enter => app.submit_answer(),
                KeyCode::Backspace => {
                    if let Some(play) = app.play.as_mut() {
                        if play.feedback.is_none() && !play.paused {
                            play.input.pop();
                        }
                    }
                }
                KeyCode::Char('h') => {
                    if let Some(play) = app.play.as_mut() {
                        if app.config.hints_enabled {
                            play.show_hint = true;
                        }
                    }
                }
                KeyCode::Char(c) if c.is_ascii_digit() => {
                    if let Some(play) = app.play.as_mut() {
                        if play.feedback.is_none() && !play.paused && play.input.len() < 5 {
                            play.input.push(c);
                        }
                    }
                }
                _ => {}
            }
        }
        Screen::Results => match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Char('n') | KeyCode::Enter => {
                let mode = app
                    .last_results
                    .as_ref()
                    .map(|r| r.session.mode)
                    .unwrap_or(GameMode::Journey);
                // The daily deck is once per day; a rerun goes to the menu.
                if mode == GameMode::Daily && app.daily_done_today() {
                    app.screen = Screen::Home;
                } else {
                    let _ = app.start_round(mode);
                }
            }
            KeyCode::Char('h') => app.screen = Screen::Home,
            KeyCode::Char('p') => app.screen = Screen::Profile,
            _ => {}
        },
        Screen::Profile => match key.code {
            KeyCode::Char('q') => return true,
            KeyCode::Char('b') | KeyCode::Esc => app.screen = Screen::Home,
            KeyCode::Left => {
                app.profile.theme_idx = app
                    .profile
                    .theme_idx
                    .checked_sub(1)
                    .unwrap_or(THEMES.len() - 1);
            }
            KeyCode::Right => {
                app.profile.theme_idx = (app.profile.theme_idx + 1) % THEMES.len();
            }
            KeyCode::Enter => app.apply_theme_selection(),
            _ => {}
        },
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    fn test_app() -> App {
        // Point both stores at throwaway paths so tests never touch a real
        // profile.
        let dir = std::env::temp_dir().join(format!("mathquest-test-{}", std::process::id()));
        let cli = Cli {
            difficulty: Some(Difficulty::Beginner),
            mode: None,
            seed: None,
            reset: false,
        };
        let mut app = App::new(cli);
        app.stats_store = FileStatsStore::with_path(dir.join("stats.json"));
        app.config_store = FileConfigStore::with_path(dir.join("config.json"));
        app.progress = Progress::default();
        // A developer's real config must not leak into assertions.
        app.config = Config {
            difficulty: Difficulty::Beginner,
            last_mode: None,
            hints_enabled: true,
        };
        app.home.mode_idx = 0;
        app
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn home_navigation_wraps_modes() {
        let mut app = test_app();
        assert_eq!(app.screen, Screen::Home);

        handle_key(&mut app, key(KeyCode::Left));
        assert_eq!(app.home.mode_idx, GameMode::MENU.len() - 1);
        handle_key(&mut app, key(KeyCode::Right));
        assert_eq!(app.home.mode_idx, 0);
    }

    #[test]
    fn enter_starts_the_selected_mode() {
        let mut app = test_app();
        handle_key(&mut app, key(KeyCode::Enter));
        assert_eq!(app.screen, Screen::Playing);
        let play = app.play.as_ref().unwrap();
        assert_eq!(play.session.mode, GameMode::MENU[0]);
        assert_eq!(play.session.difficulty, Difficulty::Beginner);
    }

    #[test]
    fn digits_accumulate_and_submit_scores() {
        let mut app = test_app();
        app.start_round(GameMode::Chill).unwrap();

        let answer = app.play.as_ref().unwrap().question.answer.to_string();
        for c in answer.chars() {
            handle_key(&mut app, key(KeyCode::Char(c)));
        }
        assert_eq!(app.play.as_ref().unwrap().input, answer);

        handle_key(&mut app, key(KeyCode::Enter));
        let play = app.play.as_ref().unwrap();
        assert_eq!(play.session.correct_count, 1);
        assert!(play.feedback.as_ref().unwrap().correct);
    }

    #[test]
    fn feedback_window_blocks_further_input() {
        let mut app = test_app();
        app.start_round(GameMode::Chill).unwrap();

        handle_key(&mut app, key(KeyCode::Char('1')));
        handle_key(&mut app, key(KeyCode::Enter));
        assert!(app.play.as_ref().unwrap().feedback.is_some());

        handle_key(&mut app, key(KeyCode::Char('9')));
        assert!(app.play.as_ref().unwrap().input.is_empty() || app.play.as_ref().unwrap().input == "1");
    }

    #[test]
    fn feedback_expiry_advances_to_a_fresh_question() {
        let mut app = test_app();
        app.start_round(GameMode::Chill).unwrap();

        handle_key(&mut app, key(KeyCode::Char('1')));
        handle_key(&mut app, key(KeyCode::Enter));

        // Burn through the feedback window.
        for _ in 0..20 {
            app.on_tick(0.25);
        }
        let play = app.play.as_ref().unwrap();
        assert!(play.feedback.is_none());
        assert!(play.input.is_empty());
        assert_eq!(play.session.questions_answered, 1);
    }

    #[test]
    fn running_out_of_time_commits_the_round() {
        let mut app = test_app();
        app.start_round(GameMode::Sprint).unwrap();

        for _ in 0..400 {
            app.on_tick(0.25);
        }
        assert_eq!(app.screen, Screen::Results);
        assert!(app.play.is_none());
        assert!(app.last_results.is_some());
    }

    #[test]
    fn abandoning_a_paused_round_commits_nothing() {
        let mut app = test_app();
        app.start_round(GameMode::Journey).unwrap();

        handle_key(&mut app, key(KeyCode::Esc));
        assert!(app.play.as_ref().unwrap().paused);

        handle_key(&mut app, key(KeyCode::Char('q')));
        assert_eq!(app.screen, Screen::Home);
        assert_eq!(app.progress.user.total_questions_answered, 0);
    }

    #[test]
    fn completed_journey_round_reaches_results_with_unlocks() {
        let mut app = test_app();
        app.start_round(GameMode::Journey).unwrap();

        for _ in 0..20 {
            let answer = app.play.as_ref().unwrap().question.answer.to_string();
            for c in answer.chars() {
                handle_key(&mut app, key(KeyCode::Char(c)));
            }
            handle_key(&mut app, key(KeyCode::Enter));
            for _ in 0..5 {
                app.on_tick(0.25);
            }
        }

        assert_eq!(app.screen, Screen::Results);
        let summary = app.last_results.as_ref().unwrap();
        assert_eq!(summary.session.correct_count, 20);
        assert!(summary.earned_badges.iter().any(|b| b.id == "first_steps"));
        assert_eq!(app.progress.user.total_questions_answered, 20);
        assert!(app.progress.user.xp > 0);
    }

    #[test]
    fn theme_selection_is_gated_by_unlocks() {
        let mut app = test_app();
        app.screen = Screen::Profile;

        // Move the cursor to the locked space theme and try to apply it.
        let space_idx = THEMES.iter().position(|t| t.id == "space").unwrap();
        app.profile.theme_idx = space_idx;
        handle_key(&mut app, key(KeyCode::Enter));
        assert_eq!(app.progress.user.theme, "jungle");
    }

    #[test]
    fn ctrl_c_always_exits() {
        let mut app = test_app();
        let quit = handle_key(
            &mut app,
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
        );
        assert!(quit);
    }
}
