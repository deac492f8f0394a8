use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Widget, Wrap},
};
use time_humanize::{Accuracy, HumanTime, Tense};
use unicode_width::UnicodeWidthStr;

use crate::game::GameMode;
use crate::progress::{theme_by_id, Theme, ThemePalette, ACHIEVEMENTS, THEMES};
use crate::{App, Feedback, PlayState, RoundSummary, Screen};

const HORIZONTAL_MARGIN: u16 = 2;

fn active_palette(app: &App) -> &'static ThemePalette {
    let theme = theme_by_id(&app.progress.user.theme).unwrap_or(&THEMES[0]);
    &theme.palette
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.screen {
            Screen::Home => render_home(self, area, buf),
            Screen::Playing => {
                if let Some(play) = &self.play {
                    render_game(self, play, area, buf);
                }
            }
            Screen::Results => {
                if let Some(summary) = &self.last_results {
                    render_results(self, summary, area, buf);
                }
            }
            Screen::Profile => render_profile(self, area, buf),
        }
    }
}

fn render_home(app: &App, area: Rect, buf: &mut Buffer) {
    let palette = active_palette(app);
    let user = &app.progress.user;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(5),
            Constraint::Length(2),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    let title = Paragraph::new(vec![
        Line::from(Span::styled(
            "MathQuest",
            Style::default()
                .fg(palette.primary)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!(
                "Level {}   {} xp   best streak {}",
                user.level, user.xp, user.streak_record
            ),
            Style::default().fg(palette.text),
        )),
    ])
    .alignment(Alignment::Center);
    title.render(chunks[0], buf);

    let daily_line = if app.daily_done_today() {
        let ago = app
            .seconds_since_last_daily()
            .map(|secs| {
                HumanTime::from(std::time::Duration::from_secs(secs))
                    .to_text_en(Accuracy::Rough, Tense::Past)
            })
            .unwrap_or_else(|| "today".to_string());
        Line::from(Span::styled(
            format!(
                "Daily deck done ({ago})   streak {} days",
                user.daily_streak
            ),
            Style::default().add_modifier(Modifier::DIM),
        ))
    } else {
        Line::from(vec![
            Span::styled(
                "[d] Daily Challenge",
                Style::default()
                    .fg(palette.accent)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!(
                "  double points, 20 questions   streak {} days",
                user.daily_streak
            )),
        ])
    };
    Paragraph::new(daily_line)
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

    let mode_areas = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(chunks[2]);

    for (i, mode) in GameMode::MENU.iter().enumerate() {
        let selected = i == app.home.mode_idx;
        let style = if selected {
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(palette.text)
        };
        let block = Block::default().borders(Borders::ALL).border_style(style);
        let card = Paragraph::new(vec![
            Line::from(Span::styled(mode.title(), style)),
            Line::from(Span::styled(
                mode.tagline(),
                Style::default().add_modifier(Modifier::DIM),
            )),
        ])
        .alignment(Alignment::Center)
        .block(block);
        card.render(mode_areas[i], buf);
    }

    let difficulty = app.config.difficulty;
    let label = app
        .generator
        .rules()
        .get(difficulty)
        .map(|r| r.label)
        .unwrap_or("");
    Paragraph::new(Line::from(vec![
        Span::raw("difficulty  "),
        Span::styled(
            format!("< {difficulty} >"),
            Style::default()
                .fg(palette.primary)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("  {label}"), Style::default().add_modifier(Modifier::DIM)),
    ]))
    .alignment(Alignment::Center)
    .render(chunks[3], buf);

    Paragraph::new(Span::styled(
        "←/→ mode   ↑/↓ difficulty   enter start   d daily   p profile   q quit",
        Style::default().add_modifier(Modifier::DIM),
    ))
    .alignment(Alignment::Center)
    .render(chunks[5], buf);
}

fn render_game(app: &App, play: &PlayState, area: Rect, buf: &mut Buffer) {
    let palette = active_palette(app);
    let session = &play.session;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(1),
            Constraint::Min(7),
            Constraint::Length(2),
        ])
        .split(area);

    let header_areas = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(chunks[0]);

    Paragraph::new(Line::from(vec![
        Span::styled("score ", Style::default().add_modifier(Modifier::DIM)),
        Span::styled(
            format!("{}", session.score),
            Style::default()
                .fg(palette.primary)
                .add_modifier(Modifier::BOLD),
        ),
    ]))
    .render(header_areas[0], buf);

    if session.mode.is_timed() {
        let low = session.time_left < 10.0;
        let timer_style = if low {
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(palette.text).add_modifier(Modifier::BOLD)
        };
        Paragraph::new(Span::styled(
            format!("{:.0}s", session.time_left.max(0.0)),
            timer_style,
        ))
        .alignment(Alignment::Center)
        .render(header_areas[1], buf);
    }

    let streak_label = if session.multiplier > 1 {
        format!("streak {}  {}x", session.current_streak, session.multiplier)
    } else {
        format!("streak {}", session.current_streak)
    };
    Paragraph::new(Span::styled(
        streak_label,
        Style::default().fg(palette.accent),
    ))
    .alignment(Alignment::Right)
    .render(header_areas[2], buf);

    if let Some(limit) = session.mode.question_limit() {
        let ratio = f64::from(session.questions_answered) / f64::from(limit);
        Gauge::default()
            .gauge_style(Style::default().fg(palette.secondary))
            .ratio(ratio.clamp(0.0, 1.0))
            .label(format!("{}/{limit}", session.questions_answered))
            .render(chunks[1], buf);
    }

    render_question_card(app, play, chunks[2], buf);

    let help = if play.paused {
        "paused   enter resume   q quit round"
    } else {
        "0-9 type   enter submit   backspace erase   h hint   esc pause"
    };
    Paragraph::new(Span::styled(
        help,
        Style::default().add_modifier(Modifier::DIM),
    ))
    .alignment(Alignment::Center)
    .render(chunks[3], buf);
}

fn render_question_card(app: &App, play: &PlayState, area: Rect, buf: &mut Buffer) {
    let palette = active_palette(app);

    let shown = if play.input.is_empty() {
        play.question.text.clone()
    } else {
        play.question.text.replace('?', &play.input)
    };

    let mut lines = vec![Line::from(Span::styled(
        shown.clone(),
        Style::default()
            .fg(palette.text)
            .add_modifier(Modifier::BOLD),
    ))];

    match &play.feedback {
        Some(Feedback { correct: true, .. }) => {
            lines.push(Line::default());
            lines.push(Line::from(Span::styled(
                "Correct!",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            )));
        }
        Some(Feedback { correct: false, .. }) => {
            lines.push(Line::default());
            lines.push(Line::from(Span::styled(
                format!("Answer: {}", play.question.answer),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(Span::styled(
                play.question.hint.clone(),
                Style::default().add_modifier(Modifier::DIM),
            )));
        }
        None if play.show_hint => {
            lines.push(Line::default());
            lines.push(Line::from(Span::styled(
                play.question.hint.clone(),
                Style::default().fg(palette.accent),
            )));
        }
        None => {}
    }

    if play.paused {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            "PAUSED",
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD),
        )));
    }

    // Card width tracks the prompt, with room for borders and breathing space.
    let card_width = (shown.width() as u16 + 8).min(area.width).max(24);
    let card_height = (lines.len() as u16 + 2).min(area.height);
    let card = centered_rect(area, card_width, card_height);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.primary));
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(block)
        .render(card, buf);
}

fn render_results(app: &App, summary: &RoundSummary, area: Rect, buf: &mut Buffer) {
    let palette = active_palette(app);
    let session = &summary.session;

    let mut lines = vec![
        Line::from(Span::styled(
            "Session Complete",
            Style::default().add_modifier(Modifier::DIM),
        )),
        Line::from(Span::styled(
            format!("{}", session.score),
            Style::default()
                .fg(palette.primary)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!("+{} xp", session.score.max(0.0) as u64),
            Style::default().fg(palette.accent),
        )),
        Line::default(),
        Line::from(Span::raw(format!(
            "accuracy {}%   solved {}   best x{}",
            session.accuracy_percent(),
            session.correct_count,
            session.multiplier
        ))),
    ];

    if let Some(avg) = session.avg_answer_secs() {
        lines.push(Line::from(Span::styled(
            format!("{avg:.1}s per answer"),
            Style::default().add_modifier(Modifier::DIM),
        )));
    }

    let mut tables: Vec<(u32, usize)> = session.table_drill_counts().into_iter().collect();
    tables.sort_unstable();
    if !tables.is_empty() {
        let drilled = tables
            .iter()
            .map(|(table, n)| format!("{table}s x{n}"))
            .collect::<Vec<_>>()
            .join("  ");
        lines.push(Line::from(Span::styled(
            format!("tables: {drilled}"),
            Style::default().add_modifier(Modifier::DIM),
        )));
    }

    if !summary.earned_badges.is_empty() || !summary.earned_themes.is_empty() {
        lines.push(Line::default());
        for badge in &summary.earned_badges {
            lines.push(Line::from(Span::styled(
                format!("{} {} unlocked", badge.icon, badge.title),
                Style::default()
                    .fg(palette.accent)
                    .add_modifier(Modifier::BOLD),
            )));
        }
        for theme in &summary.earned_themes {
            lines.push(Line::from(Span::styled(
                format!("new theme: {}", theme.name),
                Style::default()
                    .fg(palette.accent)
                    .add_modifier(Modifier::BOLD),
            )));
        }
    }

    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        "n again   h home   p profile   q quit",
        Style::default().add_modifier(Modifier::DIM),
    )));

    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(inset(area, HORIZONTAL_MARGIN, 2), buf);
}

fn render_profile(app: &App, area: Rect, buf: &mut Buffer) {
    let palette = active_palette(app);
    let user = &app.progress.user;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(1)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(4),
            Constraint::Length(ACHIEVEMENTS.len() as u16 + 1),
            Constraint::Length(THEMES.len() as u16 + 1),
            Constraint::Length(1),
        ])
        .split(area);

    Paragraph::new(Line::from(Span::styled(
        format!(
            "Profile   level {}   {} xp   {} answered   accuracy {}%",
            user.level,
            user.xp,
            user.total_questions_answered,
            user.accuracy_percent()
        ),
        Style::default()
            .fg(palette.primary)
            .add_modifier(Modifier::BOLD),
    )))
    .render(chunks[0], buf);

    let mut mastery_lines = vec![Line::from(Span::styled(
        "mastery",
        Style::default().add_modifier(Modifier::DIM),
    ))];
    if user.mastery.is_empty() {
        mastery_lines.push(Line::from(Span::styled(
            "no tables drilled yet",
            Style::default().add_modifier(Modifier::DIM),
        )));
    }
    for (table, score) in &user.mastery {
        let filled = usize::from(*score / 5);
        let bar = format!("{}{}", "█".repeat(filled), "░".repeat(20 - filled));
        mastery_lines.push(Line::from(vec![
            Span::raw(format!("{table:>2}  ")),
            Span::styled(bar, Style::default().fg(palette.secondary)),
            Span::raw(format!(" {score:>3}")),
        ]));
    }
    Paragraph::new(mastery_lines).render(chunks[1], buf);

    let mut badge_lines = vec![Line::from(Span::styled(
        "badges",
        Style::default().add_modifier(Modifier::DIM),
    ))];
    for achievement in &ACHIEVEMENTS {
        let line = if user.has_badge(achievement.id) {
            Line::from(Span::styled(
                format!("{} {}  {}", achievement.icon, achievement.title, achievement.description),
                Style::default().fg(palette.accent),
            ))
        } else {
            Line::from(Span::styled(
                format!("   {}  {}", achievement.title, achievement.description),
                Style::default().add_modifier(Modifier::DIM),
            ))
        };
        badge_lines.push(line);
    }
    Paragraph::new(badge_lines).render(chunks[2], buf);

    let mut theme_lines = vec![Line::from(Span::styled(
        "themes",
        Style::default().add_modifier(Modifier::DIM),
    ))];
    for (i, theme) in THEMES.iter().enumerate() {
        theme_lines.push(theme_line(user_has(app, theme), theme, app, i));
    }
    Paragraph::new(theme_lines).render(chunks[3], buf);

    Paragraph::new(Span::styled(
        "←/→ pick theme   enter apply   b back   q quit",
        Style::default().add_modifier(Modifier::DIM),
    ))
    .alignment(Alignment::Center)
    .render(chunks[4], buf);
}

fn user_has(app: &App, theme: &Theme) -> bool {
    app.progress.user.has_theme(theme.id)
}

fn theme_line(unlocked: bool, theme: &'static Theme, app: &App, idx: usize) -> Line<'static> {
    let cursor = if idx == app.profile.theme_idx { "> " } else { "  " };
    let active = if app.progress.user.theme == theme.id {
        "  (active)"
    } else {
        ""
    };
    if unlocked {
        Line::from(Span::styled(
            format!("{cursor}{}{active}", theme.name),
            Style::default().fg(theme.palette.primary),
        ))
    } else {
        Line::from(Span::styled(
            format!("{cursor}{}  locked: {}", theme.name, theme.unlock_description),
            Style::default().add_modifier(Modifier::DIM),
        ))
    }
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn inset(area: Rect, dx: u16, dy: u16) -> Rect {
    Rect {
        x: area.x + dx.min(area.width / 2),
        y: area.y + dy.min(area.height / 2),
        width: area.width.saturating_sub(dx * 2),
        height: area.height.saturating_sub(dy * 2),
    }
}
