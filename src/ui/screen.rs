use ratatui::{
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::{ui::leaderboard::render_leaderboard, App, AppState};

/// A UI Screen boundary: responsible for rendering one app state
pub trait Screen {
    fn render(&self, app: &App, f: &mut Frame);
}

/// Board, header and result dialog
pub struct PlayScreen;

impl Screen for PlayScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        f.render_widget(app, f.area());
    }
}

pub struct LeaderboardScreen;

impl Screen for LeaderboardScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        render_leaderboard(app, f);
    }
}

/// Shown when the daily word could not be fetched
pub struct DailyUnavailableScreen {
    reason: String,
}

impl Screen for DailyUnavailableScreen {
    fn render(&self, _app: &App, f: &mut Frame) {
        let text = vec![
            Line::from(Span::styled(
                "Failed to load the daily word",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled(
                self.reason.clone(),
                Style::default().add_modifier(Modifier::ITALIC),
            )),
            Line::from(""),
            Line::from("(r)etry / (p)ractice / (l)eaderboard / (esc)ape"),
        ];

        let widget = Paragraph::new(text)
            .block(Block::default().borders(Borders::ALL).title(" Eartle "))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        f.render_widget(widget, f.area());
    }
}

/// Helper to construct the appropriate screen for the current state
pub fn current_screen(state: &AppState) -> Box<dyn Screen> {
    match state {
        AppState::Playing => Box::new(PlayScreen),
        AppState::Leaderboard => Box::new(LeaderboardScreen),
        AppState::DailyUnavailable(reason) => Box::new(DailyUnavailableScreen {
            reason: reason.clone(),
        }),
    }
}
