use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use eartle::collab::LeaderboardEntry;
use eartle::timer::format_duration_pill;

use crate::App;

/// Pure presenter for a single leaderboard row
pub fn present_row(rank: usize, entry: &LeaderboardEntry, is_me: bool) -> Row<'static> {
    let rank_color = match rank {
        1 => Color::Yellow,
        2 => Color::Gray,
        3 => Color::Rgb(205, 127, 50),
        _ => Color::White,
    };

    let name = if entry.display_name.trim().is_empty() {
        entry.username.clone()
    } else {
        format!("{} (@{})", entry.display_name, entry.username)
    };

    let style = if is_me {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };

    Row::new(vec![
        Cell::from(format!("#{rank}")).style(Style::default().fg(rank_color)),
        Cell::from(name),
        Cell::from(entry.guesses.to_string()),
        Cell::from(format_duration_pill(entry.duration.max(0) as u64)),
        Cell::from(entry.score.to_string()).style(Style::default().fg(Color::Green)),
    ])
    .style(style)
}

pub fn render_leaderboard(app: &App, f: &mut Frame) {
    let area = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(0),    // Table
            Constraint::Length(1), // Instructions
        ])
        .split(area);

    let title = Paragraph::new(format!("Leaderboard (page {})", app.leaderboard.page()))
        .block(Block::default().borders(Borders::ALL))
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center);
    f.render_widget(title, chunks[0]);

    if let Some(error) = &app.leaderboard.error {
        let failed = Paragraph::new(format!("{error}. Press (r) to try again."))
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Red));
        f.render_widget(failed, chunks[1]);
    } else if app.leaderboard.entries.is_empty() {
        let empty = Paragraph::new(if app.leaderboard.offset == 0 {
            "No scores yet. Finish a daily puzzle to get on the board."
        } else {
            "No more players."
        })
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Gray));
        f.render_widget(empty, chunks[1]);
    } else {
        let me = app.identity.as_ref().map(|i| i.id.as_str());

        let header = Row::new(vec![
            Cell::from("Rank"),
            Cell::from("Player"),
            Cell::from("Guesses"),
            Cell::from("Time"),
            Cell::from("Score"),
        ])
        .style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

        let rows: Vec<Row> = app
            .leaderboard
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                present_row(
                    app.leaderboard.offset + i + 1,
                    entry,
                    Some(entry.id.as_str()) == me,
                )
            })
            .collect();

        let widths = [
            Constraint::Length(6),
            Constraint::Min(16),
            Constraint::Length(8),
            Constraint::Length(9),
            Constraint::Length(7),
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .block(Block::default().borders(Borders::ALL).title("Top players"))
            .column_spacing(2);

        f.render_widget(table, chunks[1]);
    }

    let instructions = Paragraph::new("(↑/↓) page  (Home) top  (r) refresh  (b/tab) back  (esc) quit")
        .alignment(Alignment::Center)
        .wrap(ratatui::widgets::Wrap { trim: true });
    f.render_widget(instructions, chunks[2]);
}
