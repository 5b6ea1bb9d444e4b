pub mod leaderboard;
pub mod screen;

use std::time::Instant;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use eartle::{
    celebration::CelebrationAnimation,
    report::{NotificationLevel, ReportMode},
    row::{CellMark, GuessRow},
    session::MAX_ATTEMPTS,
    timer::format_mm_ss,
};

use crate::App;

const HORIZONTAL_MARGIN: u16 = 5;
const DIALOG_WIDTH: u16 = 36;
const DIALOG_HEIGHT: u16 = 9;

pub fn draw(app: &App, f: &mut Frame) {
    screen::current_screen(&app.state).render(app, f);
}

fn cell_style(mark: CellMark) -> Style {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    match mark {
        CellMark::Exact => bold.fg(Color::Black).bg(Color::Green),
        CellMark::Present => bold.fg(Color::Black).bg(Color::Yellow),
        CellMark::Absent => bold.fg(Color::White).bg(Color::DarkGray),
        CellMark::Neutral => bold,
    }
}

/// One board row as styled cells, focus shown reversed on the active row.
fn row_line(row: &GuessRow) -> Line<'static> {
    let dim_style = Style::default().add_modifier(Modifier::DIM);

    let spans = row
        .values()
        .iter()
        .zip(row.marks())
        .enumerate()
        .flat_map(|(col, (value, mark))| {
            let mut style = match value {
                Some(_) => cell_style(mark),
                None => dim_style,
            };
            if row.is_active() && col == row.focus_column() {
                style = style.add_modifier(Modifier::REVERSED);
            }
            let symbol = value.unwrap_or('·');
            [Span::styled(format!(" {symbol} "), style), Span::raw(" ")]
        })
        .collect::<Vec<Span>>();

    Line::from(spans)
}

fn centered(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let session = &self.session;
        let now = Instant::now();

        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);
        let dim_bold_style = Style::default()
            .patch(bold_style)
            .add_modifier(Modifier::DIM);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .constraints([
                Constraint::Length(3), // header
                Constraint::Min(1),    // board
                Constraint::Length(1), // legend
            ])
            .split(area);

        // header: mode on the left, clock and player on the right
        let header = Block::default()
            .borders(Borders::BOTTOM)
            .title(Span::styled(" Eartle ", bold_style.fg(Color::Green)));
        let header_inner = header.inner(chunks[0]);
        header.render(chunks[0], buf);

        let mode = match (&self.mode, &self.daily) {
            (ReportMode::Daily { .. }, Some(daily)) => format!("Daily {}", daily.date),
            (ReportMode::Daily { .. }, None) => "Daily".to_string(),
            (ReportMode::Local, _) => format!("Practice · {} letters", session.word_length()),
        };
        Paragraph::new(Span::styled(mode, italic_style)).render(header_inner, buf);

        let player = self
            .identity
            .as_ref()
            .map_or_else(|| "guest".to_string(), |i| i.display_name.clone());
        let clock = format!("{}  {}", format_mm_ss(session.elapsed(now)), player);
        Paragraph::new(Span::styled(clock, bold_style))
            .alignment(Alignment::Right)
            .render(header_inner, buf);

        // board
        let board_height = (MAX_ATTEMPTS * 2 - 1) as u16;
        let board_area = centered(chunks[1].width, board_height, chunks[1]);
        let lines = session
            .rows()
            .iter()
            .enumerate()
            .flat_map(|(i, row)| {
                let mut lines = vec![row_line(row)];
                if i + 1 < MAX_ATTEMPTS {
                    lines.push(Line::from(""));
                }
                lines
            })
            .collect::<Vec<Line>>();
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .render(board_area, buf);

        let legend = if session.is_finished() {
            let mut legend = String::from("(n)ew practice / (d)aily / (l)eaderboard");
            if self.reporter.can_retry() {
                legend.push_str(" / (u) retry submit");
            }
            legend.push_str(" / (esc)ape");
            legend
        } else {
            String::from("(enter) submit / (←→) move / (del) clear / (tab) board / (esc)ape")
        };
        Paragraph::new(Span::styled(legend, italic_style))
            .alignment(Alignment::Center)
            .render(chunks[2], buf);

        if self.show_result {
            render_result_dialog(self, area, buf);
        }

        if let Some((notification, _)) = &self.notification {
            let color = match notification.level {
                NotificationLevel::Success => Color::Green,
                NotificationLevel::Info => Color::Cyan,
                NotificationLevel::Error => Color::Red,
            };
            let width = (notification.message.width() as u16 + 4).min(area.width);
            let toast_area = Rect::new(area.x + area.width - width, area.y + 3, width, 3)
                .intersection(area);
            Clear.render(toast_area, buf);
            Paragraph::new(Span::styled(notification.message.clone(), dim_bold_style.fg(color)))
                .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(color)))
                .wrap(Wrap { trim: true })
                .render(toast_area, buf);
        }

        if self.celebration.is_active {
            render_celebration_particles(&self.celebration, area, buf);
        }
    }
}

fn render_result_dialog(app: &App, area: Rect, buf: &mut Buffer) {
    let Some(result) = &app.last_result else {
        return;
    };

    let (title, color) = if result.has_won {
        ("Congratulations!", Color::Green)
    } else {
        ("Game Over!", Color::Red)
    };
    let bold_style = Style::default().add_modifier(Modifier::BOLD);

    let mut lines = vec![
        Line::from(vec![
            Span::raw("The word was "),
            Span::styled(result.target_word.clone(), bold_style.fg(color)),
        ]),
        Line::from(""),
        Line::from(format!("Time taken: {}", format_mm_ss(result.time_taken))),
        Line::from(format!("Guesses: {} / {}", result.total_guesses, MAX_ATTEMPTS)),
        Line::from(""),
    ];
    lines.push(Line::from(Span::styled(
        match app.mode {
            ReportMode::Local => "(n) play again / (space) hide",
            ReportMode::Daily { .. } => "(l)eaderboard / (space) hide",
        },
        Style::default().add_modifier(Modifier::ITALIC),
    )));

    let dialog_area = centered(DIALOG_WIDTH, DIALOG_HEIGHT, area);
    Clear.render(dialog_area, buf);
    Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color))
                .title(Span::styled(format!(" {title} "), bold_style.fg(color))),
        )
        .alignment(Alignment::Center)
        .render(dialog_area, buf);
}

/// Render celebration particles on top of the board
fn render_celebration_particles(celebration: &CelebrationAnimation, area: Rect, buf: &mut Buffer) {
    let colors = [
        Color::Yellow,
        Color::Magenta,
        Color::Cyan,
        Color::Green,
        Color::Red,
        Color::Blue,
        Color::LightYellow,
    ];

    for particle in &celebration.particles {
        if particle.x < 0.0 || particle.y < 0.0 {
            continue;
        }
        let x = particle.x as u16;
        let y = particle.y as u16;

        if x < area.width && y < area.height {
            let color = colors[particle.color_index % colors.len()];

            let alpha = 1.0 - (particle.age / particle.max_age);

            let style = if particle.is_text {
                if alpha > 0.4 {
                    Style::default().fg(color).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(color)
                }
            } else if alpha > 0.7 {
                Style::default().fg(color).add_modifier(Modifier::BOLD)
            } else if alpha > 0.3 {
                Style::default().fg(color)
            } else {
                Style::default().fg(color).add_modifier(Modifier::DIM)
            };

            if let Some(cell) = buf.cell_mut((area.x + x, area.y + y)) {
                cell.set_symbol(&particle.symbol.to_string());
                cell.set_style(style);
            }
        }
    }
}
