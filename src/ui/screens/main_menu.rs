//! Main menu screen

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::tasks::recipes::Recipe;
use crate::ui::layout::centered_rect;
use crate::ui::theme;
use crate::ui::widgets::MenuList;

/// ASCII logo (all lines padded to the same width for proper centering)
const LOGO: &[&str] = &[
    r#"                 __                  "#,
    r#"  __  __  ____  / /_____  ___  ____  "#,
    r#" / / / / / __ \/ //_/ _ \/ _ \/ __ \ "#,
    r#"/ /_/ / / /_/ / ,< /  __/  __/ /_/ / "#,
    r#"\__,_/ / .___/_/|_|\___/\___/ .___/  "#,
    r#"      /_/                  /_/       "#,
];

pub fn draw(frame: &mut Frame, selected: usize) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(9),  // Header with logo
            Constraint::Min(12),    // Menu
            Constraint::Length(3),  // Footer
        ])
        .split(centered_rect(80, 90, area));

    draw_header(frame, chunks[0]);

    let items: Vec<&str> = Recipe::ALL.iter().map(|r| r.title()).collect();
    let menu = MenuList::new(items, selected).title(" Maintenance ");
    frame.render_widget(menu, chunks[1]);

    draw_footer(frame, chunks[2]);
}

fn draw_header(frame: &mut Frame, area: Rect) {
    let mut lines: Vec<Line> = LOGO
        .iter()
        .map(|line| Line::from(Span::styled(*line, theme::title())))
        .collect();

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "System maintenance for Manjaro and Arch",
        theme::dim(),
    )));

    let header = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(header, area);
}

fn draw_footer(frame: &mut Frame, area: Rect) {
    let hints = Line::from(vec![
        Span::styled("[", theme::dim()),
        Span::styled("↑↓", theme::key_hint()),
        Span::styled("] Navigate  [", theme::dim()),
        Span::styled("Enter", theme::key_hint()),
        Span::styled("] Run  [", theme::dim()),
        Span::styled("q", theme::key_hint()),
        Span::styled("] Quit", theme::dim()),
    ]);

    let footer = Paragraph::new(hints).alignment(Alignment::Center);
    frame.render_widget(footer, area);
}
