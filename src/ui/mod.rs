//! UI rendering module

mod layout;
mod screens;
pub mod theme;
pub mod widgets;

use ratatui::{
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::{App, AppMode};

/// Main draw function - dispatches to the screen for the current mode
pub fn draw(frame: &mut Frame, app: &App) {
    match &app.mode {
        AppMode::MainMenu { selected } => {
            screens::main_menu::draw(frame, *selected);
        }
        AppMode::Task(task) => {
            screens::task::draw(frame, task, app);
        }
    }

    // Exit confirmation popup sits on top of any screen
    if app.show_exit_confirm {
        draw_exit_confirm(frame);
    }
}

/// Draw the exit confirmation popup centered on screen
fn draw_exit_confirm(frame: &mut Frame) {
    let area = frame.area();
    let popup_area = layout::centered_fixed(40, 7, area);

    frame.render_widget(Clear, popup_area);

    let content = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled("Are you sure you want to exit?", theme::text())),
        Line::from(""),
        Line::from(vec![
            Span::styled("[", theme::dim()),
            Span::styled("Enter/Y", theme::key_hint()),
            Span::styled("] Yes  [", theme::dim()),
            Span::styled("Esc/N", theme::key_hint()),
            Span::styled("] No", theme::dim()),
        ]),
    ])
    .alignment(ratatui::layout::Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(theme::warning())
            .title(Span::styled(" Exit ", theme::warning())),
    );
    frame.render_widget(content, popup_area);
}
