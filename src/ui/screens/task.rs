//! Task screen: live progress, streamed output, and the completion view

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::{App, ConfirmPrompt, TaskPhase, TaskState};
use crate::tasks::TaskOutcome;
use crate::ui::layout::{centered_fixed, progress_layout};
use crate::ui::theme;
use crate::ui::widgets::{LogView, ProgressSteps};

pub fn draw(frame: &mut Frame, task: &TaskState, app: &App) {
    let area = frame.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(2),
        ])
        .split(area);

    draw_title(frame, chunks[0], task);

    let output_vec: Vec<String> = task.output.iter().cloned().collect();
    let (steps_area, output_area) = progress_layout(chunks[1], task.steps.len());

    let progress = ProgressSteps::new(&task.steps, app.spinner_state).title(" Progress ");
    frame.render_widget(progress, steps_area);

    let mut log = LogView::new(&output_vec).title(" Output ");
    if let TaskPhase::Complete {
        scroll_offset: Some(offset),
        ..
    } = &task.phase
    {
        log = log.scroll_offset(*offset);
    }
    frame.render_widget(log, output_area);

    draw_footer(frame, chunks[2], task);

    if let TaskPhase::AwaitingConfirmation(prompt) = &task.phase {
        draw_confirm_prompt(frame, area, prompt);
    }
}

fn draw_title(frame: &mut Frame, area: Rect, task: &TaskState) {
    let (text, style) = match &task.phase {
        TaskPhase::Running { cancelling: true } => (
            format!(" {} — stopping... ", task.recipe.title()),
            theme::warning(),
        ),
        TaskPhase::Running { cancelling: false } | TaskPhase::AwaitingConfirmation(_) => {
            (format!(" {} ", task.recipe.title()), theme::title())
        }
        TaskPhase::Complete { outcome, .. } => {
            let (suffix, style) = outcome_banner(outcome);
            (format!(" {} — {} ", task.recipe.title(), suffix), style)
        }
    };

    let header = Paragraph::new(Line::from(Span::styled(text, style)))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme::border_active()),
        );
    frame.render_widget(header, area);
}

fn outcome_banner(outcome: &TaskOutcome) -> (String, ratatui::style::Style) {
    match outcome {
        TaskOutcome::Completed => ("completed".to_string(), theme::success()),
        TaskOutcome::CompletedWithWarnings => {
            ("completed with warnings".to_string(), theme::warning())
        }
        TaskOutcome::Failed { step } => (format!("failed at: {}", step), theme::error()),
        TaskOutcome::Cancelled => ("cancelled".to_string(), theme::warning()),
    }
}

fn draw_footer(frame: &mut Frame, area: Rect, task: &TaskState) {
    let hints = match &task.phase {
        TaskPhase::Running { cancelling: false } => Line::from(vec![
            Span::styled("[", theme::dim()),
            Span::styled("Esc", theme::key_hint()),
            Span::styled("] Stop", theme::dim()),
        ]),
        TaskPhase::Running { cancelling: true } => Line::from(Span::styled(
            "Stopping after the current command...",
            theme::warning(),
        )),
        TaskPhase::AwaitingConfirmation(_) => Line::from(vec![
            Span::styled("[", theme::dim()),
            Span::styled("Y", theme::key_hint()),
            Span::styled("] Proceed  [", theme::dim()),
            Span::styled("N", theme::key_hint()),
            Span::styled("] Skip", theme::dim()),
        ]),
        TaskPhase::Complete { .. } => Line::from(vec![
            Span::styled("[", theme::dim()),
            Span::styled("↑↓", theme::key_hint()),
            Span::styled("] Scroll  [", theme::dim()),
            Span::styled("Enter", theme::key_hint()),
            Span::styled("] Menu  [", theme::dim()),
            Span::styled("q", theme::key_hint()),
            Span::styled("] Quit", theme::dim()),
        ]),
    };

    let footer = Paragraph::new(hints).alignment(Alignment::Center);
    frame.render_widget(footer, area);
}

/// Modal confirmation prompt; the worker is suspended until it is answered
fn draw_confirm_prompt(frame: &mut Frame, area: Rect, prompt: &ConfirmPrompt) {
    // Size to content, bounded by the screen
    let content_width = prompt
        .details
        .iter()
        .map(|d| d.len())
        .chain(std::iter::once(prompt.title.len()))
        .max()
        .unwrap_or(0) as u16;
    let width = (content_width + 6).clamp(44, area.width.saturating_sub(4));
    let height = (prompt.details.len() as u16 + 6).min(area.height.saturating_sub(4));
    let popup_area = centered_fixed(width, height, area);

    frame.render_widget(Clear, popup_area);

    let mut lines = vec![Line::from("")];
    for detail in &prompt.details {
        lines.push(Line::from(Span::styled(detail.as_str(), theme::text())));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("[", theme::dim()),
        Span::styled("Y/Enter", theme::key_hint()),
        Span::styled("] Proceed  [", theme::dim()),
        Span::styled("N/Esc", theme::key_hint()),
        Span::styled("] Skip", theme::dim()),
    ]));

    let content = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme::border_active())
                .title(Span::styled(
                    format!(" {} ", prompt.title),
                    theme::title(),
                )),
        );
    frame.render_widget(content, popup_area);
}
