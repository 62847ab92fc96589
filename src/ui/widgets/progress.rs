//! Step plan progress widget

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::app::{StepState, StepStatus};
use crate::ui::theme;
use crate::ui::widgets::Spinner;

pub struct ProgressSteps<'a> {
    steps: &'a [StepStatus],
    spinner_state: usize,
    title: Option<&'a str>,
}

impl<'a> ProgressSteps<'a> {
    pub fn new(steps: &'a [StepStatus], spinner_state: usize) -> Self {
        Self {
            steps,
            spinner_state,
            title: None,
        }
    }

    pub fn title(mut self, title: &'a str) -> Self {
        self.title = Some(title);
        self
    }

    fn step_line(&self, index: usize, step: &'a StepStatus) -> Line<'a> {
        let counter = format!(" {:>2}/{} ", index + 1, self.steps.len());

        match step.status {
            StepState::Pending => Line::from(vec![
                Span::styled(counter, theme::dim()),
                Span::styled(&step.name, theme::dim()),
            ]),
            StepState::Running => {
                let spinner = Spinner::new(self.spinner_state);
                Line::from(vec![
                    Span::styled(counter, theme::info()),
                    Span::styled(format!("{} ", spinner.char()), theme::info()),
                    Span::styled(&step.name, theme::text()),
                    Span::styled("...", theme::dim()),
                ])
            }
            StepState::Complete => Line::from(vec![
                Span::styled(counter, theme::dim()),
                Span::styled("✓ ", theme::success()),
                Span::styled(&step.name, theme::text()),
            ]),
            StepState::Failed => Line::from(vec![
                Span::styled(counter, theme::dim()),
                Span::styled("✗ ", theme::error()),
                Span::styled(&step.name, theme::error()),
            ]),
            StepState::Skipped => Line::from(vec![
                Span::styled(counter, theme::dim()),
                Span::styled(&step.name, theme::dim()),
                Span::styled("  (skipped)", theme::dim()),
            ]),
        }
    }
}

impl Widget for ProgressSteps<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let lines: Vec<Line> = self
            .steps
            .iter()
            .enumerate()
            .map(|(i, step)| self.step_line(i, step))
            .collect();

        let mut block = Block::default()
            .borders(Borders::ALL)
            .border_style(theme::border());

        if let Some(title) = self.title {
            block = block.title(Span::styled(title, theme::title()));
        }

        Paragraph::new(lines).block(block).render(area, buf);
    }
}
