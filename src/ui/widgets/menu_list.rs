//! Selectable menu list widget

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::ui::theme;

pub struct MenuList<'a> {
    items: Vec<&'a str>,
    selected: usize,
    title: Option<&'a str>,
}

impl<'a> MenuList<'a> {
    pub fn new(items: Vec<&'a str>, selected: usize) -> Self {
        // Clamp to a valid index so a stale selection cannot panic
        let clamped = if items.is_empty() {
            0
        } else {
            selected.min(items.len() - 1)
        };

        Self {
            items,
            selected: clamped,
            title: None,
        }
    }

    pub fn title(mut self, title: &'a str) -> Self {
        self.title = Some(title);
        self
    }
}

impl Widget for MenuList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let lines: Vec<Line> = self
            .items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                if i == self.selected {
                    Line::from(vec![
                        Span::styled(" > ", theme::title()),
                        Span::styled(*item, theme::selected()),
                    ])
                } else {
                    Line::from(vec![
                        Span::raw("   "),
                        Span::styled(*item, theme::text()),
                    ])
                }
            })
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
