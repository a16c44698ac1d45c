use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::ui::theme::Theme;

/// Bordered single-column list with a cursor. Used for the subject, topic,
/// and quiz-length selection screens.
pub struct Picker<'a> {
    pub title: String,
    pub items: &'a [String],
    pub selected: usize,
    pub theme: &'a Theme,
}

impl<'a> Picker<'a> {
    pub fn new(title: &str, items: &'a [String], selected: usize, theme: &'a Theme) -> Self {
        Self {
            title: title.to_string(),
            items,
            selected,
            theme,
        }
    }
}

impl Widget for Picker<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(format!(" {} ", self.title))
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        if self.items.is_empty() {
            let empty = Paragraph::new(Line::from(Span::styled(
                "  (nothing to choose from)",
                Style::default().fg(colors.dim()),
            )));
            empty.render(inner, buf);
            return;
        }

        // Keep the cursor visible when the list is taller than the area
        let visible = inner.height as usize;
        let offset = if self.selected >= visible {
            self.selected + 1 - visible
        } else {
            0
        };

        let lines: Vec<Line> = self
            .items
            .iter()
            .enumerate()
            .skip(offset)
            .take(visible)
            .map(|(i, item)| {
                let is_selected = i == self.selected;
                let indicator = if is_selected { ">" } else { " " };
                Line::from(Span::styled(
                    format!(" {indicator} {item}"),
                    Style::default()
                        .fg(if is_selected { colors.accent() } else { colors.fg() })
                        .add_modifier(if is_selected {
                            Modifier::BOLD
                        } else {
                            Modifier::empty()
                        }),
                ))
            })
            .collect();

        Paragraph::new(lines).render(inner, buf);
    }
}
