use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::store::schema::BookmarkData;
use crate::ui::theme::Theme;

pub struct BookmarkList<'a> {
    pub data: &'a BookmarkData,
    pub selected: usize,
    pub theme: &'a Theme,
}

impl<'a> BookmarkList<'a> {
    pub fn new(data: &'a BookmarkData, selected: usize, theme: &'a Theme) -> Self {
        Self {
            data,
            selected,
            theme,
        }
    }
}

impl Widget for BookmarkList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(format!(" Bookmarks ({}) ", self.data.len()))
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        if self.data.is_empty() {
            let empty = Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled(
                    "  No bookmarks yet.",
                    Style::default().fg(colors.dim()),
                )),
                Line::from(Span::styled(
                    "  Press [m] during a quiz to save a question.",
                    Style::default().fg(colors.dim()),
                )),
            ]);
            empty.render(inner, buf);
            return;
        }

        // Two rows per entry: question text, then subject/topic + answer
        let visible = (inner.height as usize) / 2;
        let offset = if self.selected >= visible {
            self.selected + 1 - visible
        } else {
            0
        };

        let mut lines: Vec<Line> = Vec::new();
        for (i, bookmark) in self
            .data
            .bookmarks
            .iter()
            .enumerate()
            .skip(offset)
            .take(visible)
        {
            let is_selected = i == self.selected;
            let indicator = if is_selected { ">" } else { " " };
            let q = &bookmark.question;

            lines.push(Line::from(Span::styled(
                format!(" {indicator} {}", q.text),
                Style::default()
                    .fg(if is_selected { colors.accent() } else { colors.fg() })
                    .add_modifier(if is_selected {
                        Modifier::BOLD
                    } else {
                        Modifier::empty()
                    }),
            )));
            lines.push(Line::from(vec![
                Span::styled(
                    format!("     {} / {}", q.subject, q.topic),
                    Style::default().fg(colors.dim()),
                ),
                Span::styled(
                    format!("  answer: {}", q.correct_answer),
                    Style::default().fg(colors.success()),
                ),
            ]));
        }

        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .render(inner, buf);
    }
}
