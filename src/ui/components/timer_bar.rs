use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, Widget};

use crate::session::quiz::TIME_LIMIT_SECS;
use crate::ui::theme::Theme;

/// Per-question countdown bar. Green above 20s, amber above 10s, red below.
pub struct TimerBar<'a> {
    pub seconds_remaining: u32,
    pub theme: &'a Theme,
}

impl<'a> TimerBar<'a> {
    pub fn new(seconds_remaining: u32, theme: &'a Theme) -> Self {
        Self {
            seconds_remaining,
            theme,
        }
    }

    fn fill_color(&self) -> Color {
        let colors = &self.theme.colors;
        if self.seconds_remaining > 20 {
            colors.success()
        } else if self.seconds_remaining > 10 {
            colors.warning()
        } else {
            colors.error()
        }
    }
}

impl Widget for TimerBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(" Time ")
            .border_style(Style::default().fg(colors.border()));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let ratio = f64::from(self.seconds_remaining) / f64::from(TIME_LIMIT_SECS);
        let filled_width = (ratio.clamp(0.0, 1.0) * inner.width as f64) as u16;
        let fill = self.fill_color();

        for x in inner.x..inner.x + inner.width {
            let style = if x < inner.x + filled_width {
                Style::default().fg(colors.bg()).bg(fill)
            } else {
                Style::default().fg(colors.fg()).bg(colors.bar_empty())
            };
            buf[(x, inner.y)].set_style(style);
        }

        let label = format!("{}s", self.seconds_remaining);
        let label_x = inner.x + (inner.width.saturating_sub(label.len() as u16)) / 2;
        buf.set_string(label_x, inner.y, &label, Style::default().fg(colors.fg()));
    }
}
