use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::engine::pool::QuizMode;
use crate::session::level::{self, LevelOutcome};
use crate::session::quiz::QuizSession;
use crate::ui::theme::Theme;

/// Completion summary: score, percentage, and in mixed mode the pass/fail
/// verdict against the level gate.
pub struct ResultsPanel<'a> {
    pub session: &'a QuizSession,
    pub theme: &'a Theme,
}

impl<'a> ResultsPanel<'a> {
    pub fn new(session: &'a QuizSession, theme: &'a Theme) -> Self {
        Self { session, theme }
    }
}

impl Widget for ResultsPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let session = self.session;

        let block = Block::bordered()
            .title(" Quiz Complete ")
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Min(0),
                Constraint::Length(2),
            ])
            .split(inner);

        let total = session.len() as u32;
        let percent = if total > 0 {
            session.score as f64 / f64::from(total) * 100.0
        } else {
            0.0
        };
        let score_line = Line::from(vec![
            Span::styled("  Score: ", Style::default().fg(colors.fg())),
            Span::styled(
                format!("{}/{}", session.score, total),
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  ({percent:.0}%)"),
                Style::default().fg(colors.dim()),
            ),
        ]);
        Paragraph::new(score_line).render(layout[0], buf);

        let mut verdict: Vec<Line> = Vec::new();
        let mut hint = " [r] Retry  [q] Home ".to_string();
        if session.mode == QuizMode::Mixed {
            verdict.push(Line::from(Span::styled(
                format!("  Level {}", session.level),
                Style::default().fg(colors.fg()),
            )));
            match level::evaluate(session.score, session.level) {
                LevelOutcome::Advance(next) => {
                    verdict.push(Line::from(Span::styled(
                        format!("  Passed! Level {next} is waiting."),
                        Style::default()
                            .fg(colors.success())
                            .add_modifier(Modifier::BOLD),
                    )));
                    hint = " [Enter] Next level  [r] Replay level  [q] Home ".to_string();
                }
                LevelOutcome::MaxLevelReached => {
                    verdict.push(Line::from(Span::styled(
                        "  Maximum level reached. Nothing left to climb!",
                        Style::default()
                            .fg(colors.warning())
                            .add_modifier(Modifier::BOLD),
                    )));
                }
                LevelOutcome::Failed => {
                    verdict.push(Line::from(Span::styled(
                        format!("  Not passed ({} needed).", level::PASS_SCORE),
                        Style::default().fg(colors.error()),
                    )));
                }
            }
        }
        Paragraph::new(verdict).render(layout[1], buf);

        let footer = Paragraph::new(Line::from(Span::styled(
            hint,
            Style::default().fg(colors.dim()),
        )))
        .alignment(Alignment::Center);
        footer.render(layout[4], buf);
    }
}
