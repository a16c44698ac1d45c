use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::session::quiz::{Phase, QuizSession};
use crate::ui::theme::Theme;

const OPTION_LABELS: [char; 4] = ['A', 'B', 'C', 'D'];

/// The current question, its four options, and (during feedback) the
/// per-option verdict plus the explanation.
pub struct QuestionView<'a> {
    pub session: &'a QuizSession,
    pub theme: &'a Theme,
}

impl<'a> QuestionView<'a> {
    pub fn new(session: &'a QuizSession, theme: &'a Theme) -> Self {
        Self { session, theme }
    }
}

impl Widget for QuestionView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let Some(question) = self.session.current() else {
            return;
        };
        let in_feedback = self.session.phase == Phase::Feedback;

        let block = Block::bordered()
            .title(format!(
                " Question {}/{} ",
                self.session.index + 1,
                self.session.len()
            ))
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Length(question.options.len() as u16 + 1),
                Constraint::Min(0),
            ])
            .split(inner);

        let text = Paragraph::new(Line::from(Span::styled(
            question.text.clone(),
            Style::default().fg(colors.fg()).add_modifier(Modifier::BOLD),
        )))
        .wrap(Wrap { trim: true });
        text.render(layout[0], buf);

        let mut option_lines: Vec<Line> = Vec::new();
        for (i, option) in question.options.iter().enumerate() {
            let label = OPTION_LABELS.get(i).copied().unwrap_or('?');
            let is_correct = question.is_correct(option);
            let is_chosen = self.session.user_answer.as_deref() == Some(option.as_str());

            let style = if in_feedback && is_correct {
                Style::default()
                    .fg(colors.success())
                    .add_modifier(Modifier::BOLD)
            } else if in_feedback && is_chosen {
                Style::default().fg(colors.error())
            } else if in_feedback {
                Style::default().fg(colors.dim())
            } else {
                Style::default().fg(colors.fg())
            };

            let marker = if in_feedback && is_correct {
                "+"
            } else if in_feedback && is_chosen {
                "x"
            } else {
                " "
            };
            option_lines.push(Line::from(Span::styled(
                format!(" {marker} [{label}] {option}"),
                style,
            )));
        }
        Paragraph::new(option_lines).render(layout[1], buf);

        if in_feedback {
            let mut feedback_lines: Vec<Line> = Vec::new();
            if self.session.timed_out() {
                feedback_lines.push(Line::from(Span::styled(
                    "Time's up! No answer recorded.",
                    Style::default()
                        .fg(colors.warning())
                        .add_modifier(Modifier::BOLD),
                )));
            } else if self.session.answered_correctly() {
                feedback_lines.push(Line::from(Span::styled(
                    "Correct!",
                    Style::default()
                        .fg(colors.success())
                        .add_modifier(Modifier::BOLD),
                )));
            } else {
                feedback_lines.push(Line::from(Span::styled(
                    "Incorrect.",
                    Style::default()
                        .fg(colors.error())
                        .add_modifier(Modifier::BOLD),
                )));
            }
            if !question.explanation.is_empty() {
                feedback_lines.push(Line::from(""));
                feedback_lines.push(Line::from(Span::styled(
                    question.explanation.clone(),
                    Style::default().fg(colors.fg()),
                )));
            }
            Paragraph::new(feedback_lines)
                .wrap(Wrap { trim: true })
                .render(layout[2], buf);
        }
    }
}
