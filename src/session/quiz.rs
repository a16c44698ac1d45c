use crate::engine::pool::QuizMode;
use crate::engine::row::Question;
use crate::session::level;

/// Seconds allowed per question.
pub const TIME_LIMIT_SECS: u32 = 30;
/// Delay before feedback auto-advances to the next question.
pub const AUTO_ADVANCE_MS: u64 = 3000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Answering,
    Feedback,
    Completed,
}

/// One quiz instance. All transitions are plain methods with no wall-clock
/// inside; the host calls `tick` once per second during `Answering` and owns
/// the auto-advance delay during `Feedback`. A retry or next level builds a
/// fresh session rather than reviving a completed one.
#[derive(Clone, Debug)]
pub struct QuizSession {
    pub mode: QuizMode,
    pub working_set: Vec<Question>,
    pub index: usize,
    pub score: u32,
    pub user_answer: Option<String>,
    pub phase: Phase,
    pub seconds_remaining: u32,
    /// Meaningful only in mixed mode; topic sessions stay at 1.
    pub level: u32,
    /// Skip confirmation prompt is open. A sub-state of `Answering`; the
    /// countdown keeps running underneath it.
    pub skip_pending: bool,
}

impl QuizSession {
    pub fn new(mode: QuizMode, working_set: Vec<Question>, level: u32) -> Self {
        Self {
            mode,
            working_set,
            index: 0,
            score: 0,
            user_answer: None,
            phase: Phase::Answering,
            seconds_remaining: TIME_LIMIT_SECS,
            level,
            skip_pending: false,
        }
    }

    pub fn current(&self) -> Option<&Question> {
        self.working_set.get(self.index)
    }

    pub fn len(&self) -> usize {
        self.working_set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.working_set.is_empty()
    }

    pub fn progress(&self) -> f64 {
        if self.working_set.is_empty() {
            return 0.0;
        }
        (self.index + 1) as f64 / self.working_set.len() as f64
    }

    /// One countdown second. Only the `Answering` phase has a countdown; a
    /// tick that arrives at zero forces the same transition as submitting
    /// no answer.
    pub fn tick(&mut self) {
        if self.phase != Phase::Answering {
            return;
        }
        if self.seconds_remaining == 0 {
            self.submit(None);
        } else {
            self.seconds_remaining -= 1;
        }
    }

    /// Record the user's answer (or `None` for a timeout), score an exact
    /// match, and enter `Feedback`. Ignored outside `Answering`.
    pub fn submit(&mut self, answer: Option<String>) {
        if self.phase != Phase::Answering {
            return;
        }
        self.skip_pending = false;
        let correct = match (answer.as_deref(), self.current()) {
            (Some(a), Some(q)) => q.is_correct(a),
            _ => false,
        };
        if correct {
            self.score += 1;
        }
        self.user_answer = answer;
        self.phase = Phase::Feedback;
    }

    /// Leave `Feedback` for the next question, or complete the session after
    /// the last one.
    pub fn advance(&mut self) {
        if self.phase != Phase::Feedback {
            return;
        }
        self.step_forward();
    }

    pub fn request_skip(&mut self) {
        if self.phase == Phase::Answering {
            self.skip_pending = true;
        }
    }

    pub fn cancel_skip(&mut self) {
        self.skip_pending = false;
    }

    /// Forfeit the current question: unanswered, not wrong, no score change.
    pub fn confirm_skip(&mut self) {
        if self.phase == Phase::Answering && self.skip_pending {
            self.skip_pending = false;
            self.step_forward();
        }
    }

    fn step_forward(&mut self) {
        if self.index + 1 < self.working_set.len() {
            self.index += 1;
            self.user_answer = None;
            self.seconds_remaining = TIME_LIMIT_SECS;
            self.phase = Phase::Answering;
        } else {
            self.phase = Phase::Completed;
        }
    }

    pub fn answered_correctly(&self) -> bool {
        match (self.user_answer.as_deref(), self.current()) {
            (Some(a), Some(q)) => q.is_correct(a),
            _ => false,
        }
    }

    /// Timed out with no answer chosen (renders a "time's up" notice).
    pub fn timed_out(&self) -> bool {
        self.phase == Phase::Feedback && self.user_answer.is_none()
    }

    pub fn passed(&self) -> bool {
        self.mode == QuizMode::Mixed && self.score >= level::PASS_SCORE
    }

    pub fn at_max_level(&self) -> bool {
        self.mode == QuizMode::Mixed && self.level >= level::MAX_LEVEL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(n: usize) -> Question {
        Question {
            text: format!("Q{n}"),
            options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            correct_answer: "a".to_string(),
            explanation: String::new(),
            subject: "S".to_string(),
            topic: "T".to_string(),
        }
    }

    fn session(n: usize) -> QuizSession {
        QuizSession::new(QuizMode::Topic, (0..n).map(question).collect(), 1)
    }

    #[test]
    fn starts_answering_with_full_countdown() {
        let s = session(3);
        assert_eq!(s.phase, Phase::Answering);
        assert_eq!(s.seconds_remaining, TIME_LIMIT_SECS);
        assert_eq!(s.index, 0);
        assert_eq!(s.score, 0);
    }

    #[test]
    fn correct_answer_scores_and_enters_feedback() {
        let mut s = session(2);
        s.submit(Some("a".to_string()));
        assert_eq!(s.phase, Phase::Feedback);
        assert_eq!(s.score, 1);
        assert!(s.answered_correctly());
    }

    #[test]
    fn wrong_answer_enters_feedback_without_scoring() {
        let mut s = session(2);
        s.submit(Some("b".to_string()));
        assert_eq!(s.phase, Phase::Feedback);
        assert_eq!(s.score, 0);
        assert!(!s.answered_correctly());
    }

    #[test]
    fn ticks_decrement_and_zero_tick_auto_submits_none() {
        let mut s = session(2);
        for _ in 0..TIME_LIMIT_SECS {
            s.tick();
        }
        assert_eq!(s.seconds_remaining, 0);
        assert_eq!(s.phase, Phase::Answering);

        s.tick(); // at zero: forced no-answer submission
        assert_eq!(s.phase, Phase::Feedback);
        assert_eq!(s.user_answer, None);
        assert_eq!(s.score, 0);
        assert!(s.timed_out());
    }

    #[test]
    fn no_countdown_mutation_after_feedback() {
        let mut s = session(2);
        s.tick();
        s.submit(Some("a".to_string()));
        let frozen = s.seconds_remaining;
        s.tick();
        s.tick();
        assert_eq!(s.seconds_remaining, frozen);
        assert_eq!(s.phase, Phase::Feedback);
    }

    #[test]
    fn advance_resets_countdown_and_answer() {
        let mut s = session(2);
        for _ in 0..5 {
            s.tick();
        }
        s.submit(Some("a".to_string()));
        s.advance();
        assert_eq!(s.index, 1);
        assert_eq!(s.phase, Phase::Answering);
        assert_eq!(s.seconds_remaining, TIME_LIMIT_SECS);
        assert_eq!(s.user_answer, None);
    }

    #[test]
    fn advance_past_last_question_completes() {
        let mut s = session(1);
        s.submit(Some("a".to_string()));
        s.advance();
        assert_eq!(s.phase, Phase::Completed);
        assert_eq!(s.index, 0);

        // Completed is terminal
        s.advance();
        s.submit(Some("a".to_string()));
        s.tick();
        assert_eq!(s.phase, Phase::Completed);
        assert_eq!(s.score, 1);
    }

    #[test]
    fn advance_is_ignored_while_answering() {
        let mut s = session(2);
        s.advance();
        assert_eq!(s.index, 0);
        assert_eq!(s.phase, Phase::Answering);
    }

    #[test]
    fn skip_is_two_step_and_never_scores() {
        let mut s = session(2);
        s.submit(Some("a".to_string()));
        s.advance();

        s.request_skip();
        assert!(s.skip_pending);
        assert_eq!(s.phase, Phase::Answering);

        s.confirm_skip();
        assert_eq!(s.phase, Phase::Completed);
        assert_eq!(s.score, 1, "skipped question must not change score");
    }

    #[test]
    fn skip_cancel_leaves_state_unchanged() {
        let mut s = session(2);
        s.tick();
        s.request_skip();
        s.cancel_skip();
        assert!(!s.skip_pending);
        assert_eq!(s.phase, Phase::Answering);
        assert_eq!(s.index, 0);
        assert_eq!(s.seconds_remaining, TIME_LIMIT_SECS - 1);
    }

    #[test]
    fn confirm_without_request_is_a_no_op() {
        let mut s = session(2);
        s.confirm_skip();
        assert_eq!(s.index, 0);
        assert_eq!(s.phase, Phase::Answering);
    }

    #[test]
    fn countdown_runs_under_the_skip_prompt() {
        let mut s = session(2);
        s.request_skip();
        for _ in 0..=TIME_LIMIT_SECS {
            s.tick();
        }
        // Timeout wins; the prompt is dropped with the phase change.
        assert_eq!(s.phase, Phase::Feedback);
        assert!(!s.skip_pending);
    }

    #[test]
    fn submit_drops_open_skip_prompt() {
        let mut s = session(2);
        s.request_skip();
        s.submit(Some("b".to_string()));
        assert!(!s.skip_pending);
        assert_eq!(s.phase, Phase::Feedback);
    }

    #[test]
    fn pass_gate_applies_only_to_mixed() {
        let mut mixed = QuizSession::new(QuizMode::Mixed, (0..25).map(question).collect(), 1);
        mixed.score = 18;
        assert!(mixed.passed());
        mixed.score = 17;
        assert!(!mixed.passed());

        let mut topic = session(25);
        topic.score = 25;
        assert!(!topic.passed());
    }
}
