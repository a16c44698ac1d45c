use std::collections::HashSet;
use std::sync::mpsc::Sender;
use std::thread;
use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::config::Config;
use crate::engine::catalog::{Catalog, LoadError};
use crate::engine::pool::{self, PoolSpec, QuizLength, QuizMode};
use crate::event::AppEvent;
use crate::session::level::{self, LevelOutcome};
use crate::session::quiz::{AUTO_ADVANCE_MS, Phase, QuizSession};
use crate::source::{FeedSource, FetchError};
use crate::store::json_store::JsonStore;
use crate::store::schema::BookmarkData;
use crate::ui::components::menu::Menu;
use crate::ui::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    Home,
    SubjectSelect,
    TopicSelect,
    LengthSelect,
    Quiz,
    Results,
    Bookmarks,
    Settings,
}

/// The three observable catalog states. A retry replaces the whole thing;
/// there is no partial catalog.
pub enum CatalogState {
    Loading,
    Ready(Catalog),
    Failed(LoadError),
}

pub struct App {
    pub screen: AppScreen,
    pub catalog: CatalogState,
    pub session: Option<QuizSession>,
    pub history: HashSet<String>,
    pub selected_subject: Option<String>,
    pub selected_topic: Option<String>,
    pub menu: Menu<'static>,
    pub theme: &'static Theme,
    pub config: Config,
    pub bookmarks: BookmarkData,
    pub store: Option<JsonStore>,
    pub feed_source: FeedSource,
    pub should_quit: bool,
    pub picker_selected: usize,
    pub bookmark_selected: usize,
    pub settings_selected: usize,
    /// One-line notice shown on the home screen (empty selection, etc.)
    pub status: Option<String>,
    last_spec: Option<PoolSpec>,
    next_second_at: Option<Instant>,
    auto_advance_at: Option<Instant>,
    rng: SmallRng,
}

impl App {
    pub fn new(config: Config, feed_source: FeedSource) -> Self {
        let loaded_theme = Theme::load(&config.theme).unwrap_or_default();
        let theme: &'static Theme = Box::leak(Box::new(loaded_theme));
        let menu = Menu::new(theme);

        let store = JsonStore::new().ok();
        let bookmarks = store
            .as_ref()
            .map(|s| s.load_bookmarks())
            .unwrap_or_default();

        Self {
            screen: AppScreen::Home,
            catalog: CatalogState::Loading,
            session: None,
            history: HashSet::new(),
            selected_subject: None,
            selected_topic: None,
            menu,
            theme,
            config,
            bookmarks,
            store,
            feed_source,
            should_quit: false,
            picker_selected: 0,
            bookmark_selected: 0,
            settings_selected: 0,
            status: None,
            last_spec: None,
            next_second_at: None,
            auto_advance_at: None,
            rng: SmallRng::from_entropy(),
        }
    }

    pub fn set_theme(&mut self, theme: Theme) {
        let theme: &'static Theme = Box::leak(Box::new(theme));
        self.theme = theme;
        self.menu.theme = theme;
    }

    // --- catalog loading ---

    /// Kick off a feed load on a background thread; the result arrives
    /// through the event channel so the UI keeps rendering "loading".
    pub fn spawn_feed_load(&mut self, tx: Sender<AppEvent>) {
        self.catalog = CatalogState::Loading;
        let source = self.feed_source.clone();
        thread::spawn(move || {
            let result = source.load();
            let _ = tx.send(AppEvent::FeedLoaded(result));
        });
    }

    pub fn apply_feed(&mut self, result: Result<String, FetchError>) {
        self.catalog = match result
            .map_err(LoadError::from)
            .and_then(|raw| Catalog::build(&raw, &self.config.ordering, &mut self.rng))
        {
            Ok(catalog) => CatalogState::Ready(catalog),
            Err(err) => CatalogState::Failed(err),
        };
    }

    pub fn retry_load(&mut self, tx: Sender<AppEvent>) {
        if matches!(self.catalog, CatalogState::Failed(_)) {
            self.spawn_feed_load(tx);
        }
    }

    pub fn catalog_ready(&self) -> Option<&Catalog> {
        match &self.catalog {
            CatalogState::Ready(catalog) => Some(catalog),
            _ => None,
        }
    }

    // --- session lifecycle ---

    pub fn start_mixed(&mut self) {
        let spec = PoolSpec::mixed(self.config.mixed_excluded_subjects.clone());
        self.start_session(spec, 1);
    }

    pub fn start_topic(&mut self, length: QuizLength) {
        let (Some(subject), Some(topic)) = (
            self.selected_subject.clone(),
            self.selected_topic.clone(),
        ) else {
            return;
        };
        let spec = PoolSpec::topic(&subject, &topic, length);
        self.start_session(spec, 1);
    }

    fn start_session(&mut self, spec: PoolSpec, starting_level: u32) {
        let CatalogState::Ready(catalog) = &self.catalog else {
            self.status = Some("Question bank is not loaded yet.".to_string());
            return;
        };
        let working_set = pool::select_pool(catalog, &spec, &mut self.history, &mut self.rng);
        if working_set.is_empty() {
            self.status = Some("No questions available for this selection.".to_string());
            self.screen = AppScreen::Home;
            return;
        }
        self.status = None;
        self.session = Some(QuizSession::new(spec.mode, working_set, starting_level));
        self.last_spec = Some(spec);
        self.screen = AppScreen::Quiz;
        self.sync_phase_timers(Instant::now());
    }

    pub fn submit_answer(&mut self, answer: Option<String>) {
        if let Some(session) = self.session.as_mut() {
            session.submit(answer);
        }
        self.sync_phase_timers(Instant::now());
    }

    pub fn advance(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.advance();
        }
        self.after_step();
    }

    pub fn request_skip(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.request_skip();
        }
    }

    pub fn cancel_skip(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.cancel_skip();
        }
    }

    pub fn confirm_skip(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.confirm_skip();
        }
        self.after_step();
    }

    fn after_step(&mut self) {
        if let Some(session) = &self.session {
            if session.phase == Phase::Completed {
                self.screen = AppScreen::Results;
            }
        }
        self.sync_phase_timers(Instant::now());
    }

    /// Mixed mode only, valid from a passed completed session: start the
    /// next level with a fresh pool. History carries across levels.
    pub fn progress_level(&mut self) {
        let Some(session) = &self.session else { return };
        if session.mode != QuizMode::Mixed || session.phase != Phase::Completed {
            return;
        }
        if let LevelOutcome::Advance(next) = level::evaluate(session.score, session.level) {
            let spec = PoolSpec::mixed(self.config.mixed_excluded_subjects.clone());
            self.start_session(spec, next);
        }
    }

    /// Replay the same selection at the same level (after a fail, or at will
    /// from the results screen).
    pub fn retry_session(&mut self) {
        let (Some(spec), Some(session)) = (self.last_spec.clone(), &self.session) else {
            return;
        };
        let current_level = session.level;
        self.start_session(spec, current_level);
    }

    /// Tear down the session and every selection: timers, history, prompt
    /// state, back to the home screen.
    pub fn reset_session(&mut self) {
        self.session = None;
        self.last_spec = None;
        self.history.clear();
        self.selected_subject = None;
        self.selected_topic = None;
        self.picker_selected = 0;
        self.status = None;
        self.next_second_at = None;
        self.auto_advance_at = None;
        self.screen = AppScreen::Home;
    }

    // --- timers ---

    /// Drive the countdown and the auto-advance from the host tick. Exactly
    /// one deadline is armed at a time, dictated by the session phase; any
    /// phase change re-arms or clears them here.
    pub fn sync_timers(&mut self, now: Instant) {
        if let Some(deadline) = self.next_second_at {
            if now >= deadline {
                if let Some(session) = self.session.as_mut() {
                    session.tick();
                }
                // Re-arm relative to the deadline so seconds do not drift
                self.next_second_at = Some(deadline + Duration::from_secs(1));
            }
        }
        if let Some(deadline) = self.auto_advance_at {
            if now >= deadline {
                self.auto_advance_at = None;
                self.advance();
            }
        }
        self.sync_phase_timers(now);
    }

    fn sync_phase_timers(&mut self, now: Instant) {
        match self.session.as_ref().map(|s| s.phase) {
            Some(Phase::Answering) => {
                self.auto_advance_at = None;
                if self.next_second_at.is_none() {
                    self.next_second_at = Some(now + Duration::from_secs(1));
                }
            }
            Some(Phase::Feedback) => {
                self.next_second_at = None;
                if self.auto_advance_at.is_none() {
                    self.auto_advance_at = Some(now + Duration::from_millis(AUTO_ADVANCE_MS));
                }
            }
            _ => {
                self.next_second_at = None;
                self.auto_advance_at = None;
            }
        }
    }

    // --- bookmarks ---

    /// Toggle the current quiz question in the bookmark set and persist
    /// immediately. No-op outside a session.
    pub fn toggle_current_bookmark(&mut self) {
        let Some(question) = self.session.as_ref().and_then(|s| s.current()).cloned() else {
            return;
        };
        self.bookmarks.toggle(&question);
        self.save_bookmarks();
    }

    /// Remove the bookmark under the cursor on the bookmarks screen.
    pub fn remove_selected_bookmark(&mut self) {
        if self.bookmark_selected >= self.bookmarks.len() {
            return;
        }
        let question = self.bookmarks.bookmarks[self.bookmark_selected]
            .question
            .clone();
        self.bookmarks.toggle(&question);
        self.save_bookmarks();
        if !self.bookmarks.is_empty() {
            self.bookmark_selected = self.bookmark_selected.min(self.bookmarks.len() - 1);
        } else {
            self.bookmark_selected = 0;
        }
    }

    fn save_bookmarks(&self) {
        if let Some(store) = &self.store {
            let _ = store.save_bookmarks(&self.bookmarks);
        }
    }

    // --- navigation helpers ---

    pub fn go_to_subject_select(&mut self) {
        self.selected_subject = None;
        self.selected_topic = None;
        self.picker_selected = 0;
        self.screen = AppScreen::SubjectSelect;
    }

    pub fn go_to_bookmarks(&mut self) {
        self.bookmark_selected = 0;
        self.screen = AppScreen::Bookmarks;
    }

    pub fn go_to_settings(&mut self) {
        self.settings_selected = 0;
        self.screen = AppScreen::Settings;
    }

    /// Choices offered by the length picker for topic quizzes.
    pub fn length_choices(&self) -> Vec<(String, QuizLength)> {
        let mut choices = vec![
            (
                format!("{} questions", self.config.topic_length),
                QuizLength::Questions(self.config.topic_length),
            ),
            ("25 questions".to_string(), QuizLength::Questions(25)),
            ("All questions in this topic".to_string(), QuizLength::All),
        ];
        choices.dedup_by(|a, b| a.1 == b.1);
        choices
    }

    // --- settings ---

    pub fn settings_cycle_forward(&mut self) {
        match self.settings_selected {
            0 => {
                let themes = Theme::available_themes();
                if let Some(idx) = themes.iter().position(|t| *t == self.config.theme) {
                    let next = (idx + 1) % themes.len();
                    self.config.theme = themes[next].clone();
                } else if let Some(first) = themes.first() {
                    self.config.theme = first.clone();
                }
                if let Some(new_theme) = Theme::load(&self.config.theme) {
                    self.set_theme(new_theme);
                }
            }
            1 => {
                self.config.topic_length = (self.config.topic_length + 5).min(100);
            }
            _ => {}
        }
    }

    pub fn settings_cycle_backward(&mut self) {
        match self.settings_selected {
            0 => {
                let themes = Theme::available_themes();
                if let Some(idx) = themes.iter().position(|t| *t == self.config.theme) {
                    let prev = if idx == 0 { themes.len() - 1 } else { idx - 1 };
                    self.config.theme = themes[prev].clone();
                } else if let Some(first) = themes.first() {
                    self.config.theme = first.clone();
                }
                if let Some(new_theme) = Theme::load(&self.config.theme) {
                    self.set_theme(new_theme);
                }
            }
            1 => {
                self.config.topic_length = self.config.topic_length.saturating_sub(5).max(5);
            }
            _ => {}
        }
    }
}
