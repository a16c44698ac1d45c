mod app;
mod config;
mod engine;
mod event;
mod session;
mod source;
mod store;
mod ui;

use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph, Widget, Wrap};

use app::{App, AppScreen, CatalogState};
use config::Config;
use engine::pool::QuizMode;
use event::{AppEvent, EventHandler};
use session::quiz::Phase;
use source::FeedSource;
use ui::components::bookmarks::BookmarkList;
use ui::components::picker::Picker;
use ui::components::question_view::QuestionView;
use ui::components::results::ResultsPanel;
use ui::components::timer_bar::TimerBar;
use ui::layout::{AppLayout, centered_rect};

#[derive(Parser)]
#[command(name = "quizcram", version, about = "Terminal quiz trainer with timed multiple-choice drills")]
struct Cli {
    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(short, long, help = "Load the question bank from a local CSV file")]
    file: Option<PathBuf>,

    #[arg(short, long, help = "Question feed URL (overrides config)")]
    url: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load().unwrap_or_default();
    let feed_source = match (cli.file, cli.url) {
        (Some(path), _) => FeedSource::File(path),
        (None, Some(url)) => FeedSource::Remote(url),
        (None, None) => FeedSource::Remote(config.feed_url.clone()),
    };

    let mut app = App::new(config, feed_source);
    if let Some(theme_name) = cli.theme {
        if let Some(theme) = ui::theme::Theme::load(&theme_name) {
            app.config.theme = theme_name;
            app.set_theme(theme);
        }
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(Duration::from_millis(250));
    app.spawn_feed_load(events.sender());

    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, events, key),
            AppEvent::Tick => app.sync_timers(Instant::now()),
            AppEvent::Resize(_, _) => {}
            AppEvent::FeedLoaded(result) => app.apply_feed(result),
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, events: &EventHandler, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    match app.screen {
        AppScreen::Home => handle_home_key(app, events, key),
        AppScreen::SubjectSelect => handle_subject_key(app, key),
        AppScreen::TopicSelect => handle_topic_key(app, key),
        AppScreen::LengthSelect => handle_length_key(app, key),
        AppScreen::Quiz => handle_quiz_key(app, key),
        AppScreen::Results => handle_results_key(app, key),
        AppScreen::Bookmarks => handle_bookmarks_key(app, key),
        AppScreen::Settings => handle_settings_key(app, key),
    }
}

fn handle_home_key(app: &mut App, events: &EventHandler, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Char('r') => app.retry_load(events.sender()),
        KeyCode::Char('1') => app.start_mixed(),
        KeyCode::Char('2') => app.go_to_subject_select(),
        KeyCode::Char('b') => app.go_to_bookmarks(),
        KeyCode::Char('c') => app.go_to_settings(),
        KeyCode::Up | KeyCode::Char('k') => app.menu.prev(),
        KeyCode::Down | KeyCode::Char('j') => app.menu.next(),
        KeyCode::Enter => match app.menu.selected {
            0 => app.start_mixed(),
            1 => app.go_to_subject_select(),
            2 => app.go_to_bookmarks(),
            3 => app.go_to_settings(),
            _ => {}
        },
        _ => {}
    }
}

fn handle_subject_key(app: &mut App, key: KeyEvent) {
    let subjects: Vec<String> = app
        .catalog_ready()
        .map(|c| c.subjects.clone())
        .unwrap_or_default();
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.reset_session(),
        KeyCode::Up | KeyCode::Char('k') => {
            app.picker_selected = app.picker_selected.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if !subjects.is_empty() {
                app.picker_selected = (app.picker_selected + 1).min(subjects.len() - 1);
            }
        }
        KeyCode::Enter => {
            if let Some(subject) = subjects.get(app.picker_selected) {
                app.selected_subject = Some(subject.clone());
                app.picker_selected = 0;
                app.screen = AppScreen::TopicSelect;
            }
        }
        _ => {}
    }
}

fn handle_topic_key(app: &mut App, key: KeyEvent) {
    let topics: Vec<String> = match (app.catalog_ready(), &app.selected_subject) {
        (Some(catalog), Some(subject)) => catalog.topics(subject).to_vec(),
        _ => Vec::new(),
    };
    match key.code {
        KeyCode::Esc => {
            app.selected_topic = None;
            app.picker_selected = 0;
            app.screen = AppScreen::SubjectSelect;
        }
        KeyCode::Up | KeyCode::Char('k') => {
            app.picker_selected = app.picker_selected.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if !topics.is_empty() {
                app.picker_selected = (app.picker_selected + 1).min(topics.len() - 1);
            }
        }
        KeyCode::Enter => {
            if let Some(topic) = topics.get(app.picker_selected) {
                app.selected_topic = Some(topic.clone());
                app.picker_selected = 0;
                app.screen = AppScreen::LengthSelect;
            }
        }
        _ => {}
    }
}

fn handle_length_key(app: &mut App, key: KeyEvent) {
    let choices = app.length_choices();
    match key.code {
        KeyCode::Esc => {
            app.picker_selected = 0;
            app.screen = AppScreen::TopicSelect;
        }
        KeyCode::Up | KeyCode::Char('k') => {
            app.picker_selected = app.picker_selected.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            app.picker_selected = (app.picker_selected + 1).min(choices.len() - 1);
        }
        KeyCode::Enter => {
            if let Some((_, length)) = choices.get(app.picker_selected) {
                app.start_topic(*length);
            }
        }
        _ => {}
    }
}

fn handle_quiz_key(app: &mut App, key: KeyEvent) {
    let Some(session) = &app.session else {
        app.reset_session();
        return;
    };

    // Skip confirmation takes priority over everything else
    if session.skip_pending {
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => app.confirm_skip(),
            KeyCode::Char('n') | KeyCode::Esc => app.cancel_skip(),
            _ => {}
        }
        return;
    }

    match session.phase {
        Phase::Answering => match key.code {
            KeyCode::Esc => app.reset_session(),
            KeyCode::Char('s') => app.request_skip(),
            KeyCode::Char('m') => app.toggle_current_bookmark(),
            KeyCode::Char(ch) => {
                if let Some(idx) = option_index(ch) {
                    let answer = session
                        .current()
                        .and_then(|q| q.options.get(idx))
                        .cloned();
                    if answer.is_some() {
                        app.submit_answer(answer);
                    }
                }
            }
            _ => {}
        },
        Phase::Feedback => match key.code {
            KeyCode::Esc => app.reset_session(),
            KeyCode::Char('m') => app.toggle_current_bookmark(),
            KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Char('n') => app.advance(),
            _ => {}
        },
        Phase::Completed => app.reset_session(),
    }
}

/// Answer keys: 1-4 or a-d.
fn option_index(ch: char) -> Option<usize> {
    match ch.to_ascii_lowercase() {
        '1' | 'a' => Some(0),
        '2' | 'b' => Some(1),
        '3' | 'c' => Some(2),
        '4' | 'd' => Some(3),
        _ => None,
    }
}

fn handle_results_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.progress_level(),
        KeyCode::Char('r') => app.retry_session(),
        KeyCode::Char('q') | KeyCode::Esc => app.reset_session(),
        _ => {}
    }
}

fn handle_bookmarks_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.screen = AppScreen::Home,
        KeyCode::Up | KeyCode::Char('k') => {
            app.bookmark_selected = app.bookmark_selected.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if !app.bookmarks.is_empty() {
                app.bookmark_selected =
                    (app.bookmark_selected + 1).min(app.bookmarks.len() - 1);
            }
        }
        KeyCode::Char('x') | KeyCode::Delete => app.remove_selected_bookmark(),
        _ => {}
    }
}

fn handle_settings_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            let _ = app.config.save();
            app.screen = AppScreen::Home;
        }
        KeyCode::Up | KeyCode::Char('k') => {
            app.settings_selected = app.settings_selected.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            app.settings_selected = (app.settings_selected + 1).min(1);
        }
        KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => app.settings_cycle_forward(),
        KeyCode::Left | KeyCode::Char('h') => app.settings_cycle_backward(),
        _ => {}
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    match app.screen {
        AppScreen::Home => render_home(frame, app),
        AppScreen::SubjectSelect => render_subject_select(frame, app),
        AppScreen::TopicSelect => render_topic_select(frame, app),
        AppScreen::LengthSelect => render_length_select(frame, app),
        AppScreen::Quiz => render_quiz(frame, app),
        AppScreen::Results => render_results(frame, app),
        AppScreen::Bookmarks => render_bookmarks(frame, app),
        AppScreen::Settings => render_settings(frame, app),
    }
}

fn render_home(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;
    let layout = AppLayout::new(area);

    let catalog_info = match &app.catalog {
        CatalogState::Loading => format!(" loading questions from {}...", app.feed_source.describe()),
        CatalogState::Ready(catalog) => format!(
            " {} questions across {} subjects",
            catalog.len(),
            catalog.subjects.len()
        ),
        CatalogState::Failed(err) => format!(" load failed: {err} | [r] retry"),
    };
    let info_style = match &app.catalog {
        CatalogState::Failed(_) => Style::default().fg(colors.error()).bg(colors.header_bg()),
        _ => Style::default().fg(colors.dim()).bg(colors.header_bg()),
    };
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " quizcram ",
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.header_bg())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(catalog_info, info_style),
    ]))
    .style(Style::default().bg(colors.header_bg()));
    frame.render_widget(header, layout.header);

    let menu_area = centered_rect(50, 80, layout.main);
    frame.render_widget(&app.menu, menu_area);

    let footer_text = match &app.status {
        Some(status) => format!(" {status} "),
        None => " [1-2] Start  [b] Bookmarks  [c] Settings  [q] Quit ".to_string(),
    };
    let footer_style = if app.status.is_some() {
        Style::default().fg(colors.warning())
    } else {
        Style::default().fg(colors.dim())
    };
    let footer = Paragraph::new(Line::from(Span::styled(footer_text, footer_style)));
    frame.render_widget(footer, layout.footer);
}

fn render_subject_select(frame: &mut ratatui::Frame, app: &App) {
    let layout = AppLayout::new(frame.area());
    render_picker_footer(frame, app, &layout, " [Enter] Select  [Esc] Home ");

    let subjects: Vec<String> = app
        .catalog_ready()
        .map(|c| c.subjects.clone())
        .unwrap_or_default();
    let picker_area = centered_rect(50, 80, layout.main);
    frame.render_widget(
        Picker::new("Select a Subject", &subjects, app.picker_selected, app.theme),
        picker_area,
    );
}

fn render_topic_select(frame: &mut ratatui::Frame, app: &App) {
    let layout = AppLayout::new(frame.area());
    render_picker_footer(frame, app, &layout, " [Enter] Select  [Esc] Back ");

    let topics: Vec<String> = match (app.catalog_ready(), &app.selected_subject) {
        (Some(catalog), Some(subject)) => catalog.topics(subject).to_vec(),
        _ => Vec::new(),
    };
    let title = match &app.selected_subject {
        Some(subject) => format!("Select a Topic in {subject}"),
        None => "Select a Topic".to_string(),
    };
    let picker_area = centered_rect(50, 80, layout.main);
    frame.render_widget(
        Picker::new(&title, &topics, app.picker_selected, app.theme),
        picker_area,
    );
}

fn render_length_select(frame: &mut ratatui::Frame, app: &App) {
    let layout = AppLayout::new(frame.area());
    render_picker_footer(frame, app, &layout, " [Enter] Start  [Esc] Back ");

    let labels: Vec<String> = app.length_choices().into_iter().map(|(l, _)| l).collect();
    let picker_area = centered_rect(50, 60, layout.main);
    frame.render_widget(
        Picker::new("How many questions?", &labels, app.picker_selected, app.theme),
        picker_area,
    );
}

fn render_picker_footer(
    frame: &mut ratatui::Frame,
    app: &App,
    layout: &AppLayout,
    hint: &str,
) {
    let colors = &app.theme.colors;
    let footer = Paragraph::new(Line::from(Span::styled(
        hint.to_string(),
        Style::default().fg(colors.dim()),
    )));
    frame.render_widget(footer, layout.footer);
}

fn render_quiz(frame: &mut ratatui::Frame, app: &App) {
    let colors = &app.theme.colors;
    let Some(session) = &app.session else { return };

    let layout = AppLayout::new(frame.area());

    let mode_text = match session.mode {
        QuizMode::Mixed => format!(" Mixed | Level {} ", session.level),
        QuizMode::Topic => match (&app.selected_subject, &app.selected_topic) {
            (Some(subject), Some(topic)) => format!(" {subject} / {topic} "),
            _ => " Topic ".to_string(),
        },
    };
    let bookmarked = session
        .current()
        .map(|q| app.bookmarks.contains(&q.text))
        .unwrap_or(false);
    let mark_text = if bookmarked { " [bookmarked] " } else { "" };
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            mode_text,
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.header_bg())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" Score {} ", session.score),
            Style::default().fg(colors.dim()).bg(colors.header_bg()),
        ),
        Span::styled(
            mark_text,
            Style::default().fg(colors.warning()).bg(colors.header_bg()),
        ),
    ]))
    .style(Style::default().bg(colors.header_bg()));
    frame.render_widget(header, layout.header);

    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5)])
        .split(layout.main);

    frame.render_widget(TimerBar::new(session.seconds_remaining, app.theme), main_layout[0]);
    frame.render_widget(QuestionView::new(session, app.theme), main_layout[1]);

    let hint = match session.phase {
        Phase::Answering => " [1-4/a-d] Answer  [s] Skip  [m] Bookmark  [Esc] Quit ",
        Phase::Feedback => " [Enter] Next  [m] Bookmark  [Esc] Quit ",
        Phase::Completed => "",
    };
    let footer = Paragraph::new(Line::from(Span::styled(
        hint,
        Style::default().fg(colors.dim()),
    )));
    frame.render_widget(footer, layout.footer);

    if session.skip_pending {
        render_skip_prompt(frame, app);
    }
}

fn render_skip_prompt(frame: &mut ratatui::Frame, app: &App) {
    let colors = &app.theme.colors;
    let area = centered_rect(40, 20, frame.area());

    frame.render_widget(Clear, area);
    let block = Block::bordered()
        .title(" Skip question? ")
        .border_style(Style::default().fg(colors.warning()))
        .style(Style::default().bg(colors.bg()));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines = vec![
        Line::from(Span::styled(
            " Skipping forfeits this question.",
            Style::default().fg(colors.fg()),
        )),
        Line::from(Span::styled(
            " It will not count toward your score.",
            Style::default().fg(colors.dim()),
        )),
        Line::from(""),
        Line::from(Span::styled(
            " [y] Skip  [n] Keep answering ",
            Style::default().fg(colors.accent()),
        )),
    ];
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

fn render_results(frame: &mut ratatui::Frame, app: &App) {
    if let Some(session) = &app.session {
        let centered = centered_rect(60, 70, frame.area());
        frame.render_widget(ResultsPanel::new(session, app.theme), centered);
    }
}

fn render_bookmarks(frame: &mut ratatui::Frame, app: &App) {
    let colors = &app.theme.colors;
    let layout = AppLayout::new(frame.area());

    let list_area = centered_rect(80, 90, layout.main);
    frame.render_widget(
        BookmarkList::new(&app.bookmarks, app.bookmark_selected, app.theme),
        list_area,
    );

    let footer = Paragraph::new(Line::from(Span::styled(
        " [j/k] Navigate  [x] Remove  [Esc] Home ",
        Style::default().fg(colors.dim()),
    )));
    frame.render_widget(footer, layout.footer);
}

fn render_settings(frame: &mut ratatui::Frame, app: &App) {
    let colors = &app.theme.colors;
    let centered = centered_rect(60, 60, frame.area());

    let block = Block::bordered()
        .title(" Settings ")
        .border_style(Style::default().fg(colors.accent()))
        .style(Style::default().bg(colors.bg()));
    let inner = block.inner(centered);
    block.render(centered, frame.buffer_mut());

    let fields: Vec<(String, String)> = vec![
        ("Theme".to_string(), app.config.theme.clone()),
        (
            "Topic quiz length".to_string(),
            format!("{}", app.config.topic_length),
        ),
    ];

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(fields.len() as u16 * 3),
            Constraint::Min(0),
            Constraint::Length(2),
        ])
        .split(inner);

    let header = Paragraph::new(Line::from(Span::styled(
        "  Arrows to navigate, Enter/Right to change, ESC to save & exit",
        Style::default().fg(colors.dim()),
    )));
    header.render(layout[0], frame.buffer_mut());

    let field_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            fields
                .iter()
                .map(|_| Constraint::Length(3))
                .collect::<Vec<_>>(),
        )
        .split(layout[1]);

    for (i, (label, value)) in fields.iter().enumerate() {
        let is_selected = i == app.settings_selected;
        let indicator = if is_selected { " > " } else { "   " };

        let label_style = Style::default()
            .fg(if is_selected { colors.accent() } else { colors.fg() })
            .add_modifier(if is_selected {
                Modifier::BOLD
            } else {
                Modifier::empty()
            });
        let value_style = Style::default().fg(if is_selected {
            colors.warning()
        } else {
            colors.dim()
        });

        let lines = vec![
            Line::from(Span::styled(format!("{indicator}{label}:"), label_style)),
            Line::from(Span::styled(format!("  < {value} >"), value_style)),
        ];
        Paragraph::new(lines).render(field_layout[i], frame.buffer_mut());
    }

    let footer = Paragraph::new(Line::from(Span::styled(
        "  [ESC] Save & back  [Enter/arrows] Change value",
        Style::default().fg(colors.accent()),
    )));
    footer.render(layout[3], frame.buffer_mut());
}
