//! Ratatui-based product browser.
//!
//! The catalog arrives over a oneshot channel from the loader task; the UI
//! loop performs the `Loading -> Ready/Failed` transition itself, so the
//! finder is only ever touched from this thread.

use std::io;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use crossterm::{ExecutableCommand, execute};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap};
use tokio::sync::oneshot::{self, error::TryRecvError};

use crate::export::{format_price, truncate_text};
use crate::finder::{LoadOutcome, ProductFinder};

const TITLE: &str = "Product List";
const LOADING: &str = "Loading data...";
const SEARCH_PLACEHOLDER: &str = "Search product...";
const PRICE_PLACEHOLDER: &str = "Max price...";
const NO_RESULTS: &str = "No search results found";
const HELP: &str = "Tab switch field · ↑/↓ scroll · Esc quit";

const DESCRIPTION_WIDTH: usize = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Search,
    Price,
}

pub struct App {
    finder: ProductFinder,
    search_input: String,
    price_input: String,
    focus: Focus,
    table: TableState,
    status: Option<String>,
    should_quit: bool,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    /// A new app is already waiting for its catalog.
    pub fn new() -> Self {
        let mut finder = ProductFinder::new();
        if let Err(err) = finder.begin_loading() {
            tracing::warn!("unexpected initial phase: {err}");
        }
        Self {
            finder,
            search_input: String::new(),
            price_input: String::new(),
            focus: Focus::Search,
            table: TableState::default(),
            status: None,
            should_quit: false,
        }
    }

    pub fn finder(&self) -> &ProductFinder {
        &self.finder
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn on_loaded(&mut self, outcome: LoadOutcome) {
        let transition = match outcome {
            Ok((catalog, index)) => self.finder.finish_loading(catalog, Box::new(index)),
            Err(err) => self.finder.fail_loading(err.to_string()),
        };
        if let Err(err) = transition {
            tracing::warn!("ignored load result: {err}");
        }
        self.table.select(None);
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Esc
            || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
        {
            self.should_quit = true;
            return;
        }

        if self.finder.catalog().is_none() {
            // Inputs are not accepted until the catalog is ready.
            if key.code == KeyCode::Char('q') {
                self.should_quit = true;
            }
            return;
        }

        match key.code {
            KeyCode::Tab | KeyCode::BackTab => {
                self.focus = match self.focus {
                    Focus::Search => Focus::Price,
                    Focus::Price => Focus::Search,
                };
            }
            KeyCode::Down => self.scroll(1),
            KeyCode::Up => self.scroll(-1),
            KeyCode::PageDown => self.scroll(10),
            KeyCode::PageUp => self.scroll(-10),
            KeyCode::Backspace => {
                self.focused_input_mut().pop();
                self.input_changed();
            }
            KeyCode::Char(c) => {
                self.focused_input_mut().push(c);
                self.input_changed();
            }
            _ => {}
        }
    }

    fn focused_input_mut(&mut self) -> &mut String {
        match self.focus {
            Focus::Search => &mut self.search_input,
            Focus::Price => &mut self.price_input,
        }
    }

    fn input_changed(&mut self) {
        match self.focus {
            Focus::Search => self.finder.set_query(self.search_input.clone()),
            Focus::Price => {
                self.status = self
                    .finder
                    .set_price_input(&self.price_input)
                    .err()
                    .map(|err| err.to_string());
            }
        }
        self.table.select(None);
    }

    fn scroll(&mut self, delta: isize) {
        let len = self.finder.visible().map(|v| v.len()).unwrap_or(0);
        if len == 0 {
            self.table.select(None);
            return;
        }
        let current = self.table.selected().unwrap_or(0) as isize;
        let next = (current + delta).clamp(0, len as isize - 1);
        self.table.select(Some(next as usize));
    }

    pub fn draw(&mut self, f: &mut Frame) {
        let area = f.area();
        let outer = Block::default().title(TITLE).borders(Borders::ALL);
        let inner = outer.inner(area);
        f.render_widget(outer, area);

        if let Some(reason) = self.finder.failure() {
            let message = Paragraph::new(format!("Could not load products: {reason}"))
                .style(Style::default().fg(Color::Red))
                .wrap(Wrap { trim: true });
            f.render_widget(message, inner);
            return;
        }
        if self.finder.is_loading() {
            let message = Paragraph::new(LOADING).alignment(Alignment::Center);
            f.render_widget(message, inner);
            return;
        }

        let [inputs, list, status] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .areas(inner);
        let [search_area, price_area] =
            Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
                .areas(inputs);

        self.draw_input(f, search_area, Focus::Search);
        self.draw_input(f, price_area, Focus::Price);
        self.draw_products(f, list);
        self.draw_status(f, status);
    }

    fn draw_input(&self, f: &mut Frame, area: Rect, which: Focus) {
        let (value, placeholder) = match which {
            Focus::Search => (&self.search_input, SEARCH_PLACEHOLDER),
            Focus::Price => (&self.price_input, PRICE_PLACEHOLDER),
        };
        let focused = self.focus == which;
        let border = if focused {
            Style::default().fg(Color::Blue)
        } else {
            Style::default()
        };
        let text = if value.is_empty() {
            Line::styled(placeholder, Style::default().fg(Color::DarkGray))
        } else {
            Line::raw(value.as_str())
        };
        let input = Paragraph::new(text).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border),
        );
        f.render_widget(input, area);

        if focused {
            let offset = value.chars().count() as u16;
            let x = (area.x + 1 + offset).min(area.right().saturating_sub(2));
            f.set_cursor_position((x, area.y + 1));
        }
    }

    fn draw_products(&mut self, f: &mut Frame, area: Rect) {
        let visible = self.finder.visible().unwrap_or_default();
        let rows = visible.iter().map(|product| {
            Row::new(vec![
                Cell::from(product.title.clone())
                    .style(Style::default().add_modifier(Modifier::BOLD)),
                Cell::from(format!("Price: {}", format_price(product.price)))
                    .style(Style::default().fg(Color::Green)),
                Cell::from(truncate_text(&product.description, DESCRIPTION_WIDTH)),
                Cell::from(product.thumbnail.clone())
                    .style(Style::default().fg(Color::DarkGray)),
            ])
        });
        let table = Table::new(
            rows,
            [
                Constraint::Percentage(25),
                Constraint::Length(16),
                Constraint::Percentage(45),
                Constraint::Fill(1),
            ],
        )
        .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED));
        f.render_stateful_widget(table, area, &mut self.table);
    }

    fn draw_status(&self, f: &mut Frame, area: Rect) {
        let line = if let Some(status) = &self.status {
            Line::styled(status.clone(), Style::default().fg(Color::Yellow))
        } else {
            let count = self.finder.visible().map(|v| v.len()).unwrap_or(0);
            if self.finder.query().has_text() && count == 0 {
                Line::styled(NO_RESULTS, Style::default().fg(Color::DarkGray))
            } else {
                Line::raw(format!("{count} products · {HELP}"))
            }
        };
        f.render_widget(Paragraph::new(line), area);
    }
}

pub fn run_tui(mut loaded: oneshot::Receiver<LoadOutcome>) -> Result<()> {
    enable_raw_mode()?;
    let mut terminal = restore_on_error(setup_terminal, teardown_terminal)?;

    let mut app = App::new();
    let result = event_loop(&mut terminal, &mut app, &mut loaded);

    teardown_terminal()?;
    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    loaded: &mut oneshot::Receiver<LoadOutcome>,
) -> Result<()> {
    let tick_rate = Duration::from_millis(100);

    loop {
        if app.finder().is_loading() {
            match loaded.try_recv() {
                Ok(outcome) => app.on_loaded(outcome),
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Closed) => {
                    app.on_loaded(Err(crate::catalog::LoadError::Invalid(
                        "loader stopped without a result".into(),
                    )));
                }
            }
        }

        terminal.draw(|f| app.draw(f))?;

        if event::poll(tick_rate)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            app.handle_key(key);
        }

        if app.should_quit() {
            return Ok(());
        }
    }
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

/// Runs `setup`; if it fails, runs `restore` before returning the setup error.
fn restore_on_error<T>(
    setup: impl FnOnce() -> Result<T>,
    restore: impl FnOnce() -> Result<()>,
) -> Result<T> {
    setup().inspect_err(|_| {
        if let Err(err) = restore() {
            tracing::warn!(error = %err, "terminal restore failed");
        }
    })
}

fn teardown_terminal() -> Result<()> {
    let mut stdout = io::stdout();
    disable_raw_mode()?;
    execute!(stdout, LeaveAlternateScreen)?;
    Ok(())
}
