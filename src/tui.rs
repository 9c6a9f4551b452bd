use crate::prompt::{Prompt, PROMPT_PREFIX};
use crate::selector::EXIT_SENTINEL;
use crate::suggest::{filter_has_prefix, word_before_cursor, Suggestion};
use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{List, ListItem, Paragraph},
    Frame, Terminal, TerminalOptions, Viewport,
};
use std::io::stdout;
use std::ops::Range;

pub const MAX_VISIBLE_SUGGESTIONS: usize = 8;

// Input line plus the suggestion dropdown.
const VIEWPORT_HEIGHT: u16 = MAX_VISIBLE_SUGGESTIONS as u16 + 1;

/// Interactive prompt rendering live prefix suggestions below the input line.
#[derive(Debug, Default)]
pub struct TerminalPrompt;

impl Prompt for TerminalPrompt {
    fn read_line(&mut self, message: &str, suggestions: &[Suggestion]) -> Result<String> {
        println!("{}", message);

        enable_raw_mode().context("Failed to enable raw mode")?;
        let res = edit_line(suggestions);
        // Restore the terminal before reporting anything.
        let restored = disable_raw_mode().context("Failed to disable raw mode");

        let line = res?;
        restored?;
        println!("{}{}", PROMPT_PREFIX, line);
        Ok(line)
    }

    fn break_line(&mut self) -> Result<()> {
        println!();
        Ok(())
    }
}

fn edit_line(suggestions: &[Suggestion]) -> Result<String> {
    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::with_options(
        backend,
        TerminalOptions {
            viewport: Viewport::Inline(VIEWPORT_HEIGHT),
        },
    )?;

    let mut editor = LineEditor::new(suggestions);
    let line = loop {
        terminal.draw(|f| ui(f, &editor))?;

        if let Event::Key(key) = event::read()? {
            if let EditOutcome::Submit(line) = editor.handle_key(key) {
                break line;
            }
        }
    };

    // Leave only the echoed line behind once the viewport is gone.
    terminal.clear()?;
    let area = terminal.get_frame().area();
    terminal.set_cursor_position((area.x, area.y))?;

    Ok(line)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    Pending,
    Submit(String),
}

/// Editing state for one prompt round: the buffer, a byte cursor and the
/// currently highlighted suggestion.
pub struct LineEditor<'s> {
    suggestions: &'s [Suggestion],
    buffer: String,
    cursor: usize,
    selected: Option<usize>,
    // Text and cursor as typed, before cycling through suggestions rewrote them.
    anchor: Option<(String, usize)>,
}

impl<'s> LineEditor<'s> {
    pub fn new(suggestions: &'s [Suggestion]) -> Self {
        Self {
            suggestions,
            buffer: String::new(),
            cursor: 0,
            selected: None,
            anchor: None,
        }
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Suggestions matching the word before the cursor, ignoring case.
    pub fn visible_suggestions(&self) -> Vec<&'s Suggestion> {
        let (text, cursor) = match &self.anchor {
            Some((text, cursor)) => (text.as_str(), *cursor),
            None => (self.buffer.as_str(), self.cursor),
        };
        filter_has_prefix(self.suggestions, word_before_cursor(text, cursor), true)
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> EditOutcome {
        if key.kind != KeyEventKind::Press {
            return EditOutcome::Pending;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c') if ctrl => return EditOutcome::Submit(EXIT_SENTINEL.to_string()),
            KeyCode::Char('d') if ctrl && self.buffer.is_empty() => {
                return EditOutcome::Submit(EXIT_SENTINEL.to_string())
            }
            KeyCode::Char('a') if ctrl => {
                self.accept_selection();
                self.cursor = 0;
            }
            KeyCode::Char('e') if ctrl => {
                self.accept_selection();
                self.cursor = self.buffer.len();
            }
            KeyCode::Char('u') if ctrl => {
                self.accept_selection();
                self.buffer.drain(..self.cursor);
                self.cursor = 0;
            }
            KeyCode::Char(c) if !ctrl => {
                self.accept_selection();
                self.buffer.insert(self.cursor, c);
                self.cursor += c.len_utf8();
            }
            KeyCode::Enter => return EditOutcome::Submit(self.buffer.clone()),
            KeyCode::Backspace => {
                self.accept_selection();
                if let Some(c) = self.buffer[..self.cursor].chars().next_back() {
                    self.cursor -= c.len_utf8();
                    self.buffer.remove(self.cursor);
                }
            }
            KeyCode::Delete => {
                self.accept_selection();
                if self.cursor < self.buffer.len() {
                    self.buffer.remove(self.cursor);
                }
            }
            KeyCode::Left => {
                self.accept_selection();
                if let Some(c) = self.buffer[..self.cursor].chars().next_back() {
                    self.cursor -= c.len_utf8();
                }
            }
            KeyCode::Right => {
                self.accept_selection();
                if let Some(c) = self.buffer[self.cursor..].chars().next() {
                    self.cursor += c.len_utf8();
                }
            }
            KeyCode::Home => {
                self.accept_selection();
                self.cursor = 0;
            }
            KeyCode::End => {
                self.accept_selection();
                self.cursor = self.buffer.len();
            }
            KeyCode::Tab | KeyCode::Down => self.cycle(1),
            KeyCode::BackTab | KeyCode::Up => self.cycle(-1),
            KeyCode::Esc => self.cancel_selection(),
            _ => {}
        }

        EditOutcome::Pending
    }

    // Keep the completed text and forget the dropdown position.
    fn accept_selection(&mut self) {
        self.anchor = None;
        self.selected = None;
    }

    fn cancel_selection(&mut self) {
        if let Some((text, cursor)) = self.anchor.take() {
            self.buffer = text;
            self.cursor = cursor;
        }
        self.selected = None;
    }

    fn cycle(&mut self, step: isize) {
        if self.anchor.is_none() {
            self.anchor = Some((self.buffer.clone(), self.cursor));
        }
        let visible = self.visible_suggestions();
        if visible.is_empty() {
            self.anchor = None;
            return;
        }

        let len = visible.len() as isize;
        let next = match self.selected {
            None if step >= 0 => 0,
            None => len - 1,
            Some(i) => (i as isize + step).rem_euclid(len),
        } as usize;
        self.selected = Some(next);

        let Some((base, base_cursor)) = self.anchor.clone() else {
            return;
        };
        let start = base_cursor - word_before_cursor(&base, base_cursor).len();
        let mut buffer = String::with_capacity(base.len() + visible[next].text.len());
        buffer.push_str(&base[..start]);
        buffer.push_str(&visible[next].text);
        let cursor = buffer.len();
        buffer.push_str(&base[base_cursor..]);

        self.buffer = buffer;
        self.cursor = cursor;
    }
}

/// Rows of the suggestion list to show so the selection stays in view.
pub fn suggestion_window(total: usize, selected: Option<usize>, height: usize) -> Range<usize> {
    if height == 0 {
        return 0..0;
    }
    if total <= height {
        return 0..total;
    }
    let start = match selected {
        Some(idx) if idx >= height => idx + 1 - height,
        _ => 0,
    };
    start..start + height
}

fn ui(f: &mut Frame, editor: &LineEditor) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)].as_ref())
        .split(f.area());

    let input_area = chunks[0];
    let list_area = chunks[1];

    let input = Paragraph::new(Line::from(vec![
        Span::styled(PROMPT_PREFIX, Style::default().fg(Color::Cyan)),
        Span::raw(editor.buffer()),
    ]));
    f.render_widget(input, input_area);

    let typed = editor.buffer()[..editor.cursor()].chars().count() + PROMPT_PREFIX.len();
    let cursor_x = (input_area.x as usize + typed).min(input_area.right().saturating_sub(1) as usize);
    f.set_cursor_position((cursor_x as u16, input_area.y));

    let visible = editor.visible_suggestions();
    let window = suggestion_window(visible.len(), editor.selected(), list_area.height as usize);
    let width = visible[window.clone()]
        .iter()
        .map(|s| s.text.chars().count())
        .max()
        .unwrap_or(0);

    let items: Vec<ListItem> = visible[window.clone()]
        .iter()
        .enumerate()
        .map(|(offset, suggestion)| {
            let highlighted = editor.selected() == Some(window.start + offset);
            let (text_style, desc_style) = if highlighted {
                (
                    Style::default().fg(Color::Black).bg(Color::Cyan),
                    Style::default().fg(Color::Black).bg(Color::Blue),
                )
            } else {
                (
                    Style::default().fg(Color::White).bg(Color::DarkGray),
                    Style::default().fg(Color::Black).bg(Color::Gray),
                )
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!(" {:<width$} ", suggestion.text, width = width), text_style),
                Span::styled(format!(" {} ", suggestion.description), desc_style),
            ]))
        })
        .collect();

    f.render_widget(List::new(items), list_area);
}
