//! Reusable form widgets for the wizard steps

use crossterm::event::KeyCode;
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, ListState, Paragraph},
    Frame,
};

/// Single-line text input. The cursor is a char index, not a byte offset.
#[derive(Debug, Clone, Default)]
pub struct TextInput {
    value: String,
    cursor: usize,
    placeholder: String,
    max_length: Option<usize>,
}

impl TextInput {
    pub fn new(value: &str, placeholder: &str, max_length: Option<usize>) -> Self {
        Self {
            cursor: value.chars().count(),
            value: value.to_string(),
            placeholder: placeholder.to_string(),
            max_length,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_value(&mut self, new_value: &str) {
        self.value = new_value.to_string();
        self.cursor = self.value.chars().count();
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_index)
            .map_or(self.value.len(), |(i, _)| i)
    }

    /// Handle a key event, returns true if the key was consumed
    pub fn handle_key(&mut self, key: KeyCode) -> bool {
        let len = self.value.chars().count();
        match key {
            KeyCode::Char(c) => {
                if self.max_length.map_or(true, |m| len < m) {
                    let at = self.byte_index(self.cursor);
                    self.value.insert(at, c);
                    self.cursor += 1;
                }
                true
            }
            KeyCode::Backspace => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    let at = self.byte_index(self.cursor);
                    self.value.remove(at);
                }
                true
            }
            KeyCode::Delete => {
                if self.cursor < len {
                    let at = self.byte_index(self.cursor);
                    self.value.remove(at);
                }
                true
            }
            KeyCode::Left => {
                self.cursor = self.cursor.saturating_sub(1);
                true
            }
            KeyCode::Right => {
                self.cursor = (self.cursor + 1).min(len);
                true
            }
            KeyCode::Home => {
                self.cursor = 0;
                true
            }
            KeyCode::End => {
                self.cursor = len;
                true
            }
            _ => false,
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, label: &str, focused: bool) {
        let border = if focused { Color::Yellow } else { Color::DarkGray };
        let block = Block::default()
            .title(format!(" {label} "))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border));

        let line = if self.value.is_empty() {
            Line::from(Span::styled(
                self.placeholder.as_str(),
                Style::default().fg(Color::DarkGray),
            ))
        } else {
            Line::from(self.value.as_str())
        };
        let inner = block.inner(area);
        frame.render_widget(Paragraph::new(line).block(block), area);

        if focused {
            let x = inner.x + (self.cursor as u16).min(inner.width.saturating_sub(1));
            frame.set_cursor_position((x, inner.y));
        }
    }
}

/// Wrap-around selection over a list of `len` items
#[derive(Debug, Clone, Default)]
pub struct SelectList {
    pub state: ListState,
    len: usize,
}

impl SelectList {
    pub fn new(len: usize, selected: usize) -> Self {
        let mut state = ListState::default();
        if len > 0 {
            state.select(Some(selected.min(len - 1)));
        }
        Self { state, len }
    }

    pub fn selected(&self) -> Option<usize> {
        self.state.selected()
    }

    pub fn select_next(&mut self) {
        if self.len == 0 {
            return;
        }
        let i = self.state.selected().map_or(0, |i| (i + 1) % self.len);
        self.state.select(Some(i));
    }

    pub fn select_prev(&mut self) {
        if self.len == 0 {
            return;
        }
        let len = self.len;
        let i = self
            .state
            .selected()
            .map_or(0, |i| if i == 0 { len - 1 } else { i - 1 });
        self.state.select(Some(i));
    }

    /// Up/Down (and j/k) move the selection; returns true if consumed
    pub fn handle_key(&mut self, key: KeyCode) -> bool {
        match key {
            KeyCode::Up | KeyCode::Char('k') => {
                self.select_prev();
                true
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.select_next();
                true
            }
            _ => false,
        }
    }
}
