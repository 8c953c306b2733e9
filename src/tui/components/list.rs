use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, List, ListItem, ListState},
};

/// Scrollable list of pre-rendered rows with a single selection.
pub struct SelectList {
    pub items: Vec<String>,
    pub state: ListState,
    viewport_size: usize,
}

impl SelectList {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            state: ListState::default(),
            viewport_size: 0,
        }
    }

    pub fn selected(&self) -> Option<usize> {
        self.state.selected().filter(|&i| i < self.items.len())
    }

    pub fn select(&mut self, index: usize) {
        if !self.items.is_empty() {
            self.state.select(Some(index.min(self.items.len() - 1)));
            self.adjust_offset();
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Up => {
                self.previous();
                true
            }
            KeyCode::Down => {
                self.next();
                true
            }
            KeyCode::PageDown => {
                self.page_by(self.viewport_size.max(1) as isize);
                true
            }
            KeyCode::PageUp => {
                self.page_by(-(self.viewport_size.max(1) as isize));
                true
            }
            KeyCode::Home => {
                self.select(0);
                true
            }
            KeyCode::End => {
                self.select(self.items.len().saturating_sub(1));
                true
            }
            _ => false,
        }
    }

    pub fn next(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => (i + 1) % self.items.len(),
            None => 0,
        };
        self.select(i);
    }

    pub fn previous(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => self.items.len() - 1,
            Some(i) => i - 1,
        };
        self.select(i);
    }

    fn page_by(&mut self, step: isize) {
        let current = self.state.selected().unwrap_or(0);
        self.select(current.saturating_add_signed(step));
    }

    /// Swap in fresh rows, keeping the selection index where possible.
    pub fn update_items(&mut self, new_items: Vec<String>) {
        let current = self.state.selected();
        self.items = new_items;

        if self.items.is_empty() {
            self.state.select(None);
        } else {
            self.select(current.unwrap_or(0));
        }
        self.adjust_offset();
    }

    pub fn render(&mut self, f: &mut Frame, area: Rect, title: &str, focused: bool) {
        self.viewport_size = (area.height.saturating_sub(2) as usize).max(1);
        self.adjust_offset();

        let items: Vec<ListItem> = self
            .items
            .iter()
            .map(|row| ListItem::new(Line::raw(row.as_str())))
            .collect();

        let border = if focused {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::Gray)
        };
        let highlight = if focused {
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(border)
                    .title(title),
            )
            .highlight_style(highlight);

        f.render_stateful_widget(list, area, &mut self.state);
    }

    fn adjust_offset(&mut self) {
        if self.items.is_empty() {
            *self.state.offset_mut() = 0;
            return;
        }

        let viewport = self.viewport_size.max(1);
        let selected = self.state.selected().unwrap_or(0).min(self.items.len() - 1);
        let max_offset = self.items.len().saturating_sub(viewport);
        let mut offset = self.state.offset().min(max_offset);

        if selected < offset {
            offset = selected;
        } else if selected >= offset + viewport {
            offset = selected + 1 - viewport;
        }
        *self.state.offset_mut() = offset;
    }
}

#[cfg(test)]
mod tests {
    use super::SelectList;

    fn rows(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("row {i}")).collect()
    }

    #[test]
    fn navigation_wraps() {
        let mut list = SelectList::new();
        list.update_items(rows(3));
        assert_eq!(list.selected(), Some(0));
        list.previous();
        assert_eq!(list.selected(), Some(2));
        list.next();
        assert_eq!(list.selected(), Some(0));
    }

    #[test]
    fn shrinking_clamps_selection() {
        let mut list = SelectList::new();
        list.update_items(rows(5));
        list.select(4);
        list.update_items(rows(2));
        assert_eq!(list.selected(), Some(1));
        list.update_items(Vec::new());
        assert_eq!(list.selected(), None);
    }
}
