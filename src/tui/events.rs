use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use std::time::Duration;

#[derive(Debug, Clone)]
pub enum AppEvent {
    Key(KeyEvent),
    Tick,
}

pub struct EventHandler {
    tick: Duration,
}

impl EventHandler {
    pub fn new(tick: Duration) -> Self {
        Self { tick }
    }

    pub fn next_event(&self) -> vidshelf::Result<AppEvent> {
        if event::poll(self.tick)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => Ok(AppEvent::Key(key)),
                _ => Ok(AppEvent::Tick),
            }
        } else {
            Ok(AppEvent::Tick)
        }
    }
}
