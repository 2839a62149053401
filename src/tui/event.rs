use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use std::time::Duration;

use crate::app::Result;

pub enum AppEvent {
    Key(KeyEvent),
    Tick,
}

pub struct EventHandler {
    tick_rate: Duration,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        Self { tick_rate }
    }

    /// Wait up to one tick for a key press.
    pub fn next(&self) -> Result<AppEvent> {
        if event::poll(self.tick_rate)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    return Ok(AppEvent::Key(key));
                }
            }
        }
        Ok(AppEvent::Tick)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    MoveUp,
    MoveDown,
    NextPage,
    PrevPage,
    LoadMore,
    Refresh,
    ToggleMode,
    Select,
    Back,
    Save,
    OpenInBrowser,
    None,
}
