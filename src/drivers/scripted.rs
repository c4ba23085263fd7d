use std::collections::VecDeque;
use std::io;
use std::time::Duration;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use super::InputDriver;

/// Replays a fixed list of events, then reports `Ctrl+Q` so loops driven by
/// it always terminate.
#[derive(Debug, Default)]
pub struct ScriptedDriver {
    events: VecDeque<Event>,
    finished: bool,
}

impl ScriptedDriver {
    pub fn new(events: impl IntoIterator<Item = Event>) -> Self {
        Self {
            events: events.into_iter().collect(),
            finished: false,
        }
    }

    pub fn push(&mut self, event: Event) {
        self.events.push_back(event);
    }

    pub fn remaining(&self) -> usize {
        self.events.len()
    }

    pub fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    pub fn quit() -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::CONTROL))
    }

    pub fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    pub fn click(column: u16, row: u16) -> [Event; 2] {
        [
            Self::mouse(MouseEventKind::Down(MouseButton::Left), column, row),
            Self::mouse(MouseEventKind::Up(MouseButton::Left), column, row),
        ]
    }
}

impl InputDriver for ScriptedDriver {
    fn poll(&mut self, _timeout: Duration) -> io::Result<bool> {
        Ok(!self.events.is_empty() || !self.finished)
    }

    fn read(&mut self) -> io::Result<Event> {
        if let Some(event) = self.events.pop_front() {
            return Ok(event);
        }
        self.finished = true;
        Ok(Self::quit())
    }
}
