use std::io;
use std::time::Duration;

use crossterm::event::{DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind};
use crossterm::execute;

use super::InputDriver;

/// Reads real terminal input through crossterm. Key release and repeat
/// events reported by enhanced keyboard protocols are dropped.
#[derive(Debug, Default)]
pub struct ConsoleInputDriver {
    mouse_capture: bool,
}

impl ConsoleInputDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mouse_capture(&self) -> bool {
        self.mouse_capture
    }
}

fn keep(event: &Event) -> bool {
    !matches!(event, Event::Key(key) if key.kind != KeyEventKind::Press)
}

impl InputDriver for ConsoleInputDriver {
    fn poll(&mut self, timeout: Duration) -> io::Result<bool> {
        crossterm::event::poll(timeout)
    }

    fn read(&mut self) -> io::Result<Event> {
        loop {
            let event = crossterm::event::read()?;
            if keep(&event) {
                return Ok(event);
            }
        }
    }

    fn set_mouse_capture(&mut self, enabled: bool) -> io::Result<()> {
        if enabled {
            execute!(io::stdout(), EnableMouseCapture)?;
        } else {
            execute!(io::stdout(), DisableMouseCapture)?;
        }
        self.mouse_capture = enabled;
        Ok(())
    }
}
