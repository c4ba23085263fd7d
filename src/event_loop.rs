use std::io;
use std::time::Duration;

use crossterm::event::Event;

use crate::drivers::InputDriver;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlFlow {
    Continue,
    Quit,
}

/// Owns the input driver and pumps events into a handler on the UI thread.
///
/// The handler sees `None` once per iteration before input is read, which is
/// where callers redraw.
pub struct EventLoop<D> {
    driver: D,
    poll_interval: Duration,
}

impl<D: InputDriver> EventLoop<D> {
    pub fn new(driver: D, poll_interval: Duration) -> Self {
        Self {
            driver,
            poll_interval,
        }
    }

    pub fn poll(&mut self) -> io::Result<Option<Event>> {
        if self.driver.poll(self.poll_interval)? {
            Ok(Some(self.driver.read()?))
        } else {
            Ok(None)
        }
    }

    pub fn driver(&mut self) -> &mut D {
        &mut self.driver
    }

    pub fn run<F>(&mut self, mut handler: F) -> io::Result<()>
    where
        F: FnMut(&mut D, Option<Event>) -> io::Result<ControlFlow>,
    {
        loop {
            if let ControlFlow::Quit = handler(&mut self.driver, None)? {
                break;
            }

            if self.driver.poll(self.poll_interval)? {
                // Drain bursts (drags, scrolling) before the next redraw.
                loop {
                    let event = self.driver.read()?;
                    if let ControlFlow::Quit = handler(&mut self.driver, Some(event))? {
                        return Ok(());
                    }
                    if !self.driver.poll(Duration::from_millis(0))? {
                        break;
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::ScriptedDriver;
    use crossterm::event::KeyCode;

    #[test]
    fn handler_sees_idle_ticks_and_events_until_quit() {
        let driver = ScriptedDriver::new([
            ScriptedDriver::key(KeyCode::Char('a')),
            ScriptedDriver::key(KeyCode::Char('b')),
        ]);
        let mut event_loop = EventLoop::new(driver, Duration::ZERO);
        let mut seen = Vec::new();
        let mut idle = 0;
        event_loop
            .run(|_, event| {
                match event {
                    None => idle += 1,
                    Some(event) if event == ScriptedDriver::quit() => return Ok(ControlFlow::Quit),
                    Some(event) => seen.push(event),
                }
                Ok(ControlFlow::Continue)
            })
            .unwrap();
        assert_eq!(seen.len(), 2);
        assert!(idle >= 1);
    }
}
