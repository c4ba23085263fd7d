use crossterm::event::Event;
use ratatui::layout::Rect;

use crate::ui::UiFrame;

pub mod confirm_overlay;
pub mod status_bar;

pub use confirm_overlay::{ConfirmAction, ConfirmOverlayComponent};
pub use status_bar::{StatusBar, StatusLevel};

/// Workspace-level widgets drawn on top of the windows.
pub trait Component {
    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect);

    fn handle_event(&mut self, _event: &Event) -> bool {
        false
    }
}
