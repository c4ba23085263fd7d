use ratatui::layout::Rect;
use ratatui::style::Style;

use crate::theme;
use crate::ui::{UiFrame, safe_set_string, truncate_to_width};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusLevel {
    #[default]
    Info,
    Warning,
}

/// One-line bar with a left-aligned message and right-aligned hint text.
#[derive(Debug, Default)]
pub struct StatusBar {
    left: String,
    right: String,
    level: StatusLevel,
}

impl StatusBar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_message<T: Into<String>>(&mut self, value: T, level: StatusLevel) {
        self.left = value.into();
        self.level = level;
    }

    pub fn clear_message(&mut self) {
        self.left.clear();
        self.level = StatusLevel::Info;
    }

    pub fn message(&self) -> &str {
        &self.left
    }

    pub fn level(&self) -> StatusLevel {
        self.level
    }

    pub fn set_right<T: Into<String>>(&mut self, value: T) {
        self.right = value.into();
    }
}

impl super::Component for StatusBar {
    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect) {
        if area.height == 0 || area.width == 0 {
            return;
        }
        let style = Style::default().bg(theme::panel_bg()).fg(match self.level {
            StatusLevel::Info => theme::panel_fg(),
            StatusLevel::Warning => theme::status_warning_fg(),
        });
        let (x, y) = (area.x, area.y);
        let width = area.width as usize;
        let buffer = frame.buffer_mut();
        let bounds = area.intersection(buffer.area);
        if bounds.width == 0 || bounds.height == 0 {
            return;
        }

        let left = truncate_to_width(&self.left, width);
        safe_set_string(buffer, bounds, x, y, &left, style);

        if !self.right.is_empty() {
            let right = truncate_to_width(&self.right, width);
            let right_width = right.chars().count();
            if right_width + left.chars().count() < width {
                let start_x = x.saturating_add((width - right_width) as u16);
                safe_set_string(
                    buffer,
                    bounds,
                    start_x,
                    y,
                    &right,
                    Style::default()
                        .bg(theme::panel_bg())
                        .fg(theme::panel_inactive_fg()),
                );
            }
        }
    }
}
