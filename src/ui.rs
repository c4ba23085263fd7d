//! UiFrame: a thin wrapper around `ratatui::Frame` that clips drawing to the
//! visible area.
//!
//! Floating windows routinely hang off the left or right edge of the screen,
//! so chrome and module views compute rectangles that drift outside the
//! buffer. Writing out of bounds into a `Buffer` panics; every draw call made
//! through `UiFrame` is clipped first.
use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::{StatefulWidget, Widget};

use crate::layout::FloatRect;

pub struct UiFrame<'a> {
    area: Rect,
    buffer: &'a mut Buffer,
}

impl<'a> UiFrame<'a> {
    pub fn new(frame: &'a mut Frame<'_>) -> Self {
        let area = frame.area();
        let buffer = frame.buffer_mut();
        Self { area, buffer }
    }

    /// Construct a `UiFrame` directly from an area and buffer.
    pub fn from_parts(area: Rect, buffer: &'a mut Buffer) -> Self {
        Self { area, buffer }
    }

    pub fn area(&self) -> Rect {
        self.area
    }

    pub fn buffer_mut(&mut self) -> &mut Buffer {
        self.buffer
    }

    fn clip_rect(&self, rect: Rect) -> Option<Rect> {
        let clipped = rect.intersection(self.area);
        if clipped.width == 0 || clipped.height == 0 {
            None
        } else {
            Some(clipped)
        }
    }

    pub fn render_widget<W>(&mut self, widget: W, area: Rect)
    where
        W: Widget,
    {
        if let Some(clipped) = self.clip_rect(area) {
            widget.render(clipped, self.buffer);
        }
    }

    pub fn render_stateful_widget<W>(&mut self, widget: W, area: Rect, state: &mut W::State)
    where
        W: StatefulWidget,
    {
        if let Some(clipped) = self.clip_rect(area) {
            widget.render(clipped, self.buffer, state);
        }
    }

    /// Fill the visible part of a signed rectangle with `style`, clearing
    /// whatever was drawn below it.
    pub fn fill_signed(&mut self, rect: FloatRect, style: Style) {
        let visible = rect.visible_in(self.area);
        for y in visible.y..visible.y.saturating_add(visible.height) {
            for x in visible.x..visible.x.saturating_add(visible.width) {
                if let Some(cell) = self.buffer.cell_mut((x, y)) {
                    cell.reset();
                    cell.set_style(style);
                }
            }
        }
    }

    /// Write `text` starting at a possibly off-screen column. Characters left
    /// of the frame are dropped, as is anything past `max_x` (exclusive).
    pub fn set_string_signed(&mut self, x: i32, y: i32, max_x: i32, text: &str, style: Style) {
        let frame_x0 = self.area.x as i32;
        let frame_x1 = frame_x0 + self.area.width as i32;
        let frame_y0 = self.area.y as i32;
        let frame_y1 = frame_y0 + self.area.height as i32;
        if y < frame_y0 || y >= frame_y1 {
            return;
        }
        let limit = max_x.min(frame_x1);
        for (offset, ch) in text.chars().enumerate() {
            let cx = x + offset as i32;
            if cx >= limit {
                break;
            }
            if cx < frame_x0 {
                continue;
            }
            if let Some(cell) = self.buffer.cell_mut((cx as u16, y as u16)) {
                cell.set_char(ch);
                cell.set_style(style);
            }
        }
    }
}

pub(crate) fn safe_set_string(
    buffer: &mut Buffer,
    bounds: Rect,
    x: u16,
    y: u16,
    text: &str,
    style: Style,
) {
    if bounds.width == 0 || bounds.height == 0 {
        return;
    }
    let max_x = bounds.x.saturating_add(bounds.width);
    let max_y = bounds.y.saturating_add(bounds.height);
    if x < bounds.x || x >= max_x || y < bounds.y || y >= max_y {
        return;
    }
    let available = max_x.saturating_sub(x);
    if available == 0 {
        return;
    }
    let text = truncate_to_width(text, available as usize);
    buffer.set_string(x, y, text, style);
}

pub(crate) fn truncate_to_width(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    value.chars().take(width).collect()
}
