pub mod arrange;
pub mod floating;

pub use arrange::{ArrangeMode, arrange};

use ratatui::prelude::Rect;
use serde::{Deserialize, Serialize};

/// Signed window rectangle: the origin may sit left of (or above) the
/// viewport, the size is always non-negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FloatRect {
    pub x: i32,
    pub y: i32,
    pub width: u16,
    pub height: u16,
}

impl FloatRect {
    pub const fn new(x: i32, y: i32, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exclusive right edge.
    pub const fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    /// Exclusive bottom edge.
    pub const fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }

    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn contains(&self, column: u16, row: u16) -> bool {
        if self.is_empty() {
            return false;
        }
        let (column, row) = (column as i32, row as i32);
        column >= self.x && column < self.right() && row >= self.y && row < self.bottom()
    }

    /// Portion of the rectangle that falls inside `bounds`, or an empty rect.
    pub fn visible_in(&self, bounds: Rect) -> Rect {
        let x0 = self.x.max(bounds.x as i32);
        let y0 = self.y.max(bounds.y as i32);
        let x1 = self.right().min(bounds.x as i32 + bounds.width as i32);
        let y1 = self.bottom().min(bounds.y as i32 + bounds.height as i32);
        if x1 <= x0 || y1 <= y0 {
            return Rect::default();
        }
        Rect {
            x: x0 as u16,
            y: y0 as u16,
            width: (x1 - x0) as u16,
            height: (y1 - y0) as u16,
        }
    }
}

impl From<Rect> for FloatRect {
    fn from(rect: Rect) -> Self {
        Self {
            x: rect.x as i32,
            y: rect.y as i32,
            width: rect.width,
            height: rect.height,
        }
    }
}

/// Strict overlap test: rectangles that only share an edge do not intersect,
/// and empty rectangles never intersect anything.
pub fn rects_intersect(a: FloatRect, b: FloatRect) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }
    a.x < b.right() && a.right() > b.x && a.y < b.bottom() && a.bottom() > b.y
}

pub fn rect_contains(rect: Rect, column: u16, row: u16) -> bool {
    if rect.width == 0 || rect.height == 0 {
        return false;
    }
    let max_x = rect.x.saturating_add(rect.width);
    let max_y = rect.y.saturating_add(rect.height);
    column >= rect.x && column < max_x && row >= rect.y && row < max_y
}

/// Place a `width` x `height` popup anchored at (`x`, `y`) while keeping it
/// inside `bounds`.
pub fn place_popup(x: u16, y: u16, width: u16, height: u16, bounds: Rect) -> Rect {
    let width = width.min(bounds.width);
    let height = height.min(bounds.height);
    let max_x = bounds.x.saturating_add(bounds.width.saturating_sub(width));
    let max_y = bounds.y.saturating_add(bounds.height.saturating_sub(height));
    Rect {
        x: x.clamp(bounds.x, max_x),
        y: y.clamp(bounds.y, max_y),
        width,
        height,
    }
}
