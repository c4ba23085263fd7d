//! Geometry for interactive moves and resizes of floating windows.
//!
//! Every function here is pure and total: given a candidate rectangle it
//! always produces a rectangle. The interaction shell chains them in a fixed
//! order (clamp, snap, collision check) for every pointer event.

use ratatui::prelude::Rect;

use super::{FloatRect, rects_intersect};
use crate::constants::MIN_VISIBLE_MARGIN;

/// Keep a dragged window inside the vertical work band and at least
/// [`MIN_VISIBLE_MARGIN`] columns on screen horizontally.
pub fn clamp_to_bounds(rect: FloatRect, bounds: Rect) -> FloatRect {
    let left = bounds.x as i32;
    let right = left + bounds.width as i32;
    let top = bounds.y as i32;
    let bottom = top + bounds.height as i32;

    let margin = MIN_VISIBLE_MARGIN.min(rect.width) as i32;
    let min_x = left - rect.width as i32 + margin;
    let max_x = (right - margin).max(min_x);
    let max_y = (bottom - rect.height as i32).max(top);

    FloatRect {
        x: rect.x.clamp(min_x, max_x),
        y: rect.y.clamp(top, max_y),
        ..rect
    }
}

/// Edge coordinates a rectangle may snap to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapTargets {
    /// Candidate x coordinates (left/right edges).
    pub columns: Vec<i32>,
    /// Candidate y coordinates (top/bottom edges).
    pub rows: Vec<i32>,
}

impl SnapTargets {
    /// Screen edges come first so they win ties against window edges.
    pub fn collect(bounds: Rect, others: &[FloatRect]) -> Self {
        let left = bounds.x as i32;
        let top = bounds.y as i32;
        let mut columns = vec![left, left + bounds.width as i32];
        let mut rows = vec![top, top + bounds.height as i32];
        for other in others {
            columns.push(other.x);
            columns.push(other.right());
            rows.push(other.y);
            rows.push(other.bottom());
        }
        Self { columns, rows }
    }
}

/// Closest target within `threshold` of `value`, with its distance.
pub fn nearest_target(value: i32, targets: &[i32], threshold: u16) -> Option<(u32, i32)> {
    let mut best: Option<(u32, i32)> = None;
    for &target in targets {
        let distance = value.abs_diff(target);
        if distance > threshold as u32 {
            continue;
        }
        if best.is_none_or(|(d, _)| distance < d) {
            best = Some((distance, target));
        }
    }
    best
}

/// Snap a moved rectangle: each of the four edges is tested independently,
/// and per axis the edge with the nearer target wins (leading edge on ties).
/// A vertical snap that would leave the work band is dropped.
pub fn snap_position(rect: FloatRect, bounds: Rect, others: &[FloatRect], threshold: u16) -> FloatRect {
    let targets = SnapTargets::collect(bounds, others);
    let width = rect.width as i32;
    let height = rect.height as i32;

    let x = pick_axis(
        nearest_target(rect.x, &targets.columns, threshold),
        nearest_target(rect.right(), &targets.columns, threshold).map(|(d, t)| (d, t - width)),
    )
    .unwrap_or(rect.x);

    let top = bounds.y as i32;
    let bottom = top + bounds.height as i32;
    let y = pick_axis(
        nearest_target(rect.y, &targets.rows, threshold),
        nearest_target(rect.bottom(), &targets.rows, threshold).map(|(d, t)| (d, t - height)),
    )
    .filter(|&y| y >= top && y + height <= bottom)
    .unwrap_or(rect.y);

    FloatRect { x, y, ..rect }
}

fn pick_axis(leading: Option<(u32, i32)>, trailing: Option<(u32, i32)>) -> Option<i32> {
    match (leading, trailing) {
        (Some((dl, l)), Some((dt, t))) => Some(if dt < dl { t } else { l }),
        (Some((_, l)), None) => Some(l),
        (None, Some((_, t))) => Some(t),
        (None, None) => None,
    }
}

/// Resize anchored at the top-left corner. The pointer delta grows or shrinks
/// the size, which is held between the minimum size and the space remaining
/// in `bounds` from the window origin; the moving right/bottom edges then
/// snap to screen and window edges.
#[allow(clippy::too_many_arguments)]
pub fn resize_from_origin(
    start: FloatRect,
    dx: i32,
    dy: i32,
    bounds: Rect,
    others: &[FloatRect],
    min_width: u16,
    min_height: u16,
    threshold: u16,
) -> FloatRect {
    let right_limit = bounds.x as i32 + bounds.width as i32;
    let bottom_limit = bounds.y as i32 + bounds.height as i32;
    let min_w = min_width.max(1) as i32;
    let min_h = min_height.max(1) as i32;
    let max_w = (right_limit - start.x).clamp(min_w, u16::MAX as i32);
    let max_h = (bottom_limit - start.y).clamp(min_h, u16::MAX as i32);

    let mut width = (start.width as i32 + dx).clamp(min_w, max_w);
    let mut height = (start.height as i32 + dy).clamp(min_h, max_h);

    let targets = SnapTargets::collect(bounds, others);
    if let Some((_, edge)) = nearest_target(start.x + width, &targets.columns, threshold) {
        let snapped = edge - start.x;
        if (min_w..=max_w).contains(&snapped) {
            width = snapped;
        }
    }
    if let Some((_, edge)) = nearest_target(start.y + height, &targets.rows, threshold) {
        let snapped = edge - start.y;
        if (min_h..=max_h).contains(&snapped) {
            height = snapped;
        }
    }

    FloatRect {
        width: width as u16,
        height: height as u16,
        ..start
    }
}

/// Whether moving from `current` to `candidate` runs into another window.
///
/// Only windows the candidate overlaps and `current` does not already
/// overlap count, so a window that starts out overlapped can still be moved
/// clear of its neighbours.
pub fn collides(candidate: FloatRect, current: FloatRect, others: &[FloatRect]) -> bool {
    others
        .iter()
        .any(|other| rects_intersect(candidate, *other) && !rects_intersect(current, *other))
}
