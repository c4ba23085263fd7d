//! Bottom band listing every open window, minimized ones included.

use crossterm::event::{Event, MouseButton, MouseEventKind};
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};

use crate::error::WmError;
use crate::layout::rect_contains;
use crate::theme;
use crate::ui::{UiFrame, safe_set_string, truncate_to_width};
use crate::window::{WindowId, WindowStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskbarAction {
    Minimize,
    Restore,
    Focus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskbarEntry {
    pub id: WindowId,
    pub label: String,
    pub focused: bool,
    pub minimized: bool,
}

#[derive(Debug, Clone, Copy)]
struct EntryHit {
    id: WindowId,
    rect: Rect,
}

#[derive(Debug, Default)]
pub struct Taskbar {
    area: Rect,
    hits: Vec<EntryHit>,
}

/// Entries in creation order.
pub fn entries(store: &WindowStore) -> Vec<TaskbarEntry> {
    let focused = store.focused();
    let mut records: Vec<_> = store.windows().iter().collect();
    records.sort_by_key(|w| w.creation_order());
    records
        .into_iter()
        .map(|w| TaskbarEntry {
            id: w.id,
            label: w.title.clone(),
            focused: focused == Some(w.id),
            minimized: w.minimized,
        })
        .collect()
}

/// What a click on `id`'s entry does.
pub fn click_action(store: &WindowStore, id: WindowId) -> Option<TaskbarAction> {
    let record = store.window(id)?;
    Some(if record.minimized {
        TaskbarAction::Restore
    } else if store.focused() == Some(id) {
        TaskbarAction::Minimize
    } else {
        TaskbarAction::Focus
    })
}

pub fn activate(store: &mut WindowStore, id: WindowId) -> Result<TaskbarAction, WmError> {
    let action = click_action(store, id).ok_or(WmError::UnknownWindow(id))?;
    match action {
        TaskbarAction::Minimize => store.minimize_window(id)?,
        TaskbarAction::Restore => store.restore_window(id)?,
        TaskbarAction::Focus => store.bring_to_front(id)?,
    }
    tracing::debug!(window_id = ?id, ?action, "taskbar click");
    Ok(action)
}

impl Taskbar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn area(&self) -> Rect {
        self.area
    }

    pub fn set_area(&mut self, area: Rect) {
        self.area = area;
    }

    pub fn render(&mut self, frame: &mut UiFrame<'_>, store: &WindowStore) {
        self.hits.clear();
        let area = self.area;
        if area.width == 0 || area.height == 0 {
            return;
        }
        let base = Style::default()
            .bg(theme::panel_bg())
            .fg(theme::panel_fg());
        frame.buffer_mut().set_style(area, base);
        let buffer = frame.buffer_mut();
        let bounds = area.intersection(buffer.area);
        if bounds.width == 0 || bounds.height == 0 {
            return;
        }
        let max_x = area.x.saturating_add(area.width);
        let mut x = area.x;
        for entry in entries(store) {
            let max_label = max_x.saturating_sub(x).saturating_sub(2) as usize;
            if max_label == 0 {
                break;
            }
            let label = truncate_to_width(&entry.label, max_label);
            let chunk = if entry.minimized {
                format!(" ({label}) ")
            } else {
                format!(" {label} ")
            };
            let width = chunk.chars().count() as u16;
            if x.saturating_add(width) > max_x {
                break;
            }
            let style = if entry.focused {
                Style::default()
                    .bg(theme::panel_active_bg())
                    .fg(theme::panel_active_fg())
                    .add_modifier(Modifier::BOLD)
            } else if entry.minimized {
                base.fg(theme::panel_inactive_fg())
            } else {
                base
            };
            safe_set_string(buffer, bounds, x, area.y, &chunk, style);
            self.hits.push(EntryHit {
                id: entry.id,
                rect: Rect {
                    x,
                    y: area.y,
                    width,
                    height: 1,
                },
            });
            x = x.saturating_add(width);
        }
    }

    pub fn hit_test(&self, event: &Event) -> Option<WindowId> {
        let Event::Mouse(mouse) = event else {
            return None;
        };
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return None;
        }
        self.hits
            .iter()
            .find(|hit| rect_contains(hit.rect, mouse.column, mouse.row))
            .map(|hit| hit.id)
    }
}
