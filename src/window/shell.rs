//! Pointer interaction for floating windows.
//!
//! The shell owns at most one drag or resize session at a time. Sessions hold
//! a [`PointerCapture`]; dropping the capture ends the session, and every exit
//! path (button release, focus loss, window removal, reset) drops it.

use crossterm::event::{Event, KeyCode, MouseButton, MouseEvent, MouseEventKind};
use ratatui::prelude::Rect;
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders, Clear};

use super::decorator::{ChromeHit, ChromeState, DefaultDecorator, WindowDecorator};
use super::{WindowId, WindowStore};
use crate::config::InteractionPolicy;
use crate::error::WmError;
use crate::layout::floating::{clamp_to_bounds, collides, resize_from_origin, snap_position};
use crate::layout::{FloatRect, place_popup, rect_contains};
use crate::linking::LinkingGroup;
use crate::theme;
use crate::ui::{UiFrame, safe_set_string};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionState {
    Idle,
    Dragging(WindowId),
    Resizing(WindowId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionKind {
    Drag,
    Resize,
}

/// Exclusive hold on the pointer for one drag or resize session.
#[derive(Debug)]
pub struct PointerCapture {
    kind: SessionKind,
    window: WindowId,
    start_column: u16,
    start_row: u16,
    start_rect: FloatRect,
}

impl PointerCapture {
    fn acquire(kind: SessionKind, window: WindowId, mouse: &MouseEvent, start_rect: FloatRect) -> Self {
        tracing::debug!(window_id = ?window, ?kind, "pointer captured");
        Self {
            kind,
            window,
            start_column: mouse.column,
            start_row: mouse.row,
            start_rect,
        }
    }

    pub fn window(&self) -> WindowId {
        self.window
    }

    fn delta(&self, mouse: &MouseEvent) -> (i32, i32) {
        (
            mouse.column as i32 - self.start_column as i32,
            mouse.row as i32 - self.start_row as i32,
        )
    }
}

impl Drop for PointerCapture {
    fn drop(&mut self) {
        tracing::debug!(window_id = ?self.window, kind = ?self.kind, "pointer released");
    }
}

/// Result of routing one event through the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellResponse {
    Ignored,
    Handled,
    /// The close button was pressed; the caller decides whether to prompt.
    CloseRequested(WindowId),
    /// A press landed in the window body; the caller forwards it to the
    /// module view.
    Body(WindowId),
}

const PALETTE_ENTRIES: [Option<LinkingGroup>; 5] = [
    Some(LinkingGroup::Red),
    Some(LinkingGroup::Blue),
    Some(LinkingGroup::Green),
    Some(LinkingGroup::Yellow),
    None,
];
const PALETTE_WIDTH: u16 = 12;

#[derive(Debug, Clone, Copy)]
struct LinkPalette {
    window: WindowId,
    area: Rect,
}

impl LinkPalette {
    fn entry_at(&self, column: u16, row: u16) -> Option<Option<LinkingGroup>> {
        let inner = Rect {
            x: self.area.x + 1,
            y: self.area.y + 1,
            width: self.area.width.saturating_sub(2),
            height: self.area.height.saturating_sub(2),
        };
        if !rect_contains(inner, column, row) {
            return None;
        }
        PALETTE_ENTRIES.get((row - inner.y) as usize).copied()
    }
}

#[derive(Debug)]
pub struct InteractionShell {
    capture: Option<PointerCapture>,
    palette: Option<LinkPalette>,
    decorator: Box<dyn WindowDecorator>,
    policy: InteractionPolicy,
}

impl InteractionShell {
    pub fn new(policy: InteractionPolicy) -> Self {
        Self {
            capture: None,
            palette: None,
            decorator: Box::new(DefaultDecorator),
            policy,
        }
    }

    pub fn with_decorator(mut self, decorator: Box<dyn WindowDecorator>) -> Self {
        self.decorator = decorator;
        self
    }

    pub fn decorator(&self) -> &dyn WindowDecorator {
        self.decorator.as_ref()
    }

    pub fn policy(&self) -> &InteractionPolicy {
        &self.policy
    }

    pub fn state(&self) -> InteractionState {
        match &self.capture {
            None => InteractionState::Idle,
            Some(c) if c.kind == SessionKind::Drag => InteractionState::Dragging(c.window),
            Some(c) => InteractionState::Resizing(c.window),
        }
    }

    pub fn palette_open_for(&self) -> Option<WindowId> {
        self.palette.map(|p| p.window)
    }

    /// Drop any session and close the palette.
    pub fn reset(&mut self) {
        self.capture = None;
        self.palette = None;
    }

    /// Drop state pointing at windows that are gone or hidden.
    pub fn sync(&mut self, store: &WindowStore) {
        let alive = |id: WindowId| store.window(id).is_some_and(|w| !w.minimized);
        if self.capture.as_ref().is_some_and(|c| !alive(c.window)) {
            self.capture = None;
        }
        if self.palette.is_some_and(|p| !alive(p.window)) {
            self.palette = None;
        }
    }

    /// Topmost visible window under the pointer.
    pub fn window_at(&self, store: &WindowStore, column: u16, row: u16) -> Option<WindowId> {
        let work_area = store.work_area();
        store
            .windows_by_z()
            .into_iter()
            .rev()
            .find(|w| !w.minimized && w.display_rect(work_area).contains(column, row))
            .map(|w| w.id)
    }

    pub fn handle_event(&mut self, store: &mut WindowStore, event: &Event) -> ShellResponse {
        self.sync(store);
        match event {
            Event::FocusLost => {
                self.capture = None;
                ShellResponse::Ignored
            }
            Event::Key(key) if key.code == KeyCode::Esc && self.palette.is_some() => {
                self.palette = None;
                ShellResponse::Handled
            }
            Event::Mouse(mouse) => self.handle_mouse(store, mouse),
            _ => ShellResponse::Ignored,
        }
    }

    fn handle_mouse(&mut self, store: &mut WindowStore, mouse: &MouseEvent) -> ShellResponse {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                // A new press always ends a session whose release we missed.
                self.capture = None;
                if let Some(palette) = self.palette.take() {
                    if let Some(choice) = palette.entry_at(mouse.column, mouse.row) {
                        settle(store.set_window_linking_group(palette.window, choice));
                    }
                    return ShellResponse::Handled;
                }
                self.press(store, mouse)
            }
            MouseEventKind::Down(_) => match self.window_at(store, mouse.column, mouse.row) {
                Some(id) => {
                    settle(store.bring_to_front(id));
                    ShellResponse::Body(id)
                }
                None => ShellResponse::Ignored,
            },
            MouseEventKind::Drag(_) => {
                let Some(kind) = self.capture.as_ref().map(|c| c.kind) else {
                    return ShellResponse::Ignored;
                };
                match kind {
                    SessionKind::Drag => self.drag_to(store, mouse),
                    SessionKind::Resize => self.resize_to(store, mouse),
                }
                ShellResponse::Handled
            }
            MouseEventKind::Up(_) => {
                if self.capture.take().is_some() {
                    ShellResponse::Handled
                } else {
                    ShellResponse::Ignored
                }
            }
            _ => ShellResponse::Ignored,
        }
    }

    fn press(&mut self, store: &mut WindowStore, mouse: &MouseEvent) -> ShellResponse {
        let Some(id) = self.window_at(store, mouse.column, mouse.row) else {
            return ShellResponse::Ignored;
        };
        settle(store.bring_to_front(id));
        let Some(record) = store.window(id) else {
            return ShellResponse::Ignored;
        };
        let maximized = record.maximized;
        let rect = record.rect();
        let shown = record.display_rect(store.work_area());

        match self.decorator.hit_test(shown, mouse.column, mouse.row) {
            ChromeHit::Close => ShellResponse::CloseRequested(id),
            ChromeHit::Minimize => {
                settle(store.minimize_window(id));
                ShellResponse::Handled
            }
            ChromeHit::Maximize => {
                settle(store.maximize_window(id));
                ShellResponse::Handled
            }
            ChromeHit::LinkDot => {
                let area = place_popup(
                    mouse.column,
                    mouse.row.saturating_add(1),
                    PALETTE_WIDTH,
                    PALETTE_ENTRIES.len() as u16 + 2,
                    store.work_area(),
                );
                self.palette = Some(LinkPalette { window: id, area });
                ShellResponse::Handled
            }
            ChromeHit::Titlebar if !maximized => {
                self.capture = Some(PointerCapture::acquire(SessionKind::Drag, id, mouse, rect));
                ShellResponse::Handled
            }
            ChromeHit::ResizeHandle if !maximized => {
                self.capture = Some(PointerCapture::acquire(SessionKind::Resize, id, mouse, rect));
                ShellResponse::Handled
            }
            ChromeHit::Body => ShellResponse::Body(id),
            ChromeHit::None => ShellResponse::Ignored,
            _ => ShellResponse::Handled,
        }
    }

    fn session_delta(&self, mouse: &MouseEvent) -> Option<(WindowId, (i32, i32), FloatRect)> {
        self.capture
            .as_ref()
            .map(|c| (c.window, c.delta(mouse), c.start_rect))
    }

    fn drag_to(&mut self, store: &mut WindowStore, mouse: &MouseEvent) {
        let Some((id, (dx, dy), start)) = self.session_delta(mouse) else {
            return;
        };
        let Some(current) = store.window(id).map(|w| w.rect()) else {
            self.capture = None;
            return;
        };
        let bounds = store.work_area();
        let others = store.obstacles(Some(id));

        let candidate = FloatRect {
            x: start.x + dx,
            y: start.y + dy,
            ..start
        };
        let candidate = clamp_to_bounds(candidate, bounds);
        let candidate = snap_position(candidate, bounds, &others, self.policy.snap_threshold);
        if self.policy.collision.drag && collides(candidate, current, &others) {
            tracing::trace!(window_id = ?id, x = candidate.x, y = candidate.y, "drag blocked by collision");
            return;
        }
        settle(store.update_window_position(id, candidate.x, candidate.y));
    }

    fn resize_to(&mut self, store: &mut WindowStore, mouse: &MouseEvent) {
        let Some((id, (dx, dy), start)) = self.session_delta(mouse) else {
            return;
        };
        let Some(current) = store.window(id).map(|w| w.rect()) else {
            self.capture = None;
            return;
        };
        let others = store.obstacles(Some(id));
        let resized = resize_from_origin(
            start,
            dx,
            dy,
            store.work_area(),
            &others,
            self.policy.min_width,
            self.policy.min_height,
            self.policy.snap_threshold,
        );
        if self.policy.collision.resize && collides(resized, current, &others) {
            tracing::trace!(window_id = ?id, width = resized.width, height = resized.height, "resize blocked by collision");
            return;
        }
        settle(store.update_window_size(id, resized.width, resized.height));
    }

    /// Paint chrome for one window.
    pub fn render_chrome(
        &self,
        frame: &mut UiFrame<'_>,
        rect: FloatRect,
        state: ChromeState<'_>,
    ) {
        self.decorator.render_window(frame, rect, state);
    }

    /// Paint the linking palette if it is open.
    pub fn render_overlay(&self, frame: &mut UiFrame<'_>) {
        let Some(palette) = self.palette else {
            return;
        };
        let style = Style::default().bg(theme::menu_bg()).fg(theme::menu_fg());
        frame.render_widget(Clear, palette.area);
        frame.render_widget(
            Block::default()
                .borders(Borders::ALL)
                .title("Link")
                .style(style),
            palette.area,
        );
        let bounds = palette.area;
        for (index, entry) in PALETTE_ENTRIES.iter().enumerate() {
            let (label, color) = match entry {
                Some(group) => (group.label(), theme::linking_color(Some(*group))),
                None => ("none", theme::menu_fg()),
            };
            let y = palette.area.y + 1 + index as u16;
            safe_set_string(
                frame.buffer_mut(),
                bounds,
                palette.area.x + 1,
                y,
                &format!("● {label}"),
                style.fg(color),
            );
        }
    }
}

fn settle(result: Result<(), WmError>) {
    if let Err(err) = result {
        tracing::debug!(error = %err, "window operation skipped");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crossterm::event::KeyModifiers;

    use super::*;
    use crate::config::{CollisionPolicy, InteractionPolicy};
    use crate::layout::rects_intersect;
    use crate::defaults::InMemoryModuleDefaults;
    use crate::modules::quotation_modules;

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    fn setup() -> (WindowStore, InteractionShell, WindowId) {
        let mut store = WindowStore::new(
            Arc::new(quotation_modules()),
            Box::new(InMemoryModuleDefaults::new()),
            Rect {
                x: 0,
                y: 1,
                width: 100,
                height: 30,
            },
        );
        let id = store.open_window("admin", "Admin", None, None).unwrap();
        store.update_window_position(id, 10, 5).unwrap();
        (store, InteractionShell::new(InteractionPolicy::default()), id)
    }

    /// A at (0,1) 30x10 and B at (50,1) 20x10, snapping off.
    fn side_by_side(collision: CollisionPolicy) -> (WindowStore, InteractionShell, WindowId, WindowId) {
        let (mut store, _, a) = setup();
        let b = store.open_window("admin", "Admin", None, None).unwrap();
        store.update_window_position(a, 0, 1).unwrap();
        store.update_window_size(a, 30, 10).unwrap();
        store.update_window_position(b, 50, 1).unwrap();
        store.update_window_size(b, 20, 10).unwrap();
        let policy = InteractionPolicy {
            snap_threshold: 0,
            collision,
            ..InteractionPolicy::default()
        };
        (store, InteractionShell::new(policy), a, b)
    }

    fn press(shell: &mut InteractionShell, store: &mut WindowStore, column: u16, row: u16) {
        shell.handle_event(store, &mouse(MouseEventKind::Down(MouseButton::Left), column, row));
    }

    fn drag(shell: &mut InteractionShell, store: &mut WindowStore, column: u16, row: u16) {
        shell.handle_event(store, &mouse(MouseEventKind::Drag(MouseButton::Left), column, row));
    }

    fn release(shell: &mut InteractionShell, store: &mut WindowStore) {
        shell.handle_event(store, &mouse(MouseEventKind::Up(MouseButton::Left), 0, 0));
    }

    #[test]
    fn resize_stops_before_a_neighbour() {
        let (mut store, mut shell, a, b) = side_by_side(CollisionPolicy::default());
        press(&mut shell, &mut store, 29, 10);
        assert_eq!(shell.state(), InteractionState::Resizing(a));

        let mut widths = Vec::new();
        for column in [35, 45, 55, 65] {
            drag(&mut shell, &mut store, column, 10);
            widths.push(store.window(a).unwrap().width);
        }
        assert_eq!(widths, vec![36, 46, 46, 46]);
        release(&mut shell, &mut store);
        let (ra, rb) = (store.window(a).unwrap().rect(), store.window(b).unwrap().rect());
        assert!(!rects_intersect(ra, rb));
    }

    #[test]
    fn drag_overlaps_only_when_drag_collision_is_off() {
        let (mut store, mut shell, a, _) = side_by_side(CollisionPolicy::default());
        press(&mut shell, &mut store, 10, 1);
        drag(&mut shell, &mut store, 60, 1);
        let rec = store.window(a).unwrap();
        assert_eq!((rec.x, rec.y), (0, 1));

        let (mut store, mut shell, a, b) = side_by_side(CollisionPolicy {
            drag: false,
            resize: true,
        });
        press(&mut shell, &mut store, 10, 1);
        drag(&mut shell, &mut store, 60, 1);
        let rec = store.window(a).unwrap();
        assert_eq!((rec.x, rec.y), (50, 1));
        assert!(rects_intersect(rec.rect(), store.window(b).unwrap().rect()));
    }

    #[test]
    fn windows_stay_disjoint_through_drags_and_resizes() {
        let (mut store, mut shell, a, b) = side_by_side(CollisionPolicy::default());

        // drag A across B's columns, then down below it
        press(&mut shell, &mut store, 10, 1);
        for (column, row) in [(20, 3), (40, 5), (60, 8), (30, 13)] {
            drag(&mut shell, &mut store, column, row);
        }
        release(&mut shell, &mut store);
        let rec = store.window(a).unwrap();
        assert_eq!((rec.x, rec.y), (20, 13));

        // widen A under B
        press(&mut shell, &mut store, 49, 22);
        drag(&mut shell, &mut store, 79, 22);
        release(&mut shell, &mut store);
        assert_eq!(store.window(a).unwrap().width, 60);

        // grow B down into A, then only up to A's top edge
        press(&mut shell, &mut store, 69, 10);
        drag(&mut shell, &mut store, 69, 20);
        assert_eq!(store.window(b).unwrap().height, 10);
        drag(&mut shell, &mut store, 69, 12);
        release(&mut shell, &mut store);
        assert_eq!(store.window(b).unwrap().height, 12);

        let rects: Vec<_> = store.windows().iter().map(|w| w.rect()).collect();
        for (i, first) in rects.iter().enumerate() {
            for second in &rects[i + 1..] {
                assert!(!rects_intersect(*first, *second), "{first:?} overlaps {second:?}");
            }
        }
    }

    #[test]
    fn titlebar_drag_moves_and_release_ends_session() {
        let (mut store, mut shell, id) = setup();
        let down = mouse(MouseEventKind::Down(MouseButton::Left), 20, 5);
        assert_eq!(shell.handle_event(&mut store, &down), ShellResponse::Handled);
        assert_eq!(shell.state(), InteractionState::Dragging(id));

        let drag = mouse(MouseEventKind::Drag(MouseButton::Left), 30, 9);
        shell.handle_event(&mut store, &drag);
        let rec = store.window(id).unwrap();
        assert_eq!((rec.x, rec.y), (20, 9));

        let up = mouse(MouseEventKind::Up(MouseButton::Left), 0, 0);
        assert_eq!(shell.handle_event(&mut store, &up), ShellResponse::Handled);
        assert_eq!(shell.state(), InteractionState::Idle);
        shell.handle_event(&mut store, &mouse(MouseEventKind::Drag(MouseButton::Left), 40, 12));
        assert_eq!((store.window(id).unwrap().x, store.window(id).unwrap().y), (20, 9));
    }

    #[test]
    fn focus_loss_releases_capture() {
        let (mut store, mut shell, id) = setup();
        // resize handle sits on the bottom-right corner
        let rec = store.window(id).unwrap().rect();
        let corner = mouse(
            MouseEventKind::Down(MouseButton::Left),
            (rec.right() - 1) as u16,
            (rec.bottom() - 1) as u16,
        );
        shell.handle_event(&mut store, &corner);
        assert_eq!(shell.state(), InteractionState::Resizing(id));
        shell.handle_event(&mut store, &Event::FocusLost);
        assert_eq!(shell.state(), InteractionState::Idle);
    }

    #[test]
    fn closing_the_window_drops_its_session() {
        let (mut store, mut shell, id) = setup();
        shell.handle_event(&mut store, &mouse(MouseEventKind::Down(MouseButton::Left), 20, 5));
        store.close_window(id);
        shell.sync(&store);
        assert_eq!(shell.state(), InteractionState::Idle);
    }

    #[test]
    fn close_button_is_reported_not_executed() {
        let (mut store, mut shell, id) = setup();
        let rec = store.window(id).unwrap().rect();
        let close = mouse(
            MouseEventKind::Down(MouseButton::Left),
            (rec.right() - 3) as u16,
            rec.y as u16,
        );
        assert_eq!(shell.handle_event(&mut store, &close), ShellResponse::CloseRequested(id));
        assert!(store.window(id).is_some());
    }

    #[test]
    fn link_dot_palette_assigns_group() {
        let (mut store, mut shell, id) = setup();
        let dot = mouse(MouseEventKind::Down(MouseButton::Left), 11, 5);
        shell.handle_event(&mut store, &dot);
        assert_eq!(shell.palette_open_for(), Some(id));
        let palette = shell.palette.unwrap();
        // second entry is blue
        let pick = mouse(
            MouseEventKind::Down(MouseButton::Left),
            palette.area.x + 2,
            palette.area.y + 2,
        );
        assert_eq!(shell.handle_event(&mut store, &pick), ShellResponse::Handled);
        assert_eq!(shell.palette_open_for(), None);
        assert_eq!(store.window(id).unwrap().linking_group, Some(LinkingGroup::Blue));
    }

    #[test]
    fn maximized_titlebar_does_not_start_a_drag() {
        let (mut store, mut shell, id) = setup();
        store.maximize_window(id).unwrap();
        // maximized windows cover the work area starting at row 1
        shell.handle_event(&mut store, &mouse(MouseEventKind::Down(MouseButton::Left), 30, 1));
        assert_eq!(shell.state(), InteractionState::Idle);
    }
}
