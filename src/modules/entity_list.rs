use crossterm::event::{Event, KeyCode, KeyEventKind, MouseButton, MouseEventKind};
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{List, ListItem, ListState};

use super::{ModuleContext, ModuleResponse, ModuleView};
use crate::layout::rect_contains;
use crate::linking::LinkingContext;
use crate::ui::UiFrame;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityRow {
    pub id: String,
    pub number: String,
    pub label: String,
}

impl EntityRow {
    pub fn new(id: impl Into<String>, number: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            number: number.into(),
            label: label.into(),
        }
    }

    fn context(&self) -> LinkingContext {
        LinkingContext::new(self.id.clone()).with_number(self.number.clone())
    }
}

/// Selectable list of entities. Enter or a click selects the highlighted row
/// and reports it as the window's selection.
pub struct EntityListView {
    title: String,
    rows: Vec<EntityRow>,
    selected: usize,
    offset: usize,
    area: Rect,
}

impl EntityListView {
    pub fn new(title: impl Into<String>, rows: Vec<EntityRow>) -> Self {
        Self {
            title: title.into(),
            rows,
            selected: 0,
            offset: 0,
            area: Rect::default(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn rows(&self) -> &[EntityRow] {
        &self.rows
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    fn bump_selection(&mut self, delta: isize) {
        if self.rows.is_empty() {
            self.selected = 0;
            return;
        }
        if delta.is_negative() {
            self.selected = self.selected.saturating_sub(delta.unsigned_abs());
        } else {
            self.selected = (self.selected + delta as usize).min(self.rows.len() - 1);
        }
    }

    fn keep_selected_in_view(&mut self, view: usize) {
        if view == 0 || self.rows.is_empty() {
            self.offset = 0;
            return;
        }
        if self.selected < self.offset {
            self.offset = self.selected;
        } else if self.selected >= self.offset + view {
            self.offset = self.selected + 1 - view;
        }
    }

    fn select_current(&self) -> ModuleResponse {
        match self.rows.get(self.selected) {
            Some(row) => ModuleResponse::Selected(row.context()),
            None => ModuleResponse::Handled,
        }
    }
}

impl ModuleView for EntityListView {
    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, ctx: &ModuleContext) {
        self.area = area;
        if area.width == 0 || area.height == 0 {
            return;
        }
        let view = area.height as usize;
        self.keep_selected_in_view(view);

        let items = self
            .rows
            .iter()
            .skip(self.offset)
            .take(view)
            .map(|row| ListItem::new(format!("{:<8} {}", row.number, row.label)))
            .collect::<Vec<_>>();

        let mut state = ListState::default();
        if !self.rows.is_empty() && ctx.focused() {
            state.select(Some(self.selected - self.offset));
        }
        let list =
            List::new(items).highlight_style(Style::default().add_modifier(Modifier::REVERSED));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn handle_event(&mut self, event: &Event, _ctx: &ModuleContext) -> ModuleResponse {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                KeyCode::Up | KeyCode::Char('k') => {
                    self.bump_selection(-1);
                    ModuleResponse::Handled
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    self.bump_selection(1);
                    ModuleResponse::Handled
                }
                KeyCode::PageUp => {
                    self.bump_selection(-5);
                    ModuleResponse::Handled
                }
                KeyCode::PageDown => {
                    self.bump_selection(5);
                    ModuleResponse::Handled
                }
                KeyCode::Home => {
                    self.selected = 0;
                    ModuleResponse::Handled
                }
                KeyCode::End => {
                    self.selected = self.rows.len().saturating_sub(1);
                    ModuleResponse::Handled
                }
                KeyCode::Enter | KeyCode::Char(' ') => self.select_current(),
                _ => ModuleResponse::Ignored,
            },
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::Down(MouseButton::Left)
                    if rect_contains(self.area, mouse.column, mouse.row) =>
                {
                    let index = self.offset + (mouse.row - self.area.y) as usize;
                    if index >= self.rows.len() {
                        return ModuleResponse::Handled;
                    }
                    self.selected = index;
                    self.select_current()
                }
                MouseEventKind::ScrollUp if rect_contains(self.area, mouse.column, mouse.row) => {
                    self.bump_selection(-1);
                    ModuleResponse::Handled
                }
                MouseEventKind::ScrollDown
                    if rect_contains(self.area, mouse.column, mouse.row) =>
                {
                    self.bump_selection(1);
                    ModuleResponse::Handled
                }
                _ => ModuleResponse::Ignored,
            },
            _ => ModuleResponse::Ignored,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEvent, KeyModifiers, MouseEvent};
    use ratatui::buffer::Buffer;

    fn key_event(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn view() -> EntityListView {
        EntityListView::new(
            "Quotes",
            vec![
                EntityRow::new("1", "Q-1", "first"),
                EntityRow::new("2", "Q-2", "second"),
                EntityRow::new("3", "Q-3", "third"),
            ],
        )
    }

    #[test]
    fn keys_move_and_enter_selects() {
        let mut list = view();
        let ctx = ModuleContext::new(true);
        assert_eq!(list.handle_event(&key_event(KeyCode::Down), &ctx), ModuleResponse::Handled);
        assert_eq!(list.selected(), 1);
        assert_eq!(list.handle_event(&key_event(KeyCode::End), &ctx), ModuleResponse::Handled);
        assert_eq!(list.selected(), 2);
        assert_eq!(
            list.handle_event(&key_event(KeyCode::Enter), &ctx),
            ModuleResponse::Selected(LinkingContext::new("3").with_number("Q-3"))
        );
        list.handle_event(&key_event(KeyCode::Home), &ctx);
        assert_eq!(list.selected(), 0);
    }

    #[test]
    fn click_selects_the_row_under_the_pointer() {
        let mut list = view();
        let area = Rect {
            x: 2,
            y: 3,
            width: 20,
            height: 5,
        };
        let mut buf = Buffer::empty(Rect {
            x: 0,
            y: 0,
            width: 30,
            height: 10,
        });
        let mut frame = UiFrame::from_parts(buf.area, &mut buf);
        let ctx = ModuleContext::new(true);
        list.render(&mut frame, area, &ctx);

        let click = Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 4,
            row: 4,
            modifiers: KeyModifiers::NONE,
        });
        assert_eq!(
            list.handle_event(&click, &ctx),
            ModuleResponse::Selected(LinkingContext::new("2").with_number("Q-2"))
        );

        let below = Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 4,
            row: 7,
            modifiers: KeyModifiers::NONE,
        });
        assert_eq!(list.handle_event(&below, &ctx), ModuleResponse::Handled);
        assert_eq!(list.selected(), 1);
    }
}
