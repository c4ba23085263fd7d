//! Top band: module launchers, arrange modes, saved views, close all.

use crossterm::event::{Event, KeyCode, MouseButton, MouseEventKind};
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};

use crate::error::WmError;
use crate::layout::{ArrangeMode, place_popup, rect_contains};
use crate::theme;
use crate::ui::{UiFrame, safe_set_string, truncate_to_width};
use crate::views::{LoadReport, SavedView, ViewId};
use crate::window::{WindowId, WindowStore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolbarCommand {
    OpenModule(String),
    Arrange(ArrangeMode),
    SaveView,
    LoadView(ViewId),
    ToggleFavorite(ViewId),
    CloseAll,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    Opened(WindowId),
    Arranged(ArrangeMode),
    Saved(SavedView),
    Loaded(LoadReport),
    Favorite { view: ViewId, favorite: bool },
    ClosedAll(usize),
}

impl ToolbarCommand {
    pub fn apply(&self, store: &mut WindowStore) -> Result<CommandOutcome, WmError> {
        tracing::debug!(command = ?self, "toolbar command");
        match self {
            ToolbarCommand::OpenModule(module) => open_module(store, module).map(CommandOutcome::Opened),
            ToolbarCommand::Arrange(mode) => {
                store.arrange_windows(*mode);
                Ok(CommandOutcome::Arranged(*mode))
            }
            ToolbarCommand::SaveView => {
                let name = store.next_view_name();
                store.save_current_view(&name).map(CommandOutcome::Saved)
            }
            ToolbarCommand::LoadView(id) => store.load_view(id).map(CommandOutcome::Loaded),
            ToolbarCommand::ToggleFavorite(id) => {
                let favorite = store.toggle_view_favorite(id)?;
                Ok(CommandOutcome::Favorite {
                    view: id.clone(),
                    favorite,
                })
            }
            ToolbarCommand::CloseAll => Ok(CommandOutcome::ClosedAll(store.close_all())),
        }
    }
}

/// Modules that need an entity open linked to the focused window when it
/// has a selection to share.
fn open_module(store: &mut WindowStore, module: &str) -> Result<WindowId, WmError> {
    let spec = store
        .registry()
        .get(module)
        .ok_or_else(|| WmError::UnknownModule(module.to_string()))?;
    let title = spec.title.clone();
    let origin = spec
        .needs_entity
        .then(|| store.focused())
        .flatten()
        .filter(|id| store.window(*id).is_some_and(|w| w.selection.is_some()));
    match origin {
        Some(origin) => store.open_linked_window(origin, module, title),
        None => store.open_window(module, title, None, None),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Target {
    Command(ToolbarCommand),
    ViewsMenu,
}

#[derive(Debug, Clone)]
struct Hit {
    rect: Rect,
    target: Target,
}

#[derive(Debug, Clone)]
struct MenuRow {
    rect: Rect,
    view: ViewId,
}

#[derive(Debug, Default)]
pub struct Toolbar {
    area: Rect,
    hits: Vec<Hit>,
    menu_open: bool,
    menu_anchor: Option<Rect>,
    menu_rect: Option<Rect>,
    menu_rows: Vec<MenuRow>,
}

/// Cells at the start of a menu row that toggle the favorite flag instead of
/// loading the view.
const FAVORITE_MARKER_WIDTH: u16 = 3;

impl Toolbar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn area(&self) -> Rect {
        self.area
    }

    pub fn set_area(&mut self, area: Rect) {
        self.area = area;
    }

    pub fn menu_open(&self) -> bool {
        self.menu_open
    }

    pub fn close_menu(&mut self) {
        self.menu_open = false;
        self.menu_rect = None;
        self.menu_rows.clear();
    }

    /// Returns `(handled, command)`. A handled event with no command only
    /// changed the views menu.
    pub fn handle_event(&mut self, event: &Event) -> (bool, Option<ToolbarCommand>) {
        match event {
            Event::Key(key) if self.menu_open && key.code == KeyCode::Esc => {
                self.close_menu();
                (true, None)
            }
            Event::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Left) => {
                let (column, row) = (mouse.column, mouse.row);
                if self.menu_open {
                    if let Some(menu_row) = self
                        .menu_rows
                        .iter()
                        .find(|r| rect_contains(r.rect, column, row))
                    {
                        let view = menu_row.view.clone();
                        let command = if column < menu_row.rect.x + FAVORITE_MARKER_WIDTH {
                            ToolbarCommand::ToggleFavorite(view)
                        } else {
                            self.close_menu();
                            ToolbarCommand::LoadView(view)
                        };
                        return (true, Some(command));
                    }
                    let inside_menu = self.menu_rect.is_some_and(|r| rect_contains(r, column, row));
                    if inside_menu {
                        return (true, None);
                    }
                }
                let target = self
                    .hits
                    .iter()
                    .find(|hit| rect_contains(hit.rect, column, row))
                    .map(|hit| hit.target.clone());
                match target {
                    Some(Target::ViewsMenu) => {
                        self.menu_open = !self.menu_open;
                        if !self.menu_open {
                            self.close_menu();
                        }
                        (true, None)
                    }
                    Some(Target::Command(command)) => {
                        self.close_menu();
                        (true, Some(command))
                    }
                    None if self.menu_open => {
                        self.close_menu();
                        (true, None)
                    }
                    None => (rect_contains(self.area, column, row), None),
                }
            }
            _ => (false, None),
        }
    }

    pub fn render(&mut self, frame: &mut UiFrame<'_>, store: &WindowStore) {
        self.hits.clear();
        self.menu_anchor = None;
        let area = self.area;
        if area.width == 0 || area.height == 0 {
            return;
        }
        let base = Style::default().bg(theme::panel_bg()).fg(theme::panel_fg());
        frame.buffer_mut().set_style(area, base);

        let mut items: Vec<(String, Target)> = store
            .registry()
            .iter()
            .map(|spec| {
                (
                    format!("+{}", spec.title),
                    Target::Command(ToolbarCommand::OpenModule(spec.id.clone())),
                )
            })
            .collect();
        items.extend(ArrangeMode::ALL.iter().map(|mode| {
            (
                mode.label().to_string(),
                Target::Command(ToolbarCommand::Arrange(*mode)),
            )
        }));
        items.push(("Save view".to_string(), Target::Command(ToolbarCommand::SaveView)));
        items.push(("Views ▾".to_string(), Target::ViewsMenu));
        items.push(("Close all".to_string(), Target::Command(ToolbarCommand::CloseAll)));

        let buffer = frame.buffer_mut();
        let bounds = area.intersection(buffer.area);
        if bounds.width == 0 || bounds.height == 0 {
            return;
        }
        let max_x = area.x.saturating_add(area.width);
        let mut x = area.x;
        for (label, target) in items {
            let chunk = format!(" {label} ");
            let width = chunk.chars().count() as u16;
            if x.saturating_add(width) > max_x {
                break;
            }
            let style = if target == Target::ViewsMenu && self.menu_open {
                Style::default()
                    .bg(theme::menu_selected_bg())
                    .fg(theme::menu_selected_fg())
                    .add_modifier(Modifier::BOLD)
            } else {
                base
            };
            safe_set_string(buffer, bounds, x, area.y, &chunk, style);
            let rect = Rect {
                x,
                y: area.y,
                width,
                height: 1,
            };
            if target == Target::ViewsMenu {
                self.menu_anchor = Some(rect);
            }
            self.hits.push(Hit { rect, target });
            x = x.saturating_add(width);
        }
    }

    /// Views dropdown. Drawn after the windows so it stays on top.
    pub fn render_menu(&mut self, frame: &mut UiFrame<'_>, store: &WindowStore) {
        self.menu_rows.clear();
        self.menu_rect = None;
        if !self.menu_open {
            return;
        }
        let Some(anchor) = self.menu_anchor else {
            return;
        };
        let views = store.views();
        let lines: Vec<(String, Option<ViewId>)> = if views.is_empty() {
            vec![("   no saved views".to_string(), None)]
        } else {
            views
                .iter()
                .map(|v| {
                    let marker = if v.favorite { '*' } else { ' ' };
                    (format!(" {marker} {}", v.name), Some(v.id.clone()))
                })
                .collect()
        };
        let width = lines
            .iter()
            .map(|(line, _)| line.chars().count() as u16 + 1)
            .max()
            .unwrap_or(1)
            .max(anchor.width);
        let height = lines.len() as u16;
        let bounds = frame.area();
        let rect = place_popup(anchor.x, anchor.y.saturating_add(1), width, height, bounds);
        if rect.width == 0 || rect.height == 0 {
            return;
        }
        let style = Style::default().bg(theme::menu_bg()).fg(theme::menu_fg());
        let buffer = frame.buffer_mut();
        buffer.set_style(rect, style);
        for (offset, (line, view)) in lines.into_iter().enumerate().take(rect.height as usize) {
            let y = rect.y + offset as u16;
            for col in rect.x..rect.x.saturating_add(rect.width) {
                if let Some(cell) = buffer.cell_mut((col, y)) {
                    cell.set_symbol(" ");
                }
            }
            let text = truncate_to_width(&line, rect.width as usize);
            safe_set_string(buffer, rect, rect.x, y, &text, style);
            if let Some(view) = view {
                self.menu_rows.push(MenuRow {
                    rect: Rect {
                        x: rect.x,
                        y,
                        width: rect.width,
                        height: 1,
                    },
                    view,
                });
            }
        }
        self.menu_rect = Some(rect);
    }
}
