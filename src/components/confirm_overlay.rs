use crossterm::event::{Event, KeyCode, KeyEventKind, MouseEventKind};
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::components::Component;
use crate::layout::rect_contains;
use crate::theme;
use crate::ui::{UiFrame, safe_set_string};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmAction {
    /// The right-hand button, `y`, or Enter while it is selected.
    Confirm,
    /// The left-hand button, `n`, or Enter while it is selected.
    Cancel,
    /// Esc: back out without choosing either.
    Dismiss,
}

const PROMPT_WIDTH: u16 = 56;
const PROMPT_HEIGHT: u16 = 8;

/// Centered box for the prompt, shrunk to fit small terminals.
fn prompt_rect(area: Rect) -> Rect {
    let width = area.width.min(PROMPT_WIDTH).max(1);
    let height = area.height.min(PROMPT_HEIGHT).max(1);
    Rect {
        x: area.x.saturating_add(area.width.saturating_sub(width) / 2),
        y: area.y.saturating_add(area.height.saturating_sub(height) / 2),
        width,
        height,
    }
}

/// Two-button prompt drawn in a centered box over a dimmed workspace.
#[derive(Debug)]
pub struct ConfirmOverlayComponent {
    visible: bool,
    title: String,
    body: String,
    cancel_label: String,
    confirm_label: String,
    selected_confirm: bool,
    cancel_rect: Option<Rect>,
    confirm_rect: Option<Rect>,
}

impl Default for ConfirmOverlayComponent {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfirmOverlayComponent {
    pub fn new() -> Self {
        Self {
            visible: false,
            title: String::new(),
            body: String::new(),
            cancel_label: "No".to_string(),
            confirm_label: "Yes".to_string(),
            selected_confirm: true,
            cancel_rect: None,
            confirm_rect: None,
        }
    }

    pub fn open(&mut self, title: &str, body: &str, cancel: &str, confirm: &str) {
        self.title = title.to_string();
        self.visible = true;
        self.body = body.to_string();
        self.cancel_label = cancel.to_string();
        self.confirm_label = confirm.to_string();
        self.selected_confirm = true;
        self.cancel_rect = None;
        self.confirm_rect = None;
    }

    pub fn close(&mut self) {
        self.visible = false;
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn handle_confirm_event(&mut self, event: &Event) -> Option<ConfirmAction> {
        match event {
            Event::Mouse(mouse) if matches!(mouse.kind, MouseEventKind::Down(_)) => {
                if self
                    .confirm_rect
                    .is_some_and(|rect| rect_contains(rect, mouse.column, mouse.row))
                {
                    return Some(ConfirmAction::Confirm);
                }
                if self
                    .cancel_rect
                    .is_some_and(|rect| rect_contains(rect, mouse.column, mouse.row))
                {
                    return Some(ConfirmAction::Cancel);
                }
                None
            }
            Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                KeyCode::Tab | KeyCode::BackTab => {
                    self.selected_confirm = !self.selected_confirm;
                    None
                }
                KeyCode::Left => {
                    self.selected_confirm = false;
                    None
                }
                KeyCode::Right => {
                    self.selected_confirm = true;
                    None
                }
                KeyCode::Enter => Some(if self.selected_confirm {
                    ConfirmAction::Confirm
                } else {
                    ConfirmAction::Cancel
                }),
                KeyCode::Char('y') | KeyCode::Char('Y') => Some(ConfirmAction::Confirm),
                KeyCode::Char('n') | KeyCode::Char('N') => Some(ConfirmAction::Cancel),
                KeyCode::Esc => Some(ConfirmAction::Dismiss),
                _ => None,
            },
            _ => None,
        }
    }
}

impl Component for ConfirmOverlayComponent {
    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect) {
        if !self.visible || area.width == 0 || area.height == 0 {
            return;
        }
        let dim = Style::default().add_modifier(Modifier::DIM);
        let buffer = frame.buffer_mut();
        for y in area.top()..area.bottom() {
            for x in area.left()..area.right() {
                if let Some(cell) = buffer.cell_mut((x, y)) {
                    cell.set_style(dim);
                }
            }
        }
        let rect = prompt_rect(area);
        frame.render_widget(Clear, rect);
        frame.render_widget(
            Block::default()
                .title(self.title.as_str())
                .borders(Borders::ALL)
                .style(Style::default().bg(theme::dialog_bg()).fg(theme::dialog_fg())),
            rect,
        );
        self.cancel_rect = None;
        self.confirm_rect = None;
        if rect.width < 3 || rect.height < 3 {
            return;
        }
        let content = Rect {
            x: rect.x.saturating_add(2),
            y: rect.y.saturating_add(1),
            width: rect.width.saturating_sub(4),
            height: rect.height.saturating_sub(2),
        };
        if content.height < 4 || content.width == 0 {
            return;
        }
        let separator_y = content.y.saturating_add(content.height.saturating_sub(2));
        let button_y = content.y.saturating_add(content.height.saturating_sub(1));
        let body_rect = Rect {
            height: content.height.saturating_sub(3),
            ..content
        };
        let paragraph = Paragraph::new(self.body.as_str())
            .alignment(Alignment::Left)
            .style(Style::default().fg(theme::dialog_fg()))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, body_rect);

        let separator_style = Style::default().fg(theme::dialog_separator());
        let buffer = frame.buffer_mut();
        let bounds = area.intersection(buffer.area);
        if bounds.width == 0 || bounds.height == 0 {
            return;
        }
        for x in content.x..content.x.saturating_add(content.width) {
            if let Some(cell) = buffer.cell_mut((x, separator_y)) {
                cell.set_symbol("─");
                cell.set_style(separator_style);
            }
        }
        let cancel = format!("[ {} ]", self.cancel_label);
        let confirm = format!("[ {} ]", self.confirm_label);
        let selected_style = Style::default()
            .fg(theme::decorator_header_fg())
            .bg(theme::decorator_header_bg(true))
            .add_modifier(Modifier::BOLD);
        let unselected_style = Style::default()
            .fg(theme::dialog_fg())
            .bg(theme::panel_bg());
        let (cancel_style, confirm_style) = if self.selected_confirm {
            (unselected_style, selected_style)
        } else {
            (selected_style, unselected_style)
        };
        let cancel_width = cancel.chars().count() as u16;
        let confirm_width = confirm.chars().count() as u16;
        let start_x = content
            .x
            .saturating_add(content.width.saturating_sub(cancel_width + 1 + confirm_width));
        safe_set_string(buffer, bounds, start_x, button_y, &cancel, cancel_style);
        let confirm_x = start_x.saturating_add(cancel_width + 1);
        safe_set_string(buffer, bounds, confirm_x, button_y, &confirm, confirm_style);
        self.cancel_rect = Some(Rect {
            x: start_x,
            y: button_y,
            width: cancel_width,
            height: 1,
        });
        self.confirm_rect = Some(Rect {
            x: confirm_x,
            y: button_y,
            width: confirm_width,
            height: 1,
        });
    }

    fn handle_event(&mut self, event: &Event) -> bool {
        self.visible && (self.handle_confirm_event(event).is_some() || matches!(event, Event::Key(_)))
    }
}
