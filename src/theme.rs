use ratatui::style::Color;

use crate::linking::LinkingGroup;

// Centralized theme colors. Everything that paints asks here so the chrome,
// bars and overlays stay consistent.

pub fn desktop_bg() -> Color {
    Color::Black
}

// Toolbar / taskbar bands
pub fn panel_bg() -> Color {
    Color::DarkGray
}
pub fn panel_fg() -> Color {
    Color::White
}
pub fn panel_inactive_fg() -> Color {
    Color::Gray
}
pub fn panel_active_bg() -> Color {
    Color::Gray
}
pub fn panel_active_fg() -> Color {
    Color::Black
}

// Menus (views menu, linking palette)
pub fn menu_bg() -> Color {
    Color::DarkGray
}
pub fn menu_fg() -> Color {
    Color::White
}
pub fn menu_selected_bg() -> Color {
    Color::Gray
}
pub fn menu_selected_fg() -> Color {
    Color::Black
}

// Dialog / confirm
pub fn dialog_bg() -> Color {
    Color::Black
}
pub fn dialog_fg() -> Color {
    Color::White
}
pub fn dialog_separator() -> Color {
    Color::DarkGray
}

// Decorator
pub fn decorator_header_bg(focused: bool) -> Color {
    if focused { Color::Blue } else { Color::DarkGray }
}
pub fn decorator_header_fg() -> Color {
    Color::White
}
pub fn decorator_border() -> Color {
    Color::DarkGray
}
pub fn window_bg() -> Color {
    Color::Reset
}

// Status line
pub fn status_warning_fg() -> Color {
    Color::Yellow
}

/// Color of the linking dot; unlinked windows show a hollow gray dot.
pub fn linking_color(group: Option<LinkingGroup>) -> Color {
    match group {
        Some(LinkingGroup::Red) => Color::Red,
        Some(LinkingGroup::Blue) => Color::LightBlue,
        Some(LinkingGroup::Green) => Color::Green,
        Some(LinkingGroup::Yellow) => Color::Yellow,
        None => Color::Gray,
    }
}
