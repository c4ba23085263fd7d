use ratatui::style::{Modifier, Style};

use crate::layout::FloatRect;
use crate::linking::LinkingGroup;
use crate::theme;
use crate::ui::UiFrame;

/// Chrome region under a point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChromeHit {
    None,
    Titlebar,
    LinkDot,
    Minimize,
    Maximize,
    Close,
    ResizeHandle,
    Border,
    Body,
}

/// What the decorator needs to know about a window to paint it.
#[derive(Debug, Clone, Copy)]
pub struct ChromeState<'a> {
    pub title: &'a str,
    pub linking_group: Option<LinkingGroup>,
    pub focused: bool,
    pub maximized: bool,
}

pub trait WindowDecorator: std::fmt::Debug {
    fn render_window(&self, frame: &mut UiFrame<'_>, rect: FloatRect, state: ChromeState<'_>);

    fn hit_test(&self, rect: FloatRect, column: u16, row: u16) -> ChromeHit;

    /// Area left for the module view.
    fn inner_rect(&self, rect: FloatRect) -> FloatRect;
}

/// Single-row titlebar drawn in the top border:
///
/// ```text
/// ● Title ........ _ □ ×
/// │                    │
/// └───────────────────◢
/// ```
#[derive(Debug, Default)]
pub struct DefaultDecorator;

impl DefaultDecorator {
    fn button_columns(rect: FloatRect) -> Option<[i32; 3]> {
        // Buttons need room after the dot and at least one title cell.
        if rect.width < 10 {
            return None;
        }
        let right = rect.right();
        Some([right - 7, right - 5, right - 3])
    }
}

impl WindowDecorator for DefaultDecorator {
    fn render_window(&self, frame: &mut UiFrame<'_>, rect: FloatRect, state: ChromeState<'_>) {
        if rect.is_empty() {
            return;
        }
        let header_style = if state.focused {
            Style::default()
                .bg(theme::decorator_header_bg(true))
                .fg(theme::decorator_header_fg())
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
                .bg(theme::decorator_header_bg(false))
                .fg(theme::decorator_header_fg())
        };
        let border_style = Style::default()
            .fg(theme::decorator_border())
            .bg(theme::window_bg());

        frame.fill_signed(rect, Style::default().bg(theme::window_bg()));

        let left = rect.x;
        let right = rect.right() - 1;
        let top = rect.y;
        let bottom = rect.bottom() - 1;

        // Titlebar
        let bar = " ".repeat(rect.width as usize);
        frame.set_string_signed(left, top, rect.right(), &bar, header_style);
        let dot = if state.linking_group.is_some() { "●" } else { "○" };
        frame.set_string_signed(
            left + 1,
            top,
            rect.right(),
            dot,
            header_style.fg(theme::linking_color(state.linking_group)),
        );
        let buttons = Self::button_columns(rect);
        let title_end = buttons.map_or(rect.right() - 1, |cols| cols[0] - 1);
        frame.set_string_signed(left + 3, top, title_end, state.title, header_style);
        if let Some([minimize, maximize, close]) = buttons {
            let max_symbol = if state.maximized { "❐" } else { "□" };
            frame.set_string_signed(minimize, top, minimize + 1, "_", header_style);
            frame.set_string_signed(maximize, top, maximize + 1, max_symbol, header_style);
            frame.set_string_signed(close, top, close + 1, "×", header_style);
        }

        if rect.height < 2 {
            return;
        }

        // Sides
        for y in top + 1..bottom {
            frame.set_string_signed(left, y, left + 1, "│", border_style);
            frame.set_string_signed(right, y, right + 1, "│", border_style);
        }

        // Bottom
        let mut line = String::with_capacity(rect.width as usize * 3);
        line.push('└');
        for _ in 0..rect.width.saturating_sub(2) {
            line.push('─');
        }
        frame.set_string_signed(left, bottom, right, &line, border_style);
        frame.set_string_signed(
            right,
            bottom,
            right + 1,
            "◢",
            border_style.fg(theme::decorator_header_bg(state.focused)),
        );
    }

    fn hit_test(&self, rect: FloatRect, column: u16, row: u16) -> ChromeHit {
        if !rect.contains(column, row) {
            return ChromeHit::None;
        }
        let (column, row) = (column as i32, row as i32);
        let right = rect.right() - 1;
        let bottom = rect.bottom() - 1;
        if row == rect.y {
            if column == rect.x + 1 {
                return ChromeHit::LinkDot;
            }
            if let Some([minimize, maximize, close]) = Self::button_columns(rect) {
                if column == minimize {
                    return ChromeHit::Minimize;
                }
                if column == maximize {
                    return ChromeHit::Maximize;
                }
                if column == close {
                    return ChromeHit::Close;
                }
            }
            return ChromeHit::Titlebar;
        }
        if row == bottom && column == right {
            return ChromeHit::ResizeHandle;
        }
        if row == bottom || column == rect.x || column == right {
            return ChromeHit::Border;
        }
        ChromeHit::Body
    }

    fn inner_rect(&self, rect: FloatRect) -> FloatRect {
        FloatRect::new(
            rect.x + 1,
            rect.y + 1,
            rect.width.saturating_sub(2),
            rect.height.saturating_sub(2),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::buffer::Buffer;
    use ratatui::layout::Rect;

    fn rect() -> FloatRect {
        FloatRect::new(2, 1, 20, 6)
    }

    #[test]
    fn hit_test_finds_controls() {
        let deco = DefaultDecorator;
        let r = rect();
        assert_eq!(deco.hit_test(r, 3, 1), ChromeHit::LinkDot);
        assert_eq!(deco.hit_test(r, 8, 1), ChromeHit::Titlebar);
        assert_eq!(deco.hit_test(r, 15, 1), ChromeHit::Minimize);
        assert_eq!(deco.hit_test(r, 17, 1), ChromeHit::Maximize);
        assert_eq!(deco.hit_test(r, 19, 1), ChromeHit::Close);
        assert_eq!(deco.hit_test(r, 21, 6), ChromeHit::ResizeHandle);
        assert_eq!(deco.hit_test(r, 2, 3), ChromeHit::Border);
        assert_eq!(deco.hit_test(r, 10, 3), ChromeHit::Body);
        assert_eq!(deco.hit_test(r, 22, 3), ChromeHit::None);
    }

    #[test]
    fn inner_rect_excludes_chrome() {
        assert_eq!(DefaultDecorator.inner_rect(rect()), FloatRect::new(3, 2, 18, 4));
    }

    #[test]
    fn renders_partially_off_screen_windows() {
        let area = Rect {
            x: 0,
            y: 0,
            width: 12,
            height: 6,
        };
        let mut buf = Buffer::empty(area);
        let mut frame = UiFrame::from_parts(area, &mut buf);
        let state = ChromeState {
            title: "Quotes",
            linking_group: Some(LinkingGroup::Red),
            focused: true,
            maximized: false,
        };
        DefaultDecorator.render_window(&mut frame, FloatRect::new(-8, 0, 16, 4), state);
        // right border and resize handle are visible at column 7
        assert_eq!(buf.cell((7, 1)).unwrap().symbol(), "│");
        assert_eq!(buf.cell((7, 3)).unwrap().symbol(), "◢");
        assert_eq!(buf.cell((8, 1)).unwrap().symbol(), " ");
    }

    #[test]
    fn renders_title_and_dot() {
        let area = Rect {
            x: 0,
            y: 0,
            width: 30,
            height: 5,
        };
        let mut buf = Buffer::empty(area);
        let mut frame = UiFrame::from_parts(area, &mut buf);
        let state = ChromeState {
            title: "Parts",
            linking_group: None,
            focused: false,
            maximized: false,
        };
        DefaultDecorator.render_window(&mut frame, FloatRect::new(0, 0, 20, 5), state);
        assert_eq!(buf.cell((1, 0)).unwrap().symbol(), "○");
        assert_eq!(buf.cell((3, 0)).unwrap().symbol(), "P");
        assert_eq!(buf.cell((17, 0)).unwrap().symbol(), "×");
        assert_eq!(buf.cell((0, 4)).unwrap().symbol(), "└");
    }
}
