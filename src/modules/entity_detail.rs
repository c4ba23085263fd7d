use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};

use super::{ModuleContext, ModuleView};
use crate::linking::{LinkingContext, Role};
use crate::theme;
use crate::ui::UiFrame;

/// Shows the entity selected in the window's linking group.
pub struct EntityDetailView {
    title: String,
    context: Option<LinkingContext>,
}

impl EntityDetailView {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            context: None,
        }
    }

    pub fn context(&self) -> Option<&LinkingContext> {
        self.context.as_ref()
    }

    fn lines(&self, ctx: &ModuleContext) -> Vec<Line<'static>> {
        let Some(context) = &self.context else {
            let hint = if ctx.linking_group().is_some() {
                "Waiting for a selection in the linked window."
            } else {
                "Not linked. Open from a window with a selection, or pick a color."
            };
            return vec![Line::from(Span::styled(
                hint,
                Style::default().fg(theme::panel_inactive_fg()),
            ))];
        };
        let mut lines = vec![Line::from(Span::styled(
            format!("{} for {}", self.title, context.label()),
            Style::default().add_modifier(Modifier::BOLD),
        ))];
        lines.push(Line::from(format!("entity id: {}", context.entity_id)));
        if let Some(group) = ctx.linking_group() {
            let role = match ctx.role() {
                Role::Master => "master",
                Role::Child => "follows",
            };
            lines.push(Line::from(Span::styled(
                format!("{role} {} group", group.label()),
                Style::default().fg(theme::linking_color(Some(group))),
            )));
        }
        lines
    }
}

impl ModuleView for EntityDetailView {
    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, ctx: &ModuleContext) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let paragraph = Paragraph::new(self.lines(ctx)).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn on_context(&mut self, context: Option<&LinkingContext>) {
        self.context = context.cloned();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linking::LinkingGroup;
    use ratatui::buffer::Buffer;

    fn first_row(buf: &Buffer, width: u16) -> String {
        (0..width)
            .map(|x| buf.cell((x, 0)).map(|c| c.symbol().to_string()).unwrap_or_default())
            .collect()
    }

    #[test]
    fn renders_the_linked_entity() {
        let mut view = EntityDetailView::new("Parts");
        view.on_context(Some(&LinkingContext::new("1001").with_number("Q-1001")));
        let area = Rect {
            x: 0,
            y: 0,
            width: 30,
            height: 4,
        };
        let mut buf = Buffer::empty(area);
        let mut frame = UiFrame::from_parts(area, &mut buf);
        let ctx = ModuleContext::new(false).with_link(Some(LinkingGroup::Red), Role::Child);
        view.render(&mut frame, area, &ctx);
        assert!(first_row(&buf, 30).starts_with("Parts for Q-1001"));
    }

    #[test]
    fn context_reset_clears_the_view() {
        let mut view = EntityDetailView::new("Pricing");
        view.on_context(Some(&LinkingContext::new("7")));
        assert!(view.context().is_some());
        view.on_context(None);
        assert!(view.context().is_none());
    }
}
