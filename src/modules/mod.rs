//! Module registry: what can be opened inside a window.
//!
//! The window manager never looks inside a module. It only needs a title, the
//! built-in default size, whether the module works on a selected entity, and a
//! factory producing the [`ModuleView`] that renders the window body.

use crossterm::event::Event;
use ratatui::layout::Rect;

use crate::constants::{DEFAULT_WINDOW_HEIGHT, DEFAULT_WINDOW_WIDTH};
use crate::linking::{LinkingContext, LinkingGroup, Role};
use crate::ui::UiFrame;

pub mod entity_detail;
pub mod entity_list;

pub use entity_detail::EntityDetailView;
pub use entity_list::{EntityListView, EntityRow};

/// What a module view did with an input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleResponse {
    Ignored,
    Handled,
    /// The user picked an entity; the workspace publishes it to the window's
    /// linking group.
    Selected(LinkingContext),
}

/// Window state a module view may care about while rendering or handling
/// input.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModuleContext {
    focused: bool,
    linking_group: Option<LinkingGroup>,
    role: Role,
}

impl ModuleContext {
    pub const fn new(focused: bool) -> Self {
        Self {
            focused,
            linking_group: None,
            role: Role::Master,
        }
    }

    pub const fn focused(&self) -> bool {
        self.focused
    }

    pub const fn linking_group(&self) -> Option<LinkingGroup> {
        self.linking_group
    }

    pub const fn role(&self) -> Role {
        self.role
    }

    pub const fn with_link(mut self, group: Option<LinkingGroup>, role: Role) -> Self {
        self.linking_group = group;
        self.role = role;
        self
    }
}

pub trait ModuleView {
    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, ctx: &ModuleContext);

    fn handle_event(&mut self, _event: &Event, _ctx: &ModuleContext) -> ModuleResponse {
        ModuleResponse::Ignored
    }

    /// Called when the window's linking group context changes, including the
    /// synchronous read when the window joins a group.
    fn on_context(&mut self, _context: Option<&LinkingContext>) {}
}

pub type ModuleFactory = fn(&ModuleSpec) -> Box<dyn ModuleView>;

#[derive(Debug, Clone)]
pub struct ModuleSpec {
    pub id: String,
    pub title: String,
    /// The module shows a single entity and is useful only when linked to a
    /// window providing a selection.
    pub needs_entity: bool,
    pub default_width: u16,
    pub default_height: u16,
    factory: ModuleFactory,
}

impl ModuleSpec {
    pub fn new(id: impl Into<String>, title: impl Into<String>, factory: ModuleFactory) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            needs_entity: false,
            default_width: DEFAULT_WINDOW_WIDTH,
            default_height: DEFAULT_WINDOW_HEIGHT,
            factory,
        }
    }

    pub fn needs_entity(mut self, needs_entity: bool) -> Self {
        self.needs_entity = needs_entity;
        self
    }

    pub fn default_size(mut self, width: u16, height: u16) -> Self {
        self.default_width = width;
        self.default_height = height;
        self
    }

    pub fn instantiate(&self) -> Box<dyn ModuleView> {
        (self.factory)(self)
    }
}

/// Ordered set of modules. Order is the toolbar order.
#[derive(Debug, Clone, Default)]
pub struct ModuleRegistry {
    specs: Vec<ModuleSpec>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `spec`, replacing any module registered under the same id.
    pub fn register(&mut self, spec: ModuleSpec) {
        if let Some(existing) = self.specs.iter_mut().find(|s| s.id == spec.id) {
            *existing = spec;
        } else {
            self.specs.push(spec);
        }
    }

    pub fn with(mut self, spec: ModuleSpec) -> Self {
        self.register(spec);
        self
    }

    pub fn get(&self, id: &str) -> Option<&ModuleSpec> {
        self.specs.iter().find(|spec| spec.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModuleSpec> {
        self.specs.iter()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub fn instantiate(&self, id: &str) -> Option<Box<dyn ModuleView>> {
        self.get(id).map(ModuleSpec::instantiate)
    }
}

fn quotes_view(spec: &ModuleSpec) -> Box<dyn ModuleView> {
    Box::new(EntityListView::new(
        spec.title.clone(),
        vec![
            EntityRow::new("1001", "Q-1001", "Acme Corp / bracket set"),
            EntityRow::new("1002", "Q-1002", "Northwind / housing"),
            EntityRow::new("1003", "Q-1003", "Globex / shaft assembly"),
            EntityRow::new("1004", "Q-1004", "Initech / mounting plate"),
        ],
    ))
}

fn materials_view(spec: &ModuleSpec) -> Box<dyn ModuleView> {
    Box::new(EntityListView::new(
        spec.title.clone(),
        vec![
            EntityRow::new("al6061", "AL-6061", "Aluminium 6061-T6"),
            EntityRow::new("ss304", "SS-304", "Stainless steel 304"),
            EntityRow::new("c45", "C45", "Carbon steel C45"),
        ],
    ))
}

fn admin_view(spec: &ModuleSpec) -> Box<dyn ModuleView> {
    Box::new(EntityListView::new(
        spec.title.clone(),
        vec![
            EntityRow::new("users", "Users", "Accounts and roles"),
            EntityRow::new("rates", "Rates", "Machine hour rates"),
            EntityRow::new("margins", "Margins", "Default margins"),
        ],
    ))
}

fn detail_view(spec: &ModuleSpec) -> Box<dyn ModuleView> {
    Box::new(EntityDetailView::new(spec.title.clone()))
}

/// Modules of the quotation front-end.
pub fn quotation_modules() -> ModuleRegistry {
    ModuleRegistry::new()
        .with(ModuleSpec::new("quotes", "Quotes", quotes_view).default_size(56, 14))
        .with(
            ModuleSpec::new("parts", "Parts", detail_view)
                .needs_entity(true)
                .default_size(48, 12),
        )
        .with(
            ModuleSpec::new("pricing", "Pricing", detail_view)
                .needs_entity(true)
                .default_size(40, 10),
        )
        .with(
            ModuleSpec::new("operations", "Operations", detail_view)
                .needs_entity(true)
                .default_size(48, 12),
        )
        .with(ModuleSpec::new("materials", "Materials", materials_view).default_size(44, 10))
        .with(ModuleSpec::new("admin", "Admin", admin_view).default_size(40, 10))
}
