pub mod decorator;
pub mod shell;

mod store;

use std::fmt;

use ratatui::prelude::Rect;
use serde::{Deserialize, Serialize};

use crate::layout::FloatRect;
use crate::linking::{LinkingContext, LinkingGroup, Role};

pub use shell::{InteractionShell, InteractionState, PointerCapture, ShellResponse};
pub use store::{StoreEvent, WindowStore};

/// Opaque window handle, unique for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowId(u64);

impl WindowId {
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "w{}", self.0)
    }
}

/// One open window. Owned by value inside the [`WindowStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowRecord {
    pub id: WindowId,
    pub module: String,
    pub title: String,
    pub x: i32,
    pub y: i32,
    pub width: u16,
    pub height: u16,
    pub z_index: u64,
    pub minimized: bool,
    /// Rendered full-bleed; `x/y/width/height` are kept as restore geometry.
    pub maximized: bool,
    pub linking_group: Option<LinkingGroup>,
    pub role: Role,
    /// Last selection reported by the module shown in this window.
    pub selection: Option<LinkingContext>,
    opened_width: u16,
    opened_height: u16,
    creation_order: u64,
}

impl WindowRecord {
    /// Stored geometry, ignoring maximize.
    pub fn rect(&self) -> FloatRect {
        FloatRect::new(self.x, self.y, self.width, self.height)
    }

    /// Geometry as drawn: the work area for maximized windows.
    pub fn display_rect(&self, work_area: Rect) -> FloatRect {
        if self.maximized {
            FloatRect::from(work_area)
        } else {
            self.rect()
        }
    }

    pub fn creation_order(&self) -> u64 {
        self.creation_order
    }

    /// Size the window had when it was opened or last saved as default.
    pub fn opened_size(&self) -> (u16, u16) {
        (self.opened_width, self.opened_height)
    }
}
