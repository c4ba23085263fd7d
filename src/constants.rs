//! Shared crate-wide constants.
//!
//! All sizes are in viewport cells.

/// Minimum number of columns a window must keep inside the viewport while
/// being dragged horizontally, so the user can always grab it again.
pub const MIN_VISIBLE_MARGIN: u16 = 4;

/// Distance within which a dragged or resized edge is pulled onto a screen
/// edge or another window's edge.
pub const DEFAULT_SNAP_THRESHOLD: u16 = 3;

/// Smallest size a window can be resized to. The titlebar needs room for the
/// linking dot, a few title characters and the three controls.
pub const MIN_WINDOW_WIDTH: u16 = 20;
pub const MIN_WINDOW_HEIGHT: u16 = 5;

/// Built-in geometry for modules that do not declare their own.
pub const DEFAULT_WINDOW_WIDTH: u16 = 48;
pub const DEFAULT_WINDOW_HEIGHT: u16 = 14;

/// How far (per axis) a window's size may drift from the size it was opened
/// with before closing it offers to save the new size as the module default.
pub const DEFAULTS_TOLERANCE: u16 = 2;

/// Offset between successive windows when no free slot is left.
pub const CASCADE_STEP: u16 = 2;

/// Rows reserved for the toolbar (top) and the taskbar (bottom).
pub const TOOLBAR_HEIGHT: u16 = 1;
pub const TASKBAR_HEIGHT: u16 = 1;

/// Storage key used when none is configured.
pub const DEFAULT_STORAGE_KEY: &str = "quote-wm.workspace";

/// Row below the taskbar for status messages.
pub const STATUS_BAR_HEIGHT: u16 = 1;
