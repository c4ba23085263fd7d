pub mod components;
pub mod config;
pub mod constants;
pub mod defaults;
pub mod drivers;
pub mod error;
pub mod event_loop;
pub mod layout;
pub mod linking;
pub mod modules;
pub mod taskbar;
pub mod theme;
pub mod toolbar;
pub mod tracing_sub;
pub mod ui;
pub mod views;
pub mod window;
pub mod workspace;

pub use error::WmError;
pub use workspace::Workspace;
