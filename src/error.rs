use thiserror::Error;

use crate::defaults::DefaultsError;
use crate::views::ViewId;
use crate::window::WindowId;

#[derive(Debug, Error)]
pub enum WmError {
    #[error("cannot save a view while no windows are open")]
    EmptyView,
    #[error("no open window with id {0}")]
    UnknownWindow(WindowId),
    #[error("module `{0}` is not registered")]
    UnknownModule(String),
    #[error("no saved view with id `{0}`")]
    UnknownView(ViewId),
    #[error("saved view storage error: {0}")]
    Storage(#[from] std::io::Error),
    #[error("saved view encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
    #[error(transparent)]
    Defaults(#[from] DefaultsError),
}
