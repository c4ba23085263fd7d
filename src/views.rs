//! Saved views: named layout snapshots and their on-disk storage.

use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::error::WmError;
use crate::layout::FloatRect;
use crate::linking::LinkingGroup;
use crate::window::WindowId;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViewId(String);

impl ViewId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Enough to reopen one window: which module, where, and in which group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewDescriptor {
    pub module: String,
    pub title: String,
    pub x: i32,
    pub y: i32,
    pub width: u16,
    pub height: u16,
    #[serde(default)]
    pub linking_group: Option<LinkingGroup>,
}

impl ViewDescriptor {
    pub fn rect(&self) -> FloatRect {
        FloatRect::new(self.x, self.y, self.width, self.height)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedView {
    pub id: ViewId,
    pub name: String,
    #[serde(default)]
    pub favorite: bool,
    #[serde(default)]
    pub windows: Vec<ViewDescriptor>,
}

/// Outcome of loading a view. Descriptors naming unregistered modules are
/// skipped rather than failing the whole view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub opened: Vec<WindowId>,
    pub skipped: Vec<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ViewFile {
    #[serde(default)]
    views: Vec<SavedView>,
}

/// JSON file holding every saved view of one workspace, located at
/// `{dir}/{storage_key}.json`.
#[derive(Debug, Clone)]
pub struct ViewStorage {
    path: PathBuf,
}

impl ViewStorage {
    pub fn new(dir: impl AsRef<Path>, storage_key: &str) -> Self {
        Self {
            path: dir.as_ref().join(format!("{storage_key}.json")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing or unreadable files yield an empty list. A file that cannot be
    /// parsed is moved aside to `*.corrupt` so the next save does not
    /// overwrite it.
    pub fn load(&self) -> Vec<SavedView> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) => {
                if err.kind() != io::ErrorKind::NotFound {
                    tracing::warn!(path = %self.path.display(), error = %err, "failed to read saved views");
                }
                return Vec::new();
            }
        };
        if content.trim().is_empty() {
            return Vec::new();
        }
        match serde_json::from_str::<ViewFile>(&content) {
            Ok(file) => file.views,
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "ignoring corrupt saved views");
                let aside = self.path.with_extension("corrupt");
                if let Err(err) = fs::rename(&self.path, &aside) {
                    tracing::warn!(
                        path = %self.path.display(),
                        aside = %aside.display(),
                        error = %err,
                        "failed to move corrupt saved views aside"
                    );
                }
                Vec::new()
            }
        }
    }

    /// Write through a temp file in the same directory so a crash never
    /// leaves a truncated file behind.
    pub fn save(&self, views: &[SavedView]) -> Result<(), WmError> {
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir)?;
        let file = ViewFile {
            views: views.to_vec(),
        };
        let json = serde_json::to_vec_pretty(&file)?;
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(&json)?;
        tmp.flush()?;
        tmp.persist(&self.path).map_err(|err| err.error)?;
        tracing::debug!(path = %self.path.display(), count = views.len(), "saved views written");
        Ok(())
    }
}
