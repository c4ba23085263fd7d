//! Runtime configuration: command-line flags and the validated settings the
//! workspace runs with.

use std::path::PathBuf;

use clap::Parser;
use thiserror::Error;
use tracing::Level;

use crate::constants::{
    DEFAULT_SNAP_THRESHOLD, DEFAULT_STORAGE_KEY, MIN_WINDOW_HEIGHT, MIN_WINDOW_WIDTH,
};

/// Which interactions refuse to create new overlaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionPolicy {
    pub drag: bool,
    pub resize: bool,
}

impl Default for CollisionPolicy {
    fn default() -> Self {
        Self {
            drag: true,
            resize: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InteractionPolicy {
    /// Edges closer than this many cells snap together.
    pub snap_threshold: u16,
    pub min_width: u16,
    pub min_height: u16,
    pub collision: CollisionPolicy,
}

impl Default for InteractionPolicy {
    fn default() -> Self {
        Self {
            snap_threshold: DEFAULT_SNAP_THRESHOLD,
            min_width: MIN_WINDOW_WIDTH,
            min_height: MIN_WINDOW_HEIGHT,
            collision: CollisionPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceConfig {
    /// Directory holding the saved-view file; `None` keeps views in memory.
    pub storage_dir: Option<PathBuf>,
    pub storage_key: String,
    /// Base URL of the module-defaults service; `None` uses in-memory
    /// defaults.
    pub defaults_url: Option<String>,
    pub interaction: InteractionPolicy,
    pub log_file: Option<PathBuf>,
    pub log_level: Level,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            storage_dir: None,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            defaults_url: None,
            interaction: InteractionPolicy::default(),
            log_file: None,
            log_level: Level::INFO,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("snap threshold must be between 0 and 50 cells, got {0}")]
    SnapThreshold(u16),
    #[error("minimum window size must be at least 10x3, got {0}x{1}")]
    MinimumSize(u16, u16),
    #[error("storage key must be a non-empty file name, got `{0}`")]
    StorageKey(String),
    #[error("unknown log level `{0}`")]
    LogLevel(String),
}

#[derive(Parser, Debug)]
#[command(
    name = "quote-wm",
    version = env!("CARGO_PKG_VERSION"),
    about = "Multi-window quotation workspace for the terminal"
)]
pub struct Cli {
    /// Directory where saved views are stored.
    #[arg(long = "storage-dir", value_name = "DIR")]
    pub storage_dir: Option<PathBuf>,

    /// Name of the saved-view file inside the storage directory.
    #[arg(long = "storage-key", value_name = "KEY", default_value = DEFAULT_STORAGE_KEY)]
    pub storage_key: String,

    /// Base URL of the module-defaults REST service.
    #[arg(long = "defaults-url", value_name = "URL")]
    pub defaults_url: Option<String>,

    #[arg(long = "snap-threshold", value_name = "CELLS", default_value_t = DEFAULT_SNAP_THRESHOLD)]
    pub snap_threshold: u16,

    #[arg(long = "min-width", value_name = "CELLS", default_value_t = MIN_WINDOW_WIDTH)]
    pub min_width: u16,

    #[arg(long = "min-height", value_name = "CELLS", default_value_t = MIN_WINDOW_HEIGHT)]
    pub min_height: u16,

    /// Allow drags to overlap other windows.
    #[arg(long = "no-drag-collision")]
    pub no_drag_collision: bool,

    /// Allow resizes to overlap other windows.
    #[arg(long = "no-resize-collision")]
    pub no_resize_collision: bool,

    /// Write logs to this file. Logs are discarded otherwise.
    #[arg(long = "log-file", value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    pub log_level: String,
}

impl TryFrom<&Cli> for WorkspaceConfig {
    type Error = ConfigError;

    fn try_from(cli: &Cli) -> Result<Self, Self::Error> {
        if cli.snap_threshold > 50 {
            return Err(ConfigError::SnapThreshold(cli.snap_threshold));
        }
        if cli.min_width < 10 || cli.min_height < 3 {
            return Err(ConfigError::MinimumSize(cli.min_width, cli.min_height));
        }
        let key = cli.storage_key.trim();
        if key.is_empty() || key.contains(['/', '\\']) {
            return Err(ConfigError::StorageKey(cli.storage_key.clone()));
        }
        let log_level = cli
            .log_level
            .parse::<Level>()
            .map_err(|_| ConfigError::LogLevel(cli.log_level.clone()))?;
        Ok(Self {
            storage_dir: cli.storage_dir.clone(),
            storage_key: key.to_string(),
            defaults_url: cli.defaults_url.clone(),
            interaction: InteractionPolicy {
                snap_threshold: cli.snap_threshold,
                min_width: cli.min_width,
                min_height: cli.min_height,
                collision: CollisionPolicy {
                    drag: !cli.no_drag_collision,
                    resize: !cli.no_resize_collision,
                },
            },
            log_file: cli.log_file.clone(),
            log_level,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("quote-wm").chain(args.iter().copied()))
    }

    #[test]
    fn defaults_match_workspace_default() {
        let config = WorkspaceConfig::try_from(&parse(&[])).unwrap();
        assert_eq!(config, WorkspaceConfig::default());
    }

    #[test]
    fn flags_flow_into_the_policy() {
        let cli = parse(&[
            "--snap-threshold",
            "15",
            "--no-resize-collision",
            "--storage-dir",
            "/tmp/views",
            "--log-level",
            "debug",
        ]);
        let config = WorkspaceConfig::try_from(&cli).unwrap();
        assert_eq!(config.interaction.snap_threshold, 15);
        assert!(config.interaction.collision.drag);
        assert!(!config.interaction.collision.resize);
        assert_eq!(config.storage_dir, Some(PathBuf::from("/tmp/views")));
        assert_eq!(config.log_level, Level::DEBUG);
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let err = WorkspaceConfig::try_from(&parse(&["--snap-threshold", "80"])).unwrap_err();
        assert_eq!(err, ConfigError::SnapThreshold(80));
        let err = WorkspaceConfig::try_from(&parse(&["--min-width", "4"])).unwrap_err();
        assert_eq!(err, ConfigError::MinimumSize(4, MIN_WINDOW_HEIGHT));
        let err = WorkspaceConfig::try_from(&parse(&["--storage-key", "a/b"])).unwrap_err();
        assert_eq!(err, ConfigError::StorageKey("a/b".into()));
        let err = WorkspaceConfig::try_from(&parse(&["--log-level", "loud"])).unwrap_err();
        assert_eq!(err, ConfigError::LogLevel("loud".into()));
    }
}
