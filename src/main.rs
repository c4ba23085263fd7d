use std::io;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use crossterm::event::DisableMouseCapture;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use quote_wm::Workspace;
use quote_wm::config::{Cli, WorkspaceConfig};
use quote_wm::defaults::{HttpModuleDefaults, InMemoryModuleDefaults, ModuleDefaults};
use quote_wm::drivers::ConsoleInputDriver;
use quote_wm::modules::quotation_modules;
use quote_wm::{tracing_sub, workspace};

fn main() -> io::Result<()> {
    let cli = Cli::parse();
    let config = WorkspaceConfig::try_from(&cli)
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))?;
    tracing_sub::init(config.log_file.as_deref(), config.log_level)?;

    let defaults: Box<dyn ModuleDefaults> = match &config.defaults_url {
        Some(url) => Box::new(HttpModuleDefaults::new(url.as_str()).map_err(io::Error::other)?),
        None => Box::new(InMemoryModuleDefaults::new()),
    };
    let mut wm = Workspace::new(&config, Arc::new(quotation_modules()), defaults);
    tracing::info!(
        storage = ?config.storage_dir,
        defaults = config.defaults_url.as_deref().unwrap_or("in-memory"),
        "starting workspace"
    );

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    terminal::enable_raw_mode()?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    let mut driver = ConsoleInputDriver::new();

    let result = workspace::run(
        &mut terminal,
        &mut driver,
        &mut wm,
        Duration::from_millis(16),
    );

    terminal::disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableMouseCapture, LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}
