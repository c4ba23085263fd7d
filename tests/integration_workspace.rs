use std::sync::Arc;
use std::time::Duration;

use crossterm::event::KeyCode;
use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::buffer::Buffer;

use quote_wm::Workspace;
use quote_wm::config::WorkspaceConfig;
use quote_wm::defaults::InMemoryModuleDefaults;
use quote_wm::drivers::ScriptedDriver;
use quote_wm::linking::Role;
use quote_wm::modules::quotation_modules;
use quote_wm::ui::UiFrame;
use quote_wm::workspace;

fn new_workspace(config: &WorkspaceConfig) -> Workspace {
    Workspace::new(
        config,
        Arc::new(quotation_modules()),
        Box::new(InMemoryModuleDefaults::new()),
    )
}

fn screen_text(buffer: &Buffer) -> Vec<String> {
    let area = buffer.area;
    (area.y..area.y + area.height)
        .map(|y| {
            (area.x..area.x + area.width)
                .map(|x| buffer.cell((x, y)).map(|c| c.symbol().to_string()).unwrap_or_default())
                .collect()
        })
        .collect()
}

#[test]
fn scripted_session_links_a_detail_window_to_the_selected_quote() {
    let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
    let mut ws = new_workspace(&WorkspaceConfig::default());

    // " +Quotes " spans columns 0..9, " +Parts " follows it.
    let mut events = Vec::new();
    events.extend(ScriptedDriver::click(2, 0));
    events.push(ScriptedDriver::key(KeyCode::Enter));
    events.extend(ScriptedDriver::click(11, 0));
    let mut driver = ScriptedDriver::new(events);

    workspace::run(&mut terminal, &mut driver, &mut ws, Duration::ZERO).unwrap();
    assert_eq!(driver.remaining(), 0);

    let store = ws.store();
    assert_eq!(store.len(), 2);
    let quotes = store.windows()[0].clone();
    let parts = store.windows()[1].clone();
    assert_eq!(quotes.module, "quotes");
    assert_eq!(parts.module, "parts");
    assert!(quotes.linking_group.is_some());
    assert_eq!(parts.linking_group, quotes.linking_group);
    assert_eq!(quotes.role, Role::Master);
    assert_eq!(parts.role, Role::Child);
    assert_eq!(
        store.context_for(parts.id).map(|c| c.entity_id.as_str()),
        Some("1001")
    );

    terminal
        .draw(|frame| {
            let mut ui = UiFrame::new(frame);
            ws.render(&mut ui);
        })
        .unwrap();
    let rows = screen_text(terminal.backend().buffer());
    assert!(rows.iter().any(|row| row.contains("Parts for Q-1001")));
    assert!(rows[28].contains("Quotes") && rows[28].contains("Parts"));
}

#[test]
fn saving_with_no_windows_warns_on_the_status_line() {
    let mut terminal = Terminal::new(TestBackend::new(160, 20)).unwrap();
    let mut ws = new_workspace(&WorkspaceConfig::default());
    terminal
        .draw(|frame| {
            ws.resize(frame.area());
            let mut ui = UiFrame::new(frame);
            ws.render(&mut ui);
        })
        .unwrap();

    let toolbar = screen_text(terminal.backend().buffer())[0].clone();
    let column = toolbar.find("Save view").unwrap() as u16;
    let mut driver = ScriptedDriver::new(ScriptedDriver::click(column, 0));
    workspace::run(&mut terminal, &mut driver, &mut ws, Duration::ZERO).unwrap();

    assert!(ws.store().views().is_empty());
    assert_eq!(ws.status().level(), quote_wm::components::StatusLevel::Warning);
    assert!(ws.status().message().starts_with("Nothing to save"));
}

#[test]
fn views_saved_in_one_session_are_listed_in_the_next() {
    let dir = tempfile::tempdir().unwrap();
    let config = WorkspaceConfig {
        storage_dir: Some(dir.path().to_path_buf()),
        ..WorkspaceConfig::default()
    };

    let mut first = new_workspace(&config);
    first
        .store_mut()
        .open_window("quotes", "Quotes", None, None)
        .unwrap();
    first.store_mut().save_current_view("Layout 1").unwrap();

    let second = new_workspace(&config);
    assert_eq!(second.store().views().len(), 1);
    assert_eq!(second.store().next_view_name(), "Layout 2");
}
