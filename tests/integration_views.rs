use std::sync::Arc;

use ratatui::layout::Rect;

use quote_wm::defaults::InMemoryModuleDefaults;
use quote_wm::modules::quotation_modules;
use quote_wm::views::ViewStorage;
use quote_wm::window::WindowStore;

fn store_with(storage: ViewStorage) -> WindowStore {
    WindowStore::new(
        Arc::new(quotation_modules()),
        Box::new(InMemoryModuleDefaults::new()),
        Rect::new(0, 1, 160, 40),
    )
    .with_view_storage(storage)
}

#[test]
fn saved_views_survive_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let mut first = store_with(ViewStorage::new(dir.path(), "workspace"));
    first.open_window("quotes", "Quotes", None, None).unwrap();
    first.open_window("pricing", "Pricing", None, None).unwrap();
    let saved = first.save_current_view("Morning").unwrap();
    first.toggle_view_favorite(&saved.id).unwrap();

    let mut second = store_with(ViewStorage::new(dir.path(), "workspace"));
    let restored = second.view_by_name("Morning").unwrap().clone();
    assert!(restored.favorite);
    assert_eq!(restored.windows, saved.windows);

    let report = second.load_view(&restored.id).unwrap();
    assert_eq!(report.opened.len(), 2);
    assert_eq!(second.window(report.opened[1]).unwrap().module, "pricing");
}

#[test]
fn corrupt_file_loads_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    let storage = ViewStorage::new(dir.path(), "workspace");
    std::fs::write(storage.path(), "{ not json").unwrap();
    let store = store_with(storage);
    assert!(store.views().is_empty());
}

#[test]
fn deleting_a_view_updates_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = store_with(ViewStorage::new(dir.path(), "workspace"));
    store.open_window("admin", "Admin", None, None).unwrap();
    let a = store.save_current_view("A").unwrap();
    store.save_current_view("B").unwrap();
    store.delete_view(&a.id).unwrap();

    let reloaded = store_with(ViewStorage::new(dir.path(), "workspace"));
    let names: Vec<_> = reloaded.views().iter().map(|v| v.name.clone()).collect();
    assert_eq!(names, vec!["B".to_string()]);
}

#[test]
fn unknown_modules_are_skipped_on_load() {
    let dir = tempfile::tempdir().unwrap();
    let storage = ViewStorage::new(dir.path(), "workspace");
    std::fs::write(
        storage.path(),
        r#"{"views":[{"id":"view-1","name":"Old","favorite":false,"windows":[
            {"module":"quotes","title":"Quotes","x":0,"y":1,"width":40,"height":10,"linkingGroup":null},
            {"module":"retired","title":"Gone","x":40,"y":1,"width":40,"height":10,"linkingGroup":null}
        ]}]}"#,
    )
    .unwrap();
    let mut store = store_with(storage);
    let id = store.view_by_name("Old").unwrap().id.clone();
    let report = store.load_view(&id).unwrap();
    assert_eq!(report.opened.len(), 1);
    assert_eq!(report.skipped, vec!["retired".to_string()]);
}
