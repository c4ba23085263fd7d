//! The application shell: one [`WindowStore`] plus everything that draws it
//! and feeds input into it.
//!
//! Input goes to the close prompt first, then the toolbar, the taskbar and the
//! interaction shell. Presses in a window body and keys go to the focused
//! module view. Module views are kept in step with the store through a store
//! observer whose events are drained after every input event and before every
//! frame.

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::io;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::Terminal;
use ratatui::backend::Backend;
use ratatui::layout::Rect;
use ratatui::style::Style;

use crate::components::{Component, ConfirmAction, ConfirmOverlayComponent, StatusBar, StatusLevel};
use crate::config::{InteractionPolicy, WorkspaceConfig};
use crate::constants::{STATUS_BAR_HEIGHT, TASKBAR_HEIGHT, TOOLBAR_HEIGHT};
use crate::defaults::ModuleDefaults;
use crate::drivers::InputDriver;
use crate::error::WmError;
use crate::event_loop::{ControlFlow, EventLoop};
use crate::layout::FloatRect;
use crate::modules::{ModuleContext, ModuleRegistry, ModuleResponse, ModuleView};
use crate::taskbar::{self, Taskbar};
use crate::theme;
use crate::toolbar::{CommandOutcome, Toolbar, ToolbarCommand};
use crate::ui::UiFrame;
use crate::views::ViewStorage;
use crate::window::decorator::ChromeState;
use crate::window::{InteractionShell, ShellResponse, StoreEvent, WindowId, WindowStore};

const QUIT_HINT: &str = "^Q quit  ^W close";

pub struct Workspace {
    store: WindowStore,
    shell: InteractionShell,
    toolbar: Toolbar,
    taskbar: Taskbar,
    status: StatusBar,
    status_area: Rect,
    confirm: ConfirmOverlayComponent,
    closing: Option<WindowId>,
    views: BTreeMap<WindowId, Box<dyn ModuleView>>,
    pending: Rc<RefCell<VecDeque<StoreEvent>>>,
    area: Rect,
}

impl Workspace {
    pub fn new(
        config: &WorkspaceConfig,
        registry: Arc<ModuleRegistry>,
        defaults: Box<dyn ModuleDefaults>,
    ) -> Self {
        let mut store = WindowStore::new(registry, defaults, Rect::default());
        if let Some(dir) = &config.storage_dir {
            store = store.with_view_storage(ViewStorage::new(dir, &config.storage_key));
        }
        Self::with_store(store, config.interaction)
    }

    /// Wrap an existing store. Windows already open get their module views.
    pub fn with_store(mut store: WindowStore, policy: InteractionPolicy) -> Self {
        let pending = Rc::new(RefCell::new(VecDeque::new()));
        let queue = Rc::clone(&pending);
        store.subscribe(move |event| queue.borrow_mut().push_back(event.clone()));

        let mut views: BTreeMap<WindowId, Box<dyn ModuleView>> = BTreeMap::new();
        for record in store.windows() {
            if let Some(mut view) = store.registry().instantiate(&record.module) {
                view.on_context(store.context_for(record.id));
                views.insert(record.id, view);
            }
        }

        let mut status = StatusBar::new();
        status.set_right(QUIT_HINT);
        Self {
            store,
            shell: InteractionShell::new(policy),
            toolbar: Toolbar::new(),
            taskbar: Taskbar::new(),
            status,
            status_area: Rect::default(),
            confirm: ConfirmOverlayComponent::new(),
            closing: None,
            views,
            pending,
            area: Rect::default(),
        }
    }

    pub fn store(&self) -> &WindowStore {
        &self.store
    }

    /// Direct store access. Module views catch up on the next event or frame.
    pub fn store_mut(&mut self) -> &mut WindowStore {
        &mut self.store
    }

    pub fn shell(&self) -> &InteractionShell {
        &self.shell
    }

    pub fn status(&self) -> &StatusBar {
        &self.status
    }

    pub fn confirm_visible(&self) -> bool {
        self.confirm.visible()
    }

    pub fn has_view(&self, id: WindowId) -> bool {
        self.views.contains_key(&id)
    }

    /// Split the screen into toolbar, work area, taskbar and status row.
    pub fn resize(&mut self, area: Rect) {
        if self.area == area {
            return;
        }
        self.area = area;
        let toolbar_h = TOOLBAR_HEIGHT.min(area.height);
        let rest = area.height - toolbar_h;
        let taskbar_h = TASKBAR_HEIGHT.min(rest);
        let status_h = STATUS_BAR_HEIGHT.min(rest - taskbar_h);
        let work_h = rest - taskbar_h - status_h;

        self.toolbar
            .set_area(Rect::new(area.x, area.y, area.width, toolbar_h));
        let work = Rect::new(area.x, area.y + toolbar_h, area.width, work_h);
        self.taskbar
            .set_area(Rect::new(area.x, work.y + work_h, area.width, taskbar_h));
        self.status_area = Rect::new(area.x, work.y + work_h + taskbar_h, area.width, status_h);
        tracing::debug!(width = area.width, height = area.height, work_height = work_h, "workspace resized");
        self.store.set_work_area(work);
    }

    pub fn handle_event(&mut self, event: &Event) -> ControlFlow {
        if is_ctrl(event, 'q') {
            return ControlFlow::Quit;
        }
        match event {
            Event::Resize(width, height) => self.resize(Rect::new(0, 0, *width, *height)),
            _ if self.confirm.visible() => {
                if let Some(action) = self.confirm.handle_confirm_event(event) {
                    self.finish_close(action);
                }
            }
            _ if is_ctrl(event, 'w') => {
                if let Some(id) = self.store.focused() {
                    self.request_close(id);
                }
            }
            _ => self.route(event),
        }
        self.sync_views();
        ControlFlow::Continue
    }

    fn route(&mut self, event: &Event) {
        let (handled, command) = self.toolbar.handle_event(event);
        if let Some(command) = command {
            self.run_command(command);
        }
        if handled {
            return;
        }
        if let Some(id) = self.taskbar.hit_test(event) {
            if let Err(err) = taskbar::activate(&mut self.store, id) {
                tracing::debug!(window_id = ?id, error = %err, "taskbar click ignored");
            }
            return;
        }
        match self.shell.handle_event(&mut self.store, event) {
            ShellResponse::CloseRequested(id) => self.request_close(id),
            ShellResponse::Body(id) => self.forward(id, event),
            ShellResponse::Handled => {}
            ShellResponse::Ignored => {
                let target = match event {
                    Event::Key(_) | Event::Paste(_) => self.store.focused(),
                    Event::Mouse(mouse) => self.shell.window_at(&self.store, mouse.column, mouse.row),
                    _ => None,
                };
                if let Some(id) = target {
                    self.forward(id, event);
                }
            }
        }
    }

    fn forward(&mut self, id: WindowId, event: &Event) {
        let Some(record) = self.store.window(id) else {
            return;
        };
        let ctx = ModuleContext::new(self.store.focused() == Some(id))
            .with_link(record.linking_group, record.role);
        let Some(view) = self.views.get_mut(&id) else {
            return;
        };
        if let ModuleResponse::Selected(payload) = view.handle_event(event, &ctx) {
            tracing::debug!(window_id = ?id, entity = %payload.entity_id, "module selection");
            if let Err(err) = self.store.report_selection(id, payload) {
                tracing::warn!(window_id = ?id, error = %err, "selection not recorded");
            }
        }
    }

    fn run_command(&mut self, command: ToolbarCommand) {
        match command.apply(&mut self.store) {
            Ok(CommandOutcome::Saved(view)) => self
                .status
                .set_message(format!("Saved view \"{}\"", view.name), StatusLevel::Info),
            Ok(CommandOutcome::Loaded(report)) if !report.skipped.is_empty() => {
                self.status.set_message(
                    format!("Skipped unknown modules: {}", report.skipped.join(", ")),
                    StatusLevel::Warning,
                );
            }
            Ok(CommandOutcome::Loaded(report)) => self
                .status
                .set_message(format!("Opened {} windows", report.opened.len()), StatusLevel::Info),
            Ok(CommandOutcome::ClosedAll(count)) => self
                .status
                .set_message(format!("Closed {count} windows"), StatusLevel::Info),
            Ok(_) => self.status.clear_message(),
            Err(WmError::EmptyView) => self
                .status
                .set_message("Nothing to save: open a window first", StatusLevel::Warning),
            Err(err) => {
                tracing::warn!(error = %err, "toolbar command failed");
                self.status.set_message(err.to_string(), StatusLevel::Warning);
            }
        }
    }

    /// Close right away, or ask first when the window was resized enough to
    /// be worth saving as its module's default.
    pub fn request_close(&mut self, id: WindowId) {
        let Some(record) = self.store.window(id) else {
            return;
        };
        if !self.store.geometry_changed(id) {
            self.store.close_window(id);
            return;
        }
        let body = format!(
            "\"{}\" is now {}x{}. Use this size for new {} windows?",
            record.title, record.width, record.height, record.module
        );
        self.confirm.open("Close window", &body, "Discard", "Save size");
        self.closing = Some(id);
    }

    fn finish_close(&mut self, action: ConfirmAction) {
        self.confirm.close();
        let Some(id) = self.closing.take() else {
            return;
        };
        match action {
            ConfirmAction::Confirm => {
                match self.store.save_module_defaults(id) {
                    Ok(size) => self.status.set_message(
                        format!("Saved default size {}x{}", size.width, size.height),
                        StatusLevel::Info,
                    ),
                    Err(err) => {
                        tracing::warn!(window_id = ?id, error = %err, "saving module defaults failed");
                        self.status
                            .set_message(format!("Default size not saved: {err}"), StatusLevel::Warning);
                    }
                }
                self.store.close_window(id);
            }
            ConfirmAction::Cancel => {
                self.store.close_window(id);
            }
            ConfirmAction::Dismiss => {}
        }
    }

    fn sync_views(&mut self) {
        self.shell.sync(&self.store);
        let events: Vec<StoreEvent> = self.pending.borrow_mut().drain(..).collect();
        for event in events {
            match event {
                StoreEvent::Opened(id) => {
                    if let Some(record) = self.store.window(id)
                        && let Some(mut view) = self.store.registry().instantiate(&record.module)
                    {
                        view.on_context(self.store.context_for(id));
                        self.views.insert(id, view);
                    }
                }
                StoreEvent::Closed(id) => {
                    self.views.remove(&id);
                    if self.closing == Some(id) {
                        self.closing = None;
                        self.confirm.close();
                    }
                }
                StoreEvent::LinkChanged(id) => self.deliver_context(id),
                StoreEvent::ContextPublished { listeners, .. } => {
                    for id in listeners {
                        self.deliver_context(id);
                    }
                }
                _ => {}
            }
        }
    }

    fn deliver_context(&mut self, id: WindowId) {
        if let Some(view) = self.views.get_mut(&id) {
            view.on_context(self.store.context_for(id));
        }
    }

    pub fn render(&mut self, frame: &mut UiFrame<'_>) {
        self.sync_views();
        let area = frame.area();
        frame.fill_signed(FloatRect::from(area), Style::default().bg(theme::desktop_bg()));
        self.toolbar.render(frame, &self.store);

        let work_area = self.store.work_area();
        let focused = self.store.focused();
        for record in self.store.windows_by_z() {
            if record.minimized {
                continue;
            }
            let rect = record.display_rect(work_area);
            self.shell.render_chrome(
                frame,
                rect,
                ChromeState {
                    title: &record.title,
                    linking_group: record.linking_group,
                    focused: focused == Some(record.id),
                    maximized: record.maximized,
                },
            );
            let inner = self.shell.decorator().inner_rect(rect).visible_in(work_area);
            if inner.width == 0 || inner.height == 0 {
                continue;
            }
            if let Some(view) = self.views.get_mut(&record.id) {
                let ctx = ModuleContext::new(focused == Some(record.id))
                    .with_link(record.linking_group, record.role);
                view.render(frame, inner, &ctx);
            }
        }

        self.toolbar.render_menu(frame, &self.store);
        self.shell.render_overlay(frame);
        self.taskbar.render(frame, &self.store);
        self.status.render(frame, self.status_area);
        self.confirm.render(frame, area);
    }
}

fn is_ctrl(event: &Event, ch: char) -> bool {
    matches!(
        event,
        Event::Key(key)
            if key.kind == KeyEventKind::Press
                && key.modifiers.contains(KeyModifiers::CONTROL)
                && key.code == KeyCode::Char(ch)
    )
}

/// Drive `workspace` until the user quits. Redraws once per loop iteration.
pub fn run<B, D>(
    terminal: &mut Terminal<B>,
    driver: &mut D,
    workspace: &mut Workspace,
    poll_interval: Duration,
) -> io::Result<()>
where
    B: Backend,
    D: InputDriver,
{
    let mut event_loop = EventLoop::new(driver, poll_interval);
    event_loop.driver().set_mouse_capture(true)?;
    event_loop.run(|_, event| match event {
        Some(event) => Ok(workspace.handle_event(&event)),
        None => {
            terminal
                .draw(|frame| {
                    workspace.resize(frame.area());
                    let mut ui = UiFrame::new(frame);
                    workspace.render(&mut ui);
                })
                .map_err(|e| io::Error::other(e.to_string()))?;
            Ok(ControlFlow::Continue)
        }
    })
}
