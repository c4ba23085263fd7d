//! The window state store: sole owner of every [`WindowRecord`], the z
//! counter, the linking-group bus and the saved-view registry.
//!
//! All mutations go through `&mut WindowStore`. Each successful mutation
//! bumps [`WindowStore::revision`] and is reported to subscribers as a
//! [`StoreEvent`].

use std::sync::Arc;

use ratatui::prelude::Rect;

use super::{WindowId, WindowRecord};
use crate::constants::{CASCADE_STEP, DEFAULTS_TOLERANCE};
use crate::defaults::{ModuleDefaults, ModuleSize};
use crate::error::WmError;
use crate::layout::{ArrangeMode, FloatRect, arrange, rects_intersect};
use crate::linking::{ContextBus, LinkingContext, LinkingGroup, Role};
use crate::modules::{ModuleRegistry, ModuleSpec};
use crate::views::{LoadReport, SavedView, ViewDescriptor, ViewId, ViewStorage};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    Opened(WindowId),
    Closed(WindowId),
    Focused(WindowId),
    Minimized(WindowId),
    Restored(WindowId),
    Maximized { id: WindowId, maximized: bool },
    Moved(WindowId),
    Resized(WindowId),
    /// Group or role changed. Subscribers re-read the group context.
    LinkChanged(WindowId),
    ContextPublished {
        group: LinkingGroup,
        listeners: Vec<WindowId>,
    },
    Arranged(ArrangeMode),
    ViewsChanged,
    ViewLoaded(ViewId),
    DefaultsSaved(WindowId),
    WorkAreaChanged(Rect),
}

type Observer = Box<dyn FnMut(&StoreEvent)>;

pub struct WindowStore {
    windows: Vec<WindowRecord>,
    registry: Arc<ModuleRegistry>,
    defaults: Box<dyn ModuleDefaults>,
    bus: ContextBus,
    views: Vec<SavedView>,
    view_storage: Option<ViewStorage>,
    work_area: Rect,
    next_window_seq: u64,
    next_view_seq: u64,
    z_counter: u64,
    revision: u64,
    observers: Vec<Observer>,
}

impl WindowStore {
    pub fn new(
        registry: Arc<ModuleRegistry>,
        defaults: Box<dyn ModuleDefaults>,
        work_area: Rect,
    ) -> Self {
        Self {
            windows: Vec::new(),
            registry,
            defaults,
            bus: ContextBus::new(),
            views: Vec::new(),
            view_storage: None,
            work_area,
            next_window_seq: 1,
            next_view_seq: 1,
            z_counter: 0,
            revision: 0,
            observers: Vec::new(),
        }
    }

    /// Attach file storage for saved views and load whatever it holds.
    pub fn with_view_storage(mut self, storage: ViewStorage) -> Self {
        self.views = storage.load();
        self.next_view_seq = self.views.len() as u64 + 1;
        tracing::debug!(path = %storage.path().display(), count = self.views.len(), "loaded saved views");
        self.view_storage = Some(storage);
        self
    }

    pub fn registry(&self) -> &Arc<ModuleRegistry> {
        &self.registry
    }

    pub fn subscribe(&mut self, observer: impl FnMut(&StoreEvent) + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn emit(&mut self, event: StoreEvent) {
        self.revision += 1;
        for observer in &mut self.observers {
            observer(&event);
        }
    }

    // ---- queries ----------------------------------------------------------

    /// Open windows in creation order.
    pub fn windows(&self) -> &[WindowRecord] {
        &self.windows
    }

    pub fn window(&self, id: WindowId) -> Option<&WindowRecord> {
        self.windows.iter().find(|w| w.id == id)
    }

    fn window_mut(&mut self, id: WindowId) -> Result<&mut WindowRecord, WmError> {
        self.windows
            .iter_mut()
            .find(|w| w.id == id)
            .ok_or(WmError::UnknownWindow(id))
    }

    /// Open windows in paint order, bottom first.
    pub fn windows_by_z(&self) -> Vec<&WindowRecord> {
        let mut ordered: Vec<&WindowRecord> = self.windows.iter().collect();
        ordered.sort_by_key(|w| w.z_index);
        ordered
    }

    /// The non-minimized window with the highest z.
    pub fn focused(&self) -> Option<WindowId> {
        self.windows
            .iter()
            .filter(|w| !w.minimized)
            .max_by_key(|w| w.z_index)
            .map(|w| w.id)
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    /// Rectangles other windows present to snapping and collision: every
    /// visible, non-maximized window except `except`.
    pub fn obstacles(&self, except: Option<WindowId>) -> Vec<FloatRect> {
        self.windows
            .iter()
            .filter(|w| Some(w.id) != except && !w.minimized && !w.maximized)
            .map(WindowRecord::rect)
            .collect()
    }

    pub fn work_area(&self) -> Rect {
        self.work_area
    }

    pub fn set_work_area(&mut self, area: Rect) {
        if self.work_area == area {
            return;
        }
        self.work_area = area;
        self.emit(StoreEvent::WorkAreaChanged(area));
    }

    /// Size moved further than the tolerance from what the window opened
    /// with.
    pub fn geometry_changed(&self, id: WindowId) -> bool {
        self.window(id).is_some_and(|w| {
            w.width.abs_diff(w.opened_width) > DEFAULTS_TOLERANCE
                || w.height.abs_diff(w.opened_height) > DEFAULTS_TOLERANCE
        })
    }

    // ---- lifecycle --------------------------------------------------------

    pub fn open_window(
        &mut self,
        module: &str,
        title: impl Into<String>,
        linking_group: Option<LinkingGroup>,
        role: Option<Role>,
    ) -> Result<WindowId, WmError> {
        let registry = Arc::clone(&self.registry);
        let spec = registry
            .get(module)
            .ok_or_else(|| WmError::UnknownModule(module.to_string()))?;
        let (width, height) = self.initial_size(spec);
        let rect = self.place(width, height);
        Ok(self.insert_window(module, title.into(), rect, linking_group, role))
    }

    fn initial_size(&self, spec: &ModuleSpec) -> (u16, u16) {
        let (width, height) = match self.defaults.fetch(&spec.id) {
            Ok(Some(size)) => (size.width, size.height),
            Ok(None) => (spec.default_width, spec.default_height),
            Err(err) => {
                tracing::warn!(module = %spec.id, error = %err, "module defaults unavailable, using built-in size");
                (spec.default_width, spec.default_height)
            }
        };
        let max_w = self.work_area.width.max(1);
        let max_h = self.work_area.height.max(1);
        (width.clamp(1, max_w), height.clamp(1, max_h))
    }

    /// First free slot for a `width` x `height` window. Candidate origins are
    /// the work-area corner and the right/bottom edges of visible windows,
    /// scanned top to bottom then left to right. Falls back to a cascade.
    fn place(&self, width: u16, height: u16) -> FloatRect {
        let area = self.work_area;
        let left = area.x as i32;
        let top = area.y as i32;
        let right = left + area.width as i32;
        let bottom = top + area.height as i32;
        let obstacles = self.obstacles(None);

        let mut columns = vec![left];
        let mut rows = vec![top];
        for other in &obstacles {
            columns.push(other.right());
            rows.push(other.bottom());
        }
        columns.sort_unstable();
        columns.dedup();
        rows.sort_unstable();
        rows.dedup();

        for &y in &rows {
            for &x in &columns {
                let candidate = FloatRect::new(x, y, width, height);
                if candidate.x < left
                    || candidate.y < top
                    || candidate.right() > right
                    || candidate.bottom() > bottom
                {
                    continue;
                }
                if !obstacles.iter().any(|o| rects_intersect(candidate, *o)) {
                    return candidate;
                }
            }
        }

        let step = CASCADE_STEP as i32;
        let n = self.windows.len() as i32;
        let span_x = (right - width as i32 - left).max(0) + 1;
        let span_y = (bottom - height as i32 - top).max(0) + 1;
        FloatRect::new(
            left + (n * step) % span_x,
            top + (n * (step / 2).max(1)) % span_y,
            width,
            height,
        )
    }

    fn insert_window(
        &mut self,
        module: &str,
        title: String,
        rect: FloatRect,
        linking_group: Option<LinkingGroup>,
        role: Option<Role>,
    ) -> WindowId {
        let id = WindowId::from_raw(self.next_window_seq);
        self.next_window_seq += 1;
        self.z_counter += 1;
        self.windows.push(WindowRecord {
            id,
            module: module.to_string(),
            title,
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
            z_index: self.z_counter,
            minimized: false,
            maximized: false,
            linking_group: None,
            role: Role::Master,
            selection: None,
            opened_width: rect.width,
            opened_height: rect.height,
            creation_order: id.raw(),
        });
        tracing::debug!(window_id = ?id, module, x = rect.x, y = rect.y, width = rect.width, height = rect.height, "opened window");
        if let Some(group) = linking_group {
            self.join_group(id, group, role);
        } else if let Some(role) = role
            && let Ok(record) = self.window_mut(id)
        {
            record.role = role;
        }
        self.emit(StoreEvent::Opened(id));
        id
    }

    /// Remove a window. Returns the removed record, or `None` if the id was
    /// unknown.
    pub fn close_window(&mut self, id: WindowId) -> Option<WindowRecord> {
        let index = self.windows.iter().position(|w| w.id == id)?;
        let record = self.windows.remove(index);
        tracing::debug!(window_id = ?id, module = %record.module, "closing window");
        if let Some(group) = record.linking_group {
            self.leave_group(&record, group);
        }
        self.emit(StoreEvent::Closed(id));
        Some(record)
    }

    pub fn close_all(&mut self) -> usize {
        let ids: Vec<WindowId> = self.windows.iter().map(|w| w.id).collect();
        let count = ids.len();
        for id in ids {
            self.close_window(id);
        }
        count
    }

    // ---- focus and visibility ---------------------------------------------

    /// Give the window a fresh z above every other window. Z values are never
    /// reused or renumbered.
    pub fn bring_to_front(&mut self, id: WindowId) -> Result<(), WmError> {
        let was_focused = self.focused() == Some(id);
        let z = self.z_counter + 1;
        self.window_mut(id)?.z_index = z;
        self.z_counter = z;
        tracing::trace!(window_id = ?id, z, "bring to front");
        if !was_focused {
            self.emit(StoreEvent::Focused(id));
        }
        Ok(())
    }

    pub fn minimize_window(&mut self, id: WindowId) -> Result<(), WmError> {
        let record = self.window_mut(id)?;
        if record.minimized {
            return Ok(());
        }
        record.minimized = true;
        tracing::debug!(window_id = ?id, "minimized window");
        self.emit(StoreEvent::Minimized(id));
        Ok(())
    }

    pub fn restore_window(&mut self, id: WindowId) -> Result<(), WmError> {
        let record = self.window_mut(id)?;
        let was_minimized = std::mem::replace(&mut record.minimized, false);
        if was_minimized {
            tracing::debug!(window_id = ?id, "restored window");
            self.emit(StoreEvent::Restored(id));
        }
        self.bring_to_front(id)
    }

    /// Toggle maximize. Stored geometry is left alone so the window returns
    /// to it on the next toggle.
    pub fn maximize_window(&mut self, id: WindowId) -> Result<(), WmError> {
        let record = self.window_mut(id)?;
        record.maximized = !record.maximized;
        let maximized = record.maximized;
        tracing::debug!(window_id = ?id, maximized, "toggled maximize");
        self.emit(StoreEvent::Maximized { id, maximized });
        if maximized {
            self.bring_to_front(id)?;
        }
        Ok(())
    }

    // ---- geometry ---------------------------------------------------------

    pub fn update_window_position(&mut self, id: WindowId, x: i32, y: i32) -> Result<(), WmError> {
        let record = self.window_mut(id)?;
        if (record.x, record.y) == (x, y) {
            return Ok(());
        }
        record.x = x;
        record.y = y;
        self.emit(StoreEvent::Moved(id));
        Ok(())
    }

    pub fn update_window_size(&mut self, id: WindowId, width: u16, height: u16) -> Result<(), WmError> {
        let record = self.window_mut(id)?;
        if (record.width, record.height) == (width, height) {
            return Ok(());
        }
        record.width = width;
        record.height = height;
        self.emit(StoreEvent::Resized(id));
        Ok(())
    }

    /// Tile every visible window over the work area in creation order.
    pub fn arrange_windows(&mut self, mode: ArrangeMode) {
        let targets: Vec<usize> = self
            .windows
            .iter()
            .enumerate()
            .filter(|(_, w)| !w.minimized)
            .map(|(index, _)| index)
            .collect();
        let rects = arrange(mode, targets.len(), self.work_area);
        for (index, rect) in targets.into_iter().zip(rects) {
            let record = &mut self.windows[index];
            record.x = rect.x;
            record.y = rect.y;
            record.width = rect.width;
            record.height = rect.height;
            record.maximized = false;
        }
        tracing::debug!(mode = mode.label(), "arranged windows");
        self.emit(StoreEvent::Arranged(mode));
    }

    // ---- linking ----------------------------------------------------------

    pub fn find_available_linking_group(&self) -> LinkingGroup {
        self.bus.find_available()
    }

    fn join_group(&mut self, id: WindowId, group: LinkingGroup, requested: Option<Role>) {
        let has_master = self.windows.iter().any(|w| {
            w.id != id && w.linking_group == Some(group) && w.role == Role::Master
        });
        let role = if requested == Some(Role::Master) || !has_master {
            Role::Master
        } else {
            Role::Child
        };
        if role == Role::Master {
            self.demote_masters(group, id);
        }
        self.bus.subscribe(group, id);
        if let Some(record) = self.windows.iter_mut().find(|w| w.id == id) {
            record.linking_group = Some(group);
            record.role = role;
        }
        tracing::debug!(window_id = ?id, group = group.label(), ?role, "joined linking group");
    }

    fn leave_group(&mut self, record: &WindowRecord, group: LinkingGroup) {
        let emptied = self.bus.unsubscribe(group, record.id);
        if emptied || record.role != Role::Master {
            return;
        }
        self.promote_oldest(group);
    }

    fn demote_masters(&mut self, group: LinkingGroup, except: WindowId) {
        for other in self.windows.iter_mut() {
            if other.id != except && other.linking_group == Some(group) && other.role == Role::Master
            {
                other.role = Role::Child;
                tracing::debug!(window_id = ?other.id, group = group.label(), "demoted to child");
            }
        }
    }

    fn promote_oldest(&mut self, group: LinkingGroup) {
        let promoted = self
            .windows
            .iter_mut()
            .filter(|w| w.linking_group == Some(group))
            .min_by_key(|w| w.creation_order);
        if let Some(record) = promoted {
            record.role = Role::Master;
            let id = record.id;
            tracing::debug!(window_id = ?id, group = group.label(), "promoted to master");
            self.emit(StoreEvent::LinkChanged(id));
        }
    }

    /// Move a window into `group` (or out of any group with `None`).
    pub fn set_window_linking_group(
        &mut self,
        id: WindowId,
        group: Option<LinkingGroup>,
    ) -> Result<(), WmError> {
        let record = self.window(id).cloned().ok_or(WmError::UnknownWindow(id))?;
        if record.linking_group == group {
            return Ok(());
        }
        if let Some(old) = record.linking_group {
            if let Ok(current) = self.window_mut(id) {
                current.linking_group = None;
                current.role = Role::Master;
            }
            self.leave_group(&record, old);
        }
        if let Some(group) = group {
            self.join_group(id, group, None);
        }
        self.emit(StoreEvent::LinkChanged(id));
        Ok(())
    }

    /// Setting `Master` demotes the group's previous master. Demoting the
    /// last master hands the role to the group's oldest member.
    pub fn set_window_role(&mut self, id: WindowId, role: Role) -> Result<(), WmError> {
        let group = self.window_mut(id)?.linking_group;
        if role == Role::Master
            && let Some(group) = group
        {
            self.demote_masters(group, id);
        }
        self.window_mut(id)?.role = role;
        tracing::debug!(window_id = ?id, ?role, "set window role");
        self.emit(StoreEvent::LinkChanged(id));
        if let Some(group) = group
            && !self
                .windows
                .iter()
                .any(|w| w.linking_group == Some(group) && w.role == Role::Master)
        {
            self.promote_oldest(group);
        }
        Ok(())
    }

    // ---- context bus ------------------------------------------------------

    pub fn context(&self, group: LinkingGroup) -> Option<&LinkingContext> {
        self.bus.context(group)
    }

    /// Context visible to a window: its group's current payload.
    pub fn context_for(&self, id: WindowId) -> Option<&LinkingContext> {
        self.window(id)
            .and_then(|w| w.linking_group)
            .and_then(|group| self.bus.context(group))
    }

    pub fn publish(&mut self, group: LinkingGroup, payload: LinkingContext) -> Vec<WindowId> {
        let listeners = self.bus.publish(group, payload);
        self.emit(StoreEvent::ContextPublished {
            group,
            listeners: listeners.clone(),
        });
        listeners
    }

    /// Record the selection made in a window. A group master also publishes
    /// it; the returned ids are the windows that must be notified.
    pub fn report_selection(
        &mut self,
        id: WindowId,
        payload: LinkingContext,
    ) -> Result<Vec<WindowId>, WmError> {
        let record = self.window_mut(id)?;
        record.selection = Some(payload.clone());
        match (record.linking_group, record.role) {
            (Some(group), Role::Master) => Ok(self.publish(group, payload)),
            _ => Ok(Vec::new()),
        }
    }

    /// Open `module` linked to `origin`. An ungrouped origin gets the next
    /// available color; the origin becomes master, the new window a child,
    /// and the origin's current selection is republished.
    pub fn open_linked_window(
        &mut self,
        origin: WindowId,
        module: &str,
        title: impl Into<String>,
    ) -> Result<WindowId, WmError> {
        let record = self.window(origin).ok_or(WmError::UnknownWindow(origin))?;
        if !self.registry.contains(module) {
            return Err(WmError::UnknownModule(module.to_string()));
        }
        let selection = record.selection.clone();
        let current_group = record.linking_group;
        let group = match current_group {
            Some(group) => group,
            None => {
                let group = self.find_available_linking_group();
                self.set_window_linking_group(origin, Some(group))?;
                group
            }
        };
        self.set_window_role(origin, Role::Master)?;
        let child = self.open_window(module, title, Some(group), Some(Role::Child))?;
        if let Some(selection) = selection {
            self.publish(group, selection);
        }
        Ok(child)
    }

    // ---- saved views ------------------------------------------------------

    /// Saved views, favorites first, then by name.
    pub fn views(&self) -> Vec<&SavedView> {
        let mut views: Vec<&SavedView> = self.views.iter().collect();
        views.sort_by(|a, b| b.favorite.cmp(&a.favorite).then_with(|| a.name.cmp(&b.name)));
        views
    }

    pub fn view(&self, id: &ViewId) -> Option<&SavedView> {
        self.views.iter().find(|v| &v.id == id)
    }

    pub fn view_by_name(&self, name: &str) -> Option<&SavedView> {
        self.views.iter().find(|v| v.name == name)
    }

    /// First free `Layout N` name.
    pub fn next_view_name(&self) -> String {
        (1..)
            .map(|n| format!("Layout {n}"))
            .find(|name| self.view_by_name(name).is_none())
            .unwrap_or_else(|| "Layout".to_string())
    }

    fn next_view_id(&mut self) -> ViewId {
        loop {
            let id = ViewId::new(format!("view-{}", self.next_view_seq));
            self.next_view_seq += 1;
            if self.view(&id).is_none() {
                return id;
            }
        }
    }

    fn persist_views(&self) {
        if let Some(storage) = &self.view_storage
            && let Err(err) = storage.save(&self.views)
        {
            tracing::warn!(path = %storage.path().display(), error = %err, "failed to persist saved views");
        }
    }

    /// Snapshot the open windows under `name`. An existing view with the
    /// same name is overwritten in place.
    pub fn save_current_view(&mut self, name: &str) -> Result<SavedView, WmError> {
        if self.windows.is_empty() {
            return Err(WmError::EmptyView);
        }
        let mut ordered: Vec<&WindowRecord> = self.windows.iter().collect();
        ordered.sort_by_key(|w| w.creation_order);
        let descriptors: Vec<ViewDescriptor> = ordered
            .into_iter()
            .map(|w| ViewDescriptor {
                module: w.module.clone(),
                title: w.title.clone(),
                x: w.x,
                y: w.y,
                width: w.width,
                height: w.height,
                linking_group: w.linking_group,
            })
            .collect();

        let saved = if let Some(existing) = self.views.iter_mut().find(|v| v.name == name) {
            existing.windows = descriptors;
            existing.clone()
        } else {
            let view = SavedView {
                id: self.next_view_id(),
                name: name.to_string(),
                favorite: false,
                windows: descriptors,
            };
            self.views.push(view.clone());
            view
        };
        tracing::info!(view = %saved.id, name, windows = saved.windows.len(), "saved view");
        self.persist_views();
        self.emit(StoreEvent::ViewsChanged);
        Ok(saved)
    }

    /// Reopen the windows described by a saved view. Nothing already open is
    /// closed.
    pub fn load_view(&mut self, id: &ViewId) -> Result<LoadReport, WmError> {
        let view = self
            .view(id)
            .cloned()
            .ok_or_else(|| WmError::UnknownView(id.clone()))?;
        let mut report = LoadReport::default();
        for descriptor in view.windows {
            if !self.registry.contains(&descriptor.module) {
                tracing::warn!(view = %view.id, module = %descriptor.module, "skipping unknown module in saved view");
                report.skipped.push(descriptor.module);
                continue;
            }
            let rect = descriptor.rect();
            let rect = FloatRect {
                width: rect.width.max(1),
                height: rect.height.max(1),
                ..rect
            };
            let opened = self.insert_window(
                &descriptor.module,
                descriptor.title,
                rect,
                descriptor.linking_group,
                None,
            );
            report.opened.push(opened);
        }
        tracing::info!(view = %view.id, opened = report.opened.len(), skipped = report.skipped.len(), "loaded view");
        self.emit(StoreEvent::ViewLoaded(view.id));
        Ok(report)
    }

    /// Returns the new favorite flag.
    pub fn toggle_view_favorite(&mut self, id: &ViewId) -> Result<bool, WmError> {
        let view = self
            .views
            .iter_mut()
            .find(|v| &v.id == id)
            .ok_or_else(|| WmError::UnknownView(id.clone()))?;
        view.favorite = !view.favorite;
        let favorite = view.favorite;
        self.persist_views();
        self.emit(StoreEvent::ViewsChanged);
        Ok(favorite)
    }

    pub fn delete_view(&mut self, id: &ViewId) -> Result<SavedView, WmError> {
        let index = self
            .views
            .iter()
            .position(|v| &v.id == id)
            .ok_or_else(|| WmError::UnknownView(id.clone()))?;
        let removed = self.views.remove(index);
        tracing::info!(view = %removed.id, name = %removed.name, "deleted view");
        self.persist_views();
        self.emit(StoreEvent::ViewsChanged);
        Ok(removed)
    }

    // ---- module defaults --------------------------------------------------

    /// Store the window's current size as its module's default. The window's
    /// opened size is reset so it no longer counts as changed.
    pub fn save_module_defaults(&mut self, id: WindowId) -> Result<ModuleSize, WmError> {
        let record = self.window(id).ok_or(WmError::UnknownWindow(id))?;
        let size = ModuleSize {
            width: record.width,
            height: record.height,
        };
        let saved = self.defaults.save(&record.module, size)?;
        let record = self.window_mut(id)?;
        record.opened_width = saved.width;
        record.opened_height = saved.height;
        self.emit(StoreEvent::DefaultsSaved(id));
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::defaults::InMemoryModuleDefaults;
    use crate::modules::quotation_modules;

    fn area() -> Rect {
        Rect {
            x: 0,
            y: 1,
            width: 120,
            height: 40,
        }
    }

    fn store() -> WindowStore {
        WindowStore::new(
            Arc::new(quotation_modules()),
            Box::new(InMemoryModuleDefaults::new()),
            area(),
        )
    }

    #[test]
    fn new_windows_get_increasing_z_and_focus() {
        let mut store = store();
        let a = store.open_window("quotes", "Quotes", None, None).unwrap();
        let b = store.open_window("parts", "Parts", None, None).unwrap();
        assert!(store.window(b).unwrap().z_index > store.window(a).unwrap().z_index);
        assert_eq!(store.focused(), Some(b));
        store.bring_to_front(a).unwrap();
        assert_eq!(store.focused(), Some(a));
    }

    #[test]
    fn placement_avoids_existing_windows() {
        let mut store = store();
        let a = store.open_window("quotes", "Quotes", None, None).unwrap();
        let b = store.open_window("materials", "Materials", None, None).unwrap();
        let ra = store.window(a).unwrap().rect();
        let rb = store.window(b).unwrap().rect();
        assert_eq!((ra.x, ra.y), (0, 1));
        assert!(!rects_intersect(ra, rb));
        assert_eq!(rb.x, ra.right());
    }

    #[test]
    fn stored_defaults_override_registry_size() {
        let defaults = InMemoryModuleDefaults::new().with_size(
            "parts",
            ModuleSize {
                width: 70,
                height: 20,
            },
        );
        let mut store = WindowStore::new(Arc::new(quotation_modules()), Box::new(defaults), area());
        let id = store.open_window("parts", "Parts", None, None).unwrap();
        let rec = store.window(id).unwrap();
        assert_eq!((rec.width, rec.height), (70, 20));
        assert_eq!(rec.opened_size(), (70, 20));
    }

    #[test]
    fn unknown_module_is_rejected() {
        let mut store = store();
        let err = store.open_window("nope", "Nope", None, None).unwrap_err();
        assert!(matches!(err, WmError::UnknownModule(m) if m == "nope"));
        assert!(store.is_empty());
    }

    #[test]
    fn observers_see_every_mutation() {
        let mut store = store();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        store.subscribe(move |event| sink.borrow_mut().push(event.clone()));
        let before = store.revision();
        let id = store.open_window("quotes", "Quotes", None, None).unwrap();
        store.minimize_window(id).unwrap();
        store.restore_window(id).unwrap();
        assert_eq!(
            seen.borrow().as_slice(),
            &[
                StoreEvent::Opened(id),
                StoreEvent::Minimized(id),
                StoreEvent::Restored(id),
            ]
        );
        assert_eq!(store.revision(), before + 3);
    }

    #[test]
    fn bring_to_front_always_raises_z() {
        let mut store = store();
        let a = store.open_window("quotes", "Quotes", None, None).unwrap();
        let before = store.window(a).unwrap().z_index;
        store.bring_to_front(a).unwrap();
        assert!(store.window(a).unwrap().z_index > before);
    }

    #[test]
    fn bring_to_front_outranks_minimized_windows() {
        let mut store = store();
        let a = store.open_window("quotes", "Quotes", None, None).unwrap();
        let b = store.open_window("parts", "Parts", None, None).unwrap();
        store.minimize_window(b).unwrap();
        assert_eq!(store.focused(), Some(a));
        store.bring_to_front(a).unwrap();
        assert!(store.window(a).unwrap().z_index > store.window(b).unwrap().z_index);
        assert_eq!(store.windows_by_z().last().map(|w| w.id), Some(a));
    }

    #[test]
    fn demoting_the_only_master_promotes_the_oldest_member() {
        let mut store = store();
        let a = store
            .open_window("quotes", "Quotes", Some(LinkingGroup::Yellow), None)
            .unwrap();
        let b = store
            .open_window("parts", "Parts", Some(LinkingGroup::Yellow), None)
            .unwrap();
        store.set_window_role(a, Role::Child).unwrap();
        assert_eq!(store.window(a).unwrap().role, Role::Master);
        assert_eq!(store.window(b).unwrap().role, Role::Child);

        store.set_window_role(b, Role::Master).unwrap();
        store.set_window_role(b, Role::Child).unwrap();
        assert_eq!(store.window(a).unwrap().role, Role::Master);
        let listeners = store.report_selection(a, LinkingContext::new("7")).unwrap();
        assert_eq!(listeners, vec![a, b]);
    }

    #[test]
    fn master_close_promotes_oldest_member() {
        let mut store = store();
        let a = store
            .open_window("quotes", "Quotes", Some(LinkingGroup::Red), None)
            .unwrap();
        let b = store
            .open_window("parts", "Parts", Some(LinkingGroup::Red), None)
            .unwrap();
        let c = store
            .open_window("pricing", "Pricing", Some(LinkingGroup::Red), None)
            .unwrap();
        assert_eq!(store.window(a).unwrap().role, Role::Master);
        assert_eq!(store.window(b).unwrap().role, Role::Child);
        store.close_window(a);
        assert_eq!(store.window(b).unwrap().role, Role::Master);
        assert_eq!(store.window(c).unwrap().role, Role::Child);
    }

    #[test]
    fn explicit_master_demotes_previous_master() {
        let mut store = store();
        let a = store
            .open_window("quotes", "Quotes", Some(LinkingGroup::Blue), None)
            .unwrap();
        let b = store
            .open_window("parts", "Parts", Some(LinkingGroup::Blue), Some(Role::Master))
            .unwrap();
        assert_eq!(store.window(a).unwrap().role, Role::Child);
        assert_eq!(store.window(b).unwrap().role, Role::Master);
        store.set_window_role(a, Role::Master).unwrap();
        assert_eq!(store.window(b).unwrap().role, Role::Child);
    }

    #[test]
    fn child_selection_is_recorded_but_not_published() {
        let mut store = store();
        let a = store
            .open_window("quotes", "Quotes", Some(LinkingGroup::Green), None)
            .unwrap();
        let b = store
            .open_window("quotes", "Quotes", Some(LinkingGroup::Green), None)
            .unwrap();
        assert!(store.report_selection(b, LinkingContext::new("2")).unwrap().is_empty());
        assert!(store.context(LinkingGroup::Green).is_none());
        let listeners = store.report_selection(a, LinkingContext::new("1")).unwrap();
        assert_eq!(listeners, vec![a, b]);
        assert_eq!(store.context_for(b).map(|c| c.entity_id.as_str()), Some("1"));
    }

    #[test]
    fn saving_an_existing_name_replaces_that_view() {
        let mut store = store();
        store.open_window("quotes", "Quotes", None, None).unwrap();
        let first = store.save_current_view("Morning").unwrap();
        store.toggle_view_favorite(&first.id).unwrap();
        store.open_window("parts", "Parts", None, None).unwrap();
        let second = store.save_current_view("Morning").unwrap();
        assert_eq!(first.id, second.id);
        assert!(second.favorite);
        assert_eq!(second.windows.len(), 2);
        assert_eq!(store.views().len(), 1);
    }

    #[test]
    fn next_view_name_skips_taken_names() {
        let mut store = store();
        store.open_window("quotes", "Quotes", None, None).unwrap();
        assert_eq!(store.next_view_name(), "Layout 1");
        store.save_current_view("Layout 1").unwrap();
        assert_eq!(store.next_view_name(), "Layout 2");
    }

    #[test]
    fn geometry_change_respects_tolerance() {
        let mut store = store();
        let id = store.open_window("quotes", "Quotes", None, None).unwrap();
        let (w, h) = store.window(id).unwrap().opened_size();
        store
            .update_window_size(id, w + DEFAULTS_TOLERANCE, h)
            .unwrap();
        assert!(!store.geometry_changed(id));
        store
            .update_window_size(id, w + DEFAULTS_TOLERANCE + 1, h)
            .unwrap();
        assert!(store.geometry_changed(id));
        store.save_module_defaults(id).unwrap();
        assert!(!store.geometry_changed(id));
    }
}
