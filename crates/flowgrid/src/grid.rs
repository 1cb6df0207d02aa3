#![forbid(unsafe_code)]

//! The grid: authoritative item order, lifecycle operations, and the
//! notification contract toward the host.
//!
//! Layout scheduling lives in [`crate::scheduler`], drag sorting in
//! [`crate::drag`], and sort-data ordering in [`crate::sort`]; all of them
//! extend [`Grid`] with further `impl` blocks.
//!
//! # Invariants
//!
//! 1. `order` holds every live item exactly once, and nothing else.
//! 2. An id is either live (in `items`), tombstoned, or unknown. Tombstoned
//!    ids fail with [`GridError::ItemDestroyed`].
//! 3. Every fallible operation validates all of its arguments before the
//!    first mutation.
//! 4. After [`Grid::destroy`], no collaborator is called again except by a
//!    second `destroy` (which is a no-op).

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use flowgrid_core::geometry::ItemBox;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::config::GridConfig;
use crate::drag::DragSession;
use crate::error::GridError;
use crate::events::GridEvent;
use crate::geometry_cache::GeometryCache;
use crate::host::{Capabilities, ElementHandle, FrameHandle, Host};
use crate::item::{Item, ItemFlags, ItemId, SortValue, VisibilityDone};
use crate::scheduler::{LayoutReason, LayoutRequest, LayoutScheduler};

static NEXT_GRID_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique grid identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GridId(u64);

impl GridId {
    pub(crate) fn next() -> Self {
        Self(NEXT_GRID_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for GridId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "grid#{}", self.0)
    }
}

pub(crate) type SortDataGetter = Box<dyn Fn(ElementHandle) -> SortValue>;

fn validated(config: &GridConfig) -> Result<(), GridError> {
    let errors = config.validate();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(GridError::InvalidConfig { errors })
    }
}

// ---------------------------------------------------------------------------
// Operation options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddOptions {
    /// Insert position in the order; appended when `None` or out of range.
    pub index: Option<usize>,
    /// Visible and laid out immediately. Inactive items start hidden.
    pub active: bool,
    pub layout: bool,
}

impl Default for AddOptions {
    fn default() -> Self {
        Self {
            index: None,
            active: true,
            layout: true,
        }
    }
}

impl AddOptions {
    #[must_use]
    pub fn at(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    #[must_use]
    pub fn active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    #[must_use]
    pub fn layout(mut self, layout: bool) -> Self {
        self.layout = layout;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoveOptions {
    pub layout: bool,
}

impl Default for RemoveOptions {
    fn default() -> Self {
        Self { layout: true }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibilityOptions {
    /// Skip the opacity transition and the layout animation.
    pub instant: bool,
    pub layout: bool,
}

impl Default for VisibilityOptions {
    fn default() -> Self {
        Self {
            instant: false,
            layout: true,
        }
    }
}

impl VisibilityOptions {
    #[must_use]
    pub fn instant() -> Self {
        Self {
            instant: true,
            layout: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendOptions {
    /// Insert position in the target order; appended when `None`.
    pub index: Option<usize>,
    pub layout_sender: bool,
    pub layout_receiver: bool,
}

impl Default for SendOptions {
    fn default() -> Self {
        Self {
            index: None,
            layout_sender: true,
            layout_receiver: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Grid
// ---------------------------------------------------------------------------

/// A container of items laid out by the packer.
///
/// Generic over the [`Host`] providing measurement, style writes, frame
/// scheduling, and event delivery. All mutation goes through `&mut self`,
/// so no operation can be re-entered while another is running.
pub struct Grid<H: Host> {
    pub(crate) id: GridId,
    pub(crate) host: H,
    pub(crate) config: GridConfig,
    pub(crate) capabilities: Capabilities,
    pub(crate) items: FxHashMap<ItemId, Item>,
    pub(crate) order: Vec<ItemId>,
    pub(crate) tombstones: FxHashSet<ItemId>,
    pub(crate) geometry: GeometryCache,
    pub(crate) scheduler: LayoutScheduler,
    pub(crate) drags: FxHashMap<ItemId, DragSession>,
    pub(crate) frame: Option<FrameHandle>,
    pub(crate) sort_getters: BTreeMap<String, SortDataGetter>,
    pub(crate) destroyed: bool,
}

impl<H: Host> fmt::Debug for Grid<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grid")
            .field("id", &self.id)
            .field("order", &self.order)
            .field("generation", &self.scheduler.current())
            .field("drags", &self.drags.len())
            .field("destroyed", &self.destroyed)
            .finish_non_exhaustive()
    }
}

impl<H: Host> Grid<H> {
    pub fn new(host: H, config: GridConfig) -> Self {
        Self::with_capabilities(host, config, Capabilities::default())
    }

    /// Like [`Grid::new`], but rejects a config that fails validation.
    pub fn try_new(host: H, config: GridConfig) -> Result<Self, GridError> {
        validated(&config)?;
        Ok(Self::new(host, config))
    }

    /// Construct without validating `config`; use [`Grid::try_new`] or
    /// [`GridConfig::validate`] for configs built from untrusted input.
    pub fn with_capabilities(host: H, config: GridConfig, capabilities: Capabilities) -> Self {
        let id = GridId::next();
        tracing::debug!(target: "flowgrid.item", grid = %id, "grid created");
        let errors = config.validate();
        if !errors.is_empty() {
            tracing::warn!(target: "flowgrid.item", grid = %id, ?errors, "grid created with invalid config");
        }
        Self {
            id,
            geometry: GeometryCache::new(config.layout.rounding),
            host,
            config,
            capabilities,
            items: FxHashMap::default(),
            order: Vec::new(),
            tombstones: FxHashSet::default(),
            scheduler: LayoutScheduler::default(),
            drags: FxHashMap::default(),
            frame: None,
            sort_getters: BTreeMap::new(),
            destroyed: false,
        }
    }

    #[inline]
    pub fn id(&self) -> GridId {
        self.id
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Replace the configuration. Takes effect on the next layout; running
    /// animations keep their original timing. An invalid config is rejected
    /// and the current one kept.
    pub fn set_config(&mut self, config: GridConfig) -> Result<(), GridError> {
        self.ensure_alive()?;
        validated(&config)?;
        self.geometry.set_rounding(config.layout.rounding);
        self.config = config;
        Ok(())
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    #[inline]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Items in authoritative order.
    pub fn items(&self) -> impl Iterator<Item = &Item> + '_ {
        self.order.iter().filter_map(|id| self.items.get(id))
    }

    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.get(&id)
    }

    /// The authoritative order.
    pub fn order(&self) -> &[ItemId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn index_of(&self, id: ItemId) -> Option<usize> {
        self.order.iter().position(|&other| other == id)
    }

    /// Last measured box of an item.
    pub fn dimensions(&self, id: ItemId) -> Option<ItemBox> {
        self.geometry.peek(id)
    }

    pub fn geometry_cache(&self) -> &GeometryCache {
        &self.geometry
    }

    // -----------------------------------------------------------------------
    // Validation helpers
    // -----------------------------------------------------------------------

    pub(crate) fn ensure_alive(&self) -> Result<(), GridError> {
        if self.destroyed {
            Err(GridError::GridDestroyed)
        } else {
            Ok(())
        }
    }

    pub(crate) fn check_item(&self, id: ItemId) -> Result<(), GridError> {
        self.ensure_alive()?;
        if self.tombstones.contains(&id) {
            return Err(GridError::ItemDestroyed { item: id });
        }
        if !self.items.contains_key(&id) {
            return Err(GridError::UnknownItem { item: id });
        }
        Ok(())
    }

    pub(crate) fn check_items(&self, ids: &[ItemId]) -> Result<(), GridError> {
        self.ensure_alive()?;
        ids.iter().try_for_each(|&id| self.check_item(id))
    }

    pub(crate) fn emit(&mut self, event: GridEvent) {
        tracing::trace!(target: "flowgrid.item", grid = %self.id, event = event.name(), "emit");
        self.host.emit(event);
    }

    // -----------------------------------------------------------------------
    // Add / remove
    // -----------------------------------------------------------------------

    /// Wrap `elements` in new items and insert them into the order.
    ///
    /// New items are placed instantly on their first layout.
    pub fn add_items(
        &mut self,
        elements: impl IntoIterator<Item = ElementHandle>,
        options: AddOptions,
    ) -> Result<Vec<ItemId>, GridError> {
        self.ensure_alive()?;
        let mut index = options
            .index
            .map_or(self.order.len(), |i| i.min(self.order.len()));
        let mut added = Vec::new();
        for element in elements {
            let id = ItemId::next();
            let mut item = Item::new(id, self.id, element, options.active);
            for (key, getter) in &self.sort_getters {
                item.sort_data.insert(key.clone(), getter(element));
            }
            self.host.set_visibility(element, options.active);
            if self.capabilities.opacity {
                self.host.set_opacity(element, item.opacity());
            }
            self.items.insert(id, item);
            self.order.insert(index, id);
            index += 1;
            added.push(id);
        }
        tracing::debug!(
            target: "flowgrid.item",
            grid = %self.id,
            count = added.len(),
            active = options.active,
            "items added"
        );
        for &id in &added {
            self.emit(GridEvent::Add { grid: self.id, item: id });
        }
        if options.layout && !added.is_empty() {
            self.request_layout(LayoutRequest::new(LayoutReason::ItemsAdded))?;
        }
        Ok(added)
    }

    /// Remove items from the grid and destroy them.
    ///
    /// A dragged item's session is force-cancelled first. Removed ids are
    /// remembered so later calls with them fail with
    /// [`GridError::ItemDestroyed`].
    pub fn remove_items(&mut self, ids: &[ItemId], options: RemoveOptions) -> Result<(), GridError> {
        self.check_items(ids)?;
        let mut removed = 0usize;
        for &id in ids {
            if self.tombstones.contains(&id) {
                continue;
            }
            self.force_cancel_drag(id);
            let Some(mut item) = self.detach(id) else {
                continue;
            };
            item.flags = ItemFlags::DESTROYED;
            self.tombstones.insert(id);
            removed += 1;
            self.emit(GridEvent::Remove { grid: self.id, item: id });
        }
        tracing::debug!(target: "flowgrid.item", grid = %self.id, count = removed, "items removed");
        if options.layout && removed > 0 {
            self.request_layout(LayoutRequest::new(LayoutReason::ItemsRemoved))?;
        }
        Ok(())
    }

    /// Destroy one item. Idempotent: destroying it again is a no-op.
    pub fn destroy_item(&mut self, id: ItemId) -> Result<(), GridError> {
        if self.tombstones.contains(&id) {
            return Ok(());
        }
        self.remove_items(&[id], RemoveOptions::default())
    }

    /// Take an item out of every structure, cancelling its animations.
    pub(crate) fn detach(&mut self, id: ItemId) -> Option<Item> {
        let mut item = self.items.remove(&id)?;
        item.cancel_animations();
        self.order.retain(|&other| other != id);
        self.geometry.remove(id);
        self.drags.remove(&id);
        Some(item)
    }

    // -----------------------------------------------------------------------
    // Visibility
    // -----------------------------------------------------------------------

    /// Show items. Items that are visible and not hiding are left alone.
    pub fn show_items(&mut self, ids: &[ItemId], options: VisibilityOptions) -> Result<(), GridError> {
        self.check_items(ids)?;
        let instant = options.instant
            || !self.capabilities.opacity
            || self.config.show_duration.is_zero();
        let mut changed = 0usize;
        for &id in ids {
            let Some(item) = self.items.get_mut(&id) else {
                continue;
            };
            if item.is_visible() && !item.is_hiding() {
                continue;
            }
            let was_hidden = !item.is_hiding();
            item.opacity.cancel();
            item.flags.remove(ItemFlags::HIDING);
            item.flags
                .insert(ItemFlags::ACTIVE | ItemFlags::VISIBLE | ItemFlags::SHOWING);
            if was_hidden {
                item.needs_placement = true;
            }
            let element = item.element();
            self.host.set_visibility(element, true);
            changed += 1;

            if instant {
                let opacity = item.opacity.jump(1.0);
                item.flags.remove(ItemFlags::SHOWING);
                if self.capabilities.opacity {
                    self.host.set_opacity(element, opacity);
                }
                self.emit(GridEvent::Show { grid: self.id, item: id });
            } else {
                item.opacity.start(
                    1.0,
                    self.config.show_duration,
                    self.config.show_easing,
                    VisibilityDone::Shown,
                );
            }
        }
        tracing::debug!(target: "flowgrid.item", grid = %self.id, count = changed, instant, "show");
        if changed > 0 {
            self.request_frame();
            if options.layout {
                self.request_layout(
                    LayoutRequest::new(LayoutReason::Visibility).instant(options.instant),
                )?;
            }
        }
        Ok(())
    }

    /// Hide items. They keep their slot in the order but stop taking part
    /// in layout and drag sorting. A dragged item's session is
    /// force-cancelled.
    pub fn hide_items(&mut self, ids: &[ItemId], options: VisibilityOptions) -> Result<(), GridError> {
        self.check_items(ids)?;
        let instant = options.instant
            || !self.capabilities.opacity
            || self.config.hide_duration.is_zero();
        let mut changed = 0usize;
        for &id in ids {
            if self.items.get(&id).is_none_or(|item| !item.is_visible()) {
                continue;
            }
            self.force_cancel_drag(id);
            let Some(item) = self.items.get_mut(&id) else {
                continue;
            };
            item.opacity.cancel();
            item.flags
                .remove(ItemFlags::ACTIVE | ItemFlags::VISIBLE | ItemFlags::SHOWING);
            item.flags.insert(ItemFlags::HIDING);
            let element = item.element();
            changed += 1;

            if instant {
                let opacity = item.opacity.jump(0.0);
                item.flags.remove(ItemFlags::HIDING);
                if self.capabilities.opacity {
                    self.host.set_opacity(element, opacity);
                }
                self.host.set_visibility(element, false);
                self.emit(GridEvent::Hide { grid: self.id, item: id });
            } else {
                item.opacity.start(
                    0.0,
                    self.config.hide_duration,
                    self.config.hide_easing,
                    VisibilityDone::Hidden,
                );
            }
        }
        tracing::debug!(target: "flowgrid.item", grid = %self.id, count = changed, instant, "hide");
        if changed > 0 {
            self.request_frame();
            if options.layout {
                self.request_layout(
                    LayoutRequest::new(LayoutReason::Visibility).instant(options.instant),
                )?;
            }
        }
        Ok(())
    }

    /// Show the items matching `predicate` and hide the rest, then lay out
    /// once.
    pub fn filter(
        &mut self,
        mut predicate: impl FnMut(&Item) -> bool,
        options: VisibilityOptions,
    ) -> Result<(), GridError> {
        self.ensure_alive()?;
        let mut show = Vec::new();
        let mut hide = Vec::new();
        for item in self.items() {
            if predicate(item) {
                show.push(item.id());
            } else {
                hide.push(item.id());
            }
        }
        let deferred = VisibilityOptions {
            layout: false,
            ..options
        };
        self.show_items(&show, deferred)?;
        self.hide_items(&hide, deferred)?;
        if options.layout {
            self.request_layout(LayoutRequest::new(LayoutReason::Visibility).instant(options.instant))?;
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Geometry
    // -----------------------------------------------------------------------

    /// Re-measure items synchronously; all items when `ids` is `None`.
    ///
    /// Hidden items are measured too, so their size is current when they
    /// are shown again.
    pub fn refresh_items(&mut self, ids: Option<&[ItemId]>) -> Result<(), GridError> {
        let targets: Vec<ItemId> = match ids {
            Some(ids) => {
                self.check_items(ids)?;
                ids.to_vec()
            }
            None => {
                self.ensure_alive()?;
                self.order.clone()
            }
        };
        for id in targets {
            if let Some(item) = self.items.get(&id) {
                self.geometry.refresh(id, item.element(), &self.host);
            }
        }
        Ok(())
    }

    /// Re-measure the container and lay out again.
    pub fn container_resized(&mut self) -> Result<(), GridError> {
        self.ensure_alive()?;
        self.geometry.invalidate_container();
        self.request_layout(LayoutRequest::new(LayoutReason::Resize))?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Hand-off
    // -----------------------------------------------------------------------

    /// Move an item into another grid.
    ///
    /// The item keeps its id and sort data. Its drag session and animations
    /// are cancelled; the receiving grid places it instantly on its next
    /// layout.
    pub fn send_item<T: Host>(
        &mut self,
        id: ItemId,
        target: &mut Grid<T>,
        options: SendOptions,
    ) -> Result<(), GridError> {
        self.check_item(id)?;
        target.ensure_alive()?;

        self.force_cancel_drag(id);
        let Some(mut item) = self.detach(id) else {
            return Err(GridError::UnknownItem { item: id });
        };
        tracing::debug!(
            target: "flowgrid.item",
            from = %self.id,
            to = %target.id,
            item = %id,
            "item sent"
        );
        self.emit(GridEvent::Send { grid: self.id, item: id });

        item.grid = target.id;
        item.needs_placement = true;
        if item.is_visible() {
            item.opacity.jump(1.0);
        } else {
            item.opacity.jump(0.0);
        }
        target.receive(item, options.index);

        if options.layout_sender {
            self.request_layout(LayoutRequest::new(LayoutReason::Transfer))?;
        }
        if options.layout_receiver {
            target.request_layout(LayoutRequest::new(LayoutReason::Transfer))?;
        }
        Ok(())
    }

    fn receive(&mut self, item: Item, index: Option<usize>) {
        let id = item.id();
        let element = item.element();
        let visible = item.is_visible();
        let index = index.map_or(self.order.len(), |i| i.min(self.order.len()));
        self.tombstones.remove(&id);
        self.items.insert(id, item);
        self.order.insert(index, id);
        self.host.set_visibility(element, visible);
        self.emit(GridEvent::Receive { grid: self.id, item: id });
    }

    // -----------------------------------------------------------------------
    // Teardown
    // -----------------------------------------------------------------------

    /// Destroy the grid and all of its items.
    ///
    /// Drag sessions are force-cancelled, every animation and the pending
    /// frame are cancelled, and a single `Destroy` event is emitted before
    /// returning. Calling it again is a no-op.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        let _span = tracing::debug_span!("flowgrid.destroy", grid = %self.id).entered();

        let dragged: Vec<ItemId> = self.drags.keys().copied().collect();
        for id in dragged {
            self.force_cancel_drag(id);
        }
        if let Some(handle) = self.frame.take() {
            self.host.cancel_frame(handle);
        }
        for (id, mut item) in self.items.drain() {
            item.cancel_animations();
            item.flags = ItemFlags::DESTROYED;
            self.tombstones.insert(id);
        }
        self.order.clear();
        self.geometry.clear();
        self.scheduler.cancel();
        self.destroyed = true;

        tracing::debug!(target: "flowgrid.item", grid = %self.id, "grid destroyed");
        self.host.emit(GridEvent::Destroy { grid: self.id });
    }

    // -----------------------------------------------------------------------
    // Sort data
    // -----------------------------------------------------------------------

    /// Register a getter producing the sort value `key` for an element.
    ///
    /// Existing items are not refreshed until
    /// [`refresh_sort_data`](Self::refresh_sort_data) runs; new items are
    /// populated when added.
    pub fn set_sort_data_getter(
        &mut self,
        key: impl Into<String>,
        getter: impl Fn(ElementHandle) -> SortValue + 'static,
    ) -> Result<(), GridError> {
        self.ensure_alive()?;
        self.sort_getters.insert(key.into(), Box::new(getter));
        Ok(())
    }

    /// Re-run every sort-data getter; all items when `ids` is `None`.
    pub fn refresh_sort_data(&mut self, ids: Option<&[ItemId]>) -> Result<(), GridError> {
        let targets: Vec<ItemId> = match ids {
            Some(ids) => {
                self.check_items(ids)?;
                ids.to_vec()
            }
            None => {
                self.ensure_alive()?;
                self.order.clone()
            }
        };
        for id in targets {
            if let Some(item) = self.items.get_mut(&id) {
                let element = item.element();
                for (key, getter) in &self.sort_getters {
                    item.sort_data.insert(key.clone(), getter(element));
                }
            }
        }
        Ok(())
    }
}
