#![forbid(unsafe_code)]

//! Layout scheduling and per-frame animation driving.
//!
//! A layout request packs the current order synchronously and retargets
//! every participating item's position channel. Settling is observed on
//! frames: the first frame at which no position run is in flight delivers
//! `LayoutEnd` for the latest generation only.
//!
//! # Invariants
//!
//! 1. Generations are strictly increasing per grid.
//! 2. At most one generation is pending. A newer request replaces it, so
//!    superseded generations never produce `LayoutEnd`.
//! 3. Within one frame every channel is advanced before any style write, so
//!    no item is positioned from a half-updated sibling.
//!
//! # Failure Modes
//!
//! - A request on a destroyed grid fails with
//!   [`GridError::GridDestroyed`](crate::GridError::GridDestroyed) and
//!   changes nothing.
//! - Frames delivered after destruction are ignored.

use std::fmt;

use flowgrid_core::Instant;
use flowgrid_core::geometry::{ItemBox, Point, Size};
use flowgrid_layout::{PackItem, pack};

use crate::error::GridError;
use crate::events::GridEvent;
use crate::grid::Grid;
use crate::host::{ElementHandle, Host};
use crate::item::{ItemFlags, ItemId, PositionDone, VisibilityDone};

/// Monotonic identifier of one logical layout request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Generation(u64);

impl Generation {
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gen#{}", self.0)
    }
}

/// Why a layout was requested. Recorded in logs only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutReason {
    Explicit,
    ItemsAdded,
    ItemsRemoved,
    Visibility,
    Sort,
    DragSort,
    DragRelease,
    Resize,
    Transfer,
}

impl LayoutReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Explicit => "explicit",
            Self::ItemsAdded => "items_added",
            Self::ItemsRemoved => "items_removed",
            Self::Visibility => "visibility",
            Self::Sort => "sort",
            Self::DragSort => "drag_sort",
            Self::DragRelease => "drag_release",
            Self::Resize => "resize",
            Self::Transfer => "transfer",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutRequest {
    pub reason: LayoutReason,
    /// Items that get a new target but are neither re-measured nor animated.
    pub skip: Vec<ItemId>,
    /// Jump every item to its target instead of animating.
    pub instant: bool,
}

impl LayoutRequest {
    pub fn new(reason: LayoutReason) -> Self {
        Self {
            reason,
            skip: Vec::new(),
            instant: false,
        }
    }

    #[must_use]
    pub fn skip(mut self, item: ItemId) -> Self {
        self.skip.push(item);
        self
    }

    #[must_use]
    pub fn instant(mut self, instant: bool) -> Self {
        self.instant = instant;
        self
    }
}

/// One item's assignment in a [`LayoutResult`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutSlot {
    pub item: ItemId,
    pub position: Point,
    pub size: Size,
}

/// Immutable outcome of one pack.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutResult {
    pub generation: Generation,
    /// Participating items in order.
    pub slots: Vec<LayoutSlot>,
    pub container: Size,
}

impl LayoutResult {
    pub fn position_of(&self, item: ItemId) -> Option<Point> {
        self.slots
            .iter()
            .find(|slot| slot.item == item)
            .map(|slot| slot.position)
    }

    pub fn positions(&self) -> Vec<Point> {
        self.slots.iter().map(|slot| slot.position).collect()
    }
}

/// Generation bookkeeping for one grid.
#[derive(Debug, Default)]
pub struct LayoutScheduler {
    current: Generation,
    pending: Option<Generation>,
    last: Option<LayoutResult>,
}

impl LayoutScheduler {
    /// Latest generation handed out.
    pub fn current(&self) -> Generation {
        self.current
    }

    /// Generation waiting to settle, if any.
    pub fn pending(&self) -> Option<Generation> {
        self.pending
    }

    pub fn last_result(&self) -> Option<&LayoutResult> {
        self.last.as_ref()
    }

    /// Start a generation, superseding any pending one.
    pub(crate) fn begin(&mut self) -> (Generation, Option<Generation>) {
        self.current = Generation(self.current.0 + 1);
        let superseded = self.pending.replace(self.current);
        (self.current, superseded)
    }

    pub(crate) fn commit(&mut self, result: LayoutResult) {
        self.last = Some(result);
    }

    /// Retire the pending generation.
    pub(crate) fn settle(&mut self) -> Option<Generation> {
        self.pending.take()
    }

    pub(crate) fn cancel(&mut self) {
        self.pending = None;
    }
}

enum StyleWrite {
    Transform(ElementHandle, Point),
    Opacity(ElementHandle, f64),
}

enum Completion {
    Position(ItemId),
    Visibility(ItemId, VisibilityDone),
}

impl<H: Host> Grid<H> {
    /// Current layout generation.
    pub fn generation(&self) -> Generation {
        self.scheduler.current()
    }

    /// The last applied layout.
    pub fn layout_result(&self) -> Option<&LayoutResult> {
        self.scheduler.last_result()
    }

    /// Lay out with animation.
    pub fn layout(&mut self) -> Result<Generation, GridError> {
        self.request_layout(LayoutRequest::new(LayoutReason::Explicit))
    }

    /// Lay out, jumping every item to its target.
    pub fn layout_instant(&mut self) -> Result<Generation, GridError> {
        self.request_layout(LayoutRequest::new(LayoutReason::Explicit).instant(true))
    }

    /// Pack the current order and retarget every participating item.
    ///
    /// Only active items take part. Items in `request.skip` and dragged
    /// items keep their last-known size and are not animated; everything
    /// else is re-measured if stale. `LayoutEnd` for this generation is
    /// delivered by [`frame`](Self::frame) once nothing is positioning,
    /// unless a newer request supersedes it first.
    pub fn request_layout(&mut self, request: LayoutRequest) -> Result<Generation, GridError> {
        self.ensure_alive()?;
        let (generation, superseded) = self.scheduler.begin();
        let _span = tracing::debug_span!(
            "flowgrid.layout",
            grid = %self.id,
            generation = generation.get(),
            reason = request.reason.as_str(),
        )
        .entered();
        if let Some(stale) = superseded {
            tracing::debug!(
                target: "flowgrid.layout",
                stale = stale.get(),
                generation = generation.get(),
                "pending generation superseded"
            );
        }

        let container = self.geometry.container(&self.host);
        let participants: Vec<ItemId> = self
            .order
            .iter()
            .copied()
            .filter(|id| self.items.get(id).is_some_and(|item| item.is_active()))
            .collect();

        let mut boxes: Vec<ItemBox> = Vec::with_capacity(participants.len());
        for &id in &participants {
            let Some(item) = self.items.get(&id) else {
                continue;
            };
            let frozen = item.is_dragging() || request.skip.contains(&id);
            let measured = match self.geometry.peek(id) {
                Some(last) if frozen => last,
                _ => self.geometry.get_or_measure(id, item.element(), &self.host),
            };
            boxes.push(measured);
        }

        let options = self.config.layout.pack_options(container.padding);
        let extent = if options.horizontal {
            container.height
        } else {
            container.width
        };
        let pack_items: Vec<PackItem> = boxes.iter().copied().map(PackItem::from).collect();
        let packing = pack(&pack_items, extent, &options);

        let slots: Vec<LayoutSlot> = participants
            .iter()
            .zip(&packing.positions)
            .zip(&boxes)
            .map(|((&item, &position), measured)| LayoutSlot {
                item,
                position,
                size: measured.size(),
            })
            .collect();

        tracing::debug!(
            target: "flowgrid.layout",
            items = slots.len(),
            width = packing.container_width,
            height = packing.container_height,
            instant = request.instant,
            "packed"
        );

        for slot in &slots {
            let animate = !request.skip.contains(&slot.item);
            self.place_item(slot.item, slot.position, request.instant, animate);
        }

        self.host.set_container_size(packing.container_size());
        self.scheduler.commit(LayoutResult {
            generation,
            slots,
            container: packing.container_size(),
        });
        self.emit(GridEvent::LayoutStart { grid: self.id });
        self.request_frame();
        Ok(generation)
    }

    /// Record `target` for an item and start moving it there.
    fn place_item(&mut self, id: ItemId, target: Point, instant: bool, animate: bool) {
        let Some(item) = self.items.get_mut(&id) else {
            return;
        };
        item.target = target;
        item.placed = true;
        if item.is_dragging() || !animate {
            return;
        }

        let (duration, easing) = if item.is_releasing() {
            (
                self.config.drag_release_duration,
                self.config.drag_release_easing,
            )
        } else {
            (self.config.layout_duration, self.config.layout_easing)
        };

        if instant || duration.is_zero() || item.needs_placement {
            let value = item.position.jump(target);
            item.needs_placement = false;
            item.flags
                .remove(ItemFlags::POSITIONING | ItemFlags::RELEASING);
            self.host.set_transform(item.element(), value.x, value.y);
            return;
        }

        if item.position.target() == Some(target) {
            return;
        }
        if !item.position.is_running() && item.position.value() == target {
            item.flags.remove(ItemFlags::RELEASING);
            return;
        }
        item.position.start(target, duration, easing, PositionDone);
        item.flags.insert(ItemFlags::POSITIONING);
    }

    pub(crate) fn request_frame(&mut self) {
        if self.destroyed || self.frame.is_some() {
            return;
        }
        self.frame = Some(self.host.schedule_frame());
    }

    /// Whether any item has a run in flight or a layout is waiting to settle.
    pub fn is_animating(&self) -> bool {
        self.scheduler.pending().is_some()
            || self
                .items
                .values()
                .any(|item| item.position.is_running() || item.opacity.is_running())
    }

    /// Advance all animations to `now`. Called by the host when a scheduled
    /// frame fires.
    ///
    /// Reads every channel first, then applies all style writes, then
    /// handles completions and settling. Schedules another frame while
    /// anything is still in flight.
    pub fn frame(&mut self, now: Instant) {
        self.frame = None;
        if self.destroyed {
            return;
        }

        let mut writes = Vec::new();
        let mut completions = Vec::new();
        for &id in &self.order {
            let Some(item) = self.items.get_mut(&id) else {
                continue;
            };
            let element = item.element();
            if let Some(frame) = item.position.advance(now) {
                writes.push(StyleWrite::Transform(element, frame.value));
                if frame.completed.is_some() {
                    completions.push(Completion::Position(id));
                }
            }
            if let Some(frame) = item.opacity.advance(now) {
                writes.push(StyleWrite::Opacity(element, frame.value));
                if let Some(done) = frame.completed {
                    completions.push(Completion::Visibility(id, done));
                }
            }
        }

        for write in writes {
            match write {
                StyleWrite::Transform(element, at) => self.host.set_transform(element, at.x, at.y),
                StyleWrite::Opacity(element, opacity) => {
                    if self.capabilities.opacity {
                        self.host.set_opacity(element, opacity);
                    }
                }
            }
        }

        for completion in completions {
            self.complete(completion);
        }

        let positioning = self.items.values().any(|item| item.is_positioning());
        if !positioning && let Some(generation) = self.scheduler.settle() {
            tracing::debug!(
                target: "flowgrid.layout",
                grid = %self.id,
                generation = generation.get(),
                "layout settled"
            );
            self.emit(GridEvent::LayoutEnd { grid: self.id });
        }

        if self.is_animating() {
            self.request_frame();
        }
    }

    fn complete(&mut self, completion: Completion) {
        match completion {
            Completion::Position(id) => {
                if let Some(item) = self.items.get_mut(&id) {
                    item.flags
                        .remove(ItemFlags::POSITIONING | ItemFlags::RELEASING);
                }
            }
            Completion::Visibility(id, VisibilityDone::Shown) => {
                if let Some(item) = self.items.get_mut(&id) {
                    item.flags.remove(ItemFlags::SHOWING);
                    self.emit(GridEvent::Show { grid: self.id, item: id });
                }
            }
            Completion::Visibility(id, VisibilityDone::Hidden) => {
                let Some(item) = self.items.get_mut(&id) else {
                    return;
                };
                item.flags.remove(ItemFlags::HIDING);
                let element = item.element();
                self.host.set_visibility(element, false);
                self.emit(GridEvent::Hide { grid: self.id, item: id });
            }
        }
    }
}
