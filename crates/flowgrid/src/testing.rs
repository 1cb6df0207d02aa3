#![forbid(unsafe_code)]

//! In-memory [`Host`](crate::Host) for tests and headless hosts.
//!
//! [`RecordingHost`] answers measurements from a table of boxes and records
//! every style write, event, and frame request, so a test can drive a grid
//! with synthetic timestamps and assert on what a real renderer would have
//! seen.

use std::cell::Cell;
use std::time::Duration;

use flowgrid_core::Instant;
use flowgrid_core::geometry::{ContainerBox, ItemBox, Point, Sides, Size};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::events::GridEvent;
use crate::grid::Grid;
use crate::host::{ElementHandle, EventSink, FrameHandle, FrameScheduler, GeometryProvider, StyleApplier};

#[derive(Debug, Default)]
pub struct RecordingHost {
    boxes: FxHashMap<ElementHandle, ItemBox>,
    container: ContainerBox,
    /// Last transform written per element.
    pub transforms: FxHashMap<ElementHandle, Point>,
    /// Every transform write, in order.
    pub transform_log: Vec<(ElementHandle, Point)>,
    pub visibility: FxHashMap<ElementHandle, bool>,
    pub opacity: FxHashMap<ElementHandle, f64>,
    pub container_size: Option<Size>,
    pub events: Vec<GridEvent>,
    pending: FxHashSet<FrameHandle>,
    pub cancelled_frames: Vec<FrameHandle>,
    next_frame: u64,
    measure_calls: Cell<u64>,
}

impl RecordingHost {
    /// Host with a container of the given width (no padding).
    pub fn new(container_width: f64) -> Self {
        Self {
            container: ContainerBox::new(container_width, 0.0, Sides::ZERO),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_container(mut self, container: ContainerBox) -> Self {
        self.container = container;
        self
    }

    /// Register `count` elements of one size, returning their handles.
    pub fn with_elements(&mut self, count: usize, width: f64, height: f64) -> Vec<ElementHandle> {
        (0..count)
            .map(|_| {
                let handle = ElementHandle(self.boxes.len() as u64 + 1);
                self.boxes.insert(handle, ItemBox::sized(width, height));
                handle
            })
            .collect()
    }

    pub fn set_box(&mut self, element: ElementHandle, measured: ItemBox) {
        self.boxes.insert(element, measured);
    }

    pub fn set_container(&mut self, container: ContainerBox) {
        self.container = container;
    }

    pub fn take_events(&mut self) -> Vec<GridEvent> {
        std::mem::take(&mut self.events)
    }

    /// Events whose name matches `name`.
    pub fn count(&self, name: &str) -> usize {
        self.events.iter().filter(|e| e.name() == name).count()
    }

    pub fn has_pending_frame(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn measure_calls(&self) -> u64 {
        self.measure_calls.get()
    }

    /// Consume one pending frame request. Returns `false` if none is pending.
    pub fn fire_frame(&mut self) -> bool {
        let Some(&handle) = self.pending.iter().next() else {
            return false;
        };
        self.pending.remove(&handle);
        true
    }
}

impl GeometryProvider for RecordingHost {
    fn measure(&self, element: ElementHandle) -> ItemBox {
        self.measure_calls.set(self.measure_calls.get() + 1);
        self.boxes.get(&element).copied().unwrap_or_default()
    }

    fn measure_container(&self) -> ContainerBox {
        self.container
    }
}

impl StyleApplier for RecordingHost {
    fn set_transform(&mut self, element: ElementHandle, x: f64, y: f64) {
        let at = Point::new(x, y);
        self.transforms.insert(element, at);
        self.transform_log.push((element, at));
    }

    fn set_visibility(&mut self, element: ElementHandle, visible: bool) {
        self.visibility.insert(element, visible);
    }

    fn set_opacity(&mut self, element: ElementHandle, opacity: f64) {
        self.opacity.insert(element, opacity);
    }

    fn set_container_size(&mut self, size: Size) {
        self.container_size = Some(size);
    }
}

impl FrameScheduler for RecordingHost {
    fn schedule_frame(&mut self) -> FrameHandle {
        self.next_frame += 1;
        let handle = FrameHandle(self.next_frame);
        self.pending.insert(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        self.pending.remove(&handle);
        self.cancelled_frames.push(handle);
    }
}

impl EventSink for RecordingHost {
    fn emit(&mut self, event: GridEvent) {
        self.events.push(event);
    }
}

/// Fire pending frames every `step` starting at `start` until the grid
/// stops requesting them or `max_frames` is reached. Returns the timestamp
/// one step after the last frame delivered.
pub fn drive_until_idle(
    grid: &mut Grid<RecordingHost>,
    start: Instant,
    step: Duration,
    max_frames: usize,
) -> Instant {
    let mut now = start;
    for _ in 0..max_frames {
        if !grid.host_mut().fire_frame() {
            break;
        }
        grid.frame(now);
        now += step;
    }
    now
}
