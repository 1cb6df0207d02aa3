#![forbid(unsafe_code)]

//! Collaborator contracts the grid depends on.
//!
//! The grid never touches a rendering surface. Everything it needs from the
//! outside world goes through these traits, bundled into [`Host`]:
//!
//! - [`GeometryProvider`]: measure elements and the container on demand.
//! - [`StyleApplier`]: fire-and-forget style writes.
//! - [`FrameScheduler`]: request a callback at display refresh cadence. When
//!   a scheduled frame fires the host calls [`Grid::frame`](crate::Grid::frame)
//!   with the frame timestamp.
//! - [`EventSink`]: receives [`GridEvent`] notifications.
//!
//! Gesture input arrives through [`Grid::handle_gesture`](crate::Grid::handle_gesture)
//! as [`GestureEvent`] values.

use std::fmt;

use flowgrid_core::geometry::{ContainerBox, ItemBox, Point, Size};

use crate::events::GridEvent;

/// Opaque reference to a host element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementHandle(pub u64);

impl fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "element#{}", self.0)
    }
}

/// Handle of a scheduled frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrameHandle(pub u64);

pub trait GeometryProvider {
    /// Current box of `element`, relative to the container.
    fn measure(&self, element: ElementHandle) -> ItemBox;

    /// Current container size (padding included) and padding.
    fn measure_container(&self) -> ContainerBox;
}

pub trait StyleApplier {
    fn set_transform(&mut self, element: ElementHandle, x: f64, y: f64);

    fn set_visibility(&mut self, element: ElementHandle, visible: bool);

    /// Intermediate opacity while a visibility animation runs.
    fn set_opacity(&mut self, _element: ElementHandle, _opacity: f64) {}

    /// Size the container to fit the packed items.
    fn set_container_size(&mut self, _size: Size) {}
}

pub trait FrameScheduler {
    fn schedule_frame(&mut self) -> FrameHandle;

    fn cancel_frame(&mut self, handle: FrameHandle);
}

pub trait EventSink {
    fn emit(&mut self, event: GridEvent);
}

/// Everything a [`Grid`](crate::Grid) needs from its environment.
pub trait Host: GeometryProvider + StyleApplier + FrameScheduler + EventSink {}

impl<T: GeometryProvider + StyleApplier + FrameScheduler + EventSink> Host for T {}

/// Environment capabilities, detected once by the host and injected at
/// grid construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Whether intermediate opacity values are rendered. Without it,
    /// show/hide transitions are applied instantly.
    pub opacity: bool,
}

impl Capabilities {
    pub const FULL: Self = Self { opacity: true };
    pub const MINIMAL: Self = Self { opacity: false };
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::FULL
    }
}

/// One event of a pointer gesture correlated to a single item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEvent {
    /// Pointer went down at this container-relative position.
    Start(Point),
    /// Pointer moved by this delta since the previous event.
    Move(Point),
    End,
    Cancel,
}
