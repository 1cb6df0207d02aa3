#![cfg_attr(not(test), forbid(unsafe_code))]
#![cfg_attr(test, deny(unsafe_code))]

//! Animated, drag-sortable grid layout.
//!
//! A [`Grid`] owns an ordered sequence of [`Item`]s, packs them into a
//! container with [`flowgrid_layout::pack`], and animates each element to
//! its slot through the host's frame callback. Dragging an item reorders
//! the sequence live while the rest of the grid reflows around it.
//!
//! The grid never touches a rendering surface. Measurement, style writes,
//! frame scheduling, and event delivery go through the [`Host`] traits.
//!
//! # Driving a grid
//!
//! ```
//! use std::time::Duration;
//! use flowgrid::testing::{drive_until_idle, RecordingHost};
//! use flowgrid::{AddOptions, Grid, GridConfig, Instant, Point};
//!
//! let mut host = RecordingHost::new(300.0);
//! let elements = host.with_elements(3, 100.0, 100.0);
//! let mut grid = Grid::new(host, GridConfig::default());
//! let ids = grid.add_items(elements, AddOptions::default()).unwrap();
//! drive_until_idle(&mut grid, Instant::now(), Duration::from_millis(16), 100);
//!
//! assert_eq!(grid.item(ids[2]).unwrap().position(), Point::new(200.0, 0.0));
//! assert_eq!(grid.host().count("layoutEnd"), 1);
//! ```

pub mod config;
pub mod drag;
pub mod error;
pub mod events;
pub mod geometry_cache;
pub mod grid;
pub mod host;
pub mod item;
pub mod scheduler;
pub mod sort;
pub mod testing;

pub use config::{ConfigError, DragSortConfig, GridConfig, LayoutConfig, SortAction};
pub use drag::{DragOutcome, DragSession, SortHold};
pub use error::{ErrorKind, GridError};
pub use events::GridEvent;
pub use flowgrid_core::animation::Easing;
pub use flowgrid_core::geometry::{ContainerBox, ItemBox, Point, Rect, Sides, Size};
pub use flowgrid_core::Instant;
pub use flowgrid_layout::FillStrategy;
pub use grid::{AddOptions, Grid, GridId, RemoveOptions, SendOptions, VisibilityOptions};
pub use host::{
    Capabilities, ElementHandle, EventSink, FrameHandle, FrameScheduler, GeometryProvider,
    GestureEvent, Host, StyleApplier,
};
pub use item::{Item, ItemFlags, ItemId, ItemState, SortValue};
pub use scheduler::{Generation, LayoutReason, LayoutRequest, LayoutResult, LayoutSlot};
pub use sort::SortKey;
