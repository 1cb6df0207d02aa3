#![forbid(unsafe_code)]

//! Notifications emitted toward the host's [`EventSink`](crate::host::EventSink).
//!
//! Events carry only grid and item identity. Hosts that need more state
//! query the grid after receiving one.

use crate::grid::GridId;
use crate::item::ItemId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GridEvent {
    /// A layout generation was packed and its animations started.
    LayoutStart { grid: GridId },
    /// The latest layout generation has settled. Superseded generations
    /// never produce this event.
    LayoutEnd { grid: GridId },
    DragStart { grid: GridId, item: ItemId },
    DragMove { grid: GridId, item: ItemId },
    /// Drag session ended, was cancelled, or was force-cancelled.
    DragEnd { grid: GridId, item: ItemId },
    /// Show transition completed.
    Show { grid: GridId, item: ItemId },
    /// Hide transition completed.
    Hide { grid: GridId, item: ItemId },
    Destroy { grid: GridId },
    Add { grid: GridId, item: ItemId },
    Remove { grid: GridId, item: ItemId },
    /// Item changed index in the authoritative order.
    Move { grid: GridId, item: ItemId },
    /// Item left this grid for another one.
    Send { grid: GridId, item: ItemId },
    /// Item arrived from another grid.
    Receive { grid: GridId, item: ItemId },
}

impl GridEvent {
    #[must_use]
    pub const fn grid(&self) -> GridId {
        match *self {
            Self::LayoutStart { grid }
            | Self::LayoutEnd { grid }
            | Self::Destroy { grid }
            | Self::DragStart { grid, .. }
            | Self::DragMove { grid, .. }
            | Self::DragEnd { grid, .. }
            | Self::Show { grid, .. }
            | Self::Hide { grid, .. }
            | Self::Add { grid, .. }
            | Self::Remove { grid, .. }
            | Self::Move { grid, .. }
            | Self::Send { grid, .. }
            | Self::Receive { grid, .. } => grid,
        }
    }

    #[must_use]
    pub const fn item(&self) -> Option<ItemId> {
        match *self {
            Self::LayoutStart { .. } | Self::LayoutEnd { .. } | Self::Destroy { .. } => None,
            Self::DragStart { item, .. }
            | Self::DragMove { item, .. }
            | Self::DragEnd { item, .. }
            | Self::Show { item, .. }
            | Self::Hide { item, .. }
            | Self::Add { item, .. }
            | Self::Remove { item, .. }
            | Self::Move { item, .. }
            | Self::Send { item, .. }
            | Self::Receive { item, .. } => Some(item),
        }
    }

    /// Stable event name, e.g. for logging or host-side dispatch tables.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::LayoutStart { .. } => "layoutStart",
            Self::LayoutEnd { .. } => "layoutEnd",
            Self::DragStart { .. } => "dragStart",
            Self::DragMove { .. } => "dragMove",
            Self::DragEnd { .. } => "dragEnd",
            Self::Show { .. } => "show",
            Self::Hide { .. } => "hide",
            Self::Destroy { .. } => "destroy",
            Self::Add { .. } => "add",
            Self::Remove { .. } => "remove",
            Self::Move { .. } => "move",
            Self::Send { .. } => "send",
            Self::Receive { .. } => "receive",
        }
    }
}
