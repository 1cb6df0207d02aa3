#![forbid(unsafe_code)]

//! Items: one visual element each, with lifecycle flags and animation
//! channels.
//!
//! # Lifecycle
//!
//! ```text
//! created -> positioning* <-> { visible, hidden }
//!                  \---------------------------> destroyed (from anywhere)
//! ```
//!
//! `showing`/`hiding` are transient sub-states that only exist while the
//! visibility channel has a run in flight. `active` means "participates in
//! layout": set when a show starts, cleared when a hide starts.
//!
//! # Invariants
//!
//! 1. An item never animates toward two targets: the position channel holds
//!    at most one run, and retargeting supersedes the old one.
//! 2. `DRAGGING` implies `ACTIVE`.
//! 3. `SHOWING` and `HIDING` are never both set.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use bitflags::bitflags;
use flowgrid_core::animation::AnimationChannel;
use flowgrid_core::geometry::Point;

use crate::grid::GridId;
use crate::host::ElementHandle;

static NEXT_ITEM_ID: AtomicU64 = AtomicU64::new(1);

/// Stable, process-unique item identity. Never reused, so an id survives a
/// hand-off between grids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemId(u64);

impl ItemId {
    pub(crate) fn next() -> Self {
        Self(NEXT_ITEM_ID.fetch_add(1, AtomicOrdering::Relaxed))
    }

    /// Wrap a raw value. Ids built this way are unknown to every grid unless
    /// they happen to match an allocated one.
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item#{}", self.0)
    }
}

bitflags! {
    /// Item state flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ItemFlags: u16 {
        const ACTIVE = 1 << 0;
        const VISIBLE = 1 << 1;
        const SHOWING = 1 << 2;
        const HIDING = 1 << 3;
        const POSITIONING = 1 << 4;
        const DRAGGING = 1 << 5;
        /// Animating from a drag release to its packed slot.
        const RELEASING = 1 << 6;
        const DESTROYED = 1 << 7;
    }
}

/// Coarse lifecycle state derived from the flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemState {
    /// Never positioned by a layout yet.
    Created,
    Visible,
    Hidden,
    Destroyed,
}

/// A comparable sort-data field.
#[derive(Debug, Clone, PartialEq)]
pub enum SortValue {
    Number(f64),
    Text(String),
}

impl SortValue {
    /// Total order: numbers (by `total_cmp`) before text (lexicographic).
    #[must_use]
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Number(_), Self::Text(_)) => Ordering::Less,
            (Self::Text(_), Self::Number(_)) => Ordering::Greater,
        }
    }
}

impl From<f64> for SortValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<&str> for SortValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for SortValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

/// Completion token of a position run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PositionDone;

/// Completion token of a visibility run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum VisibilityDone {
    Shown,
    Hidden,
}

pub struct Item {
    id: ItemId,
    pub(crate) grid: GridId,
    element: ElementHandle,
    pub(crate) flags: ItemFlags,
    /// Position assigned by the last layout that included this item.
    pub(crate) target: Point,
    pub(crate) position: AnimationChannel<Point, PositionDone>,
    pub(crate) opacity: AnimationChannel<f64, VisibilityDone>,
    pub(crate) sort_data: BTreeMap<String, SortValue>,
    /// Next layout places the item instantly (never shown, or re-shown from
    /// fully hidden, or just received from another grid).
    pub(crate) needs_placement: bool,
    pub(crate) placed: bool,
}

impl fmt::Debug for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Item")
            .field("id", &self.id)
            .field("element", &self.element)
            .field("flags", &self.flags)
            .field("target", &self.target)
            .field("position", &self.position.value())
            .finish_non_exhaustive()
    }
}

impl Item {
    pub(crate) fn new(id: ItemId, grid: GridId, element: ElementHandle, active: bool) -> Self {
        let flags = if active {
            ItemFlags::ACTIVE | ItemFlags::VISIBLE
        } else {
            ItemFlags::empty()
        };
        Self {
            id,
            grid,
            element,
            flags,
            target: Point::ORIGIN,
            position: AnimationChannel::new(Point::ORIGIN),
            opacity: AnimationChannel::new(if active { 1.0 } else { 0.0 }),
            sort_data: BTreeMap::new(),
            needs_placement: true,
            placed: false,
        }
    }

    #[inline]
    pub fn id(&self) -> ItemId {
        self.id
    }

    /// Identity of the owning grid.
    #[inline]
    pub fn grid_id(&self) -> GridId {
        self.grid
    }

    #[inline]
    pub fn element(&self) -> ElementHandle {
        self.element
    }

    #[inline]
    pub fn flags(&self) -> ItemFlags {
        self.flags
    }

    pub fn state(&self) -> ItemState {
        if self.flags.contains(ItemFlags::DESTROYED) {
            ItemState::Destroyed
        } else if !self.placed {
            ItemState::Created
        } else if self.flags.contains(ItemFlags::VISIBLE) {
            ItemState::Visible
        } else {
            ItemState::Hidden
        }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.flags.contains(ItemFlags::ACTIVE)
    }

    #[inline]
    pub fn is_visible(&self) -> bool {
        self.flags.contains(ItemFlags::VISIBLE)
    }

    #[inline]
    pub fn is_showing(&self) -> bool {
        self.flags.contains(ItemFlags::SHOWING)
    }

    #[inline]
    pub fn is_hiding(&self) -> bool {
        self.flags.contains(ItemFlags::HIDING)
    }

    #[inline]
    pub fn is_positioning(&self) -> bool {
        self.flags.contains(ItemFlags::POSITIONING)
    }

    #[inline]
    pub fn is_dragging(&self) -> bool {
        self.flags.contains(ItemFlags::DRAGGING)
    }

    #[inline]
    pub fn is_releasing(&self) -> bool {
        self.flags.contains(ItemFlags::RELEASING)
    }

    #[inline]
    pub fn is_destroyed(&self) -> bool {
        self.flags.contains(ItemFlags::DESTROYED)
    }

    /// Target position from the last layout.
    #[inline]
    pub fn position(&self) -> Point {
        self.target
    }

    /// Position most recently written to the element.
    #[inline]
    pub fn current_position(&self) -> Point {
        self.position.value()
    }

    /// Opacity most recently written to the element.
    #[inline]
    pub fn opacity(&self) -> f64 {
        self.opacity.value()
    }

    pub fn sort_value(&self, key: &str) -> Option<&SortValue> {
        self.sort_data.get(key)
    }

    /// Cancel both channels without yielding completions.
    pub(crate) fn cancel_animations(&mut self) {
        self.position.cancel();
        self.opacity.cancel();
        self.flags
            .remove(ItemFlags::POSITIONING | ItemFlags::RELEASING | ItemFlags::SHOWING | ItemFlags::HIDING);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_increasing() {
        let a = ItemId::next();
        let b = ItemId::next();
        assert!(b > a);
    }

    #[test]
    fn new_item_state_follows_activity() {
        let grid = GridId::next();
        let active = Item::new(ItemId::next(), grid, ElementHandle(1), true);
        let hidden = Item::new(ItemId::next(), grid, ElementHandle(2), false);
        assert!(active.is_visible() && active.is_active());
        assert_eq!(active.opacity(), 1.0);
        assert!(!hidden.is_visible() && !hidden.is_active());
        assert_eq!(hidden.opacity(), 0.0);
        assert_eq!(active.state(), ItemState::Created);
    }

    #[test]
    fn sort_values_order_numbers_before_text() {
        let mut values = vec![
            SortValue::from("b"),
            SortValue::from(3.0),
            SortValue::from("a"),
            SortValue::from(-1.0),
        ];
        values.sort_by(SortValue::total_cmp);
        assert_eq!(
            values,
            vec![
                SortValue::Number(-1.0),
                SortValue::Number(3.0),
                SortValue::Text("a".into()),
                SortValue::Text("b".into()),
            ]
        );
    }
}
