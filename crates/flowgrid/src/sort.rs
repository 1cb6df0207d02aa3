#![forbid(unsafe_code)]

//! Programmatic reordering: single moves and sorting by sort data.

use std::cmp::Ordering;

use crate::config::SortAction;
use crate::error::GridError;
use crate::events::GridEvent;
use crate::grid::Grid;
use crate::host::Host;
use crate::item::{Item, ItemId};
use crate::scheduler::{LayoutReason, LayoutRequest};

/// One sort criterion: a sort-data key and a direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub name: String,
    pub descending: bool,
}

impl SortKey {
    pub fn asc(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            descending: false,
        }
    }

    pub fn desc(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            descending: true,
        }
    }

    /// Compare two items on this key. Items without the key sort last in
    /// either direction.
    fn compare(&self, a: &Item, b: &Item) -> Ordering {
        match (a.sort_value(&self.name), b.sort_value(&self.name)) {
            (Some(x), Some(y)) => {
                let ord = x.total_cmp(y);
                if self.descending { ord.reverse() } else { ord }
            }
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

impl<H: Host> Grid<H> {
    /// Move `id` to `to` (clamped to the last index).
    pub fn move_item(
        &mut self,
        id: ItemId,
        to: usize,
        action: SortAction,
        layout: bool,
    ) -> Result<(), GridError> {
        self.check_item(id)?;
        let Some(from) = self.index_of(id) else {
            return Err(GridError::UnknownItem { item: id });
        };
        let to = to.min(self.order.len().saturating_sub(1));
        if from == to {
            return Ok(());
        }
        match action {
            SortAction::Move => {
                let moved = self.order.remove(from);
                self.order.insert(to, moved);
            }
            SortAction::Swap => self.order.swap(from, to),
        }
        tracing::debug!(target: "flowgrid.item", grid = %self.id, item = %id, from, to, "item moved");
        self.emit(GridEvent::Move { grid: self.id, item: id });
        if layout {
            self.request_layout(LayoutRequest::new(LayoutReason::Sort))?;
        }
        Ok(())
    }

    /// Stable sort by sort-data keys, earlier keys taking precedence.
    pub fn sort_by_keys(&mut self, keys: &[SortKey]) -> Result<(), GridError> {
        self.ensure_alive()?;
        self.sort_by(|a, b| {
            keys.iter()
                .map(|key| key.compare(a, b))
                .find(|ord| ord.is_ne())
                .unwrap_or(Ordering::Equal)
        })
    }

    /// Stable sort with a custom comparator, then lay out.
    pub fn sort_by(&mut self, mut compare: impl FnMut(&Item, &Item) -> Ordering) -> Result<(), GridError> {
        self.ensure_alive()?;
        let items = &self.items;
        let before = self.order.clone();
        self.order.sort_by(|a, b| match (items.get(a), items.get(b)) {
            (Some(a), Some(b)) => compare(a, b),
            _ => Ordering::Equal,
        });
        if self.order == before {
            return Ok(());
        }
        tracing::debug!(target: "flowgrid.item", grid = %self.id, items = self.order.len(), "sorted");
        self.request_layout(LayoutRequest::new(LayoutReason::Sort))?;
        Ok(())
    }
}
