#![forbid(unsafe_code)]

//! Per-item snapshot of measured dimensions.
//!
//! The packer and the drag overlap test read item sizes from here instead of
//! measuring every time. Entries are refreshed on demand: a layout pass asks
//! for each participating item and only stale entries hit the
//! [`GeometryProvider`].
//!
//! # Invalidation
//!
//! Each entry is tagged with a generation. [`GeometryCache::invalidate_all`]
//! bumps the generation, making every entry stale in O(1).
//! [`GeometryCache::invalidate`] marks a single item.
//!
//! Stale entries are still readable through [`GeometryCache::peek`]; a
//! dragged item keeps its last-known size without being re-measured.

use flowgrid_core::geometry::{ContainerBox, ItemBox};
use rustc_hash::FxHashMap;

use crate::host::{ElementHandle, GeometryProvider};
use crate::item::ItemId;

#[derive(Debug, Clone, Copy)]
struct Entry {
    measured: ItemBox,
    generation: u64,
    dirty: bool,
}

/// Hit/miss counters.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GeometryCacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

#[derive(Debug, Default)]
pub struct GeometryCache {
    entries: FxHashMap<ItemId, Entry>,
    container: Option<ContainerBox>,
    generation: u64,
    rounding: bool,
    hits: u64,
    misses: u64,
}

impl GeometryCache {
    #[must_use]
    pub fn new(rounding: bool) -> Self {
        Self {
            rounding,
            ..Self::default()
        }
    }

    /// Toggle whole-pixel rounding. Invalidates everything when it changes.
    pub fn set_rounding(&mut self, rounding: bool) {
        if self.rounding != rounding {
            self.rounding = rounding;
            self.invalidate_all();
        }
    }

    fn normalize(&self, measured: ItemBox) -> ItemBox {
        let measured = measured.normalized();
        if self.rounding {
            measured.rounded()
        } else {
            measured
        }
    }

    fn is_fresh(&self, entry: &Entry) -> bool {
        !entry.dirty && entry.generation == self.generation
    }

    /// Cached box of `item`, measuring through `provider` if stale or absent.
    pub fn get_or_measure<P: GeometryProvider + ?Sized>(
        &mut self,
        item: ItemId,
        element: ElementHandle,
        provider: &P,
    ) -> ItemBox {
        if let Some(entry) = self.entries.get(&item)
            && self.is_fresh(entry)
        {
            self.hits += 1;
            return entry.measured;
        }
        self.misses += 1;
        self.refresh(item, element, provider)
    }

    /// Re-measure `item` unconditionally.
    pub fn refresh<P: GeometryProvider + ?Sized>(
        &mut self,
        item: ItemId,
        element: ElementHandle,
        provider: &P,
    ) -> ItemBox {
        let measured = self.normalize(provider.measure(element));
        self.entries.insert(
            item,
            Entry {
                measured,
                generation: self.generation,
                dirty: false,
            },
        );
        measured
    }

    /// Last-known box, fresh or not.
    #[must_use]
    pub fn peek(&self, item: ItemId) -> Option<ItemBox> {
        self.entries.get(&item).map(|e| e.measured)
    }

    #[must_use]
    pub fn is_stale(&self, item: ItemId) -> bool {
        self.entries.get(&item).is_none_or(|e| !self.is_fresh(e))
    }

    pub fn invalidate(&mut self, item: ItemId) {
        if let Some(entry) = self.entries.get_mut(&item) {
            entry.dirty = true;
        }
    }

    pub fn invalidate_all(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.container = None;
    }

    pub fn remove(&mut self, item: ItemId) -> Option<ItemBox> {
        self.entries.remove(&item).map(|e| e.measured)
    }

    /// Cached container box, measuring if needed.
    pub fn container<P: GeometryProvider + ?Sized>(&mut self, provider: &P) -> ContainerBox {
        match self.container {
            Some(container) => container,
            None => {
                let container = provider.measure_container().normalized();
                self.container = Some(container);
                container
            }
        }
    }

    pub fn invalidate_container(&mut self) {
        self.container = None;
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.container = None;
        self.generation = self.generation.wrapping_add(1);
    }

    #[must_use]
    pub fn stats(&self) -> GeometryCacheStats {
        GeometryCacheStats {
            entries: self.entries.len(),
            hits: self.hits,
            misses: self.misses,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use flowgrid_core::geometry::Sides;

    use super::*;

    struct Fixed {
        width: f64,
        calls: Cell<u32>,
    }

    impl GeometryProvider for Fixed {
        fn measure(&self, _element: ElementHandle) -> ItemBox {
            self.calls.set(self.calls.get() + 1);
            ItemBox::sized(self.width, 10.4)
        }

        fn measure_container(&self) -> ContainerBox {
            ContainerBox::new(300.0, 0.0, Sides::ZERO)
        }
    }

    fn provider(width: f64) -> Fixed {
        Fixed {
            width,
            calls: Cell::new(0),
        }
    }

    #[test]
    fn second_read_is_a_hit() {
        let p = provider(50.0);
        let mut cache = GeometryCache::new(false);
        let id = ItemId::from_raw(1);
        cache.get_or_measure(id, ElementHandle(1), &p);
        cache.get_or_measure(id, ElementHandle(1), &p);
        assert_eq!(p.calls.get(), 1);
        let stats = cache.stats();
        assert_eq!((stats.hits, stats.misses), (1, 1));
    }

    #[test]
    fn invalidation_forces_remeasure() {
        let p = provider(50.0);
        let mut cache = GeometryCache::new(false);
        let a = ItemId::from_raw(1);
        let b = ItemId::from_raw(2);
        cache.get_or_measure(a, ElementHandle(1), &p);
        cache.get_or_measure(b, ElementHandle(2), &p);

        cache.invalidate(a);
        assert!(cache.is_stale(a));
        assert!(!cache.is_stale(b));
        cache.get_or_measure(a, ElementHandle(1), &p);
        assert_eq!(p.calls.get(), 3);

        cache.invalidate_all();
        assert!(cache.is_stale(b));
        assert_eq!(cache.peek(b).map(|m| m.width), Some(50.0));
    }

    #[test]
    fn negative_sizes_are_normalized_and_rounding_applies() {
        let mut cache = GeometryCache::new(true);
        let measured = cache.get_or_measure(ItemId::from_raw(1), ElementHandle(1), &provider(-5.0));
        assert_eq!(measured.width, 0.0);
        assert_eq!(measured.height, 10.0);
    }

    #[test]
    fn container_is_cached_until_invalidated() {
        let p = provider(1.0);
        let mut cache = GeometryCache::new(false);
        assert_eq!(cache.container(&p).width, 300.0);
        cache.invalidate_container();
        assert_eq!(cache.container(&p).width, 300.0);
    }
}
