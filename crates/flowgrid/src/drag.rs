#![forbid(unsafe_code)]

//! Drag-sort engine.
//!
//! A [`DragSession`] follows one pointer gesture for one item. Each move
//! writes the item's live position directly (no animation), then, once the
//! pointer has travelled far enough, picks the most-overlapped neighbor from
//! a snapshot of the order and moves the dragged item to that neighbor's
//! index. The rest of the grid reflows through a layout that skips the
//! dragged item.
//!
//! ```text
//! Idle -> Dragging -> (Reordered)* -> Idle
//!             \---- force-cancel (remove / hide / send / destroy)
//! ```
//!
//! # Candidate selection
//!
//! 1. Largest intersection area between the live box and a neighbor's
//!    last target box.
//! 2. Equal areas: the neighbor whose center lies furthest along the
//!    movement direction.
//! 3. Then the neighbor closest in index to the dragged item.
//! 4. Then the lower index.
//!
//! The winner triggers a reorder only if its overlap covers at least
//! `threshold` of the smaller of the two boxes.
//!
//! # Invariants
//!
//! 1. At most one session per item.
//! 2. Identical successive candidates never mutate the order twice:
//!    after a reorder the neighbor's target moves away from the live box,
//!    and re-sorting against the same neighbor needs a direction change of
//!    at least `min_bounce_back_angle`.
//! 3. After reordering against a neighbor, the live box must leave that
//!    neighbor's target box before the two can swap back.
//! 4. No sort check runs within `sort_interval` of the last reorder.

use flowgrid_core::Instant;
use flowgrid_core::geometry::{Point, Rect};

use crate::config::SortAction;
use crate::error::GridError;
use crate::events::GridEvent;
use crate::grid::Grid;
use crate::host::{GestureEvent, Host};
use crate::item::{ItemFlags, ItemId};
use crate::scheduler::{LayoutReason, LayoutRequest};

/// Overlap areas closer than this are treated as equal.
const AREA_EPSILON: f64 = 1e-6;

/// Transient state of one active drag gesture.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    item: ItemId,
    start_index: usize,
    pointer_origin: Point,
    pointer: Point,
    element_origin: Point,
    last_check: Point,
    last_sorted_with: Option<ItemId>,
    last_sort_direction: Point,
    last_sort_at: Option<Instant>,
    /// Live box still overlaps the target of `last_sorted_with`.
    inside_last: bool,
    reorders: u32,
}

impl DragSession {
    fn new(item: ItemId, start_index: usize, pointer: Point, element_origin: Point) -> Self {
        Self {
            item,
            start_index,
            pointer_origin: pointer,
            pointer,
            element_origin,
            last_check: pointer,
            last_sorted_with: None,
            last_sort_direction: Point::ORIGIN,
            last_sort_at: None,
            inside_last: false,
            reorders: 0,
        }
    }

    pub fn item(&self) -> ItemId {
        self.item
    }

    /// Index of the item when the gesture started.
    pub fn start_index(&self) -> usize {
        self.start_index
    }

    pub fn pointer(&self) -> Point {
        self.pointer
    }

    /// Pointer travel since the gesture started.
    pub fn offset(&self) -> Point {
        self.pointer.delta_from(self.pointer_origin)
    }

    /// Where the element is drawn right now.
    pub fn live_position(&self) -> Point {
        self.element_origin.offset(self.offset())
    }

    /// Neighbor of the last reorder.
    pub fn last_sorted_with(&self) -> Option<ItemId> {
        self.last_sorted_with
    }

    pub fn reorders(&self) -> u32 {
        self.reorders
    }
}

/// Why a move did not reorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortHold {
    Disabled,
    BelowMinDistance,
    /// Less than `sort_interval` since the last reorder.
    Interval,
    NoCandidate,
    BelowThreshold,
    BounceBack,
}

/// Effect of one drag call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragOutcome {
    Started { index: usize },
    Moved { position: Point, hold: SortHold },
    Reordered { from: usize, to: usize, neighbor: ItemId },
    Released { index: usize },
    Cancelled { index: usize },
    /// No session for this item; nothing happened.
    Noop,
}

/// Neighbor box from the order snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub item: ItemId,
    pub index: usize,
    pub rect: Rect,
}

/// Winning neighbor of one sort check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub item: ItemId,
    pub index: usize,
    pub overlap: f64,
    /// Overlap as a fraction of the smaller of the two boxes.
    pub ratio: f64,
}

/// Pick the neighbor the dragged box should take the place of.
///
/// Returns `None` when no neighbor overlaps at all. The threshold is not
/// applied here; callers compare [`Candidate::ratio`].
pub fn find_candidate(
    dragged: &Rect,
    neighbors: &[Neighbor],
    direction: Point,
    current_index: usize,
) -> Option<Candidate> {
    let center = dragged.center();
    let mut best: Option<(Candidate, f64)> = None;
    for n in neighbors {
        let overlap = dragged.overlap_area(&n.rect);
        if overlap <= 0.0 {
            continue;
        }
        let min_area = dragged.area().min(n.rect.area());
        let ratio = if min_area > 0.0 { overlap / min_area } else { 0.0 };
        let heading = n.rect.center().delta_from(center).dot(direction);
        let candidate = Candidate {
            item: n.item,
            index: n.index,
            overlap,
            ratio,
        };
        let replace = match &best {
            None => true,
            Some((current, current_heading)) => {
                if (overlap - current.overlap).abs() > AREA_EPSILON {
                    overlap > current.overlap
                } else if (heading - current_heading).abs() > AREA_EPSILON {
                    heading > *current_heading
                } else {
                    let distance = n.index.abs_diff(current_index);
                    let current_distance = current.index.abs_diff(current_index);
                    if distance != current_distance {
                        distance < current_distance
                    } else {
                        n.index < current.index
                    }
                }
            }
        };
        if replace {
            best = Some((candidate, heading));
        }
    }
    best.map(|(candidate, _)| candidate)
}

impl<H: Host> Grid<H> {
    pub fn drag_session(&self, id: ItemId) -> Option<&DragSession> {
        self.drags.get(&id)
    }

    /// Feed one gesture event for `id`, observed now.
    pub fn handle_gesture(&mut self, id: ItemId, event: GestureEvent) -> Result<DragOutcome, GridError> {
        self.handle_gesture_at(id, event, Instant::now())
    }

    /// Feed one gesture event for `id` observed at `now`.
    pub fn handle_gesture_at(
        &mut self,
        id: ItemId,
        event: GestureEvent,
        now: Instant,
    ) -> Result<DragOutcome, GridError> {
        match event {
            GestureEvent::Start(pointer) => self.drag_start(id, pointer),
            GestureEvent::Move(delta) => self.drag_move_at(id, delta, now),
            GestureEvent::End => self.drag_end(id),
            GestureEvent::Cancel => self.drag_cancel(id),
        }
    }

    /// Begin dragging `id` with the pointer at `pointer`.
    ///
    /// Fails with [`GridError::ItemHidden`] unless the item is visible or
    /// showing, and with [`GridError::DragConflict`] if a session exists.
    pub fn drag_start(&mut self, id: ItemId, pointer: Point) -> Result<DragOutcome, GridError> {
        self.check_item(id)?;
        if self.drags.contains_key(&id) {
            return Err(GridError::DragConflict { item: id });
        }
        let index = self.index_of(id).ok_or(GridError::UnknownItem { item: id })?;
        let Some(item) = self.items.get_mut(&id) else {
            return Err(GridError::UnknownItem { item: id });
        };
        if !item.is_visible() {
            return Err(GridError::ItemHidden { item: id });
        }

        item.position.cancel();
        item.flags.remove(ItemFlags::POSITIONING | ItemFlags::RELEASING);
        item.flags.insert(ItemFlags::DRAGGING);
        let origin = item.current_position();
        self.drags
            .insert(id, DragSession::new(id, index, pointer, origin));

        tracing::debug!(target: "flowgrid.drag", grid = %self.id, item = %id, index, "drag started");
        self.emit(GridEvent::DragStart { grid: self.id, item: id });
        Ok(DragOutcome::Started { index })
    }

    /// Move the pointer by `delta` since the previous event, timestamped
    /// with the wall clock.
    pub fn drag_move(&mut self, id: ItemId, delta: Point) -> Result<DragOutcome, GridError> {
        self.drag_move_at(id, delta, Instant::now())
    }

    /// Move the pointer by `delta` since the previous event, observed at
    /// `now`. Hosts replaying recorded gestures pass the event timestamps.
    pub fn drag_move_at(&mut self, id: ItemId, delta: Point, now: Instant) -> Result<DragOutcome, GridError> {
        self.check_item(id)?;
        let Some(session) = self.drags.get_mut(&id) else {
            return Ok(DragOutcome::Noop);
        };
        session.pointer = session.pointer.offset(delta);
        let live = session.live_position();
        let movement = session.pointer.delta_from(session.last_check);

        if let Some(item) = self.items.get_mut(&id) {
            item.position.set_value(live);
            let element = item.element();
            self.host.set_transform(element, live.x, live.y);
        }
        self.emit(GridEvent::DragMove { grid: self.id, item: id });
        self.track_exit(id, live);

        let settings = self.config.drag_sort;
        if !settings.enabled {
            return Ok(DragOutcome::Moved { position: live, hold: SortHold::Disabled });
        }
        if movement.length() < settings.min_drag_distance {
            return Ok(DragOutcome::Moved {
                position: live,
                hold: SortHold::BelowMinDistance,
            });
        }
        let Some(session) = self.drags.get_mut(&id) else {
            return Ok(DragOutcome::Noop);
        };
        if let Some(at) = session.last_sort_at
            && now.saturating_duration_since(at) < settings.sort_interval
        {
            return Ok(DragOutcome::Moved {
                position: live,
                hold: SortHold::Interval,
            });
        }
        session.last_check = session.pointer;

        self.sort_check(id, live, movement, now)
    }

    /// Live box of the dragged item at `live`.
    fn dragged_rect(&self, id: ItemId, live: Point) -> Rect {
        let size = self.geometry.peek(id).map(|m| m.size()).unwrap_or_default();
        Rect::from_origin_size(live, size)
    }

    /// Clear the bounce-back latch once the live box no longer touches the
    /// last neighbor's target.
    fn track_exit(&mut self, id: ItemId, live: Point) {
        let Some(neighbor) = self
            .drags
            .get(&id)
            .filter(|session| session.inside_last)
            .and_then(|session| session.last_sorted_with)
        else {
            return;
        };
        let dragged = self.dragged_rect(id, live);
        let inside = self.items.get(&neighbor).is_some_and(|item| {
            item.is_active()
                && self.geometry.peek(neighbor).is_some_and(|measured| {
                    let target = Rect::from_origin_size(item.position(), measured.size());
                    dragged.overlap_area(&target) > 0.0
                })
        });
        if !inside && let Some(session) = self.drags.get_mut(&id) {
            session.inside_last = false;
            tracing::trace!(target: "flowgrid.drag", item = %id, neighbor = %neighbor, "left last neighbor");
        }
    }

    /// Overlap test against a snapshot of the order; reorders on success.
    fn sort_check(
        &mut self,
        id: ItemId,
        live: Point,
        direction: Point,
        now: Instant,
    ) -> Result<DragOutcome, GridError> {
        let held = |hold| Ok(DragOutcome::Moved { position: live, hold });
        let dragged = self.dragged_rect(id, live);
        let Some(current_index) = self.index_of(id) else {
            return Err(GridError::UnknownItem { item: id });
        };

        let neighbors: Vec<Neighbor> = self
            .order
            .iter()
            .enumerate()
            .filter(|&(_, &other)| other != id)
            .filter_map(|(index, &other)| {
                let item = self.items.get(&other)?;
                if !item.is_active() {
                    return None;
                }
                let size = self.geometry.peek(other)?.size();
                Some(Neighbor {
                    item: other,
                    index,
                    rect: Rect::from_origin_size(item.position(), size),
                })
            })
            .collect();

        let Some(candidate) = find_candidate(&dragged, &neighbors, direction, current_index) else {
            return held(SortHold::NoCandidate);
        };
        let settings = self.config.drag_sort;
        // NaN thresholds never pass.
        let passes = candidate.ratio >= settings.threshold;
        if !passes {
            return held(SortHold::BelowThreshold);
        }

        let bounced = self.drags.get(&id).is_some_and(|session| {
            session.last_sorted_with == Some(candidate.item)
                && (session.inside_last
                    || direction.angle_to(session.last_sort_direction) < settings.min_bounce_back_angle)
        });
        if bounced {
            tracing::debug!(
                target: "flowgrid.drag",
                item = %id,
                neighbor = %candidate.item,
                "bounce-back suppressed"
            );
            return held(SortHold::BounceBack);
        }

        let from = current_index;
        let to = candidate.index;
        match settings.action {
            SortAction::Move => {
                let moved = self.order.remove(from);
                self.order.insert(to, moved);
            }
            SortAction::Swap => self.order.swap(from, to),
        }
        if let Some(session) = self.drags.get_mut(&id) {
            session.last_sorted_with = Some(candidate.item);
            session.last_sort_direction = direction;
            session.last_sort_at = Some(now);
            session.inside_last = true;
            session.reorders += 1;
        }

        tracing::debug!(
            target: "flowgrid.drag",
            grid = %self.id,
            item = %id,
            from,
            to,
            neighbor = %candidate.item,
            ratio = candidate.ratio,
            "drag reorder"
        );
        self.emit(GridEvent::Move { grid: self.id, item: id });
        self.request_layout(LayoutRequest::new(LayoutReason::DragSort).skip(id))?;
        Ok(DragOutcome::Reordered {
            from,
            to,
            neighbor: candidate.item,
        })
    }

    /// Finish the gesture; the item animates from its live position to its
    /// packed slot.
    pub fn drag_end(&mut self, id: ItemId) -> Result<DragOutcome, GridError> {
        self.finish_drag(id, false)
    }

    /// Abort the gesture. The order keeps any reorders already applied and
    /// the item animates into its slot, exactly as on end.
    pub fn drag_cancel(&mut self, id: ItemId) -> Result<DragOutcome, GridError> {
        self.finish_drag(id, true)
    }

    fn finish_drag(&mut self, id: ItemId, cancelled: bool) -> Result<DragOutcome, GridError> {
        self.check_item(id)?;
        let Some(session) = self.drags.remove(&id) else {
            return Ok(DragOutcome::Noop);
        };
        if let Some(item) = self.items.get_mut(&id) {
            item.flags.remove(ItemFlags::DRAGGING);
            item.flags.insert(ItemFlags::RELEASING);
        }
        tracing::debug!(
            target: "flowgrid.drag",
            grid = %self.id,
            item = %id,
            cancelled,
            reorders = session.reorders,
            "drag finished"
        );
        self.emit(GridEvent::DragEnd { grid: self.id, item: id });
        self.request_layout(LayoutRequest::new(LayoutReason::DragRelease))?;

        let index = self.index_of(id).unwrap_or(session.start_index);
        Ok(if cancelled {
            DragOutcome::Cancelled { index }
        } else {
            DragOutcome::Released { index }
        })
    }

    /// Drop a session without any further order mutation or layout.
    pub(crate) fn force_cancel_drag(&mut self, id: ItemId) {
        if self.drags.remove(&id).is_none() {
            return;
        }
        if let Some(item) = self.items.get_mut(&id) {
            item.flags.remove(ItemFlags::DRAGGING);
        }
        tracing::debug!(target: "flowgrid.drag", grid = %self.id, item = %id, "drag force-cancelled");
        self.emit(GridEvent::DragEnd { grid: self.id, item: id });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn neighbor(raw: u64, index: usize, x: f64, y: f64) -> Neighbor {
        Neighbor {
            item: ItemId::from_raw(raw),
            index,
            rect: Rect::new(x, y, 100.0, 100.0),
        }
    }

    #[test]
    fn largest_overlap_wins() {
        let dragged = Rect::new(70.0, 0.0, 100.0, 100.0);
        let neighbors = [neighbor(1, 0, 0.0, 0.0), neighbor(2, 1, 100.0, 0.0)];
        let best = find_candidate(&dragged, &neighbors, Point::new(1.0, 0.0), 2).expect("overlap");
        assert_eq!(best.item, ItemId::from_raw(2));
        assert!((best.ratio - 0.7).abs() < 1e-9);
    }

    #[test]
    fn equal_overlap_prefers_movement_direction() {
        // Dragged box straddles two neighbors exactly halfway.
        let dragged = Rect::new(50.0, 0.0, 100.0, 100.0);
        let neighbors = [neighbor(1, 0, 0.0, 0.0), neighbor(2, 2, 100.0, 0.0)];

        let rightward = find_candidate(&dragged, &neighbors, Point::new(1.0, 0.0), 1).expect("overlap");
        assert_eq!(rightward.item, ItemId::from_raw(2));

        let leftward = find_candidate(&dragged, &neighbors, Point::new(-1.0, 0.0), 1).expect("overlap");
        assert_eq!(leftward.item, ItemId::from_raw(1));
    }

    #[test]
    fn equal_overlap_and_heading_prefers_index_proximity_then_lower_index() {
        let dragged = Rect::new(50.0, 0.0, 100.0, 100.0);
        let neighbors = [neighbor(1, 0, 0.0, 0.0), neighbor(2, 3, 100.0, 0.0)];
        // Vertical movement: both neighbors have the same heading.
        let down = Point::new(0.0, 1.0);
        let near_high = find_candidate(&dragged, &neighbors, down, 2).expect("overlap");
        assert_eq!(near_high.item, ItemId::from_raw(2));

        let tied = [neighbor(1, 1, 0.0, 0.0), neighbor(2, 3, 100.0, 0.0)];
        let lower = find_candidate(&dragged, &tied, down, 2).expect("overlap");
        assert_eq!(lower.item, ItemId::from_raw(1));
    }

    #[test]
    fn touching_edges_are_not_candidates() {
        let dragged = Rect::new(100.0, 0.0, 100.0, 100.0);
        let neighbors = [neighbor(1, 0, 0.0, 0.0)];
        assert!(find_candidate(&dragged, &neighbors, Point::new(1.0, 0.0), 1).is_none());
    }

    #[test]
    fn session_tracks_live_position() {
        let mut session = DragSession::new(
            ItemId::from_raw(1),
            0,
            Point::new(10.0, 10.0),
            Point::new(100.0, 0.0),
        );
        session.pointer = Point::new(30.0, 5.0);
        assert_eq!(session.offset(), Point::new(20.0, -5.0));
        assert_eq!(session.live_position(), Point::new(120.0, -5.0));
    }
}
