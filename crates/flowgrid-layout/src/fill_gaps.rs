#![forbid(unsafe_code)]

//! Fill-gaps strategy: first-fit bin packing over maximal free rectangles.
//!
//! The free list starts as one rectangle spanning the container width with
//! unbounded height. Placing a slot splits every free rectangle it touches
//! into the (up to four) maximal pieces around it; pieces contained in
//! another free rectangle are dropped. The list stays sorted top to bottom,
//! then left to right, so "first fit" is also "top-left-most fit".
//!
//! # Invariants
//!
//! 1. Free rectangles never intersect a placed slot.
//! 2. A full-width rectangle below every placed slot always exists, so every
//!    slot no wider than the container finds a home.
//! 3. Ties between equally good rectangles resolve to the earliest one in
//!    scan order; items are placed in input order.

use std::cmp::Ordering;

use crate::{EPSILON, FlowPacking, Point, Rect, Slot};

pub(crate) fn pack(slots: &[Slot], cross: f64, gutter: f64) -> FlowPacking {
    let mut free = vec![Rect::new(0.0, 0.0, cross + gutter, f64::INFINITY)];
    let mut origins = Vec::with_capacity(slots.len());
    let mut bottom = 0.0f64;

    for slot in slots {
        if slot.void {
            let origin = free.first().map_or(Point::ORIGIN, Rect::origin);
            origins.push(Point::new(origin.x.min(cross), origin.y));
            continue;
        }

        let origin = free
            .iter()
            .find(|r| slot.width <= r.width + EPSILON && slot.height <= r.height + EPSILON)
            .map_or(Point::new(0.0, bottom), Rect::origin);
        let placed = Rect::new(origin.x, origin.y, slot.width, slot.height);
        origins.push(origin);
        bottom = bottom.max(placed.bottom());

        free = split_free(&free, &placed);
    }

    FlowPacking { origins, bottom }
}

/// Carve `placed` out of every free rectangle and normalize the list.
fn split_free(free: &[Rect], placed: &Rect) -> Vec<Rect> {
    let mut next = Vec::with_capacity(free.len() + 4);
    for rect in free {
        if rect.intersection(placed).is_none() {
            next.push(*rect);
            continue;
        }
        if placed.x > rect.x {
            next.push(Rect::new(rect.x, rect.y, placed.x - rect.x, rect.height));
        }
        if placed.right() < rect.right() {
            next.push(Rect::new(
                placed.right(),
                rect.y,
                rect.right() - placed.right(),
                rect.height,
            ));
        }
        if placed.y > rect.y {
            next.push(Rect::new(rect.x, rect.y, rect.width, placed.y - rect.y));
        }
        if placed.bottom() < rect.bottom() {
            next.push(Rect::new(
                rect.x,
                placed.bottom(),
                rect.width,
                rect.bottom() - placed.bottom(),
            ));
        }
    }

    next.retain(|r| r.width > EPSILON && r.height > EPSILON);
    prune_contained(&mut next);
    next.sort_by(scan_order);
    next
}

/// Drop rectangles fully covered by another one. Of two identical
/// rectangles the first is kept.
fn prune_contained(rects: &mut Vec<Rect>) {
    let snapshot = rects.clone();
    let mut index = 0;
    rects.retain(|r| {
        let i = index;
        index += 1;
        !snapshot
            .iter()
            .enumerate()
            .any(|(j, other)| j != i && other.contains_rect(r) && (other != r || j < i))
    });
}

fn scan_order(a: &Rect, b: &Rect) -> Ordering {
    a.y.total_cmp(&b.y).then(a.x.total_cmp(&b.x))
}
