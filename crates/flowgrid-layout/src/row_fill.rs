#![forbid(unsafe_code)]

//! Row-fill strategy: shelf packing in input order.

use crate::{EPSILON, FlowPacking, Point, Slot};

/// Place `slots` left to right, wrapping when the next slot would cross
/// `cross + gutter` (the trailing gutter of the last column is allowed to
/// hang past the container edge).
pub(crate) fn pack(slots: &[Slot], cross: f64, gutter: f64) -> FlowPacking {
    let extent = cross + gutter;
    let mut origins = Vec::with_capacity(slots.len());
    let mut x = 0.0f64;
    let mut y = 0.0f64;
    let mut row_height = 0.0f64;
    let mut bottom = 0.0f64;

    for slot in slots {
        if slot.void {
            origins.push(Point::new(x.min(cross), y));
            continue;
        }
        if x > 0.0 && x + slot.width > extent + EPSILON {
            y += row_height;
            x = 0.0;
            row_height = 0.0;
        }
        origins.push(Point::new(x, y));
        x += slot.width;
        row_height = row_height.max(slot.height);
        bottom = bottom.max(y + slot.height);
    }

    FlowPacking { origins, bottom }
}
