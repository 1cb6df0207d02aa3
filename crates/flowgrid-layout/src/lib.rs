#![forbid(unsafe_code)]

//! Rectangle packers.
//!
//! [`pack`] maps an ordered sequence of item dimensions plus a container
//! extent to an ordered sequence of target positions and the resulting
//! container size. It is pure and deterministic: the same input always
//! yields the same output, and no state survives between calls.
//!
//! # Strategies
//!
//! - [`FillStrategy::RowFill`]: items flow left to right, wrapping to a new
//!   row when the next item would cross the container edge. Each item keeps
//!   its own width; a row is as tall as its tallest item.
//! - [`FillStrategy::FillGaps`]: items are placed into the first free
//!   rectangle (scanning top to bottom, then left to right) that can hold
//!   them, so small items backfill holes left by larger neighbors.
//!
//! # Frames
//!
//! Both strategies work in a vertical "flow frame": a fixed cross extent
//! (the container width) and an unbounded main axis growing downward.
//! Horizontal packing transposes the input, packs, and transposes back.
//! Mirroring for right/bottom alignment happens after that.
//!
//! # Failure Modes
//!
//! - Negative or non-finite dimensions are normalized to zero.
//! - An item wider than the container is clamped to the container width
//!   for placement only; its reported size is unchanged.
//! - Zero-sized items are positioned at the current insertion point but
//!   consume no space.

mod fill_gaps;
mod row_fill;

pub use flowgrid_core::geometry::{ItemBox, Point, Rect, Sides, Size};
use serde::{Deserialize, Serialize};

/// Tolerance for float comparisons when testing fit.
pub(crate) const EPSILON: f64 = 1e-6;

/// How free space is filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillStrategy {
    /// Flow in rows, wrapping at the container edge.
    #[default]
    RowFill,
    /// Bin-pack into the first free rectangle that fits.
    FillGaps,
}

/// Dimensions of one item as seen by the packer.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PackItem {
    pub width: f64,
    pub height: f64,
    pub margin: Sides,
}

impl PackItem {
    pub const fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            margin: Sides::ZERO,
        }
    }

    #[must_use]
    pub const fn with_margin(mut self, margin: Sides) -> Self {
        self.margin = margin;
        self
    }

    fn normalized(self) -> Self {
        let b = ItemBox::new(0.0, 0.0, self.width, self.height, self.margin).normalized();
        Self {
            width: b.width,
            height: b.height,
            margin: b.margin,
        }
    }

    fn transpose(self) -> Self {
        Self {
            width: self.height,
            height: self.width,
            margin: self.margin.transpose(),
        }
    }

    fn is_void(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

impl From<ItemBox> for PackItem {
    fn from(b: ItemBox) -> Self {
        Self {
            width: b.width,
            height: b.height,
            margin: b.margin,
        }
    }
}

/// Packer configuration.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PackOptions {
    pub strategy: FillStrategy,
    /// Fixed container height, flow in columns.
    pub horizontal: bool,
    pub align_right: bool,
    pub align_bottom: bool,
    /// Horizontal spacing between adjacent items.
    pub gutter_x: f64,
    /// Vertical spacing between adjacent items.
    pub gutter_y: f64,
    /// Container padding; offsets every position and is included in the
    /// reported size.
    pub padding: Sides,
}

impl PackOptions {
    pub fn new(strategy: FillStrategy) -> Self {
        Self {
            strategy,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn horizontal(mut self, horizontal: bool) -> Self {
        self.horizontal = horizontal;
        self
    }

    #[must_use]
    pub fn align_right(mut self, align_right: bool) -> Self {
        self.align_right = align_right;
        self
    }

    #[must_use]
    pub fn align_bottom(mut self, align_bottom: bool) -> Self {
        self.align_bottom = align_bottom;
        self
    }

    #[must_use]
    pub fn gutter(mut self, x: f64, y: f64) -> Self {
        self.gutter_x = x;
        self.gutter_y = y;
        self
    }

    #[must_use]
    pub fn padding(mut self, padding: Sides) -> Self {
        self.padding = padding;
        self
    }
}

/// Result of one [`pack`] call.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Packing {
    /// Element top-left positions, in input order.
    pub positions: Vec<Point>,
    /// Container width including padding.
    pub container_width: f64,
    /// Container height including padding.
    pub container_height: f64,
}

impl Packing {
    #[must_use]
    pub fn container_size(&self) -> Size {
        Size::new(self.container_width, self.container_height)
    }
}

/// Slot size in the flow frame (outer size plus trailing gutter).
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Slot {
    pub width: f64,
    pub height: f64,
    pub void: bool,
}

/// Output of a strategy in the flow frame.
#[derive(Debug, Clone, Default)]
pub(crate) struct FlowPacking {
    /// Margin-box origin of each slot.
    pub origins: Vec<Point>,
    /// Bottom of the lowest slot, gutter included.
    pub bottom: f64,
}

/// Pack `items` into a container.
///
/// `container_extent` is the container's fixed dimension including padding:
/// its width for vertical packing, its height when
/// [`PackOptions::horizontal`] is set.
#[must_use]
pub fn pack(items: &[PackItem], container_extent: f64, options: &PackOptions) -> Packing {
    let padding = options.padding.normalized();
    let gutter_x = flowgrid_core::geometry::normalize_length(options.gutter_x);
    let gutter_y = flowgrid_core::geometry::normalize_length(options.gutter_y);
    let container_extent = flowgrid_core::geometry::normalize_length(container_extent);

    // Flow-frame parameters: `cross` is the fixed extent, gutters follow the axes.
    let (cross, gutter_cross, gutter_main) = if options.horizontal {
        (
            (container_extent - padding.vertical_sum()).max(0.0),
            gutter_y,
            gutter_x,
        )
    } else {
        (
            (container_extent - padding.horizontal_sum()).max(0.0),
            gutter_x,
            gutter_y,
        )
    };

    let flow_items: Vec<PackItem> = items
        .iter()
        .map(|item| {
            let item = item.normalized();
            if options.horizontal {
                item.transpose()
            } else {
                item
            }
        })
        .collect();

    let slots: Vec<Slot> = flow_items
        .iter()
        .map(|item| {
            if item.is_void() {
                return Slot {
                    width: 0.0,
                    height: 0.0,
                    void: true,
                };
            }
            let outer_w = (item.width + item.margin.horizontal_sum()).min(cross);
            let outer_h = item.height + item.margin.vertical_sum();
            Slot {
                width: outer_w + gutter_cross,
                height: outer_h + gutter_main,
                void: false,
            }
        })
        .collect();

    let flow = match options.strategy {
        FillStrategy::RowFill => row_fill::pack(&slots, cross, gutter_cross),
        FillStrategy::FillGaps => fill_gaps::pack(&slots, cross, gutter_cross),
    };

    let main_extent = if slots.iter().any(|s| !s.void) {
        (flow.bottom - gutter_main).max(0.0)
    } else {
        0.0
    };

    // Back to the output frame.
    let (inner_width, inner_height) = if options.horizontal {
        (main_extent, cross)
    } else {
        (cross, main_extent)
    };

    let positions = flow
        .origins
        .iter()
        .zip(slots.iter())
        .zip(flow_items.iter())
        .map(|((origin, slot), item)| {
            let flow_rect = Rect::new(
                origin.x,
                origin.y,
                (slot.width - gutter_cross).max(0.0),
                (slot.height - gutter_main).max(0.0),
            );
            let (mut rect, margin) = if options.horizontal {
                (flow_rect.transpose(), item.margin.transpose())
            } else {
                (flow_rect, item.margin)
            };
            if options.align_right {
                rect.x = inner_width - rect.x - rect.width;
            }
            if options.align_bottom {
                rect.y = inner_height - rect.y - rect.height;
            }
            Point::new(
                padding.left + rect.x + margin.left,
                padding.top + rect.y + margin.top,
            )
        })
        .collect();

    Packing {
        positions,
        container_width: inner_width + padding.horizontal_sum(),
        container_height: inner_height + padding.vertical_sum(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn squares(n: usize, side: f64) -> Vec<PackItem> {
        (0..n).map(|_| PackItem::new(side, side)).collect()
    }

    #[test]
    fn three_squares_fill_one_row() {
        let out = pack(
            &squares(3, 100.0),
            300.0,
            &PackOptions::new(FillStrategy::RowFill),
        );
        assert_eq!(
            out.positions,
            vec![
                Point::new(0.0, 0.0),
                Point::new(100.0, 0.0),
                Point::new(200.0, 0.0)
            ]
        );
        assert_eq!(out.container_height, 100.0);
        assert_eq!(out.container_width, 300.0);
    }

    #[test]
    fn empty_input_yields_padding_only() {
        let opts = PackOptions::new(FillStrategy::FillGaps).padding(Sides::new(5.0, 6.0, 7.0, 8.0));
        let out = pack(&[], 300.0, &opts);
        assert!(out.positions.is_empty());
        assert_eq!(out.container_height, 12.0);
        assert_eq!(out.container_width, 300.0);
    }

    #[test]
    fn padding_and_margins_offset_positions() {
        let opts = PackOptions::new(FillStrategy::RowFill).padding(Sides::all(10.0));
        let items = [
            PackItem::new(50.0, 50.0).with_margin(Sides::new(1.0, 2.0, 3.0, 4.0)),
            PackItem::new(50.0, 50.0),
        ];
        let out = pack(&items, 220.0, &opts);
        assert_eq!(out.positions[0], Point::new(14.0, 11.0));
        assert_eq!(out.positions[1], Point::new(66.0, 10.0));
        assert_eq!(out.container_height, 74.0);
    }

    #[test]
    fn gutters_separate_items_but_do_not_trail() {
        let opts = PackOptions::new(FillStrategy::RowFill).gutter(10.0, 20.0);
        let out = pack(&squares(4, 100.0), 320.0, &opts);
        assert_eq!(
            out.positions,
            vec![
                Point::new(0.0, 0.0),
                Point::new(110.0, 0.0),
                Point::new(220.0, 0.0),
                Point::new(0.0, 120.0),
            ]
        );
        assert_eq!(out.container_height, 220.0);
    }

    #[test]
    fn oversized_item_is_clamped_for_placement() {
        let items = [PackItem::new(500.0, 50.0), PackItem::new(100.0, 50.0)];
        for strategy in [FillStrategy::RowFill, FillStrategy::FillGaps] {
            let out = pack(&items, 300.0, &PackOptions::new(strategy));
            assert_eq!(out.positions[0], Point::new(0.0, 0.0));
            assert_eq!(out.positions[1], Point::new(0.0, 50.0), "{strategy:?}");
        }
    }

    #[test]
    fn zero_sized_items_do_not_displace_siblings() {
        let items = [
            PackItem::new(100.0, 100.0),
            PackItem::new(0.0, 80.0),
            PackItem::new(100.0, 100.0),
        ];
        for strategy in [FillStrategy::RowFill, FillStrategy::FillGaps] {
            let out = pack(&items, 300.0, &PackOptions::new(strategy));
            assert_eq!(out.positions[2], Point::new(100.0, 0.0), "{strategy:?}");
            assert_eq!(out.container_height, 100.0);
        }
    }

    #[test]
    fn negative_dimensions_behave_as_zero() {
        let items = [PackItem::new(-40.0, 100.0), PackItem::new(100.0, 100.0)];
        let out = pack(&items, 300.0, &PackOptions::new(FillStrategy::RowFill));
        assert_eq!(out.positions[1], Point::new(0.0, 0.0));
    }

    #[test]
    fn fill_gaps_backfills_hole() {
        // A tall item, a wide one, then a small one that fits beside the tall item.
        let items = [
            PackItem::new(100.0, 200.0),
            PackItem::new(200.0, 100.0),
            PackItem::new(100.0, 100.0),
            PackItem::new(100.0, 100.0),
        ];
        let row = pack(&items, 300.0, &PackOptions::new(FillStrategy::RowFill));
        let gaps = pack(&items, 300.0, &PackOptions::new(FillStrategy::FillGaps));

        assert_eq!(row.positions[2], Point::new(0.0, 200.0));
        assert_eq!(gaps.positions[2], Point::new(100.0, 100.0));
        assert_eq!(gaps.positions[3], Point::new(200.0, 100.0));
        assert_eq!(gaps.container_height, 200.0);
    }

    #[test]
    fn horizontal_flows_in_columns() {
        let opts = PackOptions::new(FillStrategy::RowFill).horizontal(true);
        let out = pack(&squares(3, 100.0), 200.0, &opts);
        assert_eq!(
            out.positions,
            vec![
                Point::new(0.0, 0.0),
                Point::new(0.0, 100.0),
                Point::new(100.0, 0.0)
            ]
        );
        assert_eq!(out.container_width, 200.0);
        assert_eq!(out.container_height, 200.0);
    }

    #[test]
    fn align_right_mirrors_rows() {
        let opts = PackOptions::new(FillStrategy::RowFill).align_right(true);
        let out = pack(&squares(2, 100.0), 300.0, &opts);
        assert_eq!(
            out.positions,
            vec![Point::new(200.0, 0.0), Point::new(100.0, 0.0)]
        );
    }

    #[test]
    fn align_bottom_mirrors_rows() {
        let opts = PackOptions::new(FillStrategy::RowFill).align_bottom(true);
        let items = [PackItem::new(100.0, 50.0), PackItem::new(100.0, 100.0)];
        let out = pack(&items, 100.0, &opts);
        assert_eq!(
            out.positions,
            vec![Point::new(0.0, 100.0), Point::new(0.0, 0.0)]
        );
    }

    #[test]
    fn strategy_serializes_snake_case() {
        let json = serde_json::to_string(&FillStrategy::FillGaps).expect("serialize");
        assert_eq!(json, "\"fill_gaps\"");
    }
}
