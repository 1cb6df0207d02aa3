#![no_main]

use arbitrary::Arbitrary;
use flowgrid_layout::{FillStrategy, PackItem, PackOptions, Sides, pack};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    fill_gaps: bool,
    horizontal: bool,
    align_right: bool,
    align_bottom: bool,
    extent: u16,
    gutter: u8,
    padding: u8,
    items: Vec<(u16, u16, u8)>,
}

fuzz_target!(|input: Input| {
    if input.items.len() > 256 {
        return;
    }
    let strategy = if input.fill_gaps {
        FillStrategy::FillGaps
    } else {
        FillStrategy::RowFill
    };
    let options = PackOptions::new(strategy)
        .horizontal(input.horizontal)
        .align_right(input.align_right)
        .align_bottom(input.align_bottom)
        .gutter(f64::from(input.gutter), f64::from(input.gutter))
        .padding(Sides::all(f64::from(input.padding)));
    let items: Vec<PackItem> = input
        .items
        .iter()
        .map(|&(w, h, m)| PackItem::new(f64::from(w), f64::from(h)).with_margin(Sides::all(f64::from(m))))
        .collect();

    let first = pack(&items, f64::from(input.extent), &options);
    let second = pack(&items, f64::from(input.extent), &options);

    // Deterministic, total, and finite.
    assert_eq!(first, second);
    assert_eq!(first.positions.len(), items.len());
    assert!(first.container_width.is_finite() && first.container_width >= 0.0);
    assert!(first.container_height.is_finite() && first.container_height >= 0.0);
    for p in &first.positions {
        assert!(p.x.is_finite() && p.y.is_finite(), "non-finite position {p:?}");
    }
});
