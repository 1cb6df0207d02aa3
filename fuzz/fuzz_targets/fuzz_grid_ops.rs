#![no_main]

use std::time::Duration;

use arbitrary::Arbitrary;
use flowgrid::testing::RecordingHost;
use flowgrid::{
    AddOptions, GestureEvent, Grid, GridConfig, Instant, ItemBox, Point, RemoveOptions,
    SortAction, VisibilityOptions,
};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum Op {
    Add { width: u8, height: u8 },
    Remove(u8),
    Hide(u8),
    Show(u8),
    Move { from: u8, to: u8, swap: bool },
    Layout { instant: bool },
    DragStart(u8),
    DragMove { item: u8, dx: i8, dy: i8 },
    DragEnd(u8),
    DragCancel(u8),
    Frame { ms: u8 },
    Destroy,
}

fuzz_target!(|ops: Vec<Op>| {
    if ops.len() > 512 {
        return;
    }
    let mut grid = Grid::new(RecordingHost::new(400.0), GridConfig::default());
    let mut ids = Vec::new();
    let mut next_element = 1u64;
    let mut now = Instant::now();

    for op in ops {
        let pick = |i: u8, ids: &[flowgrid::ItemId]| {
            (!ids.is_empty()).then(|| ids[usize::from(i) % ids.len()])
        };
        // Errors are expected for stale ids; only panics and broken
        // invariants are findings.
        match op {
            Op::Add { width, height } => {
                let element = flowgrid::ElementHandle(next_element);
                next_element += 1;
                grid.host_mut()
                    .set_box(element, ItemBox::sized(f64::from(width), f64::from(height)));
                if let Ok(added) = grid.add_items([element], AddOptions::default()) {
                    ids.extend(added);
                }
            }
            Op::Remove(i) => {
                if let Some(id) = pick(i, &ids) {
                    let _ = grid.remove_items(&[id], RemoveOptions::default());
                }
            }
            Op::Hide(i) => {
                if let Some(id) = pick(i, &ids) {
                    let _ = grid.hide_items(&[id], VisibilityOptions::default());
                }
            }
            Op::Show(i) => {
                if let Some(id) = pick(i, &ids) {
                    let _ = grid.show_items(&[id], VisibilityOptions::default());
                }
            }
            Op::Move { from, to, swap } => {
                if let Some(id) = pick(from, &ids) {
                    let action = if swap { SortAction::Swap } else { SortAction::Move };
                    let _ = grid.move_item(id, usize::from(to), action, true);
                }
            }
            Op::Layout { instant } => {
                let _ = if instant { grid.layout_instant() } else { grid.layout() };
            }
            Op::DragStart(i) => {
                if let Some(id) = pick(i, &ids) {
                    let _ = grid.handle_gesture(id, GestureEvent::Start(Point::ORIGIN));
                }
            }
            Op::DragMove { item, dx, dy } => {
                if let Some(id) = pick(item, &ids) {
                    let delta = Point::new(f64::from(dx), f64::from(dy));
                    let _ = grid.handle_gesture_at(id, GestureEvent::Move(delta), now);
                }
            }
            Op::DragEnd(i) => {
                if let Some(id) = pick(i, &ids) {
                    let _ = grid.handle_gesture(id, GestureEvent::End);
                }
            }
            Op::DragCancel(i) => {
                if let Some(id) = pick(i, &ids) {
                    let _ = grid.handle_gesture(id, GestureEvent::Cancel);
                }
            }
            Op::Frame { ms } => {
                now += Duration::from_millis(u64::from(ms));
                if grid.host_mut().fire_frame() {
                    grid.frame(now);
                }
            }
            Op::Destroy => grid.destroy(),
        }

        // The order holds each live item exactly once.
        let mut seen = grid.order().to_vec();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), grid.order().len());
        assert_eq!(grid.items().count(), grid.order().len());
        for item in grid.items() {
            assert!(!(item.is_showing() && item.is_hiding()));
            assert!(!item.is_dragging() || item.is_active());
        }
    }

    let layout_ends = grid.host().count("layoutEnd");
    assert!(layout_ends <= grid.host().count("layoutStart"));
    assert!(grid.host().count("destroy") <= 1);
});
