//! Item lifecycle: show/hide, removal, error taxonomy, sort data.

use std::time::Duration;

use flowgrid::testing::{RecordingHost, drive_until_idle};
use flowgrid::{
    AddOptions, Capabilities, ErrorKind, Grid, GridConfig, GridError, GridEvent, Instant, ItemId,
    ItemState, Point, RemoveOptions, SortKey, SortValue, VisibilityOptions,
};

const FRAME: Duration = Duration::from_millis(16);

fn grid_with(count: usize, config: GridConfig) -> (Grid<RecordingHost>, Vec<ItemId>) {
    let mut host = RecordingHost::new(300.0);
    let elements = host.with_elements(count, 100.0, 100.0);
    let mut grid = Grid::new(host, config);
    let ids = grid
        .add_items(elements, AddOptions::default())
        .expect("grid is alive");
    (grid, ids)
}

fn settle(grid: &mut Grid<RecordingHost>) {
    drive_until_idle(grid, Instant::now(), FRAME, 500);
}

#[test]
fn hide_then_show_round_trip() {
    let (mut grid, ids) = grid_with(3, GridConfig::default());
    settle(&mut grid);
    let id = ids[1];
    let element = grid.item(id).expect("live").element();

    grid.hide_items(&[id], VisibilityOptions::default())
        .expect("live item");
    let item = grid.item(id).expect("live");
    assert!(!item.is_visible());
    assert!(item.is_hiding());
    assert!(!item.is_active());
    assert_eq!(grid.host().count("hide"), 0, "hide fires on completion");

    settle(&mut grid);
    let item = grid.item(id).expect("live");
    assert!(!item.is_hiding());
    assert_eq!(item.state(), ItemState::Hidden);
    assert_eq!(grid.host().visibility[&element], false);
    assert_eq!(grid.host().opacity[&element], 0.0);
    assert_eq!(grid.host().count("hide"), 1);

    grid.show_items(&[id], VisibilityOptions::default())
        .expect("live item");
    assert!(grid.item(id).expect("live").is_showing());
    settle(&mut grid);

    let item = grid.item(id).expect("live");
    assert!(item.is_visible());
    assert!(!item.is_showing());
    assert!(!item.is_hiding());
    assert_eq!(grid.host().count("show"), 1);
    assert_eq!(grid.host().opacity[&element], 1.0);
    assert_eq!(item.position(), Point::new(100.0, 0.0));
}

#[test]
fn showing_a_visible_item_is_a_no_op() {
    let (mut grid, ids) = grid_with(2, GridConfig::default());
    let generation = grid.generation();
    grid.show_items(&ids, VisibilityOptions::default())
        .expect("live items");
    assert_eq!(grid.generation(), generation);
    assert_eq!(grid.host().count("show"), 0);
}

#[test]
fn show_during_hide_reverses_without_hide_event() {
    let (mut grid, ids) = grid_with(2, GridConfig::default());
    settle(&mut grid);
    grid.hide_items(&[ids[0]], VisibilityOptions::default())
        .expect("live item");
    let t0 = Instant::now();
    assert!(grid.host_mut().fire_frame());
    grid.frame(t0);
    assert!(grid.host_mut().fire_frame());
    grid.frame(t0 + Duration::from_millis(100));

    grid.show_items(&[ids[0]], VisibilityOptions::default())
        .expect("live item");
    let item = grid.item(ids[0]).expect("live");
    assert!(item.is_showing() && !item.is_hiding());
    drive_until_idle(&mut grid, t0 + Duration::from_millis(116), FRAME, 500);

    assert_eq!(grid.host().count("hide"), 0);
    assert_eq!(grid.host().count("show"), 1);
}

#[test]
fn without_opacity_support_visibility_is_instant() {
    let mut host = RecordingHost::new(300.0);
    let elements = host.with_elements(2, 100.0, 100.0);
    let mut grid = Grid::with_capabilities(host, GridConfig::default(), Capabilities::MINIMAL);
    let ids = grid
        .add_items(elements, AddOptions::default())
        .expect("alive");

    grid.hide_items(&[ids[0]], VisibilityOptions::default())
        .expect("live item");
    assert!(!grid.item(ids[0]).expect("live").is_hiding());
    assert_eq!(grid.host().count("hide"), 1);
    assert!(grid.host().opacity.is_empty());
}

#[test]
fn inactive_items_start_hidden_and_unplaced() {
    let mut host = RecordingHost::new(300.0);
    let elements = host.with_elements(2, 100.0, 100.0);
    let mut grid = Grid::new(host, GridConfig::instant());
    let ids = grid
        .add_items(elements, AddOptions::default().active(false).layout(false))
        .expect("alive");

    let item = grid.item(ids[0]).expect("live");
    assert_eq!(item.state(), ItemState::Created);
    assert!(!item.is_visible());
    assert_eq!(grid.host().visibility[&item.element()], false);

    grid.show_items(&ids, VisibilityOptions::default())
        .expect("live items");
    assert_eq!(grid.item(ids[1]).expect("live").position(), Point::new(100.0, 0.0));
    assert_eq!(grid.item(ids[1]).expect("live").state(), ItemState::Visible);
}

#[test]
fn removed_items_reject_further_calls() {
    let (mut grid, ids) = grid_with(3, GridConfig::instant());
    grid.remove_items(&[ids[0]], RemoveOptions::default())
        .expect("live item");

    assert_eq!(grid.order(), &ids[1..]);
    assert!(grid.item(ids[0]).is_none());
    assert_eq!(grid.host().count("remove"), 1);
    assert_eq!(grid.item(ids[1]).expect("live").position(), Point::new(0.0, 0.0));

    let err = grid
        .hide_items(&[ids[0]], VisibilityOptions::default())
        .unwrap_err();
    assert_eq!(err, GridError::ItemDestroyed { item: ids[0] });
    assert_eq!(err.kind(), ErrorKind::InvalidState);
    assert_eq!(
        grid.drag_start(ids[0], Point::ORIGIN).unwrap_err().kind(),
        ErrorKind::InvalidState
    );

    // destroy is the one idempotent call.
    assert_eq!(grid.destroy_item(ids[0]), Ok(()));
    assert_eq!(grid.host().count("remove"), 1);
}

#[test]
fn failed_calls_leave_state_unchanged() {
    let (mut grid, ids) = grid_with(3, GridConfig::instant());
    let unknown = ItemId::from_raw(u64::MAX);
    let events = grid.host().events.len();
    let generation = grid.generation();

    let err = grid
        .remove_items(&[ids[0], unknown], RemoveOptions::default())
        .unwrap_err();
    assert_eq!(err, GridError::UnknownItem { item: unknown });
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    let err = grid
        .hide_items(&[ids[1], unknown], VisibilityOptions::default())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    assert_eq!(grid.order(), ids.as_slice());
    assert!(grid.items().all(|item| item.is_visible()));
    assert_eq!(grid.host().events.len(), events);
    assert_eq!(grid.generation(), generation);
}

#[test]
fn dragging_a_hidden_item_is_rejected() {
    let (mut grid, ids) = grid_with(2, GridConfig::instant());
    grid.hide_items(&[ids[0]], VisibilityOptions::instant())
        .expect("live item");
    let events = grid.host().events.len();

    let err = grid.drag_start(ids[0], Point::new(10.0, 10.0)).unwrap_err();
    assert_eq!(err, GridError::ItemHidden { item: ids[0] });
    assert_eq!(err.kind(), ErrorKind::InvalidState);
    assert!(grid.drag_session(ids[0]).is_none());
    assert!(!grid.item(ids[0]).expect("live").is_dragging());
    assert_eq!(grid.host().events.len(), events);
}

#[test]
fn filter_shows_matches_and_hides_the_rest() {
    let (mut grid, ids) = grid_with(4, GridConfig::instant());
    let keep = [ids[1], ids[3]];
    grid.filter(|item| keep.contains(&item.id()), VisibilityOptions::default())
        .expect("alive");

    let visible: Vec<ItemId> = grid
        .items()
        .filter(|item| item.is_visible())
        .map(|item| item.id())
        .collect();
    assert_eq!(visible, keep);
    assert_eq!(grid.item(ids[3]).expect("live").position(), Point::new(100.0, 0.0));
    assert_eq!(grid.host().count("hide"), 2);
}

#[test]
fn sort_by_keys_orders_by_sort_data() {
    let mut host = RecordingHost::new(300.0);
    let elements = host.with_elements(4, 100.0, 100.0);
    let mut grid = Grid::new(host, GridConfig::instant());
    let weights = [3.0, 1.0, 2.0, 1.0];
    grid.set_sort_data_getter("weight", move |element| {
        SortValue::Number(weights[(element.0 - 1) as usize])
    })
    .expect("alive");
    grid.set_sort_data_getter("label", |element| SortValue::from(format!("e{}", element.0)))
        .expect("alive");
    let ids = grid
        .add_items(elements, AddOptions::default())
        .expect("alive");
    assert_eq!(
        grid.item(ids[0]).expect("live").sort_value("weight"),
        Some(&SortValue::Number(3.0))
    );

    grid.sort_by_keys(&[SortKey::asc("weight"), SortKey::desc("label")])
        .expect("alive");
    assert_eq!(grid.order(), &[ids[3], ids[1], ids[2], ids[0]]);
    assert_eq!(grid.item(ids[3]).expect("live").position(), Point::new(0.0, 0.0));

    grid.sort_by(|a, b| a.id().cmp(&b.id())).expect("alive");
    assert_eq!(grid.order(), ids.as_slice());
}

#[test]
fn refresh_sort_data_picks_up_new_getters() {
    let (mut grid, ids) = grid_with(2, GridConfig::instant());
    grid.set_sort_data_getter("rank", |element| SortValue::Number(-(element.0 as f64)))
        .expect("alive");
    assert!(grid.item(ids[0]).expect("live").sort_value("rank").is_none());

    grid.refresh_sort_data(None).expect("alive");
    grid.sort_by_keys(&[SortKey::asc("rank")]).expect("alive");
    assert_eq!(grid.order(), &[ids[1], ids[0]]);
}

#[test]
fn events_carry_grid_and_item_identity() {
    let (mut grid, ids) = grid_with(1, GridConfig::instant());
    let events = grid.host_mut().take_events();
    assert_eq!(
        events[0],
        GridEvent::Add {
            grid: grid.id(),
            item: ids[0]
        }
    );
    assert_eq!(events[1].item(), None);
    assert_eq!(events[1].grid(), grid.id());
}
