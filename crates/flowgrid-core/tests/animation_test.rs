//! Integration tests for the animation engine.

use flowgrid_core::Instant;
use flowgrid_core::animation::*;
use flowgrid_core::geometry::Point;
use proptest::prelude::*;
use std::time::Duration;

const MS_16: Duration = Duration::from_millis(16);
const MS_200: Duration = Duration::from_millis(200);

#[test]
fn frame_cadence_does_not_change_the_end_state() {
    let t0 = Instant::now();
    let mut steady: AnimationChannel<Point, ()> = AnimationChannel::new(Point::ORIGIN);
    let mut jittery: AnimationChannel<Point, ()> = AnimationChannel::new(Point::ORIGIN);
    let target = Point::new(120.0, 40.0);
    steady.start(target, MS_200, Easing::EaseInOut, ());
    jittery.start(target, MS_200, Easing::EaseInOut, ());

    let mut now = t0;
    let mut steady_done = 0;
    steady.advance(now);
    while steady.is_running() {
        now += MS_16;
        if steady.advance(now).and_then(|f| f.completed).is_some() {
            steady_done += 1;
        }
    }

    let mut jitter_done = 0;
    jittery.advance(t0);
    for step in [3u64, 41, 47, 90, 93, 120] {
        if jittery
            .advance(t0 + Duration::from_millis(step * 2))
            .and_then(|f| f.completed)
            .is_some()
        {
            jitter_done += 1;
        }
    }

    assert_eq!(steady.value(), target);
    assert_eq!(jittery.value(), target);
    assert_eq!(steady_done, 1);
    assert_eq!(jitter_done, 1, "completion fires exactly once");
}

#[test]
fn many_channels_progress_independently() {
    let t0 = Instant::now();
    let mut channels: Vec<AnimationChannel<f64, usize>> =
        (0..4).map(|_| AnimationChannel::new(0.0)).collect();
    for (i, ch) in channels.iter_mut().enumerate() {
        ch.start(1.0, Duration::from_millis(100 * (i as u64 + 1)), Easing::Linear, i);
        ch.advance(t0);
    }

    let finished: Vec<usize> = channels
        .iter_mut()
        .filter_map(|ch| ch.advance(t0 + MS_200).and_then(|f| f.completed))
        .collect();
    assert_eq!(finished, vec![0, 1]);
    assert!(channels[2].is_running());
    assert!(channels[3].is_running());
}

#[test]
fn easing_curves_are_monotonic() {
    for easing in [
        Easing::Linear,
        Easing::EaseIn,
        Easing::EaseOut,
        Easing::EaseInOut,
        Easing::EaseInCubic,
        Easing::EaseOutCubic,
    ] {
        let mut prev = 0.0f64;
        for i in 0..=100 {
            let t = i as f64 / 100.0;
            let v = easing.apply(t);
            assert!(v >= prev - 1e-9, "{easing:?} should be monotonic at t={t}");
            prev = v;
        }
    }
}

const CURVES: [Easing; 6] = [
    Easing::Linear,
    Easing::EaseIn,
    Easing::EaseOut,
    Easing::EaseInOut,
    Easing::EaseInCubic,
    Easing::EaseOutCubic,
];

proptest! {
    #[test]
    fn any_frame_cadence_lands_exactly_on_target_once(
        gaps in proptest::collection::vec(1u64..=100, 1..16),
        duration_ms in 0u64..=500,
        easing in proptest::sample::select(CURVES.to_vec()),
        x in 0.0f64..500.0,
        y in -500.0f64..0.0,
    ) {
        let t0 = Instant::now();
        let target = Point::new(x, y);
        let mut ch: AnimationChannel<Point, u8> = AnimationChannel::new(Point::ORIGIN);
        ch.start(target, Duration::from_millis(duration_ms), easing, 7);

        let mut now = t0;
        let mut completions = Vec::new();
        for gap in gaps.iter().cycle().take(1_000) {
            let Some(frame) = ch.advance(now) else {
                break;
            };
            prop_assert!(frame.value.x >= -1e-9 && frame.value.x <= x + 1e-9);
            prop_assert!(frame.value.y <= 1e-9 && frame.value.y >= y - 1e-9);
            completions.extend(frame.completed);
            now += Duration::from_millis(*gap);
        }

        prop_assert_eq!(completions, vec![7]);
        prop_assert_eq!(ch.value(), target);
        prop_assert!(!ch.is_running());
        prop_assert!(ch.advance(now).is_none());
    }
}
