#![forbid(unsafe_code)]

//! Time-based interpolation between two values.

use std::time::Duration;

use web_time::Instant;

use super::Easing;
use crate::geometry::Point;

/// Values a [`Tween`] can interpolate.
pub trait Interpolate: Copy {
    fn interpolate(self, to: Self, t: f64) -> Self;
}

impl Interpolate for f64 {
    #[inline]
    fn interpolate(self, to: Self, t: f64) -> Self {
        self + (to - self) * t
    }
}

impl Interpolate for Point {
    #[inline]
    fn interpolate(self, to: Self, t: f64) -> Self {
        Point::new(self.x.interpolate(to.x, t), self.y.interpolate(to.y, t))
    }
}

/// One interpolation run from `from` to `to` over `duration`.
///
/// The start instant is pinned lazily by the first [`sample`](Tween::sample)
/// so a run created between frames begins on the frame that first observes
/// it.
#[derive(Debug, Clone)]
pub struct Tween<V> {
    from: V,
    to: V,
    duration: Duration,
    easing: Easing,
    started_at: Option<Instant>,
}

impl<V: Interpolate> Tween<V> {
    #[must_use]
    pub fn new(from: V, to: V, duration: Duration, easing: Easing) -> Self {
        Self {
            from,
            to,
            duration,
            easing,
            started_at: None,
        }
    }

    #[inline]
    pub fn from(&self) -> V {
        self.from
    }

    #[inline]
    pub fn to(&self) -> V {
        self.to
    }

    #[inline]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Linear progress at `now`, in `[0, 1]`. A zero duration is complete
    /// immediately.
    pub fn progress(&mut self, now: Instant) -> f64 {
        let start = *self.started_at.get_or_insert(now);
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(start);
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
    }

    /// Eased value and linear progress at `now`.
    pub fn sample(&mut self, now: Instant) -> (V, f64) {
        let progress = self.progress(now);
        if progress >= 1.0 {
            return (self.to, 1.0);
        }
        let eased = self.easing.apply(progress);
        (self.from.interpolate(self.to, eased), progress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_sample_pins_the_start() {
        let t0 = Instant::now();
        let mut tween = Tween::new(0.0, 100.0, Duration::from_millis(100), Easing::Linear);
        assert_eq!(tween.sample(t0 + Duration::from_millis(40)), (0.0, 0.0));
        let (v, p) = tween.sample(t0 + Duration::from_millis(90));
        assert!((v - 50.0).abs() < 1e-9);
        assert!((p - 0.5).abs() < 1e-9);
    }

    #[test]
    fn overshooting_time_clamps_to_target() {
        let t0 = Instant::now();
        let mut tween = Tween::new(
            Point::new(0.0, 0.0),
            Point::new(10.0, -10.0),
            Duration::from_millis(50),
            Easing::EaseOut,
        );
        tween.sample(t0);
        assert_eq!(
            tween.sample(t0 + Duration::from_secs(3)),
            (Point::new(10.0, -10.0), 1.0)
        );
    }

    #[test]
    fn zero_duration_completes_on_first_sample() {
        let mut tween = Tween::new(1.0, 0.0, Duration::ZERO, Easing::Linear);
        assert_eq!(tween.sample(Instant::now()), (0.0, 1.0));
    }
}
