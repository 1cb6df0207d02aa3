#![forbid(unsafe_code)]

//! Owned cancel-and-restart animation handle.

use std::fmt;
use std::time::Duration;

use web_time::Instant;

use super::{Easing, Interpolate, Tween};

/// Identifier of one run started on a channel. Monotonic per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RunId(u64);

impl RunId {
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

struct Run<V, C> {
    id: RunId,
    tween: Tween<V>,
    completion: C,
}

/// Output of one [`AnimationChannel::advance`] call.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelFrame<V, C> {
    /// Value to write for this frame.
    pub value: V,
    /// Completion token, present only on the frame where the run finished.
    pub completed: Option<C>,
}

/// A single animated property group with at most one run in flight.
///
/// `C` is the completion token handed back when a run finishes. Tokens of
/// cancelled or superseded runs are dropped, never returned.
pub struct AnimationChannel<V, C> {
    value: V,
    run: Option<Run<V, C>>,
    runs_started: u64,
}

impl<V: fmt::Debug, C> fmt::Debug for AnimationChannel<V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationChannel")
            .field("value", &self.value)
            .field("run", &self.run.as_ref().map(|r| r.id))
            .finish()
    }
}

impl<V: Interpolate, C> AnimationChannel<V, C> {
    #[must_use]
    pub fn new(initial: V) -> Self {
        Self {
            value: initial,
            run: None,
            runs_started: 0,
        }
    }

    /// Value most recently applied (sampled, jumped to, or set).
    #[inline]
    pub fn value(&self) -> V {
        self.value
    }

    /// Target of the run in flight, if any.
    #[inline]
    pub fn target(&self) -> Option<V> {
        self.run.as_ref().map(|r| r.tween.to())
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.run.is_some()
    }

    #[inline]
    pub fn run_id(&self) -> Option<RunId> {
        self.run.as_ref().map(|r| r.id)
    }

    /// Start a run toward `to`, superseding any run in flight.
    ///
    /// The new run starts from the current value, so a redirected animation
    /// continues from wherever the old one had reached.
    pub fn start(&mut self, to: V, duration: Duration, easing: Easing, completion: C) -> RunId {
        self.runs_started += 1;
        let id = RunId(self.runs_started);
        self.run = Some(Run {
            id,
            tween: Tween::new(self.value, to, duration, easing),
            completion,
        });
        id
    }

    /// Cancel any run and move straight to `to`. Returns the value to apply.
    pub fn jump(&mut self, to: V) -> V {
        self.run = None;
        self.value = to;
        to
    }

    /// Cancel the run in flight, keeping the value it reached.
    ///
    /// Returns `true` if a run was cancelled. Its completion token is dropped.
    pub fn cancel(&mut self) -> bool {
        self.run.take().is_some()
    }

    /// Record a value applied from outside the channel (e.g. a drag).
    ///
    /// Only meaningful while idle; a run in flight is cancelled first.
    pub fn set_value(&mut self, value: V) {
        self.run = None;
        self.value = value;
    }

    /// Advance the run in flight to `now`.
    ///
    /// Returns `None` when idle. On the frame where progress reaches 1.0 the
    /// run is retired and its completion token returned.
    pub fn advance(&mut self, now: Instant) -> Option<ChannelFrame<V, C>> {
        let run = self.run.as_mut()?;
        let (value, progress) = run.tween.sample(now);
        self.value = value;
        if progress < 1.0 {
            return Some(ChannelFrame {
                value,
                completed: None,
            });
        }
        let finished = self.run.take()?;
        Some(ChannelFrame {
            value,
            completed: Some(finished.completion),
        })
    }
}
