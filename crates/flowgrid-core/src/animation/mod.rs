#![forbid(unsafe_code)]

//! Animation engine: easing curves, tweens, and per-item channels.
//!
//! An [`AnimationChannel`] is the owned, optional animation handle an item
//! keeps for one property group (position, opacity). Channels never talk to
//! a clock themselves: the owner passes the frame timestamp to
//! [`AnimationChannel::advance`], so progress is always derived from real
//! elapsed time rather than an assumed frame delta.
//!
//! # Invariants
//!
//! 1. A channel has at most one run in flight.
//! 2. Starting a run cancels the previous one without yielding its
//!    completion token, and the new run starts from the value the channel
//!    held at that moment.
//! 3. A run yields its completion token exactly once, on the advance where
//!    progress reaches 1.0.
//! 4. [`AnimationChannel::jump`] applies the final value synchronously and
//!    leaves the channel idle.

mod channel;
mod easing;
mod tween;

pub use channel::{AnimationChannel, ChannelFrame, RunId};
pub use easing::{
    Easing, ease_in, ease_in_cubic, ease_in_out, ease_out, ease_out_cubic, linear,
};
pub use tween::{Interpolate, Tween};
