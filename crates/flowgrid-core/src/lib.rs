#![cfg_attr(not(test), forbid(unsafe_code))]
#![cfg_attr(test, deny(unsafe_code))]

//! Core: geometry primitives and the per-item animation engine.
//!
//! # Role in flowgrid
//! `flowgrid-core` holds the leaf types every other crate builds on. The
//! packer (`flowgrid-layout`) consumes [`geometry::ItemBox`] values and
//! produces [`geometry::Point`] slots; the grid (`flowgrid`) owns one
//! [`animation::AnimationChannel`] per animated property group per item.
//!
//! # Primary responsibilities
//! - **Geometry**: pixel-space points, sizes, rectangles, margins and the
//!   measured box of an element.
//! - **Animation**: easing curves, time-based tweens, and the owned
//!   cancel-and-restart channel that guarantees at most one run in flight.

pub mod animation;
pub mod geometry;

pub use web_time::Instant;
