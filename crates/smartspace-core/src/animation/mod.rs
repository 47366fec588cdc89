#![forbid(unsafe_code)]

//! Time-driven animation primitives.
//!
//! Everything here is advanced explicitly with [`Animation::tick`]; there is
//! no clock inside. The runtime feeds frame deltas, which keeps animations
//! deterministic under test.
//!
//! # Invariants
//!
//! 1. `value()` is within `[0.0, 1.0]` for normalized animations.
//! 2. Once `is_complete()` returns `true` it stays `true`.

mod tween;

use std::time::Duration;

pub use tween::{Parallel, Tween};

/// An animation advanced by explicit time steps.
pub trait Animation {
    /// Advance by `dt`.
    fn tick(&mut self, dt: Duration);

    /// Whether the animation has reached its end.
    fn is_complete(&self) -> bool;

    /// Current progress value, eased.
    fn value(&self) -> f32;
}

/// An easing curve mapping linear progress `t` in `[0, 1]` to eased progress.
pub type EasingFn = fn(f32) -> f32;

#[must_use]
pub fn linear(t: f32) -> f32 {
    t.clamp(0.0, 1.0)
}

#[must_use]
pub fn ease_in(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t
}

#[must_use]
pub fn ease_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t) * (1.0 - t)
}

#[must_use]
pub fn ease_in_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}

#[must_use]
pub fn ease_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}
