#![forbid(unsafe_code)]

//! Tweens: interpolate a scalar between two endpoints over a fixed duration.
//!
//! # Failure Modes
//!
//! - Zero duration: clamped to 1ns so a single tick completes it.
//! - Empty [`Parallel`]: immediately complete.

use std::time::Duration;

use super::{Animation, EasingFn, linear};

/// Interpolates `from` → `to` over `duration`, shaped by an easing curve.
#[derive(Debug, Clone, Copy)]
pub struct Tween {
    from: f32,
    to: f32,
    duration: Duration,
    elapsed: Duration,
    easing: EasingFn,
}

impl Tween {
    #[must_use]
    pub fn new(from: f32, to: f32, duration: Duration) -> Self {
        Self {
            from,
            to,
            duration: if duration.is_zero() {
                Duration::from_nanos(1)
            } else {
                duration
            },
            elapsed: Duration::ZERO,
            easing: linear,
        }
    }

    /// Set the easing curve (builder pattern).
    #[must_use]
    pub fn easing(mut self, easing: EasingFn) -> Self {
        self.easing = easing;
        self
    }

    /// Interpolated position between the endpoints.
    #[must_use]
    pub fn current(&self) -> f32 {
        self.from + (self.to - self.from) * self.value()
    }

    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Linear progress in `[0, 1]`, before easing.
    #[must_use]
    pub fn progress(&self) -> f32 {
        (self.elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0) as f32
    }
}

impl Animation for Tween {
    fn tick(&mut self, dt: Duration) {
        self.elapsed = self.elapsed.saturating_add(dt);
    }

    fn is_complete(&self) -> bool {
        self.elapsed >= self.duration
    }

    fn value(&self) -> f32 {
        (self.easing)(self.progress())
    }
}

/// Runs tweens side by side; complete when every member is.
#[derive(Debug, Clone, Default)]
pub struct Parallel {
    members: Vec<Tween>,
}

impl Parallel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a member (builder pattern).
    #[must_use]
    pub fn with(mut self, tween: Tween) -> Self {
        self.members.push(tween);
        self
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Tween> {
        self.members.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Jump every member to its end.
    pub fn finish(&mut self) {
        for member in &mut self.members {
            let remaining = member.duration.saturating_sub(member.elapsed);
            member.tick(remaining);
        }
    }
}

impl Animation for Parallel {
    fn tick(&mut self, dt: Duration) {
        for member in &mut self.members {
            member.tick(dt);
        }
    }

    fn is_complete(&self) -> bool {
        self.members.iter().all(Tween::is_complete)
    }

    /// Progress of the slowest member.
    fn value(&self) -> f32 {
        self.members
            .iter()
            .map(Tween::progress)
            .reduce(f32::min)
            .unwrap_or(1.0)
    }
}
