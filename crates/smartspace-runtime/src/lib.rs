#![forbid(unsafe_code)]

//! Runtime for the smartspace carousel.
//!
//! # Role
//! `smartspace-runtime` sequences card updates. It decides whether a new
//! card set is applied now or parked behind a gesture, re-derives the page
//! index, and plays the exit transition for the card being replaced, one at
//! a time.
//!
//! # Pieces
//! - [`UpdateCoordinator`]: deferral policy and the apply procedure.
//! - [`TransitionAnimator`]: single-flight exit transition with an overlay.
//! - [`CarouselHost`]: the adapter onto the widget owning the pager.
//! - [`StreamSubscription`]: card providers bound to attach/detach.
//! - [`Carousel`]: serialized message loop tying them together.
//! - [`CarouselConfig`]: tunables, optionally loaded from TOML/JSON.

pub mod config;
pub mod coordinator;
pub mod host;
pub mod program;
pub mod subscription;
pub mod transition;

pub use config::{CarouselConfig, ConfigError, EasingKind};
pub use coordinator::{AppliedUpdate, UpdateCoordinator, UpdateOutcome};
pub use host::{CardRef, CarouselHost, StreamStatus, Viewport};
#[cfg(any(test, feature = "test-helpers"))]
pub use host::{HostCall, RecordingHost};
pub use program::{Carousel, Msg};
pub use subscription::{
    IntervalStream, ItemStream, MockStream, StaticStream, StopSignal, StreamEvent, StreamId,
    StreamSubscription,
};
pub use transition::{
    Overlay, TransitionAnimator, TransitionFrame, TransitionId, TransitionRequest,
};
