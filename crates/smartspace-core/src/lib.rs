#![forbid(unsafe_code)]

//! Core: ranked card model, pager state, and animation primitives.
//!
//! # Role in the smartspace carousel
//! `smartspace-core` is the leaf layer. It owns the immutable card snapshots
//! that arrive from upstream providers, the bookkeeping for the pager
//! (current page, page count, interaction phase, reading direction), and the
//! time-driven tweens used by the exit transition.
//!
//! # Primary responsibilities
//! - **ItemSet / DisplaySet**: validated snapshots and their ranked view.
//! - **PagerState**: index arithmetic, including right-to-left mirroring.
//! - **ScrollTracker**: low-level pager callbacks to a three-valued phase.
//! - **Animation**: the `tick`/`value` contract plus easing and tweens.
//!
//! # How it fits in the system
//! The runtime (`smartspace-runtime`) drives these types from a single
//! serialized event loop. Nothing here spawns threads or performs I/O, so
//! every type is deterministic under test.

pub mod animation;
pub mod item;
pub mod logging;
pub mod pager;

pub use item::{DisplaySet, ItemError, ItemSet, RankedItem, RawItem};
pub use pager::{
    InteractionPhase, PageOffset, PagerState, PhaseChange, ScrollEvent, ScrollTracker,
};

#[cfg(feature = "tracing")]
pub use logging::{debug, error, info, trace, warn};
