#![forbid(unsafe_code)]

//! Smartspace public facade crate.
//!
//! Re-exports the card model, pager state, coordinator, and carousel loop
//! from the internal crates, adds the unified [`Error`] model, and offers a
//! prelude for hosts.
//!
//! ```ignore
//! use smartspace::prelude::*;
//!
//! let mut carousel = Carousel::new(my_host, &CarouselConfig::default())
//!     .with_stream(StaticStream::new(1, cards));
//! carousel.handle(Msg::Attach);
//! carousel.pump();
//! ```

pub mod error;

pub use error::{DegradationAction, Error, Result};

// --- Core re-exports -------------------------------------------------------

pub use smartspace_core::{
    DisplaySet, InteractionPhase, ItemError, ItemSet, PageOffset, PagerState, PhaseChange,
    RankedItem, RawItem, ScrollEvent, ScrollTracker,
};

// --- Runtime re-exports ----------------------------------------------------

pub use smartspace_runtime::{
    AppliedUpdate, CardRef, Carousel, CarouselConfig, CarouselHost, ConfigError, EasingKind,
    IntervalStream, ItemStream, Msg, Overlay, StaticStream, StopSignal, StreamEvent, StreamId,
    StreamStatus, TransitionAnimator, TransitionFrame, TransitionId, TransitionRequest, UpdateCoordinator,
    UpdateOutcome, Viewport,
};

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        CardRef, Carousel, CarouselConfig, CarouselHost, DegradationAction, DisplaySet, Error,
        ItemSet, Msg, PageOffset, RankedItem, Result, ScrollEvent, StaticStream, Viewport,
    };

    pub use crate::{core, runtime};
}

pub use smartspace_core as core;
pub use smartspace_runtime as runtime;
