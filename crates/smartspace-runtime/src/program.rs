#![forbid(unsafe_code)]

//! The carousel event loop.
//!
//! Every input (stream emissions, pager callbacks, frame ticks, animation
//! completions, lifecycle changes) is a [`Msg`]. [`Carousel::handle`] pushes
//! it onto one queue and processes the queue to completion, so no two
//! coordinator operations ever overlap and follow-up messages (such as a
//! transition completion produced by a tick) run strictly after the message
//! that produced them.
//!
//! # Lifecycle
//!
//! - `Attach` starts the item streams. They re-emit on every attach, so an
//!   unchanged upstream reproduces the same pages and index.
//! - `Detach` stops the streams, completes any running transition, and
//!   drops a set parked behind a gesture.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use smartspace_core::{ItemSet, RawItem, ScrollEvent, ScrollTracker};
use web_time::Instant;

use crate::config::CarouselConfig;
use crate::coordinator::{UpdateCoordinator, UpdateOutcome};
use crate::host::CarouselHost;
use crate::subscription::{ItemStream, StreamEvent, StreamSubscription};
use crate::transition::{TransitionAnimator, TransitionFrame, TransitionId};

/// Inputs to the carousel.
#[derive(Debug, Clone)]
pub enum Msg<P> {
    Attach,
    Detach,
    Items(ItemSet<P>),
    RawItems(Vec<RawItem<P>>),
    StreamFailed(String),
    Scroll(ScrollEvent),
    /// Frame tick with the time since the previous one.
    Tick(Duration),
    TransitionFinished(TransitionId),
    LongPress,
}

impl<P> From<StreamEvent<P>> for Msg<P> {
    fn from(event: StreamEvent<P>) -> Self {
        match event {
            StreamEvent::Items(set) => Self::Items(set),
            StreamEvent::Raw(raw) => Self::RawItems(raw),
            StreamEvent::Failed(reason) => Self::StreamFailed(reason),
        }
    }
}

impl<P> From<ScrollEvent> for Msg<P> {
    fn from(event: ScrollEvent) -> Self {
        Self::Scroll(event)
    }
}

/// A smartspace carousel bound to its host.
pub struct Carousel<P: Send + Sync + 'static, H> {
    host: H,
    coordinator: UpdateCoordinator<P>,
    animator: TransitionAnimator,
    scroll: ScrollTracker,
    streams: Vec<Arc<dyn ItemStream<P>>>,
    subscription: StreamSubscription<P>,
    queue: VecDeque<Msg<P>>,
    last_outcome: Option<UpdateOutcome>,
    last_frame: Option<Instant>,
    attached: bool,
}

impl<P: Send + Sync + 'static, H> fmt::Debug for Carousel<P, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Carousel")
            .field("attached", &self.attached)
            .field("pager", self.coordinator.pager())
            .field("pending", &self.coordinator.pending().is_some())
            .field("animator", &self.animator)
            .field("streams", &self.streams.len())
            .finish()
    }
}

impl<P: Send + Sync + 'static, H: CarouselHost<P>> Carousel<P, H> {
    #[must_use]
    pub fn new(host: H, config: &CarouselConfig) -> Self {
        Self {
            host,
            coordinator: UpdateCoordinator::new(config.preview_mode),
            animator: TransitionAnimator::new(config),
            scroll: ScrollTracker::new(),
            streams: Vec::new(),
            subscription: StreamSubscription::new(),
            queue: VecDeque::new(),
            last_outcome: None,
            last_frame: None,
            attached: false,
        }
    }

    /// Declare a card provider (builder pattern). Started on attach.
    #[must_use]
    pub fn with_stream(mut self, stream: impl ItemStream<P> + 'static) -> Self {
        self.streams.push(Arc::new(stream));
        self
    }

    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    #[must_use]
    pub fn coordinator(&self) -> &UpdateCoordinator<P> {
        &self.coordinator
    }

    #[must_use]
    pub fn animator(&self) -> &TransitionAnimator {
        &self.animator
    }

    /// What the most recent card set did: parked, or applied and how.
    #[must_use]
    pub fn last_outcome(&self) -> Option<UpdateOutcome> {
        self.last_outcome
    }

    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Positions for drawing the running exit transition.
    #[must_use]
    pub fn transition_frame(&self) -> Option<TransitionFrame> {
        self.animator.frame()
    }

    /// Queue `msg` and process the queue until it is empty.
    pub fn handle(&mut self, msg: Msg<P>) {
        self.queue.push_back(msg);
        while let Some(msg) = self.queue.pop_front() {
            self.dispatch(msg);
        }
    }

    /// Tick with the wall-clock time since the previous call. The first
    /// call only starts the clock.
    pub fn frame(&mut self) {
        let now = Instant::now();
        if let Some(last) = self.last_frame.replace(now) {
            self.handle(Msg::Tick(now.duration_since(last)));
        }
    }

    /// Feed every queued stream event into [`handle`](Self::handle).
    /// Returns how many were processed.
    pub fn pump(&mut self) -> usize {
        let events = self.subscription.drain();
        let count = events.len();
        for event in events {
            self.handle(event.into());
        }
        count
    }

    /// Wait up to `timeout` for one stream event and handle it.
    pub fn pump_blocking(&mut self, timeout: Duration) -> bool {
        match self.subscription.recv_timeout(timeout) {
            Some(event) => {
                self.handle(event.into());
                true
            }
            None => false,
        }
    }

    fn dispatch(&mut self, msg: Msg<P>) {
        match msg {
            Msg::Attach => self.attach(),
            Msg::Detach => self.detach(),
            Msg::Items(set) => {
                if !self.attached {
                    tracing::trace!("ignoring card set while detached");
                    return;
                }
                let outcome =
                    self.coordinator
                        .on_items_received(set, &mut self.host, &mut self.animator);
                self.last_outcome = Some(outcome);
            }
            Msg::RawItems(raw) => {
                if !self.attached {
                    tracing::trace!("ignoring card set while detached");
                    return;
                }
                let outcome =
                    self.coordinator
                        .on_raw_items_received(raw, &mut self.host, &mut self.animator);
                self.last_outcome = Some(outcome);
            }
            Msg::StreamFailed(reason) => {
                self.coordinator.on_stream_failed(&reason, &mut self.host);
            }
            Msg::Scroll(event) => {
                let out = self.scroll.process(event);
                if let Some(offset) = out.offset {
                    tracing::trace!(page = offset.page, fraction = offset.fraction, "page scrolled");
                    self.host.set_indicator_offset(offset);
                }
                if let Some(change) = out.phase
                    && let Some(applied) = self.coordinator.on_interaction_phase_changed(
                        change.to,
                        &mut self.host,
                        &mut self.animator,
                    )
                {
                    self.last_outcome = Some(UpdateOutcome::Applied(applied));
                }
            }
            Msg::Tick(dt) => {
                if let Some(id) = self.animator.tick(dt) {
                    self.queue.push_back(Msg::TransitionFinished(id));
                }
            }
            Msg::TransitionFinished(id) => {
                self.animator.finish(id);
            }
            Msg::LongPress => {
                self.coordinator.on_long_press(&mut self.host);
            }
        }
    }

    fn attach(&mut self) {
        if self.attached {
            return;
        }
        self.attached = true;
        tracing::debug!(streams = self.streams.len(), "carousel attached");
        self.subscription.attach(&self.streams);
    }

    fn detach(&mut self) {
        if !self.attached {
            return;
        }
        self.attached = false;
        self.subscription.detach();
        // Events emitted before the streams stopped belong to this attach
        // cycle; the next attach re-emits.
        let stale = self.subscription.drain().len();
        if let Some(id) = self.animator.interrupt() {
            self.queue.push_back(Msg::TransitionFinished(id));
        }
        self.scroll.reset();
        self.coordinator.on_detached();
        tracing::debug!(stale, "carousel detached");
    }
}
