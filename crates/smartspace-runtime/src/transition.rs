#![forbid(unsafe_code)]

//! Single-flight exit transition for a replaced card.
//!
//! When the visible card is replaced, the outgoing card is lifted onto an
//! [`Overlay`] above the pager, slides up by its own height plus a margin
//! while fading out, and the pager surface rises from below back to rest.
//!
//! # Invariants
//!
//! 1. At most one transition runs at a time. A request while one is running
//!    is dropped ([`TransitionRequest::Busy`]), never queued.
//! 2. A card already on the overlay is never animated twice
//!    ([`TransitionRequest::AlreadyAttached`]).
//! 3. Each started transition reports completion exactly once, whether it
//!    ran to the end ([`tick`](TransitionAnimator::tick)) or was cut short
//!    ([`interrupt`](TransitionAnimator::interrupt)).
//! 4. The overlay holds the outgoing card from start until
//!    [`finish`](TransitionAnimator::finish) and is empty otherwise.
//!
//! # Failure Modes
//!
//! - Finishing with a stale or unknown id is ignored.
//! - A zero-height viewport animates over the margin alone.

use std::fmt;
use std::time::Duration;

use smartspace_core::animation::{Animation, EasingFn, Parallel, Tween};

use crate::config::CarouselConfig;
use crate::host::{CardRef, Viewport};

/// Identifies one started transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransitionId(u64);

impl TransitionId {
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TransitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "transition#{}", self.0)
    }
}

/// Answer to [`TransitionAnimator::request`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionRequest {
    Started(TransitionId),
    /// Another transition is running; this one was dropped.
    Busy,
    /// The card is already on the overlay.
    AlreadyAttached,
}

impl TransitionRequest {
    #[must_use]
    pub const fn is_started(self) -> bool {
        matches!(self, Self::Started(_))
    }
}

/// Positions to draw for the current frame of a running transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionFrame {
    /// Vertical offset of the outgoing card (negative is up).
    pub card_offset_y: f32,
    /// Opacity of the outgoing card.
    pub card_alpha: f32,
    /// Vertical offset of the pager surface.
    pub surface_offset_y: f32,
}

/// Cards temporarily drawn above the pager.
#[derive(Debug, Clone, Default)]
pub struct Overlay {
    cards: Vec<CardRef>,
}

impl Overlay {
    #[must_use]
    pub fn contains(&self, card: &CardRef) -> bool {
        self.cards.contains(card)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CardRef> {
        self.cards.iter()
    }

    fn add(&mut self, card: CardRef) {
        if !self.contains(&card) {
            self.cards.push(card);
        }
    }

    fn remove(&mut self, card: &CardRef) {
        self.cards.retain(|c| c != card);
    }
}

// Channel order inside the `Parallel` group.
const CARD_TRAVEL: usize = 0;
const CARD_FADE: usize = 1;
const SURFACE_RISE: usize = 2;

#[derive(Debug)]
struct RunningTransition {
    id: TransitionId,
    card: CardRef,
    channels: Parallel,
    completion_reported: bool,
}

#[derive(Debug, Default)]
enum TransitionState {
    #[default]
    None,
    Running(RunningTransition),
}

/// Plays the exit transition, one at a time.
pub struct TransitionAnimator {
    state: TransitionState,
    overlay: Overlay,
    next_id: u64,
    duration: Duration,
    dismiss_margin: f32,
    easing: EasingFn,
}

impl fmt::Debug for TransitionAnimator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionAnimator")
            .field("running", &self.running_id())
            .field("overlay", &self.overlay.len())
            .field("duration", &self.duration)
            .field("dismiss_margin", &self.dismiss_margin)
            .finish()
    }
}

impl Default for TransitionAnimator {
    fn default() -> Self {
        Self::new(&CarouselConfig::default())
    }
}

impl TransitionAnimator {
    #[must_use]
    pub fn new(config: &CarouselConfig) -> Self {
        Self {
            state: TransitionState::None,
            overlay: Overlay::default(),
            next_id: 1,
            duration: config.transition_duration(),
            dismiss_margin: config.dismiss_margin,
            easing: config.easing.curve(),
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        matches!(self.state, TransitionState::Running(_))
    }

    #[must_use]
    pub fn running_id(&self) -> Option<TransitionId> {
        match &self.state {
            TransitionState::Running(run) => Some(run.id),
            TransitionState::None => None,
        }
    }

    /// The card being animated away, if any.
    #[must_use]
    pub fn outgoing(&self) -> Option<&CardRef> {
        match &self.state {
            TransitionState::Running(run) => Some(&run.card),
            TransitionState::None => None,
        }
    }

    #[must_use]
    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    /// Start the exit transition for `outgoing`, unless one is running or
    /// the card is already on the overlay. Never queues.
    pub fn request(&mut self, outgoing: CardRef, viewport: Viewport) -> TransitionRequest {
        if self.overlay.contains(&outgoing) {
            tracing::debug!(card = %outgoing.item_id, "card already on overlay");
            return TransitionRequest::AlreadyAttached;
        }
        if self.is_running() {
            tracing::debug!(card = %outgoing.item_id, "transition busy, request dropped");
            return TransitionRequest::Busy;
        }

        let travel = viewport.height.max(0.0) + self.dismiss_margin;
        let channels = Parallel::new()
            .with(Tween::new(0.0, -travel, self.duration).easing(self.easing))
            .with(Tween::new(1.0, 0.0, self.duration).easing(self.easing))
            .with(Tween::new(travel, 0.0, self.duration).easing(self.easing));

        let id = TransitionId(self.next_id);
        self.next_id += 1;
        tracing::debug!(%id, card = %outgoing.item_id, travel, "transition started");
        self.overlay.add(outgoing.clone());
        self.state = TransitionState::Running(RunningTransition {
            id,
            card: outgoing,
            channels,
            completion_reported: false,
        });
        TransitionRequest::Started(id)
    }

    /// Current positions, or `None` when idle.
    #[must_use]
    pub fn frame(&self) -> Option<TransitionFrame> {
        let TransitionState::Running(run) = &self.state else {
            return None;
        };
        let channel = |i: usize| run.channels.get(i).map_or(0.0, Tween::current);
        Some(TransitionFrame {
            card_offset_y: channel(CARD_TRAVEL),
            card_alpha: channel(CARD_FADE),
            surface_offset_y: channel(SURFACE_RISE),
        })
    }

    /// Advance the running transition. Returns its id the first time it
    /// reaches the end; the caller then delivers [`finish`](Self::finish).
    pub fn tick(&mut self, dt: Duration) -> Option<TransitionId> {
        let TransitionState::Running(run) = &mut self.state else {
            return None;
        };
        run.channels.tick(dt);
        if run.channels.is_complete() && !run.completion_reported {
            run.completion_reported = true;
            return Some(run.id);
        }
        None
    }

    /// Cut the running transition short. Returns its id if completion has
    /// not been reported yet, so the caller still delivers exactly one
    /// [`finish`](Self::finish).
    pub fn interrupt(&mut self) -> Option<TransitionId> {
        let TransitionState::Running(run) = &mut self.state else {
            return None;
        };
        run.channels.finish();
        if run.completion_reported {
            return None;
        }
        run.completion_reported = true;
        tracing::debug!(id = %run.id, "transition interrupted");
        Some(run.id)
    }

    /// Tear down transition `id`: drop the card from the overlay and free
    /// the animator. Returns `false` for a stale or unknown id.
    pub fn finish(&mut self, id: TransitionId) -> bool {
        match std::mem::take(&mut self.state) {
            TransitionState::Running(run) if run.id == id => {
                self.overlay.remove(&run.card);
                tracing::debug!(%id, card = %run.card.item_id, "transition finished");
                true
            }
            other => {
                self.state = other;
                tracing::trace!(%id, "ignoring stale transition completion");
                false
            }
        }
    }
}
