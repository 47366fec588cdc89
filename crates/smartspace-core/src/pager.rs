#![forbid(unsafe_code)]

//! Pager bookkeeping: page index, page count, reading direction, and the
//! interaction phase derived from low-level scroll callbacks.
//!
//! [`ScrollTracker`] is a small state machine that turns the pager widget's
//! callbacks (drag start, release, settle, continuous offsets) into a
//! three-valued [`InteractionPhase`] plus [`PageOffset`] samples for the page
//! indicator. [`PagerState`] holds the discrete state the coordinator reasons
//! about and owns the index arithmetic for right-to-left layouts.
//!
//! # Invariants
//!
//! 1. `0 <= current_index < max(page_count, 1)` after every mutation.
//! 2. A [`PhaseChange`] is only reported when the phase actually changes.
//! 3. `PageOffset::fraction` is always within `[0.0, 1.0)`.
//!
//! # Failure Modes
//!
//! - Unknown raw scroll-state constants are ignored (no phase change).
//! - Non-finite offset fractions are treated as `0.0`.

use std::fmt;

// ---------------------------------------------------------------------------
// InteractionPhase
// ---------------------------------------------------------------------------

/// What the user is currently doing with the pager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InteractionPhase {
    /// No touch and no settling motion.
    #[default]
    Idle,
    /// A gesture is in progress.
    Dragging,
    /// Released; the pager is still animating to a page.
    Settling,
}

impl InteractionPhase {
    /// Map the conventional pager scroll-state constants (0 idle, 1 dragging,
    /// 2 settling).
    #[must_use]
    pub const fn from_scroll_state(state: u8) -> Option<Self> {
        match state {
            0 => Some(Self::Idle),
            1 => Some(Self::Dragging),
            2 => Some(Self::Settling),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_idle(self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Stable label for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Dragging => "dragging",
            Self::Settling => "settling",
        }
    }
}

impl fmt::Display for InteractionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A phase transition reported by [`ScrollTracker`] or [`PagerState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseChange {
    pub from: InteractionPhase,
    pub to: InteractionPhase,
}

impl PhaseChange {
    /// Whether this transition returned the pager to rest.
    #[must_use]
    pub const fn entered_idle(self) -> bool {
        self.to.is_idle() && !self.from.is_idle()
    }
}

// ---------------------------------------------------------------------------
// PageOffset
// ---------------------------------------------------------------------------

/// Continuous position within the pager, for the page indicator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageOffset {
    /// Leftmost visible page.
    pub page: usize,
    /// How far the next page has scrolled in, in `[0.0, 1.0)`.
    pub fraction: f32,
}

impl PageOffset {
    /// Create an offset, normalizing the fraction.
    #[must_use]
    pub fn new(page: usize, fraction: f32) -> Self {
        let fraction = if fraction.is_finite() {
            fraction.clamp(0.0, 1.0 - f32::EPSILON)
        } else {
            0.0
        };
        Self { page, fraction }
    }
}

// ---------------------------------------------------------------------------
// ScrollTracker
// ---------------------------------------------------------------------------

/// Low-level callbacks from the pager widget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScrollEvent {
    /// A touch started moving the pager.
    DragStarted,
    /// The finger lifted; the pager flings or snaps to a page.
    Released,
    /// The pager came to rest on a page.
    Settled,
    /// Raw scroll-state constant as reported by the widget.
    StateChanged(u8),
    /// Continuous position sample.
    Scrolled { page: usize, fraction: f32 },
}

/// Result of feeding one [`ScrollEvent`] to the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollOutput {
    pub phase: Option<PhaseChange>,
    pub offset: Option<PageOffset>,
}

/// Translates pager callbacks into interaction phases.
#[derive(Debug, Clone, Default)]
pub struct ScrollTracker {
    phase: InteractionPhase,
    last_offset: Option<PageOffset>,
}

impl ScrollTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn phase(&self) -> InteractionPhase {
        self.phase
    }

    /// Most recent offset sample, if any since the last reset.
    #[must_use]
    pub fn last_offset(&self) -> Option<PageOffset> {
        self.last_offset
    }

    /// Process one callback.
    pub fn process(&mut self, event: ScrollEvent) -> ScrollOutput {
        let mut out = ScrollOutput::default();
        let next = match event {
            ScrollEvent::DragStarted => Some(InteractionPhase::Dragging),
            // A release without a preceding drag is a stray callback.
            ScrollEvent::Released => match self.phase {
                InteractionPhase::Dragging => Some(InteractionPhase::Settling),
                other => Some(other),
            },
            ScrollEvent::Settled => Some(InteractionPhase::Idle),
            ScrollEvent::StateChanged(raw) => InteractionPhase::from_scroll_state(raw),
            ScrollEvent::Scrolled { page, fraction } => {
                let offset = PageOffset::new(page, fraction);
                self.last_offset = Some(offset);
                out.offset = Some(offset);
                None
            }
        };
        if let Some(to) = next
            && to != self.phase
        {
            out.phase = Some(PhaseChange {
                from: self.phase,
                to,
            });
            self.phase = to;
        }
        out
    }

    /// Return to idle without reporting a transition (e.g. on detach).
    pub fn reset(&mut self) {
        self.phase = InteractionPhase::Idle;
        self.last_offset = None;
    }
}

// ---------------------------------------------------------------------------
// PagerState
// ---------------------------------------------------------------------------

/// Discrete pager state owned by the update coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PagerState {
    current_index: usize,
    page_count: usize,
    phase: InteractionPhase,
    mirrored: bool,
}

impl PagerState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    #[must_use]
    pub fn page_count(&self) -> usize {
        self.page_count
    }

    #[must_use]
    pub fn phase(&self) -> InteractionPhase {
        self.phase
    }

    #[must_use]
    pub fn is_mirrored(&self) -> bool {
        self.mirrored
    }

    /// More than one page and a gesture in flight.
    #[must_use]
    pub fn is_interacting(&self) -> bool {
        self.page_count > 1 && !self.phase.is_idle()
    }

    pub fn set_mirrored(&mut self, mirrored: bool) {
        self.mirrored = mirrored;
    }

    /// Record a new phase, returning the transition if it changed.
    pub fn set_phase(&mut self, phase: InteractionPhase) -> Option<PhaseChange> {
        if phase == self.phase {
            return None;
        }
        let change = PhaseChange {
            from: self.phase,
            to: phase,
        };
        self.phase = phase;
        Some(change)
    }

    /// Set the page count, pulling the index back into range.
    pub fn set_page_count(&mut self, count: usize) {
        self.page_count = count;
        self.current_index = Self::clamp_index(self.current_index, count);
    }

    /// Set the current page, clamped into range. Returns the stored index.
    pub fn set_current_index(&mut self, index: usize) -> usize {
        self.current_index = Self::clamp_index(index, self.page_count);
        self.current_index
    }

    /// Clamp `index` into `[0, count - 1]`; `0` when there are no pages.
    #[must_use]
    pub fn clamp_index(index: usize, count: usize) -> usize {
        index.min(count.saturating_sub(1))
    }

    /// Distance of `old_index` from the end of the current page count.
    ///
    /// In a mirrored layout page 0 is the rightmost card, so the same card
    /// after a page-count change is found by keeping this distance, not the
    /// raw index.
    #[must_use]
    pub fn mirrored_anchor(&self, old_index: usize) -> usize {
        self.page_count.saturating_sub(old_index)
    }

    /// Index for a mirrored layout of `new_count` pages that keeps `anchor`
    /// (from [`mirrored_anchor`](Self::mirrored_anchor)) stable.
    #[must_use]
    pub fn reposition(new_count: usize, anchor: usize) -> usize {
        Self::clamp_index(new_count.saturating_sub(anchor), new_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scroll_state_constants_map_to_phases() {
        assert_eq!(
            InteractionPhase::from_scroll_state(0),
            Some(InteractionPhase::Idle)
        );
        assert_eq!(
            InteractionPhase::from_scroll_state(1),
            Some(InteractionPhase::Dragging)
        );
        assert_eq!(
            InteractionPhase::from_scroll_state(2),
            Some(InteractionPhase::Settling)
        );
        assert_eq!(InteractionPhase::from_scroll_state(9), None);
    }

    #[test]
    fn drag_release_settle_cycle() {
        let mut tracker = ScrollTracker::new();
        let out = tracker.process(ScrollEvent::DragStarted);
        assert_eq!(
            out.phase,
            Some(PhaseChange {
                from: InteractionPhase::Idle,
                to: InteractionPhase::Dragging
            })
        );
        let out = tracker.process(ScrollEvent::Released);
        assert_eq!(out.phase.map(|c| c.to), Some(InteractionPhase::Settling));
        let out = tracker.process(ScrollEvent::Settled);
        let change = out.phase.expect("settle should change phase");
        assert!(change.entered_idle());
        assert_eq!(tracker.phase(), InteractionPhase::Idle);
    }

    #[test]
    fn release_without_drag_is_ignored() {
        let mut tracker = ScrollTracker::new();
        assert_eq!(tracker.process(ScrollEvent::Released).phase, None);
        assert_eq!(tracker.phase(), InteractionPhase::Idle);
    }

    #[test]
    fn repeated_state_reports_no_change() {
        let mut tracker = ScrollTracker::new();
        tracker.process(ScrollEvent::StateChanged(1));
        assert_eq!(tracker.process(ScrollEvent::StateChanged(1)).phase, None);
        assert_eq!(tracker.process(ScrollEvent::StateChanged(7)).phase, None);
    }

    #[test]
    fn scrolled_samples_are_clamped_and_do_not_change_phase() {
        let mut tracker = ScrollTracker::new();
        let out = tracker.process(ScrollEvent::Scrolled {
            page: 2,
            fraction: 1.5,
        });
        assert_eq!(out.phase, None);
        let offset = out.offset.expect("offset sample");
        assert_eq!(offset.page, 2);
        assert!(offset.fraction < 1.0);

        let out = tracker.process(ScrollEvent::Scrolled {
            page: 0,
            fraction: f32::NAN,
        });
        assert_eq!(out.offset.map(|o| o.fraction), Some(0.0));
        assert_eq!(tracker.last_offset(), out.offset);
    }

    #[test]
    fn reset_returns_to_idle_silently() {
        let mut tracker = ScrollTracker::new();
        tracker.process(ScrollEvent::DragStarted);
        tracker.reset();
        assert_eq!(tracker.phase(), InteractionPhase::Idle);
        assert_eq!(tracker.last_offset(), None);
    }

    #[test]
    fn page_count_shrink_clamps_index() {
        let mut pager = PagerState::new();
        pager.set_page_count(5);
        assert_eq!(pager.set_current_index(4), 4);
        pager.set_page_count(2);
        assert_eq!(pager.current_index(), 1);
        pager.set_page_count(0);
        assert_eq!(pager.current_index(), 0);
    }

    #[test]
    fn set_current_index_clamps() {
        let mut pager = PagerState::new();
        pager.set_page_count(3);
        assert_eq!(pager.set_current_index(10), 2);
    }

    #[test]
    fn mirrored_reposition_keeps_card_anchor() {
        let mut pager = PagerState::new();
        pager.set_page_count(3);
        let anchor = pager.mirrored_anchor(1);
        assert_eq!(anchor, 2);
        assert_eq!(PagerState::reposition(4, anchor), 2);
    }

    #[test]
    fn reposition_clamps_at_both_ends() {
        // anchor larger than the new count
        assert_eq!(PagerState::reposition(2, 5), 0);
        // anchor of zero (old index == old count) lands on the last page
        assert_eq!(PagerState::reposition(3, 0), 2);
        assert_eq!(PagerState::reposition(0, 0), 0);
    }

    #[test]
    fn interacting_requires_multiple_pages() {
        let mut pager = PagerState::new();
        pager.set_page_count(1);
        pager.set_phase(InteractionPhase::Dragging);
        assert!(!pager.is_interacting());
        pager.set_page_count(2);
        assert!(pager.is_interacting());
    }

    #[test]
    fn set_phase_reports_transitions_once() {
        let mut pager = PagerState::new();
        assert!(pager.set_phase(InteractionPhase::Idle).is_none());
        assert!(pager.set_phase(InteractionPhase::Settling).is_some());
        let change = pager.set_phase(InteractionPhase::Idle).expect("change");
        assert!(change.entered_idle());
    }
}
