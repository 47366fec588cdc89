#![forbid(unsafe_code)]

//! Update coordinator: reconciles incoming card sets with paging gestures
//! and the exit transition.
//!
//! # Deferral
//!
//! While the pager shows more than one page and the user is dragging or the
//! pager is settling, new card sets are parked in a single pending slot. A
//! newer arrival overwrites the slot. The slot is consumed on the next
//! return to idle, so exactly the latest set is applied, once.
//!
//! # Apply
//!
//! Applying a set ranks it, re-derives the current page (mirroring the index
//! arithmetic for right-to-left layouts), swaps the host's item list, updates
//! the indicator, hands the previously visible card to the
//! [`TransitionAnimator`], and refreshes every page. The page jump is never
//! animated; only the exit transition moves.
//!
//! # Failure Modes
//!
//! - Malformed raw items are dropped before ranking; the rest still apply.
//! - An out-of-range index after a shrink is clamped, never an error.
//! - A stream failure leaves the last applied set on screen and reports
//!   [`StreamStatus::NoData`] to the host until the next apply.

use smartspace_core::{InteractionPhase, ItemSet, PagerState, PhaseChange, RawItem};

use crate::host::{CarouselHost, StreamStatus};
use crate::transition::{TransitionAnimator, TransitionRequest};

/// Result of handing a set to the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Parked until the pager is idle. `superseded` is set when an older
    /// pending set was overwritten.
    Deferred { superseded: bool },
    Applied(AppliedUpdate),
}

impl UpdateOutcome {
    #[must_use]
    pub const fn is_deferred(&self) -> bool {
        matches!(self, Self::Deferred { .. })
    }
}

/// What one apply did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppliedUpdate {
    pub page_count: usize,
    /// Page shown after the apply.
    pub index: usize,
    /// Whether the host was told to jump to `index`.
    pub repositioned: bool,
    pub indicator_pages: usize,
    /// `None` when there was no outgoing card to animate.
    pub transition: Option<TransitionRequest>,
}

/// Sequences card-set updates against interaction and animation state.
#[derive(Debug)]
pub struct UpdateCoordinator<P> {
    pager: PagerState,
    pending: Option<ItemSet<P>>,
    last_applied: Option<ItemSet<P>>,
    stream_status: StreamStatus,
    preview_mode: bool,
}

impl<P> Default for UpdateCoordinator<P> {
    fn default() -> Self {
        Self::new(false)
    }
}

impl<P> UpdateCoordinator<P> {
    #[must_use]
    pub fn new(preview_mode: bool) -> Self {
        Self {
            pager: PagerState::new(),
            pending: None,
            last_applied: None,
            stream_status: StreamStatus::Live,
            preview_mode,
        }
    }

    #[must_use]
    pub fn pager(&self) -> &PagerState {
        &self.pager
    }

    /// The parked set, if a gesture is holding one back.
    #[must_use]
    pub fn pending(&self) -> Option<&ItemSet<P>> {
        self.pending.as_ref()
    }

    /// The set currently on screen.
    #[must_use]
    pub fn last_applied(&self) -> Option<&ItemSet<P>> {
        self.last_applied.as_ref()
    }

    /// Last stream status reported to the host.
    #[must_use]
    pub fn stream_status(&self) -> StreamStatus {
        self.stream_status
    }

    /// Handle one emission of the card stream.
    pub fn on_items_received<H: CarouselHost<P>>(
        &mut self,
        set: ItemSet<P>,
        host: &mut H,
        animator: &mut TransitionAnimator,
    ) -> UpdateOutcome {
        if self.pager.is_interacting() {
            let superseded = self.pending.replace(set).is_some();
            tracing::debug!(
                phase = %self.pager.phase(),
                superseded,
                "deferring card update until pager is idle"
            );
            return UpdateOutcome::Deferred { superseded };
        }
        UpdateOutcome::Applied(self.apply(set, host, animator))
    }

    /// Validate raw provider output, drop malformed entries, then proceed as
    /// [`on_items_received`](Self::on_items_received).
    pub fn on_raw_items_received<H: CarouselHost<P>>(
        &mut self,
        raw: Vec<RawItem<P>>,
        host: &mut H,
        animator: &mut TransitionAnimator,
    ) -> UpdateOutcome {
        let (set, errors) = ItemSet::from_raw(raw);
        for err in &errors {
            tracing::warn!(index = err.index(), error = %err, "dropping malformed card");
        }
        self.on_items_received(set, host, animator)
    }

    /// Record a pager phase transition. Entering idle picks up the page the
    /// gesture landed on, then applies the pending set, if any.
    pub fn on_interaction_phase_changed<H: CarouselHost<P>>(
        &mut self,
        phase: InteractionPhase,
        host: &mut H,
        animator: &mut TransitionAnimator,
    ) -> Option<AppliedUpdate> {
        if let Some(PhaseChange { from, to }) = self.pager.set_phase(phase) {
            tracing::trace!(%from, %to, "pager phase changed");
        }
        if !phase.is_idle() {
            return None;
        }
        let landed = self.pager.set_current_index(host.current_index());
        tracing::trace!(index = landed, "pager idle");
        let pending = self.pending.take()?;
        tracing::debug!("pager idle, applying pending card update");
        Some(self.apply(pending, host, animator))
    }

    /// The stream failed or ended. The host hears "no data" once; the cards
    /// on screen stay.
    pub fn on_stream_failed<H: CarouselHost<P>>(&mut self, reason: &str, host: &mut H) {
        tracing::warn!(
            reason,
            showing = self.last_applied.as_ref().map_or(0, ItemSet::len),
            "card stream failed, keeping last known cards"
        );
        self.report_stream_status(StreamStatus::NoData, host);
    }

    /// Forward a long press to the options menu. Preview instances ignore
    /// it. Returns whether the menu was opened.
    pub fn on_long_press<H: CarouselHost<P>>(&self, host: &mut H) -> bool {
        if self.preview_mode {
            return false;
        }
        host.open_options();
        true
    }

    /// Forget the gesture and any parked set (the carousel went away).
    pub fn on_detached(&mut self) {
        if self.pending.take().is_some() {
            tracing::debug!("dropping pending card update on detach");
        }
        self.pager.set_phase(InteractionPhase::Idle);
    }

    /// Apply `set` immediately.
    pub fn apply<H: CarouselHost<P>>(
        &mut self,
        set: ItemSet<P>,
        host: &mut H,
        animator: &mut TransitionAnimator,
    ) -> AppliedUpdate {
        let mirrored = host.is_mirrored();
        self.pager.set_mirrored(mirrored);
        let display = set.ranked(mirrored);

        let old_index = host.current_index();
        let anchor = self.pager.mirrored_anchor(old_index);
        let outgoing = host.card_at(old_index);

        let new_count = display.len();
        let reposition = if mirrored {
            Some(PagerState::reposition(new_count, anchor))
        } else if old_index >= new_count.max(1) {
            Some(PagerState::clamp_index(old_index, new_count))
        } else {
            None
        };
        host.set_items(display, reposition);
        self.pager.set_page_count(new_count);
        let index = self.pager.set_current_index(reposition.unwrap_or(old_index));

        let indicator_pages = set.len();
        host.set_indicator_page_count(indicator_pages);

        let transition = outgoing.map(|card| animator.request(card, host.viewport()));
        host.notify_items_changed();

        tracing::debug!(
            pages = new_count,
            index,
            mirrored,
            transition = ?transition,
            "applied card update"
        );
        self.last_applied = Some(set);
        self.report_stream_status(StreamStatus::Live, host);

        AppliedUpdate {
            page_count: new_count,
            index,
            repositioned: reposition.is_some(),
            indicator_pages,
            transition,
        }
    }

    fn report_stream_status<H: CarouselHost<P>>(&mut self, status: StreamStatus, host: &mut H) {
        if self.stream_status == status {
            return;
        }
        tracing::debug!(from = %self.stream_status, to = %status, "stream status changed");
        self.stream_status = status;
        host.set_stream_status(status);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{HostCall, RecordingHost};
    use smartspace_core::RankedItem;

    fn set(ids: &[(&str, f32)]) -> ItemSet<()> {
        ids.iter()
            .map(|&(id, score)| RankedItem::new(id, score, ()))
            .collect()
    }

    fn three() -> ItemSet<()> {
        set(&[("weather", 30.0), ("reminder", 20.0), ("quote", 10.0)])
    }

    struct Fixture {
        coord: UpdateCoordinator<()>,
        host: RecordingHost<()>,
        anim: TransitionAnimator,
    }

    impl Fixture {
        fn new(host: RecordingHost<()>) -> Self {
            Self {
                coord: UpdateCoordinator::default(),
                host,
                anim: TransitionAnimator::default(),
            }
        }

        fn receive(&mut self, items: ItemSet<()>) -> UpdateOutcome {
            self.coord
                .on_items_received(items, &mut self.host, &mut self.anim)
        }

        fn phase(&mut self, phase: InteractionPhase) -> Option<AppliedUpdate> {
            self.coord
                .on_interaction_phase_changed(phase, &mut self.host, &mut self.anim)
        }

        fn settle_animation(&mut self) {
            if let Some(id) = self.anim.interrupt() {
                self.anim.finish(id);
            }
        }
    }

    #[test]
    fn first_load_applies_without_transition() {
        let mut fx = Fixture::new(RecordingHost::new());
        let UpdateOutcome::Applied(applied) = fx.receive(three()) else {
            panic!("idle pager should apply");
        };
        assert_eq!(applied.page_count, 3);
        assert_eq!(applied.index, 0);
        assert_eq!(applied.transition, None);
        assert_eq!(fx.host.ids(), vec!["weather", "reminder", "quote"]);
        assert_eq!(fx.host.indicator_pages(), 3);
        assert_eq!(fx.host.refreshes(), 1);
    }

    #[test]
    fn host_calls_follow_apply_order() {
        let mut fx = Fixture::new(RecordingHost::new());
        fx.receive(three());
        let calls = fx.host.calls();
        assert!(matches!(calls[0], HostCall::SetItems { index: None, .. }));
        assert_eq!(calls[1], HostCall::IndicatorPages(3));
        assert_eq!(calls[2], HostCall::ItemsChanged);
    }

    #[test]
    fn replacing_visible_card_starts_transition() {
        let mut fx = Fixture::new(RecordingHost::new());
        fx.receive(three());
        let UpdateOutcome::Applied(applied) = fx.receive(three()) else {
            panic!("should apply");
        };
        assert!(matches!(
            applied.transition,
            Some(TransitionRequest::Started(_))
        ));
        assert_eq!(
            fx.anim.outgoing().map(|c| c.item_id.as_str()),
            Some("weather")
        );
    }

    #[test]
    fn transition_while_running_is_dropped_but_data_applies() {
        let mut fx = Fixture::new(RecordingHost::new());
        fx.receive(three());
        fx.receive(three());
        let UpdateOutcome::Applied(applied) =
            fx.receive(set(&[("status", 99.0), ("weather", 30.0)]))
        else {
            panic!("should apply");
        };
        assert_eq!(applied.transition, Some(TransitionRequest::Busy));
        assert_eq!(fx.host.ids(), vec!["status", "weather"]);
        assert_eq!(fx.host.refreshes(), 3);
    }

    #[test]
    fn updates_during_drag_are_deferred_latest_wins() {
        let mut fx = Fixture::new(RecordingHost::new());
        fx.receive(three());
        fx.settle_animation();
        fx.phase(InteractionPhase::Dragging);
        fx.host.clear_calls();

        assert_eq!(
            fx.receive(set(&[("a", 1.0), ("b", 2.0)])),
            UpdateOutcome::Deferred { superseded: false }
        );
        assert_eq!(
            fx.receive(set(&[("c", 1.0), ("d", 2.0), ("e", 3.0), ("f", 4.0)])),
            UpdateOutcome::Deferred { superseded: true }
        );
        assert!(fx.host.calls().is_empty(), "no visible mutation mid-gesture");
        assert_eq!(fx.host.ids(), vec!["weather", "reminder", "quote"]);

        assert_eq!(fx.phase(InteractionPhase::Settling), None);
        assert!(fx.host.calls().is_empty());

        let applied = fx.phase(InteractionPhase::Idle).expect("pending applies");
        assert_eq!(applied.page_count, 4);
        assert_eq!(fx.host.ids(), vec!["f", "e", "d", "c"]);
        assert!(fx.coord.pending().is_none());
        assert_eq!(fx.phase(InteractionPhase::Idle), None, "applied exactly once");
    }

    #[test]
    fn single_page_never_defers() {
        let mut fx = Fixture::new(RecordingHost::new());
        fx.receive(set(&[("only", 1.0)]));
        fx.phase(InteractionPhase::Dragging);
        assert!(matches!(
            fx.receive(set(&[("x", 1.0), ("y", 2.0)])),
            UpdateOutcome::Applied(_)
        ));
    }

    #[test]
    fn mirrored_index_tracks_same_card_across_growth() {
        let mut fx = Fixture::new(RecordingHost::mirrored());
        fx.receive(three());
        fx.host.swipe_to(1);
        let UpdateOutcome::Applied(applied) = fx.receive(set(&[
            ("weather", 30.0),
            ("reminder", 20.0),
            ("quote", 10.0),
            ("status", 5.0),
        ])) else {
            panic!("should apply");
        };
        assert_eq!(applied.index, 2);
        assert!(applied.repositioned);
        assert_eq!(fx.host.current_index(), 2);
        assert_eq!(fx.host.ids(), vec!["status", "quote", "reminder", "weather"]);
        assert_eq!(fx.host.ids()[2], "reminder");
    }

    #[test]
    fn mirrored_first_load_lands_on_top_ranked_card() {
        let mut fx = Fixture::new(RecordingHost::mirrored());
        let UpdateOutcome::Applied(applied) = fx.receive(three()) else {
            panic!("should apply");
        };
        // no previous pages: anchor 0 -> last page, which is the best card
        assert_eq!(applied.index, 2);
        assert_eq!(fx.host.ids()[applied.index], "weather");
    }

    #[test]
    fn shrink_clamps_index_when_not_mirrored() {
        let mut fx = Fixture::new(RecordingHost::new());
        fx.receive(three());
        fx.host.swipe_to(2);
        let UpdateOutcome::Applied(applied) = fx.receive(set(&[("a", 1.0)])) else {
            panic!("should apply");
        };
        assert_eq!(applied.index, 0);
        assert!(applied.repositioned);
        assert_eq!(fx.coord.pager().current_index(), 0);
    }

    #[test]
    fn empty_set_clears_pages_and_still_animates_outgoing() {
        let mut fx = Fixture::new(RecordingHost::new());
        fx.receive(three());
        let UpdateOutcome::Applied(applied) = fx.receive(ItemSet::default()) else {
            panic!("should apply");
        };
        assert_eq!(applied.page_count, 0);
        assert_eq!(applied.index, 0);
        assert_eq!(applied.indicator_pages, 0);
        assert!(matches!(
            applied.transition,
            Some(TransitionRequest::Started(_))
        ));
        assert!(fx.anim.frame().is_some());
    }

    #[test]
    fn raw_items_drop_malformed_entries() {
        let mut fx = Fixture::new(RecordingHost::new());
        let raw = vec![
            RawItem::complete("weather", 3.0, ()),
            RawItem {
                id: None,
                score: Some(9.0),
                payload: Some(()),
            },
            RawItem::complete("quote", 1.0, ()),
        ];
        let UpdateOutcome::Applied(applied) =
            fx.coord
                .on_raw_items_received(raw, &mut fx.host, &mut fx.anim)
        else {
            panic!("should apply");
        };
        assert_eq!(applied.page_count, 2);
        assert_eq!(applied.indicator_pages, 2);
    }

    #[test]
    fn stream_failure_reports_no_data_and_keeps_last_cards() {
        let mut fx = Fixture::new(RecordingHost::new());
        fx.receive(three());
        fx.host.clear_calls();
        fx.coord.on_stream_failed("provider offline", &mut fx.host);
        fx.coord.on_stream_failed("still offline", &mut fx.host);
        assert_eq!(
            fx.host.calls(),
            &[HostCall::StreamStatus(StreamStatus::NoData)],
            "reported once, items untouched"
        );
        assert_eq!(fx.host.ids(), vec!["weather", "reminder", "quote"]);
        assert_eq!(fx.coord.last_applied().map(ItemSet::len), Some(3));
        assert_eq!(fx.coord.stream_status(), StreamStatus::NoData);
    }

    #[test]
    fn next_apply_clears_no_data() {
        let mut fx = Fixture::new(RecordingHost::new());
        fx.receive(three());
        fx.coord.on_stream_failed("provider offline", &mut fx.host);
        fx.host.clear_calls();

        fx.receive(set(&[("status", 99.0)]));
        assert_eq!(
            fx.host.calls().last(),
            Some(&HostCall::StreamStatus(StreamStatus::Live))
        );
        assert_eq!(fx.host.stream_status(), StreamStatus::Live);
        assert_eq!(fx.coord.stream_status(), StreamStatus::Live);
    }

    #[test]
    fn deferred_set_does_not_clear_no_data() {
        let mut fx = Fixture::new(RecordingHost::new());
        fx.receive(three());
        fx.settle_animation();
        fx.coord.on_stream_failed("provider offline", &mut fx.host);
        fx.phase(InteractionPhase::Dragging);
        fx.receive(three());
        assert_eq!(fx.host.stream_status(), StreamStatus::NoData);
        fx.phase(InteractionPhase::Idle);
        assert_eq!(fx.host.stream_status(), StreamStatus::Live);
    }

    #[test]
    fn idle_picks_up_swiped_index() {
        let mut fx = Fixture::new(RecordingHost::new());
        fx.receive(three());
        fx.phase(InteractionPhase::Dragging);
        fx.host.swipe_to(2);
        assert_eq!(fx.coord.pager().current_index(), 0, "unchanged mid-gesture");
        fx.phase(InteractionPhase::Settling);
        fx.phase(InteractionPhase::Idle);
        assert_eq!(fx.coord.pager().current_index(), 2);
    }

    #[test]
    fn long_press_respects_preview_mode() {
        let mut host = RecordingHost::<()>::new();
        assert!(UpdateCoordinator::<()>::new(false).on_long_press(&mut host));
        assert!(!UpdateCoordinator::<()>::new(true).on_long_press(&mut host));
        assert_eq!(host.calls(), &[HostCall::OpenOptions]);
    }

    #[test]
    fn detach_drops_pending_and_resets_phase() {
        let mut fx = Fixture::new(RecordingHost::new());
        fx.receive(three());
        fx.phase(InteractionPhase::Dragging);
        fx.receive(set(&[("a", 1.0), ("b", 1.0)]));
        fx.coord.on_detached();
        assert!(fx.coord.pending().is_none());
        assert_eq!(fx.coord.pager().phase(), InteractionPhase::Idle);
    }
}
