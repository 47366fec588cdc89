#![forbid(unsafe_code)]

//! The seam between the coordinator and the widget that owns the pager.
//!
//! A [`CarouselHost`] owns the pager widget, its card renderers, and the page
//! indicator. The coordinator only reaches it through these operations; no
//! other component mutates the host's item list or index.

use smartspace_core::{DisplaySet, PageOffset};

/// Handle to a rendered card.
///
/// `generation` counts item-list replacements on the host, so the card shown
/// for the same id before and after an update compare unequal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CardRef {
    pub item_id: String,
    pub generation: u64,
}

impl CardRef {
    #[must_use]
    pub fn new(item_id: impl Into<String>, generation: u64) -> Self {
        Self {
            item_id: item_id.into(),
            generation,
        }
    }
}

/// Size of the pager surface, in host units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Whether the card streams are currently delivering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StreamStatus {
    #[default]
    Live,
    /// A stream failed or ended while attached. The last applied cards stay
    /// on screen.
    NoData,
}

impl std::fmt::Display for StreamStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Live => f.write_str("live"),
            Self::NoData => f.write_str("no-data"),
        }
    }
}

/// Operations the coordinator needs from the pager owner.
pub trait CarouselHost<P> {
    /// Page the pager is showing.
    fn current_index(&self) -> usize;

    /// Card currently rendered at `index`, if any.
    fn card_at(&self, index: usize) -> Option<CardRef>;

    /// Replace the backing item list. When `index` is set, jump to it
    /// without animating the page change.
    fn set_items(&mut self, display: DisplaySet<P>, index: Option<usize>);

    fn set_indicator_page_count(&mut self, pages: usize);

    fn set_indicator_offset(&mut self, offset: PageOffset);

    /// Structural refresh of every page.
    fn notify_items_changed(&mut self);

    /// Reading direction, consulted once per apply.
    fn is_mirrored(&self) -> bool;

    fn viewport(&self) -> Viewport;

    /// Long-press entry point into the options menu.
    fn open_options(&mut self) {}

    /// Called when stream delivery flips between live and no data. Never
    /// touches the item list.
    fn set_stream_status(&mut self, _status: StreamStatus) {}
}

#[cfg(any(test, feature = "test-helpers"))]
pub use recording::{HostCall, RecordingHost};

#[cfg(any(test, feature = "test-helpers"))]
mod recording {
    use super::*;

    /// One adapter call as seen by [`RecordingHost`].
    #[derive(Debug, Clone, PartialEq)]
    pub enum HostCall {
        SetItems { ids: Vec<String>, index: Option<usize> },
        IndicatorPages(usize),
        IndicatorOffset(PageOffset),
        ItemsChanged,
        OpenOptions,
        StreamStatus(StreamStatus),
    }

    /// In-memory host that records every call, for tests.
    #[derive(Debug)]
    pub struct RecordingHost<P> {
        display: Option<DisplaySet<P>>,
        index: usize,
        generation: u64,
        mirrored: bool,
        viewport: Viewport,
        indicator_pages: usize,
        stream_status: StreamStatus,
        calls: Vec<HostCall>,
    }

    impl<P> Default for RecordingHost<P> {
        fn default() -> Self {
            Self {
                display: None,
                index: 0,
                generation: 0,
                mirrored: false,
                viewport: Viewport::new(360.0, 120.0),
                indicator_pages: 0,
                stream_status: StreamStatus::Live,
                calls: Vec::new(),
            }
        }
    }

    impl<P> RecordingHost<P> {
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Right-to-left host.
        #[must_use]
        pub fn mirrored() -> Self {
            Self {
                mirrored: true,
                ..Self::default()
            }
        }

        pub fn set_mirrored(&mut self, mirrored: bool) {
            self.mirrored = mirrored;
        }

        /// Simulate the user landing on `index`.
        pub fn swipe_to(&mut self, index: usize) {
            let count = self.page_count();
            self.index = index.min(count.saturating_sub(1));
        }

        #[must_use]
        pub fn page_count(&self) -> usize {
            self.display.as_ref().map_or(0, DisplaySet::len)
        }

        #[must_use]
        pub fn display(&self) -> Option<&DisplaySet<P>> {
            self.display.as_ref()
        }

        /// Card ids in page order.
        #[must_use]
        pub fn ids(&self) -> Vec<String> {
            self.display.as_ref().map_or_else(Vec::new, |d| {
                d.ids().into_iter().map(str::to_owned).collect()
            })
        }

        #[must_use]
        pub fn indicator_pages(&self) -> usize {
            self.indicator_pages
        }

        #[must_use]
        pub fn stream_status(&self) -> StreamStatus {
            self.stream_status
        }

        #[must_use]
        pub fn calls(&self) -> &[HostCall] {
            &self.calls
        }

        pub fn clear_calls(&mut self) {
            self.calls.clear();
        }

        /// Number of structural refreshes seen.
        #[must_use]
        pub fn refreshes(&self) -> usize {
            self.calls
                .iter()
                .filter(|c| matches!(c, HostCall::ItemsChanged))
                .count()
        }
    }

    impl<P> CarouselHost<P> for RecordingHost<P> {
        fn current_index(&self) -> usize {
            self.index
        }

        fn card_at(&self, index: usize) -> Option<CardRef> {
            let item = self.display.as_ref()?.get(index)?;
            Some(CardRef::new(item.id.clone(), self.generation))
        }

        fn set_items(&mut self, display: DisplaySet<P>, index: Option<usize>) {
            self.calls.push(HostCall::SetItems {
                ids: display.ids().into_iter().map(str::to_owned).collect(),
                index,
            });
            let count = display.len();
            self.display = Some(display);
            self.generation += 1;
            let target = index.unwrap_or(self.index);
            self.index = target.min(count.saturating_sub(1));
        }

        fn set_indicator_page_count(&mut self, pages: usize) {
            self.indicator_pages = pages;
            self.calls.push(HostCall::IndicatorPages(pages));
        }

        fn set_indicator_offset(&mut self, offset: PageOffset) {
            self.calls.push(HostCall::IndicatorOffset(offset));
        }

        fn notify_items_changed(&mut self) {
            self.calls.push(HostCall::ItemsChanged);
        }

        fn is_mirrored(&self) -> bool {
            self.mirrored
        }

        fn viewport(&self) -> Viewport {
            self.viewport
        }

        fn open_options(&mut self) {
            self.calls.push(HostCall::OpenOptions);
        }

        fn set_stream_status(&mut self, status: StreamStatus) {
            self.stream_status = status;
            self.calls.push(HostCall::StreamStatus(status));
        }
    }
}
