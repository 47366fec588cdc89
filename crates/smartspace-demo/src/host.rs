//! A host that renders the carousel as log lines.

use smartspace::{
    CardRef, CarouselHost, DisplaySet, Error, PageOffset, Result, StreamStatus, Viewport,
};

use crate::cards::Card;

pub struct LoggingHost {
    display: Option<DisplaySet<Card>>,
    index: usize,
    generation: u64,
    mirrored: bool,
    viewport: Viewport,
    indicator_pages: usize,
}

impl LoggingHost {
    pub fn new(mirrored: bool, viewport: Viewport) -> Self {
        Self {
            display: None,
            index: 0,
            generation: 0,
            mirrored,
            viewport,
            indicator_pages: 0,
        }
    }

    pub fn page_count(&self) -> usize {
        self.display.as_ref().map_or(0, DisplaySet::len)
    }

    /// The user lands on `index`.
    pub fn swipe_to(&mut self, index: usize) -> Result<()> {
        let count = self.page_count();
        if index >= count.max(1) {
            return Err(Error::IndexOutOfRange { index, count });
        }
        self.index = index;
        tracing::info!(index, card = ?self.visible_id(), "swiped");
        Ok(())
    }

    fn visible_id(&self) -> Option<&str> {
        self.display
            .as_ref()?
            .get(self.index)
            .map(|item| item.id.as_str())
    }
}

impl CarouselHost<Card> for LoggingHost {
    fn current_index(&self) -> usize {
        self.index
    }

    fn card_at(&self, index: usize) -> Option<CardRef> {
        let item = self.display.as_ref()?.get(index)?;
        Some(CardRef::new(item.id.clone(), self.generation))
    }

    fn set_items(&mut self, display: DisplaySet<Card>, index: Option<usize>) {
        let count = display.len();
        let pages: Vec<String> = display
            .iter()
            .map(|item| format!("{}: {}", item.id, item.payload))
            .collect();
        self.display = Some(display);
        self.generation += 1;
        if let Some(index) = index {
            self.index = index;
        }
        self.index = self.index.min(count.saturating_sub(1));
        tracing::info!(?pages, index = self.index, "pages replaced");
    }

    fn set_indicator_page_count(&mut self, pages: usize) {
        self.indicator_pages = pages;
        tracing::debug!(pages, "indicator updated");
    }

    fn set_indicator_offset(&mut self, offset: PageOffset) {
        tracing::trace!(
            page = offset.page,
            fraction = offset.fraction,
            dots = self.indicator_pages,
            "indicator offset"
        );
    }

    fn notify_items_changed(&mut self) {
        tracing::debug!(generation = self.generation, "pages rebound");
    }

    fn is_mirrored(&self) -> bool {
        self.mirrored
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn open_options(&mut self) {
        tracing::info!("options menu opened");
    }

    fn set_stream_status(&mut self, status: StreamStatus) {
        tracing::info!(%status, pages = self.page_count(), "card feed status");
    }
}
