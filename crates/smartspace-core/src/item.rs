#![forbid(unsafe_code)]

//! Ranked card snapshots.
//!
//! An [`ItemSet`] is one emission of the upstream card stream: an ordered,
//! immutable list of [`RankedItem`]s in arrival order. Ranking it produces a
//! [`DisplaySet`], the order in which the pager lays out its pages.
//!
//! # Invariants
//!
//! 1. `ItemSet` is immutable once constructed; clones share storage.
//! 2. `DisplaySet::len() == ItemSet::len()` for the set it was ranked from.
//! 3. Ranking is descending by score. Equal scores keep arrival order
//!    (explicit tie-break on the original index, not a property of the sort).
//! 4. A mirrored ranking is exactly the reverse of the unmirrored one.
//!
//! # Failure Modes
//!
//! - Raw items missing an id, score, or payload (or carrying a non-finite
//!   score) are excluded by [`ItemSet::from_raw`] and reported as
//!   [`ItemError`]s. The remaining items are kept.

use std::fmt;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// RankedItem
// ---------------------------------------------------------------------------

/// A single card candidate with its ranking score.
///
/// The payload is opaque to the carousel; only the card renderer looks at it.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedItem<P> {
    /// Stable identifier of the card.
    pub id: String,
    /// Ranking score. Higher scores are shown first.
    pub score: f32,
    /// Renderer-specific content.
    pub payload: P,
}

impl<P> RankedItem<P> {
    /// Create a ranked item.
    #[must_use]
    pub fn new(id: impl Into<String>, score: f32, payload: P) -> Self {
        Self {
            id: id.into(),
            score,
            payload,
        }
    }
}

// ---------------------------------------------------------------------------
// RawItem
// ---------------------------------------------------------------------------

/// An item as handed over by a provider, before validation.
#[derive(Debug, Clone, PartialEq)]
pub struct RawItem<P> {
    pub id: Option<String>,
    pub score: Option<f32>,
    pub payload: Option<P>,
}

impl<P> RawItem<P> {
    /// A raw item with every field present.
    #[must_use]
    pub fn complete(id: impl Into<String>, score: f32, payload: P) -> Self {
        Self {
            id: Some(id.into()),
            score: Some(score),
            payload: Some(payload),
        }
    }

    /// Validate into a [`RankedItem`]. `index` is the position in the raw
    /// emission and is only used for error reporting.
    pub fn validate(self, index: usize) -> Result<RankedItem<P>, ItemError> {
        let id = match self.id {
            Some(id) if !id.trim().is_empty() => id,
            _ => return Err(ItemError::MissingId { index }),
        };
        let score = match self.score {
            Some(score) if score.is_finite() => score,
            Some(score) => return Err(ItemError::NonFiniteScore { index, id, score }),
            None => return Err(ItemError::MissingScore { index, id }),
        };
        let Some(payload) = self.payload else {
            return Err(ItemError::MissingPayload { index, id });
        };
        Ok(RankedItem { id, score, payload })
    }
}

/// Why a raw item was excluded from an [`ItemSet`].
#[derive(Debug, Clone, PartialEq)]
pub enum ItemError {
    /// The id is absent or blank.
    MissingId { index: usize },
    /// No score was provided.
    MissingScore { index: usize, id: String },
    /// The score is NaN or infinite.
    NonFiniteScore { index: usize, id: String, score: f32 },
    /// No renderable payload was provided.
    MissingPayload { index: usize, id: String },
}

impl ItemError {
    /// Position of the offending item in the raw emission.
    #[must_use]
    pub fn index(&self) -> usize {
        match self {
            Self::MissingId { index }
            | Self::MissingScore { index, .. }
            | Self::NonFiniteScore { index, .. }
            | Self::MissingPayload { index, .. } => *index,
        }
    }
}

impl fmt::Display for ItemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingId { index } => write!(f, "item {index}: missing id"),
            Self::MissingScore { index, id } => write!(f, "item {index} ({id}): missing score"),
            Self::NonFiniteScore { index, id, score } => {
                write!(f, "item {index} ({id}): non-finite score {score}")
            }
            Self::MissingPayload { index, id } => {
                write!(f, "item {index} ({id}): missing payload")
            }
        }
    }
}

impl std::error::Error for ItemError {}

// ---------------------------------------------------------------------------
// ItemSet
// ---------------------------------------------------------------------------

/// One emission of the card stream, in arrival order.
pub struct ItemSet<P> {
    items: Arc<[RankedItem<P>]>,
}

// Manual impls: cloning shares the snapshot, so no bound on `P` is needed.
impl<P> Clone for ItemSet<P> {
    fn clone(&self) -> Self {
        Self {
            items: Arc::clone(&self.items),
        }
    }
}

impl<P: fmt::Debug> fmt::Debug for ItemSet<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.items.iter()).finish()
    }
}

impl<P: PartialEq> PartialEq for ItemSet<P> {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl<P> Default for ItemSet<P> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<P> FromIterator<RankedItem<P>> for ItemSet<P> {
    fn from_iter<I: IntoIterator<Item = RankedItem<P>>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<P> ItemSet<P> {
    /// Wrap already-validated items.
    #[must_use]
    pub fn new(items: Vec<RankedItem<P>>) -> Self {
        Self {
            items: items.into(),
        }
    }

    /// Build a set from raw provider output, excluding malformed entries.
    ///
    /// Returns the valid set together with one error per excluded item.
    pub fn from_raw(raw: impl IntoIterator<Item = RawItem<P>>) -> (Self, Vec<ItemError>) {
        let mut items = Vec::new();
        let mut errors = Vec::new();
        for (index, item) in raw.into_iter().enumerate() {
            match item.validate(index) {
                Ok(item) => items.push(item),
                Err(err) => errors.push(err),
            }
        }
        (Self::new(items), errors)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&RankedItem<P>> {
        self.items.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RankedItem<P>> {
        self.items.iter()
    }

    /// Whether both handles point at the same snapshot.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.items, &other.items)
    }

    /// Rank for display: descending score, arrival order among equal
    /// scores, then reversed when `mirrored`.
    #[must_use]
    pub fn ranked(&self, mirrored: bool) -> DisplaySet<P> {
        let mut order: Vec<usize> = (0..self.items.len()).collect();
        order.sort_by(|&a, &b| {
            self.items[b]
                .score
                .total_cmp(&self.items[a].score)
                .then(a.cmp(&b))
        });
        if mirrored {
            order.reverse();
        }
        DisplaySet {
            source: self.clone(),
            order,
            mirrored,
        }
    }
}

// ---------------------------------------------------------------------------
// DisplaySet
// ---------------------------------------------------------------------------

/// The page order derived from an [`ItemSet`].
///
/// Holds a handle to the source snapshot plus a permutation, so it never
/// copies payloads.
pub struct DisplaySet<P> {
    source: ItemSet<P>,
    order: Vec<usize>,
    mirrored: bool,
}

impl<P> Clone for DisplaySet<P> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            order: self.order.clone(),
            mirrored: self.mirrored,
        }
    }
}

impl<P> fmt::Debug for DisplaySet<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DisplaySet")
            .field("ids", &self.ids())
            .field("mirrored", &self.mirrored)
            .finish()
    }
}

impl<P> DisplaySet<P> {
    /// Page at `index`, or `None` past the end.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&RankedItem<P>> {
        self.order.get(index).and_then(|&i| self.source.get(i))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    #[must_use]
    pub fn is_mirrored(&self) -> bool {
        self.mirrored
    }

    /// The snapshot this ranking was derived from.
    #[must_use]
    pub fn source(&self) -> &ItemSet<P> {
        &self.source
    }

    pub fn iter(&self) -> impl Iterator<Item = &RankedItem<P>> {
        self.order.iter().filter_map(|&i| self.source.get(i))
    }

    /// Card ids in page order.
    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        self.iter().map(|item| item.id.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(scores: &[(&str, f32)]) -> ItemSet<()> {
        scores
            .iter()
            .map(|&(id, score)| RankedItem::new(id, score, ()))
            .collect()
    }

    #[test]
    fn ranks_descending_and_keeps_ties_in_arrival_order() {
        let items = set(&[("a10", 10.0), ("b30", 30.0), ("c30", 30.0), ("d5", 5.0)]);
        assert_eq!(items.ranked(false).ids(), vec!["b30", "c30", "a10", "d5"]);
    }

    #[test]
    fn mirrored_ranking_is_reversed() {
        let items = set(&[("a10", 10.0), ("b30", 30.0), ("c30", 30.0), ("d5", 5.0)]);
        assert_eq!(items.ranked(true).ids(), vec!["d5", "a10", "c30", "b30"]);
    }

    #[test]
    fn ranking_preserves_length() {
        let items = set(&[("x", 1.0), ("y", 1.0), ("z", 2.0)]);
        assert_eq!(items.ranked(false).len(), items.len());
        assert_eq!(items.ranked(true).len(), items.len());
    }

    #[test]
    fn empty_set_ranks_to_empty_display() {
        let items: ItemSet<()> = ItemSet::default();
        let display = items.ranked(true);
        assert!(display.is_empty());
        assert!(display.get(0).is_none());
    }

    #[test]
    fn from_raw_excludes_malformed_items_only() {
        let raw = vec![
            RawItem::complete("weather", 40.0, 1u8),
            RawItem {
                id: None,
                score: Some(10.0),
                payload: Some(2),
            },
            RawItem {
                id: Some("quote".into()),
                score: Some(f32::NAN),
                payload: Some(3),
            },
            RawItem {
                id: Some("status".into()),
                score: Some(100.0),
                payload: None,
            },
            RawItem {
                id: Some("reminder".into()),
                score: None,
                payload: Some(5),
            },
            RawItem::complete("battery", 12.0, 6u8),
        ];
        let (items, errors) = ItemSet::from_raw(raw);
        let ids: Vec<_> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["weather", "battery"]);
        let indices: Vec<_> = errors.iter().map(ItemError::index).collect();
        assert_eq!(indices, vec![1, 2, 3, 4]);
        assert!(matches!(errors[1], ItemError::NonFiniteScore { .. }));
    }

    #[test]
    fn blank_id_is_malformed() {
        let raw = RawItem::complete("   ", 1.0, ());
        assert_eq!(raw.validate(7), Err(ItemError::MissingId { index: 7 }));
    }

    #[test]
    fn clones_share_the_snapshot() {
        let items = set(&[("a", 1.0)]);
        let copy = items.clone();
        assert!(items.ptr_eq(&copy));
        assert!(items.ranked(false).source().ptr_eq(&items));
    }

    #[test]
    fn item_error_display_names_the_item() {
        let err = ItemError::MissingPayload {
            index: 2,
            id: "status".into(),
        };
        assert_eq!(err.to_string(), "item 2 (status): missing payload");
    }
}
