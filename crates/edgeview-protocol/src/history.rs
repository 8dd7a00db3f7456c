//! Ordered, append-only history of rendered analyses.
//!
//! The history is a plain data structure with no notion of how it is
//! displayed. Entries are prepended, so iteration yields the most
//! recent entry first.

use std::collections::VecDeque;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::response::{AnalysisResult, Outcome, data_url};

/// Label used for the entry showing the uploaded image itself.
pub const ORIGINAL_LABEL: &str = "Original";

/// Source of entry timestamps.
///
/// Abstracted so tests can pin timestamps; production code uses
/// [`LocalClock`].
pub trait Clock {
    /// Current time formatted for display.
    fn timestamp(&self) -> String;
}

/// [`Clock`] reading the local wall-clock time of day (`HH:MM:SS`).
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn timestamp(&self) -> String {
        chrono::Local::now().format("%H:%M:%S").to_string()
    }
}

/// One rendered record. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Algorithm name, or [`ORIGINAL_LABEL`] for the upload preview.
    pub label: String,
    /// When the entry was created.
    pub timestamp: String,
    /// `data:` URL of the image.
    pub image_source: String,
}

impl HistoryEntry {
    /// Create an entry stamped with the current time from `clock`.
    #[must_use]
    pub fn new(label: impl Into<String>, image_source: impl Into<String>, clock: &impl Clock) -> Self {
        Self {
            label: label.into(),
            timestamp: clock.timestamp(),
            image_source: image_source.into(),
        }
    }

    /// Entry previewing the uploaded image.
    ///
    /// The MIME type is sniffed from the bytes; unrecognized data is
    /// labelled `application/octet-stream`.
    #[must_use]
    pub fn original(image: &[u8], clock: &impl Clock) -> Self {
        let source = data_url(preview_mime(image), &STANDARD.encode(image));
        Self::new(ORIGINAL_LABEL, source, clock)
    }

    /// Entry for one algorithm result.
    #[must_use]
    pub fn from_result(label: &str, result: &AnalysisResult, clock: &impl Clock) -> Self {
        Self::new(label, result.data_url(), clock)
    }

    /// One entry per result of `outcome`, in rendering order.
    #[must_use]
    pub fn for_outcome(outcome: &Outcome, clock: &impl Clock) -> Vec<Self> {
        outcome
            .labelled()
            .into_iter()
            .map(|(label, result)| Self::from_result(label, result, clock))
            .collect()
    }
}

/// MIME type of an uploaded image, sniffed from its magic bytes.
#[must_use]
pub fn preview_mime(image: &[u8]) -> &'static str {
    image::guess_format(image).map_or("application/octet-stream", |format| format.to_mime_type())
}

/// Append-only sequence of [`HistoryEntry`], newest first.
///
/// Unbounded: nothing is ever evicted for the life of the session.
#[derive(Debug, Clone, Default)]
pub struct ResultHistory {
    entries: VecDeque<HistoryEntry>,
}

impl ResultHistory {
    /// Create an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepend a single entry.
    pub fn record(&mut self, entry: HistoryEntry) {
        self.entries.push_front(entry);
    }

    /// Prepend `entries` as one contiguous group, keeping their order.
    ///
    /// After `record_batch([a, b, c])` the history reads `a, b, c, ...`.
    pub fn record_batch(&mut self, entries: impl IntoIterator<Item = HistoryEntry>) {
        let batch: Vec<_> = entries.into_iter().collect();
        for entry in batch.into_iter().rev() {
            self.entries.push_front(entry);
        }
    }

    /// Number of entries recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The most recently recorded entry.
    #[must_use]
    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.front()
    }

    /// Entries, newest first.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    /// Snapshot of the entries, newest first.
    #[must_use]
    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.entries.iter().cloned().collect()
    }
}

impl<'a> IntoIterator for &'a ResultHistory {
    type Item = &'a HistoryEntry;
    type IntoIter = std::collections::vec_deque::Iter<'a, HistoryEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
