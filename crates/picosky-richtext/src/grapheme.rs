//! Grapheme-cluster counting for the composer's input limit.
//!
//! Limits are expressed in user-perceived characters: a combining sequence, a flag, or an emoji
//! joined with ZWJ counts once, no matter how many codepoints or bytes it takes.

use unicode_segmentation::UnicodeSegmentation;

/// Number of extended grapheme clusters in `text`.
pub fn count(text: &str) -> usize {
    text.graphemes(true).count()
}

/// Enforces a hard grapheme limit on composer input before it is inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphemeCounter {
    limit: usize,
}

impl GraphemeCounter {
    /// Limit used by the picosky composer.
    pub const DEFAULT_LIMIT: usize = 12;

    pub fn new(limit: usize) -> Self {
        Self { limit }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn count(&self, text: &str) -> usize {
        count(text)
    }

    /// Whether typing anything more onto `text` would push it past the limit.
    ///
    /// True once `text` already holds `limit` clusters. Use [`would_exceed_with`] when the
    /// appended text is known, since a trailing combining mark can merge into the last cluster.
    ///
    /// [`would_exceed_with`]: Self::would_exceed_with
    pub fn would_exceed(&self, text: &str) -> bool {
        self.count(text) >= self.limit
    }

    /// Whether `text` followed by `appended` would hold more than `limit` clusters.
    pub fn would_exceed_with(&self, text: &str, appended: &str) -> bool {
        if appended.is_empty() {
            return self.count(text) > self.limit;
        }
        let mut combined = String::with_capacity(text.len() + appended.len());
        combined.push_str(text);
        combined.push_str(appended);
        self.count(&combined) > self.limit
    }

    /// Paste guard: rejects clipboard text that alone exceeds the limit, or that would
    /// overflow once joined with what is already typed.
    pub fn accepts_paste(&self, current: &str, pasted: &str) -> bool {
        self.count(pasted) <= self.limit && !self.would_exceed_with(current, pasted)
    }

    /// Clusters left before the limit is reached.
    pub fn remaining(&self, text: &str) -> usize {
        self.limit.saturating_sub(self.count(text))
    }
}

impl Default for GraphemeCounter {
    fn default() -> Self {
        Self::new(Self::DEFAULT_LIMIT)
    }
}
