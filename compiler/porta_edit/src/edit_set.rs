//! Ordered, non-overlapping edit list.
//!
//! # Invariants
//!
//! - Entries are sorted by `position` in original-buffer coordinates.
//! - No two entries share a position.
//! - No entry's replaced span overlaps another's.
//!
//! An insert that would break any of these is rejected and the set is left
//! unchanged. Rejection is the de-duplication rule, not an error.

use tracing::debug;

/// One proposed edit: replace `current_length` bytes at `position` of the
/// original buffer with `new_text`.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct TextReplacement {
    pub new_text: String,
    pub position: u32,
    pub current_length: u32,
}

impl TextReplacement {
    pub fn new(new_text: impl Into<String>, position: u32, current_length: u32) -> Self {
        TextReplacement {
            new_text: new_text.into(),
            position,
            current_length,
        }
    }

    /// End of the replaced span in original coordinates.
    pub fn end(&self) -> u32 {
        self.position + self.current_length
    }

    /// Length change this edit causes. Positive grows the buffer.
    pub fn delta(&self) -> i64 {
        let added = i64::try_from(self.new_text.len()).unwrap_or(i64::MAX);
        added - i64::from(self.current_length)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EditSet {
    entries: Vec<TextReplacement>,
}

impl EditSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert in position order.
    ///
    /// Returns `false`, leaving the set unchanged, if an entry already sits
    /// at `position` or the replaced span overlaps a neighbour.
    pub fn insert(&mut self, new_text: impl Into<String>, position: u32, current_length: u32) -> bool {
        self.insert_replacement(TextReplacement::new(new_text, position, current_length))
    }

    pub fn insert_replacement(&mut self, replacement: TextReplacement) -> bool {
        let index = match self
            .entries
            .binary_search_by_key(&replacement.position, |e| e.position)
        {
            Ok(_) => return false,
            Err(index) => index,
        };

        let overlaps_previous = index
            .checked_sub(1)
            .is_some_and(|prev| self.entries[prev].end() > replacement.position);
        let overlaps_next = self
            .entries
            .get(index)
            .is_some_and(|next| replacement.end() > next.position);
        if overlaps_previous || overlaps_next {
            return false;
        }

        self.entries.insert(index, replacement);
        true
    }

    /// Fold `other` into this set with the same rule as [`insert`](Self::insert).
    ///
    /// Entries that lose are dropped; the number dropped is returned.
    pub fn merge(&mut self, other: EditSet) -> usize {
        let mut dropped = 0;
        for replacement in other.entries {
            if !self.insert_replacement(replacement) {
                dropped += 1;
            }
        }
        if dropped > 0 {
            debug!(dropped, "edits dropped while merging");
        }
        dropped
    }

    /// Apply every entry to `original` in one left-to-right pass.
    ///
    /// Each entry lands at `position + delta`, where `delta` is the running
    /// sum of the length changes made by earlier entries. Positions past the
    /// end of the buffer are clamped to it.
    pub fn apply(&self, original: &str) -> String {
        if self.entries.is_empty() {
            return original.to_owned();
        }
        let bytes = self.apply_bytes(original.as_bytes());
        match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
        }
    }

    pub fn apply_bytes(&self, original: &[u8]) -> Vec<u8> {
        let capacity = i64::try_from(original.len())
            .unwrap_or(i64::MAX)
            .saturating_add(self.total_delta().max(0));
        let mut buffer = Vec::with_capacity(usize::try_from(capacity).unwrap_or(original.len()));
        buffer.extend_from_slice(original);

        let mut offset_delta: i64 = 0;
        for entry in &self.entries {
            let shifted = i64::from(entry.position).saturating_add(offset_delta);
            let start = usize::try_from(shifted).unwrap_or(0).min(buffer.len());
            let end = start
                .saturating_add(entry.current_length as usize)
                .min(buffer.len());
            buffer.splice(start..end, entry.new_text.bytes());
            offset_delta += entry.delta();
        }
        buffer
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TextReplacement> {
        self.entries.iter()
    }

    /// Total length change after applying every entry.
    pub fn total_delta(&self) -> i64 {
        self.entries.iter().map(TextReplacement::delta).sum()
    }

    pub fn into_vec(self) -> Vec<TextReplacement> {
        self.entries
    }
}

impl<'a> IntoIterator for &'a EditSet {
    type Item = &'a TextReplacement;
    type IntoIter = std::slice::Iter<'a, TextReplacement>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests;
