//! Byte spans and line/column lookup for natpl source

#![allow(clippy::cast_possible_truncation)] // Spans are u32; programs over 4GB are unsupported

use std::ops::Range;

/// A half-open byte range in the source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    #[must_use]
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Smallest span covering both `self` and `other`
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Span for nodes that have no place in the source (synthesized by the runtime)
    #[must_use]
    pub const fn dummy() -> Self {
        Self {
            start: u32::MAX,
            end: u32::MAX,
        }
    }

    #[must_use]
    pub const fn is_dummy(&self) -> bool {
        self.start == u32::MAX && self.end == u32::MAX
    }

    #[must_use]
    pub const fn as_range(&self) -> Range<usize> {
        self.start as usize..self.end as usize
    }
}

impl From<Range<usize>> for Span {
    fn from(range: Range<usize>) -> Self {
        Self::new(range.start as u32, range.end as u32)
    }
}

impl Default for Span {
    fn default() -> Self {
        Self::dummy()
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// 1-indexed line and column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub line: u32,
    /// Counted in characters, not bytes
    pub column: u32,
}

impl Location {
    #[must_use]
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Maps byte offsets of one source text to line/column locations
#[derive(Debug, Clone)]
pub struct LineIndex<'source> {
    source: &'source str,
    line_starts: Vec<u32>,
}

impl<'source> LineIndex<'source> {
    #[must_use]
    pub fn new(source: &'source str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(
                source
                    .match_indices('\n')
                    .map(|(i, _)| (i + 1) as u32),
            )
            .collect();
        Self {
            source,
            line_starts,
        }
    }

    /// Location of a byte offset. Offsets past the end clamp to the end of input.
    #[must_use]
    pub fn location(&self, offset: u32) -> Location {
        let offset = offset.min(self.source.len() as u32);
        let line = self
            .line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1);
        let line_start = self.line_starts[line] as usize;
        let column = self.source[line_start..offset as usize].chars().count() as u32 + 1;
        Location::new(line as u32 + 1, column)
    }

    #[must_use]
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_covers_both() {
        assert_eq!(Span::new(5, 10).merge(Span::new(2, 7)), Span::new(2, 10));
    }

    #[test]
    fn dummy_span_is_default() {
        assert!(Span::default().is_dummy());
        assert!(!Span::new(0, 1).is_dummy());
    }

    #[test]
    fn locations_across_lines() {
        let index = LineIndex::new("unit m\nx = 2 m\n");
        assert_eq!(index.line_count(), 3);
        assert_eq!(index.location(0), Location::new(1, 1));
        assert_eq!(index.location(7), Location::new(2, 1));
        assert_eq!(index.location(11), Location::new(2, 5));
    }

    #[test]
    fn columns_count_characters() {
        let index = LineIndex::new("µs + x");
        // 'µ' is two bytes
        assert_eq!(index.location(4), Location::new(1, 4));
    }
}
