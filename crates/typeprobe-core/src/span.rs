use serde::{Deserialize, Serialize};
use std::fmt;

/// Byte range in a source file, with the 1-based line/column of its start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

impl Span {
    pub fn new(start: usize, end: usize, line: usize, column: usize) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }

    pub fn dummy() -> Self {
        Self::default()
    }

    /// Smallest span covering both `self` and `other`
    pub fn combine(&self, other: &Span) -> Span {
        let first = if self.start <= other.start { self } else { other };
        Span {
            start: first.start,
            end: self.end.max(other.end),
            line: first.line,
            column: first.column,
        }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Position table of a source text: byte offsets of every line start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineMap {
    line_starts: Vec<usize>,
}

impl LineMap {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        for (offset, byte) in text.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(offset + 1);
            }
        }
        Self { line_starts }
    }

    /// 0-based line and character (Unicode scalar values) of a byte offset
    pub fn line_and_character(&self, text: &str, offset: usize) -> (usize, usize) {
        let offset = offset.min(text.len());
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        let line_start = self.line_starts[line];
        let character = text
            .get(line_start..offset)
            .map(|prefix| prefix.chars().count())
            .unwrap_or(offset - line_start);
        (line, character)
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combine_orders_spans() {
        let a = Span::new(10, 15, 2, 3);
        let b = Span::new(2, 6, 1, 3);
        let combined = a.combine(&b);
        assert_eq!(combined.start, 2);
        assert_eq!(combined.end, 15);
        assert_eq!(combined.line, 1);
    }

    #[test]
    fn test_line_map_positions() {
        let text = "const a = 1;\nconst b = 2;\n";
        let map = LineMap::new(text);
        assert_eq!(map.line_count(), 3);
        assert_eq!(map.line_and_character(text, 0), (0, 0));
        assert_eq!(map.line_and_character(text, 6), (0, 6));
        assert_eq!(map.line_and_character(text, 13), (1, 0));
        assert_eq!(map.line_and_character(text, 19), (1, 6));
    }

    #[test]
    fn test_line_map_counts_characters_not_bytes() {
        let text = "const é = 'ü'; x";
        let map = LineMap::new(text);
        let offset = text.find('x').unwrap();
        assert_eq!(map.line_and_character(text, offset), (0, 15));
    }
}
