//! Chapter identifiers and the start-from cursor used to narrow a missing list.

use std::fmt;

/// One chapter, identified by an optional volume (0 = no volume) and a chapter number.
///
/// Field order matters: the derived `Ord` compares `vol` first, then `ch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ChapterRef {
    pub vol: u32,
    pub ch: u32,
}

impl ChapterRef {
    pub fn new(vol: u32, ch: u32) -> Self {
        Self { vol, ch }
    }

    /// Builds a reference from a record whose volume may be absent.
    pub fn from_parts(vol: Option<u32>, ch: u32) -> Self {
        Self {
            vol: vol.unwrap_or(0),
            ch,
        }
    }

    /// Display label, `V2 C5` for volumed chapters and `C5` otherwise.
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ChapterRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.vol > 0 {
            write!(f, "V{} C{}", self.vol, self.ch)
        } else {
            write!(f, "C{}", self.ch)
        }
    }
}

/// First chapter to include when filtering; inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Cursor {
    pub vol: u32,
    pub ch: u32,
}

impl Cursor {
    pub fn new(vol: u32, ch: u32) -> Self {
        Self { vol, ch }
    }
}

/// Sorts ascending by `(vol, ch)`. The sort is stable and does not drop entries.
pub fn sort(chapters: &[ChapterRef]) -> Vec<ChapterRef> {
    let mut sorted = chapters.to_vec();
    sorted.sort();
    sorted
}

/// Parses `v<digits>c<digits>` or `c<digits>`, ignoring case and whitespace.
///
/// Anything else, including an empty string or a digit group that does not
/// fit in `u32`, yields `None`, which callers treat as "no cursor".
pub fn parse_cursor(raw: &str) -> Option<Cursor> {
    let compact: String = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect();
    if compact.is_empty() {
        return None;
    }

    if let Some(rest) = compact.strip_prefix('v') {
        let (vol, ch) = rest.split_once('c')?;
        return Some(Cursor::new(parse_digits(vol)?, parse_digits(ch)?));
    }

    let ch = compact.strip_prefix('c')?;
    Some(Cursor::new(0, parse_digits(ch)?))
}

fn parse_digits(group: &str) -> Option<u32> {
    if group.is_empty() || !group.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    group.parse().ok()
}

/// True when `item` sits at or after `cursor` in `(vol, ch)` order; always true without a cursor.
pub fn is_at_or_after(item: &ChapterRef, cursor: Option<&Cursor>) -> bool {
    match cursor {
        None => true,
        Some(cursor) => (item.vol, item.ch) >= (cursor.vol, cursor.ch),
    }
}

/// Keeps the entries of `sorted` at or after `cursor`, preserving order.
pub fn filter(sorted: &[ChapterRef], cursor: Option<&Cursor>) -> Vec<ChapterRef> {
    sorted
        .iter()
        .filter(|item| is_at_or_after(item, cursor))
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_omit_zero_volume() {
        assert_eq!(ChapterRef::new(0, 32).label(), "C32");
        assert_eq!(ChapterRef::new(2, 78).label(), "V2 C78");
    }

    #[test]
    fn cursor_ignores_case_and_inner_whitespace() {
        assert_eq!(parse_cursor(" V 2 C 78 "), Some(Cursor::new(2, 78)));
        assert_eq!(parse_cursor("C32"), Some(Cursor::new(0, 32)));
    }

    #[test]
    fn cursor_rejects_partial_patterns() {
        for raw in ["", "   ", "v", "v2", "vc3", "v2c", "c", "2", "c3v2", "v2c3x", "c-1", "v+2c3"] {
            assert_eq!(parse_cursor(raw), None, "input {raw:?}");
        }
    }

    #[test]
    fn cursor_overflow_is_malformed() {
        assert_eq!(parse_cursor("c99999999999"), None);
    }
}
