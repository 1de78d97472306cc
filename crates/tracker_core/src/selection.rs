use std::collections::BTreeSet;

use crate::chapter::{self, ChapterRef};

/// The filtered working set of a review plus the indices checked for submission.
///
/// Transitions take `self` by value and return the next state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectionState {
    chapters: Vec<ChapterRef>,
    selected: BTreeSet<usize>,
}

impl SelectionState {
    /// Wraps an already filtered sequence with every entry selected.
    pub fn new(chapters: Vec<ChapterRef>) -> Self {
        let selected = (0..chapters.len()).collect();
        Self { chapters, selected }
    }

    pub fn chapters(&self) -> &[ChapterRef] {
        &self.chapters
    }

    pub fn len(&self) -> usize {
        self.chapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.selected.contains(&index)
    }

    pub fn selected_count(&self) -> usize {
        self.selected
            .iter()
            .filter(|&&index| index < self.chapters.len())
            .count()
    }

    #[must_use]
    pub fn select_all(mut self) -> Self {
        self.selected = (0..self.chapters.len()).collect();
        self
    }

    #[must_use]
    pub fn select_none(mut self) -> Self {
        self.selected.clear();
        self
    }

    /// Flips one index. Indices outside the working set are ignored.
    #[must_use]
    pub fn toggle(mut self, index: usize) -> Self {
        if index >= self.chapters.len() {
            return self;
        }
        if !self.selected.remove(&index) {
            self.selected.insert(index);
        }
        self
    }

    /// Clears one index. Unselected or out-of-range indices stay as they are.
    #[must_use]
    pub fn deselect(mut self, index: usize) -> Self {
        self.selected.remove(&index);
        self
    }

    /// Selected chapters in working-set order; stray indices are dropped.
    pub fn selected(&self) -> Vec<ChapterRef> {
        self.selected
            .iter()
            .filter_map(|&index| self.chapters.get(index).copied())
            .collect()
    }
}

/// One open "view missing" session for a novel.
///
/// Keeps the full sorted list so that every cursor edit filters from scratch;
/// loosening the cursor brings back entries an earlier cursor hid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewSession {
    novel_id: crate::NovelId,
    missing_count: usize,
    all: Vec<ChapterRef>,
    cursor_text: String,
    selection: SelectionState,
}

impl ReviewSession {
    pub fn new(novel_id: crate::NovelId, missing_count: usize, chapters: &[ChapterRef]) -> Self {
        let all = chapter::sort(chapters);
        let selection = SelectionState::new(all.clone());
        Self {
            novel_id,
            missing_count,
            all,
            cursor_text: String::new(),
            selection,
        }
    }

    pub fn novel_id(&self) -> crate::NovelId {
        self.novel_id
    }

    /// Count reported by the server, which may differ from the decoded list length.
    pub fn missing_count(&self) -> usize {
        self.missing_count
    }

    pub fn cursor_text(&self) -> &str {
        &self.cursor_text
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    /// Recomputes the working set for new cursor text and selects everything in it.
    #[must_use]
    pub fn with_cursor(mut self, raw: impl Into<String>) -> Self {
        self.cursor_text = raw.into();
        let cursor = chapter::parse_cursor(&self.cursor_text);
        self.selection = SelectionState::new(chapter::filter(&self.all, cursor.as_ref()));
        self
    }

    #[must_use]
    pub fn map_selection(mut self, f: impl FnOnce(SelectionState) -> SelectionState) -> Self {
        self.selection = f(self.selection);
        self
    }
}
