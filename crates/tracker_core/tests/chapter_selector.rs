use pretty_assertions::assert_eq;
use proptest::prelude::*;
use tracker_core::chapter::{filter, is_at_or_after, parse_cursor, sort};
use tracker_core::{ChapterRef, Cursor, SelectionState};

fn ch(vol: u32, ch: u32) -> ChapterRef {
    ChapterRef::new(vol, ch)
}

#[test]
fn sort_orders_by_volume_then_chapter() {
    let chapters = vec![ch(0, 5), ch(2, 1), ch(1, 9)];
    assert_eq!(sort(&chapters), vec![ch(0, 5), ch(1, 9), ch(2, 1)]);
}

#[test]
fn volume_and_chapter_cursor_is_inclusive_lexicographic() {
    let cursor = parse_cursor("v2c78");
    assert_eq!(cursor, Some(Cursor::new(2, 78)));

    let cursor = cursor.as_ref();
    assert!(is_at_or_after(&ch(2, 80), cursor));
    assert!(!is_at_or_after(&ch(2, 50), cursor));
    assert!(is_at_or_after(&ch(3, 0), cursor));
    assert!(is_at_or_after(&ch(2, 78), cursor));
    assert!(!is_at_or_after(&ch(1, 500), cursor));
}

#[test]
fn chapter_only_cursor_includes_its_boundary() {
    let cursor = parse_cursor("c32");
    assert_eq!(cursor, Some(Cursor::new(0, 32)));
    assert!(is_at_or_after(&ch(0, 32), cursor.as_ref()));
    assert!(!is_at_or_after(&ch(0, 31), cursor.as_ref()));
}

#[test]
fn garbage_cursor_means_no_filter() {
    let sorted = sort(&[ch(1, 2), ch(0, 7), ch(0, 3)]);
    let cursor = parse_cursor("garbage");
    assert_eq!(cursor, None);
    assert_eq!(filter(&sorted, cursor.as_ref()), sorted);
}

#[test]
fn leading_zeros_parse_numerically() {
    assert_eq!(parse_cursor("v02c05"), Some(Cursor::new(2, 5)));
    assert_eq!(parse_cursor("c007"), Some(Cursor::new(0, 7)));
}

#[test]
fn toggled_entry_is_excluded_and_order_kept() {
    let (a, b, c) = (ch(0, 1), ch(0, 2), ch(1, 1));
    let state = SelectionState::new(vec![a, b, c]).select_all().toggle(1);
    assert_eq!(state.selected(), vec![a, c]);
}

#[test]
fn select_none_then_all_round_trips_selection() {
    let state = SelectionState::new(vec![ch(0, 1), ch(0, 2)]);
    let none = state.clone().select_none();
    assert!(none.selected().is_empty());
    assert_eq!(none.selected_count(), 0);
    assert_eq!(none.select_all().selected(), state.selected());
}

#[test]
fn empty_input_stays_empty() {
    let sorted = sort(&[]);
    assert!(sorted.is_empty());
    assert!(filter(&sorted, Some(&Cursor::new(1, 1))).is_empty());
    assert!(SelectionState::new(sorted).select_all().selected().is_empty());
}

fn chapter_strategy() -> impl Strategy<Value = ChapterRef> {
    (0u32..6, 0u32..200).prop_map(|(vol, ch)| ChapterRef::new(vol, ch))
}

fn cursor_strategy() -> impl Strategy<Value = Option<Cursor>> {
    proptest::option::of((0u32..6, 0u32..200).prop_map(|(vol, ch)| Cursor::new(vol, ch)))
}

proptest! {
    #[test]
    fn prop_sort_keeps_length_and_is_non_decreasing(
        chapters in proptest::collection::vec(chapter_strategy(), 0..64)
    ) {
        let sorted = sort(&chapters);
        prop_assert_eq!(sorted.len(), chapters.len());
        for pair in sorted.windows(2) {
            prop_assert!((pair[0].vol, pair[0].ch) <= (pair[1].vol, pair[1].ch));
        }
        let mut expected = chapters.clone();
        expected.sort_by_key(|c| (c.vol, c.ch));
        prop_assert_eq!(sorted, expected);
    }

    #[test]
    fn prop_cursor_round_trips_numbers(vol in 0u32..100_000, chapter in 0u32..100_000) {
        prop_assert_eq!(parse_cursor(&format!("v{vol}c{chapter}")), Some(Cursor::new(vol, chapter)));
        prop_assert_eq!(parse_cursor(&format!("C{chapter}")), Some(Cursor::new(0, chapter)));
    }

    #[test]
    fn prop_non_matching_text_has_no_cursor(raw in "[a-bd-uw-z ]{0,12}") {
        prop_assert_eq!(parse_cursor(&raw), None);
    }

    #[test]
    fn prop_no_cursor_is_identity(
        chapters in proptest::collection::vec(chapter_strategy(), 0..64)
    ) {
        let sorted = sort(&chapters);
        prop_assert_eq!(filter(&sorted, None), sorted);
    }

    #[test]
    fn prop_at_or_after_is_monotonic(
        item in chapter_strategy(),
        cursor in (0u32..6, 0u32..200),
        lower in (0u32..6, 0u32..200),
    ) {
        let cursor = Cursor::new(cursor.0, cursor.1);
        let lower = Cursor::new(lower.0, lower.1);
        if is_at_or_after(&item, Some(&cursor)) && (lower.vol, lower.ch) < (cursor.vol, cursor.ch) {
            prop_assert!(is_at_or_after(&item, Some(&lower)));
        }
    }

    #[test]
    fn prop_filter_is_idempotent(
        chapters in proptest::collection::vec(chapter_strategy(), 0..64),
        cursor in cursor_strategy(),
    ) {
        let sorted = sort(&chapters);
        let once = filter(&sorted, cursor.as_ref());
        prop_assert_eq!(filter(&once, cursor.as_ref()), once);
    }

    #[test]
    fn prop_selected_indices_stay_in_range(
        chapters in proptest::collection::vec(chapter_strategy(), 0..16),
        toggles in proptest::collection::vec(0usize..32, 0..32),
    ) {
        let mut state = SelectionState::new(sort(&chapters));
        for index in toggles {
            state = state.toggle(index);
        }
        prop_assert!(state.selected_count() <= state.len());
        prop_assert_eq!(state.selected().len(), state.selected_count());
    }
}
