//! Line commands accepted by the interactive review prompt.

use std::collections::BTreeSet;

pub const HELP: &str = "\
Commands:
  from <cursor>      show chapters at or after v<vol>c<ch> or c<ch>; `from` alone clears
  toggle <n>...      flip rows by number; accepts ranges like 3-7 and commas
  all | none         select every row / clear the selection
  submit             submit the selected chapters
  list               print the current rows
  help               show this text
  quit               close without submitting";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewInput {
    Cursor(String),
    /// Zero-based row indices, each listed once.
    Toggle(BTreeSet<usize>),
    SelectAll,
    SelectNone,
    Submit,
    List,
    Help,
    Quit,
    Invalid(String),
}

/// Parses one prompt line; row numbers are checked against `row_count`.
pub fn parse_review_input(line: &str, row_count: usize) -> ReviewInput {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    match word.to_ascii_lowercase().as_str() {
        "" | "list" | "ls" => ReviewInput::List,
        "from" | "f" => ReviewInput::Cursor(rest.to_string()),
        "toggle" | "t" => match parse_rows(rest, row_count) {
            Ok(rows) if !rows.is_empty() => ReviewInput::Toggle(rows),
            Ok(_) => ReviewInput::Invalid("toggle needs at least one row number".to_string()),
            Err(message) => ReviewInput::Invalid(message),
        },
        "all" => ReviewInput::SelectAll,
        "none" => ReviewInput::SelectNone,
        "submit" => ReviewInput::Submit,
        "help" | "?" => ReviewInput::Help,
        "quit" | "q" | "exit" => ReviewInput::Quit,
        other => ReviewInput::Invalid(format!("unknown command `{other}`; try `help`")),
    }
}

/// Parses one-based row numbers and ranges into zero-based indices.
///
/// Rows past `row_count` are an error, checked before a range is expanded.
pub fn parse_rows(raw: &str, row_count: usize) -> Result<BTreeSet<usize>, String> {
    let mut rows = BTreeSet::new();
    for token in raw
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
    {
        match token.split_once('-') {
            Some((start, end)) => {
                let start = parse_row(start, row_count)?;
                let end = parse_row(end, row_count)?;
                if end < start {
                    return Err(format!("range `{token}` runs backwards"));
                }
                rows.extend(start..=end);
            }
            None => {
                rows.insert(parse_row(token, row_count)?);
            }
        }
    }
    Ok(rows)
}

/// Merges several `--skip` values into one set of row indices.
pub fn skip_rows<'a>(
    raws: impl IntoIterator<Item = &'a str>,
    row_count: usize,
) -> Result<BTreeSet<usize>, String> {
    let mut rows = BTreeSet::new();
    for raw in raws {
        rows.extend(parse_rows(raw, row_count)?);
    }
    Ok(rows)
}

fn parse_row(token: &str, row_count: usize) -> Result<usize, String> {
    match token.trim().parse::<usize>() {
        Ok(0) | Err(_) => Err(format!("`{token}` is not a row number")),
        Ok(n) if n > row_count => Err(format!("row {n} is past the last row ({row_count})")),
        Ok(n) => Ok(n - 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn set(rows: &[usize]) -> BTreeSet<usize> {
        rows.iter().copied().collect()
    }

    #[test]
    fn from_keeps_the_raw_cursor_text() {
        assert_eq!(
            parse_review_input("from  V2 C78 ", 3),
            ReviewInput::Cursor("V2 C78".to_string())
        );
        assert_eq!(parse_review_input("from", 3), ReviewInput::Cursor(String::new()));
    }

    #[test]
    fn toggle_accepts_lists_and_ranges() {
        assert_eq!(
            parse_review_input("t 1,3 5-7", 10),
            ReviewInput::Toggle(set(&[0, 2, 4, 5, 6]))
        );
    }

    #[test]
    fn toggle_lists_each_row_once() {
        assert_eq!(
            parse_review_input("t 1,1 1-2", 5),
            ReviewInput::Toggle(set(&[0, 1]))
        );
    }

    #[test]
    fn toggle_rejects_zero_and_backwards_ranges() {
        assert!(matches!(parse_review_input("toggle 0", 5), ReviewInput::Invalid(_)));
        assert!(matches!(parse_review_input("toggle 4-2", 5), ReviewInput::Invalid(_)));
        assert!(matches!(parse_review_input("toggle", 5), ReviewInput::Invalid(_)));
    }

    #[test]
    fn rows_past_the_list_are_rejected_without_expanding() {
        assert_eq!(
            parse_rows("1-50000000", 3),
            Err("row 50000000 is past the last row (3)".to_string())
        );
        assert!(parse_rows("1-99999999999999999999", 3).is_err());
        assert!(parse_rows("1", 0).is_err());
        assert_eq!(parse_rows("2-3", 3), Ok(set(&[1, 2])));
    }

    #[test]
    fn overlapping_skips_merge_into_one_set() {
        assert_eq!(skip_rows(["1", "1-2"], 3), Ok(set(&[0, 1])));
        assert_eq!(skip_rows(["1,1"], 3), Ok(set(&[0])));
        assert!(skip_rows(["1", "4"], 3).is_err());
    }

    #[test]
    fn keywords_are_case_insensitive() {
        assert_eq!(parse_review_input("ALL", 1), ReviewInput::SelectAll);
        assert_eq!(parse_review_input("Submit", 1), ReviewInput::Submit);
        assert_eq!(parse_review_input("", 1), ReviewInput::List);
    }
}
