use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use tracker_core::{Notice, NoticeSeverity, NovelRowView, RefreshView, ReviewView};

pub fn render_novels(novels: &[NovelRowView]) -> String {
    if novels.is_empty() {
        return "No novels added yet. Use `add` to get started!\n".to_string();
    }

    let mut out = String::new();
    for novel in novels {
        out.push_str(&format!("#{:<4} {}\n", novel.id, novel.name));
        let mut info = vec![format!("Group: {}", novel.group_name)];
        if let Some(series) = &novel.nu_series_id {
            info.push(format!("NU Series ID: {series}"));
        }
        if let Some(group) = &novel.nu_group_id {
            info.push(format!("NU Group ID: {group}"));
        }
        info.push(match &novel.last_checked {
            Some(raw) => format!("Last checked: {}", format_timestamp(raw, &Local)),
            None => "Never checked".to_string(),
        });
        out.push_str(&format!("      {}\n", info.join(" | ")));
        if let Some(refresh) = &novel.refresh {
            out.push_str(&format!("      {}\n", render_refresh(refresh)));
        }
    }
    out
}

pub fn render_refresh(refresh: &RefreshView) -> String {
    const WIDTH: usize = 20;
    let filled = usize::from(refresh.progress.min(100)) * WIDTH / 100;
    format!(
        "[{}{}] {:>3}% {}",
        "#".repeat(filled),
        "-".repeat(WIDTH - filled),
        refresh.progress,
        refresh.message
    )
}

pub fn render_review(review: &ReviewView) -> String {
    if review.loading {
        return "Loading...\n".to_string();
    }
    if review.synced {
        return "Synced!\n".to_string();
    }

    let mut out = format!("Missing: {}\n", review.missing_count);
    let cursor = if review.cursor_text.is_empty() {
        "(none, e.g. v2c78 or c32)"
    } else {
        review.cursor_text.as_str()
    };
    out.push_str(&format!("Start from: {cursor}\n"));
    if review.rows.is_empty() {
        out.push_str("  (no chapters at or after the start point)\n");
    }
    for row in &review.rows {
        let mark = if row.checked { 'x' } else { ' ' };
        out.push_str(&format!("  [{mark}] {:>4}. {}\n", row.index + 1, row.label));
    }
    let submit_state = if review.submitting {
        " (submitting...)"
    } else if review.submit_enabled {
        ""
    } else {
        " (disabled)"
    };
    out.push_str(&format!("{}{}\n", review.submit_label, submit_state));
    out
}

pub fn render_notice(notice: &Notice) -> String {
    let tag = match notice.severity {
        NoticeSeverity::Success => "ok",
        NoticeSeverity::Warning => "warning",
        NoticeSeverity::Error => "error",
    };
    format!("[{tag}] {}", notice.text)
}

/// Shows a server timestamp in `tz`. Naive timestamps are taken as UTC;
/// anything unparsable is shown as received.
pub fn format_timestamp<Tz>(raw: &str, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let parsed: Option<DateTime<Utc>> = DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc())
        });

    match parsed {
        Some(utc) => utc.with_timezone(tz).format("%Y-%m-%d %H:%M").to_string(),
        None => raw.to_string(),
    }
}
