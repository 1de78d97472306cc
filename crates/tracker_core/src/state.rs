use std::collections::BTreeMap;

use tracker_logging::tracker_debug;

use crate::selection::ReviewSession;
use crate::view_model::{AppViewModel, ChapterRowView, NovelRowView, RefreshView, ReviewView};

pub type NovelId = u64;
pub type TaskId = String;

/// Group used when the add form leaves the group blank.
pub const DEFAULT_GROUP: &str = "Fenrir Realm";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NovelSummary {
    pub id: NovelId,
    pub name: String,
    pub fenrir_url: String,
    pub nu_url: String,
    pub group_name: String,
    pub nu_series_id: Option<String>,
    pub nu_group_id: Option<String>,
    /// ISO-8601 timestamp as sent by the server; `None` when never checked.
    pub last_checked: Option<String>,
}

/// Add-novel form contents, normalized before they leave the core.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewNovel {
    pub name: String,
    pub fenrir_url: String,
    pub nu_url: String,
    pub group_name: String,
    pub nu_series_id: Option<String>,
    pub nu_group_id: Option<String>,
}

impl NewNovel {
    /// Trims every field, defaults the group and drops blank ids.
    ///
    /// Returns the names of required fields that are blank as the error.
    pub fn normalized(self) -> Result<Self, Vec<&'static str>> {
        let name = self.name.trim().to_string();
        let fenrir_url = self.fenrir_url.trim().to_string();
        let nu_url = self.nu_url.trim().to_string();

        let missing: Vec<&'static str> = [
            ("name", &name),
            ("fenrir_url", &fenrir_url),
            ("nu_url", &nu_url),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(field, _)| field)
        .collect();
        if !missing.is_empty() {
            return Err(missing);
        }

        let group_name = match self.group_name.trim() {
            "" => DEFAULT_GROUP.to_string(),
            group => group.to_string(),
        };

        Ok(Self {
            name,
            fenrir_url,
            nu_url,
            group_name,
            nu_series_id: non_blank(self.nu_series_id),
            nu_group_id: non_blank(self.nu_group_id),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Running,
    Completed,
    Error,
}

impl TaskState {
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskState::Completed | TaskState::Error)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskStatus {
    pub state: TaskState,
    pub progress: u8,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeSeverity {
    Success,
    Warning,
    Error,
}

/// Short user-facing message, shown once by the front end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub severity: NoticeSeverity,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RefreshProgress {
    pub(crate) progress: u8,
    pub(crate) message: String,
}

/// Lifecycle of the "view missing" dialog.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ReviewPhase {
    #[default]
    Idle,
    Loading {
        novel_id: NovelId,
    },
    Loaded(ReviewSession),
    Submitting(ReviewSession),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    novels: Vec<NovelSummary>,
    refreshes: BTreeMap<NovelId, RefreshProgress>,
    review: ReviewPhase,
    notices: Vec<Notice>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            novels: self
                .novels
                .iter()
                .map(|novel| NovelRowView {
                    id: novel.id,
                    name: novel.name.clone(),
                    group_name: novel.group_name.clone(),
                    nu_series_id: novel.nu_series_id.clone(),
                    nu_group_id: novel.nu_group_id.clone(),
                    last_checked: novel.last_checked.clone(),
                    refresh: self.refreshes.get(&novel.id).map(|r| RefreshView {
                        progress: r.progress,
                        message: r.message.clone(),
                    }),
                })
                .collect(),
            review: self.review_view(),
            refreshing: self.refreshes.keys().copied().collect(),
        }
    }

    fn review_view(&self) -> Option<ReviewView> {
        let (session, submitting) = match &self.review {
            ReviewPhase::Idle => return None,
            ReviewPhase::Loading { novel_id } => {
                return Some(ReviewView::loading(*novel_id));
            }
            ReviewPhase::Loaded(session) => (session, false),
            ReviewPhase::Submitting(session) => (session, true),
        };

        let selection = session.selection();
        let rows = selection
            .chapters()
            .iter()
            .enumerate()
            .map(|(index, chapter)| ChapterRowView {
                index,
                label: chapter.label(),
                checked: selection.is_selected(index),
            })
            .collect();
        let selected_count = selection.selected_count();

        Some(ReviewView {
            novel_id: session.novel_id(),
            missing_count: session.missing_count(),
            synced: session.missing_count() == 0,
            loading: false,
            submitting,
            cursor_text: session.cursor_text().to_string(),
            rows,
            selected_count,
            submit_label: format!("Submit Selected ({selected_count})"),
            submit_enabled: selected_count > 0 && !submitting,
        })
    }

    pub fn novels(&self) -> &[NovelSummary] {
        &self.novels
    }

    pub fn review(&self) -> &ReviewPhase {
        &self.review
    }

    pub fn is_refreshing(&self, novel_id: NovelId) -> bool {
        self.refreshes.contains_key(&novel_id)
    }

    /// Returns and clears the dirty flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Drains notices queued since the last call.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn set_novels(&mut self, novels: Vec<NovelSummary>) {
        self.novels = novels;
        self.mark_dirty();
    }

    pub(crate) fn push_notice(&mut self, severity: NoticeSeverity, text: impl Into<String>) {
        self.notices.push(Notice {
            severity,
            text: text.into(),
        });
        self.mark_dirty();
    }

    /// Registers a refresh unless one is already running for the novel.
    pub(crate) fn begin_refresh(&mut self, novel_id: NovelId) -> bool {
        if self.refreshes.contains_key(&novel_id) {
            return false;
        }
        self.refreshes.insert(
            novel_id,
            RefreshProgress {
                progress: 0,
                message: "Starting...".to_string(),
            },
        );
        self.mark_dirty();
        true
    }

    /// True while a refresh for the novel is still tracked.
    pub(crate) fn attach_task(&self, novel_id: NovelId, task_id: &str) -> bool {
        let tracked = self.refreshes.contains_key(&novel_id);
        if !tracked {
            tracker_debug!(
                "Task {} arrived for novel {} after its refresh ended",
                task_id,
                novel_id
            );
        }
        tracked
    }

    pub(crate) fn apply_task_status(&mut self, novel_id: NovelId, status: &TaskStatus) -> bool {
        match self.refreshes.get_mut(&novel_id) {
            Some(entry) => {
                entry.progress = status.progress.min(100);
                entry.message = status.message.clone();
                self.mark_dirty();
                true
            }
            None => false,
        }
    }

    pub(crate) fn end_refresh(&mut self, novel_id: NovelId) -> bool {
        let removed = self.refreshes.remove(&novel_id).is_some();
        if removed {
            self.mark_dirty();
        }
        removed
    }

    pub(crate) fn take_review(&mut self) -> ReviewPhase {
        std::mem::take(&mut self.review)
    }

    /// Installs the next review phase and marks the state dirty.
    pub(crate) fn set_review(&mut self, review: ReviewPhase) {
        self.review = review;
        self.mark_dirty();
    }

    /// Puts back a phase taken with `take_review` when nothing changed.
    pub(crate) fn restore_review(&mut self, review: ReviewPhase) {
        self.review = review;
    }
}
