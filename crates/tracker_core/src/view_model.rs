use crate::NovelId;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub novels: Vec<NovelRowView>,
    pub review: Option<ReviewView>,
    /// Novels with a refresh in flight, ascending by id.
    pub refreshing: Vec<NovelId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NovelRowView {
    pub id: NovelId,
    pub name: String,
    pub group_name: String,
    pub nu_series_id: Option<String>,
    pub nu_group_id: Option<String>,
    pub last_checked: Option<String>,
    pub refresh: Option<RefreshView>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshView {
    pub progress: u8,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewView {
    pub novel_id: NovelId,
    pub missing_count: usize,
    /// Server reported nothing missing.
    pub synced: bool,
    pub loading: bool,
    pub submitting: bool,
    pub cursor_text: String,
    pub rows: Vec<ChapterRowView>,
    pub selected_count: usize,
    pub submit_label: String,
    pub submit_enabled: bool,
}

impl ReviewView {
    pub(crate) fn loading(novel_id: NovelId) -> Self {
        Self {
            novel_id,
            missing_count: 0,
            synced: false,
            loading: true,
            submitting: false,
            cursor_text: String::new(),
            rows: Vec::new(),
            selected_count: 0,
            submit_label: "Submit Selected (0)".to_string(),
            submit_enabled: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterRowView {
    pub index: usize,
    pub label: String,
    pub checked: bool,
}
