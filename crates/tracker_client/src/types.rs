use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub type NovelId = u64;
pub type TaskId = String;

/// Novel as listed by `GET /api/novels`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Novel {
    pub id: NovelId,
    pub name: String,
    #[serde(default)]
    pub fenrir_url: String,
    #[serde(default)]
    pub nu_url: String,
    #[serde(default)]
    pub group_name: Option<String>,
    #[serde(default, deserialize_with = "string_like")]
    pub nu_series_id: Option<String>,
    #[serde(default, deserialize_with = "string_like")]
    pub nu_group_id: Option<String>,
    #[serde(default)]
    pub last_checked: Option<String>,
}

/// Body of `POST /api/novels`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewNovelRequest {
    pub name: String,
    pub fenrir_url: String,
    pub nu_url: String,
    pub group_name: String,
    pub nu_series_id: Option<String>,
    pub nu_group_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct RefreshResponse {
    pub(crate) task_id: TaskId,
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

    /// Unknown labels count as still running; only `completed` and `error` stop a poll.
    fn from_label(label: &str) -> Self {
        match label {
            "completed" => TaskState::Completed,
            "error" => TaskState::Error,
            _ => TaskState::Running,
        }
    }
}

/// Decoded `GET /api/tasks/{id}` body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskStatus {
    pub state: TaskState,
    /// Percentage clamped to 0..=100.
    pub progress: u8,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TaskStatusBody {
    status: String,
    #[serde(default)]
    progress: Option<f64>,
    #[serde(default)]
    message: Option<String>,
}

impl From<TaskStatusBody> for TaskStatus {
    fn from(body: TaskStatusBody) -> Self {
        let progress = body.progress.unwrap_or(0.0).clamp(0.0, 100.0).round() as u8;
        Self {
            state: TaskState::from_label(&body.status),
            progress,
            message: body.message.unwrap_or_default(),
        }
    }
}

/// One chapter as exchanged with the server. `vol: None` means "no volume".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChapterEntry {
    pub vol: Option<u32>,
    pub ch: u32,
}

#[derive(Debug, Serialize)]
pub(crate) struct SubmitRequest<'a> {
    pub(crate) chapters: &'a [ChapterEntry],
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubmitResponse {
    pub(crate) queued: usize,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MissingBody {
    #[serde(default)]
    count: Option<usize>,
    #[serde(default)]
    missing: Vec<Value>,
}

/// Decoded `GET /api/novels/{id}/missing` body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingChapters {
    /// Count reported by the server.
    pub count: usize,
    pub chapters: Vec<ChapterEntry>,
    /// Records skipped because `ch` or `vol` was not integer-like.
    pub dropped: usize,
}

impl From<MissingBody> for MissingChapters {
    fn from(body: MissingBody) -> Self {
        let total = body.missing.len();
        let chapters: Vec<ChapterEntry> = body.missing.iter().filter_map(chapter_entry).collect();
        Self {
            count: body.count.unwrap_or(total),
            dropped: total - chapters.len(),
            chapters,
        }
    }
}

/// Reads `{"vol": .., "ch": ..}` where both sides may be numbers or numeric strings.
fn chapter_entry(record: &Value) -> Option<ChapterEntry> {
    let ch = integer_like(record.get("ch")?)?;
    let vol = match record.get("vol") {
        None | Some(Value::Null) => None,
        Some(value) => Some(integer_like(value)?),
    };
    Some(ChapterEntry { vol, ch })
}

pub(crate) fn integer_like(value: &Value) -> Option<u32> {
    match value {
        Value::Number(number) => {
            if let Some(n) = number.as_u64() {
                return u32::try_from(n).ok();
            }
            let f = number.as_f64()?;
            if f >= 0.0 && f.fract() == 0.0 && f <= f64::from(u32::MAX) {
                Some(f as u32)
            } else {
                None
            }
        }
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

fn string_like<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(text)) => Some(text),
        Some(Value::Number(number)) => Some(number.to_string()),
        _ => None,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ApiError {
    pub kind: FailureKind,
    pub message: String,
}

impl ApiError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
    Decode,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Decode => write!(f, "unexpected response body"),
        }
    }
}

/// Replies from the background client. Every command ends with exactly one
/// event for which [`ClientEvent::is_terminal`] is true.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    NovelsListed(Result<Vec<Novel>, ApiError>),
    NovelCreated(Result<Novel, ApiError>),
    NovelDeleted {
        novel_id: NovelId,
        result: Result<(), ApiError>,
    },
    RefreshStarted {
        novel_id: NovelId,
        result: Result<TaskId, ApiError>,
    },
    /// Intermediate poll result of a task that is still running.
    TaskProgress {
        novel_id: NovelId,
        status: TaskStatus,
    },
    /// Final poll result: a terminal status, or the error that ended polling.
    PollFinished {
        novel_id: NovelId,
        result: Result<TaskStatus, ApiError>,
    },
    MissingFetched {
        novel_id: NovelId,
        result: Result<MissingChapters, ApiError>,
    },
    ChaptersSubmitted {
        novel_id: NovelId,
        result: Result<usize, ApiError>,
    },
}

impl ClientEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ClientEvent::TaskProgress { .. })
    }
}
