use crate::{ChapterRef, NewNovel, NovelId, NovelSummary, TaskId, TaskStatus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Front end wants the novel list (startup or manual reload).
    NovelsRequested,
    /// Client delivered the novel list.
    NovelsLoaded(Vec<NovelSummary>),
    NovelsLoadFailed(String),
    /// User submitted the add-novel form.
    AddNovelSubmitted(NewNovel),
    NovelAdded(NovelSummary),
    NovelAddFailed(String),
    /// User confirmed deletion of a novel.
    DeleteNovelClicked(NovelId),
    NovelDeleted(NovelId),
    NovelDeleteFailed { novel_id: NovelId, message: String },
    /// User clicked "Refresh Chapters".
    RefreshClicked(NovelId),
    /// Server accepted the refresh and handed back a task to poll.
    RefreshStarted { novel_id: NovelId, task_id: TaskId },
    /// Starting or polling the refresh failed at the transport level.
    RefreshFailed { novel_id: NovelId, message: String },
    /// One poll result for a running refresh.
    TaskProgress { novel_id: NovelId, status: TaskStatus },
    /// User clicked "View Missing".
    ViewMissingClicked(NovelId),
    MissingLoaded {
        novel_id: NovelId,
        count: usize,
        chapters: Vec<ChapterRef>,
    },
    MissingLoadFailed { novel_id: NovelId, message: String },
    /// User edited the start-from text (every keystroke).
    CursorChanged(String),
    /// User flipped one checkbox of the filtered list.
    ChapterToggled(usize),
    /// Clear one checkbox; a row that is already clear stays clear.
    ChapterUnchecked(usize),
    SelectAllClicked,
    SelectNoneClicked,
    SubmitClicked,
    SubmitSucceeded { novel_id: NovelId, queued: usize },
    SubmitFailed { novel_id: NovelId, message: String },
    /// User closed the review dialog.
    ReviewClosed,
    /// Periodic wake-up from the front end; changes nothing.
    Tick,
    NoOp,
}
