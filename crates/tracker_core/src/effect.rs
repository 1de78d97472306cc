use crate::{ChapterRef, NewNovel, NovelId, TaskId};

/// IO requested by `update`; executed by the front end's effect runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    FetchNovels,
    CreateNovel(NewNovel),
    DeleteNovel(NovelId),
    StartRefresh(NovelId),
    /// Poll the task until it completes or errors.
    PollTask { novel_id: NovelId, task_id: TaskId },
    FetchMissing(NovelId),
    SubmitChapters {
        novel_id: NovelId,
        chapters: Vec<ChapterRef>,
    },
}
