//! Novel tracker core: chapter selection logic and the pure application state machine.
pub mod chapter;
mod effect;
mod msg;
mod selection;
mod state;
mod update;
mod view_model;

pub use chapter::{ChapterRef, Cursor};
pub use effect::Effect;
pub use msg::Msg;
pub use selection::{ReviewSession, SelectionState};
pub use state::{
    AppState, NewNovel, Notice, NoticeSeverity, NovelId, NovelSummary, ReviewPhase, TaskId,
    TaskState, TaskStatus, DEFAULT_GROUP,
};
pub use update::update;
pub use view_model::{AppViewModel, ChapterRowView, NovelRowView, RefreshView, ReviewView};
