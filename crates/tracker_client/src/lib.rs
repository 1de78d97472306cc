//! Novel tracker client: HTTP access to the tracker server and background task polling.
mod api;
mod handle;
mod persist;
mod types;

pub use api::{ApiSettings, NovelApi, ReqwestApi, DEFAULT_SERVER_URL};
pub use handle::{ClientCommand, ClientHandle, PollSettings};
pub use persist::{write_atomically, PersistError};
pub use types::{
    ApiError, ChapterEntry, ClientEvent, FailureKind, MissingChapters, NewNovelRequest, Novel,
    NovelId, TaskId, TaskState, TaskStatus,
};
