use std::time::Duration;

use tracker_client::{
    ChapterEntry, ClientCommand, ClientEvent, ClientHandle, NewNovelRequest, Novel,
};
use tracker_core::{
    ChapterRef, Effect, Msg, NewNovel, NovelSummary, TaskState, TaskStatus, DEFAULT_GROUP,
};
use tracker_logging::{tracker_debug, tracker_info, tracker_warn};

/// Turns core effects into client commands and client events back into messages.
pub struct EffectRunner {
    client: ClientHandle,
    outstanding: usize,
}

impl EffectRunner {
    pub fn new(client: ClientHandle) -> Self {
        Self {
            client,
            outstanding: 0,
        }
    }

    pub fn enqueue(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            tracker_debug!("Running effect {:?}", effect);
            self.client.send(command_for(effect));
            self.outstanding += 1;
        }
    }

    /// Commands still waiting for their terminal event.
    pub fn outstanding(&self) -> usize {
        self.outstanding
    }

    /// Waits up to `timeout` for the next client event and maps it to a message.
    pub fn next_msg(&mut self, timeout: Duration) -> Option<Msg> {
        let event = self.client.recv_timeout(timeout)?;
        if event.is_terminal() {
            self.outstanding = self.outstanding.saturating_sub(1);
        }
        Some(msg_for(event))
    }
}

fn command_for(effect: Effect) -> ClientCommand {
    match effect {
        Effect::FetchNovels => ClientCommand::ListNovels,
        Effect::CreateNovel(novel) => ClientCommand::CreateNovel(map_new_novel(novel)),
        Effect::DeleteNovel(novel_id) => ClientCommand::DeleteNovel(novel_id),
        Effect::StartRefresh(novel_id) => ClientCommand::StartRefresh(novel_id),
        Effect::PollTask { novel_id, task_id } => ClientCommand::PollTask { novel_id, task_id },
        Effect::FetchMissing(novel_id) => ClientCommand::FetchMissing(novel_id),
        Effect::SubmitChapters { novel_id, chapters } => {
            tracker_info!(
                "SubmitChapters novel_id={} count={}",
                novel_id,
                chapters.len()
            );
            ClientCommand::SubmitChapters {
                novel_id,
                chapters: chapters.into_iter().map(map_chapter_out).collect(),
            }
        }
    }
}

fn msg_for(event: ClientEvent) -> Msg {
    match event {
        ClientEvent::NovelsListed(Ok(novels)) => {
            Msg::NovelsLoaded(novels.into_iter().map(map_novel).collect())
        }
        ClientEvent::NovelsListed(Err(err)) => Msg::NovelsLoadFailed(err.to_string()),
        ClientEvent::NovelCreated(Ok(novel)) => Msg::NovelAdded(map_novel(novel)),
        ClientEvent::NovelCreated(Err(err)) => {
            Msg::NovelAddFailed(format!("Failed to add novel: {err}"))
        }
        ClientEvent::NovelDeleted {
            novel_id,
            result: Ok(()),
        } => Msg::NovelDeleted(novel_id),
        ClientEvent::NovelDeleted {
            novel_id,
            result: Err(err),
        } => Msg::NovelDeleteFailed {
            novel_id,
            message: format!("Delete failed: {err}"),
        },
        ClientEvent::RefreshStarted {
            novel_id,
            result: Ok(task_id),
        } => Msg::RefreshStarted { novel_id, task_id },
        ClientEvent::RefreshStarted {
            novel_id,
            result: Err(err),
        } => Msg::RefreshFailed {
            novel_id,
            message: format!("Refresh could not start: {err}"),
        },
        ClientEvent::TaskProgress { novel_id, status }
        | ClientEvent::PollFinished {
            novel_id,
            result: Ok(status),
        } => Msg::TaskProgress {
            novel_id,
            status: map_status(status),
        },
        ClientEvent::PollFinished {
            novel_id,
            result: Err(err),
        } => {
            tracker_warn!("Gave up polling refresh of novel {}: {}", novel_id, err);
            Msg::RefreshFailed {
                novel_id,
                message: format!("Lost track of refresh: {err}"),
            }
        }
        ClientEvent::MissingFetched {
            novel_id,
            result: Ok(missing),
        } => Msg::MissingLoaded {
            novel_id,
            count: missing.count,
            chapters: missing.chapters.into_iter().map(map_chapter_in).collect(),
        },
        ClientEvent::MissingFetched {
            novel_id,
            result: Err(err),
        } => Msg::MissingLoadFailed {
            novel_id,
            message: err.to_string(),
        },
        ClientEvent::ChaptersSubmitted {
            novel_id,
            result: Ok(queued),
        } => Msg::SubmitSucceeded { novel_id, queued },
        ClientEvent::ChaptersSubmitted {
            novel_id,
            result: Err(err),
        } => Msg::SubmitFailed {
            novel_id,
            message: err.to_string(),
        },
    }
}

fn map_novel(novel: Novel) -> NovelSummary {
    NovelSummary {
        id: novel.id,
        name: novel.name,
        fenrir_url: novel.fenrir_url,
        nu_url: novel.nu_url,
        group_name: novel
            .group_name
            .unwrap_or_else(|| DEFAULT_GROUP.to_string()),
        nu_series_id: novel.nu_series_id,
        nu_group_id: novel.nu_group_id,
        last_checked: novel.last_checked,
    }
}

fn map_new_novel(novel: NewNovel) -> NewNovelRequest {
    NewNovelRequest {
        name: novel.name,
        fenrir_url: novel.fenrir_url,
        nu_url: novel.nu_url,
        group_name: novel.group_name,
        nu_series_id: novel.nu_series_id,
        nu_group_id: novel.nu_group_id,
    }
}

fn map_status(status: tracker_client::TaskStatus) -> TaskStatus {
    TaskStatus {
        state: match status.state {
            tracker_client::TaskState::Running => TaskState::Running,
            tracker_client::TaskState::Completed => TaskState::Completed,
            tracker_client::TaskState::Error => TaskState::Error,
        },
        progress: status.progress,
        message: status.message,
    }
}

fn map_chapter_in(entry: ChapterEntry) -> ChapterRef {
    ChapterRef::from_parts(entry.vol, entry.ch)
}

/// Volume 0 goes back to the server as `null`, the way it arrived.
fn map_chapter_out(chapter: ChapterRef) -> ChapterEntry {
    ChapterEntry {
        vol: (chapter.vol > 0).then_some(chapter.vol),
        ch: chapter.ch,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tracker_client::{ApiError, FailureKind, MissingChapters};

    #[test]
    fn chapters_keep_volume_semantics_across_the_boundary() {
        assert_eq!(
            map_chapter_in(ChapterEntry { vol: None, ch: 4 }),
            ChapterRef::new(0, 4)
        );
        assert_eq!(
            map_chapter_out(ChapterRef::new(0, 4)),
            ChapterEntry { vol: None, ch: 4 }
        );
        assert_eq!(
            map_chapter_out(ChapterRef::new(3, 1)),
            ChapterEntry { vol: Some(3), ch: 1 }
        );
    }

    #[test]
    fn missing_reply_becomes_loaded_message() {
        let msg = msg_for(ClientEvent::MissingFetched {
            novel_id: 2,
            result: Ok(MissingChapters {
                count: 2,
                chapters: vec![
                    ChapterEntry { vol: Some(1), ch: 9 },
                    ChapterEntry { vol: None, ch: 5 },
                ],
                dropped: 0,
            }),
        });
        assert_eq!(
            msg,
            Msg::MissingLoaded {
                novel_id: 2,
                count: 2,
                chapters: vec![ChapterRef::new(1, 9), ChapterRef::new(0, 5)],
            }
        );
    }

    #[test]
    fn failed_poll_becomes_refresh_failure() {
        let msg = msg_for(ClientEvent::PollFinished {
            novel_id: 6,
            result: Err(ApiError {
                kind: FailureKind::Timeout,
                message: "slow".to_string(),
            }),
        });
        assert_eq!(
            msg,
            Msg::RefreshFailed {
                novel_id: 6,
                message: "Lost track of refresh: timeout: slow".to_string(),
            }
        );
    }

    #[test]
    fn novel_without_group_gets_default() {
        let summary = map_novel(Novel {
            id: 1,
            name: "A".to_string(),
            fenrir_url: String::new(),
            nu_url: String::new(),
            group_name: None,
            nu_series_id: None,
            nu_group_id: None,
            last_checked: None,
        });
        assert_eq!(summary.group_name, DEFAULT_GROUP);
    }
}
