use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracker_logging::{tracker_debug, tracker_info, tracker_warn};

use crate::api::NovelApi;
use crate::{ChapterEntry, ClientEvent, NewNovelRequest, NovelId, TaskId};

#[derive(Debug, Clone)]
pub struct PollSettings {
    pub interval: Duration,
    /// Consecutive failed polls tolerated before polling gives up.
    pub max_failures: u32,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            max_failures: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCommand {
    ListNovels,
    CreateNovel(NewNovelRequest),
    DeleteNovel(NovelId),
    StartRefresh(NovelId),
    PollTask { novel_id: NovelId, task_id: TaskId },
    FetchMissing(NovelId),
    SubmitChapters {
        novel_id: NovelId,
        chapters: Vec<ChapterEntry>,
    },
}

/// Runs API calls on a background tokio runtime and reports back over a channel.
pub struct ClientHandle {
    cmd_tx: mpsc::Sender<ClientCommand>,
    event_rx: mpsc::Receiver<ClientEvent>,
}

impl ClientHandle {
    pub fn spawn(api: Arc<dyn NovelApi>, poll: PollSettings) -> std::io::Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel::<ClientCommand>();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()?;

        thread::Builder::new()
            .name("tracker-client".to_string())
            .spawn(move || {
                while let Ok(command) = cmd_rx.recv() {
                    let api = api.clone();
                    let event_tx = event_tx.clone();
                    let poll = poll.clone();
                    runtime.spawn(async move {
                        handle_command(api.as_ref(), command, &poll, event_tx).await;
                    });
                }
                tracker_debug!("Client command channel closed; shutting down runtime");
            })?;

        Ok(Self { cmd_tx, event_rx })
    }

    pub fn send(&self, command: ClientCommand) {
        if self.cmd_tx.send(command).is_err() {
            tracker_warn!("Client thread is gone; command dropped");
        }
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<ClientEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

async fn handle_command(
    api: &dyn NovelApi,
    command: ClientCommand,
    poll: &PollSettings,
    event_tx: mpsc::Sender<ClientEvent>,
) {
    let event = match command {
        ClientCommand::ListNovels => ClientEvent::NovelsListed(api.list_novels().await),
        ClientCommand::CreateNovel(novel) => {
            ClientEvent::NovelCreated(api.create_novel(&novel).await)
        }
        ClientCommand::DeleteNovel(novel_id) => ClientEvent::NovelDeleted {
            novel_id,
            result: api.delete_novel(novel_id).await,
        },
        ClientCommand::StartRefresh(novel_id) => {
            let result = api.start_refresh(novel_id).await;
            if let Ok(task_id) = &result {
                tracker_info!("Refresh for novel {} started as task {}", novel_id, task_id);
            }
            ClientEvent::RefreshStarted { novel_id, result }
        }
        ClientCommand::PollTask { novel_id, task_id } => {
            poll_task(api, novel_id, &task_id, poll, &event_tx).await
        }
        ClientCommand::FetchMissing(novel_id) => {
            let result = api.missing_chapters(novel_id).await;
            if let Ok(missing) = &result {
                if missing.dropped > 0 {
                    tracker_warn!(
                        "Dropped {} malformed missing-chapter record(s) for novel {}",
                        missing.dropped,
                        novel_id
                    );
                }
            }
            ClientEvent::MissingFetched { novel_id, result }
        }
        ClientCommand::SubmitChapters { novel_id, chapters } => ClientEvent::ChaptersSubmitted {
            novel_id,
            result: api.submit_chapters(novel_id, &chapters).await,
        },
    };
    let _ = event_tx.send(event);
}

/// Polls until the task is terminal, polling fails too often, or nobody listens.
async fn poll_task(
    api: &dyn NovelApi,
    novel_id: NovelId,
    task_id: &str,
    poll: &PollSettings,
    event_tx: &mpsc::Sender<ClientEvent>,
) -> ClientEvent {
    let mut ticker = interval_at(Instant::now() + poll.interval, poll.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut failures = 0u32;

    loop {
        ticker.tick().await;
        match api.task_status(task_id).await {
            Ok(status) if status.state.is_terminal() => {
                tracker_info!(
                    "Task {} for novel {} finished: {:?} {}",
                    task_id,
                    novel_id,
                    status.state,
                    status.message
                );
                return ClientEvent::PollFinished {
                    novel_id,
                    result: Ok(status),
                };
            }
            Ok(status) => {
                failures = 0;
                let progress = ClientEvent::TaskProgress { novel_id, status };
                if event_tx.send(progress).is_err() {
                    tracker_debug!("Event receiver dropped; stop polling task {}", task_id);
                    return ClientEvent::PollFinished {
                        novel_id,
                        result: Err(crate::ApiError::new(
                            crate::FailureKind::Network,
                            "event receiver dropped",
                        )),
                    };
                }
            }
            Err(err) => {
                failures += 1;
                tracker_warn!(
                    "Polling task {} failed ({}/{}): {}",
                    task_id,
                    failures,
                    poll.max_failures,
                    err
                );
                if failures >= poll.max_failures.max(1) {
                    return ClientEvent::PollFinished {
                        novel_id,
                        result: Err(err),
                    };
                }
            }
        }
    }
}
