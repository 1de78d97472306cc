use tracker_logging::{tracker_debug, tracker_info};

use crate::{AppState, Effect, Msg, NoticeSeverity, ReviewPhase, ReviewSession, SelectionState};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::NovelsRequested => vec![Effect::FetchNovels],
        Msg::NovelsLoaded(novels) => {
            state.set_novels(novels);
            Vec::new()
        }
        Msg::NovelsLoadFailed(message) => {
            state.push_notice(
                NoticeSeverity::Error,
                format!("Error loading novels: {message}"),
            );
            Vec::new()
        }
        Msg::AddNovelSubmitted(form) => match form.normalized() {
            Ok(novel) => vec![Effect::CreateNovel(novel)],
            Err(missing) => {
                state.push_notice(
                    NoticeSeverity::Error,
                    format!("Missing required fields: {}", missing.join(", ")),
                );
                Vec::new()
            }
        },
        Msg::NovelAdded(novel) => {
            tracker_info!("Novel added id={} name={}", novel.id, novel.name);
            state.push_notice(NoticeSeverity::Success, "Novel added successfully!");
            vec![Effect::FetchNovels]
        }
        Msg::NovelAddFailed(message) => {
            state.push_notice(NoticeSeverity::Error, message);
            Vec::new()
        }
        Msg::DeleteNovelClicked(novel_id) => vec![Effect::DeleteNovel(novel_id)],
        Msg::NovelDeleted(novel_id) => {
            state.end_refresh(novel_id);
            state.push_notice(NoticeSeverity::Success, "Novel deleted");
            vec![Effect::FetchNovels]
        }
        Msg::NovelDeleteFailed { novel_id, message } => {
            tracker_debug!("Delete of novel {} failed: {}", novel_id, message);
            state.push_notice(NoticeSeverity::Error, message);
            Vec::new()
        }
        Msg::RefreshClicked(novel_id) => {
            if state.begin_refresh(novel_id) {
                vec![Effect::StartRefresh(novel_id)]
            } else {
                tracker_debug!("Refresh already running for novel {}", novel_id);
                Vec::new()
            }
        }
        Msg::RefreshStarted { novel_id, task_id } => {
            if state.attach_task(novel_id, &task_id) {
                vec![Effect::PollTask { novel_id, task_id }]
            } else {
                Vec::new()
            }
        }
        Msg::RefreshFailed { novel_id, message } => {
            state.end_refresh(novel_id);
            state.push_notice(NoticeSeverity::Error, message);
            Vec::new()
        }
        Msg::TaskProgress { novel_id, status } => {
            if !state.apply_task_status(novel_id, &status) {
                return (state, Vec::new());
            }
            if status.state.is_terminal() {
                state.end_refresh(novel_id);
                if status.state == crate::TaskState::Error {
                    state.push_notice(
                        NoticeSeverity::Warning,
                        format!("Refresh failed: {}", status.message),
                    );
                }
                vec![Effect::FetchNovels]
            } else {
                Vec::new()
            }
        }
        msg => return update_review(state, msg),
    };

    (state, effects)
}

/// Handles the messages that drive the "view missing" dialog.
fn update_review(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let phase = state.take_review();
    let (next, effects) = match (phase, msg) {
        (ReviewPhase::Submitting(session), Msg::ViewMissingClicked(_)) => {
            state.restore_review(ReviewPhase::Submitting(session));
            return (state, Vec::new());
        }
        (_, Msg::ViewMissingClicked(novel_id)) => (
            ReviewPhase::Loading { novel_id },
            vec![Effect::FetchMissing(novel_id)],
        ),
        (
            ReviewPhase::Loading { novel_id },
            Msg::MissingLoaded {
                novel_id: loaded_id,
                count,
                chapters,
            },
        ) if novel_id == loaded_id => (
            ReviewPhase::Loaded(ReviewSession::new(novel_id, count, &chapters)),
            Vec::new(),
        ),
        (
            ReviewPhase::Loading { novel_id },
            Msg::MissingLoadFailed {
                novel_id: failed_id,
                message,
            },
        ) if novel_id == failed_id => {
            state.push_notice(
                NoticeSeverity::Error,
                format!("Error loading missing chapters: {message}"),
            );
            (ReviewPhase::Idle, Vec::new())
        }
        (ReviewPhase::Loaded(session), Msg::CursorChanged(text)) => {
            if session.cursor_text() == text {
                state.restore_review(ReviewPhase::Loaded(session));
                return (state, Vec::new());
            }
            (ReviewPhase::Loaded(session.with_cursor(text)), Vec::new())
        }
        (ReviewPhase::Loaded(session), Msg::ChapterToggled(index)) => {
            let toggled = session.map_selection(|selection| selection.toggle(index));
            (ReviewPhase::Loaded(toggled), Vec::new())
        }
        (ReviewPhase::Loaded(session), Msg::ChapterUnchecked(index)) => {
            if !session.selection().is_selected(index) {
                state.restore_review(ReviewPhase::Loaded(session));
                return (state, Vec::new());
            }
            let cleared = session.map_selection(|selection| selection.deselect(index));
            (ReviewPhase::Loaded(cleared), Vec::new())
        }
        (ReviewPhase::Loaded(session), Msg::SelectAllClicked) => (
            ReviewPhase::Loaded(session.map_selection(SelectionState::select_all)),
            Vec::new(),
        ),
        (ReviewPhase::Loaded(session), Msg::SelectNoneClicked) => (
            ReviewPhase::Loaded(session.map_selection(SelectionState::select_none)),
            Vec::new(),
        ),
        (ReviewPhase::Loaded(session), Msg::SubmitClicked) => {
            let chapters = session.selection().selected();
            if chapters.is_empty() {
                state.restore_review(ReviewPhase::Loaded(session));
                return (state, Vec::new());
            }
            let novel_id = session.novel_id();
            tracker_info!(
                "Submitting {} chapter(s) for novel {}",
                chapters.len(),
                novel_id
            );
            (
                ReviewPhase::Submitting(session),
                vec![Effect::SubmitChapters { novel_id, chapters }],
            )
        }
        (ReviewPhase::Submitting(session), Msg::SubmitSucceeded { novel_id, queued })
            if session.novel_id() == novel_id =>
        {
            state.push_notice(
                NoticeSeverity::Success,
                format!("Submitted! ({queued} queued)"),
            );
            (ReviewPhase::Idle, Vec::new())
        }
        (ReviewPhase::Submitting(session), Msg::SubmitFailed { novel_id, message })
            if session.novel_id() == novel_id =>
        {
            state.push_notice(NoticeSeverity::Error, format!("Submit failed: {message}"));
            (ReviewPhase::Loaded(session), Vec::new())
        }
        (ReviewPhase::Idle, Msg::ReviewClosed) => {
            state.restore_review(ReviewPhase::Idle);
            return (state, Vec::new());
        }
        (_, Msg::ReviewClosed) => (ReviewPhase::Idle, Vec::new()),
        (phase, msg) => {
            if !matches!(msg, Msg::Tick | Msg::NoOp) {
                tracker_debug!("Ignoring {:?} in review phase {:?}", msg, phase_name(&phase));
            }
            state.restore_review(phase);
            return (state, Vec::new());
        }
    };

    state.set_review(next);
    (state, effects)
}

fn phase_name(phase: &ReviewPhase) -> &'static str {
    match phase {
        ReviewPhase::Idle => "Idle",
        ReviewPhase::Loading { .. } => "Loading",
        ReviewPhase::Loaded(_) => "Loaded",
        ReviewPhase::Submitting(_) => "Submitting",
    }
}
