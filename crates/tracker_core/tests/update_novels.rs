use pretty_assertions::assert_eq;
use tracker_core::{
    update, AppState, Effect, Msg, NewNovel, NoticeSeverity, NovelSummary, TaskState, TaskStatus,
    DEFAULT_GROUP,
};

fn init_logging() {
    tracker_logging::initialize_for_tests();
}

fn novel(id: u64, name: &str) -> NovelSummary {
    NovelSummary {
        id,
        name: name.to_string(),
        fenrir_url: format!("https://fenrir.example/{id}"),
        nu_url: format!("https://nu.example/{id}"),
        group_name: DEFAULT_GROUP.to_string(),
        ..NovelSummary::default()
    }
}

fn status(state: TaskState, progress: u8, message: &str) -> TaskStatus {
    TaskStatus {
        state,
        progress,
        message: message.to_string(),
    }
}

#[test]
fn novels_loaded_replaces_list() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::NovelsRequested);
    assert_eq!(effects, vec![Effect::FetchNovels]);

    let (mut state, _) = update(state, Msg::NovelsLoaded(vec![novel(1, "A"), novel(2, "B")]));
    assert!(state.consume_dirty());
    let names: Vec<_> = state.view().novels.into_iter().map(|n| n.name).collect();
    assert_eq!(names, vec!["A", "B"]);

    let (state, _) = update(state, Msg::NovelsLoaded(vec![novel(2, "B")]));
    assert_eq!(state.novels().len(), 1);
}

#[test]
fn add_form_is_normalized_before_create() {
    init_logging();
    let form = NewNovel {
        name: "  Solo Leveling ".to_string(),
        fenrir_url: "https://fenrir.example/solo".to_string(),
        nu_url: "https://nu.example/solo".to_string(),
        group_name: "   ".to_string(),
        nu_series_id: Some("  ".to_string()),
        nu_group_id: Some(" 42 ".to_string()),
    };

    let (_state, effects) = update(AppState::new(), Msg::AddNovelSubmitted(form));
    assert_eq!(
        effects,
        vec![Effect::CreateNovel(NewNovel {
            name: "Solo Leveling".to_string(),
            fenrir_url: "https://fenrir.example/solo".to_string(),
            nu_url: "https://nu.example/solo".to_string(),
            group_name: DEFAULT_GROUP.to_string(),
            nu_series_id: None,
            nu_group_id: Some("42".to_string()),
        })]
    );
}

#[test]
fn add_form_with_blank_required_fields_is_rejected() {
    init_logging();
    let form = NewNovel {
        name: "Name".to_string(),
        ..NewNovel::default()
    };

    let (mut state, effects) = update(AppState::new(), Msg::AddNovelSubmitted(form));
    assert!(effects.is_empty());
    let notices = state.take_notices();
    assert_eq!(notices[0].severity, NoticeSeverity::Error);
    assert_eq!(notices[0].text, "Missing required fields: fenrir_url, nu_url");
}

#[test]
fn added_and_deleted_novels_reload_the_list() {
    init_logging();
    let (mut state, effects) = update(AppState::new(), Msg::NovelAdded(novel(5, "New")));
    assert_eq!(effects, vec![Effect::FetchNovels]);
    assert_eq!(state.take_notices()[0].text, "Novel added successfully!");

    let (state, effects) = update(state, Msg::DeleteNovelClicked(5));
    assert_eq!(effects, vec![Effect::DeleteNovel(5)]);

    let (mut state, effects) = update(state, Msg::NovelDeleted(5));
    assert_eq!(effects, vec![Effect::FetchNovels]);
    assert_eq!(state.take_notices()[0].text, "Novel deleted");
}

#[test]
fn refresh_flow_polls_then_reloads() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::NovelsLoaded(vec![novel(1, "A")]));

    let (state, effects) = update(state, Msg::RefreshClicked(1));
    assert_eq!(effects, vec![Effect::StartRefresh(1)]);
    let refresh = state.view().novels[0].refresh.clone().expect("refreshing");
    assert_eq!(refresh.progress, 0);
    assert_eq!(refresh.message, "Starting...");

    let (state, effects) = update(
        state,
        Msg::RefreshStarted {
            novel_id: 1,
            task_id: "abc".to_string(),
        },
    );
    assert_eq!(
        effects,
        vec![Effect::PollTask {
            novel_id: 1,
            task_id: "abc".to_string(),
        }]
    );

    let (state, effects) = update(
        state,
        Msg::TaskProgress {
            novel_id: 1,
            status: status(TaskState::Running, 55, "Loading NovelUpdates..."),
        },
    );
    assert!(effects.is_empty());
    let refresh = state.view().novels[0].refresh.clone().expect("refreshing");
    assert_eq!(refresh.progress, 55);
    assert_eq!(state.view().refreshing, vec![1]);

    let (mut state, effects) = update(
        state,
        Msg::TaskProgress {
            novel_id: 1,
            status: status(TaskState::Completed, 100, "Done"),
        },
    );
    assert_eq!(effects, vec![Effect::FetchNovels]);
    assert!(!state.is_refreshing(1));
    assert!(state.take_notices().is_empty());
}

#[test]
fn second_refresh_click_is_ignored_while_running() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::RefreshClicked(1));
    let (state, effects) = update(state, Msg::RefreshClicked(1));
    assert!(effects.is_empty());
    assert!(state.is_refreshing(1));
}

#[test]
fn errored_task_warns_and_reloads() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::RefreshClicked(3));
    let (mut state, effects) = update(
        state,
        Msg::TaskProgress {
            novel_id: 3,
            status: status(TaskState::Error, 10, "Novel not found"),
        },
    );

    assert_eq!(effects, vec![Effect::FetchNovels]);
    let notices = state.take_notices();
    assert_eq!(notices[0].severity, NoticeSeverity::Warning);
    assert_eq!(notices[0].text, "Refresh failed: Novel not found");
}

#[test]
fn progress_for_unknown_refresh_is_ignored() {
    init_logging();
    let (mut state, effects) = update(
        AppState::new(),
        Msg::TaskProgress {
            novel_id: 9,
            status: status(TaskState::Completed, 100, "Done"),
        },
    );
    assert!(effects.is_empty());
    assert!(!state.consume_dirty());
}

#[test]
fn refresh_transport_failure_clears_progress() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::RefreshClicked(2));
    let (mut state, _) = update(
        state,
        Msg::RefreshFailed {
            novel_id: 2,
            message: "network error".to_string(),
        },
    );
    assert!(!state.is_refreshing(2));
    assert_eq!(state.take_notices()[0].severity, NoticeSeverity::Error);
}
