use std::time::Duration;

use anyhow::bail;
use tracker_core::{update, AppState, AppViewModel, Msg, NoticeSeverity};
use tracker_logging::tracker_debug;

use super::effects::EffectRunner;
use super::ui::render::render_notice;

type Renderer = Box<dyn FnMut(&AppViewModel)>;

/// Owns the application state for one command and pumps messages through `update`.
pub struct Session {
    state: AppState,
    runner: EffectRunner,
    event_wait: Duration,
    renderer: Renderer,
    failed: bool,
}

impl Session {
    pub fn new(runner: EffectRunner, event_wait: Duration) -> Self {
        Self {
            state: AppState::new(),
            runner,
            event_wait,
            renderer: Box::new(|_| {}),
            failed: false,
        }
    }

    /// Called with a fresh view model after every message that changed state.
    pub fn set_renderer(&mut self, renderer: impl FnMut(&AppViewModel) + 'static) {
        self.renderer = Box::new(renderer);
    }

    pub fn view(&self) -> AppViewModel {
        self.state.view()
    }

    pub fn dispatch(&mut self, msg: Msg) {
        tracker_debug!("dispatch {:?}", msg);
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let notices = state.take_notices();
        let view = state.consume_dirty().then(|| state.view());
        self.state = state;

        for notice in notices {
            if notice.severity == NoticeSeverity::Error {
                self.failed = true;
                eprintln!("{}", render_notice(&notice));
            } else {
                println!("{}", render_notice(&notice));
            }
        }
        if let Some(view) = view {
            (self.renderer)(&view);
        }
        self.runner.enqueue(effects);
    }

    /// Feeds client replies back into `update` until no command is in flight.
    pub fn run_until_idle(&mut self) -> anyhow::Result<()> {
        while self.runner.outstanding() > 0 {
            let Some(msg) = self.runner.next_msg(self.event_wait) else {
                bail!(
                    "no reply from the server within {}s",
                    self.event_wait.as_secs()
                );
            };
            self.dispatch(msg);
        }
        Ok(())
    }

    /// Fails when any error notice was shown during the session.
    pub fn finish(self) -> anyhow::Result<()> {
        if self.failed {
            bail!("command failed");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tracker_client::{ApiSettings, ClientHandle, PollSettings, ReqwestApi};
    use tracker_core::ChapterRef;

    use super::*;

    fn offline_session() -> Session {
        let api = ReqwestApi::new(ApiSettings::default()).unwrap();
        let client = ClientHandle::spawn(Arc::new(api), PollSettings::default()).unwrap();
        Session::new(EffectRunner::new(client), Duration::from_millis(10))
    }

    #[test]
    fn finish_fails_after_a_failed_submit() {
        let mut session = offline_session();
        session.dispatch(Msg::ViewMissingClicked(3));
        session.dispatch(Msg::MissingLoaded {
            novel_id: 3,
            count: 1,
            chapters: vec![ChapterRef::new(0, 1)],
        });
        session.dispatch(Msg::SubmitClicked);
        session.dispatch(Msg::SubmitFailed {
            novel_id: 3,
            message: "http status 500".to_string(),
        });

        let review = session.view().review.expect("review stays open");
        assert!(review.submit_enabled);
        assert!(session.finish().is_err());
    }

    #[test]
    fn finish_succeeds_without_error_notices() {
        let mut session = offline_session();
        session.dispatch(Msg::Tick);
        assert!(session.finish().is_ok());
    }
}
