mod config;
mod effects;
mod logging;
mod session;
mod ui;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use tracker_client::{ClientHandle, ReqwestApi};
use tracker_core::{Msg, NewNovel, NovelId, ReviewView};
use tracker_logging::tracker_info;

use config::{load_config, render_config, save_config, AppConfig, DEFAULT_CONFIG_PATH};
use effects::EffectRunner;
use logging::LogDestination;
use session::Session;
use ui::prompt::{parse_review_input, skip_rows, ReviewInput, HELP};
use ui::render::{render_novels, render_refresh, render_review};

fn novel_id_arg() -> Arg {
    Arg::new("id")
        .required(true)
        .value_parser(value_parser!(u64))
        .help("Novel id as shown by `novels`")
}

fn build_cli() -> Command {
    Command::new("novel-tracker")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Track chapters missing from NovelUpdates and submit them")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Config file (default: ./novel_tracker.ron)"),
        )
        .arg(
            Arg::new("server")
                .long("server")
                .global(true)
                .help("Tracker server base URL, overrides the config file"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::Count)
                .help("More log output; repeat for more detail"),
        )
        .arg(
            Arg::new("log-file")
                .long("log-file")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Also write logs to this file"),
        )
        .subcommand(Command::new("novels").about("List tracked novels"))
        .subcommand(
            Command::new("add")
                .about("Add a novel to track")
                .arg(Arg::new("name").long("name").required(true).help("Novel title"))
                .arg(
                    Arg::new("fenrir-url")
                        .long("fenrir-url")
                        .required(true)
                        .help("Series page on the translator site"),
                )
                .arg(
                    Arg::new("nu-url")
                        .long("nu-url")
                        .required(true)
                        .help("Series page on NovelUpdates"),
                )
                .arg(
                    Arg::new("group")
                        .long("group")
                        .help("Translation group name (default from config)"),
                )
                .arg(Arg::new("nu-series-id").long("nu-series-id").help("NovelUpdates series id"))
                .arg(Arg::new("nu-group-id").long("nu-group-id").help("NovelUpdates group id")),
        )
        .subcommand(
            Command::new("delete")
                .about("Stop tracking a novel")
                .arg(novel_id_arg())
                .arg(
                    Arg::new("yes")
                        .long("yes")
                        .short('y')
                        .action(ArgAction::SetTrue)
                        .help("Do not ask for confirmation"),
                ),
        )
        .subcommand(
            Command::new("refresh")
                .about("Re-crawl chapters for a novel and wait for the result")
                .arg(novel_id_arg()),
        )
        .subcommand(
            Command::new("missing")
                .about("Show missing chapters, optionally submitting a selection")
                .arg(novel_id_arg())
                .arg(
                    Arg::new("from")
                        .long("from")
                        .help("Start from this chapter, e.g. v2c78 or c32"),
                )
                .arg(
                    Arg::new("skip")
                        .long("skip")
                        .action(ArgAction::Append)
                        .help("Row numbers to leave unselected, e.g. 2 or 3-5"),
                )
                .arg(
                    Arg::new("submit")
                        .long("submit")
                        .action(ArgAction::SetTrue)
                        .help("Submit the selected chapters"),
                ),
        )
        .subcommand(
            Command::new("review")
                .about("Interactively filter, select and submit missing chapters")
                .arg(novel_id_arg()),
        )
        .subcommand(
            Command::new("config")
                .about("Manage the config file")
                .subcommand_required(true)
                .subcommand(
                    Command::new("init").about("Write the effective config to disk").arg(
                        Arg::new("force")
                            .long("force")
                            .action(ArgAction::SetTrue)
                            .help("Overwrite an existing file"),
                    ),
                )
                .subcommand(Command::new("show").about("Print the effective config")),
        )
}

pub fn run() -> anyhow::Result<()> {
    let matches = build_cli().get_matches();

    let level = tracker_logging::level_for_verbosity(matches.get_count("verbose"));
    match matches.get_one::<PathBuf>("log-file") {
        Some(path) => logging::initialize(LogDestination::Both(path), level),
        None => logging::initialize(LogDestination::Terminal, level),
    }

    let config_path = matches
        .get_one::<PathBuf>("config")
        .cloned()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let mut config = load_config(&config_path);
    if let Some(server) = matches.get_one::<String>("server") {
        config.server_url = server.clone();
    }

    match matches.subcommand() {
        Some(("novels", _)) => list_novels(&config),
        Some(("add", sub)) => add_novel(&config, sub),
        Some(("delete", sub)) => delete_novel(&config, id_of(sub), sub.get_flag("yes")),
        Some(("refresh", sub)) => refresh_novel(&config, id_of(sub)),
        Some(("missing", sub)) => missing_once(&config, id_of(sub), sub),
        Some(("review", sub)) => review_interactive(&config, id_of(sub)),
        Some(("config", sub)) => match sub.subcommand() {
            Some(("init", init)) => {
                save_config(&config_path, &config, init.get_flag("force"))?;
                println!("Wrote {}", config_path.display());
                Ok(())
            }
            Some(("show", _)) => {
                println!("{}", render_config(&config)?);
                Ok(())
            }
            _ => bail!("unknown config command"),
        },
        _ => bail!("unknown command"),
    }
}

fn id_of(matches: &ArgMatches) -> NovelId {
    // `id` is a required argument on every subcommand that calls this.
    matches.get_one::<u64>("id").copied().unwrap_or_default()
}

fn build_session(config: &AppConfig) -> anyhow::Result<Session> {
    let api = ReqwestApi::new(config.api_settings())
        .with_context(|| format!("invalid server url {}", config.server_url))?;
    tracker_info!("Using server {}", api.base_url());
    let client = ClientHandle::spawn(Arc::new(api), config.poll_settings())
        .context("failed to start client runtime")?;
    Ok(Session::new(EffectRunner::new(client), config.event_wait()))
}

fn list_novels(config: &AppConfig) -> anyhow::Result<()> {
    let mut session = build_session(config)?;
    session.dispatch(Msg::NovelsRequested);
    session.run_until_idle()?;
    print!("{}", render_novels(&session.view().novels));
    session.finish()
}

fn add_novel(config: &AppConfig, matches: &ArgMatches) -> anyhow::Result<()> {
    let text = |name: &str| matches.get_one::<String>(name).cloned();
    let form = NewNovel {
        name: text("name").unwrap_or_default(),
        fenrir_url: text("fenrir-url").unwrap_or_default(),
        nu_url: text("nu-url").unwrap_or_default(),
        group_name: text("group").unwrap_or_else(|| config.default_group.clone()),
        nu_series_id: text("nu-series-id"),
        nu_group_id: text("nu-group-id"),
    };

    let mut session = build_session(config)?;
    session.dispatch(Msg::AddNovelSubmitted(form));
    session.run_until_idle()?;
    print!("{}", render_novels(&session.view().novels));
    session.finish()
}

fn delete_novel(config: &AppConfig, novel_id: NovelId, assume_yes: bool) -> anyhow::Result<()> {
    if !assume_yes && !confirm(&format!("Delete novel #{novel_id}?"))? {
        println!("Cancelled.");
        return Ok(());
    }
    let mut session = build_session(config)?;
    session.dispatch(Msg::DeleteNovelClicked(novel_id));
    session.run_until_idle()?;
    session.finish()
}

fn refresh_novel(config: &AppConfig, novel_id: NovelId) -> anyhow::Result<()> {
    let mut session = build_session(config)?;
    session.dispatch(Msg::NovelsRequested);
    session.run_until_idle()?;
    if !session.view().novels.iter().any(|novel| novel.id == novel_id) {
        bail!("novel #{novel_id} not found");
    }

    let mut last_line: Option<String> = None;
    session.set_renderer(move |view| {
        let refresh = view
            .novels
            .iter()
            .find(|novel| novel.id == novel_id)
            .and_then(|novel| novel.refresh.as_ref());
        if let Some(refresh) = refresh {
            let line = render_refresh(refresh);
            if last_line.as_deref() != Some(line.as_str()) {
                println!("{line}");
                last_line = Some(line);
            }
        }
    });
    session.dispatch(Msg::RefreshClicked(novel_id));
    session.run_until_idle()?;
    session.set_renderer(|_| {});

    let view = session.view();
    let rows: Vec<_> = view
        .novels
        .into_iter()
        .filter(|novel| novel.id == novel_id)
        .collect();
    print!("{}", render_novels(&rows));
    session.finish()
}

/// Loads the missing list for a novel; `None` when loading failed.
fn open_review(session: &mut Session, novel_id: NovelId) -> anyhow::Result<Option<ReviewView>> {
    session.dispatch(Msg::ViewMissingClicked(novel_id));
    session.run_until_idle()?;
    Ok(session.view().review)
}

fn missing_once(config: &AppConfig, novel_id: NovelId, matches: &ArgMatches) -> anyhow::Result<()> {
    let mut session = build_session(config)?;
    let Some(review) = open_review(&mut session, novel_id)? else {
        return session.finish();
    };
    if review.synced {
        print!("{}", render_review(&review));
        return session.finish();
    }

    if let Some(from) = matches.get_one::<String>("from") {
        session.dispatch(Msg::CursorChanged(from.clone()));
    }
    let row_count = current_review(&session)?.rows.len();
    let skips = matches.get_many::<String>("skip").into_iter().flatten();
    let skipped = skip_rows(skips.map(String::as_str), row_count).map_err(anyhow::Error::msg)?;
    for row in skipped {
        session.dispatch(Msg::ChapterUnchecked(row));
    }

    let review = current_review(&session)?;
    print!("{}", render_review(&review));
    if matches.get_flag("submit") {
        if !review.submit_enabled {
            bail!("nothing selected to submit");
        }
        session.dispatch(Msg::SubmitClicked);
        session.run_until_idle()?;
    }
    session.finish()
}

fn review_interactive(config: &AppConfig, novel_id: NovelId) -> anyhow::Result<()> {
    let mut session = build_session(config)?;
    let Some(review) = open_review(&mut session, novel_id)? else {
        return session.finish();
    };
    print!("{}", render_review(&review));
    if review.synced {
        return session.finish();
    }
    println!("Type `help` for commands.");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("review> ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else {
            session.dispatch(Msg::ReviewClosed);
            println!();
            break;
        };

        let row_count = current_review(&session)?.rows.len();
        match parse_review_input(&line?, row_count) {
            ReviewInput::Cursor(text) => session.dispatch(Msg::CursorChanged(text)),
            ReviewInput::Toggle(rows) => {
                for row in rows {
                    session.dispatch(Msg::ChapterToggled(row));
                }
            }
            ReviewInput::SelectAll => session.dispatch(Msg::SelectAllClicked),
            ReviewInput::SelectNone => session.dispatch(Msg::SelectNoneClicked),
            ReviewInput::Submit => {
                if !current_review(&session)?.submit_enabled {
                    eprintln!("Nothing selected.");
                    continue;
                }
                session.dispatch(Msg::SubmitClicked);
                session.run_until_idle()?;
                if session.view().review.is_none() {
                    break;
                }
            }
            ReviewInput::List => {}
            ReviewInput::Help => {
                println!("{HELP}");
                continue;
            }
            ReviewInput::Quit => {
                session.dispatch(Msg::ReviewClosed);
                break;
            }
            ReviewInput::Invalid(message) => {
                eprintln!("{message}");
                continue;
            }
        }
        print!("{}", render_review(&current_review(&session)?));
    }
    session.finish()
}

fn current_review(session: &Session) -> anyhow::Result<ReviewView> {
    session
        .view()
        .review
        .context("the review was closed unexpectedly")
}

fn confirm(question: &str) -> anyhow::Result<bool> {
    print!("{question} [y/N] ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        build_cli().debug_assert();
    }

    #[test]
    fn missing_accepts_repeated_skips() {
        let matches = build_cli()
            .try_get_matches_from([
                "novel-tracker",
                "--server",
                "http://tracker.local",
                "missing",
                "7",
                "--from",
                "v2c78",
                "--skip",
                "1",
                "--skip",
                "3-4",
            ])
            .expect("valid args");
        assert_eq!(
            matches.get_one::<String>("server").map(String::as_str),
            Some("http://tracker.local")
        );
        let (name, sub) = matches.subcommand().expect("subcommand");
        assert_eq!(name, "missing");
        assert_eq!(id_of(sub), 7);
        let skips: Vec<_> = sub.get_many::<String>("skip").unwrap().cloned().collect();
        assert_eq!(skips, vec!["1", "3-4"]);
    }

    #[test]
    fn add_requires_urls() {
        let result = build_cli().try_get_matches_from(["novel-tracker", "add", "--name", "A"]);
        assert!(result.is_err());
    }

    #[test]
    fn novel_ids_must_be_numeric() {
        let result = build_cli().try_get_matches_from(["novel-tracker", "refresh", "abc"]);
        assert!(result.is_err());
    }
}
