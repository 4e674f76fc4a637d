use std::path::Path;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use anyhow::Context;
use console_logging::{console_info, console_warn};
use harvest_client::ServiceHandle;
use harvest_core::{update, AgronomistList, AppState, AppViewModel, Msg, NoticeLevel};

use super::cli::{Cli, Command};
use super::effects::EffectRunner;
use super::render;
use super::settings::{ConsoleSettings, LOG_FILENAME};

/// Slack on top of the HTTP timeout before giving up on an answer.
const SETTLE_MARGIN: Duration = Duration::from_secs(2);
const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let settings = ConsoleSettings::load(&cli.config)?.with_overrides(cli.base_url, cli.token);
    console_logging::initialize(
        settings.log_destination.into(),
        settings.level_filter()?,
        Path::new(LOG_FILENAME),
    );

    let client_settings = settings.client_settings();
    let patience = client_settings.request_timeout + SETTLE_MARGIN;
    let service = ServiceHandle::new(client_settings).context("starting service runtime")?;
    let mut console = Console::new(EffectRunner::new(service), patience);

    console.dispatch(Msg::RefreshRequested);
    console.settle();

    match cli.command {
        Command::Summary => {
            print!("{}", render::summary(&console.view()));
        }
        Command::List { search } => {
            if let Some(query) = search {
                console.dispatch(Msg::SearchChanged(query));
            }
            print!("{}", render::rows(&console.view()));
        }
        Command::Agronomists { request_id } => {
            console.dispatch(Msg::AssignDialogOpened { request_id });
            console.settle();
            if let Some(dialog) = console.view().dialog {
                print!("{}", render::dialog(&dialog));
            }
        }
        Command::Assign {
            request_id,
            expert_id,
            advice,
        } => {
            console.dispatch(Msg::AssignDialogOpened {
                request_id: request_id.clone(),
            });
            console.settle();
            // Unknown or unnamed agronomists fall back to the id as display name.
            let expert_name = console
                .expert_name(&expert_id)
                .unwrap_or_else(|| expert_id.clone());
            console.dispatch(Msg::AssignSubmitted {
                request_id: request_id.clone(),
                expert_id: Some(expert_id),
                expert_name: Some(expert_name),
                admin_advice: advice,
            });
            console.settle();
            let view = console.view();
            if let Some(row) = view.rows.iter().find(|row| row.request_id == request_id) {
                println!("{}", render::row_line(row));
            }
        }
    }

    let view = console.view();
    if let Some(line) = render::notice_line(&view) {
        eprintln!("{line}");
    }
    let failed = view
        .notice
        .as_ref()
        .is_some_and(|notice| notice.level == NoticeLevel::Error);
    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

struct Console {
    state: AppState,
    runner: EffectRunner,
    patience: Duration,
}

impl Console {
    fn new(runner: EffectRunner, patience: Duration) -> Self {
        Self {
            state: AppState::new(),
            runner,
            patience,
        }
    }

    fn view(&self) -> AppViewModel {
        self.state.view()
    }

    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        self.runner.enqueue(effects);
    }

    /// Whether any remote answer is still awaited.
    fn busy(&self) -> bool {
        let loading_agronomists = self
            .state
            .dialog()
            .is_some_and(|dialog| dialog.agronomists == AgronomistList::Loading);
        self.state.is_refreshing() || self.state.is_assigning() || loading_agronomists
    }

    /// Feeds service answers into the state until nothing is outstanding.
    fn settle(&mut self) {
        let mut deadline = Instant::now() + self.patience;
        while self.busy() {
            if Instant::now() >= deadline {
                console_warn!("Gave up waiting for the harvest service");
                break;
            }
            if let Some(msg) = self.runner.next_msg(POLL_INTERVAL) {
                self.dispatch(msg);
                deadline = Instant::now() + self.patience;
            }
        }
        if self.state.consume_dirty() {
            console_info!(
                "Settled at snapshot version={}",
                self.state.snapshot().version
            );
        }
    }

    /// Display name of an agronomist in the open dialog's available list.
    fn expert_name(&self, expert_id: &str) -> Option<String> {
        self.state
            .dialog()?
            .available()
            .iter()
            .find(|agronomist| agronomist.id == expert_id)
            .map(|agronomist| agronomist.full_name.trim())
            .filter(|name| !name.is_empty())
            .map(ToOwned::to_owned)
    }
}
