use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::ui::{install_panic_hook, steps::access_denied, TerminalGuard, WizardScreen};
use crate::wizard::{
    FileFlowStore, FlowStateStore, MemoryRouteStore, Mounted, RouteParamStore, RouteParams,
    ScreenNavigator, StepAction, StepId, StepProps, StepView, WizardController, WizardOptions,
    WizardStores,
};
use crate::workspace::{Assignment, AssignmentLog, Workspace};

/// What the wizard was opened with
#[derive(Debug, Clone, Default)]
pub struct LaunchOptions {
    /// Raw route query, e.g. `feed=vcf&backTo=cards`
    pub route: Option<String>,
    pub feed: Option<String>,
    pub policy_id: Option<String>,
    pub step: Option<String>,
    pub back_to: Option<String>,
}

impl LaunchOptions {
    /// Route params from the query, with explicit flags taking precedence
    pub fn route_params(&self, workspace: &Workspace) -> RouteParams {
        let mut params = self
            .route
            .as_deref()
            .map(RouteParams::from_query)
            .unwrap_or_default();
        if let Some(feed) = &self.feed {
            params.feed = urlencoding::encode(feed).into_owned();
        }
        if params.feed.is_empty() {
            if let Some(feed) = workspace.feeds.first() {
                params.feed = urlencoding::encode(&feed.name).into_owned();
            }
        }
        if let Some(step) = &self.step {
            params.step = StepId::parse(step);
            if params.step.is_none() {
                tracing::warn!(step = %step, "Ignoring unknown --step");
            }
        }
        if let Some(back_to) = &self.back_to {
            params.back_to = Some(back_to.clone()).filter(|b| !b.is_empty());
        }
        params
    }
}

pub struct App {
    config: Config,
    workspace: Workspace,
    policy_id: String,
    flow: Arc<FileFlowStore>,
    route: Arc<MemoryRouteStore>,
    navigator: Arc<ScreenNavigator>,
    screen: WizardScreen,
    /// Printed after the terminal is restored
    exit_message: Option<String>,
}

impl App {
    pub fn new(config: Config, launch: &LaunchOptions) -> Result<Self> {
        let workspace = Workspace::load(&config.workspace_path())?;
        let policy_id = launch
            .policy_id
            .clone()
            .unwrap_or_else(|| workspace.policy.id.clone());
        let params = launch.route_params(&workspace);
        tracing::info!(route = %params.to_query(), policy_id = %policy_id, "Opening assign card");

        Ok(Self {
            flow: Arc::new(FileFlowStore::in_dir(&config.state_path())),
            route: Arc::new(MemoryRouteStore::new(params)),
            navigator: Arc::new(ScreenNavigator::new()),
            screen: WizardScreen::new(),
            exit_message: None,
            config,
            workspace,
            policy_id,
        })
    }

    fn stores(&self) -> WizardStores {
        WizardStores {
            flow: self.flow.clone(),
            route: self.route.clone(),
            navigator: self.navigator.clone(),
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        if let Some(state) = self.flow.read()? {
            tracing::info!(step = ?state.current_step, "Resuming assign card flow");
        }

        let options = WizardOptions {
            registry: self.config.wizard.registry(),
            policy_id: Some(self.policy_id.clone()),
        };

        install_panic_hook();
        let guard = TerminalGuard::enter()?;
        let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
        let tick_rate = Duration::from_millis(self.config.ui.refresh_rate_ms);

        match WizardController::mount(options, &self.config.account, self.stores()) {
            Mounted::AccessDenied => {
                let delegate = self.config.account.delegate.clone();
                loop {
                    terminal.draw(|f| {
                        let area = f.area();
                        access_denied::render(f, area, delegate.as_deref());
                    })?;
                    if event::poll(tick_rate)? {
                        if let Event::Key(key) = event::read()? {
                            if key.kind == KeyEventKind::Press {
                                break;
                            }
                        }
                    }
                }
            }
            Mounted::Active(mut controller) => {
                let result = self.run_wizard(&mut terminal, &mut controller, tick_rate);
                // Clear the record even when the loop failed
                controller.dispose()?;
                result?;
            }
        }

        guard.release();
        terminal.show_cursor()?;

        if let Some(message) = &self.exit_message {
            println!("{message}");
        }
        Ok(())
    }

    fn run_wizard(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        controller: &mut WizardController,
        tick_rate: Duration,
    ) -> Result<()> {
        while !self.navigator.is_dismissed() {
            let view = controller.render_pass()?;
            let location = self.route.location();

            terminal.draw(|f| {
                self.screen
                    .render(f, &view, controller.registry(), &self.workspace, &location);
            })?;

            if event::poll(tick_rate)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(controller, key, &view)?;
                    }
                }
            }
        }
        if self.exit_message.is_none() {
            self.exit_message = Some("Card assignment cancelled.".to_string());
        }
        Ok(())
    }

    fn handle_key(
        &mut self,
        controller: &mut WizardController,
        key: KeyEvent,
        view: &StepView,
    ) -> Result<()> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            controller.close()?;
            return Ok(());
        }
        if key.code == KeyCode::Esc {
            // Either queues a retreat or leaves from the first step
            self.navigator.request_leave();
            return Ok(());
        }

        let action = self.screen.handle_key(key.code, view, &self.workspace);
        if action == StepAction::Submit {
            match self.record_assignment(view) {
                Ok(message) => self.exit_message = Some(message),
                Err(e) => {
                    tracing::warn!(error = %e, "Assignment not recorded");
                    self.screen.status = Some(e.to_string());
                    return Ok(());
                }
            }
        }

        if let Err(e) = controller.handle(action) {
            tracing::warn!(error = %e, "Wizard action failed");
            self.screen.status = Some(e.to_string());
        }
        Ok(())
    }

    fn record_assignment(&self, view: &StepView) -> Result<String> {
        let params = self.route.params();
        let feed = params.decoded_feed().context("Card feed can't be read")?;
        let assignment = Assignment::from_flow(&self.policy_id, &feed, &view.data)?;
        if self.workspace.policy.member(&assignment.email).is_none() {
            anyhow::bail!(
                "{} is not a member of {}",
                assignment.email,
                self.workspace.policy.name
            );
        }
        AssignmentLog::append(&self.config.assignments_path(), &assignment)?;

        let back_to = match &view.props {
            StepProps::Confirmation { back_to, .. } => back_to.as_deref(),
            _ => None,
        };
        Ok(exit_message(&assignment, back_to))
    }
}

/// Message printed once a card was assigned
pub fn exit_message(assignment: &Assignment, back_to: Option<&str>) -> String {
    let mut message = format!(
        "Assigned {} to {} as \"{}\".",
        assignment.card_number, assignment.email, assignment.card_name
    );
    if let Some(back_to) = back_to {
        message.push_str(&format!(" Returning to {back_to}."));
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::{dispatch, FlowData, StartDateOption, StepContext};
    use tempfile::TempDir;

    fn app_in(temp_dir: &TempDir) -> App {
        let mut config = Config::default();
        config.paths.state = temp_dir.path().to_string_lossy().to_string();
        let launch = LaunchOptions {
            route: Some("feed=plaid.ins_19&backTo=workspace%2Fcards".to_string()),
            ..LaunchOptions::default()
        };
        App::new(config, &launch).unwrap()
    }

    fn confirmation(email: &str) -> StepView {
        dispatch(
            Some(StepId::Confirmation),
            &StepContext {
                back_to: Some("workspace/cards".to_string()),
                should_use_back_to: true,
                data: FlowData {
                    email: Some(email.to_string()),
                    card_number: Some("411111XXXXXX1111".to_string()),
                    ..FlowData::default()
                },
                ..StepContext::default()
            },
        )
    }

    #[test]
    fn test_record_assignment_appends_to_log() {
        let temp_dir = TempDir::new().unwrap();
        let app = app_in(&temp_dir);

        let message = app.record_assignment(&confirmation("sam@acme.example")).unwrap();
        assert!(message.ends_with("Returning to workspace/cards."));

        let log = AssignmentLog::load(&temp_dir.path().join("assignments.json")).unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].feed, "plaid.ins_19");
        assert_eq!(log[0].policy_id, "A1B2C3D4E5F6");
    }

    #[test]
    fn test_record_assignment_rejects_non_member() {
        let temp_dir = TempDir::new().unwrap();
        let app = app_in(&temp_dir);

        assert!(app.record_assignment(&confirmation("stranger@example.com")).is_err());
        assert!(!temp_dir.path().join("assignments.json").exists());
    }

    #[test]
    fn test_flags_override_route_query() {
        let launch = LaunchOptions {
            route: Some("feed=vcf&backTo=home&step=CARD".to_string()),
            step: Some("card-name".to_string()),
            back_to: Some("workspace/cards".to_string()),
            ..LaunchOptions::default()
        };
        let params = launch.route_params(&Workspace::demo());
        assert_eq!(params.feed, "vcf");
        assert_eq!(params.step, Some(StepId::CardName));
        assert_eq!(params.back_to.as_deref(), Some("workspace/cards"));
    }

    #[test]
    fn test_missing_feed_defaults_to_first_workspace_feed() {
        let params = LaunchOptions::default().route_params(&Workspace::demo());
        assert_eq!(params.decoded_feed().unwrap(), "oauth.chase.com");
        assert_eq!(params.step, None);
    }

    #[test]
    fn test_unknown_step_flag_is_dropped() {
        let launch = LaunchOptions {
            step: Some("SOMEWHERE".to_string()),
            ..LaunchOptions::default()
        };
        assert_eq!(launch.route_params(&Workspace::demo()).step, None);
    }

    #[test]
    fn test_exit_message_names_destination() {
        let data = FlowData {
            email: Some("sam@acme.example".to_string()),
            card_number: Some("411111XXXXXX1111".to_string()),
            start_date_option: Some(StartDateOption::FromBeginning),
            ..FlowData::default()
        };
        let assignment = Assignment::from_flow("A1B2C3D4E5F6", "plaid.ins_19", &data).unwrap();

        let message = exit_message(&assignment, Some("workspace/cards"));
        assert!(message.contains("sam@acme.example"));
        assert!(message.contains("sam's card"));
        assert!(message.ends_with("Returning to workspace/cards."));
        assert!(!exit_message(&assignment, None).contains("Returning"));
    }
}
