//! Wizard controller: resolves the current step, keeps the route and the
//! persisted record in sync, and drives navigation and teardown.
//!
//! The host calls [`WizardController::render_pass`] once per frame. A pass
//! resolves the step from the current store contents and then runs the two
//! reactive effects (route/record sync and back-listener binding), each only
//! when its inputs changed since the previous pass. Writes made during a pass
//! are observed by the next one.

use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use super::dispatch::{dispatch, StepAction, StepContext, StepView};
use super::error::WizardError;
use super::navigation::{ListenerId, Navigator};
use super::resolve::{resolve_step, sync_action, SyncAction};
use super::route::RouteParamStore;
use super::state::{FlowData, FlowState, FlowStatePatch};
use super::step::{StepId, StepRegistry};
use super::store::FlowStateStore;

/// Externally computed "acting under delegated access" gate
pub trait AccessGate {
    fn is_restricted_access(&self) -> bool;
}

impl AccessGate for bool {
    fn is_restricted_access(&self) -> bool {
        *self
    }
}

/// Collaborators the controller reads from and writes to
#[derive(Clone)]
pub struct WizardStores {
    pub flow: Arc<dyn FlowStateStore>,
    pub route: Arc<dyn RouteParamStore>,
    pub navigator: Arc<dyn Navigator>,
}

/// Static inputs for one wizard session
#[derive(Debug, Clone, Default)]
pub struct WizardOptions {
    pub registry: StepRegistry,
    pub policy_id: Option<String>,
}

/// Outcome of mounting the wizard screen
pub enum Mounted {
    /// Restricted access: only the access-denied view is shown and the
    /// controller never starts
    AccessDenied,
    Active(WizardController),
}

/// Commands delivered to the controller from outside a pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardCommand {
    Retreat,
}

#[derive(Debug, Clone, Copy)]
struct BoundListener {
    step: StepId,
    id: ListenerId,
}

pub struct WizardController {
    options: WizardOptions,
    stores: WizardStores,
    commands_tx: UnboundedSender<WizardCommand>,
    commands_rx: UnboundedReceiver<WizardCommand>,
    /// `(url step, persisted step)` the sync effect last ran for
    synced_inputs: Option<(Option<StepId>, Option<StepId>)>,
    listener: Option<BoundListener>,
    /// Assignee email as seen on the first pass
    initial_assignee: Option<Option<String>>,
    disposed: bool,
}

impl WizardController {
    /// Mount the wizard, or stop at the access gate
    pub fn mount(options: WizardOptions, gate: &dyn AccessGate, stores: WizardStores) -> Mounted {
        if gate.is_restricted_access() {
            tracing::info!("Delegated access: assign card wizard not started");
            return Mounted::AccessDenied;
        }

        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        tracing::info!(
            policy_id = options.policy_id.as_deref().unwrap_or("-"),
            "Assign card wizard mounted"
        );
        Mounted::Active(Self {
            options,
            stores,
            commands_tx,
            commands_rx,
            synced_inputs: None,
            listener: None,
            initial_assignee: None,
            disposed: false,
        })
    }

    pub fn registry(&self) -> &StepRegistry {
        &self.options.registry
    }

    fn ensure_active(&self) -> Result<(), WizardError> {
        if self.disposed {
            Err(WizardError::Disposed)
        } else {
            Ok(())
        }
    }

    pub fn flow_state(&self) -> Result<Option<FlowState>, WizardError> {
        Ok(self.stores.flow.read()?)
    }

    /// Step resolved from the current store contents
    pub fn current_step(&self) -> Result<StepId, WizardError> {
        let persisted = self.stores.flow.read()?.and_then(|s| s.current_step);
        Ok(resolve_step(
            self.stores.route.read_step(),
            persisted,
            &self.options.registry,
        ))
    }

    /// One render: resolve, build the view, then run the effects
    pub fn render_pass(&mut self) -> Result<StepView, WizardError> {
        self.ensure_active()?;
        self.drain_commands()?;

        let params = self.stores.route.params();
        let state = self.stores.flow.read()?.unwrap_or_default();
        let url_step = params.step;
        let persisted_step = state.current_step;
        let resolved = resolve_step(url_step, persisted_step, &self.options.registry);

        let current_assignee = state.data.email.clone();
        let initial_assignee = self
            .initial_assignee
            .get_or_insert_with(|| current_assignee.clone());
        let should_use_back_to =
            initial_assignee.is_none() || *initial_assignee == current_assignee;

        let feed = params.decoded_feed().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Passing undecodable feed through unchanged");
            params.feed.clone()
        });
        let ctx = StepContext {
            first_step: self.options.registry.first(),
            policy_id: self.options.policy_id.clone(),
            feed,
            back_to: params.back_to.clone(),
            should_use_back_to,
            is_editing: state.is_editing,
            data: state.data,
        };
        let view = dispatch(Some(resolved), &ctx);

        self.sync_effect(url_step, persisted_step)?;
        self.bind_back_listener(resolved);

        Ok(view)
    }

    fn drain_commands(&mut self) -> Result<(), WizardError> {
        while let Ok(command) = self.commands_rx.try_recv() {
            match command {
                WizardCommand::Retreat => self.retreat()?,
            }
        }
        Ok(())
    }

    fn sync_effect(
        &mut self,
        url_step: Option<StepId>,
        persisted_step: Option<StepId>,
    ) -> Result<(), WizardError> {
        let inputs = (url_step, persisted_step);
        if self.synced_inputs == Some(inputs) {
            return Ok(());
        }
        self.synced_inputs = Some(inputs);

        match sync_action(url_step, persisted_step, &self.options.registry) {
            SyncAction::WriteFlowState(step) => {
                tracing::debug!(step = %step, "Route step copied into flow state");
                self.stores.flow.write(FlowStatePatch::navigate(step))?;
            }
            SyncAction::WriteRoute(step) => {
                tracing::debug!(step = %step, "Flow state step restored into route");
                self.stores.route.write_step(step);
            }
            SyncAction::None => {}
        }
        Ok(())
    }

    /// Bind a before-leave listener for `step`, replacing any listener bound
    /// to an older step
    fn bind_back_listener(&mut self, step: StepId) {
        if let Some(bound) = self.listener {
            if bound.step == step {
                return;
            }
            self.stores.navigator.remove_before_leave_listener(bound.id);
        }

        let first = self.options.registry.first();
        let commands = self.commands_tx.clone();
        let id = self
            .stores
            .navigator
            .add_before_leave_listener(Box::new(move |event| {
                if step == first {
                    return;
                }
                event.prevent_default();
                // Receiver only closes on dispose
                let _ = commands.send(WizardCommand::Retreat);
            }));
        self.listener = Some(BoundListener { step, id });
        tracing::debug!(step = %step, "Back listener bound");
    }

    /// Move to `target`, chosen by the current step's collaborator
    pub fn advance(&mut self, target: StepId) -> Result<(), WizardError> {
        self.ensure_active()?;
        let current = self.current_step()?;
        let target = self.options.registry.transition(current, target)?;

        self.stores.route.write_step(target);
        self.stores.flow.write(FlowStatePatch::navigate(target))?;
        tracing::debug!(from = %current, to = %target, "Advanced");
        Ok(())
    }

    /// Step back in registry order, or close from the first step
    pub fn retreat(&mut self) -> Result<(), WizardError> {
        self.ensure_active()?;
        let current = self.current_step()?;
        match self.options.registry.previous(current) {
            Some(previous) => self.advance(previous),
            None => self.close(),
        }
    }

    /// Dismiss the wizard screen. The record is cleared on dispose, not here.
    pub fn close(&mut self) -> Result<(), WizardError> {
        self.ensure_active()?;
        tracing::debug!("Closing assign card wizard");
        self.stores.navigator.go_back();
        Ok(())
    }

    /// Re-enter `step` from the confirmation screen in edit mode
    pub fn edit(&mut self, step: StepId) -> Result<(), WizardError> {
        self.ensure_active()?;
        let current = self.current_step()?;
        let target = self.options.registry.transition(current, step)?;

        self.stores.route.write_step(target);
        self.stores.flow.write(FlowStatePatch::edit(target))?;
        tracing::debug!(step = %target, "Editing step");
        Ok(())
    }

    /// Record a collaborator's data without moving
    pub fn merge_data(&mut self, data: FlowData) -> Result<(), WizardError> {
        self.ensure_active()?;
        self.stores.flow.write(FlowStatePatch::data(data))?;
        Ok(())
    }

    /// Apply a collaborator's navigation request
    pub fn handle(&mut self, action: StepAction) -> Result<(), WizardError> {
        match action {
            StepAction::Stay => Ok(()),
            StepAction::Next { target, data } => {
                // Validate the move before recording data
                self.ensure_active()?;
                let current = self.current_step()?;
                self.options.registry.transition(current, target)?;
                if !data.is_empty() {
                    self.merge_data(data)?;
                }
                self.advance(target)
            }
            StepAction::Back => self.retreat(),
            StepAction::Close | StepAction::Submit => self.close(),
            StepAction::Edit(step) => self.edit(step),
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Tear down the session. Runs once; clearing the record is the last
    /// thing it does so no queued write can resurrect it.
    pub fn dispose(&mut self) -> Result<(), WizardError> {
        if self.disposed {
            return Ok(());
        }
        self.disposed = true;

        if let Some(bound) = self.listener.take() {
            self.stores.navigator.remove_before_leave_listener(bound.id);
        }
        self.commands_rx.close();
        while self.commands_rx.try_recv().is_ok() {}

        self.stores.flow.clear()?;
        tracing::info!("Assign card wizard disposed, flow state cleared");
        Ok(())
    }
}

impl Drop for WizardController {
    fn drop(&mut self) {
        if let Err(e) = self.dispose() {
            tracing::warn!(error = %e, "Failed to clear flow state on teardown");
        }
    }
}
